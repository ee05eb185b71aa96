use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed 2D polygon boundary, traversed counter-clockwise from angle zero.
///
/// The first point is the move-to origin; the closing segment back to it is
/// implicit and never stored as a duplicate vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    points: Vec<Vec2>,
}

impl Outline {
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Twice the signed area; positive for counter-clockwise outlines.
    pub fn signed_area2(&self) -> f32 {
        let n = self.points.len();
        (0..n)
            .map(|i| self.points[i].perp_dot(self.points[(i + 1) % n]))
            .sum()
    }

    pub(crate) fn from_points(points: Vec<Vec2>) -> Self {
        Self { points }
    }
}

/// Rejected outline parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OutlineError {
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidRadius { name: &'static str, value: f32 },
    #[error("inner radius {inner} must be smaller than outer radius {outer}")]
    InvertedRadii { inner: f32, outer: f32 },
    #[error("{name} must be at least 3, got {value}")]
    TooFewVertices { name: &'static str, value: u32 },
    #[error("{name} = {value} yields more outline vertices than fit in u32")]
    TooManyVertices { name: &'static str, value: u32 },
}

/// Which outline the scene extrudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Star,
    Hexagon,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Star => "star",
            Self::Hexagon => "hexagon",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "star" => Ok(Self::Star),
            "hexagon" | "hex" => Ok(Self::Hexagon),
            other => Err(anyhow::anyhow!(
                "unknown shape {other:?}, expected \"star\" or \"hexagon\""
            )),
        }
    }
}

/// Builds a star with `points` tips, alternating outer and inner radius.
///
/// The first vertex sits on the outer radius at angle zero, giving
/// `points * 2` vertices in total.
pub fn generate_star(
    inner_radius: f32,
    outer_radius: f32,
    points: u32,
) -> Result<Outline, OutlineError> {
    check_radius("inner radius", inner_radius)?;
    check_radius("outer radius", outer_radius)?;
    if inner_radius >= outer_radius {
        return Err(OutlineError::InvertedRadii {
            inner: inner_radius,
            outer: outer_radius,
        });
    }
    check_count("points", points)?;

    let count = points
        .checked_mul(2)
        .ok_or(OutlineError::TooManyVertices {
            name: "points",
            value: points,
        })?;
    Ok(ring(count, |index| {
        if index % 2 == 0 {
            outer_radius
        } else {
            inner_radius
        }
    }))
}

/// Builds a regular polygon with `sides` vertices on a circle of `radius`.
pub fn generate_hexagon(radius: f32, sides: u32) -> Result<Outline, OutlineError> {
    check_radius("radius", radius)?;
    check_count("sides", sides)?;
    Ok(ring(sides, |_| radius))
}

// Angles come from the vertex index, so the range stays half-open at TAU.
fn ring(count: u32, radius_at: impl Fn(u32) -> f32) -> Outline {
    let step = TAU / count as f32;
    let points = (0..count)
        .map(|index| {
            let theta = step * index as f32;
            let radius = radius_at(index);
            Vec2::new(theta.cos() * radius, theta.sin() * radius)
        })
        .collect();
    Outline::from_points(points)
}

fn check_radius(name: &'static str, value: f32) -> Result<(), OutlineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(OutlineError::InvalidRadius { name, value })
    }
}

fn check_count(name: &'static str, value: u32) -> Result<(), OutlineError> {
    if value >= 3 {
        Ok(())
    } else {
        Err(OutlineError::TooFewVertices { name, value })
    }
}
