//! Linear extrusion of a closed 2D outline into a solid along +Z.
//!
//! The back cap sits at `z = 0`, the front cap at `z = depth`. Caps are
//! triangulated with earcut so concave outlines such as stars work.
//! Side walls get one quad per outline edge and step with a flat outward
//! normal, so the mesh shades with hard edges.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mesh::MeshData;
use crate::outline::{Outline, ShapeKind};

/// Parameters for sweeping an outline along the depth axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionSpec {
    pub depth: f32,
    pub steps: u32,
    pub bevel_enabled: bool,
}

impl ExtrusionSpec {
    pub const STAR: Self = Self {
        depth: 0.5,
        steps: 1,
        bevel_enabled: false,
    };

    pub const HEXAGON: Self = Self {
        depth: 0.4,
        steps: 1,
        bevel_enabled: false,
    };

    pub fn for_shape(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Star => Self::STAR,
            ShapeKind::Hexagon => Self::HEXAGON,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtrudeError {
    #[error("extrusion depth must be a positive finite number, got {0}")]
    InvalidDepth(f32),
    #[error("extrusion needs at least one step")]
    NoSteps,
    #[error("bevelled extrusion is not supported")]
    BevelUnsupported,
    #[error("outline has {0} points, at least 3 are required")]
    TooFewPoints(usize),
    #[error("outline could not be triangulated; it is degenerate or self-intersecting")]
    Triangulation,
}

/// Sweeps `outline` along +Z according to `spec`.
pub fn extrude(outline: &Outline, spec: &ExtrusionSpec) -> Result<MeshData, ExtrudeError> {
    if !(spec.depth.is_finite() && spec.depth > 0.0) {
        return Err(ExtrudeError::InvalidDepth(spec.depth));
    }
    if spec.steps == 0 {
        return Err(ExtrudeError::NoSteps);
    }
    if spec.bevel_enabled {
        return Err(ExtrudeError::BevelUnsupported);
    }
    if outline.len() < 3 {
        return Err(ExtrudeError::TooFewPoints(outline.len()));
    }

    // Degeneracy is judged relative to the outline's extent, not its absolute size.
    let extent = outline
        .points()
        .iter()
        .fold(0.0f32, |acc, point| acc.max(point.abs().max_element()));
    let area2 = outline.signed_area2();
    if !(area2.abs() > f32::EPSILON * extent * extent) {
        return Err(ExtrudeError::Triangulation);
    }
    let mut points = outline.points().to_vec();
    if area2 < 0.0 {
        points.reverse();
    }
    let triangles = triangulate(&points).ok_or(ExtrudeError::Triangulation)?;

    let mut mesh = MeshData::default();
    push_cap(&mut mesh, &points, &triangles, 0.0, Vec3::NEG_Z);
    push_cap(&mut mesh, &points, &triangles, spec.depth, Vec3::Z);
    push_walls(&mut mesh, &points, spec);
    Ok(mesh)
}

fn push_cap(mesh: &mut MeshData, points: &[Vec2], triangles: &[[usize; 3]], z: f32, normal: Vec3) {
    let base = mesh.vertex_count() as u32;
    for point in points {
        mesh.push_vertex(point.extend(z), normal);
    }
    for &[a, b, c] in triangles {
        let (a, b, c) = (base + a as u32, base + b as u32, base + c as u32);
        if normal.z > 0.0 {
            mesh.push_triangle(a, b, c);
        } else {
            mesh.push_triangle(a, c, b);
        }
    }
}

fn push_walls(mesh: &mut MeshData, points: &[Vec2], spec: &ExtrusionSpec) {
    let count = points.len();
    for i in 0..count {
        let p0 = points[i];
        let p1 = points[(i + 1) % count];
        let edge = p1 - p0;
        // Outward for counter-clockwise outlines.
        let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero();
        for step in 0..spec.steps {
            let z0 = spec.depth * step as f32 / spec.steps as f32;
            let z1 = spec.depth * (step + 1) as f32 / spec.steps as f32;
            let a = mesh.push_vertex(p0.extend(z0), normal);
            let b = mesh.push_vertex(p1.extend(z0), normal);
            let c = mesh.push_vertex(p1.extend(z1), normal);
            let d = mesh.push_vertex(p0.extend(z1), normal);
            mesh.push_triangle(a, b, c);
            mesh.push_triangle(a, c, d);
        }
    }
}

/// Triangulates a counter-clockwise outline with earcut, returning
/// counter-clockwise index triples.
fn triangulate(points: &[Vec2]) -> Option<Vec<[usize; 3]>> {
    let coords: Vec<f64> = points
        .iter()
        .flat_map(|point| [point.x as f64, point.y as f64])
        .collect();
    let indices = earcutr::earcut(&coords, &[], 2).ok()?;
    if indices.is_empty() {
        return None;
    }
    let area2: f32 = indices
        .chunks_exact(3)
        .map(|tri| (points[tri[1]] - points[tri[0]]).perp_dot(points[tri[2]] - points[tri[0]]))
        .sum();
    // earcut picks its own winding; flip it to match the outline.
    let triangles = indices
        .chunks_exact(3)
        .map(|tri| {
            if area2 < 0.0 {
                [tri[0], tri[2], tri[1]]
            } else {
                [tri[0], tri[1], tri[2]]
            }
        })
        .collect();
    Some(triangles)
}
