use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::outline::ShapeKind;
use crate::scene::color_from_hex;

/// Outline parameters for each supported shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeConfig {
    pub kind: ShapeKind,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub points: u32,
    pub radius: f32,
    pub sides: u32,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Star,
            inner_radius: 0.4,
            outer_radius: 0.8,
            points: 5,
            radius: 1.0,
            sides: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Shape Scene".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Runtime configuration; the defaults reproduce the stock red star scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub shape: ShapeConfig,
    /// Mesh rotation per frame around Y, in radians.
    #[serde(default = "default_spin")]
    pub spin_per_frame: f32,
    #[serde(default = "default_color")]
    pub color: Vec3,
    #[serde(default = "default_background")]
    pub background: Vec3,
    #[serde(default)]
    pub window: WindowConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shape: ShapeConfig::default(),
            spin_per_frame: default_spin(),
            color: default_color(),
            background: default_background(),
            window: WindowConfig::default(),
        }
    }
}

fn default_spin() -> f32 {
    0.01
}

fn default_color() -> Vec3 {
    color_from_hex(0xff0000)
}

fn default_background() -> Vec3 {
    color_from_hex(0xaaaaaa)
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path)
            .with_context(|| format!("unable to read config {}", path.display()))?;
        Self::from_xml(&xml).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses a `<config>` document. Missing tags keep their defaults.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid config XML")?;
        let root = document.root_element();
        if !root.has_tag_name("config") {
            return Err(anyhow!(
                "expected <config> root element, found <{}>",
                root.tag_name().name()
            ));
        }

        let mut config = Self::default();
        if let Some(kind) = optional_text(&root, "shape") {
            config.shape.kind = kind.parse()?;
        }
        let shape = &mut config.shape;
        shape.inner_radius = parse_f32(optional_text(&root, "inner_radius"), shape.inner_radius)?;
        shape.outer_radius = parse_f32(optional_text(&root, "outer_radius"), shape.outer_radius)?;
        shape.points = parse_u32(optional_text(&root, "points"), shape.points)?;
        shape.radius = parse_f32(optional_text(&root, "radius"), shape.radius)?;
        shape.sides = parse_u32(optional_text(&root, "sides"), shape.sides)?;

        config.spin_per_frame = parse_f32(optional_text(&root, "spin"), config.spin_per_frame)?;
        config.color = parse_color(optional_text(&root, "color"), config.color)?;
        config.background = parse_color(optional_text(&root, "background"), config.background)?;

        let window = &mut config.window;
        window.width = parse_u32(optional_text(&root, "width"), window.width)?;
        window.height = parse_u32(optional_text(&root, "height"), window.height)?;
        if let Some(title) = optional_text(&root, "title") {
            window.title = title;
        }
        if window.width == 0 || window.height == 0 {
            return Err(anyhow!("window size must be non-zero"));
        }

        Ok(config)
    }
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let components = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<u8>()
                .map_err(|err| anyhow!("invalid color component {component:?}: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    let [r, g, b] = components[..] else {
        return Err(anyhow!("color needs exactly 3 components, got {value:?}"));
    };
    Ok(Vec3::new(r as f32, g as f32, b as f32) / 255.0)
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float {value:?}: {err}")),
        None => Ok(default),
    }
}

fn parse_u32(value: Option<String>, default: u32) -> Result<u32> {
    match value {
        Some(value) => value
            .parse::<u32>()
            .map_err(|err| anyhow!("failed to parse integer {value:?}: {err}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <config>
        <shape>hexagon</shape>
        <radius>1.5</radius>
        <sides>8</sides>
        <spin>0.02</spin>
        <color>0 128 255</color>
        <width>640</width>
        <height>480</height>
        <title>Octagon</title>
    </config>
    "#;

    #[test]
    fn parse_config_overrides_defaults() {
        let config = AppConfig::from_xml(SAMPLE).unwrap();
        assert_eq!(config.shape.kind, ShapeKind::Hexagon);
        assert_eq!(config.shape.radius, 1.5);
        assert_eq!(config.shape.sides, 8);
        assert_eq!(config.shape.points, 5);
        assert!((config.spin_per_frame - 0.02).abs() < f32::EPSILON);
        assert_eq!(config.color, Vec3::new(0.0, 128.0 / 255.0, 1.0));
        assert_eq!(config.background, color_from_hex(0xaaaaaa));
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.title, "Octagon");
    }

    #[test]
    fn empty_config_keeps_defaults() {
        let config = AppConfig::from_xml("<config/>").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AppConfig::from_xml("<scene/>").is_err());
        assert!(AppConfig::from_xml("<config><shape>cube</shape></config>").is_err());
        assert!(AppConfig::from_xml("<config><points>five</points></config>").is_err());
        assert!(AppConfig::from_xml("<config><color>1 2</color></config>").is_err());
        assert!(AppConfig::from_xml("<config><width>0</width></config>").is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.xml");
        std::fs::write(&path, "<config><shape>star</shape><points>7</points></config>").unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.shape.points, 7);
        assert!(AppConfig::load(dir.path().join("missing.xml")).is_err());
    }
}
