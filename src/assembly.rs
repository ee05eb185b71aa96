use anyhow::{Context, Result};
use glam::Vec3;
use log::info;

use crate::config::{AppConfig, ShapeConfig};
use crate::extrude::{extrude, ExtrusionSpec};
use crate::mesh::MeshData;
use crate::outline::{generate_hexagon, generate_star, ShapeKind};
use crate::scene::{
    color_from_hex, DirectionalLight, HemisphereLight, Light, Mesh, PerspectiveCamera, Scene,
    StandardMaterial,
};
use crate::viewport::{AppState, ViewportState};

pub const CAMERA_FOV: f32 = 60.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 100.0;
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 4.0);

pub const SKY_COLOR: u32 = 0xffffff;
pub const GROUND_COLOR: u32 = 0xbbbbff;
pub const AMBIENT_INTENSITY: f32 = 0.3;
pub const SUN_POSITION: Vec3 = Vec3::new(0.2, 1.0, 1.0);

/// Generates the configured outline and extrudes it into mesh geometry.
pub fn build_geometry(shape: &ShapeConfig) -> Result<MeshData> {
    let outline = match shape.kind {
        ShapeKind::Star => generate_star(shape.inner_radius, shape.outer_radius, shape.points),
        ShapeKind::Hexagon => generate_hexagon(shape.radius, shape.sides),
    }
    .with_context(|| format!("invalid {} outline", shape.kind))?;
    let spec = ExtrusionSpec::for_shape(shape.kind);
    extrude(&outline, &spec).with_context(|| format!("failed to extrude {}", shape.kind))
}

/// Builds the camera, lights and the single spinning mesh.
///
/// Geometry is validated before any node is created, so a bad shape leaves
/// nothing half built.
pub fn assemble_scene(config: &AppConfig, viewport: ViewportState) -> Result<AppState> {
    let geometry = build_geometry(&config.shape)?;

    let mut camera = PerspectiveCamera::new(
        CAMERA_FOV,
        viewport.aspect(),
        CAMERA_NEAR,
        CAMERA_FAR,
    );
    camera.position = CAMERA_POSITION;
    camera.look_at(Vec3::ZERO);

    let mut scene = Scene::new(config.background);
    let camera = scene.add_camera(camera);

    scene.add_light(Light::Hemisphere(HemisphereLight::new(
        color_from_hex(SKY_COLOR),
        color_from_hex(GROUND_COLOR),
        AMBIENT_INTENSITY,
    )));

    let mut sun = DirectionalLight::new(Vec3::ONE, 1.0);
    sun.position = SUN_POSITION;
    scene.add_light(Light::Directional(sun));

    let name = match config.shape.kind {
        ShapeKind::Star => "Star",
        ShapeKind::Hexagon => "Hexagon",
    };
    let mesh = scene.add_mesh(Mesh::new(
        name,
        geometry,
        StandardMaterial::new(config.color),
    ));

    info!(
        "assembled {} scene with {} nodes",
        config.shape.kind,
        scene.child_count()
    );

    Ok(AppState {
        scene,
        camera,
        mesh,
        viewport,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;

    #[test]
    fn default_scene_matches_stock_layout() {
        let state = assemble_scene(&AppConfig::default(), ViewportState::new(800, 600, 1.0)).unwrap();
        let camera = state.camera();
        assert_eq!(camera.fov, 60.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 100.0);
        assert!((camera.aspect - 800.0 / 600.0).abs() < f32::EPSILON);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(camera.target, Vec3::ZERO);

        let scene = &state.scene;
        assert_eq!(scene.child_count(), 4);
        assert_eq!(scene.background, color_from_hex(0xaaaaaa));
        assert_eq!(scene.meshes().count(), 1);

        let ambient = scene.hemisphere_light().unwrap();
        assert_eq!(ambient.sky_color, Vec3::ONE);
        assert_eq!(ambient.ground_color, color_from_hex(0xbbbbff));
        assert!((ambient.intensity - 0.3).abs() < f32::EPSILON);
        assert_eq!(scene.directional_light().unwrap().position, SUN_POSITION);

        let mesh = state.mesh();
        assert_eq!(mesh.name(), "Star");
        assert_eq!(mesh.material().unwrap().color, Vec3::X);
        // Star: 10 outline points, 2 caps and 10 wall quads.
        assert_eq!(mesh.geometry().vertex_count(), 60);
    }

    #[test]
    fn hexagon_uses_its_own_depth() {
        let mut config = AppConfig::default();
        config.shape.kind = ShapeKind::Hexagon;
        let state = assemble_scene(&config, ViewportState::new(100, 100, 1.0)).unwrap();
        let (_, max) = state.mesh().geometry().bounds().unwrap();
        assert!((max.z - 0.4).abs() < 1e-6);
        assert_eq!(state.mesh().name(), "Hexagon");
    }

    #[test]
    fn invalid_shape_fails_before_building_nodes() {
        let mut config = AppConfig::default();
        config.shape.points = 2;
        let err = assemble_scene(&config, ViewportState::new(100, 100, 1.0)).unwrap_err();
        assert!(format!("{err:#}").contains("at least 3"));
    }
}
