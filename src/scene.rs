use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::mesh::MeshData;

/// Converts a `0xRRGGBB` literal into an sRGB color with components in `0..=1`.
pub fn color_from_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Minimal capability shared by everything that lives in the scene graph.
pub trait Node {
    fn name(&self) -> &str;

    fn position(&self) -> Vec3;

    fn children(&self) -> Vec<&dyn Node> {
        Vec::new()
    }

    fn material(&self) -> Option<&StandardMaterial> {
        None
    }
}

/// Perspective camera with a cached projection matrix.
///
/// Changing `fov`, `aspect`, `near` or `far` has no visible effect until
/// [`PerspectiveCamera::update_projection_matrix`] is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub name: String,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            name: "Camera".to_string(),
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect.max(1e-4), self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

impl Node for PerspectiveCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }
}

/// Sky/ground blended light without a direction of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HemisphereLight {
    pub name: String,
    pub sky_color: Vec3,
    pub ground_color: Vec3,
    pub intensity: f32,
    /// Direction of the sky; only the direction matters.
    pub position: Vec3,
}

impl HemisphereLight {
    pub fn new(sky_color: Vec3, ground_color: Vec3, intensity: f32) -> Self {
        Self {
            name: "Ambient".to_string(),
            sky_color,
            ground_color,
            intensity,
            position: Vec3::Y,
        }
    }
}

/// Parallel light shining from `position` towards `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub name: String,
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self {
            name: "Sun".to_string(),
            color,
            intensity,
            position: Vec3::Y,
            target: Vec3::ZERO,
        }
    }

    /// Unit vector pointing from the lit surface towards the light.
    pub fn direction(&self) -> Vec3 {
        (self.position - self.target).normalize_or_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Hemisphere(HemisphereLight),
    Directional(DirectionalLight),
}

impl Node for Light {
    fn name(&self) -> &str {
        match self {
            Light::Hemisphere(light) => &light.name,
            Light::Directional(light) => &light.name,
        }
    }

    fn position(&self) -> Vec3 {
        match self {
            Light::Hemisphere(light) => light.position,
            Light::Directional(light) => light.position,
        }
    }
}

/// Opaque physically based material (diffuse plus specular).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardMaterial {
    pub color: Vec3,
    pub roughness: f32,
    pub metalness: f32,
}

impl StandardMaterial {
    pub fn new(color: Vec3) -> Self {
        Self {
            color,
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

/// Renderable node owning its geometry and material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    geometry: MeshData,
    material: StandardMaterial,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Mesh {
    pub fn new(name: impl Into<String>, geometry: MeshData, material: StandardMaterial) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn geometry(&self) -> &MeshData {
        &self.geometry
    }

    pub fn standard_material(&self) -> &StandardMaterial {
        &self.material
    }

    /// Rotates around the mesh's local Y axis.
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_rotation_y(angle)).normalize();
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Node for Mesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn material(&self) -> Option<&StandardMaterial> {
        Some(&self.material)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Child {
    Camera(usize),
    Light(usize),
    Mesh(usize),
}

/// Root container owning every node for the lifetime of the application.
///
/// Nodes are never removed, so an id handed out by a scene stays valid for
/// that scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Vec3,
    cameras: Vec<PerspectiveCamera>,
    lights: Vec<Light>,
    meshes: Vec<Mesh>,
    children: Vec<Child>,
}

impl Scene {
    pub fn new(background: Vec3) -> Self {
        Self {
            background,
            cameras: Vec::new(),
            lights: Vec::new(),
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn add_camera(&mut self, camera: PerspectiveCamera) -> CameraId {
        self.cameras.push(camera);
        let index = self.cameras.len() - 1;
        self.children.push(Child::Camera(index));
        CameraId(index)
    }

    /// Lights are looked up by kind through [`Scene::hemisphere_light`] and
    /// [`Scene::directional_light`], so no id is handed out.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
        self.children.push(Child::Light(self.lights.len() - 1));
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        let index = self.meshes.len() - 1;
        self.children.push(Child::Mesh(index));
        MeshId(index)
    }

    pub fn camera(&self, id: CameraId) -> &PerspectiveCamera {
        &self.cameras[id.0]
    }

    pub fn camera_mut(&mut self, id: CameraId) -> &mut PerspectiveCamera {
        &mut self.cameras[id.0]
    }

    pub fn mesh(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.0]
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> &mut Mesh {
        &mut self.meshes[id.0]
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| (MeshId(index), mesh))
    }

    pub fn hemisphere_light(&self) -> Option<&HemisphereLight> {
        self.lights.iter().find_map(|light| match light {
            Light::Hemisphere(light) => Some(light),
            Light::Directional(_) => None,
        })
    }

    pub fn directional_light(&self) -> Option<&DirectionalLight> {
        self.lights.iter().find_map(|light| match light {
            Light::Directional(light) => Some(light),
            Light::Hemisphere(_) => None,
        })
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl Node for Scene {
    fn name(&self) -> &str {
        "Scene"
    }

    fn position(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn children(&self) -> Vec<&dyn Node> {
        self.children
            .iter()
            .map(|child| match *child {
                Child::Camera(index) => &self.cameras[index] as &dyn Node,
                Child::Light(index) => &self.lights[index] as &dyn Node,
                Child::Mesh(index) => &self.meshes[index] as &dyn Node,
            })
            .collect()
    }
}
