use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Vec3};

use crate::scene::{Mesh, PerspectiveCamera, Scene};

/// Converts an sRGB encoded color channel into linear space.
pub fn srgb_to_linear(channel: f32) -> f32 {
    if channel <= 0.04045 {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_color(color: Vec3) -> Vec3 {
    Vec3::new(
        srgb_to_linear(color.x),
        srgb_to_linear(color.y),
        srgb_to_linear(color.z),
    )
}

/// Camera and lighting state shared by every draw in a frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// `w` carries the hemisphere intensity.
    pub sky_color: [f32; 4],
    pub ground_color: [f32; 4],
    pub hemisphere_up: [f32; 4],
    pub light_direction: [f32; 4],
    /// `w` carries the directional intensity.
    pub light_color: [f32; 4],
}

impl GlobalUniform {
    /// Missing lights contribute nothing.
    pub fn new(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut uniform = Self::zeroed();
        uniform.view_proj = camera.view_projection().to_cols_array_2d();
        uniform.camera_position = camera.position.extend(1.0).into();
        if let Some(light) = scene.hemisphere_light() {
            uniform.sky_color = linear_color(light.sky_color).extend(light.intensity).into();
            uniform.ground_color = linear_color(light.ground_color).extend(0.0).into();
            uniform.hemisphere_up = light.position.normalize_or_zero().extend(0.0).into();
        }
        if let Some(light) = scene.directional_light() {
            uniform.light_direction = light.direction().extend(0.0).into();
            uniform.light_color = linear_color(light.color).extend(light.intensity).into();
        }
        uniform
    }
}

/// Per-mesh transform and material.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub color: [f32; 4],
    /// `x` roughness, `y` metalness.
    pub material: [f32; 4],
}

impl ObjectConstants {
    pub fn new(mesh: &Mesh) -> Self {
        let model = mesh.model_matrix();
        let normal = Mat3::from_mat4(model).inverse().transpose();
        let material = mesh.standard_material();
        Self {
            model: model.to_cols_array_2d(),
            normal: mat3_to_3x4(normal),
            color: linear_color(material.color).extend(1.0).into(),
            material: [material.roughness, material.metalness, 0.0, 0.0],
        }
    }
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

pub(crate) const SHADER: &str = r#"
struct GlobalUniform {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    sky_color: vec4<f32>,
    ground_color: vec4<f32>,
    hemisphere_up: vec4<f32>,
    light_direction: vec4<f32>,
    light_color: vec4<f32>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    material: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

const PI: f32 = 3.14159265;

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.view_proj * world_position;
    out.world_pos = world_position.xyz;

    let world_normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;

    out.normal = normalize(world_normal);
    return out;
}

fn ggx_specular(n: vec3<f32>, v: vec3<f32>, l: vec3<f32>, f0: vec3<f32>, roughness: f32) -> vec3<f32> {
    let h = normalize(l + v);
    let ndl = max(dot(n, l), 0.0);
    let ndv = max(dot(n, v), 1e-4);
    let ndh = max(dot(n, h), 0.0);
    let vdh = max(dot(v, h), 0.0);
    let alpha = max(roughness * roughness, 0.0025);
    let a2 = alpha * alpha;
    let denom = ndh * ndh * (a2 - 1.0) + 1.0;
    let d = a2 / (PI * denom * denom);
    let gv = ndl * sqrt(ndv * ndv * (1.0 - a2) + a2);
    let gl = ndv * sqrt(ndl * ndl * (1.0 - a2) + a2);
    let vis = 0.5 / max(gv + gl, 1e-6);
    let fresnel = f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - vdh, 5.0);
    return fresnel * d * vis;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    let view_dir = normalize(globals.camera_position.xyz - input.world_pos);
    let base = object.color.rgb;
    let roughness = object.material.x;
    let metalness = object.material.y;
    let diffuse_color = base * (1.0 - metalness);
    let f0 = mix(vec3<f32>(0.04), base, metalness);

    let hemi_weight = 0.5 * dot(normal, globals.hemisphere_up.xyz) + 0.5;
    let hemi = mix(globals.ground_color.rgb, globals.sky_color.rgb, hemi_weight) * globals.sky_color.w;

    let light_dir = normalize(globals.light_direction.xyz);
    let ndl = max(dot(normal, light_dir), 0.0);
    let irradiance = ndl * globals.light_color.rgb * globals.light_color.w;
    let specular = irradiance * PI * ggx_specular(normal, view_dir, light_dir, f0, roughness);

    let lit = diffuse_color * (hemi + irradiance) + specular;
    return vec4<f32>(lit, object.color.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::assemble_scene;
    use crate::config::AppConfig;
    use crate::viewport::ViewportState;

    #[test]
    fn srgb_endpoints_are_preserved() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!(srgb_to_linear(0.5) < 0.5);
    }

    #[test]
    fn uniforms_carry_scene_lights() {
        let state = assemble_scene(&AppConfig::default(), ViewportState::new(800, 600, 1.0)).unwrap();
        let globals = GlobalUniform::new(&state.scene, state.camera());
        assert!((globals.sky_color[3] - 0.3).abs() < f32::EPSILON);
        assert_eq!(globals.light_color[3], 1.0);
        let direction = Vec3::from_slice(&globals.light_direction[..3]);
        assert!(direction.abs_diff_eq(Vec3::new(0.2, 1.0, 1.0).normalize(), 1e-6));
        assert_eq!(globals.camera_position, [0.0, 0.0, 4.0, 1.0]);

        let constants = ObjectConstants::new(state.mesh());
        let color = Vec3::from_slice(&constants.color[..3]);
        assert!(color.abs_diff_eq(Vec3::X, 1e-5));
        assert_eq!(constants.material, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 64 + 6 * 16);
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 64 + 48 + 16 + 16);
    }
}
