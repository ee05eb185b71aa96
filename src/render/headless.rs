use std::convert::Infallible;

use glam::Mat4;

use crate::render::common::{GlobalUniform, ObjectConstants};
use crate::scene::{PerspectiveCamera, Scene};
use crate::viewport::{scale_dimension, RenderSurface};

/// Surface without a GPU behind it; records what a frame would upload.
///
/// Used by `--summary-only` runs and by tests.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    size: (u32, u32),
    pixel_ratio: f64,
    frames: u64,
    last_view_proj: Option<Mat4>,
    last_objects: Vec<ObjectConstants>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self {
            size: (0, 0),
            pixel_ratio: 1.0,
            frames: 0,
            last_view_proj: None,
            last_objects: Vec::new(),
        }
    }
}

impl HeadlessSurface {
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn physical_size(&self) -> (u32, u32) {
        (
            scale_dimension(self.size.0, self.pixel_ratio),
            scale_dimension(self.size.1, self.pixel_ratio),
        )
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_view_proj(&self) -> Option<Mat4> {
        self.last_view_proj
    }

    pub fn last_objects(&self) -> &[ObjectConstants] {
        &self.last_objects
    }
}

impl RenderSurface for HeadlessSurface {
    type Error = Infallible;

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), Infallible> {
        let globals = GlobalUniform::new(scene, camera);
        self.last_view_proj = Some(Mat4::from_cols_array_2d(&globals.view_proj));
        self.last_objects = scene
            .meshes()
            .map(|(_, mesh)| ObjectConstants::new(mesh))
            .collect();
        self.frames += 1;
        Ok(())
    }
}
