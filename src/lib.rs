//! Building blocks for a small spinning-shape viewer.
//!
//! A 2D outline (a star or a regular polygon) is extruded into a mesh, placed
//! in a scene with a camera and two lights, and spun a little every frame.
//! Everything except [`render::Renderer`] and the windowed loop in [`app`]
//! runs without a GPU, so the scene logic stays testable in headless tools.

pub mod app;
pub mod assembly;
pub mod config;
pub mod extrude;
pub mod input;
pub mod mesh;
pub mod orbit;
pub mod outline;
pub mod render;
pub mod scene;
pub mod viewport;

pub use app::{print_summary, run_headless, run_interactive, WindowInitError};
pub use assembly::{assemble_scene, build_geometry};
pub use config::{AppConfig, ShapeConfig, WindowConfig};
pub use extrude::{extrude, ExtrudeError, ExtrusionSpec};
pub use input::{MouseButton, PointerEvent, PointerState};
pub use mesh::MeshData;
pub use orbit::OrbitControls;
pub use outline::{generate_hexagon, generate_star, Outline, OutlineError, ShapeKind};
pub use render::{HeadlessSurface, Renderer};
pub use scene::{
    DirectionalLight, HemisphereLight, Light, Mesh, Node, PerspectiveCamera, Scene,
    StandardMaterial,
};
pub use viewport::{AppState, FrameCallback, RenderSurface, ViewportController, ViewportState};
