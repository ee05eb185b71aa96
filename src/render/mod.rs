mod common;
mod headless;
mod native;

pub use common::{linear_color, srgb_to_linear, GlobalUniform, ObjectConstants};
pub use headless::HeadlessSurface;
pub use native::Renderer;
