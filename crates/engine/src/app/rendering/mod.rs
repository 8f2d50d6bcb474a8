mod raster;
mod renderer;
mod text;
mod transform;

pub use renderer::Renderer;
pub use transform::{tile_to_screen_px, Viewport};
