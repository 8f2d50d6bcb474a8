mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, MAX_RENDER_FPS_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{tile_to_screen_px, Renderer, Viewport};
pub use scene::{
    BubbleDesc, GridDesc, RenderFrame, Scene, SceneCommand, SpriteDesc, ZoneDesc,
};
