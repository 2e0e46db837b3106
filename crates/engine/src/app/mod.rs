mod draw_list;
mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use draw_list::{DebugRect, DrawList, SpriteDraw, TextureRegion, DEBUG_RECT_COLOR};
pub use geometry::{Rect, Vec2};
pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{world_to_buffer_px, Renderer, Viewport};
pub use scene::{
    InputSnapshot, Scene, SceneCommand, SceneWorld, TileId, Tilemap, TilemapError, Tileset,
};
