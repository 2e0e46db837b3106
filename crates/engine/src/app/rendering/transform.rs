use crate::app::Vec2;

/// Size of the offscreen buffer in world units; one buffer pixel per world unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Maps the bottom-left corner of a world-space box to the top-left buffer pixel of
/// that box. The world is y-up, the buffer is y-down.
pub fn world_to_buffer_px(position: Vec2, box_height: f32, viewport: Viewport) -> (i32, i32) {
    let x = position.x.round() as i32;
    let y = (viewport.height as f32 - position.y - box_height).round() as i32;
    (x, y)
}
