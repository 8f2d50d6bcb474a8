use crate::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Tile-space position to canvas pixels: tile (0,0) sits at the top-left
/// corner of the canvas and rows grow downward.
pub fn tile_to_screen_px(tile: Vec2, tile_size_px: f32, zoom: f32) -> Vec2 {
    tile.scaled(tile_size_px * zoom)
}

pub(crate) fn round_px(value: f32) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    value.round() as i32
}
