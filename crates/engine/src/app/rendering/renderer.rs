use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{BubbleDesc, RenderFrame, SpriteDesc, ZoneDesc};
use crate::geometry::CardinalFacing;

use super::raster::{
    clear, fill_rect, horizontal_line, outline_rect, vertical_line, with_opacity, Canvas,
};
use super::text::{draw_text, glyph_advance, line_height, text_width};
use super::transform::round_px;
use super::Viewport;

const CLEAR_COLOR: [u8; 4] = [18, 20, 26, 255];
const FLOOR_COLOR: [u8; 4] = [58, 54, 66, 255];
const GRID_COLOR: [u8; 4] = [255, 255, 255, 51];
const ZONE_DASH_PX: i32 = 5;
const FACING_NOTCH_COLOR: [u8; 4] = [20, 20, 24, 220];
const HIGHLIGHT_COLOR: [u8; 4] = [80, 220, 255, 255];
const ANCHOR_MARKER_COLOR: [u8; 4] = [255, 0, 0, 255];
const ANCHOR_MARKER_HALF_PX: i32 = 2;
const LABEL_LIFT_PX: i32 = 5;
const BUBBLE_LIFT_PX: i32 = 45;
const BUBBLE_PADDING_PX: i32 = 6;
const BUBBLE_ARROW_PX: i32 = 6;
const BUBBLE_BG_COLOR: [u8; 4] = [250, 250, 245, 240];
const BUBBLE_BORDER_COLOR: [u8; 4] = [40, 40, 48, 255];
const BUBBLE_TEXT_COLOR: [u8; 4] = [20, 20, 24, 255];
const OVERLAY_PADDING_PX: i32 = 8;
const OVERLAY_BG_COLOR: [u8; 4] = [10, 12, 16, 200];
const OVERLAY_TEXT_COLOR: [u8; 4] = [236, 242, 248, 255];
const TEXT_SCALE: i32 = 2;
// Walk cycle offset per animation frame, in units of sprite size / 16.
const WALK_BOB_STEPS: [i32; 4] = [0, -1, 0, 1];

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn render(
        &mut self,
        frame_desc: &RenderFrame,
        overlay: Option<&[String]>,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let canvas = Canvas {
            width: self.viewport.width,
            height: self.viewport.height,
        };
        draw_frame(self.pixels.frame_mut(), canvas, frame_desc, overlay);
        self.pixels.render()
    }
}

pub(crate) fn draw_frame(
    frame: &mut [u8],
    canvas: Canvas,
    desc: &RenderFrame,
    overlay: Option<&[String]>,
) {
    clear(frame, CLEAR_COLOR);
    if let Some(size) = desc.floor_size_px {
        fill_rect(
            frame,
            canvas,
            0,
            0,
            round_px(size.x),
            round_px(size.y),
            FLOOR_COLOR,
        );
    }
    for zone in &desc.zones {
        draw_zone(frame, canvas, zone);
    }
    for sprite in &desc.sprites {
        draw_sprite(frame, canvas, sprite);
    }
    if let Some(grid) = desc.grid {
        let cell = grid.cell_px.max(1.0);
        let grid_right = round_px(grid.columns as f32 * cell);
        let grid_bottom = round_px(grid.rows as f32 * cell);
        for column in 0..=grid.columns {
            vertical_line(frame, canvas, round_px(column as f32 * cell), grid_bottom, GRID_COLOR);
        }
        for row in 0..=grid.rows {
            horizontal_line(frame, canvas, round_px(row as f32 * cell), grid_right, GRID_COLOR);
        }
    }
    if let Some(bubble) = &desc.bubble {
        draw_bubble(frame, canvas, bubble);
    }
    let overlay_lines = overlay
        .into_iter()
        .flatten()
        .chain(desc.overlay_lines.iter())
        .collect::<Vec<_>>();
    if !overlay_lines.is_empty() {
        draw_overlay_panel(frame, canvas, &overlay_lines);
    }
}

fn draw_zone(frame: &mut [u8], canvas: Canvas, zone: &ZoneDesc) {
    let x = round_px(zone.top_left_px.x);
    let y = round_px(zone.top_left_px.y);
    let width = round_px(zone.size_px.x);
    let height = round_px(zone.size_px.y);
    outline_rect(frame, canvas, x, y, width, height, ZONE_DASH_PX, zone.color);
    outline_rect(frame, canvas, x + 1, y + 1, width - 2, height - 2, ZONE_DASH_PX, zone.color);
    if let Some(label) = &zone.label {
        draw_text(frame, canvas, x + 5, y + 5, label, TEXT_SCALE, zone.color);
    }
}

fn walk_bob_px(frame_index: u32, size_px: i32) -> i32 {
    let step = WALK_BOB_STEPS[(frame_index as usize) % WALK_BOB_STEPS.len()];
    step * (size_px / 16).max(1)
}

fn draw_sprite(frame: &mut [u8], canvas: Canvas, sprite: &SpriteDesc) {
    let size = round_px(sprite.size_px).max(2);
    let x = round_px(sprite.top_left_px.x);
    let y = round_px(sprite.top_left_px.y) + walk_bob_px(sprite.frame_index, size);
    fill_rect(frame, canvas, x, y, size, size, sprite.color);

    let notch = (size / 4).max(1);
    match sprite.facing {
        CardinalFacing::Down => fill_rect(
            frame,
            canvas,
            x,
            y + size - notch,
            size,
            notch,
            FACING_NOTCH_COLOR,
        ),
        CardinalFacing::Up => fill_rect(frame, canvas, x, y, size, notch, FACING_NOTCH_COLOR),
        CardinalFacing::Left => fill_rect(frame, canvas, x, y, notch, size, FACING_NOTCH_COLOR),
        CardinalFacing::Right => fill_rect(
            frame,
            canvas,
            x + size - notch,
            y,
            notch,
            size,
            FACING_NOTCH_COLOR,
        ),
    }

    if sprite.highlighted {
        outline_rect(frame, canvas, x - 2, y - 2, size + 4, size + 4, 0, HIGHLIGHT_COLOR);
    }
    if let Some(label) = &sprite.label {
        let label_y = y - LABEL_LIFT_PX - line_height(1);
        draw_text(frame, canvas, x, label_y, label, 1, sprite.color);
    }
    if sprite.show_anchor_marker {
        let anchor_x = round_px(sprite.top_left_px.x);
        let anchor_y = round_px(sprite.top_left_px.y);
        fill_rect(
            frame,
            canvas,
            anchor_x - ANCHOR_MARKER_HALF_PX,
            anchor_y - ANCHOR_MARKER_HALF_PX,
            ANCHOR_MARKER_HALF_PX * 2,
            ANCHOR_MARKER_HALF_PX * 2,
            ANCHOR_MARKER_COLOR,
        );
    }
}

fn draw_bubble(frame: &mut [u8], canvas: Canvas, bubble: &BubbleDesc) {
    if bubble.opacity <= 0.0 {
        return;
    }
    let text_w = text_width(&bubble.text, TEXT_SCALE);
    let box_w = text_w + BUBBLE_PADDING_PX * 2;
    let box_h = line_height(TEXT_SCALE) + BUBBLE_PADDING_PX * 2;
    let anchor_x = round_px(bubble.anchor_px.x);
    let top = round_px(bubble.anchor_px.y) - BUBBLE_LIFT_PX;
    let left = anchor_x - box_w / 2;

    let bg = with_opacity(BUBBLE_BG_COLOR, bubble.opacity);
    let border = with_opacity(BUBBLE_BORDER_COLOR, bubble.opacity);
    fill_rect(frame, canvas, left, top, box_w, box_h, bg);
    outline_rect(frame, canvas, left, top, box_w, box_h, 0, border);
    for row in 0..BUBBLE_ARROW_PX {
        let half = BUBBLE_ARROW_PX - row;
        fill_rect(frame, canvas, anchor_x - half, top + box_h + row, half * 2, 1, bg);
    }
    draw_text(
        frame,
        canvas,
        left + BUBBLE_PADDING_PX,
        top + BUBBLE_PADDING_PX,
        &bubble.text,
        TEXT_SCALE,
        with_opacity(BUBBLE_TEXT_COLOR, bubble.opacity),
    );
}

fn draw_overlay_panel(frame: &mut [u8], canvas: Canvas, lines: &[&String]) {
    let longest = lines
        .iter()
        .map(|line| line.chars().count() as i32)
        .max()
        .unwrap_or(0);
    let panel_w = longest * glyph_advance(TEXT_SCALE) + OVERLAY_PADDING_PX * 2;
    let panel_h = lines.len() as i32 * line_height(TEXT_SCALE) + OVERLAY_PADDING_PX * 2;
    let left = canvas.width as i32 - panel_w - OVERLAY_PADDING_PX;
    fill_rect(frame, canvas, left, OVERLAY_PADDING_PX, panel_w, panel_h, OVERLAY_BG_COLOR);

    let mut y = OVERLAY_PADDING_PX * 2;
    for line in lines {
        draw_text(
            frame,
            canvas,
            left + OVERLAY_PADDING_PX,
            y,
            line,
            TEXT_SCALE,
            OVERLAY_TEXT_COLOR,
        );
        y += line_height(TEXT_SCALE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::GridDesc;
    use crate::geometry::Vec2;

    fn blank(width: u32, height: u32) -> (Vec<u8>, Canvas) {
        (
            vec![0u8; (width * height * 4) as usize],
            Canvas { width, height },
        )
    }

    fn pixel(frame: &[u8], canvas: Canvas, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * canvas.width + x) * 4) as usize;
        [frame[offset], frame[offset + 1], frame[offset + 2], frame[offset + 3]]
    }

    fn sprite_at(x: f32, y: f32, facing: CardinalFacing) -> SpriteDesc {
        SpriteDesc {
            top_left_px: Vec2::new(x, y),
            size_px: 16.0,
            color: [200, 10, 10, 255],
            facing,
            frame_index: 0,
            highlighted: false,
            label: None,
            show_anchor_marker: false,
        }
    }

    #[test]
    fn empty_frame_is_cleared() {
        let (mut frame, canvas) = blank(8, 8);
        draw_frame(&mut frame, canvas, &RenderFrame::default(), None);
        assert_eq!(pixel(&frame, canvas, 3, 3), CLEAR_COLOR);
    }

    #[test]
    fn sprite_body_and_facing_notch_are_drawn() {
        let (mut frame, canvas) = blank(64, 64);
        let desc = RenderFrame {
            sprites: vec![sprite_at(10.0, 10.0, CardinalFacing::Right)],
            ..RenderFrame::default()
        };
        draw_frame(&mut frame, canvas, &desc, None);
        assert_eq!(pixel(&frame, canvas, 11, 12), [200, 10, 10, 255]);
        assert_ne!(pixel(&frame, canvas, 25, 12), [200, 10, 10, 255]);
        assert_ne!(pixel(&frame, canvas, 25, 12), CLEAR_COLOR);
    }

    #[test]
    fn walk_frames_bob_the_sprite() {
        assert_eq!(walk_bob_px(0, 32), 0);
        assert_eq!(walk_bob_px(1, 32), -2);
        assert_eq!(walk_bob_px(3, 32), 2);
        assert_eq!(walk_bob_px(5, 8), -1);
    }

    #[test]
    fn offscreen_content_never_panics() {
        let (mut frame, canvas) = blank(16, 16);
        let desc = RenderFrame {
            grid: Some(GridDesc {
                cell_px: 4.0,
                columns: 100,
                rows: 100,
            }),
            floor_size_px: Some(Vec2::new(1.0e9, 1.0e9)),
            zones: vec![ZoneDesc {
                top_left_px: Vec2::new(-400.0, 900.0),
                size_px: Vec2::new(50.0, 50.0),
                color: [1, 2, 3, 255],
                label: Some("HR".to_string()),
            }],
            sprites: vec![sprite_at(-1000.0, 1000.0, CardinalFacing::Up)],
            bubble: Some(BubbleDesc {
                anchor_px: Vec2::new(8.0, 8.0),
                text: "Hallo! I'm CEO".to_string(),
                opacity: 0.5,
            }),
            overlay_lines: vec!["speed 2.0".to_string()],
        };
        draw_frame(&mut frame, canvas, &desc, Some(&["fps 60".to_string()]));
    }

    #[test]
    fn faded_out_bubble_draws_nothing() {
        let (mut frame, canvas) = blank(32, 64);
        let bubble = BubbleDesc {
            anchor_px: Vec2::new(16.0, 60.0),
            text: "hi".to_string(),
            opacity: 0.0,
        };
        draw_bubble(&mut frame, canvas, &bubble);
        assert!(frame.iter().all(|byte| *byte == 0));
    }
}
