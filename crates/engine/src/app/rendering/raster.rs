//! Clipped RGBA drawing into the `pixels` frame buffer. Every helper is safe
//! to call with coordinates partially or fully outside the frame.

#[derive(Debug, Clone, Copy)]
pub(crate) struct Canvas {
    pub width: u32,
    pub height: u32,
}

pub(crate) fn clear(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

fn pixel_range(canvas: Canvas, x: i32, y: i32, frame_len: usize) -> Option<std::ops::Range<usize>> {
    if x < 0 || y < 0 || x >= canvas.width as i32 || y >= canvas.height as i32 {
        return None;
    }
    let pixel_offset = (y as usize)
        .checked_mul(canvas.width as usize)?
        .checked_add(x as usize)?;
    let start = pixel_offset.checked_mul(4)?;
    let end = start.checked_add(4)?;
    (end <= frame_len).then_some(start..end)
}

/// Source-over blend using the color's alpha channel.
pub(crate) fn blend_pixel(frame: &mut [u8], canvas: Canvas, x: i32, y: i32, color: [u8; 4]) {
    let Some(range) = pixel_range(canvas, x, y, frame.len()) else {
        return;
    };
    let dst = &mut frame[range];
    let alpha = u32::from(color[3]);
    if alpha == 255 {
        dst.copy_from_slice(&color);
        return;
    }
    for channel in 0..3 {
        let src = u32::from(color[channel]);
        let old = u32::from(dst[channel]);
        dst[channel] = ((src * alpha + old * (255 - alpha)) / 255) as u8;
    }
    dst[3] = 255;
}

pub(crate) fn fill_rect(
    frame: &mut [u8],
    canvas: Canvas,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: [u8; 4],
) {
    let start_x = x.max(0);
    let start_y = y.max(0);
    let end_x = x.saturating_add(rect_width).min(canvas.width as i32);
    let end_y = y.saturating_add(rect_height).min(canvas.height as i32);
    for py in start_y..end_y {
        for px in start_x..end_x {
            blend_pixel(frame, canvas, px, py, color);
        }
    }
}

/// Rectangle outline; `dash` > 0 skips every other run of `dash` pixels.
#[allow(clippy::too_many_arguments)]
pub(crate) fn outline_rect(
    frame: &mut [u8],
    canvas: Canvas,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    dash: i32,
    color: [u8; 4],
) {
    if rect_width <= 1 || rect_height <= 1 {
        return;
    }
    let on = |step: i32| dash <= 0 || (step / dash) % 2 == 0;
    let right = x + rect_width - 1;
    let bottom = y + rect_height - 1;
    for step in 0..rect_width {
        if on(step) {
            blend_pixel(frame, canvas, x + step, y, color);
            blend_pixel(frame, canvas, x + step, bottom, color);
        }
    }
    for step in 0..rect_height {
        if on(step) {
            blend_pixel(frame, canvas, x, y + step, color);
            blend_pixel(frame, canvas, right, y + step, color);
        }
    }
}

pub(crate) fn vertical_line(frame: &mut [u8], canvas: Canvas, x: i32, y_end: i32, color: [u8; 4]) {
    for y in 0..y_end.min(canvas.height as i32) {
        blend_pixel(frame, canvas, x, y, color);
    }
}

pub(crate) fn horizontal_line(
    frame: &mut [u8],
    canvas: Canvas,
    y: i32,
    x_end: i32,
    color: [u8; 4],
) {
    for x in 0..x_end.min(canvas.width as i32) {
        blend_pixel(frame, canvas, x, y, color);
    }
}

pub(crate) fn with_opacity(color: [u8; 4], opacity: f32) -> [u8; 4] {
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    [
        color[0],
        color[1],
        color[2],
        (f32::from(color[3]) * opacity).round() as u8,
    ]
}
