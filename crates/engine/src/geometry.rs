use serde::{Deserialize, Serialize};

/// Continuous position in tile units. `x` grows to the right (columns),
/// `y` grows downward (rows).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CardinalFacing {
    #[default]
    Down,
    Up,
    Left,
    Right,
}

impl CardinalFacing {
    /// Facing for a planned movement: the dominant axis wins, ties go vertical.
    pub fn from_delta(dx: f32, dy: f32) -> Self {
        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Self::Right
            } else {
                Self::Left
            }
        } else if dy > 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Inclusive tile rectangle as it appears in role configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRect {
    pub min_row: i32,
    pub max_row: i32,
    pub min_col: i32,
    pub max_col: i32,
}

impl TileRect {
    pub const fn new(min_row: i32, max_row: i32, min_col: i32, max_col: i32) -> Self {
        Self {
            min_row,
            max_row,
            min_col,
            max_col,
        }
    }

    pub fn has_positive_extent(&self) -> bool {
        self.max_row > self.min_row && self.max_col > self.min_col
    }

    pub fn contains_rect(&self, other: &TileRect) -> bool {
        other.min_row >= self.min_row
            && other.max_row <= self.max_row
            && other.min_col >= self.min_col
            && other.max_col <= self.max_col
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: (self.min_col + self.max_col) as f32 / 2.0,
            y: (self.min_row + self.max_row) as f32 / 2.0,
        }
    }

    pub fn floored_center(&self) -> Vec2 {
        let center = self.center();
        Vec2 {
            x: center.x.floor(),
            y: center.y.floor(),
        }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.contains_point_inset(point, 0.0)
    }

    pub fn contains_point_inset(&self, point: Vec2, inset: f32) -> bool {
        point.x >= self.min_col as f32 + inset
            && point.x <= self.max_col as f32 - inset
            && point.y >= self.min_row as f32 + inset
            && point.y <= self.max_row as f32 - inset
    }

    /// Clamps into the rectangle shrunk by `inset` on every side. Never panics,
    /// even when the inset swallows the rectangle.
    pub fn clamp_point_inset(&self, point: Vec2, inset: f32) -> Vec2 {
        Vec2 {
            x: clamp_lenient(
                point.x,
                self.min_col as f32 + inset,
                self.max_col as f32 - inset,
            ),
            y: clamp_lenient(
                point.y,
                self.min_row as f32 + inset,
                self.max_row as f32 - inset,
            ),
        }
    }
}

fn clamp_lenient(value: f32, low: f32, high: f32) -> f32 {
    if !value.is_finite() {
        return low;
    }
    value.max(low).min(high.max(low))
}

pub fn distance(a: Vec2, b: Vec2) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Quadratic ease-in-out over `[0, 1]`. Input outside the range is clamped.
pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = clamp_progress(t);
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

pub fn clamp_progress(t: f32) -> f32 {
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, 1.0)
}

pub fn lerp(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    Vec2 {
        x: from.x + (to.x - from.x) * t,
        y: from.y + (to.y - from.y) * t,
    }
}
