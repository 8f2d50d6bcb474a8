/// Timing and sizing constants for the office simulation. `Default` carries
/// the stock values; bootstrap layers env overrides on top.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SimConfig {
    pub(crate) animation_interval_ms: u64,
    pub(crate) walk_frame_count: u32,
    pub(crate) frame_width_px: u32,
    pub(crate) frame_height_px: u32,
    pub(crate) character_speed: f32,
    pub(crate) roam_pause_min_ms: u64,
    pub(crate) roam_pause_max_ms: u64,
    pub(crate) min_roam_duration_ms: u64,
    pub(crate) desk_transition_ms: u64,
    pub(crate) desk_inset: f32,
    pub(crate) bubble_visible_ms: u64,
    pub(crate) bubble_fade_ms: u64,
    pub(crate) selection_auto_clear_ms: u64,
    /// After this long, every waiting character is told to roam soon.
    pub(crate) startup_nudge_after_ms: u64,
    pub(crate) startup_nudge_roam_in_ms: u64,
}

pub(crate) const MIN_CHARACTER_SPEED: f32 = 0.5;
pub(crate) const MAX_CHARACTER_SPEED: f32 = 5.0;
pub(crate) const CHARACTER_SPEED_STEP: f32 = 0.5;

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            animation_interval_ms: 300,
            walk_frame_count: 4,
            frame_width_px: 32,
            frame_height_px: 32,
            character_speed: 2.0,
            roam_pause_min_ms: 1000,
            roam_pause_max_ms: 3000,
            min_roam_duration_ms: 1000,
            desk_transition_ms: 1500,
            desk_inset: 0.2,
            bubble_visible_ms: 2500,
            bubble_fade_ms: 300,
            selection_auto_clear_ms: 2000,
            startup_nudge_after_ms: 1000,
            startup_nudge_roam_in_ms: 500,
        }
    }
}

/// Speeds outside the supported range (or non-finite ones) are pulled back
/// into it.
pub(crate) fn clamp_character_speed(speed: f32) -> f32 {
    if !speed.is_finite() {
        return SimConfig::default().character_speed;
    }
    speed.clamp(MIN_CHARACTER_SPEED, MAX_CHARACTER_SPEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_timings() {
        let config = SimConfig::default();
        assert_eq!(config.animation_interval_ms, 300);
        assert_eq!(config.walk_frame_count, 4);
        assert_eq!(config.desk_transition_ms, 1500);
        assert_eq!(config.character_speed, 2.0);
    }

    #[test]
    fn speed_clamp_handles_extremes() {
        assert_eq!(clamp_character_speed(0.0), MIN_CHARACTER_SPEED);
        assert_eq!(clamp_character_speed(99.0), MAX_CHARACTER_SPEED);
        assert_eq!(clamp_character_speed(f32::NAN), 2.0);
        assert_eq!(clamp_character_speed(3.5), 3.5);
    }
}
