use office_engine::{
    distance, ease_in_out_quad, lerp, tile_to_screen_px, CardinalFacing, TileRect, Vec2,
};

use super::config::SimConfig;
use super::desk::{desk_anchor, tinker_pose};
use super::profile::RoleProfile;
use super::rng::RandomSource;
use super::roster::{RoleDefinition, RoleId};

/// Eased straight-line move between two tile positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Glide {
    pub(crate) from: Vec2,
    pub(crate) to: Vec2,
    pub(crate) started_at: u64,
    pub(crate) duration_ms: u64,
}

impl Glide {
    pub(crate) fn progress(&self, now: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at) as f64;
        (elapsed / self.duration_ms as f64).clamp(0.0, 1.0) as f32
    }

    fn position_at(&self, now: u64) -> Vec2 {
        lerp(self.from, self.to, ease_in_out_quad(self.progress(now)))
    }

    fn facing(&self) -> CardinalFacing {
        CardinalFacing::from_delta(self.to.x - self.from.x, self.to.y - self.from.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Locomotion {
    Idle { next_move_at: u64 },
    Roaming(Glide),
    MovingToDesk(Glide),
    AtDesk { entered_at: u64 },
}

impl Locomotion {
    pub(crate) fn as_token(&self) -> &'static str {
        match self {
            Locomotion::Idle { .. } => "idle",
            Locomotion::Roaming(_) => "roaming",
            Locomotion::MovingToDesk(_) => "moving_to_desk",
            Locomotion::AtDesk { .. } => "at_desk",
        }
    }
}

/// Mode transitions worth reporting to the tick driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ModeChange {
    RoamStarted { target: Vec2, duration_ms: u64 },
    RoamFinished,
    ArrivedAtDesk,
}

/// Tile size and zoom used to turn tile positions into canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ViewLayout {
    pub(crate) tile_size_px: f32,
    pub(crate) zoom: f32,
}

/// Everything a renderer needs to draw one character.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RenderPose {
    pub(crate) screen_px: Vec2,
    pub(crate) size_px: f32,
    pub(crate) source_px: (u32, u32),
    pub(crate) facing: CardinalFacing,
    pub(crate) frame_index: u32,
    pub(crate) label: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Character {
    role: RoleDefinition,
    profile: RoleProfile,
    desk_anchor: Vec2,
    position: Vec2,
    facing: CardinalFacing,
    frame_index: u32,
    last_anim_at: u64,
    mode: Locomotion,
}

impl Character {
    /// New character at the centre of its area, facing down and waiting for
    /// its first roam.
    pub(crate) fn spawn(
        role: RoleDefinition,
        config: &SimConfig,
        now: u64,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let profile = role.profile();
        let desk_anchor = desk_anchor(&role.desk, config.desk_inset);
        let position = role.boundary.center();
        Self {
            role,
            profile,
            desk_anchor,
            position,
            facing: CardinalFacing::Down,
            frame_index: 0,
            last_anim_at: now,
            mode: Locomotion::Idle {
                next_move_at: now + roam_pause(config, rng),
            },
        }
    }

    pub(crate) fn role_id(&self) -> &RoleId {
        &self.role.id
    }

    pub(crate) fn role(&self) -> &RoleDefinition {
        &self.role
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn facing(&self) -> CardinalFacing {
        self.facing
    }

    pub(crate) fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub(crate) fn mode(&self) -> &Locomotion {
        &self.mode
    }

    pub(crate) fn boundary(&self) -> &TileRect {
        &self.role.boundary
    }

    /// One simulation step at `now`. Animation first, then movement for the
    /// current mode.
    pub(crate) fn advance(
        &mut self,
        now: u64,
        speed: f32,
        config: &SimConfig,
        rng: &mut dyn RandomSource,
    ) -> Option<ModeChange> {
        self.rebase_if_clock_rewound(now, config);
        self.step_animation(now, config);

        match self.mode {
            Locomotion::AtDesk { entered_at } => {
                let pose = tinker_pose(
                    now.saturating_sub(entered_at),
                    &self.role.desk,
                    &self.profile,
                    config.desk_inset,
                    rng,
                );
                self.position = pose.position;
                self.facing = pose.facing;
                None
            }
            Locomotion::MovingToDesk(glide) => {
                self.position = glide.position_at(now);
                if glide.progress(now) < 1.0 {
                    return None;
                }
                self.position = glide.to;
                self.mode = Locomotion::AtDesk { entered_at: now };
                Some(ModeChange::ArrivedAtDesk)
            }
            Locomotion::Roaming(glide) => {
                self.position = glide.position_at(now);
                if glide.progress(now) < 1.0 {
                    return None;
                }
                self.position = glide.to;
                self.frame_index = 0;
                self.mode = Locomotion::Idle {
                    next_move_at: now + roam_pause(config, rng),
                };
                Some(ModeChange::RoamFinished)
            }
            Locomotion::Idle { next_move_at } if now > next_move_at => {
                Some(self.begin_roam(now, speed, config, rng))
            }
            Locomotion::Idle { .. } => None,
        }
    }

    fn begin_roam(
        &mut self,
        now: u64,
        speed: f32,
        config: &SimConfig,
        rng: &mut dyn RandomSource,
    ) -> ModeChange {
        let boundary = self.role.boundary;
        let target_col = rng.range_inclusive(boundary.min_col, boundary.max_col);
        let target_row = rng.range_inclusive(boundary.min_row, boundary.max_row);
        let target = Vec2::new(target_col as f32, target_row as f32);
        let duration_ms = roam_duration_ms(
            distance(self.position, target),
            speed,
            config.min_roam_duration_ms,
        );
        let glide = Glide {
            from: self.position,
            to: target,
            started_at: now,
            duration_ms,
        };
        self.facing = glide.facing();
        self.mode = Locomotion::Roaming(glide);
        ModeChange::RoamStarted {
            target,
            duration_ms,
        }
    }

    /// Moves a waiting character's next roam to `next_move_at`. Other modes
    /// are left alone.
    pub(crate) fn reschedule_roam(&mut self, next_move_at: u64) {
        if let Locomotion::Idle {
            next_move_at: pending,
        } = &mut self.mode
        {
            *pending = next_move_at;
        }
    }

    /// Abandons whatever the character is doing and glides to its desk.
    pub(crate) fn begin_desk_transition(&mut self, now: u64, config: &SimConfig) {
        let glide = Glide {
            from: self.position,
            to: self.desk_anchor,
            started_at: now,
            duration_ms: config.desk_transition_ms,
        };
        self.facing = glide.facing();
        self.frame_index = 0;
        self.last_anim_at = now;
        self.mode = Locomotion::MovingToDesk(glide);
    }

    /// Sends a desk-bound or seated character back to roaming after a fresh
    /// pause. Returns false when it was already roaming or idle.
    pub(crate) fn resume_roaming(
        &mut self,
        now: u64,
        config: &SimConfig,
        rng: &mut dyn RandomSource,
    ) -> bool {
        match self.mode {
            Locomotion::Idle { .. } | Locomotion::Roaming(_) => false,
            Locomotion::MovingToDesk(_) | Locomotion::AtDesk { .. } => {
                self.frame_index = 0;
                self.mode = Locomotion::Idle {
                    next_move_at: now + roam_pause(config, rng),
                };
                true
            }
        }
    }

    pub(crate) fn render_pose(
        &self,
        layout: &ViewLayout,
        config: &SimConfig,
        with_label: bool,
    ) -> RenderPose {
        let facing_row = match self.facing {
            CardinalFacing::Down | CardinalFacing::Up => 0,
            CardinalFacing::Left | CardinalFacing::Right => 1,
        };
        RenderPose {
            screen_px: tile_to_screen_px(self.position, layout.tile_size_px, layout.zoom),
            size_px: config.frame_width_px as f32 * layout.zoom,
            source_px: (
                self.role.character_index * config.frame_width_px,
                (self.role.row_start + facing_row) * config.frame_height_px,
            ),
            facing: self.facing,
            frame_index: self.frame_index,
            label: with_label.then(|| self.role.name.clone()),
        }
    }

    fn step_animation(&mut self, now: u64, config: &SimConfig) {
        let seated = matches!(self.mode, Locomotion::AtDesk { .. });
        let interval = if seated {
            config.animation_interval_ms.saturating_mul(2)
        } else {
            config.animation_interval_ms
        };
        if now.saturating_sub(self.last_anim_at) <= interval {
            return;
        }
        let walk_frames = config.walk_frame_count.max(1);
        self.frame_index = match self.mode {
            Locomotion::Roaming(_) | Locomotion::AtDesk { .. } => {
                (self.frame_index + 1) % walk_frames
            }
            Locomotion::Idle { .. } | Locomotion::MovingToDesk(_) => 0,
        };
        self.last_anim_at = now;
    }

    /// A clock that jumps backwards restarts the running timers at `now`
    /// instead of freezing the character until the clock catches up. A glide
    /// restarts from the current position so the character does not snap back.
    fn rebase_if_clock_rewound(&mut self, now: u64, config: &SimConfig) {
        if now < self.last_anim_at {
            self.last_anim_at = now;
        }
        match &mut self.mode {
            Locomotion::Roaming(glide) | Locomotion::MovingToDesk(glide) => {
                if now < glide.started_at {
                    glide.from = self.position;
                    glide.started_at = now;
                }
            }
            Locomotion::AtDesk { entered_at } => {
                if now < *entered_at {
                    *entered_at = now;
                }
            }
            Locomotion::Idle { next_move_at } => {
                let latest = now + config.roam_pause_max_ms;
                if *next_move_at > latest {
                    *next_move_at = latest;
                }
            }
        }
    }
}

/// Time to cover `distance` tiles at `speed` tiles per second, never shorter
/// than `min_ms`.
pub(crate) fn roam_duration_ms(distance: f32, speed: f32, min_ms: u64) -> u64 {
    let speed = if speed.is_finite() && speed > 0.0 {
        f64::from(speed)
    } else {
        f64::from(SimConfig::default().character_speed)
    };
    let travel_ms = f64::from(distance.max(0.0)) / speed * 1000.0;
    (travel_ms.round() as u64).max(min_ms)
}

fn roam_pause(config: &SimConfig, rng: &mut dyn RandomSource) -> u64 {
    rng.duration_ms(config.roam_pause_min_ms, config.roam_pause_max_ms)
}
