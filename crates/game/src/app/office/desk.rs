//! Idle "tinkering" at the desk: a slow look-around cycle, a gentle sway in
//! the chair, occasional random glances, and the role's own facing habit on
//! top of all of it.

use office_engine::{CardinalFacing, TileRect, Vec2};

use super::profile::RoleProfile;
use super::rng::RandomSource;

const FACING_CYCLE: [CardinalFacing; 4] = [
    CardinalFacing::Down,
    CardinalFacing::Right,
    CardinalFacing::Up,
    CardinalFacing::Left,
];
const GLANCE_CHOICES: [CardinalFacing; 3] = [
    CardinalFacing::Left,
    CardinalFacing::Right,
    CardinalFacing::Up,
];
const CYCLE_BASE_MS: f64 = 2000.0;
const SWAY_AMPLITUDE: f64 = 0.2;
const SWAY_X_PERIOD_MS: f64 = 1500.0;
const SWAY_Y_PERIOD_MS: f64 = 2000.0;
const GLANCE_BASE_INTERVAL_MS: f64 = 5000.0;
const GLANCE_WINDOW_MS: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DeskPose {
    pub(crate) position: Vec2,
    pub(crate) facing: CardinalFacing,
}

/// Where a character parks: the floored desk centre, pulled inside the inset.
pub(crate) fn desk_anchor(desk: &TileRect, inset: f32) -> Vec2 {
    desk.clamp_point_inset(desk.floored_center(), inset)
}

pub(crate) fn tinker_pose(
    elapsed_ms: u64,
    desk: &TileRect,
    profile: &RoleProfile,
    inset: f32,
    rng: &mut dyn RandomSource,
) -> DeskPose {
    let elapsed = elapsed_ms as f64;
    let personality = f64::from(profile.personality);

    let cycle_ms = CYCLE_BASE_MS + personality * CYCLE_BASE_MS;
    let phase = (elapsed / cycle_ms).floor() as usize % FACING_CYCLE.len();
    let mut facing = FACING_CYCLE[phase];

    let center = desk.floored_center();
    let phase_offset = personality * 1000.0;
    let sway_x = ((elapsed + phase_offset) / SWAY_X_PERIOD_MS).sin() * SWAY_AMPLITUDE;
    let sway_y = ((elapsed + phase_offset) / SWAY_Y_PERIOD_MS).cos() * SWAY_AMPLITUDE * 0.5;
    let position = desk.clamp_point_inset(
        Vec2::new(center.x + sway_x as f32, center.y + sway_y as f32),
        inset,
    );

    // Interval is re-rolled on every evaluation.
    let glance_interval = GLANCE_BASE_INTERVAL_MS + rng.unit() * GLANCE_BASE_INTERVAL_MS;
    if elapsed % glance_interval < GLANCE_WINDOW_MS {
        let pick = (rng.unit() * GLANCE_CHOICES.len() as f64).floor() as usize;
        facing = GLANCE_CHOICES[pick.min(GLANCE_CHOICES.len() - 1)];
    }

    if let Some(habit) = profile.quirk.facing_override(elapsed / 1000.0, rng) {
        facing = habit;
    }

    DeskPose { position, facing }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::app::office::profile::DeskQuirk;
    use crate::app::office::rng::ScriptedRandom;

    const DESK: TileRect = TileRect::new(23, 25, 1, 3);

    fn plain_profile() -> RoleProfile {
        RoleProfile {
            personality: 0.5,
            roam_radius: 2.0,
            quirk: DeskQuirk::None,
        }
    }

    #[test]
    fn anchor_is_floored_center_inside_inset() {
        assert_eq!(desk_anchor(&DESK, 0.2), Vec2::new(2.0, 24.0));
        let narrow = TileRect::new(8, 10, 27, 30);
        assert_eq!(desk_anchor(&narrow, 0.2), Vec2::new(28.0, 9.0));
    }

    #[test]
    fn facing_cycles_down_right_up_left() {
        // 0.0 fixes the glance interval at 5000 ms, keeping these samples
        // outside the glance window.
        let mut rng = ScriptedRandom::new(&[0.0]);
        let profile = plain_profile();
        let facings = [1000, 4000, 7000, 9500]
            .map(|elapsed| tinker_pose(elapsed, &DESK, &profile, 0.2, &mut rng).facing);
        assert_eq!(
            facings,
            [
                CardinalFacing::Down,
                CardinalFacing::Right,
                CardinalFacing::Up,
                CardinalFacing::Left,
            ]
        );
    }

    #[test]
    fn glance_window_overrides_cycle() {
        // Interval 5000 ms; 5200 ms falls inside the 500 ms window and the
        // second draw picks the last choice.
        let mut rng = ScriptedRandom::new(&[0.0, 0.9]);
        let pose = tinker_pose(5200, &DESK, &plain_profile(), 0.2, &mut rng);
        assert_eq!(pose.facing, CardinalFacing::Up);
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn role_habit_wins_over_glance() {
        let mut rng = ScriptedRandom::new(&[0.0, 0.0]);
        let profile = RoleProfile {
            quirk: DeskQuirk::Manager,
            ..plain_profile()
        };
        // 5.2 s: glance window active (would pick Left) but the manager habit
        // faces down outside its look-around window.
        let pose = tinker_pose(5200, &DESK, &profile, 0.2, &mut rng);
        assert_eq!(pose.facing, CardinalFacing::Down);
    }

    #[test]
    fn sway_stays_inside_inset_desk() {
        let mut rng = StdRng::seed_from_u64(11);
        for role in ["CEO", "DEVELOPER", "HR", "MANAGER"] {
            let profile = RoleProfile::for_role_id(role);
            for elapsed in (0..120_000).step_by(37) {
                let pose = tinker_pose(elapsed, &DESK, &profile, 0.2, &mut rng);
                assert!(
                    DESK.contains_point_inset(pose.position, 0.2 - 1e-4),
                    "{role} escaped desk at {elapsed} ms: {:?}",
                    pose.position
                );
            }
        }
    }

    #[test]
    fn sway_moves_around_center() {
        let mut rng = ScriptedRandom::new(&[0.5]);
        let profile = plain_profile();
        let first = tinker_pose(0, &DESK, &profile, 0.2, &mut rng).position;
        let later = tinker_pose(1200, &DESK, &profile, 0.2, &mut rng).position;
        assert_ne!(first, later);
        assert!((first.x - 2.0).abs() <= 0.2 && (first.y - 24.0).abs() <= 0.1);
    }
}
