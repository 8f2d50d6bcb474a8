use office_engine::CardinalFacing;
use serde::Deserialize;

use super::rng::RandomSource;

/// Role-specific facing habit layered over the generic desk cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum DeskQuirk {
    #[default]
    None,
    /// Looks left or right for one second out of every eight.
    Executive,
    /// Glances up briefly every six seconds, otherwise mostly faces down.
    Developer,
    /// Looks to a random side for one second out of every five.
    PeopleOps,
    /// Looks around for two seconds out of every seven, otherwise faces down.
    Manager,
}

impl DeskQuirk {
    /// Facing this habit imposes `seconds` after desk entry, if its window is
    /// active.
    pub(crate) fn facing_override(
        self,
        seconds: f64,
        rng: &mut dyn RandomSource,
    ) -> Option<CardinalFacing> {
        match self {
            DeskQuirk::None => None,
            DeskQuirk::Executive => (seconds % 8.0 < 1.0).then(|| {
                if seconds % 16.0 < 8.0 {
                    CardinalFacing::Left
                } else {
                    CardinalFacing::Right
                }
            }),
            DeskQuirk::Developer => {
                if seconds % 6.0 < 0.5 {
                    Some(CardinalFacing::Up)
                } else if seconds % 3.0 < 2.0 {
                    Some(CardinalFacing::Down)
                } else {
                    None
                }
            }
            DeskQuirk::PeopleOps => (seconds % 5.0 < 1.0).then(|| {
                if rng.unit() < 0.5 {
                    CardinalFacing::Left
                } else {
                    CardinalFacing::Right
                }
            }),
            DeskQuirk::Manager => {
                if seconds % 7.0 < 2.0 {
                    if seconds % 14.0 < 7.0 {
                        Some(CardinalFacing::Left)
                    } else {
                        Some(CardinalFacing::Right)
                    }
                } else {
                    Some(CardinalFacing::Down)
                }
            }
        }
    }

    pub(crate) fn as_token(self) -> &'static str {
        match self {
            DeskQuirk::None => "none",
            DeskQuirk::Executive => "executive",
            DeskQuirk::Developer => "developer",
            DeskQuirk::PeopleOps => "peopleOps",
            DeskQuirk::Manager => "manager",
        }
    }
}

/// Per-role behaviour constants, fixed when the character is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RoleProfile {
    pub(crate) personality: f32,
    pub(crate) roam_radius: f32,
    pub(crate) quirk: DeskQuirk,
}

impl Default for RoleProfile {
    fn default() -> Self {
        Self {
            personality: 0.5,
            roam_radius: 2.0,
            quirk: DeskQuirk::None,
        }
    }
}

/// Optional per-role profile fields from roster configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ProfileOverrides {
    pub(crate) personality: Option<f32>,
    pub(crate) roam_radius: Option<f32>,
    pub(crate) quirk: Option<DeskQuirk>,
}

impl RoleProfile {
    /// Stock profile for a role id; unknown ids get the neutral default.
    pub(crate) fn for_role_id(role_id: &str) -> Self {
        match role_id {
            "CEO" => Self {
                personality: 0.3,
                roam_radius: 2.0,
                quirk: DeskQuirk::Executive,
            },
            "DEVELOPER" => Self {
                personality: 0.8,
                roam_radius: 3.0,
                quirk: DeskQuirk::Developer,
            },
            "HR" => Self {
                personality: 0.6,
                roam_radius: 2.5,
                quirk: DeskQuirk::PeopleOps,
            },
            "MANAGER" => Self {
                personality: 0.7,
                roam_radius: 3.0,
                quirk: DeskQuirk::Manager,
            },
            _ => Self::default(),
        }
    }

    pub(crate) fn with_overrides(self, overrides: &ProfileOverrides) -> Self {
        Self {
            personality: overrides.personality.unwrap_or(self.personality),
            roam_radius: overrides.roam_radius.unwrap_or(self.roam_radius),
            quirk: overrides.quirk.unwrap_or(self.quirk),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::office::rng::ScriptedRandom;

    #[test]
    fn stock_profiles_follow_role_table() {
        let ceo = RoleProfile::for_role_id("CEO");
        assert_eq!(ceo.personality, 0.3);
        assert_eq!(ceo.quirk, DeskQuirk::Executive);
        assert_eq!(RoleProfile::for_role_id("HR").roam_radius, 2.5);
        assert_eq!(RoleProfile::for_role_id("INTERN"), RoleProfile::default());
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let profile = RoleProfile::for_role_id("DEVELOPER").with_overrides(&ProfileOverrides {
            personality: Some(0.1),
            roam_radius: None,
            quirk: Some(DeskQuirk::None),
        });
        assert_eq!(profile.personality, 0.1);
        assert_eq!(profile.roam_radius, 3.0);
        assert_eq!(profile.quirk, DeskQuirk::None);
    }

    #[test]
    fn executive_alternates_sides_on_sixteen_second_cycle() {
        let mut rng = ScriptedRandom::new(&[0.0]);
        assert_eq!(
            DeskQuirk::Executive.facing_override(0.5, &mut rng),
            Some(CardinalFacing::Left)
        );
        assert_eq!(DeskQuirk::Executive.facing_override(3.0, &mut rng), None);
        assert_eq!(
            DeskQuirk::Executive.facing_override(8.5, &mut rng),
            Some(CardinalFacing::Right)
        );
    }

    #[test]
    fn developer_glances_up_then_codes() {
        let mut rng = ScriptedRandom::new(&[0.0]);
        assert_eq!(
            DeskQuirk::Developer.facing_override(6.2, &mut rng),
            Some(CardinalFacing::Up)
        );
        assert_eq!(
            DeskQuirk::Developer.facing_override(7.0, &mut rng),
            Some(CardinalFacing::Down)
        );
        assert_eq!(DeskQuirk::Developer.facing_override(2.5, &mut rng), None);
    }

    #[test]
    fn people_ops_picks_side_from_random_source() {
        let mut rng = ScriptedRandom::new(&[0.2, 0.7]);
        assert_eq!(
            DeskQuirk::PeopleOps.facing_override(5.5, &mut rng),
            Some(CardinalFacing::Left)
        );
        assert_eq!(
            DeskQuirk::PeopleOps.facing_override(10.1, &mut rng),
            Some(CardinalFacing::Right)
        );
        assert_eq!(DeskQuirk::PeopleOps.facing_override(2.0, &mut rng), None);
    }

    #[test]
    fn manager_defaults_to_down_outside_window() {
        let mut rng = ScriptedRandom::new(&[0.0]);
        assert_eq!(
            DeskQuirk::Manager.facing_override(1.0, &mut rng),
            Some(CardinalFacing::Left)
        );
        assert_eq!(
            DeskQuirk::Manager.facing_override(7.5, &mut rng),
            Some(CardinalFacing::Right)
        );
        assert_eq!(
            DeskQuirk::Manager.facing_override(4.0, &mut rng),
            Some(CardinalFacing::Down)
        );
    }
}
