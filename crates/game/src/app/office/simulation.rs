use office_engine::{tile_to_screen_px, Vec2};
use tracing::{debug, info, warn};

use super::bubble::BubbleBoard;
use super::character::{Character, Locomotion, ModeChange, RenderPose, ViewLayout};
use super::config::{clamp_character_speed, SimConfig};
use super::rng::RandomSource;
use super::roster::{RoleId, Roster};
use super::selection::{SelectionBridge, SelectionDecision};

/// One-shot notice for the chat log when a role is newly selected.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectionNotice {
    pub(crate) role: RoleId,
    pub(crate) sender: String,
    pub(crate) message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SimEvent {
    Selected(SelectionNotice),
    DeskReached { role: RoleId },
    RoamingResumed { role: RoleId },
}

/// Speech bubble placement for the current frame, in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BubbleRequest {
    pub(crate) text: String,
    pub(crate) anchor_px: Vec2,
    pub(crate) opacity: f32,
}

/// Owns every character and advances them together. Each `tick` reads one
/// timestamp and applies it to all characters.
pub(crate) struct Simulation<R> {
    config: SimConfig,
    roster: Roster,
    characters: Vec<Character>,
    selection: SelectionBridge,
    bubble: BubbleBoard,
    events: Vec<SimEvent>,
    speed: f32,
    nudge_at: Option<u64>,
    rng: R,
}

impl<R: RandomSource> Simulation<R> {
    pub(crate) fn new(roster: Roster, config: SimConfig, mut rng: R, now: u64) -> Self {
        let characters = spawn_all(&roster, &config, now, &mut rng);
        let speed = clamp_character_speed(config.character_speed);
        let bubble = BubbleBoard::new(config.bubble_visible_ms, config.bubble_fade_ms);
        let nudge_at = Some(now + config.startup_nudge_after_ms);
        info!(
            characters = characters.len(),
            speed,
            "simulation_started"
        );
        Self {
            config,
            roster,
            characters,
            selection: SelectionBridge::default(),
            bubble,
            events: Vec::new(),
            speed,
            nudge_at,
            rng,
        }
    }

    /// Respawns every character at its area centre, as on startup.
    pub(crate) fn restart(&mut self, now: u64) {
        self.characters = spawn_all(&self.roster, &self.config, now, &mut self.rng);
        self.selection = SelectionBridge::default();
        self.bubble = BubbleBoard::new(self.config.bubble_visible_ms, self.config.bubble_fade_ms);
        self.events.clear();
        self.nudge_at = Some(now + self.config.startup_nudge_after_ms);
        info!(characters = self.characters.len(), "simulation_restarted");
    }

    pub(crate) fn config(&self) -> &SimConfig {
        &self.config
    }

    pub(crate) fn roster(&self) -> &Roster {
        &self.roster
    }

    pub(crate) fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub(crate) fn character(&self, role: &str) -> Option<&Character> {
        self.characters
            .iter()
            .find(|character| character.role_id().as_str() == role)
    }

    pub(crate) fn selected(&self) -> Option<&RoleId> {
        self.selection.current()
    }

    pub(crate) fn speed(&self) -> f32 {
        self.speed
    }

    pub(crate) fn set_speed(&mut self, speed: f32) -> f32 {
        self.speed = clamp_character_speed(speed);
        self.speed
    }

    pub(crate) fn tick(&mut self, now: u64) {
        self.advance_characters(now, |_| true);
    }

    /// Advances only the desk glides. Used while animation is paused, so a
    /// selected character still reaches its desk over the transition time.
    pub(crate) fn tick_transitions(&mut self, now: u64) {
        self.advance_characters(now, |character| {
            matches!(character.mode(), Locomotion::MovingToDesk(_))
        });
    }

    fn advance_characters(&mut self, now: u64, include: impl Fn(&Character) -> bool) {
        self.apply_startup_nudge(now);
        for character in &mut self.characters {
            if !include(character) {
                continue;
            }
            let change = character.advance(now, self.speed, &self.config, &mut self.rng);
            match change {
                Some(ModeChange::RoamStarted {
                    target,
                    duration_ms,
                }) => debug!(
                    role = %character.role_id(),
                    target_x = target.x,
                    target_y = target.y,
                    duration_ms,
                    facing = character.facing().as_token(),
                    "roam_started"
                ),
                Some(ModeChange::RoamFinished) => {
                    debug!(role = %character.role_id(), "roam_finished");
                }
                Some(ModeChange::ArrivedAtDesk) => {
                    info!(role = %character.role_id(), "desk_reached");
                    self.events.push(SimEvent::DeskReached {
                        role: character.role_id().clone(),
                    });
                }
                None => {}
            }
        }
        self.refresh_bubble(now);
    }

    /// One-shot kick shortly after startup so nobody stands still for the
    /// whole initial pause.
    fn apply_startup_nudge(&mut self, now: u64) {
        if !self.nudge_at.is_some_and(|due| now >= due) {
            return;
        }
        self.nudge_at = None;
        let next_move_at = now + self.config.startup_nudge_roam_in_ms;
        for character in &mut self.characters {
            character.reschedule_roam(next_move_at);
        }
        debug!(next_move_at, "startup_nudge_applied");
    }

    fn refresh_bubble(&mut self, now: u64) {
        if self.bubble.expire(now) {
            debug!("bubble_expired");
            return;
        }
        let anchor = self
            .bubble
            .owner()
            .and_then(|owner| self.character(owner.as_str()))
            .map(Character::position);
        if let Some(anchor) = anchor {
            self.bubble.follow(anchor);
        }
    }

    /// Applies an external selection. `None` clears the marker without moving
    /// anyone; a new role heads to its desk, gets a bubble and a chat notice.
    pub(crate) fn select_role(&mut self, requested: Option<&str>, now: u64) {
        let characters = &self.characters;
        let decision = self.selection.decide(requested, |id| {
            characters
                .iter()
                .find(|character| character.role_id().as_str() == id)
                .map(|character| character.role_id().clone())
        });

        match decision {
            SelectionDecision::Unchanged => {}
            SelectionDecision::Cleared => info!("selection_cleared"),
            SelectionDecision::Unknown(role) => {
                warn!(role = role.as_str(), "selection_ignored_unknown_role");
            }
            SelectionDecision::Trigger(role) => self.trigger_selection(role, now),
        }
    }

    fn trigger_selection(&mut self, role: RoleId, now: u64) {
        let Some(character) = self
            .characters
            .iter_mut()
            .find(|character| *character.role_id() == role)
        else {
            return;
        };
        let message = format!("Hallo! I'm {}", character.role().name);
        let sender = role.as_str().to_string();
        self.bubble
            .show(role.clone(), message.clone(), character.position(), now);
        character.begin_desk_transition(now, &self.config);
        info!(
            role = %role,
            from_x = character.position().x,
            from_y = character.position().y,
            facing = character.facing().as_token(),
            "desk_transition_started"
        );
        self.events.push(SimEvent::Selected(SelectionNotice {
            role,
            sender,
            message,
        }));
    }

    /// Returns a seated or desk-bound character to roaming. Unknown roles and
    /// characters already roaming are left alone.
    pub(crate) fn resume_roaming(&mut self, role: &str, now: u64) -> bool {
        let Some(character) = self
            .characters
            .iter_mut()
            .find(|character| character.role_id().as_str() == role)
        else {
            warn!(role, "resume_ignored_unknown_role");
            return false;
        };
        if !character.resume_roaming(now, &self.config, &mut self.rng) {
            debug!(role, mode = character.mode().as_token(), "resume_ignored");
            return false;
        }
        info!(role, "roaming_resumed");
        self.events.push(SimEvent::RoamingResumed {
            role: character.role_id().clone(),
        });
        true
    }

    pub(crate) fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn poses(&self, layout: &ViewLayout, with_labels: bool) -> Vec<RenderPose> {
        self.characters
            .iter()
            .map(|character| character.render_pose(layout, &self.config, with_labels))
            .collect()
    }

    pub(crate) fn bubble_request(&self, now: u64, layout: &ViewLayout) -> Option<BubbleRequest> {
        let view = self.bubble.view(now)?;
        Some(BubbleRequest {
            text: view.text.to_string(),
            anchor_px: tile_to_screen_px(view.anchor_tile, layout.tile_size_px, layout.zoom),
            opacity: view.opacity,
        })
    }
}

fn spawn_all(
    roster: &Roster,
    config: &SimConfig,
    now: u64,
    rng: &mut dyn RandomSource,
) -> Vec<Character> {
    roster
        .roles()
        .iter()
        .cloned()
        .map(|role| Character::spawn(role, config, now, rng))
        .collect()
}
