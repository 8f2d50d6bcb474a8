use std::collections::VecDeque;

use office_engine::{
    tile_to_screen_px, BubbleDesc, GridDesc, InputAction, InputSnapshot, RenderFrame, Scene,
    SceneCommand, SpriteDesc, Vec2, Viewport, ZoneDesc,
};
use tracing::{debug, info};

use super::character::ViewLayout;
use super::config::CHARACTER_SPEED_STEP;
use super::rng::RandomSource;
use super::roster::{RoleDefinition, RoleId};
use super::simulation::{SimEvent, Simulation};

const CHAT_LOG_CAPACITY: usize = 50;
const CHAT_OVERLAY_LINES: usize = 4;
const SYSTEM_SENDER: &str = "System";
const SYSTEM_GREETING: [&str; 2] = [
    "Office Chat System Online",
    "Select an agent above to chat directly, or chat without selecting for Supreme Agent routing",
];
pub(crate) const MIN_ZOOM: f32 = 0.5;
pub(crate) const MAX_ZOOM: f32 = 3.0;
const ZOOM_STEP: f32 = 0.25;

/// Viewer toggles. Speed lives in the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DisplaySettings {
    pub(crate) show_grid: bool,
    pub(crate) show_characters: bool,
    pub(crate) show_boundaries: bool,
    pub(crate) animation_enabled: bool,
    pub(crate) zoom: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_grid: false,
            show_characters: true,
            show_boundaries: false,
            animation_enabled: true,
            zoom: 1.0,
        }
    }
}

impl DisplaySettings {
    fn step_zoom(&mut self, delta: f32) {
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChatLine {
    pub(crate) sender: String,
    pub(crate) text: String,
}

/// Newest-last chat history, bounded to the last few dozen lines.
#[derive(Debug, Clone)]
pub(crate) struct ChatLog {
    lines: VecDeque<ChatLine>,
    capacity: usize,
}

impl ChatLog {
    pub(crate) fn with_greeting(capacity: usize) -> Self {
        let mut log = Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        };
        for text in SYSTEM_GREETING {
            log.push(SYSTEM_SENDER, text);
        }
        log
    }

    pub(crate) fn push(&mut self, sender: &str, text: &str) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(ChatLine {
            sender: sender.to_string(),
            text: text.to_string(),
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.lines.len()
    }

    pub(crate) fn tail(&self, count: usize) -> impl Iterator<Item = &ChatLine> {
        self.lines.iter().skip(self.lines.len().saturating_sub(count))
    }
}

/// Adapts the simulation to the engine: keyboard controls in, frame
/// description out.
pub(crate) struct OfficeScene<R> {
    sim: Simulation<R>,
    display: DisplaySettings,
    chat: ChatLog,
    auto_clear_at: Option<u64>,
    last_selected: Option<RoleId>,
}

impl<R: RandomSource> OfficeScene<R> {
    pub(crate) fn new(sim: Simulation<R>) -> Self {
        Self {
            sim,
            display: DisplaySettings::default(),
            chat: ChatLog::with_greeting(CHAT_LOG_CAPACITY),
            auto_clear_at: None,
            last_selected: None,
        }
    }

    pub(crate) fn display(&self) -> &DisplaySettings {
        &self.display
    }

    pub(crate) fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub(crate) fn simulation(&self) -> &Simulation<R> {
        &self.sim
    }

    fn layout(&self) -> ViewLayout {
        ViewLayout {
            tile_size_px: self.sim.roster().floor().tile_size_px,
            zoom: self.display.zoom,
        }
    }

    fn apply_toggles(&mut self, input: &InputSnapshot) {
        let settings = &mut self.display;
        if input.was_pressed(InputAction::ToggleGrid) {
            settings.show_grid = !settings.show_grid;
            info!(enabled = settings.show_grid, "grid_toggled");
        }
        if input.was_pressed(InputAction::ToggleCharacters) {
            settings.show_characters = !settings.show_characters;
            info!(enabled = settings.show_characters, "characters_toggled");
        }
        if input.was_pressed(InputAction::ToggleBoundaries) {
            settings.show_boundaries = !settings.show_boundaries;
            info!(enabled = settings.show_boundaries, "boundaries_toggled");
        }
        if input.was_pressed(InputAction::ToggleAnimation) {
            settings.animation_enabled = !settings.animation_enabled;
            info!(enabled = settings.animation_enabled, "animation_toggled");
        }
        if input.was_pressed(InputAction::ZoomIn) {
            settings.step_zoom(ZOOM_STEP);
            info!(zoom = settings.zoom, "zoom_changed");
        }
        if input.was_pressed(InputAction::ZoomOut) {
            settings.step_zoom(-ZOOM_STEP);
            info!(zoom = settings.zoom, "zoom_changed");
        }
        if input.was_pressed(InputAction::SpeedUp) {
            let speed = self.sim.set_speed(self.sim.speed() + CHARACTER_SPEED_STEP);
            info!(speed, "speed_changed");
        }
        if input.was_pressed(InputAction::SpeedDown) {
            let speed = self.sim.set_speed(self.sim.speed() - CHARACTER_SPEED_STEP);
            info!(speed, "speed_changed");
        }
    }

    fn apply_selection(&mut self, now_ms: u64, input: &InputSnapshot) {
        if let Some(slot) = input.selected_slot() {
            let role = self
                .sim
                .roster()
                .role_at(usize::from(slot))
                .map(|role| role.id.clone());
            match role {
                Some(role) => {
                    self.sim.select_role(Some(role.as_str()), now_ms);
                    self.auto_clear_at =
                        Some(now_ms + self.sim.config().selection_auto_clear_ms);
                    self.last_selected = Some(role);
                }
                None => debug!(slot, "slot_unassigned"),
            }
        }

        if input.was_pressed(InputAction::ClearSelection) {
            self.sim.select_role(None, now_ms);
            self.auto_clear_at = None;
        }

        if self.auto_clear_at.is_some_and(|deadline| now_ms >= deadline) {
            debug!("selection_auto_cleared");
            self.sim.select_role(None, now_ms);
            self.auto_clear_at = None;
        }

        if input.was_pressed(InputAction::ResumeRoaming) {
            match &self.last_selected {
                Some(role) => {
                    self.sim.resume_roaming(role.as_str(), now_ms);
                }
                None => debug!("resume_without_selection"),
            }
        }
    }

    fn record_events(&mut self) {
        for event in self.sim.drain_events() {
            match event {
                SimEvent::Selected(notice) => {
                    info!(
                        role = %notice.role,
                        sender = notice.sender.as_str(),
                        message = notice.message.as_str(),
                        "chat_notice"
                    );
                    self.chat.push(&notice.sender, &notice.message);
                }
                SimEvent::DeskReached { role } => debug!(role = %role, "desk_event"),
                SimEvent::RoamingResumed { role } => debug!(role = %role, "resume_event"),
            }
        }
    }

    fn zones(&self, layout: &ViewLayout) -> Vec<ZoneDesc> {
        let scale = layout.tile_size_px * layout.zoom;
        self.sim
            .roster()
            .roles()
            .iter()
            .map(|role| {
                let boundary = role.boundary;
                ZoneDesc {
                    top_left_px: tile_to_screen_px(
                        Vec2::new(boundary.min_col as f32, boundary.min_row as f32),
                        layout.tile_size_px,
                        layout.zoom,
                    ),
                    size_px: Vec2::new(
                        (boundary.max_col - boundary.min_col) as f32 * scale,
                        (boundary.max_row - boundary.min_row) as f32 * scale,
                    ),
                    color: role.color,
                    label: Some(role.name.clone()),
                }
            })
            .collect()
    }

    fn sprites(&self, layout: &ViewLayout) -> Vec<SpriteDesc> {
        let show_debug = self.display.show_boundaries;
        let selected = self.sim.selected();
        self.sim
            .poses(layout, show_debug)
            .into_iter()
            .zip(self.sim.characters())
            .map(|(pose, character)| {
                SpriteDesc {
                    top_left_px: pose.screen_px,
                    size_px: pose.size_px,
                    color: character.role().color,
                    facing: pose.facing,
                    frame_index: pose.frame_index,
                    highlighted: selected == Some(character.role_id()),
                    label: pose.label,
                    show_anchor_marker: show_debug,
                }
            })
            .collect()
    }

    fn selected_role(&self) -> Option<&RoleDefinition> {
        let id = self.sim.selected()?;
        self.sim
            .character(id.as_str())
            .map(|character| character.role())
    }

    fn overlay_lines(&self) -> Vec<String> {
        let display = &self.display;
        let mut lines = vec![format!(
            "speed {:.1}  zoom {:.2}  anim {}",
            self.sim.speed(),
            display.zoom,
            if display.animation_enabled { "on" } else { "paused" },
        )];
        if let Some(role) = self.selected_role() {
            lines.push(format!("{}: {}", role.title, role.description));
        }
        lines.extend(
            self.chat
                .tail(CHAT_OVERLAY_LINES)
                .map(|line| format!("{}: {}", line.sender, line.text)),
        );
        lines
    }
}

impl<R: RandomSource> Scene for OfficeScene<R> {
    fn load(&mut self, now_ms: u64) {
        self.sim.restart(now_ms);
        self.auto_clear_at = None;
        self.last_selected = None;
        info!(
            roles = self.sim.roster().len(),
            greeting_lines = self.chat.len(),
            "office_scene_loaded"
        );
    }

    fn update(&mut self, now_ms: u64, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() || input.was_pressed(InputAction::Quit) {
            return SceneCommand::Quit;
        }

        self.apply_toggles(input);
        self.apply_selection(now_ms, input);
        if self.display.animation_enabled {
            self.sim.tick(now_ms);
        } else {
            self.sim.tick_transitions(now_ms);
        }
        self.record_events();
        SceneCommand::None
    }

    fn render(&self, now_ms: u64, _viewport: Viewport) -> RenderFrame {
        let layout = self.layout();
        let floor = self.sim.roster().floor();
        let cell_px = layout.tile_size_px * layout.zoom;

        RenderFrame {
            grid: self.display.show_grid.then_some(GridDesc {
                cell_px,
                columns: floor.width_tiles,
                rows: floor.height_tiles,
            }),
            floor_size_px: Some(Vec2::new(
                floor.width_tiles as f32 * cell_px,
                floor.height_tiles as f32 * cell_px,
            )),
            zones: if self.display.show_boundaries {
                self.zones(&layout)
            } else {
                Vec::new()
            },
            sprites: if self.display.show_characters {
                self.sprites(&layout)
            } else {
                Vec::new()
            },
            bubble: self
                .sim
                .bubble_request(now_ms, &layout)
                .map(|bubble| BubbleDesc {
                    anchor_px: bubble.anchor_px,
                    text: bubble.text,
                    opacity: bubble.opacity,
                }),
            overlay_lines: self.overlay_lines(),
        }
    }

    fn unload(&mut self) {
        info!(chat_lines = self.chat.len(), "office_scene_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        let selected = self
            .selected_role()
            .map(|role| format!("{} ({})", role.id, role.title))
            .unwrap_or_else(|| "none".to_string());
        Some(format!(
            "selected: {selected} | speed: {:.1} | zoom: {:.2}",
            self.sim.speed(),
            self.display.zoom
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::office::character::Locomotion;
    use crate::app::office::config::SimConfig;
    use crate::app::office::rng::ScriptedRandom;
    use crate::app::office::roster::default_roster;

    fn loaded_scene() -> OfficeScene<ScriptedRandom> {
        let sim = Simulation::new(
            default_roster(),
            SimConfig::default(),
            ScriptedRandom::new(&[0.5]),
            0,
        );
        let mut scene = OfficeScene::new(sim);
        scene.load(0);
        scene
    }

    fn viewport() -> Viewport {
        Viewport {
            width: 1280,
            height: 720,
        }
    }

    fn press(action: InputAction) -> InputSnapshot {
        InputSnapshot::empty().with_action_pressed(action)
    }

    fn slot(index: u8) -> InputSnapshot {
        InputSnapshot::empty().with_selected_slot(Some(index))
    }

    #[test]
    fn default_display_matches_startup_state() {
        let scene = loaded_scene();
        assert_eq!(scene.display(), &DisplaySettings::default());
        assert!(!scene.display().show_grid);
        assert!(scene.display().show_characters);
        assert_eq!(scene.chat().len(), 2);

        let frame = scene.render(0, viewport());
        assert!(frame.grid.is_none());
        assert!(frame.zones.is_empty());
        assert_eq!(frame.sprites.len(), 4);
        assert_eq!(frame.floor_size_px, Some(Vec2::new(704.0, 448.0)));
    }

    #[test]
    fn digit_selection_moves_character_and_logs_chat() {
        let mut scene = loaded_scene();
        scene.update(100, &slot(1));

        let developer = scene
            .simulation()
            .character("DEVELOPER")
            .expect("developer");
        assert!(matches!(developer.mode(), Locomotion::MovingToDesk(_)));
        let last = scene.chat().tail(1).next().expect("chat line");
        assert_eq!(last.sender, "DEVELOPER");
        assert_eq!(last.text, "Hallo! I'm Developer");

        let frame = scene.render(100, viewport());
        let bubble = frame.bubble.expect("bubble");
        assert_eq!(bubble.text, "Hallo! I'm Developer");
        assert!(frame.sprites[1].highlighted);
        assert!(!frame.sprites[0].highlighted);
    }

    #[test]
    fn selection_auto_clears_and_can_retrigger() {
        let mut scene = loaded_scene();
        scene.update(0, &slot(0));
        scene.update(1500, &InputSnapshot::empty());
        scene.update(1999, &InputSnapshot::empty());
        assert!(scene.simulation().selected().is_some());

        scene.update(2000, &InputSnapshot::empty());
        assert_eq!(scene.simulation().selected(), None);

        scene.update(2100, &slot(0));
        let ceo = scene.simulation().character("CEO").expect("ceo");
        assert!(matches!(ceo.mode(), Locomotion::MovingToDesk(_)));
        assert_eq!(scene.chat().len(), 4);
    }

    #[test]
    fn clear_selection_key_drops_highlight() {
        let mut scene = loaded_scene();
        scene.update(0, &slot(2));
        scene.update(16, &press(InputAction::ClearSelection));
        assert_eq!(scene.simulation().selected(), None);
        let frame = scene.render(16, viewport());
        assert!(frame.sprites.iter().all(|sprite| !sprite.highlighted));
    }

    #[test]
    fn out_of_range_slot_is_ignored() {
        let mut scene = loaded_scene();
        scene.update(0, &slot(8));
        assert_eq!(scene.simulation().selected(), None);
        assert_eq!(scene.chat().len(), 2);
    }

    #[test]
    fn resume_key_sends_last_selected_back_to_roaming() {
        let mut scene = loaded_scene();
        scene.update(0, &slot(3));
        scene.update(1500, &InputSnapshot::empty());
        scene.update(2500, &press(InputAction::ResumeRoaming));
        let manager = scene.simulation().character("MANAGER").expect("manager");
        assert!(matches!(manager.mode(), Locomotion::Idle { .. }));
    }

    #[test]
    fn toggles_zoom_and_speed_are_clamped() {
        let mut scene = loaded_scene();
        scene.update(0, &press(InputAction::ToggleGrid));
        scene.update(0, &press(InputAction::ToggleBoundaries));
        for _ in 0..20 {
            scene.update(0, &press(InputAction::ZoomIn));
            scene.update(0, &press(InputAction::SpeedUp));
        }
        assert_eq!(scene.display().zoom, MAX_ZOOM);
        assert_eq!(scene.simulation().speed(), 5.0);

        let frame = scene.render(0, viewport());
        let grid = frame.grid.expect("grid");
        assert_eq!(grid.cell_px, 48.0);
        assert_eq!(frame.zones.len(), 4);
        assert_eq!(frame.zones[0].top_left_px, Vec2::new(48.0, 960.0));
        assert_eq!(frame.zones[0].size_px, Vec2::new(336.0, 240.0));
        assert!(frame.sprites.iter().all(|sprite| sprite.show_anchor_marker));
        assert_eq!(frame.sprites[0].label.as_deref(), Some("CEO"));

        for _ in 0..20 {
            scene.update(0, &press(InputAction::ZoomOut));
            scene.update(0, &press(InputAction::SpeedDown));
        }
        assert_eq!(scene.display().zoom, MIN_ZOOM);
        assert_eq!(scene.simulation().speed(), 0.5);
    }

    #[test]
    fn paused_animation_still_glides_selected_character_to_desk() {
        let mut scene = loaded_scene();
        scene.update(0, &press(InputAction::ToggleAnimation));
        scene.update(0, &slot(0));

        scene.update(750, &InputSnapshot::empty());
        let ceo = scene.simulation().character("CEO").expect("ceo");
        assert!(matches!(ceo.mode(), Locomotion::MovingToDesk(_)));
        let midway = ceo.position();
        assert!((midway.x - 3.25).abs() < 1e-4 && (midway.y - 23.25).abs() < 1e-4);

        scene.update(1500, &InputSnapshot::empty());
        let ceo = scene.simulation().character("CEO").expect("ceo");
        assert!(matches!(ceo.mode(), Locomotion::AtDesk { .. }));
        assert_eq!(ceo.position(), Vec2::new(2.0, 24.0));

        // Everyone else stays frozen while paused.
        scene.update(2600, &InputSnapshot::empty());
        let developer = scene
            .simulation()
            .character("DEVELOPER")
            .expect("developer");
        assert_eq!(
            developer.mode(),
            &Locomotion::Idle {
                next_move_at: 2000
            }
        );
        assert_eq!(developer.position(), Vec2::new(30.0, 9.0));
        let ceo = scene.simulation().character("CEO").expect("ceo");
        assert_eq!(ceo.position(), Vec2::new(2.0, 24.0));
    }

    #[test]
    fn hiding_characters_drops_sprites() {
        let mut scene = loaded_scene();
        scene.update(0, &press(InputAction::ToggleCharacters));
        assert!(scene.render(0, viewport()).sprites.is_empty());
    }

    #[test]
    fn quit_action_ends_loop() {
        let mut scene = loaded_scene();
        assert_eq!(
            scene.update(0, &press(InputAction::Quit)),
            SceneCommand::Quit
        );
    }

    #[test]
    fn chat_log_keeps_newest_lines() {
        let mut log = ChatLog::with_greeting(3);
        log.push("CEO", "one");
        log.push("CEO", "two");
        assert_eq!(log.len(), 3);
        let texts = log.tail(10).map(|line| line.text.as_str()).collect::<Vec<_>>();
        assert_eq!(
            texts,
            [
                "Select an agent above to chat directly, or chat without selecting for Supreme Agent routing",
                "one",
                "two",
            ]
        );
    }

    #[test]
    fn selected_role_shows_title_and_description() {
        let mut scene = loaded_scene();
        scene.update(0, &slot(2));
        let lines = scene.overlay_lines();
        assert_eq!(lines[1], "Human Resources: HR department");
        assert_eq!(
            scene.debug_title().as_deref(),
            Some("selected: HR (Human Resources) | speed: 2.0 | zoom: 1.00")
        );
    }

    #[test]
    fn overlay_shows_settings_and_recent_chat() {
        let scene = loaded_scene();
        let lines = scene.overlay_lines();
        assert_eq!(lines[0], "speed 2.0  zoom 1.00  anim on");
        assert_eq!(lines[1], "System: Office Chat System Online");
        assert_eq!(
            scene.debug_title().as_deref(),
            Some("selected: none | speed: 2.0 | zoom: 1.00")
        );
    }
}
