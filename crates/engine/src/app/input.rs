#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    ClearSelection,
    ResumeRoaming,
    ToggleGrid,
    ToggleCharacters,
    ToggleBoundaries,
    ToggleAnimation,
    SpeedUp,
    SpeedDown,
    ZoomIn,
    ZoomOut,
    Quit,
}

const ACTION_COUNT: usize = 11;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, pressed: bool) {
        self.pressed[action.index()] = pressed;
    }

    pub(crate) fn is_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::ClearSelection => 0,
            InputAction::ResumeRoaming => 1,
            InputAction::ToggleGrid => 2,
            InputAction::ToggleCharacters => 3,
            InputAction::ToggleBoundaries => 4,
            InputAction::ToggleAnimation => 5,
            InputAction::SpeedUp => 6,
            InputAction::SpeedDown => 7,
            InputAction::ZoomIn => 8,
            InputAction::ZoomOut => 9,
            InputAction::Quit => 10,
        }
    }
}

/// Edge-triggered input for one frame: every flag is true only on the frame
/// the key went down.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    pressed: ActionStates,
    selected_slot: Option<u8>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        pressed: ActionStates,
        selected_slot: Option<u8>,
    ) -> Self {
        Self {
            quit_requested,
            pressed,
            selected_slot,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_pressed(action)
    }

    /// Zero-based roster slot picked this frame via the digit row.
    pub fn selected_slot(&self) -> Option<u8> {
        self.selected_slot
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.pressed.set(action, true);
        self
    }

    pub fn with_selected_slot(mut self, slot: Option<u8>) -> Self {
        self.selected_slot = slot;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_only_requested_actions() {
        let snapshot = InputSnapshot::empty()
            .with_action_pressed(InputAction::ToggleGrid)
            .with_selected_slot(Some(2));
        assert!(snapshot.was_pressed(InputAction::ToggleGrid));
        assert!(!snapshot.was_pressed(InputAction::ToggleBoundaries));
        assert_eq!(snapshot.selected_slot(), Some(2));
        assert!(!snapshot.quit_requested());
    }

    #[test]
    fn action_indices_are_unique() {
        let all = [
            InputAction::ClearSelection,
            InputAction::ResumeRoaming,
            InputAction::ToggleGrid,
            InputAction::ToggleCharacters,
            InputAction::ToggleBoundaries,
            InputAction::ToggleAnimation,
            InputAction::SpeedUp,
            InputAction::SpeedDown,
            InputAction::ZoomIn,
            InputAction::ZoomOut,
            InputAction::Quit,
        ];
        let mut seen = [false; ACTION_COUNT];
        for action in all {
            assert!(!seen[action.index()], "{action:?} reuses an index");
            seen[action.index()] = true;
        }
        assert!(seen.iter().all(|flag| *flag));
    }
}
