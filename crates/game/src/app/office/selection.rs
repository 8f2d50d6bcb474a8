use super::roster::RoleId;

/// What the tick driver should do with a selection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectionDecision {
    /// Same role as the last processed selection.
    Unchanged,
    Cleared,
    /// Newly selected role: send it to its desk and announce it.
    Trigger(RoleId),
    /// No character with that id; the marker is left alone.
    Unknown(String),
}

/// Remembers the last processed selection so repeated picks of the same role
/// fire only once.
#[derive(Debug, Clone, Default)]
pub(crate) struct SelectionBridge {
    current: Option<RoleId>,
}

impl SelectionBridge {
    pub(crate) fn current(&self) -> Option<&RoleId> {
        self.current.as_ref()
    }

    pub(crate) fn decide(
        &mut self,
        requested: Option<&str>,
        lookup: impl Fn(&str) -> Option<RoleId>,
    ) -> SelectionDecision {
        let Some(requested) = requested else {
            return match self.current.take() {
                Some(_) => SelectionDecision::Cleared,
                None => SelectionDecision::Unchanged,
            };
        };
        if self
            .current
            .as_ref()
            .is_some_and(|current| current.as_str() == requested)
        {
            return SelectionDecision::Unchanged;
        }
        match lookup(requested) {
            Some(role) => {
                self.current = Some(role.clone());
                SelectionDecision::Trigger(role)
            }
            None => SelectionDecision::Unknown(requested.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(id: &str) -> Option<RoleId> {
        ["CEO", "DEVELOPER", "HR", "MANAGER"]
            .contains(&id)
            .then(|| RoleId::new(id))
    }

    #[test]
    fn repeated_selection_triggers_once() {
        let mut bridge = SelectionBridge::default();
        assert_eq!(
            bridge.decide(Some("HR"), known),
            SelectionDecision::Trigger(RoleId::new("HR"))
        );
        assert_eq!(bridge.decide(Some("HR"), known), SelectionDecision::Unchanged);
        assert_eq!(bridge.current().map(RoleId::as_str), Some("HR"));
    }

    #[test]
    fn clearing_allows_reselection() {
        let mut bridge = SelectionBridge::default();
        bridge.decide(Some("CEO"), known);
        assert_eq!(bridge.decide(None, known), SelectionDecision::Cleared);
        assert_eq!(bridge.decide(None, known), SelectionDecision::Unchanged);
        assert_eq!(
            bridge.decide(Some("CEO"), known),
            SelectionDecision::Trigger(RoleId::new("CEO"))
        );
    }

    #[test]
    fn switching_roles_triggers_the_new_one() {
        let mut bridge = SelectionBridge::default();
        bridge.decide(Some("DEVELOPER"), known);
        assert_eq!(
            bridge.decide(Some("HR"), known),
            SelectionDecision::Trigger(RoleId::new("HR"))
        );
    }

    #[test]
    fn unknown_role_leaves_marker_untouched() {
        let mut bridge = SelectionBridge::default();
        bridge.decide(Some("CEO"), known);
        assert_eq!(
            bridge.decide(Some("JANITOR"), known),
            SelectionDecision::Unknown("JANITOR".to_string())
        );
        assert_eq!(bridge.current().map(RoleId::as_str), Some("CEO"));
    }
}
