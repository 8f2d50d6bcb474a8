use office_engine::Vec2;

use super::roster::RoleId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BubblePhase {
    Visible,
    Fading { opacity: f32 },
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
struct Bubble {
    owner: RoleId,
    text: String,
    shown_at: u64,
    anchor_tile: Vec2,
}

/// The single transient speech bubble. A new bubble replaces the old one.
#[derive(Debug, Clone)]
pub(crate) struct BubbleBoard {
    visible_ms: u64,
    fade_ms: u64,
    active: Option<Bubble>,
}

/// Bubble as the scene should draw it this frame.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BubbleView<'a> {
    pub(crate) text: &'a str,
    pub(crate) anchor_tile: Vec2,
    pub(crate) opacity: f32,
}

impl BubbleBoard {
    pub(crate) fn new(visible_ms: u64, fade_ms: u64) -> Self {
        Self {
            visible_ms,
            fade_ms,
            active: None,
        }
    }

    pub(crate) fn show(&mut self, owner: RoleId, text: String, anchor_tile: Vec2, now: u64) {
        self.active = Some(Bubble {
            owner,
            text,
            shown_at: now,
            anchor_tile,
        });
    }

    pub(crate) fn owner(&self) -> Option<&RoleId> {
        self.active.as_ref().map(|bubble| &bubble.owner)
    }

    /// Moves the bubble with its owner.
    pub(crate) fn follow(&mut self, anchor_tile: Vec2) {
        if let Some(bubble) = &mut self.active {
            bubble.anchor_tile = anchor_tile;
        }
    }

    pub(crate) fn phase(&self, now: u64) -> BubblePhase {
        let Some(bubble) = &self.active else {
            return BubblePhase::Expired;
        };
        let age = now.saturating_sub(bubble.shown_at);
        if age < self.visible_ms {
            return BubblePhase::Visible;
        }
        let fading_for = age - self.visible_ms;
        if fading_for >= self.fade_ms {
            return BubblePhase::Expired;
        }
        BubblePhase::Fading {
            opacity: 1.0 - fading_for as f32 / self.fade_ms as f32,
        }
    }

    /// Drops the bubble once it has fully faded.
    pub(crate) fn expire(&mut self, now: u64) -> bool {
        if self.active.is_some() && self.phase(now) == BubblePhase::Expired {
            self.active = None;
            return true;
        }
        false
    }

    pub(crate) fn view(&self, now: u64) -> Option<BubbleView<'_>> {
        let opacity = match self.phase(now) {
            BubblePhase::Visible => 1.0,
            BubblePhase::Fading { opacity } => opacity,
            BubblePhase::Expired => return None,
        };
        let bubble = self.active.as_ref()?;
        Some(BubbleView {
            text: &bubble.text,
            anchor_tile: bubble.anchor_tile,
            opacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_bubble() -> BubbleBoard {
        let mut board = BubbleBoard::new(2500, 300);
        board.show(
            RoleId::new("CEO"),
            "Hallo! I'm CEO".to_string(),
            Vec2::new(4.5, 22.5),
            1000,
        );
        board
    }

    #[test]
    fn bubble_is_visible_then_fades_then_expires() {
        let board = board_with_bubble();
        assert_eq!(board.phase(1000), BubblePhase::Visible);
        assert_eq!(board.phase(3499), BubblePhase::Visible);
        assert_eq!(board.phase(3650), BubblePhase::Fading { opacity: 0.5 });
        assert_eq!(board.phase(3800), BubblePhase::Expired);
        assert!(board.view(3800).is_none());
    }

    #[test]
    fn bubble_follows_owner_and_expires_once() {
        let mut board = board_with_bubble();
        board.follow(Vec2::new(2.0, 24.0));
        let view = board.view(2000).expect("visible");
        assert_eq!(view.anchor_tile, Vec2::new(2.0, 24.0));
        assert_eq!(view.opacity, 1.0);
        assert_eq!(board.owner().map(RoleId::as_str), Some("CEO"));

        assert!(!board.expire(3000));
        assert!(board.expire(4000));
        assert!(!board.expire(4000));
        assert_eq!(board.owner(), None);
    }

    #[test]
    fn new_bubble_replaces_old_and_restarts_timer() {
        let mut board = board_with_bubble();
        board.show(
            RoleId::new("HR"),
            "Hallo! I'm HR".to_string(),
            Vec2::new(4.5, 16.0),
            3400,
        );
        let view = board.view(5000).expect("second bubble still visible");
        assert_eq!(view.text, "Hallo! I'm HR");
        assert_eq!(board.owner().map(RoleId::as_str), Some("HR"));
    }
}
