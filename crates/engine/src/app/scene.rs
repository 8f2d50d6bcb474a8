use crate::geometry::{CardinalFacing, Vec2};

use super::input::InputSnapshot;
use super::rendering::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Background grid drawn under everything else, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDesc {
    pub cell_px: f32,
    pub columns: u32,
    pub rows: u32,
}

/// Outlined screen-space rectangle, used for role areas.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDesc {
    pub top_left_px: Vec2,
    pub size_px: Vec2,
    pub color: [u8; 4],
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDesc {
    pub top_left_px: Vec2,
    pub size_px: f32,
    pub color: [u8; 4],
    pub facing: CardinalFacing,
    pub frame_index: u32,
    pub highlighted: bool,
    pub label: Option<String>,
    pub show_anchor_marker: bool,
}

/// Transient text box. `anchor_px` is the owning sprite's screen position;
/// the renderer lifts the box above it.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleDesc {
    pub anchor_px: Vec2,
    pub text: String,
    pub opacity: f32,
}

/// Everything the renderer needs for one frame. Scenes build it fresh each
/// frame; the renderer never reaches back into scene state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    pub grid: Option<GridDesc>,
    pub floor_size_px: Option<Vec2>,
    pub zones: Vec<ZoneDesc>,
    pub sprites: Vec<SpriteDesc>,
    pub bubble: Option<BubbleDesc>,
    pub overlay_lines: Vec<String>,
}

pub trait Scene {
    fn load(&mut self, now_ms: u64);
    fn update(&mut self, now_ms: u64, input: &InputSnapshot) -> SceneCommand;
    fn render(&self, now_ms: u64, viewport: Viewport) -> RenderFrame;
    fn unload(&mut self) {}
    fn debug_title(&self) -> Option<String> {
        None
    }
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self, now_ms: u64) {
        if self.is_loaded {
            return;
        }
        self.scene.load(now_ms);
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, now_ms: u64, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(now_ms, input)
    }

    pub(crate) fn render(&self, now_ms: u64, viewport: Viewport) -> RenderFrame {
        if !self.is_loaded {
            return RenderFrame::default();
        }
        self.scene.render(now_ms, viewport)
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload();
            self.is_loaded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Calls {
        loads: u32,
        updates: Vec<u64>,
        unloads: u32,
    }

    struct RecordingScene {
        calls: Rc<RefCell<Calls>>,
    }

    impl Scene for RecordingScene {
        fn load(&mut self, _now_ms: u64) {
            self.calls.borrow_mut().loads += 1;
        }

        fn update(&mut self, now_ms: u64, _input: &InputSnapshot) -> SceneCommand {
            self.calls.borrow_mut().updates.push(now_ms);
            SceneCommand::None
        }

        fn render(&self, _now_ms: u64, _viewport: Viewport) -> RenderFrame {
            RenderFrame {
                overlay_lines: vec!["hello".to_string()],
                ..RenderFrame::default()
            }
        }

        fn unload(&mut self) {
            self.calls.borrow_mut().unloads += 1;
        }
    }

    fn viewport() -> Viewport {
        Viewport {
            width: 64,
            height: 64,
        }
    }

    #[test]
    fn runtime_loads_once_and_skips_updates_before_load() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut runtime = SceneRuntime::new(Box::new(RecordingScene {
            calls: Rc::clone(&calls),
        }));

        runtime.update(5, &InputSnapshot::empty());
        assert!(runtime.render(5, viewport()).overlay_lines.is_empty());

        runtime.load(10);
        runtime.load(11);
        runtime.update(12, &InputSnapshot::empty());

        let calls = calls.borrow();
        assert_eq!(calls.loads, 1);
        assert_eq!(calls.updates, vec![12]);
    }

    #[test]
    fn shutdown_unloads_only_loaded_scene() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut runtime = SceneRuntime::new(Box::new(RecordingScene {
            calls: Rc::clone(&calls),
        }));
        runtime.shutdown();
        runtime.load(0);
        assert_eq!(runtime.render(0, viewport()).overlay_lines, vec!["hello"]);
        runtime.shutdown();
        runtime.shutdown();
        assert_eq!(calls.borrow().unloads, 1);
    }
}
