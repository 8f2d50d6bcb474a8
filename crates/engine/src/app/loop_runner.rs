use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::clock::{Clock, MonotonicClock};

use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::scene::SceneRuntime;
use super::{
    InputAction, InputSnapshot, LoopMetricsSnapshot, MetricsHandle, Renderer, Scene, SceneCommand,
};

pub const MAX_RENDER_FPS_ENV_VAR: &str = "OFFICE_MAX_FPS";

const SLOT_KEY_COUNT: usize = 9;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Office".to_string(),
            window_width: 1280,
            window_height: 720,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: Some(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>) -> Result<(), AppError> {
    let metrics_handle = MetricsHandle::default();
    run_app_with_metrics(config, scene, metrics_handle)
}

/// Runs one scene until the window closes. Each redraw reads the clock once
/// and hands that timestamp to both `update` and `render`.
pub fn run_app_with_metrics(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let mut scene = SceneRuntime::new(scene);
    let clock = MonotonicClock::new();

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let effective_render_cap =
        normalize_render_fps_cap(resolve_render_fps_cap(config.max_render_fps));
    let render_frame_target = target_frame_duration(effective_render_cap);
    let mut input_collector = InputCollector::default();

    scene.load(clock.now_ms());
    info!(
        width = config.window_width,
        height = config.window_height,
        "scene_loaded"
    );
    info!(
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;
    let mut overlay_visible = false;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    if input_collector.take_overlay_toggle_pressed() {
                        overlay_visible = !overlay_visible;
                        info!(overlay_visible, "overlay_toggled");
                    }

                    let frame_start = Instant::now();
                    let raw_frame_dt = frame_start.saturating_duration_since(last_frame_instant);
                    last_frame_instant = frame_start;

                    let now_ms = clock.now_ms();
                    let input_snapshot = input_collector.snapshot_for_frame();
                    let command = scene.update(now_ms, &input_snapshot);
                    let update_dt = frame_start.elapsed();
                    if command == SceneCommand::Quit || input_snapshot.quit_requested() {
                        info!(reason = "scene_quit", "shutdown_requested");
                        window_target.exit();
                        return;
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    let frame_desc = scene.render(now_ms, renderer.viewport());
                    let overlay = overlay_visible.then(|| {
                        overlay_lines(metrics_handle.snapshot(), effective_render_cap)
                    });
                    if let Err(error) = renderer.render(&frame_desc, overlay.as_deref()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title = scene.debug_title();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window.set_title(title),
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }

                    metrics_accumulator.record_frame(raw_frame_dt, update_dt);
                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(frame_start) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            update_time_ms = snapshot.update_time_ms,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    keys_down: ActionStates,
    pressed_edges: ActionStates,
    slot_keys_down: [bool; SLOT_KEY_COUNT],
    selected_slot_edge: Option<u8>,
    overlay_toggle_is_down: bool,
    overlay_toggle_pressed_edge: bool,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.handle_physical_key(key_event.physical_key, key_event.state);
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        if let Some(slot) = slot_for_key(key) {
            self.handle_slot_key_state(slot, state);
            return;
        }
        if matches!(key, PhysicalKey::Code(KeyCode::F3)) {
            self.handle_overlay_toggle_key_state(state);
            return;
        }
        if let Some(action) = action_for_key(key) {
            if action == InputAction::Quit && state == ElementState::Pressed {
                self.mark_quit_requested();
            }
            self.handle_action_key_state(action, state);
        }
    }

    fn handle_action_key_state(&mut self, action: InputAction, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_down.is_pressed(action) {
                    self.pressed_edges.set(action, true);
                }
                self.keys_down.set(action, true);
            }
            ElementState::Released => self.keys_down.set(action, false),
        }
    }

    fn handle_slot_key_state(&mut self, slot: u8, state: ElementState) {
        let index = usize::from(slot);
        match state {
            ElementState::Pressed => {
                if !self.slot_keys_down[index] {
                    self.selected_slot_edge = Some(slot);
                }
                self.slot_keys_down[index] = true;
            }
            ElementState::Released => self.slot_keys_down[index] = false,
        }
    }

    fn handle_overlay_toggle_key_state(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.overlay_toggle_is_down {
                    self.overlay_toggle_pressed_edge = true;
                }
                self.overlay_toggle_is_down = true;
            }
            ElementState::Released => self.overlay_toggle_is_down = false,
        }
    }

    fn snapshot_for_frame(&mut self) -> InputSnapshot {
        let snapshot =
            InputSnapshot::new(self.quit_requested, self.pressed_edges, self.selected_slot_edge);
        self.pressed_edges = ActionStates::default();
        self.selected_slot_edge = None;
        snapshot
    }

    fn take_overlay_toggle_pressed(&mut self) -> bool {
        let was_pressed = self.overlay_toggle_pressed_edge;
        self.overlay_toggle_pressed_edge = false;
        was_pressed
    }
}

/// Digit row and numpad 1..=9 pick roster slots 0..=8.
fn slot_for_key(key: PhysicalKey) -> Option<u8> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let slot = match code {
        KeyCode::Digit1 | KeyCode::Numpad1 => 0,
        KeyCode::Digit2 | KeyCode::Numpad2 => 1,
        KeyCode::Digit3 | KeyCode::Numpad3 => 2,
        KeyCode::Digit4 | KeyCode::Numpad4 => 3,
        KeyCode::Digit5 | KeyCode::Numpad5 => 4,
        KeyCode::Digit6 | KeyCode::Numpad6 => 5,
        KeyCode::Digit7 | KeyCode::Numpad7 => 6,
        KeyCode::Digit8 | KeyCode::Numpad8 => 7,
        KeyCode::Digit9 | KeyCode::Numpad9 => 8,
        _ => return None,
    };
    Some(slot)
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let action = match code {
        KeyCode::Digit0 | KeyCode::Numpad0 | KeyCode::Backspace => InputAction::ClearSelection,
        KeyCode::KeyR => InputAction::ResumeRoaming,
        KeyCode::KeyG => InputAction::ToggleGrid,
        KeyCode::KeyC => InputAction::ToggleCharacters,
        KeyCode::KeyB => InputAction::ToggleBoundaries,
        KeyCode::Space => InputAction::ToggleAnimation,
        KeyCode::BracketRight => InputAction::SpeedUp,
        KeyCode::BracketLeft => InputAction::SpeedDown,
        KeyCode::Equal | KeyCode::NumpadAdd => InputAction::ZoomIn,
        KeyCode::Minus | KeyCode::NumpadSubtract => InputAction::ZoomOut,
        KeyCode::Escape => InputAction::Quit,
        _ => return None,
    };
    Some(action)
}

fn overlay_lines(metrics: LoopMetricsSnapshot, render_cap: Option<u32>) -> Vec<String> {
    vec![
        format!("fps {:.1}", metrics.fps),
        format!("frame {:.2} ms", metrics.frame_time_ms),
        format!("update {:.2} ms", metrics.update_time_ms),
        format!("cap {}", format_render_cap(render_cap)),
    ]
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

/// `OFFICE_MAX_FPS=0` disables the cap; unparsable values keep the config cap.
fn resolve_render_fps_cap(config_cap: Option<u32>) -> Option<u32> {
    match env::var(MAX_RENDER_FPS_ENV_VAR) {
        Ok(value) => parse_render_fps_cap(&value).unwrap_or_else(|| {
            warn!(
                env_var = MAX_RENDER_FPS_ENV_VAR,
                value = value.as_str(),
                "invalid render cap env var value; falling back to config"
            );
            config_cap
        }),
        Err(env::VarError::NotPresent) => config_cap,
        Err(err) => {
            warn!(
                env_var = MAX_RENDER_FPS_ENV_VAR,
                error = %err,
                "unable to read render cap env var; falling back to config"
            );
            config_cap
        }
    }
}

fn parse_render_fps_cap(value: &str) -> Option<Option<u32>> {
    value.trim().parse::<u32>().ok().map(|fps| Some(fps).filter(|fps| *fps > 0))
}
