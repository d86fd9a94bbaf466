//! Session control surface
//!
//! Owns the game state and everything around one run: the demo pilot, the
//! follow camera, the render frame and the performance monitor. The host
//! (browser loop or headless runner) drives it with one `frame` call per
//! display refresh and hears about gameplay through a [`GameListener`].
//!
//! Every `start` opens a new loop generation. A frame callback carrying an
//! older [`LoopToken`] is told to stop, so restarting can never leave two
//! loops running.

use crate::platform::InputState;
use crate::render::{CameraRig, RenderFrame};
use crate::settings::{PerformanceMonitor, Settings};
use crate::sim::{DemoPilot, GameEvent, GamePhase, GameState, tick};
use crate::tuning::Tuning;

/// UI callbacks. All default to doing nothing.
pub trait GameListener {
    fn on_life_lost(&mut self, _remaining_lives: u32) {}
    fn on_extra_life(&mut self, _lives: u32) {}
    fn on_game_over(&mut self, _final_score: u64) {}
    fn on_score_changed(&mut self, _score: u64) {}
    /// Score and lives widgets should hide while the demo plays
    fn on_demo_mode(&mut self, _demo: bool) {}
}

/// Listener that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullListener;

impl GameListener for NullListener {}

/// Identifies the loop a frame callback belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopToken(u64);

/// What the host loop should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Schedule the next frame
    Continue,
    /// Do not reschedule: the game ended or this loop was superseded
    Stop,
}

pub struct Session<L: GameListener> {
    state: GameState,
    listener: L,
    settings: Settings,
    monitor: PerformanceMonitor,
    camera: CameraRig,
    frame: RenderFrame,
    pilot: DemoPilot,
    demo: bool,
    base_seed: u64,
    runs: u64,
    generation: u64,
    loop_active: bool,
    initialized: bool,
}

impl<L: GameListener> Session<L> {
    pub fn new(tuning: Tuning, settings: Settings, seed: u64, listener: L) -> Self {
        let monitor = PerformanceMonitor::new(settings.performance);
        Self {
            state: GameState::new(seed, tuning),
            listener,
            settings,
            monitor,
            camera: CameraRig::default(),
            frame: RenderFrame::default(),
            pilot: DemoPilot::new(seed ^ 0xD3A0),
            demo: false,
            base_seed: seed,
            runs: 0,
            generation: 0,
            loop_active: false,
            initialized: false,
        }
    }

    /// Build the world and the first render frame. Safe to call twice.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.camera.follow(self.state.skier.position.x);
        self.rebuild_frame();
        log::info!("Session initialized (seed {})", self.base_seed);
    }

    /// Begin a fresh run and return the token for its loop. Any loop that
    /// was already running is superseded.
    pub fn start(&mut self, demo: bool) -> LoopToken {
        self.initialize();
        self.generation += 1;
        self.loop_active = true;
        self.set_demo_mode(demo);
        self.begin_run();
        log::info!(
            "Session started ({}, loop {})",
            if demo { "demo" } else { "player" },
            self.generation
        );
        LoopToken(self.generation)
    }

    fn begin_run(&mut self) {
        self.runs += 1;
        let seed = self.base_seed.wrapping_add(self.runs);
        self.state.reset(seed);
        self.state.phase = GamePhase::Running;
        self.monitor.reset();
        self.camera.follow(self.state.skier.position.x);
        if !self.demo {
            self.listener.on_score_changed(0);
        }
    }

    /// Stop the loop and put the world back to its starting state
    pub fn reset(&mut self) {
        self.generation += 1;
        self.loop_active = false;
        self.runs += 1;
        let seed = self.base_seed.wrapping_add(self.runs);
        self.state.reset(seed);
        self.camera.follow(self.state.skier.position.x);
        self.rebuild_frame();
        log::info!("Session reset");
    }

    pub fn set_demo_mode(&mut self, demo: bool) {
        if demo == self.demo {
            return;
        }
        self.demo = demo;
        log::info!("Demo mode {}", if demo { "on" } else { "off" });
        self.listener.on_demo_mode(demo);
    }

    /// Viewport changed size (physical pixels)
    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
        log::debug!("Resized to {width}x{height}");
    }

    /// Run one display frame: simulate the steps the clock grants, report
    /// events and refresh the render frame.
    ///
    /// `input` is the controls snapshot for the whole frame; it is ignored in
    /// demo mode.
    pub fn frame(&mut self, token: LoopToken, timestamp_ms: f64, input: InputState) -> FrameOutcome {
        if !self.is_current(token) {
            return FrameOutcome::Stop;
        }

        if let Some(level) = self.monitor.record_frame(timestamp_ms) {
            log::debug!("Rendering at {:?} quality", level);
        }

        let steps = self.state.clock.tick(timestamp_ms);
        let input = if self.demo {
            self.pilot.next_input(&self.state)
        } else {
            input
        };
        for _ in 0..steps.steps_to_run {
            tick(&mut self.state, &input);
            if self.state.phase != GamePhase::Running {
                break;
            }
        }

        self.dispatch_events();
        self.camera.follow(self.state.skier.position.x);
        self.rebuild_frame();

        if self.state.phase == GamePhase::GameOver {
            if self.demo {
                log::info!("Demo run over, restarting");
                self.begin_run();
                return FrameOutcome::Continue;
            }
            self.loop_active = false;
            return FrameOutcome::Stop;
        }
        FrameOutcome::Continue
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            if self.demo {
                continue;
            }
            match event {
                GameEvent::LifeLost { remaining } => self.listener.on_life_lost(remaining),
                GameEvent::ExtraLife { lives } => self.listener.on_extra_life(lives),
                GameEvent::GameOver { final_score } => self.listener.on_game_over(final_score),
                GameEvent::ScoreChanged { score } => self.listener.on_score_changed(score),
                _ => {}
            }
        }
    }

    fn rebuild_frame(&mut self) {
        let time = self.state.clock.time_at(self.state.time_ticks);
        self.frame.build(
            &self.state,
            &self.settings,
            self.monitor.level(),
            &self.camera,
            time,
        );
    }

    /// Whether frames carrying `token` should keep running
    pub fn is_current(&self, token: LoopToken) -> bool {
        self.loop_active && token.0 == self.generation
    }

    /// Resume after the page was hidden without counting the gap as play
    pub fn resume(&mut self) {
        self.state.clock.resync();
        self.monitor.reset();
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn render_frame(&self) -> &RenderFrame {
        &self.frame
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Change settings; the performance mode takes effect immediately
    pub fn update_settings(&mut self, settings: Settings) {
        self.monitor.set_mode(settings.performance);
        self.settings = settings;
    }

    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    pub fn is_running(&self) -> bool {
        self.loop_active && self.state.phase == GamePhase::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{HazardKind, ObstacleKind};
    use glam::Vec3;

    #[derive(Default)]
    struct Recorder {
        lives_lost: Vec<u32>,
        extra_lives: Vec<u32>,
        game_overs: Vec<u64>,
        scores: Vec<u64>,
        demo: Vec<bool>,
    }

    impl GameListener for Recorder {
        fn on_life_lost(&mut self, remaining_lives: u32) {
            self.lives_lost.push(remaining_lives);
        }
        fn on_extra_life(&mut self, lives: u32) {
            self.extra_lives.push(lives);
        }
        fn on_game_over(&mut self, final_score: u64) {
            self.game_overs.push(final_score);
        }
        fn on_score_changed(&mut self, score: u64) {
            self.scores.push(score);
        }
        fn on_demo_mode(&mut self, demo: bool) {
            self.demo.push(demo);
        }
    }

    fn session() -> Session<Recorder> {
        let mut session = Session::new(Tuning::default(), Settings::default(), 11, Recorder::default());
        session.initialize();
        session
    }

    /// Frames 17 ms apart, so every frame runs at least one step
    fn run_frames<L: GameListener>(session: &mut Session<L>, token: LoopToken, from: usize, count: usize) -> FrameOutcome {
        let mut outcome = FrameOutcome::Continue;
        for i in from..from + count {
            outcome = session.frame(token, i as f64 * 17.0, InputState::default());
            if outcome == FrameOutcome::Stop {
                break;
            }
        }
        outcome
    }

    fn clear_slope<L: GameListener>(session: &mut Session<L>) {
        let state = &mut session.state;
        for slot in 0..state.obstacles.obstacles().len() {
            state.obstacles.place(
                slot,
                ObstacleKind::Hazard(HazardKind::Rock),
                Vec3::new(0.0, 0.0, -500.0 - slot as f32 * 5.0),
            );
        }
    }

    fn crash_now<L: GameListener>(session: &mut Session<L>) {
        session
            .state
            .obstacles
            .place(0, ObstacleKind::Hazard(HazardKind::Tree), Vec3::ZERO);
    }

    #[test]
    fn test_start_runs_simulation() {
        let mut session = session();
        let token = session.start(false);
        assert!(session.is_running());
        assert_eq!(run_frames(&mut session, token, 0, 120), FrameOutcome::Continue);
        assert!(session.state().time_ticks > 100);
        assert!(session.state().speed() > 0.1);
        assert!(!session.listener().scores.is_empty());
    }

    #[test]
    fn test_restart_supersedes_old_loop() {
        let mut session = session();
        let first = session.start(false);
        run_frames(&mut session, first, 0, 10);
        let second = session.start(false);
        assert_eq!(session.frame(first, 1000.0, InputState::default()), FrameOutcome::Stop);
        assert_eq!(session.frame(second, 1000.0, InputState::default()), FrameOutcome::Continue);
        // Starting again restores lives and score
        assert_eq!(session.state().lives(), 3);
    }

    #[test]
    fn test_reset_stops_loop() {
        let mut session = session();
        let token = session.start(false);
        run_frames(&mut session, token, 0, 30);
        session.reset();
        assert!(!session.is_running());
        assert_eq!(session.state().phase, GamePhase::Ready);
        assert_eq!(session.state().total_score(), 0);
        assert_eq!(run_frames(&mut session, token, 30, 1), FrameOutcome::Stop);
    }

    #[test]
    fn test_crashes_reported_until_game_over() {
        let mut session = session();
        let token = session.start(false);
        run_frames(&mut session, token, 0, 1);
        clear_slope(&mut session);

        let mut frame = 1;
        let mut outcome = FrameOutcome::Continue;
        for _ in 0..3 {
            crash_now(&mut session);
            outcome = run_frames(&mut session, token, frame, 1);
            frame += 1;
            // Sit out the tumble
            while session.state().skier.is_tumbling() && outcome == FrameOutcome::Continue {
                outcome = run_frames(&mut session, token, frame, 1);
                frame += 1;
            }
        }

        assert_eq!(outcome, FrameOutcome::Stop);
        assert_eq!(session.listener().lives_lost, vec![2, 1, 0]);
        assert_eq!(session.listener().game_overs.len(), 1);
        assert!(!session.is_running());
    }

    #[test]
    fn test_pickup_reported_once() {
        let mut session = session();
        let token = session.start(false);
        run_frames(&mut session, token, 0, 1);
        clear_slope(&mut session);
        session
            .state
            .obstacles
            .place(0, ObstacleKind::Pickup, Vec3::ZERO);
        run_frames(&mut session, token, 1, 3);
        assert_eq!(session.listener().extra_lives, vec![4]);
    }

    #[test]
    fn test_demo_mode_is_silent_and_restarts() {
        let mut session = session();
        let token = session.start(true);
        assert_eq!(session.listener().demo, vec![true]);
        assert_eq!(run_frames(&mut session, token, 0, 120), FrameOutcome::Continue);
        assert!(session.listener().scores.is_empty());

        // Run out of lives
        for _ in 0..3 {
            let state = &mut session.state;
            state.skier.start_tumbling(&mut state.rng);
            state.skier.reset();
        }
        session.state.phase = GamePhase::GameOver;
        session.state.push_event(GameEvent::GameOver { final_score: 0 });

        assert_eq!(run_frames(&mut session, token, 120, 1), FrameOutcome::Continue);
        assert_eq!(session.state().phase, GamePhase::Running);
        assert_eq!(session.state().lives(), 3);
        assert!(session.listener().game_overs.is_empty());
        assert!(session.listener().lives_lost.is_empty());
    }

    #[test]
    fn test_leaving_demo_mode_notifies_listener() {
        let mut session = session();
        session.start(true);
        session.start(false);
        assert_eq!(session.listener().demo, vec![true, false]);
        assert!(!session.is_demo());
    }

    #[test]
    fn test_resize_updates_camera() {
        let mut session = session();
        session.handle_resize(1200, 600);
        assert_eq!(session.camera().aspect(), 2.0);
    }

    #[test]
    fn test_initialize_builds_frame() {
        let session = session();
        assert!(!session.render_frame().instances.is_empty());
        assert_eq!(session.render_frame().tiles.len(), 10);
    }
}
