//! Game state and simulation events
//!
//! Everything one session mutates lives in [`GameState`]. The skier and the
//! streamers are created once and reset between sessions, never rebuilt.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::SimulationClock;
use super::effects::Effects;
use super::fences::FenceStreamer;
use super::obstacles::{HazardKind, JumpKind, ObstacleStreamer};
use super::score::Score;
use super::skier::Skier;
use super::terrain::TerrainStreamer;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// World built, waiting for `start`
    #[default]
    Ready,
    /// Active gameplay
    Running,
    /// Out of lives
    GameOver,
}

/// Things that happened during a step, drained by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Crashed { hazard: HazardKind },
    LifeLost { remaining: u32 },
    PickupCollected { id: u32 },
    ExtraLife { lives: u32 },
    JumpStarted { jump: JumpKind, bonus: u64 },
    FlipCompleted { count: u32 },
    FlipBonus { flips: u32, points: u64 },
    Landed,
    ScoreChanged { score: u64 },
    GameOver { final_score: u64 },
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed of the current session's RNG
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub clock: SimulationClock,
    pub terrain: TerrainStreamer,
    pub obstacles: ObstacleStreamer,
    pub fences: FenceStreamer,
    pub skier: Skier,
    pub score: Score,
    pub effects: Effects,
    /// Fixed steps simulated since the last reset
    pub time_ticks: u64,
    pub rng: Pcg32,
    /// Score last announced with `ScoreChanged`
    pub(crate) reported_score: u64,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Build a fully populated world from `seed`
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            phase: GamePhase::Ready,
            clock: SimulationClock::new(tuning.clock.clone()),
            terrain: TerrainStreamer::new(tuning.terrain.clone()),
            obstacles: ObstacleStreamer::new(tuning.obstacles.clone()),
            fences: FenceStreamer::new(tuning.fences.clone()),
            skier: Skier::new(tuning.skier.clone()),
            score: Score::new(),
            effects: Effects::new(),
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            reported_score: 0,
            events: Vec::new(),
            tuning,
        };
        state.populate();
        state
    }

    fn populate(&mut self) {
        self.terrain.initialize(&mut self.rng);
        self.obstacles.initialize(&mut self.rng);
        self.fences.initialize(&mut self.rng);
    }

    /// Back to a fresh world under a new seed. Lives, score and speed are
    /// restored; the skier keeps its identity.
    pub fn reset(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.phase = GamePhase::Ready;
        self.clock.reset();
        self.terrain.reset(&mut self.rng);
        self.obstacles.reset(&mut self.rng);
        self.fences.reset(&mut self.rng);
        self.skier.reset();
        self.skier.reset_lives();
        self.score.reset();
        self.effects.clear();
        self.time_ticks = 0;
        self.reported_score = 0;
        self.events.clear();
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn speed(&self) -> f32 {
        self.clock.speed()
    }

    pub fn lives(&self) -> u32 {
        self.skier.lives()
    }

    pub fn total_score(&self) -> u64 {
        self.score.total()
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }
}
