//! Game engine facade
//!
//! `GameEngine` is what a host talks to: it turns frame timestamps into
//! deltas, forwards gesture samples to the blade, and after every call drains
//! the simulation's event queue into the injected listener and audio sink.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::audio::{AudioSink, NullAudio};
use crate::renderer::{self, DrawSurface};
use crate::settings::Settings;
use crate::sim::{self, GameEvent, GamePhase, SimState};
use crate::tuning::Tuning;

/// HUD notifications
///
/// Each callback fires once per actual change, in the order the changes
/// happened.
pub trait GameListener {
    fn score_changed(&mut self, _score: u64) {}
    fn lives_changed(&mut self, _lives: u8) {}
    fn game_over(&mut self) {}
}

/// Listener that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullListener;

impl GameListener for NullListener {}

/// Serializable summary of the session for HUDs and logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub score: u64,
    pub lives: u8,
    pub phase: GamePhase,
    pub difficulty: f32,
    pub entities: usize,
    pub particles: usize,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Clock and input driven game session
pub struct GameEngine {
    state: SimState,
    settings: Settings,
    listener: Box<dyn GameListener>,
    audio: Box<dyn AudioSink>,
    last_time: Option<f64>,
}

impl GameEngine {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let settings = Settings::default();
        let mut state = SimState::new(seed, tuning);
        state.max_particles = settings.max_particles();
        Self {
            state,
            settings,
            listener: Box::new(NullListener),
            audio: Box::new(NullAudio),
            last_time: None,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.set_settings(settings);
        self
    }

    pub fn with_listener(mut self, listener: Box<dyn GameListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = audio;
        self.audio.set_volume(self.settings.effective_volume());
        self
    }

    /// Replace the player preferences (particle cap applies from the next burst)
    pub fn set_settings(&mut self, settings: Settings) {
        self.state.max_particles = settings.max_particles();
        self.state.enforce_particle_cap();
        self.audio.set_volume(settings.effective_volume());
        self.settings = settings;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start (or restart) a session; `now_ms` anchors the first frame delta
    pub fn init(&mut self, width: f32, height: f32, now_ms: f64) {
        self.state.init(width, height);
        self.last_time = Some(now_ms);
        self.audio.resume();
        log::info!("Session started: {width}x{height}");
        self.dispatch();
    }

    /// Update the play area without resetting the session
    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(width, height);
    }

    /// Advance to the frame at `now_ms`; returns whether it was simulated
    pub fn advance(&mut self, now_ms: f64) -> bool {
        let last = self.last_time.replace(now_ms);
        let Some(last) = last else {
            return false;
        };
        let dt = ((now_ms - last) / 1000.0) as f32;
        let simulated = sim::step(&mut self.state, dt);
        self.dispatch();
        simulated
    }

    /// Feed one gesture sample in play-area coordinates
    pub fn on_gesture_point(&mut self, x: f32, y: f32) -> usize {
        let sliced = sim::on_gesture_point(&mut self.state, Vec2::new(x, y));
        self.dispatch();
        sliced
    }

    pub fn lose_life(&mut self) {
        self.state.lose_life();
        self.dispatch();
    }

    pub fn trigger_game_over(&mut self) {
        self.state.trigger_game_over();
        self.dispatch();
    }

    /// Render the current frame (read-only)
    pub fn draw<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        renderer::draw(&self.state, &self.settings, surface);
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            score: self.state.score,
            lives: self.state.lives,
            phase: self.state.phase,
            difficulty: self.state.difficulty,
            entities: self.state.entities.len(),
            particles: self.state.particles.len(),
        }
    }

    /// Deliver queued simulation events to the listener and audio sink
    fn dispatch(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::ScoreChanged(score) => self.listener.score_changed(score),
                GameEvent::LivesChanged(lives) => self.listener.lives_changed(lives),
                GameEvent::GameOver => self.listener.game_over(),
                GameEvent::Sound(effect) => self.audio.play(effect),
            }
        }
    }
}
