//! Game state and core simulation types
//!
//! `SimState` is the single owner of everything the simulation mutates. Score,
//! lives and the game-over transition only change through its controller
//! methods, which record one `GameEvent` per actual change.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::Color;
use crate::audio::SoundEffect;
use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, TRAIL_LENGTH};
use crate::tuning::Tuning;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Constructed but `init` not yet called
    Ready,
    /// Active gameplay
    Active,
    /// Run ended (terminal until the next `init`)
    GameOver,
}

/// Launched object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FruitKind {
    Watermelon,
    Orange,
    Apple,
    Mango,
    Pineapple,
    Bomb,
}

impl FruitKind {
    #[inline]
    pub fn is_bomb(self) -> bool {
        self == FruitKind::Bomb
    }

    /// Hitbox radius (independent of screen size)
    pub fn radius(self, tuning: &Tuning) -> f32 {
        if self.is_bomb() {
            tuning.bomb_radius
        } else {
            tuning.fruit_radius
        }
    }

    /// Outer color (rind / bomb shell)
    pub fn rind_color(self) -> Color {
        match self {
            FruitKind::Watermelon => Color(0x166524),
            FruitKind::Orange => Color(0xff7f00),
            FruitKind::Apple => Color(0xcc0000),
            FruitKind::Mango => Color(0xffcc00),
            FruitKind::Pineapple => Color(0x8b4513),
            FruitKind::Bomb => Color(0x111111),
        }
    }

    /// Inner color (flesh, juice)
    pub fn flesh_color(self) -> Color {
        match self {
            FruitKind::Watermelon => Color(0xff4d4d),
            FruitKind::Orange => Color(0xffae00),
            FruitKind::Apple => Color(0xffffe0),
            FruitKind::Mango => Color(0xffd700),
            FruitKind::Pineapple => Color(0xffff00),
            FruitKind::Bomb => Color(0x330000),
        }
    }
}

/// A fruit or bomb in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: FruitKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub radius: f32,
    /// Sliced halves never collide again and never cost a life
    pub sliced: bool,
    /// Recent positions of a sliced half (oldest first)
    pub trail: VecDeque<Vec2>,
}

impl Entity {
    /// A motionless, unsliced entity with the kind's standard radius
    pub fn new(id: u32, kind: FruitKind, pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            rotation_speed: 0.0,
            radius: kind.radius(tuning),
            sliced: false,
            trail: VecDeque::new(),
        }
    }

    /// Whether the blade can still hit this entity
    #[inline]
    pub fn is_collidable(&self) -> bool {
        !self.sliced
    }

    /// Whether falling off-screen costs the player a life
    #[inline]
    pub fn costs_life_when_missed(&self) -> bool {
        !self.sliced && !self.kind.is_bomb()
    }

    /// Record current position to the juice trail
    pub fn record_trail(&mut self) {
        self.trail.push_back(self.pos);
        while self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }
    }
}

/// A cosmetic juice droplet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
}

/// One sample of the player's gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BladePoint {
    pub pos: Vec2,
    pub life: f32, // 0-1, decreases over time
}

/// A chained spawn waiting for its delay to elapse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingSpawn {
    pub remaining_ms: f32,
}

/// Notifications produced by the simulation, drained by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ScoreChanged(u64),
    LivesChanged(u8),
    GameOver,
    Sound(SoundEffect),
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Play area size
    pub width: f32,
    pub height: f32,
    pub entities: Vec<Entity>,
    pub particles: Vec<Particle>,
    /// Gesture samples in arrival order
    pub blade: Vec<BladePoint>,
    pub score: u64,
    pub lives: u8,
    /// Raw difficulty counter (starts at 1, never decreases)
    pub difficulty: f32,
    /// Time since the last scheduled spawn (ms)
    pub spawn_timer_ms: f32,
    /// Current spawn interval (ms)
    pub spawn_interval_ms: f32,
    pub pending_spawns: Vec<PendingSpawn>,
    /// Live particle cap; bursts evict the oldest droplets beyond it
    pub max_particles: usize,
    /// Simulated (non-dropped) ticks since `init`
    pub frame: u64,
    pub rng: Pcg32,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl SimState {
    /// Create a state in the `Ready` phase
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            phase: GamePhase::Ready,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            entities: Vec::new(),
            particles: Vec::new(),
            blade: Vec::new(),
            score: 0,
            lives: tuning.starting_lives,
            difficulty: 1.0,
            spawn_timer_ms: 0.0,
            spawn_interval_ms: tuning.initial_spawn_interval_ms,
            pending_spawns: Vec::new(),
            max_particles: usize::MAX,
            frame: 0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Reset the session and start playing
    pub fn init(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.entities.clear();
        self.particles.clear();
        self.blade.clear();
        self.pending_spawns.clear();
        self.score = 0;
        self.lives = self.tuning.starting_lives;
        self.difficulty = 1.0;
        self.spawn_timer_ms = 0.0;
        self.spawn_interval_ms = self.tuning.initial_spawn_interval_ms;
        self.frame = 0;
        self.phase = GamePhase::Active;

        self.events.push(GameEvent::ScoreChanged(0));
        self.events.push(GameEvent::LivesChanged(self.lives));
    }

    /// Update the play area without touching the session
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::Active
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Award one point for a sliced fruit
    pub fn add_score(&mut self) {
        if !self.is_active() {
            return;
        }
        self.score += 1;
        self.events.push(GameEvent::ScoreChanged(self.score));
    }

    /// Take a life for a missed fruit; the last one ends the run
    pub fn lose_life(&mut self) {
        if !self.is_active() {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::LivesChanged(self.lives));
        if self.lives == 0 {
            self.trigger_game_over();
        }
    }

    /// End the run; later calls are no-ops
    pub fn trigger_game_over(&mut self) {
        if !self.is_active() {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.pending_spawns.clear();
        log::info!(
            "Game over: score={} lives={} difficulty={:.2}",
            self.score,
            self.lives,
            self.difficulty
        );
        self.events.push(GameEvent::Sound(SoundEffect::Explosion));
        self.events.push(GameEvent::Sound(SoundEffect::GameOver));
        self.events.push(GameEvent::GameOver);
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events recorded since the last drain, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop the oldest particles beyond the cap
    pub fn enforce_particle_cap(&mut self) {
        if self.particles.len() > self.max_particles {
            let excess = self.particles.len() - self.max_particles;
            self.particles.drain(..excess);
        }
    }
}
