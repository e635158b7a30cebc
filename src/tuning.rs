//! Data-driven game balance
//!
//! Every physical constant and difficulty knob lives here so a session can be
//! rebalanced from JSON without touching the simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Balance constants for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Base gravity (units/s², +y is down)
    pub gravity: f32,
    /// Blade stroke width
    pub blade_width: f32,
    /// Blade point life lost per second
    pub blade_decay: f32,
    /// Particle life lost per second
    pub particle_decay: f32,
    /// Frames longer than this (seconds) are dropped, not simulated
    pub max_frame_dt: f32,
    /// How far below the play area an entity may fall before removal
    pub despawn_margin: f32,
    /// How far below the play area entities are launched from
    pub spawn_depth: f32,
    /// Separation speed added to each half along the blade normal
    pub half_separation: f32,
    /// Spin added to each half (rad/s)
    pub half_spin: f32,
    /// Half radius relative to the parent
    pub half_radius_scale: f32,
    pub fruit_radius: f32,
    pub bomb_radius: f32,
    pub starting_lives: u8,
    /// Spawn interval at session start (ms)
    pub initial_spawn_interval_ms: f32,
    /// Spawn interval floor (ms)
    pub min_spawn_interval_ms: f32,
    /// Difficulty added per spawn
    pub difficulty_step: f32,
    /// Fraction of the raw difficulty applied to physics speeds
    pub speed_damping: f32,
    /// Delay before a chained second spawn (ms)
    pub chained_spawn_delay_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 800.0,
            blade_width: 8.0,
            blade_decay: 5.0,
            particle_decay: 1.5,
            max_frame_dt: 0.1,
            despawn_margin: 100.0,
            spawn_depth: 50.0,
            half_separation: 150.0,
            half_spin: 2.0,
            half_radius_scale: 0.8,
            fruit_radius: 60.0,
            bomb_radius: 50.0,
            starting_lives: 3,
            initial_spawn_interval_ms: 1000.0,
            min_spawn_interval_ms: 300.0,
            difficulty_step: 0.02,
            speed_damping: 0.15,
            chained_spawn_delay_ms: 200.0,
        }
    }
}

/// Reasons a tuning file is rejected
#[derive(Debug)]
pub enum TuningError {
    Parse(serde_json::Error),
    NonPositive { field: &'static str, value: f32 },
    NoLives,
    SpawnIntervalInverted { initial: f32, min: f32 },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid tuning json: {err}"),
            Self::NonPositive { field, value } => {
                write!(f, "tuning field `{field}` must be positive and finite, got {value}")
            }
            Self::NoLives => write!(f, "starting_lives must be at least 1"),
            Self::SpawnIntervalInverted { initial, min } => write!(
                f,
                "min spawn interval {min}ms exceeds initial interval {initial}ms"
            ),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl Tuning {
    /// Parse and validate a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("gravity", self.gravity),
            ("blade_width", self.blade_width),
            ("blade_decay", self.blade_decay),
            ("particle_decay", self.particle_decay),
            ("max_frame_dt", self.max_frame_dt),
            ("fruit_radius", self.fruit_radius),
            ("bomb_radius", self.bomb_radius),
            ("half_radius_scale", self.half_radius_scale),
            ("initial_spawn_interval_ms", self.initial_spawn_interval_ms),
            ("min_spawn_interval_ms", self.min_spawn_interval_ms),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::NonPositive { field, value });
            }
        }
        if self.starting_lives == 0 {
            return Err(TuningError::NoLives);
        }
        if self.min_spawn_interval_ms > self.initial_spawn_interval_ms {
            return Err(TuningError::SpawnIntervalInverted {
                initial: self.initial_spawn_interval_ms,
                min: self.min_spawn_interval_ms,
            });
        }
        Ok(())
    }

    /// Physics speed multiplier for a raw difficulty value
    ///
    /// Grows at `speed_damping` of the raw rate so late-game objects get faster
    /// without becoming unplayable.
    #[inline]
    pub fn speed_scale(&self, difficulty: f32) -> f32 {
        1.0 + (difficulty - 1.0) * self.speed_damping
    }

    /// Gravity after difficulty scaling
    #[inline]
    pub fn effective_gravity(&self, difficulty: f32) -> f32 {
        self.gravity * self.speed_scale(difficulty)
    }
}
