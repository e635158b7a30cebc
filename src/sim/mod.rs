//! Simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only (same seed + same inputs = same run)
//! - Frame deltas come from the caller; nothing reads a clock
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{on_gesture_point, resolve_segment, segment_hits};
pub use spawn::{SPAWN_POOL, spawn_entity};
pub use state::{
    BladePoint, Entity, FruitKind, GameEvent, GamePhase, Particle, PendingSpawn, SimState,
};
pub use tick::step;
