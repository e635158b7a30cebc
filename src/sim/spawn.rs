//! Entity spawning and spawn cadence
//!
//! Launch velocities come from projectile kinematics so every object peaks
//! inside the play area regardless of screen size or difficulty.

use glam::Vec2;
use rand::Rng;

use super::state::{Entity, FruitKind, PendingSpawn, SimState};

/// Weighted spawn pool (bombs are 1 in 9)
pub const SPAWN_POOL: [FruitKind; 9] = [
    FruitKind::Watermelon,
    FruitKind::Watermelon,
    FruitKind::Orange,
    FruitKind::Orange,
    FruitKind::Apple,
    FruitKind::Apple,
    FruitKind::Mango,
    FruitKind::Pineapple,
    FruitKind::Bomb,
];

/// Build a freshly launched entity below the bottom edge
pub fn spawn_entity<R: Rng + ?Sized>(
    rng: &mut R,
    id: u32,
    width: f32,
    height: f32,
    difficulty: f32,
    tuning: &crate::Tuning,
) -> Entity {
    let kind = SPAWN_POOL[rng.random_range(0..SPAWN_POOL.len())];

    // 10% margin on each side
    let x = width * 0.1 + rng.random::<f32>() * width * 0.8;
    let y = height + tuning.spawn_depth;

    // Throw toward the horizontal center (-1 at the right edge, 1 at the left)
    let half_width = width / 2.0;
    let direction_x = if half_width > 0.0 {
        (half_width - x) / half_width
    } else {
        0.0
    };

    let speed_scale = tuning.speed_scale(difficulty);
    let gravity = tuning.gravity * speed_scale;

    // Apex between 20% and 60% of the height, measured from the top
    let target_height = height * 0.2 + rng.random::<f32>() * height * 0.4;
    let rise = (height - target_height).max(0.0);
    // v² = 2gs, negative because up is -y
    let vy = -(2.0 * gravity * rise).sqrt();
    let vx = direction_x * (100.0 + rng.random::<f32>() * 200.0) * speed_scale;

    let rotation_speed = (rng.random::<f32>() - 0.5) * 5.0 * speed_scale;

    let mut entity = Entity::new(id, kind, Vec2::new(x, y), tuning);
    entity.vel = Vec2::new(vx, vy);
    entity.rotation_speed = rotation_speed;
    entity
}

/// Spawn one entity into the state
pub fn spawn_into(state: &mut SimState) {
    let id = state.next_entity_id();
    let entity = spawn_entity(
        &mut state.rng,
        id,
        state.width,
        state.height,
        state.difficulty,
        &state.tuning,
    );
    log::debug!(
        "Spawned {:?} #{} at ({:.0}, {:.0}) vel ({:.0}, {:.0})",
        entity.kind,
        entity.id,
        entity.pos.x,
        entity.pos.y,
        entity.vel.x,
        entity.vel.y
    );
    state.entities.push(entity);
}

/// Probability threshold a uniform draw must exceed for a chained spawn
///
/// Falls as difficulty rises, so double spawns become more common.
#[inline]
pub fn chained_spawn_threshold(difficulty: f32) -> f32 {
    (0.8 - difficulty * 0.05).max(0.3)
}

/// Spawn interval (ms) for a difficulty value: 100 ms faster per whole step
#[inline]
pub fn spawn_interval_ms(difficulty: f32, tuning: &crate::Tuning) -> f32 {
    let interval = tuning.initial_spawn_interval_ms - (difficulty - 1.0) * 100.0;
    interval.max(tuning.min_spawn_interval_ms)
}

/// Advance the spawn clock by `dt` seconds, spawning when it elapses
pub fn update_cadence(state: &mut SimState, dt: f32) {
    // Chained spawns scheduled this tick start counting from the next one
    update_pending(state, dt);

    state.spawn_timer_ms += dt * 1000.0;
    if state.spawn_timer_ms > state.spawn_interval_ms {
        spawn_into(state);

        if state.rng.random::<f32>() > chained_spawn_threshold(state.difficulty) {
            state.pending_spawns.push(PendingSpawn {
                remaining_ms: state.tuning.chained_spawn_delay_ms,
            });
        }

        state.spawn_timer_ms = 0.0;
        state.difficulty += state.tuning.difficulty_step;
        state.spawn_interval_ms = spawn_interval_ms(state.difficulty, &state.tuning);
    }
}

/// Count down chained spawns and fire the ones that are due
fn update_pending(state: &mut SimState, dt: f32) {
    if state.pending_spawns.is_empty() {
        return;
    }
    let elapsed_ms = dt * 1000.0;
    let mut due = 0;
    state.pending_spawns.retain_mut(|pending| {
        pending.remaining_ms -= elapsed_ms;
        if pending.remaining_ms <= 0.0 {
            due += 1;
            false
        } else {
            true
        }
    });
    for _ in 0..due {
        if !state.is_active() {
            break;
        }
        spawn_into(state);
    }
}
