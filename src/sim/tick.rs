//! Variable timestep simulation tick
//!
//! Advances spawning, projectile physics, particles and the blade trail by one
//! frame delta.

use super::spawn::update_cadence;
use super::state::SimState;

/// Advance the simulation by `dt` seconds
///
/// Stalled frames (`dt` above the tuning's `max_frame_dt`, e.g. after the tab
/// was backgrounded) are dropped entirely rather than clamped, so nothing
/// tunnels through the despawn line. Returns whether the frame was simulated.
pub fn step(state: &mut SimState, dt: f32) -> bool {
    if !state.is_active() {
        return false;
    }
    if !(dt >= 0.0 && dt <= state.tuning.max_frame_dt) {
        log::trace!("Dropping frame: dt={dt:.3}s");
        return false;
    }

    state.frame += 1;

    update_cadence(state, dt);
    integrate_entities(state, dt);
    integrate_particles(state, dt);
    decay_blade(state, dt);

    true
}

/// Gravity, motion and spin for every entity; prune those below the play area
fn integrate_entities(state: &mut SimState, dt: f32) {
    let gravity = state.tuning.effective_gravity(state.difficulty);
    let despawn_y = state.height + state.tuning.despawn_margin;

    let mut missed = 0u32;
    state.entities.retain_mut(|e| {
        e.vel.y += gravity * dt;
        e.pos += e.vel * dt;
        e.rotation += e.rotation_speed * dt;

        if e.sliced {
            e.record_trail();
        }

        if e.pos.y > despawn_y {
            if e.costs_life_when_missed() {
                log::debug!("Missed {:?} #{}", e.kind, e.id);
                missed += 1;
            }
            return false;
        }
        true
    });

    for _ in 0..missed {
        state.lose_life();
    }
}

fn integrate_particles(state: &mut SimState, dt: f32) {
    let gravity = state.tuning.effective_gravity(state.difficulty);
    let decay = state.tuning.particle_decay;

    for particle in state.particles.iter_mut() {
        particle.vel.y += gravity * dt;
        particle.pos += particle.vel * dt;
        particle.life -= decay * dt;
    }
    state.particles.retain(|p| p.life > 0.0);
}

fn decay_blade(state: &mut SimState, dt: f32) {
    let decay = state.tuning.blade_decay;
    for point in state.blade.iter_mut() {
        point.life -= decay * dt;
    }
    state.blade.retain(|p| p.life > 0.0);
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::Color;
    use crate::sim::state::{BladePoint, Entity, FruitKind, GameEvent, Particle};
    use crate::tuning::Tuning;

    fn active_state() -> SimState {
        let mut state = SimState::new(12345, Tuning::default());
        state.init(800.0, 600.0);
        state.drain_events();
        state
    }

    fn place(state: &mut SimState, kind: FruitKind, pos: Vec2, vel: Vec2) -> u32 {
        let id = state.next_entity_id();
        let mut e = Entity::new(id, kind, pos, &state.tuning);
        e.vel = vel;
        state.entities.push(e);
        id
    }

    #[test]
    fn test_entities_spawn_once_interval_elapses() {
        let mut state = active_state();
        for _ in 0..21 {
            assert!(step(&mut state, 0.05));
        }
        assert!(!state.entities.is_empty());
    }

    #[test]
    fn test_gravity_integration() {
        let mut state = active_state();
        let id = place(
            &mut state,
            FruitKind::Apple,
            Vec2::new(100.0, 100.0),
            Vec2::new(10.0, -100.0),
        );
        state.entities[0].rotation_speed = 2.0;
        step(&mut state, 0.05);
        let e = state.entities.iter().find(|e| e.id == id).unwrap();
        // vy = -100 + 800*0.05 = -60, then y += -60*0.05
        assert!((e.vel.y - -60.0).abs() < 1e-3);
        assert!((e.pos.y - 97.0).abs() < 1e-3);
        assert!((e.pos.x - 100.5).abs() < 1e-3);
        assert!((e.rotation - 0.1).abs() < 1e-5);
        assert!(e.trail.is_empty());
    }

    #[test]
    fn test_sliced_entities_grow_trail() {
        let mut state = active_state();
        place(
            &mut state,
            FruitKind::Orange,
            Vec2::new(100.0, 100.0),
            Vec2::ZERO,
        );
        state.entities[0].sliced = true;
        for _ in 0..20 {
            step(&mut state, 0.01);
        }
        let half = state.entities.iter().find(|e| e.sliced).unwrap();
        assert_eq!(half.trail.len(), crate::consts::TRAIL_LENGTH);
    }

    #[test]
    fn test_missed_fruit_costs_one_life() {
        let mut state = active_state();
        place(
            &mut state,
            FruitKind::Pineapple,
            Vec2::new(400.0, 699.0),
            Vec2::new(0.0, 200.0),
        );
        step(&mut state, 0.016);
        assert!(state.entities.is_empty());
        assert_eq!(state.lives, 2);
        let lives_events: Vec<_> = state
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::LivesChanged(_)))
            .collect();
        assert_eq!(lives_events, vec![&GameEvent::LivesChanged(2)]);
    }

    #[test]
    fn test_sliced_and_bombs_fall_for_free() {
        let mut state = active_state();
        place(
            &mut state,
            FruitKind::Bomb,
            Vec2::new(300.0, 699.0),
            Vec2::new(0.0, 200.0),
        );
        place(
            &mut state,
            FruitKind::Apple,
            Vec2::new(500.0, 699.0),
            Vec2::new(0.0, 200.0),
        );
        state.entities[1].sliced = true;
        step(&mut state, 0.016);
        assert_eq!(state.lives, 3);
        assert!(state.entities.is_empty());
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_stalled_frame_is_dropped() {
        let mut state = active_state();
        place(
            &mut state,
            FruitKind::Apple,
            Vec2::new(100.0, 100.0),
            Vec2::new(10.0, -100.0),
        );
        state.particles.push(Particle {
            pos: Vec2::new(5.0, 5.0),
            vel: Vec2::ZERO,
            color: Color::WHITE,
            life: 0.5,
            size: 3.0,
        });
        state.blade.push(BladePoint {
            pos: Vec2::ZERO,
            life: 1.0,
        });
        state.spawn_timer_ms = 400.0;
        let before = state.clone();

        assert!(!step(&mut state, 0.2));

        assert_eq!(state.entities, before.entities);
        assert_eq!(state.particles, before.particles);
        assert_eq!(state.blade, before.blade);
        assert_eq!(state.spawn_timer_ms, 400.0);
        assert_eq!(state.frame, before.frame);
    }

    #[test]
    fn test_particles_and_blade_fade_out() {
        let mut state = active_state();
        state.particles.push(Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            color: Color::WHITE,
            life: 1.0,
            size: 3.0,
        });
        state.blade.push(BladePoint {
            pos: Vec2::ZERO,
            life: 1.0,
        });
        step(&mut state, 0.1);
        assert!((state.particles[0].life - 0.85).abs() < 1e-5);
        assert!((state.blade[0].life - 0.5).abs() < 1e-5);
        step(&mut state, 0.1);
        // Blade point hits zero after 0.2s; particles last ~0.67s
        assert!(state.blade.is_empty());
        assert_eq!(state.particles.len(), 1);
        for _ in 0..5 {
            step(&mut state, 0.1);
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_no_updates_after_game_over() {
        let mut state = active_state();
        place(
            &mut state,
            FruitKind::Apple,
            Vec2::new(100.0, 100.0),
            Vec2::ZERO,
        );
        state.trigger_game_over();
        let pos = state.entities[0].pos;
        for _ in 0..100 {
            assert!(!step(&mut state, 0.05));
        }
        assert_eq!(state.entities.len(), 1);
        assert_eq!(state.entities[0].pos, pos);
    }

    #[test]
    fn test_three_misses_end_the_run() {
        let mut state = active_state();
        for x in [200.0, 400.0, 600.0] {
            place(
                &mut state,
                FruitKind::Watermelon,
                Vec2::new(x, 699.0),
                Vec2::new(0.0, 200.0),
            );
        }
        step(&mut state, 0.016);
        assert_eq!(state.lives, 0);
        assert!(state.is_game_over());
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = active_state();
        let mut state2 = active_state();
        for i in 0..600 {
            let dt = 0.008 + (i % 7) as f32 * 0.002;
            step(&mut state1, dt);
            step(&mut state2, dt);
        }
        assert_eq!(state1.entities, state2.entities);
        assert_eq!(state1.difficulty, state2.difficulty);
        assert_eq!(state1.lives, state2.lives);
    }
}
