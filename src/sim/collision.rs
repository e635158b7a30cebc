//! Blade collision detection and slice response
//!
//! Each gesture sample forms a segment with the previous sample. Every
//! unsliced entity whose center lies within its radius of that segment is hit:
//! bombs end the run, fruit split into two separating halves plus a juice burst.

use glam::Vec2;
use rand::Rng;

use super::state::{BladePoint, Entity, GameEvent, Particle, SimState};
use crate::audio::SoundEffect;
use crate::consts::JUICE_PARTICLES;
use crate::{normalize_or_unit, point_segment_distance};

/// Whether a blade segment passes through an entity's hitbox
#[inline]
pub fn segment_hits(entity: &Entity, a: Vec2, b: Vec2) -> bool {
    entity.is_collidable() && point_segment_distance(entity.pos, a, b) < entity.radius
}

/// Record a gesture sample and resolve the newest blade segment
///
/// Samples outside an active session are ignored. Returns the number of
/// fruit sliced by this sample.
pub fn on_gesture_point(state: &mut SimState, pos: Vec2) -> usize {
    if !state.is_active() {
        return 0;
    }

    state.blade.push(BladePoint { pos, life: 1.0 });

    let n = state.blade.len();
    if n < 2 {
        return 0;
    }
    let (a, b) = (state.blade[n - 2].pos, state.blade[n - 1].pos);
    resolve_segment(state, a, b)
}

/// Test one blade segment against every collidable entity
///
/// Hits are processed in entity order. A bomb hit ends the run and stops the
/// pass, so nothing after it scores.
pub fn resolve_segment(state: &mut SimState, a: Vec2, b: Vec2) -> usize {
    let blade_dir = b - a;
    let mut sliced = 0;
    let mut halves = Vec::new();

    let entities = std::mem::take(&mut state.entities);
    let mut survivors = Vec::with_capacity(entities.len());

    for entity in entities {
        if !state.is_active() || !segment_hits(&entity, a, b) {
            survivors.push(entity);
            continue;
        }

        if entity.kind.is_bomb() {
            log::debug!("Blade hit bomb #{}", entity.id);
            state.trigger_game_over();
            survivors.push(entity);
            continue;
        }

        slice_fruit(state, &entity, blade_dir, &mut halves);
        sliced += 1;
    }

    survivors.append(&mut halves);
    state.entities = survivors;
    state.enforce_particle_cap();

    sliced
}

/// Score a fruit and replace it with its halves and a juice burst
fn slice_fruit(
    state: &mut SimState,
    parent: &Entity,
    blade_dir: Vec2,
    halves: &mut Vec<Entity>,
) {
    state.push_event(GameEvent::Sound(SoundEffect::Slice));
    state.push_event(GameEvent::Sound(SoundEffect::Squish));
    state.add_score();

    // Normal to the blade; halves fly apart along it
    let n = normalize_or_unit(blade_dir);
    let ortho = Vec2::new(-n.y, n.x);

    for dir in [1.0, -1.0] {
        let id = state.next_entity_id();
        halves.push(make_half(parent, id, ortho, dir, &state.tuning));
    }

    log::debug!(
        "Sliced {:?} #{} (score {})",
        parent.kind,
        parent.id,
        state.score
    );

    spawn_juice(state, parent, ortho);
}

/// One sliced half moving away from the cut along `ortho * dir`
pub fn make_half(
    parent: &Entity,
    id: u32,
    ortho: Vec2,
    dir: f32,
    tuning: &crate::Tuning,
) -> Entity {
    Entity {
        id,
        kind: parent.kind,
        pos: parent.pos,
        vel: parent.vel + ortho * dir * tuning.half_separation,
        rotation: parent.rotation,
        rotation_speed: parent.rotation_speed + dir * tuning.half_spin,
        radius: parent.radius * tuning.half_radius_scale,
        sliced: true,
        trail: Default::default(),
    }
}

/// Burst of juice droplets biased along the blade normal
fn spawn_juice(state: &mut SimState, parent: &Entity, ortho: Vec2) {
    let color = parent.kind.flesh_color();
    for _ in 0..JUICE_PARTICLES {
        let jitter = Vec2::new(
            (state.rng.random::<f32>() - 0.5) * 400.0,
            (state.rng.random::<f32>() - 0.5) * 400.0,
        );
        let size = state.rng.random::<f32>() * 5.0 + 2.0;
        state.particles.push(Particle {
            pos: parent.pos,
            vel: jitter + ortho * 100.0,
            color,
            life: 1.0,
            size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::FruitKind;
    use crate::tuning::Tuning;

    fn active_state() -> SimState {
        let mut state = SimState::new(2024, Tuning::default());
        state.init(800.0, 600.0);
        state.drain_events();
        state
    }

    fn place(state: &mut SimState, kind: FruitKind, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        let e = Entity::new(id, kind, pos, &state.tuning);
        state.entities.push(e);
        id
    }

    fn swipe(state: &mut SimState, from: Vec2, to: Vec2) -> usize {
        on_gesture_point(state, from);
        on_gesture_point(state, to)
    }

    #[test]
    fn test_single_point_never_slices() {
        let mut state = active_state();
        place(&mut state, FruitKind::Apple, Vec2::new(400.0, 300.0));
        assert_eq!(on_gesture_point(&mut state, Vec2::new(400.0, 300.0)), 0);
        assert_eq!(state.blade.len(), 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_fruit_slice_creates_halves_and_juice() {
        let mut state = active_state();
        let id = place(&mut state, FruitKind::Watermelon, Vec2::new(400.0, 300.0));
        state.entities[0].vel = Vec2::new(20.0, -300.0);

        let sliced = swipe(&mut state, Vec2::new(300.0, 300.0), Vec2::new(500.0, 300.0));

        assert_eq!(sliced, 1);
        assert_eq!(state.score, 1);
        assert!(state.entities.iter().all(|e| e.id != id));
        assert_eq!(state.entities.len(), 2);
        assert_eq!(state.particles.len(), JUICE_PARTICLES);

        // Blade along +x: normal is (0, 1)
        let mut vys: Vec<f32> = state.entities.iter().map(|e| e.vel.y).collect();
        vys.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((vys[0] - (-300.0 - 150.0)).abs() < 1e-3);
        assert!((vys[1] - (-300.0 + 150.0)).abs() < 1e-3);
        for half in &state.entities {
            assert!(half.sliced);
            assert_eq!(half.kind, FruitKind::Watermelon);
            assert!((half.vel.x - 20.0).abs() < 1e-3);
            assert!((half.radius - 48.0).abs() < 1e-4);
            assert!(half.trail.is_empty());
            assert_ne!(half.id, id);
        }
        let spins: Vec<f32> = state.entities.iter().map(|e| e.rotation_speed).collect();
        assert!(spins.contains(&2.0) && spins.contains(&-2.0));

        for p in &state.particles {
            assert_eq!(p.pos, Vec2::new(400.0, 300.0));
            assert_eq!(p.life, 1.0);
            assert!(p.size >= 2.0 && p.size < 7.0);
            assert_eq!(p.color, FruitKind::Watermelon.flesh_color());
            // Jitter is ±200 around the +100 normal bias
            assert!(p.vel.y >= -100.0 && p.vel.y <= 300.0);
        }

        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::Sound(SoundEffect::Slice),
                GameEvent::Sound(SoundEffect::Squish),
                GameEvent::ScoreChanged(1),
            ]
        );
    }

    #[test]
    fn test_bomb_hit_ends_game_without_score() {
        let mut state = active_state();
        place(&mut state, FruitKind::Bomb, Vec2::new(400.0, 300.0));

        swipe(&mut state, Vec2::new(400.0, 200.0), Vec2::new(400.0, 400.0));
        assert!(state.is_game_over());
        assert_eq!(state.score, 0);

        // Further swipes are ignored
        swipe(&mut state, Vec2::new(400.0, 200.0), Vec2::new(400.0, 400.0));
        let game_overs = state
            .events()
            .iter()
            .filter(|e| **e == GameEvent::GameOver)
            .count();
        assert_eq!(game_overs, 1);
        assert!(!state.events().iter().any(|e| matches!(e, GameEvent::ScoreChanged(_))));
    }

    #[test]
    fn test_combo_slices_every_fruit_on_segment() {
        let mut state = active_state();
        for x in [150.0, 300.0, 450.0, 600.0] {
            place(&mut state, FruitKind::Orange, Vec2::new(x, 300.0));
        }
        place(&mut state, FruitKind::Apple, Vec2::new(400.0, 500.0));

        let sliced = swipe(&mut state, Vec2::new(100.0, 300.0), Vec2::new(700.0, 310.0));
        assert_eq!(sliced, 4);
        assert_eq!(state.score, 4);
        assert_eq!(state.entities.iter().filter(|e| e.sliced).count(), 8);
        assert_eq!(state.entities.iter().filter(|e| !e.sliced).count(), 1);
        assert_eq!(state.particles.len(), 4 * JUICE_PARTICLES);
    }

    #[test]
    fn test_fruit_after_bomb_is_not_scored() {
        let mut state = active_state();
        place(&mut state, FruitKind::Apple, Vec2::new(200.0, 300.0));
        place(&mut state, FruitKind::Bomb, Vec2::new(400.0, 300.0));
        place(&mut state, FruitKind::Mango, Vec2::new(600.0, 300.0));

        swipe(&mut state, Vec2::new(100.0, 300.0), Vec2::new(700.0, 300.0));

        assert!(state.is_game_over());
        assert_eq!(state.score, 1);
        let mango = state
            .entities
            .iter()
            .find(|e| e.kind == FruitKind::Mango)
            .unwrap();
        assert!(!mango.sliced);
    }

    #[test]
    fn test_halves_never_collide_again() {
        let mut state = active_state();
        place(&mut state, FruitKind::Pineapple, Vec2::new(400.0, 300.0));
        swipe(&mut state, Vec2::new(300.0, 300.0), Vec2::new(500.0, 300.0));
        let count = state.entities.len();
        on_gesture_point(&mut state, Vec2::new(300.0, 300.0));
        on_gesture_point(&mut state, Vec2::new(500.0, 300.0));
        assert_eq!(state.score, 1);
        assert_eq!(state.entities.len(), count);
    }

    #[test]
    fn test_stationary_sample_pair_acts_as_point() {
        let mut state = active_state();
        place(&mut state, FruitKind::Apple, Vec2::new(400.0, 300.0));
        // Zero-length segment inside the hitbox still slices, with a NaN-free normal
        let sliced = swipe(&mut state, Vec2::new(410.0, 300.0), Vec2::new(410.0, 300.0));
        assert_eq!(sliced, 1);
        for e in &state.entities {
            assert!(e.vel.x.is_finite() && e.vel.y.is_finite());
        }
    }

    #[test]
    fn test_edge_is_exclusive() {
        let mut state = active_state();
        place(&mut state, FruitKind::Apple, Vec2::new(400.0, 300.0));
        // Segment exactly one radius away does not hit
        let sliced = swipe(&mut state, Vec2::new(300.0, 360.0), Vec2::new(500.0, 360.0));
        assert_eq!(sliced, 0);
    }

    #[test]
    fn test_gesture_ignored_before_init() {
        let mut state = SimState::new(1, Tuning::default());
        on_gesture_point(&mut state, Vec2::new(1.0, 1.0));
        assert!(state.blade.is_empty());
    }

    #[test]
    fn test_particle_cap_applies_to_bursts() {
        let mut state = active_state();
        state.max_particles = 20;
        place(&mut state, FruitKind::Apple, Vec2::new(200.0, 300.0));
        place(&mut state, FruitKind::Apple, Vec2::new(500.0, 300.0));
        swipe(&mut state, Vec2::new(100.0, 300.0), Vec2::new(700.0, 300.0));
        assert_eq!(state.score, 2);
        assert_eq!(state.particles.len(), 20);
    }
}
