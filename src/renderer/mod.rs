//! Rendering
//!
//! `draw` walks the simulation state read-only and issues primitive calls on a
//! `DrawSurface`. Backends decide how primitives hit the screen: `MeshSurface`
//! tessellates into GPU-ready triangles, `CanvasSurface` (web only) forwards to
//! a 2D canvas.

pub mod mesh;
pub mod shapes;
pub mod vertex;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use mesh::MeshSurface;
pub use vertex::Vertex;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use glam::Vec2;

use crate::Color;
use crate::settings::Settings;
use crate::sim::{Entity, SimState};

/// Line style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    /// Glow radius (0 = none)
    pub glow: f32,
}

impl Stroke {
    pub const fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            glow: 0.0,
        }
    }

    pub const fn with_glow(mut self, glow: f32) -> Self {
        self.glow = glow;
        self
    }
}

/// 2D drawing surface
///
/// Coordinates are play-area units with +y down. Transforms nest: every
/// `push_transform` must be matched by a `pop_transform`.
pub trait DrawSurface {
    /// Wipe the frame
    fn clear(&mut self, width: f32, height: f32);
    /// Enter a frame translated to `origin` and rotated by `rotation` radians
    fn push_transform(&mut self, origin: Vec2, rotation: f32);
    fn pop_transform(&mut self);
    /// Opacity applied to subsequent primitives
    fn set_alpha(&mut self, alpha: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// Upper half disc (the cut face of a sliced fruit) outlined with `rim`
    fn fill_half_disc(&mut self, center: Vec2, radius: f32, fill: Color, rim: Stroke);
    fn stroke_polyline(&mut self, points: &[Vec2], stroke: Stroke);
    fn stroke_quadratic(&mut self, from: Vec2, control: Vec2, to: Vec2, stroke: Stroke);
}

const BOMB_BODY: Color = Color::BLACK;
const BOMB_SHINE: Color = Color(0x333333);
const FUSE: Color = Color(0x8b4513);
const SPARK: Color = Color(0xffa500);
const BLADE_GLOW: f32 = 10.0;
const RIM_WIDTH: f32 = 4.0;
const TRAIL_ALPHA: f32 = 0.4;

/// Draw one frame of the simulation
pub fn draw<S: DrawSurface + ?Sized>(state: &SimState, settings: &Settings, surface: &mut S) {
    surface.clear(state.width, state.height);
    surface.set_alpha(1.0);

    draw_blade(state, settings, surface);

    for entity in &state.entities {
        if entity.sliced && settings.trails {
            draw_juice_trail(entity, settings, surface);
        }
        draw_entity(state, entity, surface);
    }

    for particle in &state.particles {
        surface.set_alpha(particle.life);
        surface.fill_circle(particle.pos, particle.size, particle.color);
    }
    surface.set_alpha(1.0);
}

fn draw_blade<S: DrawSurface + ?Sized>(state: &SimState, settings: &Settings, surface: &mut S) {
    if state.blade.len() < 2 {
        return;
    }
    let points: Vec<Vec2> = state.blade.iter().map(|p| p.pos).collect();
    let mut stroke = Stroke::new(Color::WHITE, state.tuning.blade_width);
    if settings.blade_glow {
        stroke = stroke.with_glow(BLADE_GLOW);
    }
    surface.stroke_polyline(&points, stroke);
}

/// Tapered juice stream: thin and faint at the tail, full width at the half
fn draw_juice_trail<S: DrawSurface + ?Sized>(
    entity: &Entity,
    settings: &Settings,
    surface: &mut S,
) {
    let len = entity.trail.len();
    if len < 2 {
        return;
    }
    let keep = ((len as f32 * settings.quality.trail_quality()).ceil() as usize).clamp(2, len);
    let points: Vec<Vec2> = entity.trail.iter().skip(len - keep).copied().collect();

    let color = entity.kind.flesh_color();
    let full_width = entity.radius * 0.8;
    let last = points.len() - 1;

    for (i, pair) in points.windows(2).enumerate() {
        // 0 at the tail, 1 at the head
        let progress = i as f32 / last as f32;
        surface.set_alpha(TRAIL_ALPHA * progress);
        surface.stroke_polyline(pair, Stroke::new(color, full_width * progress));
    }

    surface.set_alpha(TRAIL_ALPHA);
    surface.stroke_polyline(&[points[last], entity.pos], Stroke::new(color, full_width));
    surface.set_alpha(1.0);
}

fn draw_entity<S: DrawSurface + ?Sized>(state: &SimState, entity: &Entity, surface: &mut S) {
    let r = entity.radius;
    surface.push_transform(entity.pos, entity.rotation);

    if entity.kind.is_bomb() {
        surface.fill_circle(Vec2::ZERO, r, BOMB_BODY);
        surface.fill_circle(Vec2::new(-15.0, -15.0), 10.0, BOMB_SHINE);
        if !entity.sliced {
            let tip = Vec2::new(20.0, -r - 5.0);
            surface.stroke_quadratic(
                Vec2::new(0.0, -r),
                Vec2::new(10.0, -r - 10.0),
                tip,
                Stroke::new(FUSE, 4.0),
            );
            if spark_lit(state.frame, entity.id) {
                surface.fill_circle(tip, 5.0, SPARK);
            }
        }
    } else if entity.sliced {
        surface.fill_half_disc(
            Vec2::ZERO,
            r,
            entity.kind.flesh_color(),
            Stroke::new(entity.kind.rind_color(), RIM_WIDTH),
        );
    } else {
        surface.fill_circle(Vec2::ZERO, r, entity.kind.rind_color());
        // Highlight
        surface.set_alpha(0.2);
        surface.fill_circle(Vec2::new(-r / 3.0, -r / 3.0), r / 4.0, Color::WHITE);
        surface.set_alpha(1.0);
    }

    surface.pop_transform();
}

/// Fuse spark flicker, staggered per bomb
#[inline]
fn spark_lit(frame: u64, id: u32) -> bool {
    (frame / 4 + id as u64) % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::settings::QualityPreset;
    use crate::sim::{FruitKind, on_gesture_point, step};

    /// Records primitive calls for inspection
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        depth: i32,
        max_depth: i32,
    }

    impl DrawSurface for Recorder {
        fn clear(&mut self, width: f32, height: f32) {
            self.calls.push(format!("clear {width}x{height}"));
        }
        fn push_transform(&mut self, _origin: Vec2, _rotation: f32) {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
        }
        fn pop_transform(&mut self) {
            self.depth -= 1;
        }
        fn set_alpha(&mut self, _alpha: f32) {}
        fn fill_circle(&mut self, _center: Vec2, radius: f32, color: Color) {
            self.calls.push(format!("circle {radius} {}", color.css()));
        }
        fn fill_half_disc(&mut self, _center: Vec2, radius: f32, fill: Color, _rim: Stroke) {
            self.calls.push(format!("half {radius} {}", fill.css()));
        }
        fn stroke_polyline(&mut self, points: &[Vec2], stroke: Stroke) {
            self.calls
                .push(format!("line {} {} {}", points.len(), stroke.color.css(), stroke.glow));
        }
        fn stroke_quadratic(&mut self, _from: Vec2, _control: Vec2, _to: Vec2, _stroke: Stroke) {
            self.calls.push("fuse".to_string());
        }
    }

    fn active_state() -> SimState {
        let mut state = SimState::new(77, Tuning::default());
        state.init(800.0, 600.0);
        state
    }

    /// Push a motionless entity and return its index
    fn place(state: &mut SimState, kind: FruitKind, pos: Vec2) -> usize {
        let id = state.next_entity_id();
        let entity = Entity::new(id, kind, pos, &state.tuning);
        state.entities.push(entity);
        state.entities.len() - 1
    }

    #[test]
    fn test_draw_whole_fruit_and_bomb() {
        let mut state = active_state();
        place(&mut state, FruitKind::Orange, Vec2::new(100.0, 100.0));
        place(&mut state, FruitKind::Bomb, Vec2::new(300.0, 100.0));

        let mut rec = Recorder::default();
        draw(&state, &Settings::default(), &mut rec);

        assert_eq!(rec.calls[0], "clear 800x600");
        assert!(rec.calls.contains(&"circle 60 #ff7f00".to_string()));
        assert!(rec.calls.contains(&"circle 50 #000000".to_string()));
        assert!(rec.calls.contains(&"fuse".to_string()));
        assert_eq!(rec.depth, 0);
        assert_eq!(rec.max_depth, 1);
    }

    #[test]
    fn test_draw_does_not_mutate_and_shows_slices() {
        let mut state = active_state();
        place(&mut state, FruitKind::Apple, Vec2::new(400.0, 300.0));
        on_gesture_point(&mut state, Vec2::new(300.0, 300.0));
        on_gesture_point(&mut state, Vec2::new(500.0, 300.0));
        for _ in 0..5 {
            step(&mut state, 0.016);
        }

        let before_entities = state.entities.clone();
        let before_particles = state.particles.clone();
        let mut rec = Recorder::default();
        draw(&state, &Settings::default(), &mut rec);
        assert_eq!(state.entities, before_entities);
        assert_eq!(state.particles, before_particles);

        let halves = rec.calls.iter().filter(|c| c.starts_with("half")).count();
        assert_eq!(halves, 2);
        // Blade polyline with glow
        assert!(rec.calls.iter().any(|c| c == "line 2 #ffffff 10"));
        // Juice trails in flesh color
        assert!(rec.calls.iter().any(|c| c.starts_with("line 2 #ffffe0")));
        let particles = rec
            .calls
            .iter()
            .filter(|c| c.starts_with("circle") && c.ends_with("#ffffe0"))
            .count();
        assert_eq!(particles, state.particles.len());
    }

    #[test]
    fn test_trails_toggle() {
        let mut state = active_state();
        let i = place(&mut state, FruitKind::Mango, Vec2::new(400.0, 300.0));
        state.entities[i].sliced = true;
        for _ in 0..10 {
            step(&mut state, 0.016);
        }
        let settings = Settings {
            trails: false,
            ..Default::default()
        };
        let mut rec = Recorder::default();
        draw(&state, &settings, &mut rec);
        assert!(!rec.calls.iter().any(|c| c.starts_with("line")));
    }

    /// Sliced mango half with a full 12-point trail
    fn state_with_long_trail() -> SimState {
        let mut state = active_state();
        let i = place(&mut state, FruitKind::Mango, Vec2::new(400.0, 300.0));
        state.entities[i].sliced = true;
        for _ in 0..15 {
            step(&mut state, 0.016);
        }
        assert_eq!(state.entities[0].trail.len(), crate::consts::TRAIL_LENGTH);
        state
    }

    fn trail_strokes(state: &SimState, settings: &Settings) -> usize {
        let mut rec = Recorder::default();
        draw(state, settings, &mut rec);
        let flesh = FruitKind::Mango.flesh_color().css();
        rec.calls
            .iter()
            .filter(|c| c.starts_with("line 2") && c.contains(&flesh))
            .count()
    }

    #[test]
    fn test_default_quality_draws_whole_trail() {
        let state = state_with_long_trail();
        // 11 segments plus the link to the half itself
        assert_eq!(trail_strokes(&state, &Settings::default()), 12);
        let high = Settings::from_preset(QualityPreset::High);
        assert_eq!(trail_strokes(&state, &high), 12);
    }

    #[test]
    fn test_low_quality_shortens_trail() {
        let state = state_with_long_trail();
        let low = Settings::from_preset(QualityPreset::Low);
        // Newest 6 points: 5 segments plus the link
        assert_eq!(trail_strokes(&state, &low), 6);
    }

    #[test]
    fn test_spark_flickers() {
        let lit: Vec<bool> = (0..16).map(|f| spark_lit(f, 1)).collect();
        assert!(lit.contains(&true) && lit.contains(&false));
    }
}
