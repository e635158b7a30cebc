//! Fruit Slicer - a blade-gesture arcade game
//!
//! Core modules:
//! - `sim`: Simulation (spawning, physics, blade collision, slicing, game state)
//! - `engine`: Clock/input driven facade that dispatches notifications and audio
//! - `renderer`: Draw contract and a tessellating mesh backend
//! - `audio`: Sound trigger points and the Web Audio synthesizer
//! - `input`: Pointer routing for browser hosts
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences (quality, trails, volume)

pub mod audio;
pub mod engine;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use engine::{GameEngine, GameListener, NullListener, Snapshot};
pub use settings::{QualityPreset, Settings};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants that are not balance knobs
pub mod consts {
    /// Maximum points kept in a sliced half's juice trail
    pub const TRAIL_LENGTH: usize = 12;
    /// Particles emitted per sliced fruit
    pub const JUICE_PARTICLES: usize = 15;
    /// Default play area (used before the host reports a real size)
    pub const DEFAULT_WIDTH: f32 = 800.0;
    pub const DEFAULT_HEIGHT: f32 = 600.0;
}

/// Packed 0xRRGGBB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);
    pub const BLACK: Color = Color(0x000000);

    #[inline]
    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// Normalized RGBA for GPU vertices
    pub fn rgba(self, alpha: f32) -> [f32; 4] {
        [
            self.r() as f32 / 255.0,
            self.g() as f32 / 255.0,
            self.b() as f32 / 255.0,
            alpha.clamp(0.0, 1.0),
        ]
    }

    /// CSS hex string (`#rrggbb`) for canvas backends
    pub fn css(self) -> String {
        format!("#{:06x}", self.0 & 0xff_ffff)
    }
}

/// Distance from `p` to the segment `a`-`b`
///
/// A zero-length segment degrades to the distance to `a`.
#[inline]
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    let t = if len_sq > 0.0 {
        ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance(a + seg * t)
}

/// Normalize `v`, dividing by 1 instead of 0 for a zero vector
#[inline]
pub fn normalize_or_unit(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > 0.0 { v / len } else { v }
}
