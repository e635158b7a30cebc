//! HTML canvas 2D backend

use glam::Vec2;
use std::f64::consts::PI;
use web_sys::CanvasRenderingContext2d;

use super::{DrawSurface, Stroke};
use crate::Color;

/// Draw surface forwarding to a `CanvasRenderingContext2d`
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    glow: bool,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        Self { ctx, glow: true }
    }

    /// Shadow blur is expensive on some browsers
    pub fn set_glow_enabled(&mut self, enabled: bool) {
        self.glow = enabled;
    }

    fn apply_stroke(&self, stroke: Stroke) {
        let css = stroke.color.css();
        self.ctx.set_stroke_style_str(&css);
        self.ctx.set_line_width(stroke.width as f64);
        if self.glow && stroke.glow > 0.0 {
            self.ctx.set_shadow_blur(stroke.glow as f64);
            self.ctx.set_shadow_color(&css);
        }
    }

    fn reset_shadow(&self) {
        self.ctx.set_shadow_blur(0.0);
    }
}

impl DrawSurface for CanvasSurface {
    fn clear(&mut self, width: f32, height: f32) {
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style_str(&Color::BLACK.css());
        self.ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn push_transform(&mut self, origin: Vec2, rotation: f32) {
        self.ctx.save();
        self.ctx.translate(origin.x as f64, origin.y as f64).ok();
        self.ctx.rotate(rotation as f64).ok();
    }

    fn pop_transform(&mut self) {
        self.ctx.restore();
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, 2.0 * PI)
            .ok();
        self.ctx.fill();
    }

    fn fill_half_disc(&mut self, center: Vec2, radius: f32, fill: Color, rim: Stroke) {
        self.ctx.set_fill_style_str(&fill.css());
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, PI, 2.0 * PI)
            .ok();
        self.ctx.close_path();
        self.ctx.fill();
        self.apply_stroke(rim);
        self.ctx.stroke();
        self.reset_shadow();
    }

    fn stroke_polyline(&mut self, points: &[Vec2], stroke: Stroke) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.stroke();
        self.reset_shadow();
    }

    fn stroke_quadratic(&mut self, from: Vec2, control: Vec2, to: Vec2, stroke: Stroke) {
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx
            .quadratic_curve_to(control.x as f64, control.y as f64, to.x as f64, to.y as f64);
        self.ctx.stroke();
        self.reset_shadow();
    }
}
