//! Tessellating draw surface
//!
//! Turns primitive calls into a flat triangle list in play-area coordinates,
//! ready to be converted to NDC and uploaded as a single vertex buffer.

use glam::{Affine2, Vec2};

use super::shapes;
use super::vertex::{Vertex, colors};
use super::{DrawSurface, Stroke};
use crate::Color;
use crate::settings::QualityPreset;

/// Opacity of the widened glow pass under a glowing stroke
const GLOW_ALPHA: f32 = 0.25;
/// Samples per quadratic curve
const CURVE_SAMPLES: u32 = 8;

/// Triangle-list backend
#[derive(Debug, Clone)]
pub struct MeshSurface {
    vertices: Vec<Vertex>,
    transforms: Vec<Affine2>,
    alpha: f32,
    segments: u32,
    size: Vec2,
}

impl MeshSurface {
    pub fn new(segments: u32) -> Self {
        Self {
            vertices: Vec::new(),
            transforms: vec![Affine2::IDENTITY],
            alpha: 1.0,
            segments: segments.max(3),
            size: Vec2::ONE,
        }
    }

    pub fn for_quality(quality: QualityPreset) -> Self {
        Self::new(quality.circle_segments())
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Raw bytes for a vertex buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Convert play-area coordinates to normalized device coordinates
    /// Play area is top-left origin with +y down; NDC is -1 to 1 with +y up
    pub fn to_ndc(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x / self.size.x * 2.0 - 1.0, 1.0 - p.y / self.size.y * 2.0)
    }

    /// Vertices converted to NDC
    pub fn ndc_vertices(&self) -> Vec<Vertex> {
        self.vertices
            .iter()
            .map(|v| {
                let p = self.to_ndc(Vec2::from(v.position));
                Vertex::new(p.x, p.y, v.color)
            })
            .collect()
    }

    fn current(&self) -> Affine2 {
        self.transforms.last().copied().unwrap_or(Affine2::IDENTITY)
    }

    /// Append local-space vertices through the current transform
    fn emit(&mut self, local: Vec<Vertex>) {
        let xf = self.current();
        self.vertices.extend(local.into_iter().map(|v| {
            let p = xf.transform_point2(Vec2::from(v.position));
            Vertex::new(p.x, p.y, v.color)
        }));
    }

    fn color(&self, color: Color) -> [f32; 4] {
        color.rgba(self.alpha)
    }

    fn stroke_points(&mut self, points: &[Vec2], stroke: Stroke) {
        if stroke.glow > 0.0 {
            let glow = stroke.color.rgba(self.alpha * GLOW_ALPHA);
            self.emit(shapes::polyline(points, stroke.width + stroke.glow * 2.0, glow));
        }
        let color = self.color(stroke.color);
        self.emit(shapes::polyline(points, stroke.width, color));
    }
}

impl Default for MeshSurface {
    fn default() -> Self {
        Self::for_quality(QualityPreset::default())
    }
}

impl DrawSurface for MeshSurface {
    fn clear(&mut self, width: f32, height: f32) {
        self.vertices.clear();
        self.transforms.truncate(1);
        self.alpha = 1.0;
        self.size = Vec2::new(width.max(1.0), height.max(1.0));

        // Background quad
        let (w, h) = (width, height);
        let bg = colors::BACKGROUND;
        self.vertices.extend([
            Vertex::new(0.0, 0.0, bg),
            Vertex::new(w, 0.0, bg),
            Vertex::new(0.0, h, bg),
            Vertex::new(w, 0.0, bg),
            Vertex::new(w, h, bg),
            Vertex::new(0.0, h, bg),
        ]);
    }

    fn push_transform(&mut self, origin: Vec2, rotation: f32) {
        let xf = self.current() * Affine2::from_angle_translation(rotation, origin);
        self.transforms.push(xf);
    }

    fn pop_transform(&mut self) {
        if self.transforms.len() > 1 {
            self.transforms.pop();
        }
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let color = self.color(color);
        self.emit(shapes::circle(center, radius, color, self.segments));
    }

    fn fill_half_disc(&mut self, center: Vec2, radius: f32, fill: Color, rim: Stroke) {
        let color = self.color(fill);
        self.emit(shapes::half_disc(center, radius, color, self.segments));
        let outline = shapes::half_disc_outline(center, radius, self.segments);
        self.stroke_points(&outline, rim);
    }

    fn stroke_polyline(&mut self, points: &[Vec2], stroke: Stroke) {
        self.stroke_points(points, stroke);
    }

    fn stroke_quadratic(&mut self, from: Vec2, control: Vec2, to: Vec2, stroke: Stroke) {
        let points = shapes::quadratic_points(from, control, to, CURVE_SAMPLES);
        self.stroke_points(&points, stroke);
    }
}
