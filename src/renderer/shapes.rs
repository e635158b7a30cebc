//! Shape generation for 2D primitives
//!
//! All generators emit triangle lists in local coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    fan(center, radius, 0.0, 2.0 * PI, color, segments)
}

/// Generate vertices for the upper half of a disc (+y is down)
pub fn half_disc(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    fan(center, radius, PI, 2.0 * PI, color, (segments / 2).max(2))
}

/// Outline points of the upper half disc, closed back to the start
pub fn half_disc_outline(center: Vec2, radius: f32, segments: u32) -> Vec<Vec2> {
    let segments = (segments / 2).max(2);
    let mut points: Vec<Vec2> = (0..=segments)
        .map(|i| {
            let theta = PI + (i as f32 / segments as f32) * PI;
            center + Vec2::new(theta.cos(), theta.sin()) * radius
        })
        .collect();
    points.push(points[0]);
    points
}

/// Triangle fan between two angles
fn fan(
    center: Vec2,
    radius: f32,
    start: f32,
    end: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let span = end - start;
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = start + (i as f32 / segments as f32) * span;
        let theta2 = start + ((i + 1) as f32 / segments as f32) * span;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a constant-width polyline (one quad per segment)
pub fn polyline(points: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 2 || width <= 0.0 {
        return Vec::new();
    }

    let half = width / 2.0;
    let mut vertices = Vec::with_capacity((points.len() - 1) * 6);

    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);

        // Direction from p1 to p2
        let dir = (p2 - p1).normalize_or_zero();
        if dir == Vec2::ZERO {
            continue;
        }
        // Perpendicular for width
        let perp = Vec2::new(-dir.y, dir.x) * half;

        // Quad corners
        let v1a = p1 + perp;
        let v1b = p1 - perp;
        let v2a = p2 + perp;
        let v2b = p2 - perp;

        // Two triangles
        vertices.push(Vertex::new(v1a.x, v1a.y, color));
        vertices.push(Vertex::new(v1b.x, v1b.y, color));
        vertices.push(Vertex::new(v2a.x, v2a.y, color));

        vertices.push(Vertex::new(v2a.x, v2a.y, color));
        vertices.push(Vertex::new(v1b.x, v1b.y, color));
        vertices.push(Vertex::new(v2b.x, v2b.y, color));
    }

    vertices
}

/// Sample a quadratic Bézier curve
pub fn quadratic_points(from: Vec2, control: Vec2, to: Vec2, samples: u32) -> Vec<Vec2> {
    let samples = samples.max(1);
    (0..=samples)
        .map(|i| {
            let t = i as f32 / samples as f32;
            let u = 1.0 - t;
            from * (u * u) + control * (2.0 * u * t) + to * (t * t)
        })
        .collect()
}
