//! Debug visualization for proximity force fields.
//!
//! Call `FieldGizmo::draw()` once per rendered frame to get the influence
//! ring of every sub-step plus a line to the nearest contact of each body,
//! colored from red (no falloff) to green (full strength).

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::collections::HashSet;

use crate::core::pose::{MotionHistory, Pose};
use crate::field::attractor::{ForceWorld, ProximityForceField};

const RING_SEGMENTS: usize = 24;
const RING_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// A polyline in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct GizmoLine {
    pub points: Vec<Vec3>,
    pub color: [f32; 4],
}

/// Line-list vertex for upload. 7 floats = 28 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GizmoVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl GizmoVertex {
    pub const FLOATS: usize = 7;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Expand polylines into a flat line list (two vertices per segment).
pub fn line_list(lines: &[GizmoLine]) -> Vec<GizmoVertex> {
    let mut out = Vec::new();
    for line in lines {
        for pair in line.points.windows(2) {
            for p in pair {
                out.push(GizmoVertex {
                    position: p.to_array(),
                    color: line.color,
                });
            }
        }
    }
    out
}

/// View of vertices as raw bytes.
pub fn as_bytes(vertices: &[GizmoVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Draws a field's sub-steps. Keeps its own pose history so drawing
/// never disturbs the physics tick's.
#[derive(Debug, Default)]
pub struct FieldGizmo {
    history: MotionHistory,
}

impl FieldGizmo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw<V, W>(
        &mut self,
        field: &ProximityForceField<V>,
        world: &W,
        current: Pose,
    ) -> Vec<GizmoLine>
    where
        V: Copy + Eq,
        W: ForceWorld<Volume = V>,
    {
        let config = field.config();
        let mut lines = Vec::new();
        let mut contacts = Vec::new();
        let mut visited = HashSet::new();

        for i in 0..config.sub_steps {
            let pose = self.history.blend_from(&current, field.sub_step_fraction(i));
            let m = pose.to_affine();
            lines.push(GizmoLine {
                points: ring_points(config.radius)
                    .map(|p| m.transform_point3(p))
                    .collect(),
                color: RING_COLOR,
            });

            let origin = Vec3::from(m.translation);
            field.rank_contacts(world, &m, &mut contacts);
            visited.clear();
            for contact in &contacts {
                let body = match world.attached_body(contact.volume) {
                    Some(b) => b,
                    None => continue,
                };
                if !visited.insert(body) {
                    continue;
                }
                let strength = config.falloff.evaluate(contact.distance / config.radius);
                let [r, g, b] = hsv_to_rgb(0.333 * strength, 1.0, 1.0);
                lines.push(GizmoLine {
                    points: vec![origin, contact.point],
                    color: [r, g, b, 1.0],
                });
            }
        }

        self.history.record(current);
        lines
    }
}

fn ring_points(radius: f32) -> impl Iterator<Item = Vec3> {
    (0..=RING_SEGMENTS).map(move |i| {
        let angle = (i as f32 / RING_SEGMENTS as f32) * std::f32::consts::TAU;
        Vec3::new(angle.cos() * radius, angle.sin() * radius, 0.0)
    })
}

/// HSV (all components in [0, 1]) to RGB. Hue wraps.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u32 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}
