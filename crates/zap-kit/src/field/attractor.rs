//! Proximity force field.
//!
//! Pulls (or pushes) every rigid body whose collision volumes overlap the
//! field's trigger region. Each fixed tick is split into sub-steps spread
//! between the current pose and the previous tick's pose, so a field that
//! moves fast still acts on the bodies it sweeps past.

use std::collections::HashSet;
use std::hash::Hash;

use glam::{Affine3A, Vec3};

use crate::core::pose::{MotionHistory, Pose};
use crate::field::config::{DirectionSpace, FieldConfig};

/// The physics collaborator a field queries and pushes forces into.
///
/// Volumes and bodies are opaque handles owned by the physics engine.
pub trait ForceWorld {
    type Volume: Copy + Eq;
    type Body: Copy + Eq + Hash;

    /// Nearest point on `volume` to `point`, in world space.
    /// Points inside the volume map to themselves.
    fn closest_point(&self, volume: Self::Volume, point: Vec3) -> Vec3;

    /// The rigid body `volume` is attached to, if any.
    fn attached_body(&self, volume: Self::Volume) -> Option<Self::Body>;

    fn body_mass(&self, body: Self::Body) -> f32;

    /// Add a force at a world point, accumulating with other forces this tick.
    fn add_force_at_point(&mut self, body: Self::Body, force: Vec3, point: Vec3);
}

/// A candidate volume resolved against one sub-step transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact<V> {
    pub volume: V,
    /// Closest point on the volume, world space.
    pub point: Vec3,
    /// `point` in the field's local space for this sub-step.
    pub local: Vec3,
    /// Length of `local`.
    pub distance: f32,
}

/// What a tick did. Useful for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    pub speed_multiplier: f32,
    /// Share of the speed multiplier applied per sub-step.
    pub step_amount: f32,
    pub sub_steps: u32,
    /// Number of force applications across all sub-steps.
    pub applications: u32,
}

/// Attractor/repeller acting on the bodies inside its trigger volume.
#[derive(Debug, Clone)]
pub struct ProximityForceField<V> {
    config: FieldConfig,
    /// Overlapping volumes in arrival order. Set semantics.
    candidates: Vec<V>,
    history: MotionHistory,
    contacts: Vec<Contact<V>>,
}

impl<V: Copy + Eq> ProximityForceField<V> {
    pub fn new(config: FieldConfig) -> Self {
        Self {
            config: config.clamped(),
            candidates: Vec::new(),
            history: MotionHistory::Unset,
            contacts: Vec::new(),
        }
    }

    /// Replace the field parameters. Radius and sub-step count are clamped.
    pub fn configure(&mut self, config: FieldConfig) {
        let clamped = config.clone().clamped();
        if clamped != config {
            log::debug!(
                "field config clamped: radius {} -> {}, sub_steps {} -> {}",
                config.radius,
                clamped.radius,
                config.sub_steps,
                clamped.sub_steps
            );
        }
        self.config = clamped;
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// A volume started overlapping the trigger region.
    pub fn on_volume_entered(&mut self, volume: V) {
        if !self.candidates.contains(&volume) {
            self.candidates.push(volume);
        }
    }

    /// A volume stopped overlapping the trigger region. Unknown volumes are ignored.
    pub fn on_volume_exited(&mut self, volume: V) {
        self.candidates.retain(|v| *v != volume);
    }

    pub fn candidates(&self) -> &[V] {
        &self.candidates
    }

    pub fn contains(&self, volume: V) -> bool {
        self.candidates.contains(&volume)
    }

    pub fn history(&self) -> &MotionHistory {
        &self.history
    }

    /// Forget the previous pose so the next tick behaves like the first one.
    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    /// Evenly spaced sub-step fraction. Never reaches 1.
    pub fn sub_step_fraction(&self, index: u32) -> f32 {
        index as f32 / self.config.sub_steps as f32
    }

    /// Speed multiplier for moving from the recorded pose to `current` in `fixed_dt`.
    pub fn speed_multiplier(&self, current: &Pose, fixed_dt: f32) -> f32 {
        match self.history.previous() {
            Some(previous) if fixed_dt > 0.0 => {
                let traveled = current.position.distance(previous.position);
                self.config.speed_to_force.evaluate(traveled / fixed_dt)
            }
            _ => 1.0,
        }
    }

    /// Run one fixed physics step at `current` pose.
    pub fn tick<W>(&mut self, world: &mut W, current: Pose, fixed_dt: f32) -> TickReport
    where
        W: ForceWorld<Volume = V>,
    {
        let speed_multiplier = self.speed_multiplier(&current, fixed_dt);
        let sub_steps = self.config.sub_steps;
        let step_amount = speed_multiplier / sub_steps as f32;

        let mut report = TickReport {
            speed_multiplier,
            step_amount,
            sub_steps,
            applications: 0,
        };

        let mut visited = HashSet::new();
        for i in 0..sub_steps {
            let pose = self.history.blend_from(&current, self.sub_step_fraction(i));
            let m = pose.to_affine();
            report.applications += self.apply_sub_step(world, &m, step_amount, &mut visited);
        }

        self.history.record(current);
        report
    }

    fn apply_sub_step<W>(
        &mut self,
        world: &mut W,
        m: &Affine3A,
        amount: f32,
        visited: &mut HashSet<W::Body>,
    ) -> u32
    where
        W: ForceWorld<Volume = V>,
    {
        let mut contacts = std::mem::take(&mut self.contacts);
        self.rank_contacts(&*world, m, &mut contacts);
        visited.clear();

        let mut applied = 0;
        for contact in &contacts {
            let body = match world.attached_body(contact.volume) {
                Some(b) => b,
                None => continue,
            };
            if !visited.insert(body) {
                continue;
            }

            let mut magnitude =
                self.config.force * self.config.falloff.evaluate(contact.distance / self.config.radius);
            if self.config.mass_scaling {
                magnitude *= world.body_mass(body);
            }
            magnitude *= amount;

            let direction = match self.config.direction_space {
                DirectionSpace::Local => (-contact.local).normalize_or_zero(),
                DirectionSpace::World => m.transform_vector3(-contact.local).normalize_or_zero(),
            };
            // A contact at the origin has no direction: it claims the body but pushes nothing.
            if direction == Vec3::ZERO {
                continue;
            }

            log::trace!(
                "field force {:.4} at ({:.3}, {:.3}, {:.3}), distance {:.3}",
                magnitude,
                contact.point.x,
                contact.point.y,
                contact.point.z,
                contact.distance
            );
            world.add_force_at_point(body, direction * magnitude, contact.point);
            applied += 1;
        }

        self.contacts = contacts;
        applied
    }

    /// Resolve every candidate against the sub-step transform `m`, nearest first.
    /// Ties keep arrival order. A degenerate `m` (zero scale) puts every
    /// contact at the local origin.
    pub fn rank_contacts<W>(&self, world: &W, m: &Affine3A, out: &mut Vec<Contact<V>>)
    where
        W: ForceWorld<Volume = V>,
    {
        out.clear();
        let origin = Vec3::from(m.translation);
        let inverse = m.inverse();
        out.extend(self.candidates.iter().map(|&volume| {
            let point = world.closest_point(volume, origin);
            let local = inverse.transform_point3(point);
            let local = if local.is_finite() { local } else { Vec3::ZERO };
            Contact {
                volume,
                point,
                local,
                distance: local.length(),
            }
        }));
        out.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    }
}
