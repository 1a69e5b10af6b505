use glam::Vec2;
use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};
use serde::{Deserialize, Serialize};

use crate::api::types::{EntityId, FieldId, FollowerId};
use crate::components::follower::BodyFollower;
use crate::core::physics::{ColliderDesc, PhysicsBody, PhysicsWorld, TriggerEvent};
use crate::core::time::{FixedTimestep, DEFAULT_DT, DEFAULT_MAX_STEPS};
use crate::error::ConfigError;
use crate::field::attractor::{ProximityForceField, TickReport};
use crate::field::config::FieldConfig;
use crate::field::gizmo::{FieldGizmo, GizmoLine};

/// Configuration for the host loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Fixed timestep in seconds (default: 1/60).
    #[serde(default = "default_fixed_dt")]
    pub fixed_dt: f32,
    /// Gravity vector (default: zero).
    #[serde(default)]
    pub gravity: [f32; 2],
    /// Fixed steps allowed per frame before backlog is dropped (default: 10).
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_fixed_dt() -> f32 {
    DEFAULT_DT
}

fn default_max_steps() -> u32 {
    DEFAULT_MAX_STEPS
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            fixed_dt: default_fixed_dt(),
            gravity: [0.0, 0.0],
            max_steps: default_max_steps(),
        }
    }
}

impl HostConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A field bound to the body that carries it and its trigger volume.
struct FieldSlot {
    body: RigidBodyHandle,
    sensor: ColliderHandle,
    field: ProximityForceField<ColliderHandle>,
    last_report: TickReport,
}

/// Fixed-step scheduler: owns the physics world and runs fields and
/// body followers once per tick, in order:
/// followers → fields → physics step → trigger routing.
pub struct Host {
    pub physics: PhysicsWorld,
    clock: FixedTimestep,
    fields: Vec<FieldSlot>,
    followers: Vec<BodyFollower>,
    trigger_events: Vec<TriggerEvent>,
    next_id: u32,
}

impl Host {
    /// The fixed timestep is clamped by `FixedTimestep`; physics runs at the clamped value.
    pub fn new(config: &HostConfig) -> Self {
        let clock = FixedTimestep::with_max_steps(config.fixed_dt, config.max_steps);
        let mut physics = PhysicsWorld::new(Vec2::from_array(config.gravity));
        physics.set_dt(clock.dt());
        Self {
            physics,
            clock,
            fields: Vec::new(),
            followers: Vec::new(),
            trigger_events: Vec::new(),
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn clock(&self) -> &FixedTimestep {
        &self.clock
    }

    /// Attach a force field to `body`. A ball trigger volume of the field's
    /// radius is added to the body.
    pub fn add_field(&mut self, body: RigidBodyHandle, config: FieldConfig) -> FieldId {
        let field = ProximityForceField::new(config);
        let radius = field.config().radius;
        let sensor = self.physics.create_sensor(body, &ColliderDesc::Ball { radius });
        log::debug!("field {} attached, radius {}", self.fields.len(), radius);

        self.fields.push(FieldSlot {
            body,
            sensor,
            field,
            last_report: TickReport::default(),
        });
        FieldId(self.fields.len() - 1)
    }

    pub fn field(&self, id: FieldId) -> Option<&ProximityForceField<ColliderHandle>> {
        self.fields.get(id.0).map(|slot| &slot.field)
    }

    /// Summary of the field's most recent tick.
    pub fn field_report(&self, id: FieldId) -> Option<TickReport> {
        self.fields.get(id.0).map(|slot| slot.last_report)
    }

    /// Reconfigure a field and resize its trigger volume to match.
    pub fn configure_field(&mut self, id: FieldId, config: FieldConfig) {
        let slot = match self.fields.get_mut(id.0) {
            Some(s) => s,
            None => return,
        };
        slot.field.configure(config);
        let radius = slot.field.config().radius;
        self.physics
            .set_collider_shape(slot.sensor, &ColliderDesc::Ball { radius });
    }

    /// Remove a body from the world and from every field's candidates.
    /// Fields carried by the removed body stop ticking.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        let colliders = self.physics.body_colliders(body.body_handle);
        if let Some(entity) = self.physics.body_entity(body.body_handle) {
            log::debug!("removing body of entity {}", entity.0);
        }
        for slot in &mut self.fields {
            for collider in &colliders {
                slot.field.on_volume_exited(*collider);
            }
        }
        self.physics.remove_body(body);
    }

    pub fn add_body_follower(&mut self, follower: BodyFollower) -> FollowerId {
        self.followers.push(follower);
        FollowerId(self.followers.len() - 1)
    }

    pub fn follower_mut(&mut self, id: FollowerId) -> Option<&mut BodyFollower> {
        self.followers.get_mut(id.0)
    }

    /// Feed one frame's elapsed time and run the fixed steps it pays for.
    /// Returns the number of steps run.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let steps = self.clock.accumulate(frame_dt);
        for _ in 0..steps {
            self.fixed_step();
        }
        steps
    }

    /// Run exactly one fixed step.
    pub fn fixed_step(&mut self) {
        let dt = self.clock.dt();

        for follower in &self.followers {
            follower.fixed_update(&mut self.physics, dt);
        }

        for slot in &mut self.fields {
            if !self.physics.contains_body(slot.body) {
                continue;
            }
            let pose = self.physics.body_pose(slot.body);
            slot.last_report = slot.field.tick(&mut self.physics, pose, dt);
        }

        self.physics.step_into(&mut self.trigger_events);
        self.route_trigger_events();
    }

    fn route_trigger_events(&mut self) {
        for event in self.trigger_events.drain(..) {
            let slot = match self.fields.iter_mut().find(|s| s.sensor == event.sensor) {
                Some(s) => s,
                None => continue,
            };
            if event.entered {
                slot.field.on_volume_entered(event.other);
            } else {
                slot.field.on_volume_exited(event.other);
            }
        }
    }

    /// Debug lines for a field at its body's current pose.
    pub fn draw_field(&self, id: FieldId, gizmo: &mut FieldGizmo) -> Vec<GizmoLine> {
        match self.fields.get(id.0) {
            Some(slot) => {
                let pose = self.physics.body_pose(slot.body);
                gizmo.draw(&slot.field, &self.physics, pose)
            }
            None => Vec::new(),
        }
    }
}
