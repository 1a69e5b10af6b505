use glam::{Vec2, Vec3};
use rapier2d::parry::query::PointQuery;
use rapier2d::prelude::*;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::api::types::EntityId;
use crate::core::pose::Pose;
use crate::field::attractor::ForceWorld;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam <-> rapier math
// ---------------------------------------------------------------------------

fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y]
}

fn from_vector(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
    /// Moved by `set_kinematic_position`; pushes dynamic bodies but ignores forces.
    KinematicPositionBased,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
            BodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
        }
    }
}

/// Shape description for a collider or trigger volume.
#[derive(Debug, Clone, Copy)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

impl ColliderDesc {
    fn builder(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
        }
    }
}

/// Physical material properties for a solid collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Builder for describing a rigid body before creation.
/// Only dynamic bodies rotate and feel gravity.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub rotation: f32,
    pub collider: ColliderDesc,
}

impl BodyDesc {
    fn with_type(body_type: BodyType, collider: ColliderDesc) -> Self {
        Self {
            body_type,
            position: Vec2::ZERO,
            rotation: 0.0,
            collider,
        }
    }

    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self::with_type(BodyType::Dynamic, collider)
    }

    pub fn fixed(collider: ColliderDesc) -> Self {
        Self::with_type(BodyType::Fixed, collider)
    }

    /// Body moved by setting target positions, e.g. a follower or a moving field.
    pub fn kinematic(collider: ColliderDesc) -> Self {
        Self::with_type(BodyType::KinematicPositionBased, collider)
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

}

/// Handle pair for a body and the collider it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// A collider started or stopped overlapping a trigger volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub sensor: ColliderHandle,
    pub other: ColliderHandle,
    /// `true` on enter, `false` on exit.
    pub entered: bool,
}

// ---------------------------------------------------------------------------
// Event collector
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<CollisionEvent> {
        let mut guard = self.collisions.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *guard)
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Rapier2D world with trigger volumes. Positions live on the XY plane;
/// 3D queries from force fields drop Z.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
    sensors: HashSet<ColliderHandle>,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: to_vector(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
            sensors: HashSet::new(),
        }
    }

    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Create a rigid body with one solid collider.
    /// The EntityId is stored in the body's `user_data`.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let dynamic = desc.body_type == BodyType::Dynamic;
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(to_vector(desc.position))
            .rotation(desc.rotation)
            .gravity_scale(if dynamic { 1.0 } else { 0.0 })
            .locked_axes(if dynamic {
                LockedAxes::empty()
            } else {
                LockedAxes::ROTATION_LOCKED
            })
            .user_data(entity_id.0 as u128)
            .build();

        let body_handle = self.bodies.insert(rb);
        let collider_handle = self.attach_collider(body_handle, &desc.collider, Vec2::ZERO, material);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Add another solid collider to an existing body at a local offset.
    pub fn attach_collider(
        &mut self,
        body: RigidBodyHandle,
        shape: &ColliderDesc,
        offset: Vec2,
        material: ColliderMaterial,
    ) -> ColliderHandle {
        let collider = shape
            .builder()
            .translation(to_vector(offset))
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .build();
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies)
    }

    /// Add a massless trigger volume to a body. Overlaps are reported by `step_into`.
    pub fn create_sensor(&mut self, body: RigidBodyHandle, shape: &ColliderDesc) -> ColliderHandle {
        let collider = shape
            .builder()
            .sensor(true)
            .density(0.0)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .active_collision_types(ActiveCollisionTypes::all())
            .build();
        let handle = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);
        self.sensors.insert(handle);
        handle
    }

    /// Replace the shape of an existing collider, e.g. after a field changes radius.
    pub fn set_collider_shape(&mut self, collider: ColliderHandle, shape: &ColliderDesc) {
        if let Some(c) = self.colliders.get_mut(collider) {
            c.set_shape(shape.builder().shape);
        }
    }

    /// Remove a body and all its colliders.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        if let Some(rb) = self.bodies.get(body.body_handle) {
            for collider in rb.colliders() {
                self.sensors.remove(collider);
            }
        }
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Step the simulation and collect trigger overlap changes.
    /// Forces added before the step are consumed by it.
    pub fn step_into(&mut self, trigger_events: &mut Vec<TriggerEvent>) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        for (_, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
            rb.reset_torques(false);
        }

        for event in self.event_collector.drain() {
            let (h1, h2, entered) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };
            for (sensor, other) in [(h1, h2), (h2, h1)] {
                if self.sensors.contains(&sensor) {
                    trigger_events.push(TriggerEvent {
                        sensor,
                        other,
                        entered,
                    });
                }
            }
        }
    }

    /// Target position and rotation for a kinematic body, reached during the next step.
    pub fn set_kinematic_position(&mut self, body: RigidBodyHandle, pos: Vec2, rotation: f32) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.set_next_kinematic_position(Isometry::new(to_vector(pos), rotation));
        }
    }

    /// Current position and rotation of a body.
    pub fn body_position(&self, body: RigidBodyHandle) -> (Vec2, f32) {
        self.bodies
            .get(body)
            .map(|rb| (from_vector(rb.translation()), rb.rotation().angle()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Body transform as a 3D pose on the XY plane.
    pub fn body_pose(&self, body: RigidBodyHandle) -> Pose {
        let (pos, rot) = self.body_position(body);
        Pose::planar(pos, rot)
    }

    pub fn body_entity(&self, body: RigidBodyHandle) -> Option<EntityId> {
        self.bodies.get(body).map(|rb| EntityId(rb.user_data as u32))
    }

    pub fn collider_body(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        let parent = self.colliders.get(collider)?.parent()?;
        self.bodies.contains(parent).then_some(parent)
    }

    /// Every collider attached to `body`, sensors included.
    pub fn body_colliders(&self, body: RigidBodyHandle) -> Vec<ColliderHandle> {
        self.bodies
            .get(body)
            .map(|rb| rb.colliders().to_vec())
            .unwrap_or_default()
    }

    pub fn contains_body(&self, body: RigidBodyHandle) -> bool {
        self.bodies.contains(body)
    }
}

impl ForceWorld for PhysicsWorld {
    type Volume = ColliderHandle;
    type Body = RigidBodyHandle;

    fn closest_point(&self, volume: ColliderHandle, point: Vec3) -> Vec3 {
        match self.colliders.get(volume) {
            Some(collider) => {
                let projection =
                    collider
                        .shape()
                        .project_point(collider.position(), &to_point(point), true);
                Vec3::new(projection.point.x, projection.point.y, 0.0)
            }
            None => point,
        }
    }

    fn attached_body(&self, volume: ColliderHandle) -> Option<RigidBodyHandle> {
        self.collider_body(volume)
    }

    fn body_mass(&self, body: RigidBodyHandle) -> f32 {
        self.bodies.get(body).map(|rb| rb.mass()).unwrap_or(0.0)
    }

    fn add_force_at_point(&mut self, body: RigidBodyHandle, force: Vec3, point: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.add_force_at_point(vector![force.x, force.y], to_point(point), true);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
