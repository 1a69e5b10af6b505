//! Smooth target following.
//!
//! `Follower` eases a plain position toward a target every fixed step.
//! `BodyFollower` does the same for a kinematic rigid body so the physics
//! world sees the motion (and anything attached to it, such as a field's
//! trigger volume, moves with it).

use glam::Vec3;
use serde::{Deserialize, Serialize};

#[cfg(feature = "physics")]
use glam::Vec2;
#[cfg(feature = "physics")]
use rapier2d::prelude::RigidBodyHandle;

#[cfg(feature = "physics")]
use crate::core::physics::PhysicsWorld;

/// Largest accepted follow rate, per second.
pub const MAX_RATE: f32 = 240.0;

/// Fraction of the remaining distance covered in one step of `dt` seconds.
#[inline]
pub fn follow_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

/// Eases a position toward a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Follower {
    /// Approach rate per second, in [0, 240].
    #[serde(default = "default_follower_rate")]
    pub rate: f32,
}

fn default_follower_rate() -> f32 {
    16.0
}

impl Default for Follower {
    fn default() -> Self {
        Self {
            rate: default_follower_rate(),
        }
    }
}

impl Follower {
    pub fn new(rate: f32) -> Self {
        Self {
            rate: rate.clamp(0.0, MAX_RATE),
        }
    }

    /// Next position after one step. With no target the position holds.
    pub fn step(&self, current: Vec3, target: Option<Vec3>, dt: f32) -> Vec3 {
        match target {
            Some(target) => current.lerp(target, follow_factor(self.rate, dt)),
            None => current,
        }
    }
}

/// Drives a kinematic body toward a target each fixed step.
#[cfg(feature = "physics")]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFollower {
    pub body: RigidBodyHandle,
    pub rate: f32,
    pub target: Option<Vec2>,
}

#[cfg(feature = "physics")]
impl BodyFollower {
    pub fn new(body: RigidBodyHandle, rate: f32) -> Self {
        Self {
            body,
            rate: rate.max(0.0),
            target: None,
        }
    }

    pub fn with_target(mut self, target: Vec2) -> Self {
        self.target = Some(target);
        self
    }

    /// Queue the body's next kinematic position. Rotation is kept.
    pub fn fixed_update(&self, world: &mut PhysicsWorld, dt: f32) {
        let target = match self.target {
            Some(t) => t,
            None => return,
        };
        let (pos, rot) = world.body_position(self.body);
        let next = pos.lerp(target, follow_factor(self.rate, dt));
        world.set_kinematic_position(self.body, next, rot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_is_clamped() {
        assert_eq!(follow_factor(16.0, 0.02), 0.32);
        assert_eq!(follow_factor(100.0, 0.5), 1.0);
        assert_eq!(follow_factor(-3.0, 0.02), 0.0);
    }

    #[test]
    fn follower_moves_part_way() {
        let f = Follower::new(10.0);
        let next = f.step(Vec3::ZERO, Some(Vec3::new(10.0, 0.0, 0.0)), 0.05);
        assert!(next.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn follower_without_target_holds() {
        let f = Follower::default();
        let here = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(f.step(here, None, 0.02), here);
    }

    #[test]
    fn follower_rate_is_clamped() {
        assert_eq!(Follower::new(1000.0).rate, MAX_RATE);
        assert_eq!(Follower::new(-1.0).rate, 0.0);
    }

    #[test]
    fn follower_converges() {
        let f = Follower::new(16.0);
        let target = Vec3::new(-4.0, 8.0, 0.0);
        let mut pos = Vec3::ZERO;
        for _ in 0..200 {
            pos = f.step(pos, Some(target), 0.02);
        }
        assert!(pos.abs_diff_eq(target, 1e-3));
    }

    #[cfg(feature = "physics")]
    #[test]
    fn body_follower_moves_kinematic_body() {
        use crate::api::types::EntityId;
        use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial};

        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.set_dt(0.02);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::kinematic(ColliderDesc::Ball { radius: 0.5 }),
            ColliderMaterial::default(),
        );
        let follower = BodyFollower::new(body.body_handle, 25.0).with_target(Vec2::new(4.0, 0.0));

        let mut events = Vec::new();
        follower.fixed_update(&mut world, 0.02);
        world.step_into(&mut events);

        let (pos, _) = world.body_position(body.body_handle);
        assert!((pos.x - 2.0).abs() < 1e-4, "x={}", pos.x);
    }
}
