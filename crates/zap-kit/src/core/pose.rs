use glam::{Affine3A, Quat, Vec2, Vec3};

/// World-space position, orientation and scale of a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Pose on the XY plane, rotated `angle` radians about Z.
    pub fn planar(position: Vec2, angle: f32) -> Self {
        Self {
            position: position.extend(0.0),
            rotation: Quat::from_rotation_z(angle),
            scale: Vec3::ONE,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Blend toward `other`: position and scale linearly, rotation spherically.
    pub fn interpolate(&self, other: &Pose, t: f32) -> Pose {
        Pose {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }

    /// Local-to-world transform.
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// The pose observed at the end of the previous tick, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MotionHistory {
    /// No tick has completed yet.
    #[default]
    Unset,
    Pose(Pose),
}

impl MotionHistory {
    pub fn previous(&self) -> Option<&Pose> {
        match self {
            MotionHistory::Unset => None,
            MotionHistory::Pose(pose) => Some(pose),
        }
    }

    /// Pose at fraction `t` between `current` (t = 0) and the recorded pose (t = 1).
    /// Without history every fraction yields `current`.
    pub fn blend_from(&self, current: &Pose, t: f32) -> Pose {
        match self {
            MotionHistory::Unset => *current,
            MotionHistory::Pose(previous) => current.interpolate(previous, t),
        }
    }

    pub fn record(&mut self, pose: Pose) {
        *self = MotionHistory::Pose(pose);
    }

    pub fn clear(&mut self) {
        *self = MotionHistory::Unset;
    }
}
