pub mod api;
pub mod core;
pub mod components;
pub mod error;
pub mod field;
pub mod renderer;

// Re-export key types at crate root for convenience
pub use api::types::{EntityId, FieldId, FollowerId};
pub use crate::core::pose::{MotionHistory, Pose};
pub use crate::core::time::FixedTimestep;
pub use error::ConfigError;
pub use field::{
    Contact, Curve, DirectionSpace, FieldConfig, FieldGizmo, ForceWorld, GizmoLine,
    GizmoVertex, Keyframe, ProximityForceField, TickReport,
};
pub use components::{follow_factor, BlendDriver, BlendDriverConfig, BlendParameters, Follower};
pub use renderer::{AspectSlide, Camera2D, CameraUniform, CanvasFit};

#[cfg(feature = "physics")]
pub use api::host::{Host, HostConfig};
#[cfg(feature = "physics")]
pub use components::BodyFollower;
#[cfg(feature = "physics")]
pub use crate::core::physics::{
    BodyDesc, BodyType, ColliderDesc, ColliderMaterial, PhysicsBody, PhysicsWorld, TriggerEvent,
};
