// field/mod.rs
//
// Proximity force fields: configuration, curves, the per-tick force model
// and its debug drawing. Physics is reached only through `ForceWorld`.

pub mod attractor;
pub mod config;
pub mod curve;
pub mod gizmo;

pub use attractor::{Contact, ForceWorld, ProximityForceField, TickReport};
pub use config::{DirectionSpace, FieldConfig, MIN_RADIUS};
pub use curve::{Curve, Keyframe};
pub use gizmo::{FieldGizmo, GizmoLine, GizmoVertex};
