// core/mod.rs
//
// Engine-facing plumbing: poses, the fixed-step clock and the physics world.

#[cfg(feature = "physics")]
pub mod physics;
pub mod pose;
pub mod time;
