// components/mod.rs
//
// Scene components driven by the host's frame and fixed-step loops.

pub mod blend_driver;
pub mod follower;

pub use blend_driver::{BlendDriver, BlendDriverConfig, BlendParameters};
#[cfg(feature = "physics")]
pub use follower::BodyFollower;
pub use follower::{follow_factor, Follower};
