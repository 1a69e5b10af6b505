// api/mod.rs
//
// Host-facing surface: identifiers and, with physics, the fixed-step host.

#[cfg(feature = "physics")]
pub mod host;
pub mod types;
