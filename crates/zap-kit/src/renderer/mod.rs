pub mod camera;
pub mod framing;

pub use camera::{Camera2D, CameraUniform};
pub use framing::{AspectSlide, CanvasFit};
