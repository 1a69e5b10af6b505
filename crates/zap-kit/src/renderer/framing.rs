//! Aspect-ratio driven camera framing.
//!
//! `CanvasFit` shrinks the orthographic size of every camera once the
//! canvas gets wider than a maximum aspect, so the framed content keeps
//! fitting horizontally. `AspectSlide` offsets an object when the camera
//! aspect leaves a comfortable range.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::renderer::camera::Camera2D;

/// Smallest accepted bound for an aspect range.
const MIN_ASPECT: f32 = 0.0001;

#[inline]
fn lerp_clamped(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Orthographic size capped by canvas aspect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasFit {
    /// Orthographic size at or below the maximum aspect.
    #[serde(default = "default_ortho_size")]
    pub ortho_size: f32,
    #[serde(default = "default_max_aspect")]
    pub max_aspect: f32,
}

fn default_ortho_size() -> f32 {
    5.0
}

fn default_max_aspect() -> f32 {
    1.25
}

impl Default for CanvasFit {
    fn default() -> Self {
        Self {
            ortho_size: default_ortho_size(),
            max_aspect: default_max_aspect(),
        }
    }
}

impl CanvasFit {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Orthographic size for a canvas of `size` (width, height).
    /// `None` when the canvas has no height.
    pub fn orthographic_size(&self, size: Vec2) -> Option<f32> {
        if size.y <= 0.0 || self.max_aspect <= 0.0 {
            return None;
        }
        let aspect = size.x / size.y;
        Some(self.ortho_size / (aspect / self.max_aspect).max(1.0))
    }

    /// Apply the fitted size and the canvas aspect to every camera. Returns the size used.
    pub fn apply<'a, I>(&self, size: Vec2, cameras: I) -> Option<f32>
    where
        I: IntoIterator<Item = &'a mut Camera2D>,
    {
        let ortho = self.orthographic_size(size)?;
        for camera in cameras {
            camera.orthographic_size = ortho;
            camera.resize(size.x, size.y);
        }
        Some(ortho)
    }
}

/// Local offset that grows as the camera aspect leaves `range`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AspectSlide {
    /// Comfortable aspect range (min, max).
    pub range: [f32; 2],
    /// Full offset applied along X below `range[0]` and along Y above `range[1]`.
    pub amount: [f32; 2],
}

impl Default for AspectSlide {
    fn default() -> Self {
        Self {
            range: [1.0, 2.0],
            amount: [0.0, 0.0],
        }
    }
}

impl AspectSlide {
    pub fn new(range: Vec2, amount: Vec2) -> Self {
        Self {
            range: range.max(Vec2::splat(MIN_ASPECT)).to_array(),
            amount: amount.to_array(),
        }
    }

    /// Offset for a camera with the given aspect. Non-positive aspects yield `None`.
    pub fn offset(&self, aspect: f32) -> Option<Vec3> {
        if !(aspect > 0.0) {
            return None;
        }
        let [lo, hi] = self.range;
        let min_ratio = aspect / lo.max(aspect);
        let max_ratio = hi.min(aspect) / aspect;
        Some(Vec3::new(
            lerp_clamped(self.amount[0], 0.0, min_ratio),
            lerp_clamped(self.amount[1], 0.0, max_ratio),
            0.0,
        ))
    }
}
