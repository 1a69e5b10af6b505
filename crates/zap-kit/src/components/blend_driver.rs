//! Animator blend-parameter driver.
//!
//! Maps a pointer's offset from an origin onto two named blend parameters,
//! scaled by an influence curve and smoothed over time. The animation
//! system that consumes the parameters sits behind `BlendParameters`.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::follower::follow_factor;
use crate::error::ConfigError;
use crate::field::config::MIN_RADIUS;
use crate::field::curve::Curve;

/// Receives named scalar parameters, e.g. an animator's blend inputs.
pub trait BlendParameters {
    fn set_float(&mut self, name: &str, value: f32);
}

impl BlendParameters for HashMap<String, f32> {
    fn set_float(&mut self, name: &str, value: f32) {
        match self.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.insert(name.to_owned(), value);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendDriverConfig {
    #[serde(default = "default_x_parameter")]
    pub x_parameter: String,
    #[serde(default = "default_y_parameter")]
    pub y_parameter: String,
    /// Pointer distance that maps to a normalized offset of 1.
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Normalized distance to influence.
    #[serde(default = "default_influence")]
    pub influence: Curve,
    /// Smoothing rate per second.
    #[serde(default = "default_rate")]
    pub rate: f32,
}

fn default_x_parameter() -> String {
    "X".to_owned()
}

fn default_y_parameter() -> String {
    "Y".to_owned()
}

fn default_radius() -> f32 {
    1.0
}

fn default_influence() -> Curve {
    Curve::linear(0.0, 1.0, 1.0, 0.0)
}

fn default_rate() -> f32 {
    16.0
}

impl Default for BlendDriverConfig {
    fn default() -> Self {
        Self {
            x_parameter: default_x_parameter(),
            y_parameter: default_y_parameter(),
            radius: default_radius(),
            influence: default_influence(),
            rate: default_rate(),
        }
    }
}

impl BlendDriverConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Per-frame driver writing smoothed XY blend parameters.
#[derive(Debug, Clone)]
pub struct BlendDriver {
    config: BlendDriverConfig,
    previous: Option<Vec2>,
}

impl BlendDriver {
    pub fn new(mut config: BlendDriverConfig) -> Self {
        config.radius = config.radius.max(MIN_RADIUS);
        Self {
            config,
            previous: None,
        }
    }

    pub fn config(&self) -> &BlendDriverConfig {
        &self.config
    }

    /// Last value written, if any.
    pub fn current(&self) -> Option<Vec2> {
        self.previous
    }

    /// Unsmoothed blend input for a pointer at `pointer` relative to `origin`.
    pub fn target(&self, origin: Vec3, pointer: Vec3) -> Vec2 {
        let norm = (pointer - origin) / self.config.radius;
        let influence = self.config.influence.evaluate(norm.length());
        influence * norm.truncate()
    }

    /// Write the parameters for this frame. Without a pointer nothing is written.
    pub fn update<P: BlendParameters>(
        &mut self,
        sink: &mut P,
        origin: Vec3,
        pointer: Option<Vec3>,
        dt: f32,
    ) -> Option<Vec2> {
        let pointer = pointer?;
        let target = self.target(origin, pointer);
        let from = self.previous.unwrap_or(target);
        let smoothed = from.lerp(target, follow_factor(self.config.rate, dt));

        sink.set_float(&self.config.x_parameter, smoothed.x);
        sink.set_float(&self.config.y_parameter, smoothed.y);
        self.previous = Some(smoothed);
        Some(smoothed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_writes_target_directly() {
        let mut driver = BlendDriver::new(BlendDriverConfig {
            radius: 2.0,
            ..Default::default()
        });
        let mut params = HashMap::new();

        let written = driver.update(&mut params, Vec3::ZERO, Some(Vec3::new(1.0, 0.0, 0.0)), 0.016);

        // norm = (0.5, 0), influence = 0.5 -> (0.25, 0)
        let xy = written.unwrap();
        assert!(xy.abs_diff_eq(Vec2::new(0.25, 0.0), 1e-6));
        assert!((params["X"] - 0.25).abs() < 1e-6);
        assert_eq!(params["Y"], 0.0);
    }

    #[test]
    fn later_updates_are_smoothed() {
        let mut driver = BlendDriver::new(BlendDriverConfig {
            influence: Curve::constant(1.0),
            rate: 10.0,
            ..Default::default()
        });
        let mut params = HashMap::new();
        driver.update(&mut params, Vec3::ZERO, Some(Vec3::ZERO), 0.05);
        driver.update(&mut params, Vec3::ZERO, Some(Vec3::new(0.0, 1.0, 0.0)), 0.05);

        // Half way from (0,0) to (0,1)
        assert!((params["Y"] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn missing_pointer_writes_nothing() {
        let mut driver = BlendDriver::new(BlendDriverConfig::default());
        let mut params: HashMap<String, f32> = HashMap::new();
        assert!(driver.update(&mut params, Vec3::ZERO, None, 0.016).is_none());
        assert!(params.is_empty());
        assert!(driver.current().is_none());
    }

    #[test]
    fn pointer_outside_radius_has_no_influence() {
        let driver = BlendDriver::new(BlendDriverConfig::default());
        let xy = driver.target(Vec3::new(1.0, 1.0, 0.0), Vec3::new(4.0, 1.0, 0.0));
        assert_eq!(xy, Vec2::ZERO);
    }

    #[test]
    fn custom_parameter_names_and_json() {
        let config = BlendDriverConfig::from_json(r#"{ "x_parameter": "Horizontal", "y_parameter": "Vertical", "radius": 0.0 }"#)
            .unwrap();
        let mut driver = BlendDriver::new(config);
        assert_eq!(driver.config().radius, MIN_RADIUS);

        let mut params = HashMap::new();
        driver.update(&mut params, Vec3::ZERO, Some(Vec3::ZERO), 0.016);
        assert!(params.contains_key("Horizontal"));
        assert!(params.contains_key("Vertical"));
    }
}
