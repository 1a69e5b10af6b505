use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::field::curve::Curve;

/// Smallest radius a field accepts; smaller values are clamped up to it.
pub const MIN_RADIUS: f32 = 0.001;

/// Which axes the applied force direction is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionSpace {
    /// The negated local displacement is used directly as the world force direction.
    #[default]
    Local,
    /// The local direction is mapped back through the sub-step transform first.
    World,
}

/// Tunable parameters of a proximity force field.
/// Loaded from JSON or built in code; clamped when handed to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Influence radius in the field's local units.
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Signed base force. Positive attracts, negative repels.
    #[serde(default = "default_force")]
    pub force: f32,
    /// Multiply the force by the target body's mass.
    #[serde(default)]
    pub mass_scaling: bool,
    /// Normalized distance (0 at center, 1 at radius) to force multiplier.
    #[serde(default = "default_falloff")]
    pub falloff: Curve,
    /// Field speed in units per second to force multiplier.
    #[serde(default = "default_speed_to_force")]
    pub speed_to_force: Curve,
    /// Interpolated sub-steps per tick.
    #[serde(default = "default_sub_steps")]
    pub sub_steps: u32,
    #[serde(default)]
    pub direction_space: DirectionSpace,
}

fn default_radius() -> f32 {
    1.0
}

fn default_force() -> f32 {
    1.0
}

fn default_falloff() -> Curve {
    Curve::linear(0.0, 1.0, 1.0, 0.0)
}

fn default_speed_to_force() -> Curve {
    Curve::linear(0.0, 1.0, 1.0, 1.0)
}

fn default_sub_steps() -> u32 {
    1
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            force: default_force(),
            mass_scaling: false,
            falloff: default_falloff(),
            speed_to_force: default_speed_to_force(),
            sub_steps: default_sub_steps(),
            direction_space: DirectionSpace::default(),
        }
    }
}

impl FieldConfig {
    /// Parse a field configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_force(mut self, force: f32) -> Self {
        self.force = force;
        self
    }

    pub fn with_mass_scaling(mut self, enabled: bool) -> Self {
        self.mass_scaling = enabled;
        self
    }

    pub fn with_falloff(mut self, curve: Curve) -> Self {
        self.falloff = curve;
        self
    }

    pub fn with_speed_to_force(mut self, curve: Curve) -> Self {
        self.speed_to_force = curve;
        self
    }

    pub fn with_sub_steps(mut self, sub_steps: u32) -> Self {
        self.sub_steps = sub_steps;
        self
    }

    pub fn with_direction_space(mut self, space: DirectionSpace) -> Self {
        self.direction_space = space;
        self
    }

    /// Copy with radius and sub-step count forced into their valid ranges.
    /// NaN radii fall back to the minimum.
    pub fn clamped(mut self) -> Self {
        self.radius = self.radius.max(MIN_RADIUS);
        self.sub_steps = self.sub_steps.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_linear_falloff() {
        let config = FieldConfig::default();
        assert_eq!(config.radius, 1.0);
        assert_eq!(config.force, 1.0);
        assert!(!config.mass_scaling);
        assert_eq!(config.sub_steps, 1);
        assert!((config.falloff.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!((config.speed_to_force.evaluate(3.0) - 1.0).abs() < 1e-6);
        assert_eq!(config.direction_space, DirectionSpace::Local);
    }

    #[test]
    fn parse_partial_json_fills_defaults() {
        let json = r#"{ "radius": 2.0, "force": -4.0, "sub_steps": 3, "direction_space": "world" }"#;
        let config = FieldConfig::from_json(json).unwrap();
        assert_eq!(config.radius, 2.0);
        assert_eq!(config.force, -4.0);
        assert_eq!(config.sub_steps, 3);
        assert_eq!(config.direction_space, DirectionSpace::World);
        assert!((config.falloff.evaluate(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn parse_rejects_malformed_json() {
        let err = FieldConfig::from_json("{ \"radius\": ");
        assert!(matches!(err, Err(ConfigError::Json(_))));
    }

    #[test]
    fn clamped_fixes_radius_and_sub_steps() {
        let config = FieldConfig::default().with_radius(-1.0).with_sub_steps(0).clamped();
        assert_eq!(config.radius, MIN_RADIUS);
        assert_eq!(config.sub_steps, 1);

        let config = FieldConfig::default().with_radius(f32::NAN).clamped();
        assert_eq!(config.radius, MIN_RADIUS);
    }
}
