//! Keyframed scalar curves.
//!
//! Used for falloff, speed-to-force and influence mappings. Evaluation is
//! cubic Hermite between keys and clamps to the end values outside the
//! keyed range.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single curve key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    /// Slope arriving at this key.
    #[serde(default)]
    pub in_tangent: f32,
    /// Slope leaving this key.
    #[serde(default)]
    pub out_tangent: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    pub fn with_tangents(mut self, in_tangent: f32, out_tangent: f32) -> Self {
        self.in_tangent = in_tangent;
        self.out_tangent = out_tangent;
        self
    }
}

/// Scalar mapping defined by keyframes sorted by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    /// Build a curve from arbitrary keys. Keys are sorted by time.
    pub fn new(mut keys: Vec<Keyframe>) -> Result<Self, ConfigError> {
        for (index, key) in keys.iter().enumerate() {
            let finite = key.time.is_finite()
                && key.value.is_finite()
                && key.in_tangent.is_finite()
                && key.out_tangent.is_finite();
            if !finite {
                return Err(ConfigError::NonFiniteKey { index });
            }
        }
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self { keys })
    }

    /// Straight line from `(t0, v0)` to `(t1, v1)`, clamped outside.
    pub fn linear(t0: f32, v0: f32, t1: f32, v1: f32) -> Self {
        let slope = if t1 != t0 { (v1 - v0) / (t1 - t0) } else { 0.0 };
        Self::from_sorted(vec![
            Keyframe::new(t0, v0).with_tangents(slope, slope),
            Keyframe::new(t1, v1).with_tangents(slope, slope),
        ])
    }

    /// Smooth S-shaped transition with flat ends.
    pub fn ease_in_out(t0: f32, v0: f32, t1: f32, v1: f32) -> Self {
        Self::from_sorted(vec![Keyframe::new(t0, v0), Keyframe::new(t1, v1)])
    }

    pub fn constant(value: f32) -> Self {
        Self::from_sorted(vec![Keyframe::new(0.0, value)])
    }

    /// Piecewise-linear curve through the given `(time, value)` points.
    pub fn from_points(points: &[(f32, f32)]) -> Result<Self, ConfigError> {
        let mut sorted: Vec<(f32, f32)> = points.to_vec();
        if let Some(index) = sorted
            .iter()
            .position(|(t, v)| !t.is_finite() || !v.is_finite())
        {
            return Err(ConfigError::NonFiniteKey { index });
        }
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let slope = |a: (f32, f32), b: (f32, f32)| {
            if b.0 != a.0 { (b.1 - a.1) / (b.0 - a.0) } else { 0.0 }
        };
        let keys = (0..sorted.len())
            .map(|i| {
                let here = sorted[i];
                let incoming = if i > 0 { slope(sorted[i - 1], here) } else { 0.0 };
                let outgoing = if i + 1 < sorted.len() { slope(here, sorted[i + 1]) } else { 0.0 };
                Keyframe::new(here.0, here.1).with_tangents(incoming, outgoing)
            })
            .collect();
        Ok(Self::from_sorted(keys))
    }

    fn from_sorted(keys: Vec<Keyframe>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Sample the curve at `t`. NaN samples the first key.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if t.is_nan() || t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; t > first.time guarantees idx >= 1.
        let idx = self.keys.partition_point(|k| k.time <= t);
        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let span = b.time - a.time;
        if span <= 0.0 {
            return b.value;
        }
        let s = (t - a.time) / span;
        hermite(a.value, a.out_tangent * span, b.value, b.in_tangent * span, s)
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::constant(1.0)
    }
}

impl TryFrom<Vec<Keyframe>> for Curve {
    type Error = ConfigError;

    fn try_from(keys: Vec<Keyframe>) -> Result<Self, Self::Error> {
        Curve::new(keys)
    }
}

impl From<Curve> for Vec<Keyframe> {
    fn from(curve: Curve) -> Self {
        curve.keys
    }
}

#[inline]
fn hermite(p0: f32, m0: f32, p1: f32, m1: f32, s: f32) -> f32 {
    let s2 = s * s;
    let s3 = s2 * s;
    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;
    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_falloff_is_exact() {
        let curve = Curve::linear(0.0, 1.0, 1.0, 0.0);
        assert!((curve.evaluate(0.0) - 1.0).abs() < 1e-6);
        assert!((curve.evaluate(0.25) - 0.75).abs() < 1e-6);
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!((curve.evaluate(1.0) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn clamps_outside_key_range() {
        let curve = Curve::linear(0.0, 1.0, 1.0, 0.0);
        assert_eq!(curve.evaluate(-3.0), 1.0);
        assert_eq!(curve.evaluate(7.5), 0.0);
    }

    #[test]
    fn nan_input_samples_first_key() {
        let falloff = Curve::linear(0.0, 1.0, 1.0, 0.0);
        assert_eq!(falloff.evaluate(f32::NAN), 1.0);

        let single = Curve::constant(0.25);
        assert_eq!(single.evaluate(f32::NAN), 0.25);
    }

    #[test]
    fn empty_curve_evaluates_to_zero() {
        let curve = Curve::new(Vec::new()).unwrap();
        assert_eq!(curve.evaluate(0.5), 0.0);
    }

    #[test]
    fn constant_curve_ignores_input() {
        let curve = Curve::constant(2.5);
        assert_eq!(curve.evaluate(-1.0), 2.5);
        assert_eq!(curve.evaluate(100.0), 2.5);
    }

    #[test]
    fn ease_in_out_is_symmetric_and_flat_at_ends() {
        let curve = Curve::ease_in_out(0.0, 0.0, 1.0, 1.0);
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
        // Flat tangents: early samples lag a straight line
        assert!(curve.evaluate(0.1) < 0.1);
        assert!(curve.evaluate(0.9) > 0.9);
    }

    #[test]
    fn from_points_is_piecewise_linear() {
        let curve = Curve::from_points(&[(1.0, 0.0), (0.0, 0.0), (0.5, 2.0)]).unwrap();
        assert!((curve.evaluate(0.25) - 1.0).abs() < 1e-5);
        assert!((curve.evaluate(0.5) - 2.0).abs() < 1e-5);
        assert!((curve.evaluate(0.75) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rejects_non_finite_keys() {
        let err = Curve::new(vec![Keyframe::new(0.0, 1.0), Keyframe::new(f32::NAN, 0.0)]);
        assert!(matches!(err, Err(ConfigError::NonFiniteKey { index: 1 })));

        let err = Curve::from_points(&[(0.0, f32::INFINITY)]);
        assert!(matches!(err, Err(ConfigError::NonFiniteKey { index: 0 })));
    }

    #[test]
    fn deserializes_from_key_list() {
        let json = r#"[
            { "time": 1.0, "value": 0.0, "in_tangent": -1.0, "out_tangent": -1.0 },
            { "time": 0.0, "value": 1.0, "in_tangent": -1.0, "out_tangent": -1.0 }
        ]"#;
        let curve: Curve = serde_json::from_str(json).unwrap();
        assert_eq!(curve.keys()[0].time, 0.0);
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
    }
}
