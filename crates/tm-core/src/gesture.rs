//! Shake gesture detection from device-motion samples.
//!
//! The detector only classifies samples. Whoever owns the engine decides what
//! a shake does (normally [`ClockEngine::toggle_running`]).
//!
//! [`ClockEngine::toggle_running`]: crate::ClockEngine::toggle_running

use serde::{Deserialize, Serialize};

/// One accelerometer reading, gravity included, in m/s².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub timestamp_ms: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionSample {
    /// Sum of absolute acceleration on all three axes.
    pub fn strength(&self) -> f64 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }
}

/// Tuning for [`ShakeDetector`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeConfig {
    pub enabled: bool,
    /// Strength a sample must exceed to count as a shake.
    pub threshold: f64,
    /// Minimum gap after a detected shake before the next one counts.
    pub cooldown_ms: u64,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 30.0,
            cooldown_ms: 1000,
        }
    }
}

/// Turns a stream of motion samples into discrete shake gestures.
#[derive(Debug, Clone, Default)]
pub struct ShakeDetector {
    config: ShakeConfig,
    last_shake_ms: Option<u64>,
}

impl ShakeDetector {
    pub const fn new(config: ShakeConfig) -> Self {
        Self {
            config,
            last_shake_ms: None,
        }
    }

    pub const fn config(&self) -> &ShakeConfig {
        &self.config
    }

    pub const fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Feeds one sample. Returns true when it completes a shake gesture.
    pub fn observe(&mut self, sample: &MotionSample) -> bool {
        if !self.config.enabled {
            return false;
        }
        if let Some(last) = self.last_shake_ms {
            if sample.timestamp_ms.saturating_sub(last) <= self.config.cooldown_ms {
                return false;
            }
        }
        let strength = sample.strength();
        if strength <= self.config.threshold {
            return false;
        }
        tracing::debug!(strength, timestamp_ms = sample.timestamp_ms, "shake detected");
        self.last_shake_ms = Some(sample.timestamp_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp_ms: u64, x: f64, y: f64, z: f64) -> MotionSample {
        MotionSample {
            timestamp_ms,
            x,
            y,
            z,
        }
    }

    #[test]
    fn strength_sums_absolute_axes() {
        assert!((sample(0, -10.0, 5.0, -2.5).strength() - 17.5).abs() < f64::EPSILON);
    }

    #[test]
    fn weak_motion_is_ignored() {
        let mut detector = ShakeDetector::default();
        assert!(!detector.observe(&sample(0, 0.0, 0.0, 9.8)));
        assert!(!detector.observe(&sample(10, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn first_strong_sample_is_a_shake() {
        let mut detector = ShakeDetector::default();
        assert!(detector.observe(&sample(0, 20.0, 10.0, 5.0)));
    }

    #[test]
    fn cooldown_suppresses_repeats() {
        let mut detector = ShakeDetector::default();
        assert!(detector.observe(&sample(5000, 25.0, 10.0, 0.0)));
        assert!(!detector.observe(&sample(5400, 25.0, 10.0, 0.0)));
        assert!(!detector.observe(&sample(6000, 25.0, 10.0, 0.0)));
        assert!(detector.observe(&sample(6001, 25.0, 10.0, 0.0)));
    }

    #[test]
    fn suppressed_samples_do_not_extend_cooldown() {
        let mut detector = ShakeDetector::default();
        assert!(detector.observe(&sample(0, 40.0, 0.0, 0.0)));
        assert!(!detector.observe(&sample(900, 40.0, 0.0, 0.0)));
        assert!(detector.observe(&sample(1100, 40.0, 0.0, 0.0)));
    }

    #[test]
    fn disabled_detector_never_fires() {
        let mut detector = ShakeDetector::new(ShakeConfig {
            enabled: false,
            ..ShakeConfig::default()
        });
        assert!(!detector.observe(&sample(0, 100.0, 100.0, 100.0)));

        detector.set_enabled(true);
        assert!(detector.observe(&sample(10, 100.0, 100.0, 100.0)));
    }

    #[test]
    fn custom_threshold() {
        let mut detector = ShakeDetector::new(ShakeConfig {
            threshold: 12.0,
            cooldown_ms: 0,
            enabled: true,
        });
        assert!(detector.observe(&sample(0, 13.0, 0.0, 0.0)));
        assert!(detector.observe(&sample(1, 0.0, 0.0, 12.5)));
        assert!(!detector.observe(&sample(2, 0.0, 0.0, 12.0)));
    }
}
