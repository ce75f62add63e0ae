use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};

/// What the runtime does when a system returns an error from a phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Log the fault, record it, and keep running the other systems.
    #[default]
    Isolate,
    /// Stop the loop after the faulting phase, run shutdown, and return
    /// the fault as an error.
    Halt,
}

/// Configuration for a runtime.
///
/// Every field has a default, so a JSON file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Seconds per fixed update.
    pub fixed_delta: f64,
    /// Upper bound on a single frame's measured delta, in seconds.
    pub max_frame_delta: f64,
    /// Most fixed updates run in one frame; surplus time is discarded.
    pub max_fixed_steps: u32,
    /// Stop after this many frames. `None` runs until stopped.
    pub max_frames: Option<u64>,
    /// Pace the wall clock to this frame rate. `None` runs unthrottled.
    pub target_fps: Option<u32>,
    /// How system errors are handled.
    pub fault_policy: FaultPolicy,
    /// Seed handed to systems that generate random content.
    pub seed: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fixed_delta: 0.016,
            max_frame_delta: 0.25,
            max_fixed_steps: 8,
            max_frames: None,
            target_fps: None,
            fault_policy: FaultPolicy::Isolate,
            seed: 42,
        }
    }
}

impl RuntimeConfig {
    /// Set the fixed update interval in seconds.
    pub fn with_fixed_delta(mut self, seconds: f64) -> Self {
        self.fixed_delta = seconds;
        self
    }

    /// Set the per-frame delta clamp in seconds.
    pub fn with_max_frame_delta(mut self, seconds: f64) -> Self {
        self.max_frame_delta = seconds;
        self
    }

    /// Set the most fixed updates per frame.
    pub fn with_max_fixed_steps(mut self, steps: u32) -> Self {
        self.max_fixed_steps = steps;
        self
    }

    /// Stop after `frames` frames.
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Pace the wall clock to `fps` frames per second.
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = Some(fps);
        self
    }

    /// Set the fault policy.
    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    /// Set the content seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> RuntimeResult<()> {
        if !self.fixed_delta.is_finite() || self.fixed_delta <= 0.0 {
            return Err(RuntimeError::InvalidConfig(format!(
                "fixed_delta must be a positive number of seconds, got {}",
                self.fixed_delta
            )));
        }
        if !self.max_frame_delta.is_finite() || self.max_frame_delta < self.fixed_delta {
            return Err(RuntimeError::InvalidConfig(format!(
                "max_frame_delta ({}) must be at least fixed_delta ({})",
                self.max_frame_delta, self.fixed_delta
            )));
        }
        if self.max_fixed_steps == 0 {
            return Err(RuntimeError::InvalidConfig(
                "max_fixed_steps must be at least 1".into(),
            ));
        }
        if self.target_fps == Some(0) {
            return Err(RuntimeError::InvalidConfig(
                "target_fps must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> RuntimeResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: &Path) -> RuntimeResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = RuntimeConfig::default();
        assert!((config.fixed_delta - 0.016).abs() < f64::EPSILON);
        assert_eq!(config.max_fixed_steps, 8);
        assert_eq!(config.max_frames, None);
        assert_eq!(config.fault_policy, FaultPolicy::Isolate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_chain() {
        let config = RuntimeConfig::default()
            .with_fixed_delta(0.02)
            .with_max_frames(10)
            .with_target_fps(30)
            .with_fault_policy(FaultPolicy::Halt)
            .with_seed(7);
        assert!((config.fixed_delta - 0.02).abs() < f64::EPSILON);
        assert_eq!(config.max_frames, Some(10));
        assert_eq!(config.target_fps, Some(30));
        assert_eq!(config.fault_policy, FaultPolicy::Halt);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad = [
            RuntimeConfig::default().with_fixed_delta(0.0),
            RuntimeConfig::default().with_fixed_delta(f64::NAN),
            RuntimeConfig::default().with_max_frame_delta(0.001),
            RuntimeConfig::default().with_max_fixed_steps(0),
            RuntimeConfig::default().with_target_fps(0),
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(RuntimeError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            RuntimeConfig::from_json_str(r#"{ "max_frames": 5, "fault_policy": "halt" }"#).unwrap();
        assert_eq!(config.max_frames, Some(5));
        assert_eq!(config.fault_policy, FaultPolicy::Halt);
        assert_eq!(config.max_fixed_steps, 8);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            RuntimeConfig::from_json_str("{ not json"),
            Err(RuntimeError::ConfigParse(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.json");
        std::fs::write(&path, r#"{ "seed": 99 }"#).unwrap();
        assert_eq!(RuntimeConfig::load(&path).unwrap().seed, 99);

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            RuntimeConfig::load(&missing),
            Err(RuntimeError::Io(_))
        ));
    }
}
