use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PlayerError;

pub const MIN_LOOK_AHEAD_SEC: f64 = 1.0;
pub const MAX_LOOK_AHEAD_SEC: f64 = 5.0;

pub fn clamp_look_ahead(seconds: f64) -> f64 {
    if seconds.is_nan() {
        return MIN_LOOK_AHEAD_SEC;
    }
    seconds.clamp(MIN_LOOK_AHEAD_SEC, MAX_LOOK_AHEAD_SEC)
}

/// Tuning constants for the playback loop and practice mode.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Displayed time is resynced to the audio clock beyond this divergence.
    pub drift_threshold_sec: f64,
    /// Wall-clock spacing of drift checks.
    pub drift_check_interval_sec: f64,
    /// Playback continues this long past the last note end before auto-stop.
    pub tail_allowance_sec: f64,
    pub look_ahead_sec: f64,
    pub practice_increment: f64,
    /// Notes whose onsets differ by at most this much form one practice step.
    pub step_onset_tolerance_sec: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            drift_threshold_sec: 0.05,
            drift_check_interval_sec: 0.1,
            tail_allowance_sec: 2.0,
            look_ahead_sec: 3.0,
            practice_increment: 0.1,
            step_onset_tolerance_sec: 0.02,
        }
    }
}

impl PlayerConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, PlayerError> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|err| PlayerError::Config(err.to_string()))?;
        config.validated()
    }

    pub fn from_json_str(text: &str) -> Result<Self, PlayerError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| PlayerError::Config(err.to_string()))?;
        config.validated()
    }

    /// Loads a `.json` file as JSON and anything else as YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PlayerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    pub fn validated(mut self) -> Result<Self, PlayerError> {
        let positive = [
            ("drift_threshold_sec", self.drift_threshold_sec),
            ("drift_check_interval_sec", self.drift_check_interval_sec),
            ("practice_increment", self.practice_increment),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlayerError::Config(format!("{name} must be positive")));
            }
        }
        let non_negative = [
            ("tail_allowance_sec", self.tail_allowance_sec),
            ("step_onset_tolerance_sec", self.step_onset_tolerance_sec),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PlayerError::Config(format!("{name} must not be negative")));
            }
        }
        self.look_ahead_sec = clamp_look_ahead(self.look_ahead_sec);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_playback_constants() {
        let config = PlayerConfig::default();
        assert_eq!(config.drift_threshold_sec, 0.05);
        assert_eq!(config.drift_check_interval_sec, 0.1);
        assert_eq!(config.tail_allowance_sec, 2.0);
    }

    #[test]
    fn yaml_overrides_and_clamps() {
        let config =
            PlayerConfig::from_yaml_str("tail_allowance_sec: 1.5\nlook_ahead_sec: 12\n").unwrap();
        assert_eq!(config.tail_allowance_sec, 1.5);
        assert_eq!(config.look_ahead_sec, MAX_LOOK_AHEAD_SEC);
        assert_eq!(config.drift_threshold_sec, 0.05);
    }

    #[test]
    fn json_config() {
        let config = PlayerConfig::from_json_str(r#"{"practice_increment": 0.05}"#).unwrap();
        assert_eq!(config.practice_increment, 0.05);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            PlayerConfig::from_yaml_str("drift_threshold_sec: 0"),
            Err(PlayerError::Config(_))
        ));
        assert!(PlayerConfig::from_yaml_str("tail_allowance_sec: -1").is_err());
        assert!(PlayerConfig::from_yaml_str("drift_threshold_sec: [").is_err());
    }

    #[test]
    fn look_ahead_clamp() {
        assert_eq!(clamp_look_ahead(0.2), 1.0);
        assert_eq!(clamp_look_ahead(2.5), 2.5);
        assert_eq!(clamp_look_ahead(f64::NAN), 1.0);
    }
}
