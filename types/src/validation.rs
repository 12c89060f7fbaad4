//! Typed, validated view of the transition settings.
//!
//! The transition itself clamps every value it reads, so validation here is
//! advisory: hosts and tools use it to report bad input before applying it.

use crate::settings::{keys, Settings};
use garde::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TransitionSettings {
    #[garde(skip)]
    #[serde(default)]
    pub scene: String,
    #[garde(range(min = 0.0, max = 30000.0))]
    pub duration: f64,
    #[garde(range(min = 0, max = 1))]
    #[serde(default)]
    pub tp_type: i64,
    #[garde(range(min = 0.0, max = 100.0))]
    pub transition_point: f64,
    #[garde(range(min = 0.0, max = 30000.0))]
    pub transition_point_ms: f64,
    #[garde(skip)]
    #[serde(default)]
    pub filter: String,
    #[garde(range(min = 0, max = 1))]
    #[serde(default)]
    pub audio_fade_style: i64,
    #[garde(range(min = 0.0, max = 100.0))]
    pub audio_volume: f64,
}

impl TransitionSettings {
    /// Read every key through the bag's default layer.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            scene: settings.get_string(keys::SCENE).to_string(),
            duration: settings.get_double(keys::DURATION),
            tp_type: settings.get_int(keys::TP_TYPE),
            transition_point: settings.get_double(keys::TRANSITION_POINT),
            transition_point_ms: settings.get_double(keys::TRANSITION_POINT_MS),
            filter: settings.get_string(keys::FILTER).to_string(),
            audio_fade_style: settings.get_int(keys::AUDIO_FADE_STYLE),
            audio_volume: settings.get_double(keys::AUDIO_VOLUME),
        }
    }

    /// Validate and return a human-readable list of problems.
    pub fn problems(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => Vec::new(),
            Err(report) => report
                .iter()
                .map(|(path, error)| format!("{}: {}", path, error))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransitionSettings {
        TransitionSettings {
            scene: "Stinger".to_string(),
            duration: 1000.0,
            tp_type: 0,
            transition_point: 50.0,
            transition_point_ms: 500.0,
            filter: String::new(),
            audio_fade_style: 0,
            audio_volume: 100.0,
        }
    }

    #[test]
    fn test_valid_settings() {
        assert!(sample().problems().is_empty());
    }

    #[test]
    fn test_out_of_range_values_reported() {
        let mut settings = sample();
        settings.duration = 45000.0;
        settings.audio_volume = -1.0;
        let problems = settings.problems();
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.starts_with("duration")));
        assert!(problems.iter().any(|p| p.starts_with("audio_volume")));
    }

    #[test]
    fn test_from_settings_uses_defaults() {
        let mut bag = Settings::new();
        bag.set_default_double(keys::DURATION, 1000.0);
        bag.set_double(keys::AUDIO_VOLUME, 30.0);
        let typed = TransitionSettings::from_settings(&bag);
        assert_eq!(typed.duration, 1000.0);
        assert_eq!(typed.audio_volume, 30.0);
        assert_eq!(typed.tp_type, 0);
    }
}
