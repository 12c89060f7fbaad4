//! Configuration management for the simulator.

use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use scene_transition_types::{PropertyValue, Settings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Configuration structure that matches the TOML file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct LoggingConfig {
    /// Path to log file (if set, logs will be written to file in addition to stderr)
    log_file: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG environment variable or defaults to "info"
    log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SimulationConfig {
    #[serde(default = "default_fps")]
    fps: u32,
    /// Number of video frames; derived from the transition duration if unset
    frames: Option<u32>,
    #[serde(default = "default_sample_rate")]
    sample_rate: u32,
    #[serde(default = "default_channels")]
    channels: u32,
    /// Bit mask of the enabled mixer buses
    #[serde(default = "default_mixers")]
    mixers: u32,
    /// Frames during which the bridge scene reports pending audio
    #[serde(default)]
    audio_delay_frames: u32,
    settings_path: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            frames: None,
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            mixers: default_mixers(),
            audio_delay_frames: 0,
            settings_path: None,
        }
    }
}

fn default_fps() -> u32 {
    30
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_channels() -> u32 {
    2
}

fn default_mixers() -> u32 {
    0b1
}

/// Simulator configuration.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Video frames per second
    pub fps: u32,
    /// Number of video frames to render (None = one transition duration)
    pub frames: Option<u32>,
    pub sample_rate: u32,
    pub channels: u32,
    /// Bit mask of the enabled mixer buses
    pub mixers: u32,
    /// Frames during which the bridge scene reports pending audio
    pub audio_delay_frames: u32,
    /// Transition settings file (JSON or TOML)
    pub settings_path: Option<PathBuf>,
    /// Path to log file (if set, logs will be written to file in addition to stderr)
    pub log_file: Option<PathBuf>,
    /// Log level (if set, overrides RUST_LOG environment variable)
    pub log_level: Option<String>,
}

impl SimConfig {
    /// Load configuration with full priority chain: CLI args > env vars > config files > defaults.
    ///
    /// Config files are searched in this order:
    /// 1. `config.toml` in user config directory (~/.config/scene-transition/ on Linux)
    /// 2. `.scene-transition.toml` in current directory
    /// 3. `config_file`, if given
    pub fn from_figment(
        config_file: Option<&Path>,
        frames: Option<u32>,
        fps: Option<u32>,
        settings_path: Option<PathBuf>,
        log_level: Option<String>,
    ) -> anyhow::Result<Self> {
        let local_config = std::env::current_dir()
            .ok()
            .map(|d| d.join(".scene-transition.toml"));
        let user_config = directories::ProjectDirs::from("", "", "scene-transition")
            .map(|dirs| dirs.config_dir().join("config.toml"));

        // Build figment with priority: defaults < user config < local config < env vars < CLI args
        let mut figment = Figment::new().merge(Serialized::defaults(ConfigFile::default()));

        if let Some(ref path) = user_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        if let Some(ref path) = local_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        // SCENE_TRANSITION_SIMULATION__SAMPLE_RATE=44100 sets simulation.sample_rate
        figment = figment.merge(Env::prefixed("SCENE_TRANSITION_").split("__"));

        if let Some(f) = frames {
            figment = figment.merge(Serialized::default("simulation.frames", f));
        }
        if let Some(f) = fps {
            figment = figment.merge(Serialized::default("simulation.fps", f));
        }
        if let Some(ref sp) = settings_path {
            figment = figment.merge(Serialized::default("simulation.settings_path", sp));
        }
        if let Some(ref level) = log_level {
            figment = figment.merge(Serialized::default("logging.log_level", level));
        }

        let config_file: ConfigFile = figment.extract()?;

        if config_file.simulation.fps == 0 {
            anyhow::bail!("simulation.fps must be greater than zero");
        }

        Ok(Self {
            fps: config_file.simulation.fps,
            frames: config_file.simulation.frames,
            sample_rate: config_file.simulation.sample_rate,
            channels: config_file.simulation.channels,
            mixers: config_file.simulation.mixers,
            audio_delay_frames: config_file.simulation.audio_delay_frames,
            settings_path: config_file.simulation.settings_path,
            log_file: config_file.logging.log_file,
            log_level: config_file.logging.log_level,
        })
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        let simulation = SimulationConfig::default();
        Self {
            fps: simulation.fps,
            frames: simulation.frames,
            sample_rate: simulation.sample_rate,
            channels: simulation.channels,
            mixers: simulation.mixers,
            audio_delay_frames: simulation.audio_delay_frames,
            settings_path: None,
            log_file: None,
            log_level: None,
        }
    }
}

/// Load transition settings from a JSON or TOML file, chosen by extension.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        anyhow::bail!("Settings file not found: {}", path.display());
    }

    let figment = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Figment::from(Json::file(path)),
        Some("toml") => Figment::from(Toml::file(path)),
        other => anyhow::bail!(
            "Unsupported settings format {:?} (expected .json or .toml)",
            other.unwrap_or("")
        ),
    };

    let values: HashMap<String, PropertyValue> = figment.extract()?;
    Ok(Settings::from_values(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_transition_types::keys;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        std::env::remove_var("SCENE_TRANSITION_SIMULATION__FPS");
        std::env::remove_var("SCENE_TRANSITION_SIMULATION__FRAMES");
        std::env::remove_var("SCENE_TRANSITION_SIMULATION__SAMPLE_RATE");
        std::env::remove_var("SCENE_TRANSITION_SIMULATION__AUDIO_DELAY_FRAMES");
        std::env::remove_var("SCENE_TRANSITION_LOGGING__LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn test_from_figment_defaults() {
        clear_env();

        // Run in a temp directory to avoid picking up a local .scene-transition.toml
        let temp_dir = TempDir::new().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let config = SimConfig::from_figment(None, None, None, None, None).unwrap();

        let _ = std::env::set_current_dir(original_dir);

        assert_eq!(config.fps, 30);
        assert_eq!(config.frames, None);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channels, 2);
        assert_eq!(config.mixers, 1);
        assert!(config.log_level.is_none());
    }

    #[test]
    #[serial]
    fn test_from_figment_config_file() {
        clear_env();

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join(".scene-transition.toml");
        let config_content = r#"
[simulation]
fps = 60
frames = 12
mixers = 3

[logging]
log_level = "debug"
"#;
        fs::write(&config_file, config_content).unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let config = SimConfig::from_figment(None, None, None, None, None).unwrap();

        let _ = std::env::set_current_dir(original_dir);

        assert_eq!(config.fps, 60);
        assert_eq!(config.frames, Some(12));
        assert_eq!(config.mixers, 3);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    #[serial]
    fn test_from_figment_env_vars_override_config_file() {
        clear_env();

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("sim.toml");
        fs::write(&config_file, "[simulation]\nfps = 60").unwrap();

        std::env::set_var("SCENE_TRANSITION_SIMULATION__FPS", "25");
        let config = SimConfig::from_figment(Some(&config_file), None, None, None, None);
        clear_env();

        assert_eq!(config.unwrap().fps, 25);
    }

    #[test]
    #[serial]
    fn test_from_figment_env_vars_with_underscored_keys() {
        clear_env();

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("sim.toml");
        fs::write(&config_file, "[simulation]\nsample_rate = 48000").unwrap();

        std::env::set_var("SCENE_TRANSITION_SIMULATION__SAMPLE_RATE", "44100");
        std::env::set_var("SCENE_TRANSITION_SIMULATION__AUDIO_DELAY_FRAMES", "3");
        std::env::set_var("SCENE_TRANSITION_LOGGING__LOG_LEVEL", "debug");
        let config = SimConfig::from_figment(Some(&config_file), None, None, None, None);
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.audio_delay_frames, 3);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    #[serial]
    fn test_from_figment_cli_overrides_env_and_config() {
        clear_env();

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("sim.toml");
        fs::write(&config_file, "[simulation]\nfps = 60\nframes = 5").unwrap();

        std::env::set_var("SCENE_TRANSITION_SIMULATION__FPS", "25");
        let config = SimConfig::from_figment(
            Some(&config_file),
            Some(90),
            Some(50),
            Some(PathBuf::from("settings.json")),
            Some("trace".to_string()),
        );
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.fps, 50);
        assert_eq!(config.frames, Some(90));
        assert_eq!(config.settings_path, Some(PathBuf::from("settings.json")));
        assert_eq!(config.log_level, Some("trace".to_string()));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert!(SimConfig::from_figment(Some(&missing), None, None, None, None).is_err());
    }

    #[test]
    fn test_load_settings_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"scene": "Stinger", "duration": 1500, "tp_type": 1, "transition_point_ms": 300.5}"#,
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.get_string(keys::SCENE), "Stinger");
        assert_eq!(settings.get_double(keys::DURATION), 1500.0);
        assert_eq!(settings.get_int(keys::TP_TYPE), 1);
        assert_eq!(settings.get_double(keys::TRANSITION_POINT_MS), 300.5);
    }

    #[test]
    fn test_load_settings_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "scene = \"Stinger\"\nfilter = \"Shake\"\naudio_volume = 50.0\n")
            .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.get_string(keys::FILTER), "Shake");
        assert_eq!(settings.get_double(keys::AUDIO_VOLUME), 50.0);
    }

    #[test]
    fn test_load_settings_unknown_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.yaml");
        fs::write(&path, "scene: Stinger").unwrap();
        assert!(load_settings(&path).is_err());
    }
}
