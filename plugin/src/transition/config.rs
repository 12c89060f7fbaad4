//! Settings resolution: turns the host's settings bag into runtime parameters.

use crate::locale;
use scene_transition_types::{keys, Settings};

/// Upper bound of the transition duration in milliseconds.
pub const MAX_DURATION_MS: f32 = 30000.0;

/// Largest usable transition point; the point must stay below 1.
pub const MAX_TRANSITION_POINT: f32 = 1.0 - f32::EPSILON;

const LOG_OFFSET_DB: f32 = 6.0;
const LOG_RANGE_DB: f32 = 96.0;

/// List value of the "no filter" placeholder entry.
pub const NO_FILTER_VALUE: &str = "filter";

/// How the transition point is expressed in the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum TransitionPointType {
    #[default]
    Percentage,
    Time,
}

impl TransitionPointType {
    pub fn from_setting(value: i64) -> Self {
        if value == 1 {
            Self::Time
        } else {
            Self::Percentage
        }
    }
}

/// Which pair of gain curves the audio cross-fade uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum AudioFadeStyle {
    /// A fades out by the transition point, B fades in after it
    #[default]
    FadeOutIn,
    /// Linear complementary ramps over the whole duration
    CrossFade,
}

impl AudioFadeStyle {
    pub fn from_setting(value: i64) -> Self {
        if value == 0 {
            Self::FadeOutIn
        } else {
            Self::CrossFade
        }
    }
}

/// Runtime parameters derived from one settings update.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub scene_name: Option<String>,
    pub duration_ms: f32,
    pub transition_point: f32,
    pub filter_name: Option<String>,
    pub fade_style: AudioFadeStyle,
    /// Linear multiplier applied to the bridge scene's audio
    pub volume: f32,
}

impl ResolvedConfig {
    /// Resolve a settings bag.
    ///
    /// `previous_transition_point` is kept when a time-based transition point
    /// cannot be computed (zero duration).
    pub fn resolve(settings: &Settings, previous_transition_point: f32) -> Self {
        let duration_ms = clamp_finite(
            settings.get_double(keys::DURATION) as f32,
            0.0,
            MAX_DURATION_MS,
            0.0,
        );

        let transition_point = resolve_transition_point(
            TransitionPointType::from_setting(settings.get_int(keys::TP_TYPE)),
            settings.get_double(keys::TRANSITION_POINT) as f32,
            settings.get_double(keys::TRANSITION_POINT_MS) as f32,
            duration_ms,
            previous_transition_point,
        );

        Self {
            scene_name: scene_name_from_setting(settings.get_string(keys::SCENE)),
            duration_ms,
            transition_point,
            filter_name: filter_name_from_setting(settings.get_string(keys::FILTER)),
            fade_style: AudioFadeStyle::from_setting(settings.get_int(keys::AUDIO_FADE_STYLE)),
            volume: db_to_multiplier(volume_to_db(
                settings.get_double(keys::AUDIO_VOLUME) as f32 / 100.0,
            )),
        }
    }
}

/// Normalized transition point in `[0, 1)`.
pub fn resolve_transition_point(
    tp_type: TransitionPointType,
    percentage: f32,
    offset_ms: f32,
    duration_ms: f32,
    previous: f32,
) -> f32 {
    let raw = match tp_type {
        TransitionPointType::Time if duration_ms > 0.0 => offset_ms / duration_ms,
        TransitionPointType::Time => return previous,
        TransitionPointType::Percentage => percentage / 100.0,
    };
    clamp_finite(raw, 0.0, MAX_TRANSITION_POINT, previous)
}

/// Map a `0..=1` fader position to dB on a logarithmic curve.
///
/// Gives fine control near full volume and a long tail towards silence.
pub fn volume_to_db(def: f32) -> f32 {
    if def.is_nan() || def <= 0.0 {
        f32::NEG_INFINITY
    } else if def >= 1.0 {
        0.0
    } else {
        let span = LOG_RANGE_DB + LOG_OFFSET_DB;
        -span * (span / LOG_OFFSET_DB).powf(-def) + LOG_OFFSET_DB
    }
}

/// Convert dB to a linear multiplier; `-inf` dB is silence.
pub fn db_to_multiplier(db: f32) -> f32 {
    if db == f32::NEG_INFINITY {
        0.0
    } else {
        10.0_f32.powf(db / 20.0)
    }
}

/// Blank scene names mean "no bridge". Other names are looked up verbatim.
pub fn scene_name_from_setting(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

/// Blank names, the placeholder value and its display text mean "no filter".
/// Other names are looked up verbatim.
pub fn filter_name_from_setting(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed == NO_FILTER_VALUE
        || trimmed == locale::text("NoFilterSelected")
    {
        None
    } else {
        Some(value.to_string())
    }
}

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
