//! Settings bag pushed by the host on every configuration change.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Setting keys understood by the scene transition.
pub mod keys {
    /// Name of the bridge scene.
    pub const SCENE: &str = "scene";
    /// Total transition duration in milliseconds.
    pub const DURATION: &str = "duration";
    /// Transition point type (0 = percentage, 1 = time).
    pub const TP_TYPE: &str = "tp_type";
    /// Transition point as a percentage of the duration.
    pub const TRANSITION_POINT: &str = "transition_point";
    /// Transition point as an absolute offset in milliseconds.
    pub const TRANSITION_POINT_MS: &str = "transition_point_ms";
    /// Name of the filter on the bridge scene to toggle.
    pub const FILTER: &str = "filter";
    /// Audio fade style (0 = fade out / fade in, 1 = cross-fade).
    pub const AUDIO_FADE_STYLE: &str = "audio_fade_style";
    /// Bridge scene volume in percent.
    pub const AUDIO_VOLUME: &str = "audio_volume";
    /// Scene name the filter list was last populated for.
    pub const PREV_SCENE: &str = "prev_scene";
}

/// Property value that can be various types.
///
/// Hosts store numbers as either integers or doubles depending on the
/// widget that produced them, so getters convert between the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl PropertyValue {
    /// Numeric view of the value. Numeric strings are parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            PropertyValue::UInt(u) => Some(*u as f64),
            PropertyValue::String(s) => s.trim().parse::<f64>().ok(),
            PropertyValue::Bool(_) => None,
        }
    }

    /// Integer view of the value. Floats are truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            PropertyValue::UInt(u) => i64::try_from(*u).ok(),
            PropertyValue::Float(f) => Some(*f as i64),
            PropertyValue::String(s) => s.trim().parse::<i64>().ok(),
            PropertyValue::Bool(b) => Some(i64::from(*b)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            PropertyValue::Int(i) => Some(*i != 0),
            PropertyValue::UInt(u) => Some(*u != 0),
            _ => None,
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<u64> for PropertyValue {
    fn from(u: u64) -> Self {
        PropertyValue::UInt(u)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

/// Key/value settings with a separate defaults layer.
///
/// Lookups check the user values first, then the defaults, then fall back to
/// the zero value of the requested type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    values: HashMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    defaults: HashMap<String, PropertyValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a settings bag from user values only.
    pub fn from_values(values: HashMap<String, PropertyValue>) -> Self {
        Self {
            values,
            defaults: HashMap::new(),
        }
    }

    fn lookup(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key).or_else(|| self.defaults.get(key))
    }

    /// Whether a user value (not a default) is set for `key`.
    pub fn has_user_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_string(&self, key: &str) -> &str {
        self.lookup(key).and_then(PropertyValue::as_str).unwrap_or("")
    }

    pub fn get_double(&self, key: &str) -> f64 {
        self.lookup(key)
            .and_then(PropertyValue::as_f64)
            .unwrap_or(0.0)
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.lookup(key)
            .and_then(PropertyValue::as_i64)
            .unwrap_or(0)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.lookup(key)
            .and_then(PropertyValue::as_bool)
            .unwrap_or(false)
    }

    pub fn set(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.set(key, value);
    }

    pub fn set_double(&mut self, key: &str, value: f64) {
        self.set(key, value);
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.set(key, value);
    }

    pub fn set_default(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.defaults.insert(key.to_string(), value.into());
    }

    pub fn set_default_string(&mut self, key: &str, value: &str) {
        self.set_default(key, value);
    }

    pub fn set_default_double(&mut self, key: &str, value: f64) {
        self.set_default(key, value);
    }

    /// Remove a user value so the default applies again.
    pub fn erase(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Copy every user value of `other` over this bag, keeping our defaults.
    pub fn apply(&mut self, other: &Settings) {
        for (k, v) in &other.values {
            self.values.insert(k.clone(), v.clone());
        }
    }

    /// User values, without defaults.
    pub fn values(&self) -> &HashMap<String, PropertyValue> {
        &self.values
    }
}
