//! Shared types for the scene-as-transition plugin.
//!
//! This crate contains the host-neutral data model used by the transition
//! controller and by host adapters: the settings bag, the property sheet
//! model, audio buffers and transition events.

/// Identifier the transition type is registered under.
pub const TRANSITION_ID: &str = "scene_as_transition";

pub mod audio;
pub mod events;
pub mod properties;
pub mod settings;

#[cfg(feature = "validation")]
pub mod validation;

// Re-export commonly used types
pub use audio::{AudioBus, AudioMix, AUDIO_OUTPUT_FRAMES, MAX_AUDIO_CHANNELS, MAX_AUDIO_MIXES};
pub use events::TransitionEvent;
pub use properties::{ComboFormat, ComboType, ListItem, Properties, Property, PropertyKind};
pub use settings::{keys, PropertyValue, Settings};

#[cfg(feature = "validation")]
pub use validation::TransitionSettings;
