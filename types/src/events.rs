//! Events reported by a transition instance as its state changes.

use serde::{Deserialize, Serialize};

/// State changes of a scene transition, in the order they happen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TransitionEvent {
    /// The bridge scene was resolved (or cleared) after a settings change
    SceneChanged { scene: Option<String> },
    /// The bridge scene started compositing
    BridgeEntered {
        scene: String,
        t: f32,
        showing: bool,
        active: bool,
    },
    /// The bridge scene stopped compositing
    BridgeExited { scene: String, t: f32 },
    /// A named filter was found on the bridge scene
    FilterResolved { scene: String, filter: String },
    /// A named filter could not be found (resolution will be retried)
    FilterMissing { scene: String, filter: String },
    /// The bridge scene's audio was added to the output
    AudioMerged { timestamp: u64 },
    /// The bridge scene had no audio ready, base mix used unchanged
    AudioSkipped,
}

impl TransitionEvent {
    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            TransitionEvent::SceneChanged { scene: Some(scene) } => {
                format!("Bridge scene set to '{}'", scene)
            }
            TransitionEvent::SceneChanged { scene: None } => "Bridge scene cleared".to_string(),
            TransitionEvent::BridgeEntered {
                scene,
                t,
                showing,
                active,
            } => format!(
                "Bridge '{}' entered at t={:.3} (showing={}, active={})",
                scene, t, showing, active
            ),
            TransitionEvent::BridgeExited { scene, t } => {
                format!("Bridge '{}' exited at t={:.3}", scene, t)
            }
            TransitionEvent::FilterResolved { scene, filter } => {
                format!("Filter '{}' resolved on '{}'", filter, scene)
            }
            TransitionEvent::FilterMissing { scene, filter } => {
                format!("Filter '{}' not found on '{}'", filter, scene)
            }
            TransitionEvent::AudioMerged { timestamp } => {
                format!("Bridge audio merged (ts={})", timestamp)
            }
            TransitionEvent::AudioSkipped => "Bridge audio pending, merge skipped".to_string(),
        }
    }
}
