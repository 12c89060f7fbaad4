//! User-facing strings (en-US).

/// Look up a localized string by key. Unknown keys are returned as-is.
pub fn text<'a>(key: &'a str) -> &'a str {
    match key {
        "SceneAsTransition" => "Scene As Transition",
        "Description" => "Use a scene as a transition between two scenes.",
        "Scene" => "Scene",
        "SceneDescription" => "The scene played while the transition runs.",
        "Duration" => "Duration",
        "DurationDescription" => "Total length of the transition.",
        "TransitionPointSettings" => "Transition Point",
        "TransitionPointType" => "Transition Point Type",
        "TransitionPointTypeDescription" => {
            "Whether the transition point is a percentage of the duration or a fixed time."
        }
        "TransitionPointPercentage" => "Percentage",
        "TransitionPointTime" => "Time (ms)",
        "TransitionPoint" => "Transition Point",
        "TransitionPointPercentageDescription" => {
            "Point in the transition where the new scene replaces the old one, in percent."
        }
        "TransitionPointTimeDescription" => {
            "Point in the transition where the new scene replaces the old one, in milliseconds."
        }
        "AudioSettings" => "Audio",
        "AudioFadeStyle" => "Audio Fade Style",
        "AudioFadeStyleDescription" => {
            "How the audio of the two scenes is blended while the transition runs."
        }
        "FadeOutFadeIn" => "Fade out to transition point then fade in",
        "CrossFade" => "Crossfade",
        "AudioVolume" => "Transition Scene Volume",
        "AudioVolumeDescription" => "Volume of the transition scene's own audio.",
        "FilterToTrigger" => "Filter to Trigger",
        "FilterToTriggerDescription" => {
            "A filter on the transition scene that is enabled while the transition runs."
        }
        "NoFilterSelected" => "No filter selected",
        other => other,
    }
}
