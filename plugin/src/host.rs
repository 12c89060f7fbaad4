//! Host services consumed by the transition.
//!
//! The host owns the scene graph, the audio engine and the transition clock.
//! The transition only ever talks to it through these traits, using opaque
//! [`SourceRef`] handles.

use scene_transition_types::AudioMix;

/// Opaque handle to a host source (scene, filter or the transition itself).
///
/// A handle does not keep the source alive by itself. References are taken
/// explicitly with [`SourceRegistry::get_source_by_name`] /
/// [`SourceRegistry::get_filter_by_name`] and returned with
/// [`SourceRegistry::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct SourceRef(pub u64);

/// Which endpoint of a two-source transition to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TransitionTarget {
    /// Outgoing source
    A,
    /// Incoming source
    B,
}

/// Output color space negotiated with the host's renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    #[default]
    Srgb,
    Srgb16F,
    Rec2100Pq,
    Rec2100Hlg,
}

/// Scene graph and source services.
pub trait SourceRegistry: Send + Sync {
    /// Look up a source by name, acquiring a reference on success.
    fn get_source_by_name(&self, name: &str) -> Option<SourceRef>;

    /// Return a reference taken by one of the `get_*` calls.
    fn release(&self, source: SourceRef);

    fn source_name(&self, source: SourceRef) -> Option<String>;

    /// Names of every scene, in host order.
    fn enum_scenes(&self) -> Vec<String>;

    /// Look up a filter attached to `parent`, acquiring a reference on success.
    fn get_filter_by_name(&self, parent: SourceRef, name: &str) -> Option<SourceRef>;

    /// Names of the filters attached to `parent`, in host order.
    fn enum_filters(&self, parent: SourceRef) -> Vec<String>;

    fn set_enabled(&self, source: SourceRef, enabled: bool);
    fn enabled(&self, source: SourceRef) -> bool;

    /// Whether the source is currently shown anywhere (preview or program).
    fn showing(&self, source: SourceRef) -> bool;
    /// Whether the source is currently active (on program output).
    fn active(&self, source: SourceRef) -> bool;

    fn inc_showing(&self, source: SourceRef);
    fn dec_showing(&self, source: SourceRef);
    fn inc_active(&self, source: SourceRef);
    fn dec_active(&self, source: SourceRef);

    /// Set the linear output volume multiplier of a source.
    fn set_volume(&self, source: SourceRef, multiplier: f32);

    /// Render a source into the current render target.
    fn video_render(&self, source: SourceRef);

    /// Whether the source has no audio ready for the current frame.
    fn audio_pending(&self, source: SourceRef) -> bool;

    /// Timestamp (ns) of the source's current audio frame, 0 if unknown.
    fn audio_timestamp(&self, source: SourceRef) -> u64;

    /// Copy the source's current audio mix into `mix`.
    fn audio_mix(&self, source: SourceRef, mix: &mut AudioMix);
}

/// Gain curve handed to the host's cross-fade renderer: maps `t` to a gain.
pub type MixCallback<'a> = &'a dyn Fn(f32) -> f32;

/// Services available to a transition source.
pub trait TransitionHost: SourceRegistry {
    /// Normalized progress `t ∈ [0, 1]` of the running transition.
    fn transition_time(&self, transition: SourceRef) -> f32;

    /// Switch the transition to a fixed duration timer.
    fn enable_fixed(&self, transition: SourceRef, enable: bool, duration_ms: u32);

    /// Render endpoint A or B as the transition's frame.
    ///
    /// Returns false when the host has nothing to render (e.g. no endpoints).
    fn video_render_direct(&self, transition: SourceRef, target: TransitionTarget) -> bool;

    /// Render the A/B cross-fade into `audio` using the given gain curves.
    #[allow(clippy::too_many_arguments)]
    fn audio_render(
        &self,
        transition: SourceRef,
        ts_out: &mut u64,
        audio: &mut AudioMix,
        mixers: u32,
        channels: usize,
        sample_rate: usize,
        mix_a: MixCallback<'_>,
        mix_b: MixCallback<'_>,
    ) -> bool;

    fn video_color_space(&self, transition: SourceRef) -> ColorSpace;
}
