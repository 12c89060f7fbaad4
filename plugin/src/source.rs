//! Lifecycle surface a transition type exposes to the host.

use crate::events::EventSink;
use crate::host::{ColorSpace, SourceRef, TransitionHost};
use scene_transition_types::{AudioMix, Properties, Settings};
use std::sync::Arc;

/// Everything a transition instance needs at creation time.
#[derive(Clone)]
pub struct CreateContext {
    pub host: Arc<dyn TransitionHost>,
    /// The host-side source representing this transition instance
    pub source: SourceRef,
    pub events: Option<Arc<dyn EventSink>>,
}

/// Trait implemented by transition types.
///
/// The host drives an instance only through these callbacks and never calls
/// two of them concurrently for the same instance.
pub trait TransitionSource: Send {
    /// Apply updated settings. Never fails; bad values degrade to defaults.
    fn update(&mut self, settings: &Settings);

    /// Build the property sheet for the current state.
    fn properties(&self) -> Properties;

    /// React to a property change in the UI.
    ///
    /// Returns true when the sheet must be refreshed.
    fn property_modified(
        &mut self,
        props: &mut Properties,
        key: &str,
        settings: &mut Settings,
    ) -> bool {
        let _ = (props, key, settings);
        false
    }

    /// Report child sources currently contributing to the output.
    fn enum_active_sources(&self, callback: &mut dyn FnMut(SourceRef, SourceRef));

    /// Report every child source, active or not.
    fn enum_all_sources(&self, callback: &mut dyn FnMut(SourceRef, SourceRef));

    fn video_render(&mut self);

    /// Render one audio frame into `audio`. Returns false if nothing was rendered.
    fn audio_render(
        &mut self,
        ts_out: &mut u64,
        audio: &mut AudioMix,
        mixers: u32,
        channels: usize,
        sample_rate: usize,
    ) -> bool;

    fn video_color_space(&self, preferred: &[ColorSpace]) -> ColorSpace;

    /// Release every host reference held by the instance.
    fn destroy(self: Box<Self>);
}

/// Factory function creating an instance from its initial settings.
pub type CreateFn = fn(CreateContext, &Settings) -> Box<dyn TransitionSource>;

/// Function filling in default settings.
pub type DefaultsFn = fn(&mut Settings);

/// Registration record of a transition type.
#[derive(Clone)]
pub struct TransitionInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub create: CreateFn,
    pub get_defaults: DefaultsFn,
}

impl std::fmt::Debug for TransitionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
