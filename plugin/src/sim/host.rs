//! In-memory host used by the simulator and the test-suite.

use crate::host::{
    ColorSpace, MixCallback, SourceRef, SourceRegistry, TransitionHost, TransitionTarget,
};
use parking_lot::Mutex;
use scene_transition_types::audio::mixer_enabled;
use scene_transition_types::AudioMix;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Scene,
    Filter { parent: SourceRef },
    Transition,
}

/// Synthetic audio produced by a source.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SimAudio {
    pending: bool,
    timestamp: u64,
    /// Constant sample value before the source volume is applied
    level: f32,
}

#[derive(Debug, Clone)]
struct SimSource {
    name: String,
    kind: SourceKind,
    refs: i64,
    enabled: bool,
    /// Own showing/active state (transitions)
    self_showing: bool,
    self_active: bool,
    calls: CounterCalls,
    volume: f32,
    audio: SimAudio,
    fixed_duration: Option<u32>,
}

impl SimSource {
    fn new(name: &str, kind: SourceKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            refs: 0,
            enabled: !matches!(kind, SourceKind::Filter { .. }),
            self_showing: false,
            self_active: false,
            calls: CounterCalls::default(),
            volume: 1.0,
            audio: SimAudio {
                pending: true,
                timestamp: 0,
                level: 0.0,
            },
            fixed_duration: None,
        }
    }
}

/// Number of show/active counter calls a source received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterCalls {
    pub inc_showing: u32,
    pub dec_showing: u32,
    pub inc_active: u32,
    pub dec_active: u32,
}

impl CounterCalls {
    pub fn showing(&self) -> i64 {
        i64::from(self.inc_showing) - i64::from(self.dec_showing)
    }

    pub fn active(&self) -> i64 {
        i64::from(self.inc_active) - i64::from(self.dec_active)
    }
}

/// A render request received by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenderCall {
    /// Endpoint rendered as the transition's frame
    Direct(TransitionTarget),
    /// Source composited on top
    Source(SourceRef),
}

struct SimState {
    next_id: u64,
    sources: BTreeMap<SourceRef, SimSource>,
    time: f32,
    endpoints_present: bool,
    /// Constant sample values of endpoints A and B
    endpoint_levels: (f32, f32),
    output_timestamp: u64,
    render_log: Vec<RenderCall>,
}

/// Host with scenes, filters and transitions kept in memory.
///
/// Show/active counters, references and render calls are recorded so they can
/// be inspected after driving a transition.
pub struct SimHost {
    state: Mutex<SimState>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState {
                next_id: 1,
                sources: BTreeMap::new(),
                time: 0.0,
                endpoints_present: true,
                endpoint_levels: (0.0, 0.0),
                output_timestamp: 0,
                render_log: Vec::new(),
            }),
        }
    }

    fn add_source(&self, name: &str, kind: SourceKind) -> SourceRef {
        let mut state = self.state.lock();
        let id = SourceRef(state.next_id);
        state.next_id += 1;
        state.sources.insert(id, SimSource::new(name, kind));
        id
    }

    /// Add a scene. No reference is taken.
    pub fn add_scene(&self, name: &str) -> SourceRef {
        self.add_source(name, SourceKind::Scene)
    }

    /// Add a filter to the named scene. Filters start disabled.
    pub fn add_filter(&self, scene: &str, name: &str) -> SourceRef {
        let parent = self.find(scene).unwrap_or(SourceRef(0));
        self.add_source(name, SourceKind::Filter { parent })
    }

    /// Add a transition source, hidden and inactive.
    pub fn add_transition(&self) -> SourceRef {
        self.add_source("Scene As Transition", SourceKind::Transition)
    }

    fn find(&self, name: &str) -> Option<SourceRef> {
        self.state
            .lock()
            .sources
            .iter()
            .find(|(_, s)| s.name == name && !matches!(s.kind, SourceKind::Filter { .. }))
            .map(|(id, _)| *id)
    }

    fn with_source<R>(
        &self,
        source: SourceRef,
        f: impl FnOnce(&mut SimSource) -> R,
    ) -> Option<R> {
        let mut state = self.state.lock();
        match state.sources.get_mut(&source) {
            Some(s) => Some(f(s)),
            None => {
                warn!("Unknown source {:?}", source);
                None
            }
        }
    }

    pub fn set_time(&self, t: f32) {
        self.state.lock().time = t;
    }

    /// Set whether the transition itself is shown and active.
    pub fn set_transition_state(&self, transition: SourceRef, showing: bool, active: bool) {
        self.with_source(transition, |s| {
            s.self_showing = showing;
            s.self_active = active;
        });
    }

    /// When false, direct rendering reports that there is nothing to render.
    pub fn set_endpoints_present(&self, present: bool) {
        self.state.lock().endpoints_present = present;
    }

    pub fn set_endpoint_levels(&self, a: f32, b: f32) {
        self.state.lock().endpoint_levels = (a, b);
    }

    /// Timestamp reported by the cross-fade renderer.
    pub fn set_output_timestamp(&self, timestamp: u64) {
        self.state.lock().output_timestamp = timestamp;
    }

    pub fn set_audio(&self, source: SourceRef, pending: bool, timestamp: u64, level: f32) {
        self.with_source(source, |s| {
            s.audio = SimAudio {
                pending,
                timestamp,
                level,
            }
        });
    }

    pub fn ref_count(&self, source: SourceRef) -> i64 {
        self.with_source(source, |s| s.refs).unwrap_or(0)
    }

    /// Reference count of the first source (scene, transition or filter) with this name.
    pub fn ref_count_by_name(&self, name: &str) -> i64 {
        self.state
            .lock()
            .sources
            .values()
            .find(|s| s.name == name)
            .map(|s| s.refs)
            .unwrap_or(0)
    }

    pub fn counter_calls(&self, source: SourceRef) -> CounterCalls {
        self.with_source(source, |s| s.calls).unwrap_or_default()
    }

    /// Net showing count added by transitions.
    pub fn showing_count(&self, source: SourceRef) -> i64 {
        self.counter_calls(source).showing()
    }

    /// Net active count added by transitions.
    pub fn active_count(&self, source: SourceRef) -> i64 {
        self.counter_calls(source).active()
    }

    pub fn fixed_duration(&self, transition: SourceRef) -> Option<u32> {
        self.with_source(transition, |s| s.fixed_duration).flatten()
    }

    pub fn volume(&self, source: SourceRef) -> f32 {
        self.with_source(source, |s| s.volume).unwrap_or(0.0)
    }

    /// Remove and return the render calls recorded so far.
    pub fn take_render_log(&self) -> Vec<RenderCall> {
        std::mem::take(&mut self.state.lock().render_log)
    }
}

impl SourceRegistry for SimHost {
    fn get_source_by_name(&self, name: &str) -> Option<SourceRef> {
        let source = self.find(name)?;
        self.with_source(source, |s| s.refs += 1);
        Some(source)
    }

    fn release(&self, source: SourceRef) {
        self.with_source(source, |s| {
            if s.refs == 0 {
                warn!("Release of unreferenced source '{}'", s.name);
            }
            s.refs -= 1;
        });
    }

    fn source_name(&self, source: SourceRef) -> Option<String> {
        self.with_source(source, |s| s.name.clone())
    }

    fn enum_scenes(&self) -> Vec<String> {
        self.state
            .lock()
            .sources
            .values()
            .filter(|s| s.kind == SourceKind::Scene)
            .map(|s| s.name.clone())
            .collect()
    }

    fn get_filter_by_name(&self, parent: SourceRef, name: &str) -> Option<SourceRef> {
        let mut state = self.state.lock();
        let (id, filter) = state
            .sources
            .iter_mut()
            .find(|(_, s)| s.name == name && s.kind == SourceKind::Filter { parent })?;
        filter.refs += 1;
        Some(*id)
    }

    fn enum_filters(&self, parent: SourceRef) -> Vec<String> {
        self.state
            .lock()
            .sources
            .values()
            .filter(|s| s.kind == SourceKind::Filter { parent })
            .map(|s| s.name.clone())
            .collect()
    }

    fn set_enabled(&self, source: SourceRef, enabled: bool) {
        self.with_source(source, |s| s.enabled = enabled);
    }

    fn enabled(&self, source: SourceRef) -> bool {
        self.with_source(source, |s| s.enabled).unwrap_or(false)
    }

    fn showing(&self, source: SourceRef) -> bool {
        self.with_source(source, |s| s.self_showing || s.calls.showing() > 0)
            .unwrap_or(false)
    }

    fn active(&self, source: SourceRef) -> bool {
        self.with_source(source, |s| s.self_active || s.calls.active() > 0)
            .unwrap_or(false)
    }

    fn inc_showing(&self, source: SourceRef) {
        self.with_source(source, |s| s.calls.inc_showing += 1);
    }

    fn dec_showing(&self, source: SourceRef) {
        self.with_source(source, |s| s.calls.dec_showing += 1);
    }

    fn inc_active(&self, source: SourceRef) {
        self.with_source(source, |s| s.calls.inc_active += 1);
    }

    fn dec_active(&self, source: SourceRef) {
        self.with_source(source, |s| s.calls.dec_active += 1);
    }

    fn set_volume(&self, source: SourceRef, multiplier: f32) {
        self.with_source(source, |s| s.volume = multiplier);
    }

    fn video_render(&self, source: SourceRef) {
        self.state.lock().render_log.push(RenderCall::Source(source));
    }

    fn audio_pending(&self, source: SourceRef) -> bool {
        self.with_source(source, |s| s.audio.pending).unwrap_or(true)
    }

    fn audio_timestamp(&self, source: SourceRef) -> u64 {
        self.with_source(source, |s| s.audio.timestamp).unwrap_or(0)
    }

    fn audio_mix(&self, source: SourceRef, mix: &mut AudioMix) {
        let value = self
            .with_source(source, |s| s.audio.level * s.volume)
            .unwrap_or(0.0);
        mix.fill(value);
    }
}

impl TransitionHost for SimHost {
    fn transition_time(&self, _transition: SourceRef) -> f32 {
        self.state.lock().time
    }

    fn enable_fixed(&self, transition: SourceRef, enable: bool, duration_ms: u32) {
        self.with_source(transition, |s| {
            s.fixed_duration = enable.then_some(duration_ms);
        });
    }

    fn video_render_direct(&self, _transition: SourceRef, target: TransitionTarget) -> bool {
        let mut state = self.state.lock();
        state.render_log.push(RenderCall::Direct(target));
        state.endpoints_present
    }

    fn audio_render(
        &self,
        _transition: SourceRef,
        ts_out: &mut u64,
        audio: &mut AudioMix,
        mixers: u32,
        channels: usize,
        _sample_rate: usize,
        mix_a: MixCallback<'_>,
        mix_b: MixCallback<'_>,
    ) -> bool {
        let (t, (level_a, level_b), timestamp) = {
            let state = self.state.lock();
            (state.time, state.endpoint_levels, state.output_timestamp)
        };
        let value = mix_a(t) * level_a + mix_b(t) * level_b;
        trace!("Cross-fade at t={:.3}: {:.4}", t, value);

        for (mix, bus) in audio.output.iter_mut().enumerate() {
            if !mixer_enabled(mixers, mix) {
                continue;
            }
            for channel in bus.data.iter_mut().take(channels) {
                channel.fill(value);
            }
        }
        *ts_out = timestamp;
        true
    }

    fn video_color_space(&self, _transition: SourceRef) -> ColorSpace {
        ColorSpace::Srgb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_are_counted() {
        let host = SimHost::new();
        let scene = host.add_scene("Stinger");
        assert_eq!(host.ref_count(scene), 0);

        assert_eq!(host.get_source_by_name("Stinger"), Some(scene));
        assert_eq!(host.ref_count_by_name("Stinger"), 1);
        host.release(scene);
        assert_eq!(host.ref_count(scene), 0);
        assert_eq!(host.get_source_by_name("Missing"), None);
    }

    #[test]
    fn test_filters_belong_to_their_scene() {
        let host = SimHost::new();
        let first = host.add_scene("First");
        let second = host.add_scene("Second");
        let filter = host.add_filter("First", "Shake");

        assert_eq!(host.enum_filters(first), vec!["Shake".to_string()]);
        assert!(host.enum_filters(second).is_empty());
        assert_eq!(host.get_filter_by_name(second, "Shake"), None);
        assert_eq!(host.get_filter_by_name(first, "Shake"), Some(filter));
        assert!(!host.enabled(filter));
        // Filters are not scenes
        assert_eq!(host.enum_scenes(), vec!["First", "Second"]);
    }

    #[test]
    fn test_counters() {
        let host = SimHost::new();
        let scene = host.add_scene("Stinger");
        host.inc_showing(scene);
        host.inc_active(scene);
        assert!(host.showing(scene));
        assert!(host.active(scene));
        host.dec_active(scene);
        host.dec_showing(scene);
        assert!(!host.showing(scene));
        assert_eq!(
            host.counter_calls(scene),
            CounterCalls {
                inc_showing: 1,
                dec_showing: 1,
                inc_active: 1,
                dec_active: 1
            }
        );
    }

    #[test]
    fn test_cross_fade_uses_gain_callbacks() {
        let host = SimHost::new();
        let transition = host.add_transition();
        host.set_endpoint_levels(1.0, 0.5);
        host.set_output_timestamp(42);
        host.set_time(0.25);

        let mut ts = 0;
        let mut audio = AudioMix::silent(2);
        let mix_a = |t: f32| 1.0 - t;
        let mix_b = |t: f32| t;
        assert!(host.audio_render(
            transition, &mut ts, &mut audio, 0b1, 2, 48000, &mix_a, &mix_b
        ));
        assert_eq!(ts, 42);
        let expected = 0.75 + 0.25 * 0.5;
        assert!(audio.output[0].data[1].iter().all(|s| (*s - expected).abs() < 1e-6));
        assert!(audio.output[1].data[0].iter().all(|s| *s == 0.0));
    }
}
