//! The scene-as-transition controller.
//!
//! Renders endpoint A until the transition point and endpoint B after it,
//! while a bridge scene is layered on top for the whole transition window.
//! The bridge is counted as showing/active on the host while it is inserted,
//! an optional filter on it is toggled in lockstep, and its audio is added on
//! top of the A/B cross-fade.

pub mod audio;
pub mod config;
pub mod fade;
pub mod filter;
pub mod properties;
pub mod state;

use crate::events::EventSink;
use crate::host::{ColorSpace, SourceRef, TransitionHost};
use crate::locale::text;
use crate::source::{CreateContext, TransitionInfo, TransitionSource};
use config::ResolvedConfig;
use fade::FadeCurves;
use filter::{BindError, FilterBinder, FilterState};
use scene_transition_types::{
    keys, AudioMix, Properties, Settings, TransitionEvent, TRANSITION_ID,
};
use state::{BridgeEdge, BridgeHold, BridgePhase, FrameDecision, ProgressTracker};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SceneTransition {
    host: Arc<dyn TransitionHost>,
    source: SourceRef,
    events: Option<Arc<dyn EventSink>>,
    /// Held reference to the bridge scene
    bridge: Option<SourceRef>,
    /// Configured bridge scene name, kept even when the lookup failed
    bridge_name: Option<String>,
    filter: FilterBinder,
    tracker: ProgressTracker,
    hold: BridgeHold,
    transition_point: f32,
    duration_ms: f32,
    curves: FadeCurves,
    volume: f32,
    /// Scratch buffer for the bridge's audio
    bridge_audio: AudioMix,
}

impl SceneTransition {
    pub fn create(ctx: CreateContext, settings: &Settings) -> Self {
        ctx.host.enable_fixed(ctx.source, true, 0);

        let mut transition = Self {
            host: ctx.host,
            source: ctx.source,
            events: ctx.events,
            bridge: None,
            bridge_name: None,
            filter: FilterBinder::new(),
            tracker: ProgressTracker::new(),
            hold: BridgeHold::default(),
            transition_point: 0.0,
            duration_ms: 0.0,
            curves: FadeCurves::default(),
            volume: 1.0,
            bridge_audio: AudioMix::silent(2),
        };
        transition.apply_settings(settings);
        transition
    }

    fn create_boxed(ctx: CreateContext, settings: &Settings) -> Box<dyn TransitionSource> {
        Box::new(Self::create(ctx, settings))
    }

    pub fn get_defaults(settings: &mut Settings) {
        settings.set_default_double(keys::DURATION, 1000.0);
        settings.set_default_double(keys::TRANSITION_POINT, 50.0);
        settings.set_default_double(keys::TRANSITION_POINT_MS, 500.0);
        settings.set_default_string(keys::FILTER, text("NoFilterSelected"));
        settings.set_default_string(keys::PREV_SCENE, "");
        settings.set_default_double(keys::AUDIO_VOLUME, 100.0);
    }

    /// Registration record of this transition type.
    pub fn info() -> TransitionInfo {
        TransitionInfo {
            id: TRANSITION_ID,
            name: text("SceneAsTransition"),
            create: Self::create_boxed,
            get_defaults: Self::get_defaults,
        }
    }

    pub fn is_bridge_active(&self) -> bool {
        self.tracker.is_bridge_active()
    }

    pub fn phase(&self) -> BridgePhase {
        self.tracker.phase()
    }

    pub fn transition_point(&self) -> f32 {
        self.transition_point
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    /// Linear multiplier applied to the bridge's audio.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn bridge(&self) -> Option<SourceRef> {
        self.bridge
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter.state()
    }

    pub fn curves(&self) -> FadeCurves {
        self.curves
    }

    fn emit(&self, event: TransitionEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    fn bridge_label(&self) -> String {
        self.bridge_name.clone().unwrap_or_default()
    }

    fn apply_settings(&mut self, settings: &Settings) {
        let config = ResolvedConfig::resolve(settings, self.transition_point);

        self.duration_ms = config.duration_ms;
        self.transition_point = config.transition_point;
        self.curves = FadeCurves::new(config.fade_style, config.transition_point);
        self.volume = config.volume;
        self.host.enable_fixed(self.source, true, config.duration_ms as u32);

        let scene_changed = self.set_bridge_scene(config.scene_name);
        self.set_filter(config.filter_name, scene_changed);

        if let Some(bridge) = self.bridge {
            self.host.set_volume(bridge, self.volume);
        }

        debug!(
            "Updated: duration={}ms transition_point={:.3} fade={:?} volume={:.3}",
            self.duration_ms,
            self.transition_point,
            config.fade_style,
            self.volume
        );
    }

    /// Point the bridge at the named scene. Returns whether the held scene changed.
    ///
    /// An unchanged name is a no-op, unless the earlier lookup failed, in
    /// which case the lookup is retried.
    fn set_bridge_scene(&mut self, name: Option<String>) -> bool {
        let renamed = name != self.bridge_name;
        if !renamed && (self.bridge.is_some() || name.is_none()) {
            return false;
        }

        let scene = name
            .as_deref()
            .and_then(|n| self.host.get_source_by_name(n));
        if let (Some(n), None) = (name.as_deref(), scene) {
            if renamed {
                warn!("Transition scene '{}' not found, rendering without bridge", n);
            } else {
                debug!("Transition scene '{}' still not found", n);
            }
        }

        if scene.is_none() && self.bridge.is_none() {
            self.bridge_name = name;
            return false;
        }

        self.leave_bridge();
        if let Some(old) = self.bridge.take() {
            self.host.release(old);
        }
        self.bridge = scene;
        self.bridge_name = name;

        let resolved = self.bridge.and(self.bridge_name.clone());
        match &resolved {
            Some(scene) => info!("Transition scene set to '{}'", scene),
            None => info!("Transition scene cleared"),
        }
        self.emit(TransitionEvent::SceneChanged { scene: resolved });
        true
    }

    /// Apply the configured filter name, rebinding after a scene change.
    fn set_filter(&mut self, name: Option<String>, scene_changed: bool) {
        let renamed = name.as_deref() != self.filter.name();
        if !renamed && !scene_changed {
            return;
        }

        let active = self.tracker.is_bridge_active();
        if active {
            self.filter.disable(self.host.as_ref());
        }

        let result = if renamed {
            self.filter
                .configure(self.host.as_ref(), self.bridge, name)
                .map(|_| ())
        } else {
            self.filter.rebind(self.host.as_ref(), self.bridge)
        };

        match result {
            Ok(()) => {
                if let (Some(filter), Some(_)) = (self.filter.name(), self.filter.filter()) {
                    self.emit(TransitionEvent::FilterResolved {
                        scene: self.bridge_label(),
                        filter: filter.to_string(),
                    });
                }
            }
            Err(BindError::FilterNotFound { scene, filter }) => {
                info!(
                    "Filter '{}' not found on '{}' yet, will retry when the transition starts",
                    filter, scene
                );
                self.emit(TransitionEvent::FilterMissing { scene, filter });
            }
            Err(err @ BindError::SceneMissing(_)) => debug!("{}", err),
        }

        if active {
            if let Err(err) = self.filter.enable(self.host.as_ref(), self.bridge) {
                debug!("Filter not re-enabled: {}", err);
            }
        }
    }

    fn enter_bridge(&mut self, t: f32) {
        let Some(bridge) = self.bridge else {
            return;
        };

        let showing = self.host.showing(self.source);
        let active = self.host.active(self.source);
        if showing {
            self.host.inc_showing(bridge);
        }
        if active {
            self.host.inc_active(bridge);
        }
        self.hold = BridgeHold { showing, active };

        let was_unresolved = self.filter.state() == FilterState::Unresolved;
        match self.filter.enable(self.host.as_ref(), Some(bridge)) {
            Ok(Some(_)) if was_unresolved => {
                if let Some(filter) = self.filter.name() {
                    self.emit(TransitionEvent::FilterResolved {
                        scene: self.bridge_label(),
                        filter: filter.to_string(),
                    });
                }
            }
            Ok(_) => {}
            Err(err) => {
                warn!("Transition filter not enabled: {}", err);
                if let BindError::FilterNotFound { scene, filter } = err {
                    self.emit(TransitionEvent::FilterMissing { scene, filter });
                }
            }
        }

        info!(
            "Transition scene '{}' entered at t={:.3} (showing={}, active={})",
            self.bridge_label(),
            t,
            showing,
            active
        );
        self.emit(TransitionEvent::BridgeEntered {
            scene: self.bridge_label(),
            t,
            showing,
            active,
        });
    }

    fn exit_bridge(&mut self, t: f32) {
        let Some(bridge) = self.bridge else {
            return;
        };

        let hold = std::mem::take(&mut self.hold);
        if hold.active {
            self.host.dec_active(bridge);
        }
        if hold.showing {
            self.host.dec_showing(bridge);
        }
        self.filter.disable(self.host.as_ref());

        info!("Transition scene '{}' exited at t={:.3}", self.bridge_label(), t);
        self.emit(TransitionEvent::BridgeExited {
            scene: self.bridge_label(),
            t,
        });
    }

    /// Exit the bridge outside the 0/1 boundary (scene swap, teardown).
    fn leave_bridge(&mut self) {
        if self.tracker.force_exit() {
            let t = self.host.transition_time(self.source);
            self.exit_bridge(t);
        }
    }
}

impl TransitionSource for SceneTransition {
    fn update(&mut self, settings: &Settings) {
        self.apply_settings(settings);
    }

    fn properties(&self) -> Properties {
        properties::build(self.host.as_ref(), self.bridge)
    }

    fn property_modified(
        &mut self,
        props: &mut Properties,
        key: &str,
        settings: &mut Settings,
    ) -> bool {
        match key {
            keys::TP_TYPE => properties::transition_point_type_modified(props, settings),
            keys::SCENE => properties::scene_modified(self.host.as_ref(), props, settings),
            _ => false,
        }
    }

    fn enum_active_sources(&self, callback: &mut dyn FnMut(SourceRef, SourceRef)) {
        if let (Some(bridge), true) = (self.bridge, self.tracker.is_bridge_active()) {
            callback(self.source, bridge);
        }
    }

    fn enum_all_sources(&self, callback: &mut dyn FnMut(SourceRef, SourceRef)) {
        if let Some(bridge) = self.bridge {
            callback(self.source, bridge);
        }
    }

    fn video_render(&mut self) {
        let t = self.host.transition_time(self.source);
        let decision = match self.bridge {
            Some(_) => self.tracker.advance(t, self.transition_point),
            None => FrameDecision::without_bridge(t, self.transition_point),
        };

        match decision.edge {
            Some(BridgeEdge::Enter) => self.enter_bridge(t),
            Some(BridgeEdge::Exit) => self.exit_bridge(t),
            None => {}
        }

        if !self.host.video_render_direct(self.source, decision.target) {
            return;
        }
        if decision.composite_bridge {
            if let Some(bridge) = self.bridge {
                self.host.video_render(bridge);
            }
        }
    }

    fn audio_render(
        &mut self,
        ts_out: &mut u64,
        audio: &mut AudioMix,
        mixers: u32,
        channels: usize,
        sample_rate: usize,
    ) -> bool {
        let active_bridge = self.bridge.filter(|_| self.tracker.is_bridge_active());
        let bridge_ts = active_bridge
            .and_then(|bridge| audio::ready_timestamp(self.host.as_ref(), bridge));

        let curves = self.curves;
        let mix_a = move |t: f32| curves.mix_a(t);
        let mix_b = move |t: f32| curves.mix_b(t);
        let rendered = self.host.audio_render(
            self.source,
            ts_out,
            audio,
            mixers,
            channels,
            sample_rate,
            &mix_a,
            &mix_b,
        );

        let (Some(bridge), Some(bridge_ts)) = (active_bridge, bridge_ts) else {
            if active_bridge.is_some() {
                debug!("Transition scene audio pending, skipping merge");
                self.emit(TransitionEvent::AudioSkipped);
            }
            return rendered;
        };

        if self.bridge_audio.channels() != channels {
            self.bridge_audio = AudioMix::silent(channels);
        }
        self.host.audio_mix(bridge, &mut self.bridge_audio);
        audio::merge_into(audio, &self.bridge_audio, mixers, channels);
        *ts_out = audio::earliest_timestamp(*ts_out, bridge_ts);

        self.emit(TransitionEvent::AudioMerged { timestamp: *ts_out });
        true
    }

    fn video_color_space(&self, _preferred: &[ColorSpace]) -> ColorSpace {
        self.host.video_color_space(self.source)
    }

    fn destroy(mut self: Box<Self>) {
        self.leave_bridge();
        self.filter.release(self.host.as_ref());
        if let Some(bridge) = self.bridge.take() {
            self.host.release(bridge);
        }
        debug!("Scene transition destroyed");
    }
}
