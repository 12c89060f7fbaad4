//! Offline playback of a scene transition against the in-memory host.

mod host;

pub use host::{CounterCalls, RenderCall, SimHost};

use crate::config::SimConfig;
use crate::events::EventLog;
use crate::host::{SourceRef, TransitionTarget};
use crate::registry::TransitionRegistry;
use crate::source::CreateContext;
use crate::transition::config::ResolvedConfig;
use crate::version::VersionInfo;
use scene_transition_types::{AudioMix, Settings, TransitionEvent, TRANSITION_ID};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Constant sample value of both endpoints.
const ENDPOINT_LEVEL: f32 = 0.5;
/// Constant sample value of the bridge scene before its volume.
const BRIDGE_LEVEL: f32 = 0.25;

/// What happened on one video frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub index: u32,
    pub t: f32,
    /// Endpoint requested from the host, if any
    pub target: Option<TransitionTarget>,
    pub bridge_composited: bool,
    pub bridge_active: bool,
    pub audio_timestamp: u64,
    /// First sample of the first channel on bus 0
    pub audio_level: f32,
}

/// Host-side state of the bridge scene after teardown.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeBalance {
    pub scene: String,
    pub counters: CounterCalls,
    pub scene_refs: i64,
    pub filter_refs: Option<i64>,
}

impl BridgeBalance {
    /// Every increment was mirrored and every reference returned.
    pub fn is_balanced(&self) -> bool {
        self.counters.showing() == 0
            && self.counters.active() == 0
            && self.scene_refs == 0
            && self.filter_refs.unwrap_or(0) == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub version: String,
    pub transition_id: &'static str,
    pub duration_ms: f32,
    pub transition_point: f32,
    pub frames: Vec<FrameReport>,
    pub events: Vec<TransitionEvent>,
    pub bridge: Option<BridgeBalance>,
}

/// Number of frames covering one transition of `duration_ms` at `fps`.
fn frames_for(duration_ms: f32, fps: u32) -> u32 {
    let frames = (duration_ms * fps as f32 / 1000.0).ceil() as u32 + 1;
    frames.max(2)
}

/// Play one full transition and report what the host observed.
///
/// The bridge scene (and its filter) named in `settings` are created on the
/// simulated host before the transition is instantiated.
pub fn run(config: &SimConfig, settings: &Settings) -> anyhow::Result<SimReport> {
    let mut registry = TransitionRegistry::new();
    crate::module_load(&mut registry)?;

    let mut layered = registry.defaults(TRANSITION_ID)?;
    layered.apply(settings);
    let resolved = ResolvedConfig::resolve(&layered, 0.0);

    let host = Arc::new(SimHost::new());
    host.add_scene("Scene A");
    host.add_scene("Scene B");
    host.set_endpoint_levels(ENDPOINT_LEVEL, ENDPOINT_LEVEL);

    let bridge = resolved.scene_name.as_deref().map(|name| {
        let scene = host.add_scene(name);
        let filter = resolved
            .filter_name
            .as_deref()
            .map(|filter| host.add_filter(name, filter));
        (name.to_string(), scene, filter)
    });

    let source = host.add_transition();
    host.set_transition_state(source, true, true);

    let events = EventLog::new();
    let ctx = CreateContext {
        host: host.clone(),
        source,
        events: Some(Arc::new(events.clone())),
    };
    let mut transition = registry.create(TRANSITION_ID, ctx, settings)?;

    let frames = config
        .frames
        .unwrap_or_else(|| frames_for(resolved.duration_ms, config.fps))
        .max(2);
    let frame_ns = 1_000_000_000 / u64::from(config.fps.max(1));
    let channels = config.channels as usize;
    info!(
        "Simulating {} frames at {} fps (duration={}ms, transition_point={:.3})",
        frames, config.fps, resolved.duration_ms, resolved.transition_point
    );

    let mut reports = Vec::with_capacity(frames as usize);
    for index in 0..frames {
        let t = index as f32 / (frames - 1) as f32;
        let timestamp = u64::from(index) * frame_ns + 1;
        host.set_time(t);
        host.set_output_timestamp(timestamp);
        if let Some((_, scene, _)) = &bridge {
            let pending = index < config.audio_delay_frames;
            host.set_audio(*scene, pending, timestamp, BRIDGE_LEVEL);
        }

        transition.video_render();
        let calls = host.take_render_log();

        let mut audio_timestamp = 0;
        let mut audio = AudioMix::silent(channels);
        transition.audio_render(
            &mut audio_timestamp,
            &mut audio,
            config.mixers,
            channels,
            config.sample_rate as usize,
        );

        let bridge_ref = bridge.as_ref().map(|(_, scene, _)| *scene);
        reports.push(FrameReport {
            index,
            t,
            target: calls.iter().find_map(|call| match call {
                RenderCall::Direct(target) => Some(*target),
                RenderCall::Source(_) => None,
            }),
            bridge_composited: bridge_ref
                .map(|scene| calls.contains(&RenderCall::Source(scene)))
                .unwrap_or(false),
            bridge_active: bridge_ref
                .map(|scene| bridge_held(&host, scene))
                .unwrap_or(false),
            audio_timestamp,
            audio_level: audio
                .output
                .first()
                .and_then(|bus| bus.data.first())
                .and_then(|channel| channel.first())
                .copied()
                .unwrap_or(0.0),
        });
    }

    transition.destroy();

    let balance = bridge.map(|(name, scene, filter)| BridgeBalance {
        scene: name,
        counters: host.counter_calls(scene),
        scene_refs: host.ref_count(scene),
        filter_refs: filter.map(|filter| host.ref_count(filter)),
    });

    Ok(SimReport {
        version: VersionInfo::get().display_version(),
        transition_id: TRANSITION_ID,
        duration_ms: resolved.duration_ms,
        transition_point: resolved.transition_point,
        frames: reports,
        events: events.drain(),
        bridge: balance,
    })
}

fn bridge_held(host: &SimHost, scene: SourceRef) -> bool {
    host.showing_count(scene) > 0 || host.active_count(scene) > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_transition_types::keys;

    #[test]
    fn test_frames_for_duration() {
        assert_eq!(frames_for(1000.0, 30), 31);
        assert_eq!(frames_for(0.0, 30), 2);
        assert_eq!(frames_for(50.0, 30), 3);
    }

    #[test]
    fn test_run_without_scene() {
        let report = run(&SimConfig::default(), &Settings::new()).unwrap();
        assert_eq!(report.frames.len(), 31);
        assert!(report.bridge.is_none());
        assert!(report.frames.iter().all(|f| !f.bridge_composited));
    }

    #[test]
    fn test_run_balances_bridge() {
        let mut settings = Settings::new();
        settings.set_string(keys::SCENE, "Stinger");
        settings.set_string(keys::FILTER, "Shake");
        let config = SimConfig {
            frames: Some(11),
            ..SimConfig::default()
        };

        let report = run(&config, &settings).unwrap();
        let balance = report.bridge.unwrap();
        assert!(balance.is_balanced(), "{:?}", balance);
        assert_eq!(balance.counters.inc_showing, 1);
        assert_eq!(balance.counters.inc_active, 1);
        assert!(!report.frames[0].bridge_composited);
        assert!(report.frames[5].bridge_composited);
        assert!(!report.frames[10].bridge_composited);
    }
}
