//! Overlay of the bridge scene's audio onto the A/B cross-fade.

use crate::host::{SourceRef, SourceRegistry};
use scene_transition_types::audio::mixer_enabled;
use scene_transition_types::AudioMix;

/// Timestamp of the bridge's audio if it is ready to be merged this frame.
///
/// Pending audio, or a ready frame without a timestamp, yields `None` so the
/// caller falls back to the base mix instead of waiting on the source.
pub fn ready_timestamp<H: SourceRegistry + ?Sized>(host: &H, bridge: SourceRef) -> Option<u64> {
    if host.audio_pending(bridge) {
        return None;
    }
    match host.audio_timestamp(bridge) {
        0 => None,
        ts => Some(ts),
    }
}

/// Earliest of the rendered output timestamp and the bridge timestamp.
///
/// An output timestamp of 0 means "not set".
pub fn earliest_timestamp(ts_out: u64, bridge_ts: u64) -> u64 {
    if ts_out == 0 || bridge_ts < ts_out {
        bridge_ts
    } else {
        ts_out
    }
}

/// Add `input` sample by sample onto `out` for every enabled mixer bus.
pub fn merge_into(out: &mut AudioMix, input: &AudioMix, mixers: u32, channels: usize) {
    for (mix, (out_bus, in_bus)) in out.output.iter_mut().zip(&input.output).enumerate() {
        if !mixer_enabled(mixers, mix) {
            continue;
        }
        for (out_ch, in_ch) in out_bus.data.iter_mut().zip(&in_bus.data).take(channels) {
            for (o, i) in out_ch.iter_mut().zip(in_ch) {
                *o += *i;
            }
        }
    }
}
