//! Per-frame progress tracking for the bridge scene.
//!
//! Pure state: the tracker decides which endpoint to render, whether the
//! bridge is composited and when it enters or exits. Host side effects are
//! applied by the caller.

use crate::host::TransitionTarget;
use serde::Serialize;

/// Where the bridge is relative to the current transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BridgePhase {
    /// No bridge entered yet in this cycle
    #[default]
    BeforeBridge,
    /// Bridge composited and counted as showing/active
    BridgeActive,
    /// Transition completed, B fully active
    AfterBridge,
}

/// Crossing of the bridge-active flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BridgeEdge {
    Enter,
    Exit,
}

/// What to do for one video frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameDecision {
    pub t: f32,
    pub target: TransitionTarget,
    /// Whether the bridge is layered on top (strictly inside the window)
    pub composite_bridge: bool,
    pub edge: Option<BridgeEdge>,
}

impl FrameDecision {
    /// Endpoint selection alone, for frames without a bridge scene.
    pub fn without_bridge(t: f32, transition_point: f32) -> Self {
        Self {
            t,
            target: if t < transition_point {
                TransitionTarget::A
            } else {
                TransitionTarget::B
            },
            composite_bridge: false,
            edge: None,
        }
    }
}

/// Counters incremented on the bridge scene at entry.
///
/// Exit decrements exactly these, whatever the transition's own state is by
/// then, so the host's counts always balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeHold {
    pub showing: bool,
    pub active: bool,
}

#[derive(Debug, Default)]
pub struct ProgressTracker {
    bridge_active: bool,
    phase: BridgePhase,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bridge_active(&self) -> bool {
        self.bridge_active
    }

    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    /// Advance to time `t` of the transition clock.
    ///
    /// Exit is checked first and only happens at the hard `t <= 0 || t >= 1`
    /// boundary. Entry happens on the first frame strictly inside `(0, 1)`
    /// while inactive, so every frame that composites the bridge counts it,
    /// even when that frame is already past the transition point.
    pub fn advance(&mut self, t: f32, transition_point: f32) -> FrameDecision {
        let use_a = t < transition_point;
        let at_boundary = t <= 0.0 || t >= 1.0;

        let edge = if at_boundary {
            if self.bridge_active {
                self.bridge_active = false;
                self.phase = if t >= 1.0 {
                    BridgePhase::AfterBridge
                } else {
                    BridgePhase::BeforeBridge
                };
                Some(BridgeEdge::Exit)
            } else {
                None
            }
        } else if !self.bridge_active {
            self.bridge_active = true;
            self.phase = BridgePhase::BridgeActive;
            Some(BridgeEdge::Enter)
        } else {
            None
        };

        FrameDecision {
            t,
            target: if use_a {
                TransitionTarget::A
            } else {
                TransitionTarget::B
            },
            composite_bridge: !at_boundary,
            edge,
        }
    }

    /// Drop the active flag without waiting for the boundary.
    ///
    /// Used when the bridge scene is swapped or torn down mid-transition.
    /// Returns whether the bridge was active.
    pub fn force_exit(&mut self) -> bool {
        let was_active = self.bridge_active;
        self.bridge_active = false;
        if was_active {
            self.phase = BridgePhase::BeforeBridge;
        }
        was_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize) -> Vec<f32> {
        (0..frames).map(|i| i as f32 / (frames - 1) as f32).collect()
    }

    #[test]
    fn test_target_selection() {
        let mut tracker = ProgressTracker::new();
        for t in ramp(101) {
            let decision = tracker.advance(t, 0.37);
            let expected = if t < 0.37 {
                TransitionTarget::A
            } else {
                TransitionTarget::B
            };
            assert_eq!(decision.target, expected, "t={}", t);
        }
    }

    #[test]
    fn test_bridge_not_composited_at_boundaries() {
        let mut tracker = ProgressTracker::new();
        assert!(!tracker.advance(0.0, 0.5).composite_bridge);
        assert!(tracker.advance(0.5, 0.5).composite_bridge);
        assert!(!tracker.advance(1.0, 0.5).composite_bridge);
    }

    #[test]
    fn test_single_enter_and_exit_per_cycle() {
        let mut tracker = ProgressTracker::new();
        let mut edges = Vec::new();
        let mut active_frames = Vec::new();
        for t in ramp(61) {
            let decision = tracker.advance(t, 0.5);
            if let Some(edge) = decision.edge {
                edges.push((edge, t));
            }
            if tracker.is_bridge_active() {
                active_frames.push(t);
            }
        }
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].0, BridgeEdge::Enter);
        assert!(edges[0].1 > 0.0);
        assert_eq!(edges[1], (BridgeEdge::Exit, 1.0));
        assert_eq!(tracker.phase(), BridgePhase::AfterBridge);
        // Contiguous and strictly inside (0, 1)
        assert!(active_frames.iter().all(|t| *t > 0.0 && *t < 1.0));
        assert_eq!(active_frames.len(), 59);
    }

    #[test]
    fn test_idle_frames_at_zero_do_not_enter() {
        let mut tracker = ProgressTracker::new();
        for _ in 0..10 {
            assert_eq!(tracker.advance(0.0, 0.5).edge, None);
        }
        assert!(!tracker.is_bridge_active());
        assert_eq!(tracker.phase(), BridgePhase::BeforeBridge);
    }

    #[test]
    fn test_oscillation_at_transition_point_does_not_exit() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.advance(0.2, 0.5).edge, Some(BridgeEdge::Enter));
        for t in [0.5, 0.49, 0.5, 0.499, 0.6, 0.5] {
            assert_eq!(tracker.advance(t, 0.5).edge, None, "t={}", t);
            assert!(tracker.is_bridge_active());
        }
    }

    #[test]
    fn test_reversed_transition_exits_at_zero() {
        let mut tracker = ProgressTracker::new();
        tracker.advance(0.1, 0.5);
        tracker.advance(0.05, 0.5);
        assert_eq!(tracker.advance(0.0, 0.5).edge, Some(BridgeEdge::Exit));
        assert_eq!(tracker.phase(), BridgePhase::BeforeBridge);
    }

    #[test]
    fn test_second_cycle_reenters() {
        let mut tracker = ProgressTracker::new();
        for t in ramp(11) {
            tracker.advance(t, 0.5);
        }
        let enters = ramp(11)
            .into_iter()
            .filter_map(|t| tracker.advance(t, 0.5).edge)
            .filter(|edge| *edge == BridgeEdge::Enter)
            .count();
        assert_eq!(enters, 1);
    }

    #[test]
    fn test_enters_on_first_frame_past_transition_point() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.advance(0.0, 0.01).edge, None);
        let decision = tracker.advance(1.0 / 30.0, 0.01);
        assert_eq!(decision.target, TransitionTarget::B);
        assert!(decision.composite_bridge);
        assert_eq!(decision.edge, Some(BridgeEdge::Enter));
        assert!(tracker.is_bridge_active());
    }

    #[test]
    fn test_composited_frames_are_always_active() {
        for transition_point in [0.0, 0.01, 0.5, 1.0 - f32::EPSILON] {
            let mut tracker = ProgressTracker::new();
            let mut enters = 0;
            for t in ramp(31) {
                let decision = tracker.advance(t, transition_point);
                if decision.edge == Some(BridgeEdge::Enter) {
                    enters += 1;
                }
                assert_eq!(
                    decision.composite_bridge,
                    tracker.is_bridge_active(),
                    "t={} tp={}",
                    t,
                    transition_point
                );
            }
            assert_eq!(enters, 1, "tp={}", transition_point);
        }
    }

    #[test]
    fn test_reenters_after_force_exit_past_transition_point() {
        let mut tracker = ProgressTracker::new();
        tracker.advance(0.2, 0.5);
        tracker.advance(0.6, 0.5);
        assert!(tracker.force_exit());
        assert_eq!(tracker.advance(0.7, 0.5).edge, Some(BridgeEdge::Enter));
        assert_eq!(tracker.advance(1.0, 0.5).edge, Some(BridgeEdge::Exit));
    }

    #[test]
    fn test_force_exit() {
        let mut tracker = ProgressTracker::new();
        assert!(!tracker.force_exit());
        tracker.advance(0.3, 0.5);
        assert!(tracker.force_exit());
        assert!(!tracker.is_bridge_active());
    }
}
