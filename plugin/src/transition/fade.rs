//! Audio gain curves for the A/B cross-fade.

use super::config::AudioFadeStyle;

/// Pair of gain curves `mix_a(t)`, `mix_b(t)` for the host's cross-fade renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeCurves {
    style: AudioFadeStyle,
    /// Scale making A's fade-out finish at the transition point
    a_mul: f32,
    /// Scale making B's fade-in start at the transition point
    b_mul: f32,
}

impl FadeCurves {
    pub fn new(style: AudioFadeStyle, transition_point: f32) -> Self {
        Self {
            style,
            a_mul: 1.0 / transition_point,
            b_mul: 1.0 / (1.0 - transition_point),
        }
    }

    pub fn style(&self) -> AudioFadeStyle {
        self.style
    }

    /// Gain of the outgoing source at `t`.
    pub fn mix_a(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self.style {
            AudioFadeStyle::FadeOutIn => 1.0 - calc_fade(t, self.a_mul),
            AudioFadeStyle::CrossFade => 1.0 - t,
        }
    }

    /// Gain of the incoming source at `t`.
    pub fn mix_b(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self.style {
            AudioFadeStyle::FadeOutIn => 1.0 - calc_fade(1.0 - t, self.b_mul),
            AudioFadeStyle::CrossFade => t,
        }
    }
}

impl Default for FadeCurves {
    fn default() -> Self {
        Self::new(AudioFadeStyle::FadeOutIn, 0.5)
    }
}

/// `min(1, t * mul)`; a zero-length half (`0 * inf`) counts as already faded.
fn calc_fade(t: f32, mul: f32) -> f32 {
    let faded = t * mul;
    if faded.is_nan() || faded > 1.0 {
        1.0
    } else {
        faded
    }
}
