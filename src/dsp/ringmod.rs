//! Ring modulator applied to the summed voice output.

/*
Ring Modulation
===============

The summed signal is multiplied by a square carrier (±0.5) with a feedback
path. Each processed channel keeps a running value `fp`:

    carrier = sin(phase) >= 0 ? 0.5 : -0.5
    fp      = (feedback · fp + input) · carrier

and `fp` replaces the input sample. Channels 0 and 1 share the carrier phase
and the feedback register, but only the left chain writes the register. The
right channel reads the left channel's fresh result:

    fp  = (fb · fp + left)  · carrier     → left, kept for the next frame
    fp2 = (fb · fp + right) · carrier     → right

The carrier phase advances by

    Δφ = 2π · (100 · fine + rate_hz) / sample_rate

per frame and is wrapped into 0..2π.

A rate of zero bypasses the effect completely; this is the "off" position of
the host parameter. Any channel beyond the second is left untouched.
*/

use std::f32::consts::TAU;

/// Slowest carrier rate in Hz.
pub const MIN_RING_MOD_RATE: f32 = 0.1;
/// Fastest carrier rate in Hz.
pub const MAX_RING_MOD_RATE: f32 = 5_000.0;

/// Scale applied to the feedback amount.
const FEEDBACK_SCALE: f32 = 0.95;

/// Map a normalized host value onto the carrier rate. Zero means "off".
#[inline]
pub fn rate_from_normalized(normalized: f32) -> f32 {
    let normalized = normalized.clamp(0.0, 1.0);
    if normalized == 0.0 {
        0.0
    } else {
        MIN_RING_MOD_RATE + normalized * (MAX_RING_MOD_RATE - MIN_RING_MOD_RATE)
    }
}

#[derive(Debug, Clone)]
pub struct RingModulator {
    sample_rate: f32,
    rate: f32,
    fine: f32,
    feedback: f32,
    phase: f32,
    phase_increment: f32,
    previous: f32,
}

impl RingModulator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate: sample_rate.max(1.0),
            rate: 0.0,
            fine: 0.0,
            feedback: 0.0,
            phase: 0.0,
            phase_increment: 0.0,
            previous: 0.0,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.update_increment();
    }

    /// Set the carrier rate from a normalized value; `0.0` bypasses.
    pub fn set_rate(&mut self, normalized: f32) {
        self.set_rate_hz(rate_from_normalized(normalized));
    }

    /// Set the carrier rate in Hz; `0.0` bypasses.
    pub fn set_rate_hz(&mut self, rate_hz: f32) {
        self.rate = if rate_hz <= 0.0 {
            0.0
        } else {
            rate_hz.clamp(MIN_RING_MOD_RATE, MAX_RING_MOD_RATE)
        };
        self.update_increment();
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Fine offset added to the carrier, in hundreds of Hz.
    pub fn set_fine(&mut self, fine: f32) {
        self.fine = fine.clamp(0.0, 1.0);
        self.update_increment();
    }

    pub fn fine(&self) -> f32 {
        self.fine
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = FEEDBACK_SCALE * feedback.clamp(0.0, 1.0);
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn is_active(&self) -> bool {
        self.rate > 0.0
    }

    /// Modulate the first `block_size` frames of channels 0 and 1 in place.
    pub fn apply<B: AsMut<[f32]>>(&mut self, buffers: &mut [B], block_size: usize) {
        if !self.is_active() || buffers.is_empty() {
            return;
        }

        let (left, rest) = buffers.split_at_mut(1);
        let left = left[0].as_mut();
        let mut right = rest.first_mut().map(|b| b.as_mut());

        let mut len = block_size.min(left.len());
        if let Some(right) = right.as_deref() {
            len = len.min(right.len());
        }

        let fb = self.feedback;
        let mut fp = self.previous;
        let mut phase = self.phase;

        for i in 0..len {
            let carrier = if phase.sin() >= 0.0 { 0.5 } else { -0.5 };
            phase = (phase + self.phase_increment).rem_euclid(TAU);

            fp = (fb * fp + left[i]) * carrier;
            left[i] = fp;

            if let Some(right) = right.as_deref_mut() {
                let fp2 = (fb * fp + right[i]) * carrier;
                right[i] = fp2;
            }
        }

        self.previous = fp;
        self.phase = phase;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.previous = 0.0;
    }

    fn update_increment(&mut self) {
        self.phase_increment = TAU * (100.0 * self.fine + self.rate) / self.sample_rate;
    }
}
