//! Portamento: linear pitch glide between held keys.

/*
Glide Bookkeeping
=================

With glide enabled a new key does not start a new voice. It takes over an
existing one: the voice's current pitch is pushed onto its history stack and
its frequency slides linearly to the new pitch over a fixed number of samples.

    key 60 down   voice A owns 60          history []
    key 64 down   voice A owns 64 (glide)  history [60]
    key 67 down   voice A owns 67 (glide)  history [60, 64]
    key 67 up     voice A owns 64 (glide)  history [60]
    key 60 up     voice A owns 64          history []     (60 just forgotten)

The increment is computed once when the glide starts:

    increment = (target - current) / steps

and is added every sample until `remaining_steps` reaches zero, at which
point the frequency is snapped to the target so rounding never leaves it
slightly off pitch.
*/

/// Keys remembered per voice. Pushing onto a full history drops the oldest.
pub const HISTORY_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct Portamento {
    enabled: bool,
    remaining_steps: u32,
    increment: f32,
    target: f32,
    history: [u8; HISTORY_CAPACITY],
    history_len: usize,
}

impl Portamento {
    pub fn new() -> Self {
        Self {
            enabled: false,
            remaining_steps: 0,
            increment: 0.0,
            target: 0.0,
            history: [0; HISTORY_CAPACITY],
            history_len: 0,
        }
    }

    /// Start gliding from `from` to `to` over `steps` samples (at least one).
    pub fn start(&mut self, from: f32, to: f32, steps: u32) {
        let steps = steps.max(1);
        self.enabled = true;
        self.remaining_steps = steps;
        self.target = to;
        self.increment = (to - from) / steps as f32;
    }

    /// Advance `frequency` by one sample of glide.
    #[inline]
    pub fn step(&mut self, frequency: &mut f32) {
        if !self.enabled {
            return;
        }

        *frequency += self.increment;
        self.remaining_steps = self.remaining_steps.saturating_sub(1);

        if self.remaining_steps == 0 {
            *frequency = self.target;
            self.enabled = false;
        }
    }

    pub fn is_gliding(&self) -> bool {
        self.enabled
    }

    pub fn remaining_steps(&self) -> u32 {
        self.remaining_steps
    }

    /// Jump straight to the glide target. The history is kept.
    pub fn settle(&mut self, frequency: &mut f32) {
        if self.enabled {
            *frequency = self.target;
            self.enabled = false;
            self.remaining_steps = 0;
        }
    }

    pub fn push_history(&mut self, pitch: u8) {
        if self.history_len == HISTORY_CAPACITY {
            self.history.copy_within(1.., 0);
            self.history_len -= 1;
        }
        self.history[self.history_len] = pitch;
        self.history_len += 1;
    }

    pub fn pop_history(&mut self) -> Option<u8> {
        if self.history_len == 0 {
            return None;
        }
        self.history_len -= 1;
        Some(self.history[self.history_len])
    }

    /// Forget every occurrence of `pitch` in the history stack.
    pub fn forget(&mut self, pitch: u8) {
        let mut kept = 0;
        for i in 0..self.history_len {
            if self.history[i] != pitch {
                self.history[kept] = self.history[i];
                kept += 1;
            }
        }
        self.history_len = kept;
    }

    pub fn history(&self) -> &[u8] {
        &self.history[..self.history_len]
    }
}

impl Default for Portamento {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glide_reaches_target_in_exact_steps() {
        let mut glide = Portamento::new();
        let mut frequency = 100.0;
        glide.start(frequency, 200.0, 10);

        for step in 1..=10 {
            let before = frequency;
            glide.step(&mut frequency);
            assert!(frequency > before, "step {step} did not rise");
        }

        assert_eq!(frequency, 200.0);
        assert!(!glide.is_gliding());

        glide.step(&mut frequency);
        assert_eq!(frequency, 200.0);
    }

    #[test]
    fn zero_steps_is_a_single_jump() {
        let mut glide = Portamento::new();
        let mut frequency = 440.0;
        glide.start(frequency, 220.0, 0);
        glide.step(&mut frequency);
        assert_eq!(frequency, 220.0);
        assert!(!glide.is_gliding());
    }

    #[test]
    fn history_is_a_stack_with_forget() {
        let mut glide = Portamento::new();
        glide.push_history(60);
        glide.push_history(64);
        glide.push_history(60);

        glide.forget(60);
        assert_eq!(glide.history(), &[64]);
        assert_eq!(glide.pop_history(), Some(64));
        assert_eq!(glide.pop_history(), None);
    }

    #[test]
    fn full_history_drops_the_oldest_key() {
        let mut glide = Portamento::new();
        for pitch in 0..HISTORY_CAPACITY as u8 + 2 {
            glide.push_history(pitch);
        }

        assert_eq!(glide.history().len(), HISTORY_CAPACITY);
        assert_eq!(glide.history()[0], 2);
        assert_eq!(glide.pop_history(), Some(HISTORY_CAPACITY as u8 + 1));
    }

    #[test]
    fn settle_jumps_to_target_and_keeps_history() {
        let mut glide = Portamento::new();
        glide.push_history(60);
        let mut frequency = 100.0;
        glide.start(frequency, 300.0, 50);
        glide.step(&mut frequency);

        glide.settle(&mut frequency);
        assert_eq!(frequency, 300.0);
        assert!(!glide.is_gliding());
        assert_eq!(glide.history(), &[60]);

        // no-op once idle
        let mut other = 5.0;
        glide.settle(&mut other);
        assert_eq!(other, 5.0);
    }
}
