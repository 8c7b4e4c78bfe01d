// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A thin wrapper over `rustfft` that answers exactly the question the
//! FFT demodulator needs: "which low-spectrum bin has the most energy in
//! this window of real samples?" `window_len` here is session-derived
//! and not generally a power of two, which is exactly the case
//! `rustfft`'s mixed-radix/Bluestein planner exists to handle well.

use std::sync::Arc;

use rustfft::{num_complex::Complex32, Fft, FftPlanner};

/// Computes the dominant-frequency bin over the low half of the
/// spectrum for a single window of real-valued samples.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window_len: usize,
    scratch: Vec<Complex32>,
}

impl SpectrumAnalyzer {
    pub fn new(window_len: usize) -> SpectrumAnalyzer {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(window_len);
        SpectrumAnalyzer { fft, window_len, scratch: vec![Complex32::new(0.0, 0.0); window_len] }
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Returns the index (within `0..window_len/2`) of the
    /// highest-magnitude bin in `window`'s spectrum. `window.len()` must
    /// equal `window_len`.
    pub fn dominant_bin(&mut self, window: &[f32]) -> usize {
        debug_assert_eq!(window.len(), self.window_len);

        for (slot, &sample) in self.scratch.iter_mut().zip(window) {
            *slot = Complex32::new(sample, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let half = self.window_len / 2;
        self.scratch[..half]
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.norm_sqr().total_cmp(&b.norm_sqr()))
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_tone_peaks_at_its_own_bin() {
        let sample_rate = 9600.0_f32;
        let window_len = 80;
        let freq = 1200.0_f32;
        let window: Vec<f32> = (0..window_len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect();

        let mut analyzer = SpectrumAnalyzer::new(window_len);
        let bin = analyzer.dominant_bin(&window);
        let expected_bin = (window_len as f32 * freq / sample_rate).round() as usize;
        assert!((bin as i64 - expected_bin as i64).abs() <= 1);
    }
}
