// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sign-change demodulator: a two-state hysteresis filter over the
//! most-significant byte of the leftmost audio channel. KCS mark has
//! twice the zero-crossing rate of space, so counting sign flips in a
//! per-bit window is a cheap, PLL-free way to tell them apart.

/// Default high threshold from the original live decoder
/// (`MSB_HI_THRES = 0x10`); the low threshold is always symmetric
/// (`0xFF - high`).
pub const DEFAULT_HI_THRESHOLD: u8 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Low,
    High,
}

/// Tracks hysteresis state across samples and emits one bit event (`0`
/// or `1`) per input sample: `1` exactly on the sample where the state
/// flips.
pub struct SignChangeDemodulator {
    level: Level,
    hi_threshold: u8,
    lo_threshold: u8,
}

impl SignChangeDemodulator {
    pub fn new(hi_threshold: u8) -> SignChangeDemodulator {
        SignChangeDemodulator {
            level: Level::Low,
            hi_threshold,
            lo_threshold: 0xFF - hi_threshold,
        }
    }

    /// Feeds one most-significant-byte sample, returns `1` if this
    /// sample flipped the hysteresis state, else `0`.
    pub fn push(&mut self, msb: u8) -> u8 {
        let next = match self.level {
            Level::Low => {
                if msb < 0x80 && msb > self.hi_threshold {
                    Level::High
                } else {
                    Level::Low
                }
            }
            Level::High => {
                if msb > 0x80 && msb < self.lo_threshold {
                    Level::Low
                } else {
                    Level::High
                }
            }
        };
        let flipped = next != self.level;
        self.level = next;
        flipped as u8
    }
}

impl Default for SignChangeDemodulator {
    fn default() -> Self {
        SignChangeDemodulator::new(DEFAULT_HI_THRESHOLD)
    }
}

/// Extracts the most-significant byte of the leftmost channel from a
/// raw PCM frame buffer, uniformly for 8-bit or 16-bit little-endian
/// samples: the MSB is always the last byte of a sample's encoding.
pub fn extract_msb_samples(
    frames: &[u8],
    sample_width: usize,
    channels: usize,
) -> impl Iterator<Item = u8> + '_ {
    let stride = sample_width * channels;
    frames[sample_width - 1..].iter().step_by(stride.max(1)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_one_flip_per_hysteresis_crossing() {
        let mut demod = SignChangeDemodulator::default();
        // Low -> dead zone -> High -> dead zone (noise suppressed) -> Low -> High -> dead zone.
        let samples = [0x00, 0x20, 0x50, 0x90, 0x50, 0x20];
        let events: Vec<u8> = samples.iter().map(|&s| demod.push(s)).collect();
        assert_eq!(events, vec![0, 1, 0, 1, 1, 0]);
    }

    #[test]
    fn extracts_msb_of_8bit_mono() {
        let frames = [0x11, 0x22, 0x33];
        let msbs: Vec<u8> = extract_msb_samples(&frames, 1, 1).collect();
        assert_eq!(msbs, vec![0x11, 0x22, 0x33]);
    }

    #[test]
    fn extracts_msb_of_16bit_stereo_leftmost_channel() {
        // Two 16-bit stereo frames: (L0 lo, L0 hi, R0 lo, R0 hi), (L1 lo, L1 hi, R1 lo, R1 hi)
        let frames = [0x00, 0xAA, 0xFF, 0xFF, 0x00, 0xBB, 0xFF, 0xFF];
        let msbs: Vec<u8> = extract_msb_samples(&frames, 2, 2).collect();
        assert_eq!(msbs, vec![0xAA, 0xBB]);
    }
}
