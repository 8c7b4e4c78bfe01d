// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte assembler for the sign-change demodulator's bit-event stream.
//! Finds start bits by watching a sliding popcount dip below threshold
//! right after peaking, skips a re-alignment gap, samples 8 data bits
//! by summing the full per-bit window, then validates the stop bits
//! before accepting the byte.
//!
//! Data bits are counted over the *entire* `frames_per_bit` span, not a
//! truncated leading fraction of it: `original_source/kcs_decode_live.py`'s
//! `generate_bytes` sums the whole `islice(bitstream, frames_per_bit)`
//! per bit, and its `thres_0_hi`/`thres_1_lo` constants (used here as
//! `start_max`/`one_min`) are calibrated against that full-window sum.
//! Truncating the count to a leading fraction while keeping those same
//! thresholds starves the count at 1200/2400 baud, where a bit only
//! spans a couple of carrier cycles, and breaks round-trip decoding.

use log::debug;

use super::SlidingPopcount;
use crate::mode::{Framing, ModeParams, Speed};
use crate::synth::BITMASKS;

/// Divisor of `frames_per_bit` events to discard right after a start
/// bit is found, to re-center sampling away from the edge transition
/// (the original's `SMPL_ALN_FRAC`, used as an integer floor division
/// rather than a float fraction).
pub const ALIGN_DIVISOR: usize = 3;

fn thresholds(speed: Speed) -> (i32, i32) {
    match speed {
        Speed::Baud300 => (9, 12),
        Speed::Baud1200 | Speed::Baud2400 => (2, 4),
    }
}

/// Assembles bytes from a sign-change event stream (`0`/`1` per sample,
/// `1` on a hysteresis flip). One instance tracks state across an
/// entire session: the window must stay primed between bytes so a
/// start bit spanning the gap after a dropped frame is still found.
pub struct SignDeframer {
    framing: Framing,
    frames_per_bit: usize,
    start_max: i32,
    one_min: i32,
    align_skip: usize,
    /// Window capacity is `frames_per_bit`, matching the original's
    /// `deque(maxlen=frames_per_bit)`, but priming only loads
    /// `frames_per_bit - 1` events and the scan loop's [`SlidingPopcount::slide`]
    /// deliberately doesn't grow it to capacity — see `prime` below.
    window: SlidingPopcount,
    prev_sum: i32,
    primed: bool,
}

impl SignDeframer {
    pub fn new(mode: &ModeParams) -> SignDeframer {
        let frames_per_bit = mode.frames_per_bit();
        let (start_max, one_min) = thresholds(mode.speed);
        let align_skip = frames_per_bit / ALIGN_DIVISOR;
        SignDeframer {
            framing: mode.framing,
            frames_per_bit,
            start_max,
            one_min,
            align_skip,
            window: SlidingPopcount::new(frames_per_bit),
            prev_sum: 0,
            primed: false,
        }
    }

    /// Fills the window with its first `frames_per_bit - 1` events so
    /// the running sum is meaningful before the first scan step. The
    /// window is deliberately left one short of capacity: the scan
    /// loop's `slide` keeps that length fixed until a byte is found and
    /// the post-byte refill (which uses `push`, growing to capacity)
    /// tops it up to the full `frames_per_bit`.
    fn prime(&mut self, events: &mut impl Iterator<Item = u8>) -> bool {
        while self.window.len() + 1 < self.frames_per_bit {
            match events.next() {
                Some(bit) => self.window.push(bit),
                None => return false,
            }
        }
        self.prev_sum = self.window.sum();
        true
    }

    /// Pulls from `events` until one complete, stop-bit-validated byte
    /// has been decoded, or the stream is exhausted. Framing failures
    /// (a byte whose stop bits don't validate) are logged and dropped
    /// silently; scanning resumes from the refreshed window rather than
    /// returning an error, matching the design's "keep listening"
    /// policy for live/noisy streams.
    pub fn next_byte(&mut self, events: &mut impl Iterator<Item = u8>) -> Option<u8> {
        if !self.primed {
            if !self.prime(events) {
                return None;
            }
            self.primed = true;
        }

        loop {
            let bit = events.next()?;
            self.window.push(bit);
            let running_sum = self.window.sum();

            let start_detected = running_sum < self.prev_sum && running_sum <= self.start_max;
            self.prev_sum = running_sum;

            if !start_detected {
                continue;
            }

            for _ in 0..self.align_skip {
                events.next()?;
            }

            let mut byte = 0u8;
            for (i, &mask) in BITMASKS.iter().enumerate() {
                if i >= self.framing.data_bits() {
                    // CUTS's 8th wire position never carries payload
                    // (it's an extra stop bit, per the data model); the
                    // decoded byte leaves bit 7 clear. Still consume
                    // the wire position's samples to stay in sync.
                    for _ in 0..self.frames_per_bit {
                        events.next()?;
                    }
                    continue;
                }

                let mut count = 0i32;
                for _ in 0..self.frames_per_bit {
                    count += events.next()? as i32;
                }
                if count >= self.one_min {
                    byte |= mask;
                }
            }

            // Stop validation: refill the window with the next
            // `frames_per_bit + 1` events and require the resulting sum
            // to clear `one_min` (two/three mark-pulse stop positions
            // flip at mark's full rate, so a healthy stop region is
            // popcount-heavy).
            for _ in 0..=self.frames_per_bit {
                let v = events.next()?;
                self.window.push(v);
            }
            self.prev_sum = self.window.sum();

            if self.window.sum() >= self.one_min {
                return Some(byte);
            }

            debug!(
                "dropped frame: stop-bit validation failed (sum={}, need >= {})",
                self.window.sum(),
                self.one_min
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demod::sign::SignChangeDemodulator;
    use crate::mode::{Framing, ModeParams, Speed};
    use crate::synth::Pulses;

    /// Runs a byte through the real synthesizer, the real sign-change
    /// demodulator, and this deframer, end to end.
    fn roundtrip(mode: &ModeParams, byte: u8) -> Option<u8> {
        let pulses = Pulses::new(mode);
        let mut frame = pulses.one_pulse().repeat(4); // leader
        frame.extend_from_slice(&pulses.encode_byte(mode, byte));
        frame.extend_from_slice(&pulses.one_pulse().repeat(4)); // trailer

        let mut demod = SignChangeDemodulator::default();
        let events: Vec<u8> = frame
            .iter()
            .map(|&s| demod.push(if s >= 128 { 0xFF } else { 0x00 }))
            .collect();

        let mut deframer = SignDeframer::new(mode);
        let mut iter = events.into_iter();
        deframer.next_byte(&mut iter)
    }

    #[test]
    fn roundtrips_a_kcs_byte_at_1200_baud() {
        let mode = ModeParams::new(Speed::Baud1200, Framing::Kcs, 44100, 0).unwrap();
        assert_eq!(roundtrip(&mode, 0x5A), Some(0x5A));
    }

    #[test]
    fn cuts_framing_clears_bit_seven_on_decode() {
        let mode = ModeParams::new(Speed::Baud1200, Framing::Cuts, 44100, 0).unwrap();
        assert_eq!(roundtrip(&mode, 0xC8), Some(0x48));
    }

    #[test]
    fn align_skip_uses_integer_division() {
        let mode = ModeParams::new(Speed::Baud1200, Framing::Kcs, 44100, 0).unwrap();
        let deframer = SignDeframer::new(&mode);
        assert_eq!(deframer.align_skip, mode.frames_per_bit() / ALIGN_DIVISOR);
    }
}
