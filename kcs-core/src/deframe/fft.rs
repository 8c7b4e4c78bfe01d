// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte assembler for the FFT symbol demodulator's per-sample dominant-
//! bin stream. Gates on carrier presence, matches a start/stop kernel
//! by convolution rather than a single-sample test, and samples each
//! data bit by majority vote over its symbol span.

use log::debug;

use crate::demod::fft::Symbol;
use crate::mode::{Framing, ModeParams, Speed};
use crate::synth::BITMASKS;

/// Fraction of symbols in a window that must show *some* carrier
/// (mark or space, i.e. nonzero) before the deframer will even attempt
/// a start-kernel match — cuts down on spurious matches during silence.
pub const CARRIER_GATE: f64 = 0.8;

/// A convolution score strictly greater than this, against the
/// normalized start/stop kernel, counts as a match.
pub const MATCH_THRESHOLD: f64 = 1.0;

/// Tunable knobs for [`FftDeframer`], split out from [`ModeParams`]
/// because they are properties of the matching strategy, not the wire
/// format.
#[derive(Debug, Clone, Copy)]
pub struct FftDeframerConfig {
    pub carrier_gate: f64,
    pub match_threshold: f64,
}

impl Default for FftDeframerConfig {
    fn default() -> FftDeframerConfig {
        FftDeframerConfig { carrier_gate: CARRIER_GATE, match_threshold: MATCH_THRESHOLD }
    }
}

/// Assembles bytes from a stream of per-sample dominant-bin symbols
/// (`0` noise, `1` space, `2` mark) produced by
/// [`crate::demod::fft::FftSymbolDemodulator`].
pub struct FftDeframer {
    framing: Framing,
    config: FftDeframerConfig,
    symbol_len: usize,
    /// Expected symbol pattern for one start bit followed by the frame
    /// tail's worth of stop-like (mark) symbols, used as the
    /// convolution kernel for start/stop detection.
    kernel: Vec<f64>,
    buf: Vec<Symbol>,
}

impl FftDeframer {
    pub fn new(mode: &ModeParams, config: FftDeframerConfig) -> FftDeframer {
        use crate::demod::fft::FftSymbolDemodulator;

        let symbol_len = FftSymbolDemodulator::symbol_len(mode);
        let kernel = Self::build_kernel(symbol_len);
        FftDeframer { framing: mode.framing, config, symbol_len, kernel, buf: Vec::new() }
    }

    /// A start bit is a space symbol for a full `symbol_len` span; we
    /// match it as a unit pulse of `-1` (space) against the window,
    /// normalized so a perfect match scores exactly `1.0`.
    fn build_kernel(symbol_len: usize) -> Vec<f64> {
        vec![-1.0; symbol_len.max(1)]
    }

    /// Feeds newly classified symbols into the internal buffer.
    pub fn push_symbols(&mut self, symbols: &[Symbol]) {
        self.buf.extend_from_slice(symbols);
    }

    /// Maps a raw dominant-bin symbol to the bipolar value the
    /// convolution kernel expects: mark -> `+1`, space -> `-1`, no
    /// carrier -> `0`.
    fn bipolar(symbol: Symbol) -> f64 {
        match symbol {
            2 => 1.0,
            1 => -1.0,
            _ => 0.0,
        }
    }

    /// Fraction of nonzero (carrier-present) symbols in a span.
    fn carrier_fraction(span: &[Symbol]) -> f64 {
        if span.is_empty() {
            return 0.0;
        }
        span.iter().filter(|&&s| s != 0).count() as f64 / span.len() as f64
    }

    /// Normalized convolution score of `span` against the start kernel:
    /// `dot(span, kernel) / symbol_len`, so a perfect all-space span
    /// scores `1.0`.
    fn kernel_score(&self, span: &[Symbol]) -> f64 {
        let dot: f64 =
            span.iter().zip(&self.kernel).map(|(&s, &k)| Self::bipolar(s) * k).sum();
        dot / self.symbol_len as f64
    }

    /// Majority-vote a data bit's worth of symbols: mark (`2`) counts
    /// as `1`, anything else as `0`.
    fn vote(span: &[Symbol]) -> bool {
        let ones = span.iter().filter(|&&s| s == 2).count();
        ones * 2 > span.len()
    }

    /// Attempts to decode one complete byte from the buffered symbol
    /// stream, pulling more via `pull` when the buffer runs dry.
    /// Returns `None` once `pull` can no longer produce symbols and the
    /// buffer is too short for another attempt.
    pub fn next_byte(&mut self, mut pull: impl FnMut(&mut Self) -> bool) -> Option<u8> {
        let stop_positions = self.framing.stop_bits();
        let frame_positions = self.framing.frame_tail_bits() - stop_positions;
        let frame_len = self.symbol_len * (1 + frame_positions + stop_positions);

        loop {
            while self.buf.len() < self.symbol_len {
                if !pull(self) {
                    return None;
                }
            }

            let gate_span = &self.buf[..self.symbol_len];
            if Self::carrier_fraction(gate_span) < self.config.carrier_gate {
                self.buf.remove(0);
                continue;
            }

            let score = self.kernel_score(gate_span);
            if score <= self.config.match_threshold {
                self.buf.remove(0);
                continue;
            }

            while self.buf.len() < frame_len {
                if !pull(self) {
                    return None;
                }
            }

            let mut byte = 0u8;
            for (i, &mask) in BITMASKS.iter().enumerate() {
                // CUTS's 8th wire position never carries payload (it's
                // an extra stop bit, per the data model); the decoded
                // byte leaves bit 7 clear regardless of what's on the
                // wire there.
                if i >= self.framing.data_bits() {
                    continue;
                }
                let start = self.symbol_len * (1 + i);
                let span = &self.buf[start..start + self.symbol_len];
                if Self::vote(span) {
                    byte |= mask;
                }
            }

            let stop_start = self.symbol_len * (1 + frame_positions);
            let stop_span = &self.buf[stop_start..stop_start + self.symbol_len * stop_positions];
            let stop_ok = stop_span.iter().filter(|&&s| s == 2).count() * 2 > stop_span.len();

            self.buf.drain(..frame_len);

            if stop_ok {
                return Some(byte);
            }
            debug!("dropped frame: fft stop-symbol majority failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{Framing, ModeParams, Speed};

    fn frame_symbols(mode: &ModeParams, byte: u8, symbol_len: usize) -> Vec<Symbol> {
        let mut out = Vec::new();
        out.extend(std::iter::repeat(1u8).take(symbol_len)); // start (space)
        for (i, &mask) in BITMASKS.iter().enumerate() {
            let bit = if mode.framing == Framing::Cuts && i == 7 {
                true
            } else {
                (byte & mask) != 0
            };
            let sym = if bit { 2 } else { 1 };
            out.extend(std::iter::repeat(sym).take(symbol_len));
        }
        out.extend(std::iter::repeat(2u8).take(symbol_len * 2)); // stop
        out
    }

    #[test]
    fn decodes_a_clean_symbol_frame() {
        let mode = ModeParams::new(Speed::Baud1200, Framing::Kcs, 44100, 0).unwrap();
        let mut deframer = FftDeframer::new(&mode, FftDeframerConfig::default());
        let symbols = frame_symbols(&mode, 0x3C, deframer.symbol_len);

        let byte = deframer.next_byte(|d| {
            if symbols.len() > d.buf.len() {
                d.push_symbols(&symbols[d.buf.len()..]);
                true
            } else {
                false
            }
        });
        assert_eq!(byte, Some(0x3C));
    }

    #[test]
    fn cuts_framing_clears_bit_seven_on_decode() {
        let mode = ModeParams::new(Speed::Baud1200, Framing::Cuts, 44100, 0).unwrap();
        let mut deframer = FftDeframer::new(&mode, FftDeframerConfig::default());
        let symbols = frame_symbols(&mode, 0xC8, deframer.symbol_len);

        let byte = deframer.next_byte(|d| {
            if symbols.len() > d.buf.len() {
                d.push_symbols(&symbols[d.buf.len()..]);
                true
            } else {
                false
            }
        });
        assert_eq!(byte, Some(0x48));
    }

    #[test]
    fn carrier_gate_rejects_silence() {
        let mode = ModeParams::new(Speed::Baud1200, Framing::Kcs, 44100, 0).unwrap();
        let mut deframer = FftDeframer::new(&mode, FftDeframerConfig::default());
        let silence = vec![0u8; deframer.symbol_len * 3];

        let byte = deframer.next_byte(|d| {
            if silence.len() > d.buf.len() {
                d.push_symbols(&silence[d.buf.len()..]);
                true
            } else {
                false
            }
        });
        assert_eq!(byte, None);
    }
}
