// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The waveform synthesizer: turns a byte stream into 8-bit unsigned PCM
//! samples. `make_cycle` is the atomic tile; `encode_byte` and
//! `synthesize` are pure concatenation of tiles, so phase is continuous
//! at every pulse boundary by construction.

use crate::mode::ModeParams;

/// Least-significant-bit-first mask table, per the design's endianness
/// note: encoder and decoder must agree on wire bit order.
pub const BITMASKS: [u8; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];

/// Builds one full sine cycle of `freq` Hz at `sample_rate`, quantized to
/// 8-bit unsigned PCM centered at `center` with the given `amplitude`.
pub fn make_cycle(freq: f64, sample_rate: u32, center: u8, amplitude: u8) -> Vec<u8> {
    let n = (sample_rate as f64 / freq).round() as usize;
    (0..n)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            let y = center as f64 + amplitude as f64 * phase.sin();
            y.round() as u8
        })
        .collect()
}

/// One pulse: `cycles` repetitions of one full sine cycle, i.e. the
/// on-air waveform for a single mark or space bit.
fn pulse(cycle: &[u8], cycles: u32) -> Vec<u8> {
    cycle.repeat(cycles as usize)
}

/// Pre-rendered mark/space pulse tiles for one `ModeParams`, so a whole
/// byte stream can be synthesized by array concatenation alone.
pub struct Pulses {
    one_cycle: Vec<u8>,
    zero_cycle: Vec<u8>,
    one_pulse: Vec<u8>,
    zero_pulse: Vec<u8>,
}

impl Pulses {
    pub fn new(mode: &ModeParams) -> Pulses {
        let one_cycle = make_cycle(mode.f_one, mode.sample_rate, mode.center, mode.amplitude);
        let zero_cycle = make_cycle(mode.f_zero, mode.sample_rate, mode.center, mode.amplitude);
        let one_pulse = pulse(&one_cycle, mode.cycles_one);
        let zero_pulse = pulse(&zero_cycle, mode.cycles_zero);
        Pulses { one_cycle, zero_cycle, one_pulse, zero_pulse }
    }

    pub fn one_pulse(&self) -> &[u8] {
        &self.one_pulse
    }

    pub fn zero_pulse(&self) -> &[u8] {
        &self.zero_pulse
    }

    /// Length in samples of a mark-carrier pulse; used to size the
    /// leader/trailer.
    pub fn one_pulse_len(&self) -> usize {
        self.one_pulse.len()
    }

    #[cfg(test)]
    fn cycles(&self) -> (&[u8], &[u8]) {
        (&self.one_cycle, &self.zero_cycle)
    }

    /// Builds one complete on-air byte frame: a start bit (always a
    /// space pulse), 8 wire positions carrying the data bits
    /// LSB-first — with the 8th position forced to a mark pulse under
    /// CUTS framing regardless of the input bit — then two trailing
    /// mark (stop) pulses.
    pub fn encode_byte(&self, mode: &ModeParams, byte: u8) -> Vec<u8> {
        use crate::mode::Framing;

        let mut out = Vec::with_capacity(
            self.zero_pulse.len() + 8 * self.one_pulse.len().max(self.zero_pulse.len())
                + 2 * self.one_pulse.len(),
        );

        // Start bit: always a space.
        out.extend_from_slice(&self.zero_pulse);

        // 8 wire positions, LSB-first.
        for (i, &mask) in BITMASKS.iter().enumerate() {
            let forced_one = mode.framing == Framing::Cuts && i == 7;
            if forced_one || (byte & mask) != 0 {
                out.extend_from_slice(&self.one_pulse);
            } else {
                out.extend_from_slice(&self.zero_pulse);
            }
        }

        // Two stop bits: always mark.
        out.extend_from_slice(&self.one_pulse);
        out.extend_from_slice(&self.one_pulse);

        out
    }
}

/// Synthesizes a complete on-air stream: a leader of `leader_secs`
/// seconds of mark carrier, the encoded byte frames, then a trailer of
/// `trailer_secs` seconds of mark carrier. The leader/trailer give a
/// receiver time to acquire the mark carrier before data begins.
pub fn synthesize(
    mode: &ModeParams,
    bytes: &[u8],
    leader_secs: f64,
    trailer_secs: f64,
) -> Vec<u8> {
    let pulses = Pulses::new(mode);

    let leader_reps = leader_repetitions(&pulses, mode.sample_rate, leader_secs);
    let trailer_reps = leader_repetitions(&pulses, mode.sample_rate, trailer_secs);

    let mut out = Vec::new();
    for _ in 0..leader_reps {
        out.extend_from_slice(pulses.one_pulse());
    }
    for &b in bytes {
        out.extend_from_slice(&pulses.encode_byte(mode, b));
    }
    for _ in 0..trailer_reps {
        out.extend_from_slice(pulses.one_pulse());
    }
    out
}

fn leader_repetitions(pulses: &Pulses, sample_rate: u32, secs: f64) -> usize {
    let pulse_len = pulses.one_pulse_len().max(1);
    ((sample_rate as f64 * secs) / pulse_len as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{Framing, Speed};

    #[test]
    fn cycle_length_matches_sample_rate_over_frequency() {
        let cycle = make_cycle(2400.0, 9600, 128, 120);
        assert_eq!(cycle.len(), 4);
    }

    #[test]
    fn encode_byte_start_bit_is_always_space() {
        let mode = ModeParams::new(Speed::Baud300, Framing::Kcs, 9600, 0).unwrap();
        let pulses = Pulses::new(&mode);
        let frame = pulses.encode_byte(&mode, 0xFF);
        assert_eq!(&frame[..pulses.zero_pulse().len()], pulses.zero_pulse());
    }

    #[test]
    fn cuts_ignores_bit_seven_value() {
        let mode = ModeParams::new(Speed::Baud300, Framing::Cuts, 9600, 0).unwrap();
        let pulses = Pulses::new(&mode);
        let with_bit7 = pulses.encode_byte(&mode, 0xC8);
        let without_bit7 = pulses.encode_byte(&mode, 0x48);
        assert_eq!(with_bit7, without_bit7);
    }

    #[test]
    fn every_byte_ends_with_two_stop_pulses() {
        let mode = ModeParams::new(Speed::Baud1200, Framing::Kcs, 44100, 0).unwrap();
        let pulses = Pulses::new(&mode);
        let frame = pulses.encode_byte(&mode, 0x00);
        let tail = pulses.one_pulse().repeat(2);
        assert_eq!(&frame[frame.len() - tail.len()..], &tail[..]);
    }

    #[test]
    fn byte_frame_length_matches_closed_form() {
        let mode = ModeParams::new(Speed::Baud300, Framing::Kcs, 9600, 0).unwrap();
        let pulses = Pulses::new(&mode);
        let (one_cycle, zero_cycle) = pulses.cycles();
        let byte = 0b0100_1000u8; // 'H', 2 ones among data bits
        let ones_among_data = (byte.count_ones()) as usize;
        let zeros_among_data = 8 - ones_among_data;
        let expected = mode.cycles_one as usize * one_cycle.len() * (2 /* stop */ + ones_among_data)
            + mode.cycles_zero as usize * zero_cycle.len() * (1 /* start */ + zeros_among_data);
        assert_eq!(pulses.encode_byte(&mode, byte).len(), expected);
    }
}
