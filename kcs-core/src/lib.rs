// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `kcs-core` implements the Kansas City Standard (KCS) and CUTS framing
//! codec: mode parameters, the waveform synthesizer, both demodulators
//! (sign-change and FFT), and their matching deframers.
//!
//! This crate owns only the bit-exact codec. WAV/live-audio I/O lives in
//! `kcs-audio`; the Reed-Solomon outer code lives in `kcs-rs`.

pub mod deframe;
pub mod demod;
pub mod dsp;
pub mod error;
pub mod mode;
pub mod synth;

pub use error::{KcsError, Result};
pub use mode::{Framing, ModeParams, Speed};
