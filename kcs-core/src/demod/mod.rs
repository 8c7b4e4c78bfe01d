// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The two demodulators: a cheap, PLL-free sign-change counter (§4.C),
//! and a higher-fidelity sliding-window FFT demodulator (§4.D). Both
//! turn raw audio samples into a per-sample event stream; the matching
//! deframer in [`crate::deframe`] turns that event stream into bytes.

pub mod fft;
pub mod sign;
