// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audio I/O boundary for the modem: WAV files ([`wav`]) and live
//! devices ([`device`]). Neither module knows anything about framing or
//! demodulation — they hand `kcs-core` raw samples and take raw samples
//! back.

pub mod device;
pub mod wav;
