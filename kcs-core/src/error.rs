// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `error` module defines the error type shared by every stage of the
//! modem pipeline, following the error kinds laid out in the design:
//! `InvalidMode`, `AudioDeviceError`, `WavFormatError`, `FramingError`,
//! `UncorrectableBlock`, `Io`, and `UserInterrupt`.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::result;

/// Enumerates every error a modem pipeline stage can report.
///
/// `FramingError` and `UncorrectableBlock` are recovered locally by their
/// respective stages and are not expected to propagate to the CLI layer;
/// they exist on this type so diagnostic callbacks can report them
/// without a second error type.
#[derive(Debug)]
pub enum KcsError {
    /// The requested mode (baud/framing/sample rate combination) cannot
    /// be realized, e.g. it violates the Nyquist criterion.
    InvalidMode(String),
    /// The audio input or output device could not be opened or failed
    /// during a read/write.
    AudioDeviceError(String),
    /// The WAV container was malformed or used an unsupported encoding.
    WavFormatError(String),
    /// A byte frame failed start-bit, data-bit, or stop-bit validation
    /// and was dropped.
    FramingError(String),
    /// A Reed-Solomon codeword had more byte errors than its parity
    /// budget could correct.
    UncorrectableBlock { offset: u64, reason: String },
    /// An I/O error occurred reading or writing a byte stream.
    Io(io::Error),
    /// The user interrupted the process (Ctrl-C); shutdown proceeds per
    /// the cancellation policy in the design notes.
    UserInterrupt,
}

impl fmt::Display for KcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KcsError::InvalidMode(msg) => write!(f, "invalid mode: {}", msg),
            KcsError::AudioDeviceError(msg) => write!(f, "audio device error: {}", msg),
            KcsError::WavFormatError(msg) => write!(f, "malformed WAV: {}", msg),
            KcsError::FramingError(msg) => write!(f, "framing error: {}", msg),
            KcsError::UncorrectableBlock { offset, reason } => {
                write!(f, "uncorrectable RS block at offset {}: {}", offset, reason)
            }
            KcsError::Io(err) => write!(f, "I/O error: {}", err),
            KcsError::UserInterrupt => write!(f, "interrupted"),
        }
    }
}

impl StdError for KcsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            KcsError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for KcsError {
    fn from(err: io::Error) -> KcsError {
        KcsError::Io(err)
    }
}

pub type Result<T> = result::Result<T, KcsError>;

/// Convenience constructor for an `InvalidMode` error.
pub fn invalid_mode_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(KcsError::InvalidMode(msg.into()))
}

/// Convenience constructor for an `AudioDeviceError`.
pub fn audio_device_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(KcsError::AudioDeviceError(msg.into()))
}

/// Convenience constructor for a `WavFormatError`.
pub fn wav_format_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(KcsError::WavFormatError(msg.into()))
}

/// Convenience constructor for a `FramingError`.
pub fn framing_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(KcsError::FramingError(msg.into()))
}

/// Convenience constructor for an `UncorrectableBlock` error.
pub fn uncorrectable_block_error<T>(offset: u64, reason: impl Into<String>) -> Result<T> {
    Err(KcsError::UncorrectableBlock { offset, reason: reason.into() })
}
