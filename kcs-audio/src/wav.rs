// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WAV container I/O. The synthesizer and sign-change demodulator work
//! in raw bytes (the wire format is 8-bit unsigned PCM), so this module
//! exposes both a raw-byte view for them and an `f32` view for the FFT
//! demodulator, which wants normalized samples regardless of bit depth.

use std::path::Path;

use kcs_core::error::{KcsError, Result};

fn wav_err(err: impl std::fmt::Display) -> KcsError {
    KcsError::WavFormatError(err.to_string())
}

/// A WAV file's format header plus its raw, still-interleaved sample
/// bytes, exactly as read off disk.
pub struct WavFile {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub raw: Vec<u8>,
}

/// Writes `samples` (8-bit unsigned PCM, mono) as a WAV file — the
/// synthesizer's native output format.
pub fn write_u8_mono(path: impl AsRef<Path>, sample_rate: u32, samples: &[u8]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 8,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path.as_ref(), spec).map_err(wav_err)?;
    for &s in samples {
        // hound's 8-bit int sample type is `i8`; it re-biases to the
        // file format's unsigned byte internally, so a straight
        // bit-pattern cast round-trips exactly with `read_raw` below.
        writer.write_sample(s as i8).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)?;
    Ok(())
}

/// Reads a WAV file's header and raw interleaved sample bytes, for
/// feeding the sign-change demodulator's `extract_msb_samples`.
pub fn read_raw(path: impl AsRef<Path>) -> Result<WavFile> {
    let reader = hound::WavReader::open(path.as_ref()).map_err(wav_err)?;
    let spec = reader.spec();

    let raw = match spec.bits_per_sample {
        8 => reader
            .into_samples::<i8>()
            .map(|s| s.map(|v| v as u8))
            .collect::<std::result::Result<Vec<u8>, _>>()
            .map_err(wav_err)?,
        16 => {
            let samples: Vec<i16> = reader
                .into_samples::<i16>()
                .collect::<std::result::Result<Vec<i16>, _>>()
                .map_err(wav_err)?;
            samples.iter().flat_map(|s| s.to_le_bytes()).collect()
        }
        other => return Err(wav_err(format!("unsupported bit depth: {}", other))),
    };

    Ok(WavFile {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        raw,
    })
}

/// Reads a WAV file's leftmost channel as normalized `f32` samples in
/// `[-1.0, 1.0]`, for feeding the FFT demodulator.
pub fn read_f32_leftmost(path: impl AsRef<Path>) -> Result<(u32, Vec<f32>)> {
    let reader = hound::WavReader::open(path.as_ref()).map_err(wav_err)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(wav_err)?
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .step_by(channels)
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(wav_err)?,
    };

    Ok((spec.sample_rate, samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_rereads_8bit_mono() {
        let dir = std::env::temp_dir();
        let path = dir.join("kcs_audio_wav_roundtrip_test.wav");
        let samples: Vec<u8> = (0..50).map(|i| (128 + (i % 60) as i32 - 30) as u8).collect();

        write_u8_mono(&path, 9600, &samples).unwrap();
        let file = read_raw(&path).unwrap();

        assert_eq!(file.sample_rate, 9600);
        assert_eq!(file.channels, 1);
        assert_eq!(file.bits_per_sample, 8);
        assert_eq!(file.raw, samples);

        std::fs::remove_file(&path).ok();
    }
}
