// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Live audio device I/O via `cpal`. One playback path (for
//! `kcs-encode-live`) and one capture path (for `kcs-decode-live` and
//! `kcs-decode-live-fft`), both built on the same ring-buffer-backed
//! stream pattern, generalized across host sample formats rather than
//! split by platform.

use std::sync::mpsc;
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::error;
use rb::{RbConsumer, RbProducer, SpscRb, RB};

use kcs_core::error::{KcsError, Result};

fn device_err(msg: impl Into<String>) -> KcsError {
    KcsError::AudioDeviceError(msg.into())
}

/// Resolves a device index from `kcs_cli::list_devices`'s enumeration
/// order (input devices first, then output) back to a `cpal::Device`,
/// or the host default when `index` is `None`.
fn select_output_device(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();
    match index {
        None => host.default_output_device().ok_or_else(|| device_err("no default audio output device")),
        Some(want) => {
            let input_count = host.input_devices().map_err(|e| device_err(e.to_string()))?.count();
            if want < input_count {
                return Err(device_err(format!("device id {} is an input device", want)));
            }
            host.output_devices()
                .map_err(|e| device_err(e.to_string()))?
                .nth(want - input_count)
                .ok_or_else(|| device_err(format!("no output device with id {}", want)))
        }
    }
}

fn select_input_device(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();
    match index {
        None => host.default_input_device().ok_or_else(|| device_err("no default audio input device")),
        Some(want) => host
            .input_devices()
            .map_err(|e| device_err(e.to_string()))?
            .nth(want)
            .ok_or_else(|| device_err(format!("no input device with id {}", want))),
    }
}

/// Samples buffered between the audio callback and the caller's
/// thread; arbitrary but generous relative to one modem bit (a few
/// hundred samples at worst), matching the teacher's "8K, arbitrarily
/// chosen" sizing rationale.
const RING_BUFFER_FRAMES: usize = 8 * 1024;

/// Plays a stream of 8-bit unsigned PCM samples (the synthesizer's
/// native output format) out the default audio output device at a
/// requested sample rate.
pub struct Playback {
    producer: rb::Producer<f32>,
    stream: cpal::Stream,
}

impl Playback {
    /// Opens the host default output device. Use [`Playback::open_on`]
    /// to target a specific device id.
    pub fn open(sample_rate: u32) -> Result<Playback> {
        Self::open_on(sample_rate, None)
    }

    pub fn open_on(sample_rate: u32, device_index: Option<usize>) -> Result<Playback> {
        let device = select_output_device(device_index)?;

        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let ring = SpscRb::<f32>::new(RING_BUFFER_FRAMES);
        let (producer, consumer) = (ring.producer(), ring.consumer());

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let written = consumer.read(data).unwrap_or(0);
                    for sample in &mut data[written..] {
                        *sample = 0.0;
                    }
                },
                move |err| error!("audio output stream error: {}", err),
                None,
            )
            .map_err(|e| device_err(e.to_string()))?;

        stream.play().map_err(|e| device_err(e.to_string()))?;

        Ok(Playback { producer, stream })
    }

    /// Pushes one chunk of 8-bit unsigned PCM (center 128), converting
    /// to the normalized `f32` the output stream expects. Blocks until
    /// the whole chunk has been accepted by the ring buffer.
    pub fn write(&mut self, pcm: &[u8]) -> Result<()> {
        let floats: Vec<f32> = pcm.iter().map(|&s| (s as f32 - 128.0) / 128.0).collect();
        let mut offset = 0;
        while offset < floats.len() {
            match self.producer.write_blocking(&floats[offset..]) {
                Some(written) => offset += written,
                None => return Err(device_err("output stream closed mid-write")),
            }
        }
        Ok(())
    }

    pub fn flush(&self) {
        let _ = self.stream.pause();
    }
}

/// Captures the default audio input device's leftmost channel as
/// normalized `f32` samples, delivered through a bounded channel so a
/// slow consumer applies back-pressure to its own thread rather than
/// the real-time audio callback (which must never block).
pub struct Capture {
    rx: mpsc::Receiver<Vec<f32>>,
    _stream: cpal::Stream,
    pub sample_rate: u32,
}

impl Capture {
    /// `mailbox_depth` bounds how many chunks can queue before the
    /// audio callback starts dropping the oldest (logged, not fatal —
    /// a dropped chunk shows up downstream as a lost frame, which the
    /// deframer already tolerates).
    pub fn open(mailbox_depth: usize) -> Result<Capture> {
        Self::open_on(mailbox_depth, None)
    }

    pub fn open_on(mailbox_depth: usize, device_index: Option<usize>) -> Result<Capture> {
        let device = select_input_device(device_index)?;

        let config = device.default_input_config().map_err(|e| device_err(e.to_string()))?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        let (tx, rx) = mpsc::sync_channel::<Vec<f32>>(mailbox_depth);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config.into(), channels, tx)?
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config.into(), channels, tx)?
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config.into(), channels, tx)?
            }
            other => return Err(device_err(format!("unsupported input sample format: {:?}", other))),
        };

        stream.play().map_err(|e| device_err(e.to_string()))?;

        Ok(Capture { rx, _stream: stream, sample_rate })
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        channels: usize,
        tx: mpsc::SyncSender<Vec<f32>>,
    ) -> Result<cpal::Stream>
    where
        T: cpal::Sample + cpal::SizedSample + Send + 'static,
        f32: cpal::FromSample<T>,
    {
        device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    let leftmost: Vec<f32> =
                        data.iter().step_by(channels.max(1)).map(|&s| f32::from_sample(s)).collect();
                    if tx.try_send(leftmost).is_err() {
                        error!("capture mailbox full, dropping a chunk");
                    }
                },
                move |err| error!("audio input stream error: {}", err),
                None,
            )
            .map_err(|e| device_err(e.to_string()))
    }

    /// Blocks for the next chunk of captured samples; returns `None`
    /// once the stream has been dropped.
    pub fn recv(&self) -> Option<Vec<f32>> {
        self.rx.recv().ok()
    }
}

/// Tees transmitted audio to a second output device on a dedicated
/// thread, so a human can listen to what's being sent without the
/// primary transmit loop blocking on a second device's buffer —
/// `kcs_encode_live.py`'s `monitor_output` thread plus its `Queue`,
/// ported to a bounded channel per the design's back-pressure-not-drop
/// policy for this particular mailbox.
pub struct Monitor {
    tx: mpsc::SyncSender<Vec<u8>>,
}

impl Monitor {
    pub fn open(sample_rate: u32, device_index: Option<usize>, mailbox_depth: usize) -> Result<Monitor> {
        let mut playback = Playback::open_on(sample_rate, device_index)?;
        let (tx, rx) = mpsc::sync_channel::<Vec<u8>>(mailbox_depth);

        thread::spawn(move || {
            while let Ok(pcm) = rx.recv() {
                if let Err(err) = playback.write(&pcm) {
                    error!("monitor output stopped: {}", err);
                    break;
                }
            }
        });

        Ok(Monitor { tx })
    }

    /// Queues one chunk of 8-bit unsigned PCM for the monitor thread,
    /// blocking if the mailbox is full rather than dropping it.
    pub fn send(&self, pcm: &[u8]) {
        if self.tx.send(pcm.to_vec()).is_err() {
            error!("monitor thread gone, dropping a chunk");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn ring_buffer_frame_budget_is_nonzero() {
        assert!(super::RING_BUFFER_FRAMES > 0);
    }
}
