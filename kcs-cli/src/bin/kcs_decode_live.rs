// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Decodes Kansas City Standard data from a live audio input device via
//! the sign-change demodulator, optionally echoing the raw captured
//! audio to a monitor device. Ported from `kcs_decode_live.py`.

use std::collections::VecDeque;
use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::Parser;
use log::info;

use kcs_audio::device::{Capture, Monitor};
use kcs_core::demod::sign::SignChangeDemodulator;
use kcs_core::deframe::sign::SignDeframer;
use kcs_core::error::Result;
use kcs_cli::{LiveDeviceArgs, ModeArgs};

/// Samples buffered between audio chunks and the deframer, bounding how
/// many chunks the capture side can race ahead before the decode loop
/// catches up.
const MAILBOX_DEPTH: usize = 32;

#[derive(Parser, Debug)]
#[command(about = "Decode Kansas City Standard data from a live audio input device")]
struct Cli {
    #[command(flatten)]
    mode: ModeArgs,

    #[command(flatten)]
    device: LiveDeviceArgs,

    /// Write raw decoded bytes instead of an ASCII-escaped rendering.
    #[arg(short = 'b', long = "binary")]
    binary: bool,

    /// Emit NUL bytes from the decoded stream (suppressed by default).
    #[arg(short = 'z', long = "record-null")]
    record_null: bool,
}

/// Pulls captured `f32` samples on demand, converts each to the 8-bit
/// unsigned "MSB" view the sign-change demodulator expects, and yields
/// one hysteresis event per sample.
struct LiveEvents<'a> {
    capture: &'a Capture,
    demod: SignChangeDemodulator,
    pending: VecDeque<u8>,
    monitor: Option<&'a Monitor>,
}

impl Iterator for LiveEvents<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            if let Some(msb) = self.pending.pop_front() {
                return Some(self.demod.push(msb));
            }
            let samples = self.capture.recv()?;
            if let Some(monitor) = self.monitor {
                let pcm: Vec<u8> = samples
                    .iter()
                    .map(|&s| ((s.clamp(-1.0, 1.0) + 1.0) * 127.5) as u8)
                    .collect();
                monitor.send(&pcm);
            }
            self.pending
                .extend(samples.iter().map(|&s| ((s.clamp(-1.0, 1.0) + 1.0) * 127.5) as u8));
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.device.list_devices {
        return kcs_cli::list_devices();
    }

    let capture = Capture::open_on(MAILBOX_DEPTH, cli.device.device)?;
    let mode = cli.mode.build(capture.sample_rate)?;
    let monitor = cli
        .device
        .monitor_device
        .map(|idx| Monitor::open(capture.sample_rate, Some(idx), MAILBOX_DEPTH))
        .transpose()?;

    info!("listening at {:?} / {:?}", mode.speed, mode.framing);

    let stop = kcs_cli::install_interrupt_flag();
    let mut events = LiveEvents {
        capture: &capture,
        demod: SignChangeDemodulator::default(),
        pending: VecDeque::new(),
        monitor: monitor.as_ref(),
    };
    let mut deframer = SignDeframer::new(&mode);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    while !stop.load(Ordering::Relaxed) {
        let Some(byte) = deframer.next_byte(&mut events) else { break };
        if byte == 0 && !cli.record_null {
            continue;
        }
        if cli.binary {
            out.write_all(&[byte])?;
        } else if byte < 0x80 {
            out.write_all(&[byte])?;
        } else {
            write!(out, "\\x{:02x}", byte)?;
        }
        out.flush()?;
    }

    Ok(())
}

fn main() -> ExitCode {
    kcs_cli::init_logging();
    let cli = Cli::parse();
    let result = run(cli);
    kcs_cli::exit_code_for(&result)
}
