// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Decodes Kansas City Standard data from a live audio input device via
//! the sliding-window FFT demodulator, a higher-fidelity alternative to
//! the sign-change path in `kcs-decode-live`. Ported from
//! `kcs_decode_live_fft.py`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::Parser;
use log::info;

use kcs_audio::device::Capture;
use kcs_core::deframe::fft::{FftDeframer, FftDeframerConfig, CARRIER_GATE, MATCH_THRESHOLD};
use kcs_core::demod::fft::FftSymbolDemodulator;
use kcs_core::error::Result;
use kcs_cli::{LiveDeviceArgs, ModeArgs};

#[derive(Parser, Debug)]
#[command(about = "Decode Kansas City Standard data from a live audio input device via FFT")]
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

    /// Write decoded output to this file instead of stdout.
    #[arg(short = 'o', long = "output-file")]
    output_file: Option<PathBuf>,

    /// Fraction of a start-kernel window that must show carrier before a
    /// match is even attempted (the §4.E.3 carrier gate).
    #[arg(long = "carrier-gate", default_value_t = CARRIER_GATE)]
    carrier_gate: f64,

    /// Minimum normalized start/stop kernel convolution score to accept
    /// a byte's position.
    #[arg(long = "match-threshold", default_value_t = MATCH_THRESHOLD)]
    match_threshold: f64,
}

fn write_byte(out: &mut dyn Write, byte: u8, binary: bool) -> Result<()> {
    if binary || byte < 0x80 {
        out.write_all(&[byte])?;
    } else {
        write!(out, "\\x{:02x}", byte)?;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    if cli.device.list_devices {
        return kcs_cli::list_devices();
    }

    let capture = Capture::open_on(32, cli.device.device)?;
    let mode = cli.mode.build(capture.sample_rate)?;

    info!(
        "listening (fft) at {:?} / {:?}, window_len={}",
        mode.speed,
        mode.framing,
        FftSymbolDemodulator::window_len(&mode)
    );

    let config = FftDeframerConfig {
        carrier_gate: cli.carrier_gate,
        match_threshold: cli.match_threshold,
    };

    let mut symbol_demod = FftSymbolDemodulator::new(&mode);
    let mut deframer = FftDeframer::new(&mode, config);
    let stop = kcs_cli::install_interrupt_flag();

    let mut sink: Box<dyn Write> = match &cli.output_file {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };

    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }

        let byte = deframer.next_byte(|d| {
            if stop.load(Ordering::Relaxed) {
                return false;
            }
            match capture.recv() {
                Some(samples) => {
                    let symbols = symbol_demod.push(&samples);
                    d.push_symbols(&symbols);
                    true
                }
                None => false,
            }
        });

        let Some(byte) = byte else { break };
        if byte == 0 && !cli.record_null {
            continue;
        }
        write_byte(sink.as_mut(), byte, cli.binary)?;
        sink.flush()?;
    }

    Ok(())
}

fn main() -> ExitCode {
    kcs_cli::init_logging();
    let cli = Cli::parse();
    let result = run(cli);
    kcs_cli::exit_code_for(&result)
}
