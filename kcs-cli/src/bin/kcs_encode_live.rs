// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Encodes a file (or stdin) directly to the default (or chosen) audio
//! output device, optionally echoing the source bytes to stdout and
//! teeing the waveform to a monitor device. Ported from
//! `kcs_encode_live.py`.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::Parser;
use log::info;

use kcs_audio::device::{Monitor, Playback};
use kcs_core::error::Result;
use kcs_core::synth::Pulses;
use kcs_cli::{LiveDeviceArgs, ModeArgs};

/// Matches `kcs_encode_live.py`'s `FRAMERATE`.
const LIVE_SAMPLE_RATE: u32 = 44100;

#[derive(Parser, Debug)]
#[command(about = "Encode a byte stream directly to a live audio output device")]
struct Cli {
    #[command(flatten)]
    mode: ModeArgs,

    #[command(flatten)]
    device: LiveDeviceArgs,

    /// Length of the leading carrier tone, in seconds.
    #[arg(short = 'L', long = "leader", default_value_t = 1.0)]
    leader: f64,

    /// Length of the trailing carrier tone, in seconds.
    #[arg(short = 'T', long = "trailer", default_value_t = 1.0)]
    trailer: f64,

    /// Echo the source bytes to stdout as they are transmitted.
    #[arg(short = 'e', long = "echo")]
    echo: bool,

    /// Input file path; reads stdin if omitted.
    infile: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<()> {
    if cli.device.list_devices {
        return kcs_cli::list_devices();
    }

    let mode = cli.mode.build(LIVE_SAMPLE_RATE)?;
    let pulses = Pulses::new(&mode);
    let mut output = Playback::open_on(mode.sample_rate, cli.device.device)?;
    let monitor = cli
        .device
        .monitor_device
        .map(|idx| Monitor::open(mode.sample_rate, Some(idx), 64))
        .transpose()?;

    let leader_len =
        ((mode.sample_rate as f64 * cli.leader) / pulses.one_pulse_len().max(1) as f64).round()
            as usize;
    let trailer_len =
        ((mode.sample_rate as f64 * cli.trailer) / pulses.one_pulse_len().max(1) as f64).round()
            as usize;

    info!("transmitting at {:?} / {:?}", mode.speed, mode.framing);

    let stop = kcs_cli::install_interrupt_flag();

    for _ in 0..leader_len {
        output.write(pulses.one_pulse())?;
        if let Some(monitor) = &monitor {
            monitor.send(pulses.one_pulse());
        }
    }

    let mut data = Vec::new();
    match &cli.infile {
        Some(path) => {
            std::fs::File::open(path)?.read_to_end(&mut data)?;
        }
        None => {
            std::io::stdin().read_to_end(&mut data)?;
        }
    }

    let mut stdout = std::io::stdout();
    for &byte in &data {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let frame = pulses.encode_byte(&mode, byte);
        output.write(&frame)?;
        if let Some(monitor) = &monitor {
            monitor.send(&frame);
        }
        if cli.echo {
            stdout.write_all(&[byte])?;
            stdout.flush()?;
        }
    }

    for _ in 0..trailer_len {
        output.write(pulses.one_pulse())?;
        if let Some(monitor) = &monitor {
            monitor.send(pulses.one_pulse());
        }
    }
    output.flush();

    Ok(())
}

fn main() -> ExitCode {
    kcs_cli::init_logging();
    let cli = Cli::parse();
    let result = run(cli);
    kcs_cli::exit_code_for(&result)
}
