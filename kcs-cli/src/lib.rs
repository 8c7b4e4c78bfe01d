// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared plumbing for the seven `kcs-cli` binaries: the common mode
//! flags, device-listing output, logger init, and the exit-code mapping
//! every binary uses to turn a `KcsError` into the documented process
//! exit status.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Args;
use cpal::traits::{DeviceTrait, HostTrait};
use log::error;

use kcs_core::error::{KcsError, Result};
use kcs_core::mode::{Framing, ModeParams, Speed};

/// Flags shared by every encode/decode binary: speed, framing, and the
/// base-frequency adjustment. File-based tools default the sample rate
/// to 9600 Hz (`kcs_encode.py`'s `FRAMERATE`); live tools default it to
/// 44100 Hz — each binary supplies its own default via `sample_rate`.
#[derive(Args, Debug)]
pub struct ModeArgs {
    /// 0 for 300 baud, 1 for 1200 baud, 2 for 2400 baud.
    #[arg(short = 's', long = "speed", default_value_t = 0)]
    pub speed: u8,

    /// ASCII-only w/CUTS encoding (7 data bits, 3 stop bits).
    #[arg(short = 'a', long = "ascii")]
    pub cuts: bool,

    /// KCS base frequency adjustment, in Hz.
    #[arg(short = 'f', long = "kcs-base-adj", default_value_t = 0)]
    pub base_freq_adj: i32,
}

impl ModeArgs {
    pub fn build(&self, sample_rate: u32) -> Result<ModeParams> {
        let speed = Speed::from_cli_index(self.speed).ok_or_else(|| {
            KcsError::InvalidMode(format!("speed index {} is not 0, 1, or 2", self.speed))
        })?;
        let framing = if self.cuts { Framing::Cuts } else { Framing::Kcs };
        ModeParams::new(speed, framing, sample_rate, self.base_freq_adj)
    }
}

/// Flags shared by the three live-audio binaries.
#[derive(Args, Debug)]
pub struct LiveDeviceArgs {
    /// List audio input/output devices and exit.
    #[arg(short = 'l', long = "list-devices")]
    pub list_devices: bool,

    /// Audio device id (system default if unset).
    #[arg(short = 'd', long = "device")]
    pub device: Option<usize>,

    /// Audio monitor device id (no monitor if unset).
    #[arg(short = 'm', long = "monitor-device")]
    pub monitor_device: Option<usize>,
}

pub fn init_logging() {
    pretty_env_logger::init();
}

/// Prints `Device id N - <name> [IN][OUT]` for every host device with
/// at least one input or output channel, matching the format all three
/// original live tools print before `exit(0)`.
pub fn list_devices() -> Result<()> {
    let host = cpal::default_host();
    let mut id = 0usize;

    for device in host
        .input_devices()
        .map_err(|e| KcsError::AudioDeviceError(e.to_string()))?
        .map(|d| (d, true, false))
        .chain(
            host.output_devices()
                .map_err(|e| KcsError::AudioDeviceError(e.to_string()))?
                .map(|d| (d, false, true)),
        )
    {
        let (device, is_in, is_out) = device;
        let name = device.name().unwrap_or_else(|_| "<unknown>".to_string());
        let in_mark = if is_in { "[IN]" } else { "" };
        let out_mark = if is_out { "[OUT]" } else { "" };
        println!("Device id {} - {} {}{}", id, name, in_mark, out_mark);
        id += 1;
    }
    Ok(())
}

/// Installs a `Ctrl-C` handler that sets a shared flag rather than
/// terminating the process immediately, so a live pipeline loop gets a
/// chance to flush what it has (mirroring `rs_decode.py`'s
/// `KeyboardInterrupt` handling around its read loop). Pipeline loops
/// should check `flag.load(Ordering::Relaxed)` between iterations.
pub fn install_interrupt_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    if let Err(err) = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    }) {
        error!("failed to install Ctrl-C handler: {}", err);
    }
    flag
}

/// Maps a pipeline result to the documented process exit codes
/// (0 success, 1 usage/mode error, 2 I/O error), logging the error on
/// the way out.
pub fn exit_code_for(result: &Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ KcsError::Io(_)) => {
            error!("{}", err);
            ExitCode::from(2)
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::from(1)
        }
    }
}
