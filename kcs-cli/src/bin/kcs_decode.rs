// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Converts a Kansas City Standard WAV file into its decoded byte
//! stream via the sign-change demodulator. Ported from `kcs_decode.py`.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use kcs_audio::wav;
use kcs_core::demod::sign::{extract_msb_samples, SignChangeDemodulator};
use kcs_core::deframe::sign::SignDeframer;
use kcs_core::error::Result;
use kcs_cli::ModeArgs;

#[derive(Parser, Debug)]
#[command(about = "Decode a Kansas City Standard WAV file to stdout")]
struct Cli {
    #[command(flatten)]
    mode: ModeArgs,

    /// WAV file to decode.
    infile: PathBuf,
}

/// Width of each stdout write, matching `kcs_decode.py`'s
/// `islice(byte_stream, 80)` chunking.
const OUTPUT_CHUNK: usize = 80;

fn run(cli: Cli) -> Result<()> {
    let file = wav::read_raw(&cli.infile)?;
    let mode = cli.mode.build(file.sample_rate)?;

    let sample_width = (file.bits_per_sample / 8) as usize;
    let mut demod = SignChangeDemodulator::default();
    let mut events = extract_msb_samples(&file.raw, sample_width, file.channels as usize)
        .map(|msb| demod.push(msb));

    let mut deframer = SignDeframer::new(&mode);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut chunk = Vec::with_capacity(OUTPUT_CHUNK);

    while let Some(byte) = deframer.next_byte(&mut events) {
        chunk.push(byte);
        if chunk.len() == OUTPUT_CHUNK {
            out.write_all(&chunk)?;
            out.flush()?;
            chunk.clear();
        }
    }
    if !chunk.is_empty() {
        out.write_all(&chunk)?;
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
