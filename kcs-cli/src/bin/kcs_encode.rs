// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Encodes a file (or stdin) into a Kansas City Standard WAV file.
//! Ported from `kcs_encode.py`.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use kcs_audio::wav;
use kcs_core::error::Result;
use kcs_core::synth::synthesize;
use kcs_cli::ModeArgs;

/// KCS base sample rate used by the file encoder (`kcs_encode.py`'s
/// `FRAMERATE`), doubled at 2400 baud by `ModeArgs::build`'s nominal
/// frequency table.
const FILE_SAMPLE_RATE: u32 = 9600;

#[derive(Parser, Debug)]
#[command(about = "Encode a byte stream into a Kansas City Standard WAV file")]
struct Cli {
    #[command(flatten)]
    mode: ModeArgs,

    /// Length of the leading carrier tone, in seconds.
    #[arg(short = 'L', long = "leader", default_value_t = 1.0)]
    leader: f64,

    /// Length of the trailing carrier tone, in seconds.
    #[arg(short = 'T', long = "trailer", default_value_t = 1.0)]
    trailer: f64,

    /// Input file path; reads stdin if omitted.
    infile: Option<PathBuf>,

    /// Output WAV file path.
    outfile: PathBuf,
}

fn run(cli: Cli) -> Result<()> {
    let sample_rate = if cli.mode.speed == 2 { FILE_SAMPLE_RATE * 2 } else { FILE_SAMPLE_RATE };
    let mode = cli.mode.build(sample_rate)?;

    let mut data = Vec::new();
    match &cli.infile {
        Some(path) => {
            std::fs::File::open(path)?.read_to_end(&mut data)?;
        }
        None => {
            std::io::stdin().read_to_end(&mut data)?;
        }
    }

    let pcm = synthesize(&mode, &data, cli.leader, cli.trailer);
    wav::write_u8_mono(&cli.outfile, mode.sample_rate, &pcm)?;
    Ok(())
}

fn main() -> ExitCode {
    kcs_cli::init_logging();
    let cli = Cli::parse();
    let result = run(cli);
    kcs_cli::exit_code_for(&result)
}
