// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Wraps a byte stream into Reed-Solomon codewords, one block at a
//! time. Ported from `rs_encode.py`.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use kcs_core::error::Result;
use kcs_rs::BlockCodec;

#[derive(Parser, Debug)]
#[command(about = "Encode a byte stream into Reed-Solomon codewords")]
struct Cli {
    /// Codeword size (message + ECC bytes).
    #[arg(short = 'n', long = "codeword-size", default_value_t = 8)]
    n: usize,

    /// Message size, in bytes.
    #[arg(short = 'k', long = "message-size", default_value_t = 4)]
    k: usize,

    /// Input file path; reads stdin if omitted.
    infile: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<()> {
    let codec = BlockCodec::new(cli.n, cli.k)?;

    let mut input: Box<dyn Read> = match &cli.infile {
        Some(path) => Box::new(std::fs::File::open(path)?),
        None => Box::new(std::io::stdin()),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut buffer = Vec::with_capacity(codec.message_len());
    let mut byte = [0u8; 1];
    loop {
        let n = input.read(&mut byte)?;
        if n == 0 {
            break;
        }
        buffer.push(byte[0]);
        if buffer.len() == codec.message_len() {
            out.write_all(&codec.encode_block(&buffer))?;
            out.flush()?;
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        out.write_all(&codec.encode_block(&buffer))?;
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
