// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Recovers the original byte stream from Reed-Solomon codewords, one
//! block at a time, with a bounded-wait read so a Ctrl-C can flush the
//! final partial block rather than hanging forever on a stalled input.
//! Ported from `rs_decode.py`'s `select()`-based read loop.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::error;

use kcs_core::error::Result;
use kcs_rs::BlockCodec;

/// Matches `rs_decode.py`'s `select.select(..., 1.)` poll period.
const READ_DEADLINE: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(about = "Decode a stream of Reed-Solomon codewords back to the original bytes")]
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

/// Reads one byte at a time off `input` on a dedicated thread and
/// forwards it over a channel, so the main loop's `recv_timeout` can
/// poll for a Ctrl-C between bytes instead of blocking on the OS read
/// indefinitely — the Rust equivalent of `select()`-ing on stdin.
fn spawn_reader(mut input: Box<dyn Read + Send>) -> mpsc::Receiver<u8> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut byte = [0u8; 1];
        loop {
            match input.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(byte[0]).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

fn run(cli: Cli) -> Result<()> {
    let codec = BlockCodec::new(cli.n, cli.k)?;

    let input: Box<dyn Read + Send> = match &cli.infile {
        Some(path) => Box::new(std::fs::File::open(path)?),
        None => Box::new(std::io::stdin()),
    };
    let rx = spawn_reader(input);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let stop = kcs_cli::install_interrupt_flag();
    let mut buffer: Vec<u8> = Vec::with_capacity(codec.codeword_len());
    let mut offset = 0u64;

    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        match rx.recv_timeout(READ_DEADLINE) {
            Ok(byte) => buffer.push(byte),
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if buffer.len() == codec.codeword_len() {
            flush_block(&codec, &buffer, &mut out, offset)?;
            offset += buffer.len() as u64;
            buffer.clear();
        }
    }

    if !buffer.is_empty() {
        flush_block(&codec, &buffer, &mut out, offset)?;
    }

    Ok(())
}

/// Decodes one block and writes its recovered message bytes, or logs an
/// `UncorrectableBlock` diagnostic to stderr and writes nothing — never
/// aborting the stream, per the design's recoverable-error policy.
fn flush_block(codec: &BlockCodec, block: &[u8], out: &mut dyn Write, offset: u64) -> Result<()> {
    match codec.decode_block(block, offset) {
        Ok(message) => {
            out.write_all(&message)?;
            out.flush()?;
        }
        Err(err) => error!("{}", err),
    }
    Ok(())
}

fn main() -> ExitCode {
    kcs_cli::init_logging();
    let cli = Cli::parse();
    let result = run(cli);
    kcs_cli::exit_code_for(&result)
}
