// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A Reed-Solomon GF(2^8) outer block code, wrapping the `reed-solomon`
//! crate's single-block encoder/decoder into a streaming codec over
//! fixed-size message chunks — the same shape as the original
//! `rs_encode`/`rs_decode` tools, just chunked in Rust rather than a
//! Python buffer-and-flush loop.

use log::warn;
use reed_solomon::{Decoder, Encoder};

use kcs_core::error::{invalid_mode_error, KcsError, Result};

/// Largest total codeword length GF(2^8) Reed-Solomon can address
/// (`n <= 255`).
const MAX_FIELD_SIZE: usize = 255;

/// A Reed-Solomon block codec parameterized by codeword size `n`
/// (message + parity) and message size `k` (the `-n`/`-k` CLI flags in
/// the original tool).
pub struct BlockCodec {
    message_len: usize,
    ecc_len: usize,
}

impl BlockCodec {
    /// `codeword_size` is `n`, `message_size` is `k`; parity length is
    /// `n - k`. Fails if the codeword doesn't fit in GF(2^8), or if
    /// `k >= n` (no room for parity).
    pub fn new(codeword_size: usize, message_size: usize) -> Result<BlockCodec> {
        if message_size == 0 || codeword_size <= message_size {
            return invalid_mode_error(format!(
                "message size {} must be smaller than codeword size {}",
                message_size, codeword_size
            ));
        }
        if codeword_size > MAX_FIELD_SIZE {
            return invalid_mode_error(format!(
                "codeword size {} exceeds the GF(2^8) limit of {}",
                codeword_size, MAX_FIELD_SIZE
            ));
        }
        Ok(BlockCodec { message_len: message_size, ecc_len: codeword_size - message_size })
    }

    pub fn message_len(&self) -> usize {
        self.message_len
    }

    pub fn ecc_len(&self) -> usize {
        self.ecc_len
    }

    pub fn codeword_len(&self) -> usize {
        self.message_len + self.ecc_len
    }

    /// Encodes `input` as a sequence of codewords, chunking it into
    /// `message_len`-sized pieces. A final short chunk (fewer than
    /// `message_len` bytes) is still encoded at its own length — its
    /// codeword is correspondingly shorter, exactly like the original
    /// tool's flush-the-last-partial-buffer behavior.
    pub fn encode_stream(&self, input: &[u8]) -> Vec<u8> {
        let encoder = Encoder::new(self.ecc_len);
        let mut out = Vec::with_capacity(input.len() + input.len() / self.message_len.max(1) * self.ecc_len);
        for chunk in input.chunks(self.message_len.max(1)) {
            let codeword = encoder.encode(chunk);
            out.extend_from_slice(&codeword);
        }
        out
    }

    /// Encodes a single message chunk (at most `message_len` bytes,
    /// possibly a short final one) into its codeword. Used by the live
    /// `rs-encode` tool, which flushes one block at a time rather than
    /// buffering the whole input like [`BlockCodec::encode_stream`].
    pub fn encode_block(&self, chunk: &[u8]) -> Vec<u8> {
        Encoder::new(self.ecc_len).encode(chunk).to_vec()
    }

    /// Decodes a single codeword (at most `codeword_len` bytes, possibly
    /// a short final one) and returns the recovered message bytes, or
    /// an `UncorrectableBlock` error carrying `offset` if the block had
    /// more byte errors than its parity budget could correct. Used by
    /// the live `rs-decode` tool for its one-block-at-a-time, no
    /// cross-block buffering decode loop (§5, §7).
    pub fn decode_block(&self, chunk: &[u8], offset: u64) -> Result<Vec<u8>> {
        Decoder::new(self.ecc_len).correct(chunk, None).map(|buf| buf.data().to_vec()).map_err(
            |err| KcsError::UncorrectableBlock { offset, reason: format!("{:?}", err) },
        )
    }

    /// Decodes `input` as a sequence of `codeword_len`-sized blocks (the
    /// last block may be shorter, for the same reason the final encode
    /// chunk can be). A block with more byte errors than `ecc_len` can
    /// correct is dropped: it contributes no bytes to the output (not
    /// zero-filled) and is logged as an uncorrectable block, mirroring
    /// the original decoder's behavior of skipping the stdout write on
    /// a `ReedSolomonError` and continuing with the next block.
    ///
    /// Returns the recovered message bytes and the number of blocks
    /// dropped.
    pub fn decode_stream(&self, input: &[u8]) -> (Vec<u8>, usize) {
        let decoder = Decoder::new(self.ecc_len);
        let mut out = Vec::with_capacity(input.len());
        let mut dropped = 0usize;
        let mut offset = 0u64;

        for chunk in input.chunks(self.codeword_len().max(1)) {
            match decoder.correct(chunk, None) {
                Ok(buf) => out.extend_from_slice(buf.data()),
                Err(err) => {
                    dropped += 1;
                    let report: KcsError = KcsError::UncorrectableBlock {
                        offset,
                        reason: format!("{:?}", err),
                    };
                    warn!("{}", report);
                }
            }
            offset += chunk.len() as u64;
        }

        (out, dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn roundtrips_a_clean_stream() {
        let codec = BlockCodec::new(8, 4).unwrap();
        let message = b"the quick brown fox jumps over the lazy dog";
        let encoded = codec.encode_stream(message);
        let (decoded, dropped) = codec.decode_stream(&encoded);
        assert_eq!(dropped, 0);
        assert_eq!(decoded, message);
    }

    #[test]
    fn corrects_errors_within_the_parity_budget() {
        let codec = BlockCodec::new(12, 8).unwrap();
        let message = b"deadbeefcafef00d";
        let mut encoded = codec.encode_stream(message);

        // Flip one byte in the first codeword; ecc_len=4 corrects up to 2
        // byte errors per block.
        encoded[0] ^= 0xFF;

        let (decoded, dropped) = codec.decode_stream(&encoded);
        assert_eq!(dropped, 0);
        assert_eq!(decoded, message);
    }

    #[test]
    fn drops_a_block_with_more_errors_than_parity_can_correct() {
        let codec = BlockCodec::new(8, 4).unwrap();
        let message = b"abcd";
        let mut encoded = codec.encode_stream(message);

        // ecc_len=4 corrects at most 2 byte errors; corrupt 4.
        for b in encoded.iter_mut().take(4) {
            *b ^= 0xFF;
        }

        let (decoded, dropped) = codec.decode_stream(&encoded);
        assert_eq!(dropped, 1);
        assert!(decoded.is_empty());
    }

    #[test]
    fn handles_a_short_final_block() {
        let codec = BlockCodec::new(8, 4).unwrap();
        let mut message = vec![0u8; 4 * 3];
        rand::thread_rng().fill(&mut message[..]);
        message.extend_from_slice(b"ab"); // 2-byte trailing partial chunk

        let encoded = codec.encode_stream(&message);
        let (decoded, dropped) = codec.decode_stream(&encoded);
        assert_eq!(dropped, 0);
        assert_eq!(decoded, message);
    }

    #[test]
    fn rejects_a_message_size_not_smaller_than_codeword_size() {
        assert!(BlockCodec::new(4, 4).is_err());
        assert!(BlockCodec::new(4, 8).is_err());
    }
}
