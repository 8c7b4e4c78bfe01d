// kcs-modem
// Copyright (c) 2026 The kcs-modem Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The quantified Reed-Solomon closure property from the design's
//! testable-properties section: a codeword with no more byte errors
//! than its parity budget allows always recovers the original message.

use rand::Rng;

use kcs_rs::BlockCodec;

#[test]
fn recovers_the_message_with_max_correctable_errors_per_block() {
    let mut rng = rand::thread_rng();

    for _ in 0..20 {
        let n = 16;
        let k = 8;
        let max_errors = (n - k) / 2;
        let codec = BlockCodec::new(n, k).unwrap();

        let message: Vec<u8> = (0..k * 3).map(|_| rng.gen()).collect();
        let mut encoded = codec.encode_stream(&message);

        // Inject exactly `max_errors` byte errors into each full
        // codeword, at random (non-colliding) positions.
        for block_start in (0..encoded.len()).step_by(n) {
            let block_len = (encoded.len() - block_start).min(n);
            if block_len < n {
                break; // short final block, skip corruption
            }
            let mut positions: Vec<usize> = (0..block_len).collect();
            for i in (1..positions.len()).rev() {
                let j = rng.gen_range(0..=i);
                positions.swap(i, j);
            }
            for &pos in positions.iter().take(max_errors) {
                encoded[block_start + pos] ^= rng.gen_range(1..=255);
            }
        }

        let (decoded, dropped) = codec.decode_stream(&encoded);
        assert_eq!(dropped, 0, "a block was reported uncorrectable within its parity budget");
        assert_eq!(decoded, message);
    }
}

#[test]
fn exceeding_the_parity_budget_is_reported_not_silently_wrong() {
    let codec = BlockCodec::new(8, 4).unwrap();
    let message = b"0123";
    let mut encoded = codec.encode_stream(message);

    for b in encoded.iter_mut() {
        *b ^= 0xFF;
    }

    let (decoded, dropped) = codec.decode_stream(&encoded);
    assert_eq!(dropped, 1);
    assert!(decoded.is_empty());
}
