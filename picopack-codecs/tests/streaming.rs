//! Incremental-decoder equivalence tests.
//!
//! Driving a symbol or block decoder to the end must reproduce exactly
//! what the one-shot decompressor returns, with the block decoders
//! running through a cyclic window far smaller than the output.

use picopack_codecs::{
    ArithmeticDecoder, HuffmanDecoder, Lz77Decoder, LzclDecoder, Method, lz77, lzcl,
};

fn lcg_bytes(count: usize) -> Vec<u8> {
    let mut seed: u64 = 0xFEEDFACE0BADF00D;
    (0..count)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            (seed >> 32) as u8
        })
        .collect()
}

/// Mixed content: repetitive structure with a sprinkling of noise.
fn sample() -> Vec<u8> {
    let mut data = Vec::new();
    let noise = lcg_bytes(64);
    for i in 0..50usize {
        data.extend_from_slice(b"block header ");
        data.push(noise[i % noise.len()]);
        data.extend_from_slice(b" payload payload payload\n");
    }
    data
}

#[test]
fn test_huffman_symbols_match_oneshot() {
    let input = sample();
    let packed = Method::Huffman.compress(&input).unwrap();
    let oneshot = Method::Huffman.decompress(&packed, input.len()).unwrap();

    let mut decoder = HuffmanDecoder::new(&packed).unwrap();
    assert_eq!(decoder.len(), Some(input.len() as u32));
    let mut symbols = Vec::new();
    while let Some(symbol) = decoder.next_symbol().unwrap() {
        symbols.push(symbol as u8);
    }
    assert_eq!(symbols, oneshot);
    assert_eq!(symbols, input);
}

#[test]
fn test_arithmetic_symbols_match_oneshot() {
    let input = sample();
    let packed = Method::Arithmetic.compress(&input).unwrap();
    let oneshot = Method::Arithmetic.decompress(&packed, input.len()).unwrap();

    let mut decoder = ArithmeticDecoder::new(&packed).unwrap();
    assert_eq!(decoder.remaining() as usize, input.len());
    let mut symbols = Vec::new();
    while let Some(symbol) = decoder.next_symbol().unwrap() {
        symbols.push(symbol as u8);
    }
    assert_eq!(symbols, oneshot);
    assert_eq!(symbols, input);
}

/// Drain a block decoder through a window smaller than the output.
fn drain_lz77(packed: &[u8], window_size: usize) -> Vec<u8> {
    let mut window = vec![0u8; window_size];
    let mut decoder = Lz77Decoder::new(packed, &mut window).unwrap();
    let mut output = Vec::new();
    let mut index = 0usize;
    while let Some(produced) = decoder.next_block().unwrap() {
        for _ in 0..produced {
            output.push(decoder.window()[index % window_size]);
            index += 1;
        }
    }
    output
}

#[test]
fn test_lz77_blocks_match_oneshot_small_window() {
    let input = sample();
    let packed = Method::Lz77.compress(&input).unwrap();
    let oneshot = Method::Lz77.decompress(&packed, input.len()).unwrap();

    // The default matcher never references further back than 1023 bytes,
    // so a 1280-byte window suffices for output 2-3x larger.
    assert!(input.len() > 1280);
    let drained = drain_lz77(&packed, 1280);
    assert_eq!(drained, oneshot);
    assert_eq!(drained, input);
}

#[test]
fn test_lzcl_blocks_match_oneshot_small_window() {
    let input = sample();
    let packed = Method::Lzcl.compress(&input).unwrap();
    let oneshot = Method::Lzcl.decompress(&packed, input.len()).unwrap();

    let mut window = vec![0u8; 1280];
    let mut decoder = LzclDecoder::new(&packed, &mut window).unwrap();
    assert_eq!(decoder.byte_length() as usize, input.len());
    let mut drained = Vec::new();
    let mut index = 0usize;
    while let Some(produced) = decoder.next_block().unwrap() {
        for _ in 0..produced {
            drained.push(decoder.window()[index % 1280]);
            index += 1;
        }
    }
    assert_eq!(drained, oneshot);
    assert_eq!(drained, input);
}

#[test]
fn test_block_sizes_sum_to_byte_length() {
    let input = sample();
    let packed = lzcl::compress(&input).unwrap();
    let mut window = vec![0u8; 2048];
    let mut decoder = LzclDecoder::new(&packed, &mut window).unwrap();
    let mut total = 0u64;
    while let Some(produced) = decoder.next_block().unwrap() {
        assert!(produced >= 1);
        total += produced as u64;
    }
    assert_eq!(total, input.len() as u64);
    assert_eq!(decoder.byte_index() as u64, total);
}

#[test]
fn test_lz77_window_exactly_at_bound() {
    // A stream whose furthest reference is known lets the window be sized
    // to the documented minimum.
    let input = b"0123456789".repeat(30);
    let options = lz77::Lz77Options {
        min_length: 3,
        max_length: 32,
        max_distance: 63,
    };
    let packed = lz77::compress_with(&input, &options).unwrap();
    let oneshot = lz77::decompress(&packed, input.len()).unwrap();
    // max(distance, length) + 1 <= max(63, 32) + 1 = 64.
    let drained = drain_lz77(&packed, 64);
    assert_eq!(drained, oneshot);
}

#[test]
fn test_incremental_on_pseudo_random() {
    let input = lcg_bytes(700);
    for method in Method::ALL {
        let packed = method.compress(&input).unwrap();
        let oneshot = method.decompress(&packed, input.len()).unwrap();
        assert_eq!(oneshot, input, "{method}");
    }
    // Block decoders again through a tight window.
    let packed = lz77::compress(&input).unwrap();
    assert_eq!(drain_lz77(&packed, 1024), input);
}
