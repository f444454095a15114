//! Benchmarks for the universal integer codes.

use criterion::{Criterion, criterion_group, criterion_main};
use picopack_core::bitstream::{BitReader, BitStream};
use picopack_core::codes::{Lomont1, basc};
use std::hint::black_box;

/// Deterministic pseudo-random values for reproducible runs.
fn lcg_values(count: usize, mask: u32) -> Vec<u32> {
    let mut seed: u64 = 0x123456789ABCDEF0;
    (0..count)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            (seed >> 32) as u32 & mask
        })
        .collect()
}

fn bench_lomont(c: &mut Criterion) {
    let values = lcg_values(4096, 0xFFFF);
    let code = Lomont1::BYTE_COUNT;

    c.bench_function("lomont1_encode_4k", |b| {
        b.iter(|| {
            let mut bs = BitStream::new();
            for &v in &values {
                code.encode(&mut bs, black_box(v));
            }
            black_box(bs.len())
        })
    });

    let mut bs = BitStream::new();
    for &v in &values {
        code.encode(&mut bs, v);
    }
    let bytes = bs.to_bytes();

    c.bench_function("lomont1_decode_4k", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(&bytes);
            let mut sum = 0u64;
            for _ in 0..values.len() {
                sum += code.decode(&mut reader).unwrap() as u64;
            }
            black_box(sum)
        })
    });
}

fn bench_basc(c: &mut Criterion) {
    let table = lcg_values(256, 0x3FF);

    c.bench_function("basc_encode_table", |b| {
        b.iter(|| {
            let mut bs = BitStream::new();
            basc::encode(&mut bs, black_box(&table));
            black_box(bs.len())
        })
    });

    let mut bs = BitStream::new();
    basc::encode(&mut bs, &table);
    let bytes = bs.to_bytes();

    c.bench_function("basc_decode_table", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(&bytes);
            black_box(basc::decode(&mut reader).unwrap())
        })
    });
}

criterion_group!(benches, bench_lomont, bench_basc);
criterion_main!(benches);
