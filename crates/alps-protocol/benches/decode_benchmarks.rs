//! Decode Benchmarks

use alps_protocol::prelude::*;
use criterion::{Criterion, criterion_group, criterion_main};

fn context(e7: [u8; 3], ec: [u8; 3]) -> Option<DecodeContext> {
    DecodeContext::new(identify(e7, ec).ok()?).ok()
}

fn bench_v7_decode(c: &mut Criterion) {
    let Some(mut ctx) = context([0x73, 0x03, 0x0a], [0x88, 0xba, 0x00]) else {
        return;
    };
    let packet = [0x48, 0x10, 0x3f, 0x4f, 0x45, 0x02];

    c.bench_function("decode_v7_two_finger", |b| {
        b.iter(|| std::hint::black_box(decode(std::hint::black_box(&packet), &mut ctx)))
    });
}

fn bench_ss4_pair(c: &mut Criterion) {
    let Some(mut ctx) = context([0x73, 0x03, 0x14], [0, 0, 0]) else {
        return;
    };
    let first = [0x1f, 0x23, 0x15, 0x10, 0x40, 0x21];
    let second = [0x18, 0x30, 0x02, 0x37, 0xfa, 0xef];

    c.bench_function("decode_ss4_three_finger_pair", |b| {
        b.iter(|| (decode(&first, &mut ctx), decode(&second, &mut ctx)))
    });
}

fn bench_v3_bitmap_pair(c: &mut Criterion) {
    let Some(mut ctx) = context([0x73, 0x03, 0x0a], [0x88, 0x08, 0x1d]) else {
        return;
    };
    let position = [0xaf, 0x10, 0x07, 0x00, 0x6f, 0x30];
    let bitmap = [0x8f, 0x09, 0x05, 0x00, 0x00, 0x41];

    c.bench_function("decode_rushmore_bitmap_pair", |b| {
        b.iter(|| (decode(&position, &mut ctx), decode(&bitmap, &mut ctx)))
    });
}

fn bench_framer(c: &mut Criterion) {
    let Some(ctx) = context([0x73, 0x02, 0x64], [0x00, 0x00, 0x8a]) else {
        return;
    };
    let mut framer = PacketFramer::new(*ctx.descriptor());
    let stream = [0x8f, 0x20, 0x30, 0x12, 0x01, 0x25, 0x40, 0x00];

    c.bench_function("framer_v4_packet", |b| {
        b.iter(|| {
            stream
                .iter()
                .map(|&byte| framer.push(std::hint::black_box(byte)))
                .last()
        })
    });
}

criterion_group!(
    benches,
    bench_v7_decode,
    bench_ss4_pair,
    bench_v3_bitmap_pair,
    bench_framer
);
criterion_main!(benches);
