//! Rendering cost per message, independent of the transport.
//!
//! Output goes to `io::sink()` so only the renderer's own work is measured.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io;
use subtester::prelude::*;

const PAYLOAD_SIZES: &[usize] = &[16, 256, 4096, 65536];

fn frames_for(size: usize) -> Vec<Frame> {
    Frame::split_multipart([Bytes::from_static(b"STATUS"), Bytes::from(vec![b'x'; size])])
}

fn frame_renderer(c: &mut Criterion) {
    subtester::dev_tracing::init_tracing();
    let mut group = c.benchmark_group("render/frames");

    for &size in PAYLOAD_SIZES {
        let frames = frames_for(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &frames, |b, frames| {
            let mut renderer = FrameRenderer::new();
            let mut sink = io::sink();
            b.iter(|| {
                for frame in frames {
                    black_box(renderer.render_frame(frame, &mut sink).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn envelope_renderer(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/envelope");

    for &size in PAYLOAD_SIZES {
        let frames = frames_for(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &frames, |b, frames| {
            let mut renderer = EnvelopeRenderer::new();
            let mut sink = io::sink();
            b.iter(|| {
                for frame in frames {
                    black_box(renderer.render_frame(frame, &mut sink).unwrap());
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, frame_renderer, envelope_renderer);
criterion_main!(benches);
