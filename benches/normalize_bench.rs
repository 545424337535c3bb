use criterion::{Criterion, criterion_group, criterion_main};
use framenorm::normalize::{DegeneratePolicy, normalize_frame};
use framenorm::pipeline::{Pipeline, PipelineConfig};
use framenorm::render::{FrameSink, OutputWriteError};
use ndarray::{Array2, Array3};
use std::hint::black_box;

/// Discards rendered images so the pipeline benchmark measures compute, not disk
struct DiscardSink;

impl FrameSink for DiscardSink {
    fn write(&self, _frame_index: usize, rendered: &[u8]) -> Result<(), OutputWriteError> {
        black_box(rendered);
        Ok(())
    }
}

fn synthetic_frames(frames: usize, rows: usize, cols: usize) -> Array3<f64> {
    Array3::from_shape_fn((frames, rows, cols), |(f, r, c)| {
        ((r * 31 + c * 17 + f * 7) % 4096) as f64
    })
}

// ============================================================================
// COMPONENT-LEVEL BENCHMARKS
// ============================================================================

/// Single-frame normalization (pure compute)
fn bench_normalize_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_frame");

    let frame = Array2::from_shape_fn((480, 640), |(r, c)| ((r * 640 + c) % 4096) as f64);

    group.bench_function("vga_f64", |b| {
        b.iter(|| {
            normalize_frame(black_box(frame.view().into_dyn()), DegeneratePolicy::Reject).unwrap()
        });
    });

    group.finish();
}

// ============================================================================
// PIPELINE BENCHMARKS
// ============================================================================

/// Full run including PNG encoding, across worker counts
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    let input = synthetic_frames(32, 240, 320);

    for workers in [1usize, 4] {
        let pipeline = Pipeline::new(PipelineConfig::new(workers).unwrap());
        group.bench_function(format!("32x240x320_w{workers}"), |b| {
            b.iter(|| {
                let output = pipeline.run(black_box(input.view().into_dyn()), &DiscardSink).unwrap();
                black_box(output);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize_frame, bench_pipeline);

criterion_main!(benches);
