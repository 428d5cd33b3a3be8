use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use pprof::criterion::{Output, PProfProfiler};
use ssvep_core::{Canvas, Color, Rect, TriggerCode};
use ssvep_render::SkiaCanvas;
use ssvep_vsync::{SyncConfig, SyncPatch, SyncPatchEncoder};
use std::time::Duration;

const WIDTH: u32 = 1920;
const HEIGHT: u32 = 1080;

// Same cell layout as ssvep_stimulus::Checkerboard, kept local so this crate
// does not depend on ssvep-stimulus.
fn draw_board(canvas: &mut SkiaCanvas, nrows: usize, inverted: bool) {
    let bounds = canvas.bounds();
    let side = bounds.height() / nrows as f32;
    let left = -side * nrows as f32 / 2.0;
    for y in 0..nrows {
        for x in 0..nrows {
            let even = (x + y) % 2 == 0;
            let color = if even != inverted {
                Color::WHITE
            } else {
                Color::BLACK
            };
            let rect = Rect::from_origin_size(
                left + x as f32 * side,
                bounds.bottom + y as f32 * side,
                side,
                side,
            );
            canvas.draw_rect(rect, color);
        }
    }
}

pub fn bench_checkerboard_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    group
        .sample_size(40)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(2));

    for nrows in [8usize, 32, 64] {
        group.bench_function(format!("checkerboard_{nrows}"), |b| {
            let mut canvas = SkiaCanvas::for_resolution(WIDTH, HEIGHT, true).unwrap();
            let mut patch = SyncPatch::new(&SyncConfig::default(), canvas.bounds()).unwrap();
            patch.start_epoch(0.0, TriggerCode::new(13).unwrap());
            let mut inverted = false;
            b.iter(|| {
                canvas.clear(Color::NEUTRAL_GRAY);
                draw_board(&mut canvas, nrows, inverted);
                patch.render(&mut canvas);
                inverted = !inverted;
                black_box(canvas.data().len());
            });
        });
    }

    group.bench_function("copy_to_frame", |b| {
        b.iter_batched(
            || {
                let canvas = SkiaCanvas::for_resolution(WIDTH, HEIGHT, true).unwrap();
                let frame = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
                (canvas, frame)
            },
            |(canvas, mut frame)| {
                canvas.copy_to_frame(&mut frame).unwrap();
                black_box(frame);
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
        .confidence_level(0.95)
        .noise_threshold(0.02)
        .significance_level(0.05);
    targets = bench_checkerboard_frame
}
criterion_main!(benches);
