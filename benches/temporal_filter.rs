use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use temporal_reprojection::frame::FrameInfo;
use temporal_reprojection::scenes::{create_scene, SceneKind};
use temporal_reprojection::{BlendParameters, FilterConfig, Frame, TemporalFilter};

const SIZE: u32 = 256;
const DT: f32 = 1.0 / 60.0;

fn scene_frames(kind: SceneKind, count: u64) -> Vec<Frame> {
    let scene = create_scene(kind, SIZE, SIZE, 0.05);
    (0..count)
        .map(|n| scene.render(&FrameInfo::new(n, n as f32 * DT, DT)).unwrap().frame)
        .collect()
}

/// Steady-state update ticks, with and without the 3x3 depth search
fn bench_update_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_tick");
    let frames = scene_frames(SceneKind::MovingBox, 8);

    for neighbor_search in [false, true] {
        let params = BlendParameters::default()
            .with_sample_interval(i32::MAX)
            .with_neighbor_search(neighbor_search);
        let label = if neighbor_search { "neighbor_search" } else { "direct" };

        group.bench_with_input(BenchmarkId::new(label, SIZE), &params, |b, params| {
            let mut filter = TemporalFilter::new(FilterConfig::default());
            filter.tick(&frames[0], params).unwrap();
            let mut i = 1;
            b.iter(|| {
                let out = filter.tick(black_box(&frames[i % frames.len()]), params).unwrap();
                i += 1;
                black_box(out.report.blend.mean_confidence)
            });
        });
    }

    group.finish();
}

fn bench_reset_tick(c: &mut Criterion) {
    let frames = scene_frames(SceneKind::Static, 1);
    let params = BlendParameters::default().with_sample_interval(1);
    let mut filter = TemporalFilter::new(FilterConfig::default());

    c.bench_function("reset_tick_256", |b| {
        b.iter(|| {
            let out = filter.tick(black_box(&frames[0]), &params).unwrap();
            black_box(out.image.id())
        });
    });
}

criterion_group!(benches, bench_update_tick, bench_reset_tick);
criterion_main!(benches);
