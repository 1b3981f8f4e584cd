//! Benchmark für den Render-Hotpath.
//!
//! Misst die Kosten pro Frame bzw. pro Board-Load:
//! - paint_static: statischer Paint aller Layer (einmal pro Load)
//! - draw: dynamischer Netznamen-Pass (pro Frame, zoomabhängig)
//! - highlight_net: Neuaufbau der Overlay-Layer beim Net-Fokus

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ecad_viewer::core::BoardDocument;
use ecad_viewer::parser::parse_board;
use ecad_viewer::{BoardRenderer, Camera2D, RenderScene, ViewerOptions};
use glam::Vec2;
use std::hint::black_box;
use std::sync::Arc;

const DEMO_BOARD: &str = include_str!("../tests/fixtures/demo/demo.kicad_pcb");

/// Demo-Board, dessen Leiterbahnen in einem Raster vervielfacht werden.
fn build_tiled_board(tiles: usize) -> Arc<BoardDocument> {
    let mut board = parse_board("demo.kicad_pcb", DEMO_BOARD).expect("Demo-Board parsebar");
    let template = board.segments.clone();
    for tile in 1..tiles {
        let offset = Vec2::new((tile % 32) as f32 * 70.0, (tile / 32) as f32 * 50.0);
        board.segments.extend(template.iter().map(|seg| {
            let mut seg = seg.clone();
            seg.start += offset;
            seg.end += offset;
            seg.uuid = format!("{}-{tile}", seg.uuid);
            seg
        }));
    }
    Arc::new(board)
}

fn scene_at(center: Vec2, zoom: f32) -> RenderScene {
    let mut camera = Camera2D::new();
    camera.center = center;
    camera.zoom = zoom;
    RenderScene::new(camera, [1280.0, 800.0])
}

fn bench_paint_static(c: &mut Criterion) {
    let options = ViewerOptions::default();
    let mut group = c.benchmark_group("paint_static");

    for &tiles in &[1usize, 64, 1024] {
        let board = build_tiled_board(tiles);
        group.bench_with_input(BenchmarkId::new("tiles", tiles), &board, |b, board| {
            b.iter(|| {
                let mut renderer = BoardRenderer::new(Arc::clone(board), &options);
                renderer.paint_static();
                black_box(renderer.is_painted())
            })
        });
    }

    group.finish();
}

fn bench_dynamic_labels(c: &mut Criterion) {
    let options = ViewerOptions::default();
    let mut group = c.benchmark_group("dynamic_labels");

    for &tiles in &[1usize, 64, 1024] {
        let mut renderer = BoardRenderer::new(build_tiled_board(tiles), &options);
        renderer.paint_static();

        for &zoom in &[5.0f32, 60.0] {
            let scene = scene_at(Vec2::new(10.0, 20.0), zoom);
            group.bench_with_input(
                BenchmarkId::new(format!("zoom_{zoom}"), tiles),
                &scene,
                |b, scene| {
                    b.iter(|| {
                        let stats = renderer.draw(black_box(scene));
                        black_box(stats.track_labels)
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_net_focus(c: &mut Criterion) {
    let options = ViewerOptions::default();
    let mut renderer = BoardRenderer::new(build_tiled_board(256), &options);
    renderer.paint_static();

    c.bench_function("highlight_and_clear_net", |b| {
        b.iter(|| {
            let changed = renderer.highlight_net(black_box(2));
            renderer.clear_net_focus();
            renderer.drain_events();
            black_box(changed)
        })
    });
}

criterion_group!(
    render_hotpath_benches,
    bench_paint_static,
    bench_dynamic_labels,
    bench_net_focus
);
criterion_main!(render_hotpath_benches);
