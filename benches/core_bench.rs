use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ecad_viewer::core::{BoardDocument, NetNumber, TrackSegment};
use ecad_viewer::parser::{parse_board, parse_sexpr};
use ecad_viewer::SpatialIndex;
use glam::Vec2;
use std::hint::black_box;

const DEMO_BOARD: &str = include_str!("../tests/fixtures/demo/demo.kicad_pcb");

fn bench_parsing(c: &mut Criterion) {
    c.bench_function("sexpr_parse_demo_board", |b| {
        b.iter(|| {
            let expr = parse_sexpr(black_box(DEMO_BOARD)).expect("S-Expression parse failed");
            black_box(expr)
        })
    });

    c.bench_function("board_parse_demo_board", |b| {
        b.iter(|| {
            let board = parse_board("demo.kicad_pcb", black_box(DEMO_BOARD)).expect("Board parse failed");
            black_box(board.segments.len())
        })
    });
}

/// Synthetisches Board mit einem Raster aus kurzen Segmenten.
fn build_synthetic_board(segment_count: usize) -> BoardDocument {
    let mut board = BoardDocument::new("synthetic.kicad_pcb");
    for index in 0..segment_count {
        let column = (index % 1000) as f32;
        let row = (index / 1000) as f32;
        let start = Vec2::new(column, row);
        board.segments.push(TrackSegment {
            start,
            end: start + Vec2::new(0.8, 0.0),
            width: 0.2,
            layer: if index % 2 == 0 { "F.Cu" } else { "B.Cu" }.to_string(),
            net: (index % 64) as NetNumber + 1,
            uuid: format!("seg-{index}"),
        });
    }
    board
}

fn build_query_points(count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let x = (i % 1000) as f32 + 0.37;
            let y = ((i * 7) % 1000) as f32 + 0.05;
            Vec2::new(x, y)
        })
        .collect()
}

fn bench_spatial_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_queries");

    for &segment_count in &[10_000usize, 100_000usize] {
        let board = build_synthetic_board(segment_count);
        let query_points = build_query_points(1024);

        group.bench_with_input(
            BenchmarkId::new("index_build", segment_count),
            &board,
            |b, board| b.iter(|| black_box(SpatialIndex::from_board(black_box(board)).len())),
        );

        let index = SpatialIndex::from_board(&board);
        group.bench_with_input(
            BenchmarkId::new("pick_batch", segment_count),
            &board,
            |b, board| {
                b.iter(|| {
                    let mut hits = 0usize;
                    for point in &query_points {
                        if index.pick_first(board, black_box(*point), 0.3).is_some() {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(core_benches, bench_parsing, bench_spatial_queries);
criterion_main!(core_benches);
