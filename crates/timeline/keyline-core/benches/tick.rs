//! Per-tick traversal cost over trees of varying width.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keyline_core::{NodeId, NullSink, TickStep, Timeline};
use serde_json::json;

fn wheel_tree(tracks: usize) -> (Timeline, NodeId) {
    let mut tl = Timeline::new();
    let children: Vec<serde_json::Value> = (0..tracks)
        .map(|i| {
            json!({
                "prop": format!("p{i}"),
                "loop": true,
                "animate": {
                    "0": { "value": 0.0, "ease": "powerTwoOut" },
                    "600": 1.0,
                    "1200": 0.0
                }
            })
        })
        .collect();
    let root = tl
        .insert_value(json!({ "target": "wheel", "loop": true, "children": children }))
        .unwrap();
    tl.play(root, None).unwrap();
    (tl, root)
}

fn bench_tick(c: &mut Criterion) {
    for tracks in [4usize, 32, 256] {
        let (mut tl, root) = wheel_tree(tracks);
        let mut sink = NullSink;
        c.bench_function(&format!("tick/{tracks}_tracks"), |b| {
            b.iter(|| {
                tl.run(root, TickStep::new(black_box(16.0), 0.0), &mut sink)
                    .unwrap();
                tl.drain_effects();
            })
        });
    }
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
