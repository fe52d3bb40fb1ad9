use candle_core::Device;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use promptix_core::{EdgeList, Graph, GraphBatch, RngState};
use promptix_nn::{CrossPrune, HeavyPrompt};

fn bench_fusion(c: &mut Criterion) {
    // 64 rings of 30 nodes, 16-dim features
    let graphs: Vec<Graph> = (0..64)
        .map(|g| {
            let x = Array2::from_shape_fn((30, 16), |(i, j)| ((g + i * j) % 7) as f32 / 7.0 - 0.5);
            let edges: EdgeList = (0..30).map(|i| (i, (i + 1) % 30)).collect();
            Graph::new(x, edges, None).unwrap()
        })
        .collect();
    let batch = GraphBatch::from_graphs(&graphs).unwrap();

    let mut rng = RngState::seed_everything(42);
    let threshold =
        HeavyPrompt::new(16, 10, CrossPrune::Threshold(0.5), 0.3, &Device::Cpu, &mut rng).unwrap();
    let top_k = HeavyPrompt::new(16, 10, CrossPrune::TopK(3), 0.3, &Device::Cpu, &mut rng).unwrap();

    c.bench_function("fuse_64_rings_threshold", |b| {
        b.iter(|| threshold.forward(black_box(&batch)))
    });
    c.bench_function("fuse_64_rings_top_k", |b| {
        b.iter(|| top_k.forward(black_box(&batch)))
    });
}

criterion_group!(benches, bench_fusion);
criterion_main!(benches);
