use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use decoders::{
    legacy_relu, maxout_output, mlp_output, nonlinear_output, OutputProjection, StepInput,
};

fn bench_output_projections(c: &mut Criterion) {
    let device = Device::Cpu;
    let batch = 64usize;
    let rnn_size = 512usize;
    let embedding_size = 256usize;
    let ctx_size = 512usize;

    let variants: Vec<(&str, OutputProjection)> = vec![
        ("legacy_relu", legacy_relu(rnn_size).expect("legacy relu")),
        ("nonlinear", nonlinear_output(rnn_size, None).expect("nonlinear")),
        ("maxout", maxout_output(500).expect("maxout")),
        ("mlp", mlp_output(vec![1000, 500], None, None).expect("mlp")),
    ];

    let state = Tensor::randn(0f32, 1.0, (batch, rnn_size), &device).expect("state");
    let output = Tensor::randn(0f32, 1.0, (batch, embedding_size), &device).expect("output");
    let mut group = c.benchmark_group("output_projection");
    for ctx_count in [1usize, 2] {
        let ctx: Vec<Tensor> = (0..ctx_count)
            .map(|_| Tensor::randn(0f32, 1.0, (batch, ctx_size), &device).expect("ctx"))
            .collect();
        for (label, projection) in &variants {
            let varmap = VarMap::new();
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            group.throughput(Throughput::Elements(batch as u64));
            group.bench_with_input(
                BenchmarkId::new(*label, ctx_count),
                projection,
                |b, projection| {
                    b.iter(|| {
                        let input = StepInput::new(&state, &output, &ctx);
                        let out = projection
                            .project(black_box(&input), &vb)
                            .expect("forward");
                        black_box(out);
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_output_projections);
criterion_main!(benches);
