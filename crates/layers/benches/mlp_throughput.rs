use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use layers::{
    activations::{builtin, ActivationKind},
    maxout::{maxout, DEFAULT_POOL_SIZE},
    mlp::{multilayer_projection, MultilayerConfig},
};

fn bench_mlp(c: &mut Criterion) {
    let device = Device::Cpu;
    let batch = 32usize;
    let input_dim = 1024usize;
    let variants: &[(&str, &[usize], ActivationKind)] = &[
        ("tanh", &[500], ActivationKind::Tanh),
        ("tanh", &[1000, 500], ActivationKind::Tanh),
        ("relu", &[1000, 1000, 500], ActivationKind::Relu),
    ];

    let mut group = c.benchmark_group("mlp");
    for &(label, sizes, activation) in variants {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let config = MultilayerConfig {
            layer_sizes: sizes.to_vec(),
            activation: builtin(activation),
            dropout_keep_prob: 1.0,
        };
        let input = Tensor::randn(0f32, 1.0, (batch, input_dim), &device).expect("input");
        group.throughput(Throughput::Elements((batch * input_dim) as u64));
        group.bench_with_input(
            BenchmarkId::new(label, sizes.len()),
            &(config, input),
            |b, (config, input)| {
                b.iter(|| {
                    let out = multilayer_projection(black_box(input), config, false, vb.pp("mlp"))
                        .expect("forward");
                    black_box(out);
                });
            },
        );
    }
    group.finish();

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let input = Tensor::randn(0f32, 1.0, (batch, input_dim), &device).expect("input");
    c.bench_function("maxout/500", |b| {
        b.iter(|| {
            let out = maxout(black_box(&input), 500, DEFAULT_POOL_SIZE, vb.pp("maxout"))
                .expect("forward");
            black_box(out);
        });
    });
}

criterion_group!(benches, bench_mlp);
criterion_main!(benches);
