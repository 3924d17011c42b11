//! Benchmark: per-element locked iteration vs snapshot-then-sum.

use std::time::Instant;

use tessera_core::Tensor;

fn bench_iter(t: &Tensor<f64, 3>, iters: usize) -> f64 {
    let start = Instant::now();
    for _ in 0..iters {
        let total: f64 = t.iter().map(|v| v.unwrap()).sum();
        std::hint::black_box(total);
    }
    start.elapsed().as_secs_f64() / iters as f64
}

fn bench_snapshot(t: &Tensor<f64, 3>, iters: usize) -> f64 {
    let start = Instant::now();
    for _ in 0..iters {
        let total: f64 = t.to_vec().iter().sum();
        std::hint::black_box(total);
    }
    start.elapsed().as_secs_f64() / iters as f64
}

fn main() {
    let t: Tensor<f64, 3> = Tensor::new([64, 64, 64]);
    for i in 0..t.size() {
        t.set(i, i as f64).unwrap();
    }

    let iters = 20;
    let locked = bench_iter(&t, iters);
    let snapshot = bench_snapshot(&t, iters);

    println!("elements:        {}", t.size());
    println!("locked iter:     {:.3} ms/iter", locked * 1e3);
    println!("snapshot + sum:  {:.3} ms/iter", snapshot * 1e3);
    println!("ratio:           {:.1}x", locked / snapshot);
}
