//! Partition a big tensor's flat index range across threads and combine
//! partial sums. Each worker only holds range iterators, which take the
//! shared lock per element read, so all workers run concurrently.
//!
//! Run with: cargo run --release -p tessera-core --example partial_sums

use tessera_core::Tensor;

fn main() {
    let threads = 8;
    let t: Tensor<f64, 4> = Tensor::new([32, 32, 32, 32]);
    let size = t.size();
    for i in 0..size {
        t.set(i, i as f64).unwrap();
    }

    let mut partials = vec![0.0f64; threads];
    let chunk = size / threads;

    std::thread::scope(|s| {
        for (worker, slot) in partials.iter_mut().enumerate() {
            let t = &t;
            s.spawn(move || {
                let start = worker * chunk;
                let end = if worker == threads - 1 { size } else { start + chunk };
                let it = t.iter_range(start, end).expect("range within size");
                *slot = it.map(|v| v.expect("no mutation while summing")).sum();
                println!("partial sum [{start}..{end}) = {slot}");
            });
        }
    });

    let total: f64 = partials.iter().sum();
    let expected = (size * (size - 1)) as f64 / 2.0;
    println!("total = {total} (expected {expected})");
}
