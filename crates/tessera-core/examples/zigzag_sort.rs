//! Fill a 10x10 matrix with a ramp, then sort each row — ascending for even
//! rows, descending for odd ones — through the public accessors only.
//!
//! Run with: cargo run -p tessera-core --example zigzag_sort

use tessera_core::Matrix;

fn main() {
    let m: Matrix<i64> = Matrix::new([10, 10]);
    let [rows, cols] = m.dimensions();

    for i in 0..m.size() {
        m.set(i, i as i64).unwrap();
    }
    println!("{m}");

    // Pull each row out through coordinate access, sort, write back.
    for row in 0..rows {
        let mut values: Vec<i64> = (0..cols)
            .map(|col| m.at([col, row]).expect("in range"))
            .collect();
        if row % 2 == 0 {
            values.sort_unstable();
        } else {
            values.sort_unstable_by(|a, b| b.cmp(a));
        }
        for (col, v) in values.into_iter().enumerate() {
            m.set_at([col, row], v).expect("in range");
        }
    }

    println!("{m}");
}
