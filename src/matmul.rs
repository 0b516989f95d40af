//! Dense GEMM kernel behind `Matrix::matmul`.
//!
//! A plain triple loop over row-major buffers. Each output cell is the dot
//! product of one row of `a` and one column of `b`, accumulated left to right.

/// `c = a * b` where `a` is `(m, k)`, `b` is `(k, n)` and `c` is `(m, n)`, all row-major.
///
/// Callers validate shapes; the kernel only checks them in debug builds.
#[inline]
pub(crate) fn gemm_f64(m: usize, n: usize, k: usize, a: &[f64], b: &[f64], c: &mut [f64]) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    for i in 0..m {
        let row = &a[i * k..(i + 1) * k];
        for j in 0..n {
            let mut acc = 0.0_f64;
            for (p, &av) in row.iter().enumerate() {
                acc += av * b[p * n + j];
            }
            c[i * n + j] = acc;
        }
    }
}
