//! Dense least-squares solve for the local restriction systems.
//!
//! Wraps faer's SVD so that rank-deficient neighborhoods receive the
//! minimum-norm solution instead of a breakdown.

use crate::error::{CoarsenError, Result};
use faer::Mat;

/// Solve min ||A*x - b|| for a dense m x n matrix stored in a flat slice.
///
/// `a` is column-major when `is_col_major` is set, row-major otherwise.
/// The solution is written into `x[..n]`. When A is rank deficient the
/// minimum-norm solution is returned.
pub fn least_squares(
    a: &[f64],
    b: &[f64],
    x: &mut [f64],
    m: usize,
    n: usize,
    is_col_major: bool,
) -> Result<()> {
    if m == 0 || n == 0 {
        return Ok(());
    }

    let a_mat = Mat::<f64>::from_fn(m, n, |i, j| {
        if is_col_major {
            a[j * m + i]
        } else {
            a[i * n + j]
        }
    });
    let rhs = Mat::<f64>::from_fn(m, 1, |i, _| b[i]);

    let svd = a_mat
        .as_ref()
        .svd()
        .map_err(|e| CoarsenError::Restriction(format!("SVD failed: {e:?}")))?;
    let pinv = svd.pseudoinverse();
    let sol = &pinv * &rhs;

    for i in 0..n {
        x[i] = sol[(i, 0)];
    }
    Ok(())
}
