//! Strength-of-connection filtering.
//!
//! The classical Ruge-Stuben test keeps an off-diagonal coupling when its
//! magnitude is at least `theta` times the largest off-diagonal magnitude
//! in its row. Values are copied through unchanged so downstream kernels
//! see the original couplings.

use crate::scalar::AmgScalar;
use crate::sparse::CsrMatrix;

/// Classical strength filter over flat CSR arrays.
///
/// An off-diagonal entry (i, j) is admitted iff
/// `|A[i,j]| >= theta * max_{k != i} |A[i,k]|`; the diagonal is always
/// admitted when present. Entry order within a row follows A. Output
/// slices must be preallocated to at least nnz(A); returns the number of
/// nonzeros written.
pub fn classical_strength_kernel<T: AmgScalar>(
    n_row: usize,
    theta: f64,
    ap: &[usize],
    aj: &[usize],
    ax: &[T],
    sp: &mut [usize],
    sj: &mut [usize],
    sx: &mut [T],
) -> usize {
    let mut nnz = 0;
    sp[0] = 0;

    for i in 0..n_row {
        let row_start = ap[i];
        let row_end = ap[i + 1];

        let mut max_offdiagonal = f64::NEG_INFINITY;
        for jj in row_start..row_end {
            if aj[jj] != i {
                max_offdiagonal = max_offdiagonal.max(ax[jj].norm());
            }
        }

        let threshold = theta * max_offdiagonal;
        for jj in row_start..row_end {
            if aj[jj] == i {
                // Always keep the diagonal
                sj[nnz] = aj[jj];
                sx[nnz] = ax[jj];
                nnz += 1;
            } else if ax[jj].norm() >= threshold {
                sj[nnz] = aj[jj];
                sx[nnz] = ax[jj];
                nnz += 1;
            }
        }
        sp[i + 1] = nnz;
    }
    nnz
}

/// Strength filter over a [`CsrMatrix`], allocating the output.
pub fn classical_strength<T: AmgScalar>(theta: f64, a: &CsrMatrix<T>) -> CsrMatrix<T> {
    let n = a.nrows;
    let mut sp = vec![0usize; n + 1];
    let mut sj = vec![0usize; a.nnz()];
    let mut sx = vec![T::zero(); a.nnz()];

    let nnz = classical_strength_kernel(
        n,
        theta,
        &a.row_pointers,
        &a.col_indices,
        &a.values,
        &mut sp,
        &mut sj,
        &mut sx,
    );
    sj.truncate(nnz);
    sx.truncate(nnz);

    CsrMatrix {
        nrows: n,
        ncols: a.ncols,
        values: sx,
        col_indices: sj,
        row_pointers: sp,
    }
}

/// Per-row maximum magnitude over flat CSR arrays, diagonal included.
///
/// Rows without entries report negative infinity. `x` must hold `n_row`
/// entries.
pub fn maximum_row_value_kernel<T: AmgScalar>(n_row: usize, ap: &[usize], ax: &[T], x: &mut [f64]) {
    for i in 0..n_row {
        let mut max_entry = f64::NEG_INFINITY;
        for jj in ap[i]..ap[i + 1] {
            max_entry = max_entry.max(ax[jj].norm());
        }
        x[i] = max_entry;
    }
}

/// Per-row maximum magnitude of a [`CsrMatrix`], diagonal included.
pub fn maximum_row_value<T: AmgScalar>(a: &CsrMatrix<T>) -> Vec<f64> {
    let mut x = vec![f64::NEG_INFINITY; a.nrows];
    maximum_row_value_kernel(a.nrows, &a.row_pointers, &a.values, &mut x);
    x
}
