//! Ruge-Stuben interpolation operators.
//!
//! Both interpolators build P in two passes over the strength graph: the
//! first sizes each row, the second fills the weights and remaps column
//! indices onto the coarse grid. C-points interpolate by injection;
//! F-points interpolate from their strongly connected C-neighbors.

use super::{coarse_index_map, num_coarse, C_NODE, F_NODE};
use crate::scalar::AmgScalar;
use crate::sparse::CsrMatrix;

/// Row-pointer pass shared by direct and standard interpolation.
///
/// A C-point row carries a single injection entry, an F-point row one
/// entry per strong off-diagonal C-neighbor. `bp` must hold
/// `n_nodes + 1` entries.
pub fn rs_interpolation_pass1(
    n_nodes: usize,
    sp: &[usize],
    sj: &[usize],
    splitting: &[u8],
    bp: &mut [usize],
) {
    let mut nnz = 0;
    bp[0] = 0;
    for i in 0..n_nodes {
        if splitting[i] == C_NODE {
            nnz += 1;
        } else {
            for jj in sp[i]..sp[i + 1] {
                if splitting[sj[jj]] == C_NODE && sj[jj] != i {
                    nnz += 1;
                }
            }
        }
        bp[i + 1] = nnz;
    }
}

/// Fill pass for direct interpolation.
///
/// For an F-point i the weight on a strong C-neighbor j is
/// `-alpha * a_ij / a_ii` for negative couplings and `-beta * a_ij / a_ii`
/// for positive ones, where alpha and beta scale the full off-diagonal
/// row mass onto the strong C-neighbors of matching sign. A zero sum in
/// a denominator is left to propagate.
pub fn rs_direct_interpolation_pass2<T: AmgScalar>(
    n_nodes: usize,
    ap: &[usize],
    aj: &[usize],
    ax: &[T],
    sp: &[usize],
    sj: &[usize],
    sx: &[T],
    splitting: &[u8],
    bp: &[usize],
    bj: &mut [usize],
    bx: &mut [T],
) {
    for i in 0..n_nodes {
        if splitting[i] == C_NODE {
            bj[bp[i]] = i;
            bx[bp[i]] = T::one();
            continue;
        }

        let mut sum_strong_pos = T::zero();
        let mut sum_strong_neg = T::zero();
        for jj in sp[i]..sp[i + 1] {
            if splitting[sj[jj]] == C_NODE && sj[jj] != i {
                if sx[jj].re() < 0.0 {
                    sum_strong_neg += sx[jj];
                } else {
                    sum_strong_pos += sx[jj];
                }
            }
        }

        let mut sum_all_pos = T::zero();
        let mut sum_all_neg = T::zero();
        let mut diag = T::zero();
        for jj in ap[i]..ap[i + 1] {
            if aj[jj] == i {
                diag += ax[jj];
            } else if ax[jj].re() < 0.0 {
                sum_all_neg += ax[jj];
            } else {
                sum_all_pos += ax[jj];
            }
        }

        let alpha = sum_all_neg / sum_strong_neg;
        let mut beta = sum_all_pos / sum_strong_pos;

        // No strong positive couplings: fold the positive mass into the
        // diagonal instead.
        if sum_strong_pos == T::zero() {
            diag += sum_all_pos;
            beta = T::zero();
        }

        let neg_coeff = -alpha / diag;
        let pos_coeff = -beta / diag;

        let mut nnz = bp[i];
        for jj in sp[i]..sp[i + 1] {
            if splitting[sj[jj]] == C_NODE && sj[jj] != i {
                bj[nnz] = sj[jj];
                bx[nnz] = if sx[jj].re() < 0.0 {
                    neg_coeff * sx[jj]
                } else {
                    pos_coeff * sx[jj]
                };
                nnz += 1;
            }
        }
    }

    remap_to_coarse(n_nodes, splitting, bp, bj);
}

/// Fill pass for standard interpolation.
///
/// Strongly connected F-neighbors are eliminated through their own
/// couplings to the strong C-set of the row; weak connections are lumped
/// into the diagonal. Zero denominators are reported through the logger
/// and left to propagate.
pub fn rs_standard_interpolation_pass2<T: AmgScalar>(
    n_nodes: usize,
    ap: &[usize],
    aj: &[usize],
    ax: &[T],
    sp: &[usize],
    sj: &[usize],
    sx: &[T],
    splitting: &[u8],
    bp: &[usize],
    bj: &mut [usize],
    bx: &mut [T],
) {
    for i in 0..n_nodes {
        if splitting[i] == C_NODE {
            bj[bp[i]] = i;
            bx[bp[i]] = T::one();
            continue;
        }

        // denominator = a_ii + sum over weak connections of a_im
        let mut denominator = T::zero();
        for mm in ap[i]..ap[i + 1] {
            denominator += ax[mm];
        }
        for mm in sp[i]..sp[i + 1] {
            if sj[mm] != i {
                denominator = denominator - sx[mm];
            }
        }

        let mut nnz = bp[i];
        for jj in sp[i]..sp[i + 1] {
            let j = sj[jj];
            if splitting[j] != C_NODE || j == i {
                continue;
            }
            bj[nnz] = j;

            let mut numerator = sx[jj];

            // Eliminate each strongly connected F-point through its own
            // couplings to the strong C-set of row i.
            for kk in sp[i]..sp[i + 1] {
                let k = sj[kk];
                if splitting[k] != F_NODE || k == i {
                    continue;
                }

                let a_kj = find_entry(ap, aj, ax, k, j);
                if a_kj == T::zero() {
                    continue;
                }

                let mut inner_denominator = T::zero();
                let mut added_to = false;
                for ll in sp[i]..sp[i + 1] {
                    let l = sj[ll];
                    if splitting[l] != C_NODE || l == i {
                        continue;
                    }
                    for search_ind in ap[k]..ap[k + 1] {
                        // a_kl counts only when it matches the sign of a_kj.
                        if aj[search_ind] == l && (a_kj * ax[search_ind]).re() > 0.0 {
                            added_to = true;
                            inner_denominator += ax[search_ind];
                        }
                    }
                }

                if inner_denominator == T::zero() {
                    if added_to {
                        tracing::warn!(
                            row = i,
                            fine = k,
                            "standard interpolation: inner denominator cancelled to zero"
                        );
                    } else {
                        tracing::warn!(
                            row = i,
                            fine = k,
                            "standard interpolation: strong F-point has no same-sign \
                             connection to the strong C-set"
                        );
                    }
                }
                numerator += sx[kk] * a_kj / inner_denominator;
            }

            if denominator == T::zero() {
                tracing::warn!(
                    row = i,
                    "standard interpolation: diagonal plus weak connections sums to zero"
                );
            }
            bx[nnz] = -numerator / denominator;
            nnz += 1;
        }
    }

    remap_to_coarse(n_nodes, splitting, bp, bj);
}

/// Replace fine column indices with coarse-grid column indices.
fn remap_to_coarse(n_nodes: usize, splitting: &[u8], bp: &[usize], bj: &mut [usize]) {
    let map = coarse_index_map(&splitting[..n_nodes]);
    for col in bj[..bp[n_nodes]].iter_mut() {
        *col = map[*col];
    }
}

/// Value of A[row, col], zero when the entry is absent.
fn find_entry<T: AmgScalar>(ap: &[usize], aj: &[usize], ax: &[T], row: usize, col: usize) -> T {
    let mut val = T::zero();
    for search_ind in ap[row]..ap[row + 1] {
        if aj[search_ind] == col {
            val = ax[search_ind];
        }
    }
    val
}

/// Direct interpolation over [`CsrMatrix`] inputs, allocating P.
pub fn direct_interpolation<T: AmgScalar>(
    a: &CsrMatrix<T>,
    s: &CsrMatrix<T>,
    splitting: &[u8],
) -> CsrMatrix<T> {
    build_interpolation(a, s, splitting, rs_direct_interpolation_pass2)
}

/// Standard interpolation over [`CsrMatrix`] inputs, allocating P.
pub fn standard_interpolation<T: AmgScalar>(
    a: &CsrMatrix<T>,
    s: &CsrMatrix<T>,
    splitting: &[u8],
) -> CsrMatrix<T> {
    build_interpolation(a, s, splitting, rs_standard_interpolation_pass2)
}

type Pass2Fn<T> = fn(
    usize,
    &[usize],
    &[usize],
    &[T],
    &[usize],
    &[usize],
    &[T],
    &[u8],
    &[usize],
    &mut [usize],
    &mut [T],
);

fn build_interpolation<T: AmgScalar>(
    a: &CsrMatrix<T>,
    s: &CsrMatrix<T>,
    splitting: &[u8],
    pass2: Pass2Fn<T>,
) -> CsrMatrix<T> {
    let n = a.nrows;
    let mut bp = vec![0usize; n + 1];
    rs_interpolation_pass1(n, &s.row_pointers, &s.col_indices, splitting, &mut bp);

    let nnz = bp[n];
    let mut bj = vec![0usize; nnz];
    let mut bx = vec![T::zero(); nnz];
    pass2(
        n,
        &a.row_pointers,
        &a.col_indices,
        &a.values,
        &s.row_pointers,
        &s.col_indices,
        &s.values,
        splitting,
        &bp,
        &mut bj,
        &mut bx,
    );

    CsrMatrix {
        nrows: n,
        ncols: num_coarse(splitting),
        values: bx,
        col_indices: bj,
        row_pointers: bp,
    }
}
