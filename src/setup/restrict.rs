//! Approximate ideal restriction (AIR).
//!
//! Each row of R couples one C-point to its strongly connected F-point
//! neighborhood. The weights solve a local dense least-squares system
//! assembled from the rows of A restricted to that neighborhood; the
//! C-point itself carries an identity entry placed last in the row.

use super::F_NODE;
use crate::error::Result;
use crate::linalg::least_squares;
use crate::sparse::CsrMatrix;
use rayon::prelude::*;

/// Couplings at or below this magnitude do not count as strong.
const STRENGTH_FLOOR: f64 = 1e-16;

/// Row-pointer pass for AIR.
///
/// `c_*` is the strength matrix whose pattern shapes R. A row keeps at
/// most `max_row` strong F-couplings; when a neighborhood is larger, the
/// weakest entries are zeroed in `c_data` in place so the fill pass
/// skips them too. `rowptr` must hold `cpts.len() + 1` entries.
pub fn approx_ideal_restriction_pass1(
    rowptr: &mut [usize],
    c_rowptr: &[usize],
    c_colinds: &[usize],
    c_data: &mut [f64],
    cpts: &[usize],
    splitting: &[u8],
    max_row: usize,
) {
    let mut nnz = 0;
    rowptr[0] = 0;

    for (row, &cpoint) in cpts.iter().enumerate() {
        // Strongly connected F-neighborhood as (position, value) pairs.
        let mut neighborhood: Vec<(usize, f64)> = Vec::new();
        for i in c_rowptr[cpoint]..c_rowptr[cpoint + 1] {
            if splitting[c_colinds[i]] == F_NODE && c_data[i].abs() > STRENGTH_FLOOR {
                neighborhood.push((i, c_data[i]));
            }
        }

        // Oversized neighborhoods drop their weakest couplings; strong
        // negative couplings sort first, so the tail past max_row goes.
        let size = neighborhood.len();
        if size > max_row {
            neighborhood.sort_by(|a, b| a.1.total_cmp(&b.1));
            for &(pos, _) in &neighborhood[max_row..] {
                c_data[pos] = 0.0;
            }
        }

        // One extra entry for the identity on the C-point itself.
        nnz += 1 + size.min(max_row);
        rowptr[row + 1] = nnz;
    }
}

/// Fill pass for AIR.
///
/// For each C-point row, assembles the dense neighborhood system
/// `A0 x = b0` with `A0[i][j] = A[N_f[j], N_f[i]]` (column-major) and
/// `b0[i] = A[cpoint, N_f[i]]`, solves it in the least-squares sense,
/// and appends the identity entry. Rows are filled in parallel.
pub fn approx_ideal_restriction_pass2(
    rowptr: &[usize],
    colinds: &mut [usize],
    data: &mut [f64],
    a_rowptr: &[usize],
    a_colinds: &[usize],
    a_data: &[f64],
    c_rowptr: &[usize],
    c_colinds: &[usize],
    c_data: &[f64],
    cpts: &[usize],
    splitting: &[u8],
) -> Result<()> {
    let rows: Vec<(Vec<usize>, Vec<f64>)> = cpts
        .par_iter()
        .enumerate()
        .map(|(row, &cpoint)| {
            build_row(
                row,
                cpoint,
                rowptr[row + 1] - rowptr[row],
                a_rowptr,
                a_colinds,
                a_data,
                c_rowptr,
                c_colinds,
                c_data,
                splitting,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    for (row, (cols, vals)) in rows.into_iter().enumerate() {
        let start = rowptr[row];
        colinds[start..start + cols.len()].copy_from_slice(&cols);
        data[start..start + vals.len()].copy_from_slice(&vals);
    }
    Ok(())
}

fn build_row(
    row: usize,
    cpoint: usize,
    expected: usize,
    a_rowptr: &[usize],
    a_colinds: &[usize],
    a_data: &[f64],
    c_rowptr: &[usize],
    c_colinds: &[usize],
    c_data: &[f64],
    splitting: &[u8],
) -> Result<(Vec<usize>, Vec<f64>)> {
    let mut cols: Vec<usize> = Vec::with_capacity(expected);
    for i in c_rowptr[cpoint]..c_rowptr[cpoint + 1] {
        if splitting[c_colinds[i]] == F_NODE && c_data[i].abs() > STRENGTH_FLOOR {
            cols.push(c_colinds[i]);
        }
    }

    let size_n = cols.len();
    if size_n + 1 != expected {
        tracing::error!(
            row,
            cpoint,
            "restriction row pointer does not agree with neighborhood size"
        );
    }

    // A0^T = A[N_f, N_f], stored column-major: column j of A0 is row
    // cols[j] of A restricted to the neighborhood columns.
    let mut a0 = vec![0.0f64; size_n * size_n];
    let mut idx = 0;
    for &this_ind in &cols {
        for &col in &cols {
            a0[idx] = entry(a_rowptr, a_colinds, a_data, this_ind, col);
            idx += 1;
        }
    }

    let mut b0 = vec![0.0f64; size_n];
    for (i, &col) in cols.iter().enumerate() {
        b0[i] = entry(a_rowptr, a_colinds, a_data, cpoint, col);
    }

    let mut x = vec![0.0f64; size_n];
    least_squares(&a0, &b0, &mut x, size_n, size_n, true)?;

    // Identity for the C-point closes the row.
    cols.push(cpoint);
    x.push(1.0);
    Ok((cols, x))
}

/// Value of A[row, col], zero when the entry is absent.
fn entry(a_rowptr: &[usize], a_colinds: &[usize], a_data: &[f64], row: usize, col: usize) -> f64 {
    for k in a_rowptr[row]..a_rowptr[row + 1] {
        if a_colinds[k] == col {
            return a_data[k];
        }
    }
    0.0
}

/// AIR over [`CsrMatrix`] inputs, allocating R (`cpts.len()` by n).
///
/// `c` is the strength matrix shaping the sparsity of R; truncating an
/// oversized neighborhood zeroes the dropped couplings in `c` in place.
/// Callers that need the original strength values must clone first.
pub fn approx_ideal_restriction(
    a: &CsrMatrix<f64>,
    c: &mut CsrMatrix<f64>,
    cpts: &[usize],
    splitting: &[u8],
    max_row: usize,
) -> Result<CsrMatrix<f64>> {
    let mut rowptr = vec![0usize; cpts.len() + 1];
    approx_ideal_restriction_pass1(
        &mut rowptr,
        &c.row_pointers,
        &c.col_indices,
        &mut c.values,
        cpts,
        splitting,
        max_row,
    );

    let nnz = rowptr[cpts.len()];
    let mut colinds = vec![0usize; nnz];
    let mut data = vec![0.0f64; nnz];
    approx_ideal_restriction_pass2(
        &rowptr,
        &mut colinds,
        &mut data,
        &a.row_pointers,
        &a.col_indices,
        &a.values,
        &c.row_pointers,
        &c.col_indices,
        &c.values,
        cpts,
        splitting,
    )?;

    Ok(CsrMatrix {
        nrows: cpts.len(),
        ncols: a.ncols,
        values: data,
        col_indices: colinds,
        row_pointers: rowptr,
    })
}
