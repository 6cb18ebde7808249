//! CLJP coarse/fine splitting.
//!
//! Parallel-style maximum-independent-set coarsening in the manner of
//! Cleary, Luby, Jones, and Plassmann. Every node carries a weight; each
//! round promotes the undecided nodes whose weight is a local maximum
//! over S and S^T to C-points, then prunes graph edges and demotes nodes
//! whose remaining weight drops below one.

use super::coloring::vertex_coloring_mis;
use super::{C_NODE, F_NODE, U_NODE};
use crate::sparse::CsrMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed seed for the random weight draw. StdRng stands in for the
/// platform generator; runs on one platform are reproducible.
const WEIGHT_SEED: u64 = 2448422;

/// CLJP splitting over flat CSR arrays.
///
/// `sp`/`sj` hold the strength graph S, `tp`/`tj` its transpose. When
/// `colorflag` is set, weights seed from a greedy MIS coloring of S;
/// otherwise from a fixed-seed uniform draw in [0, 1). On return every
/// entry of `splitting` is `F_NODE` or `C_NODE`.
pub fn cljp_naive_splitting_kernel(
    n: usize,
    sp: &[usize],
    sj: &[usize],
    tp: &[usize],
    tj: &[usize],
    splitting: &mut [u8],
    colorflag: bool,
) {
    let nnz = sp[n];
    let mut edgemark = vec![1i32; nnz];
    let mut weight = vec![0f64; n];
    let mut c_dep_cache = vec![usize::MAX; n];
    let mut unassigned = n;

    splitting[..n].fill(U_NODE);

    if colorflag {
        let (coloring, ncolors) = vertex_coloring_mis(n, sp, sj);
        for i in 0..n {
            weight[i] = coloring[i] as f64 / ncolors as f64;
        }
    } else {
        let mut rng = StdRng::seed_from_u64(WEIGHT_SEED);
        for w in weight.iter_mut() {
            *w = rng.gen::<f64>();
        }
    }

    // On top of the tie-break fraction, each node's weight counts how
    // many nodes it influences.
    for i in 0..n {
        for jj in sp[i]..sp[i + 1] {
            let j = sj[jj];
            if i != j {
                weight[j] += 1.0;
            }
        }
    }

    let mut selected: Vec<usize> = Vec::with_capacity(n);

    while unassigned > 0 {
        // Select the independent set: undecided nodes whose weight beats
        // every undecided neighbor over both S and S^T.
        selected.clear();
        for i in 0..n {
            if splitting[i] != U_NODE {
                continue;
            }
            let mut local_max = true;
            for jj in sp[i]..sp[i + 1] {
                let j = sj[jj];
                if splitting[j] == U_NODE && weight[j] > weight[i] {
                    local_max = false;
                    break;
                }
            }
            if local_max {
                for jj in tp[i]..tp[i + 1] {
                    let j = tj[jj];
                    if splitting[j] == U_NODE && weight[j] > weight[i] {
                        local_max = false;
                        break;
                    }
                }
            }
            if local_max {
                selected.push(i);
                unassigned -= 1;
            }
        }
        for &c in &selected {
            splitting[c] = C_NODE;
        }

        // P5: a neighbor that influences a new C-point is a worse C
        // candidate; remove the edge and charge its weight.
        for &c in &selected {
            for jj in sp[c]..sp[c + 1] {
                let j = sj[jj];
                if splitting[j] == U_NODE && edgemark[jj] != 0 {
                    edgemark[jj] = 0;
                    weight[j] -= 1.0;
                    if weight[j] < 1.0 {
                        splitting[j] = F_NODE;
                        unassigned -= 1;
                    }
                }
            }
        }

        // P6: if j and k both depend on the new C-point and j influences
        // k, the edge (j, k) no longer argues for keeping k coarse.
        for &c in &selected {
            for jj in tp[c]..tp[c + 1] {
                let j = tj[jj];
                if splitting[j] == U_NODE {
                    c_dep_cache[j] = c;
                }
            }
            for jj in tp[c]..tp[c + 1] {
                let j = tj[jj];
                for kk in sp[j]..sp[j + 1] {
                    let k = sj[kk];
                    if splitting[k] == U_NODE && edgemark[kk] != 0 && c_dep_cache[k] == c {
                        edgemark[kk] = 0;
                        weight[k] -= 1.0;
                        if weight[k] < 1.0 {
                            splitting[k] = F_NODE;
                            unassigned -= 1;
                        }
                    }
                }
            }
        }
    }

    for s in splitting[..n].iter_mut() {
        if *s == U_NODE {
            *s = F_NODE;
        }
    }

    tracing::debug!(
        pruned = edgemark.iter().filter(|&&e| e == 0).count(),
        total = nnz,
        "cljp edge pruning finished"
    );
}

/// CLJP splitting over a strength graph and its transpose, returning one
/// label per node.
pub fn cljp_naive_splitting<T>(
    s: &CsrMatrix<T>,
    t: &CsrMatrix<T>,
    colorflag: bool,
) -> Vec<u8> {
    let n = s.nrows;
    let mut splitting = vec![U_NODE; n];
    cljp_naive_splitting_kernel(
        n,
        &s.row_pointers,
        &s.col_indices,
        &t.row_pointers,
        &t.col_indices,
        &mut splitting,
        colorflag,
    );
    splitting
}
