//! Ruge-Stuben coarse/fine splitting.
//!
//! First-pass coarsening with a priority-bucket queue. The priority of a
//! node starts as the number of nodes it strongly influences (plus an
//! optional external influence term) and rises while neighbors are
//! demoted to F, so the next C-point is always a node of maximal current
//! priority. The bucket table keeps nodes of equal priority in one
//! contiguous interval of a permutation, updated in place on every
//! priority change.

use super::{C_NODE, F_NODE, PRE_F_NODE, U_NODE};
use crate::sparse::CsrMatrix;

/// Ruge-Stuben C/F splitting over flat CSR arrays.
///
/// `sp`/`sj` hold the strength graph S, `tp`/`tj` its transpose.
/// `influence[i]` is added to the initial priority of node i. On return
/// every entry of `splitting` is `F_NODE` or `C_NODE`.
///
/// Ties in priority break toward the highest-numbered node.
pub fn rs_cf_splitting_kernel(
    n_nodes: usize,
    sp: &[usize],
    sj: &[usize],
    tp: &[usize],
    tj: &[usize],
    influence: &[usize],
    splitting: &mut [u8],
) {
    if n_nodes == 0 {
        return;
    }

    let mut lambda = vec![0usize; n_nodes];
    let mut lambda_max = 0usize;
    for i in 0..n_nodes {
        lambda[i] = tp[i + 1] - tp[i] + influence[i];
        lambda_max = lambda_max.max(lambda[i]);
    }

    // For each priority value, an interval of the permutation holds the
    // nodes at that priority:
    //   interval [interval_ptr[l], interval_ptr[l] + interval_count[l])
    // with index_to_node / node_to_index mutually inverse. Priorities can
    // rise to n_nodes - 1 during the run, so size the table past that.
    lambda_max = (2 * lambda_max).max(n_nodes + 1);
    let mut interval_ptr = vec![0usize; lambda_max];
    let mut interval_count = vec![0usize; lambda_max];
    let mut index_to_node = vec![0usize; n_nodes];
    let mut node_to_index = vec![0usize; n_nodes];

    // Counting sort of nodes by ascending priority.
    for i in 0..n_nodes {
        interval_count[lambda[i]] += 1;
    }
    let mut cumsum = 0usize;
    for l in 0..lambda_max {
        interval_ptr[l] = cumsum;
        cumsum += interval_count[l];
        interval_count[l] = 0;
    }
    for i in 0..n_nodes {
        let li = lambda[i];
        let index = interval_ptr[li] + interval_count[li];
        index_to_node[index] = i;
        node_to_index[i] = index;
        interval_count[li] += 1;
    }

    splitting[..n_nodes].fill(U_NODE);

    // Nodes influencing nothing (or only themselves) can never become C.
    for i in 0..n_nodes {
        let row = tp[i + 1] - tp[i];
        if lambda[i] == 0 || (lambda[i] == 1 && row == 1 && tj[tp[i]] == i) {
            splitting[i] = F_NODE;
        }
    }

    // Select C-points in descending priority order.
    for top_index in (0..n_nodes).rev() {
        let mut i = index_to_node[top_index];
        let lambda_i = lambda[i];

        // Remove i from its interval.
        interval_count[lambda_i] -= 1;

        if splitting[i] == F_NODE {
            continue;
        }
        debug_assert_eq!(splitting[i], U_NODE);

        // Among the remaining nodes of equal priority, pick the highest
        // numbered one and swap it into the top position.
        let mut max_node = i;
        let mut max_index = top_index;
        for j in interval_ptr[lambda_i]..interval_ptr[lambda_i] + interval_count[lambda_i] {
            if index_to_node[j] > max_node {
                max_node = index_to_node[j];
                max_index = j;
            }
        }
        node_to_index[index_to_node[top_index]] = max_index;
        node_to_index[index_to_node[max_index]] = top_index;
        index_to_node.swap(top_index, max_index);
        i = index_to_node[top_index];

        splitting[i] = C_NODE;

        // Mark the undecided nodes that strongly depend on i. Two-phase
        // so a node is not visited again after its F-status is settled.
        for jj in tp[i]..tp[i + 1] {
            let j = tj[jj];
            if splitting[j] == U_NODE {
                splitting[j] = PRE_F_NODE;
            }
        }

        for jj in tp[i]..tp[i + 1] {
            let j = tj[jj];
            if splitting[j] != PRE_F_NODE {
                continue;
            }
            splitting[j] = F_NODE;

            // Everything the new F-point strongly depends on becomes a
            // better C candidate: raise its priority and move it to the
            // end of its interval.
            for kk in sp[j]..sp[j + 1] {
                let k = sj[kk];
                if splitting[k] != U_NODE {
                    continue;
                }
                // Saturate below n_nodes so the bucket table stays in
                // bounds.
                if lambda[k] >= n_nodes - 1 {
                    continue;
                }
                let lambda_k = lambda[k];
                let old_pos = node_to_index[k];
                let new_pos = interval_ptr[lambda_k] + interval_count[lambda_k] - 1;

                node_to_index[index_to_node[old_pos]] = new_pos;
                node_to_index[index_to_node[new_pos]] = old_pos;
                index_to_node.swap(old_pos, new_pos);

                interval_count[lambda_k] -= 1;
                interval_count[lambda_k + 1] += 1;
                interval_ptr[lambda_k + 1] = new_pos;

                lambda[k] += 1;
            }
        }

        // Nodes the new C-point strongly depends on are now less useful
        // as C-points: lower their priority and move them to the front
        // of their interval.
        for jj in sp[i]..sp[i + 1] {
            let j = sj[jj];
            if splitting[j] != U_NODE {
                continue;
            }
            if lambda[j] == 0 {
                continue;
            }
            let lambda_j = lambda[j];
            let old_pos = node_to_index[j];
            let new_pos = interval_ptr[lambda_j];

            node_to_index[index_to_node[old_pos]] = new_pos;
            node_to_index[index_to_node[new_pos]] = old_pos;
            index_to_node.swap(old_pos, new_pos);

            interval_count[lambda_j] -= 1;
            interval_count[lambda_j - 1] += 1;
            interval_ptr[lambda_j] += 1;
            interval_ptr[lambda_j - 1] = interval_ptr[lambda_j] - interval_count[lambda_j - 1];

            lambda[j] -= 1;
        }
    }
}

/// Ruge-Stuben splitting over a strength graph and its transpose,
/// returning one label per node.
pub fn rs_cf_splitting<T>(
    s: &CsrMatrix<T>,
    t: &CsrMatrix<T>,
    influence: &[usize],
) -> Vec<u8> {
    let n = s.nrows;
    let mut splitting = vec![U_NODE; n];
    rs_cf_splitting_kernel(
        n,
        &s.row_pointers,
        &s.col_indices,
        &t.row_pointers,
        &t.col_indices,
        influence,
        &mut splitting,
    );
    splitting
}
