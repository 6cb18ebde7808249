//! Compatible-relaxation C-point promotion.
//!
//! Measures how poorly relaxation reduces the error at each F-point and
//! promotes the worst offenders to C-points through a greedy weighted
//! independent set over the matrix graph.

/// Promote additional C-points from the current F-point pool.
///
/// Layout of `indices`: slot 0 holds the F-point count nf, slots 1..=nf
/// the F-point ids, and the tail the C-point ids.
///
/// `e` is the relaxed error, `b` the target near-null-space vector; on
/// entry to the measure, each F-point's error is normalized against the
/// target. F-points whose measure exceeds `thetacs` become candidates; a
/// greedy maximum independent set over the candidates (weighted by
/// fine-neighbor count plus measure) joins the coarse grid. `indices` is
/// repacked on exit with F-points ascending up front and C-points
/// descending in the tail. `cost` accumulates work in units of nnz(A).
///
/// Every row of A must carry a structurally nonzero diagonal.
pub fn cr_helper(
    a_rowptr: &[usize],
    a_colinds: &[usize],
    b: &[f64],
    e: &mut [f64],
    indices: &mut [usize],
    splitting: &mut [u8],
    gamma: &mut [f64],
    thetacs: f64,
    cost: &mut f64,
) {
    let annz = a_colinds.len() as f64;
    let n = splitting.len();
    let num_fpts = indices[0];

    // Scale the relaxed error against the target vector and take the
    // infinity norm over the F-points.
    let mut inf_norm = 0.0f64;
    for idx in 1..=num_fpts {
        let pt = indices[idx];
        e[pt] = (e[pt] / b[pt]).abs();
        if e[pt] > inf_norm {
            inf_norm = e[pt];
        }
    }
    *cost += num_fpts as f64 / annz;

    // Candidate set: F-points whose normalized measure exceeds the
    // threshold.
    let mut candidates: Vec<usize> = Vec::new();
    for idx in 1..=num_fpts {
        let pt = indices[idx];
        gamma[pt] = e[pt] / inf_norm;
        if gamma[pt] > thetacs {
            candidates.push(pt);
        }
    }
    *cost += num_fpts as f64 / annz;

    // omega_i = |N_i \ C| + gamma_i
    let mut omega = vec![0.0f64; n];
    for &pt in &candidates {
        let mut num_neighbors = 0usize;
        for j in a_rowptr[pt]..a_rowptr[pt + 1] {
            if splitting[a_colinds[j]] == 0 {
                num_neighbors += 1;
            }
        }
        omega[pt] = num_neighbors as f64 + gamma[pt];
    }

    // Greedy maximum independent set over the candidates.
    loop {
        let mut max_weight = 0.0f64;
        let mut new_pt = None;
        for &pt in &candidates {
            if omega[pt] > max_weight {
                max_weight = omega[pt];
                new_pt = Some(pt);
            }
        }
        let new_pt = match new_pt {
            Some(pt) => pt,
            None => break,
        };
        splitting[new_pt] = 1;
        gamma[new_pt] = 0.0;

        // Knock the new C-point's neighbors (itself included, through
        // the diagonal) out of the running...
        let row = a_rowptr[new_pt]..a_rowptr[new_pt + 1];
        for i in row.clone() {
            omega[a_colinds[i]] = 0.0;
        }

        // ...and compensate their neighbors still holding weight.
        for i in row {
            let pt = a_colinds[i];
            for j in a_rowptr[pt]..a_rowptr[pt + 1] {
                let neighbor = a_colinds[j];
                if omega[neighbor] != 0.0 {
                    omega[neighbor] += 1.0;
                }
            }
        }
    }

    // Repack: F-points ascending from the front, C-points descending
    // from the back, count in slot 0.
    let mut next_find = 1;
    let mut next_cind = n;
    let mut num_fpts = 0;
    for i in 0..n {
        if splitting[i] == 0 {
            indices[next_find] = i;
            next_find += 1;
            num_fpts += 1;
        } else {
            indices[next_cind] = i;
            next_cind -= 1;
        }
    }
    indices[0] = num_fpts;
}
