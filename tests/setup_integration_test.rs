//! End-to-end tests for the two-level AMG setup over model problems.

use approx::assert_abs_diff_eq;
use coarsen::setup::level::{
    setup_two_level, Coarsening, Interpolation, Restriction, SetupOptions,
};
use coarsen::setup::{coarse_index_map, C_NODE, F_NODE};
use coarsen::sparse::CsrMatrix;

/// 1D Poisson matrix [-1, 2, -1] on n nodes.
fn poisson_1d(n: usize) -> CsrMatrix<f64> {
    let mut triplets = Vec::new();
    for i in 0..n {
        triplets.push((i, i, 2.0));
        if i + 1 < n {
            triplets.push((i, i + 1, -1.0));
            triplets.push((i + 1, i, -1.0));
        }
    }
    CsrMatrix::from_triplets(n, n, &triplets)
}

/// 2D Poisson 5-point stencil on an nx-by-ny grid.
fn poisson_2d(nx: usize, ny: usize) -> CsrMatrix<f64> {
    let idx = |x: usize, y: usize| y * nx + x;
    let mut triplets = Vec::new();
    for y in 0..ny {
        for x in 0..nx {
            triplets.push((idx(x, y), idx(x, y), 4.0));
            if x + 1 < nx {
                triplets.push((idx(x, y), idx(x + 1, y), -1.0));
                triplets.push((idx(x + 1, y), idx(x, y), -1.0));
            }
            if y + 1 < ny {
                triplets.push((idx(x, y), idx(x, y + 1), -1.0));
                triplets.push((idx(x, y + 1), idx(x, y), -1.0));
            }
        }
    }
    CsrMatrix::from_triplets(nx * ny, nx * ny, &triplets)
}

/// Checks the structural invariants every setup must satisfy.
fn assert_setup_invariants(a: &CsrMatrix<f64>, level: &coarsen::setup::level::TwoLevel) {
    let n = a.nrows;

    // Splitting partitions the nodes.
    for &label in &level.splitting {
        assert!(label == F_NODE || label == C_NODE);
    }
    assert_eq!(
        level.n_coarse,
        level.splitting.iter().filter(|&&s| s == C_NODE).count()
    );

    // Row pointers are monotone and consistent with the stored nonzeros.
    for m in [&level.strength, &level.p, &level.r] {
        assert_eq!(m.row_pointers[0], 0);
        for i in 0..m.nrows {
            assert!(m.row_pointers[i] <= m.row_pointers[i + 1]);
        }
        assert_eq!(m.row_pointers[m.nrows], m.nnz());
    }

    // Operator shapes line up for a coarse correction.
    assert_eq!(level.p.nrows, n);
    assert_eq!(level.p.ncols, level.n_coarse);
    assert_eq!(level.r.nrows, level.n_coarse);
    assert_eq!(level.r.ncols, n);

    // Injection: each C-point row of P holds a single unit entry at its
    // coarse column.
    let map = coarse_index_map(&level.splitting);
    for i in 0..n {
        if level.splitting[i] == C_NODE {
            assert_eq!(level.p.row_pointers[i + 1] - level.p.row_pointers[i], 1);
            let at = level.p.row_pointers[i];
            assert_eq!(level.p.col_indices[at], map[i]);
            assert_eq!(level.p.values[at], 1.0);
        }
    }
}

#[test]
fn ruge_stuben_direct_on_poisson_1d() {
    let a = poisson_1d(16);
    let level = setup_two_level(&a, &SetupOptions::default()).unwrap();
    assert_setup_invariants(&a, &level);

    // Coarsening must actually coarsen, without collapsing to nothing.
    assert!(level.n_coarse > 0);
    assert!(level.n_coarse < 16);

    // Interior F-rows of the chain interpolate [0.5, 0.5] from their two
    // coarse neighbors, so P carries coarse constants to fine constants
    // away from the boundary.
    let ones = vec![1.0; level.n_coarse];
    let fine = level.p.spmv(&ones);
    let interior_ok = fine
        .iter()
        .enumerate()
        .filter(|(i, _)| *i > 0 && *i + 1 < 16)
        .all(|(_, &v)| v > 0.0);
    assert!(interior_ok);
}

#[test]
fn ruge_stuben_standard_on_poisson_2d() {
    let a = poisson_2d(5, 5);
    let opts = SetupOptions {
        interpolation: Interpolation::Standard,
        ..SetupOptions::default()
    };
    let level = setup_two_level(&a, &opts).unwrap();
    assert_setup_invariants(&a, &level);
    assert!(level.n_coarse > 0 && level.n_coarse < 25);

    // Every F-node interpolates from at least one coarse neighbor on
    // this connected stencil.
    for i in 0..25 {
        if level.splitting[i] == F_NODE {
            assert!(
                level.p.row_pointers[i + 1] > level.p.row_pointers[i],
                "fine node {i} interpolates from nothing"
            );
        }
    }
}

#[test]
fn cljp_coarsening_is_deterministic() {
    let a = poisson_2d(4, 4);
    let opts = SetupOptions {
        coarsening: Coarsening::Cljp { coloring: false },
        ..SetupOptions::default()
    };
    let first = setup_two_level(&a, &opts).unwrap();
    let second = setup_two_level(&a, &opts).unwrap();
    assert_setup_invariants(&a, &first);
    assert_eq!(first.splitting, second.splitting);
    assert_eq!(first.p.values, second.p.values);
}

#[test]
fn cljp_with_coloring_covers_the_grid() {
    let a = poisson_2d(4, 4);
    let opts = SetupOptions {
        coarsening: Coarsening::Cljp { coloring: true },
        ..SetupOptions::default()
    };
    let level = setup_two_level(&a, &opts).unwrap();
    assert_setup_invariants(&a, &level);
    assert!(level.n_coarse > 0);
}

#[test]
fn air_restriction_on_poisson_1d() {
    let a = poisson_1d(12);
    let opts = SetupOptions {
        restriction: Restriction::Air { max_row: 2 },
        ..SetupOptions::default()
    };
    let level = setup_two_level(&a, &opts).unwrap();
    assert_setup_invariants(&a, &level);

    let cpts: Vec<usize> = level
        .splitting
        .iter()
        .enumerate()
        .filter(|(_, &s)| s == C_NODE)
        .map(|(i, _)| i)
        .collect();

    for (row, &cpoint) in cpts.iter().enumerate() {
        let start = level.r.row_pointers[row];
        let end = level.r.row_pointers[row + 1];
        // Sparsity bound: at most max_row F-couplings plus the identity.
        assert!(end - start <= 3);
        // Identity entry last.
        assert_eq!(level.r.col_indices[end - 1], cpoint);
        assert_eq!(level.r.values[end - 1], 1.0);
        // All other columns are F-points.
        for k in start..end - 1 {
            assert_eq!(level.splitting[level.r.col_indices[k]], F_NODE);
        }
    }
}

#[test]
fn transpose_restriction_acts_as_p_transpose() {
    let a = poisson_1d(10);
    let level = setup_two_level(&a, &SetupOptions::default()).unwrap();

    // (R y) . x == y . (P x) for the transpose pair.
    let x: Vec<f64> = (0..level.n_coarse).map(|i| (i + 1) as f64).collect();
    let y: Vec<f64> = (0..10).map(|i| (2 * i + 1) as f64).collect();

    let px = level.p.spmv(&x);
    let ry = level.r.spmv(&y);

    let lhs: f64 = ry.iter().zip(x.iter()).map(|(a, b)| a * b).sum();
    let rhs: f64 = y.iter().zip(px.iter()).map(|(a, b)| a * b).sum();
    assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-10);
}
