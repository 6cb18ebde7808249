//! Two-level setup driver.
//!
//! Chains strength, splitting, interpolation, and restriction into the
//! artifacts a two-level coarse correction needs. Forming the Galerkin
//! coarse operator R*A*P is left to the caller.

use super::cljp::cljp_naive_splitting;
use super::interpolate::{direct_interpolation, standard_interpolation};
use super::restrict::approx_ideal_restriction;
use super::split::rs_cf_splitting;
use super::strength::classical_strength;
use super::{num_coarse, C_NODE};
use crate::error::{CoarsenError, Result};
use crate::sparse::CsrMatrix;

/// Coarse-grid selection method.
#[derive(Debug, Clone, Copy)]
pub enum Coarsening {
    /// Ruge-Stuben priority-bucket selection.
    RugeStuben,
    /// CLJP independent-set selection. With `coloring` the weights seed
    /// from a graph coloring instead of the fixed random draw.
    Cljp { coloring: bool },
}

/// Interpolation formula.
#[derive(Debug, Clone, Copy)]
pub enum Interpolation {
    Direct,
    Standard,
}

/// Restriction operator construction.
#[derive(Debug, Clone, Copy)]
pub enum Restriction {
    /// Transpose of the interpolation operator.
    TransposeP,
    /// Approximate ideal restriction with at most `max_row` F-couplings
    /// per row.
    Air { max_row: usize },
}

/// Options for a two-level setup.
#[derive(Debug, Clone, Copy)]
pub struct SetupOptions {
    /// Strength-of-connection threshold.
    pub theta: f64,
    pub coarsening: Coarsening,
    pub interpolation: Interpolation,
    pub restriction: Restriction,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            theta: 0.25,
            coarsening: Coarsening::RugeStuben,
            interpolation: Interpolation::Direct,
            restriction: Restriction::TransposeP,
        }
    }
}

/// Artifacts of a two-level setup.
#[derive(Debug)]
pub struct TwoLevel {
    /// Strength-of-connection graph. When AIR restriction truncates a
    /// neighborhood, the dropped couplings are zeroed here.
    pub strength: CsrMatrix<f64>,
    /// C/F label per fine node.
    pub splitting: Vec<u8>,
    /// Interpolation operator, n by n_coarse.
    pub p: CsrMatrix<f64>,
    /// Restriction operator, n_coarse by n.
    pub r: CsrMatrix<f64>,
    /// Number of coarse nodes.
    pub n_coarse: usize,
}

/// Run strength, splitting, interpolation, and restriction on A.
pub fn setup_two_level(a: &CsrMatrix<f64>, opts: &SetupOptions) -> Result<TwoLevel> {
    if !a.is_square() {
        return Err(CoarsenError::Strength(format!(
            "expected square matrix, got {}x{}",
            a.nrows, a.ncols
        )));
    }
    let _span = tracing::info_span!("two_level_setup", n = a.nrows).entered();

    let strength = classical_strength(opts.theta, a);
    let transpose = strength.transpose();

    let splitting = match opts.coarsening {
        Coarsening::RugeStuben => {
            let influence = vec![0usize; a.nrows];
            rs_cf_splitting(&strength, &transpose, &influence)
        }
        Coarsening::Cljp { coloring } => cljp_naive_splitting(&strength, &transpose, coloring),
    };
    let n_coarse = num_coarse(&splitting);

    let p = match opts.interpolation {
        Interpolation::Direct => direct_interpolation(a, &strength, &splitting),
        Interpolation::Standard => standard_interpolation(a, &strength, &splitting),
    };

    let (strength, r) = match opts.restriction {
        Restriction::TransposeP => (strength, p.transpose()),
        Restriction::Air { max_row } => {
            let cpts: Vec<usize> = splitting
                .iter()
                .enumerate()
                .filter(|(_, &s)| s == C_NODE)
                .map(|(i, _)| i)
                .collect();
            let mut c = strength;
            let r = approx_ideal_restriction(a, &mut c, &cpts, &splitting, max_row)?;
            (c, r)
        }
    };

    tracing::info!(
        n = a.nrows,
        n_coarse,
        strength_nnz = strength.nnz(),
        p_nnz = p.nnz(),
        r_nnz = r.nnz(),
        "two-level setup complete"
    );

    Ok(TwoLevel {
        strength,
        splitting,
        p,
        r,
        n_coarse,
    })
}
