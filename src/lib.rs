//! # coarsen
//!
//! Setup kernels for classical (Ruge-Stuben) algebraic multigrid on CSR
//! matrices: strength of connection, coarse/fine splitting (Ruge-Stuben
//! and CLJP), direct and standard interpolation, approximate ideal
//! restriction, and a compatible-relaxation helper.
//!
//! Kernels follow the flat-CSR convention with caller-preallocated
//! outputs; [`sparse::CsrMatrix`] wrappers allocate for callers that
//! prefer owned matrices, and [`setup::level`] chains the phases into a
//! two-level setup. The outer solver (cycles, smoothing, the Galerkin
//! product) lives elsewhere.

pub mod error;
pub mod linalg;
pub mod scalar;
pub mod setup;
pub mod sparse;
