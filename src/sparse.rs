//! Compressed Sparse Row (CSR) storage.
//!
//! Every operator in the setup pipeline lives in this format: the fine
//! operator A, the strength graph S and its transpose, and the transfer
//! operators P and R. The flat arrays are public because the kernels
//! consume them directly; the methods here cover what the pipeline
//! needs around the kernels, assembly, transposition, and application.

use crate::scalar::AmgScalar;

/// Sparse matrix in Compressed Sparse Row format.
///
/// Row i spans `row_pointers[i]..row_pointers[i + 1]` inside
/// `col_indices` and `values`; `row_pointers[nrows]` equals the nonzero
/// count. Rows of a strength graph may be empty (a node with no strong
/// couplings); column order within a row is ascending after assembly
/// but kernels never rely on it.
#[derive(Debug, Clone)]
pub struct CsrMatrix<T> {
    pub nrows: usize,
    pub ncols: usize,
    pub row_pointers: Vec<usize>,
    pub col_indices: Vec<usize>,
    pub values: Vec<T>,
}

impl<T: AmgScalar> CsrMatrix<T> {
    /// Number of stored nonzeros.
    pub fn nnz(&self) -> usize {
        self.col_indices.len()
    }

    /// Whether the matrix is square, as a fine-level operator must be.
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Assemble from (row, col, value) triplets, summing duplicates.
    ///
    /// Stencil assembly pushes one triplet per coupling, so a position
    /// hit by several contributions (a diagonal shared by two grid
    /// edges, say) accumulates them.
    pub fn from_triplets(nrows: usize, ncols: usize, triplets: &[(usize, usize, T)]) -> Self {
        // Bucket by row, then sort and merge each row by column.
        let mut rows: Vec<Vec<(usize, T)>> = vec![Vec::new(); nrows];
        for &(r, c, v) in triplets {
            rows[r].push((c, v));
        }

        let mut row_pointers = Vec::with_capacity(nrows + 1);
        let mut col_indices = Vec::with_capacity(triplets.len());
        let mut values: Vec<T> = Vec::with_capacity(triplets.len());

        row_pointers.push(0);
        for row in &mut rows {
            row.sort_by_key(|&(c, _)| c);
            let mut last_col = usize::MAX;
            for &(c, v) in row.iter() {
                if c == last_col {
                    if let Some(last) = values.last_mut() {
                        *last += v;
                    }
                } else {
                    col_indices.push(c);
                    values.push(v);
                    last_col = c;
                }
            }
            row_pointers.push(col_indices.len());
        }

        Self {
            nrows,
            ncols,
            row_pointers,
            col_indices,
            values,
        }
    }

    /// Transpose by column histogram and scatter.
    ///
    /// The splitters walk S^T next to S, and the default two-level
    /// restriction is P^T. Within each transposed row, entries keep
    /// source-row order.
    pub fn transpose(&self) -> CsrMatrix<T> {
        let mut row_pointers = vec![0usize; self.ncols + 1];
        for &c in &self.col_indices {
            row_pointers[c + 1] += 1;
        }
        for i in 0..self.ncols {
            row_pointers[i + 1] += row_pointers[i];
        }

        let mut next = row_pointers.clone();
        let mut col_indices = vec![0usize; self.nnz()];
        let mut values = vec![T::zero(); self.nnz()];
        for i in 0..self.nrows {
            for idx in self.row_pointers[i]..self.row_pointers[i + 1] {
                let c = self.col_indices[idx];
                let slot = next[c];
                col_indices[slot] = i;
                values[slot] = self.values[idx];
                next[c] += 1;
            }
        }

        CsrMatrix {
            nrows: self.ncols,
            ncols: self.nrows,
            row_pointers,
            col_indices,
            values,
        }
    }

    /// Matrix-vector product y = A*x, e.g. prolongating a coarse-grid
    /// vector through P.
    pub fn spmv(&self, x: &[T]) -> Vec<T> {
        assert_eq!(x.len(), self.ncols, "spmv dimension mismatch");
        let mut y = vec![T::zero(); self.nrows];
        for (i, out) in y.iter_mut().enumerate() {
            let span = self.row_pointers[i]..self.row_pointers[i + 1];
            let mut acc = T::zero();
            for (&c, &v) in self.col_indices[span.clone()].iter().zip(&self.values[span]) {
                acc += v * x[c];
            }
            *out = acc;
        }
        y
    }

    /// Expand to a dense row-major table. For tests and small operators
    /// only.
    pub fn to_dense(&self) -> Vec<Vec<T>> {
        let mut dense = vec![vec![T::zero(); self.ncols]; self.nrows];
        for (row, span) in dense.iter_mut().zip(self.row_pointers.windows(2)) {
            for idx in span[0]..span[1] {
                row[self.col_indices[idx]] = self.values[idx];
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    /// Path-graph Laplacian assembled edge by edge: every edge adds to
    /// both endpoint diagonals, so shared diagonals accumulate.
    fn path_laplacian(n: usize) -> CsrMatrix<f64> {
        let mut triplets = Vec::new();
        for i in 0..n.saturating_sub(1) {
            triplets.push((i, i, 1.0));
            triplets.push((i + 1, i + 1, 1.0));
            triplets.push((i, i + 1, -1.0));
            triplets.push((i + 1, i, -1.0));
        }
        CsrMatrix::from_triplets(n, n, &triplets)
    }

    #[test]
    fn stencil_assembly_accumulates_shared_diagonals() {
        // Interior nodes of the 4-node path sit on two edges: degree 2.
        let a = path_laplacian(4);
        assert!(a.is_square());
        assert_eq!(a.nnz(), 10);
        assert_eq!(a.row_pointers, vec![0, 2, 5, 8, 10]);
        assert_eq!(
            a.to_dense()[1],
            vec![-1.0, 2.0, -1.0, 0.0],
            "interior row must carry its accumulated degree"
        );
        assert_eq!(a.to_dense()[0], vec![1.0, -1.0, 0.0, 0.0]);
    }

    #[test]
    fn nodes_without_couplings_get_empty_rows() {
        // A strength graph where node 1 has no strong connections.
        let s = CsrMatrix::from_triplets(3, 3, &[(0, 2, -1.0), (2, 0, -1.0)]);
        assert_eq!(s.row_pointers, vec![0, 1, 1, 2]);
        assert_eq!(s.nnz(), 2);
    }

    #[test]
    fn transpose_flips_a_directed_strength_graph() {
        // S rows are out-neighbors; S^T rows collect in-neighbors, in
        // source-row order: both 0 and 2 strongly depend on 1.
        let s = CsrMatrix::from_triplets(3, 3, &[(0, 1, -2.0), (2, 1, -3.0), (1, 0, -1.0)]);
        let t = s.transpose();
        assert_eq!(t.row_pointers, vec![0, 1, 3, 3]);
        assert_eq!(t.col_indices[t.row_pointers[1]..t.row_pointers[2]], [0, 2]);
        assert_eq!(t.values[t.row_pointers[1]..t.row_pointers[2]], [-2.0, -3.0]);
    }

    #[test]
    fn transpose_of_interpolation_has_restriction_shape() {
        // A 3-by-2 interpolation (injection rows around an averaging
        // F-row) transposes to the 2-by-3 restriction layout.
        let p = CsrMatrix::from_triplets(
            3,
            2,
            &[(0, 0, 1.0), (1, 0, 0.5), (1, 1, 0.5), (2, 1, 1.0)],
        );
        let r = p.transpose();
        assert_eq!((r.nrows, r.ncols), (2, 3));
        assert_eq!(
            r.to_dense(),
            vec![vec![1.0, 0.5, 0.0], vec![0.0, 0.5, 1.0]]
        );
    }

    #[test]
    fn double_transpose_restores_the_operator() {
        let a = path_laplacian(5);
        let tt = a.transpose().transpose();
        assert_eq!(tt.row_pointers, a.row_pointers);
        assert_eq!(tt.col_indices, a.col_indices);
        assert_eq!(tt.values, a.values);
    }

    #[test]
    fn spmv_prolongates_a_coarse_vector() {
        // Injection at the C-points, averaging at the F-point between
        // them: [2, 4] on the coarse grid becomes [2, 3, 4].
        let p = CsrMatrix::from_triplets(
            3,
            2,
            &[(0, 0, 1.0), (1, 0, 0.5), (1, 1, 0.5), (2, 1, 1.0)],
        );
        assert_eq!(p.spmv(&[2.0, 4.0]), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn complex_spmv_goes_through_the_scalar_trait() {
        let a = CsrMatrix::from_triplets(
            2,
            2,
            &[
                (0, 0, Complex64::new(2.0, 0.0)),
                (0, 1, Complex64::new(0.0, 1.0)),
                (1, 1, Complex64::new(1.0, -1.0)),
            ],
        );
        let y = a.spmv(&[Complex64::new(1.0, 0.0), Complex64::new(0.0, 2.0)]);
        assert_eq!(y[0], Complex64::new(0.0, 0.0));
        assert_eq!(y[1], Complex64::new(2.0, 2.0));
    }
}
