//! Scalar abstraction for the setup kernels.
//!
//! Kernels are generic over the matrix value type so the same code
//! serves real (f64) and complex (Complex64) operators. Strength
//! comparisons go through a real-valued magnitude; the interpolation
//! formulas split sums by the sign of the real part.

use num_complex::Complex64;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Trait bounds needed for setup-kernel arithmetic.
pub trait AmgScalar:
    Copy
    + Default
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + PartialEq
    + AddAssign
    + std::fmt::Debug
{
    fn zero() -> Self;
    fn one() -> Self;
    /// Magnitude of the value, used by the strength-of-connection test.
    fn norm(self) -> f64;
    /// Real part, used where sums are split by sign.
    fn re(self) -> f64;
}

impl AmgScalar for f64 {
    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn norm(self) -> f64 {
        self.abs()
    }
    fn re(self) -> f64 {
        self
    }
}

impl AmgScalar for Complex64 {
    fn zero() -> Self {
        Complex64::new(0.0, 0.0)
    }
    fn one() -> Self {
        Complex64::new(1.0, 0.0)
    }
    fn norm(self) -> f64 {
        Complex64::norm(self)
    }
    fn re(self) -> f64 {
        self.re
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_norm_is_abs() {
        assert_eq!((-3.5f64).norm(), 3.5);
        assert_eq!(2.0f64.norm(), 2.0);
    }

    #[test]
    fn complex_norm_is_magnitude() {
        let z = Complex64::new(3.0, 4.0);
        assert_eq!(AmgScalar::norm(z), 5.0);
        assert_eq!(AmgScalar::re(z), 3.0);
    }
}
