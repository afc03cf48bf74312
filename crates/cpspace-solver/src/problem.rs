//! Least-squares problem contract and a finite-difference Jacobian.

use num_traits::{Float, One, Zero};

/// A nonlinear least-squares problem as an external solver sees it.
///
/// The solver owns the iteration policy; the problem only maps a flat
/// variable vector to a fixed-length residual vector.
pub trait LeastSquaresProblem {
    /// Numeric type of variables and residuals.
    type Scalar: Float;

    /// Variable dimension n.
    fn variable_dim(&self) -> usize;

    /// Residual dimension m.
    fn residual_dim(&self) -> usize;

    /// Fills the residual vector r(x), `out.len() == residual_dim()`.
    fn residuals(&mut self, vars: &[Self::Scalar], out: &mut [Self::Scalar]);
}

/// Forward-difference Jacobian of `problem` at `vars`.
///
/// `out` is m×n, row-major: row i, column k is written to `out[i * n + k]`.
/// Costs `n + 1` residual evaluations.
///
/// # Panics
///
/// Panics if `vars` or `out` have the wrong length.
///
/// # Example
///
/// ```
/// use cpspace_solver::{forward_difference_jacobian, LeastSquaresProblem};
///
/// struct Line;
///
/// impl LeastSquaresProblem for Line {
///     type Scalar = f64;
///     fn variable_dim(&self) -> usize { 2 }
///     fn residual_dim(&self) -> usize { 1 }
///     fn residuals(&mut self, x: &[f64], out: &mut [f64]) {
///         out[0] = 3.0 * x[0] - 2.0 * x[1];
///     }
/// }
///
/// let mut jacobian = [0.0; 2];
/// forward_difference_jacobian(&mut Line, &[1.0, 1.0], 1e-6, &mut jacobian);
/// assert!((jacobian[0] - 3.0).abs() < 1e-6);
/// assert!((jacobian[1] + 2.0).abs() < 1e-6);
/// ```
pub fn forward_difference_jacobian<L>(
    problem: &mut L,
    vars: &[L::Scalar],
    epsilon: L::Scalar,
    out: &mut [L::Scalar],
) where
    L: LeastSquaresProblem + ?Sized,
{
    let n = problem.variable_dim();
    let m = problem.residual_dim();
    assert_eq!(vars.len(), n, "variable vector has the wrong length");
    assert_eq!(out.len(), m * n, "jacobian buffer has the wrong length");

    let mut base = vec![L::Scalar::zero(); m];
    let mut shifted = vec![L::Scalar::zero(); m];
    let mut x = vars.to_vec();
    problem.residuals(&x, &mut base);

    for k in 0..n {
        // scale the step with the variable so large coordinates stay resolvable
        let h = epsilon * L::Scalar::one().max(x[k].abs());
        let saved = x[k];
        x[k] = saved + h;
        problem.residuals(&x, &mut shifted);
        x[k] = saved;
        for i in 0..m {
            out[i * n + k] = (shifted[i] - base[i]) / h;
        }
    }
}
