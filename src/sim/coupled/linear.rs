//! Correction solve of a Newton step, `J dx = -r`.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::Stage;
use crate::{SolveError, SolveResult};

/// Relative residual reduction required from the iterative solver.
const ITERATIVE_RTOL: f64 = 1e-10;
/// Pivots this small relative to the largest one mark a singular system.
const PIVOT_RTOL: f64 = 1e-14;
const BREAKDOWN: f64 = 1e-300;

/// Linear solver strategy for Newton corrections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolver {
    /// Dense LU with partial pivoting.
    #[default]
    Direct,
    /// Jacobi-preconditioned BiCGStab.
    Iterative,
}

impl LinearSolver {
    pub fn solve(
        self,
        a: &DMatrix<f64>,
        b: &DVector<f64>,
        stage: Stage,
    ) -> SolveResult<DVector<f64>> {
        if a.nrows() != a.ncols() || a.nrows() != b.len() {
            return Err(SolveError::invalid_input(format!(
                "linear system is {}x{} with a right-hand side of {}",
                a.nrows(),
                a.ncols(),
                b.len()
            )));
        }
        if b.is_empty() {
            return Ok(DVector::zeros(0));
        }
        let x = match self {
            LinearSolver::Direct => solve_direct(a, b),
            LinearSolver::Iterative => bicgstab(a, b),
        }
        .map_err(|reason| SolveError::LinearSolve { stage, reason })?;

        // Reject NaNs/Infs early so they never reach the iterate
        if x.iter().any(|v| !v.is_finite()) {
            return Err(SolveError::LinearSolve {
                stage,
                reason: "non-finite correction".to_string(),
            });
        }
        Ok(x)
    }
}

fn solve_direct(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, String> {
    let lu = a.clone().lu();
    let diag = lu.u().diagonal();
    let largest = diag.amax();
    let smallest = diag.amin();
    if !(smallest > PIVOT_RTOL * largest) {
        return Err(format!(
            "singular matrix (pivot {smallest:e}, largest pivot {largest:e})"
        ));
    }
    lu.solve(b)
        .ok_or_else(|| "singular matrix".to_string())
}

fn bicgstab(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, String> {
    let n = b.len();
    let inv_diag = DVector::from_iterator(
        n,
        a.diagonal()
            .iter()
            .map(|&d| if d.abs() > 1e-30 { 1.0 / d } else { 1.0 }),
    );

    let b_norm = b.norm();
    if b_norm == 0.0 {
        return Ok(DVector::zeros(n));
    }
    let tol = ITERATIVE_RTOL * b_norm;
    let max_iterations = (10 * n).max(100);

    let mut x = DVector::zeros(n);
    let mut r = b.clone();
    let r_hat = r.clone();
    let mut p = DVector::zeros(n);
    let mut v = DVector::zeros(n);
    let (mut rho, mut alpha, mut omega) = (1.0, 1.0, 1.0);

    for _ in 0..max_iterations {
        let rho_new = r_hat.dot(&r);
        if rho_new.abs() < BREAKDOWN {
            return Err("BiCGStab breakdown (rho = 0)".to_string());
        }
        let beta = (rho_new / rho) * (alpha / omega);
        p = &r + (&p - &v * omega) * beta;

        let p_hat = p.component_mul(&inv_diag);
        v = a * &p_hat;
        let denom = r_hat.dot(&v);
        if denom.abs() < BREAKDOWN {
            return Err("BiCGStab breakdown (r_hat . v = 0)".to_string());
        }
        alpha = rho_new / denom;

        let s = &r - &v * alpha;
        if s.norm() <= tol {
            x += p_hat * alpha;
            return Ok(x);
        }

        let s_hat = s.component_mul(&inv_diag);
        let t = a * &s_hat;
        let tt = t.dot(&t);
        if tt < BREAKDOWN {
            return Err("BiCGStab breakdown (t = 0)".to_string());
        }
        omega = t.dot(&s) / tt;
        x += p_hat * alpha + s_hat * omega;
        r = s - t * omega;

        if r.norm() <= tol {
            return Ok(x);
        }
        if omega.abs() < BREAKDOWN {
            return Err("BiCGStab breakdown (omega = 0)".to_string());
        }
        rho = rho_new;
    }
    Err(format!(
        "BiCGStab did not reach {tol:e} in {max_iterations} iterations (residual {:e})",
        r.norm()
    ))
}
