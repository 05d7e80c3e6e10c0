use super::directed::{directed_diameter, directed_diameter_gradient};
use super::peclet::{peclet_xi, peclet_xi_derivative};
use crate::error::Degeneracy;
use crate::{Point, SolveError, SolveResult, Triangle, TriangleMesh, Vector};

/// Values of `tau` above this indicate an ill-conditioned or degenerate cell.
pub const TAU_SANITY_BOUND: f64 = 1.0e3;

/// Relative round-off allowance when comparing directed and undirected diameters.
const DIAMETER_RTOL: f64 = 1.0e-12;

/// Stabilization parameter at one evaluation point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tau {
    /// Scalar SUPG parameter.
    pub tau: f64,
    /// `tau * b`, the streamline correction added to the test function gradient.
    pub tau_b: Vector,
}

impl Tau {
    pub const ZERO: Self = Self {
        tau: 0.0,
        tau_b: Vector::ZERO,
    };
}

/// First derivatives of `tau` with respect to the convection sample and the
/// diffusivity, used by exact Jacobian assembly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TauSensitivity {
    /// `d tau / d b`.
    pub d_tau_db: Vector,
    /// `d tau / d sigma`.
    pub d_tau_dsigma: f64,
}

impl TauSensitivity {
    pub const ZERO: Self = Self {
        d_tau_db: Vector::ZERO,
        d_tau_dsigma: 0.0,
    };
}

/// Intermediate quantities of one successful evaluation.
struct Evaluation {
    conv_norm: f64,
    h: f64,
    peclet: f64,
    xi: f64,
    tau: f64,
}

/// SUPG parameter evaluator for one transported field.
///
/// Holds the diffusivity `sigma` and the polynomial degree `p` of the field's
/// interpolation. The value is immutable once built; create one per set of
/// coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Supg {
    diffusivity: f64,
    degree: u32,
}

impl Supg {
    pub fn new(diffusivity: f64, degree: u32) -> SolveResult<Self> {
        if !(diffusivity > 0.0 && diffusivity.is_finite()) {
            return Err(SolveError::invalid_input(format!(
                "diffusivity must be positive and finite, got {diffusivity}"
            )));
        }
        if degree == 0 {
            return Err(SolveError::invalid_input("polynomial degree must be at least 1"));
        }
        Ok(Self {
            diffusivity,
            degree,
        })
    }

    pub fn diffusivity(&self) -> f64 {
        self.diffusivity
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Computes `tau` and `tau * b` for convection sample `b` in cell `cell_index`.
    ///
    /// Returns [`Tau::ZERO`] when `||b||` is below machine epsilon.
    pub fn eval(&self, cell_index: usize, cell: &Triangle, b: Vector) -> SolveResult<Tau> {
        Ok(match self.evaluate(cell_index, cell, b)? {
            Some(ev) => Tau {
                tau: ev.tau,
                tau_b: b * ev.tau,
            },
            None => Tau::ZERO,
        })
    }

    /// Like [`Supg::eval`], also returning the derivatives of `tau`.
    ///
    /// The sensitivity is zero wherever stabilization is switched off.
    pub fn eval_with_sensitivity(
        &self,
        cell_index: usize,
        cell: &Triangle,
        b: Vector,
    ) -> SolveResult<(Tau, TauSensitivity)> {
        let Some(ev) = self.evaluate(cell_index, cell, b)? else {
            return Ok((Tau::ZERO, TauSensitivity::ZERO));
        };
        let Evaluation {
            conv_norm: s,
            h,
            peclet,
            xi,
            tau,
        } = ev;
        let p = f64::from(self.degree);
        let d_xi = peclet_xi_derivative(peclet);
        let b_over_s2 = b * (1.0 / (s * s));

        let d_h = directed_diameter_gradient(cell, b);
        let d_peclet = (b * (h / s) + d_h * s) * (0.5 / (p * self.diffusivity));
        let d_tau_db = (d_h * xi + d_peclet * (h * d_xi)) * (0.5 / (p * s)) - b_over_s2 * tau;
        let d_tau_dsigma = -0.5 * h * d_xi * peclet / (p * s * self.diffusivity);

        Ok((
            Tau {
                tau,
                tau_b: b * tau,
            },
            TauSensitivity {
                d_tau_db,
                d_tau_dsigma,
            },
        ))
    }

    fn evaluate(&self, cell_index: usize, cell: &Triangle, b: Vector) -> SolveResult<Option<Evaluation>> {
        let conv_norm = b.length();
        if conv_norm < f64::EPSILON {
            return Ok(None);
        }

        let h = directed_diameter(cell, b);
        let diameter = cell.diameter();
        if h > diameter * (1.0 + DIAMETER_RTOL) {
            return Err(degenerate(
                cell_index,
                Degeneracy::DirectedDiameter {
                    directed: h,
                    diameter,
                },
            ));
        }

        let p = f64::from(self.degree);
        let peclet = 0.5 * conv_norm * h / (p * self.diffusivity);
        if !(peclet > 0.0 && peclet.is_finite()) {
            return Err(degenerate(
                cell_index,
                Degeneracy::Peclet {
                    peclet,
                    conv_norm,
                    h,
                },
            ));
        }

        let xi = peclet_xi(peclet);
        let tau = 0.5 * h * xi / (p * conv_norm);
        if tau > TAU_SANITY_BOUND {
            return Err(degenerate(
                cell_index,
                Degeneracy::TauTooLarge {
                    tau,
                    conv_norm,
                    peclet,
                    h,
                    xi,
                },
            ));
        }

        Ok(Some(Evaluation {
            conv_norm,
            h,
            peclet,
            xi,
            tau,
        }))
    }

    /// Evaluates `tau` at every cell centroid of `mesh`.
    ///
    /// `convection(cell_index, centroid)` samples the convection field.
    pub fn tau_field<F>(&self, mesh: &TriangleMesh, mut convection: F) -> SolveResult<Vec<Tau>>
    where
        F: FnMut(usize, Point) -> Vector,
    {
        mesh.cells()
            .iter()
            .enumerate()
            .map(|(ci, cell)| self.eval(ci, cell, convection(ci, cell.centroid())))
            .collect()
    }
}

fn degenerate(cell: usize, kind: Degeneracy) -> SolveError {
    log::error!("SUPG evaluation failed in cell {cell}: {kind}");
    SolveError::NumericalDegeneracy { cell, kind }
}
