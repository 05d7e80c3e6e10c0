//! Error taxonomy of the solver core.
//!
//! Every failure is terminal for the current `solve` call. The caller decides
//! whether to adjust parameters and retry the whole call.

use std::fmt;
use thiserror::Error;

/// Result type used throughout the solver core.
pub type SolveResult<T> = Result<T, SolveError>;

/// Iterative stage that produced a convergence or linear-solve failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Outer energy/momentum alternation of the warm start.
    FixedPoint,
    /// Single-equation energy solve inside the warm start.
    Energy,
    /// Single-equation momentum solve inside the warm start.
    Momentum,
    /// Monolithic Newton iteration on the joint state.
    Newton,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FixedPoint => "fixed-point iteration",
            Stage::Energy => "energy solve",
            Stage::Momentum => "momentum solve",
            Stage::Newton => "Newton iteration",
        };
        f.write_str(name)
    }
}

/// What went numerically wrong inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Degeneracy {
    #[error("tau = {tau:e} exceeds the sanity bound (||b|| = {conv_norm:e}, Pe = {peclet:e}, h = {h:e}, xi = {xi:e})")]
    TauTooLarge {
        tau: f64,
        conv_norm: f64,
        peclet: f64,
        h: f64,
        xi: f64,
    },
    #[error("directed diameter {directed:e} exceeds the cell diameter {diameter:e}")]
    DirectedDiameter { directed: f64, diameter: f64 },
    #[error("Peclet number {peclet:e} is not positive and finite (||b|| = {conv_norm:e}, h = {h:e})")]
    Peclet { peclet: f64, conv_norm: f64, h: f64 },
}

/// Errors surfaced by the stabilization engine and the nonlinear solve.
#[derive(Debug, Error)]
pub enum SolveError {
    /// Non-positive diffusivity, zero polynomial degree, malformed cell,
    /// mismatched sizes or an invalid configuration.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Fatal numerical problem tied to one cell.
    #[error("numerical degeneracy in cell {cell}: {kind}")]
    NumericalDegeneracy { cell: usize, kind: Degeneracy },

    /// Iteration budget exhausted without meeting the tolerance.
    #[error("{stage} did not converge after {iterations} iterations (last norm = {last_norm:e})")]
    NonConvergence {
        stage: Stage,
        iterations: usize,
        last_norm: f64,
    },

    /// The correction system of a Newton step could not be solved.
    #[error("linear solve failed during {stage}: {reason}")]
    LinearSolve { stage: Stage, reason: String },

    /// Failure reported by the assembly collaborator, passed through as is.
    #[error(transparent)]
    Assembly(anyhow::Error),
}

impl SolveError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Converts a collaborator error into a `SolveError`.
    ///
    /// Errors that originate from this crate (e.g. a degeneracy raised by the
    /// stabilization evaluator during assembly) are surfaced as themselves,
    /// everything else becomes [`SolveError::Assembly`].
    pub fn from_assembly(err: anyhow::Error) -> Self {
        match err.downcast::<SolveError>() {
            Ok(inner) => inner,
            Err(other) => Self::Assembly(other),
        }
    }
}
