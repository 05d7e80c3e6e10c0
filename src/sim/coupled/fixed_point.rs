//! Warm start: alternate energy and momentum solves until the temperature
//! stops changing.

use serde::{Deserialize, Serialize};

use super::newton::{NewtonConfig, newton_solve};
use super::problem::{Equation, FormSpec, Problem};
use super::state::CoupledState;
use crate::error::Stage;
use crate::{SolveError, SolveResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedPointConfig {
    /// Stop once `||T - T0||` drops below this.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Newton settings of each single-equation solve.
    pub inner: NewtonConfig,
}

impl Default for FixedPointConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-2,
            max_iterations: 50,
            inner: NewtonConfig {
                maximum_iterations: 25,
                absolute_tolerance: 1e-10,
                report: false,
                ..Default::default()
            },
        }
    }
}

impl FixedPointConfig {
    pub fn validate(&self) -> SolveResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SolveError::invalid_input(format!(
                "fixed-point tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(SolveError::invalid_input(
                "fixed-point max_iterations must be at least 1",
            ));
        }
        self.inner.validate()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WarmStart {
    pub state: CoupledState,
    /// Completed energy/momentum sweeps.
    pub iterations: usize,
    /// `||T - T0||` of the last sweep.
    pub temperature_change: f64,
}

/// Runs energy/momentum sweeps from `initial` with locally evaluated density.
///
/// Each sweep solves the energy equation with the velocity frozen, then the
/// momentum equation with the new temperature. `initial` is never modified;
/// a failed sweep leaves no partial result behind.
pub fn warm_start<P: Problem + ?Sized>(
    problem: &P,
    initial: &CoupledState,
    config: &FixedPointConfig,
) -> SolveResult<WarmStart> {
    config.validate()?;
    let mut current = initial.clone();
    let mut change = f64::INFINITY;

    for iteration in 1..=config.max_iterations {
        let (heated, _) = newton_solve(
            problem,
            FormSpec::new(Equation::Energy),
            current.clone(),
            &config.inner,
        )?;
        let (next, _) = newton_solve(
            problem,
            FormSpec::new(Equation::Momentum),
            heated,
            &config.inner,
        )?;

        change = problem.temperature_change_norm(next.temperature(), current.temperature());
        log::info!(
            "{} {iteration}: ||T - T0|| = {change:.3e} (tol = {:.3e})",
            Stage::FixedPoint,
            config.tolerance
        );
        current = next;

        if change < config.tolerance {
            return Ok(WarmStart {
                state: current,
                iterations: iteration,
                temperature_change: change,
            });
        }
    }

    Err(SolveError::NonConvergence {
        stage: Stage::FixedPoint,
        iterations: config.max_iterations,
        last_norm: change,
    })
}
