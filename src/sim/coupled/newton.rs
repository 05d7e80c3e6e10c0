//! Newton iteration over the unknowns of one equation (or of the joint state).

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::boundary::check_consistent;
use super::linear::LinearSolver;
use super::problem::{EnergyDensity, Equation, FormSpec, Problem};
use super::state::CoupledState;
use crate::error::Stage;
use crate::{SolveError, SolveResult};

/// Armijo sufficient-decrease factor of the backtracking line search.
const ARMIJO: f64 = 1e-4;
const MAX_HALVINGS: usize = 10;

/// Newton update rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NewtonMethod {
    /// Full steps damped by a backtracking line search.
    #[default]
    #[serde(rename = "newton_line_search")]
    LineSearch,
    /// Full steps.
    #[serde(rename = "newton_basic")]
    Basic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonConfig {
    pub method: NewtonMethod,
    pub linear_solver: LinearSolver,
    pub maximum_iterations: usize,
    pub absolute_tolerance: f64,
    /// Ignored when 0.
    pub relative_tolerance: f64,
    /// Log progress at `info` instead of `debug`.
    pub report: bool,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            method: NewtonMethod::LineSearch,
            linear_solver: LinearSolver::Direct,
            maximum_iterations: 100,
            absolute_tolerance: 1e-3,
            relative_tolerance: 0.0,
            report: true,
        }
    }
}

impl NewtonConfig {
    pub fn validate(&self) -> SolveResult<()> {
        let atol = self.absolute_tolerance;
        let rtol = self.relative_tolerance;
        if !(atol.is_finite() && atol >= 0.0) || !(rtol.is_finite() && rtol >= 0.0) {
            return Err(SolveError::invalid_input(format!(
                "Newton tolerances must be finite and non-negative (atol = {atol}, rtol = {rtol})"
            )));
        }
        if atol == 0.0 && rtol == 0.0 {
            return Err(SolveError::invalid_input(
                "Newton needs a positive absolute or relative tolerance",
            ));
        }
        Ok(())
    }

    fn converged(&self, norm: f64, initial_norm: f64) -> bool {
        norm <= self.absolute_tolerance
            || (self.relative_tolerance > 0.0 && norm <= self.relative_tolerance * initial_norm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonReport {
    pub iterations: usize,
    pub initial_residual_norm: f64,
    pub residual_norm: f64,
}

/// The equations of `form` as a square system in their own unknowns, with
/// every other field frozen at the values of `frame`.
struct BlockSystem<'a, P: ?Sized> {
    problem: &'a P,
    form: FormSpec,
    frame: CoupledState,
}

impl<P: Problem + ?Sized> BlockSystem<'_, P> {
    fn residual(&mut self, x: &DVector<f64>, residual: &mut DVector<f64>) -> SolveResult<()> {
        let layout = self.frame.layout();
        self.frame.set_block(self.form.equation.unknowns(layout), x);
        residual.fill(0.0);
        self.problem
            .assemble_residual(&self.frame, &self.form, residual)
            .map_err(SolveError::from_assembly)?;
        for bc in self.problem.boundary_conditions() {
            bc.apply_residual(self.form.equation, &self.frame, residual);
        }
        Ok(())
    }

    /// Jacobian at the point of the last residual evaluation.
    fn jacobian(&self, jacobian: &mut DMatrix<f64>) -> SolveResult<()> {
        jacobian.fill(0.0);
        self.problem
            .assemble_jacobian(&self.frame, &self.form, jacobian)
            .map_err(SolveError::from_assembly)?;
        let layout = self.frame.layout();
        for bc in self.problem.boundary_conditions() {
            bc.apply_jacobian(self.form.equation, layout, jacobian);
        }
        Ok(())
    }
}

/// Solves the equations selected by `form` for their unknowns, starting
/// from `state`. Unknowns of other equations keep their values.
///
/// Dirichlet values are imposed on the iterate before the first residual.
pub fn newton_solve<P: Problem + ?Sized>(
    problem: &P,
    form: FormSpec,
    state: CoupledState,
    config: &NewtonConfig,
) -> SolveResult<(CoupledState, NewtonReport)> {
    config.validate()?;
    let layout = problem.layout();
    if state.layout() != layout {
        return Err(SolveError::invalid_input(format!(
            "state layout {:?} does not match problem layout {layout:?}",
            state.layout()
        )));
    }
    let stage = form.equation.stage();
    let unknowns = form.equation.unknowns(layout);
    let n = unknowns.len();

    problem.materials().validate()?;
    let conditions = problem.boundary_conditions();
    check_consistent(conditions, layout)?;

    let mut frame = state;
    for bc in conditions {
        if bc.row_offset(form.equation, layout).is_some() {
            bc.apply_state(&mut frame);
        }
    }
    let mut x = frame.block(unknowns.clone());
    let mut system = BlockSystem {
        problem,
        form,
        frame,
    };

    let mut residual = DVector::zeros(n);
    let mut jacobian = DMatrix::zeros(n, n);
    system.residual(&x, &mut residual)?;
    let initial_norm = residual.norm();
    let mut norm = initial_norm;

    let mut iteration = 0;
    loop {
        progress(config, stage, iteration, norm, initial_norm);
        if !norm.is_finite() {
            return Err(SolveError::NonConvergence {
                stage,
                iterations: iteration,
                last_norm: norm,
            });
        }
        if config.converged(norm, initial_norm) {
            break;
        }
        if iteration == config.maximum_iterations {
            return Err(SolveError::NonConvergence {
                stage,
                iterations: iteration,
                last_norm: norm,
            });
        }

        system.jacobian(&mut jacobian)?;
        let dx = config.linear_solver.solve(&jacobian, &(-&residual), stage)?;
        iteration += 1;

        match config.method {
            NewtonMethod::Basic => {
                x += dx;
                system.residual(&x, &mut residual)?;
                norm = residual.norm();
            }
            NewtonMethod::LineSearch => {
                let mut lambda = 1.0;
                let mut halvings = 0;
                loop {
                    let trial = &x + &dx * lambda;
                    system.residual(&trial, &mut residual)?;
                    let trial_norm = residual.norm();
                    if trial_norm <= (1.0 - ARMIJO * lambda) * norm {
                        x = trial;
                        norm = trial_norm;
                        break;
                    }
                    if halvings == MAX_HALVINGS {
                        log::warn!(
                            "{stage}: line search failed at iteration {iteration} \
                             (step {lambda:e}, r = {trial_norm:e} vs {norm:e})"
                        );
                        return Err(SolveError::NonConvergence {
                            stage,
                            iterations: iteration,
                            last_norm: norm,
                        });
                    }
                    lambda *= 0.5;
                    halvings += 1;
                }
                if halvings > 0 {
                    log::debug!("{stage}: step damped to {lambda:e} at iteration {iteration}");
                }
            }
        }
    }

    let BlockSystem { mut frame, .. } = system;
    frame.set_block(unknowns, &x);
    Ok((
        frame,
        NewtonReport {
            iterations: iteration,
            initial_residual_norm: initial_norm,
            residual_norm: norm,
        },
    ))
}

/// Newton on the joint state with the energy density fixed to `density`.
pub fn solve_monolithic<P: Problem + ?Sized>(
    problem: &P,
    initial: CoupledState,
    density: EnergyDensity,
    config: &NewtonConfig,
) -> SolveResult<(CoupledState, NewtonReport)> {
    let form = FormSpec {
        equation: Equation::Coupled,
        energy_density: density,
    };
    newton_solve(problem, form, initial, config)
}

fn progress(config: &NewtonConfig, stage: Stage, iteration: usize, norm: f64, initial: f64) {
    let relative = if initial > 0.0 { norm / initial } else { 0.0 };
    if config.report {
        log::info!(
            "{stage} {iteration}: r (abs) = {norm:.3e} (tol = {:.3e}) r (rel) = {relative:.3e} (tol = {:.3e})",
            config.absolute_tolerance,
            config.relative_tolerance
        );
    } else {
        log::debug!(
            "{stage} {iteration}: r (abs) = {norm:.3e} (tol = {:.3e}) r (rel) = {relative:.3e} (tol = {:.3e})",
            config.absolute_tolerance,
            config.relative_tolerance
        );
    }
}
