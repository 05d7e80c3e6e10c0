use super::fixed_point::warm_start;
use super::newton::{NewtonReport, solve_monolithic};
use super::problem::{EnergyDensity, Problem};
use super::state::CoupledState;
use crate::config::SolveConfig;
use crate::{SolveError, SolveResult};

/// Converged joint state with statistics of both stages.
#[derive(Debug, Clone, PartialEq)]
pub struct CoupledSolution {
    pub state: CoupledState,
    pub warm_start_iterations: usize,
    /// Density the energy equation was frozen at for the Newton stage.
    pub reference_density: f64,
    pub newton: NewtonReport,
}

/// Solves the steady coupled problem from `initial`.
///
/// A fixed-point warm start with local density brings the state close to
/// the solution, then Newton runs on the joint state with the density
/// frozen at its value for the mean warm-start temperature.
pub fn solve<P: Problem + ?Sized>(
    problem: &P,
    initial: &CoupledState,
    config: &SolveConfig,
) -> SolveResult<CoupledSolution> {
    config.validate()?;
    problem.materials().validate()?;

    let warm = warm_start(problem, initial, &config.fixed_point)?;
    log::info!(
        "warm start converged after {} iterations (||T - T0|| = {:.3e})",
        warm.iterations,
        warm.temperature_change
    );

    let mean_temperature = problem.mean_temperature(&warm.state)?;
    let reference_density = problem.materials().density.eval(mean_temperature);
    if !(reference_density.is_finite() && reference_density > 0.0) {
        return Err(SolveError::invalid_input(format!(
            "density {reference_density} at mean temperature {mean_temperature} is not positive"
        )));
    }
    log::info!("density frozen at {reference_density:.6e} (mean T = {mean_temperature:.6e})");

    let (state, newton) = solve_monolithic(
        problem,
        warm.state,
        EnergyDensity::Frozen(reference_density),
        &config.newton,
    )?;

    Ok(CoupledSolution {
        state,
        warm_start_iterations: warm.iterations,
        reference_density,
        newton,
    })
}
