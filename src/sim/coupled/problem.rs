use std::ops::Range;

use anyhow::Context;
use nalgebra::{DMatrix, DVector};

use super::boundary::DirichletBc;
use super::materials::Materials;
use super::state::{CoupledState, DofLayout};
use crate::error::Stage;
use crate::{SolveError, SolveResult};

/// Which equations to assemble, and therefore which unknowns are solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equation {
    /// Steady energy equation, temperature unknowns only.
    Energy,
    /// Generalized Stokes equation, velocity and pressure unknowns.
    Momentum,
    /// Both, over the joint state.
    Coupled,
}

impl Equation {
    /// Range of the joint vector solved for by this equation. The rows of
    /// its residual are numbered the same way, starting from 0.
    pub fn unknowns(self, layout: DofLayout) -> Range<usize> {
        match self {
            Equation::Energy => layout.temperature_range(),
            Equation::Momentum => layout.momentum_range(),
            Equation::Coupled => 0..layout.len(),
        }
    }

    pub(crate) fn stage(self) -> Stage {
        match self {
            Equation::Energy => Stage::Energy,
            Equation::Momentum => Stage::Momentum,
            Equation::Coupled => Stage::Newton,
        }
    }
}

/// Density used in the energy equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnergyDensity {
    /// `rho(T)` evaluated locally.
    Local,
    /// A single value for the whole domain.
    Frozen(f64),
}

/// Selects the residual form a [`Problem`] should assemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormSpec {
    pub equation: Equation,
    pub energy_density: EnergyDensity,
}

impl FormSpec {
    pub fn new(equation: Equation) -> Self {
        Self {
            equation,
            energy_density: EnergyDensity::Local,
        }
    }

    pub fn with_frozen_density(mut self, density: f64) -> Self {
        self.energy_density = EnergyDensity::Frozen(density);
        self
    }

    pub fn density(&self, local: f64) -> f64 {
        match self.energy_density {
            EnergyDensity::Local => local,
            EnergyDensity::Frozen(rho) => rho,
        }
    }
}

/// Weak-form assembly of the coupled problem.
///
/// Buffers handed to the assembly methods are sized to the equation
/// (`form.equation.unknowns(layout).len()`) and zeroed. Implementations
/// accumulate into them; boundary conditions are applied by the solver
/// afterwards.
pub trait Problem {
    fn layout(&self) -> DofLayout;

    fn materials(&self) -> &Materials;

    fn boundary_conditions(&self) -> &[DirichletBc];

    fn assemble_residual(
        &self,
        state: &CoupledState,
        form: &FormSpec,
        residual: &mut DVector<f64>,
    ) -> anyhow::Result<()>;

    /// Jacobian of the residual with respect to the equation's unknowns.
    ///
    /// Defaults to forward differences; override with an exact Jacobian
    /// where one is available.
    fn assemble_jacobian(
        &self,
        state: &CoupledState,
        form: &FormSpec,
        jacobian: &mut DMatrix<f64>,
    ) -> anyhow::Result<()> {
        finite_difference_jacobian(self, state, form, jacobian)
    }

    /// Temperature used to freeze the density for the monolithic stage.
    ///
    /// The default is the plain mean of the temperature dofs, which only
    /// matches the domain average on uniform meshes. Mesh-based problems
    /// should return the weighted domain average instead (see
    /// [`TriangleMesh::average`](crate::TriangleMesh::average)).
    fn mean_temperature(&self, state: &CoupledState) -> SolveResult<f64> {
        let t = state.temperature();
        if t.is_empty() {
            return Err(SolveError::invalid_input("no temperature dofs to average"));
        }
        Ok(t.iter().sum::<f64>() / t.len() as f64)
    }

    /// Distance between two temperature iterates of the warm start.
    fn temperature_change_norm(&self, new: &[f64], old: &[f64]) -> f64 {
        new.iter()
            .zip(old)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

/// Forward-difference Jacobian, one residual evaluation per unknown.
///
/// The perturbation of unknown `j` is `sqrt(eps) * max(1, |x_j|)`.
pub fn finite_difference_jacobian<P: Problem + ?Sized>(
    problem: &P,
    state: &CoupledState,
    form: &FormSpec,
    jacobian: &mut DMatrix<f64>,
) -> anyhow::Result<()> {
    let unknowns = form.equation.unknowns(state.layout());
    let n = unknowns.len();
    anyhow::ensure!(
        jacobian.nrows() == n && jacobian.ncols() == n,
        "Jacobian is {}x{}, expected {n}x{n}",
        jacobian.nrows(),
        jacobian.ncols()
    );

    let mut base = DVector::zeros(n);
    problem
        .assemble_residual(state, form, &mut base)
        .context("finite-difference Jacobian: base residual")?;

    let sqrt_eps = f64::EPSILON.sqrt();
    let mut perturbed = state.clone();
    let mut column = DVector::zeros(n);
    for (j, index) in unknowns.enumerate() {
        let x = state.values()[index];
        let delta = sqrt_eps * x.abs().max(1.0);
        perturbed.values_mut()[index] = x + delta;
        column.fill(0.0);
        problem
            .assemble_residual(&perturbed, form, &mut column)
            .with_context(|| format!("finite-difference Jacobian: column {j}"))?;
        jacobian.column_mut(j).copy_from(&((&column - &base) / delta));
        perturbed.values_mut()[index] = x;
    }
    Ok(())
}
