use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::problem::Equation;
use super::state::{CoupledState, DofLayout, Field};
use crate::{SolveError, SolveResult};

/// Prescribed values on a set of degrees of freedom of one field.
///
/// `dofs` are local to the field (index 0 is the first value of that field),
/// so the same condition applies to single-equation and joint solves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirichletBc {
    pub field: Field,
    pub dofs: Vec<usize>,
    pub values: Vec<f64>,
}

impl DirichletBc {
    pub fn new(field: Field, dofs: Vec<usize>, values: Vec<f64>) -> SolveResult<Self> {
        if dofs.len() != values.len() {
            return Err(SolveError::invalid_input(format!(
                "Dirichlet condition has {} dofs but {} values",
                dofs.len(),
                values.len()
            )));
        }
        Ok(Self {
            field,
            dofs,
            values,
        })
    }

    pub fn uniform(field: Field, dofs: Vec<usize>, value: f64) -> Self {
        let values = vec![value; dofs.len()];
        Self {
            field,
            dofs,
            values,
        }
    }

    /// Checks the dofs against the size of the field in `layout`.
    pub fn validate(&self, layout: DofLayout) -> SolveResult<()> {
        if self.dofs.len() != self.values.len() {
            return Err(SolveError::invalid_input(format!(
                "Dirichlet condition has {} dofs but {} values",
                self.dofs.len(),
                self.values.len()
            )));
        }
        if let Some(g) = self.values.iter().find(|g| !g.is_finite()) {
            return Err(SolveError::invalid_input(format!(
                "Dirichlet value {g} on {:?} field is not finite",
                self.field
            )));
        }
        let size = layout.field_range(self.field).len();
        if let Some(&dof) = self.dofs.iter().find(|&&d| d >= size) {
            return Err(SolveError::invalid_input(format!(
                "Dirichlet dof {dof} out of range for {:?} field with {size} values",
                self.field
            )));
        }
        Ok(())
    }

    /// Row of the field's first dof in the system of `equation`, if the
    /// equation owns this field.
    pub fn row_offset(&self, equation: Equation, layout: DofLayout) -> Option<usize> {
        let unknowns = equation.unknowns(layout);
        let range = layout.field_range(self.field);
        (range.start >= unknowns.start && range.end <= unknowns.end)
            .then(|| range.start - unknowns.start)
    }

    /// Writes the prescribed values into `state`.
    pub fn apply_state(&self, state: &mut CoupledState) {
        let values = state.field_mut(self.field);
        for (&dof, &g) in self.dofs.iter().zip(&self.values) {
            values[dof] = g;
        }
    }

    /// Replaces the constrained rows of `residual` with `x - g`.
    pub fn apply_residual(
        &self,
        equation: Equation,
        state: &CoupledState,
        residual: &mut DVector<f64>,
    ) {
        let Some(offset) = self.row_offset(equation, state.layout()) else {
            return;
        };
        let x = state.field(self.field);
        for (&dof, &g) in self.dofs.iter().zip(&self.values) {
            residual[offset + dof] = x[dof] - g;
        }
    }

    /// Zeroes the constrained rows of `jacobian` and puts 1 on their diagonal.
    pub fn apply_jacobian(&self, equation: Equation, layout: DofLayout, jacobian: &mut DMatrix<f64>) {
        let Some(offset) = self.row_offset(equation, layout) else {
            return;
        };
        for &dof in &self.dofs {
            let row = offset + dof;
            jacobian.row_mut(row).fill(0.0);
            jacobian[(row, row)] = 1.0;
        }
    }
}

/// Validates a set of conditions against `layout` and rejects any dof that
/// is prescribed twice with different values.
///
/// Repeating a dof with the same value is allowed, so overlapping boundary
/// segments can share their corner vertices.
pub fn check_consistent(conditions: &[DirichletBc], layout: DofLayout) -> SolveResult<()> {
    let mut prescribed: HashMap<(Field, usize), f64> = HashMap::new();
    for bc in conditions {
        bc.validate(layout)?;
        for (&dof, &g) in bc.dofs.iter().zip(&bc.values) {
            match prescribed.insert((bc.field, dof), g) {
                Some(previous) if previous != g => {
                    return Err(SolveError::invalid_input(format!(
                        "{:?} dof {dof} is prescribed both {previous} and {g}",
                        bc.field
                    )));
                }
                _ => {}
            }
        }
    }
    Ok(())
}
