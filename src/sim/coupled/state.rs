use std::ops::Range;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::{SolveError, SolveResult};

/// Physical field of the joint state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Velocity,
    Pressure,
    Temperature,
}

/// Sizes of the three contiguous partitions `[u | p | T]` of the joint vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DofLayout {
    pub velocity: usize,
    pub pressure: usize,
    pub temperature: usize,
}

impl DofLayout {
    pub fn new(velocity: usize, pressure: usize, temperature: usize) -> Self {
        Self {
            velocity,
            pressure,
            temperature,
        }
    }

    /// Length of the joint vector.
    pub fn len(&self) -> usize {
        self.velocity + self.pressure + self.temperature
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn velocity_range(&self) -> Range<usize> {
        0..self.velocity
    }

    pub fn pressure_range(&self) -> Range<usize> {
        self.velocity..self.velocity + self.pressure
    }

    pub fn temperature_range(&self) -> Range<usize> {
        self.velocity + self.pressure..self.len()
    }

    /// Velocity and pressure together.
    pub fn momentum_range(&self) -> Range<usize> {
        0..self.velocity + self.pressure
    }

    pub fn field_range(&self, field: Field) -> Range<usize> {
        match field {
            Field::Velocity => self.velocity_range(),
            Field::Pressure => self.pressure_range(),
            Field::Temperature => self.temperature_range(),
        }
    }
}

/// Velocity, pressure and temperature stored as one joint vector.
#[derive(Debug, Clone, PartialEq)]
pub struct CoupledState {
    layout: DofLayout,
    values: DVector<f64>,
}

impl CoupledState {
    pub fn zeros(layout: DofLayout) -> Self {
        Self {
            layout,
            values: DVector::zeros(layout.len()),
        }
    }

    pub fn from_parts(
        layout: DofLayout,
        velocity: &[f64],
        pressure: &[f64],
        temperature: &[f64],
    ) -> SolveResult<Self> {
        for (name, got, expected) in [
            ("velocity", velocity.len(), layout.velocity),
            ("pressure", pressure.len(), layout.pressure),
            ("temperature", temperature.len(), layout.temperature),
        ] {
            if got != expected {
                return Err(SolveError::invalid_input(format!(
                    "{name} has {got} values, layout expects {expected}"
                )));
            }
        }
        let values = DVector::from_iterator(
            layout.len(),
            velocity
                .iter()
                .chain(pressure)
                .chain(temperature)
                .copied(),
        );
        Ok(Self { layout, values })
    }

    pub fn from_vector(layout: DofLayout, values: DVector<f64>) -> SolveResult<Self> {
        if values.len() != layout.len() {
            return Err(SolveError::invalid_input(format!(
                "joint vector has {} values, layout expects {}",
                values.len(),
                layout.len()
            )));
        }
        Ok(Self { layout, values })
    }

    pub fn layout(&self) -> DofLayout {
        self.layout
    }

    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut DVector<f64> {
        &mut self.values
    }

    pub fn into_vector(self) -> DVector<f64> {
        self.values
    }

    pub fn velocity(&self) -> &[f64] {
        self.field(Field::Velocity)
    }

    pub fn pressure(&self) -> &[f64] {
        self.field(Field::Pressure)
    }

    pub fn temperature(&self) -> &[f64] {
        self.field(Field::Temperature)
    }

    pub fn field(&self, field: Field) -> &[f64] {
        &self.values.as_slice()[self.layout.field_range(field)]
    }

    pub fn field_mut(&mut self, field: Field) -> &mut [f64] {
        let range = self.layout.field_range(field);
        &mut self.values.as_mut_slice()[range]
    }

    /// Copy of the values in `range`.
    pub(crate) fn block(&self, range: Range<usize>) -> DVector<f64> {
        DVector::from_column_slice(&self.values.as_slice()[range])
    }

    /// Overwrites the values in `range` with `block`.
    pub(crate) fn set_block(&mut self, range: Range<usize>, block: &DVector<f64>) {
        self.values.as_mut_slice()[range].copy_from_slice(block.as_slice());
    }
}
