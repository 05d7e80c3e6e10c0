use serde::{Deserialize, Serialize};

use crate::{SolveError, SolveResult};

/// Temperature-dependent material coefficient.
///
/// Deserialized values are validated, so a table read from a file is never
/// empty or unsorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", try_from = "RawCoefficient")]
pub enum Coefficient {
    Constant {
        value: f64,
    },
    /// `value = reference_value + slope * (T - reference_temperature)`.
    Linear {
        reference_value: f64,
        reference_temperature: f64,
        slope: f64,
    },
    /// Piecewise-linear in T, clamped outside the table.
    Table {
        temperatures: Vec<f64>,
        values: Vec<f64>,
    },
}

/// Unvalidated mirror of [`Coefficient`] used during deserialization.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawCoefficient {
    Constant {
        value: f64,
    },
    Linear {
        reference_value: f64,
        reference_temperature: f64,
        slope: f64,
    },
    Table {
        temperatures: Vec<f64>,
        values: Vec<f64>,
    },
}

impl TryFrom<RawCoefficient> for Coefficient {
    type Error = SolveError;

    fn try_from(raw: RawCoefficient) -> SolveResult<Self> {
        let coefficient = match raw {
            RawCoefficient::Constant { value } => Self::Constant { value },
            RawCoefficient::Linear {
                reference_value,
                reference_temperature,
                slope,
            } => Self::Linear {
                reference_value,
                reference_temperature,
                slope,
            },
            RawCoefficient::Table {
                temperatures,
                values,
            } => Self::Table {
                temperatures,
                values,
            },
        };
        coefficient.validate()?;
        Ok(coefficient)
    }
}

impl Coefficient {
    pub fn constant(value: f64) -> Self {
        Self::Constant { value }
    }

    pub fn linear(reference_value: f64, reference_temperature: f64, slope: f64) -> Self {
        Self::Linear {
            reference_value,
            reference_temperature,
            slope,
        }
    }

    /// Builds a table, rejecting empty, mismatched or unsorted data.
    pub fn table(temperatures: Vec<f64>, values: Vec<f64>) -> SolveResult<Self> {
        let coefficient = Self::Table {
            temperatures,
            values,
        };
        coefficient.validate()?;
        Ok(coefficient)
    }

    pub fn validate(&self) -> SolveResult<()> {
        match self {
            Self::Constant { value } if !value.is_finite() => {
                Err(SolveError::invalid_input("coefficient value is not finite"))
            }
            Self::Linear {
                reference_value,
                reference_temperature,
                slope,
            } if ![reference_value, reference_temperature, slope]
                .iter()
                .all(|v| v.is_finite()) =>
            {
                Err(SolveError::invalid_input("linear coefficient is not finite"))
            }
            Self::Table {
                temperatures,
                values,
            } => {
                if temperatures.is_empty() || temperatures.len() != values.len() {
                    return Err(SolveError::invalid_input(format!(
                        "table needs matching non-empty columns (got {} temperatures, {} values)",
                        temperatures.len(),
                        values.len()
                    )));
                }
                if temperatures.iter().chain(values).any(|v| !v.is_finite()) {
                    return Err(SolveError::invalid_input("table entries must be finite"));
                }
                if temperatures.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(SolveError::invalid_input(
                        "table temperatures must be strictly increasing",
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Value at `temperature`; NaN for a NaN temperature or a malformed table.
    pub fn eval(&self, temperature: f64) -> f64 {
        if temperature.is_nan() {
            return f64::NAN;
        }
        match self {
            Self::Constant { value } => *value,
            Self::Linear {
                reference_value,
                reference_temperature,
                slope,
            } => reference_value + slope * (temperature - reference_temperature),
            Self::Table {
                temperatures,
                values,
            } => interpolate(temperatures, values, temperature),
        }
    }

    /// Derivative with respect to temperature.
    ///
    /// Zero on the clamped ends of a table, including at the end knots.
    pub fn derivative(&self, temperature: f64) -> f64 {
        if temperature.is_nan() {
            return f64::NAN;
        }
        match self {
            Self::Constant { .. } => 0.0,
            Self::Linear { slope, .. } => *slope,
            Self::Table {
                temperatures,
                values,
            } => match segment(temperatures, values, temperature) {
                Segment::Interior(i) => {
                    (values[i] - values[i - 1]) / (temperatures[i] - temperatures[i - 1])
                }
                Segment::Clamped(_) => 0.0,
                Segment::Malformed => f64::NAN,
            },
        }
    }
}

enum Segment {
    /// Index of the first knot strictly above the temperature, in `1..n`.
    Interior(usize),
    /// Index of the end knot the temperature is clamped to.
    Clamped(usize),
    Malformed,
}

fn segment(temperatures: &[f64], values: &[f64], temperature: f64) -> Segment {
    let n = temperatures.len();
    if n == 0 || n != values.len() {
        return Segment::Malformed;
    }
    if temperature <= temperatures[0] {
        return Segment::Clamped(0);
    }
    if temperature >= temperatures[n - 1] {
        return Segment::Clamped(n - 1);
    }
    let i = temperatures.partition_point(|&t| t <= temperature);
    Segment::Interior(i.clamp(1, n - 1))
}

fn interpolate(temperatures: &[f64], values: &[f64], temperature: f64) -> f64 {
    match segment(temperatures, values, temperature) {
        Segment::Interior(i) => {
            let (t0, t1) = (temperatures[i - 1], temperatures[i]);
            let s = (temperature - t0) / (t1 - t0);
            values[i - 1] + s * (values[i] - values[i - 1])
        }
        Segment::Clamped(i) => values[i],
        Segment::Malformed => f64::NAN,
    }
}

/// Material properties of the melt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Materials {
    /// Thermal conductivity kappa [W/(m K)].
    pub conductivity: Coefficient,
    /// Mass density rho [kg/m^3].
    pub density: Coefficient,
    /// Dynamic viscosity mu [Pa s].
    pub viscosity: Coefficient,
    /// Specific heat capacity c_p [J/(kg K)].
    pub heat_capacity: Coefficient,
}

impl Materials {
    pub fn constant(conductivity: f64, density: f64, viscosity: f64, heat_capacity: f64) -> Self {
        Self {
            conductivity: Coefficient::constant(conductivity),
            density: Coefficient::constant(density),
            viscosity: Coefficient::constant(viscosity),
            heat_capacity: Coefficient::constant(heat_capacity),
        }
    }

    pub fn validate(&self) -> SolveResult<()> {
        self.conductivity.validate()?;
        self.density.validate()?;
        self.viscosity.validate()?;
        self.heat_capacity.validate()
    }

    /// Thermal diffusivity `kappa / (rho c_p)` at `temperature`.
    pub fn diffusivity(&self, temperature: f64) -> f64 {
        self.conductivity.eval(temperature)
            / (self.density.eval(temperature) * self.heat_capacity.eval(temperature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_interpolation_and_clamping() {
        let c = Coefficient::table(vec![0.0, 10.0, 20.0], vec![1.0, 2.0, 4.0]).unwrap();
        assert!((c.eval(5.0) - 1.5).abs() < 1e-14);
        assert!((c.eval(15.0) - 3.0).abs() < 1e-14);
        assert!((c.eval(10.0) - 2.0).abs() < 1e-14);
        assert_eq!(c.eval(-5.0), 1.0);
        assert_eq!(c.eval(30.0), 4.0);
        assert!((c.derivative(15.0) - 0.2).abs() < 1e-14);
        assert_eq!(c.derivative(30.0), 0.0);
    }

    #[test]
    fn test_table_validation() {
        assert!(Coefficient::table(vec![], vec![]).is_err());
        assert!(Coefficient::table(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(Coefficient::table(vec![1.0, 0.0], vec![1.0, 2.0]).is_err());
        assert!(Coefficient::table(vec![5.0], vec![7.0]).unwrap().eval(100.0) == 7.0);
    }

    #[test]
    fn test_linear_coefficient() {
        // Boussinesq-like density drop with temperature
        let rho = Coefficient::linear(1000.0, 20.0, -0.2);
        assert!((rho.eval(70.0) - 990.0).abs() < 1e-12);
        assert_eq!(rho.derivative(0.0), -0.2);
    }

    #[test]
    fn test_materials_json_round_trip() {
        let mut m = Materials::constant(30.0, 2500.0, 1e-3, 1000.0);
        m.density = Coefficient::linear(2500.0, 1700.0, -0.1);
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"kind\":\"linear\""), "{json}");
        let back: Materials = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
        assert!((back.diffusivity(1700.0) - 30.0 / 2.5e6).abs() < 1e-15);
    }

    #[test]
    fn test_nan_temperature_evaluates_to_nan() {
        let c = Coefficient::table(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]).unwrap();
        assert!(c.eval(f64::NAN).is_nan());
        assert!(c.derivative(f64::NAN).is_nan());
        assert!(Coefficient::linear(1.0, 0.0, 2.0).eval(f64::NAN).is_nan());
        // Infinite temperatures clamp like any other out-of-range value
        assert_eq!(c.eval(f64::INFINITY), 3.0);
        assert_eq!(c.eval(f64::NEG_INFINITY), 1.0);
    }

    #[test]
    fn test_malformed_table_does_not_panic() {
        let empty = Coefficient::Table {
            temperatures: vec![],
            values: vec![],
        };
        assert!(empty.eval(1.0).is_nan());
        assert!(empty.derivative(1.0).is_nan());
        let ragged = Coefficient::Table {
            temperatures: vec![0.0, 1.0],
            values: vec![5.0],
        };
        assert!(ragged.eval(0.5).is_nan());
    }

    #[test]
    fn test_invalid_tables_are_rejected_on_load() {
        for json in [
            r#"{"kind":"table","temperatures":[],"values":[]}"#,
            r#"{"kind":"table","temperatures":[0.0,1.0],"values":[1.0]}"#,
            r#"{"kind":"table","temperatures":[1.0,0.0],"values":[1.0,2.0]}"#,
        ] {
            let err = serde_json::from_str::<Coefficient>(json).unwrap_err();
            assert!(err.to_string().contains("table"), "{err}");
        }
        let ok: Coefficient =
            serde_json::from_str(r#"{"kind":"table","temperatures":[0.0,1.0],"values":[1.0,3.0]}"#)
                .unwrap();
        assert_eq!(ok.eval(0.5), 2.0);
    }
}
