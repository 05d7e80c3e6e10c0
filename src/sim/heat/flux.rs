use serde::{Deserialize, Serialize};

use crate::geom::mesh::Coordinates;
use crate::{Point, SolveError, SolveResult, TriangleMesh};

/// Heat exchange through a boundary segment, positive into the domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeatFlux {
    /// Prescribed heat flux `k dT/dn = flux` [W/m^2].
    Neumann { flux: f64 },
    /// Convective exchange `k dT/dn = transfer_coefficient * (ambient - T)`.
    Robin {
        /// Heat transfer coefficient alpha [W/(m^2 K)].
        transfer_coefficient: f64,
        /// Ambient temperature T_inf [K].
        ambient: f64,
    },
}

impl HeatFlux {
    pub fn validate(&self) -> SolveResult<()> {
        match *self {
            HeatFlux::Neumann { flux } if !flux.is_finite() => {
                Err(SolveError::invalid_input(format!("heat flux {flux} is not finite")))
            }
            HeatFlux::Robin {
                transfer_coefficient,
                ambient,
            } if !(transfer_coefficient >= 0.0
                && transfer_coefficient.is_finite()
                && ambient.is_finite()) =>
            {
                Err(SolveError::invalid_input(format!(
                    "Robin condition needs a finite non-negative transfer coefficient and a finite \
                     ambient temperature, got alpha = {transfer_coefficient}, T_inf = {ambient}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// A heat flux condition on a set of boundary edges given by vertex pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxBoundary {
    pub edges: Vec<(usize, usize)>,
    pub condition: HeatFlux,
}

impl FluxBoundary {
    pub fn new(edges: Vec<(usize, usize)>, condition: HeatFlux) -> Self {
        Self { edges, condition }
    }

    /// All boundary edges of `mesh` whose end points satisfy `pred`.
    pub fn on<F>(mesh: &TriangleMesh, pred: F, condition: HeatFlux) -> Self
    where
        F: Fn(Point) -> bool,
    {
        Self::new(mesh.boundary_edges_where(pred), condition)
    }

    pub fn validate(&self, mesh: &TriangleMesh) -> SolveResult<()> {
        self.condition.validate()?;
        let nv = mesh.num_vertices();
        if let Some(&(a, b)) = self.edges.iter().find(|&&(a, b)| a >= nv || b >= nv || a == b) {
            return Err(SolveError::invalid_input(format!(
                "flux edge ({a}, {b}) is not an edge of a mesh with {nv} vertices"
            )));
        }
        Ok(())
    }

    /// Adds the boundary integral `-int g phi_i ds` to `residual`.
    pub(crate) fn add_residual(
        &self,
        mesh: &TriangleMesh,
        coords: Coordinates,
        temperature: &[f64],
        residual: &mut [f64],
    ) {
        for &(a, b) in &self.edges {
            let scale = edge_scale(mesh, coords, a, b);
            match self.condition {
                HeatFlux::Neumann { flux } => {
                    residual[a] -= 0.5 * flux * scale;
                    residual[b] -= 0.5 * flux * scale;
                }
                HeatFlux::Robin {
                    transfer_coefficient: alpha,
                    ambient,
                } => {
                    let (ta, tb) = (temperature[a], temperature[b]);
                    residual[a] += alpha * scale * (ta / 3.0 + tb / 6.0 - 0.5 * ambient);
                    residual[b] += alpha * scale * (ta / 6.0 + tb / 3.0 - 0.5 * ambient);
                }
            }
        }
    }

    /// Adds the temperature derivative of the boundary integral; only Robin
    /// edges contribute.
    pub(crate) fn add_jacobian(
        &self,
        mesh: &TriangleMesh,
        coords: Coordinates,
        mut add: impl FnMut(usize, usize, f64),
    ) {
        let HeatFlux::Robin {
            transfer_coefficient: alpha,
            ..
        } = self.condition
        else {
            return;
        };
        for &(a, b) in &self.edges {
            let scale = alpha * edge_scale(mesh, coords, a, b);
            add(a, a, scale / 3.0);
            add(b, b, scale / 3.0);
            add(a, b, scale / 6.0);
            add(b, a, scale / 6.0);
        }
    }
}

/// Edge length times the integration weight at the edge midpoint.
fn edge_scale(mesh: &TriangleMesh, coords: Coordinates, a: usize, b: usize) -> f64 {
    let (pa, pb) = (mesh.vertices()[a], mesh.vertices()[b]);
    pa.distance(&pb) * coords.weight(Point::centroid(&[pa, pb]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::mesh::tests::unit_square;

    #[test]
    fn test_neumann_load_sums_to_total_flux() {
        let mesh = unit_square(4);
        let right = FluxBoundary::on(&mesh, |p| p.x > 1.0 - 1e-12, HeatFlux::Neumann { flux: 3.0 });
        assert_eq!(right.edges.len(), 4);
        let mut r = vec![0.0; mesh.num_vertices()];
        right.add_residual(&mesh, Coordinates::Planar, &[], &mut r);
        assert!((r.iter().sum::<f64>() + 3.0).abs() < 1e-14);

        // Revolved right wall is a cylinder of radius 1 and height 1
        let mut r = vec![0.0; mesh.num_vertices()];
        right.add_residual(&mesh, Coordinates::Axisymmetric, &[], &mut r);
        assert!((r.iter().sum::<f64>() + 3.0 * 2.0 * std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_robin_vanishes_at_ambient() {
        let mesh = unit_square(2);
        let bc = FluxBoundary::on(
            &mesh,
            |p| p.y < 1e-12,
            HeatFlux::Robin {
                transfer_coefficient: 5.0,
                ambient: 300.0,
            },
        );
        let t = vec![300.0; mesh.num_vertices()];
        let mut r = vec![0.0; mesh.num_vertices()];
        bc.add_residual(&mesh, Coordinates::Planar, &t, &mut r);
        assert!(r.iter().all(|v| v.abs() < 1e-12), "{r:?}");
    }

    #[test]
    fn test_validation() {
        let mesh = unit_square(1);
        let ok = FluxBoundary::new(vec![(0, 1)], HeatFlux::Neumann { flux: 1.0 });
        ok.validate(&mesh).unwrap();
        let out_of_range = FluxBoundary::new(vec![(0, 9)], HeatFlux::Neumann { flux: 1.0 });
        assert!(out_of_range.validate(&mesh).is_err());
        let negative = FluxBoundary::new(
            vec![(0, 1)],
            HeatFlux::Robin {
                transfer_coefficient: -1.0,
                ambient: 0.0,
            },
        );
        assert!(matches!(negative.validate(&mesh), Err(SolveError::InvalidInput(_))));
    }

    #[test]
    fn test_serde_tags() {
        let bc: HeatFlux = serde_json::from_str(
            r#"{"kind": "robin", "transfer_coefficient": 10.0, "ambient": 293.15}"#,
        )
        .unwrap();
        assert_eq!(
            bc,
            HeatFlux::Robin {
                transfer_coefficient: 10.0,
                ambient: 293.15
            }
        );
    }
}
