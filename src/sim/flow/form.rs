use nalgebra::storage::StorageMut;
use nalgebra::{Dyn, Matrix};

use crate::geom::mesh::Coordinates;
use crate::sim::coupled::Materials;
use crate::sim::heat::NodalVelocity;
use crate::{SolveError, SolveResult, TriangleMesh, Vector};

/// Default pressure stabilization factor `delta`.
pub const PRESSURE_STABILIZATION: f64 = 0.1;

/// Steady generalized Stokes flow of the melt:
///
/// ```text
/// R_(i,c) = sum_K w |K| [ mu grad u_c . grad phi_i + mu u_r phi_i / r^2 [axisymmetric, c = r]
///                         + (grad p)_c phi_i - f_c phi_i ]
/// R_(p,i) = sum_K w |K| [ div u phi_i + delta h^2 / mu (grad p - f) . grad phi_i ]
/// ```
///
/// with `div u = 1/r d(r u_r)/dr + du_z/dz` in axisymmetric coordinates and
/// `f = rho(T) g + extra_force`. Equal-order P1 needs the pressure gradient
/// term in the continuity rows; `h` is the cell diameter. One-point
/// quadrature at the centroid, coefficients at the cell-mean temperature.
#[derive(Debug, Clone)]
pub struct StokesForm<'a> {
    mesh: &'a TriangleMesh,
    materials: &'a Materials,
    coords: Coordinates,
    gravity: Vector,
    extra_force: Vector,
    stabilization: f64,
}

struct CellTerms {
    ids: [usize; 3],
    grads: [Vector; 3],
    measure: f64,
    /// Centroid radius, or 0 for planar cells.
    radius: f64,
    viscosity: f64,
    d_viscosity: f64,
    /// `delta h^2`.
    stabilization: f64,
    force: Vector,
    d_force: Vector,
}

impl CellTerms {
    fn axisymmetric(&self) -> bool {
        self.radius > 0.0
    }

    /// Hoop contribution `phi_i / r^2` per unit centroid radial velocity.
    fn hoop(&self) -> f64 {
        if self.axisymmetric() {
            1.0 / (3.0 * self.radius * self.radius)
        } else {
            0.0
        }
    }

    /// `1/r` term of the axisymmetric divergence per unit centroid radial velocity.
    fn radial_divergence(&self) -> f64 {
        if self.axisymmetric() { 1.0 / self.radius } else { 0.0 }
    }
}

impl<'a> StokesForm<'a> {
    pub fn new(mesh: &'a TriangleMesh, materials: &'a Materials, coords: Coordinates) -> Self {
        Self {
            mesh,
            materials,
            coords,
            gravity: Vector::ZERO,
            extra_force: Vector::ZERO,
            stabilization: PRESSURE_STABILIZATION,
        }
    }

    /// Gravitational acceleration `g` [m/s^2].
    pub fn with_gravity(mut self, gravity: Vector) -> Self {
        self.gravity = gravity;
        self
    }

    /// Body force density added to `rho g` [N/m^3].
    pub fn with_extra_force(mut self, force: Vector) -> Self {
        self.extra_force = force;
        self
    }

    pub fn with_pressure_stabilization(mut self, delta: f64) -> SolveResult<Self> {
        if !(delta > 0.0 && delta.is_finite()) {
            return Err(SolveError::invalid_input(format!(
                "pressure stabilization must be positive and finite, got {delta}"
            )));
        }
        self.stabilization = delta;
        Ok(self)
    }

    pub fn mesh(&self) -> &TriangleMesh {
        self.mesh
    }

    /// Adds the momentum and continuity residuals to `residual` (`3 nv` rows).
    pub fn assemble_residual(
        &self,
        velocity: NodalVelocity,
        pressure: &[f64],
        temperature: &[f64],
        residual: &mut [f64],
    ) -> SolveResult<()> {
        self.check_sizes(velocity, pressure, temperature, residual.len())?;
        let nv = self.mesh.num_vertices();
        for ci in 0..self.mesh.num_cells() {
            let cell = self.cell_terms(ci, temperature)?;
            let grad_u = [
                gradient(&cell, |k| velocity.at(k).dx),
                gradient(&cell, |k| velocity.at(k).dy),
            ];
            let grad_p = gradient(&cell, |k| pressure[k]);
            let u_r = velocity.centroid(cell.ids).dx;
            let divergence = grad_u[0].dx + grad_u[1].dy + u_r * cell.radial_divergence();
            let imbalance = grad_p - cell.force;
            let pressure_term = [grad_p.dx - cell.force.dx, grad_p.dy - cell.force.dy];

            for i in 0..3 {
                let vi = cell.ids[i];
                for c in 0..2 {
                    let mut row = cell.viscosity * grad_u[c].dot(cell.grads[i]) + pressure_term[c] / 3.0;
                    if c == 0 {
                        row += cell.viscosity * u_r * cell.hoop();
                    }
                    residual[2 * vi + c] += cell.measure * row;
                }
                let pspg = cell.stabilization / cell.viscosity * imbalance.dot(cell.grads[i]);
                residual[2 * nv + vi] += cell.measure * (divergence / 3.0 + pspg);
            }
        }
        Ok(())
    }

    /// Adds the derivative with respect to `[u | p]` to `jacobian` (`3 nv x 3 nv`).
    ///
    /// The residual is linear in `(u, p)` at fixed temperature.
    pub fn assemble_jacobian<S>(
        &self,
        temperature: &[f64],
        jacobian: &mut Matrix<f64, Dyn, Dyn, S>,
    ) -> SolveResult<()>
    where
        S: StorageMut<f64, Dyn, Dyn>,
    {
        let nv = self.mesh.num_vertices();
        self.check_jacobian(temperature, jacobian.nrows(), jacobian.ncols(), 3 * nv)?;
        for ci in 0..self.mesh.num_cells() {
            let cell = self.cell_terms(ci, temperature)?;
            let m = cell.measure;
            let mu = cell.viscosity;
            for i in 0..3 {
                let vi = cell.ids[i];
                let p_row = 2 * nv + vi;
                for j in 0..3 {
                    let vj = cell.ids[j];
                    let laplace = mu * cell.grads[j].dot(cell.grads[i]);
                    jacobian[(2 * vi, 2 * vj)] += m * (laplace + mu * cell.hoop() / 3.0);
                    jacobian[(2 * vi + 1, 2 * vj + 1)] += m * laplace;
                    jacobian[(2 * vi, 2 * nv + vj)] += m * cell.grads[j].dx / 3.0;
                    jacobian[(2 * vi + 1, 2 * nv + vj)] += m * cell.grads[j].dy / 3.0;

                    jacobian[(p_row, 2 * vj)] +=
                        m * (cell.grads[j].dx + cell.radial_divergence() / 3.0) / 3.0;
                    jacobian[(p_row, 2 * vj + 1)] += m * cell.grads[j].dy / 3.0;
                    jacobian[(p_row, 2 * nv + vj)] +=
                        m * cell.stabilization / mu * cell.grads[j].dot(cell.grads[i]);
                }
            }
        }
        Ok(())
    }

    /// Adds the derivative with respect to temperature to `jacobian`
    /// (`3 nv x nv`), through `mu(T)` and `rho(T)`.
    pub fn assemble_temperature_jacobian<S>(
        &self,
        velocity: NodalVelocity,
        pressure: &[f64],
        temperature: &[f64],
        jacobian: &mut Matrix<f64, Dyn, Dyn, S>,
    ) -> SolveResult<()>
    where
        S: StorageMut<f64, Dyn, Dyn>,
    {
        let nv = self.mesh.num_vertices();
        self.check_sizes(velocity, pressure, temperature, jacobian.nrows())?;
        if jacobian.ncols() != nv {
            return Err(SolveError::invalid_input(format!(
                "momentum temperature Jacobian needs {nv} columns, got {}",
                jacobian.ncols()
            )));
        }
        for ci in 0..self.mesh.num_cells() {
            let cell = self.cell_terms(ci, temperature)?;
            let grad_u = [
                gradient(&cell, |k| velocity.at(k).dx),
                gradient(&cell, |k| velocity.at(k).dy),
            ];
            let grad_p = gradient(&cell, |k| pressure[k]);
            let u_r = velocity.centroid(cell.ids).dx;
            let imbalance = grad_p - cell.force;
            let d_force = [cell.d_force.dx, cell.d_force.dy];
            let (mu, d_mu) = (cell.viscosity, cell.d_viscosity);

            for i in 0..3 {
                let vi = cell.ids[i];
                let mut rows = [0.0; 3];
                for c in 0..2 {
                    rows[c] = d_mu * grad_u[c].dot(cell.grads[i]) - d_force[c] / 3.0;
                }
                rows[0] += d_mu * u_r * cell.hoop();
                rows[2] = cell.stabilization
                    * (-d_mu / (mu * mu) * imbalance.dot(cell.grads[i])
                        - cell.d_force.dot(cell.grads[i]) / mu);
                // Every vertex of the cell moves the cell-mean temperature alike
                for &vj in &cell.ids {
                    jacobian[(2 * vi, vj)] += cell.measure * rows[0];
                    jacobian[(2 * vi + 1, vj)] += cell.measure * rows[1];
                    jacobian[(2 * nv + vi, vj)] += cell.measure * rows[2];
                }
            }
        }
        Ok(())
    }

    fn cell_terms(&self, ci: usize, temperature: &[f64]) -> SolveResult<CellTerms> {
        let ids = self.mesh.triangles()[ci].as_array();
        let cell = &self.mesh.cells()[ci];
        let t_mean = ids.iter().map(|&v| temperature[v]).sum::<f64>() / 3.0;

        let viscosity = self.materials.viscosity.eval(t_mean);
        if !(viscosity > 0.0 && viscosity.is_finite()) {
            return Err(SolveError::invalid_input(format!(
                "viscosity {viscosity} in cell {ci} at T = {t_mean} is not positive"
            )));
        }
        let centroid = cell.centroid();
        let radius = match self.coords {
            Coordinates::Planar => 0.0,
            Coordinates::Axisymmetric if centroid.x > 0.0 => centroid.x,
            Coordinates::Axisymmetric => {
                return Err(SolveError::invalid_input(format!(
                    "cell {ci} has its centroid at r = {} <= 0",
                    centroid.x
                )));
            }
        };
        let rho = self.materials.density.eval(t_mean);
        let d_rho = self.materials.density.derivative(t_mean) / 3.0;
        let h = cell.diameter();

        Ok(CellTerms {
            ids,
            grads: cell.basis_gradients(),
            measure: cell.area() * self.coords.weight(centroid),
            radius,
            viscosity,
            d_viscosity: self.materials.viscosity.derivative(t_mean) / 3.0,
            stabilization: self.stabilization * h * h,
            force: self.gravity * rho + self.extra_force,
            d_force: self.gravity * d_rho,
        })
    }

    fn check_sizes(
        &self,
        velocity: NodalVelocity,
        pressure: &[f64],
        temperature: &[f64],
        rows: usize,
    ) -> SolveResult<()> {
        let nv = self.mesh.num_vertices();
        if velocity.0.len() != 2 * nv
            || pressure.len() != nv
            || temperature.len() != nv
            || rows != 3 * nv
        {
            return Err(SolveError::invalid_input(format!(
                "Stokes form on {nv} vertices got {} velocity values, {} pressures, \
                 {} temperatures, {rows} rows",
                velocity.0.len(),
                pressure.len(),
                temperature.len()
            )));
        }
        Ok(())
    }

    fn check_jacobian(&self, temperature: &[f64], rows: usize, cols: usize, n: usize) -> SolveResult<()> {
        if temperature.len() != self.mesh.num_vertices() || rows != n || cols != n {
            return Err(SolveError::invalid_input(format!(
                "Stokes Jacobian must be {n} x {n} with {} temperatures, got {rows} x {cols} \
                 with {}",
                self.mesh.num_vertices(),
                temperature.len()
            )));
        }
        Ok(())
    }
}

fn gradient(cell: &CellTerms, value: impl Fn(usize) -> f64) -> Vector {
    (0..3).fold(Vector::ZERO, |acc, k| acc + cell.grads[k] * value(cell.ids[k]))
}
