use nalgebra::storage::StorageMut;
use nalgebra::{Dyn, Matrix};

use super::flux::FluxBoundary;
use crate::geom::mesh::Coordinates;
use crate::sim::coupled::{EnergyDensity, Materials};
use crate::sim::stabilization::{Supg, Tau, TauSensitivity};
use crate::{SolveError, SolveResult, TriangleMesh, Vector};

/// P1 velocity stored per vertex as `[u_x0, u_y0, u_x1, u_y1, ...]`.
#[derive(Debug, Clone, Copy)]
pub struct NodalVelocity<'a>(pub &'a [f64]);

impl NodalVelocity<'_> {
    pub fn at(&self, vertex: usize) -> Vector {
        Vector::new(self.0[2 * vertex], self.0[2 * vertex + 1])
    }

    /// Value of the P1 field at the centroid of the cell `ids`.
    pub fn centroid(&self, ids: [usize; 3]) -> Vector {
        (self.at(ids[0]) + self.at(ids[1]) + self.at(ids[2])) * (1.0 / 3.0)
    }
}

/// Steady convection-diffusion of heat with SUPG test functions:
///
/// ```text
/// R_i = sum_K w |K| [ k grad T . grad phi_i
///                     + (rho c_p b . grad T - q) (phi_i(c) + tau b . grad phi_i) ]
///     - sum_E w |E| int_E g phi_i
/// ```
///
/// One-point quadrature at the centroid `c`; coefficients are taken at the
/// cell-mean temperature. Boundary edges without a [`FluxBoundary`] are
/// insulated unless the caller constrains them.
#[derive(Debug, Clone)]
pub struct EnergyForm<'a> {
    mesh: &'a TriangleMesh,
    materials: &'a Materials,
    coords: Coordinates,
    /// Volumetric heat source q [W/m^3].
    source: f64,
    flux: Vec<FluxBoundary>,
}

/// Per-cell quantities shared by residual and Jacobians.
struct CellTerms {
    ids: [usize; 3],
    grads: [Vector; 3],
    measure: f64,
    conductivity: f64,
    rho_cp: f64,
    /// Derivatives of `k` and `rho c_p` with respect to one vertex temperature.
    d_conductivity: f64,
    d_rho_cp: f64,
    velocity: Vector,
    tau: Tau,
    sensitivity: TauSensitivity,
}

impl CellTerms {
    fn test_function(&self, i: usize) -> f64 {
        1.0 / 3.0 + self.tau.tau_b.dot(self.grads[i])
    }

    /// `d tau / d T_j` through the diffusivity `k / (rho c_p)`.
    fn d_tau_dt(&self) -> f64 {
        let d_sigma = (self.d_conductivity * self.rho_cp - self.conductivity * self.d_rho_cp)
            / (self.rho_cp * self.rho_cp);
        self.sensitivity.d_tau_dsigma * d_sigma
    }
}

impl<'a> EnergyForm<'a> {
    pub fn new(mesh: &'a TriangleMesh, materials: &'a Materials, coords: Coordinates) -> Self {
        Self {
            mesh,
            materials,
            coords,
            source: 0.0,
            flux: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: f64) -> Self {
        self.source = source;
        self
    }

    /// Adds a heat flux condition on some boundary edges.
    pub fn with_flux_boundary(mut self, boundary: FluxBoundary) -> SolveResult<Self> {
        boundary.validate(self.mesh)?;
        self.flux.push(boundary);
        Ok(self)
    }

    pub fn mesh(&self) -> &TriangleMesh {
        self.mesh
    }

    pub fn coords(&self) -> Coordinates {
        self.coords
    }

    /// Adds the energy residual to `residual` (one row per vertex).
    pub fn assemble_residual(
        &self,
        temperature: &[f64],
        velocity: NodalVelocity,
        density: EnergyDensity,
        residual: &mut [f64],
    ) -> SolveResult<()> {
        self.check_sizes(temperature, velocity, residual.len())?;
        for ci in 0..self.mesh.num_cells() {
            let cell = self.cell_terms(ci, temperature, velocity, density)?;
            let grad_t = gradient(&cell, temperature);
            let convection = cell.rho_cp * cell.velocity.dot(grad_t) - self.source;
            for i in 0..3 {
                let diffusion = cell.conductivity * grad_t.dot(cell.grads[i]);
                residual[cell.ids[i]] +=
                    cell.measure * (diffusion + convection * cell.test_function(i));
            }
        }
        for boundary in &self.flux {
            boundary.add_residual(self.mesh, self.coords, temperature, residual);
        }
        Ok(())
    }

    /// Adds `dR/dT` to `jacobian` (`nv x nv`).
    ///
    /// Includes the temperature dependence of the coefficients and of `tau`;
    /// with [`EnergyDensity::Frozen`] only `c_p` carries it in `rho c_p`.
    pub fn assemble_jacobian<S>(
        &self,
        temperature: &[f64],
        velocity: NodalVelocity,
        density: EnergyDensity,
        jacobian: &mut Matrix<f64, Dyn, Dyn, S>,
    ) -> SolveResult<()>
    where
        S: StorageMut<f64, Dyn, Dyn>,
    {
        self.check_sizes(temperature, velocity, jacobian.nrows())?;
        if jacobian.ncols() != jacobian.nrows() {
            return Err(SolveError::invalid_input("energy Jacobian must be square"));
        }
        for ci in 0..self.mesh.num_cells() {
            let cell = self.cell_terms(ci, temperature, velocity, density)?;
            let grad_t = gradient(&cell, temperature);
            let b_grad_t = cell.velocity.dot(grad_t);
            let convection = cell.rho_cp * b_grad_t - self.source;
            let d_tau = cell.d_tau_dt();
            for i in 0..3 {
                let test = cell.test_function(i);
                let streamline = cell.velocity.dot(cell.grads[i]);
                for j in 0..3 {
                    let diffusion = cell.d_conductivity * grad_t.dot(cell.grads[i])
                        + cell.conductivity * cell.grads[j].dot(cell.grads[i]);
                    let d_convection =
                        cell.d_rho_cp * b_grad_t + cell.rho_cp * cell.velocity.dot(cell.grads[j]);
                    jacobian[(cell.ids[i], cell.ids[j])] += cell.measure
                        * (diffusion + d_convection * test + convection * d_tau * streamline);
                }
            }
        }
        for boundary in &self.flux {
            boundary.add_jacobian(self.mesh, self.coords, |i, j, v| jacobian[(i, j)] += v);
        }
        Ok(())
    }

    /// Adds `dR/du` to `jacobian` (`nv x 2 nv`, interleaved velocity columns).
    ///
    /// Cells whose convection is below the stabilization cut-off contribute
    /// no `tau` derivative.
    pub fn assemble_velocity_jacobian<S>(
        &self,
        temperature: &[f64],
        velocity: NodalVelocity,
        density: EnergyDensity,
        jacobian: &mut Matrix<f64, Dyn, Dyn, S>,
    ) -> SolveResult<()>
    where
        S: StorageMut<f64, Dyn, Dyn>,
    {
        self.check_sizes(temperature, velocity, jacobian.nrows())?;
        if jacobian.ncols() != 2 * jacobian.nrows() {
            return Err(SolveError::invalid_input(format!(
                "energy velocity Jacobian needs {} columns, got {}",
                2 * jacobian.nrows(),
                jacobian.ncols()
            )));
        }
        for ci in 0..self.mesh.num_cells() {
            let cell = self.cell_terms(ci, temperature, velocity, density)?;
            let grad_t = gradient(&cell, temperature);
            let convection = cell.rho_cp * cell.velocity.dot(grad_t) - self.source;
            let grad_t = [grad_t.dx, grad_t.dy];
            let d_tau = [cell.sensitivity.d_tau_db.dx, cell.sensitivity.d_tau_db.dy];
            for i in 0..3 {
                let test = cell.test_function(i);
                let streamline = cell.velocity.dot(cell.grads[i]);
                let grad_i = [cell.grads[i].dx, cell.grads[i].dy];
                for c in 0..2 {
                    // d R_i / d b_c, with b the centroid mean of the three vertex values
                    let d_b = cell.measure
                        * (cell.rho_cp * grad_t[c] * test
                            + convection * (d_tau[c] * streamline + cell.tau.tau * grad_i[c]));
                    for &k in &cell.ids {
                        jacobian[(cell.ids[i], 2 * k + c)] += d_b / 3.0;
                    }
                }
            }
        }
        Ok(())
    }

    /// Stabilization parameters of every cell.
    pub fn tau_field(
        &self,
        temperature: &[f64],
        velocity: NodalVelocity,
        density: EnergyDensity,
    ) -> SolveResult<Vec<Tau>> {
        self.check_sizes(temperature, velocity, temperature.len())?;
        (0..self.mesh.num_cells())
            .map(|ci| Ok(self.cell_terms(ci, temperature, velocity, density)?.tau))
            .collect()
    }

    fn cell_terms(
        &self,
        ci: usize,
        temperature: &[f64],
        velocity: NodalVelocity,
        density: EnergyDensity,
    ) -> SolveResult<CellTerms> {
        let ids = self.mesh.triangles()[ci].as_array();
        let cell = &self.mesh.cells()[ci];
        let t_mean = ids.iter().map(|&v| temperature[v]).sum::<f64>() / 3.0;

        let m = self.materials;
        let conductivity = m.conductivity.eval(t_mean);
        let (rho, d_rho) = match density {
            EnergyDensity::Local => (m.density.eval(t_mean), m.density.derivative(t_mean)),
            EnergyDensity::Frozen(rho) => (rho, 0.0),
        };
        let (cp, d_cp) = (m.heat_capacity.eval(t_mean), m.heat_capacity.derivative(t_mean));
        let rho_cp = rho * cp;
        let b = velocity.centroid(ids);

        let supg = Supg::new(conductivity / rho_cp, 1).map_err(|e| {
            SolveError::invalid_input(format!("cell {ci} at T = {t_mean}: {e}"))
        })?;
        let (tau, sensitivity) = supg.eval_with_sensitivity(ci, cell, b)?;

        Ok(CellTerms {
            ids,
            grads: cell.basis_gradients(),
            measure: cell.area() * self.coords.weight(cell.centroid()),
            conductivity,
            rho_cp,
            d_conductivity: m.conductivity.derivative(t_mean) / 3.0,
            d_rho_cp: (d_rho * cp + rho * d_cp) / 3.0,
            velocity: b,
            tau,
            sensitivity,
        })
    }

    fn check_sizes(&self, temperature: &[f64], velocity: NodalVelocity, rows: usize) -> SolveResult<()> {
        let nv = self.mesh.num_vertices();
        if temperature.len() != nv || velocity.0.len() != 2 * nv || rows != nv {
            return Err(SolveError::invalid_input(format!(
                "energy form on {nv} vertices got {} temperatures, {} velocity values, {rows} rows",
                temperature.len(),
                velocity.0.len()
            )));
        }
        Ok(())
    }
}

fn gradient(cell: &CellTerms, temperature: &[f64]) -> Vector {
    (0..3).fold(Vector::ZERO, |acc, k| {
        acc + cell.grads[k] * temperature[cell.ids[k]]
    })
}

#[cfg(test)]
mod tests {
    use nalgebra::{DMatrix, DVector};

    use super::*;
    use crate::geom::mesh::tests::unit_square;
    use crate::sim::coupled::{Coefficient, LinearSolver};
    use crate::sim::heat::flux::HeatFlux;
    use crate::error::Stage;

    fn uniform_velocity(nv: usize, b: Vector) -> Vec<f64> {
        (0..nv).flat_map(|_| [b.dx, b.dy]).collect()
    }

    /// Replaces boundary rows by `T = g` and solves the linear system.
    fn solve_dirichlet(
        form: &EnergyForm,
        velocity: &[f64],
        exact: impl Fn(f64, f64) -> f64,
    ) -> Vec<f64> {
        let boundary = form.mesh().boundary_vertices();
        solve_constrained(form, velocity, &boundary, exact)
    }

    /// Solves the linear problem with `T = g` on the `constrained` vertices.
    fn solve_constrained(
        form: &EnergyForm,
        velocity: &[f64],
        constrained: &[usize],
        exact: impl Fn(f64, f64) -> f64,
    ) -> Vec<f64> {
        let mesh = form.mesh();
        let nv = mesh.num_vertices();
        let zero = vec![0.0; nv];
        let mut jac = DMatrix::zeros(nv, nv);
        let mut r = vec![0.0; nv];
        form.assemble_jacobian(&zero, NodalVelocity(velocity), EnergyDensity::Local, &mut jac)
            .unwrap();
        form.assemble_residual(&zero, NodalVelocity(velocity), EnergyDensity::Local, &mut r)
            .unwrap();
        let mut rhs = DVector::from_vec(r).map(|v| -v);
        for &v in constrained {
            jac.row_mut(v).fill(0.0);
            jac[(v, v)] = 1.0;
            let p = mesh.vertices()[v];
            rhs[v] = exact(p.x, p.y);
        }
        LinearSolver::Direct
            .solve(&jac, &rhs, Stage::Energy)
            .unwrap()
            .as_slice()
            .to_vec()
    }

    /// Materials with every coefficient depending on temperature.
    fn variable_materials() -> Materials {
        Materials {
            conductivity: Coefficient::linear(0.05, 0.0, 0.01),
            density: Coefficient::linear(1.5, 0.0, -0.1),
            viscosity: Coefficient::constant(1.0),
            heat_capacity: Coefficient::table(vec![-10.0, 10.0], vec![1.0, 5.0]).unwrap(),
        }
    }

    fn swirl(mesh: &TriangleMesh) -> Vec<f64> {
        mesh.vertices()
            .iter()
            .flat_map(|p| [0.3 + p.y, 1.0 - p.x])
            .collect()
    }

    fn residual_at(form: &EnergyForm, t: &[f64], u: &[f64], density: EnergyDensity) -> Vec<f64> {
        let mut r = vec![0.0; t.len()];
        form.assemble_residual(t, NodalVelocity(u), density, &mut r).unwrap();
        r
    }

    #[test]
    fn test_linear_solution_is_reproduced() {
        // b . grad T = 1 with T = x, balanced by q = rho c_p
        let mesh = unit_square(6);
        let materials = Materials::constant(0.01, 2.0, 1.0, 3.0);
        let form = EnergyForm::new(&mesh, &materials, Coordinates::Planar).with_source(6.0);
        let velocity = uniform_velocity(mesh.num_vertices(), Vector::new(1.0, 0.0));
        let t = solve_dirichlet(&form, &velocity, |x, _| x);
        for (v, p) in mesh.vertices().iter().enumerate() {
            assert!((t[v] - p.x).abs() < 1e-10, "T({p}) = {} vs {}", t[v], p.x);
        }

        let mut r = vec![0.0; mesh.num_vertices()];
        form.assemble_residual(&t, NodalVelocity(&velocity), EnergyDensity::Local, &mut r)
            .unwrap();
        let boundary = mesh.boundary_vertices();
        for (v, rv) in r.iter().enumerate() {
            if boundary.binary_search(&v).is_err() {
                assert!(rv.abs() < 1e-10, "interior residual {rv} at vertex {v}");
            }
        }
    }

    #[test]
    fn test_pure_diffusion_matches_linear_profile() {
        let mesh = unit_square(5);
        let materials = Materials::constant(1.0, 1.0, 1.0, 1.0);
        let form = EnergyForm::new(&mesh, &materials, Coordinates::Planar);
        let velocity = vec![0.0; 2 * mesh.num_vertices()];
        let t = solve_dirichlet(&form, &velocity, |x, y| 2.0 * x - y + 1.0);
        for (v, p) in mesh.vertices().iter().enumerate() {
            assert!((t[v] - (2.0 * p.x - p.y + 1.0)).abs() < 1e-10);
        }
        let taus = form
            .tau_field(&t, NodalVelocity(&velocity), EnergyDensity::Local)
            .unwrap();
        assert!(taus.iter().all(|tau| *tau == Tau::ZERO));
    }

    #[test]
    fn test_jacobian_matches_finite_differences() {
        let mesh = unit_square(3);
        let materials = variable_materials();
        let robin = FluxBoundary::on(
            &mesh,
            |p| p.y > 1.0 - 1e-12,
            HeatFlux::Robin {
                transfer_coefficient: 2.0,
                ambient: 0.5,
            },
        );
        let form = EnergyForm::new(&mesh, &materials, Coordinates::Axisymmetric)
            .with_source(1.0)
            .with_flux_boundary(robin)
            .unwrap();
        let nv = mesh.num_vertices();
        let velocity = swirl(&mesh);
        let t: Vec<f64> = mesh.vertices().iter().map(|p| p.x * p.x + p.y).collect();

        for density in [EnergyDensity::Local, EnergyDensity::Frozen(1.5)] {
            let mut jac = DMatrix::zeros(nv, nv);
            form.assemble_jacobian(&t, NodalVelocity(&velocity), density, &mut jac)
                .unwrap();
            let d = 1e-6;
            for j in 0..nv {
                let (mut tp, mut tm) = (t.clone(), t.clone());
                tp[j] += d;
                tm[j] -= d;
                let rp = residual_at(&form, &tp, &velocity, density);
                let rm = residual_at(&form, &tm, &velocity, density);
                for i in 0..nv {
                    let fd = (rp[i] - rm[i]) / (2.0 * d);
                    assert!(
                        (fd - jac[(i, j)]).abs() < 1e-6 * (1.0 + fd.abs()),
                        "{density:?} J[{i},{j}]: {fd} vs {}",
                        jac[(i, j)]
                    );
                }
            }
        }
    }

    #[test]
    fn test_velocity_jacobian_matches_finite_differences() {
        let mesh = unit_square(3);
        let materials = variable_materials();
        let form = EnergyForm::new(&mesh, &materials, Coordinates::Planar).with_source(0.5);
        let nv = mesh.num_vertices();
        let velocity = swirl(&mesh);
        let t: Vec<f64> = mesh.vertices().iter().map(|p| 2.0 * p.x - p.y * p.y).collect();

        let mut jac = DMatrix::zeros(nv, 2 * nv);
        form.assemble_velocity_jacobian(&t, NodalVelocity(&velocity), EnergyDensity::Local, &mut jac)
            .unwrap();
        let d = 1e-6;
        for j in 0..2 * nv {
            let (mut up, mut um) = (velocity.clone(), velocity.clone());
            up[j] += d;
            um[j] -= d;
            let rp = residual_at(&form, &t, &up, EnergyDensity::Local);
            let rm = residual_at(&form, &t, &um, EnergyDensity::Local);
            for i in 0..nv {
                let fd = (rp[i] - rm[i]) / (2.0 * d);
                assert!(
                    (fd - jac[(i, j)]).abs() < 1e-6 * (1.0 + fd.abs()),
                    "dR[{i}]/du[{j}]: {fd} vs {}",
                    jac[(i, j)]
                );
            }
        }

        let mut square = DMatrix::zeros(nv, nv);
        let err = form
            .assemble_velocity_jacobian(&t, NodalVelocity(&velocity), EnergyDensity::Local, &mut square)
            .unwrap_err();
        assert!(matches!(err, SolveError::InvalidInput(_)));
    }

    #[test]
    fn test_jacobian_into_a_block_view() {
        let mesh = unit_square(2);
        let materials = variable_materials();
        let form = EnergyForm::new(&mesh, &materials, Coordinates::Planar);
        let nv = mesh.num_vertices();
        let velocity = swirl(&mesh);
        let t = vec![0.25; nv];

        let mut alone = DMatrix::zeros(nv, nv);
        form.assemble_jacobian(&t, NodalVelocity(&velocity), EnergyDensity::Local, &mut alone)
            .unwrap();
        let mut joint = DMatrix::zeros(3 * nv, 3 * nv);
        form.assemble_jacobian(
            &t,
            NodalVelocity(&velocity),
            EnergyDensity::Local,
            &mut joint.view_mut((2 * nv, 2 * nv), (nv, nv)),
        )
        .unwrap();
        assert_eq!(joint.view((2 * nv, 2 * nv), (nv, nv)), alone);
        assert_eq!(joint.view((0, 0), (2 * nv, 3 * nv)).amax(), 0.0);
    }

    #[test]
    fn test_neumann_flux_gives_linear_profile() {
        // T = 0 on x = 0, k dT/dx = g on x = 1, insulated top and bottom
        let mesh = unit_square(4);
        let materials = Materials::constant(2.0, 1.0, 1.0, 1.0);
        let g = 3.0;
        let form = EnergyForm::new(&mesh, &materials, Coordinates::Planar)
            .with_flux_boundary(FluxBoundary::on(
                &mesh,
                |p| p.x > 1.0 - 1e-12,
                HeatFlux::Neumann { flux: g },
            ))
            .unwrap();
        let velocity = vec![0.0; 2 * mesh.num_vertices()];
        let left: Vec<usize> = (0..mesh.num_vertices())
            .filter(|&v| mesh.vertices()[v].x < 1e-12)
            .collect();
        let t = solve_constrained(&form, &velocity, &left, |_, _| 0.0);
        for (v, p) in mesh.vertices().iter().enumerate() {
            let expected = g * p.x / 2.0;
            assert!((t[v] - expected).abs() < 1e-10, "T({p}) = {} vs {expected}", t[v]);
        }
    }

    #[test]
    fn test_robin_exchange_gives_linear_profile() {
        // k a = alpha (T_inf - a) at x = 1 for T = a x
        let mesh = unit_square(4);
        let materials = Materials::constant(1.0, 1.0, 1.0, 1.0);
        let (alpha, ambient) = (3.0, 8.0);
        let form = EnergyForm::new(&mesh, &materials, Coordinates::Planar)
            .with_flux_boundary(FluxBoundary::on(
                &mesh,
                |p| p.x > 1.0 - 1e-12,
                HeatFlux::Robin {
                    transfer_coefficient: alpha,
                    ambient,
                },
            ))
            .unwrap();
        let velocity = vec![0.0; 2 * mesh.num_vertices()];
        let left: Vec<usize> = (0..mesh.num_vertices())
            .filter(|&v| mesh.vertices()[v].x < 1e-12)
            .collect();
        let t = solve_constrained(&form, &velocity, &left, |_, _| 0.0);
        let slope = alpha * ambient / (1.0 + alpha);
        for (v, p) in mesh.vertices().iter().enumerate() {
            assert!((t[v] - slope * p.x).abs() < 1e-10, "T({p}) = {}", t[v]);
        }
    }

    #[test]
    fn test_flux_boundary_is_validated() {
        let mesh = unit_square(2);
        let materials = Materials::constant(1.0, 1.0, 1.0, 1.0);
        let res = EnergyForm::new(&mesh, &materials, Coordinates::Planar).with_flux_boundary(
            FluxBoundary::new(vec![(0, 100)], HeatFlux::Neumann { flux: 1.0 }),
        );
        assert!(matches!(res, Err(SolveError::InvalidInput(_))));
    }

    #[test]
    fn test_frozen_density_overrides_local() {
        let mesh = unit_square(2);
        let mut materials = Materials::constant(1.0, 1.0, 1.0, 1.0);
        materials.density = Coefficient::linear(1.0, 0.0, 1.0);
        let form = EnergyForm::new(&mesh, &materials, Coordinates::Planar);
        let nv = mesh.num_vertices();
        let velocity = uniform_velocity(nv, Vector::new(0.0, 1.0));
        let t: Vec<f64> = mesh.vertices().iter().map(|p| p.y).collect();

        let mut local = vec![0.0; nv];
        let mut frozen = vec![0.0; nv];
        form.assemble_residual(&t, NodalVelocity(&velocity), EnergyDensity::Local, &mut local)
            .unwrap();
        form.assemble_residual(&t, NodalVelocity(&velocity), EnergyDensity::Frozen(1.0), &mut frozen)
            .unwrap();
        // rho(T) = 1 + T > 1 inside the domain, so convection is stronger locally
        let sum_local: f64 = local.iter().sum();
        let sum_frozen: f64 = frozen.iter().sum();
        assert!(sum_local > sum_frozen, "{sum_local} vs {sum_frozen}");
    }

    #[test]
    fn test_size_checks_and_bad_diffusivity() {
        let mesh = unit_square(2);
        let materials = Materials::constant(0.0, 1.0, 1.0, 1.0);
        let form = EnergyForm::new(&mesh, &materials, Coordinates::Planar);
        let nv = mesh.num_vertices();
        let velocity = vec![0.0; 2 * nv];
        let mut r = vec![0.0; nv];

        let err = form
            .assemble_residual(&vec![0.0; nv], NodalVelocity(&velocity), EnergyDensity::Local, &mut r)
            .unwrap_err();
        assert!(matches!(err, SolveError::InvalidInput(_)));

        let mut short = vec![0.0; nv - 1];
        let err = form
            .assemble_residual(&vec![0.0; nv], NodalVelocity(&velocity), EnergyDensity::Local, &mut short)
            .unwrap_err();
        assert!(matches!(err, SolveError::InvalidInput(_)));
    }
}
