//! Coupled momentum + energy steady-state solve.
//!
//! # Architecture
//!
//! ```text
//! initial CoupledState ──► warm_start() ──► WarmStart ──► solve_monolithic() ──► CoupledSolution
//!                            │  energy solve (u frozen)       │  Newton on [u | p | T]
//!                            │  momentum solve (T frozen)     │  density frozen at mean T
//!                            └─ until ||T - T0|| < tol        └─ until ||r|| < atol
//! ```
//!
//! Residuals and Jacobians come from a [`Problem`]. Both stages run Newton
//! through the same driver, restricted to the unknowns of the equation being
//! solved while the other fields stay frozen. The warm-start result is moved
//! into the monolithic stage; the two never share buffers.

pub mod boundary;
pub mod fixed_point;
pub mod linear;
pub mod materials;
pub mod newton;
pub mod problem;
pub mod solve;
pub mod state;

pub use boundary::{DirichletBc, check_consistent};
pub use fixed_point::{FixedPointConfig, WarmStart, warm_start};
pub use linear::LinearSolver;
pub use materials::{Coefficient, Materials};
pub use newton::{NewtonConfig, NewtonMethod, NewtonReport, newton_solve, solve_monolithic};
pub use problem::{EnergyDensity, Equation, FormSpec, Problem, finite_difference_jacobian};
pub use solve::{CoupledSolution, solve};
pub use state::{CoupledState, DofLayout, Field};
