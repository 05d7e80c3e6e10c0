//! Coupled momentum/energy solver for convection-dominated melt flows.
//!
//! The crate has two halves:
//! - [`sim::stabilization`]: the SUPG parameter `tau` computed from the
//!   directed cell diameter and a numerically stable Péclet function,
//! - [`sim::coupled`]: the two-stage nonlinear solve (fixed-point warm start,
//!   then monolithic Newton) over the joint (velocity, pressure, temperature)
//!   state.
//!
//! Residual assembly is delegated to a [`Problem`] implementation. The
//! [`sim::heat`] and [`sim::flow`] modules provide the P1 SUPG energy form
//! and the generalized Stokes form to build one on.

pub mod config;
pub mod error;
pub mod geom;
pub mod sim;

// Prelude
pub use config::SolveConfig;
pub use error::{SolveError, SolveResult};
pub use geom::mesh::{TriangleIndex, TriangleMesh};
pub use geom::point::Point;
pub use geom::triangle::Triangle;
pub use geom::vector::Vector;
pub use sim::coupled::{CoupledSolution, CoupledState, DofLayout, Problem, solve};
pub use sim::stabilization::{Supg, Tau};
