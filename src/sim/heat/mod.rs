//! P1 SUPG energy equation on a triangle mesh.
//!
//! # Architecture
//!
//! ```text
//! TriangleMesh + Materials ──► EnergyForm ──► assemble_residual()
//!                                  │          assemble_jacobian()           dR/dT
//!                                  │          assemble_velocity_jacobian()  dR/du
//!                                  │
//!                                  ├── Supg::eval_with_sensitivity() at each cell centroid
//!                                  └── FluxBoundary edges (Neumann / Robin)
//! ```
//!
//! `EnergyForm` is a building block for [`crate::Problem`] implementations:
//! it fills the temperature rows, the caller owns the momentum rows and the
//! boundary conditions.

pub mod flux;
pub mod form;

pub use flux::{FluxBoundary, HeatFlux};
pub use form::{EnergyForm, NodalVelocity};
