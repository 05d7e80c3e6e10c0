//! P1-P1 generalized Stokes equations on a triangle mesh.
//!
//! # Architecture
//!
//! ```text
//! TriangleMesh + Materials ──► StokesForm ──► assemble_residual()
//!                                  │          assemble_jacobian()              d(R_u, R_p)/d(u, p)
//!                                  │          assemble_temperature_jacobian()  d(R_u, R_p)/dT
//!                                  │
//!                                  └── body force rho(T) g + extra force
//! ```
//!
//! Rows are ordered like the momentum block of a [`crate::CoupledState`]:
//! interleaved velocity rows `2 k + c`, then one continuity row per vertex.

pub mod form;

pub use form::{PRESSURE_STABILIZATION, StokesForm};
