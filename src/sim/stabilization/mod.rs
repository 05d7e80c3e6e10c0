//! SUPG stabilization for convection-dominated transport.
//!
//! For each evaluation point the stabilization parameter is
//!
//! ```text
//! tau = h / (2 p ||b||) * (coth(Pe) - 1/Pe),   Pe = ||b|| h / (2 p sigma)
//! ```
//!
//! where `h` is the cell diameter measured along the convection `b`
//! (John & Knobloch, CMAME 197 (2008)), `p` the polynomial degree of the
//! transported field and `sigma` its diffusivity.
//!
//! # Architecture
//!
//! ```text
//! Triangle, b ──► directed_diameter() ──► h
//!                                         │
//!             Supg { sigma, p } ──► eval() ──► Tau { tau, tau_b }
//!                                         ▲
//!                          peclet_xi(Pe) ─┘
//!
//! eval_with_sensitivity() also returns d tau/d b and d tau/d sigma, from
//! directed_diameter_gradient() and peclet_xi_derivative().
//! ```
//!
//! Everything here is a pure function of its inputs; no state survives
//! between calls.

pub mod directed;
pub mod peclet;
pub mod supg;

pub use directed::{directed_diameter, directed_diameter_gradient};
pub use peclet::{
    PECLET_DERIVATIVE_SERIES_THRESHOLD, PECLET_SERIES_THRESHOLD, peclet_xi, peclet_xi_derivative,
};
pub use supg::{Supg, TAU_SANITY_BOUND, Tau, TauSensitivity};
