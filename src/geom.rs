//! Planar geometry in the meridional (r, z) half-plane.
//!
//! `x` is the radial coordinate `r`, `y` the axial coordinate `z`.

pub mod mesh;
pub mod point;
pub mod triangle;
pub mod vector;

/// Geometric precision
const EPS: f64 = 1e-13;
