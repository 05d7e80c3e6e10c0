/// Below this Péclet number `xi` is evaluated by its Taylor series.
pub const PECLET_SERIES_THRESHOLD: f64 = 1.0e-5;

/// Péclet function `xi(Pe) = coth(Pe) - 1/Pe`.
///
/// Both terms blow up as `Pe -> 0` and nearly cancel, so the closed form is
/// only used above [`PECLET_SERIES_THRESHOLD`]. Below it the expansion
/// `Pe/3 - Pe^3/45 + 2 Pe^5/945` is exact to double precision.
#[inline]
pub fn peclet_xi(pe: f64) -> f64 {
    if pe > PECLET_SERIES_THRESHOLD {
        1.0 / pe.tanh() - 1.0 / pe
    } else {
        let pe2 = pe * pe;
        pe * (1.0 / 3.0 - pe2 * (1.0 / 45.0 - pe2 * (2.0 / 945.0)))
    }
}

/// Below this Péclet number `xi'` is evaluated by its Taylor series.
pub const PECLET_DERIVATIVE_SERIES_THRESHOLD: f64 = 1.0e-2;

/// Derivative `xi'(Pe) = 1/Pe^2 - 1/sinh^2(Pe)`.
///
/// The closed form loses about `eps / Pe^2` to cancellation; below
/// [`PECLET_DERIVATIVE_SERIES_THRESHOLD`] the series
/// `1/3 - Pe^2/15 + 2 Pe^4/189 - Pe^6/675` is used instead.
#[inline]
pub fn peclet_xi_derivative(pe: f64) -> f64 {
    if pe > PECLET_DERIVATIVE_SERIES_THRESHOLD {
        let s = pe.sinh();
        1.0 / (pe * pe) - 1.0 / (s * s)
    } else {
        let pe2 = pe * pe;
        1.0 / 3.0 - pe2 * (1.0 / 15.0 - pe2 * (2.0 / 189.0 - pe2 * (1.0 / 675.0)))
    }
}
