use crate::{Triangle, Vector};

/// Diameter of `cell` measured along the direction `b`.
///
/// ```text
/// diam(cell, b) = 2 ||b|| / sum_i |b . grad(psi_i)|
/// ```
///
/// with `psi_i` the P1 basis functions. Since `grad(psi_i)` is the rotated
/// opposite edge over `2 * area`, the constant factor moves out of the sum and
/// only `|e x b|` is accumulated per edge.
///
/// `b` must not vanish; callers skip stabilization when `||b||` is below
/// machine epsilon.
pub fn directed_diameter(cell: &Triangle, b: Vector) -> f64 {
    let conv_norm = b.length();
    debug_assert!(conv_norm >= f64::EPSILON, "directed diameter along a zero vector");

    let sum: f64 = cell.edges().iter().map(|e| e.cross(b).abs()).sum();
    4.0 * conv_norm * cell.area() / sum
}

/// Gradient of [`directed_diameter`] with respect to `b`.
///
/// `h` only depends on the direction of `b`, so the gradient is orthogonal
/// to `b`. Edges parallel to `b` contribute a zero subgradient.
pub fn directed_diameter_gradient(cell: &Triangle, b: Vector) -> Vector {
    let conv_norm = b.length();
    debug_assert!(conv_norm >= f64::EPSILON, "directed diameter along a zero vector");

    let (sum, d_sum) = cell
        .edges()
        .iter()
        .fold((0.0, Vector::ZERO), |(sum, d_sum), e| {
            let c = e.cross(b);
            let sign = if c > 0.0 {
                1.0
            } else if c < 0.0 {
                -1.0
            } else {
                0.0
            };
            (sum + c.abs(), d_sum + e.perp() * sign)
        });
    let h = 4.0 * conv_norm * cell.area() / sum;
    (b * (1.0 / (conv_norm * conv_norm)) - d_sum * (1.0 / sum)) * h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    #[test]
    fn test_unit_right_triangle_along_x() {
        let cell = Triangle::new(Point::new(0., 0.), Point::new(1., 0.), Point::new(0., 1.)).unwrap();
        let b = Vector::new(1., 0.);
        assert_eq!(cell.area(), 0.5);
        // |e x b| over the edges: (-1, 0) -> 0, (0, -1) -> 1, (1, -1) -> 1
        let sum: f64 = cell.edges().iter().map(|e| e.cross(b).abs()).sum();
        assert_eq!(sum, 2.0);
        assert_eq!(directed_diameter(&cell, b), 1.0);
    }

    #[test]
    fn test_extent_along_diagonal() {
        // Along (1, 1) the unit right triangle spans from 0 to 1/sqrt(2)
        let cell = Triangle::new(Point::new(0., 0.), Point::new(1., 0.), Point::new(0., 1.)).unwrap();
        let h = directed_diameter(&cell, Vector::new(1., 1.));
        assert!((h - 0.5f64.sqrt()).abs() < 1e-15, "h={h}");
    }

    #[test]
    fn test_independent_of_magnitude_and_sign() {
        let cell = Triangle::new(Point::new(0.2, 0.), Point::new(1.3, 0.4), Point::new(0.5, 2.)).unwrap();
        let b = Vector::new(0.3, -0.7);
        let h = directed_diameter(&cell, b);
        assert!((directed_diameter(&cell, b * 1e4) - h).abs() < 1e-14);
        assert!((directed_diameter(&cell, -b) - h).abs() < 1e-14);
    }

    #[test]
    fn test_never_exceeds_diameter() {
        let cells = [
            [(0., 0.), (1., 0.), (0., 1.)],
            [(0., 0.), (10., 0.), (5., 0.01)],
            [(1., 1.), (1.5, 3.), (0.2, 2.2)],
            [(0., 0.), (1e-3, 0.), (0., 1e3)],
        ];
        for pts in cells {
            let cell = Triangle::new(
                Point::new(pts[0].0, pts[0].1),
                Point::new(pts[1].0, pts[1].1),
                Point::new(pts[2].0, pts[2].1),
            )
            .unwrap();
            for k in 0..72 {
                let angle = (k as f64) * 5f64.to_radians();
                let b = Vector::new(angle.cos(), angle.sin());
                let h = directed_diameter(&cell, b);
                assert!(
                    h <= cell.diameter() * (1.0 + 1e-12),
                    "h={h} > diam={} for b={b}",
                    cell.diameter()
                );
                assert!(h > 0.0);
            }
        }
    }

    #[test]
    fn test_gradient_matches_central_differences() {
        let cell = Triangle::new(Point::new(0.2, 0.1), Point::new(1.3, 0.4), Point::new(0.5, 0.9)).unwrap();
        for b in [Vector::new(0.7, 0.3), Vector::new(-2.0, 0.5), Vector::new(0.1, -1.0)] {
            let grad = directed_diameter_gradient(&cell, b);
            let d = 1e-6;
            let fd_x = (directed_diameter(&cell, b + Vector::new(d, 0.))
                - directed_diameter(&cell, b - Vector::new(d, 0.)))
                / (2.0 * d);
            let fd_y = (directed_diameter(&cell, b + Vector::new(0., d))
                - directed_diameter(&cell, b - Vector::new(0., d)))
                / (2.0 * d);
            assert!((grad.dx - fd_x).abs() < 1e-7, "b={b}: {} vs {fd_x}", grad.dx);
            assert!((grad.dy - fd_y).abs() < 1e-7, "b={b}: {} vs {fd_y}", grad.dy);
            // Zero-homogeneous in b
            assert!(grad.dot(b).abs() < 1e-12);
        }
    }
}
