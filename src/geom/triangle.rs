use crate::geom::EPS;
use crate::{Point, SolveError, SolveResult, Vector};

/// Triangular mesh cell in the (r, z) plane.
///
/// Construction rejects cells with coincident vertices or zero area, so every
/// `Triangle` has well-defined P1 basis-function gradients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    vertices: [Point; 3],
}

impl Triangle {
    pub fn new(p0: Point, p1: Point, p2: Point) -> SolveResult<Self> {
        let vertices = [p0, p1, p2];
        for (i, j) in EDGES {
            if vertices[i].is_close(&vertices[j]) {
                return Err(SolveError::invalid_input(format!(
                    "triangle needs 3 distinct vertices, got {}, {}, {}",
                    p0, p1, p2
                )));
            }
        }
        let tri = Self { vertices };
        let diam = tri.diameter();
        if tri.signed_area().abs() <= EPS * diam * diam {
            return Err(SolveError::invalid_input(format!(
                "triangle {}, {}, {} has zero area",
                p0, p1, p2
            )));
        }
        Ok(tri)
    }

    pub fn vertices(&self) -> &[Point; 3] {
        &self.vertices
    }

    /// Area with sign: positive for counter-clockwise vertex order.
    pub fn signed_area(&self) -> f64 {
        let [p0, p1, p2] = self.vertices;
        0.5 * (p1 - p0).cross(p2 - p0)
    }

    /// Unsigned area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Conventional (undirected) cell diameter: the greatest vertex distance.
    pub fn diameter(&self) -> f64 {
        EDGES
            .iter()
            .map(|&(i, j)| self.vertices[i].distance(&self.vertices[j]))
            .fold(0., f64::max)
    }

    pub fn centroid(&self) -> Point {
        Point::centroid(&self.vertices)
    }

    /// Edge vectors `p_i - p_j` of the three undirected edges `(i, j)`, `i < j`.
    pub fn edges(&self) -> [Vector; 3] {
        EDGES.map(|(i, j)| self.vertices[i] - self.vertices[j])
    }

    /// Gradients of the three P1 (barycentric) basis functions.
    ///
    /// The gradient of the function that is 1 at vertex `i` is the rotated
    /// opposite edge divided by twice the signed area.
    pub fn basis_gradients(&self) -> [Vector; 3] {
        let two_area = 2.0 * self.signed_area();
        let v = &self.vertices;
        [0, 1, 2].map(|i| {
            let opposite = v[(i + 2) % 3] - v[(i + 1) % 3];
            opposite.perp() * (1.0 / two_area)
        })
    }
}

/// Undirected edges as vertex index pairs.
const EDGES: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];
