//! Unstructured triangular mesh of the meridional half-plane.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::{Point, SolveError, SolveResult, Triangle};

/// Type for holding vertex indices for a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleIndex(pub usize, pub usize, pub usize);

impl TriangleIndex {
    pub fn as_array(&self) -> [usize; 3] {
        [self.0, self.1, self.2]
    }
}

/// How cell integrals are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coordinates {
    /// Plain area integrals.
    #[default]
    Planar,
    /// Integrals over the body of revolution around the `x = r = 0` axis (weight `2*pi*r`).
    Axisymmetric,
}

impl Coordinates {
    /// Integration weight at a point.
    pub fn weight(self, pt: Point) -> f64 {
        match self {
            Coordinates::Planar => 1.0,
            Coordinates::Axisymmetric => 2.0 * PI * pt.x,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TriangleMesh {
    vertices: Vec<Point>,
    triangles: Vec<TriangleIndex>,
    cells: Vec<Triangle>,
}

impl TriangleMesh {
    /// Builds the mesh and validates every cell.
    pub fn new(vertices: Vec<Point>, triangles: Vec<TriangleIndex>) -> SolveResult<Self> {
        let mut cells = Vec::with_capacity(triangles.len());
        for (ci, tri) in triangles.iter().enumerate() {
            let ids = tri.as_array();
            if let Some(&bad) = ids.iter().find(|&&i| i >= vertices.len()) {
                return Err(SolveError::invalid_input(format!(
                    "cell {ci} references vertex {bad}, mesh has {} vertices",
                    vertices.len()
                )));
            }
            let cell = Triangle::new(vertices[ids[0]], vertices[ids[1]], vertices[ids[2]])
                .map_err(|e| SolveError::invalid_input(format!("cell {ci}: {e}")))?;
            cells.push(cell);
        }
        Ok(Self {
            vertices,
            triangles,
            cells,
        })
    }

    /// Structured mesh of `[0, width] x [0, height]` with `nx * ny` rectangles,
    /// each cut along its rising diagonal.
    pub fn rectangle(width: f64, height: f64, nx: usize, ny: usize) -> SolveResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(SolveError::invalid_input("rectangle needs at least one cell per side"));
        }
        let (hx, hy) = (width / nx as f64, height / ny as f64);
        let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                vertices.push(Point::new(i as f64 * hx, j as f64 * hy));
            }
        }
        let id = |i: usize, j: usize| j * (nx + 1) + i;
        let mut triangles = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                triangles.push(TriangleIndex(id(i, j), id(i + 1, j), id(i + 1, j + 1)));
                triangles.push(TriangleIndex(id(i, j), id(i + 1, j + 1), id(i, j + 1)));
            }
        }
        Self::new(vertices, triangles)
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[TriangleIndex] {
        &self.triangles
    }

    pub fn cells(&self) -> &[Triangle] {
        &self.cells
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Edges that belong to exactly one cell, oriented as in that cell and sorted.
    pub fn boundary_edges(&self) -> Vec<(usize, usize)> {
        let mut edges: HashMap<(usize, usize), ((usize, usize), usize)> = HashMap::new();
        for tri in &self.triangles {
            let [a, b, c] = tri.as_array();
            for (i, j) in [(a, b), (b, c), (c, a)] {
                edges.entry((i.min(j), i.max(j))).or_insert(((i, j), 0)).1 += 1;
            }
        }
        let mut boundary: Vec<(usize, usize)> = edges
            .into_values()
            .filter(|&(_, n)| n == 1)
            .map(|(edge, _)| edge)
            .collect();
        boundary.sort_unstable();
        boundary
    }

    /// Boundary edges whose two end points both satisfy `pred`.
    pub fn boundary_edges_where<F>(&self, pred: F) -> Vec<(usize, usize)>
    where
        F: Fn(Point) -> bool,
    {
        self.boundary_edges()
            .into_iter()
            .filter(|&(i, j)| pred(self.vertices[i]) && pred(self.vertices[j]))
            .collect()
    }

    /// Vertices lying on boundary edges, sorted.
    pub fn boundary_vertices(&self) -> Vec<usize> {
        let mut boundary: Vec<usize> = self
            .boundary_edges()
            .into_iter()
            .flat_map(|(i, j)| [i, j])
            .collect();
        boundary.sort_unstable();
        boundary.dedup();
        boundary
    }

    /// Total (weighted) measure of the domain.
    pub fn measure(&self, coords: Coordinates) -> f64 {
        self.cells
            .iter()
            .map(|c| c.area() * coords.weight(c.centroid()))
            .sum()
    }

    /// Integral of a P1 field given by vertex values (centroid rule).
    ///
    /// Exact for linear fields in planar coordinates; in axisymmetric
    /// coordinates exact for constant fields (Pappus).
    pub fn integrate(&self, values: &[f64], coords: Coordinates) -> SolveResult<f64> {
        if values.len() != self.vertices.len() {
            return Err(SolveError::invalid_input(format!(
                "field has {} values, mesh has {} vertices",
                values.len(),
                self.vertices.len()
            )));
        }
        Ok(self
            .triangles
            .iter()
            .zip(&self.cells)
            .map(|(tri, cell)| {
                let [a, b, c] = tri.as_array();
                let mean = (values[a] + values[b] + values[c]) / 3.0;
                mean * cell.area() * coords.weight(cell.centroid())
            })
            .sum())
    }

    /// Domain average of a P1 field: integral of the field over integral of 1.
    pub fn average(&self, values: &[f64], coords: Coordinates) -> SolveResult<f64> {
        Ok(self.integrate(values, coords)? / self.measure(coords))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn unit_square(n: usize) -> TriangleMesh {
        TriangleMesh::rectangle(1.0, 1.0, n, n).unwrap()
    }

    #[test]
    fn test_measure() {
        let mesh = unit_square(4);
        assert!((mesh.measure(Coordinates::Planar) - 1.0).abs() < 1e-14);
        // Unit square revolved around the axis is a cylinder of radius 1, height 1
        assert!((mesh.measure(Coordinates::Axisymmetric) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_vertices() {
        let mesh = unit_square(3);
        let boundary = mesh.boundary_vertices();
        assert_eq!(boundary.len(), 12);
        // Interior vertices of the 4x4 grid are 5, 6, 9, 10
        for interior in [5, 6, 9, 10] {
            assert!(!boundary.contains(&interior));
        }
    }

    #[test]
    fn test_average_of_linear_field() {
        let mesh = unit_square(5);
        let values: Vec<f64> = mesh.vertices().iter().map(|p| 2.0 * p.x + p.y).collect();
        let avg = mesh.average(&values, Coordinates::Planar).unwrap();
        assert!((avg - 1.5).abs() < 1e-13, "avg={avg}");
    }

    #[test]
    fn test_integrate_checks_field_size() {
        let mesh = unit_square(2);
        let short = vec![1.0; mesh.num_vertices() - 1];
        assert!(matches!(
            mesh.integrate(&short, Coordinates::Planar),
            Err(SolveError::InvalidInput(_))
        ));
        assert!(mesh.average(&short, Coordinates::Axisymmetric).is_err());
        let ones = vec![1.0; mesh.num_vertices()];
        let v = mesh.integrate(&ones, Coordinates::Axisymmetric).unwrap();
        assert!((v - PI).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_edges() {
        let mesh = unit_square(3);
        let edges = mesh.boundary_edges();
        assert_eq!(edges.len(), 12);
        let right = mesh.boundary_edges_where(|p| (p.x - 1.0).abs() < 1e-12);
        assert_eq!(right.len(), 3);
        for (i, j) in right {
            assert_eq!(mesh.vertices()[i].x, 1.0);
            assert_eq!(mesh.vertices()[j].x, 1.0);
        }
        // A corner vertex alone does not make an edge
        assert!(mesh.boundary_edges_where(|p| p.x > 0.9 && p.y > 0.9).is_empty());
    }

    #[test]
    fn test_rejects_out_of_range_vertex() {
        let res = TriangleMesh::new(
            vec![Point::new(0., 0.), Point::new(1., 0.), Point::new(0., 1.)],
            vec![TriangleIndex(0, 1, 3)],
        );
        assert!(matches!(res, Err(SolveError::InvalidInput(_))));
    }
}
