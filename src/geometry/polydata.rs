// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon-soup input and conversion to a strictly triangulated mesh

use super::Mesh;
use crate::error::{JointSpaceError, Result};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A single cell of a polygonal surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Point primitive(s)
    Vertex(Vec<usize>),
    /// Polyline
    Line(Vec<usize>),
    /// Closed polygon (triangle, quad or n-gon)
    Polygon(Vec<usize>),
}

/// Arbitrary polygonal surface as handed over by a host application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolyData {
    pub points: Vec<Point3<f64>>,
    pub cells: Vec<Cell>,
}

impl PolyData {
    pub fn new(points: Vec<Point3<f64>>, cells: Vec<Cell>) -> Self {
        Self { points, cells }
    }

    /// Parse a flat polygon cell array of the form `[n, id0, .., id(n-1), n, ...]`.
    pub fn from_polygon_cell_array(points: Vec<Point3<f64>>, cell_array: &[usize]) -> Result<Self> {
        let mut cells = Vec::new();
        let mut cursor = 0;

        while cursor < cell_array.len() {
            let count = cell_array[cursor];
            cursor += 1;
            let end = cursor + count;
            if end > cell_array.len() {
                return Err(JointSpaceError::invalid_mesh(format!(
                    "cell array truncated: cell of size {} at offset {} exceeds length {}",
                    count,
                    cursor - 1,
                    cell_array.len()
                )));
            }
            cells.push(Cell::Polygon(cell_array[cursor..end].to_vec()));
            cursor = end;
        }

        Ok(Self { points, cells })
    }

    /// Number of polygon cells (lines and points excluded)
    pub fn polygon_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Cell::Polygon(_)))
            .count()
    }

    /// Triangulate into a [`Mesh`].
    ///
    /// Polygons are fan-triangulated from their first id; lines, point
    /// primitives and polygons with fewer than three ids are dropped.
    pub fn to_mesh(&self) -> Result<Mesh> {
        if self.points.is_empty() {
            return Err(JointSpaceError::invalid_mesh("input has no points"));
        }

        let mut faces = Vec::with_capacity(self.cells.len());
        for cell in &self.cells {
            if let Cell::Polygon(ids) = cell {
                fan_triangulate(ids, &mut faces);
            }
        }

        if faces.is_empty() {
            return Err(JointSpaceError::invalid_mesh("input has no polygonal faces"));
        }

        Mesh::new(self.points.clone(), faces)
    }
}

impl TryFrom<&PolyData> for Mesh {
    type Error = JointSpaceError;

    fn try_from(poly: &PolyData) -> Result<Self> {
        poly.to_mesh()
    }
}

/// Emit `(i0, ik, ik+1)` for `k = 1..n-2`
fn fan_triangulate(ids: &[usize], out: &mut Vec<[usize; 3]>) {
    if ids.len() < 3 {
        return;
    }
    let anchor = ids[0];
    for pair in ids[1..].windows(2) {
        out.push([anchor, pair[0], pair[1]]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 1.5, 0.0),
        ]
    }

    #[test]
    fn test_quad_fan() {
        let poly = PolyData::new(square_points(), vec![Cell::Polygon(vec![0, 1, 2, 3])]);
        let mesh = poly.to_mesh().unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_pentagon_fan() {
        let poly = PolyData::new(square_points(), vec![Cell::Polygon(vec![0, 1, 2, 4, 3])]);
        let mesh = poly.to_mesh().unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2], [0, 2, 4], [0, 4, 3]]);
    }

    #[test]
    fn test_lines_and_points_ignored() {
        let poly = PolyData::new(
            square_points(),
            vec![
                Cell::Vertex(vec![4]),
                Cell::Line(vec![0, 1, 2]),
                Cell::Polygon(vec![0, 1, 2]),
            ],
        );
        let mesh = poly.to_mesh().unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(poly.polygon_count(), 1);
    }

    #[test]
    fn test_no_points_is_error() {
        let poly = PolyData::new(vec![], vec![Cell::Polygon(vec![0, 1, 2])]);
        assert!(matches!(poly.to_mesh(), Err(JointSpaceError::InvalidMesh { .. })));
    }

    #[test]
    fn test_no_polygons_is_error() {
        let poly = PolyData::new(square_points(), vec![Cell::Line(vec![0, 1])]);
        assert!(matches!(poly.to_mesh(), Err(JointSpaceError::InvalidMesh { .. })));
    }

    #[test]
    fn test_cell_array_parsing() {
        let poly = PolyData::from_polygon_cell_array(square_points(), &[3, 0, 1, 2, 4, 0, 1, 2, 3]).unwrap();
        assert_eq!(poly.cells.len(), 2);
        assert_eq!(poly.to_mesh().unwrap().triangle_count(), 3);

        let truncated = PolyData::from_polygon_cell_array(square_points(), &[4, 0, 1]);
        assert!(truncated.is_err());
    }

    #[test]
    fn test_out_of_range_id() {
        let poly = PolyData::new(square_points(), vec![Cell::Polygon(vec![0, 1, 9])]);
        assert!(poly.to_mesh().is_err());
    }
}
