// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Prebuilt spatial indices over a target mesh

use super::{ClosestPoint, DistanceQuery};
use crate::error::{JointSpaceError, Result};
use crate::geometry::triangle::{closest_point_on_triangle, triangle_bbox};
use crate::geometry::{BoundingBox, Mesh, BVH};
use nalgebra::Point3;
use tracing::debug;

/// Closest-point index over the triangles of a target surface
#[derive(Debug, Clone)]
pub struct SurfaceIndex {
    triangles: Vec<[Point3<f64>; 3]>,
    bvh: BVH,
}

impl SurfaceIndex {
    /// Build the index; fails if `target` has no vertices or no triangles
    pub fn new(target: &Mesh) -> Result<Self> {
        if target.vertex_count() == 0 {
            return Err(JointSpaceError::invalid_mesh("target mesh has no points"));
        }
        if target.triangle_count() == 0 {
            return Err(JointSpaceError::invalid_mesh(
                "target mesh has no triangular faces",
            ));
        }

        let triangles: Vec<[Point3<f64>; 3]> =
            (0..target.triangle_count()).map(|i| target.triangle(i)).collect();
        let boxes = triangles
            .iter()
            .enumerate()
            .map(|(i, [a, b, c])| (i, triangle_bbox(a, b, c)))
            .collect();
        let bvh = BVH::build(boxes);

        let stats = bvh.stats();
        debug!(
            triangles = stats.primitive_count,
            nodes = stats.node_count,
            leaves = stats.leaf_count,
            depth = stats.max_depth,
            "Built surface index"
        );

        Ok(Self { triangles, bvh })
    }

    /// Closest point on the target surface to `point`.
    ///
    /// Always `Some` for an index built by [`SurfaceIndex::new`].
    pub fn closest_point(&self, point: &Point3<f64>) -> Option<ClosestPoint> {
        self.bvh
            .nearest_by(point, |i| self.project(point, i))
            .map(|hit| ClosestPoint {
                point: hit.payload,
                distance: hit.distance_squared.sqrt(),
                triangle: hit.index,
            })
    }

    fn project(&self, point: &Point3<f64>, index: usize) -> (Point3<f64>, f64) {
        let [a, b, c] = &self.triangles[index];
        let closest = closest_point_on_triangle(point, a, b, c);
        (closest, (point - closest).norm_squared())
    }
}

impl DistanceQuery for SurfaceIndex {
    fn distance_squared(&self, point: &Point3<f64>) -> f64 {
        self.bvh
            .nearest(point, |i| self.project(point, i).1)
            .map_or(f64::INFINITY, |(_, d)| d)
    }
}

/// Nearest-vertex index over the points of a target mesh.
///
/// Ignores triangle interiors and edges, so it overestimates the surface
/// distance wherever the closest surface point is not a vertex.
#[derive(Debug, Clone)]
pub struct VertexIndex {
    points: Vec<Point3<f64>>,
    bvh: BVH,
}

impl VertexIndex {
    pub fn new(target: &Mesh) -> Result<Self> {
        if target.vertex_count() == 0 {
            return Err(JointSpaceError::invalid_mesh("target mesh has no points"));
        }

        let points = target.vertices().to_vec();
        let boxes = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, BoundingBox::new(*p, *p)))
            .collect();

        Ok(Self {
            points,
            bvh: BVH::build(boxes),
        })
    }

    /// Index and distance of the target vertex nearest to `point`
    pub fn nearest_vertex(&self, point: &Point3<f64>) -> Option<(usize, f64)> {
        self.bvh
            .nearest(point, |i| (point - self.points[i]).norm_squared())
            .map(|(i, d)| (i, d.sqrt()))
    }
}

impl DistanceQuery for VertexIndex {
    fn distance_squared(&self, point: &Point3<f64>) -> f64 {
        self.bvh
            .nearest(point, |i| (point - self.points[i]).norm_squared())
            .map_or(f64::INFINITY, |(_, d)| d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn brute_force(mesh: &Mesh, p: &Point3<f64>) -> f64 {
        (0..mesh.triangle_count())
            .map(|i| {
                let [a, b, c] = mesh.triangle(i);
                (p - closest_point_on_triangle(p, &a, &b, &c)).norm()
            })
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_empty_target_rejected() {
        let no_faces = Mesh::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)], vec![]).unwrap();
        assert!(matches!(
            SurfaceIndex::new(&no_faces),
            Err(JointSpaceError::InvalidMesh { .. })
        ));

        let empty = Mesh::new(vec![], vec![]).unwrap();
        assert!(SurfaceIndex::new(&empty).is_err());
        assert!(VertexIndex::new(&empty).is_err());
    }

    #[test]
    fn test_closest_point_on_box_face() {
        let mesh = Primitive::cuboid(Vector3::new(3.0, 3.0, 0.5)).to_mesh();
        let index = SurfaceIndex::new(&mesh).unwrap();

        let hit = index.closest_point(&Point3::new(0.2, -0.4, 2.0)).unwrap();
        assert_relative_eq!(hit.distance, 1.75, epsilon = 1e-12);
        assert_relative_eq!(hit.point, Point3::new(0.2, -0.4, 0.25), epsilon = 1e-12);
        // Top face triangles are 0 and 1
        assert!(hit.triangle < 2);
    }

    #[test]
    fn test_matches_brute_force() {
        let mesh = Primitive::icosphere(1.3, 3)
            .to_mesh()
            .translated(Vector3::new(0.5, 0.0, -0.2));
        let index = SurfaceIndex::new(&mesh).unwrap();

        let probes = Primitive::uv_sphere(2.5, 12).to_mesh();
        for p in probes.vertices().iter().chain(&[Point3::origin(), Point3::new(0.5, 0.0, -0.2)]) {
            let expected = brute_force(&mesh, p);
            assert_relative_eq!(index.distance(p), expected, epsilon = 1e-12);
            let hit = index.closest_point(p).unwrap();
            assert_relative_eq!(hit.distance, expected, epsilon = 1e-12);
            assert_relative_eq!((p - hit.point).norm(), expected, epsilon = 1e-12);
            let [a, b, c] = mesh.triangle(hit.triangle);
            assert_relative_eq!(hit.point, closest_point_on_triangle(p, &a, &b, &c), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_vertex_index_never_below_surface() {
        let mesh = Primitive::cuboid(Vector3::new(2.0, 2.0, 2.0)).to_mesh();
        let surface = SurfaceIndex::new(&mesh).unwrap();
        let vertices = VertexIndex::new(&mesh).unwrap();

        let p = Point3::new(0.0, 0.0, 3.0);
        assert_relative_eq!(surface.distance(&p), 2.0, epsilon = 1e-12);
        assert_relative_eq!(vertices.distance(&p), (2.0f64 + 4.0).sqrt(), epsilon = 1e-12);

        let (nearest, d) = vertices.nearest_vertex(&Point3::new(1.1, 1.1, 1.1)).unwrap();
        assert_eq!(mesh.vertices()[nearest], Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(d, (0.03f64).sqrt(), epsilon = 1e-12);
    }
}
