// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator

use super::Mesh;
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives, centred at the origin
pub enum Primitive {
    /// Axis-aligned box with the given edge lengths
    Cuboid { extents: Vector3<f64> },
    /// Subdivided icosahedron projected onto a sphere
    Icosphere { radius: f64, subdivisions: u32 },
    /// Latitude/longitude sphere
    UvSphere { radius: f64, segments: u32 },
    /// Flat square grid in the XY plane
    Plane { size: f64, divisions: u32 },
}

impl Primitive {
    pub fn cuboid(extents: Vector3<f64>) -> Self {
        Self::Cuboid { extents }
    }

    pub fn icosphere(radius: f64, subdivisions: u32) -> Self {
        Self::Icosphere {
            radius,
            subdivisions,
        }
    }

    pub fn uv_sphere(radius: f64, segments: u32) -> Self {
        let segments = if segments > 2 { segments } else { 32 };
        Self::UvSphere { radius, segments }
    }

    pub fn plane(size: f64, divisions: u32) -> Self {
        Self::Plane {
            size,
            divisions: divisions.max(1),
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Cuboid { extents } => generate_box_mesh(*extents),
            Self::Icosphere {
                radius,
                subdivisions,
            } => generate_icosphere_mesh(*radius, *subdivisions),
            Self::UvSphere { radius, segments } => generate_uv_sphere_mesh(*radius, *segments),
            Self::Plane { size, divisions } => generate_plane_mesh(*size, *divisions),
        }
    }
}

fn generate_box_mesh(extents: Vector3<f64>) -> Mesh {
    let h = extents / 2.0;

    // 8 shared corners
    let vertices = vec![
        Point3::new(-h.x, -h.y, -h.z),
        Point3::new(h.x, -h.y, -h.z),
        Point3::new(h.x, h.y, -h.z),
        Point3::new(-h.x, h.y, -h.z),
        Point3::new(-h.x, -h.y, h.z),
        Point3::new(h.x, -h.y, h.z),
        Point3::new(h.x, h.y, h.z),
        Point3::new(-h.x, h.y, h.z),
    ];

    // 6 faces, outward winding
    let faces = vec![
        // Top (z+)
        [4, 5, 6],
        [4, 6, 7],
        // Bottom (z-)
        [1, 0, 3],
        [1, 3, 2],
        // Right (x+)
        [5, 1, 2],
        [5, 2, 6],
        // Left (x-)
        [0, 4, 7],
        [0, 7, 3],
        // Back (y+)
        [7, 6, 2],
        [7, 2, 3],
        // Front (y-)
        [0, 1, 5],
        [0, 5, 4],
    ];

    Mesh::from_parts_unchecked(vertices, faces)
}

fn generate_icosphere_mesh(radius: f64, subdivisions: u32) -> Mesh {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;

    let mut vertices: Vec<Point3<f64>> = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .iter()
    .map(|&(x, y, z)| Point3::from(Vector3::new(x, y, z).normalize() * radius))
    .collect();

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        // Shared edge midpoints keep the surface watertight
        let mut midpoints: AHashMap<(usize, usize), usize> = AHashMap::new();
        let mut midpoint = |a: usize, b: usize, vertices: &mut Vec<Point3<f64>>| -> usize {
            let key = if a < b { (a, b) } else { (b, a) };
            *midpoints.entry(key).or_insert_with(|| {
                let mid = nalgebra::center(&vertices[a], &vertices[b]);
                vertices.push(Point3::from(mid.coords.normalize() * radius));
                vertices.len() - 1
            })
        };

        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(a, b, &mut vertices);
            let bc = midpoint(b, c, &mut vertices);
            let ca = midpoint(c, a, &mut vertices);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    Mesh::from_parts_unchecked(vertices, faces)
}

/// Latitude/longitude sphere. Rows at the poles collapse to a point, so the
/// first and last stacks contain zero-area triangles.
fn generate_uv_sphere_mesh(radius: f64, segments: u32) -> Mesh {
    let stacks = segments as usize;
    let slices = segments as usize;
    let mut vertices = Vec::with_capacity((stacks + 1) * (slices + 1));
    let mut faces = Vec::with_capacity(stacks * slices * 2);

    for i in 0..=stacks {
        let phi = PI * i as f64 / stacks as f64;
        let z = radius * phi.cos();
        let r = radius * phi.sin();

        for j in 0..=slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            vertices.push(Point3::new(r * theta.cos(), r * theta.sin(), z));
        }
    }

    for i in 0..stacks {
        for j in 0..slices {
            let first = i * (slices + 1) + j;
            let second = first + slices + 1;
            faces.push([first, second, first + 1]);
            faces.push([second, second + 1, first + 1]);
        }
    }

    Mesh::from_parts_unchecked(vertices, faces)
}

fn generate_plane_mesh(size: f64, divisions: u32) -> Mesh {
    let n = divisions as usize;
    let step = size / n as f64;
    let origin = -size / 2.0;

    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(origin + i as f64 * step, origin + j as f64 * step, 0.0));
        }
    }

    let mut faces = Vec::with_capacity(n * n * 2);
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + n + 1;
            let v11 = v01 + 1;
            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    Mesh::from_parts_unchecked(vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::triangle::is_degenerate;
    use std::collections::HashMap;

    /// Every edge shared by exactly two triangles
    fn is_closed(mesh: &Mesh) -> bool {
        let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
        for face in mesh.faces() {
            for i in 0..3 {
                let (a, b) = (face[i], face[(i + 1) % 3]);
                let edge = if a < b { (a, b) } else { (b, a) };
                *edge_count.entry(edge).or_insert(0) += 1;
            }
        }
        edge_count.values().all(|&count| count == 2)
    }

    #[test]
    fn test_box_generation() {
        let mesh = Primitive::cuboid(Vector3::new(3.0, 3.0, 0.5)).to_mesh();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(is_closed(&mesh));
        assert!((mesh.surface_area() - (2.0 * 9.0 + 4.0 * 1.5)).abs() < 1e-9);

        let bbox = mesh.bounding_box();
        assert_eq!(bbox.max, Point3::new(1.5, 1.5, 0.25));
    }

    #[test]
    fn test_icosphere_counts() {
        let mesh = Primitive::icosphere(0.8, 4).to_mesh();
        // V = 10 * 4^n + 2, F = 20 * 4^n
        assert_eq!(mesh.vertex_count(), 2562);
        assert_eq!(mesh.triangle_count(), 5120);
        assert!(is_closed(&mesh));

        for v in mesh.vertices() {
            assert!((v.coords.norm() - 0.8).abs() < 1e-12);
        }
    }

    #[test]
    fn test_uv_sphere_has_pole_degenerates() {
        let mesh = Primitive::uv_sphere(5.0, 16).to_mesh();
        let degenerate = (0..mesh.triangle_count())
            .filter(|&i| {
                let [a, b, c] = mesh.triangle(i);
                is_degenerate(&a, &b, &c)
            })
            .count();
        assert!(degenerate >= 16);

        let expected_area = 4.0 * PI * 25.0;
        assert!((mesh.surface_area() - expected_area).abs() < expected_area * 0.1);
    }

    #[test]
    fn test_plane_grid() {
        let mesh = Primitive::plane(4.0, 8).to_mesh();
        assert_eq!(mesh.vertex_count(), 81);
        assert_eq!(mesh.triangle_count(), 128);
        assert!((mesh.surface_area() - 16.0).abs() < 1e-9);
    }
}
