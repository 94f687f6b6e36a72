// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cross-check surface distances against parry3d's point queries

use anyhow::Result;
use jointspace::distance::{compute_distance_field, DistanceMethod, DistanceOptions};
use jointspace::geometry::Primitive;
use jointspace::{compute_unsigned_distance, Mesh};
use nalgebra::Vector3;
use parry3d::math::{Isometry, Point};
use parry3d::query::PointQuery;
use parry3d::shape::TriMesh;

fn to_parry(mesh: &Mesh) -> TriMesh {
    let vertices = mesh
        .vertices()
        .iter()
        .map(|v| Point::new(v.x as f32, v.y as f32, v.z as f32))
        .collect();
    let indices = mesh
        .faces()
        .iter()
        .map(|f| [f[0] as u32, f[1] as u32, f[2] as u32])
        .collect();
    TriMesh::new(vertices, indices)
}

fn oracle_distances(source: &Mesh, target: &Mesh) -> Vec<f64> {
    let trimesh = to_parry(target);
    source
        .vertices()
        .iter()
        .map(|v| {
            let p = Point::new(v.x as f32, v.y as f32, v.z as f32);
            trimesh.distance_to_point(&Isometry::identity(), &p, false) as f64
        })
        .collect()
}

#[test]
fn test_sphere_over_slab_matches_parry() -> Result<()> {
    let source = Primitive::icosphere(0.8, 3)
        .to_mesh()
        .translated(Vector3::new(0.2, -0.1, 1.5));
    let target = Primitive::cuboid(Vector3::new(3.0, 3.0, 0.5)).to_mesh();

    let ours = compute_unsigned_distance(source.vertices(), &target)?;
    let expected = oracle_distances(&source, &target);

    let worst = ours
        .values()
        .iter()
        .zip(&expected)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    println!("Max deviation from parry3d: {:.2e}", worst);
    assert!(worst < 1e-4, "deviation {} too large", worst);

    Ok(())
}

#[test]
fn test_interpenetrating_spheres_match_parry() -> Result<()> {
    // Overlapping surfaces: some source vertices sit inside the target
    let source = Primitive::uv_sphere(1.0, 20).to_mesh();
    let target = Primitive::icosphere(1.2, 3)
        .to_mesh()
        .translated(Vector3::new(0.9, 0.3, 0.0));

    let ours = compute_unsigned_distance(source.vertices(), &target)?;
    let expected = oracle_distances(&source, &target);

    for (i, (a, b)) in ours.values().iter().zip(&expected).enumerate() {
        assert!((a - b).abs() < 1e-4, "vertex {}: {} vs {}", i, a, b);
    }

    Ok(())
}

#[test]
fn test_vertex_method_bounds_parry_from_above() -> Result<()> {
    let source = Primitive::icosphere(0.5, 2)
        .to_mesh()
        .translated(Vector3::new(0.0, 0.0, 1.0));
    let target = Primitive::plane(3.0, 2).to_mesh();

    let options = DistanceOptions {
        method: DistanceMethod::Vertex,
        parallel: false,
    };
    let vertex = compute_distance_field(source.vertices(), &target, &options)?;
    let expected = oracle_distances(&source, &target);

    for (v, s) in vertex.values().iter().zip(&expected) {
        assert!(*v + 1e-4 >= *s);
    }

    Ok(())
}
