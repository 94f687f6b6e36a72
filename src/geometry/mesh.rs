// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangulated surface mesh

use super::BoundingBox;
use crate::error::{JointSpaceError, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Serialized form of a mesh, validated on the way in
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawMesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
}

/// Triangular mesh
///
/// Immutable once built: every face index is checked against the vertex list
/// and every coordinate is finite. Operations that change geometry (decimation,
/// translation) return a new `Mesh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMesh", into = "RawMesh")]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
}

impl TryFrom<RawMesh> for Mesh {
    type Error = JointSpaceError;

    fn try_from(raw: RawMesh) -> Result<Self> {
        Mesh::new(raw.vertices, raw.faces)
    }
}

impl From<Mesh> for RawMesh {
    fn from(mesh: Mesh) -> Self {
        RawMesh {
            vertices: mesh.vertices,
            faces: mesh.faces,
        }
    }
}

impl Mesh {
    /// Build a mesh, validating indices and coordinates.
    ///
    /// Empty vertex or face lists are accepted here; the operations that need
    /// geometry (distance targets, polygon conversion) reject them.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Result<Self> {
        if let Some(index) = vertices
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(JointSpaceError::invalid_mesh(format!(
                "vertex {} has a non-finite coordinate",
                index
            )));
        }

        let vertex_count = vertices.len();
        for (face_index, face) in faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&i| i >= vertex_count) {
                return Err(JointSpaceError::invalid_mesh(format!(
                    "face {} references vertex {} but mesh has {} vertices",
                    face_index, bad, vertex_count
                )));
            }
        }

        Ok(Self { vertices, faces })
    }

    /// Build a mesh from flat coordinate and index buffers
    /// (`[x0, y0, z0, x1, ...]` and `[i0, j0, k0, i1, ...]`).
    pub fn from_flat(points: &[f64], indices: &[usize]) -> Result<Self> {
        if points.len() % 3 != 0 {
            return Err(JointSpaceError::invalid_mesh(format!(
                "coordinate buffer length {} is not a multiple of 3",
                points.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(JointSpaceError::invalid_mesh(format!(
                "index buffer length {} is not a multiple of 3",
                indices.len()
            )));
        }

        let vertices = points
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let faces = indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        Self::new(vertices, faces)
    }

    /// Construct without validation; callers guarantee the invariants
    pub(crate) fn from_parts_unchecked(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        debug_assert!(faces.iter().flatten().all(|&i| i < vertices.len()));
        Self { vertices, faces }
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Corner positions of triangle `index`
    pub fn triangle(&self, index: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.faces[index];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    /// Total surface area
    pub fn surface_area(&self) -> f64 {
        (0..self.faces.len())
            .map(|i| {
                let [a, b, c] = self.triangle(i);
                (b - a).cross(&(c - a)).norm() * 0.5
            })
            .sum()
    }

    /// Copy of this mesh moved by `offset`
    pub fn translated(&self, offset: Vector3<f64>) -> Mesh {
        let vertices = self.vertices.iter().map(|p| p + offset).collect();
        Self::from_parts_unchecked(vertices, self.faces.clone())
    }
}
