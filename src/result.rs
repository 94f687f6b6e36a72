// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Distance results bound to mesh topology

use crate::color::{ColorBandMapper, DISPLAY_RANGE};
use crate::error::{JointSpaceError, Result};
use crate::geometry::Mesh;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the per-vertex distance attribute
pub const DISTANCE_ATTRIBUTE: &str = "Distance";

/// Named per-vertex scalar values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    name: String,
    values: Vec<f64>,
}

impl ScalarField {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Field named [`DISTANCE_ATTRIBUTE`]
    pub fn distance(values: Vec<f64>) -> Self {
        Self::new(DISTANCE_ATTRIBUTE, values)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
        }
    }

    /// `(min, max)`, or `None` when empty
    pub fn range(&self) -> Option<(f64, f64)> {
        self.min().zip(self.max())
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// A mesh carrying a per-vertex scalar attribute marked active for display
#[derive(Debug, Clone)]
pub struct AnnotatedMesh {
    mesh: Arc<Mesh>,
    scalars: ScalarField,
    display_range: (f64, f64),
}

impl AnnotatedMesh {
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Shared handle to the topology
    pub fn mesh_arc(&self) -> Arc<Mesh> {
        Arc::clone(&self.mesh)
    }

    /// Attribute by name, if present
    pub fn point_attribute(&self, name: &str) -> Option<&ScalarField> {
        (self.scalars.name() == name).then_some(&self.scalars)
    }

    pub fn active_scalars(&self) -> &ScalarField {
        &self.scalars
    }

    /// Value range the colour map is meant to be shown over
    pub fn display_range(&self) -> (f64, f64) {
        self.display_range
    }

    /// Per-vertex colours for the active scalars
    pub fn vertex_colors(&self, mapper: &ColorBandMapper) -> Vec<[u8; 3]> {
        mapper
            .vertex_colors(&self.scalars)
            .into_iter()
            .map(|c| c.to_u8())
            .collect()
    }
}

/// Output of result assembly
#[derive(Debug, Clone)]
pub struct DistanceResult {
    pub annotated_mesh: AnnotatedMesh,
    pub min_distance: Option<f64>,
}

impl DistanceResult {
    pub fn distances(&self) -> &ScalarField {
        self.annotated_mesh.active_scalars()
    }

    pub fn max_distance(&self) -> Option<f64> {
        self.distances().max()
    }

    pub fn mean_distance(&self) -> Option<f64> {
        self.distances().mean()
    }

    pub fn vertex_count(&self) -> usize {
        self.annotated_mesh.mesh().vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.annotated_mesh.mesh().triangle_count()
    }
}

/// Bind `field` to `source` as its active per-vertex attribute.
///
/// The mesh is shared, not copied. Fails with `ScalarFieldMismatch` when the
/// field length differs from the vertex count.
pub fn assemble(source: impl Into<Arc<Mesh>>, field: ScalarField) -> Result<DistanceResult> {
    let mesh = source.into();
    if field.len() != mesh.vertex_count() {
        return Err(JointSpaceError::ScalarFieldMismatch {
            expected: mesh.vertex_count(),
            actual: field.len(),
        });
    }

    let min_distance = field.min();
    Ok(DistanceResult {
        annotated_mesh: AnnotatedMesh {
            mesh,
            scalars: field,
            display_range: DISPLAY_RANGE,
        },
        min_distance,
    })
}

/// Serializable report of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceSummary {
    pub source_name: String,
    pub result_name: String,
    pub attribute: String,
    pub method: String,
    pub vertices: usize,
    pub triangles: usize,
    pub target_triangles: usize,
    pub decimation_applied: bool,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub mean_distance: Option<f64>,
}

impl DistanceSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;

    #[test]
    fn test_field_statistics() {
        let field = ScalarField::distance(vec![2.0, 0.5, 3.5]);
        assert_eq!(field.name(), "Distance");
        assert_eq!(field.min(), Some(0.5));
        assert_eq!(field.max(), Some(3.5));
        assert_eq!(field.mean(), Some(2.0));
        assert_eq!(field.range(), Some((0.5, 3.5)));

        let empty = ScalarField::distance(vec![]);
        assert_eq!(empty.mean(), None);
        assert_eq!(empty.range(), None);
    }

    #[test]
    fn test_assemble_binds_attribute() {
        let mesh = Arc::new(Primitive::cuboid(Vector3::new(1.0, 1.0, 1.0)).to_mesh());
        let values: Vec<f64> = (0..8).map(|i| i as f64 * 0.5 + 0.25).collect();
        let result = assemble(Arc::clone(&mesh), ScalarField::distance(values.clone())).unwrap();

        assert_eq!(result.min_distance, Some(0.25));
        assert_eq!(result.max_distance(), Some(3.75));
        assert!(Arc::ptr_eq(&result.annotated_mesh.mesh_arc(), &mesh));

        let attribute = result.annotated_mesh.point_attribute("Distance").unwrap();
        assert_eq!(attribute.values(), values.as_slice());
        assert!(result.annotated_mesh.point_attribute("Normals").is_none());
        assert_eq!(result.annotated_mesh.display_range(), (0.0, 5.0));
    }

    #[test]
    fn test_assemble_length_mismatch() {
        let mesh = Primitive::cuboid(Vector3::new(1.0, 1.0, 1.0)).to_mesh();
        let err = assemble(mesh, ScalarField::distance(vec![1.0; 7])).unwrap_err();
        assert_eq!(
            err,
            JointSpaceError::ScalarFieldMismatch {
                expected: 8,
                actual: 7
            }
        );
    }

    #[test]
    fn test_empty_mesh_has_no_minimum() {
        let mesh = Mesh::new(vec![], vec![]).unwrap();
        let result = assemble(mesh, ScalarField::distance(vec![])).unwrap();
        assert_eq!(result.min_distance, None);
        assert_eq!(result.mean_distance(), None);
    }

    #[test]
    fn test_vertex_colors_follow_bands() {
        let mesh = Mesh::from_flat(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2]).unwrap();
        let result = assemble(mesh, ScalarField::distance(vec![0.2, 1.6, 9.0])).unwrap();
        let colors = result.annotated_mesh.vertex_colors(&ColorBandMapper::clinical());
        assert_eq!(colors, vec![[255, 0, 0], [255, 255, 0], [0, 0, 255]]);
    }
}
