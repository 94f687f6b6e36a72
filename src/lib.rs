// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Jointspace
//!
//! Surface-to-surface distance fields between two triangle meshes, such as
//! the gap between mandible and maxilla models. Every vertex of a source mesh
//! gets its unsigned distance to the closest point on a target surface, bound
//! to the source as a "Distance" attribute and colour-banded for display.
//! Optional quadric-error decimation can be applied to both meshes first.

pub mod cli;
pub mod color;
pub mod config;
pub mod distance;
pub mod error;
pub mod export;
pub mod geometry;
pub mod pipeline;
pub mod result;
pub mod session;
pub mod simplify;
pub mod tracing_ext;

pub use color::{ColorBand, ColorBandMapper, ColorTransferFunction, Rgb};
pub use config::PipelineConfig;
pub use distance::{compute_unsigned_distance, DistanceMethod, DistanceQuery, SurfaceIndex};
pub use error::{JointSpaceError, Result};
pub use export::ExportFormat;
pub use geometry::{Mesh, PolyData, Primitive};
pub use pipeline::{process, PipelineOutput};
pub use result::{assemble, AnnotatedMesh, DistanceResult, DistanceSummary, ScalarField};
pub use session::{result_name, ResultStore};
pub use simplify::simplify;

use nalgebra::Vector3;

/// Centre of the sphere in the sample scene
pub const SAMPLE_SPHERE_CENTER: [f64; 3] = [0.0, 0.0, 1.5];

/// Sample scene: an icosphere hovering over a flat slab.
///
/// Returns `(sphere, slab)`; the sphere's lowest point is 0.45 above the slab.
pub fn sample_scene() -> (Mesh, Mesh) {
    let [x, y, z] = SAMPLE_SPHERE_CENTER;
    let sphere = Primitive::icosphere(0.8, 4)
        .to_mesh()
        .translated(Vector3::new(x, y, z));
    let slab = Primitive::cuboid(Vector3::new(3.0, 3.0, 0.5)).to_mesh();
    (sphere, slab)
}
