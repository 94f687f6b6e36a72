// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Unsigned distance from mesh vertices to a target surface.
//!
//! The target is indexed once (a BVH over its triangles) and queried per
//! source vertex. Queries are independent, so the loop runs on rayon when
//! asked to; results are collected by index and therefore always come back in
//! source-vertex order.

mod index;

pub use index::{SurfaceIndex, VertexIndex};

use crate::error::{JointSpaceError, Result};
use crate::geometry::Mesh;
use crate::result::ScalarField;
use crate::tracing_ext::OperationTimer;
use nalgebra::Point3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// How distance to the target is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMethod {
    /// Closest point anywhere on the target triangles
    #[default]
    Surface,
    /// Nearest target vertex only; an upper bound on `Surface`
    Vertex,
}

impl fmt::Display for DistanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface => write!(f, "surface"),
            Self::Vertex => write!(f, "vertex"),
        }
    }
}

impl FromStr for DistanceMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surface" => Ok(Self::Surface),
            "vertex" => Ok(Self::Vertex),
            other => Err(format!("unknown distance method '{}'", other)),
        }
    }
}

/// Closest surface point returned by [`SurfaceIndex::closest_point`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    pub point: Point3<f64>,
    pub distance: f64,
    /// Index of the target triangle the point lies on
    pub triangle: usize,
}

/// A prebuilt structure answering point-to-target distance queries
pub trait DistanceQuery: Sync {
    /// Squared distance from `point` to the target
    fn distance_squared(&self, point: &Point3<f64>) -> f64;

    fn distance(&self, point: &Point3<f64>) -> f64 {
        self.distance_squared(point).sqrt()
    }
}

/// Options for [`compute_distance_field`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceOptions {
    pub method: DistanceMethod,
    pub parallel: bool,
}

impl Default for DistanceOptions {
    fn default() -> Self {
        Self {
            method: DistanceMethod::Surface,
            parallel: true,
        }
    }
}

/// Distance from every point in `source` to the surface of `target`.
///
/// Fails with `InvalidMesh` when the target has no points or no triangles.
/// An empty `source` yields an empty field.
pub fn compute_unsigned_distance(source: &[Point3<f64>], target: &Mesh) -> Result<ScalarField> {
    compute_distance_field(source, target, &DistanceOptions::default())
}

/// [`compute_unsigned_distance`] with an explicit method and scheduling
pub fn compute_distance_field(
    source: &[Point3<f64>],
    target: &Mesh,
    options: &DistanceOptions,
) -> Result<ScalarField> {
    let _timer =
        OperationTimer::with_context("compute_distance", target.triangle_count(), source.len());

    let values = match options.method {
        DistanceMethod::Surface => {
            let index = SurfaceIndex::new(target)?;
            query_all(&index, source, options.parallel)
        }
        DistanceMethod::Vertex => {
            // Same input contract as the surface method
            if target.triangle_count() == 0 {
                return Err(JointSpaceError::invalid_mesh(
                    "target mesh has no triangular faces",
                ));
            }
            let index = VertexIndex::new(target)?;
            query_all(&index, source, options.parallel)
        }
    };

    if values.is_empty() {
        warn!("Source has no vertices, distance field is empty");
    }
    debug!(
        method = %options.method,
        parallel = options.parallel,
        points = values.len(),
        "Distance field computed"
    );

    Ok(ScalarField::distance(values))
}

/// Evaluate `query` at every point, preserving input order
pub fn query_all<Q: DistanceQuery>(query: &Q, points: &[Point3<f64>], parallel: bool) -> Vec<f64> {
    if parallel {
        points.par_iter().map(|p| query.distance(p)).collect()
    } else {
        points.iter().map(|p| query.distance(p)).collect()
    }
}
