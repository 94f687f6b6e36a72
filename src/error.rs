// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for distance-field computation

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, JointSpaceError>;

/// Failures raised by the core algorithms.
///
/// Every variant is returned to the immediate caller; no operation falls back
/// to default geometry or returns a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JointSpaceError {
    /// Input mesh has no points, no triangular faces, bad indices or bad coordinates
    #[error("invalid mesh: {reason}")]
    InvalidMesh { reason: String },

    /// Scalar field length does not match the mesh vertex count
    #[error("scalar field has {actual} values but mesh has {expected} vertices")]
    ScalarFieldMismatch { expected: usize, actual: usize },

    /// Decimation target out of range or decimation produced no triangles
    #[error("simplification failed: {reason}")]
    Simplification { reason: String },

    /// Color transfer function control points are malformed
    #[error("invalid color map: {reason}")]
    InvalidColorMap { reason: String },

    /// Pipeline configuration values are out of range
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl JointSpaceError {
    pub fn invalid_mesh(reason: impl Into<String>) -> Self {
        Self::InvalidMesh {
            reason: reason.into(),
        }
    }

    pub fn simplification(reason: impl Into<String>) -> Self {
        Self::Simplification {
            reason: reason.into(),
        }
    }

    pub fn invalid_color_map(reason: impl Into<String>) -> Self {
        Self::InvalidColorMap {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, used in CLI output and JSON reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidMesh { .. } => "invalid_mesh",
            Self::ScalarFieldMismatch { .. } => "scalar_field_mismatch",
            Self::Simplification { .. } => "simplification",
            Self::InvalidColorMap { .. } => "invalid_color_map",
            Self::InvalidConfig { .. } => "invalid_config",
        }
    }
}
