// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Structured logging helpers built on `tracing`.
//!
//! The library only emits events; installing a subscriber is up to the
//! application (the `jointspace` binary uses `tracing-subscriber` with an
//! `EnvFilter`, so `RUST_LOG=jointspace=debug` shows per-stage detail).
//!
//! Targets:
//! - `jointspace::timing`: operation durations
//! - `jointspace::mesh_state`: mesh sizes and bounds
//! - `jointspace::progress`: stage progress of the pipeline

use crate::geometry::Mesh;
use std::time::Instant;
use tracing::span::EnteredSpan;
use tracing::{debug, info};

/// Enters a `mesh_operation` span for its lifetime and logs the duration of
/// the operation when dropped.
///
/// ```rust,ignore
/// let _timer = OperationTimer::new("build_surface_index");
/// // ... work ...
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    _span: EnteredSpan,
}

impl OperationTimer {
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("mesh_operation", operation = name).entered();
        debug!(target: "jointspace::timing", "Starting operation");
        Self {
            name,
            start: Instant::now(),
            _span: span,
        }
    }

    /// Timer whose span also records the mesh size being worked on
    pub fn with_context(name: &'static str, face_count: usize, vertex_count: usize) -> Self {
        let span = tracing::info_span!(
            "mesh_operation",
            operation = name,
            faces = face_count,
            vertices = vertex_count
        )
        .entered();
        debug!(target: "jointspace::timing", "Starting operation");
        Self {
            name,
            start: Instant::now(),
            _span: span,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        info!(
            target: "jointspace::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", self.elapsed_ms()),
            "Operation completed"
        );
    }
}

/// Log mesh size and extent at debug level
pub fn log_mesh_stats(mesh: &Mesh, context: &str) {
    let bbox = mesh.bounding_box();
    let dims = if bbox.is_empty() {
        nalgebra::Vector3::zeros()
    } else {
        bbox.size()
    };

    debug!(
        target: "jointspace::mesh_state",
        context = context,
        vertices = mesh.vertex_count(),
        faces = mesh.triangle_count(),
        dimensions = format!("{:.2} x {:.2} x {:.2}", dims.x, dims.y, dims.z),
        "Mesh state"
    );
}

/// Log a pipeline stage transition
pub fn log_stage(stage: &str, current: usize, total: usize) {
    debug!(
        target: "jointspace::progress",
        stage = stage,
        current = current,
        total = total,
        "Pipeline stage"
    );
}
