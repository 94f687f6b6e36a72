// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end processing: optional decimation, distance field, assembly

use crate::config::PipelineConfig;
use crate::distance::{compute_distance_field, DistanceMethod};
use crate::error::Result;
use crate::geometry::{Mesh, PolyData};
use crate::result::{assemble, DistanceResult, DistanceSummary};
use crate::session::{result_name, ResultStore};
use crate::simplify::simplify;
use crate::tracing_ext::{log_mesh_stats, log_stage, OperationTimer};
use std::borrow::Cow;
use tracing::{info, warn};

const STAGES: usize = 3;

/// Result of one pipeline run plus the facts needed to report it
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub source_name: String,
    pub result_name: String,
    pub result: DistanceResult,
    pub method: DistanceMethod,
    pub decimation_applied: bool,
    pub target_triangles: usize,
}

impl PipelineOutput {
    pub fn summary(&self) -> DistanceSummary {
        DistanceSummary {
            source_name: self.source_name.clone(),
            result_name: self.result_name.clone(),
            attribute: self.result.distances().name().to_string(),
            method: self.method.to_string(),
            vertices: self.result.vertex_count(),
            triangles: self.result.triangle_count(),
            target_triangles: self.target_triangles,
            decimation_applied: self.decimation_applied,
            min_distance: self.result.min_distance,
            max_distance: self.result.max_distance(),
            mean_distance: self.result.mean_distance(),
        }
    }

    /// Upsert the result under its derived name
    pub fn store_in(self, store: &mut ResultStore) -> Option<DistanceResult> {
        store.upsert(self.result_name, self.result)
    }
}

/// Measure how far every vertex of `source` is from the surface of `target`.
///
/// With decimation enabled both meshes are simplified first and the result is
/// bound to the simplified source. Inputs are never modified.
pub fn process(
    source_name: &str,
    source: &Mesh,
    target: &Mesh,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    config.validate()?;
    let _timer = OperationTimer::with_context("pipeline", source.triangle_count(), source.vertex_count());

    info!(
        source = source_name,
        source_points = source.vertex_count(),
        source_cells = source.triangle_count(),
        target_points = target.vertex_count(),
        target_cells = target.triangle_count(),
        "Computing distance map"
    );
    log_mesh_stats(source, "source");
    log_mesh_stats(target, "target");

    let decimation_applied = config.decimation_active();
    log_stage("decimate", 1, STAGES);
    let (source, target): (Cow<'_, Mesh>, Cow<'_, Mesh>) = if decimation_applied {
        let fraction = config.decimation_fraction;
        let decimated_source = simplify(source, fraction)?;
        let decimated_target = simplify(target, fraction)?;
        info!(
            fraction,
            source_cells = decimated_source.triangle_count(),
            target_cells = decimated_target.triangle_count(),
            "Decimation applied"
        );
        (Cow::Owned(decimated_source), Cow::Owned(decimated_target))
    } else {
        (Cow::Borrowed(source), Cow::Borrowed(target))
    };

    log_stage("distance", 2, STAGES);
    let options = config.distance_options();
    let field = match config.threads.and_then(build_pool) {
        Some(pool) => pool.install(|| compute_distance_field(source.vertices(), &target, &options)),
        None => compute_distance_field(source.vertices(), &target, &options),
    }?
    .with_name(config.attribute_name.as_str());

    log_stage("assemble", 3, STAGES);
    let target_triangles = target.triangle_count();
    let result = assemble(source.into_owned(), field)?;

    match result.min_distance {
        Some(min) => info!(source = source_name, min_distance = min, "Distance map ready"),
        None => warn!(source = source_name, "Distance map is empty"),
    }

    Ok(PipelineOutput {
        source_name: source_name.to_string(),
        result_name: result_name(source_name),
        result,
        method: config.method,
        decimation_applied,
        target_triangles,
    })
}

/// [`process`] on polygonal inputs, triangulating them first
pub fn process_polydata(
    source_name: &str,
    source: &PolyData,
    target: &PolyData,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    let source = source.to_mesh()?;
    let target = target.to_mesh()?;
    process(source_name, &source, &target, config)
}

fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!(threads, error = %e, "Falling back to the global thread pool");
            None
        }
    }
}
