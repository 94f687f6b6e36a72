// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end pipeline runs, result storage and configuration files

use anyhow::Result;
use jointspace::geometry::Primitive;
use jointspace::{
    process, sample_scene, DistanceMethod, ExportFormat, JointSpaceError, PipelineConfig,
    ResultStore,
};
use nalgebra::Vector3;
use tempfile::{tempdir, NamedTempFile};

#[test]
fn test_rerun_replaces_stored_result() -> Result<()> {
    let (sphere, slab) = sample_scene();
    let mut store = ResultStore::new();

    let first = process("Mandible", &sphere, &slab, &PipelineConfig::default())?;
    assert!(first.store_in(&mut store).is_none());

    // Move the slab down and recompute for the same source
    let lowered = slab.translated(Vector3::new(0.0, 0.0, -0.5));
    let second = process("Mandible", &sphere, &lowered, &PipelineConfig::default())?;
    let replaced = second.store_in(&mut store).expect("previous result replaced");

    assert_eq!(store.len(), 1);
    let stored = store.get("Mandible_DistanceMap").expect("stored result");
    let before = replaced.min_distance.unwrap_or(f64::NAN);
    let after = stored.min_distance.unwrap_or(f64::NAN);
    println!("Min distance: {:.4} -> {:.4}", before, after);
    assert!((after - before - 0.5).abs() < 1e-9);

    Ok(())
}

#[test]
fn test_summary_json() -> Result<()> {
    let (sphere, slab) = sample_scene();
    let output = process("Sphere", &sphere, &slab, &PipelineConfig::default())?;
    let summary = output.summary();

    let json = summary.to_json()?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["result_name"], "Sphere_DistanceMap");
    assert_eq!(value["attribute"], "Distance");
    assert_eq!(value["method"], "surface");
    assert_eq!(value["vertices"], 2562);
    assert_eq!(value["decimation_applied"], false);

    let min = value["min_distance"].as_f64().unwrap_or(f64::NAN);
    assert!((min - 0.45).abs() < 1e-2);

    Ok(())
}

#[test]
fn test_decimation_applies_to_both_meshes() -> Result<()> {
    let source = Primitive::icosphere(1.0, 3)
        .to_mesh()
        .translated(Vector3::new(0.0, 0.0, 2.0));
    let target = Primitive::icosphere(1.0, 3).to_mesh();
    let config = PipelineConfig {
        enable_decimation: true,
        decimation_fraction: 0.5,
        ..Default::default()
    };

    let output = process("Upper", &source, &target, &config)?;
    println!(
        "Source {} -> {} triangles, target {} -> {} triangles",
        source.triangle_count(),
        output.result.triangle_count(),
        target.triangle_count(),
        output.target_triangles
    );

    assert!(output.decimation_applied);
    assert!(output.result.triangle_count() < source.triangle_count());
    assert!(output.target_triangles < target.triangle_count());
    // Gap between two unit spheres whose centres are 2 apart is zero
    assert!(output.result.min_distance.unwrap_or(f64::NAN) < 0.1);

    Ok(())
}

#[test]
fn test_full_decimation_fraction_fails() {
    let (sphere, slab) = sample_scene();
    let config = PipelineConfig {
        enable_decimation: true,
        decimation_fraction: 1.0,
        ..Default::default()
    };
    let err = process("Sphere", &sphere, &slab, &config).unwrap_err();
    assert!(matches!(err, JointSpaceError::Simplification { .. }));
    assert_eq!(err.kind(), "simplification");
}

#[test]
fn test_config_roundtrip() -> Result<()> {
    let config = PipelineConfig {
        enable_decimation: true,
        decimation_fraction: 0.35,
        method: DistanceMethod::Vertex,
        parallel: false,
        threads: Some(3),
        attribute_name: "Gap".to_string(),
    };

    let file = NamedTempFile::new()?;
    config.save(file.path())?;
    let loaded = PipelineConfig::from_file(file.path())?;
    assert_eq!(loaded, config);

    Ok(())
}

#[test]
fn test_config_file_errors_carry_context() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("missing.toml");
    let err = PipelineConfig::from_file(&missing).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "method = 42\n")?;
    let err = PipelineConfig::from_file(&bad).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));

    Ok(())
}

#[test]
fn test_export_warning_for_result_file() {
    let name = format!("{}.stl", jointspace::result_name("Mandible"));
    let format = ExportFormat::from_path(&name).expect("known extension");
    assert!(!format.preserves_point_scalars());
    assert!(format.scalar_loss_warning("Distance").is_some());
    assert!(ExportFormat::from_path("Mandible_DistanceMap.vtp")
        .map_or(false, |f| f.preserves_point_scalars()));
}
