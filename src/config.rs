// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pipeline configuration

use crate::distance::{DistanceMethod, DistanceOptions};
use crate::error::JointSpaceError;
use crate::result::DISTANCE_ATTRIBUTE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "jointspace.toml";

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Decimate both meshes before measuring
    pub enable_decimation: bool,
    /// Fraction of triangles to remove when decimating
    pub decimation_fraction: f64,
    /// Distance measure
    pub method: DistanceMethod,
    /// Run per-vertex queries on the rayon pool
    pub parallel: bool,
    /// Worker cap; `None` uses the global pool
    pub threads: Option<usize>,
    /// Name of the resulting per-vertex attribute
    pub attribute_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enable_decimation: false,
            decimation_fraction: 0.0,
            method: DistanceMethod::Surface,
            parallel: true,
            threads: None,
            attribute_name: DISTANCE_ATTRIBUTE.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: PipelineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `jointspace.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `JOINTSPACE_*` overrides from `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(fraction) = lookup("JOINTSPACE_DECIMATION") {
            let fraction: f64 = fraction
                .trim()
                .parse()
                .with_context(|| format!("JOINTSPACE_DECIMATION is not a number: {:?}", fraction))?;
            self.decimation_fraction = fraction;
            self.enable_decimation = fraction > 0.0;
        }

        if let Some(method) = lookup("JOINTSPACE_METHOD") {
            self.method = method
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid JOINTSPACE_METHOD")?;
        }

        if let Some(parallel) = lookup("JOINTSPACE_PARALLEL") {
            self.parallel = parallel
                .trim()
                .parse()
                .with_context(|| format!("JOINTSPACE_PARALLEL is not a boolean: {:?}", parallel))?;
        }

        if let Some(threads) = lookup("JOINTSPACE_THREADS") {
            let threads: usize = threads
                .trim()
                .parse()
                .with_context(|| format!("JOINTSPACE_THREADS is not a count: {:?}", threads))?;
            anyhow::ensure!(threads > 0, "JOINTSPACE_THREADS must be at least 1");
            self.threads = Some(threads);
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Check value ranges.
    ///
    /// `decimation_fraction` is left to the simplifier, which rejects values
    /// outside `[0, 1)` only when decimation actually runs.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.threads == Some(0) {
            return Err(JointSpaceError::invalid_config("threads must be at least 1"));
        }
        if self.attribute_name.trim().is_empty() {
            return Err(JointSpaceError::invalid_config("attribute_name is empty"));
        }
        Ok(())
    }

    /// Whether decimation actually runs; a fraction of zero or less is a no-op
    pub fn decimation_active(&self) -> bool {
        let fraction = self.decimation_fraction;
        self.enable_decimation && (fraction > 0.0 || fraction.is_nan())
    }

    pub fn distance_options(&self) -> DistanceOptions {
        DistanceOptions {
            method: self.method,
            parallel: self.parallel,
        }
    }
}
