// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Named result storage with replace-on-recompute semantics

use crate::result::DistanceResult;
use tracing::info;

/// Name under which the distance map of `source_name` is stored
pub fn result_name(source_name: &str) -> String {
    format!("{}_DistanceMap", source_name)
}

/// Results keyed by name, in insertion order.
///
/// Re-running the pipeline for the same source replaces the previous entry
/// instead of adding a second one.
#[derive(Debug, Default)]
pub struct ResultStore {
    entries: Vec<(String, DistanceResult)>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `result` under `name`, returning the result it replaced
    pub fn upsert(&mut self, name: impl Into<String>, result: DistanceResult) -> Option<DistanceResult> {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => {
                info!(name = %name, "Replacing existing result");
                Some(std::mem::replace(slot, result))
            }
            None => {
                self.entries.push((name, result));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&DistanceResult> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, result)| result)
    }

    pub fn remove(&mut self, name: &str) -> Option<DistanceResult> {
        let position = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(position).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
