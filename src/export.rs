// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Which downstream file formats keep per-vertex scalars.
//!
//! Writing files is left to the host; this only answers whether the
//! "Distance" attribute survives a given format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Mesh formats a host may save a result to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// VTK XML polydata
    Vtp,
    /// Legacy VTK
    Vtk,
    Ply,
    Stl,
    Obj,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Vtp,
        ExportFormat::Vtk,
        ExportFormat::Ply,
        ExportFormat::Stl,
        ExportFormat::Obj,
    ];

    /// Format to suggest when saving a distance map
    pub fn recommended() -> Self {
        Self::Vtp
    }

    /// Parse a file extension, with or without the leading dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "vtp" => Some(Self::Vtp),
            "vtk" => Some(Self::Vtk),
            "ply" => Some(Self::Ply),
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Vtp => "vtp",
            Self::Vtk => "vtk",
            Self::Ply => "ply",
            Self::Stl => "stl",
            Self::Obj => "obj",
        }
    }

    pub fn preserves_point_scalars(&self) -> bool {
        matches!(self, Self::Vtp | Self::Vtk | Self::Ply)
    }

    /// Warning to show before saving in a format that drops the attribute
    pub fn scalar_loss_warning(&self, attribute: &str) -> Option<String> {
        if self.preserves_point_scalars() {
            return None;
        }
        Some(format!(
            "{} files do not store per-vertex scalars; the '{}' attribute will be lost. Save as .{} to keep it.",
            self.extension().to_ascii_uppercase(),
            attribute,
            Self::recommended().extension()
        ))
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extensions() {
        assert_eq!(ExportFormat::from_extension("VTP"), Some(ExportFormat::Vtp));
        assert_eq!(ExportFormat::from_extension(".stl"), Some(ExportFormat::Stl));
        assert_eq!(ExportFormat::from_extension("3mf"), None);
        assert_eq!(
            ExportFormat::from_path("out/Mandible_DistanceMap.ply"),
            Some(ExportFormat::Ply)
        );
        assert_eq!(ExportFormat::from_path("no_extension"), None);
    }

    #[test]
    fn test_scalar_preservation() {
        for format in ExportFormat::ALL {
            assert_eq!(
                format.scalar_loss_warning("Distance").is_none(),
                format.preserves_point_scalars()
            );
        }
        assert!(ExportFormat::recommended().preserves_point_scalars());
    }

    #[test]
    fn test_stl_warns() {
        let warning = ExportFormat::Stl.scalar_loss_warning("Distance").unwrap();
        assert!(warning.contains("STL"));
        assert!(warning.contains("'Distance'"));
        assert!(warning.contains(".vtp"));
    }
}
