// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and spatial queries

mod bbox;
pub mod bvh;
mod mesh;
mod polydata;
mod primitives;
pub mod triangle;

pub use bbox::BoundingBox;
pub use bvh::{BVHStats, NearestHit, BVH};
pub use mesh::Mesh;
pub use polydata::{Cell, PolyData};
pub use primitives::Primitive;
