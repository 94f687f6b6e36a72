// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) for spatial acceleration
//! Used to accelerate closest-primitive queries against a mesh

use super::BoundingBox;
use nalgebra::Point3;

/// BVH node
#[derive(Debug, Clone)]
pub struct BVHNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BVHNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BVHNode>>,
    /// Primitive indices (only for leaf nodes)
    pub primitive_indices: Vec<usize>,
}

impl BVHNode {
    /// Create a leaf node
    fn leaf(bbox: BoundingBox, primitive_indices: Vec<usize>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            primitive_indices,
        }
    }

    /// Create an internal node
    fn internal(left: Box<BVHNode>, right: Box<BVHNode>) -> Self {
        Self {
            bbox: left.bbox.union(&right.bbox),
            left: Some(left),
            right: Some(right),
            primitive_indices: Vec::new(),
        }
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Shape summary, logged after a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BVHStats {
    pub node_count: usize,
    pub leaf_count: usize,
    pub max_depth: usize,
    pub primitive_count: usize,
}

/// Winning primitive of a nearest query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestHit<T> {
    pub index: usize,
    pub distance_squared: f64,
    pub payload: T,
}

/// Bounding Volume Hierarchy over indexed primitives
#[derive(Debug, Clone)]
pub struct BVH {
    root: BVHNode,
    primitive_count: usize,
}

impl BVH {
    const MAX_DEPTH: usize = 32;
    const MIN_PRIMITIVES: usize = 4;

    /// Build BVH from primitives
    /// primitives: Vec of (primitive_index, bbox) pairs
    pub fn build(primitives: Vec<(usize, BoundingBox)>) -> Self {
        let primitive_count = primitives.len();
        if primitives.is_empty() {
            return Self {
                root: BVHNode::leaf(BoundingBox::empty(), Vec::new()),
                primitive_count,
            };
        }

        let root = Self::build_recursive(primitives, 0);
        Self {
            root,
            primitive_count,
        }
    }

    /// Recursively build BVH node
    fn build_recursive(mut primitives: Vec<(usize, BoundingBox)>, depth: usize) -> BVHNode {
        // Base case: create leaf if few primitives or max depth reached
        if primitives.len() <= Self::MIN_PRIMITIVES || depth >= Self::MAX_DEPTH {
            let bbox = Self::compute_union_bbox(&primitives);
            let indices = primitives.iter().map(|(idx, _)| *idx).collect();
            return BVHNode::leaf(bbox, indices);
        }

        // Split along the longest axis of the centroid spread
        let mut centroid_bounds = BoundingBox::empty();
        for (_, bbox) in &primitives {
            centroid_bounds.expand_to_include(&bbox.center());
        }
        let axis = centroid_bounds.longest_axis();

        // Sort by centroid, primitive index breaks ties so the tree is deterministic
        primitives.sort_by(|(ia, a), (ib, b)| {
            a.center()[axis]
                .total_cmp(&b.center()[axis])
                .then_with(|| ia.cmp(ib))
        });

        // Split at median
        let right_primitives = primitives.split_off(primitives.len() / 2);

        let left = Box::new(Self::build_recursive(primitives, depth + 1));
        let right = Box::new(Self::build_recursive(right_primitives, depth + 1));

        BVHNode::internal(left, right)
    }

    /// Compute union bounding box of primitives
    fn compute_union_bbox(primitives: &[(usize, BoundingBox)]) -> BoundingBox {
        primitives
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, bbox)| acc.union(bbox))
    }

    /// Find the primitive minimising `distance_squared`.
    ///
    /// `distance_squared(index)` must return the exact squared distance from
    /// `point` to primitive `index`, and never less than the squared distance
    /// from `point` to that primitive's bounding box. Returns
    /// `(index, squared distance)`, or `None` when empty.
    pub fn nearest<F>(&self, point: &Point3<f64>, distance_squared: F) -> Option<(usize, f64)>
    where
        F: Fn(usize) -> f64,
    {
        self.nearest_by(point, |i| ((), distance_squared(i)))
            .map(|hit| (hit.index, hit.distance_squared))
    }

    /// [`BVH::nearest`] where `measure` also yields a payload for the winner,
    /// such as the closest point it found.
    ///
    /// Children are visited nearest-box first and subtrees whose box is no
    /// closer than the best hit are skipped.
    pub fn nearest_by<T, F>(&self, point: &Point3<f64>, measure: F) -> Option<NearestHit<T>>
    where
        F: Fn(usize) -> (T, f64),
    {
        let mut best = None;
        Self::nearest_recursive(&self.root, point, &measure, &mut best);
        best
    }

    fn nearest_recursive<T, F>(
        node: &BVHNode,
        point: &Point3<f64>,
        measure: &F,
        best: &mut Option<NearestHit<T>>,
    ) where
        F: Fn(usize) -> (T, f64),
    {
        if let Some(hit) = best {
            if node.bbox.distance_squared_to_point(point) >= hit.distance_squared {
                return;
            }
        }

        if node.is_leaf() {
            for &index in &node.primitive_indices {
                let (payload, d) = measure(index);
                if best.as_ref().map_or(true, |hit| d < hit.distance_squared) {
                    *best = Some(NearestHit {
                        index,
                        distance_squared: d,
                        payload,
                    });
                }
            }
            return;
        }

        if let (Some(left), Some(right)) = (&node.left, &node.right) {
            let dl = left.bbox.distance_squared_to_point(point);
            let dr = right.bbox.distance_squared_to_point(point);
            let (near, far) = if dr < dl { (right, left) } else { (left, right) };
            Self::nearest_recursive(near, point, measure, best);
            Self::nearest_recursive(far, point, measure, best);
        }
    }

    /// Walk the tree and summarise its shape
    pub fn stats(&self) -> BVHStats {
        let mut stats = BVHStats {
            primitive_count: self.primitive_count,
            ..Default::default()
        };
        Self::stats_recursive(&self.root, 0, &mut stats);
        stats
    }

    fn stats_recursive(node: &BVHNode, depth: usize, stats: &mut BVHStats) {
        stats.node_count += 1;
        stats.max_depth = stats.max_depth.max(depth);
        if node.is_leaf() {
            stats.leaf_count += 1;
        }
        for child in [&node.left, &node.right].into_iter().flatten() {
            Self::stats_recursive(child, depth + 1, stats);
        }
    }

    /// Get root node (for testing)
    #[cfg(test)]
    pub fn root(&self) -> &BVHNode {
        &self.root
    }
}
