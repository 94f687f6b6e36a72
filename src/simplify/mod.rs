// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh decimation using edge collapse with quadric error metrics.
//!
//! Edges are collapsed cheapest-first from a priority queue. Queue entries are
//! invalidated lazily: every vertex carries a stamp that changes whenever the
//! vertex moves or disappears, and entries with stale stamps are dropped when
//! popped. Collapses that would break the local topology (link condition) or
//! flip a neighbouring face are rejected.

mod quadric;

pub use quadric::Quadric;

use crate::error::{JointSpaceError, Result};
use crate::geometry::Mesh;
use crate::tracing_ext::OperationTimer;
use ahash::AHashSet;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::debug;

/// Parameters for mesh decimation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyParams {
    /// Fraction of triangles to remove, in `[0, 1)`
    pub target_reduction: f64,
    /// Keep vertices on open boundaries fixed
    pub preserve_boundary: bool,
    /// Reject collapses whose quadric error exceeds this value
    pub max_error: Option<f64>,
}

impl Default for SimplifyParams {
    fn default() -> Self {
        Self {
            target_reduction: 0.5,
            preserve_boundary: true,
            max_error: None,
        }
    }
}

impl SimplifyParams {
    pub fn with_target_reduction(target_reduction: f64) -> Self {
        Self {
            target_reduction,
            ..Default::default()
        }
    }
}

/// Result of mesh decimation
#[derive(Debug, Clone)]
pub struct SimplifyReport {
    pub mesh: Mesh,
    pub original_triangles: usize,
    pub final_triangles: usize,
    pub collapses_performed: usize,
    pub collapses_rejected: usize,
}

impl SimplifyReport {
    /// Fraction of triangles actually removed
    pub fn achieved_reduction(&self) -> f64 {
        if self.original_triangles == 0 {
            0.0
        } else {
            1.0 - self.final_triangles as f64 / self.original_triangles as f64
        }
    }
}

/// Decimate `mesh`, removing roughly `target_reduction` of its triangles.
///
/// A reduction of zero or less returns an identical copy.
pub fn simplify(mesh: &Mesh, target_reduction: f64) -> Result<Mesh> {
    simplify_with_params(mesh, &SimplifyParams::with_target_reduction(target_reduction))
        .map(|report| report.mesh)
}

/// Decimate with explicit parameters and collapse statistics
pub fn simplify_with_params(mesh: &Mesh, params: &SimplifyParams) -> Result<SimplifyReport> {
    let reduction = params.target_reduction;
    if reduction.is_nan() || reduction >= 1.0 {
        return Err(JointSpaceError::simplification(format!(
            "target reduction {} is outside [0, 1)",
            reduction
        )));
    }

    let original_triangles = mesh.triangle_count();
    if reduction <= 0.0 {
        return Ok(SimplifyReport {
            mesh: mesh.clone(),
            original_triangles,
            final_triangles: original_triangles,
            collapses_performed: 0,
            collapses_rejected: 0,
        });
    }

    if original_triangles == 0 {
        return Err(JointSpaceError::simplification("input mesh has no triangles"));
    }

    let _timer = OperationTimer::with_context("simplify", original_triangles, mesh.vertex_count());
    let target = ((original_triangles as f64) * (1.0 - reduction)).round().max(1.0) as usize;

    let mut state = CollapseState::new(mesh, params.preserve_boundary);
    let mut heap = state.initial_queue();

    let mut collapses_performed = 0;
    let mut collapses_rejected = 0;

    while state.live_faces > target {
        let Some(candidate) = heap.pop() else {
            break;
        };
        if !state.is_current(&candidate) {
            continue;
        }

        if let Some(max_error) = params.max_error {
            if candidate.cost > max_error {
                // Queue is ordered by cost, nothing cheaper remains
                break;
            }
        }

        if !state.can_collapse(candidate.keep, candidate.remove, &candidate.target) {
            collapses_rejected += 1;
            continue;
        }

        state.collapse(candidate.keep, candidate.remove, candidate.target);
        collapses_performed += 1;
        state.requeue_around(candidate.keep, &mut heap);
    }

    let simplified = state.into_mesh();
    let final_triangles = simplified.triangle_count();
    if final_triangles == 0 {
        return Err(JointSpaceError::simplification(
            "decimation produced a mesh with zero triangles",
        ));
    }

    debug!(
        original_triangles,
        final_triangles,
        target,
        collapses_performed,
        collapses_rejected,
        "Decimation finished"
    );

    Ok(SimplifyReport {
        mesh: simplified,
        original_triangles,
        final_triangles,
        collapses_performed,
        collapses_rejected,
    })
}

/// An edge collapse candidate in the priority queue
#[derive(Debug, Clone)]
struct Candidate {
    cost: f64,
    keep: usize,
    remove: usize,
    keep_stamp: u32,
    remove_stamp: u32,
    target: Point3<f64>,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the cheapest collapse; vertex ids break ties
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.keep.cmp(&self.keep))
            .then_with(|| other.remove.cmp(&self.remove))
    }
}

/// Mutable working copy of the mesh during decimation
struct CollapseState {
    positions: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
    face_alive: Vec<bool>,
    vertex_alive: Vec<bool>,
    vertex_faces: Vec<Vec<usize>>,
    quadrics: Vec<Quadric>,
    stamps: Vec<u32>,
    on_boundary: Vec<bool>,
    locked: Vec<bool>,
    live_faces: usize,
}

impl CollapseState {
    fn new(mesh: &Mesh, preserve_boundary: bool) -> Self {
        let vertex_count = mesh.vertex_count();
        let faces = mesh.faces().to_vec();

        let mut vertex_faces = vec![Vec::new(); vertex_count];
        let mut quadrics = vec![Quadric::default(); vertex_count];
        for (fi, face) in faces.iter().enumerate() {
            let [a, b, c] = mesh.triangle(fi);
            let plane = Quadric::from_triangle(&a, &b, &c);
            for &v in face {
                vertex_faces[v].push(fi);
                if let Some(q) = plane {
                    quadrics[v] += q;
                }
            }
        }

        let mut on_boundary = vec![false; vertex_count];
        for (a, b) in boundary_edges(&faces) {
            on_boundary[a] = true;
            on_boundary[b] = true;
        }
        let locked = if preserve_boundary {
            on_boundary.clone()
        } else {
            vec![false; vertex_count]
        };

        Self {
            positions: mesh.vertices().to_vec(),
            face_alive: vec![true; faces.len()],
            live_faces: faces.len(),
            faces,
            vertex_alive: vec![true; vertex_count],
            vertex_faces,
            quadrics,
            stamps: vec![0; vertex_count],
            on_boundary,
            locked,
        }
    }

    fn initial_queue(&self) -> BinaryHeap<Candidate> {
        let mut heap = BinaryHeap::new();
        let mut seen = AHashSet::new();
        for face in &self.faces {
            for i in 0..3 {
                let (a, b) = (face[i], face[(i + 1) % 3]);
                let key = if a < b { (a, b) } else { (b, a) };
                if seen.insert(key) {
                    if let Some(candidate) = self.candidate(key.0, key.1) {
                        heap.push(candidate);
                    }
                }
            }
        }
        heap
    }

    /// Cheapest placement for collapsing edge `(a, b)`; `None` if both ends are fixed
    fn candidate(&self, a: usize, b: usize) -> Option<Candidate> {
        let (keep, remove) = match (self.locked[a], self.locked[b]) {
            (true, true) => return None,
            (false, true) => (b, a),
            _ => (a, b),
        };

        let q = self.quadrics[keep] + self.quadrics[remove];
        let pk = self.positions[keep];
        let pr = self.positions[remove];

        // A locked endpoint must stay where it is
        let target = if self.locked[keep] {
            pk
        } else {
            let mid = nalgebra::center(&pk, &pr);
            let mut options = vec![pk, pr, mid];
            // Nearly flat neighbourhoods can put the optimum far off the surface
            if let Some(optimal) = q
                .optimal_point()
                .filter(|o| (o - mid).norm() <= 2.0 * (pk - pr).norm())
            {
                options.insert(0, optimal);
            }
            options
                .into_iter()
                .min_by(|x, y| q.error(x).total_cmp(&q.error(y)))
                .unwrap_or(pk)
        };

        Some(Candidate {
            cost: q.error(&target),
            keep,
            remove,
            keep_stamp: self.stamps[keep],
            remove_stamp: self.stamps[remove],
            target,
        })
    }

    fn is_current(&self, c: &Candidate) -> bool {
        self.vertex_alive[c.keep]
            && self.vertex_alive[c.remove]
            && self.stamps[c.keep] == c.keep_stamp
            && self.stamps[c.remove] == c.remove_stamp
    }

    fn live_faces_of(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.vertex_faces[v]
            .iter()
            .copied()
            .filter(move |&f| self.face_alive[f])
    }

    fn neighbors(&self, v: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .live_faces_of(v)
            .flat_map(|f| self.faces[f])
            .filter(|&u| u != v)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Link condition plus a normal-flip check on every face that survives
    fn can_collapse(&self, keep: usize, remove: usize, target: &Point3<f64>) -> bool {
        let mut edge_opposites: Vec<usize> = self
            .live_faces_of(keep)
            .map(|f| self.faces[f])
            .filter(|face| face.contains(&remove))
            .filter_map(|face| face.into_iter().find(|&u| u != keep && u != remove))
            .collect();
        if edge_opposites.is_empty() {
            return false;
        }
        edge_opposites.sort_unstable();
        edge_opposites.dedup();

        // Joining two boundary vertices across the interior pinches the surface
        if edge_opposites.len() > 1 && self.on_boundary[keep] && self.on_boundary[remove] {
            return false;
        }

        let nk = self.neighbors(keep);
        let nr = self.neighbors(remove);
        let common: Vec<usize> = nk
            .iter()
            .copied()
            .filter(|u| *u != remove && nr.binary_search(u).is_ok())
            .collect();
        if common != edge_opposites {
            return false;
        }

        // A face of `remove` that lands on an existing face of `keep` folds the surface
        let keep_faces: Vec<[usize; 3]> = self
            .live_faces_of(keep)
            .map(|f| sorted(self.faces[f]))
            .collect();
        let folds = self
            .live_faces_of(remove)
            .map(|f| self.faces[f])
            .filter(|face| !face.contains(&keep))
            .any(|face| {
                let remapped = face.map(|u| if u == remove { keep } else { u });
                keep_faces.contains(&sorted(remapped))
            });
        if folds {
            return false;
        }

        for v in [keep, remove] {
            for f in self.live_faces_of(v) {
                let face = self.faces[f];
                if face.contains(&keep) && face.contains(&remove) {
                    continue;
                }
                let before = self.face_normal(&face, None);
                let after = self.face_normal(&face, Some((v, target)));
                let (Some(before), Some(after)) = (before, after) else {
                    return false;
                };
                if before.dot(&after) < 0.2 {
                    return false;
                }
            }
        }

        true
    }

    /// Unit normal of `face`, optionally with one vertex moved
    fn face_normal(
        &self,
        face: &[usize; 3],
        moved: Option<(usize, &Point3<f64>)>,
    ) -> Option<nalgebra::Vector3<f64>> {
        let p = |i: usize| match moved {
            Some((v, target)) if v == i => *target,
            _ => self.positions[i],
        };
        let (a, b, c) = (p(face[0]), p(face[1]), p(face[2]));
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        (len > 1e-15).then(|| n / len)
    }

    fn collapse(&mut self, keep: usize, remove: usize, target: Point3<f64>) {
        self.positions[keep] = target;
        let q = self.quadrics[remove];
        self.quadrics[keep] += q;
        self.vertex_alive[remove] = false;
        self.on_boundary[keep] |= self.on_boundary[remove];

        let removed_faces = std::mem::take(&mut self.vertex_faces[remove]);
        for f in removed_faces {
            if !self.face_alive[f] {
                continue;
            }
            if self.faces[f].contains(&keep) {
                self.face_alive[f] = false;
                self.live_faces -= 1;
            } else {
                for idx in self.faces[f].iter_mut() {
                    if *idx == remove {
                        *idx = keep;
                    }
                }
                self.vertex_faces[keep].push(f);
            }
        }

        let face_alive = &self.face_alive;
        self.vertex_faces[keep].retain(|&f| face_alive[f]);
        self.stamps[keep] = self.stamps[keep].wrapping_add(1);
        self.stamps[remove] = self.stamps[remove].wrapping_add(1);
    }

    /// Re-queue every edge around `v` after it moved
    fn requeue_around(&self, v: usize, heap: &mut BinaryHeap<Candidate>) {
        for u in self.neighbors(v) {
            let (a, b) = if v < u { (v, u) } else { (u, v) };
            if let Some(candidate) = self.candidate(a, b) {
                heap.push(candidate);
            }
        }
    }

    /// Compact surviving vertices (in original order) and faces
    fn into_mesh(self) -> Mesh {
        let mut remap = vec![usize::MAX; self.positions.len()];
        let mut vertices = Vec::new();
        let mut faces = Vec::with_capacity(self.live_faces);

        for (fi, face) in self.faces.iter().enumerate() {
            if !self.face_alive[fi] {
                continue;
            }
            for &v in face {
                if remap[v] == usize::MAX {
                    remap[v] = 0;
                }
            }
        }
        for (v, slot) in remap.iter_mut().enumerate() {
            if *slot != usize::MAX {
                *slot = vertices.len();
                vertices.push(self.positions[v]);
            }
        }
        for (fi, face) in self.faces.iter().enumerate() {
            if self.face_alive[fi] {
                faces.push([remap[face[0]], remap[face[1]], remap[face[2]]]);
            }
        }

        Mesh::from_parts_unchecked(vertices, faces)
    }
}

fn sorted(mut face: [usize; 3]) -> [usize; 3] {
    face.sort_unstable();
    face
}

/// Edges used by exactly one face, in face order
fn boundary_edges(faces: &[[usize; 3]]) -> Vec<(usize, usize)> {
    let mut counts: ahash::AHashMap<(usize, usize), usize> = ahash::AHashMap::new();
    let mut order = Vec::new();
    for face in faces {
        for i in 0..3 {
            let (a, b) = (face[i], face[(i + 1) % 3]);
            let key = if a < b { (a, b) } else { (b, a) };
            let count = counts.entry(key).or_insert(0);
            if *count == 0 {
                order.push(key);
            }
            *count += 1;
        }
    }
    order.into_iter().filter(|key| counts[key] == 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;

    #[test]
    fn test_zero_reduction_is_noop() {
        let mesh = Primitive::icosphere(1.0, 2).to_mesh();
        let simplified = simplify(&mesh, 0.0).unwrap();
        assert_eq!(simplified.triangle_count(), mesh.triangle_count());
        assert_eq!(simplified, mesh);

        let negative = simplify(&mesh, -0.3).unwrap();
        assert_eq!(negative, mesh);
    }

    #[test]
    fn test_out_of_range_reduction() {
        let mesh = Primitive::icosphere(1.0, 1).to_mesh();
        for bad in [1.0, 1.5, f64::NAN] {
            assert!(matches!(
                simplify(&mesh, bad),
                Err(JointSpaceError::Simplification { .. })
            ));
        }
    }

    #[test]
    fn test_empty_input_is_error() {
        let mesh = Mesh::new(vec![Point3::origin()], vec![]).unwrap();
        assert!(simplify(&mesh, 0.5).is_err());
        assert!(simplify(&mesh, 0.0).is_ok());
    }

    #[test]
    fn test_sphere_halved_keeps_shape() {
        let mesh = Primitive::icosphere(2.0, 3).to_mesh();
        let report = simplify_with_params(&mesh, &SimplifyParams::with_target_reduction(0.5)).unwrap();

        assert_eq!(report.original_triangles, 1280);
        assert!(report.final_triangles < 1280);
        assert!(
            (report.achieved_reduction() - 0.5).abs() < 0.1,
            "achieved {}",
            report.achieved_reduction()
        );

        for v in report.mesh.vertices() {
            assert!((v.coords.norm() - 2.0).abs() < 0.1, "vertex drifted to radius {}", v.coords.norm());
        }
    }

    #[test]
    fn test_flat_plane_stays_flat() {
        let mesh = Primitive::plane(4.0, 16).to_mesh();
        let report = simplify_with_params(&mesh, &SimplifyParams::with_target_reduction(0.4)).unwrap();

        assert!(report.final_triangles < mesh.triangle_count());
        for v in report.mesh.vertices() {
            assert!(v.z.abs() < 1e-9);
        }
        // Boundary vertices are locked, so the outline is untouched
        let bbox = report.mesh.bounding_box();
        assert!(bbox.approx_eq(&mesh.bounding_box(), 1e-12));
        assert!((report.mesh.surface_area() - 16.0).abs() < 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let mesh = Primitive::icosphere(1.0, 3)
            .to_mesh()
            .translated(Vector3::new(0.3, -0.2, 1.0));
        let a = simplify(&mesh, 0.6).unwrap();
        let b = simplify(&mesh, 0.6).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_input_untouched() {
        let mesh = Primitive::icosphere(1.0, 2).to_mesh();
        let before = mesh.clone();
        let _ = simplify(&mesh, 0.5).unwrap();
        assert_eq!(mesh, before);
    }

    fn tetrahedron() -> Mesh {
        Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_tetrahedron_does_not_fold() {
        let mesh = tetrahedron();
        for reduction in [0.6, 0.9] {
            let report =
                simplify_with_params(&mesh, &SimplifyParams::with_target_reduction(reduction)).unwrap();
            assert_eq!(report.collapses_performed, 0);
            assert_eq!(report.mesh, mesh);

            let mut seen: Vec<[usize; 3]> = report.mesh.faces().iter().map(|f| sorted(*f)).collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), report.mesh.triangle_count());
        }
    }

    #[test]
    fn test_collapse_to_nothing_is_error() {
        // Two back-to-back copies of one triangle vanish in a single collapse
        let sheet = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 1]],
        )
        .unwrap();

        let err = simplify(&sheet, 0.9).unwrap_err();
        assert!(matches!(err, JointSpaceError::Simplification { .. }));
        assert!(err.to_string().contains("zero triangles"));
    }

    #[test]
    fn test_max_error_stops_early() {
        let mesh = Primitive::icosphere(1.0, 3).to_mesh();
        let params = SimplifyParams {
            target_reduction: 0.9,
            max_error: Some(1e-12),
            ..Default::default()
        };
        let report = simplify_with_params(&mesh, &params).unwrap();
        assert_eq!(report.final_triangles, mesh.triangle_count());
    }
}
