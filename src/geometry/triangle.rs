// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Point-to-triangle projection

use super::BoundingBox;
use nalgebra::Point3;

/// Closest point on segment `[a, b]` to `point`; a zero-length segment is a point
pub fn closest_point_on_segment(point: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return *a;
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// True when the triangle has (numerically) zero area
pub fn is_degenerate(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> bool {
    let ab = b - a;
    let ac = c - a;
    let scale = ab.norm_squared().max(ac.norm_squared()).max((c - b).norm_squared());
    if scale == 0.0 {
        return true;
    }
    ab.cross(&ac).norm_squared() <= scale * scale * 1e-24
}

/// Closest point on triangle `(a, b, c)` to `point`.
///
/// Voronoi-region walk: vertex regions, then edge regions, then the face
/// interior via barycentric coordinates. Degenerate triangles are handled
/// as the union of their three edges, which covers both the segment and the
/// single-point case.
pub fn closest_point_on_triangle(
    point: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Point3<f64> {
    if is_degenerate(a, b, c) {
        return closest_point_on_degenerate(point, a, b, c);
    }

    let ab = b - a;
    let ac = c - a;
    let ap = point - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = point - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = point - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

fn closest_point_on_degenerate(
    point: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Point3<f64> {
    [
        closest_point_on_segment(point, a, b),
        closest_point_on_segment(point, b, c),
        closest_point_on_segment(point, c, a),
    ]
    .into_iter()
    .min_by(|p, q| (p - point).norm_squared().total_cmp(&(q - point).norm_squared()))
    .unwrap_or(*a)
}

/// Tight box around a triangle
pub fn triangle_bbox(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> BoundingBox {
    BoundingBox::new(a.inf(b).inf(c), a.sup(b).sup(c))
}
