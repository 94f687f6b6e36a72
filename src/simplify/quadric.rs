// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Quadric error metric (Garland–Heckbert)

use nalgebra::{Matrix3, Matrix4, Point3, Vector3, Vector4};
use std::ops::{Add, AddAssign};

/// Symmetric 4x4 quadric `Q` with error `vᵀ Q v` for `v = [x, y, z, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric(Matrix4<f64>);

impl Default for Quadric {
    fn default() -> Self {
        Self(Matrix4::zeros())
    }
}

impl Quadric {
    /// Fundamental quadric of the plane through `point` with unit `normal`
    pub fn from_plane(normal: &Vector3<f64>, point: &Point3<f64>) -> Self {
        let d = -normal.dot(&point.coords);
        let p = Vector4::new(normal.x, normal.y, normal.z, d);
        Self(p * p.transpose())
    }

    /// Plane quadric of triangle `(a, b, c)`; `None` for zero-area triangles
    pub fn from_triangle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a));
        let len = normal.norm();
        if len < 1e-12 {
            return None;
        }
        Some(Self::from_plane(&(normal / len), a))
    }

    /// Squared distance-like error of placing a vertex at `p`
    pub fn error(&self, p: &Point3<f64>) -> f64 {
        let v = p.to_homogeneous();
        // Clamp tiny negative round-off
        (v.transpose() * self.0 * v)[(0, 0)].max(0.0)
    }

    /// Position minimising the error, if the 3x3 system is well conditioned
    pub fn optimal_point(&self) -> Option<Point3<f64>> {
        let a: Matrix3<f64> = self.0.fixed_view::<3, 3>(0, 0).into_owned();
        let b = -self.0.fixed_view::<3, 1>(0, 3).into_owned();

        let scale = a.abs().max();
        if scale == 0.0 {
            return None;
        }
        let det = a.determinant();
        if det.abs() <= 1e-9 * scale * scale * scale {
            return None;
        }

        a.try_inverse().map(|inv| Point3::from(inv * b))
    }
}

impl Add for Quadric {
    type Output = Quadric;

    fn add(self, rhs: Quadric) -> Quadric {
        Quadric(self.0 + rhs.0)
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, rhs: Quadric) {
        self.0 += rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_error_is_squared_distance() {
        let q = Quadric::from_plane(&Vector3::z(), &Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(q.error(&Point3::new(5.0, -2.0, 1.0)), 0.0);
        assert_relative_eq!(q.error(&Point3::new(0.0, 0.0, 4.0)), 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_three_planes_meet_at_corner() {
        let corner = Point3::new(1.0, 2.0, 3.0);
        let q = Quadric::from_plane(&Vector3::x(), &corner)
            + Quadric::from_plane(&Vector3::y(), &corner)
            + Quadric::from_plane(&Vector3::z(), &corner);

        let optimal = q.optimal_point().expect("three independent planes");
        assert_relative_eq!(optimal, corner, epsilon = 1e-9);
        assert_relative_eq!(q.error(&optimal), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_coplanar_quadric_is_singular() {
        let mut q = Quadric::default();
        q += Quadric::from_plane(&Vector3::z(), &Point3::origin());
        q += Quadric::from_plane(&Vector3::z(), &Point3::new(1.0, 1.0, 0.0));
        assert!(q.optimal_point().is_none());
        assert!(Quadric::default().optimal_point().is_none());
    }

    #[test]
    fn test_degenerate_triangle_has_no_quadric() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(Quadric::from_triangle(&p, &p, &Point3::new(2.0, 2.0, 2.0)).is_none());
    }
}
