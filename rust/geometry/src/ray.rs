// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rays and ray-mesh intersection

use nalgebra::{Point3, Unit, Vector3};

use crate::bounds::Box3;
use crate::mesh::Mesh;

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f64>,
    /// Unit direction
    pub direction: Unit<Vector3<f64>>,
    inv_direction: Vector3<f64>,
    /// Sign of direction components (0 if positive, 1 if negative).
    sign: [usize; 3],
}

impl Ray {
    /// Create a new ray. Returns `None` for a zero-length direction.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        let dir = Unit::try_new(direction, 1e-12)?;
        let inv = Vector3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
        let sign = [
            usize::from(inv.x < 0.0),
            usize::from(inv.y < 0.0),
            usize::from(inv.z < 0.0),
        ];
        Some(Self {
            origin,
            direction: dir,
            inv_direction: inv,
            sign,
        })
    }

    /// Ray from `from` towards `to`
    pub fn between(from: Point3<f64>, to: Point3<f64>) -> Option<Self> {
        Self::new(from, to - from)
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction.into_inner() * t
    }

    /// Same ray expressed relative to a frame moved by `offset`
    #[inline]
    pub fn shifted(&self, offset: Vector3<f64>) -> Ray {
        Ray {
            origin: self.origin - offset,
            ..*self
        }
    }

    /// Slab test. Returns entry and exit parameters, clamped to `t >= 0`.
    #[inline]
    pub fn intersect_box(&self, bbox: &Box3) -> Option<(f64, f64)> {
        if bbox.is_empty() {
            return None;
        }
        let bounds = [bbox.min, bbox.max];

        let tx1 = (bounds[self.sign[0]].x - self.origin.x) * self.inv_direction.x;
        let tx2 = (bounds[1 - self.sign[0]].x - self.origin.x) * self.inv_direction.x;

        let mut t_min = tx1;
        let mut t_max = tx2;

        let ty1 = (bounds[self.sign[1]].y - self.origin.y) * self.inv_direction.y;
        let ty2 = (bounds[1 - self.sign[1]].y - self.origin.y) * self.inv_direction.y;

        t_min = t_min.max(ty1);
        t_max = t_max.min(ty2);

        let tz1 = (bounds[self.sign[2]].z - self.origin.z) * self.inv_direction.z;
        let tz2 = (bounds[1 - self.sign[2]].z - self.origin.z) * self.inv_direction.z;

        t_min = t_min.max(tz1);
        t_max = t_max.min(tz2);

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }

    /// Möller-Trumbore, both faces. Returns the hit parameter.
    pub fn intersect_triangle(&self, tri: &[Point3<f64>; 3]) -> Option<f64> {
        let dir = self.direction.into_inner();
        let edge1 = tri[1] - tri[0];
        let edge2 = tri[2] - tri[0];

        let h = dir.cross(&edge2);
        let a = edge1.dot(&h);
        if a.abs() < 1e-12 {
            return None;
        }

        let f = 1.0 / a;
        let s = self.origin - tri[0];
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * dir.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t > 1e-9).then_some(t)
    }
}

/// Nearest hit of `ray` on `mesh`, where the mesh sits at `translation`.
/// `local_bounds` is the mesh's cached local bounding box.
pub fn raycast_mesh(
    ray: &Ray,
    mesh: &Mesh,
    local_bounds: &Box3,
    translation: Vector3<f64>,
) -> Option<f64> {
    let local = ray.shifted(translation);
    local.intersect_box(local_bounds)?;

    mesh.triangles()
        .filter_map(|tri| local.intersect_triangle(&tri))
        .min_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::box_mesh;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::origin(), Vector3::new(2.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(ray.at(5.0), Point3::new(5.0, 0.0, 0.0));
        assert!(Ray::new(Point3::origin(), Vector3::zeros()).is_none());
    }

    #[test]
    fn test_ray_box_hit_and_miss() {
        let bbox = Box3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));

        let hit = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vector3::x()).unwrap();
        let (t_min, t_max) = hit.intersect_box(&bbox).unwrap();
        assert_relative_eq!(t_min, 5.0, epsilon = 1e-10);
        assert_relative_eq!(t_max, 6.0, epsilon = 1e-10);

        let miss = Ray::new(Point3::new(-5.0, 5.0, 5.0), Vector3::x()).unwrap();
        assert!(miss.intersect_box(&bbox).is_none());
    }

    #[test]
    fn test_ray_triangle() {
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let down = Ray::new(Point3::new(0.2, 0.2, 3.0), -Vector3::z()).unwrap();
        assert_relative_eq!(down.intersect_triangle(&tri).unwrap(), 3.0, epsilon = 1e-10);

        let up = Ray::new(Point3::new(0.2, 0.2, 3.0), Vector3::z()).unwrap();
        assert!(up.intersect_triangle(&tri).is_none());
    }

    #[test]
    fn test_raycast_translated_mesh() {
        let mesh = box_mesh(Vector3::new(10.0, 10.0, 10.0));
        let bounds = mesh.bounding_box();
        let ray = Ray::new(Point3::new(100.0, 0.0, -50.0), Vector3::z()).unwrap();

        assert!(raycast_mesh(&ray, &mesh, &bounds, Vector3::zeros()).is_none());

        let t = raycast_mesh(&ray, &mesh, &bounds, Vector3::new(100.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(t, 45.0, epsilon = 1e-4);
    }
}
