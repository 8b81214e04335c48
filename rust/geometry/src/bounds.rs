// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes in f64 precision

use nalgebra::{Point3, Vector3};

/// Axis-aligned box. The empty box has `min > max` on every axis and is the
/// identity for [`Box3::union`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3 {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Box3 {
    #[inline]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Create an empty box
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Box centered on `center` with full `extents`
    pub fn from_center_extents(center: Point3<f64>, extents: Vector3<f64>) -> Self {
        let half = extents / 2.0;
        Self::new(center - half, center + half)
    }

    /// True when nothing has been added
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand bounds to include a point
    #[inline]
    pub fn expand(&mut self, p: Point3<f64>) {
        self.min = self.min.inf(&p);
        self.max = self.max.sup(&p);
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Box3) -> Box3 {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Box3::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    /// Extents along each axis, zero for the empty box
    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Same box moved by `offset`
    pub fn translated(&self, offset: Vector3<f64>) -> Box3 {
        if self.is_empty() {
            return *self;
        }
        Box3::new(self.min + offset, self.max + offset)
    }

    /// Length of the diagonal
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }

    /// The eight corners
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(a.x, b.y, b.z),
        ]
    }
}

impl Default for Box3 {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<Point3<f64>> for Box3 {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        let mut bbox = Box3::empty();
        for p in iter {
            bbox.expand(p);
        }
        bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_is_union_identity() {
        let b = Box3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        assert!(Box3::empty().is_empty());
        assert_eq!(Box3::empty().union(&b), b);
        assert_eq!(b.union(&Box3::empty()), b);
        assert_eq!(Box3::empty().size(), Vector3::zeros());
    }

    #[test]
    fn test_center_and_size() {
        let b = Box3::from_center_extents(Point3::new(10.0, 0.0, -5.0), Vector3::new(4.0, 2.0, 6.0));
        assert_relative_eq!(b.min, Point3::new(8.0, -1.0, -8.0));
        assert_relative_eq!(b.center(), Point3::new(10.0, 0.0, -5.0));
        assert_relative_eq!(b.size(), Vector3::new(4.0, 2.0, 6.0));
    }

    #[test]
    fn test_collect_points() {
        let b: Box3 = [Point3::new(1.0, 5.0, 0.0), Point3::new(-1.0, 2.0, 3.0)]
            .into_iter()
            .collect();
        assert_eq!(b.min, Point3::new(-1.0, 2.0, 0.0));
        assert_eq!(b.max, Point3::new(1.0, 5.0, 3.0));
        assert_eq!(b.translated(Vector3::x()).min.x, 0.0);
    }
}
