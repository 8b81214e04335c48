// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Profile definitions and triangulation

use crate::error::{Error, Result};
use nalgebra::Point2;

/// Points closer than this are treated as one (mm)
const POINT_EPSILON: f64 = 1e-6;

/// 2D closed profile, outer boundary only
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
}

impl Profile2D {
    /// Create a new profile from points already in counter-clockwise order
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self { outer }
    }

    /// Build a profile from an exported contour.
    ///
    /// Consecutive duplicates and an explicit closing point are dropped and
    /// the winding is made counter-clockwise. Fails when fewer than three
    /// distinct points remain or the contour encloses no area.
    pub fn from_contour(points: impl IntoIterator<Item = Point2<f64>>) -> Result<Self> {
        let mut outer: Vec<Point2<f64>> = Vec::new();
        for p in points {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(Error::InvalidProfile(format!(
                    "non-finite contour point ({}, {})",
                    p.x, p.y
                )));
            }
            if outer
                .last()
                .map_or(true, |last| (p - *last).norm() > POINT_EPSILON)
            {
                outer.push(p);
            }
        }
        while outer.len() > 1 && (outer[0] - outer[outer.len() - 1]).norm() <= POINT_EPSILON {
            outer.pop();
        }

        if outer.len() < 3 {
            return Err(Error::InvalidProfile(format!(
                "contour has {} distinct points, need at least 3",
                outer.len()
            )));
        }

        let mut profile = Self { outer };
        let area = profile.signed_area();
        if area.abs() <= POINT_EPSILON {
            return Err(Error::InvalidProfile("contour encloses no area".to_string()));
        }
        if area < 0.0 {
            profile.outer.reverse();
        }
        Ok(profile)
    }

    /// Shoelace area, positive for counter-clockwise winding
    pub fn signed_area(&self) -> f64 {
        let n = self.outer.len();
        (0..n)
            .map(|i| {
                let (a, b) = (self.outer[i], self.outer[(i + 1) % n]);
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            / 2.0
    }

    /// Triangulate the profile using earcutr
    /// Returns triangle indices into the flattened vertex array
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Profile must have at least 3 vertices".to_string(),
            ));
        }

        let mut vertices = Vec::with_capacity(self.outer.len() * 2);
        for p in &self.outer {
            vertices.push(p.x);
            vertices.push(p.y);
        }

        let indices = earcutr::earcut(&vertices, &[], 2)
            .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;
        if indices.is_empty() {
            return Err(Error::TriangulationError(
                "earcut produced no triangles".to_string(),
            ));
        }

        Ok(Triangulation {
            points: self.outer.clone(),
            indices,
        })
    }
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

/// Create a rectangular profile
#[inline]
pub fn create_rectangle(width: f64, height: f64) -> Profile2D {
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    Profile2D::new(vec![
        Point2::new(-half_w, -half_h),
        Point2::new(half_w, -half_h),
        Point2::new(half_w, half_h),
        Point2::new(-half_w, half_h),
    ])
}

/// Create a circular profile centered on the origin
pub fn create_circle(radius: f64) -> Profile2D {
    let segments = calculate_circle_segments(radius);

    let outer = (0..segments)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * (i as f64) / (segments as f64);
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    Profile2D::new(outer)
}

/// Calculate adaptive number of segments for a circle
#[inline]
pub fn calculate_circle_segments(radius: f64) -> usize {
    let segments = (radius.sqrt() * 8.0).ceil() as usize;
    segments.clamp(8, 32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_profile() {
        let profile = create_rectangle(10.0, 5.0);
        assert_eq!(profile.outer.len(), 4);
        assert_eq!(profile.outer[0], Point2::new(-5.0, -2.5));
        assert_eq!(profile.outer[2], Point2::new(5.0, 2.5));
        assert_relative_eq!(profile.signed_area(), 50.0);
    }

    #[test]
    fn test_circle_profile() {
        let profile = create_circle(5.0);
        assert!(profile.outer.len() >= 8);

        let first = profile.outer[0];
        let dist = (first.x * first.x + first.y * first.y).sqrt();
        assert!((dist - 5.0).abs() < 0.001);
        assert!(profile.signed_area() > 0.0);
    }

    #[test]
    fn test_from_contour_drops_closing_point_and_fixes_winding() {
        // Clockwise, explicitly closed, with a repeated vertex
        let profile = Profile2D::from_contour([
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 40.0),
            Point2::new(0.0, 40.0),
            Point2::new(20.0, 40.0),
            Point2::new(20.0, 0.0),
            Point2::new(0.0, 0.0),
        ])
        .unwrap();

        assert_eq!(profile.outer.len(), 4);
        assert_relative_eq!(profile.signed_area(), 800.0);
    }

    #[test]
    fn test_from_contour_rejects_degenerate() {
        assert!(Profile2D::from_contour([Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]).is_err());
        assert!(Profile2D::from_contour([
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ])
        .is_err());
        assert!(Profile2D::from_contour([
            Point2::new(0.0, 0.0),
            Point2::new(f64::NAN, 0.0),
            Point2::new(2.0, 1.0),
        ])
        .is_err());
    }

    #[test]
    fn test_triangulate_rectangle() {
        let tri = create_rectangle(10.0, 5.0).triangulate().unwrap();
        assert_eq!(tri.points.len(), 4);
        assert_eq!(tri.indices.len(), 6);
    }

    #[test]
    fn test_triangulate_l_shape() {
        let profile = Profile2D::from_contour([
            Point2::new(0.0, 0.0),
            Point2::new(30.0, 0.0),
            Point2::new(30.0, 10.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 30.0),
            Point2::new(0.0, 30.0),
        ])
        .unwrap();
        let tri = profile.triangulate().unwrap();
        assert_eq!(tri.indices.len(), (tri.points.len() - 2) * 3);
    }

    #[test]
    fn test_circle_segments() {
        assert_eq!(calculate_circle_segments(1.0), 8);
        assert_eq!(calculate_circle_segments(4.0), 16);
        assert!(calculate_circle_segments(100.0) <= 32);
        assert!(calculate_circle_segments(0.1) >= 8);
    }
}
