// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel geometry: the panel body and its edge-banding strips
//!
//! A panel record's `position` is the min corner of its box, not the centre.
//! Meshes are built around the local origin and the box centre is returned
//! separately as the node translation.
//!
//! The thickness axis is the axis carrying the smallest `size` component. The
//! two remaining axes keep their size values and span the panel plane; edge
//! segments are given in that plane with `x` along the lower-indexed axis and
//! `y` along the other, measured from the panel corner.

use nalgebra::{Point3, Vector2, Vector3};
use panelview_core::{EdgeSegment, Panel, ThicknessSource};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::primitives::{box_mesh, oriented_box, Axis};

/// Segments shorter than this produce no strip (mm)
const MIN_SEGMENT_LENGTH: f64 = 1e-6;

/// One edge-banding strip, positioned relative to the panel centre
#[derive(Debug, Clone)]
pub struct EdgeStrip {
    /// Strip mesh around its own centre
    pub mesh: Mesh,
    /// Strip centre relative to the panel centre
    pub offset: Vector3<f64>,
    /// Run length (mm)
    pub length: f64,
}

#[derive(Debug, Clone)]
pub struct PanelGeometry {
    /// Body mesh around the local origin
    pub body: Mesh,
    /// World-space box centre (`position + extents / 2`)
    pub center: Point3<f64>,
    /// Full box extents
    pub extents: Vector3<f64>,
    pub thickness_axis: Axis,
    pub thickness_source: ThicknessSource,
    pub edge_strips: SmallVec<[EdgeStrip; 4]>,
}

/// Build the oriented box for a panel and one strip per edge segment.
/// `band_depth` is how far strips stand off the panel edge.
pub fn build_panel(panel: &Panel, band_depth: f64) -> Result<PanelGeometry> {
    if !panel.position.is_finite() || !panel.size.is_finite() {
        return Err(Error::UnresolvableRecord {
            entity: format!("panel {}", panel.id),
            reason: "non-finite position or size".to_string(),
        });
    }

    let size = panel.size.to_array().map(f64::abs);
    let thickness_axis = smallest_axis(&size);
    let (thickness, thickness_source) = panel.thickness_with_source();
    let (u, v) = in_plane_axes(thickness_axis);

    let mut extents = Vector3::from(size);
    extents[thickness_axis.index()] = thickness.abs();

    let corner = Point3::from(panel.position.to_array());
    let center = corner + extents / 2.0;

    let edge_strips = panel
        .edges
        .iter()
        .filter_map(|edge| edge_strip(edge, &extents, (u, v), thickness_axis, band_depth))
        .collect();

    Ok(PanelGeometry {
        body: box_mesh(extents),
        center,
        extents,
        thickness_axis,
        thickness_source,
        edge_strips,
    })
}

/// Axis of the smallest size component; the first one wins ties
fn smallest_axis(size: &[f64; 3]) -> Axis {
    let mut best = 0;
    for i in 1..3 {
        if size[i] < size[best] {
            best = i;
        }
    }
    Axis::from_index(best).unwrap_or(Axis::Z)
}

/// The two panel-plane axes in ascending index order
fn in_plane_axes(thickness: Axis) -> (Axis, Axis) {
    match thickness {
        Axis::X => (Axis::Y, Axis::Z),
        Axis::Y => (Axis::X, Axis::Z),
        Axis::Z => (Axis::X, Axis::Y),
    }
}

fn edge_strip(
    edge: &EdgeSegment,
    extents: &Vector3<f64>,
    (u, v): (Axis, Axis),
    thickness_axis: Axis,
    band_depth: f64,
) -> Option<EdgeStrip> {
    let start = Vector2::new(edge.start.x, edge.start.y);
    let end = Vector2::new(edge.end.x, edge.end.y);
    let dir = end - start;
    let length = dir.norm();
    if !length.is_finite() || length < MIN_SEGMENT_LENGTH {
        return None;
    }
    let dir = dir / length;

    // Outward: away from the panel centre in the plane
    let half_plane = Vector2::new(extents[u.index()], extents[v.index()]) / 2.0;
    let mid = (start + end) / 2.0;
    let mut normal = Vector2::new(dir.y, -dir.x);
    if normal.dot(&(mid - half_plane)) < 0.0 {
        normal = -normal;
    }

    let depth = band_depth.max(0.0);
    let strip_center = mid - half_plane + normal * (depth / 2.0);

    let lift = |p: Vector2<f64>| -> Vector3<f64> { u.unit() * p.x + v.unit() * p.y };

    let half_thickness = extents[thickness_axis.index()] / 2.0;
    let mesh = oriented_box(
        Point3::origin(),
        [
            lift(dir) * (length / 2.0),
            lift(normal) * (depth / 2.0),
            thickness_axis.unit() * half_thickness,
        ],
    );

    Some(EdgeStrip {
        mesh,
        offset: lift(strip_center),
        length,
    })
}
