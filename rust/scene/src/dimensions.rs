// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Overall dimension lines for orthographic views.
//!
//! Two lines per view: one along the screen-horizontal model axis below the
//! box, one along the screen-vertical axis to its left. Both lie on the box
//! face turned towards the camera and stand off by the configured clearance.

use nalgebra::{Point3, Vector3};
use panelview_geometry::{Axis, Box3};
use serde::{Serialize, Serializer};

use crate::camera::ViewDirection;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionLine {
    #[serde(serialize_with = "axis_name")]
    pub axis: Axis,
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    /// Extension lines from the box edge out to each end of the line
    pub extensions: [(Point3<f64>, Point3<f64>); 2],
    /// Measured length in millimetres
    pub value: f64,
    /// Rounded millimetres
    pub text: String,
    pub label_position: Point3<f64>,
}

fn axis_name<S: Serializer>(axis: &Axis, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(match axis {
        Axis::X => "x",
        Axis::Y => "y",
        Axis::Z => "z",
    })
}

/// Horizontal then vertical dimension line of `bounds` seen from `view`
pub fn dimension_lines(
    bounds: &Box3,
    view: ViewDirection,
    clearance: f64,
) -> Result<[DimensionLine; 2]> {
    if bounds.is_empty() {
        return Err(Error::DegenerateBounds("dimensions"));
    }

    let normal = view.normal();
    let depth_axis = view.depth_axis().index();
    let face = if normal[depth_axis] > 0.0 {
        bounds.max[depth_axis]
    } else {
        bounds.min[depth_axis]
    };

    let (h_axis, v_axis) = view.axes();
    let right_sign = view.right()[h_axis.index()].signum();
    let up_sign = view.up()[v_axis.index()].signum();

    // Screen-bottom edge along the vertical axis, screen-left along horizontal
    let bottom = if up_sign > 0.0 {
        bounds.min[v_axis.index()]
    } else {
        bounds.max[v_axis.index()]
    };
    let left = if right_sign > 0.0 {
        bounds.min[h_axis.index()]
    } else {
        bounds.max[h_axis.index()]
    };

    let horizontal = line(
        bounds,
        h_axis,
        v_axis,
        bottom,
        bottom - up_sign * clearance,
        depth_axis,
        face,
    );
    let vertical = line(
        bounds,
        v_axis,
        h_axis,
        left,
        left - right_sign * clearance,
        depth_axis,
        face,
    );
    Ok([horizontal, vertical])
}

/// Line measuring `axis`, placed at `offset` on `across` and drawn out from
/// the box edge at `edge`
fn line(
    bounds: &Box3,
    axis: Axis,
    across: Axis,
    edge: f64,
    offset: f64,
    depth_axis: usize,
    face: f64,
) -> DimensionLine {
    let at = |along: f64, across_value: f64| -> Point3<f64> {
        let mut v = Vector3::zeros();
        v[axis.index()] = along;
        v[across.index()] = across_value;
        v[depth_axis] = face;
        Point3::from(v)
    };

    let lo = bounds.min[axis.index()];
    let hi = bounds.max[axis.index()];
    let start = at(lo, offset);
    let end = at(hi, offset);
    let value = hi - lo;

    DimensionLine {
        axis,
        start,
        end,
        extensions: [(at(lo, edge), start), (at(hi, edge), end)],
        value,
        text: format!("{:.0}", value),
        label_position: nalgebra::center(&start, &end),
    }
}
