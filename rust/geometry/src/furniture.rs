// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Furniture (hardware) geometry by type
//!
//! Every shape stays inside the record's size box, which like a panel's is
//! anchored at `position` as its min corner. Model space is Y-up.

use nalgebra::{Point3, Vector3};
use panelview_core::Furniture;
use std::fmt;

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::primitives::{box_mesh, cylinder_mesh, Axis};

/// Dimensions below this are raised to it so meshes never collapse (mm)
const MIN_DIMENSION: f64 = 1.0;

/// Hardware family, parsed from the exported `type` string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FurnitureKind {
    Handle,
    Hinge,
    Leg,
    Fastener,
    Runner,
    /// Unrecognised type, drawn as a plain box
    Placeholder,
}

impl FurnitureKind {
    /// Case-insensitive match on English and Russian type names
    pub fn parse(type_name: &str) -> Self {
        let lower = type_name.trim().to_lowercase();
        let matches = |aliases: &[&str]| aliases.iter().any(|a| lower.contains(a));

        if matches(&["handle", "ручк", "скоба"]) {
            FurnitureKind::Handle
        } else if matches(&["hinge", "петл"]) {
            FurnitureKind::Hinge
        } else if matches(&["leg", "опор", "ножк"]) {
            FurnitureKind::Leg
        } else if matches(&["runner", "slide", "направляющ"]) {
            FurnitureKind::Runner
        } else if matches(&[
            "fastener", "confirmat", "dowel", "screw", "конфирмат", "шкант", "крепеж", "крепёж",
            "саморез", "эксцентрик",
        ]) {
            FurnitureKind::Fastener
        } else {
            FurnitureKind::Placeholder
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FurnitureKind::Handle => "handle",
            FurnitureKind::Hinge => "hinge",
            FurnitureKind::Leg => "leg",
            FurnitureKind::Fastener => "fastener",
            FurnitureKind::Runner => "runner",
            FurnitureKind::Placeholder => "placeholder",
        }
    }
}

impl fmt::Display for FurnitureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FurnitureGeometry {
    pub kind: FurnitureKind,
    /// Mesh around the local origin
    pub mesh: Mesh,
    /// World-space centre of the size box
    pub center: Point3<f64>,
}

/// Build the mesh for one furniture item
pub fn build_furniture(item: &Furniture) -> Result<FurnitureGeometry> {
    if !item.position.is_finite() || !item.size.is_finite() {
        return Err(Error::UnresolvableRecord {
            entity: format!("furniture {}", item.id),
            reason: "non-finite position or size".to_string(),
        });
    }

    let kind = FurnitureKind::parse(&item.kind);
    let extents = Vector3::from(item.size.to_array().map(|d| d.abs().max(MIN_DIMENSION)));
    let center = Point3::from(item.position.to_array()) + extents / 2.0;

    let mesh = match kind {
        FurnitureKind::Handle | FurnitureKind::Fastener => {
            let axis = longest_axis(&extents);
            rod(&extents, axis)?
        }
        FurnitureKind::Leg => rod(&extents, Axis::Y)?,
        FurnitureKind::Hinge => {
            let axis = shortest_axis(&extents);
            rod(&extents, axis)?
        }
        FurnitureKind::Runner | FurnitureKind::Placeholder => box_mesh(extents),
    };

    Ok(FurnitureGeometry { kind, mesh, center })
}

/// Cylinder along `axis` filling the size box
fn rod(extents: &Vector3<f64>, axis: Axis) -> Result<Mesh> {
    let length = extents[axis.index()];
    let diameter = Axis::ALL
        .iter()
        .filter(|a| **a != axis)
        .map(|a| extents[a.index()])
        .fold(f64::MAX, f64::min);
    cylinder_mesh(diameter / 2.0, length, axis)
}

fn longest_axis(extents: &Vector3<f64>) -> Axis {
    Axis::from_index(extents.imax()).unwrap_or(Axis::X)
}

fn shortest_axis(extents: &Vector3<f64>) -> Axis {
    Axis::from_index(extents.imin()).unwrap_or(Axis::Z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use panelview_core::Coords3;

    fn item(kind: &str, size: Coords3) -> Furniture {
        Furniture {
            id: "f1".into(),
            name: String::new(),
            kind: kind.to_string(),
            position: Coords3::new(200.0, 700.0, 560.0),
            size,
            parent_block_id: None,
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(FurnitureKind::parse("Handle"), FurnitureKind::Handle);
        assert_eq!(FurnitureKind::parse("Ручка-скоба 128"), FurnitureKind::Handle);
        assert_eq!(FurnitureKind::parse("Петля накладная"), FurnitureKind::Hinge);
        assert_eq!(FurnitureKind::parse("ОПОРА"), FurnitureKind::Leg);
        assert_eq!(FurnitureKind::parse("Конфирмат 7x50"), FurnitureKind::Fastener);
        assert_eq!(FurnitureKind::parse("Направляющие шариковые"), FurnitureKind::Runner);
        assert_eq!(FurnitureKind::parse("lamp"), FurnitureKind::Placeholder);
        assert_eq!(FurnitureKind::parse(""), FurnitureKind::Placeholder);
    }

    #[test]
    fn test_shapes_stay_in_size_box() {
        let size = Coords3::new(128.0, 20.0, 30.0);
        for kind in ["handle", "hinge", "leg", "confirmat", "runner", "lamp"] {
            let geom = build_furniture(&item(kind, size)).unwrap();
            let bbox = geom.mesh.bounding_box();
            assert!(bbox.size().x <= 128.0 + 1e-3, "{kind}");
            assert!(bbox.size().y <= 20.0 + 1e-3, "{kind}");
            assert!(bbox.size().z <= 30.0 + 1e-3, "{kind}");
            assert_relative_eq!(geom.center, Point3::new(264.0, 710.0, 575.0));
        }
    }

    #[test]
    fn test_unknown_type_is_full_placeholder_box() {
        let geom = build_furniture(&item("lamp", Coords3::new(40.0, 50.0, 60.0))).unwrap();
        assert_eq!(geom.kind, FurnitureKind::Placeholder);
        assert_relative_eq!(geom.mesh.bounding_box().size(), Vector3::new(40.0, 50.0, 60.0));
    }

    #[test]
    fn test_handle_runs_along_longest_axis() {
        let geom = build_furniture(&item("handle", Coords3::new(20.0, 30.0, 160.0))).unwrap();
        assert_relative_eq!(geom.mesh.bounding_box().size().z, 160.0, epsilon = 1e-3);
    }
}
