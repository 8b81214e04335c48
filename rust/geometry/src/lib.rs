// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PanelView Geometry
//!
//! Mesh generation for furniture model records using earcutr triangulation
//! and nalgebra for the math: oriented panel boxes with edge-banding strips,
//! furniture shapes by type, and swept extrusion profiles. Also provides the
//! bounding boxes and ray casts the scene is queried with.

pub mod bounds;
pub mod error;
pub mod extrusion;
pub mod furniture;
pub mod mesh;
pub mod panel;
pub mod primitives;
pub mod profile;
pub mod ray;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use bounds::Box3;
pub use error::{Error, Result};
pub use extrusion::{build_extrusion, extrude_profile, ExtrusionGeometry};
pub use furniture::{build_furniture, FurnitureGeometry, FurnitureKind};
pub use mesh::Mesh;
pub use panel::{build_panel, EdgeStrip, PanelGeometry};
pub use primitives::{box_mesh, cylinder_mesh, hexahedron, oriented_box, Axis};
pub use profile::{create_circle, create_rectangle, Profile2D};
pub use ray::{raycast_mesh, Ray};
