// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use panelview_core::parse_document;
use panelview_geometry::{
    build_extrusion, build_furniture, build_panel, raycast_mesh, FurnitureKind, Point3, Ray,
    Vector3,
};

const DOC: &str = r#"{
    "panels": [{
        "id": "side", "positionNumber": "3",
        "position": {"x": 0, "y": 0, "z": 0},
        "size": {"x": 18, "y": 720, "z": 560},
        "edges": [{"start": {"x": 0, "y": 0}, "end": {"x": 720, "y": 0}}]
    }],
    "furniture": [{"id": "leg", "type": "Опора", "position": {"x": 50, "y": -100, "z": 50}, "size": {"x": 40, "y": 100, "z": 40}}],
    "extrusions": [{"id": "rail", "thickness": 500, "contour": [[0, 0], [30, 0], [30, 10], [0, 10]]}]
}"#;

#[test]
fn test_document_records_to_meshes() {
    let doc = parse_document(DOC).unwrap();

    let side = build_panel(doc.panel("side").unwrap(), 1.0).unwrap();
    assert_relative_eq!(side.center, Point3::new(9.0, 360.0, 280.0));
    assert_eq!(side.edge_strips.len(), 1);
    // Edge runs along Y (first in-plane axis) on the z = 0 side
    let strip = &side.edge_strips[0];
    assert_relative_eq!(strip.offset, Vector3::new(0.0, 0.0, -280.5));

    let leg = build_furniture(doc.furniture_item("leg").unwrap()).unwrap();
    assert_eq!(leg.kind, FurnitureKind::Leg);
    assert_relative_eq!(leg.center, Point3::new(70.0, -50.0, 70.0));

    let rail = build_extrusion(doc.extrusion("rail").unwrap()).unwrap();
    assert_relative_eq!(rail.center, Point3::new(15.0, 5.0, 250.0));
}

#[test]
fn test_ray_hits_panel_face() {
    let doc = parse_document(DOC).unwrap();
    let side = build_panel(doc.panel("side").unwrap(), 1.0).unwrap();
    let bounds = side.body.bounding_box();

    let ray = Ray::new(Point3::new(-1000.0, 360.0, 280.0), Vector3::x()).unwrap();
    let t = raycast_mesh(&ray, &side.body, &bounds, side.center.coords).unwrap();
    assert_relative_eq!(t, 1000.0, epsilon = 1e-3);
}
