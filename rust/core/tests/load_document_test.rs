// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use panelview_core::{load_document, Coords3, Error, RecordKind, TextEncoding, ThicknessSource};

const KITCHEN: &str = r#"{
    "blocks": [
        {"id": "b1", "name": "Нижний модуль", "childPanelIds": ["p1", "p2"], "childFurnitureIds": ["f1"]}
    ],
    "panels": [
        {
            "id": "p1", "positionNumber": "1", "name": "Бок левый",
            "position": {"x": 0, "y": 0, "z": 0},
            "size": {"x": 18, "y": 720, "z": 560},
            "material": {"name": "ЛДСП Белый\rW980", "thickness": 16},
            "edges": [{"start": {"x": 0, "y": 0}, "end": {"x": 720, "y": 0}}]
        },
        {
            "Id": "p2", "PositionNumber": "2",
            "Position": {"X": 582, "Y": 0, "Z": 0},
            "Size": {"X": 18, "Y": 720, "Z": 560},
            "HighZ": 600, "LowZ": 582,
            "Material": {"Name": "ЛДСП Белый\rW980"}
        },
        {"id": "p3", "size": {"x": "?", "y": 1, "z": 1}},
        {"id": "p4", "positionNumber": "4", "size": {"x": 600, "y": 300, "z": 18}}
    ],
    "furniture": [
        {"id": "f1", "type": "Ручка", "position": {"x": 200, "y": 700, "z": 560}, "size": {"x": 128, "y": 20, "z": 30}}
    ]
}"#;

#[test]
fn test_load_mixed_case_document() {
    let doc = load_document(KITCHEN.as_bytes()).unwrap();

    assert_eq!(doc.encoding(), TextEncoding::Utf8);
    assert_eq!(doc.blocks().len(), 1);
    assert_eq!(doc.panels().len(), 3);
    assert_eq!(doc.furniture().len(), 1);

    let p1 = doc.panel("p1").unwrap();
    assert_eq!(p1.material.name, "ЛДСП Белый");
    assert_eq!(p1.thickness_with_source(), (16.0, ThicknessSource::Material));
    assert_eq!(p1.parent_block.as_ref().map(|b| b.as_str()), Some("b1"));

    let p2 = doc.panel("p2").unwrap();
    assert_eq!(p2.position, Coords3::new(582.0, 0.0, 0.0));
    assert_eq!(p2.position_number, "2");
    assert_eq!(p2.thickness_with_source(), (18.0, ThicknessSource::GeometryBounds));

    let orphans: Vec<_> = doc.orphan_panels().map(|p| p.id.as_str()).collect();
    assert_eq!(orphans, vec!["p4"]);
}

#[test]
fn test_partial_load_reports_skipped() {
    let doc = load_document(KITCHEN.as_bytes()).unwrap();
    assert_eq!(doc.skipped().len(), 1);
    let skipped = &doc.skipped()[0];
    assert_eq!(skipped.kind, RecordKind::Panel);
    assert_eq!(skipped.id, "p3");
    assert!(skipped.reason.contains("size"));
}

#[test]
fn test_windows_1251_document() {
    // {"panels":[{"id":"p1","material":"Дуб"}]} with the material name in Windows-1251
    let mut bytes = br#"{"panels":[{"id":"p1","material":""#.to_vec();
    bytes.extend_from_slice(&[0xC4, 0xF3, 0xE1]);
    bytes.extend_from_slice(br#""}]}"#);

    let doc = load_document(&bytes).unwrap();
    assert_eq!(doc.encoding(), TextEncoding::Windows1251);
    assert_eq!(doc.panel("p1").unwrap().material.name, "Дуб");
}

#[test]
fn test_unusable_documents_fail() {
    assert!(matches!(load_document(b""), Err(Error::MalformedDocument(_))));
    assert!(matches!(load_document(b"42"), Err(Error::MalformedDocument(_))));
    assert!(matches!(
        load_document(br#"{"name": "kitchen"}"#),
        Err(Error::MalformedDocument(_))
    ));
}

#[test]
fn test_empty_arrays_load_empty_document() {
    let doc = load_document(br#"{"panels": [], "blocks": []}"#).unwrap();
    assert!(doc.is_empty());
    assert!(doc.skipped().is_empty());
}
