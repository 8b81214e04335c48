// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model Document Normalizer
//!
//! Turns the raw JSON export into a [`ModelDocument`] with one canonical
//! schema. Missing optional fields get defaults; a record whose position or
//! size is present but not numeric is skipped and reported, never fatal.

use serde_json::{Map, Value};

use crate::document::{
    normalize_material_name, Block, Coords3, EdgeSegment, ExtrusionProfile, Furniture, Material,
    ModelDocument, Panel, Point2D, RecordId, RecordKind, SkippedRecord, DEFAULT_POSITION,
    DEFAULT_SIZE,
};
use crate::encoding::decode_text;
use crate::error::{Error, Result};
use crate::fields::{
    array_field, as_number, field, field_any, is_present, optional_number, string_field,
    value_to_string, NotNumeric,
};

/// Decode raw bytes (UTF-8 or Windows-1251) and normalize the document
pub fn load_document(bytes: &[u8]) -> Result<ModelDocument> {
    let decoded = decode_text(bytes);
    Ok(parse_document(&decoded.text)?.with_encoding(decoded.encoding))
}

/// Parse JSON text and normalize it
pub fn parse_document(text: &str) -> Result<ModelDocument> {
    let raw: Value = serde_json::from_str(text)?;
    normalize(&raw)
}

/// Normalize an already parsed JSON value
pub fn normalize(raw: &Value) -> Result<ModelDocument> {
    let root = raw
        .as_object()
        .ok_or_else(|| Error::MalformedDocument("top level is not an object".to_string()))?;

    let has_panels = field(root, "panels").is_some_and(Value::is_array);
    let has_blocks = field(root, "blocks").is_some_and(Value::is_array);
    if !has_panels && !has_blocks {
        return Err(Error::MalformedDocument(
            "no panels or blocks array found".to_string(),
        ));
    }

    let mut skipped = Vec::new();

    let panels = collect_records(
        array_field(root, &["panels"]),
        RecordKind::Panel,
        &mut skipped,
        normalize_panel,
    );
    let blocks = collect_records(
        array_field(root, &["blocks"]),
        RecordKind::Block,
        &mut skipped,
        normalize_block,
    );
    let furniture = collect_records(
        array_field(root, &["furniture", "furnitures"]),
        RecordKind::Furniture,
        &mut skipped,
        normalize_furniture,
    );
    let extrusions = collect_records(
        array_field(root, &["extrusions", "profiles"]),
        RecordKind::Extrusion,
        &mut skipped,
        normalize_extrusion,
    );

    tracing::info!(
        panels = panels.len(),
        blocks = blocks.len(),
        furniture = furniture.len(),
        extrusions = extrusions.len(),
        skipped = skipped.len(),
        "Document normalized"
    );

    Ok(ModelDocument::new(blocks, panels, furniture, extrusions).with_skipped(skipped))
}

fn collect_records<T>(
    items: &[Value],
    kind: RecordKind,
    skipped: &mut Vec<SkippedRecord>,
    normalize_one: impl Fn(&Map<String, Value>, RecordId) -> Result<T>,
) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            tracing::warn!(kind = %kind, index, "Skipping non-object record");
            skipped.push(SkippedRecord {
                kind,
                id: synthetic_id(kind, index).0,
                reason: "record is not an object".to_string(),
            });
            continue;
        };

        let id = record_id(obj, kind, index);
        match normalize_one(obj, id) {
            Ok(record) => out.push(record),
            Err(Error::UnresolvableRecord { kind, id, reason }) => {
                tracing::warn!(kind = %kind, id = %id, reason = %reason, "Skipping unresolvable record");
                skipped.push(SkippedRecord { kind, id, reason });
            }
            Err(other) => {
                tracing::warn!(kind = %kind, index, error = %other, "Skipping record");
                skipped.push(SkippedRecord {
                    kind,
                    id: synthetic_id(kind, index).0,
                    reason: other.to_string(),
                });
            }
        }
    }
    out
}

fn record_id(obj: &Map<String, Value>, kind: RecordKind, index: usize) -> RecordId {
    string_field(obj, &["id", "guid"])
        .filter(|s| !s.trim().is_empty())
        .map(RecordId::from)
        .unwrap_or_else(|| synthetic_id(kind, index))
}

fn synthetic_id(kind: RecordKind, index: usize) -> RecordId {
    RecordId(format!("{}-{}", kind, index))
}

/// Resolve a three-component field given as `{x,y,z}` (any casing) or
/// `[x,y,z]`. Missing fields and axes take the default.
fn coords(
    obj: &Map<String, Value>,
    names: &[&str],
    default: Coords3,
) -> std::result::Result<Coords3, NotNumeric> {
    let value = match field_any(obj, names) {
        None | Some(Value::Null) => return Ok(default),
        Some(v) => v,
    };

    match value {
        Value::Object(axes) => {
            let axis = |name: &str, fallback: f64| -> std::result::Result<f64, NotNumeric> {
                match field(axes, name) {
                    Some(v) => Ok(as_number(v)?.unwrap_or(fallback)),
                    None => Ok(fallback),
                }
            };
            Ok(Coords3::new(
                axis("x", default.x)?,
                axis("y", default.y)?,
                axis("z", default.z)?,
            ))
        }
        Value::Array(items) => {
            let axis = |i: usize, fallback: f64| -> std::result::Result<f64, NotNumeric> {
                match items.get(i) {
                    Some(v) => Ok(as_number(v)?.unwrap_or(fallback)),
                    None => Ok(fallback),
                }
            };
            Ok(Coords3::new(
                axis(0, default.x)?,
                axis(1, default.y)?,
                axis(2, default.z)?,
            ))
        }
        other => Err(NotNumeric(other.to_string())),
    }
}

fn point2(value: &Value) -> Option<Point2D> {
    match value {
        Value::Object(o) => {
            let x = as_number(field(o, "x")?).ok()??;
            let y = as_number(field(o, "y")?).ok()??;
            Some(Point2D::new(x, y))
        }
        Value::Array(a) => {
            let x = as_number(a.first()?).ok()??;
            let y = as_number(a.get(1)?).ok()??;
            Some(Point2D::new(x, y))
        }
        _ => None,
    }
}

fn id_list(obj: &Map<String, Value>, names: &[&str]) -> Vec<RecordId> {
    array_field(obj, names)
        .iter()
        .filter_map(|v| match v {
            Value::Object(o) => string_field(o, &["id"]),
            other => value_to_string(other),
        })
        .map(RecordId::from)
        .collect()
}

fn material(obj: &Map<String, Value>) -> Material {
    match field(obj, "material") {
        Some(Value::Object(m)) => {
            let raw = string_field(m, &["name"]).unwrap_or_default();
            Material::new(&raw, optional_number(m, &["thickness"]))
        }
        Some(Value::String(raw)) => Material::new(raw, optional_number(obj, &["materialThickness"])),
        _ => {
            let raw = string_field(obj, &["materialName"]).unwrap_or_default();
            Material::new(&raw, optional_number(obj, &["materialThickness"]))
        }
    }
}

fn normalize_panel(obj: &Map<String, Value>, id: RecordId) -> Result<Panel> {
    let position = coords(obj, &["position"], DEFAULT_POSITION).map_err(|e| {
        Error::unresolvable(RecordKind::Panel, id.as_str(), format!("position: {}", e.0))
    })?;
    let size = coords(obj, &["size"], DEFAULT_SIZE).map_err(|e| {
        Error::unresolvable(RecordKind::Panel, id.as_str(), format!("size: {}", e.0))
    })?;

    let edges = array_field(obj, &["edges"])
        .iter()
        .filter_map(|edge| {
            let e = edge.as_object()?;
            Some(EdgeSegment {
                start: point2(field(e, "start")?)?,
                end: point2(field(e, "end")?)?,
            })
        })
        .collect();

    Ok(Panel {
        position_number: string_field(obj, &["positionNumber", "posNumber", "number"])
            .unwrap_or_default(),
        name: string_field(obj, &["name"]).unwrap_or_default(),
        position,
        size,
        high_z: optional_number(obj, &["highZ"]),
        low_z: optional_number(obj, &["lowZ"]),
        material: material(obj),
        edges,
        has_contour: is_present(obj, &["contourTopology"]),
        has_grooves: is_present(obj, &["grooves"]),
        has_notches: is_present(obj, &["notches"]),
        parent_block: None,
        id,
    })
}

fn normalize_block(obj: &Map<String, Value>, id: RecordId) -> Result<Block> {
    Ok(Block {
        name: string_field(obj, &["name"]).unwrap_or_default(),
        child_panel_ids: id_list(obj, &["childPanelIds", "panelIds"]),
        child_furniture_ids: id_list(obj, &["childFurnitureIds", "furnitureIds"]),
        id,
    })
}

fn normalize_furniture(obj: &Map<String, Value>, id: RecordId) -> Result<Furniture> {
    let position = coords(obj, &["position"], DEFAULT_POSITION).map_err(|e| {
        Error::unresolvable(RecordKind::Furniture, id.as_str(), format!("position: {}", e.0))
    })?;
    let size = coords(obj, &["size"], DEFAULT_SIZE).map_err(|e| {
        Error::unresolvable(RecordKind::Furniture, id.as_str(), format!("size: {}", e.0))
    })?;

    Ok(Furniture {
        name: string_field(obj, &["name"]).unwrap_or_default(),
        kind: string_field(obj, &["type", "kind"]).unwrap_or_default(),
        position,
        size,
        parent_block_id: string_field(obj, &["parentBlockId", "blockId"])
            .filter(|s| !s.trim().is_empty())
            .map(RecordId::from),
        id,
    })
}

fn normalize_extrusion(obj: &Map<String, Value>, id: RecordId) -> Result<ExtrusionProfile> {
    let position = coords(obj, &["position"], DEFAULT_POSITION).map_err(|e| {
        Error::unresolvable(RecordKind::Extrusion, id.as_str(), format!("position: {}", e.0))
    })?;

    let thickness = match field_any(obj, &["thickness", "length"]) {
        None => DEFAULT_SIZE.z,
        Some(v) => as_number(v)
            .map_err(|e| {
                Error::unresolvable(RecordKind::Extrusion, id.as_str(), format!("thickness: {}", e.0))
            })?
            .unwrap_or(DEFAULT_SIZE.z),
    };

    let raw_contour = array_field(obj, &["contour", "points"]);
    let mut contour = Vec::with_capacity(raw_contour.len());
    for (i, point) in raw_contour.iter().enumerate() {
        let p = point2(point).ok_or_else(|| {
            Error::unresolvable(
                RecordKind::Extrusion,
                id.as_str(),
                format!("contour point {} is not numeric", i),
            )
        })?;
        contour.push(p);
    }

    let material = match field(obj, "material") {
        Some(Value::Object(m)) => string_field(m, &["name"]),
        Some(other) => value_to_string(other),
        None => string_field(obj, &["materialName"]),
    }
    .map(|raw| normalize_material_name(&raw))
    .filter(|name| !name.is_empty());

    Ok(ExtrusionProfile {
        name: string_field(obj, &["name"]).unwrap_or_default(),
        thickness,
        contour,
        position,
        material,
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dual_cased_position_and_size() {
        let raw = json!({
            "Panels": [
                {"id": 1, "Position": {"X": 10, "Y": 20, "Z": 30}, "Size": {"x": 600, "Y": 400, "z": 18}},
                {"id": "p2", "position": {"x": 1}}
            ]
        });
        let doc = normalize(&raw).unwrap();
        let p1 = doc.panel("1").unwrap();
        assert_eq!(p1.position, Coords3::new(10.0, 20.0, 30.0));
        assert_eq!(p1.size, Coords3::new(600.0, 400.0, 18.0));

        let p2 = doc.panel("p2").unwrap();
        assert_eq!(p2.position, Coords3::new(1.0, 0.0, 0.0));
        assert_eq!(p2.size, DEFAULT_SIZE);
    }

    #[test]
    fn test_unresolvable_record_skipped() {
        let raw = json!({
            "panels": [
                {"id": "ok", "size": {"x": 500, "y": 300, "z": 18}},
                {"id": "bad", "size": {"x": "wide", "y": 300, "z": 18}},
                {"id": "bad-pos", "position": "corner"}
            ]
        });
        let doc = normalize(&raw).unwrap();
        assert_eq!(doc.panels().len(), 1);
        assert_eq!(doc.skipped().len(), 2);
        assert_eq!(doc.skipped()[0].id, "bad");
        assert_eq!(doc.skipped()[0].kind, RecordKind::Panel);
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(parse_document("{not json"), Err(Error::MalformedDocument(_))));
        assert!(matches!(parse_document("[1,2]"), Err(Error::MalformedDocument(_))));
        assert!(matches!(
            parse_document(r#"{"furniture": []}"#),
            Err(Error::MalformedDocument(_))
        ));
        assert!(parse_document(r#"{"Blocks": []}"#).is_ok());
    }

    #[test]
    fn test_material_forms() {
        let raw = json!({
            "panels": [
                {"id": "a", "material": {"name": "Дуб\rART-4521", "thickness": 16}},
                {"id": "b", "material": "МДФ"},
                {"id": "c", "materialName": "ЛДСП Белый\r123"}
            ]
        });
        let doc = normalize(&raw).unwrap();
        let a = doc.panel("a").unwrap();
        assert_eq!(a.material.name, "Дуб");
        assert_eq!(a.material.raw_name, "Дуб\rART-4521");
        assert_eq!(a.material.thickness, Some(16.0));
        assert_eq!(doc.panel("b").unwrap().material.name, "МДФ");
        assert_eq!(doc.panel("c").unwrap().material.name, "ЛДСП Белый");
    }

    #[test]
    fn test_block_furniture_and_extrusion() {
        let raw = json!({
            "blocks": [{"id": "b1", "name": "Тумба", "childPanelIds": ["p1", 2], "ChildFurnitureIds": ["f1"]}],
            "panels": [{"id": "p1"}, {"id": 2}, {"id": "p3"}],
            "furniture": [{"id": "f1", "type": "handle", "Position": {"x": 5}}],
            "extrusions": [{
                "id": "e1",
                "thickness": 1200,
                "contour": [{"x": 0, "y": 0}, {"x": 20, "y": 0}, [20, 40], {"X": 0, "Y": 40}],
                "material": "Алюминий\rAL-1"
            }]
        });
        let doc = normalize(&raw).unwrap();
        let block = doc.block("b1").unwrap();
        assert_eq!(block.child_panel_ids, vec![RecordId::from("p1"), RecordId::from("2")]);
        assert_eq!(doc.panel("2").unwrap().parent_block, Some("b1".into()));
        assert_eq!(doc.panel("p3").unwrap().parent_block, None);

        let f1 = doc.furniture_item("f1").unwrap();
        assert_eq!(f1.parent_block_id, Some("b1".into()));
        assert_eq!(f1.position.x, 5.0);
        assert_eq!(f1.size, DEFAULT_SIZE);

        let e1 = doc.extrusion("e1").unwrap();
        assert_eq!(e1.thickness, 1200.0);
        assert_eq!(e1.contour.len(), 4);
        assert_eq!(e1.material.as_deref(), Some("Алюминий"));
    }

    #[test]
    fn test_edges_and_flags() {
        let raw = json!({
            "panels": [{
                "id": "p1",
                "edges": [
                    {"start": {"x": 0, "y": 0}, "end": {"x": 500, "y": 0}},
                    {"start": {"x": 0}, "end": {"x": 1, "y": 1}}
                ],
                "grooves": [{"depth": 8}],
                "highZ": 38, "lowZ": "20"
            }]
        });
        let doc = normalize(&raw).unwrap();
        let p = doc.panel("p1").unwrap();
        assert_eq!(p.edges.len(), 1);
        assert!(p.has_grooves);
        assert!(p.has_machining());
        assert_eq!(p.low_z, Some(20.0));
        assert_eq!(p.thickness(), 18.0);
    }

    #[test]
    fn test_missing_ids_get_synthetic_ones() {
        let doc = normalize(&json!({"panels": [{}, {"id": ""}]})).unwrap();
        let ids: Vec<_> = doc.panels().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["panel-0", "panel-1"]);
    }
}
