// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-material panel totals.

use std::collections::BTreeMap;

use panelview_core::ModelDocument;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::index::SceneIndex;
use crate::keys::MeshId;
use crate::selection::Selection;

/// Which panels a summary covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryScope {
    #[default]
    All,
    /// Effectively visible panels
    Visible,
    Selected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSummaryEntry {
    pub name: String,
    pub count: usize,
    /// Both large faces, square metres
    #[serde(rename = "totalArea")]
    pub total_area_m2: f64,
    /// Edge-banded length, metres
    #[serde(rename = "totalEdgeLength")]
    pub total_edge_length_m: f64,
}

/// Totals per material name over the panels whose mesh passes `include`,
/// sorted by name
pub fn material_summary(
    doc: &ModelDocument,
    index: &SceneIndex,
    include: impl Fn(MeshId) -> bool,
) -> Vec<MaterialSummaryEntry> {
    let mut totals: BTreeMap<&str, MaterialSummaryEntry> = BTreeMap::new();
    let mut seen = FxHashSet::default();

    for panel in doc.panels() {
        let Some(mesh) = index.get_mesh_for_panel(panel.id.as_str()) else {
            continue;
        };
        if !seen.insert(mesh) || !include(mesh) {
            continue;
        }
        let name = panel.material.name.as_str();
        let entry = totals.entry(name).or_insert_with(|| MaterialSummaryEntry {
            name: name.to_string(),
            count: 0,
            total_area_m2: 0.0,
            total_edge_length_m: 0.0,
        });
        entry.count += 1;
        entry.total_area_m2 += panel.area_m2();
        entry.total_edge_length_m += panel.edge_length_mm() / 1000.0;
    }

    totals.into_values().collect()
}

/// Summary over one of the standard scopes
pub fn scoped_summary(
    doc: &ModelDocument,
    index: &SceneIndex,
    selection: &Selection,
    scope: SummaryScope,
) -> Vec<MaterialSummaryEntry> {
    match scope {
        SummaryScope::All => material_summary(doc, index, |_| true),
        SummaryScope::Visible => material_summary(doc, index, |m| index.is_effectively_visible(m)),
        SummaryScope::Selected => material_summary(doc, index, |m| selection.is_selected(m)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::config::ViewerConfig;
    use approx::assert_relative_eq;
    use panelview_core::parse_document;

    const DOC: &str = r#"{"panels": [
        {"id": "a", "material": "МДФ", "size": {"x": 500, "y": 300, "z": 16},
         "edges": [{"start": {"x": 0, "y": 0}, "end": {"x": 500, "y": 0}}]},
        {"id": "b", "material": "ЛДСП", "size": {"x": 500, "y": 300, "z": 16}},
        {"id": "c", "material": "ЛДСП", "size": {"x": 1000, "y": 500, "z": 16},
         "edges": [{"start": {"x": 0, "y": 0}, "end": {"x": 0, "y": 500}}]}
    ]}"#;

    #[test]
    fn test_totals_sorted_by_name() {
        let doc = parse_document(DOC).unwrap();
        let (index, _) = build(&doc, &ViewerConfig::default());
        let summary = material_summary(&doc, &index, |_| true);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].name, "ЛДСП");
        assert_eq!(summary[0].count, 2);
        assert_relative_eq!(summary[0].total_area_m2, 0.30 + 1.0);
        assert_relative_eq!(summary[0].total_edge_length_m, 0.5);
        assert_eq!(summary[1].name, "МДФ");
        assert_relative_eq!(summary[1].total_area_m2, 0.30);
    }

    #[test]
    fn test_visible_scope() {
        let doc = parse_document(DOC).unwrap();
        let (mut index, _) = build(&doc, &ViewerConfig::default());
        let selection = Selection::new(crate::material::Color::rgb(1.0, 0.0, 0.0));
        let c = index.get_mesh_for_panel("c").unwrap();
        index.set_visible(c, false).unwrap();

        let summary = scoped_summary(&doc, &index, &selection, SummaryScope::Visible);
        assert_eq!(summary[0].count, 1);
        assert_relative_eq!(summary[0].total_area_m2, 0.30);
        assert!(scoped_summary(&doc, &index, &selection, SummaryScope::Selected).is_empty());
    }

    #[test]
    fn test_json_field_names() {
        let doc = parse_document(DOC).unwrap();
        let (index, _) = build(&doc, &ViewerConfig::default());
        let summary = material_summary(&doc, &index, |_| true);
        let json = serde_json::to_value(&summary).unwrap();

        let first = &json[0];
        assert_eq!(first["name"], "ЛДСП");
        assert_eq!(first["count"], 2);
        assert!(first["totalArea"].is_number());
        assert!(first["totalEdgeLength"].is_number());
        assert!(first.get("totalAreaM2").is_none());
    }
}
