// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structure tree: the block/part hierarchy shown next to the 3D view.
//!
//! Rows are flat in display order and link to their parent and children by
//! [`RowId`]. Highlight and visibility are derived from the selection and the
//! index; the tree never changes them itself.

use panelview_core::{EntityRef, ModelDocument};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::index::SceneIndex;
use crate::keys::MeshId;
use crate::selection::Selection;

/// Position of a row in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RowId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Block,
    Panel,
    Furniture,
    Extrusion,
    /// Synthetic grouping row (unassigned parts, profiles)
    Group,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeRow {
    pub id: RowId,
    pub kind: RowKind,
    pub label: String,
    pub entity: Option<EntityRef>,
    pub parent: Option<RowId>,
    pub children: Vec<RowId>,
    pub depth: usize,
    pub highlighted: bool,
    pub expanded: bool,
    pub visible: bool,
    #[serde(skip)]
    meshes: Vec<MeshId>,
}

#[derive(Debug, Clone, Default)]
pub struct StructureTree {
    rows: Vec<TreeRow>,
    row_by_mesh: FxHashMap<MeshId, RowId>,
}

impl StructureTree {
    /// Rows for `doc` as indexed in `index`. Records without a mesh get no row.
    pub fn build(doc: &ModelDocument, index: &SceneIndex) -> Self {
        let mut tree = Self::default();

        for (i, block) in doc.blocks().iter().enumerate() {
            let label = if block.name.is_empty() {
                format!("Block {}", i + 1)
            } else {
                block.name.clone()
            };
            let row = tree.push(
                RowKind::Block,
                label,
                Some(EntityRef::block(block.id.clone())),
                None,
                index.get_meshes_for_block(block.id.as_str()).to_vec(),
            );

            for pid in &block.child_panel_ids {
                let Some(panel) = doc.panel(pid.as_str()) else {
                    continue;
                };
                // A panel listed by several blocks sits under the first one
                if panel.parent_block.as_ref() != Some(&block.id) {
                    continue;
                }
                if let Some(mesh) = index.get_mesh_for_panel(pid.as_str()) {
                    let label = panel_label(&panel.position_number, &panel.name);
                    tree.push_entity(RowKind::Panel, label, EntityRef::panel(pid.clone()), row, mesh);
                }
            }
            for &mesh in index.get_furniture_for_block(block.id.as_str()) {
                if let Some(entity) = index.entity_of(mesh).cloned() {
                    let label = furniture_label(doc, &entity);
                    tree.push_entity(RowKind::Furniture, label, entity, row, mesh);
                }
            }
        }

        let orphans: Vec<(RowKind, String, EntityRef, MeshId)> = doc
            .orphan_panels()
            .filter_map(|p| {
                let mesh = index.get_mesh_for_panel(p.id.as_str())?;
                let label = panel_label(&p.position_number, &p.name);
                Some((RowKind::Panel, label, EntityRef::panel(p.id.clone()), mesh))
            })
            .chain(doc.furniture().iter().filter_map(|f| {
                let mesh = index.get_mesh_for_furniture(f.id.as_str())?;
                if index.block_of(mesh).is_some() {
                    return None;
                }
                let entity = EntityRef::furniture(f.id.clone());
                Some((RowKind::Furniture, furniture_label(doc, &entity), entity, mesh))
            }))
            .collect();
        tree.push_group("Unassigned", orphans);

        let profiles: Vec<(RowKind, String, EntityRef, MeshId)> = doc
            .extrusions()
            .iter()
            .filter_map(|e| {
                let mesh = index.get_mesh_for_extrusion(e.id.as_str())?;
                let label = if e.name.is_empty() { e.id.to_string() } else { e.name.clone() };
                Some((RowKind::Extrusion, label, EntityRef::extrusion(e.id.clone()), mesh))
            })
            .collect();
        tree.push_group("Profiles", profiles);

        tree.sync_visibility(index);
        tree
    }

    fn push(
        &mut self,
        kind: RowKind,
        label: String,
        entity: Option<EntityRef>,
        parent: Option<RowId>,
        meshes: Vec<MeshId>,
    ) -> RowId {
        let id = RowId(self.rows.len());
        let depth = parent.map_or(0, |p| self.rows[p.0].depth + 1);
        if let Some(p) = parent {
            self.rows[p.0].children.push(id);
        }
        self.rows.push(TreeRow {
            id,
            kind,
            label,
            entity,
            parent,
            children: Vec::new(),
            depth,
            highlighted: false,
            expanded: false,
            visible: true,
            meshes,
        });
        id
    }

    fn push_entity(
        &mut self,
        kind: RowKind,
        label: String,
        entity: EntityRef,
        parent: RowId,
        mesh: MeshId,
    ) {
        let row = self.push(kind, label, Some(entity), Some(parent), vec![mesh]);
        self.row_by_mesh.entry(mesh).or_insert(row);
    }

    fn push_group(&mut self, label: &str, items: Vec<(RowKind, String, EntityRef, MeshId)>) {
        if items.is_empty() {
            return;
        }
        let meshes = items.iter().map(|item| item.3).collect();
        let group = self.push(RowKind::Group, label.to_string(), None, None, meshes);
        for (kind, label, entity, mesh) in items {
            self.push_entity(kind, label, entity, group, mesh);
        }
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&TreeRow> {
        self.rows.get(id.0)
    }

    /// Top-level rows in display order
    pub fn roots(&self) -> impl Iterator<Item = &TreeRow> {
        self.rows.iter().filter(|r| r.parent.is_none())
    }

    /// Entity row of a top-level mesh
    pub fn row_for_mesh(&self, mesh: MeshId) -> Option<RowId> {
        self.row_by_mesh.get(&mesh).copied()
    }

    /// Meshes a row stands for: its own mesh, or all meshes of a block/group
    pub fn meshes_for_row(&self, id: RowId) -> &[MeshId] {
        self.rows.get(id.0).map(|r| r.meshes.as_slice()).unwrap_or(&[])
    }

    /// Highlighted rows in display order
    pub fn highlighted(&self) -> Vec<RowId> {
        self.rows.iter().filter(|r| r.highlighted).map(|r| r.id).collect()
    }

    /// Mirror the selection: entity rows of selected meshes, plus block and
    /// group rows whose meshes are all selected. Ancestors of highlighted
    /// rows are expanded.
    pub fn sync_highlight(&mut self, selection: &Selection) {
        for row in &mut self.rows {
            row.highlighted =
                !row.meshes.is_empty() && row.meshes.iter().all(|&m| selection.is_selected(m));
        }

        for i in 0..self.rows.len() {
            let row = &self.rows[i];
            if !row.highlighted || matches!(row.kind, RowKind::Block | RowKind::Group) {
                continue;
            }
            let mut parent = self.rows[i].parent;
            while let Some(p) = parent {
                self.rows[p.0].expanded = true;
                parent = self.rows[p.0].parent;
            }
        }
    }

    /// A row is visible while any of its meshes is
    pub fn sync_visibility(&mut self, index: &SceneIndex) {
        for row in &mut self.rows {
            row.visible = row.meshes.iter().any(|&m| index.is_visible(m));
        }
    }

    pub fn set_expanded(&mut self, id: RowId, expanded: bool) {
        if let Some(row) = self.rows.get_mut(id.0) {
            row.expanded = expanded;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn panel_label(position_number: &str, name: &str) -> String {
    match (position_number.is_empty(), name.is_empty()) {
        (false, false) => format!("{position_number}. {name}"),
        (false, true) => position_number.to_string(),
        (true, false) => name.to_string(),
        (true, true) => "Panel".to_string(),
    }
}

fn furniture_label(doc: &ModelDocument, entity: &EntityRef) -> String {
    match doc.furniture_item(entity.id.as_str()) {
        Some(f) if !f.name.is_empty() => f.name.clone(),
        Some(f) if !f.kind.is_empty() => f.kind.clone(),
        _ => entity.id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::config::ViewerConfig;
    use crate::material::Color;
    use crate::selection::SelectMode;
    use panelview_core::parse_document;

    const DOC: &str = r#"{
        "blocks": [
            {"id": "b1", "name": "Корпус", "childPanelIds": ["p1", "p2"], "childFurnitureIds": ["f1"]},
            {"id": "b2", "childPanelIds": ["p2"]}
        ],
        "panels": [
            {"id": "p1", "positionNumber": "1", "name": "Бок", "size": {"x": 18, "y": 700, "z": 500}},
            {"id": "p2", "positionNumber": "2", "size": {"x": 500, "y": 18, "z": 500}},
            {"id": "p3", "name": "Полка", "size": {"x": 400, "y": 16, "z": 300}}
        ],
        "furniture": [{"id": "f1", "type": "Ручка", "size": {"x": 128, "y": 20, "z": 10}}],
        "extrusions": [{"id": "e1", "name": "Цоколь", "thickness": 800, "contour": [[0, 0], [100, 0], [100, 16], [0, 16]]}]
    }"#;

    fn setup() -> (ModelDocument, SceneIndex, StructureTree) {
        let doc = parse_document(DOC).unwrap();
        let (index, _) = build(&doc, &ViewerConfig::default());
        let tree = StructureTree::build(&doc, &index);
        (doc, index, tree)
    }

    #[test]
    fn test_row_layout() {
        let (_, index, tree) = setup();
        let labels: Vec<&str> = tree.roots().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Корпус", "Block 2", "Unassigned", "Profiles"]);

        let b1 = tree.roots().next().unwrap();
        assert_eq!(b1.children.len(), 3);
        assert_eq!(tree.row(b1.children[0]).unwrap().label, "1. Бок");
        assert_eq!(tree.row(b1.children[2]).unwrap().label, "Ручка");

        // p2 belongs to b1 only
        let b2 = tree.roots().nth(1).unwrap();
        assert!(b2.children.is_empty());

        let p3 = index.get_mesh_for_panel("p3").unwrap();
        let p3_row = tree.row(tree.row_for_mesh(p3).unwrap()).unwrap();
        assert_eq!(p3_row.depth, 1);
        assert_eq!(tree.row(p3_row.parent.unwrap()).unwrap().label, "Unassigned");
    }

    #[test]
    fn test_highlight_follows_selection() {
        let (_, mut index, mut tree) = setup();
        let mut selection = Selection::new(Color::rgb(1.0, 0.0, 0.0));
        let p1 = index.get_mesh_for_panel("p1").unwrap();
        tree.set_expanded(RowId(0), false);
        assert!(!tree.row(RowId(0)).unwrap().expanded);

        selection.select_single(&mut index, p1);
        tree.sync_highlight(&selection);
        let row = tree.row_for_mesh(p1).unwrap();
        assert_eq!(tree.highlighted(), vec![row]);
        assert!(tree.row(RowId(0)).unwrap().expanded);

        selection.select_block(&mut index, "b1", SelectMode::Replace).unwrap();
        tree.sync_highlight(&selection);
        assert!(tree.row(RowId(0)).unwrap().highlighted);
        assert_eq!(tree.highlighted().len(), 4);
    }

    #[test]
    fn test_visibility_rows() {
        let (_, mut index, mut tree) = setup();
        let mut selection = Selection::new(Color::rgb(1.0, 0.0, 0.0));
        let p3 = index.get_mesh_for_panel("p3").unwrap();

        selection.set_visible(&mut index, p3, false).unwrap();
        tree.sync_visibility(&index);
        let row = tree.row_for_mesh(p3).unwrap();
        assert!(!tree.row(row).unwrap().visible);
        // Unassigned holds p3 alone
        let group = tree.row(row).unwrap().parent.unwrap();
        assert!(!tree.row(group).unwrap().visible);
        assert!(tree.row(RowId(0)).unwrap().visible);
    }
}
