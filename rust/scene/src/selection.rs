// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection & Visibility.
//!
//! Selected meshes get the shared highlight material swapped in. The material
//! each node had before is kept and put back on deselection, so a mesh ends
//! up holding the very same `Arc` it started with.
//!
//! Visibility bookkeeping lives here too: `hidden` mirrors the top-level
//! meshes whose own flag is off. Edge strips carry their own flag and are
//! shown or hidden on their own, but never enter `hidden`.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::index::{NodeKind, SceneIndex};
use crate::keys::MeshId;
use crate::material::{Color, RenderMaterial};

/// How a selection request combines with the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    /// Drop the current selection first
    #[default]
    Replace,
    /// Flip membership, keep everything else
    Toggle,
}

#[derive(Debug)]
pub struct Selection {
    /// Selected top-level meshes in selection order
    selected: Vec<MeshId>,
    selected_set: FxHashSet<MeshId>,
    /// Original material of every highlighted node, children included
    saved: FxHashMap<MeshId, Arc<RenderMaterial>>,
    hidden: FxHashSet<MeshId>,
    highlight: Arc<RenderMaterial>,
}

impl Selection {
    pub fn new(highlight_color: Color) -> Self {
        Self {
            selected: Vec::new(),
            selected_set: FxHashSet::default(),
            saved: FxHashMap::default(),
            hidden: FxHashSet::default(),
            highlight: Arc::new(RenderMaterial::new("highlight", highlight_color)),
        }
    }

    pub fn selected(&self) -> &[MeshId] {
        &self.selected
    }

    pub fn is_selected(&self, id: MeshId) -> bool {
        self.selected_set.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn highlight_material(&self) -> &Arc<RenderMaterial> {
        &self.highlight
    }

    /// Top-level meshes hidden by their own flag
    pub fn hidden(&self) -> &FxHashSet<MeshId> {
        &self.hidden
    }

    // ---------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------

    /// Select one mesh (or the mesh owning it) and nothing else
    pub fn select_single(&mut self, index: &mut SceneIndex, id: MeshId) {
        self.select(index, &[id], SelectMode::Replace);
    }

    /// Flip one mesh's membership
    pub fn toggle(&mut self, index: &mut SceneIndex, id: MeshId) {
        self.select(index, &[id], SelectMode::Toggle);
    }

    /// Select meshes. In toggle mode each id flips on its own.
    pub fn select(&mut self, index: &mut SceneIndex, ids: &[MeshId], mode: SelectMode) {
        if mode == SelectMode::Replace {
            self.clear(index);
        }
        for owner in resolve_owners(index, ids) {
            if mode == SelectMode::Toggle && self.is_selected(owner) {
                self.remove(index, owner);
            } else {
                self.add(index, owner);
            }
        }
        tracing::debug!(selected = self.selected.len(), ?mode, "Selection updated");
    }

    /// Select a group as a unit. Toggling a fully selected group removes
    /// it, otherwise the missing members are added.
    pub fn select_group(&mut self, index: &mut SceneIndex, ids: &[MeshId], mode: SelectMode) {
        let owners = resolve_owners(index, ids);
        match mode {
            SelectMode::Replace => {
                self.clear(index);
                for owner in owners {
                    self.add(index, owner);
                }
            }
            SelectMode::Toggle => {
                let all_selected = !owners.is_empty() && owners.iter().all(|o| self.is_selected(*o));
                for owner in owners {
                    if all_selected {
                        self.remove(index, owner);
                    } else {
                        self.add(index, owner);
                    }
                }
            }
        }
        tracing::debug!(selected = self.selected.len(), ?mode, "Group selection updated");
    }

    /// Select every mesh of a block
    pub fn select_block(
        &mut self,
        index: &mut SceneIndex,
        block_id: &str,
        mode: SelectMode,
    ) -> Result<()> {
        if !index.has_block(block_id) {
            return Err(Error::UnknownBlock(block_id.to_string()));
        }
        let meshes = index.get_meshes_for_block(block_id).to_vec();
        self.select_group(index, &meshes, mode);
        Ok(())
    }

    /// Select every panel of one material
    pub fn select_by_material(&mut self, index: &mut SceneIndex, material_name: &str) -> usize {
        let panels: Vec<MeshId> = index
            .meshes()
            .iter()
            .copied()
            .filter(|&id| {
                index
                    .node(id)
                    .is_some_and(|n| n.kind() == NodeKind::Panel && n.material_name() == material_name)
            })
            .collect();
        self.select_group(index, &panels, SelectMode::Replace);
        panels.len()
    }

    /// Deselect everything, restoring original materials
    pub fn clear(&mut self, index: &mut SceneIndex) {
        for id in std::mem::take(&mut self.selected) {
            self.restore(index, id);
        }
        self.selected_set.clear();
    }

    fn add(&mut self, index: &mut SceneIndex, id: MeshId) {
        if !self.selected_set.insert(id) {
            return;
        }
        self.selected.push(id);

        for node in subtree(index, id) {
            if self.saved.contains_key(&node) {
                continue;
            }
            if let Ok(original) = index.swap_material(node, Arc::clone(&self.highlight)) {
                self.saved.insert(node, original);
            }
        }
    }

    fn remove(&mut self, index: &mut SceneIndex, id: MeshId) {
        if !self.selected_set.remove(&id) {
            return;
        }
        self.selected.retain(|&s| s != id);
        self.restore(index, id);
    }

    fn restore(&mut self, index: &mut SceneIndex, id: MeshId) {
        for node in subtree(index, id) {
            if let Some(original) = self.saved.remove(&node) {
                let _ = index.swap_material(node, original);
            }
        }
    }

    // ---------------------------------------------------------------
    // Visibility
    // ---------------------------------------------------------------

    /// Set one mesh's own visibility flag. `hidden` tracks top-level meshes.
    pub fn set_visible(&mut self, index: &mut SceneIndex, id: MeshId, visible: bool) -> Result<()> {
        index.set_visible(id, visible)?;
        if index.node(id).is_some_and(|n| n.parent().is_none()) {
            if visible {
                self.hidden.remove(&id);
            } else {
                self.hidden.insert(id);
            }
        }
        Ok(())
    }

    /// Hide everything except the selection. No-op on an empty selection.
    pub fn show_only_selected(&mut self, index: &mut SceneIndex) -> bool {
        if self.is_empty() {
            tracing::debug!("Show-only requested with empty selection, ignoring");
            return false;
        }
        let roots = index.meshes().to_vec();
        for id in roots {
            let keep = self.is_selected(id);
            if index.set_visible(id, keep).is_ok() {
                if keep {
                    self.hidden.remove(&id);
                } else {
                    self.hidden.insert(id);
                }
            }
        }
        true
    }

    /// Hide the selection, leaving it selected. No-op on an empty selection.
    pub fn hide_selected(&mut self, index: &mut SceneIndex) -> bool {
        if self.is_empty() {
            tracing::debug!("Hide requested with empty selection, ignoring");
            return false;
        }
        for id in self.selected.clone() {
            if index.set_visible(id, false).is_ok() {
                self.hidden.insert(id);
            }
        }
        true
    }

    /// Make every mesh visible, edge strips included
    pub fn show_all(&mut self, index: &mut SceneIndex) {
        let all: Vec<MeshId> = index.all_nodes().map(|(id, _)| id).collect();
        for id in all {
            let _ = index.set_visible(id, true);
        }
        self.hidden.clear();
    }

    /// Recompute `hidden` from the index after bulk visibility changes
    pub fn rebuild_hidden(&mut self, index: &SceneIndex) {
        self.hidden = index
            .meshes()
            .iter()
            .copied()
            .filter(|&id| !index.is_visible(id))
            .collect();
    }

    /// Forget everything. Used when the index is being disposed, so no
    /// material is restored.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.selected_set.clear();
        self.saved.clear();
        self.hidden.clear();
    }
}

/// Owners of `ids` in order, unknown ids dropped, duplicates removed
fn resolve_owners(index: &SceneIndex, ids: &[MeshId]) -> Vec<MeshId> {
    let mut seen = FxHashSet::default();
    ids.iter()
        .filter_map(|&id| index.owner_of(id))
        .filter(|owner| seen.insert(*owner))
        .collect()
}

/// A node and its descendants
fn subtree(index: &SceneIndex, id: MeshId) -> Vec<MeshId> {
    let mut out = Vec::new();
    let mut stack = vec![id];
    while let Some(cur) = stack.pop() {
        if let Some(node) = index.node(cur) {
            out.push(cur);
            stack.extend(node.children().iter().copied());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::config::ViewerConfig;
    use panelview_core::parse_document;

    const DOC: &str = r#"{
        "blocks": [{"id": "b1", "childPanelIds": ["p1", "p2"]}],
        "panels": [
            {"id": "p1", "material": "ЛДСП", "size": {"x": 500, "y": 300, "z": 16},
             "edges": [{"start": {"x": 0, "y": 0}, "end": {"x": 500, "y": 0}}]},
            {"id": "p2", "material": "ЛДСП", "position": {"x": 0, "y": 0, "z": 100}, "size": {"x": 500, "y": 300, "z": 16}},
            {"id": "p3", "material": "МДФ", "position": {"x": 600, "y": 0, "z": 0}, "size": {"x": 200, "y": 200, "z": 18}}
        ]
    }"#;

    fn setup() -> (SceneIndex, Selection) {
        let doc = parse_document(DOC).unwrap();
        let (index, _) = build(&doc, &ViewerConfig::default());
        (index, Selection::new(Color::rgb(1.0, 0.0, 0.0)))
    }

    #[test]
    fn test_highlight_restores_same_material() {
        let (mut index, mut selection) = setup();
        let p1 = index.get_mesh_for_panel("p1").unwrap();
        let strip = index.node(p1).unwrap().children()[0];
        let body = Arc::clone(index.node(p1).unwrap().material());
        let band = Arc::clone(index.node(strip).unwrap().material());

        selection.select_single(&mut index, p1);
        assert!(Arc::ptr_eq(index.node(p1).unwrap().material(), selection.highlight_material()));
        assert!(Arc::ptr_eq(index.node(strip).unwrap().material(), selection.highlight_material()));

        selection.clear(&mut index);
        assert!(Arc::ptr_eq(index.node(p1).unwrap().material(), &body));
        assert!(Arc::ptr_eq(index.node(strip).unwrap().material(), &band));
    }

    #[test]
    fn test_picking_edge_strip_selects_panel() {
        let (mut index, mut selection) = setup();
        let p1 = index.get_mesh_for_panel("p1").unwrap();
        let strip = index.node(p1).unwrap().children()[0];

        selection.select_single(&mut index, strip);
        assert_eq!(selection.selected(), &[p1]);
    }

    #[test]
    fn test_toggle_and_block_group() {
        let (mut index, mut selection) = setup();
        let p1 = index.get_mesh_for_panel("p1").unwrap();
        let p2 = index.get_mesh_for_panel("p2").unwrap();

        selection.toggle(&mut index, p1);
        selection.select_block(&mut index, "b1", SelectMode::Toggle).unwrap();
        assert_eq!(selection.selected(), &[p1, p2]);

        selection.select_block(&mut index, "b1", SelectMode::Toggle).unwrap();
        assert!(selection.is_empty());

        assert!(matches!(
            selection.select_block(&mut index, "nope", SelectMode::Replace),
            Err(Error::UnknownBlock(_))
        ));
    }

    #[test]
    fn test_select_by_material() {
        let (mut index, mut selection) = setup();
        assert_eq!(selection.select_by_material(&mut index, "ЛДСП"), 2);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.select_by_material(&mut index, "Бук"), 0);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_show_only_and_show_all() {
        let (mut index, mut selection) = setup();
        let p3 = index.get_mesh_for_panel("p3").unwrap();

        assert!(!selection.show_only_selected(&mut index));
        assert!(selection.hidden().is_empty());

        selection.select_single(&mut index, p3);
        assert!(selection.show_only_selected(&mut index));
        assert_eq!(selection.hidden().len(), 2);
        assert!(index.is_visible(p3));

        selection.show_all(&mut index);
        assert!(selection.hidden().is_empty());
        assert!(index.meshes().iter().all(|&id| index.is_visible(id)));
    }

    #[test]
    fn test_hide_selected_keeps_selection() {
        let (mut index, mut selection) = setup();
        let p1 = index.get_mesh_for_panel("p1").unwrap();
        let original = Arc::clone(index.node(p1).unwrap().material());

        selection.select_single(&mut index, p1);
        assert!(selection.hide_selected(&mut index));
        assert!(!index.is_visible(p1));
        assert_eq!(selection.selected(), &[p1]);
        assert!(selection.hidden().contains(&p1));
        assert!(Arc::ptr_eq(index.node(p1).unwrap().material(), selection.highlight_material()));

        selection.show_all(&mut index);
        assert!(index.is_visible(p1));
        assert_eq!(selection.selected(), &[p1]);

        selection.clear(&mut index);
        assert!(Arc::ptr_eq(index.node(p1).unwrap().material(), &original));
    }

    #[test]
    fn test_edge_strip_visibility_is_independent() {
        let (mut index, mut selection) = setup();
        let p1 = index.get_mesh_for_panel("p1").unwrap();
        let strip = index.node(p1).unwrap().children()[0];

        selection.set_visible(&mut index, strip, false).unwrap();
        assert!(!index.is_visible(strip));
        assert!(index.is_visible(p1));
        assert!(selection.hidden().is_empty());

        selection.show_all(&mut index);
        assert!(index.is_visible(strip));
        assert!(index.all_nodes().all(|(id, _)| index.is_visible(id)));
    }
}
