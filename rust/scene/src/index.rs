// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene Index: mesh nodes and the lookup maps over them.
//!
//! The [`SceneIndex`] owns every mesh node of a loaded document. Nodes live in
//! a slot map keyed by [`MeshId`]; the index keeps the id maps the rest of the
//! viewer queries (panel, block, furniture and extrusion ids to meshes), the
//! material palette and the model bounds computed at build time.
//!
//! Edge-banding strips are child nodes of their panel. A child's translation
//! is relative to its parent and its effective visibility requires the parent
//! to be visible too. The `owner_of` side table resolves any node to the
//! registered top-level mesh, which is what picking and selection work with.
//!
//! Records are referenced by [`EntityRef`] only; the index never owns them.

use nalgebra::Vector3;
use panelview_core::{EntityRef, RecordId};
use panelview_geometry::{raycast_mesh, Box3, Mesh, Ray};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::keys::MeshId;
use crate::material::{Color, MaterialPalette, RenderMaterial};

/// What a mesh node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Panel,
    EdgeBand,
    Furniture,
    Extrusion,
}

/// Which meshes take part in a bounds query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsMode {
    /// Only meshes that are effectively visible
    VisibleOnly,
    /// Every referenced mesh regardless of visibility
    All,
}

/// One mesh in the scene
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub(crate) kind: NodeKind,
    pub(crate) entity: EntityRef,
    pub(crate) mesh: Mesh,
    pub(crate) local_bounds: Box3,
    /// World translation for top-level nodes, parent-relative for children
    pub(crate) translation: Vector3<f64>,
    pub(crate) visible: bool,
    pub(crate) parent: Option<MeshId>,
    pub(crate) children: SmallVec<[MeshId; 4]>,
    pub(crate) material: Arc<RenderMaterial>,
    pub(crate) material_name: String,
}

impl SceneNode {
    pub fn new(
        kind: NodeKind,
        entity: EntityRef,
        mesh: Mesh,
        translation: Vector3<f64>,
        material: Arc<RenderMaterial>,
        material_name: impl Into<String>,
    ) -> Self {
        let local_bounds = mesh.bounding_box();
        Self {
            kind,
            entity,
            mesh,
            local_bounds,
            translation,
            visible: true,
            parent: None,
            children: SmallVec::new(),
            material,
            material_name: material_name.into(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Back-reference to the source record. Edge strips point at their panel.
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn local_bounds(&self) -> &Box3 {
        &self.local_bounds
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.translation
    }

    /// The node's own flag
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn parent(&self) -> Option<MeshId> {
        self.parent
    }

    pub fn children(&self) -> &[MeshId] {
        &self.children
    }

    pub fn material(&self) -> &Arc<RenderMaterial> {
        &self.material
    }

    /// Normalized material name of the source record
    pub fn material_name(&self) -> &str {
        &self.material_name
    }
}

/// Nearest ray hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Registered top-level mesh owning the hit node
    pub mesh: MeshId,
    /// Node actually hit (an edge strip or the mesh itself)
    pub node: MeshId,
    pub distance: f64,
}

/// Scene Index for one loaded document.
#[derive(Debug, Default)]
pub struct SceneIndex {
    nodes: SlotMap<MeshId, SceneNode>,
    /// Top-level nodes in build order
    roots: Vec<MeshId>,

    mesh_by_panel: FxHashMap<RecordId, MeshId>,
    mesh_by_block: FxHashMap<RecordId, Vec<MeshId>>,
    mesh_by_furniture: FxHashMap<RecordId, MeshId>,
    furniture_by_block: FxHashMap<RecordId, Vec<MeshId>>,
    mesh_by_extrusion: FxHashMap<RecordId, MeshId>,
    owner_of: FxHashMap<MeshId, MeshId>,
    block_of: FxHashMap<MeshId, RecordId>,
    /// Blocks of the document in document order
    blocks: Vec<RecordId>,

    palette: MaterialPalette,
    model_bounds: Box3,
}

impl SceneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------
    // Population (builder side)
    // ---------------------------------------------------------------

    /// Add a top-level node
    pub fn insert(&mut self, node: SceneNode) -> MeshId {
        let id = self.nodes.insert(node);
        self.roots.push(id);
        self.owner_of.insert(id, id);
        id
    }

    /// Add a child node under `parent`
    pub fn insert_child(&mut self, parent: MeshId, mut node: SceneNode) -> Result<MeshId> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::UnknownMesh(parent));
        }
        node.parent = Some(parent);
        node.visible = self.nodes[parent].visible;
        let id = self.nodes.insert(node);
        self.nodes[parent].children.push(id);
        let owner = self.owner_of.get(&parent).copied().unwrap_or(parent);
        self.owner_of.insert(id, owner);
        Ok(id)
    }

    /// Register a panel mesh. The first mesh registered for an id wins.
    pub fn register_panel(&mut self, id: &RecordId, mesh: MeshId) {
        self.mesh_by_panel.entry(id.clone()).or_insert(mesh);
    }

    pub fn register_furniture(&mut self, id: &RecordId, mesh: MeshId) {
        self.mesh_by_furniture.entry(id.clone()).or_insert(mesh);
    }

    pub fn register_extrusion(&mut self, id: &RecordId, mesh: MeshId) {
        self.mesh_by_extrusion.entry(id.clone()).or_insert(mesh);
    }

    /// Record that `mesh` belongs to `block`
    pub fn register_block_member(&mut self, block: &RecordId, mesh: MeshId) {
        self.mesh_by_block.entry(block.clone()).or_default().push(mesh);
        self.block_of.entry(mesh).or_insert_with(|| block.clone());
    }

    /// Record a furniture mesh under its parent block
    pub fn register_block_furniture(&mut self, block: &RecordId, mesh: MeshId) {
        self.furniture_by_block
            .entry(block.clone())
            .or_default()
            .push(mesh);
        self.register_block_member(block, mesh);
    }

    pub fn set_blocks(&mut self, blocks: Vec<RecordId>) {
        self.blocks = blocks;
    }

    pub fn palette_mut(&mut self) -> &mut MaterialPalette {
        &mut self.palette
    }

    /// Recompute and store the bounds of everything in the scene
    pub fn update_model_bounds(&mut self) -> Box3 {
        self.model_bounds = self.compute_bounds(&self.roots, BoundsMode::All);
        self.model_bounds
    }

    // ---------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------

    pub fn node(&self, id: MeshId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Top-level meshes in build order
    pub fn meshes(&self) -> &[MeshId] {
        &self.roots
    }

    /// Every node, children included
    pub fn all_nodes(&self) -> impl Iterator<Item = (MeshId, &SceneNode)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Meshes of a block: its panels and its furniture
    pub fn get_meshes_for_block(&self, block_id: &str) -> &[MeshId] {
        self.mesh_by_block
            .get(block_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_furniture_for_block(&self, block_id: &str) -> &[MeshId] {
        self.furniture_by_block
            .get(block_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_mesh_for_panel(&self, panel_id: &str) -> Option<MeshId> {
        self.mesh_by_panel.get(panel_id).copied()
    }

    pub fn get_mesh_for_furniture(&self, furniture_id: &str) -> Option<MeshId> {
        self.mesh_by_furniture.get(furniture_id).copied()
    }

    pub fn get_mesh_for_extrusion(&self, extrusion_id: &str) -> Option<MeshId> {
        self.mesh_by_extrusion.get(extrusion_id).copied()
    }

    /// Mesh registered for any record reference
    pub fn get_mesh_for_entity(&self, entity: &EntityRef) -> Option<MeshId> {
        use panelview_core::RecordKind;
        match entity.kind {
            RecordKind::Panel => self.get_mesh_for_panel(entity.id.as_str()),
            RecordKind::Furniture => self.get_mesh_for_furniture(entity.id.as_str()),
            RecordKind::Extrusion => self.get_mesh_for_extrusion(entity.id.as_str()),
            RecordKind::Block => None,
        }
    }

    /// Blocks in document order
    pub fn blocks(&self) -> &[RecordId] {
        &self.blocks
    }

    pub fn has_block(&self, block_id: &str) -> bool {
        self.blocks.iter().any(|b| b.as_str() == block_id) || self.mesh_by_block.contains_key(block_id)
    }

    /// Registered top-level mesh for any node (itself for top-level nodes)
    pub fn owner_of(&self, id: MeshId) -> Option<MeshId> {
        self.owner_of.get(&id).copied()
    }

    pub fn entity_of(&self, id: MeshId) -> Option<&EntityRef> {
        self.nodes.get(id).map(|n| &n.entity)
    }

    /// Block owning a mesh (resolved through its owner)
    pub fn block_of(&self, id: MeshId) -> Option<&RecordId> {
        let owner = self.owner_of(id)?;
        self.block_of.get(&owner)
    }

    // ---------------------------------------------------------------
    // Visibility
    // ---------------------------------------------------------------

    pub fn set_visible(&mut self, id: MeshId, visible: bool) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(Error::UnknownMesh(id))?;
        node.visible = visible;
        Ok(())
    }

    /// The mesh's own flag; unknown meshes are not visible
    pub fn is_visible(&self, id: MeshId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.visible)
    }

    /// Own flag and every ancestor's
    pub fn is_effectively_visible(&self, id: MeshId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.nodes.get(cur) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    // ---------------------------------------------------------------
    // Transforms and bounds
    // ---------------------------------------------------------------

    /// World translation, parents included
    pub fn world_translation(&self, id: MeshId) -> Vector3<f64> {
        let mut total = Vector3::zeros();
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.nodes.get(cur) {
                Some(node) => {
                    total += node.translation;
                    current = node.parent;
                }
                None => break,
            }
        }
        total
    }

    pub(crate) fn set_translation(&mut self, id: MeshId, translation: Vector3<f64>) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(Error::UnknownMesh(id))?;
        node.translation = translation;
        Ok(())
    }

    /// World bounds of one node, children not included
    pub fn node_bounds(&self, id: MeshId) -> Box3 {
        match self.nodes.get(id) {
            Some(node) => node.local_bounds.translated(self.world_translation(id)),
            None => Box3::empty(),
        }
    }

    /// Union of the world bounds of `ids` and their descendants
    pub fn compute_bounds(&self, ids: &[MeshId], mode: BoundsMode) -> Box3 {
        let mut bounds = Box3::empty();
        let mut seen = FxHashSet::default();
        let mut stack: Vec<MeshId> = ids.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if mode == BoundsMode::VisibleOnly && !self.is_effectively_visible(id) {
                continue;
            }
            bounds = bounds.union(&self.node_bounds(id));
            stack.extend(node.children.iter().copied());
        }

        bounds
    }

    /// Bounds of a block's meshes, recomputed on every call
    pub fn block_bounds(&self, block_id: &str, mode: BoundsMode) -> Box3 {
        self.compute_bounds(self.get_meshes_for_block(block_id), mode)
    }

    /// Bounds of everything currently visible
    pub fn visible_bounds(&self) -> Box3 {
        self.compute_bounds(&self.roots, BoundsMode::VisibleOnly)
    }

    /// Bounds of the whole document as built
    pub fn model_bounds(&self) -> Box3 {
        self.model_bounds
    }

    // ---------------------------------------------------------------
    // Materials
    // ---------------------------------------------------------------

    /// Colour assigned to a material name. Stable for the loaded document.
    pub fn color_of(&self, material_name: &str) -> Color {
        self.palette
            .assigned(material_name)
            .unwrap_or_else(|| crate::material::color_for_name(material_name))
    }

    /// Material name to colour map of the loaded document
    pub fn material_colors(&self) -> &FxHashMap<String, Color> {
        self.palette.colors()
    }

    /// Replace a node's render material, returning the previous one
    pub(crate) fn swap_material(
        &mut self,
        id: MeshId,
        material: Arc<RenderMaterial>,
    ) -> Result<Arc<RenderMaterial>> {
        let node = self.nodes.get_mut(id).ok_or(Error::UnknownMesh(id))?;
        Ok(std::mem::replace(&mut node.material, material))
    }

    // ---------------------------------------------------------------
    // Picking
    // ---------------------------------------------------------------

    /// Nearest hit over all nodes passing `mode`
    pub fn raycast(&self, ray: &Ray, mode: BoundsMode) -> Option<RayHit> {
        self.raycast_filtered(ray, mode, |_| true)
    }

    /// Nearest hit over nodes whose owner passes `accept`
    pub fn raycast_filtered(
        &self,
        ray: &Ray,
        mode: BoundsMode,
        accept: impl Fn(MeshId) -> bool,
    ) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;

        for (id, node) in self.nodes.iter() {
            if mode == BoundsMode::VisibleOnly && !self.is_effectively_visible(id) {
                continue;
            }
            let owner = self.owner_of(id).unwrap_or(id);
            if !accept(owner) {
                continue;
            }
            let translation = self.world_translation(id);
            if let Some(distance) = raycast_mesh(ray, &node.mesh, &node.local_bounds, translation) {
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(RayHit {
                        mesh: owner,
                        node: id,
                        distance,
                    });
                }
            }
        }

        best
    }

    // ---------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------

    /// Drop every node and map. Keys handed out before stay invalid.
    pub fn dispose(&mut self) {
        let released = self.nodes.len();
        self.nodes.clear();
        self.roots.clear();
        self.mesh_by_panel.clear();
        self.mesh_by_block.clear();
        self.mesh_by_furniture.clear();
        self.furniture_by_block.clear();
        self.mesh_by_extrusion.clear();
        self.owner_of.clear();
        self.block_of.clear();
        self.blocks.clear();
        self.palette.clear();
        self.model_bounds = Box3::empty();
        tracing::debug!(meshes = released, "Scene index disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::RenderMaterial;
    use nalgebra::Point3;
    use panelview_geometry::box_mesh;

    fn material() -> Arc<RenderMaterial> {
        Arc::new(RenderMaterial::new("ЛДСП", Color::rgb(1.0, 1.0, 1.0)))
    }

    fn cube(index: &mut SceneIndex, id: &str, at: Vector3<f64>) -> MeshId {
        let node = SceneNode::new(
            NodeKind::Panel,
            EntityRef::panel(id),
            box_mesh(Vector3::new(10.0, 10.0, 10.0)),
            at,
            material(),
            "ЛДСП",
        );
        let mesh = index.insert(node);
        index.register_panel(&RecordId::from(id), mesh);
        mesh
    }

    #[test]
    fn test_lookup_and_block_membership() {
        let mut index = SceneIndex::new();
        let a = cube(&mut index, "a", Vector3::zeros());
        let b = cube(&mut index, "b", Vector3::new(100.0, 0.0, 0.0));
        index.register_block_member(&"b1".into(), a);

        assert_eq!(index.get_mesh_for_panel("a"), Some(a));
        assert_eq!(index.get_mesh_for_panel("zzz"), None);
        assert_eq!(index.get_meshes_for_block("b1"), &[a]);
        assert!(index.get_meshes_for_block("b2").is_empty());
        assert_eq!(index.block_of(a).map(|b| b.as_str()), Some("b1"));
        assert_eq!(index.block_of(b), None);
        assert_eq!(index.get_mesh_for_entity(&EntityRef::panel("b")), Some(b));
        assert_eq!(index.get_mesh_for_entity(&EntityRef::block("b1")), None);
        assert_eq!(index.all_nodes().count(), 2);
    }

    #[test]
    fn test_child_follows_parent() {
        let mut index = SceneIndex::new();
        let panel = cube(&mut index, "a", Vector3::new(50.0, 0.0, 0.0));
        let strip = index
            .insert_child(
                panel,
                SceneNode::new(
                    NodeKind::EdgeBand,
                    EntityRef::panel("a"),
                    box_mesh(Vector3::new(1.0, 10.0, 10.0)),
                    Vector3::new(5.5, 0.0, 0.0),
                    material(),
                    "ЛДСП",
                ),
            )
            .unwrap();

        assert_eq!(index.owner_of(strip), Some(panel));
        assert_eq!(index.world_translation(strip), Vector3::new(55.5, 0.0, 0.0));
        assert_eq!(index.meshes(), &[panel]);

        index.set_visible(panel, false).unwrap();
        assert!(index.is_visible(strip));
        assert!(!index.is_effectively_visible(strip));
        assert!(index.compute_bounds(&[panel], BoundsMode::VisibleOnly).is_empty());

        let all = index.compute_bounds(&[panel], BoundsMode::All);
        assert_eq!(all.max.x, 56.0);
    }

    #[test]
    fn test_raycast_resolves_owner() {
        let mut index = SceneIndex::new();
        let near = cube(&mut index, "near", Vector3::new(0.0, 0.0, 0.0));
        let far = cube(&mut index, "far", Vector3::new(0.0, 0.0, -100.0));

        let ray = Ray::new(Point3::new(0.0, 0.0, 100.0), -Vector3::z()).unwrap();
        let hit = index.raycast(&ray, BoundsMode::VisibleOnly).unwrap();
        assert_eq!(hit.mesh, near);

        index.set_visible(near, false).unwrap();
        let hit = index.raycast(&ray, BoundsMode::VisibleOnly).unwrap();
        assert_eq!(hit.mesh, far);
        assert!((hit.distance - 195.0).abs() < 1e-3);
    }

    #[test]
    fn test_dispose_invalidates_keys() {
        let mut index = SceneIndex::new();
        let a = cube(&mut index, "a", Vector3::zeros());
        index.update_model_bounds();
        index.dispose();

        assert!(index.is_empty());
        assert!(!index.contains(a));
        assert!(index.model_bounds().is_empty());
        let b = cube(&mut index, "a", Vector3::zeros());
        assert_ne!(a, b);
        assert!(index.node(a).is_none());
    }
}
