// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer facade: document lifecycle and the operations the UI calls.
//!
//! Loading is two-phase. [`Viewer::begin_load`] hands out a ticket while the
//! host fetches bytes; [`Viewer::complete_load`] parses them and only then
//! tears the previous scene down, so a document that fails to parse leaves
//! the current scene in place.
//!
//! Overlays are recomputed lazily by [`Viewer::frame`], the single per-frame
//! step the host drives.

use nalgebra::Point2;
use panelview_core::{load_document, ModelDocument};

use crate::builder::{populate, BuildReport};
use crate::camera::{CameraMode, CameraRig, ViewDirection};
use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::explode::ExplodeState;
use crate::guide::AssemblyGuide;
use crate::index::{BoundsMode, SceneIndex};
use crate::keys::MeshId;
use crate::labels::refresh_occlusion;
use crate::overlay::Overlay;
use crate::selection::{SelectMode, Selection};
use crate::summary::{scoped_summary, MaterialSummaryEntry, SummaryScope};
use crate::tree::{RowId, StructureTree};

/// Distance below which a hit counts as the label's own surface
const OCCLUSION_EPSILON: f64 = 1.0;

/// Handle for one pending load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug)]
pub struct Viewer {
    config: ViewerConfig,
    document: Option<ModelDocument>,
    index: SceneIndex,
    selection: Selection,
    tree: StructureTree,
    camera: CameraRig,
    explode: ExplodeState,
    guide: AssemblyGuide,
    overlay: Overlay,
    overlay_dirty: bool,
    overlay_revision: u64,
    pending: Option<u64>,
    next_ticket: u64,
    last_report: Option<BuildReport>,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            selection: Selection::new(config.highlight_color),
            camera: CameraRig::new(&config),
            explode: ExplodeState::new(config.explode_factor),
            config,
            document: None,
            index: SceneIndex::new(),
            tree: StructureTree::default(),
            guide: AssemblyGuide::new(),
            overlay: Overlay::None,
            overlay_dirty: true,
            overlay_revision: 0,
            pending: None,
            next_ticket: 0,
            last_report: None,
        }
    }

    /// Viewer configured from `PANELVIEW_*` environment variables
    pub fn from_env() -> Self {
        Self::new(ViewerConfig::from_env())
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Reserve the loader. Fails while another load is pending.
    pub fn begin_load(&mut self) -> Result<LoadTicket> {
        if self.pending.is_some() {
            return Err(Error::LoadInProgress);
        }
        self.next_ticket += 1;
        self.pending = Some(self.next_ticket);
        tracing::debug!(ticket = self.next_ticket, "Load started");
        Ok(LoadTicket(self.next_ticket))
    }

    /// Parse `bytes` and replace the scene with it. The pending load ends
    /// either way; on a parse error the previous scene stays.
    pub fn complete_load(&mut self, ticket: LoadTicket, bytes: &[u8]) -> Result<&BuildReport> {
        if self.pending != Some(ticket.0) {
            return Err(Error::NoPendingLoad);
        }
        self.pending = None;

        let document = match load_document(bytes) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "Document rejected, keeping current scene");
                return Err(e.into());
            }
        };

        self.reset_state();
        let report = populate(&mut self.index, &document, &self.config);
        self.tree = StructureTree::build(&document, &self.index);
        self.document = Some(document);

        let bounds = self.index.model_bounds();
        if let Err(e) = self.camera.set_view(ViewDirection::Front, &bounds) {
            tracing::debug!(error = %e, "Empty model, camera not framed");
        }

        Ok(&*self.last_report.insert(report))
    }

    /// Give up a pending load without touching the scene
    pub fn abort_load(&mut self, ticket: LoadTicket) -> Result<()> {
        if self.pending != Some(ticket.0) {
            return Err(Error::NoPendingLoad);
        }
        self.pending = None;
        tracing::debug!(ticket = ticket.0, "Load aborted");
        Ok(())
    }

    /// `begin_load` and `complete_load` in one call
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<&BuildReport> {
        let ticket = self.begin_load()?;
        self.complete_load(ticket, bytes)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the scene and every piece of state derived from it
    pub fn reset_state(&mut self) {
        self.selection.reset();
        self.explode.reset();
        self.guide.exit();
        self.index.dispose();
        self.tree = StructureTree::default();
        self.document = None;
        self.last_report = None;
        self.overlay = Overlay::None;
        self.overlay_dirty = true;
        self.camera.reset(&self.config);
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&ModelDocument> {
        self.document.as_ref()
    }

    pub fn index(&self) -> &SceneIndex {
        &self.index
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tree(&self) -> &StructureTree {
        &self.tree
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn explode_state(&self) -> &ExplodeState {
        &self.explode
    }

    pub fn guide(&self) -> &AssemblyGuide {
        &self.guide
    }

    /// Overlay as of the last frame
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn last_report(&self) -> Option<&BuildReport> {
        self.last_report.as_ref()
    }

    // ---------------------------------------------------------------
    // Selection and visibility
    // ---------------------------------------------------------------

    /// Select whatever is under a point in normalized device coordinates.
    /// A miss clears the selection in replace mode.
    pub fn pick(&mut self, ndc: Point2<f64>, mode: SelectMode) -> Option<MeshId> {
        let hit = self
            .camera
            .active()
            .ray_through(ndc)
            .and_then(|ray| self.index.raycast(&ray, BoundsMode::VisibleOnly));

        match hit {
            Some(hit) => self.selection.select(&mut self.index, &[hit.mesh], mode),
            None if mode == SelectMode::Replace => self.selection.clear(&mut self.index),
            None => {}
        }
        self.tree.sync_highlight(&self.selection);
        hit.map(|h| h.mesh)
    }

    pub fn select(&mut self, ids: &[MeshId], mode: SelectMode) {
        self.selection.select(&mut self.index, ids, mode);
        self.tree.sync_highlight(&self.selection);
    }

    pub fn select_block(&mut self, block_id: &str, mode: SelectMode) -> Result<()> {
        self.selection.select_block(&mut self.index, block_id, mode)?;
        self.tree.sync_highlight(&self.selection);
        Ok(())
    }

    pub fn select_by_material(&mut self, material_name: &str) -> usize {
        let count = self.selection.select_by_material(&mut self.index, material_name);
        self.tree.sync_highlight(&self.selection);
        count
    }

    /// Select the meshes behind a tree row
    pub fn click_row(&mut self, row: RowId, mode: SelectMode) -> bool {
        let meshes = self.tree.meshes_for_row(row).to_vec();
        if meshes.is_empty() {
            return false;
        }
        self.selection.select_group(&mut self.index, &meshes, mode);
        self.tree.sync_highlight(&self.selection);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear(&mut self.index);
        self.tree.sync_highlight(&self.selection);
    }

    pub fn set_visible(&mut self, id: MeshId, visible: bool) -> Result<()> {
        self.selection.set_visible(&mut self.index, id, visible)?;
        self.visibility_changed();
        Ok(())
    }

    pub fn show_only_selected(&mut self) -> bool {
        let applied = self.selection.show_only_selected(&mut self.index);
        if applied {
            self.visibility_changed();
        }
        applied
    }

    pub fn hide_selected(&mut self) -> bool {
        let applied = self.selection.hide_selected(&mut self.index);
        if applied {
            self.visibility_changed();
        }
        applied
    }

    pub fn show_all(&mut self) {
        self.selection.show_all(&mut self.index);
        self.visibility_changed();
    }

    fn visibility_changed(&mut self) {
        self.tree.sync_visibility(&self.index);
        self.overlay_dirty = true;
    }

    // ---------------------------------------------------------------
    // Camera and exploded view
    // ---------------------------------------------------------------

    /// Look at the visible content from a canonical direction
    pub fn set_view(&mut self, view: ViewDirection) -> Result<()> {
        let bounds = self.index.visible_bounds();
        self.camera.set_view(view, &bounds)
    }

    pub fn toggle_camera_mode(&mut self) -> CameraMode {
        self.camera.toggle_mode()
    }

    /// Frame the selection, hidden members included
    pub fn fit_selection(&mut self) -> Result<()> {
        let bounds = self
            .index
            .compute_bounds(self.selection.selected(), BoundsMode::All);
        self.camera.fit_bounds(&bounds)
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.camera.set_viewport(width, height);
    }

    pub fn toggle_explode(&mut self) -> bool {
        let active = self.explode.toggle(&mut self.index);
        self.overlay_dirty = true;
        active
    }

    pub fn set_explode_factor(&mut self, factor: f64) {
        self.explode.set_factor(&mut self.index, factor);
        self.overlay_dirty = true;
    }

    // ---------------------------------------------------------------
    // Assembly guide
    // ---------------------------------------------------------------

    pub fn start_guide(&mut self) -> bool {
        if !self.guide.start(&self.index) {
            return false;
        }
        self.apply_guide();
        true
    }

    pub fn next_step(&mut self) -> bool {
        let moved = self.guide.next_step();
        if moved {
            self.apply_guide();
        }
        moved
    }

    pub fn prev_step(&mut self) -> bool {
        let moved = self.guide.prev_step();
        if moved {
            self.apply_guide();
        }
        moved
    }

    pub fn go_to_step(&mut self, step: usize) -> bool {
        let moved = self.guide.go_to(step);
        if moved {
            self.apply_guide();
        }
        moved
    }

    /// Leave the guide and show everything
    pub fn exit_guide(&mut self) {
        if !self.guide.is_active() {
            return;
        }
        self.guide.exit();
        self.show_all();
    }

    fn apply_guide(&mut self) {
        self.guide.apply(&mut self.index, &mut self.selection);
        self.visibility_changed();
    }

    // ---------------------------------------------------------------
    // Summary
    // ---------------------------------------------------------------

    pub fn material_summary(&self, scope: SummaryScope) -> Vec<MaterialSummaryEntry> {
        match &self.document {
            Some(doc) => scoped_summary(doc, &self.index, &self.selection, scope),
            None => Vec::new(),
        }
    }

    /// Summary as JSON for the UI layer
    pub fn summary_json(&self, scope: SummaryScope) -> Result<String> {
        serde_json::to_string(&self.material_summary(scope))
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    // ---------------------------------------------------------------
    // Per-frame step
    // ---------------------------------------------------------------

    /// Bring the overlay up to date. Recomputes when content or camera
    /// changed; refreshes label occlusion while the guide runs.
    pub fn frame(&mut self) -> &Overlay {
        let revision = self.camera.revision();
        if self.overlay_dirty || revision != self.overlay_revision {
            self.overlay = match &self.document {
                Some(doc) => Overlay::compute(
                    doc,
                    &self.index,
                    &self.camera,
                    self.config.dimension_clearance,
                ),
                None => Overlay::None,
            };
            self.overlay_dirty = false;
            self.overlay_revision = revision;
        }

        if self.guide.is_active() {
            let eye = self.camera.active().position;
            if let Some(labels) = self.overlay.labels_mut() {
                refresh_occlusion(labels, &self.index, eye, OCCLUSION_EPSILON);
            }
        }

        &self.overlay
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
