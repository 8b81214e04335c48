// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Builder: turns a normalized document into scene nodes.
//!
//! Records whose geometry cannot be produced are skipped with a warning and
//! listed in the [`BuildReport`]; the rest of the document still loads.

use std::time::{Duration, Instant};

use panelview_core::{EntityRef, ModelDocument, RecordKind, SkippedRecord};
use panelview_geometry::{build_extrusion, build_furniture, build_panel};

use crate::config::ViewerConfig;
use crate::index::{NodeKind, SceneIndex, SceneNode};

/// What a build produced
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub panels: usize,
    pub edge_bands: usize,
    pub furniture: usize,
    pub extrusions: usize,
    /// Records dropped by the normalizer or the builder
    pub skipped: Vec<SkippedRecord>,
    pub elapsed: Duration,
}

impl BuildReport {
    /// Top-level meshes created
    pub fn mesh_count(&self) -> usize {
        self.panels + self.furniture + self.extrusions
    }
}

/// Build a fresh index for `doc`
pub fn build(doc: &ModelDocument, config: &ViewerConfig) -> (SceneIndex, BuildReport) {
    let mut index = SceneIndex::new();
    let report = populate(&mut index, doc, config);
    (index, report)
}

/// Fill an empty index with the meshes of `doc`.
///
/// The index should have been disposed first; existing nodes are kept.
pub fn populate(index: &mut SceneIndex, doc: &ModelDocument, config: &ViewerConfig) -> BuildReport {
    let start = Instant::now();
    let mut report = BuildReport {
        skipped: doc.skipped().to_vec(),
        ..Default::default()
    };

    index.set_blocks(doc.blocks().iter().map(|b| b.id.clone()).collect());

    for panel in doc.panels() {
        if index.get_mesh_for_panel(panel.id.as_str()).is_some() {
            continue;
        }
        let geometry = match build_panel(panel, config.edge_band_depth) {
            Ok(g) => g,
            Err(e) => {
                skip(&mut report, RecordKind::Panel, panel.id.as_str(), e.to_string());
                continue;
            }
        };

        let name = panel.material.name.as_str();
        let body = index.palette_mut().panel_material(name);
        let band = index.palette_mut().edge_band_material(name);

        let mesh = index.insert(SceneNode::new(
            NodeKind::Panel,
            EntityRef::panel(panel.id.clone()),
            geometry.body,
            geometry.center.coords,
            body,
            name,
        ));
        index.register_panel(&panel.id, mesh);

        for strip in geometry.edge_strips {
            let child = SceneNode::new(
                NodeKind::EdgeBand,
                EntityRef::panel(panel.id.clone()),
                strip.mesh,
                strip.offset,
                band.clone(),
                name,
            );
            if index.insert_child(mesh, child).is_ok() {
                report.edge_bands += 1;
            }
        }

        if let Some(block) = &panel.parent_block {
            index.register_block_member(block, mesh);
        }
        report.panels += 1;
    }

    for item in doc.furniture() {
        if index.get_mesh_for_furniture(item.id.as_str()).is_some() {
            continue;
        }
        let geometry = match build_furniture(item) {
            Ok(g) => g,
            Err(e) => {
                skip(&mut report, RecordKind::Furniture, item.id.as_str(), e.to_string());
                continue;
            }
        };

        let material = index.palette_mut().furniture_material();
        let mesh = index.insert(SceneNode::new(
            NodeKind::Furniture,
            EntityRef::furniture(item.id.clone()),
            geometry.mesh,
            geometry.center.coords,
            material,
            geometry.kind.as_str(),
        ));
        index.register_furniture(&item.id, mesh);

        // Furniture pointing at a block the document lacks stays unassigned
        match &item.parent_block_id {
            Some(block) if doc.block(block.as_str()).is_some() => {
                index.register_block_furniture(block, mesh);
            }
            Some(block) => {
                tracing::debug!(furniture = %item.id, block = %block, "Furniture references unknown block");
            }
            None => {}
        }
        report.furniture += 1;
    }

    for profile in doc.extrusions() {
        if index.get_mesh_for_extrusion(profile.id.as_str()).is_some() {
            continue;
        }
        let geometry = match build_extrusion(profile) {
            Ok(g) => g,
            Err(e) => {
                skip(&mut report, RecordKind::Extrusion, profile.id.as_str(), e.to_string());
                continue;
            }
        };

        let name = profile.material.as_deref();
        let material = index.palette_mut().profile_material(name);
        let mesh = index.insert(SceneNode::new(
            NodeKind::Extrusion,
            EntityRef::extrusion(profile.id.clone()),
            geometry.mesh,
            geometry.center.coords,
            material,
            name.unwrap_or_default(),
        ));
        index.register_extrusion(&profile.id, mesh);
        report.extrusions += 1;
    }

    let bounds = index.update_model_bounds();
    report.elapsed = start.elapsed();

    tracing::info!(
        panels = report.panels,
        edge_bands = report.edge_bands,
        furniture = report.furniture,
        extrusions = report.extrusions,
        skipped = report.skipped.len(),
        size_x = bounds.size().x,
        size_y = bounds.size().y,
        size_z = bounds.size().z,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Scene built"
    );

    report
}

fn skip(report: &mut BuildReport, kind: RecordKind, id: &str, reason: String) {
    tracing::warn!(kind = %kind, id = %id, reason = %reason, "Skipping record without geometry");
    report.skipped.push(SkippedRecord {
        kind,
        id: id.to_string(),
        reason,
    });
}
