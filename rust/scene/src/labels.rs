// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Block and panel labels for perspective views.

use nalgebra::Point3;
use panelview_core::{EntityRef, ModelDocument};
use panelview_geometry::Ray;
use serde::Serialize;
use smallvec::SmallVec;

use crate::index::{BoundsMode, SceneIndex};
use crate::keys::MeshId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Block,
    Panel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub kind: LabelKind,
    pub entity: EntityRef,
    pub text: String,
    pub position: Point3<f64>,
    /// Cleared while the label sits behind other geometry
    pub visible: bool,
    /// Meshes the label belongs to; they never occlude it
    #[serde(skip)]
    pub owners: SmallVec<[MeshId; 8]>,
}

/// One label per block with visible content, numbered by document order
pub fn block_labels(doc: &ModelDocument, index: &SceneIndex) -> Vec<Label> {
    doc.blocks()
        .iter()
        .enumerate()
        .filter_map(|(i, block)| {
            let meshes = index.get_meshes_for_block(block.id.as_str());
            let bounds = index.compute_bounds(meshes, BoundsMode::VisibleOnly);
            if bounds.is_empty() {
                return None;
            }
            Some(Label {
                kind: LabelKind::Block,
                entity: EntityRef::block(block.id.clone()),
                text: (i + 1).to_string(),
                position: bounds.center(),
                visible: true,
                owners: meshes.iter().copied().collect(),
            })
        })
        .collect()
}

/// Position-number labels for the visible panels of one block
pub fn panel_labels(doc: &ModelDocument, index: &SceneIndex, block_id: &str) -> Vec<Label> {
    let Some(block) = doc.block(block_id) else {
        return Vec::new();
    };
    block
        .child_panel_ids
        .iter()
        .filter_map(|pid| {
            let panel = doc.panel(pid.as_str())?;
            if panel.position_number.is_empty() {
                return None;
            }
            let mesh = index.get_mesh_for_panel(pid.as_str())?;
            if index.block_of(mesh).map(|b| b.as_str()) != Some(block_id)
                || !index.is_effectively_visible(mesh)
            {
                return None;
            }
            Some(Label {
                kind: LabelKind::Panel,
                entity: EntityRef::panel(pid.clone()),
                text: panel.position_number.clone(),
                position: index.node_bounds(mesh).center(),
                visible: true,
                owners: SmallVec::from_slice(&[mesh]),
            })
        })
        .collect()
}

/// Blocks with at least one visible mesh, in document order
pub fn visible_blocks<'a>(doc: &'a ModelDocument, index: &SceneIndex) -> Vec<&'a str> {
    doc.blocks()
        .iter()
        .map(|b| b.id.as_str())
        .filter(|id| {
            index
                .get_meshes_for_block(id)
                .iter()
                .any(|&m| index.is_effectively_visible(m))
        })
        .collect()
}

/// Panel labels when exactly one block is visible, block labels otherwise
pub fn compute_labels(doc: &ModelDocument, index: &SceneIndex) -> Vec<Label> {
    match visible_blocks(doc, index).as_slice() {
        [single] => panel_labels(doc, index, single),
        _ => block_labels(doc, index),
    }
}

/// Hide labels with geometry strictly between the eye and the label.
/// `epsilon` absorbs hits on the label's own surface.
pub fn refresh_occlusion(labels: &mut [Label], index: &SceneIndex, eye: Point3<f64>, epsilon: f64) {
    for label in labels {
        let distance = (label.position - eye).norm();
        let Some(ray) = Ray::between(eye, label.position) else {
            label.visible = true;
            continue;
        };
        let hit = index.raycast_filtered(&ray, BoundsMode::VisibleOnly, |owner| {
            !label.owners.contains(&owner)
        });
        label.visible = !hit.is_some_and(|h| h.distance < distance - epsilon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::config::ViewerConfig;
    use panelview_core::parse_document;

    const DOC: &str = r#"{
        "blocks": [
            {"id": "b1", "childPanelIds": ["p1", "p2"]},
            {"id": "b2", "childPanelIds": ["p3"]},
            {"id": "b3", "childPanelIds": []}
        ],
        "panels": [
            {"id": "p1", "positionNumber": "1", "position": {"x": 0, "y": 0, "z": 0}, "size": {"x": 100, "y": 100, "z": 10}},
            {"id": "p2", "positionNumber": "", "position": {"x": 0, "y": 0, "z": 50}, "size": {"x": 100, "y": 100, "z": 10}},
            {"id": "p3", "positionNumber": "7", "position": {"x": 0, "y": 0, "z": 200}, "size": {"x": 100, "y": 100, "z": 10}}
        ]
    }"#;

    fn setup() -> (ModelDocument, SceneIndex) {
        let doc = parse_document(DOC).unwrap();
        let (index, _) = build(&doc, &ViewerConfig::default());
        (doc, index)
    }

    #[test]
    fn test_block_labels_skip_empty_blocks() {
        let (doc, index) = setup();
        let labels = compute_labels(&doc, &index);
        let texts: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "2"]);
        assert_eq!(labels[0].position, Point3::new(50.0, 50.0, 30.0));
    }

    #[test]
    fn test_single_visible_block_shows_panel_labels() {
        let (doc, mut index) = setup();
        let p3 = index.get_mesh_for_panel("p3").unwrap();
        index.set_visible(p3, false).unwrap();

        let labels = compute_labels(&doc, &index);
        // p2 has no position number
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].kind, LabelKind::Panel);
        assert_eq!(labels[0].text, "1");
    }

    #[test]
    fn test_occlusion() {
        let (doc, index) = setup();
        let mut labels = block_labels(&doc, &index);

        // Looking down -Z from above: block 2 sits in front of block 1
        refresh_occlusion(&mut labels, &index, Point3::new(50.0, 50.0, 1000.0), 1e-3);
        assert!(!labels[0].visible);
        assert!(labels[1].visible);

        // From below the order flips
        refresh_occlusion(&mut labels, &index, Point3::new(50.0, 50.0, -1000.0), 1e-3);
        assert!(labels[0].visible);
        assert!(!labels[1].visible);
    }
}
