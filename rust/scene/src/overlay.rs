// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Screen overlay: labels in perspective, dimensions in orthographic.
//! The two are never shown together.

use panelview_core::ModelDocument;
use serde::Serialize;

use crate::camera::{CameraMode, CameraRig};
use crate::dimensions::{dimension_lines, DimensionLine};
use crate::index::SceneIndex;
use crate::labels::{compute_labels, Label};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum Overlay {
    #[default]
    None,
    Labels(Vec<Label>),
    Dimensions(Vec<DimensionLine>),
}

impl Overlay {
    /// Overlay for the current camera mode and visible content
    pub fn compute(
        doc: &ModelDocument,
        index: &SceneIndex,
        rig: &CameraRig,
        dimension_clearance: f64,
    ) -> Self {
        match rig.mode() {
            CameraMode::Orthographic => {
                let bounds = index.visible_bounds();
                match dimension_lines(&bounds, rig.view_direction(), dimension_clearance) {
                    Ok(lines) => Overlay::Dimensions(lines.to_vec()),
                    Err(e) => {
                        tracing::debug!(error = %e, "No dimensions for this frame");
                        Overlay::None
                    }
                }
            }
            CameraMode::Perspective => Overlay::Labels(compute_labels(doc, index)),
        }
    }

    pub fn labels(&self) -> &[Label] {
        match self {
            Overlay::Labels(labels) => labels.as_slice(),
            _ => &[],
        }
    }

    pub fn labels_mut(&mut self) -> Option<&mut [Label]> {
        match self {
            Overlay::Labels(labels) => Some(labels.as_mut_slice()),
            _ => None,
        }
    }

    pub fn dimensions(&self) -> &[DimensionLine] {
        match self {
            Overlay::Dimensions(lines) => lines.as_slice(),
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::camera::ViewDirection;
    use crate::config::ViewerConfig;
    use panelview_core::parse_document;

    const DOC: &str = r#"{
        "blocks": [{"id": "b1", "childPanelIds": ["p1"]}, {"id": "b2", "childPanelIds": ["p2"]}],
        "panels": [
            {"id": "p1", "positionNumber": "1", "size": {"x": 600, "y": 400, "z": 18}},
            {"id": "p2", "positionNumber": "2", "position": {"x": 0, "y": 0, "z": 300}, "size": {"x": 600, "y": 400, "z": 18}}
        ]
    }"#;

    #[test]
    fn test_mode_decides_overlay() {
        let config = ViewerConfig::default();
        let doc = parse_document(DOC).unwrap();
        let (index, _) = build(&doc, &config);
        let mut rig = CameraRig::new(&config);
        rig.set_view(ViewDirection::Front, &index.visible_bounds()).unwrap();

        let overlay = Overlay::compute(&doc, &index, &rig, 40.0);
        assert_eq!(overlay.labels().len(), 2);
        assert!(overlay.dimensions().is_empty());

        rig.toggle_mode();
        let overlay = Overlay::compute(&doc, &index, &rig, 40.0);
        assert!(overlay.labels().is_empty());
        assert_eq!(overlay.dimensions().len(), 2);
        assert_eq!(overlay.dimensions()[0].text, "600");

        let json = serde_json::to_value(&overlay).unwrap();
        assert_eq!(json["kind"], "dimensions");
        assert_eq!(json["items"][1]["axis"], "y");
        assert_eq!(json["items"][1]["text"], "400");
    }

    #[test]
    fn test_nothing_visible_means_no_dimensions() {
        let config = ViewerConfig::default();
        let doc = parse_document(DOC).unwrap();
        let (mut index, _) = build(&doc, &config);
        for id in index.meshes().to_vec() {
            index.set_visible(id, false).unwrap();
        }
        let mut rig = CameraRig::new(&config);
        rig.toggle_mode();

        assert_eq!(Overlay::compute(&doc, &index, &rig, 40.0), Overlay::None);
    }
}
