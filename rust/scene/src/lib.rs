// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # PanelView Scene
//!
//! Interactive exploration of a loaded furniture model: the scene index
//! over generated meshes, selection with highlight, visibility, the
//! structure tree, perspective/orthographic cameras, exploded view,
//! labels and dimension lines, material summaries and the assembly guide.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use panelview_scene::{SelectMode, Viewer, ViewDirection};
//!
//! let mut viewer = Viewer::from_env();
//! let report = viewer.load_bytes(&std::fs::read("kitchen.json")?)?;
//! println!("{} meshes, {} skipped", report.mesh_count(), report.skipped.len());
//!
//! viewer.set_viewport(1280.0, 720.0);
//! viewer.pick(nalgebra::Point2::new(0.1, -0.2), SelectMode::Replace);
//! viewer.set_view(ViewDirection::Top)?;
//! let overlay = viewer.frame();
//! ```

pub mod builder;
pub mod camera;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod explode;
pub mod guide;
pub mod index;
pub mod keys;
pub mod labels;
pub mod material;
pub mod overlay;
pub mod selection;
pub mod summary;
pub mod tree;
pub mod viewer;

pub use builder::{build, populate, BuildReport};
pub use camera::{Camera, CameraMode, CameraRig, Projection, ViewDirection};
pub use config::ViewerConfig;
pub use dimensions::{dimension_lines, DimensionLine};
pub use error::{Error, Result};
pub use explode::ExplodeState;
pub use guide::AssemblyGuide;
pub use index::{BoundsMode, NodeKind, RayHit, SceneIndex, SceneNode};
pub use keys::MeshId;
pub use labels::{compute_labels, refresh_occlusion, Label, LabelKind};
pub use material::{color_for_name, Color, MaterialPalette, RenderMaterial};
pub use overlay::Overlay;
pub use selection::{SelectMode, Selection};
pub use summary::{material_summary, MaterialSummaryEntry, SummaryScope};
pub use tree::{RowId, RowKind, StructureTree, TreeRow};
pub use viewer::{LoadTicket, Viewer};
