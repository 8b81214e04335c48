// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # PanelView Core
//!
//! Reader for furniture CAD exports. Takes the raw bytes of a model
//! document and produces a normalized, immutable [`ModelDocument`].
//!
//! ## Overview
//!
//! - **Decoding**: UTF-8 with a Windows-1251 fallback for legacy exports
//! - **Normalization**: dual-cased field names (`position`/`Position`,
//!   `x`/`X`) reconciled into one canonical schema
//! - **Partial loads**: records whose position or size cannot be resolved
//!   are skipped and reported, the rest of the document still loads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use panelview_core::load_document;
//!
//! let bytes = std::fs::read("kitchen.json")?;
//! let doc = load_document(&bytes)?;
//!
//! for panel in doc.panels() {
//!     println!("{} {}: {} mm", panel.position_number, panel.material.name, panel.thickness());
//! }
//! for skipped in doc.skipped() {
//!     println!("skipped {} {}: {}", skipped.kind, skipped.id, skipped.reason);
//! }
//! ```

pub mod document;
pub mod encoding;
pub mod error;
mod fields;
pub mod normalize;

pub use document::{
    normalize_material_name, resolve_thickness, Block, Coords3, EdgeSegment, EntityRef,
    ExtrusionProfile, Furniture, Material, ModelDocument, Panel, Point2D, RecordId, RecordKind,
    SkippedRecord, TextEncoding, ThicknessSource, DEFAULT_POSITION, DEFAULT_SIZE,
};
pub use encoding::{decode_text, looks_misdecoded, DecodedText};
pub use error::{Error, Result};
pub use normalize::{load_document, normalize, parse_document};
