// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical model document records
//!
//! Everything past the normalizer works on these types only. Field casing,
//! id representation and missing values have already been reconciled.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

/// Default position for records that carry none
pub const DEFAULT_POSITION: Coords3 = Coords3::new(0.0, 0.0, 0.0);

/// Default size for records that carry none (mm)
pub const DEFAULT_SIZE: Coords3 = Coords3::new(100.0, 100.0, 18.0);

/// Identifier of a document record, canonicalised to a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for RecordId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The four record families of a model document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Panel,
    Block,
    Furniture,
    Extrusion,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Panel => "panel",
            RecordKind::Block => "block",
            RecordKind::Furniture => "furniture",
            RecordKind::Extrusion => "extrusion",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed reference to a record. Identity only, never owns the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityRef {
    pub kind: RecordKind,
    pub id: RecordId,
}

impl EntityRef {
    pub fn new(kind: RecordKind, id: impl Into<RecordId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn panel(id: impl Into<RecordId>) -> Self {
        Self::new(RecordKind::Panel, id)
    }

    pub fn block(id: impl Into<RecordId>) -> Self {
        Self::new(RecordKind::Block, id)
    }

    pub fn furniture(id: impl Into<RecordId>) -> Self {
        Self::new(RecordKind::Furniture, id)
    }

    pub fn extrusion(id: impl Into<RecordId>) -> Self {
        Self::new(RecordKind::Extrusion, id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Three components in millimetres (position or size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coords3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coords3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Components sorted ascending
    pub fn sorted(self) -> [f64; 3] {
        let mut dims = self.to_array();
        dims.sort_by(|a, b| a.total_cmp(b));
        dims
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Point in a panel-local or profile plane (mm)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// One edge-banding run along a panel edge, in panel-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeSegment {
    pub start: Point2D,
    pub end: Point2D,
}

impl EdgeSegment {
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }
}

/// Panel material
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Material {
    /// Name as exported, article code included
    pub raw_name: String,
    /// Display name, see [`normalize_material_name`]
    pub name: String,
    pub thickness: Option<f64>,
}

impl Material {
    pub fn new(raw_name: &str, thickness: Option<f64>) -> Self {
        Self {
            raw_name: raw_name.to_string(),
            name: normalize_material_name(raw_name),
            thickness,
        }
    }
}

/// Strip the article code appended after the first carriage return and trim.
///
/// `"Дуб\rART-4521"` becomes `"Дуб"`.
pub fn normalize_material_name(raw: &str) -> String {
    let head = match raw.find('\r') {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    head.trim().to_string()
}

/// Where a panel's thickness came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ThicknessSource {
    /// `highZ - lowZ`, authoritative
    GeometryBounds,
    /// `material.thickness`
    Material,
    /// Smallest size dimension. Compensates an upstream export bug and can be
    /// wrong for very thin, long panels.
    SizeFallback,
}

/// Resolve panel thickness: `highZ - lowZ`, then material thickness, then the
/// smallest of the three size dimensions.
pub fn resolve_thickness(
    high_z: Option<f64>,
    low_z: Option<f64>,
    material_thickness: Option<f64>,
    size: Coords3,
) -> (f64, ThicknessSource) {
    if let (Some(high), Some(low)) = (high_z, low_z) {
        let t = high - low;
        if t.is_finite() && t > 0.0 {
            return (t, ThicknessSource::GeometryBounds);
        }
    }
    if let Some(t) = material_thickness {
        if t.is_finite() && t > 0.0 {
            return (t, ThicknessSource::Material);
        }
    }
    (size.sorted()[0], ThicknessSource::SizeFallback)
}

/// A flat rectangular component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: RecordId,
    /// Display label, distinct from the id
    pub position_number: String,
    pub name: String,
    /// Min corner of the panel box
    pub position: Coords3,
    pub size: Coords3,
    pub high_z: Option<f64>,
    pub low_z: Option<f64>,
    pub material: Material,
    pub edges: Vec<EdgeSegment>,
    pub has_contour: bool,
    pub has_grooves: bool,
    pub has_notches: bool,
    /// Block that lists this panel, if any
    pub parent_block: Option<RecordId>,
}

impl Panel {
    pub fn thickness(&self) -> f64 {
        self.thickness_with_source().0
    }

    pub fn thickness_with_source(&self) -> (f64, ThicknessSource) {
        resolve_thickness(self.high_z, self.low_z, self.material.thickness, self.size)
    }

    /// Largest size dimension
    pub fn length(&self) -> f64 {
        self.size.sorted()[2]
    }

    /// Second largest size dimension
    pub fn width(&self) -> f64 {
        self.size.sorted()[1]
    }

    /// Material area covered by the panel: both large faces, in m²
    pub fn area_m2(&self) -> f64 {
        2.0 * self.length() * self.width() / 1_000_000.0
    }

    /// Total edge-banding run length (mm)
    pub fn edge_length_mm(&self) -> f64 {
        self.edges.iter().map(EdgeSegment::length).sum()
    }

    /// Any contour, groove or notch machining present
    pub fn has_machining(&self) -> bool {
        self.has_contour || self.has_grooves || self.has_notches
    }
}

/// Named grouping of panels and furniture (one assembled sub-unit)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: RecordId,
    pub name: String,
    pub child_panel_ids: Vec<RecordId>,
    pub child_furniture_ids: Vec<RecordId>,
}

/// Hardware item (handle, hinge, leg...)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Furniture {
    pub id: RecordId,
    pub name: String,
    /// Type string as exported
    pub kind: String,
    pub position: Coords3,
    pub size: Coords3,
    pub parent_block_id: Option<RecordId>,
}

/// Linear profile swept from a 2D contour
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtrusionProfile {
    pub id: RecordId,
    pub name: String,
    /// Swept length (mm)
    pub thickness: f64,
    pub contour: Vec<Point2D>,
    pub position: Coords3,
    pub material: Option<String>,
}

/// A record dropped during loading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub kind: RecordKind,
    pub id: String,
    pub reason: String,
}

/// Text encoding the document was read with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Windows1251,
}

/// Normalized, immutable model document
#[derive(Debug, Clone, Default)]
pub struct ModelDocument {
    blocks: Vec<Block>,
    panels: Vec<Panel>,
    furniture: Vec<Furniture>,
    extrusions: Vec<ExtrusionProfile>,
    skipped: Vec<SkippedRecord>,
    encoding: TextEncoding,

    block_index: FxHashMap<RecordId, usize>,
    panel_index: FxHashMap<RecordId, usize>,
    furniture_index: FxHashMap<RecordId, usize>,
    extrusion_index: FxHashMap<RecordId, usize>,
}

impl ModelDocument {
    /// Assemble a document and back-fill block membership on panels and
    /// furniture. The first block listing a record wins.
    pub fn new(
        blocks: Vec<Block>,
        mut panels: Vec<Panel>,
        mut furniture: Vec<Furniture>,
        extrusions: Vec<ExtrusionProfile>,
    ) -> Self {
        let mut panel_owner: FxHashMap<&RecordId, &RecordId> = FxHashMap::default();
        let mut furniture_owner: FxHashMap<&RecordId, &RecordId> = FxHashMap::default();
        for block in &blocks {
            for pid in &block.child_panel_ids {
                panel_owner.entry(pid).or_insert(&block.id);
            }
            for fid in &block.child_furniture_ids {
                furniture_owner.entry(fid).or_insert(&block.id);
            }
        }

        for panel in &mut panels {
            panel.parent_block = panel_owner.get(&panel.id).map(|b| (*b).clone());
        }
        for item in &mut furniture {
            if item.parent_block_id.is_none() {
                item.parent_block_id = furniture_owner.get(&item.id).map(|b| (*b).clone());
            }
        }

        let block_index = index_by_id(&blocks, |b| &b.id);
        let panel_index = index_by_id(&panels, |p| &p.id);
        let furniture_index = index_by_id(&furniture, |f| &f.id);
        let extrusion_index = index_by_id(&extrusions, |e| &e.id);

        Self {
            blocks,
            panels,
            furniture,
            extrusions,
            skipped: Vec::new(),
            encoding: TextEncoding::Utf8,
            block_index,
            panel_index,
            furniture_index,
            extrusion_index,
        }
    }

    pub(crate) fn with_skipped(mut self, skipped: Vec<SkippedRecord>) -> Self {
        self.skipped = skipped;
        self
    }

    pub(crate) fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn furniture(&self) -> &[Furniture] {
        &self.furniture
    }

    pub fn extrusions(&self) -> &[ExtrusionProfile] {
        &self.extrusions
    }

    /// Records dropped by the normalizer
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.block_index.get(id).map(|&i| &self.blocks[i])
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panel_index.get(id).map(|&i| &self.panels[i])
    }

    pub fn furniture_item(&self, id: &str) -> Option<&Furniture> {
        self.furniture_index.get(id).map(|&i| &self.furniture[i])
    }

    pub fn extrusion(&self, id: &str) -> Option<&ExtrusionProfile> {
        self.extrusion_index.get(id).map(|&i| &self.extrusions[i])
    }

    /// Zero-based position of a block in document order
    pub fn block_position(&self, id: &str) -> Option<usize> {
        self.block_index.get(id).copied()
    }

    /// Panels that no block lists
    pub fn orphan_panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter(|p| p.parent_block.is_none())
    }

    /// Furniture items that belong to no block
    pub fn orphan_furniture(&self) -> impl Iterator<Item = &Furniture> {
        self.furniture.iter().filter(|f| f.parent_block_id.is_none())
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty() && self.furniture.is_empty() && self.extrusions.is_empty()
    }
}

fn index_by_id<T>(items: &[T], id: impl Fn(&T) -> &RecordId) -> FxHashMap<RecordId, usize> {
    let mut index = FxHashMap::with_capacity_and_hasher(items.len(), Default::default());
    for (i, item) in items.iter().enumerate() {
        // Duplicate ids: first record wins
        index.entry(id(item).clone()).or_insert(i);
    }
    index
}
