// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scene operations.

use crate::keys::MeshId;

/// Result type alias for scene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or exploring a scene.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document could not be read at all.
    #[error("document error: {0}")]
    Document(#[from] panelview_core::Error),

    #[error("geometry error: {0}")]
    Geometry(#[from] panelview_geometry::Error),

    /// A load was requested while another one is still pending.
    #[error("a document load is already in progress")]
    LoadInProgress,

    /// The ticket does not belong to the pending load.
    #[error("no pending load matches this ticket")]
    NoPendingLoad,

    /// A camera fit or overlay was requested for an empty bounding volume.
    /// The update is skipped, nothing else changes.
    #[error("degenerate bounds for {0}")]
    DegenerateBounds(&'static str),

    #[error("mesh not found: {0:?}")]
    UnknownMesh(MeshId),

    #[error("block not found: {0}")]
    UnknownBlock(String),

    #[error("failed to serialize: {0}")]
    Serialization(String),
}
