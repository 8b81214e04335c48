// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::document::RecordKind;

/// Result type for document loading
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a model document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The document cannot be used at all: JSON does not parse, the top level
    /// is not an object, or neither a panels nor a blocks array is present.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A single record whose position or size does not resolve to numbers.
    /// Loading continues without it.
    #[error("Unresolvable {kind} record '{id}': {reason}")]
    UnresolvableRecord {
        kind: RecordKind,
        id: String,
        reason: String,
    },
}

impl Error {
    pub(crate) fn unresolvable(kind: RecordKind, id: &str, reason: impl Into<String>) -> Self {
        Error::UnresolvableRecord {
            kind,
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::MalformedDocument(format!("invalid JSON: {}", e))
    }
}
