// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene node keys.
//!
//! Keys are created by `slotmap::SlotMap` and stay unique across reloads of
//! the same index: a key from a disposed scene never resolves to a new node.

use slotmap::new_key_type;

new_key_type! {
    /// Key for one mesh node in the scene (panel body, edge strip,
    /// furniture item or extrusion).
    pub struct MeshId;
}
