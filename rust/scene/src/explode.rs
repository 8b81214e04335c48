// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exploded view.
//!
//! Every top-level mesh moves away from the model centre along the line
//! from the centre to its baseline position. Baselines are stored the first
//! time a mesh is exploded and restored exactly on collapse.

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::index::SceneIndex;
use crate::keys::MeshId;

#[derive(Debug, Clone)]
pub struct ExplodeState {
    active: bool,
    factor: f64,
    baselines: FxHashMap<MeshId, Vector3<f64>>,
}

impl ExplodeState {
    pub fn new(factor: f64) -> Self {
        Self {
            active: false,
            factor,
            baselines: FxHashMap::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Explode or collapse. Returns whether the view is now exploded.
    pub fn toggle(&mut self, index: &mut SceneIndex) -> bool {
        if self.active {
            self.restore(index);
        } else {
            self.explode(index);
        }
        self.active
    }

    /// Spread meshes by the current factor, always measured from baseline
    pub fn explode(&mut self, index: &mut SceneIndex) {
        let center = index.model_bounds().center();
        let roots = index.meshes().to_vec();
        for id in roots {
            let Some(node) = index.node(id) else {
                continue;
            };
            let base = *self.baselines.entry(id).or_insert(node.translation());
            let _ = index.set_translation(id, exploded(base, center, self.factor));
        }
        self.active = true;
        tracing::debug!(meshes = self.baselines.len(), factor = self.factor, "Exploded view applied");
    }

    /// Change the spread; re-applied from baseline when exploded
    pub fn set_factor(&mut self, index: &mut SceneIndex, factor: f64) {
        if !factor.is_finite() {
            return;
        }
        self.factor = factor;
        if self.active {
            self.explode(index);
        }
    }

    /// Put every mesh back on its baseline
    pub fn restore(&mut self, index: &mut SceneIndex) {
        for (&id, &base) in &self.baselines {
            let _ = index.set_translation(id, base);
        }
        self.active = false;
    }

    /// Forget baselines without touching the index
    pub fn reset(&mut self) {
        self.baselines.clear();
        self.active = false;
    }
}

fn exploded(base: Vector3<f64>, center: Point3<f64>, factor: f64) -> Vector3<f64> {
    base + (base - center.coords) * (factor - 1.0)
}
