// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Step-by-step assembly guide.
//!
//! Steps are the blocks that own meshes, in document order. Step `n` shows
//! blocks `0..=n` and hides everything else, orphans included.

use panelview_core::RecordId;
use rustc_hash::FxHashSet;

use crate::index::SceneIndex;
use crate::keys::MeshId;
use crate::selection::Selection;

#[derive(Debug, Clone, Default)]
pub struct AssemblyGuide {
    steps: Vec<RecordId>,
    current: Option<usize>,
}

impl AssemblyGuide {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the guide at the first step. Returns false when there are no
    /// blocks with geometry.
    pub fn start(&mut self, index: &SceneIndex) -> bool {
        self.steps = index
            .blocks()
            .iter()
            .filter(|b| !index.get_meshes_for_block(b.as_str()).is_empty())
            .cloned()
            .collect();
        if self.steps.is_empty() {
            tracing::debug!("Assembly guide has no steps");
            self.current = None;
            return false;
        }
        self.current = Some(0);
        tracing::debug!(steps = self.steps.len(), "Assembly guide started");
        true
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_step(&self) -> Option<usize> {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Block introduced by the current step
    pub fn current_block(&self) -> Option<&RecordId> {
        self.current.and_then(|i| self.steps.get(i))
    }

    pub fn next_step(&mut self) -> bool {
        match self.current {
            Some(i) if i + 1 < self.steps.len() => self.go_to(i + 1),
            _ => false,
        }
    }

    pub fn prev_step(&mut self) -> bool {
        match self.current {
            Some(i) if i > 0 => self.go_to(i - 1),
            _ => false,
        }
    }

    pub fn go_to(&mut self, step: usize) -> bool {
        if !self.is_active() || step >= self.steps.len() {
            return false;
        }
        self.current = Some(step);
        true
    }

    /// Leave the guide. The caller shows everything again.
    pub fn exit(&mut self) {
        self.current = None;
        self.steps.clear();
    }

    /// Make visibility match the current step
    pub fn apply(&self, index: &mut SceneIndex, selection: &mut Selection) {
        let Some(step) = self.current else {
            return;
        };
        let shown: FxHashSet<MeshId> = self
            .steps
            .iter()
            .take(step + 1)
            .flat_map(|b| index.get_meshes_for_block(b.as_str()).iter().copied())
            .collect();

        let roots = index.meshes().to_vec();
        for id in roots {
            let _ = index.set_visible(id, shown.contains(&id));
        }
        selection.rebuild_hidden(index);
    }
}
