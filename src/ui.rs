// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shared UI state for cross-component coordination.
//!
//! This lightweight state propagates the human's overlay context between the
//! interactive TUI and programmatic integrations (MCP), and carries a
//! workspace revision counter so either side can notice out-of-process
//! mutations and resync from disk.

use crate::model::EntityRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    rev: u64,
    human_shown: Option<EntityRef>,
    human_nav_depth: u64,
    workspace_rev: u64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            rev: 0,
            human_shown: None,
            human_nav_depth: 0,
            workspace_rev: 0,
        }
    }
}

impl UiState {
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn human_shown(&self) -> Option<&EntityRef> {
        self.human_shown.as_ref()
    }

    pub fn human_nav_depth(&self) -> u64 {
        self.human_nav_depth
    }

    pub fn workspace_rev(&self) -> u64 {
        self.workspace_rev
    }

    pub fn set_human_overlay(&mut self, shown: Option<EntityRef>, nav_depth: u64) {
        if self.human_shown == shown && self.human_nav_depth == nav_depth {
            return;
        }
        self.human_shown = shown;
        self.human_nav_depth = nav_depth;
        self.rev = self.rev.wrapping_add(1);
    }

    pub fn bump_workspace_rev(&mut self) {
        self.workspace_rev = self.workspace_rev.wrapping_add(1);
        self.rev = self.rev.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::UiState;
    use crate::model::EntityRef;

    #[test]
    fn unchanged_overlay_does_not_bump_rev() {
        let mut ui_state = UiState::default();
        ui_state.set_human_overlay(None, 0);
        assert_eq!(ui_state.rev(), 0);

        let shown: EntityRef = "e:note/a".parse().expect("entity ref");
        ui_state.set_human_overlay(Some(shown.clone()), 1);
        assert_eq!(ui_state.rev(), 1);

        ui_state.set_human_overlay(Some(shown), 1);
        assert_eq!(ui_state.rev(), 1);
    }

    #[test]
    fn workspace_rev_bumps_both_counters() {
        let mut ui_state = UiState::default();
        ui_state.bump_workspace_rev();
        assert_eq!(ui_state.workspace_rev(), 1);
        assert_eq!(ui_state.rev(), 1);
    }
}
