// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use smol_str::SmolStr;

use super::ids::NoteId;

/// A single note. The body is free text and may embed inline reference
/// tokens (`[[note:<id>]]`, `[[contact:<id>]]`) resolved by `format::inline`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    note_id: NoteId,
    title: String,
    body: String,
    tags: BTreeSet<SmolStr>,
    pinned: bool,
    rev: u64,
}

impl Note {
    pub fn new(note_id: NoteId, title: impl Into<String>) -> Self {
        Self {
            note_id,
            title: title.into(),
            body: String::new(),
            tags: BTreeSet::new(),
            pinned: false,
            rev: 0,
        }
    }

    pub fn note_id(&self) -> &NoteId {
        &self.note_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn tags(&self) -> &BTreeSet<SmolStr> {
        &self.tags
    }

    pub fn set_tags(&mut self, tags: BTreeSet<SmolStr>) {
        self.tags = tags;
    }

    pub fn pinned(&self) -> bool {
        self.pinned
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }

    pub fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }
}
