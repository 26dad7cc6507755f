// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use larissa::model::{Contact, ContactId, Note, NoteId, Workspace, WorkspaceId};

/// Workspace with `note_count` notes and `contact_count` contacts whose
/// bodies cross-reference each other in a deterministic ring.
pub fn linked_workspace(note_count: usize, contact_count: usize) -> Workspace {
    let mut workspace =
        Workspace::new(WorkspaceId::new("bench").expect("workspace id"));

    for idx in 0..note_count {
        let note_id =
            NoteId::new(format!("bench-note-{idx:05}")).expect("note id");
        let mut note = Note::new(note_id.clone(), format!("Bench note {idx:05}"));
        let next_note = (idx + 1) % note_count.max(1);
        let contact = idx % contact_count.max(1);
        note.set_body(format!(
            "Linked to [[note:bench-note-{next_note:05}]] and \
             [[contact:bench-contact-{contact:05}]]. Filler text follows: \
             lorem ipsum dolor sit amet, consectetur adipiscing elit."
        ));
        workspace.notes_mut().insert(note_id, note);
    }

    for idx in 0..contact_count {
        let contact_id =
            ContactId::new(format!("bench-contact-{idx:05}")).expect("contact id");
        let mut contact =
            Contact::new(contact_id.clone(), format!("Bench Contact {idx:05}"));
        let note = idx % note_count.max(1);
        contact.set_about(format!("Owner of [[note:bench-note-{note:05}]]."));
        workspace.contacts_mut().insert(contact_id, contact);
    }

    workspace
}

/// Body text with `token_count` reference tokens spread through filler prose.
pub fn reference_heavy_body(token_count: usize) -> String {
    let mut body = String::new();
    for idx in 0..token_count {
        body.push_str("Some surrounding prose that mentions ");
        body.push_str(&format!("[[note:bench-note-{:05}]]", idx % 64));
        body.push_str(" before moving on. ");
        if idx % 7 == 0 {
            body.push('\n');
        }
    }
    body
}
