// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use smol_str::SmolStr;

use super::contact::Contact;
use super::ids::{ContactId, NoteId, WorkspaceId};
use super::note::Note;
use super::workspace::Workspace;

fn nid(value: &str) -> NoteId {
    NoteId::new(value).expect("note id")
}

fn cid(value: &str) -> ContactId {
    ContactId::new(value).expect("contact id")
}

fn tags(values: &[&str]) -> BTreeSet<SmolStr> {
    values.iter().map(|value| SmolStr::new(value)).collect()
}

/// Small cross-referenced workspace used by the TUI demo mode and by tests.
///
/// Contains one self-reference (`ada` mentions herself) and one dangling
/// reference (`standup` mentions a note that does not exist).
pub(crate) fn demo_workspace() -> Workspace {
    let mut workspace = Workspace::new(WorkspaceId::new("demo").expect("workspace id"));

    let mut kickoff = Note::new(nid("kickoff"), "Project kickoff");
    kickoff.set_body(
        "Kickoff with [[contact:ada]] and [[contact:graham]].\n\
         Follow-ups captured in [[note:standup]].",
    );
    kickoff.set_tags(tags(&["project", "meeting"]));
    kickoff.set_pinned(true);

    let mut standup = Note::new(nid("standup"), "Standup notes");
    standup.set_body(
        "Daily sync. [[contact:ada]] demoed the importer.\n\
         Parking lot moved to [[note:parking-lot]].",
    );
    standup.set_tags(tags(&["meeting"]));

    let mut reading = Note::new(nid("reading"), "Reading list");
    reading.set_body("Papers recommended by [[contact:graham]].");
    reading.set_tags(tags(&["personal"]));

    let mut ada = Contact::new(cid("ada"), "Ada Lovelace");
    ada.set_email(Some("ada@example.com".to_owned()));
    ada.set_about(
        "Lead on the importer. See [[note:kickoff]] for context.\n\
         Prefers [[contact:ada]] as the single point of contact.",
    );
    ada.set_tags(tags(&["team"]));

    let mut graham = Contact::new(cid("graham"), "Graham Nelson");
    graham.set_phone(Some("+1 555 0100".to_owned()));
    graham.set_about("External advisor. Reading list lives in [[note:reading]].");
    graham.set_tags(tags(&["advisor"]));

    workspace.notes_mut().insert(kickoff.note_id().clone(), kickoff);
    workspace.notes_mut().insert(standup.note_id().clone(), standup);
    workspace.notes_mut().insert(reading.note_id().clone(), reading);
    workspace.contacts_mut().insert(ada.contact_id().clone(), ada);
    workspace.contacts_mut().insert(graham.contact_id().clone(), graham);

    workspace
}
