// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::contact::Contact;
use super::entity_ref::EntityRef;
use super::ids::{ContactId, NoteId, WorkspaceId};
use super::note::Note;

/// The top-level container the TUI and MCP server run against.
///
/// Live and trashed entities are kept in separate maps: trashing moves an
/// entity out of the live map, so lookups against the live collections treat
/// it as "not found", which is exactly what the navigation core relies on
/// when a stack entry goes stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    workspace_id: WorkspaceId,
    rev: u64,
    notes: BTreeMap<NoteId, Note>,
    contacts: BTreeMap<ContactId, Contact>,
    trashed_notes: BTreeMap<NoteId, Note>,
    trashed_contacts: BTreeMap<ContactId, Contact>,
}

impl Workspace {
    pub fn new(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            rev: 0,
            notes: BTreeMap::new(),
            contacts: BTreeMap::new(),
            trashed_notes: BTreeMap::new(),
            trashed_contacts: BTreeMap::new(),
        }
    }

    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
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

    pub fn notes(&self) -> &BTreeMap<NoteId, Note> {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut BTreeMap<NoteId, Note> {
        &mut self.notes
    }

    pub fn contacts(&self) -> &BTreeMap<ContactId, Contact> {
        &self.contacts
    }

    pub fn contacts_mut(&mut self) -> &mut BTreeMap<ContactId, Contact> {
        &mut self.contacts
    }

    pub fn trashed_notes(&self) -> &BTreeMap<NoteId, Note> {
        &self.trashed_notes
    }

    pub fn trashed_notes_mut(&mut self) -> &mut BTreeMap<NoteId, Note> {
        &mut self.trashed_notes
    }

    pub fn trashed_contacts(&self) -> &BTreeMap<ContactId, Contact> {
        &self.trashed_contacts
    }

    pub fn trashed_contacts_mut(&mut self) -> &mut BTreeMap<ContactId, Contact> {
        &mut self.trashed_contacts
    }

    /// Moves a live note to the trash. Returns false when the id is not live.
    pub fn trash_note(&mut self, note_id: &NoteId) -> bool {
        let Some(note) = self.notes.remove(note_id) else {
            return false;
        };
        self.trashed_notes.insert(note_id.clone(), note);
        true
    }

    /// Moves a trashed note back into the live collection.
    pub fn restore_note(&mut self, note_id: &NoteId) -> bool {
        let Some(note) = self.trashed_notes.remove(note_id) else {
            return false;
        };
        self.notes.insert(note_id.clone(), note);
        true
    }

    /// Permanently removes a trashed note.
    pub fn purge_note(&mut self, note_id: &NoteId) -> bool {
        self.trashed_notes.remove(note_id).is_some()
    }

    pub fn trash_contact(&mut self, contact_id: &ContactId) -> bool {
        let Some(contact) = self.contacts.remove(contact_id) else {
            return false;
        };
        self.trashed_contacts.insert(contact_id.clone(), contact);
        true
    }

    pub fn restore_contact(&mut self, contact_id: &ContactId) -> bool {
        let Some(contact) = self.trashed_contacts.remove(contact_id) else {
            return false;
        };
        self.contacts.insert(contact_id.clone(), contact);
        true
    }

    pub fn purge_contact(&mut self, contact_id: &ContactId) -> bool {
        self.trashed_contacts.remove(contact_id).is_some()
    }

    /// True when the reference resolves against the *live* collections.
    pub fn entity_exists(&self, entity_ref: &EntityRef) -> bool {
        match entity_ref {
            EntityRef::Note(note_id) => self.notes.contains_key(note_id),
            EntityRef::Contact(contact_id) => self.contacts.contains_key(contact_id),
        }
    }

    pub fn entity_is_missing(&self, entity_ref: &EntityRef) -> bool {
        !self.entity_exists(entity_ref)
    }

    /// Display label for a live entity (note title / contact name).
    pub fn entity_label(&self, entity_ref: &EntityRef) -> Option<&str> {
        match entity_ref {
            EntityRef::Note(note_id) => self.notes.get(note_id).map(Note::title),
            EntityRef::Contact(contact_id) => self.contacts.get(contact_id).map(Contact::name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Workspace;
    use crate::model::{ContactId, EntityRef, Note, NoteId, WorkspaceId};

    fn workspace_with_note(note_id: &str) -> (Workspace, NoteId) {
        let mut workspace = Workspace::new(WorkspaceId::new("w1").expect("workspace id"));
        let note_id = NoteId::new(note_id).expect("note id");
        workspace
            .notes_mut()
            .insert(note_id.clone(), Note::new(note_id.clone(), "Inbox"));
        (workspace, note_id)
    }

    #[test]
    fn trashed_note_no_longer_exists_for_references() {
        let (mut workspace, note_id) = workspace_with_note("inbox");
        let entity_ref = EntityRef::Note(note_id.clone());
        assert!(workspace.entity_exists(&entity_ref));

        assert!(workspace.trash_note(&note_id));
        assert!(workspace.entity_is_missing(&entity_ref));
        assert!(workspace.trashed_notes().contains_key(&note_id));
    }

    #[test]
    fn restore_brings_note_back_for_references() {
        let (mut workspace, note_id) = workspace_with_note("inbox");
        workspace.trash_note(&note_id);
        assert!(workspace.restore_note(&note_id));
        assert!(workspace.entity_exists(&EntityRef::Note(note_id)));
    }

    #[test]
    fn purge_removes_permanently() {
        let (mut workspace, note_id) = workspace_with_note("inbox");
        workspace.trash_note(&note_id);
        assert!(workspace.purge_note(&note_id));
        assert!(!workspace.restore_note(&note_id));
    }

    #[test]
    fn trash_of_unknown_contact_is_rejected() {
        let mut workspace = Workspace::new(WorkspaceId::new("w1").expect("workspace id"));
        let contact_id = ContactId::new("nobody").expect("contact id");
        assert!(!workspace.trash_contact(&contact_id));
    }
}
