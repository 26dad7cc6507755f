// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for workspaces.
//!
//! Operations are applied with optimistic concurrency (revision checks) and
//! produce a minimal delta that the UI can use to refresh derived state.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use smol_str::SmolStr;

use crate::model::{Contact, ContactId, EntityKind, EntityRef, Note, NoteId, Workspace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Note(NoteOp),
    Contact(ContactOp),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteOp {
    Create {
        note_id: NoteId,
        title: String,
    },
    Update {
        note_id: NoteId,
        patch: NotePatch,
    },
    SetTags {
        note_id: NoteId,
        tags: BTreeSet<SmolStr>,
    },
    Trash {
        note_id: NoteId,
    },
    Restore {
        note_id: NoteId,
    },
    Purge {
        note_id: NoteId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub pinned: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOp {
    Create {
        contact_id: ContactId,
        name: String,
    },
    Update {
        contact_id: ContactId,
        patch: ContactPatch,
    },
    SetEmail {
        contact_id: ContactId,
        email: Option<String>,
    },
    SetPhone {
        contact_id: ContactId,
        phone: Option<String>,
    },
    SetTags {
        contact_id: ContactId,
        tags: BTreeSet<SmolStr>,
    },
    Trash {
        contact_id: ContactId,
    },
    Restore {
        contact_id: ContactId,
    },
    Purge {
        contact_id: ContactId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub about: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

/// Minimal delta describing which entities changed as the result of applying
/// ops.
///
/// Visibility is relative to the live collections: trashing records the
/// entity as removed, restoring as added; purging a trashed entity records
/// nothing, since it was never visible to begin with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<EntityRef>,
    pub removed: Vec<EntityRef>,
    pub updated: Vec<EntityRef>,
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<EntityRef>,
    removed: HashSet<EntityRef>,
    updated: HashSet<EntityRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, entity_ref: EntityRef) {
        self.removed.remove(&entity_ref);
        self.updated.remove(&entity_ref);
        self.added.insert(entity_ref);
    }

    fn record_removed(&mut self, entity_ref: EntityRef) {
        self.added.remove(&entity_ref);
        self.updated.remove(&entity_ref);
        self.removed.insert(entity_ref);
    }

    fn record_updated(&mut self, entity_ref: EntityRef) {
        if self.added.contains(&entity_ref) || self.removed.contains(&entity_ref) {
            return;
        }
        self.updated.insert(entity_ref);
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();

        added.sort();
        removed.sort();
        updated.sort();

        Delta { added, removed, updated }
    }
}

pub fn apply_ops(
    workspace: &mut Workspace,
    base_rev: u64,
    ops: &[Op],
) -> Result<ApplyResult, ApplyError> {
    let current_rev = workspace.rev();
    if base_rev != current_rev {
        return Err(ApplyError::Conflict { base_rev, current_rev });
    }

    if ops.is_empty() {
        return Ok(ApplyResult { new_rev: current_rev, applied: 0, delta: Delta::default() });
    }

    let mut next = workspace.clone();
    let mut delta = DeltaBuilder::default();

    for op in ops {
        match op {
            Op::Note(note_op) => apply_note_op(&mut next, note_op, &mut delta)?,
            Op::Contact(contact_op) => apply_contact_op(&mut next, contact_op, &mut delta)?,
        }
    }

    next.bump_rev();
    let new_rev = next.rev();
    *workspace = next;

    Ok(ApplyResult { new_rev, applied: ops.len(), delta: delta.finish() })
}

fn apply_note_op(
    workspace: &mut Workspace,
    op: &NoteOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        NoteOp::Create { note_id, title } => {
            if workspace.notes().contains_key(note_id)
                || workspace.trashed_notes().contains_key(note_id)
            {
                return Err(ApplyError::AlreadyExists {
                    kind: EntityKind::Note,
                    id: note_id.as_str().to_owned(),
                });
            }
            workspace
                .notes_mut()
                .insert(note_id.clone(), Note::new(note_id.clone(), title.clone()));
            delta.record_added(EntityRef::Note(note_id.clone()));
        }
        NoteOp::Update { note_id, patch } => {
            let note = live_note_mut(workspace, note_id)?;
            if let Some(title) = &patch.title {
                note.set_title(title.clone());
            }
            if let Some(body) = &patch.body {
                note.set_body(body.clone());
            }
            if let Some(pinned) = patch.pinned {
                note.set_pinned(pinned);
            }
            note.bump_rev();
            delta.record_updated(EntityRef::Note(note_id.clone()));
        }
        NoteOp::SetTags { note_id, tags } => {
            let note = live_note_mut(workspace, note_id)?;
            note.set_tags(tags.clone());
            note.bump_rev();
            delta.record_updated(EntityRef::Note(note_id.clone()));
        }
        NoteOp::Trash { note_id } => {
            if !workspace.trash_note(note_id) {
                return Err(not_found_note(note_id));
            }
            delta.record_removed(EntityRef::Note(note_id.clone()));
        }
        NoteOp::Restore { note_id } => {
            if !workspace.restore_note(note_id) {
                return Err(not_found_note(note_id));
            }
            delta.record_added(EntityRef::Note(note_id.clone()));
        }
        NoteOp::Purge { note_id } => {
            if !workspace.purge_note(note_id) {
                return Err(not_found_note(note_id));
            }
        }
    }
    Ok(())
}

fn apply_contact_op(
    workspace: &mut Workspace,
    op: &ContactOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        ContactOp::Create { contact_id, name } => {
            if workspace.contacts().contains_key(contact_id)
                || workspace.trashed_contacts().contains_key(contact_id)
            {
                return Err(ApplyError::AlreadyExists {
                    kind: EntityKind::Contact,
                    id: contact_id.as_str().to_owned(),
                });
            }
            workspace.contacts_mut().insert(
                contact_id.clone(),
                Contact::new(contact_id.clone(), name.clone()),
            );
            delta.record_added(EntityRef::Contact(contact_id.clone()));
        }
        ContactOp::Update { contact_id, patch } => {
            let contact = live_contact_mut(workspace, contact_id)?;
            if let Some(name) = &patch.name {
                contact.set_name(name.clone());
            }
            if let Some(about) = &patch.about {
                contact.set_about(about.clone());
            }
            contact.bump_rev();
            delta.record_updated(EntityRef::Contact(contact_id.clone()));
        }
        ContactOp::SetEmail { contact_id, email } => {
            let contact = live_contact_mut(workspace, contact_id)?;
            contact.set_email(email.clone());
            contact.bump_rev();
            delta.record_updated(EntityRef::Contact(contact_id.clone()));
        }
        ContactOp::SetPhone { contact_id, phone } => {
            let contact = live_contact_mut(workspace, contact_id)?;
            contact.set_phone(phone.clone());
            contact.bump_rev();
            delta.record_updated(EntityRef::Contact(contact_id.clone()));
        }
        ContactOp::SetTags { contact_id, tags } => {
            let contact = live_contact_mut(workspace, contact_id)?;
            contact.set_tags(tags.clone());
            contact.bump_rev();
            delta.record_updated(EntityRef::Contact(contact_id.clone()));
        }
        ContactOp::Trash { contact_id } => {
            if !workspace.trash_contact(contact_id) {
                return Err(not_found_contact(contact_id));
            }
            delta.record_removed(EntityRef::Contact(contact_id.clone()));
        }
        ContactOp::Restore { contact_id } => {
            if !workspace.restore_contact(contact_id) {
                return Err(not_found_contact(contact_id));
            }
            delta.record_added(EntityRef::Contact(contact_id.clone()));
        }
        ContactOp::Purge { contact_id } => {
            if !workspace.purge_contact(contact_id) {
                return Err(not_found_contact(contact_id));
            }
        }
    }
    Ok(())
}

fn live_note_mut<'a>(
    workspace: &'a mut Workspace,
    note_id: &NoteId,
) -> Result<&'a mut Note, ApplyError> {
    workspace
        .notes_mut()
        .get_mut(note_id)
        .ok_or_else(|| not_found_note(note_id))
}

fn live_contact_mut<'a>(
    workspace: &'a mut Workspace,
    contact_id: &ContactId,
) -> Result<&'a mut Contact, ApplyError> {
    workspace
        .contacts_mut()
        .get_mut(contact_id)
        .ok_or_else(|| not_found_contact(contact_id))
}

fn not_found_note(note_id: &NoteId) -> ApplyError {
    ApplyError::NotFound { kind: EntityKind::Note, id: note_id.as_str().to_owned() }
}

fn not_found_contact(contact_id: &ContactId) -> ApplyError {
    ApplyError::NotFound { kind: EntityKind::Contact, id: contact_id.as_str().to_owned() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    Conflict { base_rev: u64, current_rev: u64 },
    AlreadyExists { kind: EntityKind, id: String },
    NotFound { kind: EntityKind, id: String },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { base_rev, current_rev } => {
                write!(f, "stale base_rev (base_rev={base_rev}, current_rev={current_rev})")
            }
            Self::AlreadyExists { kind, id } => {
                write!(f, "{kind} already exists (id={id})")
            }
            Self::NotFound { kind, id } => write!(f, "{kind} not found (id={id})"),
        }
    }
}

impl std::error::Error for ApplyError {}
