// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use crate::format::inline::extract_refs;
use crate::model::{EntityRef, Workspace};

/// Live entities whose body text references `target`, in collection order
/// (notes first). Self-references count: an entity that mentions itself is
/// its own backlink.
pub fn backlinks(workspace: &Workspace, target: &EntityRef) -> Vec<EntityRef> {
    let mut results = Vec::new();

    for (note_id, note) in workspace.notes() {
        if extract_refs(note.body()).contains(target) {
            results.push(EntityRef::Note(note_id.clone()));
        }
    }
    for (contact_id, contact) in workspace.contacts() {
        if extract_refs(contact.about()).contains(target) {
            results.push(EntityRef::Contact(contact_id.clone()));
        }
    }

    results
}

/// A reference embedded in a live entity that does not resolve against the
/// live collections (the target was trashed, purged, or never existed).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DanglingRef {
    pub source: EntityRef,
    pub target: EntityRef,
}

/// All dangling embedded references across the live workspace, deduplicated
/// and sorted by (source, target).
pub fn dangling_refs(workspace: &Workspace) -> Vec<DanglingRef> {
    let mut results = BTreeSet::new();

    for (note_id, note) in workspace.notes() {
        let source = EntityRef::Note(note_id.clone());
        for target in extract_refs(note.body()) {
            if workspace.entity_is_missing(&target) {
                results.insert(DanglingRef { source: source.clone(), target });
            }
        }
    }
    for (contact_id, contact) in workspace.contacts() {
        let source = EntityRef::Contact(contact_id.clone());
        for target in extract_refs(contact.about()) {
            if workspace.entity_is_missing(&target) {
                results.insert(DanglingRef { source: source.clone(), target });
            }
        }
    }

    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::{backlinks, dangling_refs, DanglingRef};
    use crate::model::{fixtures, ContactId, EntityRef};

    fn eref(s: &str) -> EntityRef {
        s.parse().expect("entity ref")
    }

    #[test]
    fn backlinks_find_notes_and_contacts_mentioning_the_target() {
        let workspace = fixtures::demo_workspace();

        let results = backlinks(&workspace, &eref("e:contact/ada"));
        assert_eq!(
            results,
            vec![eref("e:note/kickoff"), eref("e:note/standup"), eref("e:contact/ada")]
        );
    }

    #[test]
    fn backlinks_ignore_trashed_sources() {
        let mut workspace = fixtures::demo_workspace();
        let note_id = crate::model::NoteId::new("standup").expect("note id");
        workspace.trash_note(&note_id);

        let results = backlinks(&workspace, &eref("e:contact/ada"));
        assert_eq!(results, vec![eref("e:note/kickoff"), eref("e:contact/ada")]);
    }

    #[test]
    fn demo_workspace_has_one_dangling_reference() {
        let workspace = fixtures::demo_workspace();
        let results = dangling_refs(&workspace);
        assert_eq!(
            results,
            vec![DanglingRef {
                source: eref("e:note/standup"),
                target: eref("e:note/parking-lot"),
            }]
        );
    }

    #[test]
    fn trashing_a_target_makes_its_references_dangle() {
        let mut workspace = fixtures::demo_workspace();
        let contact_id = ContactId::new("graham").expect("contact id");
        workspace.trash_contact(&contact_id);

        let results = dangling_refs(&workspace);
        assert!(results
            .iter()
            .any(|dangling| dangling.target == eref("e:contact/graham")));
    }
}
