// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! End-to-end drill-down scenarios driven through the public navigation API,
//! against a workspace mutated mid-flight the way the data layer would.

use larissa::model::{Contact, ContactId, EntityRef, Note, NoteId, Workspace, WorkspaceId};
use larissa::nav::{ActivateOutcome, BackOutcome, OverlayController, OverlaySurface};

fn eref(s: &str) -> EntityRef {
    s.parse().expect("entity ref")
}

fn scenario_workspace() -> Workspace {
    let mut workspace = Workspace::new(WorkspaceId::new("scenario").expect("workspace id"));

    let note_7 = NoteId::new("7").expect("note id");
    let mut note = Note::new(note_7.clone(), "Note seven");
    note.set_body("Mentions [[contact:2]].");
    workspace.notes_mut().insert(note_7, note);

    for (id, name, about) in [
        ("1", "Contact one", "Mentions [[note:7]]."),
        ("2", "Contact two", ""),
    ] {
        let contact_id = ContactId::new(id).expect("contact id");
        let mut contact = Contact::new(contact_id.clone(), name);
        contact.set_about(about);
        workspace.contacts_mut().insert(contact_id, contact);
    }

    workspace
}

/// Minimal surface: a single shown slot, like a real page overlay.
#[derive(Debug, Default)]
struct Surface {
    shown: Option<EntityRef>,
}

impl OverlaySurface for Surface {
    fn show_note(&mut self, note: &Note, _caller: Option<EntityRef>) {
        self.shown = Some(EntityRef::Note(note.note_id().clone()));
    }

    fn show_contact(&mut self, contact: &Contact, _caller: Option<EntityRef>) {
        self.shown = Some(EntityRef::Contact(contact.contact_id().clone()));
    }

    fn close_current(&mut self) {
        self.shown = None;
    }
}

#[test]
fn drill_down_and_back_out_step_by_step() {
    let workspace = scenario_workspace();
    let mut controller = OverlayController::new();
    let mut surface = Surface::default();

    // Start at Contact(1) shown, stack empty.
    controller.activate(&workspace, &mut surface, None, &eref("e:contact/1"));
    assert_eq!(surface.shown, Some(eref("e:contact/1")));
    assert_eq!(controller.depth(), 0);

    // Reference to Note(7) inside Contact(1) -> push {Contact,1}, show Note(7).
    let outcome = controller.activate(
        &workspace,
        &mut surface,
        Some(eref("e:contact/1")),
        &eref("e:note/7"),
    );
    assert_eq!(outcome, ActivateOutcome::Opened);
    assert_eq!(surface.shown, Some(eref("e:note/7")));
    assert_eq!(controller.stack().entries(), &[eref("e:contact/1")]);

    // Reference to Contact(2) inside Note(7) -> push {Note,7}, show Contact(2).
    let outcome = controller.activate(
        &workspace,
        &mut surface,
        Some(eref("e:note/7")),
        &eref("e:contact/2"),
    );
    assert_eq!(outcome, ActivateOutcome::Opened);
    assert_eq!(surface.shown, Some(eref("e:contact/2")));
    assert_eq!(
        controller.stack().entries(),
        &[eref("e:contact/1"), eref("e:note/7")]
    );

    // Back -> pop {Note,7}, resolve, show it.
    let outcome = controller.back(&workspace, &mut surface, eref("e:contact/2"));
    assert_eq!(outcome, BackOutcome::ReturnedTo(eref("e:note/7")));
    assert_eq!(surface.shown, Some(eref("e:note/7")));
    assert_eq!(controller.stack().entries(), &[eref("e:contact/1")]);

    // Back again -> pop {Contact,1}, resolve, show it.
    let outcome = controller.back(&workspace, &mut surface, eref("e:note/7"));
    assert_eq!(outcome, BackOutcome::ReturnedTo(eref("e:contact/1")));
    assert_eq!(surface.shown, Some(eref("e:contact/1")));
    assert_eq!(controller.depth(), 0);

    // Back on an empty stack -> close the overlay entirely.
    let outcome = controller.back(&workspace, &mut surface, eref("e:contact/1"));
    assert_eq!(outcome, BackOutcome::ClosedEmpty);
    assert_eq!(surface.shown, None);
}

#[test]
fn trashing_a_buried_entity_makes_back_close_instead_of_crash() {
    let mut workspace = scenario_workspace();
    let mut controller = OverlayController::new();
    let mut surface = Surface::default();

    controller.activate(&workspace, &mut surface, None, &eref("e:contact/2"));
    controller.activate(
        &workspace,
        &mut surface,
        Some(eref("e:contact/2")),
        &eref("e:note/7"),
    );
    assert_eq!(controller.depth(), 1);

    // The data layer trashes Contact(2) while it is buried in the stack.
    let contact_id = ContactId::new("2").expect("contact id");
    assert!(workspace.trash_contact(&contact_id));

    let outcome = controller.back(&workspace, &mut surface, eref("e:note/7"));
    assert_eq!(outcome, BackOutcome::ClosedStale(eref("e:contact/2")));
    assert_eq!(surface.shown, None);
    assert_eq!(controller.depth(), 0);

    // Restoring the contact brings it back for future navigation.
    assert!(workspace.restore_contact(&contact_id));
    controller.activate(&workspace, &mut surface, None, &eref("e:contact/2"));
    assert_eq!(surface.shown, Some(eref("e:contact/2")));
}

#[test]
fn minimize_from_depth_three_needs_no_back_clicks() {
    let workspace = scenario_workspace();
    let mut controller = OverlayController::new();
    let mut surface = Surface::default();

    controller.activate(&workspace, &mut surface, None, &eref("e:contact/1"));
    let chain = [eref("e:note/7"), eref("e:contact/2"), eref("e:contact/1")];
    let mut current = eref("e:contact/1");
    for target in chain {
        // Contact(1) -> Note(7) -> Contact(2) -> Contact(1): the longer cycle
        // grows the stack; only the immediate self-reference is a no-op.
        controller.activate(&workspace, &mut surface, Some(current.clone()), &target);
        current = target;
    }
    assert_eq!(controller.depth(), 3);

    controller.close(&mut surface);
    assert_eq!(controller.depth(), 0);
    assert_eq!(surface.shown, None);
}

#[test]
fn two_surfaces_keep_independent_histories() {
    let workspace = scenario_workspace();
    let mut page = OverlayController::new();
    let mut page_surface = Surface::default();
    let mut nested = OverlayController::new();
    let mut nested_surface = Surface::default();

    page.activate(&workspace, &mut page_surface, None, &eref("e:contact/1"));
    page.activate(
        &workspace,
        &mut page_surface,
        Some(eref("e:contact/1")),
        &eref("e:note/7"),
    );

    nested.activate(&workspace, &mut nested_surface, None, &eref("e:contact/2"));

    assert_eq!(page.depth(), 1);
    assert_eq!(nested.depth(), 0);

    // Collapsing the nested surface leaves the page history intact.
    nested.close(&mut nested_surface);
    assert_eq!(nested_surface.shown, None);
    assert_eq!(page.depth(), 1);
    assert_eq!(page_surface.shown, Some(eref("e:note/7")));
}
