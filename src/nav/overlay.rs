// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Contact, ContactId, EntityRef, Note, NoteId, Workspace};

use super::stack::NavStack;

/// Read access to the live entity collections.
///
/// Popped references are re-hydrated against the *current* collections, never
/// a snapshot captured at push time: an entity may have been edited or
/// trashed while buried in the stack, which is why stack entries store only
/// an id.
pub trait EntityResolver {
    fn find_note(&self, note_id: &NoteId) -> Option<&Note>;
    fn find_contact(&self, contact_id: &ContactId) -> Option<&Contact>;
}

impl EntityResolver for Workspace {
    fn find_note(&self, note_id: &NoteId) -> Option<&Note> {
        self.notes().get(note_id)
    }

    fn find_contact(&self, contact_id: &ContactId) -> Option<&Contact> {
        self.contacts().get(contact_id)
    }
}

/// The callbacks a surface supplies to its overlay controller.
///
/// `caller` is the detail view that was on screen when the show was
/// triggered (or `None` when opened from a non-overlay context). A surface's
/// shown state is a single value: showing a note replaces any shown contact
/// and vice versa, never two independent flags.
pub trait OverlaySurface {
    fn show_note(&mut self, note: &Note, caller: Option<EntityRef>);
    fn show_contact(&mut self, contact: &Contact, caller: Option<EntityRef>);
    fn close_current(&mut self);
}

/// Result of a drill-down attempt. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivateOutcome {
    /// The target was shown and the previous view (if any) was pushed.
    Opened,
    /// The target is the view already on screen; nothing happened.
    SelfReference,
    /// The target no longer resolves; nothing was pushed or shown.
    MissingTarget,
}

/// Result of a back-navigation. None of these are errors: pressing back
/// always either shows a previous view or closes the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackOutcome {
    /// The popped entry resolved and was re-shown.
    ReturnedTo(EntityRef),
    /// The stack was empty; the overlay was closed.
    ClosedEmpty,
    /// The popped entry no longer resolves; the overlay was closed. Deeper
    /// entries stay on the stack; a single failed resolution terminates the
    /// back-navigation rather than silently skipping to an older entry.
    ClosedStale(EntityRef),
}

/// Drill-down orchestration for one surface.
///
/// Owns the surface's [`NavStack`]; the resolver and the surface callbacks
/// are dependency-injected per call. Every surface (page-level or nested)
/// instantiates its own controller, so one drill-down history can never
/// corrupt another.
#[derive(Debug, Clone, Default)]
pub struct OverlayController {
    stack: NavStack,
}

impl OverlayController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stack(&self) -> &NavStack {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn can_go_back(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Shows a note without touching the stack.
    ///
    /// Pushing belongs to the call site that *initiates* a navigation (see
    /// [`Self::activate`]): only there is it known whether this is a fresh
    /// drill-down or a replay driven by [`Self::back`], whose entry is
    /// already consumed by the pop.
    pub fn open_note<S: OverlaySurface>(
        &mut self,
        surface: &mut S,
        note: &Note,
        caller: Option<EntityRef>,
    ) {
        surface.show_note(note, caller);
    }

    /// Shows a contact without touching the stack.
    pub fn open_contact<S: OverlaySurface>(
        &mut self,
        surface: &mut S,
        contact: &Contact,
        caller: Option<EntityRef>,
    ) {
        surface.show_contact(contact, caller);
    }

    /// Drill-down initiation: activates `target` from the view currently on
    /// screen (`current`, or `None` when triggered outside any overlay).
    ///
    /// A target identical to the current view is a no-op. A target that does
    /// not resolve leaves both the stack and the shown view untouched.
    /// Otherwise the current view is pushed, then the target is shown with
    /// the current view as its caller.
    pub fn activate<R: EntityResolver, S: OverlaySurface>(
        &mut self,
        resolver: &R,
        surface: &mut S,
        current: Option<EntityRef>,
        target: &EntityRef,
    ) -> ActivateOutcome {
        if current.as_ref() == Some(target) {
            return ActivateOutcome::SelfReference;
        }

        match target {
            EntityRef::Note(note_id) => {
                let Some(note) = resolver.find_note(note_id) else {
                    return ActivateOutcome::MissingTarget;
                };
                if let Some(current_ref) = current.clone() {
                    self.stack.push(current_ref);
                }
                surface.show_note(note, current);
            }
            EntityRef::Contact(contact_id) => {
                let Some(contact) = resolver.find_contact(contact_id) else {
                    return ActivateOutcome::MissingTarget;
                };
                if let Some(current_ref) = current.clone() {
                    self.stack.push(current_ref);
                }
                surface.show_contact(contact, current);
            }
        }

        ActivateOutcome::Opened
    }

    /// Back-navigation from the view currently on screen.
    ///
    /// Empty stack closes the overlay. A popped entry that resolves is
    /// re-shown, recording `current` as the new caller so a further forward
    /// drill-down can return here too. A popped entry that no longer
    /// resolves closes the overlay without popping further.
    pub fn back<R: EntityResolver, S: OverlaySurface>(
        &mut self,
        resolver: &R,
        surface: &mut S,
        current: EntityRef,
    ) -> BackOutcome {
        let Some(entry) = self.stack.pop() else {
            surface.close_current();
            return BackOutcome::ClosedEmpty;
        };

        match &entry {
            EntityRef::Note(note_id) => match resolver.find_note(note_id) {
                Some(note) => {
                    surface.show_note(note, Some(current));
                    BackOutcome::ReturnedTo(entry)
                }
                None => {
                    surface.close_current();
                    BackOutcome::ClosedStale(entry)
                }
            },
            EntityRef::Contact(contact_id) => match resolver.find_contact(contact_id) {
                Some(contact) => {
                    surface.show_contact(contact, Some(current));
                    BackOutcome::ReturnedTo(entry)
                }
                None => {
                    surface.close_current();
                    BackOutcome::ClosedStale(entry)
                }
            },
        }
    }

    /// Full close/minimize: clears the whole history, then hides the overlay.
    pub fn close<S: OverlaySurface>(&mut self, surface: &mut S) {
        self.stack.clear();
        surface.close_current();
    }
}
