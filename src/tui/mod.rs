// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Provides the interactive TUI shell (ratatui + crossterm): list panes for
//! notes and contacts, a modal detail overlay with drill-down history, and an
//! optional preview pane that keeps its own independent history.

use std::{
    env,
    error::Error,
    fs, io,
    path::{Path, PathBuf},
    process::Command,
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tokio::sync::Mutex;

use crate::format::inline::{extract_refs, parse_inline, InlineSpan};
use crate::model::{Contact, ContactId, EntityKind, EntityRef, Note, NoteId, Workspace};
use crate::nav::{ActivateOutcome, BackOutcome, OverlayController, OverlaySurface};
use crate::ops::{apply_ops, NoteOp, NotePatch, Op};
use crate::query::{search, search_candidates, SearchCandidate, SearchMode as QuerySearchMode};
use crate::store::WorkspaceFolder;
use crate::ui::UiState;

const FOCUS_COLOR: Color = Color::LightGreen;
const REFERENCE_COLOR: Color = Color::Cyan;
const PINNED_COLOR: Color = Color::Yellow;
const FOOTER_LABEL_COLOR: Color = Color::Gray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const FOOTER_BRAND_COLOR: Color = Color::White;
const FOOTER_BRAND: &str = "🅻 🅰 🆁 🅸 🆂 🆂 🅰 ";

/// Runs the interactive terminal UI against the built-in demo workspace.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    run_with_workspace(demo_workspace())
}

pub fn demo_workspace() -> Workspace {
    crate::model::fixtures::demo_workspace()
}

pub fn run_with_workspace(workspace: Workspace) -> Result<(), Box<dyn std::error::Error>> {
    run_with_workspace_with_ui_state(workspace, None, None)
}

pub fn run_with_workspace_with_ui_state(
    workspace: Workspace,
    ui_state: Option<Arc<Mutex<UiState>>>,
    workspace_folder: Option<WorkspaceFolder>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(workspace);
    app.ui_state = ui_state;
    app.workspace_folder = workspace_folder;
    app.publish_overlay_to_ui_state();

    while !app.should_quit {
        app.sync_from_ui_state();
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key);
                    if let Some(action) = app.take_external_action() {
                        let result =
                            terminal.run_external_action(|| app.execute_external_action(action));
                        if let Err(err) = result {
                            app.set_toast(format!("External action failed: {err}"));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let main_area = layout[0];
    let status_area = layout[1];

    let (lists_area, preview_area) = if app.preview_visible {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(main_area);
        (panes[0], Some(panes[1]))
    } else {
        (main_area, None)
    };

    let list_panes = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(lists_area);
    render_notes_panel(frame, app, list_panes[0]);
    render_contacts_panel(frame, app, list_panes[1]);

    if let Some(preview_area) = preview_area {
        render_preview_panel(frame, app, preview_area);
    }

    if app.page_overlay.is_open() {
        render_detail_overlay(frame, app, main_area);
    }

    render_status_line(frame, app, status_area);

    if app.show_help {
        render_help(frame, app, main_area);
    }
}

// Extracted panel/overlay/footer/help rendering helpers.
include!("chrome.rs");

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchMode {
    Inactive,
    Editing,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchKind {
    Regular,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExternalAction {
    EditNoteBody(NoteId),
}

/// One surface's view state: the single shown detail view plus its embedded
/// references and scroll position.
///
/// Exclusivity is structural: `shown` is one `Option<EntityRef>`, so showing
/// a note displaces a shown contact and vice versa.
#[derive(Debug, Clone, Default)]
struct DetailView {
    shown: Option<EntityRef>,
    caller: Option<EntityRef>,
    refs: Vec<EntityRef>,
    ref_cursor: usize,
    scroll: u16,
}

impl OverlaySurface for DetailView {
    fn show_note(&mut self, note: &Note, caller: Option<EntityRef>) {
        self.shown = Some(EntityRef::Note(note.note_id().clone()));
        self.caller = caller;
        self.refs = extract_refs(note.body());
        self.ref_cursor = 0;
        self.scroll = 0;
    }

    fn show_contact(&mut self, contact: &Contact, caller: Option<EntityRef>) {
        self.shown = Some(EntityRef::Contact(contact.contact_id().clone()));
        self.caller = caller;
        self.refs = extract_refs(contact.about());
        self.ref_cursor = 0;
        self.scroll = 0;
    }

    fn close_current(&mut self) {
        self.shown = None;
        self.caller = None;
        self.refs.clear();
        self.ref_cursor = 0;
        self.scroll = 0;
    }
}

/// One surface: an overlay controller (owning the drill-down history) wired
/// to its [`DetailView`]. The page modal and the preview pane each own one,
/// so their histories never interact.
#[derive(Debug, Clone, Default)]
struct DetailOverlay {
    controller: OverlayController,
    view: DetailView,
}

impl DetailOverlay {
    fn is_open(&self) -> bool {
        self.view.shown.is_some()
    }

    fn shown(&self) -> Option<&EntityRef> {
        self.view.shown.as_ref()
    }

    fn depth(&self) -> usize {
        self.controller.depth()
    }

    fn selected_ref(&self) -> Option<&EntityRef> {
        self.view.refs.get(self.view.ref_cursor)
    }

    fn move_ref_cursor(&mut self, delta: i32) {
        if self.view.refs.is_empty() {
            return;
        }
        let len = self.view.refs.len() as i32;
        let next = (self.view.ref_cursor as i32 + delta).rem_euclid(len);
        self.view.ref_cursor = next as usize;
    }

    /// Opens `target` as a fresh root: any existing history is discarded
    /// first, so no push records the previous context.
    fn open_root(&mut self, workspace: &Workspace, target: &EntityRef) -> ActivateOutcome {
        self.controller.close(&mut self.view);
        self.controller.activate(workspace, &mut self.view, None, target)
    }

    /// Drills down into the embedded reference under the cursor.
    fn activate_selected(&mut self, workspace: &Workspace) -> Option<ActivateOutcome> {
        let target = self.selected_ref()?.clone();
        let current = self.view.shown.clone();
        Some(self.controller.activate(workspace, &mut self.view, current, &target))
    }

    fn back(&mut self, workspace: &Workspace) -> Option<BackOutcome> {
        let current = self.view.shown.clone()?;
        Some(self.controller.back(workspace, &mut self.view, current))
    }

    fn minimize(&mut self) {
        self.controller.close(&mut self.view);
    }
}

struct App {
    workspace: Workspace,
    workspace_folder: Option<WorkspaceFolder>,
    ui_state: Option<Arc<Mutex<UiState>>>,
    ui_state_workspace_rev: u64,
    focus: Focus,
    note_ids: Vec<NoteId>,
    contact_ids: Vec<ContactId>,
    notes_state: ListState,
    contacts_state: ListState,
    preview_visible: bool,
    page_overlay: DetailOverlay,
    preview_overlay: DetailOverlay,
    search_mode: SearchMode,
    search_kind: SearchKind,
    search_query: String,
    search_candidates: Vec<SearchCandidate>,
    search_results: Vec<EntityRef>,
    search_result_index: usize,
    toast: Option<Toast>,
    show_help: bool,
    pending_external_action: Option<ExternalAction>,
    should_quit: bool,
}

impl App {
    fn new(workspace: Workspace) -> Self {
        let mut app = Self {
            workspace,
            workspace_folder: None,
            ui_state: None,
            ui_state_workspace_rev: 0,
            focus: Focus::Notes,
            note_ids: Vec::new(),
            contact_ids: Vec::new(),
            notes_state: ListState::default(),
            contacts_state: ListState::default(),
            preview_visible: false,
            page_overlay: DetailOverlay::default(),
            preview_overlay: DetailOverlay::default(),
            search_mode: SearchMode::Inactive,
            search_kind: SearchKind::Regular,
            search_query: String::new(),
            search_candidates: Vec::new(),
            search_results: Vec::new(),
            search_result_index: 0,
            toast: None,
            show_help: false,
            pending_external_action: None,
            should_quit: false,
        };
        app.refresh_lists();
        if !app.note_ids.is_empty() {
            app.notes_state.select(Some(0));
        }
        if !app.contact_ids.is_empty() {
            app.contacts_state.select(Some(0));
        }
        app
    }

    /// Rebuilds the cached display orders. Pinned notes sort first.
    fn refresh_lists(&mut self) {
        let mut pinned = Vec::new();
        let mut unpinned = Vec::new();
        for (note_id, note) in self.workspace.notes() {
            if note.pinned() {
                pinned.push(note_id.clone());
            } else {
                unpinned.push(note_id.clone());
            }
        }
        pinned.extend(unpinned);
        self.note_ids = pinned;
        self.contact_ids = self.workspace.contacts().keys().cloned().collect();

        clamp_selection(&mut self.notes_state, self.note_ids.len());
        clamp_selection(&mut self.contacts_state, self.contact_ids.len());
    }

    fn selected_note_id(&self) -> Option<&NoteId> {
        self.notes_state.selected().and_then(|idx| self.note_ids.get(idx))
    }

    fn selected_contact_id(&self) -> Option<&ContactId> {
        self.contacts_state.selected().and_then(|idx| self.contact_ids.get(idx))
    }

    /// The entity selected in the focused list pane.
    fn selected_entity_ref(&self) -> Option<EntityRef> {
        match self.focus {
            Focus::Notes => self.selected_note_id().cloned().map(EntityRef::Note),
            Focus::Contacts => self.selected_contact_id().cloned().map(EntityRef::Contact),
            Focus::Preview => self.preview_overlay.shown().cloned(),
        }
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(2),
        });
    }

    fn take_external_action(&mut self) -> Option<ExternalAction> {
        self.pending_external_action.take()
    }

    fn publish_overlay_to_ui_state(&mut self) {
        let Some(ui_state) = self.ui_state.as_ref() else {
            return;
        };
        let shown = self.page_overlay.shown().cloned();
        let depth = self.page_overlay.depth() as u64;
        ui_state.blocking_lock().set_human_overlay(shown, depth);
    }

    /// Picks up out-of-process workspace mutations (MCP) published through
    /// the shared UI state, reloading from disk.
    fn sync_from_ui_state(&mut self) {
        let Some(ui_state) = self.ui_state.as_ref() else {
            return;
        };
        let workspace_rev = ui_state.blocking_lock().workspace_rev();
        if workspace_rev == self.ui_state_workspace_rev {
            return;
        }
        self.ui_state_workspace_rev = workspace_rev;

        let Some(workspace_folder) = self.workspace_folder.clone() else {
            return;
        };
        match workspace_folder.load_workspace() {
            Ok(workspace) => {
                self.workspace = workspace;
                self.after_workspace_changed(false);
                self.set_toast("Workspace updated externally");
            }
            Err(err) => {
                self.set_toast(format!("Workspace reload failed: {err}"));
            }
        }
    }

    /// Applies ops at the current revision, persists, and refreshes derived
    /// state. Reports failures as toasts; this is the only mutation path in
    /// the TUI.
    fn apply_workspace_ops(&mut self, ops: Vec<Op>) -> bool {
        let base_rev = self.workspace.rev();
        match apply_ops(&mut self.workspace, base_rev, &ops) {
            Ok(_) => {
                self.after_workspace_changed(true);
                true
            }
            Err(err) => {
                self.set_toast(format!("Change failed: {err}"));
                false
            }
        }
    }

    fn after_workspace_changed(&mut self, persist: bool) {
        if persist {
            if let Some(workspace_folder) = &self.workspace_folder {
                if let Err(err) = workspace_folder.save_workspace(&self.workspace) {
                    self.set_toast(format!("Save failed: {err}"));
                }
            }
            if let Some(ui_state) = self.ui_state.as_ref() {
                let mut ui_state = ui_state.blocking_lock();
                ui_state.bump_workspace_rev();
                self.ui_state_workspace_rev = ui_state.workspace_rev();
            }
        }

        self.refresh_lists();
        self.reconcile_overlay_with_workspace(true);
        self.reconcile_overlay_with_workspace(false);
        if self.search_mode != SearchMode::Inactive {
            self.search_candidates = search_candidates(&self.workspace);
            self.update_search_results();
        }
        self.publish_overlay_to_ui_state();
    }

    /// Closes an overlay whose shown entity no longer resolves (trashed or
    /// purged out from under it). History clears with it: the view is gone,
    /// not buried.
    fn reconcile_overlay_with_workspace(&mut self, page: bool) {
        let overlay = if page { &mut self.page_overlay } else { &mut self.preview_overlay };
        let Some(shown) = overlay.shown() else {
            return;
        };
        if self.workspace.entity_is_missing(shown) {
            overlay.minimize();
        } else {
            // Re-derive the reference list; the body may have changed.
            let shown = shown.clone();
            let caller = overlay.view.caller.clone();
            match &shown {
                EntityRef::Note(note_id) => {
                    if let Some(note) = self.workspace.notes().get(note_id) {
                        let cursor = overlay.view.ref_cursor;
                        overlay.view.show_note(note, caller);
                        overlay.view.ref_cursor = cursor.min(overlay.view.refs.len().saturating_sub(1));
                    }
                }
                EntityRef::Contact(contact_id) => {
                    if let Some(contact) = self.workspace.contacts().get(contact_id) {
                        let cursor = overlay.view.ref_cursor;
                        overlay.view.show_contact(contact, caller);
                        overlay.view.ref_cursor = cursor.min(overlay.view.refs.len().saturating_sub(1));
                    }
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.handle_key_code(key.code) {
            self.should_quit = true;
        }
    }

    fn handle_key_code(&mut self, code: KeyCode) -> bool {
        if self.show_help {
            match code {
                KeyCode::Esc | KeyCode::Char('?') => self.show_help = false,
                KeyCode::Char('q') => return true,
                _ => {}
            }
            return false;
        }

        match self.search_mode {
            SearchMode::Editing => {
                self.handle_search_edit_key(code);
                return false;
            }
            SearchMode::Results => {
                if matches!(code, KeyCode::Esc) && !self.page_overlay.is_open() {
                    self.clear_search();
                    return false;
                }
            }
            SearchMode::Inactive => {}
        }

        if self.page_overlay.is_open() {
            return self.handle_overlay_key(code);
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::BackTab => self.cycle_focus_back(),
            KeyCode::Char('1') => self.focus = Focus::Notes,
            KeyCode::Char('2') => self.focus = Focus::Contacts,
            KeyCode::Char('p') => self.toggle_preview(),
            KeyCode::Char('/') => self.enter_search_mode(SearchKind::Regular),
            KeyCode::Char('\\') => self.enter_search_mode(SearchKind::Fuzzy),
            KeyCode::Char('n') => self.search_next(),
            KeyCode::Char('N') => self.search_prev(),
            KeyCode::Char('a') => self.create_note(),
            KeyCode::Char('c') => self.create_contact(),
            KeyCode::Char('e') => self.queue_edit_selected_note(),
            KeyCode::Char('t') => self.trash_selected(),
            KeyCode::Char('y') => self.yank_selected_entity_ref(),
            _ => match self.focus {
                Focus::Notes | Focus::Contacts => self.handle_list_key(code),
                Focus::Preview => self.handle_preview_key(code),
            },
        }

        false
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Home | KeyCode::Char('g') => self.select_index(0),
            KeyCode::End | KeyCode::Char('G') => self.select_index(usize::MAX),
            KeyCode::Enter => self.open_selected_in_page_overlay(),
            _ => {}
        }
    }

    /// Keys for the preview pane, the nested surface with its own history.
    fn handle_preview_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.preview_overlay.move_ref_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.preview_overlay.move_ref_cursor(-1),
            KeyCode::Enter => {
                let outcome = self.preview_overlay.activate_selected(&self.workspace);
                self.report_activate_outcome(outcome);
            }
            KeyCode::Backspace | KeyCode::Char('b') => {
                if let Some(BackOutcome::ClosedEmpty | BackOutcome::ClosedStale(_)) =
                    self.preview_overlay.back(&self.workspace)
                {
                    // Walked out of the preview history; fall back to the
                    // list selection as the new root.
                    self.sync_preview_to_selection();
                }
            }
            KeyCode::Esc | KeyCode::Char('m') => {
                self.preview_overlay.minimize();
                self.sync_preview_to_selection();
            }
            KeyCode::Char('o') => self.promote_preview_to_page_overlay(),
            _ => {}
        }
    }

    /// Keys while the page-level modal overlay is open.
    fn handle_overlay_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Down | KeyCode::Char('j') => self.page_overlay.move_ref_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.page_overlay.move_ref_cursor(-1),
            KeyCode::PageDown => {
                self.page_overlay.view.scroll = self.page_overlay.view.scroll.saturating_add(4);
            }
            KeyCode::PageUp => {
                self.page_overlay.view.scroll = self.page_overlay.view.scroll.saturating_sub(4);
            }
            KeyCode::Enter => {
                let outcome = self.page_overlay.activate_selected(&self.workspace);
                self.report_activate_outcome(outcome);
                self.publish_overlay_to_ui_state();
            }
            KeyCode::Backspace | KeyCode::Char('b') => {
                self.page_overlay.back(&self.workspace);
                self.publish_overlay_to_ui_state();
            }
            KeyCode::Esc | KeyCode::Char('m') => {
                self.page_overlay.minimize();
                self.publish_overlay_to_ui_state();
            }
            KeyCode::Char('e') => self.queue_edit_shown_note(),
            KeyCode::Char('y') => self.yank_shown_entity_ref(),
            _ => {}
        }
        false
    }

    fn report_activate_outcome(&mut self, outcome: Option<ActivateOutcome>) {
        match outcome {
            Some(ActivateOutcome::Opened) | None => {}
            Some(ActivateOutcome::SelfReference) => {
                self.set_toast("Already showing that entity");
            }
            Some(ActivateOutcome::MissingTarget) => {
                self.set_toast("Referenced entity no longer exists");
            }
        }
    }

    fn cycle_focus(&mut self) {
        self.focus = self.focus.cycle(self.preview_visible);
        if self.focus == Focus::Preview {
            self.sync_preview_to_selection_if_idle();
        }
    }

    fn cycle_focus_back(&mut self) {
        self.focus = self.focus.cycle_back(self.preview_visible);
        if self.focus == Focus::Preview {
            self.sync_preview_to_selection_if_idle();
        }
    }

    fn toggle_preview(&mut self) {
        self.preview_visible = !self.preview_visible;
        if self.preview_visible {
            self.sync_preview_to_selection();
        } else {
            self.preview_overlay.minimize();
            if self.focus == Focus::Preview {
                self.focus = Focus::Notes;
            }
        }
    }

    /// Points the preview at the list selection, discarding any preview
    /// history (a fresh browsing context).
    fn sync_preview_to_selection(&mut self) {
        let target = match self.focus {
            Focus::Contacts => self.selected_contact_id().cloned().map(EntityRef::Contact),
            _ => self.selected_note_id().cloned().map(EntityRef::Note),
        };
        match target {
            Some(target) => {
                self.preview_overlay.open_root(&self.workspace, &target);
            }
            None => self.preview_overlay.minimize(),
        }
    }

    fn sync_preview_to_selection_if_idle(&mut self) {
        if self.preview_overlay.depth() == 0 {
            self.sync_preview_to_selection();
        }
    }

    fn move_selection(&mut self, delta: i32) {
        let (state, len) = match self.focus {
            Focus::Notes => (&mut self.notes_state, self.note_ids.len()),
            Focus::Contacts => (&mut self.contacts_state, self.contact_ids.len()),
            Focus::Preview => return,
        };
        if len == 0 {
            return;
        }
        let current = state.selected().unwrap_or(0) as i32;
        let next = (current + delta).rem_euclid(len as i32) as usize;
        state.select(Some(next));

        if self.preview_visible {
            self.sync_preview_to_selection();
        }
    }

    fn select_index(&mut self, index: usize) {
        let (state, len) = match self.focus {
            Focus::Notes => (&mut self.notes_state, self.note_ids.len()),
            Focus::Contacts => (&mut self.contacts_state, self.contact_ids.len()),
            Focus::Preview => return,
        };
        if len == 0 {
            return;
        }
        state.select(Some(index.min(len - 1)));

        if self.preview_visible {
            self.sync_preview_to_selection();
        }
    }

    fn open_selected_in_page_overlay(&mut self) {
        let Some(target) = self.selected_entity_ref() else {
            self.set_toast("Nothing selected");
            return;
        };
        self.page_overlay.open_root(&self.workspace, &target);
        self.publish_overlay_to_ui_state();
    }

    /// Hands the previewed entity over to the page-level surface.
    fn promote_preview_to_page_overlay(&mut self) {
        let Some(target) = self.preview_overlay.shown().cloned() else {
            return;
        };
        self.page_overlay.open_root(&self.workspace, &target);
        self.publish_overlay_to_ui_state();
    }

    fn enter_search_mode(&mut self, kind: SearchKind) {
        self.search_mode = SearchMode::Editing;
        self.search_kind = kind;
        self.search_query.clear();
        self.search_result_index = 0;
        self.search_results.clear();
        self.search_candidates = search_candidates(&self.workspace);
    }

    fn handle_search_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.clear_search(),
            KeyCode::Enter => self.commit_search(),
            KeyCode::Backspace => {
                self.search_query.pop();
                self.update_search_results();
            }
            KeyCode::Char(ch) => {
                self.search_query.push(ch);
                self.update_search_results();
            }
            _ => {}
        }
    }

    fn update_search_results(&mut self) {
        let mode = match self.search_kind {
            SearchKind::Regular => QuerySearchMode::Substring,
            SearchKind::Fuzzy => QuerySearchMode::Fuzzy,
        };
        self.search_results =
            search(&self.search_candidates, &self.search_query, mode).unwrap_or_default();
        self.search_result_index = 0;
    }

    fn commit_search(&mut self) {
        if self.search_results.is_empty() {
            self.set_toast(format!("No matches for '{}'", self.search_query));
            self.clear_search();
            return;
        }
        self.search_mode = SearchMode::Results;
        self.jump_to_search_result();
    }

    fn clear_search(&mut self) {
        self.search_mode = SearchMode::Inactive;
        self.search_query.clear();
        self.search_results.clear();
        self.search_candidates.clear();
        self.search_result_index = 0;
    }

    fn search_next(&mut self) {
        if self.search_mode != SearchMode::Results || self.search_results.is_empty() {
            return;
        }
        self.search_result_index = (self.search_result_index + 1) % self.search_results.len();
        self.jump_to_search_result();
    }

    fn search_prev(&mut self) {
        if self.search_mode != SearchMode::Results || self.search_results.is_empty() {
            return;
        }
        self.search_result_index = (self.search_result_index + self.search_results.len() - 1)
            % self.search_results.len();
        self.jump_to_search_result();
    }

    fn jump_to_search_result(&mut self) {
        let Some(entity_ref) = self.search_results.get(self.search_result_index).cloned() else {
            return;
        };
        match &entity_ref {
            EntityRef::Note(note_id) => {
                if let Some(idx) = self.note_ids.iter().position(|id| id == note_id) {
                    self.focus = Focus::Notes;
                    self.notes_state.select(Some(idx));
                }
            }
            EntityRef::Contact(contact_id) => {
                if let Some(idx) = self.contact_ids.iter().position(|id| id == contact_id) {
                    self.focus = Focus::Contacts;
                    self.contacts_state.select(Some(idx));
                }
            }
        }
        if self.preview_visible {
            self.sync_preview_to_selection();
        }
    }

    fn create_note(&mut self) {
        let note_id = allocate_sequential_note_id(&self.workspace);
        if self.apply_workspace_ops(vec![Op::Note(NoteOp::Create {
            note_id: note_id.clone(),
            title: "Untitled".to_owned(),
        })]) {
            self.focus = Focus::Notes;
            if let Some(idx) = self.note_ids.iter().position(|id| id == &note_id) {
                self.notes_state.select(Some(idx));
            }
            self.set_toast(format!("Created note {note_id}"));
        }
    }

    fn create_contact(&mut self) {
        let contact_id = allocate_sequential_contact_id(&self.workspace);
        if self.apply_workspace_ops(vec![Op::Contact(crate::ops::ContactOp::Create {
            contact_id: contact_id.clone(),
            name: "New contact".to_owned(),
        })]) {
            self.focus = Focus::Contacts;
            if let Some(idx) = self.contact_ids.iter().position(|id| id == &contact_id) {
                self.contacts_state.select(Some(idx));
            }
            self.set_toast(format!("Created contact {contact_id}"));
        }
    }

    fn trash_selected(&mut self) {
        match self.focus {
            Focus::Notes => {
                let Some(note_id) = self.selected_note_id().cloned() else {
                    self.set_toast("No note selected");
                    return;
                };
                if self.apply_workspace_ops(vec![Op::Note(NoteOp::Trash {
                    note_id: note_id.clone(),
                })]) {
                    self.set_toast(format!("Trashed note {note_id}"));
                }
            }
            Focus::Contacts => {
                let Some(contact_id) = self.selected_contact_id().cloned() else {
                    self.set_toast("No contact selected");
                    return;
                };
                if self.apply_workspace_ops(vec![Op::Contact(crate::ops::ContactOp::Trash {
                    contact_id: contact_id.clone(),
                })]) {
                    self.set_toast(format!("Trashed contact {contact_id}"));
                }
            }
            Focus::Preview => self.set_toast("Focus a list pane to trash"),
        }
    }

    fn queue_edit_selected_note(&mut self) {
        match self.focus {
            Focus::Notes => {
                let Some(note_id) = self.selected_note_id().cloned() else {
                    self.set_toast("No note selected");
                    return;
                };
                self.pending_external_action = Some(ExternalAction::EditNoteBody(note_id));
            }
            _ => self.set_toast("Select a note to edit"),
        }
    }

    fn queue_edit_shown_note(&mut self) {
        match self.page_overlay.shown() {
            Some(EntityRef::Note(note_id)) => {
                self.pending_external_action =
                    Some(ExternalAction::EditNoteBody(note_id.clone()));
            }
            _ => self.set_toast("Only note bodies are editable"),
        }
    }

    fn execute_external_action(&mut self, action: ExternalAction) -> Result<(), String> {
        match action {
            ExternalAction::EditNoteBody(note_id) => self.edit_note_body_in_editor(&note_id),
        }
    }

    fn edit_note_body_in_editor(&mut self, note_id: &NoteId) -> Result<(), String> {
        let Some(note) = self.workspace.notes().get(note_id) else {
            return Err(format!("note not found: {note_id}"));
        };
        let original_body = note.body().to_owned();

        let temp_path = write_temp_note_file(note_id, &original_body)?;
        let editor_command = resolve_editor_command();

        let launch_result = launch_editor_command(&editor_command, &temp_path);
        let edited_body = fs::read_to_string(&temp_path).map_err(|err| {
            format!("failed reading edited note from {}: {err}", temp_path.display())
        });
        let _ = fs::remove_file(&temp_path);

        launch_result?;
        let edited_body = edited_body?;

        if edited_body == original_body {
            self.set_toast(format!("Edit cancelled (no changes): {note_id}"));
            return Ok(());
        }

        if self.apply_workspace_ops(vec![Op::Note(NoteOp::Update {
            note_id: note_id.clone(),
            patch: NotePatch { body: Some(edited_body), ..NotePatch::default() },
        })]) {
            self.set_toast(format!("Edited note {note_id}"));
        }
        Ok(())
    }

    fn yank_selected_entity_ref(&mut self) {
        let Some(entity_ref) = self.selected_entity_ref() else {
            self.set_toast("Nothing selected");
            return;
        };
        self.yank_entity_ref(&entity_ref);
    }

    fn yank_shown_entity_ref(&mut self) {
        let Some(entity_ref) = self.page_overlay.shown().cloned() else {
            return;
        };
        self.yank_entity_ref(&entity_ref);
    }

    fn yank_entity_ref(&mut self, entity_ref: &EntityRef) {
        let canonical = entity_ref.to_string();
        match copy_to_clipboard(&canonical) {
            Ok(backend) => self.set_toast(format!("Yanked {canonical} ({backend})")),
            Err(err) => self.set_toast(format!("Clipboard error: {err}")),
        }
    }
}

fn clamp_selection(state: &mut ListState, len: usize) {
    match state.selected() {
        Some(_) if len == 0 => state.select(None),
        Some(idx) if idx >= len => state.select(Some(len - 1)),
        None if len > 0 => state.select(Some(0)),
        _ => {}
    }
}

fn allocate_sequential_note_id(workspace: &Workspace) -> NoteId {
    for n in 1u32.. {
        let candidate = NoteId::new(format!("note-{n}")).expect("sequential id is valid");
        if !workspace.notes().contains_key(&candidate)
            && !workspace.trashed_notes().contains_key(&candidate)
        {
            return candidate;
        }
    }
    unreachable!("id allocation space exhausted")
}

fn allocate_sequential_contact_id(workspace: &Workspace) -> ContactId {
    for n in 1u32.. {
        let candidate = ContactId::new(format!("contact-{n}")).expect("sequential id is valid");
        if !workspace.contacts().contains_key(&candidate)
            && !workspace.trashed_contacts().contains_key(&candidate)
        {
            return candidate;
        }
    }
    unreachable!("id allocation space exhausted")
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }

    fn run_external_action(
        &mut self,
        action: impl FnOnce() -> Result<(), String>,
    ) -> Result<(), String> {
        let _suspend = TerminalSuspendGuard::new(&mut self.terminal)
            .map_err(|err| format!("terminal suspend failed: {err}"))?;
        action()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

struct TerminalSuspendGuard<'a> {
    terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>,
}

impl<'a> TerminalSuspendGuard<'a> {
    fn new(terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<Self> {
        terminal.show_cursor()?;
        disable_raw_mode()?;

        if let Err(err) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
            let _ = enable_raw_mode();
            let _ = execute!(terminal.backend_mut(), EnterAlternateScreen);
            let _ = terminal.hide_cursor();
            let _ = ratatui::backend::Backend::flush(terminal.backend_mut());
            return Err(err);
        }

        ratatui::backend::Backend::flush(terminal.backend_mut())?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSuspendGuard<'_> {
    fn drop(&mut self) {
        let _ = enable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), EnterAlternateScreen);
        let _ = self.terminal.clear();
        let _ = self.terminal.hide_cursor();
        let _ = ratatui::backend::Backend::flush(self.terminal.backend_mut());
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}

fn copy_to_clipboard(text: &str) -> Result<&'static str, String> {
    let mut stdout = io::stdout();
    execute!(stdout, Print(osc52_sequence(text))).map_err(|err| err.to_string())?;
    Ok("osc52")
}

fn osc52_sequence(text: &str) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}

fn resolve_editor_command() -> String {
    env::var("VISUAL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| env::var("EDITOR").ok().filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_owned())
}

fn write_temp_note_file(note_id: &NoteId, body: &str) -> Result<PathBuf, String> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let file_name = format!(
        "larissa-edit-{}-{}-{nanos}.md",
        std::process::id(),
        note_id.as_str().replace(|ch: char| !ch.is_alphanumeric(), "-")
    );
    let path = env::temp_dir().join(file_name);
    fs::write(&path, body)
        .map_err(|err| format!("failed writing {}: {err}", path.display()))?;
    Ok(path)
}

fn launch_editor_command(editor_command: &str, path: &Path) -> Result<(), String> {
    let mut parts = editor_command.split_whitespace();
    let Some(program) = parts.next() else {
        return Err("editor command is empty".to_owned());
    };

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|err| format!("failed launching editor '{editor_command}': {err}"))?;

    if !status.success() {
        return Err(format!("editor '{editor_command}' exited with {status}"));
    }
    Ok(())
}
