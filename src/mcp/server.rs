// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use tokio::sync::Mutex;

use crate::format::inline::extract_refs;
use crate::model::{Contact, ContactId, EntityRef, Note, NoteId, Workspace};
use crate::ops::{apply_ops, ApplyError, ApplyResult, ContactOp, ContactPatch, NoteOp, NotePatch, Op};
use crate::query::{backlinks, dangling_refs, search, search_candidates, SearchMode};
use crate::store::WorkspaceFolder;
use crate::ui::UiState;

use super::types::*;

#[derive(Debug)]
struct McpState {
    workspace: Workspace,
}

#[derive(Clone)]
pub struct LarissaMcp {
    state: Arc<Mutex<McpState>>,
    workspace_folder: Option<Arc<WorkspaceFolder>>,
    ui_state: Option<Arc<Mutex<UiState>>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl LarissaMcp {
    pub fn new(workspace: Workspace) -> Self {
        Self::new_with_ui_state(workspace, None)
    }

    pub fn new_with_ui_state(
        workspace: Workspace,
        ui_state: Option<Arc<Mutex<UiState>>>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(McpState { workspace })),
            workspace_folder: None,
            ui_state,
            tool_router: Self::tool_router(),
        }
    }

    pub fn new_persistent(workspace: Workspace, workspace_folder: WorkspaceFolder) -> Self {
        Self::new_persistent_with_ui_state(workspace, workspace_folder, None)
    }

    pub fn new_persistent_with_ui_state(
        workspace: Workspace,
        workspace_folder: WorkspaceFolder,
        ui_state: Option<Arc<Mutex<UiState>>>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(McpState { workspace })),
            workspace_folder: Some(Arc::new(workspace_folder)),
            ui_state,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    async fn notify_ui_workspace_changed(&self) {
        if let Some(ui_state) = self.ui_state.as_ref() {
            ui_state.lock().await.bump_workspace_rev();
        }
    }

    async fn read_context(&self, workspace_rev: u64) -> ReadContext {
        let mut context = ReadContext {
            workspace_rev,
            human_shown: None,
            human_nav_depth: None,
            ui_rev: None,
        };

        if let Some(ui_state) = self.ui_state.as_ref() {
            let snapshot = ui_state.lock().await.clone();
            context.human_shown = snapshot.human_shown().map(ToString::to_string);
            context.human_nav_depth = Some(snapshot.human_nav_depth());
            context.ui_rev = Some(snapshot.rev());
        }

        context
    }

    async fn lock_state_synced(&self) -> Result<tokio::sync::MutexGuard<'_, McpState>, ErrorData> {
        let mut state = self.state.lock().await;
        if let Some(workspace_folder) = &self.workspace_folder {
            let disk_workspace = workspace_folder.load_workspace().map_err(|err| {
                ErrorData::internal_error(
                    format!("failed to load workspace from disk: {err}"),
                    None,
                )
            })?;
            if disk_workspace != state.workspace {
                state.workspace = disk_workspace;
            }
        }
        Ok(state)
    }

    /// Applies ops against the synced workspace, persists when folder-backed,
    /// and publishes the change to the shared UI state.
    async fn apply_and_persist(
        &self,
        base_rev: u64,
        ops: Vec<Op>,
    ) -> Result<(ApplyResult, ReadContext), ErrorData> {
        let mut state = self.lock_state_synced().await?;

        let mut candidate = state.workspace.clone();
        let result = apply_ops(&mut candidate, base_rev, &ops).map_err(apply_error_to_mcp)?;

        if let Some(workspace_folder) = &self.workspace_folder {
            workspace_folder.save_workspace(&candidate).map_err(|err| {
                ErrorData::internal_error(format!("failed to persist workspace: {err}"), None)
            })?;
        }
        state.workspace = candidate;
        let workspace_rev = state.workspace.rev();
        drop(state);

        self.notify_ui_workspace_changed().await;
        let context = self.read_context(workspace_rev).await;
        Ok((result, context))
    }

    /// Workspace counts and revision; start here, then `note.list` /
    /// `contact.list`.
    #[tool(name = "workspace.stat")]
    async fn workspace_stat(&self) -> Result<Json<WorkspaceStatResponse>, ErrorData> {
        let state = self.lock_state_synced().await?;
        let workspace = &state.workspace;
        let response = WorkspaceStatResponse {
            workspace_id: workspace.workspace_id().as_str().to_owned(),
            rev: workspace.rev(),
            notes: workspace.notes().len() as u64,
            contacts: workspace.contacts().len() as u64,
            trashed_notes: workspace.trashed_notes().len() as u64,
            trashed_contacts: workspace.trashed_contacts().len() as u64,
            dangling_refs: dangling_refs(workspace).len() as u64,
            context: ReadContext {
                workspace_rev: workspace.rev(),
                human_shown: None,
                human_nav_depth: None,
                ui_rev: None,
            },
        };
        let workspace_rev = workspace.rev();
        drop(state);

        let context = self.read_context(workspace_rev).await;
        Ok(Json(WorkspaceStatResponse { context, ..response }))
    }

    /// Lists live and trashed notes.
    #[tool(name = "note.list")]
    async fn note_list(&self) -> Result<Json<ListNotesResponse>, ErrorData> {
        let state = self.lock_state_synced().await?;
        let notes = state.workspace.notes().values().map(note_summary).collect();
        let trashed_notes =
            state.workspace.trashed_notes().values().map(note_summary).collect();
        let workspace_rev = state.workspace.rev();
        drop(state);

        let context = self.read_context(workspace_rev).await;
        Ok(Json(ListNotesResponse { notes, trashed_notes, context }))
    }

    /// Reads one live note, including its embedded refs and backlinks.
    #[tool(name = "note.get")]
    async fn note_get(
        &self,
        params: Parameters<NoteGetParams>,
    ) -> Result<Json<NoteGetResponse>, ErrorData> {
        let note_id = parse_note_id(&params.0.note_id)?;

        let state = self.lock_state_synced().await?;
        let Some(note) = state.workspace.notes().get(&note_id) else {
            return Err(ErrorData::invalid_params(
                "note not found",
                Some(serde_json::json!({ "note_id": note_id.as_str() })),
            ));
        };
        let note = mcp_note(&state.workspace, note);
        let workspace_rev = state.workspace.rev();
        drop(state);

        let context = self.read_context(workspace_rev).await;
        Ok(Json(NoteGetResponse { note, context }))
    }

    /// Creates a note; omit `note_id` to allocate a slug from the title.
    #[tool(name = "note.create")]
    async fn note_create(
        &self,
        params: Parameters<NoteCreateParams>,
    ) -> Result<Json<NoteCreateResponse>, ErrorData> {
        let NoteCreateParams { note_id, title, body, tags, base_rev } = params.0;

        let note_id = {
            let state = self.lock_state_synced().await?;
            match note_id {
                Some(raw) => parse_note_id(&raw)?,
                None => allocate_note_id(&state.workspace, &title),
            }
        };

        let mut ops = vec![Op::Note(NoteOp::Create {
            note_id: note_id.clone(),
            title: title.clone(),
        })];
        if body.is_some() {
            ops.push(Op::Note(NoteOp::Update {
                note_id: note_id.clone(),
                patch: NotePatch { body, ..NotePatch::default() },
            }));
        }
        if let Some(tags) = tags {
            ops.push(Op::Note(NoteOp::SetTags {
                note_id: note_id.clone(),
                tags: tag_set(&tags),
            }));
        }

        let (result, context) = self.apply_and_persist(base_rev, ops).await?;

        let state = self.state.lock().await;
        let note = state
            .workspace
            .notes()
            .get(&note_id)
            .map(note_summary)
            .ok_or_else(|| ErrorData::internal_error("created note vanished", None))?;
        drop(state);

        Ok(Json(NoteCreateResponse { note, new_rev: result.new_rev, context }))
    }

    /// Patches a live note (title/body/pinned/tags).
    #[tool(name = "note.update")]
    async fn note_update(
        &self,
        params: Parameters<NoteUpdateParams>,
    ) -> Result<Json<MutationResponse>, ErrorData> {
        let NoteUpdateParams { note_id, base_rev, title, body, pinned, tags } = params.0;
        let note_id = parse_note_id(&note_id)?;

        let mut ops = Vec::new();
        if title.is_some() || body.is_some() || pinned.is_some() {
            ops.push(Op::Note(NoteOp::Update {
                note_id: note_id.clone(),
                patch: NotePatch { title, body, pinned },
            }));
        }
        if let Some(tags) = tags {
            ops.push(Op::Note(NoteOp::SetTags { note_id: note_id.clone(), tags: tag_set(&tags) }));
        }
        if ops.is_empty() {
            return Err(ErrorData::invalid_params("empty patch", None));
        }

        let (result, context) = self.apply_and_persist(base_rev, ops).await?;
        Ok(Json(mutation_response(result, context)))
    }

    /// Moves a live note to the trash; its references go stale.
    #[tool(name = "note.trash")]
    async fn note_trash(
        &self,
        params: Parameters<NoteLifecycleParams>,
    ) -> Result<Json<MutationResponse>, ErrorData> {
        let note_id = parse_note_id(&params.0.note_id)?;
        let (result, context) = self
            .apply_and_persist(params.0.base_rev, vec![Op::Note(NoteOp::Trash { note_id })])
            .await?;
        Ok(Json(mutation_response(result, context)))
    }

    /// Moves a trashed note back into the live collection.
    #[tool(name = "note.restore")]
    async fn note_restore(
        &self,
        params: Parameters<NoteLifecycleParams>,
    ) -> Result<Json<MutationResponse>, ErrorData> {
        let note_id = parse_note_id(&params.0.note_id)?;
        let (result, context) = self
            .apply_and_persist(params.0.base_rev, vec![Op::Note(NoteOp::Restore { note_id })])
            .await?;
        Ok(Json(mutation_response(result, context)))
    }

    /// Lists live and trashed contacts.
    #[tool(name = "contact.list")]
    async fn contact_list(&self) -> Result<Json<ListContactsResponse>, ErrorData> {
        let state = self.lock_state_synced().await?;
        let contacts = state.workspace.contacts().values().map(contact_summary).collect();
        let trashed_contacts =
            state.workspace.trashed_contacts().values().map(contact_summary).collect();
        let workspace_rev = state.workspace.rev();
        drop(state);

        let context = self.read_context(workspace_rev).await;
        Ok(Json(ListContactsResponse { contacts, trashed_contacts, context }))
    }

    /// Reads one live contact, including its embedded refs and backlinks.
    #[tool(name = "contact.get")]
    async fn contact_get(
        &self,
        params: Parameters<ContactGetParams>,
    ) -> Result<Json<ContactGetResponse>, ErrorData> {
        let contact_id = parse_contact_id(&params.0.contact_id)?;

        let state = self.lock_state_synced().await?;
        let Some(contact) = state.workspace.contacts().get(&contact_id) else {
            return Err(ErrorData::invalid_params(
                "contact not found",
                Some(serde_json::json!({ "contact_id": contact_id.as_str() })),
            ));
        };
        let contact = mcp_contact(&state.workspace, contact);
        let workspace_rev = state.workspace.rev();
        drop(state);

        let context = self.read_context(workspace_rev).await;
        Ok(Json(ContactGetResponse { contact, context }))
    }

    /// Creates a contact; omit `contact_id` to allocate a slug from the name.
    #[tool(name = "contact.create")]
    async fn contact_create(
        &self,
        params: Parameters<ContactCreateParams>,
    ) -> Result<Json<ContactCreateResponse>, ErrorData> {
        let ContactCreateParams { contact_id, name, email, phone, about, tags, base_rev } =
            params.0;

        let contact_id = {
            let state = self.lock_state_synced().await?;
            match contact_id {
                Some(raw) => parse_contact_id(&raw)?,
                None => allocate_contact_id(&state.workspace, &name),
            }
        };

        let mut ops = vec![Op::Contact(ContactOp::Create {
            contact_id: contact_id.clone(),
            name: name.clone(),
        })];
        if let Some(email) = email {
            ops.push(Op::Contact(ContactOp::SetEmail {
                contact_id: contact_id.clone(),
                email: Some(email),
            }));
        }
        if let Some(phone) = phone {
            ops.push(Op::Contact(ContactOp::SetPhone {
                contact_id: contact_id.clone(),
                phone: Some(phone),
            }));
        }
        if about.is_some() {
            ops.push(Op::Contact(ContactOp::Update {
                contact_id: contact_id.clone(),
                patch: ContactPatch { about, ..ContactPatch::default() },
            }));
        }
        if let Some(tags) = tags {
            ops.push(Op::Contact(ContactOp::SetTags {
                contact_id: contact_id.clone(),
                tags: tag_set(&tags),
            }));
        }

        let (result, context) = self.apply_and_persist(base_rev, ops).await?;

        let state = self.state.lock().await;
        let contact = state
            .workspace
            .contacts()
            .get(&contact_id)
            .map(contact_summary)
            .ok_or_else(|| ErrorData::internal_error("created contact vanished", None))?;
        drop(state);

        Ok(Json(ContactCreateResponse { contact, new_rev: result.new_rev, context }))
    }

    /// Patches a live contact (name/about/email/phone/tags).
    #[tool(name = "contact.update")]
    async fn contact_update(
        &self,
        params: Parameters<ContactUpdateParams>,
    ) -> Result<Json<MutationResponse>, ErrorData> {
        let ContactUpdateParams { contact_id, base_rev, name, about, email, phone, tags } =
            params.0;
        let contact_id = parse_contact_id(&contact_id)?;

        let mut ops = Vec::new();
        if name.is_some() || about.is_some() {
            ops.push(Op::Contact(ContactOp::Update {
                contact_id: contact_id.clone(),
                patch: ContactPatch { name, about },
            }));
        }
        if let Some(email) = email {
            ops.push(Op::Contact(ContactOp::SetEmail {
                contact_id: contact_id.clone(),
                email: Some(email),
            }));
        }
        if let Some(phone) = phone {
            ops.push(Op::Contact(ContactOp::SetPhone {
                contact_id: contact_id.clone(),
                phone: Some(phone),
            }));
        }
        if let Some(tags) = tags {
            ops.push(Op::Contact(ContactOp::SetTags {
                contact_id: contact_id.clone(),
                tags: tag_set(&tags),
            }));
        }
        if ops.is_empty() {
            return Err(ErrorData::invalid_params("empty patch", None));
        }

        let (result, context) = self.apply_and_persist(base_rev, ops).await?;
        Ok(Json(mutation_response(result, context)))
    }

    /// Moves a live contact to the trash; its references go stale.
    #[tool(name = "contact.trash")]
    async fn contact_trash(
        &self,
        params: Parameters<ContactLifecycleParams>,
    ) -> Result<Json<MutationResponse>, ErrorData> {
        let contact_id = parse_contact_id(&params.0.contact_id)?;
        let (result, context) = self
            .apply_and_persist(
                params.0.base_rev,
                vec![Op::Contact(ContactOp::Trash { contact_id })],
            )
            .await?;
        Ok(Json(mutation_response(result, context)))
    }

    /// Moves a trashed contact back into the live collection.
    #[tool(name = "contact.restore")]
    async fn contact_restore(
        &self,
        params: Parameters<ContactLifecycleParams>,
    ) -> Result<Json<MutationResponse>, ErrorData> {
        let contact_id = parse_contact_id(&params.0.contact_id)?;
        let (result, context) = self
            .apply_and_persist(
                params.0.base_rev,
                vec![Op::Contact(ContactOp::Restore { contact_id })],
            )
            .await?;
        Ok(Json(mutation_response(result, context)))
    }

    /// Searches live notes and contacts. Modes: substring (default), regex,
    /// fuzzy (ranked).
    #[tool(name = "search.query")]
    async fn search_query(
        &self,
        params: Parameters<SearchQueryParams>,
    ) -> Result<Json<SearchQueryResponse>, ErrorData> {
        let SearchQueryParams { query, mode, limit } = params.0;
        let mode = parse_search_mode(mode.as_deref())?;

        let state = self.lock_state_synced().await?;
        let candidates = search_candidates(&state.workspace);
        let results = search(&candidates, &query, mode).map_err(|err| {
            ErrorData::invalid_params(
                format!("invalid search pattern: {err}"),
                Some(serde_json::json!({ "query": query })),
            )
        })?;

        let limit = limit.unwrap_or(u64::MAX) as usize;
        let hits = results
            .iter()
            .take(limit)
            .map(|entity_ref| SearchHit {
                entity_ref: entity_ref.to_string(),
                label: state
                    .workspace
                    .entity_label(entity_ref)
                    .unwrap_or_default()
                    .to_owned(),
            })
            .collect();
        let workspace_rev = state.workspace.rev();
        drop(state);

        let context = self.read_context(workspace_rev).await;
        Ok(Json(SearchQueryResponse { hits, context }))
    }

    /// Live entities whose body references the target.
    #[tool(name = "refs.backlinks")]
    async fn refs_backlinks(
        &self,
        params: Parameters<BacklinksParams>,
    ) -> Result<Json<BacklinksResponse>, ErrorData> {
        let target = parse_entity_ref(&params.0.target_ref)?;

        let state = self.lock_state_synced().await?;
        let backlinks = backlinks(&state.workspace, &target)
            .iter()
            .map(ToString::to_string)
            .collect();
        let workspace_rev = state.workspace.rev();
        drop(state);

        let context = self.read_context(workspace_rev).await;
        Ok(Json(BacklinksResponse {
            target_ref: target.to_string(),
            backlinks,
            context,
        }))
    }

    /// Embedded references that no longer resolve against the live
    /// collections.
    #[tool(name = "refs.dangling")]
    async fn refs_dangling(&self) -> Result<Json<DanglingRefsResponse>, ErrorData> {
        let state = self.lock_state_synced().await?;
        let dangling = dangling_refs(&state.workspace)
            .into_iter()
            .map(|dangling| McpDanglingRef {
                source_ref: dangling.source.to_string(),
                target_ref: dangling.target.to_string(),
            })
            .collect();
        let workspace_rev = state.workspace.rev();
        drop(state);

        let context = self.read_context(workspace_rev).await;
        Ok(Json(DanglingRefsResponse { dangling, context }))
    }

    /// The human's current overlay state, when the TUI shares it.
    #[tool(name = "view.read_state")]
    async fn view_read_state(&self) -> Result<Json<ViewReadStateResponse>, ErrorData> {
        let state = self.lock_state_synced().await?;
        let workspace_rev = state.workspace.rev();
        drop(state);

        let context = self.read_context(workspace_rev).await;
        Ok(Json(ViewReadStateResponse {
            human_shown: context.human_shown.clone(),
            human_nav_depth: context.human_nav_depth,
            context,
        }))
    }
}

#[tool_handler]
impl ServerHandler for LarissaMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Larissa notes & contacts workspace server (tools: workspace.stat, note.list, note.get, note.create, note.update, note.trash, note.restore, contact.list, contact.get, contact.create, contact.update, contact.trash, contact.restore, search.query, refs.backlinks, refs.dangling, view.read_state)"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// Extracted mapping/parsing helpers for MCP tool handlers.
include!("server/helpers.rs");

#[cfg(test)]
mod tests;
