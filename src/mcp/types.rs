// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Context block embedded in every response: the workspace revision the
/// answer was computed against, plus the human's overlay state when the TUI
/// shares it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadContext {
    pub workspace_rev: u64,
    pub human_shown: Option<String>,
    pub human_nav_depth: Option<u64>,
    pub ui_rev: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkspaceStatResponse {
    pub workspace_id: String,
    pub rev: u64,
    pub notes: u64,
    pub contacts: u64,
    pub trashed_notes: u64,
    pub trashed_contacts: u64,
    pub dangling_refs: u64,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NoteSummary {
    pub note_id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub pinned: bool,
    pub rev: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListNotesResponse {
    pub notes: Vec<NoteSummary>,
    pub trashed_notes: Vec<NoteSummary>,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContactSummary {
    pub contact_id: String,
    pub name: String,
    pub email: Option<String>,
    pub tags: Vec<String>,
    pub rev: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListContactsResponse {
    pub contacts: Vec<ContactSummary>,
    pub trashed_contacts: Vec<ContactSummary>,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NoteGetParams {
    pub note_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpNote {
    pub note_id: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub pinned: bool,
    pub rev: u64,
    /// Canonical refs embedded in the body, first-occurrence order.
    pub refs: Vec<String>,
    /// Canonical refs of live entities whose body references this note.
    pub backlinks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NoteGetResponse {
    pub note: McpNote,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NoteCreateParams {
    /// Omit to allocate a slug from the title.
    pub note_id: Option<String>,
    pub title: String,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub base_rev: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NoteCreateResponse {
    pub note: NoteSummary,
    pub new_rev: u64,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NoteUpdateParams {
    pub note_id: String,
    pub base_rev: u64,
    pub title: Option<String>,
    pub body: Option<String>,
    pub pinned: Option<bool>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NoteLifecycleParams {
    pub note_id: String,
    pub base_rev: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ContactGetParams {
    pub contact_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpContact {
    pub contact_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub about: String,
    pub tags: Vec<String>,
    pub rev: u64,
    pub refs: Vec<String>,
    pub backlinks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContactGetResponse {
    pub contact: McpContact,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ContactCreateParams {
    /// Omit to allocate a slug from the name.
    pub contact_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub tags: Option<Vec<String>>,
    pub base_rev: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContactCreateResponse {
    pub contact: ContactSummary,
    pub new_rev: u64,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ContactUpdateParams {
    pub contact_id: String,
    pub base_rev: u64,
    pub name: Option<String>,
    pub about: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ContactLifecycleParams {
    pub contact_id: String,
    pub base_rev: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MutationResponse {
    pub new_rev: u64,
    pub applied: u64,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub updated: Vec<String>,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchQueryParams {
    pub query: String,
    /// One of `substring` (default), `regex`, `fuzzy`.
    pub mode: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchHit {
    pub entity_ref: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchQueryResponse {
    pub hits: Vec<SearchHit>,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BacklinksParams {
    /// Canonical entity ref, e.g. `e:note/kickoff`.
    pub target_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BacklinksResponse {
    pub target_ref: String,
    pub backlinks: Vec<String>,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpDanglingRef {
    pub source_ref: String,
    pub target_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DanglingRefsResponse {
    pub dangling: Vec<McpDanglingRef>,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewReadStateResponse {
    pub human_shown: Option<String>,
    pub human_nav_depth: Option<u64>,
    pub context: ReadContext,
}
