// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::{Contact, IdError, Note, Workspace, WorkspaceId};

const WORKSPACE_META_FILENAME: &str = "larissa-workspace.meta.json";
const NOTES_DIRNAME: &str = "notes";
const CONTACTS_DIRNAME: &str = "contacts";
const TRASH_DIRNAME: &str = "trash";

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidId {
        field: &'static str,
        value: String,
        source: Box<IdError>,
    },
    InvalidRelativePath {
        field: &'static str,
        value: PathBuf,
    },
    PathOutsideWorkspace {
        workspace_dir: PathBuf,
        path: PathBuf,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::InvalidId { field, value, source } => {
                write!(f, "invalid id for {field}: {value:?}: {source}")
            }
            Self::InvalidRelativePath { field, value } => {
                write!(f, "invalid relative path for {field}: {value:?}")
            }
            Self::PathOutsideWorkspace { workspace_dir, path } => write!(
                f,
                "path is outside workspace dir: workspace_dir={workspace_dir:?} path={path:?}"
            ),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidId { source, .. } => Some(source),
            Self::InvalidRelativePath { .. } => None,
            Self::PathOutsideWorkspace { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceMeta {
    pub workspace_id: WorkspaceId,
    pub rev: u64,
}

/// Folder-backed workspace persistence.
///
/// Layout: a meta JSON at the root, one JSON file per entity under `notes/`
/// and `contacts/`, and trashed entities under `trash/notes/` and
/// `trash/contacts/`. All writes are atomic temp-file renames confined to the
/// workspace dir and never follow symlinks.
#[derive(Debug, Clone)]
pub struct WorkspaceFolder {
    root: PathBuf,
    durability: WriteDurability,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to
    /// stable storage where possible. Exact guarantees are
    /// platform/filesystem-dependent.
    Durable,
}

impl WorkspaceFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta_path(&self) -> PathBuf {
        self.root.join(WORKSPACE_META_FILENAME)
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.root.join(NOTES_DIRNAME)
    }

    pub fn contacts_dir(&self) -> PathBuf {
        self.root.join(CONTACTS_DIRNAME)
    }

    pub fn trashed_notes_dir(&self) -> PathBuf {
        self.root.join(TRASH_DIRNAME).join(NOTES_DIRNAME)
    }

    pub fn trashed_contacts_dir(&self) -> PathBuf {
        self.root.join(TRASH_DIRNAME).join(CONTACTS_DIRNAME)
    }

    fn entity_file_name(id: &str) -> String {
        format!("{}.json", encode_persisted_id_segment(id))
    }

    pub fn note_path(&self, note_id: &crate::model::NoteId) -> PathBuf {
        self.notes_dir().join(Self::entity_file_name(note_id.as_str()))
    }

    pub fn contact_path(&self, contact_id: &crate::model::ContactId) -> PathBuf {
        self.contacts_dir().join(Self::entity_file_name(contact_id.as_str()))
    }

    fn initial_workspace_id(&self) -> WorkspaceId {
        let candidate = self
            .root
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .map(|name| name.to_owned())
            .unwrap_or_else(|| "workspace".to_owned());

        WorkspaceId::new(candidate).unwrap_or_else(|_| {
            WorkspaceId::new("workspace").expect("hard-coded fallback workspace id is valid")
        })
    }

    fn initial_workspace(&self) -> Workspace {
        let mut workspace = Workspace::new(self.initial_workspace_id());
        let note_id =
            crate::model::NoteId::new("welcome").expect("hard-coded initial note id is valid");
        let mut note = Note::new(note_id.clone(), "Welcome");
        note.set_body(
            "This workspace is empty. Create notes and contacts, and link them \
             with [[note:welcome]]-style references.",
        );
        workspace.notes_mut().insert(note_id, note);
        workspace
    }

    pub fn load_or_init_workspace(&self) -> Result<Workspace, StoreError> {
        match self.load_workspace() {
            Ok(workspace) => Ok(workspace),
            Err(StoreError::Io { path, source })
                if source.kind() == io::ErrorKind::NotFound && path == self.meta_path() =>
            {
                let workspace = self.initial_workspace();
                self.save_workspace(&workspace)?;
                Ok(workspace)
            }
            Err(err) => Err(err),
        }
    }

    pub fn load_meta(&self) -> Result<WorkspaceMeta, StoreError> {
        let path = self.meta_path();
        let raw = fs::read_to_string(&path)
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;
        let meta_json: WorkspaceMetaJson = serde_json::from_str(&raw)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;

        let workspace_id =
            WorkspaceId::new(meta_json.workspace_id.clone()).map_err(|source| {
                StoreError::InvalidId {
                    field: "workspace_id",
                    value: meta_json.workspace_id.clone(),
                    source: Box::new(source),
                }
            })?;

        Ok(WorkspaceMeta { workspace_id, rev: meta_json.rev })
    }

    pub fn save_meta(&self, meta: &WorkspaceMeta) -> Result<(), StoreError> {
        let meta_json = WorkspaceMetaJson {
            workspace_id: meta.workspace_id.as_str().to_owned(),
            rev: meta.rev,
        };
        let path = self.meta_path();
        let contents = serde_json::to_vec_pretty(&meta_json)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        write_atomic_in_workspace(&self.root, &path, &contents, self.durability)
    }

    pub fn load_workspace(&self) -> Result<Workspace, StoreError> {
        let meta = self.load_meta()?;
        let mut workspace = Workspace::new(meta.workspace_id);
        workspace.set_rev(meta.rev);

        for path in list_entity_json_files(&self.notes_dir())? {
            let note = load_note_file(&path)?;
            workspace.notes_mut().insert(note.note_id().clone(), note);
        }
        for path in list_entity_json_files(&self.contacts_dir())? {
            let contact = load_contact_file(&path)?;
            workspace.contacts_mut().insert(contact.contact_id().clone(), contact);
        }
        for path in list_entity_json_files(&self.trashed_notes_dir())? {
            let note = load_note_file(&path)?;
            workspace.trashed_notes_mut().insert(note.note_id().clone(), note);
        }
        for path in list_entity_json_files(&self.trashed_contacts_dir())? {
            let contact = load_contact_file(&path)?;
            workspace
                .trashed_contacts_mut()
                .insert(contact.contact_id().clone(), contact);
        }

        Ok(workspace)
    }

    /// Persists the whole workspace and removes files for entities that no
    /// longer exist (renamed ids, purges, trash moves).
    pub fn save_workspace(&self, workspace: &Workspace) -> Result<(), StoreError> {
        let meta = WorkspaceMeta {
            workspace_id: workspace.workspace_id().clone(),
            rev: workspace.rev(),
        };
        self.save_meta(&meta)?;

        let mut expected_notes = BTreeSet::new();
        for (note_id, note) in workspace.notes() {
            let file_name = Self::entity_file_name(note_id.as_str());
            let path = self.notes_dir().join(&file_name);
            self.write_json_entity(&path, &note_to_json(note))?;
            expected_notes.insert(file_name);
        }

        let mut expected_contacts = BTreeSet::new();
        for (contact_id, contact) in workspace.contacts() {
            let file_name = Self::entity_file_name(contact_id.as_str());
            let path = self.contacts_dir().join(&file_name);
            self.write_json_entity(&path, &contact_to_json(contact))?;
            expected_contacts.insert(file_name);
        }

        let mut expected_trashed_notes = BTreeSet::new();
        for (note_id, note) in workspace.trashed_notes() {
            let file_name = Self::entity_file_name(note_id.as_str());
            let path = self.trashed_notes_dir().join(&file_name);
            self.write_json_entity(&path, &note_to_json(note))?;
            expected_trashed_notes.insert(file_name);
        }

        let mut expected_trashed_contacts = BTreeSet::new();
        for (contact_id, contact) in workspace.trashed_contacts() {
            let file_name = Self::entity_file_name(contact_id.as_str());
            let path = self.trashed_contacts_dir().join(&file_name);
            self.write_json_entity(&path, &contact_to_json(contact))?;
            expected_trashed_contacts.insert(file_name);
        }

        garbage_collect_entity_files(&self.notes_dir(), &expected_notes)?;
        garbage_collect_entity_files(&self.contacts_dir(), &expected_contacts)?;
        garbage_collect_entity_files(&self.trashed_notes_dir(), &expected_trashed_notes)?;
        garbage_collect_entity_files(&self.trashed_contacts_dir(), &expected_trashed_contacts)?;

        Ok(())
    }

    fn write_json_entity<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(value)
            .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;
        write_atomic_in_workspace(&self.root, path, &contents, self.durability)
    }
}

// Extracted JSON mapping, filename encoding and atomic-write helpers.
include!("workspace_folder/helpers.rs");
