// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for workspaces on disk.
//!
//! The store module reads/writes the workspace folder format (meta file plus
//! per-entity JSON files) used by both the TUI and MCP server.

pub mod workspace_folder;

pub use workspace_folder::{StoreError, WorkspaceFolder, WorkspaceMeta, WriteDurability};
