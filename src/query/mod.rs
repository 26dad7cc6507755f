// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over a workspace: search, backlinks, dangling refs.

pub mod backlinks;
pub mod search;

pub use backlinks::{backlinks, dangling_refs, DanglingRef};
pub use search::{search, search_candidates, SearchCandidate, SearchMode};
