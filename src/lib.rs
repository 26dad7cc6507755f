// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Larissa: notes & contacts TUI with drill-down overlay navigation
//! (workspace model + MCP server).
//!
//! This crate uses a single-crate layout: `model` and `nav` are the core,
//! `format`/`query`/`ops`/`store` support them, `tui` and `mcp` are the two
//! front ends.

pub mod format;
pub mod mcp;
pub mod model;
pub mod nav;
pub mod ops;
pub mod query;
pub mod store;
pub mod tui;
pub mod ui;
