// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Drill-down navigation: the per-surface history stack and the overlay
//! open/back/close algorithms.
//!
//! Every surface (the page-level overlay and any nested one) owns its own
//! [`OverlayController`] with its own [`NavStack`]; the algorithms are
//! written once here and instantiated per surface.

pub mod overlay;
pub mod stack;

pub use overlay::{
    ActivateOutcome, BackOutcome, EntityResolver, OverlayController, OverlaySurface,
};
pub use stack::NavStack;
