// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use smol_str::SmolStr;

use super::ids::ContactId;

/// A single contact. The `about` text is free-form and may embed inline
/// reference tokens, just like a note body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    contact_id: ContactId,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    about: String,
    tags: BTreeSet<SmolStr>,
    rev: u64,
}

impl Contact {
    pub fn new(contact_id: ContactId, name: impl Into<String>) -> Self {
        Self {
            contact_id,
            name: name.into(),
            email: None,
            phone: None,
            about: String::new(),
            tags: BTreeSet::new(),
            rev: 0,
        }
    }

    pub fn contact_id(&self) -> &ContactId {
        &self.contact_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn set_email(&mut self, email: Option<String>) {
        self.email = email;
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn set_phone(&mut self, phone: Option<String>) {
        self.phone = phone;
    }

    pub fn about(&self) -> &str {
        &self.about
    }

    pub fn set_about(&mut self, about: impl Into<String>) {
        self.about = about.into();
    }

    pub fn tags(&self) -> &BTreeSet<SmolStr> {
        &self.tags
    }

    pub fn set_tags(&mut self, tags: BTreeSet<SmolStr>) {
        self.tags = tags;
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }

    pub fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }
}
