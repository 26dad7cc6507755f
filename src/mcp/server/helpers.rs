// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

fn note_summary(note: &Note) -> NoteSummary {
    NoteSummary {
        note_id: note.note_id().as_str().to_owned(),
        title: note.title().to_owned(),
        tags: note.tags().iter().map(|tag| tag.to_string()).collect(),
        pinned: note.pinned(),
        rev: note.rev(),
    }
}

fn contact_summary(contact: &Contact) -> ContactSummary {
    ContactSummary {
        contact_id: contact.contact_id().as_str().to_owned(),
        name: contact.name().to_owned(),
        email: contact.email().map(|email| email.to_owned()),
        tags: contact.tags().iter().map(|tag| tag.to_string()).collect(),
        rev: contact.rev(),
    }
}

fn mcp_note(workspace: &Workspace, note: &Note) -> McpNote {
    let entity_ref = EntityRef::Note(note.note_id().clone());
    McpNote {
        note_id: note.note_id().as_str().to_owned(),
        title: note.title().to_owned(),
        body: note.body().to_owned(),
        tags: note.tags().iter().map(|tag| tag.to_string()).collect(),
        pinned: note.pinned(),
        rev: note.rev(),
        refs: extract_refs(note.body()).iter().map(ToString::to_string).collect(),
        backlinks: backlinks(workspace, &entity_ref)
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

fn mcp_contact(workspace: &Workspace, contact: &Contact) -> McpContact {
    let entity_ref = EntityRef::Contact(contact.contact_id().clone());
    McpContact {
        contact_id: contact.contact_id().as_str().to_owned(),
        name: contact.name().to_owned(),
        email: contact.email().map(|email| email.to_owned()),
        phone: contact.phone().map(|phone| phone.to_owned()),
        about: contact.about().to_owned(),
        tags: contact.tags().iter().map(|tag| tag.to_string()).collect(),
        rev: contact.rev(),
        refs: extract_refs(contact.about()).iter().map(ToString::to_string).collect(),
        backlinks: backlinks(workspace, &entity_ref)
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

fn mutation_response(result: ApplyResult, context: ReadContext) -> MutationResponse {
    MutationResponse {
        new_rev: result.new_rev,
        applied: result.applied as u64,
        added: result.delta.added.iter().map(ToString::to_string).collect(),
        removed: result.delta.removed.iter().map(ToString::to_string).collect(),
        updated: result.delta.updated.iter().map(ToString::to_string).collect(),
        context,
    }
}

fn tag_set(tags: &[String]) -> BTreeSet<smol_str::SmolStr> {
    tags.iter().map(|tag| smol_str::SmolStr::new(tag)).collect()
}

fn parse_note_id(raw: &str) -> Result<NoteId, ErrorData> {
    NoteId::new(raw.to_owned()).map_err(|err| {
        ErrorData::invalid_params(
            format!("invalid note_id: {err}"),
            Some(serde_json::json!({ "note_id": raw })),
        )
    })
}

fn parse_contact_id(raw: &str) -> Result<ContactId, ErrorData> {
    ContactId::new(raw.to_owned()).map_err(|err| {
        ErrorData::invalid_params(
            format!("invalid contact_id: {err}"),
            Some(serde_json::json!({ "contact_id": raw })),
        )
    })
}

fn parse_entity_ref(raw: &str) -> Result<EntityRef, ErrorData> {
    raw.parse::<EntityRef>().map_err(|err| {
        ErrorData::invalid_params(
            format!("invalid entity ref: {err}"),
            Some(serde_json::json!({ "target_ref": raw })),
        )
    })
}

fn parse_search_mode(raw: Option<&str>) -> Result<SearchMode, ErrorData> {
    match raw {
        None | Some("substring") => Ok(SearchMode::Substring),
        Some("regex") => Ok(SearchMode::Regex),
        Some("fuzzy") => Ok(SearchMode::Fuzzy),
        Some(other) => Err(ErrorData::invalid_params(
            "expected mode 'substring', 'regex' or 'fuzzy'",
            Some(serde_json::json!({ "mode": other })),
        )),
    }
}

fn apply_error_to_mcp(err: ApplyError) -> ErrorData {
    match &err {
        ApplyError::Conflict { base_rev, current_rev } => ErrorData::invalid_params(
            err.to_string(),
            Some(serde_json::json!({ "base_rev": base_rev, "current_rev": current_rev })),
        ),
        ApplyError::AlreadyExists { id, .. } | ApplyError::NotFound { id, .. } => {
            ErrorData::invalid_params(err.to_string(), Some(serde_json::json!({ "id": id })))
        }
    }
}

/// Lowercased alphanumeric slug with `-` separators; empty input falls back
/// to the given default.
fn slugify(input: &str, fallback: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        fallback.to_owned()
    } else {
        slug
    }
}

fn allocate_note_id(workspace: &Workspace, title: &str) -> NoteId {
    let base = slugify(title, "note");
    let taken = |candidate: &NoteId| {
        workspace.notes().contains_key(candidate)
            || workspace.trashed_notes().contains_key(candidate)
    };

    let candidate = NoteId::new(base.clone()).expect("slug is a valid id segment");
    if !taken(&candidate) {
        return candidate;
    }
    for n in 2u32.. {
        let candidate =
            NoteId::new(format!("{base}-{n}")).expect("slug is a valid id segment");
        if !taken(&candidate) {
            return candidate;
        }
    }
    unreachable!("id allocation space exhausted")
}

fn allocate_contact_id(workspace: &Workspace, name: &str) -> ContactId {
    let base = slugify(name, "contact");
    let taken = |candidate: &ContactId| {
        workspace.contacts().contains_key(candidate)
            || workspace.trashed_contacts().contains_key(candidate)
    };

    let candidate = ContactId::new(base.clone()).expect("slug is a valid id segment");
    if !taken(&candidate) {
        return candidate;
    }
    for n in 2u32.. {
        let candidate =
            ContactId::new(format!("{base}-{n}")).expect("slug is a valid id segment");
        if !taken(&candidate) {
            return candidate;
        }
    }
    unreachable!("id allocation space exhausted")
}
