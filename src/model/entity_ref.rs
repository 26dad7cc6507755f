// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::ids::{ContactId, IdError, NoteId};

/// The closed set of detail-view kinds.
///
/// Adding a kind here forces every dispatch site (back-navigation, inline
/// token parsing, store layout) through an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Note,
    Contact,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Contact => "contact",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEntityKindError;

impl fmt::Display for ParseEntityKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected 'note' or 'contact'")
    }
}

impl std::error::Error for ParseEntityKindError {}

impl FromStr for EntityKind {
    type Err = ParseEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(Self::Note),
            "contact" => Ok(Self::Contact),
            _ => Err(ParseEntityKindError),
        }
    }
}

/// Canonical stable reference to one detail view, used by the navigation
/// stack, the UI and MCP tools.
///
/// Canonical format: `e:note/<id>` or `e:contact/<id>`. A reference carries
/// only the id, never a copy of the entity, so it is always re-resolved
/// against the live collections before display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    Note(NoteId),
    Contact(ContactId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Note(_) => EntityKind::Note,
            Self::Contact(_) => EntityKind::Contact,
        }
    }

    pub fn id_str(&self) -> &str {
        match self {
            Self::Note(note_id) => note_id.as_str(),
            Self::Contact(contact_id) => contact_id.as_str(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseEntityRefError> {
        const PREFIX: &str = "e:";
        let rest = input.strip_prefix(PREFIX).ok_or(ParseEntityRefError::MissingPrefix)?;

        let (kind_str, id_str) = rest.split_once('/').ok_or(ParseEntityRefError::MissingId)?;

        if kind_str.is_empty() {
            return Err(ParseEntityRefError::MissingKind);
        }
        let kind = kind_str
            .parse::<EntityKind>()
            .map_err(|_| ParseEntityRefError::UnknownKind(kind_str.to_owned()))?;

        if id_str.is_empty() {
            return Err(ParseEntityRefError::MissingId);
        }

        Self::from_parts(kind, id_str).map_err(ParseEntityRefError::InvalidId)
    }

    pub fn from_parts(kind: EntityKind, id: &str) -> Result<Self, IdError> {
        match kind {
            EntityKind::Note => Ok(Self::Note(NoteId::new(id.to_owned())?)),
            EntityKind::Contact => Ok(Self::Contact(ContactId::new(id.to_owned())?)),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e:{}/{}", self.kind(), self.id_str())
    }
}

impl FromStr for EntityRef {
    type Err = ParseEntityRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEntityRefError {
    MissingPrefix,
    MissingKind,
    UnknownKind(String),
    MissingId,
    InvalidId(IdError),
}

impl fmt::Display for ParseEntityRefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrefix => f.write_str("entity ref must start with 'e:'"),
            Self::MissingKind => f.write_str("entity ref is missing a kind"),
            Self::UnknownKind(kind) => write!(f, "unknown entity kind {kind:?}"),
            Self::MissingId => f.write_str("entity ref is missing an id"),
            Self::InvalidId(err) => write!(f, "invalid entity id: {err}"),
        }
    }
}

impl std::error::Error for ParseEntityRefError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidId(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityKind, EntityRef, ParseEntityRefError};

    #[test]
    fn parses_and_formats_canonical_forms() {
        let cases = ["e:note/inbox", "e:contact/ada-lovelace", "e:note/n:0042"];

        for s in cases {
            let parsed: EntityRef = s.parse().expect("parse");
            assert_eq!(parsed.to_string(), s);
            let reparsed: EntityRef = parsed.to_string().parse().expect("reparse");
            assert_eq!(reparsed, parsed);
        }
    }

    #[test]
    fn kind_matches_variant() {
        let note: EntityRef = "e:note/a".parse().expect("parse");
        assert_eq!(note.kind(), EntityKind::Note);

        let contact: EntityRef = "e:contact/b".parse().expect("parse");
        assert_eq!(contact.kind(), EntityKind::Contact);
    }

    #[test]
    fn rejects_missing_prefix() {
        let err = "note/inbox".parse::<EntityRef>().unwrap_err();
        assert_eq!(err, ParseEntityRefError::MissingPrefix);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "e:tag/urgent".parse::<EntityRef>().unwrap_err();
        assert_eq!(err, ParseEntityRefError::UnknownKind("tag".to_owned()));
    }

    #[test]
    fn rejects_missing_kind() {
        let err = "e:/inbox".parse::<EntityRef>().unwrap_err();
        assert_eq!(err, ParseEntityRefError::MissingKind);
    }

    #[test]
    fn rejects_missing_id() {
        let err = "e:note/".parse::<EntityRef>().unwrap_err();
        assert_eq!(err, ParseEntityRefError::MissingId);

        let err = "e:note".parse::<EntityRef>().unwrap_err();
        assert_eq!(err, ParseEntityRefError::MissingId);
    }
}
