// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rayon::prelude::*;
use regex::RegexBuilder;

use crate::model::{EntityRef, Workspace};

/// Above this many candidates, fuzzy scoring fans out across a rayon pool.
const PARALLEL_SCORING_THRESHOLD: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Substring,
    Regex,
    Fuzzy,
}

/// One searchable entity with its pre-joined haystack text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    pub entity_ref: EntityRef,
    pub haystack: String,
}

/// Builds candidates from the live collections only; trashed entities are
/// not searchable.
pub fn search_candidates(workspace: &Workspace) -> Vec<SearchCandidate> {
    let mut candidates = Vec::with_capacity(workspace.notes().len() + workspace.contacts().len());

    for (note_id, note) in workspace.notes() {
        let mut haystack = String::new();
        haystack.push_str(note.title());
        haystack.push('\n');
        haystack.push_str(note.body());
        for tag in note.tags() {
            haystack.push('\n');
            haystack.push('#');
            haystack.push_str(tag);
        }
        candidates.push(SearchCandidate {
            entity_ref: EntityRef::Note(note_id.clone()),
            haystack,
        });
    }

    for (contact_id, contact) in workspace.contacts() {
        let mut haystack = String::new();
        haystack.push_str(contact.name());
        if let Some(email) = contact.email() {
            haystack.push('\n');
            haystack.push_str(email);
        }
        if let Some(phone) = contact.phone() {
            haystack.push('\n');
            haystack.push_str(phone);
        }
        haystack.push('\n');
        haystack.push_str(contact.about());
        for tag in contact.tags() {
            haystack.push('\n');
            haystack.push('#');
            haystack.push_str(tag);
        }
        candidates.push(SearchCandidate {
            entity_ref: EntityRef::Contact(contact_id.clone()),
            haystack,
        });
    }

    candidates
}

/// Searches candidates, returning matches in rank order (fuzzy) or candidate
/// order (substring/regex). Only the regex mode can fail, on an invalid
/// pattern.
pub fn search(
    candidates: &[SearchCandidate],
    needle: &str,
    mode: SearchMode,
) -> Result<Vec<EntityRef>, regex::Error> {
    let needle = needle.trim();
    if needle.is_empty() {
        return Ok(Vec::new());
    }

    match mode {
        SearchMode::Substring => {
            let needle_lower = needle.to_lowercase();
            Ok(candidates
                .iter()
                .filter(|candidate| candidate.haystack.to_lowercase().contains(&needle_lower))
                .map(|candidate| candidate.entity_ref.clone())
                .collect())
        }
        SearchMode::Regex => {
            let regex = RegexBuilder::new(needle).case_insensitive(true).build()?;
            Ok(candidates
                .iter()
                .filter(|candidate| regex.is_match(&candidate.haystack))
                .map(|candidate| candidate.entity_ref.clone())
                .collect())
        }
        SearchMode::Fuzzy => Ok(ranked_fuzzy_results(candidates, needle)),
    }
}

fn ranked_fuzzy_results(candidates: &[SearchCandidate], needle: &str) -> Vec<EntityRef> {
    let score_one = |candidate: &SearchCandidate| {
        fuzzy_score(needle, &candidate.haystack)
            .map(|score| (score, candidate.entity_ref.clone()))
    };

    let mut scored: Vec<(i64, EntityRef)> = if candidates.len() >= PARALLEL_SCORING_THRESHOLD {
        candidates.par_iter().filter_map(score_one).collect()
    } else {
        candidates.iter().filter_map(score_one).collect()
    };

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, entity_ref)| entity_ref).collect()
}

/// Subsequence-gated fuzzy score; `None` means "not a match at all".
///
/// The needle must appear as a (lowercased) character subsequence of the
/// haystack; the rapidfuzz ratio then dominates the score, nudged by
/// substring containment.
fn fuzzy_score(needle: &str, haystack: &str) -> Option<i64> {
    let needle_lower = needle.to_lowercase();
    let haystack_lower = haystack.to_lowercase();

    if !is_char_subsequence(&needle_lower, &haystack_lower) {
        return None;
    }

    let ratio = rapidfuzz::fuzz::ratio(needle_lower.chars(), haystack_lower.chars());
    let mut score = (ratio * 1000.0).round() as i64;
    if haystack_lower.contains(&needle_lower) {
        score += 2000;
    } else {
        score += 500;
    }

    Some(score)
}

fn is_char_subsequence(needle: &str, haystack: &str) -> bool {
    let mut needle_iter = needle.chars().peekable();
    for ch in haystack.chars() {
        let Some(&want) = needle_iter.peek() else {
            return true;
        };
        if ch == want {
            needle_iter.next();
        }
    }
    needle_iter.peek().is_none()
}

#[cfg(test)]
mod tests {
    use super::{search, search_candidates, SearchCandidate, SearchMode};
    use crate::model::{fixtures, EntityRef};

    fn eref(s: &str) -> EntityRef {
        s.parse().expect("entity ref")
    }

    fn demo_candidates() -> Vec<SearchCandidate> {
        search_candidates(&fixtures::demo_workspace())
    }

    #[test]
    fn candidates_cover_notes_and_contacts_but_not_trash() {
        let mut workspace = fixtures::demo_workspace();
        let before = search_candidates(&workspace).len();
        assert_eq!(before, 5);

        let note_id = crate::model::NoteId::new("reading").expect("note id");
        workspace.trash_note(&note_id);
        assert_eq!(search_candidates(&workspace).len(), before - 1);
    }

    #[test]
    fn substring_search_is_case_insensitive() {
        let results =
            search(&demo_candidates(), "IMPORTER", SearchMode::Substring).expect("search");
        assert!(results.contains(&eref("e:note/standup")));
        assert!(results.contains(&eref("e:contact/ada")));
    }

    #[test]
    fn regex_search_matches_and_rejects_invalid_patterns() {
        let results =
            search(&demo_candidates(), r"ada@\w+\.com", SearchMode::Regex).expect("search");
        assert_eq!(results, vec![eref("e:contact/ada")]);

        search(&demo_candidates(), "(unclosed", SearchMode::Regex).unwrap_err();
    }

    #[test]
    fn fuzzy_search_ranks_exact_containment_first() {
        let results = search(&demo_candidates(), "kickoff", SearchMode::Fuzzy).expect("search");
        assert_eq!(results.first(), Some(&eref("e:note/kickoff")));
    }

    #[test]
    fn fuzzy_search_requires_a_subsequence() {
        let results = search(&demo_candidates(), "zzzzqqq", SearchMode::Fuzzy).expect("search");
        assert!(results.is_empty());
    }

    #[test]
    fn blank_needle_matches_nothing() {
        let results = search(&demo_candidates(), "   ", SearchMode::Substring).expect("search");
        assert!(results.is_empty());
    }
}
