// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use memchr::memmem;

use crate::model::{EntityKind, EntityRef};

/// One segment of a parsed body text.
///
/// Reference spans keep the raw token text so callers can render it verbatim
/// (highlighted) without re-deriving offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineSpan<'a> {
    Text(&'a str),
    Reference { raw: &'a str, entity_ref: EntityRef },
}

/// Splits body text into literal text and `[[note:<id>]]` / `[[contact:<id>]]`
/// reference spans.
///
/// Malformed tokens (unterminated, unknown kind, empty or invalid id) stay
/// literal text; the scanner resumes immediately after the offending opener,
/// so a reference may still start inside a discarded candidate.
pub fn parse_inline(text: &str) -> Vec<InlineSpan<'_>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut cursor = 0usize;
    let mut search = 0usize;

    while search < bytes.len() {
        let Some(open_rel) = memmem::find(&bytes[search..], b"[[") else {
            break;
        };
        let open = search + open_rel;
        let Some(close_rel) = memmem::find(&bytes[open + 2..], b"]]") else {
            break;
        };
        let close = open + 2 + close_rel;

        match parse_token(&text[open + 2..close]) {
            Some(entity_ref) => {
                if cursor < open {
                    spans.push(InlineSpan::Text(&text[cursor..open]));
                }
                spans.push(InlineSpan::Reference {
                    raw: &text[open..close + 2],
                    entity_ref,
                });
                cursor = close + 2;
                search = cursor;
            }
            None => {
                search = open + 2;
            }
        }
    }

    if cursor < text.len() {
        spans.push(InlineSpan::Text(&text[cursor..]));
    }

    spans
}

/// All references embedded in `text`, in first-occurrence order, deduplicated.
pub fn extract_refs(text: &str) -> Vec<EntityRef> {
    let mut refs = Vec::new();
    for span in parse_inline(text) {
        if let InlineSpan::Reference { entity_ref, .. } = span {
            if !refs.contains(&entity_ref) {
                refs.push(entity_ref);
            }
        }
    }
    refs
}

fn parse_token(inner: &str) -> Option<EntityRef> {
    let (kind_str, id_str) = inner.split_once(':')?;
    let kind = kind_str.parse::<EntityKind>().ok()?;
    EntityRef::from_parts(kind, id_str).ok()
}

#[cfg(test)]
mod tests {
    use super::{extract_refs, parse_inline, InlineSpan};
    use crate::model::EntityRef;

    fn eref(s: &str) -> EntityRef {
        s.parse().expect("entity ref")
    }

    #[test]
    fn plain_text_is_a_single_span() {
        let spans = parse_inline("no references here");
        assert_eq!(spans, vec![InlineSpan::Text("no references here")]);
    }

    #[test]
    fn splits_text_around_tokens() {
        let spans = parse_inline("see [[note:inbox]] and [[contact:ada]].");
        assert_eq!(
            spans,
            vec![
                InlineSpan::Text("see "),
                InlineSpan::Reference {
                    raw: "[[note:inbox]]",
                    entity_ref: eref("e:note/inbox"),
                },
                InlineSpan::Text(" and "),
                InlineSpan::Reference {
                    raw: "[[contact:ada]]",
                    entity_ref: eref("e:contact/ada"),
                },
                InlineSpan::Text("."),
            ]
        );
    }

    #[test]
    fn adjacent_tokens_produce_no_empty_text_spans() {
        let spans = parse_inline("[[note:a]][[note:b]]");
        assert_eq!(spans.len(), 2);
        assert!(spans
            .iter()
            .all(|span| matches!(span, InlineSpan::Reference { .. })));
    }

    #[test]
    fn unterminated_token_stays_literal() {
        let spans = parse_inline("broken [[note:inbox");
        assert_eq!(spans, vec![InlineSpan::Text("broken [[note:inbox")]);
    }

    #[test]
    fn unknown_kind_stays_literal() {
        let spans = parse_inline("[[tag:urgent]]");
        assert_eq!(spans, vec![InlineSpan::Text("[[tag:urgent]]")]);
    }

    #[test]
    fn empty_or_invalid_id_stays_literal() {
        assert_eq!(parse_inline("[[note:]]"), vec![InlineSpan::Text("[[note:]]")]);
        assert_eq!(
            parse_inline("[[note:a/b]]"),
            vec![InlineSpan::Text("[[note:a/b]]")]
        );
    }

    #[test]
    fn reference_may_start_inside_a_discarded_candidate() {
        let spans = parse_inline("[[x [[note:a]]");
        assert_eq!(
            spans,
            vec![
                InlineSpan::Text("[[x "),
                InlineSpan::Reference {
                    raw: "[[note:a]]",
                    entity_ref: eref("e:note/a"),
                },
            ]
        );
    }

    #[test]
    fn extract_refs_deduplicates_in_first_occurrence_order() {
        let refs = extract_refs("[[note:b]] [[contact:c]] [[note:b]] [[note:a]]");
        assert_eq!(
            refs,
            vec![eref("e:note/b"), eref("e:contact/c"), eref("e:note/a")]
        );
    }
}
