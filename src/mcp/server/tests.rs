// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;
use crate::model::fixtures::demo_workspace;

fn temp_workspace_dir(test_name: &str) -> std::path::PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};

    let mut dir = std::env::temp_dir();
    let pid = std::process::id();
    let nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).expect("clock is monotonic").as_nanos();
    dir.push(format!("larissa-{test_name}-{pid}-{nanos}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[tokio::test]
async fn workspace_stat_reports_counts_and_dangling_refs() {
    let server = LarissaMcp::new(demo_workspace());
    let Json(stat) = server.workspace_stat().await.expect("workspace.stat");

    assert_eq!(stat.workspace_id, "demo");
    assert_eq!(stat.rev, 0);
    assert_eq!(stat.notes, 3);
    assert_eq!(stat.contacts, 2);
    assert_eq!(stat.trashed_notes, 0);
    assert_eq!(stat.dangling_refs, 1);
    assert_eq!(stat.context.workspace_rev, 0);
    assert_eq!(stat.context.human_shown, None);
    assert_eq!(stat.context.ui_rev, None);
}

#[tokio::test]
async fn note_get_includes_refs_and_backlinks() {
    let server = LarissaMcp::new(demo_workspace());
    let Json(result) = server
        .note_get(Parameters(NoteGetParams { note_id: "kickoff".to_owned() }))
        .await
        .expect("note.get");

    assert_eq!(result.note.title, "Project kickoff");
    assert_eq!(
        result.note.refs,
        vec!["e:contact/ada", "e:contact/graham", "e:note/standup"]
    );
    assert_eq!(result.note.backlinks, vec!["e:contact/ada"]);
}

#[tokio::test]
async fn note_get_of_unknown_note_is_invalid_params() {
    let server = LarissaMcp::new(demo_workspace());
    let err = server
        .note_get(Parameters(NoteGetParams { note_id: "missing".to_owned() }))
        .await
        .err().unwrap();
    assert_eq!(err.message, "note not found");
}

#[tokio::test]
async fn note_create_allocates_a_slug_id_and_bumps_rev() {
    let server = LarissaMcp::new(demo_workspace());
    let Json(created) = server
        .note_create(Parameters(NoteCreateParams {
            note_id: None,
            title: "Retro: Week 14!".to_owned(),
            body: Some("Follow up with [[contact:ada]].".to_owned()),
            tags: Some(vec!["meeting".to_owned()]),
            base_rev: 0,
        }))
        .await
        .expect("note.create");

    assert_eq!(created.note.note_id, "retro-week-14");
    assert_eq!(created.new_rev, 1);

    let Json(fetched) = server
        .note_get(Parameters(NoteGetParams { note_id: "retro-week-14".to_owned() }))
        .await
        .expect("note.get");
    assert_eq!(fetched.note.body, "Follow up with [[contact:ada]].");
    assert_eq!(fetched.note.tags, vec!["meeting"]);
    assert_eq!(fetched.note.refs, vec!["e:contact/ada"]);
}

#[tokio::test]
async fn slug_collisions_are_disambiguated() {
    let server = LarissaMcp::new(demo_workspace());
    let Json(created) = server
        .note_create(Parameters(NoteCreateParams {
            note_id: None,
            title: "Standup".to_owned(),
            body: None,
            tags: None,
            base_rev: 0,
        }))
        .await
        .expect("note.create");

    // "standup" is taken by the demo workspace.
    assert_eq!(created.note.note_id, "standup-2");
}

#[tokio::test]
async fn stale_base_rev_is_rejected() {
    let server = LarissaMcp::new(demo_workspace());
    let err = server
        .note_create(Parameters(NoteCreateParams {
            note_id: None,
            title: "Too old".to_owned(),
            body: None,
            tags: None,
            base_rev: 99,
        }))
        .await
        .err().unwrap();

    assert!(err.message.contains("stale base_rev"));

    let Json(stat) = server.workspace_stat().await.expect("workspace.stat");
    assert_eq!(stat.notes, 3);
}

#[tokio::test]
async fn note_update_patches_in_place() {
    let server = LarissaMcp::new(demo_workspace());
    let Json(result) = server
        .note_update(Parameters(NoteUpdateParams {
            note_id: "reading".to_owned(),
            base_rev: 0,
            title: None,
            body: Some("Now also [[note:kickoff]].".to_owned()),
            pinned: Some(true),
            tags: None,
        }))
        .await
        .expect("note.update");

    assert_eq!(result.new_rev, 1);
    assert_eq!(result.updated, vec!["e:note/reading"]);

    let Json(fetched) = server
        .note_get(Parameters(NoteGetParams { note_id: "reading".to_owned() }))
        .await
        .expect("note.get");
    assert!(fetched.note.pinned);
    assert_eq!(fetched.note.refs, vec!["e:note/kickoff"]);
}

#[tokio::test]
async fn empty_update_patch_is_rejected() {
    let server = LarissaMcp::new(demo_workspace());
    let err = server
        .note_update(Parameters(NoteUpdateParams {
            note_id: "reading".to_owned(),
            base_rev: 0,
            title: None,
            body: None,
            pinned: None,
            tags: None,
        }))
        .await
        .err().unwrap();
    assert_eq!(err.message, "empty patch");
}

#[tokio::test]
async fn trash_hides_a_note_and_restore_brings_it_back() {
    let server = LarissaMcp::new(demo_workspace());

    let Json(trashed) = server
        .note_trash(Parameters(NoteLifecycleParams {
            note_id: "reading".to_owned(),
            base_rev: 0,
        }))
        .await
        .expect("note.trash");
    assert_eq!(trashed.removed, vec!["e:note/reading"]);

    let err = server
        .note_get(Parameters(NoteGetParams { note_id: "reading".to_owned() }))
        .await
        .err().unwrap();
    assert_eq!(err.message, "note not found");

    let Json(listed) = server.note_list().await.expect("note.list");
    assert!(listed.trashed_notes.iter().any(|note| note.note_id == "reading"));

    let Json(restored) = server
        .note_restore(Parameters(NoteLifecycleParams {
            note_id: "reading".to_owned(),
            base_rev: 1,
        }))
        .await
        .expect("note.restore");
    assert_eq!(restored.added, vec!["e:note/reading"]);

    server
        .note_get(Parameters(NoteGetParams { note_id: "reading".to_owned() }))
        .await
        .expect("note.get after restore");
}

#[tokio::test]
async fn contact_create_update_and_get_round_trip() {
    let server = LarissaMcp::new(demo_workspace());

    let Json(created) = server
        .contact_create(Parameters(ContactCreateParams {
            contact_id: None,
            name: "Grace Hopper".to_owned(),
            email: Some("grace@example.com".to_owned()),
            phone: None,
            about: Some("Met at [[note:kickoff]].".to_owned()),
            tags: Some(vec!["advisor".to_owned()]),
            base_rev: 0,
        }))
        .await
        .expect("contact.create");
    assert_eq!(created.contact.contact_id, "grace-hopper");

    let Json(updated) = server
        .contact_update(Parameters(ContactUpdateParams {
            contact_id: "grace-hopper".to_owned(),
            base_rev: created.new_rev,
            name: None,
            about: None,
            email: None,
            phone: Some("+1 555 0199".to_owned()),
            tags: None,
        }))
        .await
        .expect("contact.update");
    assert_eq!(updated.updated, vec!["e:contact/grace-hopper"]);

    let Json(fetched) = server
        .contact_get(Parameters(ContactGetParams {
            contact_id: "grace-hopper".to_owned(),
        }))
        .await
        .expect("contact.get");
    assert_eq!(fetched.contact.email.as_deref(), Some("grace@example.com"));
    assert_eq!(fetched.contact.phone.as_deref(), Some("+1 555 0199"));
    assert_eq!(fetched.contact.refs, vec!["e:note/kickoff"]);
}

#[tokio::test]
async fn search_query_supports_modes_and_limits() {
    let server = LarissaMcp::new(demo_workspace());

    let Json(substring) = server
        .search_query(Parameters(SearchQueryParams {
            query: "importer".to_owned(),
            mode: None,
            limit: None,
        }))
        .await
        .expect("search.query");
    assert!(substring.hits.iter().any(|hit| hit.entity_ref == "e:note/standup"));

    let Json(fuzzy) = server
        .search_query(Parameters(SearchQueryParams {
            query: "kickoff".to_owned(),
            mode: Some("fuzzy".to_owned()),
            limit: Some(1),
        }))
        .await
        .expect("search.query fuzzy");
    assert_eq!(fuzzy.hits.len(), 1);
    assert_eq!(fuzzy.hits[0].entity_ref, "e:note/kickoff");
    assert_eq!(fuzzy.hits[0].label, "Project kickoff");

    let err = server
        .search_query(Parameters(SearchQueryParams {
            query: "(unclosed".to_owned(),
            mode: Some("regex".to_owned()),
            limit: None,
        }))
        .await
        .err().unwrap();
    assert!(err.message.contains("invalid search pattern"));

    let err = server
        .search_query(Parameters(SearchQueryParams {
            query: "x".to_owned(),
            mode: Some("psychic".to_owned()),
            limit: None,
        }))
        .await
        .err().unwrap();
    assert!(err.message.contains("expected mode"));
}

#[tokio::test]
async fn refs_backlinks_and_dangling_report_canonical_refs() {
    let server = LarissaMcp::new(demo_workspace());

    let Json(result) = server
        .refs_backlinks(Parameters(BacklinksParams {
            target_ref: "e:contact/ada".to_owned(),
        }))
        .await
        .expect("refs.backlinks");
    assert_eq!(
        result.backlinks,
        vec!["e:note/kickoff", "e:note/standup", "e:contact/ada"]
    );

    let Json(dangling) = server.refs_dangling().await.expect("refs.dangling");
    assert_eq!(dangling.dangling.len(), 1);
    assert_eq!(dangling.dangling[0].source_ref, "e:note/standup");
    assert_eq!(dangling.dangling[0].target_ref, "e:note/parking-lot");

    let err = server
        .refs_backlinks(Parameters(BacklinksParams { target_ref: "note/ada".to_owned() }))
        .await
        .err().unwrap();
    assert!(err.message.contains("invalid entity ref"));
}

#[tokio::test]
async fn view_read_state_reflects_shared_ui_state() {
    let server = LarissaMcp::new(demo_workspace());
    let Json(unshared) = server.view_read_state().await.expect("view.read_state");
    assert_eq!(unshared.human_shown, None);
    assert_eq!(unshared.human_nav_depth, None);

    let ui_state = Arc::new(Mutex::new(UiState::default()));
    ui_state
        .lock()
        .await
        .set_human_overlay(Some("e:note/kickoff".parse().expect("entity ref")), 2);

    let server = LarissaMcp::new_with_ui_state(demo_workspace(), Some(ui_state.clone()));
    let Json(shared) = server.view_read_state().await.expect("view.read_state");
    assert_eq!(shared.human_shown.as_deref(), Some("e:note/kickoff"));
    assert_eq!(shared.human_nav_depth, Some(2));
    assert_eq!(shared.context.ui_rev, Some(1));
}

#[tokio::test]
async fn mutations_bump_the_shared_workspace_rev() {
    let ui_state = Arc::new(Mutex::new(UiState::default()));
    let server = LarissaMcp::new_with_ui_state(demo_workspace(), Some(ui_state.clone()));

    server
        .note_create(Parameters(NoteCreateParams {
            note_id: None,
            title: "Bump".to_owned(),
            body: None,
            tags: None,
            base_rev: 0,
        }))
        .await
        .expect("note.create");

    assert_eq!(ui_state.lock().await.workspace_rev(), 1);
}

#[tokio::test]
async fn persistent_servers_share_one_folder_backed_workspace() {
    let dir = temp_workspace_dir("mcp-persistent");
    let folder = crate::store::WorkspaceFolder::new(&dir);
    let workspace = demo_workspace();
    folder.save_workspace(&workspace).expect("save workspace");

    let writer = LarissaMcp::new_persistent(workspace.clone(), folder.clone());
    writer
        .note_create(Parameters(NoteCreateParams {
            note_id: None,
            title: "Shared".to_owned(),
            body: None,
            tags: None,
            base_rev: 0,
        }))
        .await
        .expect("note.create");

    // A second server instance over the same folder sees the new note after
    // its per-call disk sync.
    let reader = LarissaMcp::new_persistent(workspace, folder);
    let Json(listed) = reader.note_list().await.expect("note.list");
    assert!(listed.notes.iter().any(|note| note.note_id == "shared"));

    let _ = std::fs::remove_dir_all(&dir);
}
