// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceMetaJson {
    workspace_id: String,
    #[serde(default)]
    rev: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NoteJson {
    note_id: String,
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    pinned: bool,
    #[serde(default)]
    rev: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContactJson {
    contact_id: String,
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    about: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    rev: u64,
}

fn note_to_json(note: &Note) -> NoteJson {
    NoteJson {
        note_id: note.note_id().as_str().to_owned(),
        title: note.title().to_owned(),
        body: note.body().to_owned(),
        tags: note.tags().iter().map(|tag| tag.to_string()).collect(),
        pinned: note.pinned(),
        rev: note.rev(),
    }
}

fn note_from_json(note_json: NoteJson) -> Result<Note, StoreError> {
    let note_id =
        crate::model::NoteId::new(note_json.note_id.clone()).map_err(|source| {
            StoreError::InvalidId {
                field: "note_id",
                value: note_json.note_id.clone(),
                source: Box::new(source),
            }
        })?;

    let mut note = Note::new(note_id, note_json.title);
    note.set_body(note_json.body);
    note.set_tags(note_json.tags.iter().map(|tag| smol_str::SmolStr::new(tag)).collect());
    note.set_pinned(note_json.pinned);
    note.set_rev(note_json.rev);
    Ok(note)
}

fn contact_to_json(contact: &Contact) -> ContactJson {
    ContactJson {
        contact_id: contact.contact_id().as_str().to_owned(),
        name: contact.name().to_owned(),
        email: contact.email().map(|email| email.to_owned()),
        phone: contact.phone().map(|phone| phone.to_owned()),
        about: contact.about().to_owned(),
        tags: contact.tags().iter().map(|tag| tag.to_string()).collect(),
        rev: contact.rev(),
    }
}

fn contact_from_json(contact_json: ContactJson) -> Result<Contact, StoreError> {
    let contact_id = crate::model::ContactId::new(contact_json.contact_id.clone()).map_err(
        |source| StoreError::InvalidId {
            field: "contact_id",
            value: contact_json.contact_id.clone(),
            source: Box::new(source),
        },
    )?;

    let mut contact = Contact::new(contact_id, contact_json.name);
    contact.set_email(contact_json.email);
    contact.set_phone(contact_json.phone);
    contact.set_about(contact_json.about);
    contact.set_tags(
        contact_json.tags.iter().map(|tag| smol_str::SmolStr::new(tag)).collect(),
    );
    contact.set_rev(contact_json.rev);
    Ok(contact)
}

fn load_note_file(path: &Path) -> Result<Note, StoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
    let note_json: NoteJson = serde_json::from_str(&raw)
        .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;
    note_from_json(note_json)
}

fn load_contact_file(path: &Path) -> Result<Contact, StoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
    let contact_json: ContactJson = serde_json::from_str(&raw)
        .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;
    contact_from_json(contact_json)
}

/// JSON entity files directly inside `dir`, skipping temp files and anything
/// without a `.json` extension. A missing directory reads as empty.
fn list_entity_json_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(StoreError::Io { path: dir.to_path_buf(), source }),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|source| StoreError::Io { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let is_tmp = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(".larissa.tmp."));
        if is_json && !is_tmp && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn garbage_collect_entity_files(
    dir: &Path,
    expected_file_names: &BTreeSet<String>,
) -> Result<(), StoreError> {
    for path in list_entity_json_files(dir)? {
        let keep = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| expected_file_names.contains(name));
        if !keep {
            fs::remove_file(&path)
                .map_err(|source| StoreError::Io { path: path.clone(), source })?;
        }
    }
    Ok(())
}

fn encode_persisted_id_segment(segment: &str) -> String {
    if !needs_windows_safe_filename_segment_encoding(segment) {
        return segment.to_owned();
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + segment.len().saturating_mul(2));
    out.push('~');
    for &b in segment.as_bytes() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

fn needs_windows_safe_filename_segment_encoding(segment: &str) -> bool {
    if segment.starts_with('~') {
        return true;
    }
    if segment == "." || segment == ".." {
        return true;
    }
    if segment.ends_with(' ') || segment.ends_with('.') {
        return true;
    }

    let trimmed = segment.trim_end_matches([' ', '.']);
    let base = trimmed.split('.').next().unwrap_or(trimmed);
    if is_windows_device_name(base) {
        return true;
    }

    for ch in segment.chars() {
        if matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
            return true;
        }
        if ch <= '\u{1f}' || ch == '\u{7f}' {
            return true;
        }
    }

    false
}

fn is_windows_device_name(base: &str) -> bool {
    let base = base.to_ascii_uppercase();
    match base.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => {
            if let Some(num) = base.strip_prefix("COM") {
                matches!(num, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9")
            } else if let Some(num) = base.strip_prefix("LPT") {
                matches!(num, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9")
            } else {
                false
            }
        }
    }
}

fn validate_relative_path(field: &'static str, path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() {
        return Err(StoreError::InvalidRelativePath { field, value: path.to_path_buf() });
    }

    if path.is_absolute() {
        return Err(StoreError::InvalidRelativePath { field, value: path.to_path_buf() });
    }

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => {
                return Err(StoreError::InvalidRelativePath {
                    field,
                    value: path.to_path_buf(),
                });
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

fn to_relative_path(
    workspace_dir: &Path,
    path: &Path,
    field: &'static str,
) -> Result<PathBuf, StoreError> {
    let relative = if path.is_absolute() {
        path.strip_prefix(workspace_dir).map(PathBuf::from).map_err(|_| {
            StoreError::PathOutsideWorkspace {
                workspace_dir: workspace_dir.to_path_buf(),
                path: path.to_path_buf(),
            }
        })?
    } else {
        path.to_path_buf()
    };

    validate_relative_path(field, &relative)?;
    Ok(relative)
}

fn create_dir_all_safe(workspace_dir: &Path, relative: &Path) -> Result<(), StoreError> {
    if relative.as_os_str().is_empty() {
        return Ok(());
    }

    validate_relative_path("dir", relative)?;

    let mut current = workspace_dir.to_path_buf();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            continue;
        };

        current.push(part);

        match fs::symlink_metadata(&current) {
            Ok(md) => {
                if md.file_type().is_symlink() {
                    return Err(StoreError::SymlinkRefused { path: current });
                }
                if !md.is_dir() {
                    return Err(StoreError::Io {
                        path: current,
                        source: io::Error::new(io::ErrorKind::AlreadyExists, "expected directory"),
                    });
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(&current).map_err(|source| StoreError::Io {
                    path: current.clone(),
                    source,
                })?;
            }
            Err(source) => {
                return Err(StoreError::Io { path: current, source });
            }
        }
    }

    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic_in_workspace(
    workspace_dir: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    fs::create_dir_all(workspace_dir).map_err(|source| StoreError::Io {
        path: workspace_dir.to_path_buf(),
        source,
    })?;

    let relative = to_relative_path(workspace_dir, path, "path")?;
    let parent_rel = relative.parent().unwrap_or_else(|| Path::new(""));
    create_dir_all_safe(workspace_dir, parent_rel)?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused { path: path.to_path_buf() });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io { path: path.to_path_buf(), source });
        }
    }

    let Some(parent) = path.parent() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent"),
        });
    };

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path =
        parent.join(format!(".larissa.tmp.{}.{}", file_name.to_string_lossy(), nanos));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;

    file.write_all(contents)
        .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;

    if durability == WriteDurability::Durable {
        file.sync_all()
            .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io { path: path.to_path_buf(), source });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent)
                .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
            dir.sync_all()
                .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
        }
    }

    Ok(())
}
