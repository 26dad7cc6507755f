// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Layout, panel, overlay, footer and help helpers used by TUI rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Notes,
    Contacts,
    Preview,
}

impl Focus {
    fn cycle(self, preview_visible: bool) -> Self {
        match self {
            Self::Notes => Self::Contacts,
            Self::Contacts => {
                if preview_visible {
                    Self::Preview
                } else {
                    Self::Notes
                }
            }
            Self::Preview => Self::Notes,
        }
    }

    fn cycle_back(self, preview_visible: bool) -> Self {
        match self {
            Self::Notes => {
                if preview_visible {
                    Self::Preview
                } else {
                    Self::Contacts
                }
            }
            Self::Contacts => Self::Notes,
            Self::Preview => Self::Contacts,
        }
    }
}

fn panel_border_style_for_focus(active: Focus, panel: Focus) -> Style {
    if active != panel {
        return Style::default();
    }
    Style::default().fg(FOCUS_COLOR)
}

fn view_title(label: &str, key: char, count: usize) -> String {
    format!("─[{key}]─ {label} ({count}) ")
}

fn entity_icon(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Note => "▤",
        EntityKind::Contact => "◉",
    }
}

fn render_notes_panel(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let items = app
        .note_ids
        .iter()
        .map(|note_id| {
            let Some(note) = app.workspace.notes().get(note_id) else {
                return ListItem::new(note_id.as_str().to_owned());
            };
            let mut spans = Vec::new();
            if note.pinned() {
                spans.push(Span::styled("* ", Style::default().fg(PINNED_COLOR)));
            }
            spans.push(Span::raw(note.title().to_owned()));
            spans.push(Span::styled(
                format!("  {note_id}"),
                Style::default().fg(Color::DarkGray),
            ));
            ListItem::new(Line::from(spans))
        })
        .collect::<Vec<_>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(panel_border_style_for_focus(app.focus, Focus::Notes))
                .title(view_title("Notes", '1', app.note_ids.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut app.notes_state);
}

fn render_contacts_panel(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let items = app
        .contact_ids
        .iter()
        .map(|contact_id| {
            let Some(contact) = app.workspace.contacts().get(contact_id) else {
                return ListItem::new(contact_id.as_str().to_owned());
            };
            let mut spans = vec![Span::raw(contact.name().to_owned())];
            if let Some(email) = contact.email() {
                spans.push(Span::styled(
                    format!("  {email}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect::<Vec<_>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(panel_border_style_for_focus(app.focus, Focus::Contacts))
                .title(view_title("Contacts", '2', app.contact_ids.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut app.contacts_state);
}

fn render_preview_panel(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let title = match app.preview_overlay.shown() {
        Some(entity_ref) => {
            let label = app
                .workspace
                .entity_label(entity_ref)
                .unwrap_or(entity_ref.id_str());
            let mut title = format!(
                "─[p]─ Preview {} {label}",
                entity_icon(entity_ref.kind())
            );
            if app.preview_overlay.depth() > 0 {
                title.push_str(&format!(" [depth {}]", app.preview_overlay.depth()));
            }
            title.push(' ');
            title
        }
        None => "─[p]─ Preview ".to_owned(),
    };

    let text = match app.preview_overlay.shown() {
        Some(_) => detail_text(&app.workspace, &app.preview_overlay.view),
        None => Text::from("Nothing selected"),
    };

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(panel_border_style_for_focus(app.focus, Focus::Preview))
                .title(title),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.preview_overlay.view.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_detail_overlay(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let overlay_area = centered_rect(area, 80, 80);
    frame.render_widget(Clear, overlay_area);

    let Some(shown) = app.page_overlay.shown() else {
        return;
    };

    let label = app.workspace.entity_label(shown).unwrap_or(shown.id_str());
    let mut title = format!("─ {} {label}", entity_icon(shown.kind()));
    if app.page_overlay.depth() > 0 {
        title.push_str(&format!(" [depth {}]", app.page_overlay.depth()));
    }
    if let Some(caller) = &app.page_overlay.view.caller {
        let caller_label = app
            .workspace
            .entity_label(caller)
            .unwrap_or(caller.id_str());
        title.push_str(&format!(" ⟵ {caller_label}"));
    }
    title.push(' ');

    let paragraph = Paragraph::new(detail_text(&app.workspace, &app.page_overlay.view))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(FOCUS_COLOR))
                .title(title),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.page_overlay.view.scroll, 0));
    frame.render_widget(paragraph, overlay_area);
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

/// Full detail text for the shown entity: header fields, the body with
/// reference tokens highlighted, and the activatable reference list.
fn detail_text(workspace: &Workspace, view: &DetailView) -> Text<'static> {
    let Some(shown) = &view.shown else {
        return Text::default();
    };
    let selected_ref = view.refs.get(view.ref_cursor);

    let mut lines: Vec<Line<'static>> = Vec::new();
    let body = match shown {
        EntityRef::Note(note_id) => {
            let Some(note) = workspace.notes().get(note_id) else {
                return Text::from("Entity no longer exists");
            };
            lines.push(Line::from(Span::styled(
                note.title().to_owned(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            if !note.tags().is_empty() {
                lines.push(tags_line(note.tags()));
            }
            note.body().to_owned()
        }
        EntityRef::Contact(contact_id) => {
            let Some(contact) = workspace.contacts().get(contact_id) else {
                return Text::from("Entity no longer exists");
            };
            lines.push(Line::from(Span::styled(
                contact.name().to_owned(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            if let Some(email) = contact.email() {
                lines.push(Line::from(format!("email: {email}")));
            }
            if let Some(phone) = contact.phone() {
                lines.push(Line::from(format!("phone: {phone}")));
            }
            if !contact.tags().is_empty() {
                lines.push(tags_line(contact.tags()));
            }
            contact.about().to_owned()
        }
    };

    lines.push(Line::default());
    lines.extend(body_lines(&body, selected_ref));

    if !view.refs.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "References:",
            Style::default().fg(Color::Gray),
        )));
        for (idx, entity_ref) in view.refs.iter().enumerate() {
            let marker = if idx == view.ref_cursor { "▸ " } else { "  " };
            let label = workspace
                .entity_label(entity_ref)
                .unwrap_or("(missing)")
                .to_owned();
            let mut style = Style::default().fg(REFERENCE_COLOR);
            if idx == view.ref_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            lines.push(Line::from(vec![
                Span::raw(marker.to_owned()),
                Span::styled(format!("{entity_ref}"), style),
                Span::styled(format!("  {label}"), Style::default().fg(Color::DarkGray)),
            ]));
        }
    }

    Text::from(lines)
}

fn tags_line(tags: &std::collections::BTreeSet<smol_str::SmolStr>) -> Line<'static> {
    let joined = tags
        .iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ");
    Line::from(Span::styled(joined, Style::default().fg(Color::Magenta)))
}

/// Splits body text into styled lines, highlighting reference tokens and
/// reversing every occurrence of the reference under the cursor.
fn body_lines(body: &str, selected_ref: Option<&EntityRef>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    for span in parse_inline(body) {
        match span {
            InlineSpan::Text(text) => {
                let mut parts = text.split('\n');
                if let Some(first) = parts.next() {
                    if !first.is_empty() {
                        current.push(Span::raw(first.to_owned()));
                    }
                }
                for part in parts {
                    lines.push(Line::from(std::mem::take(&mut current)));
                    if !part.is_empty() {
                        current.push(Span::raw(part.to_owned()));
                    }
                }
            }
            InlineSpan::Reference { raw, entity_ref } => {
                let mut style = Style::default().fg(REFERENCE_COLOR);
                if selected_ref == Some(&entity_ref) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                current.push(Span::styled(raw.to_owned(), style));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}

fn render_status_line(frame: &mut Frame<'_>, app: &mut App, status_area: Rect) {
    if app.search_mode == SearchMode::Editing {
        let prefix = match app.search_kind {
            SearchKind::Regular => '/',
            SearchKind::Fuzzy => '\\',
        };
        let prompt = format!(
            "{prefix}{} ({} matches)",
            app.search_query,
            app.search_results.len()
        );
        let status = Paragraph::new(prompt);
        frame.render_widget(status, status_area);

        let cursor_x = status_area
            .x
            .saturating_add(1)
            .saturating_add(app.search_query.chars().count() as u16)
            .min(status_area.x.saturating_add(status_area.width.saturating_sub(1)));
        frame.set_cursor_position((cursor_x, status_area.y));
        return;
    }

    let toast_suffix = match &app.toast {
        Some(toast) if toast.expires_at > Instant::now() => {
            format!("  ·  {}", toast.message)
        }
        _ => {
            app.toast = None;
            String::new()
        }
    };

    let status = Paragraph::new(footer_help_line(app, &toast_suffix));
    frame.render_widget(status, status_area);
    let brand = Paragraph::new(footer_brand_line()).alignment(Alignment::Right);
    frame.render_widget(brand, status_area);
}

fn footer_help_line(app: &App, toast_suffix: &str) -> Line<'static> {
    let hints: &[(&str, &str)] = if app.page_overlay.is_open() {
        &[
            ("j/k", "refs"),
            ("⏎", "drill down"),
            ("⌫", "back"),
            ("m", "minimize"),
            ("y", "yank"),
            ("?", "help"),
        ]
    } else if app.focus == Focus::Preview {
        &[
            ("j/k", "refs"),
            ("⏎", "drill down"),
            ("⌫", "back"),
            ("o", "open"),
            ("⇥", "panes"),
            ("?", "help"),
        ]
    } else if app.search_mode == SearchMode::Results {
        &[
            ("n/N", "matches"),
            ("⏎", "open"),
            ("esc", "clear search"),
            ("?", "help"),
        ]
    } else {
        &[
            ("⏎", "open"),
            ("p", "preview"),
            ("/", "search"),
            ("a", "note"),
            ("c", "contact"),
            ("t", "trash"),
            ("?", "help"),
        ]
    };

    let mut spans = Vec::new();
    for (idx, (key, label)) in hints.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ".to_owned(), Style::default()));
        }
        spans.push(Span::styled(
            (*key).to_owned(),
            Style::default().fg(FOOTER_KEY_COLOR),
        ));
        spans.push(Span::styled(
            format!(" {label}"),
            Style::default().fg(FOOTER_LABEL_COLOR),
        ));
    }
    if !toast_suffix.is_empty() {
        spans.push(Span::styled(
            toast_suffix.to_owned(),
            Style::default().fg(Color::White),
        ));
    }
    Line::from(spans)
}

fn footer_brand_line() -> Line<'static> {
    Line::from(Span::styled(
        FOOTER_BRAND.to_owned(),
        Style::default().fg(FOOTER_BRAND_COLOR),
    ))
}

fn render_help(frame: &mut Frame<'_>, _app: &mut App, area: Rect) {
    let help_area = centered_rect(area, 70, 80);
    frame.render_widget(Clear, help_area);

    let lines = [
        ("Tab / Shift-Tab", "cycle panes (notes, contacts, preview)"),
        ("j / k", "move selection / reference cursor"),
        ("Enter", "open detail overlay / drill into reference"),
        ("Backspace, b", "back one step through the drill-down history"),
        ("Esc, m", "minimize the overlay (collapses the whole history)"),
        ("p", "toggle the preview pane (independent history)"),
        ("o", "promote the previewed entity to the page overlay"),
        ("/", "search (substring)"),
        ("\\", "search (fuzzy)"),
        ("n / N", "next / previous search match"),
        ("a", "new note"),
        ("c", "new contact"),
        ("e", "edit note body in $EDITOR"),
        ("t", "trash the selected entity"),
        ("y", "yank the entity ref (OSC52)"),
        ("q", "quit"),
    ];

    let text = Text::from(
        lines
            .iter()
            .map(|(key, label)| {
                Line::from(vec![
                    Span::styled(
                        format!("{key:>16}"),
                        Style::default().fg(FOOTER_KEY_COLOR),
                    ),
                    Span::raw(format!("  {label}")),
                ])
            })
            .collect::<Vec<_>>(),
    );

    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(FOCUS_COLOR))
            .title("─ Help "),
    );
    frame.render_widget(paragraph, help_area);
}
