//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, SideRef};
use crate::audio::LoopMode;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::library::{Album, compose_display};
use crate::vinyl::{self, format_side_length};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "album up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("1-9", "album #");
    map.insert("h/l", "side");
    map.insert("enter", "play side");
    map.insert("'a", "play side by letter");
    map.insert("space/p", "play/pause");
    map.insert("n/b", "next/prev track");
    // H/L is filled dynamically from config.
    map.insert("r", "loop mode");
    map.insert("f", "auto-flip");
    map.insert("R", "random side");
    map.insert("x", "remove album");
    map.insert("zz", "now playing");
    map.insert("/", "filter");
    map.insert("K", "metadata");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "j/k", "h/l", "enter", "'a", "space/p", "n/b", "H/L", "gg/G", "1-9", "r", "f", "R", "x",
        "zz", "/", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Uppercase the characters of `title` at the matched `positions`.
fn highlight_matches(title: &str, positions: Vec<usize>) -> String {
    let mut rendered = String::new();
    let mut pos_iter = positions.into_iter();
    let mut next_pos = pos_iter.next();

    for (ci, ch) in title.chars().enumerate() {
        if next_pos == Some(ci) {
            rendered.extend(ch.to_uppercase());
            next_pos = pos_iter.next();
        } else {
            rendered.push(ch);
        }
    }
    rendered
}

/// Window of `total` rows of height `height` that keeps `sel` centered.
/// Returns `(start, end, selected_pos_in_window)`.
fn visible_window(total: usize, height: usize, sel: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, sel);
    }
    let half = height / 2;
    let mut start = sel.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, sel - start)
}

fn status_text(app: &App, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    if app.follow_playback {
        parts.push(" CURSOR: Follow".to_string());
    } else {
        parts.push(" CURSOR: Free-roam".to_string());
    }

    let loop_text = match app.loop_mode {
        LoopMode::NoLoop => "PLAYBACK: Lift at side end",
        LoopMode::LoopSide => "PLAYBACK: Loop side",
        LoopMode::LoopOne => "PLAYBACK: Repeat-one",
    };
    parts.push(loop_text.to_string());
    parts.push(format!("FLIP: {}", if app.auto_flip { "Auto" } else { "Manual" }));

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    if app.side_jump_pending {
        parts.push("SIDE: ' _".to_string());
    }

    let info = app
        .playback_handle
        .as_ref()
        .and_then(|h| h.lock().ok().map(|i| (i.elapsed, i.playing)));
    match (app.now_playing_track(), info) {
        (Some((r, pos, track)), Some((elapsed, playing))) => {
            let song = compose_display(
                track,
                &ui.now_playing_track_fields,
                &ui.now_playing_track_separator,
            );
            let album = app.album(r.album).map(|a| a.title.as_str()).unwrap_or("?");
            let at = format!("{} {}{}", album, r.letter(), pos + 1);
            match now_playing_time_text(elapsed, track.duration, ui) {
                Some(time) => parts.push(format!("Now: {} [{}] ({})", song, time, at)),
                None => parts.push(format!("Now: {} ({})", song, at)),
            }
            parts.push(if playing { "Playing" } else { "Paused" }.to_string());
        }
        _ => parts.push("Stopped".to_string()),
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }

    parts.join(" • ")
}

fn draw_album_list(frame: &mut Frame, app: &App, display: &[usize], area: Rect) {
    let q = app.filter_query.trim();
    let query_lower = q.to_lowercase();

    let total = display.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let (start, end, selected_pos_in_visible) = visible_window(total, list_height, sel_pos);

    let playing_album = app.now_playing.map(|r| r.album);
    let visible_items: Vec<ListItem> = display[start..end]
        .iter()
        .enumerate()
        .map(|(row, &i)| {
            let Some(album) = app.album(i) else {
                return ListItem::new("");
            };
            let title = album.display();
            let mut text = if q.is_empty() {
                title
            } else {
                match app.fuzzy_match_positions_for_album(i, &query_lower) {
                    Some(positions) => highlight_matches(&title, positions),
                    None => title,
                }
            };
            text = format!("{:>2}. {}", start + row + 1, text);
            if playing_album == Some(i) {
                text.push_str("  ♪");
            }
            ListItem::new(text)
        })
        .collect();

    let list = List::new(visible_items)
        .block(Block::default().borders(Borders::ALL).title(" albums "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn side_line(album_index: usize, album: &Album, side: usize, now_playing: Option<SideRef>) -> String {
    let letter = vinyl::side_letter(side).unwrap_or('?');
    let marker = if now_playing == Some(SideRef { album: album_index, side }) {
        "♪"
    } else {
        " "
    };
    match album.side(side) {
        Some(s) if !s.is_empty() => format!(
            "{marker} Disc {} Side {letter}  {:>6}  {} track{}",
            side / 2 + 1,
            format_side_length(s.duration()),
            s.len(),
            if s.len() == 1 { "" } else { "s" }
        ),
        _ => format!("{marker} Disc {} Side {letter}  {:>6}  (blank)", side / 2 + 1, "-"),
    }
}

fn draw_sides_panel(frame: &mut Frame, app: &App, area: Rect) {
    let Some(album) = app.selected_album() else {
        let empty = Paragraph::new("No albums")
            .block(Block::default().borders(Borders::ALL).title(" sides "));
        frame.render_widget(empty, area);
        return;
    };

    let side_count = album.side_count();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((side_count as u16).saturating_add(2)),
            Constraint::Min(3),
        ])
        .split(area);

    let sides: Vec<ListItem> = (0..side_count)
        .map(|s| ListItem::new(side_line(app.selected, album, s, app.now_playing)))
        .collect();
    let title = format!(
        " {} disc{} • {} ",
        album.discs().len(),
        if album.discs().len() == 1 { "" } else { "s" },
        format_side_length(album.duration())
    );
    let sides_list = List::new(sides)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if side_count > 0 {
        state.select(Some(app.selected_side.min(side_count - 1)));
    }
    frame.render_stateful_widget(sides_list, chunks[0], &mut state);

    let playing_pos = match app.now_playing {
        Some(r) if r.album == app.selected && r.side == app.selected_side => app.playing_position(),
        _ => None,
    };
    let tracks: Vec<ListItem> = album
        .side(app.selected_side)
        .map(|s| s.tracks())
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let len = t.duration.map(format_side_length).unwrap_or_else(|| "-".into());
            let marker = if playing_pos == Some(i) { "♪" } else { " " };
            ListItem::new(format!("{marker}{:>2}. {}  {}", i + 1, t.title, len))
        })
        .collect();
    let letter = vinyl::side_letter(app.selected_side).unwrap_or('?');
    let tracks_list = List::new(tracks).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" side {letter} ")),
    );
    frame.render_widget(tracks_list, chunks[1]);
}

fn metadata_text(app: &App) -> String {
    let mut lines = Vec::new();
    if let Some(album) = app.selected_album() {
        lines.push(format!("Album: {}", album.title));
        lines.push(format!("Artist: {}", album.artist.as_deref().unwrap_or("-")));
        lines.push(format!(
            "Pressing: {} disc(s), {} sides, {} tracks, {}",
            album.discs().len(),
            album.side_count(),
            album.track_count(),
            format_side_length(album.duration())
        ));
    } else {
        lines.push("No album selected".to_string());
    }
    if let Some((r, _, track)) = app.now_playing_track() {
        lines.push(String::new());
        lines.push(format!("Playing: {} ({})", track.title, App::side_label(r)));
        lines.push(format!("Path: {}", track.path.display()));
    }
    lines.join("\n")
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    display: &[usize],
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(5),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" platter ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, ui_settings))
        .slow_blink()
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(100 - ui_settings.sides_panel_percent),
            Constraint::Percentage(ui_settings.sides_panel_percent),
        ])
        .split(chunks[2]);
    draw_album_list(frame, app, display, main[0]);
    draw_sides_panel(frame, app, main[1]);

    // Overlay metadata popup (keeps the lists visible under it)
    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 9, chunks[2]);
        frame.render_widget(Clear, popup_area);
        let meta_paragraph = Paragraph::new(metadata_text(app))
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" metadata (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
