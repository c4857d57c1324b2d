use crate::app::App;
use crate::artwork::{Artwork, Pixel};
use crate::models::{thumbnail_url, EntryDetail};
use crate::utils::{contrast_is_dark, format_name, stat_label, type_color};
use crate::view::{ArtworkState, DetailView, ListView, LoadState, ThumbState};
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Span, Spans};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::io;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const STAT_SCALE_MAX: f32 = 255.0;

pub fn draw_ui<B: Backend>(terminal: &mut Terminal<B>, app: &App) -> io::Result<()> {
    terminal
        .draw(|f| {
            let size = f.size();
            match &app.detail {
                Some(detail) => draw_detail(f, app, detail, size),
                None => draw_list(f, app, &app.list, size),
            }
            if app.show_help {
                draw_help(f, size);
            }
        })
        .map(|_| ())
}

// helper to compute a centered rect for popups
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_w = r.width.saturating_mul(percent_x) / 100;
    let popup_h = r.height.saturating_mul(percent_y) / 100;
    let popup_x = r.x + (r.width.saturating_sub(popup_w) / 2);
    let popup_y = r.y + (r.height.saturating_sub(popup_h) / 2);
    Rect::new(popup_x, popup_y, popup_w, popup_h)
}

fn loading_para(app: &App, text: String, title: &str) -> Paragraph<'static> {
    let frame = SPINNER[app.tick % SPINNER.len()];
    Paragraph::new(vec![
        Spans::from(Span::styled(
            frame.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::raw(text)),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(title.to_string()))
}

fn failed_para(text: String, reason: &str, title: &str) -> Paragraph<'static> {
    Paragraph::new(vec![
        Spans::from(Span::styled(
            text,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::raw(reason.to_string())),
        Spans::from(Span::raw("")),
        Spans::from(Span::raw("Press 'r' to retry.")),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title(title.to_string()))
}

/// One half-block cell for a vertical pair of pixels.
fn half_block(upper: Pixel, lower: Pixel) -> Span<'static> {
    match (upper, lower) {
        (Some((r, g, b)), Some((lr, lg, lb))) => Span::styled(
            "▀",
            Style::default()
                .fg(Color::Rgb(r, g, b))
                .bg(Color::Rgb(lr, lg, lb)),
        ),
        (Some((r, g, b)), None) => Span::styled("▀", Style::default().fg(Color::Rgb(r, g, b))),
        (None, Some((r, g, b))) => Span::styled("▄", Style::default().fg(Color::Rgb(r, g, b))),
        (None, None) => Span::raw(" "),
    }
}

/// Paint pixel rows two to a terminal line.
fn pixel_lines(rows: Vec<Vec<Pixel>>) -> Vec<Spans<'static>> {
    rows.chunks(2)
        .map(|pair| {
            let upper = &pair[0];
            let spans: Vec<Span> = upper
                .iter()
                .enumerate()
                .map(|(x, px)| {
                    let lower = pair.get(1).and_then(|row| row.get(x)).copied().flatten();
                    half_block(*px, lower)
                })
                .collect();
            Spans::from(spans)
        })
        .collect()
}

fn image_para(art: &Artwork, rect: Rect, title: &str) -> Paragraph<'static> {
    let w = rect.width.saturating_sub(2).max(1) as u32;
    let h = rect.height.saturating_sub(2).max(1) as u32;
    Paragraph::new(pixel_lines(art.rows(w, h * 2)))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
}

fn placeholder_para(text: &str, title: &str) -> Paragraph<'static> {
    Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
}

fn draw_list<B: Backend>(f: &mut Frame<B>, app: &App, list: &ListView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(chunks[0]);

    match &list.state {
        LoadState::Loading => {
            f.render_widget(
                loading_para(app, "Loading...".to_string(), "Pokédex"),
                area,
            );
            return;
        }
        LoadState::Failed(reason) => {
            f.render_widget(
                failed_para("Failed to load Pokémon list.".to_string(), reason, "Pokédex"),
                area,
            );
            return;
        }
        LoadState::Ready(_) => {}
    }

    let entries = list.entries();
    let items: Vec<ListItem> = list
        .visible
        .iter()
        .filter_map(|&i| entries.get(i))
        .map(|e| {
            let id = e.id().unwrap_or("?");
            ListItem::new(Spans::from(Span::raw(format!(
                "#{} {}",
                id,
                format_name(&e.name)
            ))))
        })
        .collect();

    let list_widget = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Pokédex"))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default();
    if !list.visible.is_empty() {
        state.select(Some(list.selected_visible));
    }
    f.render_stateful_widget(list_widget, left_chunks[0], &mut state);

    let search_para = if list.search_mode {
        Paragraph::new(Spans::from(Span::raw(format!("/{}", list.search_query))))
    } else if !list.search_query.is_empty() {
        Paragraph::new(Spans::from(Span::raw(format!(
            "filter: {} (Esc clears)",
            list.search_query
        ))))
    } else {
        Paragraph::new(Spans::from(Span::raw("Press '/' to search by name.")))
    };
    f.render_widget(
        search_para.block(Block::default().borders(Borders::ALL).title("Search")),
        left_chunks[1],
    );

    let entry = match list.selected_entry() {
        Some(e) => e,
        None => {
            f.render_widget(
                placeholder_para("No Pokémon match the filter", "Preview"),
                chunks[1],
            );
            return;
        }
    };

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(5)])
        .split(chunks[1]);

    let id = entry.id().unwrap_or_default();
    let thumb = match list.thumbs.get(id) {
        Some(ThumbState::Ready(art)) => image_para(art, right_chunks[0], "Thumbnail"),
        Some(ThumbState::Loading) => placeholder_para("loading...", "Thumbnail"),
        Some(ThumbState::Missing) => placeholder_para("(no sprite)", "Thumbnail"),
        None => placeholder_para("", "Thumbnail"),
    };
    f.render_widget(thumb, right_chunks[0]);

    let info = Paragraph::new(vec![
        Spans::from(Span::styled(
            format!("#{} {}", id, format_name(&entry.name)),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::raw(thumbnail_url(app.sprite_host(), id))),
        Spans::from(Span::raw("Enter: details   ?: help   q: quit")),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title("Entry"));
    f.render_widget(info, right_chunks[1]);
}

fn draw_detail<B: Backend>(f: &mut Frame<B>, app: &App, view: &DetailView, area: Rect) {
    let title = format_name(&view.target.display_name);
    let detail = match &view.state {
        LoadState::Loading => {
            f.render_widget(
                loading_para(app, "Loading Pokémon details...".to_string(), &title),
                area,
            );
            return;
        }
        LoadState::Failed(reason) => {
            f.render_widget(
                failed_para("Error loading Pokémon details.".to_string(), reason, &title),
                area,
            );
            return;
        }
        LoadState::Ready(d) => d,
    };

    let detail_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Min(6)])
        .split(area);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(10)])
        .split(detail_chunks[0]);

    let artwork = match &view.artwork {
        ArtworkState::Ready(art) => image_para(art, top_chunks[0], "Artwork"),
        ArtworkState::Pending => placeholder_para("loading...", "Artwork"),
        ArtworkState::Unavailable => placeholder_para("(artwork unavailable)", "Artwork"),
        ArtworkState::Disabled => placeholder_para("(images off)", "Artwork"),
    };
    f.render_widget(artwork, top_chunks[0]);

    f.render_widget(info_para(detail), top_chunks[1]);
    f.render_widget(stats_para(detail, detail_chunks[1]), detail_chunks[1]);
}

fn info_para(p: &EntryDetail) -> Paragraph<'static> {
    let mut info_lines: Vec<Spans> = Vec::new();
    info_lines.push(Spans::from(Span::styled(
        p.name.to_uppercase(),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )));
    info_lines.push(Spans::from(Span::raw("")));

    // types as colored badges
    let mut type_spans: Vec<Span> = vec![Span::raw("Types: ")];
    for (i, t) in p.types.iter().enumerate() {
        let (r, g, b) = type_color(t);
        let fg = if contrast_is_dark(r, g, b) {
            Color::Black
        } else {
            Color::White
        };
        type_spans.push(Span::styled(
            format!(" {} ", format_name(t)),
            Style::default().fg(fg).bg(Color::Rgb(r, g, b)),
        ));
        if i + 1 < p.types.len() {
            type_spans.push(Span::raw(" "));
        }
    }
    info_lines.push(Spans::from(type_spans));
    info_lines.push(Spans::from(Span::raw(format!("Height: {}", p.height_display()))));
    info_lines.push(Spans::from(Span::raw(format!("Weight: {}", p.weight_display()))));
    info_lines.push(Spans::from(Span::raw(format!(
        "Base EXP: {}",
        p.base_experience
    ))));
    let abilities: Vec<String> = p.abilities.iter().map(|a| format_name(a)).collect();
    info_lines.push(Spans::from(Span::raw(format!(
        "Abilities: {}",
        abilities.join(", ")
    ))));

    Paragraph::new(info_lines)
        .block(Block::default().borders(Borders::ALL).title("Info"))
        .wrap(Wrap { trim: true })
}

// NAME (padded) | VALUE | [bar...]
fn stats_para(p: &EntryDetail, rect: Rect) -> Paragraph<'static> {
    let inner_w = rect.width.saturating_sub(2) as usize;
    let name_w = 10usize;
    let val_w = 4usize;
    let bar_max_w = inner_w.saturating_sub(name_w + val_w + 2);

    let stat_lines: Vec<Spans> = p
        .stats
        .iter()
        .map(|st| {
            let bar_len = ((st.value as f32).min(STAT_SCALE_MAX) / STAT_SCALE_MAX
                * bar_max_w as f32)
                .round() as usize;
            Spans::from(vec![
                Span::raw(format!(
                    "{:<name_w$} {:>val_w$} ",
                    stat_label(&st.name),
                    st.value,
                    name_w = name_w,
                    val_w = val_w
                )),
                Span::styled("█".repeat(bar_len), Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    Paragraph::new(stat_lines).block(Block::default().borders(Borders::ALL).title("Stats"))
}

fn draw_help<B: Backend>(f: &mut Frame<B>, area: Rect) {
    let popup = centered_rect(60, 50, area);
    let help_lines = vec![
        Spans::from(Span::styled(
            "Keybindings",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::raw("")),
        Spans::from(Span::raw("Up/Down    Navigate list")),
        Spans::from(Span::raw("Enter      Open details")),
        Spans::from(Span::raw("/          Search by name")),
        Spans::from(Span::raw("Esc        Back / clear filter")),
        Spans::from(Span::raw("r          Retry a failed fetch")),
        Spans::from(Span::raw("q          Quit (back from details)")),
        Spans::from(Span::raw("?          Toggle this help")),
    ];
    let help_para = Paragraph::new(help_lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, popup);
    f.render_widget(help_para, popup);
}
