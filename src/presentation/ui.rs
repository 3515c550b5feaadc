use crate::application::{App, AppMode, ControlKind, FormControl, FormRow, Theme};
use crate::domain::{OptionGroup, Value, is_default_color};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Colors used by one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub editing: Color,
    pub prompt: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                accent: Color::Cyan,
                text: Color::White,
                muted: Color::DarkGray,
                highlight_fg: Color::White,
                highlight_bg: Color::Blue,
                editing: Color::Green,
                prompt: Color::Yellow,
            },
            Theme::Light => Self {
                accent: Color::Magenta,
                text: Color::Black,
                muted: Color::Gray,
                highlight_fg: Color::Black,
                highlight_bg: Color::LightCyan,
                editing: Color::Blue,
                prompt: Color::Red,
            },
        }
    }
}

pub fn render_ui(f: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_header(f, app, &palette, chunks[0]);
    render_form(f, app, &palette, body[0]);
    render_preview(f, app, &palette, body[1]);
    render_status_bar(f, app, &palette, chunks[2]);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, &palette, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let location = match app.selected_row() {
        Some(FormRow::Section(index)) => app
            .form
            .sections()
            .get(index)
            .map(|section| section.title.clone())
            .unwrap_or_default(),
        Some(FormRow::Control(control)) => control.path().unwrap_or(control.label()).to_string(),
        None => String::new(),
    };
    let header = Paragraph::new(format!(
        "qrform - QR Code Styling | {} | Download as {}",
        location, app.export_format
    ))
    .style(Style::default().fg(palette.accent));
    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let items: Vec<ListItem> = app
        .rows()
        .iter()
        .map(|row| match row {
            FormRow::Section(index) => {
                let section = &app.form.sections()[*index];
                let marker = if section.is_open() { "▾" } else { "▸" };
                ListItem::new(Line::from(Span::styled(
                    format!("{} {}", marker, section.title),
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                )))
            }
            FormRow::Control(control) => ListItem::new(control_line(control, palette)),
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Options"))
        .style(Style::default().fg(palette.text))
        .highlight_style(Style::default().bg(palette.highlight_bg).fg(palette.highlight_fg));

    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn control_line(control: &FormControl, palette: &Palette) -> Line<'static> {
    let label_style = if control.is_enabled() {
        Style::default()
    } else {
        Style::default().fg(palette.muted)
    };
    let mut spans = vec![Span::styled(format!("  {}: ", control.label()), label_style)];

    match control.kind() {
        ControlKind::Checkbox => {
            let mark = if is_checked(&control.current()) { "[x]" } else { "[ ]" };
            spans[0] = Span::styled(format!("  {} {}", mark, control.label()), label_style);
        }
        ControlKind::Radio { .. } => {
            let mark = if is_checked(&control.current()) { "(•)" } else { "( )" };
            spans[0] = Span::styled(format!("  {} {}", mark, control.label()), label_style);
        }
        ControlKind::Select => {
            let current = control.current();
            let current = current.as_str().unwrap_or_default();
            let label = control
                .options()
                .into_iter()
                .find(|option| option.value == current)
                .map(|option| option.label)
                .unwrap_or_else(|| current.to_string());
            spans.push(Span::raw(format!("< {} >", label)));
            let disabled: Vec<String> = control
                .options()
                .into_iter()
                .filter(|option| !option.enabled)
                .map(|option| option.label)
                .collect();
            if !disabled.is_empty() {
                spans.push(Span::styled(
                    format!("  unavailable: {}", disabled.join(", ")),
                    Style::default().fg(palette.muted),
                ));
            }
        }
        ControlKind::Color => {
            let value = control.display_value();
            if let Some(color) = parse_hex_color(&value) {
                spans.push(Span::styled("██ ", Style::default().fg(color)));
            }
            spans.push(Span::raw(value.clone()));
            let group = OptionGroup::ALL
                .into_iter()
                .find(|group| control.path() == Some(group.color_path().as_str()));
            if let Some(group) = group {
                spans.push(if is_default_color(group, &value) {
                    Span::styled("  r: reset", Style::default().fg(palette.muted))
                } else {
                    Span::raw("  r: reset")
                });
            }
        }
        ControlKind::Number { .. } => {
            spans.push(Span::raw(control.display_value()));
            if let Some(min) = control.min().filter(|min| *min > 0.0) {
                spans.push(Span::styled(
                    format!("  (min {})", min),
                    Style::default().fg(palette.muted),
                ));
            }
        }
        ControlKind::File => {
            let value = control.display_value();
            spans.push(Span::raw(if value.is_empty() { "no file".to_string() } else { value }));
        }
        ControlKind::Text => spans.push(Span::raw(control.display_value())),
    }

    Line::from(spans)
}

fn is_checked(value: &Value) -> bool {
    value.as_bool().unwrap_or(false)
}

/// Parses `#rgb` and `#rrggbb` into a terminal color.
pub fn parse_hex_color(text: &str) -> Option<Color> {
    let hex = text.strip_prefix('#')?;
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(expanded.get(range)?, 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn render_preview(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let preview = Paragraph::new(app.preview_text())
        .block(Block::default().borders(Borders::ALL).title("Preview"))
        .style(Style::default().fg(palette.text))
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(app.preview_scroll).unwrap_or(u16::MAX), 0));
    f.render_widget(preview, area);
}

fn render_status_bar(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                let filename = app.options_file.as_deref().unwrap_or("unsaved");
                format!(
                    "Options: {} | Enter: change | ←→: adjust | d: download | \
                     Ctrl+S: save | Ctrl+O: load | ?: help | q: quit",
                    filename
                )
            }
        }
        AppMode::Editing => {
            let error = app
                .status_message
                .as_deref()
                .map(|e| format!(" [{}]", e))
                .unwrap_or_default();
            format!("Editing: {} (Enter to apply, Esc to cancel){}", app.input, error)
        }
        AppMode::Help => {
            "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string()
        }
        AppMode::SaveOptions => format!(
            "Save options as: {} (Enter to save, Esc to cancel)",
            app.filename_input
        ),
        AppMode::LoadOptions => format!(
            "Load options from: {} (Enter to load, Esc to cancel)",
            app.filename_input
        ),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default().fg(palette.text),
            AppMode::Editing => Style::default().fg(palette.editing),
            AppMode::Help => Style::default().fg(palette.accent),
            AppMode::SaveOptions | AppMode::LoadOptions => Style::default().fg(palette.prompt),
        });
    f.render_widget(input, area);
}

fn render_help_popup(f: &mut Frame, palette: &Palette, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("qrform Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(palette.accent)))
        .style(Style::default().fg(palette.text));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> &'static str {
    r#"QRFORM KEY REFERENCE

=== NAVIGATION ===
↑↓ or j/k       Move between rows
Enter/Space     Open a section, toggle a checkbox, pick a radio,
                advance a select or edit a text field
e or F2         Edit the selected text, number, color or file field
←→ or h/l       Step numbers, move selects backwards/forwards
PgUp/PgDn       Scroll the preview

=== EDITING ===
Enter           Apply the typed value
Esc             Discard the typed value
Numbers must respect the field minimum; colors use #rgb or #rrggbb.
The image field takes a path to a local image file.

=== STYLING ===
r               Reset the color of the focused section; the "r: reset"
                hint is dimmed while the color is already the default
c               Copy the dots color into the focused section
x               Remove the image
Data changes disable QR modes that cannot encode it and raise the
minimum type number to one that fits.

=== OUTPUT ===
d               Download in the current format
f               Cycle the download format
Ctrl+S          Save the form options to a JSON file
Ctrl+O          Load form options from a JSON file

=== OTHER ===
t               Switch between dark and light themes
F1 or ?         Show this help
q               Quit application

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window"#
}
