use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use genui_core::{Framework, Provider, SessionState, Tab, ToastLevel};
use crate::app::{App, FocusPane, InputMode};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [form_area, output_area] = Layout::horizontal([
        Constraint::Percentage(40),
        Constraint::Percentage(60),
    ])
    .areas(body_area);

    render_form(app, frame, form_area);
    render_output(app, frame, output_area);
    render_footer(app, frame, footer_area);

    // Overlays (in order of priority)
    if app.view.view().full_screen_open {
        render_full_screen_preview(app, frame, area);
    }
    if app.show_api_key_input {
        render_api_key_input(app, frame, area);
    } else if app.show_provider_picker {
        render_provider_picker(app, frame, area);
    } else if app.show_model_picker {
        render_model_picker(app, frame, area);
    }

    render_toasts(app, frame, area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" GenUI ", Style::default().fg(Color::Magenta).bold()),
        Span::styled(
            format!("{} ", app.session.client().describe()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn border_for(app: &App, pane: FocusPane) -> Style {
    if app.focus == pane {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_form(app: &mut App, frame: &mut Frame, area: Rect) {
    let frameworks = Framework::all();
    let [framework_area, description_area, hint_area] = Layout::vertical([
        Constraint::Length(frameworks.len() as u16 + 2),
        Constraint::Min(5),
        Constraint::Length(2),
    ])
    .areas(area);

    // Framework selector
    let items: Vec<ListItem> = frameworks
        .iter()
        .map(|framework| {
            if *framework == app.framework {
                ListItem::new(format!("● {}", framework.display_name()))
                    .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
            } else {
                ListItem::new(format!("○ {}", framework.display_name()))
            }
        })
        .collect();
    let framework_list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_for(app, FocusPane::Framework))
            .title(" Framework "),
    );
    frame.render_widget(framework_list, framework_area);

    // Description input
    let editing = app.input_mode == InputMode::Editing && app.focus == FocusPane::Description;
    let description_block = Block::default()
        .borders(Borders::ALL)
        .border_style(if editing {
            Style::default().fg(Color::Yellow)
        } else {
            border_for(app, FocusPane::Description)
        })
        .title(" Describe your component ");

    let description_text = if app.description.is_empty() && !editing {
        Text::from(Span::styled(
            "Describe your component in detail and let AI code it for you.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(app.description.as_str())
    };

    let inner = description_block.inner(description_area);
    let description = Paragraph::new(description_text)
        .block(description_block)
        .wrap(Wrap { trim: false });
    frame.render_widget(description, description_area);

    if editing && inner.width > 0 {
        let (x, y) = cursor_position(&app.description, app.description_cursor, inner.width);
        frame.set_cursor_position((inner.x + x, (inner.y + y).min(inner.bottom().saturating_sub(1))));
    }

    // Generate hint / spinner
    let hint = if app.session_state().is_in_flight() {
        Line::from(vec![
            Span::styled(
                format!(" {} ", SPINNER[app.animation_frame as usize % SPINNER.len()]),
                Style::default().fg(Color::Magenta),
            ),
            Span::raw("Generating..."),
        ])
    } else {
        Line::from(vec![
            Span::styled(" Enter ", Style::default().bg(Color::Magenta).fg(Color::White)),
            Span::styled(
                " generate your code ",
                Style::default().fg(Color::Gray),
            ),
        ])
    };
    frame.render_widget(Paragraph::new(hint), hint_area);
}

/// Cursor cell for a char index, following hard newlines and simple wrapping
fn cursor_position(text: &str, cursor: usize, width: u16) -> (u16, u16) {
    let width = width.max(1) as usize;
    let (mut x, mut y) = (0usize, 0usize);
    for c in text.chars().take(cursor) {
        if c == '\n' {
            x = 0;
            y += 1;
        } else {
            x += 1;
            if x >= width {
                x = 0;
                y += 1;
            }
        }
    }
    (x as u16, y as u16)
}

fn render_output(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_for(app, FocusPane::Output))
        .title(" Output ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.has_code() {
        render_code_view(app, frame, inner);
        return;
    }

    match app.session_state() {
        SessionState::Succeeded { .. } => {}
        SessionState::InFlight { .. } => {
            let spinner = SPINNER[app.animation_frame as usize % SPINNER.len()];
            render_centered(
                frame,
                inner,
                vec![
                    Line::styled(spinner, Style::default().fg(Color::Magenta).bold()),
                    Line::styled("Generating your component...", Style::default().fg(Color::Gray)),
                ],
            );
        }
        SessionState::Failed { reason } => {
            let message = reason.to_string();
            render_centered(
                frame,
                inner,
                vec![
                    Line::styled("Failed to generate code", Style::default().fg(Color::Red).bold()),
                    Line::styled(message, Style::default().fg(Color::Red)),
                    Line::raw(""),
                    Line::styled("Press g to try again", Style::default().fg(Color::DarkGray)),
                ],
            );
        }
        SessionState::Idle => {
            render_centered(
                frame,
                inner,
                vec![
                    Line::styled("</>", Style::default().fg(Color::Magenta).bold()),
                    Line::styled(
                        "Your component & code will appear here.",
                        Style::default().fg(Color::Gray),
                    ),
                ],
            );
        }
    }
}

fn render_centered(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let height = lines.len() as u16;
    let top = area.y + area.height.saturating_sub(height) / 2;
    let centered = Rect::new(area.x, top, area.width, height.min(area.height));
    let paragraph = Paragraph::new(lines)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, centered);
}

fn render_code_view(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tabs_area, toolbar_area, content_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let active = app.view.view().active_tab;

    // Tabs
    let tab_span = |tab: Tab| {
        let label = format!(" {} ", tab.title());
        if tab == active {
            Span::styled(label, Style::default().bg(Color::DarkGray).fg(Color::White).bold())
        } else {
            Span::styled(label, Style::default().fg(Color::Gray))
        }
    };
    let tabs = Line::from(vec![
        Span::raw(" "),
        tab_span(Tab::Editor),
        Span::raw(" "),
        tab_span(Tab::Preview),
    ]);
    frame.render_widget(Paragraph::new(tabs), tabs_area);

    // Toolbar: actions differ per tab
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::Gray);
    let mut toolbar = vec![Span::styled(
        if active == Tab::Editor { " Code Editor  " } else { " Live Preview  " },
        Style::default().bold(),
    )];
    let actions: &[(&str, &str)] = match active {
        Tab::Editor => &[(" y ", " copy "), (" e ", " export ")],
        Tab::Preview => &[(" f ", " full screen "), (" r ", " refresh "), (" o ", " browser ")],
    };
    for (key, label) in actions {
        toolbar.push(Span::styled(*key, key_style));
        toolbar.push(Span::styled(*label, label_style));
    }
    frame.render_widget(Paragraph::new(Line::from(toolbar)), toolbar_area);

    match active {
        Tab::Editor => {
            app.code_height = content_area.height;
            let code = app.session_state().code().unwrap_or_default();
            let number_width = code.lines().count().max(1).to_string().len();
            let lines: Vec<Line> = code
                .lines()
                .enumerate()
                .map(|(i, line)| {
                    Line::from(vec![
                        Span::styled(
                            format!("{:>width$} ", i + 1, width = number_width),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::raw(line.to_string()),
                    ])
                })
                .collect();
            let paragraph = Paragraph::new(lines).scroll((app.code_scroll, 0));
            frame.render_widget(paragraph, content_area);
        }
        Tab::Preview => {
            let surface = app.view.inline_surface();
            let lines: Vec<Line> = surface.lines().iter().map(|l| Line::raw(l.clone())).collect();
            let paragraph = Paragraph::new(lines)
                .style(Style::default().bg(Color::White).fg(Color::Black))
                .wrap(Wrap { trim: true })
                .scroll((surface.scroll, 0));
            frame.render_widget(paragraph, content_area);
        }
    }
}

fn render_full_screen_preview(app: &App, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Black))
        .style(Style::default().bg(Color::White).fg(Color::Black))
        .title(" Preview (Esc to close, r refresh, o browser) ");

    let surface = app.view.full_screen_surface();
    let lines: Vec<Line> = surface.lines().iter().map(|l| Line::raw(l.clone())).collect();
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((surface.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: Vec<(&str, &str)> = match (app.input_mode, app.focus) {
        (InputMode::Editing, _) => vec![
            (" Enter ", " generate "),
            (" Alt+Enter ", " newline "),
            (" Esc ", " done "),
        ],
        (InputMode::Normal, FocusPane::Framework) => vec![
            (" j/k ", " framework "),
            (" Tab ", " focus "),
            (" g ", " generate "),
        ],
        (InputMode::Normal, FocusPane::Description) => vec![
            (" i ", " edit "),
            (" Tab ", " focus "),
            (" g ", " generate "),
        ],
        (InputMode::Normal, FocusPane::Output) => vec![
            (" 1/2 ", " code/preview "),
            (" j/k ", " scroll "),
            (" Tab ", " focus "),
            (" x ", " reset "),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style)];
    for (key, label) in pairs
        .into_iter()
        .chain([(" P ", " provider "), (" M ", " model "), (" q ", " quit ")])
    {
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled(label, label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_toasts(app: &App, frame: &mut Frame, area: Rect) {
    let width = 48.min(area.width.saturating_sub(2));
    let mut y = area.y + 1;

    for toast in app.notifications.active().take(4) {
        if y + 3 > area.bottom() {
            break;
        }
        let color = match toast.level {
            ToastLevel::Success => Color::Green,
            ToastLevel::Error => Color::Red,
            ToastLevel::Info => Color::Cyan,
        };
        let toast_area = Rect::new(area.right().saturating_sub(width + 1), y, width, 3);
        frame.render_widget(Clear, toast_area);
        let paragraph = Paragraph::new(toast.message.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            )
            .style(Style::default().fg(color));
        frame.render_widget(paragraph, toast_area);
        y += 3;
    }
}

/// Centered popup rect, clamped to the frame
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

fn picker_list<'a>(items: Vec<ListItem<'a>>, title: &'a str) -> List<'a> {
    List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ")
}

fn render_model_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 40, app.available_models.len() as u16 + 2);
    frame.render_widget(Clear, popup);

    let items: Vec<ListItem> = app
        .available_models
        .iter()
        .map(|model| {
            let item = ListItem::new(format!(" {} ", model));
            if *model == app.selected_model {
                item.style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();

    let list = picker_list(items, " Model (Enter select, Esc cancel) ");
    frame.render_stateful_widget(list, popup, &mut app.model_picker_state);
}

fn render_provider_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let providers = Provider::all();
    let popup = popup_area(area, 45, providers.len() as u16 + 2);
    frame.render_widget(Clear, popup);

    let items: Vec<ListItem> = providers
        .iter()
        .map(|&provider| {
            let source = app.key_source(provider);
            let current = provider == app.current_provider;

            let status = match source {
                Some("env") => "(env var)",
                Some("config") => "(configured)",
                Some("local") => "(local)",
                _ => "(needs key)",
            };
            let style = match (current, source) {
                (true, _) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                (false, Some(_)) => Style::default(),
                (false, None) => Style::default().fg(Color::DarkGray),
            };

            ListItem::new(format!(
                "{}{} {}",
                if current { "* " } else { "  " },
                provider.display_name(),
                status
            ))
            .style(style)
        })
        .collect();

    let list = picker_list(items, " Provider ");
    frame.render_stateful_widget(list, popup, &mut app.provider_picker_state);
}

/// Keys are never shown in full: everything but the last four chars is starred
fn mask_key(key: &str) -> String {
    let len = key.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }
    let hidden = len - 4;
    let tail: String = key.chars().skip(hidden).collect();
    format!("{}...{}", "*".repeat(hidden.min(20)), tail)
}

fn render_api_key_input(app: &App, frame: &mut Frame, area: Rect) {
    let provider_name = app
        .api_key_target_provider
        .map(|p| p.display_name())
        .unwrap_or("Provider");

    let popup = popup_area(area, 60, 7);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" API key for {} ", provider_name));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [help_area, _, input_area, _, count_area] = Layout::vertical([Constraint::Length(1); 5]).areas(inner);

    frame.render_widget(
        Paragraph::new("Paste the key, then Enter to save or Esc to cancel.")
            .style(Style::default().fg(Color::DarkGray)),
        help_area,
    );
    frame.render_widget(
        Paragraph::new(mask_key(&app.api_key_input)).style(Style::default().fg(Color::Cyan)),
        input_area,
    );
    frame.render_widget(
        Paragraph::new(format!("{} characters", app.api_key_input.chars().count()))
            .style(Style::default().fg(Color::DarkGray)),
        count_area,
    );

    let cursor_x = app.api_key_input_cursor.min(input_area.width as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_position_follows_newlines_and_wrap() {
        assert_eq!(cursor_position("abc", 3, 10), (3, 0));
        assert_eq!(cursor_position("ab\ncd", 4, 10), (1, 1));
        assert_eq!(cursor_position("abcdef", 5, 4), (1, 1));
    }

    #[test]
    fn test_mask_key_keeps_last_four() {
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key("sk-123456"), "*****...3456");
    }

    #[test]
    fn test_popup_area_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 20);
        assert_eq!(popup_area(area, 40, 6), Rect::new(30, 7, 40, 6));
        assert_eq!(popup_area(area, 200, 50).width, 96);
    }
}
