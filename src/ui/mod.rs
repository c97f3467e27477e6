use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use strum::IntoEnumIterator;
use time::OffsetDateTime;

use crate::app::state::{Panel, ViewState};
use crate::clock::{format_date, format_time};
use crate::state::{tasks, AppState, ThemeColor, FONT_CHOICES};

pub mod theme;

/// Everything a frame needs, borrowed from the app for the duration of a
/// draw.
pub struct Screen<'a> {
    pub state: &'a AppState,
    pub view: &'a ViewState,
    pub now: OffsetDateTime,
    pub persist_error: Option<&'a str>,
}

pub fn draw_app(
    frame: &mut Frame,
    screen: &Screen,
    task_list: &mut ListState,
    routine_list: &mut ListState,
) {
    let settings = &screen.state.settings;
    let accent = theme::accent(settings.theme());

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            format_time(screen.now, settings.time_format),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format_date(screen.now, settings.date_format),
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, vertical[0]);

    let progress = tasks::progress(screen.state);
    let gauge = Gauge::default()
        .block(Block::default().title("Progress").borders(Borders::ALL))
        .gauge_style(Style::default().fg(accent))
        .ratio(progress.ratio())
        .label(format!(
            "{}/{} done ({}%)",
            progress.completed,
            progress.total,
            progress.percent()
        ));
    frame.render_widget(gauge, vertical[1]);

    let text_style = theme::font_style(settings.font);
    let mut items: Vec<ListItem> = screen
        .state
        .tasks
        .iter()
        .map(|task| {
            let check = if task.completed { "[x] " } else { "[ ] " };
            let mut style = text_style;
            if task.completed {
                style = style.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
            }
            let mut spans = vec![Span::styled(check, Style::default().fg(accent))];
            spans.push(Span::styled(task.text.clone(), style));
            if task.is_daily() {
                spans.push(Span::styled(" ↻", Style::default().fg(Color::DarkGray)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    if items.is_empty() {
        items.push(ListItem::new("Nothing for today. Press `a` to add a task."));
    }
    if screen.state.tasks.is_empty() {
        task_list.select(None);
    } else {
        task_list.select(Some(screen.view.task_cursor));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .title("Today")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, vertical[2], task_list);

    let status = Paragraph::new(build_status_line(screen)).style(Style::default().fg(Color::Gray));
    frame.render_widget(status, vertical[3]);

    if screen.view.panel == Panel::Settings {
        render_settings(frame, screen, routine_list);
    }
    if screen.view.input().is_some() {
        render_input(frame, screen);
    }
}

fn build_status_line(screen: &Screen) -> Text<'static> {
    if let Some(error) = screen.persist_error {
        return Text::from(Line::from(Span::styled(
            format!("Not saved: {error}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(message) = screen.view.status() {
        return Text::from(message.to_owned());
    }
    let hints = match screen.view.panel {
        Panel::Checklist => {
            "j/k move • space toggle • a add • t time • d date • s settings • q quit"
        }
        Panel::Settings => "j/k move • e edit • n new • x delete • f font • c color • Esc close",
    };
    Text::from(hints)
}

fn render_settings(frame: &mut Frame, screen: &Screen, routine_list: &mut ListState) {
    let settings = &screen.state.settings;
    let accent = theme::accent(settings.theme());
    let area = centered_rect(70, 70, frame.size());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title("Settings")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(inner);

    let mut items: Vec<ListItem> = screen
        .state
        .daily_routine
        .iter()
        .map(|template| {
            if template.text.is_empty() {
                ListItem::new(Span::styled(
                    "(untitled)",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ))
            } else {
                ListItem::new(template.text.clone())
            }
        })
        .collect();
    if items.is_empty() {
        items.push(ListItem::new("No routine tasks. Press `n` to add one."));
    }
    if screen.state.daily_routine.is_empty() {
        routine_list.select(None);
    } else {
        routine_list.select(Some(screen.view.template_cursor));
    }
    let routine = List::new(items)
        .block(
            Block::default()
                .title("Daily routine (applies from the next reset)")
                .borders(Borders::BOTTOM),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(routine, rows[0], routine_list);

    let active = Style::default()
        .fg(accent)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let mut font_spans = vec![Span::raw("Font:  ")];
    for font in FONT_CHOICES {
        let style = if font == settings.font {
            active
        } else {
            Style::default()
        };
        font_spans.push(Span::styled(theme::font_label(font), style));
        font_spans.push(Span::raw("  "));
    }
    let current = settings.theme();
    let mut color_spans = vec![Span::raw("Color: ")];
    for color in ThemeColor::iter() {
        let mut style = Style::default().fg(theme::accent(color));
        if color == current {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        color_spans.push(Span::styled(color.to_string(), style));
        color_spans.push(Span::raw(" "));
    }
    let prefs = Paragraph::new(vec![Line::from(font_spans), Line::from(color_spans)])
        .wrap(Wrap { trim: true });
    frame.render_widget(prefs, rows[1]);
}

fn render_input(frame: &mut Frame, screen: &Screen) {
    let Some(input) = screen.view.input() else {
        return;
    };
    let accent = theme::accent(screen.state.settings.theme());
    let area = centered_rect(60, 20, frame.size());
    frame.render_widget(Clear, area);
    let mut display = input.buffer.clone();
    display.push('▌');
    let paragraph = Paragraph::new(vec![
        Line::from(display),
        Line::from(Span::styled(
            "Enter to save • Esc to cancel",
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(
        Block::default()
            .title(input.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent)),
    )
    .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}
