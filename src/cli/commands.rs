use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::clock::{self, format_date};
use crate::session::Session;
use crate::state::{Task, FONT_CHOICES};
use crate::storage::StateStore;
use crate::ui::theme::font_label;

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Task text. If omitted, reads one line from stdin.
    #[arg()]
    pub text: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ToggleArgs {
    /// 1-based position in `daily show`, or a task id (a unique prefix is enough)
    pub target: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RoutineCommand {
    /// List routine tasks
    List,
    /// Append a routine task; it shows up from the next reset
    Add {
        /// Text for the new routine task
        text: Option<String>,
    },
    /// Change the text of a routine task
    Edit {
        /// 1-based position in `daily routine list`
        position: usize,
        /// New text (whitespace trimmed)
        text: String,
    },
    /// Remove a routine task; today's list is unchanged
    Remove {
        /// 1-based position in `daily routine list`
        position: usize,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print current settings
    Show,
    /// Switch between 12h and 24h time
    Time,
    /// Cycle the date format (Month, MM/DD, DD/MM)
    Date,
    /// Pick a font style
    Font {
        /// One of 1, 2 or 3
        font: u8,
    },
    /// Pick an accent color from the palette
    Theme {
        /// Palette key, e.g. green or blue
        color: String,
    },
}

pub fn show<S: StateStore>(session: &Session<S>) -> String {
    let mut out = String::new();
    let settings = session.settings();
    out.push_str(&format_date(clock::now_local(), settings.date_format));
    out.push('\n');
    let progress = session.progress();
    out.push_str(&format!(
        "{}/{} done ({}%)\n\n",
        progress.completed,
        progress.total,
        progress.percent()
    ));
    if session.tasks().is_empty() {
        out.push_str("Nothing for today.\n");
        return out;
    }
    for (index, task) in session.tasks().iter().enumerate() {
        out.push_str(&format_task_line(index, task));
        out.push('\n');
    }
    out
}

fn format_task_line(index: usize, task: &Task) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let marker = if task.is_daily() { "  (routine)" } else { "" };
    format!("{:>3}. {check} {}{marker}", index + 1, task.text)
}

pub fn add_task<S: StateStore>(session: &mut Session<S>, args: AddArgs) -> Result<String> {
    let text = match args.text {
        Some(text) => text,
        None => read_stdin()?.unwrap_or_default(),
    };
    let output = match session.add_task(&text) {
        Some(id) => format!("Added \"{}\" ({id})\n", text.trim()),
        None => "Nothing added: task text is empty.\n".to_string(),
    };
    Ok(with_persist_warning(session, output))
}

pub fn toggle_task<S: StateStore>(session: &mut Session<S>, args: &ToggleArgs) -> String {
    let Some(id) = resolve_task(session.tasks(), &args.target) else {
        return format!("No task matches {}.\n", args.target);
    };
    let output = match session.toggle_task(&id) {
        Some(true) => format!("Checked off {}\n", describe(session, &id)),
        Some(false) => format!("Unchecked {}\n", describe(session, &id)),
        None => format!("No task matches {}.\n", args.target),
    };
    with_persist_warning(session, output)
}

fn describe<S: StateStore>(session: &Session<S>, id: &str) -> String {
    session
        .state()
        .find_task(id)
        .map(|task| format!("\"{}\"", task.text))
        .unwrap_or_else(|| id.to_string())
}

/// Accepts a 1-based position, an exact id, or a unique id prefix.
/// A number always means a position, even when it is out of range.
fn resolve_task(tasks: &[Task], target: &str) -> Option<String> {
    let target = target.trim();
    if let Ok(position) = target.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| tasks.get(index))
            .map(|task| task.id.clone());
    }
    if let Some(task) = tasks.iter().find(|task| task.id == target) {
        return Some(task.id.clone());
    }
    if target.is_empty() {
        return None;
    }
    let mut matches = tasks.iter().filter(|task| task.id.starts_with(target));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Some(task.id.clone()),
        _ => None,
    }
}

pub fn handle_routine_command<S: StateStore>(
    session: &mut Session<S>,
    command: RoutineCommand,
) -> String {
    let output = match command {
        RoutineCommand::List => return list_routine(session),
        RoutineCommand::Add { text } => {
            let index = session.add_template();
            match text {
                Some(text) if session.update_template_text(index, &text) => {
                    format!("Added routine task #{}: {}\n", index + 1, text.trim())
                }
                _ => format!(
                    "Added blank routine task #{}; set its text with `daily routine edit {} <TEXT>`.\n",
                    index + 1,
                    index + 1
                ),
            }
        }
        RoutineCommand::Edit { position, text } => {
            let updated = position
                .checked_sub(1)
                .map(|index| session.update_template_text(index, &text))
                .unwrap_or(false);
            if updated {
                format!("Routine task #{position} is now: {}\n", text.trim())
            } else {
                format!("Routine task #{position} unchanged.\n")
            }
        }
        RoutineCommand::Remove { position } => {
            let removed = position
                .checked_sub(1)
                .map(|index| session.remove_template(index))
                .unwrap_or(false);
            if removed {
                format!("Removed routine task #{position}; today's list is unchanged.\n")
            } else {
                format!("No routine task #{position}.\n")
            }
        }
    };
    with_persist_warning(session, output)
}

fn list_routine<S: StateStore>(session: &Session<S>) -> String {
    if session.routine().is_empty() {
        return "The routine is empty.\n".to_string();
    }
    let mut out = String::new();
    for (index, template) in session.routine().iter().enumerate() {
        let text = if template.text.is_empty() {
            "(untitled)"
        } else {
            template.text.as_str()
        };
        out.push_str(&format!("{:>3}. {text}\n", index + 1));
    }
    out
}

pub fn handle_settings_command<S: StateStore>(
    session: &mut Session<S>,
    command: SettingsCommand,
) -> String {
    let output = match command {
        SettingsCommand::Show => return format_settings(session),
        SettingsCommand::Time => {
            format!("Time format: {}\n", session.cycle_time_format().label())
        }
        SettingsCommand::Date => {
            format!("Date format: {}\n", session.cycle_date_format().label())
        }
        SettingsCommand::Font { font } => {
            if session.set_font(font) || session.settings().font == font {
                format!("Font: {font} ({})\n", font_label(font))
            } else {
                format!(
                    "Unknown font {font}; choose {}-{}.\n",
                    FONT_CHOICES.start(),
                    FONT_CHOICES.end()
                )
            }
        }
        SettingsCommand::Theme { color } => {
            let already_set = session.settings().theme_color == color.trim().to_lowercase();
            if session.set_theme_color(&color) || already_set {
                format!("Theme color: {}\n", session.settings().theme_color)
            } else {
                format!("Unknown theme color {color}.\n")
            }
        }
    };
    with_persist_warning(session, output)
}

fn format_settings<S: StateStore>(session: &Session<S>) -> String {
    let settings = session.settings();
    format!(
        "font         {} ({})\ntime format  {}\ndate format  {}\ntheme color  {}\n",
        settings.font,
        font_label(settings.font),
        settings.time_format.label(),
        settings.date_format.label(),
        settings.theme_color
    )
}

fn with_persist_warning<S: StateStore>(session: &Session<S>, mut output: String) -> String {
    if let Some(error) = session.last_persist_error() {
        output.push_str(&format!("warning: changes were not saved: {error}\n"));
    }
    output
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading task text from stdin")?;
    Ok(buffer.lines().next().map(str::to_owned))
}
