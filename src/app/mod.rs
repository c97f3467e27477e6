use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;
use time::OffsetDateTime;

use crate::clock;
use crate::session::Session;
use crate::storage::StateStore;
use crate::ui::{self, Screen};

pub mod state;

pub use state::{InputKind, InputLine, Panel, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    ToggleTask,
    AddTask,
    CycleTimeFormat,
    CycleDateFormat,
    OpenSettings,
    CloseSettings,
    EditTemplate,
    NewTemplate,
    RemoveTemplate,
    CycleFont,
    CycleThemeColor,
}

pub struct App<S: StateStore> {
    session: Session<S>,
    view: ViewState,
    task_list: ListState,
    routine_list: ListState,
    now: OffsetDateTime,
    should_quit: bool,
    tick_rate: Duration,
}

impl<S: StateStore> App<S> {
    pub fn new(session: Session<S>, tick_rate: Duration) -> Self {
        let mut view = ViewState::default();
        let report = session.reconciliation();
        if report.reset {
            view.set_status_message(Some("New day: the list was reset from your routine."));
        } else if report.backfilled > 0 {
            view.set_status_message(Some(format!(
                "Added {} routine task(s) for today.",
                report.backfilled
            )));
        }
        Self {
            session,
            view,
            task_list: ListState::default(),
            routine_list: ListState::default(),
            now: clock::now_local(),
            should_quit: false,
            tick_rate,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            terminal
                .draw(|frame| {
                    let screen = Screen {
                        state: self.session.state(),
                        view: &self.view,
                        now: self.now,
                        persist_error: self.session.last_persist_error(),
                    };
                    ui::draw_app(frame, &screen, &mut self.task_list, &mut self.routine_list);
                })
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                if let Event::Key(key) = event::read().context("reading terminal event")? {
                    self.handle_key(key);
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.on_tick();
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    /// Refreshes the clock only; task state is never touched by the timer.
    fn on_tick(&mut self) {
        self.now = clock::now_local();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.view.is_editing() {
            self.handle_input_key(key);
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.handle_action(Action::Quit);
            return;
        }

        let action = match self.view.panel {
            Panel::Checklist => match key.code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
                KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
                KeyCode::Char(' ') | KeyCode::Enter => Some(Action::ToggleTask),
                KeyCode::Char('a') => Some(Action::AddTask),
                KeyCode::Char('t') => Some(Action::CycleTimeFormat),
                KeyCode::Char('d') => Some(Action::CycleDateFormat),
                KeyCode::Char('s') => Some(Action::OpenSettings),
                _ => None,
            },
            Panel::Settings => match key.code {
                KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q') => {
                    Some(Action::CloseSettings)
                }
                KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
                KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
                KeyCode::Char('e') | KeyCode::Enter => Some(Action::EditTemplate),
                KeyCode::Char('n') => Some(Action::NewTemplate),
                KeyCode::Char('x') | KeyCode::Delete => Some(Action::RemoveTemplate),
                KeyCode::Char('f') => Some(Action::CycleFont),
                KeyCode::Char('c') => Some(Action::CycleThemeColor),
                _ => None,
            },
        };

        if let Some(action) = action {
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: Action) {
        self.view.set_status_message(None::<String>);
        let tasks = self.session.tasks().len();
        let templates = self.session.routine().len();
        match action {
            Action::Quit => self.should_quit = true,
            Action::SelectNext => match self.view.panel {
                Panel::Checklist => self.view.move_task_cursor(1, tasks),
                Panel::Settings => self.view.move_template_cursor(1, templates),
            },
            Action::SelectPrevious => match self.view.panel {
                Panel::Checklist => self.view.move_task_cursor(-1, tasks),
                Panel::Settings => self.view.move_template_cursor(-1, templates),
            },
            Action::ToggleTask => {
                let Some(id) = self
                    .session
                    .tasks()
                    .get(self.view.task_cursor)
                    .map(|task| task.id.clone())
                else {
                    return;
                };
                self.session.toggle_task(&id);
            }
            Action::AddTask => self.view.begin_input(InputKind::NewTask, ""),
            Action::CycleTimeFormat => {
                let format = self.session.cycle_time_format();
                self.view
                    .set_status_message(Some(format!("Time format: {}", format.label())));
            }
            Action::CycleDateFormat => {
                let format = self.session.cycle_date_format();
                self.view
                    .set_status_message(Some(format!("Date format: {}", format.label())));
            }
            Action::OpenSettings => self.view.open_settings(),
            Action::CloseSettings => self.view.close_settings(),
            Action::EditTemplate => {
                let index = self.view.template_cursor;
                if let Some(template) = self.session.routine().get(index) {
                    let text = template.text.clone();
                    self.view
                        .begin_input(InputKind::TemplateText { index, fresh: false }, &text);
                }
            }
            Action::NewTemplate => {
                let index = self.session.add_template();
                self.view.template_cursor = index;
                self.view
                    .begin_input(InputKind::TemplateText { index, fresh: true }, "");
            }
            Action::RemoveTemplate => {
                if self.session.remove_template(self.view.template_cursor) {
                    self.view.set_status_message(Some(
                        "Removed from routine; today's list is unchanged.",
                    ));
                }
            }
            Action::CycleFont => {
                self.session.cycle_font();
            }
            Action::CycleThemeColor => {
                self.session.cycle_theme_color();
            }
        }
        self.view
            .clamp(self.session.tasks().len(), self.session.routine().len());
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if let Some(input) = self.view.take_input() {
                    self.discard_fresh_template(&input);
                }
            }
            KeyCode::Enter => {
                if let Some(input) = self.view.take_input() {
                    self.submit_input(input);
                }
            }
            KeyCode::Backspace => self.view.pop_char(),
            KeyCode::Char(ch)
                if !key.modifiers.intersects(
                    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                ) =>
            {
                self.view.push_char(ch)
            }
            _ => {}
        }
        self.view
            .clamp(self.session.tasks().len(), self.session.routine().len());
    }

    fn submit_input(&mut self, input: InputLine) {
        match input.kind {
            InputKind::NewTask => {
                if self.session.add_task(&input.buffer).is_some() {
                    self.view.task_cursor = self.session.tasks().len() - 1;
                }
            }
            InputKind::TemplateText { index, .. } => {
                if !self.session.update_template_text(index, &input.buffer) {
                    self.discard_fresh_template(&input);
                }
            }
        }
    }

    /// A template created for a prompt that ended without text is dropped
    /// again.
    fn discard_fresh_template(&mut self, input: &InputLine) {
        if let InputKind::TemplateText { index, fresh: true } = input.kind {
            let blank = self
                .session
                .routine()
                .get(index)
                .map(|template| template.text.is_empty())
                .unwrap_or(false);
            if blank {
                self.session.remove_template(index);
            }
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("creating terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("disabling raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("leaving alternate screen")?;
    terminal.show_cursor().context("showing cursor")?;
    Ok(())
}
