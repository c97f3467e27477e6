use crate::state::{
    self, routine, settings, tasks, AppState, DateFormat, Day, Progress, Reconciliation,
    RoutineTemplate, Settings, Task, ThemeColor, TimeFormat,
};
use crate::storage::{PersistenceError, StateStore};

/// Owns today's state for the lifetime of the process.
///
/// Every action mutates the state and, when something changed, saves the
/// whole state before returning. A failed save is logged and remembered;
/// the session keeps working from memory.
pub struct Session<S: StateStore> {
    store: S,
    state: AppState,
    today: Day,
    reconciliation: Reconciliation,
    last_persist_error: Option<String>,
    detached: Option<String>,
}

impl<S: StateStore> Session<S> {
    /// Loads persisted state and reconciles it against `today`.
    ///
    /// A blob that cannot be loaded is copied aside before the fresh state
    /// replaces it. When that copy fails the session runs from memory and
    /// never writes over the original.
    pub fn open(store: S, today: Day, default_routine: &[String]) -> Self {
        let mut detached = None;
        let stored = match store.load() {
            Ok(stored) => stored,
            Err(err) => {
                match &err {
                    PersistenceError::Malformed { .. } => {
                        tracing::warn!(?err, "discarding malformed state")
                    }
                    PersistenceError::Unavailable { .. } => {
                        tracing::warn!(?err, "state unreadable, starting fresh")
                    }
                }
                match store.preserve_existing() {
                    Ok(Some(path)) => {
                        tracing::warn!(backup = %path.display(), "kept a copy of the previous state")
                    }
                    Ok(None) => {}
                    Err(backup_err) => {
                        tracing::warn!(?backup_err, "could not back up previous state, not saving");
                        detached = Some(format!("{err}; previous state left untouched"));
                    }
                }
                None
            }
        };

        let (state, reconciliation) = state::reconcile(stored, today, default_routine);
        let mut session = Self {
            store,
            state,
            today,
            reconciliation,
            last_persist_error: detached.clone(),
            detached,
        };
        if session.reconciliation.changed() {
            session.persist();
        }
        session
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn routine(&self) -> &[RoutineTemplate] {
        &self.state.daily_routine
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// The day fixed at open. A session left running past midnight keeps
    /// stamping this day; the reset happens on the next open.
    pub fn today(&self) -> Day {
        self.today
    }

    pub fn progress(&self) -> Progress {
        tasks::progress(&self.state)
    }

    pub fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }

    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Adds an extra task and returns its id; blank text is ignored.
    pub fn add_task(&mut self, text: &str) -> Option<String> {
        let id = tasks::add_task(&mut self.state, text, self.today).map(|task| task.id.clone());
        match &id {
            Some(id) => {
                tracing::debug!(%id, "task added");
                self.persist();
            }
            None => tracing::debug!("ignoring blank task text"),
        }
        id
    }

    /// Returns the new completion flag, or `None` when no task has `id`.
    pub fn toggle_task(&mut self, id: &str) -> Option<bool> {
        let completed = tasks::toggle_task(&mut self.state, id);
        match completed {
            Some(_) => self.persist(),
            None => tracing::debug!(id, "toggle ignored, no such task"),
        }
        completed
    }

    pub fn update_template_text(&mut self, index: usize, text: &str) -> bool {
        let changed = routine::update_template_text(&mut self.state, index, text);
        self.commit(changed)
    }

    pub fn remove_template(&mut self, index: usize) -> bool {
        let changed = routine::remove_template(&mut self.state, index);
        self.commit(changed)
    }

    pub fn add_template(&mut self) -> usize {
        let index = routine::add_template(&mut self.state);
        self.persist();
        index
    }

    pub fn cycle_time_format(&mut self) -> TimeFormat {
        let format = settings::cycle_time_format(&mut self.state);
        self.persist();
        format
    }

    pub fn cycle_date_format(&mut self) -> DateFormat {
        let format = settings::cycle_date_format(&mut self.state);
        self.persist();
        format
    }

    pub fn set_font(&mut self, font: u8) -> bool {
        let changed = settings::set_font(&mut self.state, font);
        self.commit(changed)
    }

    pub fn cycle_font(&mut self) -> u8 {
        let font = settings::cycle_font(&mut self.state);
        self.persist();
        font
    }

    pub fn set_theme_color(&mut self, key: &str) -> bool {
        let changed = settings::set_theme_color(&mut self.state, key);
        self.commit(changed)
    }

    pub fn cycle_theme_color(&mut self) -> ThemeColor {
        let color = settings::cycle_theme_color(&mut self.state);
        self.persist();
        color
    }

    fn commit(&mut self, changed: bool) -> bool {
        if changed {
            self.persist();
        }
        changed
    }

    fn persist(&mut self) {
        if let Some(reason) = &self.detached {
            tracing::debug!(%reason, "store detached, keeping changes in memory");
            self.last_persist_error = Some(reason.clone());
            return;
        }
        match self.store.save(&self.state) {
            Ok(()) => self.last_persist_error = None,
            Err(err) => {
                tracing::warn!(?err, "save failed, continuing in memory");
                self.last_persist_error = Some(err.to_string());
            }
        }
    }
}
