use crate::state::{AppState, Day, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> u16 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100) / self.total) as u16
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// Appends an ad-hoc task for today. Blank text adds nothing and returns
/// `None`.
pub fn add_task<'a>(state: &'a mut AppState, text: &str, today: Day) -> Option<&'a Task> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    state.tasks.push(Task::extra(text, today));
    state.tasks.last()
}

/// Flips completion in place; unknown ids are ignored.
pub fn toggle_task(state: &mut AppState, id: &str) -> Option<bool> {
    let task = state.tasks.iter_mut().find(|task| task.id == id)?;
    task.completed = !task.completed;
    Some(task.completed)
}

pub fn progress(state: &AppState) -> Progress {
    Progress {
        completed: state.tasks.iter().filter(|task| task.completed).count(),
        total: state.tasks.len(),
    }
}
