//! Startup reconciliation of persisted tasks against the daily routine.
//!
//! Runs once per session open, in this order:
//!
//! 1. nothing stored: seed the routine, instantiate it for today
//! 2. stored state without a routine: merge the default routine in
//! 3. stored day differs from today: drop every task and re-instantiate
//!    the routine (at most once per calendar day)
//! 4. no daily tasks but a non-empty routine: prepend fresh instances in
//!    front of whatever tasks exist

use std::collections::HashSet;

use crate::ids::new_id;
use crate::state::routine::default_templates;
use crate::state::{instantiate_all, AppState, Day, Settings};
use crate::storage::StoredState;

/// Which reconciliation steps changed the state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub bootstrapped: bool,
    pub routine_restored: bool,
    pub reset: bool,
    pub backfilled: usize,
    pub reassigned_ids: usize,
}

impl Reconciliation {
    pub fn changed(&self) -> bool {
        self.bootstrapped
            || self.routine_restored
            || self.reset
            || self.backfilled > 0
            || self.reassigned_ids > 0
    }
}

pub fn reconcile(
    stored: Option<StoredState>,
    today: Day,
    default_routine: &[String],
) -> (AppState, Reconciliation) {
    let mut report = Reconciliation::default();

    let mut state = match stored {
        None => {
            let daily_routine = default_templates(default_routine);
            let tasks = instantiate_all(&daily_routine, today);
            tracing::info!(templates = daily_routine.len(), %today, "seeding first-run routine");
            report.bootstrapped = true;
            AppState {
                tasks,
                daily_routine,
                settings: Settings::default(),
                last_open_date: Some(today),
            }
        }
        Some(stored) => {
            let daily_routine = stored.daily_routine.unwrap_or_else(|| {
                tracing::info!("stored state has no routine, merging defaults");
                report.routine_restored = true;
                default_templates(default_routine)
            });
            AppState {
                tasks: stored.tasks,
                daily_routine,
                settings: stored.settings,
                last_open_date: stored.last_open_date,
            }
        }
    };

    report.reassigned_ids = reassign_duplicate_ids(&mut state);
    if report.reassigned_ids > 0 {
        tracing::warn!(count = report.reassigned_ids, "replaced duplicate identifiers");
    }

    if state.last_open_date != Some(today) {
        let discarded = state.tasks.len();
        state.tasks = instantiate_all(&state.daily_routine, today);
        tracing::info!(
            previous = ?state.last_open_date.map(|day| day.to_string()),
            %today,
            discarded,
            created = state.tasks.len(),
            "new day, resetting task list"
        );
        state.last_open_date = Some(today);
        report.reset = true;
    }

    if state.daily_task_count() == 0 && !state.daily_routine.is_empty() {
        let mut tasks = instantiate_all(&state.daily_routine, today);
        report.backfilled = tasks.len();
        tasks.append(&mut state.tasks);
        state.tasks = tasks;
        tracing::info!(count = report.backfilled, "backfilled daily tasks from routine");
    }

    (state, report)
}

/// Gives a fresh id to every task or template whose id is blank or repeats
/// an earlier one.
fn reassign_duplicate_ids(state: &mut AppState) -> usize {
    let mut reassigned = 0;

    let mut seen = HashSet::new();
    for task in &mut state.tasks {
        if task.id.is_empty() || !seen.insert(task.id.clone()) {
            task.id = new_id();
            seen.insert(task.id.clone());
            reassigned += 1;
        }
    }

    seen.clear();
    for template in &mut state.daily_routine {
        if template.id.is_empty() || !seen.insert(template.id.clone()) {
            template.id = new_id();
            seen.insert(template.id.clone());
            reassigned += 1;
        }
    }

    reassigned
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::state::test_support::*;
    use crate::state::{TaskKind, DEFAULT_ROUTINE};

    fn stored(state: AppState) -> StoredState {
        StoredState {
            tasks: state.tasks,
            daily_routine: Some(state.daily_routine),
            settings: state.settings,
            last_open_date: state.last_open_date,
        }
    }

    fn defaults() -> Vec<String> {
        DEFAULT_ROUTINE.iter().map(|text| text.to_string()).collect()
    }

    #[test]
    fn bootstrap_seeds_routine_and_tasks() {
        let (state, report) = reconcile(None, tuesday(), &defaults());
        assert!(report.bootstrapped);
        assert!(!report.reset, "bootstrap must not also reset");
        assert_eq!(report.backfilled, 0);
        assert_eq!(state.last_open_date, Some(tuesday()));
        assert_eq!(state.daily_routine.len(), DEFAULT_ROUTINE.len());
        assert_eq!(state.tasks.len(), state.daily_routine.len());
        for (task, template) in state.tasks.iter().zip(&state.daily_routine) {
            assert_eq!(task.text, template.text);
            assert_ne!(task.id, template.id);
            assert_eq!(task.kind, TaskKind::Daily);
            assert!(!task.completed);
            assert_eq!(task.date_added, tuesday());
        }
    }

    #[test]
    fn same_day_reconcile_is_idempotent() {
        let routine = vec![template("r1", "Stretch"), template("r2", "Read")];
        let mut tasks = instantiate_all(&routine, tuesday());
        tasks[1].completed = true;
        tasks.push(task("x", "Buy milk", TaskKind::Extra, false, tuesday()));
        let original = state_with(tasks, routine, tuesday());

        let (first, report) = reconcile(Some(stored(original.clone())), tuesday(), &defaults());
        assert!(!report.changed());
        assert_eq!(first, original);

        let (second, report) = reconcile(Some(stored(first.clone())), tuesday(), &defaults());
        assert!(!report.changed());
        assert_eq!(
            serde_json::to_string(&second.tasks).unwrap(),
            serde_json::to_string(&first.tasks).unwrap()
        );
    }

    #[test]
    fn new_day_discards_completion_and_extras() {
        let routine = vec![template("r1", "Stretch"), template("r2", "Read")];
        let yesterday = state_with(
            vec![
                task("a", "Stretch", TaskKind::Daily, true, monday()),
                task("b", "Read", TaskKind::Daily, true, monday()),
                task("c", "Buy milk", TaskKind::Extra, false, monday()),
            ],
            routine,
            monday(),
        );

        let (state, report) = reconcile(Some(stored(yesterday)), tuesday(), &defaults());
        assert!(report.reset);
        assert_eq!(report.backfilled, 0);
        assert_eq!(state.last_open_date, Some(tuesday()));
        assert_eq!(state.tasks.len(), 2);
        assert!(state.tasks.iter().all(|task| task.is_daily()
            && !task.completed
            && task.date_added == tuesday()));
        let texts: Vec<_> = state.tasks.iter().map(|task| task.text.as_str()).collect();
        assert_eq!(texts, ["Stretch", "Read"]);
        let ids: HashSet<_> = state.tasks.iter().map(|task| task.id.as_str()).collect();
        assert!(!ids.contains("a") && !ids.contains("b") && !ids.contains("c"));
    }

    #[test]
    fn monday_to_tuesday_scenario() {
        let before = state_with(
            vec![task("t1", "Buy milk", TaskKind::Extra, true, monday())],
            vec![template("r1", "Stretch")],
            monday(),
        );
        let (state, _) = reconcile(Some(stored(before)), tuesday(), &defaults());
        assert_eq!(state.last_open_date.unwrap().to_string(), "Tue Jan 02 2024");
        assert_eq!(state.tasks.len(), 1);
        let only = &state.tasks[0];
        assert_eq!(only.kind, TaskKind::Daily);
        assert_eq!(only.text, "Stretch");
        assert!(!only.completed);
        assert_eq!(only.date_added.to_string(), "Tue Jan 02 2024");
        assert!(state.tasks.iter().all(|task| task.text != "Buy milk"));
    }

    #[test]
    fn missing_last_open_date_triggers_reset() {
        let mut before = state_with(
            vec![task("c", "Buy milk", TaskKind::Extra, false, monday())],
            vec![template("r1", "Stretch")],
            monday(),
        );
        before.last_open_date = None;
        let (state, report) = reconcile(Some(stored(before)), tuesday(), &defaults());
        assert!(report.reset);
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].text, "Stretch");
    }

    #[test]
    fn reset_with_empty_routine_leaves_empty_list() {
        let before = state_with(
            vec![
                task("a", "Stretch", TaskKind::Daily, true, monday()),
                task("c", "Buy milk", TaskKind::Extra, false, monday()),
            ],
            vec![],
            monday(),
        );
        let (state, report) = reconcile(Some(stored(before)), tuesday(), &defaults());
        assert!(report.reset);
        assert_eq!(report.backfilled, 0);
        assert!(state.tasks.is_empty());
        assert!(state.daily_routine.is_empty());
    }

    #[test]
    fn backfill_prepends_daily_tasks_and_keeps_extras() {
        let extras = vec![
            task("x1", "Buy milk", TaskKind::Extra, true, tuesday()),
            task("x2", "Call mom", TaskKind::Extra, false, tuesday()),
        ];
        let before = state_with(
            extras.clone(),
            vec![template("r1", "Stretch"), template("r2", "Read")],
            tuesday(),
        );

        let (state, report) = reconcile(Some(stored(before)), tuesday(), &defaults());
        assert!(!report.reset);
        assert_eq!(report.backfilled, 2);
        assert_eq!(state.tasks.len(), 4);
        assert_eq!(state.tasks[0].text, "Stretch");
        assert_eq!(state.tasks[1].text, "Read");
        assert!(state.tasks[..2].iter().all(|task| task.is_daily() && !task.completed));
        assert_eq!(&state.tasks[2..], &extras[..]);

        let (again, report) = reconcile(Some(stored(state.clone())), tuesday(), &defaults());
        assert_eq!(report.backfilled, 0);
        assert_eq!(again, state);
    }

    #[test]
    fn missing_routine_merges_defaults_without_touching_tasks() {
        let tasks = vec![task("a", "Old daily", TaskKind::Daily, true, tuesday())];
        let legacy = StoredState {
            tasks: tasks.clone(),
            daily_routine: None,
            settings: Settings::default(),
            last_open_date: Some(tuesday()),
        };

        let (state, report) = reconcile(Some(legacy), tuesday(), &defaults());
        assert!(report.routine_restored);
        assert!(!report.reset);
        assert_eq!(state.daily_routine.len(), DEFAULT_ROUTINE.len());
        assert_eq!(state.tasks, tasks);
    }

    #[test]
    fn duplicate_ids_are_reassigned() {
        let before = state_with(
            vec![
                task("a", "Stretch", TaskKind::Daily, false, tuesday()),
                task("a", "Read", TaskKind::Daily, false, tuesday()),
            ],
            vec![template("r1", "Stretch"), template("r1", "Read")],
            tuesday(),
        );
        let (state, report) = reconcile(Some(stored(before)), tuesday(), &defaults());
        assert_eq!(report.reassigned_ids, 2);
        assert_eq!(state.tasks[0].id, "a");
        assert_ne!(state.tasks[1].id, "a");
        assert_eq!(state.daily_routine[0].id, "r1");
        assert_ne!(state.daily_routine[1].id, "r1");
    }
}
