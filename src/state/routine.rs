use serde::{Deserialize, Serialize};

use crate::ids::new_id;
use crate::state::AppState;

/// Starter routine used on first run and when older state has no routine.
pub const DEFAULT_ROUTINE: &[&str] = &[
    "Make the bed",
    "Drink a glass of water",
    "Stretch for five minutes",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Daily,
}

/// A recurring task definition. Its id names the slot in the routine and
/// survives resets; instances made from it get ids of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineTemplate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: TemplateKind,
}

impl RoutineTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            kind: TemplateKind::Daily,
        }
    }
}

/// Builds the seed routine from configured texts. Blank entries are skipped
/// and an empty result falls back to [`DEFAULT_ROUTINE`] so the seed is
/// never empty.
pub fn default_templates(texts: &[String]) -> Vec<RoutineTemplate> {
    let seeded: Vec<RoutineTemplate> = texts
        .iter()
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .map(RoutineTemplate::new)
        .collect();
    if !seeded.is_empty() {
        return seeded;
    }
    DEFAULT_ROUTINE.iter().copied().map(RoutineTemplate::new).collect()
}

/// Replaces a template's text. Today's tasks are left alone.
pub fn update_template_text(state: &mut AppState, index: usize, text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    match state.daily_routine.get_mut(index) {
        Some(template) if template.text != text => {
            template.text = text.to_owned();
            true
        }
        _ => false,
    }
}

pub fn remove_template(state: &mut AppState, index: usize) -> bool {
    if index >= state.daily_routine.len() {
        return false;
    }
    state.daily_routine.remove(index);
    true
}

/// Appends a blank template and returns its index; the caller is expected
/// to ask for its text right away.
pub fn add_template(state: &mut AppState) -> usize {
    state.daily_routine.push(RoutineTemplate::new(String::new()));
    state.daily_routine.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::*;
    use crate::state::{instantiate_all, TaskKind};

    #[test]
    fn default_templates_skip_blank_entries() {
        let templates = default_templates(&["  Read ".into(), "   ".into()]);
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].text, "Read");
    }

    #[test]
    fn default_templates_never_empty() {
        let templates = default_templates(&[]);
        assert_eq!(templates.len(), DEFAULT_ROUTINE.len());
        let ids: std::collections::HashSet<_> = templates.iter().map(|t| &t.id).collect();
        assert_eq!(ids.len(), templates.len());
    }

    #[test]
    fn update_ignores_blank_text_and_bad_index() {
        let mut state = state_with(vec![], vec![template("r1", "Stretch")], tuesday());
        assert!(!update_template_text(&mut state, 0, "   "));
        assert!(!update_template_text(&mut state, 4, "Run"));
        assert!(update_template_text(&mut state, 0, "  Run  "));
        assert_eq!(state.daily_routine[0].text, "Run");
        assert_eq!(state.daily_routine[0].id, "r1");
    }

    #[test]
    fn template_edits_do_not_touch_todays_tasks() {
        let routine = vec![template("r1", "Stretch"), template("r2", "Read")];
        let tasks = instantiate_all(&routine, tuesday());
        let mut state = state_with(tasks.clone(), routine, tuesday());
        state.tasks[0].completed = true;
        let before = state.tasks.clone();

        assert!(update_template_text(&mut state, 1, "Read a chapter"));
        assert!(remove_template(&mut state, 0));

        assert_eq!(state.tasks, before);
        assert_eq!(state.tasks[0].kind, TaskKind::Daily);
        assert_eq!(state.daily_routine.len(), 1);
    }

    #[test]
    fn remove_out_of_range_is_ignored() {
        let mut state = state_with(vec![], vec![template("r1", "Stretch")], tuesday());
        assert!(!remove_template(&mut state, 1));
        assert_eq!(state.daily_routine.len(), 1);
    }

    #[test]
    fn add_template_appends_blank_with_fresh_id() {
        let mut state = state_with(vec![], vec![template("r1", "Stretch")], tuesday());
        let index = add_template(&mut state);
        assert_eq!(index, 1);
        assert_eq!(state.daily_routine[1].text, "");
        assert_ne!(state.daily_routine[1].id, "r1");
        assert!(update_template_text(&mut state, index, "Journal"));
        assert_eq!(state.daily_routine[1].text, "Journal");
    }
}
