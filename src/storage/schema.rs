use serde::Deserialize;

use crate::state::{Day, RoutineTemplate, Settings, Task, TaskKind};

/// The state blob as read back from disk.
///
/// Older files may lack any of these keys. Missing tasks and settings fall
/// back to defaults; a missing routine stays `None` so reconciliation can
/// tell it apart from a routine the user emptied on purpose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredState {
    pub tasks: Vec<Task>,
    pub daily_routine: Option<Vec<RoutineTemplate>>,
    pub settings: Settings,
    pub last_open_date: Option<Day>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawState {
    #[serde(default)]
    tasks: Vec<serde_json::Value>,
    #[serde(default)]
    daily_routine: Option<Vec<RoutineTemplate>>,
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    last_open_date: Option<Day>,
}

/// A task entry with every field optional; hand-edited and older files
/// often omit `type` or `dateAdded`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    completed: bool,
    #[serde(default, rename = "type")]
    kind: Option<TaskKind>,
    #[serde(default)]
    date_added: Option<Day>,
}

impl StoredTask {
    /// Untyped tasks count as extras; an undated task takes the stored day.
    fn into_task(self, last_open_date: Option<Day>) -> Option<Task> {
        Some(Task {
            date_added: self.date_added.or(last_open_date)?,
            id: self.id,
            text: self.text,
            completed: self.completed,
            kind: self.kind.unwrap_or(TaskKind::Extra),
        })
    }
}

/// Parses the blob, skipping task entries that cannot be read instead of
/// rejecting the whole file.
pub fn parse(raw: &[u8]) -> Result<StoredState, serde_json::Error> {
    let raw: RawState = serde_json::from_slice(raw)?;
    let last_open_date = raw.last_open_date;
    let tasks = raw
        .tasks
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            match serde_json::from_value::<StoredTask>(entry) {
                Ok(task) => {
                    let task = task.into_task(last_open_date);
                    if task.is_none() {
                        tracing::warn!(position, "skipping undated task entry");
                    }
                    task
                }
                Err(err) => {
                    tracing::warn!(position, %err, "skipping unreadable task entry");
                    None
                }
            }
        })
        .collect();

    Ok(StoredState {
        tasks,
        daily_routine: raw.daily_routine,
        settings: raw.settings,
        last_open_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TimeFormat;

    #[test]
    fn empty_object_yields_defaults_and_no_routine() {
        let stored = parse(b"{}").unwrap();
        assert!(stored.tasks.is_empty());
        assert!(stored.daily_routine.is_none());
        assert!(stored.last_open_date.is_none());
        assert_eq!(stored.settings, Settings::default());
    }

    #[test]
    fn explicit_empty_routine_is_kept() {
        let stored = parse(br#"{"dailyRoutine": [], "lastOpenDate": null}"#).unwrap();
        assert_eq!(stored.daily_routine, Some(vec![]));
    }

    #[test]
    fn full_blob_parses() {
        let raw = br#"{
            "tasks": [
                {"id": "t1", "text": "Buy milk", "completed": true, "type": "extra", "dateAdded": "Mon Jan 01 2024"}
            ],
            "dailyRoutine": [{"id": "r1", "text": "Stretch", "type": "daily"}],
            "settings": {"font": 2, "timeFormat": "24h", "dateFormat": "MM/DD", "themeColor": "blue"},
            "lastOpenDate": "Mon Jan 01 2024"
        }"#;
        let stored = parse(raw).unwrap();
        assert_eq!(stored.tasks[0].kind, TaskKind::Extra);
        assert!(stored.tasks[0].completed);
        assert_eq!(stored.daily_routine.unwrap()[0].text, "Stretch");
        assert_eq!(stored.settings.time_format, TimeFormat::TwentyFourHour);
        assert_eq!(stored.settings.font, 2);
        assert_eq!(
            stored.last_open_date.map(|day| day.to_string()).as_deref(),
            Some("Mon Jan 01 2024")
        );
    }

    #[test]
    fn wrong_shape_is_an_error() {
        assert!(parse(br#"{"tasks": "nope"}"#).is_err());
        assert!(parse(br#"{"lastOpenDate": "yesterday"}"#).is_err());
        assert!(parse(b"not json {{{").is_err());
    }

    #[test]
    fn task_without_type_or_date_is_kept_as_extra() {
        let raw = br#"{
            "tasks": [{"id": "x", "text": "Buy milk", "completed": false}],
            "lastOpenDate": "Tue Jan 02 2024"
        }"#;
        let stored = parse(raw).unwrap();
        assert_eq!(stored.tasks.len(), 1);
        assert_eq!(stored.tasks[0].kind, TaskKind::Extra);
        assert_eq!(stored.tasks[0].date_added.to_string(), "Tue Jan 02 2024");
    }

    #[test]
    fn unreadable_task_entries_are_skipped() {
        let raw = br#"{
            "tasks": [
                {"id": "t1", "text": "x", "type": "weekly", "dateAdded": "Mon Jan 01 2024"},
                {"id": "t2", "text": "Buy milk", "type": "extra", "dateAdded": "Mon Jan 01 2024"},
                {"id": "t3", "text": "no day anywhere"},
                "just a string"
            ]
        }"#;
        let stored = parse(raw).unwrap();
        let ids: Vec<_> = stored.tasks.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, ["t2"]);
    }
}
