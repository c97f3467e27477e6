use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

use crate::ids::new_id;

pub mod reconcile;
pub mod routine;
pub mod settings;
pub mod tasks;

pub use reconcile::{reconcile, Reconciliation};
pub use routine::{DEFAULT_ROUTINE, RoutineTemplate, TemplateKind};
pub use settings::{DateFormat, Settings, ThemeColor, TimeFormat, FONT_CHOICES};
pub use tasks::Progress;

/// Storage form of a calendar day, e.g. `Tue Jan 02 2024`.
const DAY_FORMAT: &[FormatItem<'static>] =
    format_description!("[weekday repr:short] [month repr:short] [day] [year]");

/// Host-local calendar date at day granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(Date);

impl Day {
    pub fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn date(self) -> Date {
        self.0
    }

    pub fn parse(raw: &str) -> Result<Self, time::error::Parse> {
        Date::parse(raw.trim(), DAY_FORMAT).map(Self)
    }
}

impl From<Date> for Day {
    fn from(date: Date) -> Self {
        Self(date)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.0.format(DAY_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Day {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Day::parse(&raw).map_err(|err| de::Error::custom(format!("invalid day {raw:?}: {err}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Instantiated from a routine template.
    Daily,
    /// Added by hand for the current day.
    Extra,
}

/// A concrete task on today's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub date_added: Day,
}

impl Task {
    pub fn extra(text: &str, today: Day) -> Self {
        Self {
            id: new_id(),
            text: text.to_owned(),
            completed: false,
            kind: TaskKind::Extra,
            date_added: today,
        }
    }

    pub fn is_daily(&self) -> bool {
        self.kind == TaskKind::Daily
    }
}

/// Builds today's instance of a routine template.
///
/// Only the text is copied: the instance gets its own identifier so later
/// edits to the template never reach tasks that already exist.
pub fn instantiate(template: &RoutineTemplate, today: Day) -> Task {
    Task {
        id: new_id(),
        text: template.text.clone(),
        completed: false,
        kind: TaskKind::Daily,
        date_added: today,
    }
}

pub fn instantiate_all(routine: &[RoutineTemplate], today: Day) -> Vec<Task> {
    routine
        .iter()
        .map(|template| instantiate(template, today))
        .collect()
}

/// Everything persisted for the widget, saved and loaded as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub tasks: Vec<Task>,
    pub daily_routine: Vec<RoutineTemplate>,
    pub settings: Settings,
    pub last_open_date: Option<Day>,
}

impl AppState {
    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn daily_task_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_daily()).count()
    }
}
