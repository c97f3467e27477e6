pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod ids;
pub mod session;
pub mod state;
pub mod storage;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use session::Session;
pub use state::{AppState, Day, RoutineTemplate, Settings, Task, TaskKind};
pub use storage::{PersistenceError, StateStore, StorageHandle};
