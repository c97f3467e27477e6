use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::App;
use crate::clock;
use crate::config::{ConfigLoader, CONFIG_ENV, DATA_ENV};
use crate::session::Session;
use crate::storage;

pub mod commands;

use self::commands::{AddArgs, RoutineCommand, SettingsCommand, ToggleArgs};

const LOG_FILE: &str = "daily-tasks.log";

#[derive(Parser, Debug)]
#[command(
    name = "daily",
    version,
    about = "Daily checklist with a routine that resets every morning"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over DAILY_TASKS_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over DAILY_TASKS_DATA)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive widget (default)
    Tui,
    /// Print today's list
    Show,
    /// Add a task for today only
    Add(AddArgs),
    /// Check or uncheck a task
    Toggle(ToggleArgs),
    /// Manage the daily routine
    #[command(subcommand)]
    Routine(RoutineCommand),
    /// Show or change display settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var(CONFIG_ENV, path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var(DATA_ENV, path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    let paths = loader.paths().clone();
    let command = cli.command.unwrap_or(Commands::Tui);

    // The widget owns the terminal, so its logs go to a file instead.
    let log_file = matches!(command, Commands::Tui).then(|| paths.log_dir.join(LOG_FILE));
    init_tracing(&cli.log_level, log_file.as_deref())
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    clock::init_local_offset();

    let config = loader.load_or_init()?;
    let storage = storage::init(&paths, &config.storage)?;
    let mut session = Session::open(storage, clock::today_local(), &config.default_routine);

    let output = match command {
        Commands::Tui => {
            let mut app = App::new(session, config.tick_rate());
            return app.run();
        }
        Commands::Show => commands::show(&session),
        Commands::Add(args) => commands::add_task(&mut session, args)?,
        Commands::Toggle(args) => commands::toggle_task(&mut session, &args),
        Commands::Routine(command) => commands::handle_routine_command(&mut session, command),
        Commands::Settings(command) => commands::handle_settings_command(&mut session, command),
    };
    print!("{output}");
    Ok(())
}

fn init_tracing(level: &str, log_file: Option<&Path>) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("opening log file {}", path.display()))?;
                fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }
            None => {
                fmt()
                    .with_env_filter(env_filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
        Ok::<(), anyhow::Error>(())
    })
    .map(|_| ())
}
