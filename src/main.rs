use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use ratatui::DefaultTerminal;
use tracing::{error, info};

mod controller;
mod datasets;
mod debounce;
mod domain;
mod explorer;
mod format;
mod inputter;
mod loader;
mod logging;
mod model;
mod record;
mod ui;

use controller::Controller;
use datasets::{
    CountyRankingRecord, CountyRecord, Dataset, DatasetKind, ProgramRecord, RecipientRecord,
    StateRecord,
};
use domain::{ExplorerConfig, ExplorerError, Message};
use explorer::{DEFAULT_DISPLAY_LIMIT, Explorer};
use model::{Model, Status};
use record::Record;
use ui::TableUI;

/// Browse aggregated farm subsidy payments by state, county, program or recipient.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dataset to explore
    #[arg(value_enum)]
    dataset: DatasetKind,
    /// Directory holding the dataset JSON files
    #[arg(long, env = "FARMTAB_DATA", default_value = "data")]
    data_dir: String,
    /// Read this file instead of the dataset's default file in the data directory
    #[arg(long, value_name = "PATH")]
    file: Option<String>,
    /// Maximum number of rows shown after filtering and sorting
    #[arg(long, default_value_t = DEFAULT_DISPLAY_LIMIT)]
    limit: usize,
    /// Quiet time after the last keystroke before a search is applied
    #[arg(long, default_value_t = 200)]
    debounce_ms: u64,
    /// How long to wait for terminal events per frame
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
    /// Log file, defaults to farmtab.log in the working directory
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Log level (overrides RUST_LOG)
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run() -> Result<(), ExplorerError> {
    let args = Args::parse();
    let log_path = logging::init(args.log_file.as_deref(), args.log_level.map(Into::into))?;

    let config = ExplorerConfig {
        event_poll_time: args.poll_ms,
        display_limit: args.limit,
        debounce: Duration::from_millis(args.debounce_ms),
        data_dir: loader::expand_path(&args.data_dir)?,
        ..ExplorerConfig::default()
    };
    let file = args.file.as_deref().map(loader::expand_path).transpose()?;
    info!(
        "Starting {:?} explorer, data dir {}, logging to {}",
        args.dataset,
        config.data_dir.display(),
        log_path.display()
    );

    match args.dataset {
        DatasetKind::States => explore::<StateRecord>(&config, file.as_deref()),
        DatasetKind::Counties => explore::<CountyRecord>(&config, file.as_deref()),
        DatasetKind::Programs => explore::<ProgramRecord>(&config, file.as_deref()),
        DatasetKind::Recipients => explore::<RecipientRecord>(&config, file.as_deref()),
        DatasetKind::CountyRankings => explore::<CountyRankingRecord>(&config, file.as_deref()),
    }
}

fn explore<R: Dataset>(config: &ExplorerConfig, file: Option<&Path>) -> Result<(), ExplorerError> {
    let path = loader::dataset_path::<R>(&config.data_dir, file);
    let records = loader::load_records::<R>(&path)?;
    let dataset = R::config().with_display_limit(config.display_limit);

    let mut model = Model::new(Explorer::new(records, dataset), config);
    let ui = TableUI::new(config);
    let controller = Controller::new(config);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut model, &ui, &controller);
    ratatui::restore();
    result
}

fn event_loop<R: Record>(
    terminal: &mut DefaultTerminal,
    model: &mut Model<R>,
    ui: &TableUI,
    controller: &Controller,
) -> Result<(), ExplorerError> {
    let size = terminal.size()?;
    model.update(Message::Resize(size.width as usize, size.height as usize));

    while model.status != Status::Quitting {
        // Render the current view
        terminal.draw(|f| ui.draw(model.get_uidata(), f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(model.raw_keyevents())? {
            model.update(message);
        }
    }
    info!("Quitting");
    Ok(())
}
