use std::env::VarError;
use std::fmt;
use std::io::Error;
use std::path::PathBuf;
use std::time::Duration;

use ratatui::crossterm::event::KeyEvent;

use crate::explorer::DEFAULT_DISPLAY_LIMIT;

#[derive(Debug)]
pub enum ExplorerError {
    IoError(Error),
    JsonError(serde_json::Error),
    LoadingFailed(String),
    FileNotFound(PathBuf),
    PermissionDenied(PathBuf),
    PathExpansion(String),
    LoggingFailed(String),
}

impl fmt::Display for ExplorerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorerError::IoError(e) => write!(f, "I/O error: {e}"),
            ExplorerError::JsonError(e) => write!(f, "Invalid dataset JSON: {e}"),
            ExplorerError::LoadingFailed(msg) => write!(f, "Loading failed: {msg}"),
            ExplorerError::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            ExplorerError::PermissionDenied(path) => {
                write!(f, "Permission denied: {}", path.display())
            }
            ExplorerError::PathExpansion(msg) => write!(f, "Cannot expand path: {msg}"),
            ExplorerError::LoggingFailed(msg) => write!(f, "Cannot set up logging: {msg}"),
        }
    }
}

impl std::error::Error for ExplorerError {}

impl From<Error> for ExplorerError {
    fn from(err: Error) -> Self {
        ExplorerError::IoError(err)
    }
}

impl From<serde_json::Error> for ExplorerError {
    fn from(err: serde_json::Error) -> Self {
        ExplorerError::JsonError(err)
    }
}

impl From<shellexpand::LookupError<VarError>> for ExplorerError {
    fn from(err: shellexpand::LookupError<VarError>) -> Self {
        ExplorerError::PathExpansion(err.to_string())
    }
}

impl From<tracing_subscriber::util::TryInitError> for ExplorerError {
    fn from(err: tracing_subscriber::util::TryInitError) -> Self {
        ExplorerError::LoggingFailed(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub event_poll_time: u64,
    pub display_limit: usize,
    pub debounce: Duration,
    pub data_dir: PathBuf,
    pub max_column_width: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            debounce: Duration::from_millis(200),
            data_dir: PathBuf::from("data"),
            max_column_width: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CMDMode {
    Search,
    CategoryFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    Sort,
    SortAscending,
    SortDescending,
    Search,
    Filter,
    Categories,
    ClearFilters,
    Reset,
    CopyCell,
    CopyRow,
    Help,
    Enter,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
    Tick,
}

pub const HELP_TEXT: &str = "\
q          quit
↑ ↓ k j    move row
← → h l    move column
PgUp PgDn  move page
g G        first / last row
s          sort by column (again to flip)
a d        sort ascending / descending
/          search
f          filter by category value
c          pick category from value counts
x          clear search and category
r          reset search, category and sort
Enter      show record / apply category
y Y        copy cell / row
Esc        close view
?          this help";
