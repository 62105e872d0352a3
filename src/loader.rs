use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::datasets::Dataset;
use crate::domain::ExplorerError;

/// Expands `~` and environment variables in a user supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf, ExplorerError> {
    Ok(PathBuf::from(shellexpand::full(raw)?.into_owned()))
}

/// An explicit file wins, otherwise the dataset's file inside `data_dir`.
pub fn dataset_path<R: Dataset>(data_dir: &Path, file: Option<&Path>) -> PathBuf {
    match file {
        Some(f) => f.to_path_buf(),
        None => data_dir.join(R::FILE_NAME),
    }
}

fn check_file(path: &Path) -> Result<u64, ExplorerError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ExplorerError::FileNotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => ExplorerError::PermissionDenied(path.to_path_buf()),
        _ => ExplorerError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(ExplorerError::LoadingFailed(format!(
            "{} is not a file",
            path.display()
        )));
    }
    Ok(metadata.len())
}

/// Reads a JSON array of records and fills in derived fields.
pub fn load_records<R: Dataset>(path: &Path) -> Result<Vec<R>, ExplorerError> {
    let file_size = check_file(path)?;
    debug!("Loading {} ({file_size} bytes)", path.display());

    let start_time = Instant::now();
    let reader = BufReader::new(File::open(path)?);
    let mut records: Vec<R> = serde_json::from_reader(reader)?;
    R::prepare(&mut records);

    info!(
        "Loaded {} records from {} in {}ms",
        records.len(),
        path.display(),
        start_time.elapsed().as_millis()
    );
    Ok(records)
}
