//! Log file loading.
//!
//! Files are read whole and decoded lossily, so a stray invalid byte in a
//! comment does not prevent the rest of the log from being read.

use std::fs;
use std::path::Path;

use crate::parsers::{Parseable, TimeScale, Tlog, TlogError};
use crate::state::LoadedFile;

/// Load and parse a telemetry log from disk
pub fn load_tlog(path: &Path, time_scale: TimeScale) -> Result<LoadedFile, TlogError> {
    let bytes = fs::read(path).map_err(|source| TlogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let contents = String::from_utf8_lossy(&bytes);

    if !contents.trim().is_empty() && !Tlog::is_tlog_path(path) && !Tlog::detect(&contents) {
        tracing::warn!(
            "{} does not look like a telemetry log, parsing anyway",
            path.display()
        );
    }

    let log = Tlog::new(time_scale).parse(&contents)?;

    tracing::info!("Loaded {} ({} bytes)", path.display(), bytes.len());
    Ok(LoadedFile::new(path.to_path_buf(), log))
}
