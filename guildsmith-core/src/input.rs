//! CSV input — one row per desired channel.
//!
//! Column 1 is the channel name; columns 2..N are optional user identifiers
//! to invite. Rows without content in the first column are skipped.

use std::path::Path;

use crate::types::DesiredChannel;

/// Why the input file could not be turned into a desired set.
///
/// Both variants are fatal: the engine never runs on a partial set.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input file '{path}' not found")]
    NotFound { path: String },
    #[error("failed to read input file '{path}': {message}")]
    Malformed { path: String, message: String },
}

/// Read the full desired set from `path`.
///
/// Fields are trimmed; empty identifier cells are dropped; duplicate
/// identifiers within a row are kept, in order.
pub fn read_desired_channels(path: &Path) -> Result<Vec<DesiredChannel>, InputError> {
    let display = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| open_error(&display, e))?;

    let mut desired = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| InputError::Malformed {
            path: display.clone(),
            message: e.to_string(),
        })?;
        let source_row = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);
        let Some(first) = record.get(0) else { continue };
        let name = first.trim();
        if name.is_empty() {
            continue;
        }
        let user_identifiers: Vec<String> = record
            .iter()
            .skip(1)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        desired.push(DesiredChannel {
            name: name.to_string(),
            user_identifiers,
            source_row,
        });
    }
    Ok(desired)
}

fn open_error(path: &str, err: csv::Error) -> InputError {
    match err.kind() {
        csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            InputError::NotFound {
                path: path.to_string(),
            }
        }
        _ => InputError::Malformed {
            path: path.to_string(),
            message: err.to_string(),
        },
    }
}
