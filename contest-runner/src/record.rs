// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisting execution records, so that a later run can replay a previous selection.

use crate::errors::{RecordReadError, RecordWriteError};
use camino::{Utf8Path, Utf8PathBuf};
use contest_metadata::ExecutionRecord;
use std::{fs, io};
use tracing::debug;

/// Reads and writes an [`ExecutionRecord`] at a fixed path.
#[derive(Clone, Debug)]
pub struct ExecutionRecordStore {
    path: Utf8PathBuf,
}

impl ExecutionRecordStore {
    /// Creates a new store for the record at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the record.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Loads the record. Returns `Ok(None)` if there isn't one.
    pub fn load(&self) -> Result<Option<ExecutionRecord>, RecordReadError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(RecordReadError::Read {
                    path: self.path.clone(),
                    error,
                });
            }
        };

        let record: ExecutionRecord =
            serde_json::from_str(&contents).map_err(|error| RecordReadError::Deserialize {
                path: self.path.clone(),
                error,
            })?;
        if record.version != ExecutionRecord::CURRENT_VERSION {
            return Err(RecordReadError::VersionMismatch {
                path: self.path.clone(),
                expected: ExecutionRecord::CURRENT_VERSION,
                actual: record.version,
            });
        }

        debug!(
            "loaded execution record from {} with {} invocations",
            self.path,
            record.invocations.len()
        );
        Ok(Some(record))
    }

    /// Saves `record`, creating parent directories as needed.
    pub fn save(&self, record: &ExecutionRecord) -> Result<(), RecordWriteError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|error| RecordWriteError::CreateDir {
                path: parent.to_owned(),
                error,
            })?;
        }

        let contents = serde_json::to_string_pretty(record)
            .map_err(|error| RecordWriteError::Serialize { error })?;
        fs::write(&self.path, contents).map_err(|error| RecordWriteError::Write {
            path: self.path.clone(),
            error,
        })
    }

    /// Removes the record. Succeeds if there isn't one.
    pub fn clear(&self) -> Result<(), RecordWriteError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(RecordWriteError::Remove {
                path: self.path.clone(),
                error,
            }),
        }
    }
}
