//! Delivery of encoded commands to the platform.
//!
//! A command is a file in the command directory. The platform may pick a
//! file up the moment its name appears, so each command is first written to
//! a hidden staging file, synced, and then renamed into place. Rename within
//! one directory is atomic, so a half-written command is never visible under
//! its final name.

use crate::error::{AtiError, Result};
use crate::protocol::encode;
use ati::Command;
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const COMMAND_EXTENSION: &str = "txt";
const STAGING_EXTENSION: &str = "tmp";

/// Writes command files into the command directory.
///
/// Cheap to clone and safe to share: the only coordination between concurrent
/// writers is the random file name.
#[derive(Debug, Clone)]
pub struct CommandChannel {
    dir: PathBuf,
}

impl CommandChannel {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encodes and submits a command.
    ///
    /// # Returns
    ///
    /// * `Ok(path)` of the command file now visible to the platform.
    /// * `Err(AtiError::Validation)` if the command cannot be encoded.
    /// * `Err(AtiError::FileSystem)` if the file cannot be written.
    pub fn send(&self, command: &Command) -> Result<PathBuf> {
        let line = encode(command)?;
        self.submit(&line)
    }

    /// Writes one encoded line as a new command file.
    ///
    /// Delivery is at most once: a successful return only means the file is in
    /// place, not that the platform read or accepted it.
    pub fn submit(&self, line: &str) -> Result<PathBuf> {
        let token = Uuid::new_v4().simple().to_string();
        let staging_path = self.dir.join(format!(".{}.{}", token, STAGING_EXTENSION));
        let final_path = self.dir.join(format!("{}.{}", token, COMMAND_EXTENSION));

        if let Err(e) = write_synced(&staging_path, line) {
            let _ = std::fs::remove_file(&staging_path);
            return Err(AtiError::file_system(&staging_path, e));
        }

        if let Err(e) = std::fs::rename(&staging_path, &final_path) {
            let _ = std::fs::remove_file(&staging_path);
            return Err(AtiError::file_system(&final_path, e));
        }

        debug!("[Channel] Wrote {:?}: {}", final_path.file_name(), line);
        Ok(final_path)
    }
}

fn write_synced(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(line.as_bytes())?;
    file.sync_all()
}
