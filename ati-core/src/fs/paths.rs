use crate::error::{AtiError, Result};
use crate::settings::Settings;
use std::path::{Path, PathBuf};

/// Resolves the two directories of the file protocol.
///
/// * `incoming` - command directory, written by the bridge.
/// * `outgoing` - update directory, written by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtiPaths {
    incoming_dir: PathBuf,
    outgoing_dir: PathBuf,
}

impl AtiPaths {
    /// Creates an AtiPaths with explicit directories.
    pub fn new(incoming_dir: impl Into<PathBuf>, outgoing_dir: impl Into<PathBuf>) -> Self {
        Self {
            incoming_dir: incoming_dir.into(),
            outgoing_dir: outgoing_dir.into(),
        }
    }

    /// Derives `<documents>/<platform>/<incoming>` and `.../<outgoing>`.
    ///
    /// # Arguments
    ///
    /// * `settings` - Loaded bridge settings.
    ///
    /// # Returns
    ///
    /// A new `AtiPaths`. Nothing is created on disk.
    pub fn from_settings(settings: &Settings) -> Self {
        let root = settings.documents_dir.join(&settings.platform_folder);
        Self::new(
            root.join(&settings.incoming_folder),
            root.join(&settings.outgoing_folder),
        )
    }

    /// Ensures both directories exist, creating them if necessary.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if directories exist or were created.
    /// * `Err(AtiError::FileSystem)` naming the directory that failed.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.incoming_dir, &self.outgoing_dir] {
            std::fs::create_dir_all(dir).map_err(|e| AtiError::file_system(dir, e))?;
        }
        Ok(())
    }

    pub fn incoming_dir(&self) -> &Path {
        &self.incoming_dir
    }

    pub fn outgoing_dir(&self) -> &Path {
        &self.outgoing_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_layout() {
        let settings = Settings::with_documents_dir("/home/trader/Documents");
        let paths = AtiPaths::from_settings(&settings);
        assert_eq!(
            paths.incoming_dir(),
            Path::new("/home/trader/Documents/NinjaTrader 8/incoming")
        );
        assert_eq!(
            paths.outgoing_dir(),
            Path::new("/home/trader/Documents/NinjaTrader 8/outgoing")
        );
    }

    #[test]
    fn test_ensure_dirs_creates_both() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AtiPaths::from_settings(&Settings::with_documents_dir(tmp.path()));
        paths.ensure_dirs().unwrap();
        assert!(paths.incoming_dir().is_dir());
        assert!(paths.outgoing_dir().is_dir());

        // Idempotent.
        paths.ensure_dirs().unwrap();
    }

    #[test]
    fn test_ensure_dirs_reports_failing_path() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let paths = AtiPaths::new(blocker.join("incoming"), blocker.join("outgoing"));
        match paths.ensure_dirs() {
            Err(AtiError::FileSystem { path, .. }) => assert_eq!(path, blocker.join("incoming")),
            other => panic!("expected FileSystem error, got {:?}", other),
        }
    }
}
