//! Loading and saving the configuration file.
//!
//! Saves go through a temporary file in the target's directory that is
//! renamed over the target, after an optional timestamped backup copy.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use time::macros::format_description;
use time::OffsetDateTime;

use crate::config::{Document, Error};

/// Marker placed between the file name and the backup timestamp.
pub const BACKUP_MARKER: &str = "bak";

/// Configuration file on disk.
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file, `None` if it does not exist.
    pub fn read(&self) -> Result<Option<String>, Error> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(format!(
                "Failed to read '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Load and parse the file.
    ///
    /// A missing file is an empty document. The text as read is returned
    /// alongside so callers can tell whether anything changed.
    pub fn load(&self) -> Result<(Document, Option<String>), Error> {
        let text = self.read()?;
        let doc = match &text {
            Some(text) => text.parse().map_err(|e| match e {
                Error::Parse(msg) => {
                    Error::Parse(format!("Failed to parse '{}': {}", self.path.display(), msg))
                }
                other => other,
            })?,
            None => {
                log::info!(
                    "{} does not exist, starting from an empty document",
                    self.path.display()
                );
                Document::new()
            }
        };
        Ok((doc, text))
    }

    /// Copy the current file next to itself with a timestamp suffix.
    ///
    /// Returns the backup path, or `None` when there is nothing to back up.
    pub fn backup(&self) -> Result<Option<PathBuf>, Error> {
        if !self.path.exists() {
            return Ok(None);
        }
        let target = backup_path(&self.path, now())?;
        fs::copy(&self.path, &target).map_err(|e| {
            Error::Io(format!(
                "Failed to back up '{}' to '{}': {}",
                self.path.display(),
                target.display(),
                e
            ))
        })?;
        log::info!("backed up {} to {}", self.path.display(), target.display());
        Ok(Some(target))
    }

    /// Replace the file with `text`, backing up the previous version first
    /// if `backup` is set.
    pub fn save(&self, text: &str, backup: bool) -> Result<Option<PathBuf>, Error> {
        let backup_path = if backup { self.backup()? } else { None };

        let write_error = |e: io::Error| {
            Error::Io(format!("Failed to write '{}': {}", self.path.display(), e))
        };
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
        tmp.write_all(text.as_bytes()).map_err(write_error)?;
        tmp.as_file().sync_all().map_err(write_error)?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            fs::set_permissions(tmp.path(), metadata.permissions()).map_err(write_error)?;
        }
        tmp.persist(&self.path).map_err(|e| write_error(e.error))?;

        log::debug!("wrote {} bytes to {}", text.len(), self.path.display());
        Ok(backup_path)
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `<path>.bak-YYYYMMDD-HHMMSS`
pub fn backup_path(path: &Path, at: OffsetDateTime) -> Result<PathBuf, Error> {
    let stamp = at
        .format(format_description!(
            "[year][month][day]-[hour][minute][second]"
        ))
        .map_err(|e| Error::Io(format!("Failed to format backup timestamp: {}", e)))?;
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}-{}", BACKUP_MARKER, stamp));
    Ok(PathBuf::from(name))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use time::macros::datetime;

    fn backups(dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.to_string_lossy().contains(".bak-"))
            .collect();
        found.sort();
        found
    }

    #[test]
    fn test_backup_path_format() {
        let at = datetime!(2026-10-19 08:05:03 UTC);
        let path = backup_path(Path::new("/data/weewx.conf"), at).unwrap();
        assert_eq!(path, PathBuf::from("/data/weewx.conf.bak-20261019-080503"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile::new(dir.path().join("missing.conf"));
        assert_eq!(file.read().unwrap(), None);
        let (doc, text) = file.load().unwrap();
        assert!(doc.is_empty());
        assert!(text.is_none());
    }

    #[test]
    fn test_load_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.conf");
        fs::write(&path, "[Station\n").unwrap();
        let err = ConfigFile::new(&path).load().unwrap_err();
        match err {
            Error::Parse(msg) => {
                assert!(msg.contains("broken.conf"), "{}", msg);
                assert!(msg.contains("line 1"), "{}", msg);
            }
            other => panic!("Expected Error::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_save_creates_file_without_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.conf");
        let file = ConfigFile::new(&path);
        assert_eq!(file.save("[A]\n", true).unwrap(), None);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[A]\n");
        assert!(backups(dir.path()).is_empty());
    }

    #[test]
    fn test_save_backs_up_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weewx.conf");
        fs::write(&path, "old = 1\n").unwrap();

        let file = ConfigFile::new(&path);
        let backup = file.save("new = 2\n", true).unwrap().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new = 2\n");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "old = 1\n");
        assert_eq!(backups(dir.path()), vec![backup]);
    }

    #[test]
    fn test_save_without_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weewx.conf");
        fs::write(&path, "old = 1\n").unwrap();

        assert_eq!(ConfigFile::new(&path).save("new = 2\n", false).unwrap(), None);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new = 2\n");
        assert!(backups(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weewx.conf");
        fs::write(&path, "old = 1\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        ConfigFile::new(&path).save("new = 2\n", false).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
