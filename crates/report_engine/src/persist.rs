use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// File name of a downloaded report.
pub const REPORT_FILENAME: &str = "report.csv";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory missing or not writable: {0}")]
    TargetDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

fn ensure_target_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::TargetDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::TargetDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::TargetDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes files into one directory via temp file + rename, so readers never see a partial report.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_target_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Stores a downloaded report as `report.csv` in `dir`, replacing any earlier one.
pub fn save_report(dir: &Path, content: &[u8]) -> Result<PathBuf, PersistError> {
    AtomicFileWriter::new(dir.to_path_buf()).write(REPORT_FILENAME, content)
}
