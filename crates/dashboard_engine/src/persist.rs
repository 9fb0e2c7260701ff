use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::{ApiError, FailureKind};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot use output directory {0}")]
    OutputDir(String),
    #[error("not a plain file name: {0:?}")]
    InvalidFilename(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<PersistError> for ApiError {
    fn from(err: PersistError) -> Self {
        ApiError::new(FailureKind::Io, err.to_string())
    }
}

/// Creates `dir` (and parents) unless it is already a directory.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::OutputDir(format!(
            "{} exists and is not a directory",
            dir.display()
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => fs::create_dir_all(dir)
            .map_err(|err| PersistError::OutputDir(format!("{}: {err}", dir.display()))),
        Err(err) => Err(PersistError::OutputDir(format!("{}: {err}", dir.display()))),
    }
}

/// Writes files into one directory through a sibling temp file, so readers
/// never see a half-written download.
///
/// Filenames come from the backend, so anything that is not a single plain
/// path component is refused.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        if !is_plain_filename(filename) {
            return Err(PersistError::InvalidFilename(filename.to_string()));
        }
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(content)?;
        staged.flush()?;
        staged.as_file().sync_all()?;

        staged.persist(&target).map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }
}

fn is_plain_filename(filename: &str) -> bool {
    !filename.is_empty()
        && Path::new(filename).file_name().and_then(|name| name.to_str()) == Some(filename)
        && !filename.contains(['/', '\\'])
}
