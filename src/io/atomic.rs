//! Write-to-temp-then-rename helper.
//!
//! Output is staged in a temporary file next to the destination and renamed
//! over it only once fully written. A crash mid-write leaves the previous file
//! untouched; an abandoned `StagedFile` removes its temp file on drop.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::AppError;

pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
    exit_code: u8,
}

impl StagedFile {
    /// Create the destination directory (if needed) and a temp file inside it.
    ///
    /// The temp file keeps the destination's extension so format-sniffing
    /// writers (e.g. the PNG encoder) pick the right format.
    pub fn new(target: &Path, exit_code: u8) -> Result<Self, AppError> {
        let dir = ensure_parent_dir(target, exit_code)?;
        let suffix = target
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix(".staged-")
            .suffix(&suffix)
            .tempfile_in(&dir)
            .map_err(|e| {
                AppError::new(
                    exit_code,
                    format!("Failed to create temp file in '{}': {e}", dir.display()),
                )
            })?;

        Ok(Self {
            temp,
            target: target.to_path_buf(),
            exit_code,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn file_mut(&mut self) -> &mut File {
        self.temp.as_file_mut()
    }

    /// Atomically replace the destination with the staged content.
    pub fn commit(self) -> Result<PathBuf, AppError> {
        let exit_code = self.exit_code;
        let target = self.target;
        self.temp.persist(&target).map_err(|e| {
            AppError::new(
                exit_code,
                format!("Failed to move output into '{}': {}", target.display(), e.error),
            )
        })?;
        Ok(target)
    }
}

/// Create the parent directory of `path` and return it (`.` for bare names).
pub fn ensure_parent_dir(path: &Path, exit_code: u8) -> Result<PathBuf, AppError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    create_dir_all(&dir).map_err(|e| {
        AppError::new(
            exit_code,
            format!("Failed to create directory '{}': {e}", dir.display()),
        )
    })?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn commit_replaces_target_and_leaves_no_temp_files() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested").join("out.csv");

        let mut staged = StagedFile::new(&target, 4).unwrap();
        assert!(staged.path().to_string_lossy().ends_with(".csv"));
        staged.file_mut().write_all(b"first").unwrap();
        staged.commit().unwrap();

        let mut staged = StagedFile::new(&target, 4).unwrap();
        staged.file_mut().write_all(b"second").unwrap();
        staged.commit().unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");
        assert_eq!(entries(target.parent().unwrap()), vec!["out.csv"]);
    }

    #[test]
    fn dropped_stage_keeps_previous_file() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("out.csv");
        std::fs::write(&target, "old").unwrap();

        {
            let mut staged = StagedFile::new(&target, 4).unwrap();
            staged.file_mut().write_all(b"partial").unwrap();
        }

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "old");
        assert_eq!(entries(tmp.path()), vec!["out.csv"]);
    }
}
