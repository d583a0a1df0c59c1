//! Recursive search for files that parse as DICOM.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{
    error::{Error, Result},
    volume_loader::VolumeLoader,
};

/// Why a candidate path was left out of the discovered set.
#[derive(Debug, thiserror::Error)]
pub enum Rejection {
    /// The directory walk could not read the entry.
    #[error("{0}")]
    Unreadable(walkdir::Error),
    /// The file is not a DICOM file, or its header is truncated.
    #[error("{0}")]
    NotDicom(Error),
}

/// Header-only check whether `path` is a DICOM file.
///
/// # Errors
///
/// Returns the parse error for files that are not DICOM.
pub fn probe(path: &Path) -> Result<()> {
    VolumeLoader::probe(path).map(|_| ())
}

/// Find every DICOM file below `root`, logging rejected candidates at debug level.
///
/// # Errors
///
/// Returns [`Error::InputRoot`] if `root` is not a readable directory.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    discover_with(root, |path, rejection| {
        tracing::debug!("Skipping {}: {rejection}", path.display());
    })
}

/// Find every DICOM file below `root`.
///
/// Files are visited in file name order within each directory. Each candidate
/// that fails the header check is handed to `on_reject` and left out; the walk
/// always continues.
///
/// # Errors
///
/// Returns [`Error::InputRoot`] if `root` is not a readable directory.
pub fn discover_with<F>(root: &Path, mut on_reject: F) -> Result<Vec<PathBuf>>
where
    F: FnMut(&Path, Rejection),
{
    let metadata = std::fs::metadata(root).map_err(|err| Error::InputRoot {
        path: root.to_path_buf(),
        reason: err.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(Error::InputRoot {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                on_reject(&path, Rejection::Unreadable(err));
                continue;
            }
        };
        // Links to files count as files; linked directories are not entered.
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        match probe(entry.path()) {
            Ok(()) => found.push(entry.into_path()),
            Err(err) => on_reject(entry.path(), Rejection::NotDicom(err)),
        }
    }

    Ok(found)
}
