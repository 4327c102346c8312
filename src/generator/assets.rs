//! Public asset copying and output directory housekeeping

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Copy every file under `public_dir` to the same relative path under
/// `output_dir`, keeping permissions and modification times.
///
/// A missing `public_dir` is not an error. Returns the number of files copied.
pub fn copy_public_assets(public_dir: &Path, output_dir: &Path) -> Result<usize> {
    if !public_dir.exists() {
        tracing::debug!("No public directory at {:?}", public_dir);
        return Ok(0);
    }

    let mut copied = 0;

    for entry in WalkDir::new(public_dir).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(public_dir).to_path_buf();
            Error::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(public_dir).unwrap_or(path);
        let dest = output_dir.join(relative);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        // fs::copy carries permissions over; the mtime has to be set by hand
        fs::copy(path, &dest).map_err(|e| Error::io(path, e))?;
        let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
        if let Some(modified) = modified {
            fs::File::options()
                .write(true)
                .open(&dest)
                .and_then(|f| f.set_modified(modified))
                .map_err(|e| Error::io(&dest, e))?;
        }

        tracing::debug!("Copied: {:?} -> {:?}", path, dest);
        copied += 1;
    }

    Ok(copied)
}

/// Remove `output_dir` and recreate it empty
pub fn clear_output_dir(output_dir: &Path) -> Result<()> {
    if output_dir.exists() {
        fs::remove_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;
        tracing::debug!("Deleted: {:?}", output_dir);
    }
    fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))
}
