//! Eligible image discovery under an input directory.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::codec;
use crate::error::{Result, WatermarkError};

/// All `.jpg`/`.jpeg`/`.png` files under `root`.
///
/// Non-recursive discovery only looks at the root's direct children.
/// Entries are visited in file-name order, so the result is stable for a
/// given directory layout.
pub fn discover_images(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(root).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut images = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            WatermarkError::Directory(format!("finding image files in {}: {}", root.display(), e))
        })?;
        if is_file_entry(&entry) && codec::is_supported(entry.path()) {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}

/// Regular files, and symlinks whose target is a regular file.
fn is_file_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}
