//! Directory traversal and size accounting.
//!
//! Builds the inventory the packaging stage needs: every entry under the
//! build-output directory with its size, plus the byte total used to
//! compute progress percentages.

use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::utils::errors::{DeployError, Result};

/// One entry discovered during the walk.
#[derive(Debug, Clone)]
pub struct InventoryEntry {
    /// Path relative to the scanned root, normalized to forward slashes.
    pub relative_path: String,

    /// File size in bytes. Directories are recorded with 0.
    pub size: u64,

    /// Is this a directory?
    pub is_dir: bool,
}

/// The result of scanning a build-output directory.
///
/// `total_bytes` covers regular files only; directories appear in
/// `entries` but contribute nothing to the total. Entry order is traversal
/// order and is not sorted.
#[derive(Debug, Clone)]
pub struct DirectoryInventory {
    pub total_bytes: u64,
    pub entries: Vec<InventoryEntry>,
}

impl DirectoryInventory {
    /// Number of regular files in the inventory.
    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_dir).count()
    }
}

/// Walk `root` recursively and build the inventory.
///
/// Fails with [`DeployError::DirectoryNotFound`] when `root` does not
/// exist (or is not a directory) and with [`DeployError::Access`] when an
/// entry cannot be read.
pub fn scan_directory(root: &Path) -> Result<DirectoryInventory> {
    if !root.is_dir() {
        return Err(DeployError::DirectoryNotFound(root.to_path_buf()));
    }

    let mut total_bytes = 0u64;
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(map_walk_error)?;

        if let Some(item) = inventory_entry(&entry, root)? {
            total_bytes += item.size;
            entries.push(item);
        }
    }

    Ok(DirectoryInventory {
        total_bytes,
        entries,
    })
}

/// Convert a walk entry into an inventory entry.
/// Symlinks are resolved to the target's size; symlinks to directories and
/// broken symlinks are skipped.
fn inventory_entry(entry: &DirEntry, root: &Path) -> Result<Option<InventoryEntry>> {
    let path = entry.path();
    let metadata = entry.metadata().map_err(map_walk_error)?;

    let (size, is_dir) = if metadata.is_symlink() {
        match std::fs::metadata(path) {
            Ok(resolved) if resolved.is_dir() => return Ok(None),
            Ok(resolved) => (resolved.len(), false),
            // Broken symlink
            Err(_) => return Ok(None),
        }
    } else {
        (metadata.len(), metadata.is_dir())
    };

    let relative_path = path
        .strip_prefix(root)
        .map_err(std::io::Error::other)?
        .to_string_lossy()
        .replace('\\', "/");

    Ok(Some(InventoryEntry {
        relative_path,
        size: if is_dir { 0 } else { size },
        is_dir,
    }))
}

fn map_walk_error(err: walkdir::Error) -> DeployError {
    let path = err.path().map(Path::to_path_buf);
    match err.into_io_error() {
        Some(io) if io.kind() == std::io::ErrorKind::PermissionDenied => DeployError::Access {
            path: path.unwrap_or_default(),
            source: io,
        },
        Some(io) => DeployError::Io(io),
        None => DeployError::Io(std::io::Error::other("filesystem loop detected")),
    }
}
