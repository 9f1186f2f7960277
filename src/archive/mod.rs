//! Zip packaging of the build-output directory.
//!
//! Streams every inventoried file into a single zip archive through a
//! fixed-size chunk buffer, reporting cumulative processed bytes after
//! each chunk. The archive is finalized, flushed and synced before the
//! summary is returned, so the caller can safely read the file's size
//! afterwards.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::debug;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::fs::walker::InventoryEntry;
use crate::utils::errors::{DeployError, Result};

/// Fixed name of the archive produced in the working directory.
pub const ARCHIVE_NAME: &str = "edgeserver_dist.zip";

/// Copy buffer size for the read-compress-write loop.
const CHUNK_SIZE: usize = 64 * 1024;

/// Entries at or above this size are written with zip64 headers.
const ZIP64_THRESHOLD: u64 = 4 * 1024 * 1024 * 1024;

/// A single packaging run.
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    /// Directory whose contents are packaged (not included as a prefix).
    pub source: PathBuf,

    /// Where the zip file is written. Overwritten if present.
    pub destination: PathBuf,

    /// Precomputed total from the scan, used for progress percentages.
    pub total_bytes: u64,
}

/// What the packaging stage produced.
#[derive(Debug)]
pub struct ArchiveSummary {
    /// Number of file and directory records written.
    pub entry_count: usize,

    /// Source bytes fed through the compressor.
    pub processed_bytes: u64,

    /// Size of the finished zip file on disk.
    pub archive_bytes: u64,
}

/// Build the archive, sending cumulative processed-byte counts over
/// `progress` after every chunk. The channel closes when the build ends;
/// the returned summary is the completion signal.
pub async fn build_archive(
    job: ArchiveJob,
    entries: Vec<InventoryEntry>,
    progress: mpsc::Sender<u64>,
) -> Result<ArchiveSummary> {
    tokio::task::spawn_blocking(move || write_archive(&job, &entries, &progress))
        .await
        .map_err(|e| DeployError::Io(std::io::Error::other(e)))?
}

fn write_archive(
    job: &ArchiveJob,
    entries: &[InventoryEntry],
    progress: &mpsc::Sender<u64>,
) -> Result<ArchiveSummary> {
    let file = File::create(&job.destination)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    let mut processed = 0u64;
    let mut buf = vec![0u8; CHUNK_SIZE];

    for entry in entries {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(entry.size >= ZIP64_THRESHOLD);

        if entry.is_dir {
            zip.add_directory(entry.relative_path.as_str(), options)?;
            continue;
        }

        zip.start_file(entry.relative_path.as_str(), options)?;

        let source_path = job.source.join(&entry.relative_path);
        let mut reader = File::open(&source_path).map_err(|e| read_error(&source_path, e))?;

        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            zip.write_all(&buf[..n])?;
            processed += n as u64;
            // The consumer may already be gone; packaging still completes.
            let _ = progress.blocking_send(processed);
        }
    }

    // Finalize: central directory, flush, sync. Only after this is the
    // file's size meaningful to the caller.
    let mut writer = zip.finish()?;
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| DeployError::Io(e.into_error()))?;
    file.sync_all()?;

    let archive_bytes = file.metadata()?.len();
    debug!(entries = entries.len(), archive_bytes, "archive finalized");

    Ok(ArchiveSummary {
        entry_count: entries.len(),
        processed_bytes: processed,
        archive_bytes,
    })
}

fn read_error(path: &Path, source: std::io::Error) -> DeployError {
    if source.kind() == std::io::ErrorKind::PermissionDenied {
        DeployError::Access {
            path: path.to_path_buf(),
            source,
        }
    } else {
        DeployError::Io(source)
    }
}
