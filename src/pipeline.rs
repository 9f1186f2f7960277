//! End-to-end deployment pipeline.
//!
//! Strictly sequential: scan, package, upload. Any failure aborts the run
//! and skips the remaining stages, so a scan error never writes an archive
//! and an archive error never touches the network.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::info;

use crate::archive::{self, ArchiveJob, ARCHIVE_NAME};
use crate::config::DeployConfig;
use crate::fs::walker::scan_directory;
use crate::transfer::progress::{format_bytes, PackagingProgress};
use crate::transfer::upload::{UploadClient, UploadOutcome};
use crate::utils::errors::{DeployError, Result};

/// Run one full package-and-upload attempt.
///
/// The archive lands at [`ARCHIVE_NAME`] in the working directory and is
/// left in place afterwards for inspection.
pub async fn run(config: &DeployConfig) -> Result<()> {
    run_at(config, Path::new(ARCHIVE_NAME)).await
}

async fn run_at(config: &DeployConfig, destination: &Path) -> Result<()> {
    let inventory = scan_directory(&config.directory)?;
    info!(
        files = inventory.file_count(),
        total = %format_bytes(inventory.total_bytes),
        "scanned {}",
        config.directory.display()
    );

    let job = ArchiveJob {
        source: config.directory.clone(),
        destination: destination.to_path_buf(),
        total_bytes: inventory.total_bytes,
    };
    let (progress_tx, progress_rx) = mpsc::channel(64);
    let reporter = tokio::spawn(report_progress(progress_rx, inventory.total_bytes));

    let built = archive::build_archive(job, inventory.entries, progress_tx).await;
    // The sender is gone either way; let the reporter drain before moving on.
    let _ = reporter.await;
    let summary = built?;
    info!(
        entries = summary.entry_count,
        size = %format_bytes(summary.archive_bytes),
        "archive finalized"
    );

    let client = UploadClient::new(config)?;
    info!(server = %config.server, site = %config.app_id, "uploading archive");
    match client.push_archive(destination).await? {
        UploadOutcome::Success => {
            info!("Successfully Deployed");
            Ok(())
        }
        UploadOutcome::Unauthorized => Err(DeployError::Unauthorized),
        UploadOutcome::UnknownFailure(code) => Err(DeployError::UnexpectedStatus(code)),
    }
}

/// Consume cumulative byte counts and log each percentage step once.
async fn report_progress(mut progress_rx: mpsc::Receiver<u64>, total_bytes: u64) {
    let mut gauge = PackagingProgress::new(total_bytes);
    let mut last_logged = 0u8;
    while let Some(processed) = progress_rx.recv().await {
        gauge.update(processed);
        let percent = gauge.percent();
        if percent != last_logged {
            info!("Packaging... {percent}%");
            last_logged = percent;
        }
    }
}
