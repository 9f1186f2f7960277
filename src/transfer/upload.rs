//! Authenticated archive upload.
//!
//! One attempt per invocation: no retry and no request timeout. Transient
//! network failures surface as fatal errors instead of being masked.

use std::path::Path;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode, Url};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::archive::ARCHIVE_NAME;
use crate::config::DeployConfig;
use crate::transfer::progress::percent_of;
use crate::transfer::progress_stream::CountingStream;
use crate::utils::errors::{DeployError, Result};

/// How a single upload attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Success,
    Unauthorized,
    UnknownFailure(u16),
}

/// HTTP client for the deployment endpoint.
pub struct UploadClient {
    client: Client,
    endpoint: Url,
    app_id: String,
    token: String,
}

impl UploadClient {
    pub fn new(config: &DeployConfig) -> Result<Self> {
        let base = config.server.trim_end_matches('/');
        let endpoint =
            Url::parse(&format!("{base}/deployments/push")).map_err(|e| DeployError::Config {
                field: "server",
                message: e.to_string(),
            })?;

        Ok(Self {
            client: Client::new(),
            endpoint,
            app_id: config.app_id.clone(),
            token: config.token.clone(),
        })
    }

    /// PUT the archive as the single `data` field of a multipart form and
    /// classify the response status.
    ///
    /// The response body is always drained, even on success, so the
    /// underlying connection is released.
    pub async fn push_archive(&self, archive_path: &Path) -> Result<UploadOutcome> {
        let file = tokio::fs::File::open(archive_path).await?;
        let archive_bytes = file.metadata().await?.len();

        let stream = CountingStream::new(
            ReaderStream::new(file),
            Arc::new(move |sent| {
                debug!(
                    percent = percent_of(sent, archive_bytes),
                    "upload progress"
                );
            }),
        );

        let part = Part::stream_with_length(Body::wrap_stream(stream), archive_bytes)
            .file_name(ARCHIVE_NAME)
            .mime_str("application/zip")?;
        let form = Form::new().part("data", part);

        let response = self
            .client
            .put(self.endpoint.clone())
            .query(&[("site", self.app_id.as_str())])
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let _ = response.bytes().await?;

        Ok(classify(status))
    }
}

fn classify(status: StatusCode) -> UploadOutcome {
    match status.as_u16() {
        200 => UploadOutcome::Success,
        403 => UploadOutcome::Unauthorized,
        code => UploadOutcome::UnknownFailure(code),
    }
}
