//! Multipart file upload with progress reporting.
//!
//! The file is streamed in fixed-size chunks; progress is reported as each
//! chunk is handed to the transport, followed by a final `complete` or
//! `error` report.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde_json::Value;
use tracing::{debug, info};

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{UploadProgress, UploadStatus};

pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.min(total) * 100 + total / 2) / total) as u8
}

fn split_chunks(contents: Bytes) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(contents.len() / UPLOAD_CHUNK_SIZE + 1);
    let mut rest = contents;
    while !rest.is_empty() {
        let take = rest.len().min(UPLOAD_CHUNK_SIZE);
        chunks.push(rest.split_to(take));
    }
    chunks
}

struct ProgressReporter {
    file_id: String,
    filename: String,
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    fn report(&self, progress: u8, status: UploadStatus) {
        if let Some(callback) = &self.callback {
            callback(UploadProgress {
                file_id: self.file_id.clone(),
                filename: self.filename.clone(),
                progress,
                status,
            });
        }
    }
}

impl ApiClient {
    pub(crate) async fn upload_file(
        &self,
        endpoint: &str,
        filename: &str,
        contents: Bytes,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Value, ClientError> {
        let total = contents.len() as u64;
        let reporter = Arc::new(ProgressReporter {
            file_id: format!("temp_{}", Utc::now().timestamp_millis()),
            filename: filename.to_string(),
            callback: on_progress,
        });
        info!("Uploading {filename} ({total} bytes) to {endpoint}");

        let stream_reporter = reporter.clone();
        let mut sent = 0u64;
        let stream = futures::stream::iter(split_chunks(contents)).map(move |chunk| {
            sent += chunk.len() as u64;
            stream_reporter.report(percent(sent, total), UploadStatus::Uploading);
            Ok::<Bytes, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = match self.client.post(self.url(endpoint)).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Upload transport error: {e}");
                reporter.report(0, UploadStatus::Error);
                return Err(ClientError::Upload(
                    "Upload failed: Network error".to_string(),
                ));
            }
        };

        let status = response.status();
        if !status.is_success() {
            reporter.report(0, UploadStatus::Error);
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Service {
                status: status.as_u16(),
                message: format!(
                    "Upload failed: {}",
                    status.canonical_reason().unwrap_or("Unknown Status")
                ),
                details: serde_json::from_str(&body).ok(),
            });
        }

        let text = response.text().await?;
        reporter.report(100, UploadStatus::Complete);
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}
