use super::types::{ProgressEvent, UploadEvent, UploadItem};
use super::UploadError;
use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Url};
use std::sync::mpsc::Sender;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const UPLOAD_PATH: &str = "/niko/compress-upload";
pub const UPLOAD_FIELD: &str = "files";
const PDF_MIME: &str = "application/pdf";

#[derive(Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl UploadClient {
    pub fn new(origin: &Url, timeout: Duration) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(UploadError::Request)?;
        Ok(Self::with_client(http, origin))
    }

    pub fn with_client(http: reqwest::Client, origin: &Url) -> Self {
        // join() resolves an absolute path against the origin, dropping any path it had
        let endpoint = origin
            .join(UPLOAD_PATH)
            .unwrap_or_else(|_| origin.clone());
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends every item as one multipart request, reporting per-file progress
    /// on `events` as file contents are streamed into the request body.
    pub async fn upload(
        &self,
        items: &[UploadItem],
        events: &Sender<UploadEvent>,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, UploadError> {
        if items.is_empty() {
            return Err(UploadError::EmptyBatch);
        }

        info!(
            "Uploading {} file(s) to {}: {:?}",
            items.len(),
            self.endpoint,
            items.iter().map(|item| &item.name).collect::<Vec<_>>()
        );

        let mut form = Form::new();
        for item in items {
            form = form.part(UPLOAD_FIELD, Self::file_part(item, events).await?);
        }

        let request = self.http.post(self.endpoint.clone()).multipart(form).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                info!("Upload cancelled before the server responded");
                return Err(UploadError::Cancelled);
            }
            response = request => response?,
        };

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!("Upload failed with status {}: {}", status, text);
            return Err(UploadError::Server { status, body: text });
        }

        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        info!("Upload successful: {}", body);
        Ok(body)
    }

    async fn file_part(item: &UploadItem, events: &Sender<UploadEvent>) -> Result<Part, UploadError> {
        let read_error = |source| UploadError::Read {
            name: item.name.clone(),
            source,
        };
        let file = tokio::fs::File::open(&item.path).await.map_err(read_error)?;
        let total = file.metadata().await.map_err(read_error)?.len();
        if total != item.size {
            warn!(
                "'{}' changed size since it was selected ({} -> {} bytes)",
                item.name, item.size, total
            );
        }
        debug!("Streaming '{}' ({} bytes)", item.name, total);

        let file_name = item.name.clone();
        let events = events.clone();
        let mut loaded = 0u64;
        let stream = ReaderStream::new(file).inspect_ok(move |chunk| {
            loaded += chunk.len() as u64;
            let _ = events.send(UploadEvent::Progress(ProgressEvent {
                file_name: file_name.clone(),
                loaded,
                total,
            }));
        });

        Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(item.name.clone())
            .mime_str(PDF_MIME)
            .map_err(UploadError::Request)
    }
}
