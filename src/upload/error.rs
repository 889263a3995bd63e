use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no files to upload")]
    EmptyBatch,
    #[error("failed to read '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build upload request: {0}")]
    Request(#[source] reqwest::Error),
    #[error("failed to send upload request: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upload rejected with status {status}: {body}")]
    Server { status: StatusCode, body: String },
    #[error("upload cancelled")]
    Cancelled,
}

impl UploadError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Server { status, .. } if status.is_client_error())
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { status, .. } if status.is_server_error())
    }

    /// Short cause line shown under the generic failure message.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyBatch => "No files were selected.".to_string(),
            Self::Read { name, .. } => format!("Could not read {}.", name),
            Self::Request(_) => "The upload request could not be prepared.".to_string(),
            Self::Network(e) if e.is_timeout() => "The upload server took too long to respond.".to_string(),
            Self::Network(_) => "Could not reach the upload server.".to_string(),
            Self::Server { status, .. } if status.is_client_error() => {
                format!("The server rejected the files ({}).", status)
            }
            Self::Server { status, .. } => {
                format!("The server failed to process the upload ({}).", status)
            }
            Self::Cancelled => "The upload was cancelled.".to_string(),
        }
    }
}
