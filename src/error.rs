use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::FormRejection;

/// Failure to read the form body of an action request.
///
/// These never reach the client as-is: the direct-update handler logs them and
/// answers with a generic failure.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Missing content type")]
    MissingContentType,

    #[error("Invalid form body: {0}")]
    Form(#[from] FormRejection),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartRejection),

    #[error("Failed to read multipart field: {0}")]
    MultipartField(#[from] MultipartError),
}
