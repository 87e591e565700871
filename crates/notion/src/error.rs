use thiserror::Error;

/// Failure of a database query.
#[derive(Debug, Error)]
pub enum NotionError {
    /// Notion answered with a non-success status
    #[error("Notion query failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Notion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid Notion response: {0}")]
    Decode(#[from] serde_json::Error),
}
