//! Error types shared by every catalog-client component

/// Result type for catalog-client operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Error types for catalog-client operations
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No entity at {0}")]
    InvalidPath(String),

    #[error("Field {field} is not editable on {path}")]
    UnsupportedField { path: String, field: String },

    #[error("Episode S{}E{} has no video attached", .season + 1, .episode + 1)]
    MissingVideo { season: usize, episode: usize },

    #[error("Metadata submission failed with status {status}: {body}")]
    MetadataSubmissionFailed { status: u16, body: String },

    #[error("Video upload failed{} with status {status}", upload_location(.season, .episode))]
    UploadFailed {
        season: Option<usize>,
        episode: Option<usize>,
        status: u16,
    },

    #[error("Server returned no upload target for S{}E{}", .season + 1, .episode + 1)]
    MissingUploadTarget { season: usize, episode: usize },

    #[error("{context} failed with status {status}: {body}")]
    RequestFailed {
        context: String,
        status: u16,
        body: String,
    },

    #[error("A submission is already in progress")]
    SubmissionInFlight,
}

fn upload_location(season: &Option<usize>, episode: &Option<usize>) -> String {
    match (season, episode) {
        (Some(s), Some(e)) => format!(" for S{}E{}", s + 1, e + 1),
        (Some(s), None) => format!(" for season {}", s + 1),
        _ => String::new(),
    }
}

impl CatalogError {
    /// Text for the single blocking notification shown to the end user.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::MetadataSubmissionFailed { .. } => {
                "Failed to submit metadata. See the log for more information.".to_string()
            }
            CatalogError::UploadFailed { .. } => format!(
                "{}. The metadata was saved but the video was not uploaded.",
                self
            ),
            CatalogError::Validation(_)
            | CatalogError::MissingVideo { .. }
            | CatalogError::SubmissionInFlight => self.to_string(),
            _ => format!("Request failed: {}", self),
        }
    }

    /// Whether the failure happened after phase 1 committed a record server-side.
    pub fn leaves_orphan(&self) -> bool {
        matches!(self, CatalogError::UploadFailed { .. })
    }
}
