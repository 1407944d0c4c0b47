//! Error taxonomy for notesmith.
//!
//! Only [`NotesError::Config`] is process-fatal. Every other variant is scoped
//! to the repository being processed and is reported by the orchestrator
//! before it moves on to the next repository.

use thiserror::Error;

/// Main error type for notesmith operations.
#[derive(Error, Debug)]
pub enum NotesError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // Release lookup errors
    #[error("Failed to fetch release for {repo}: {message}")]
    Fetch { repo: String, message: String },

    #[error("No release tagged '{tag}' found for {repo}")]
    NotFound { repo: String, tag: String },

    #[error("No releases published for {repo}")]
    EmptyCatalog { repo: String },

    // Generative service errors
    #[error("Enrichment failed: {0}")]
    Enrichment(String),

    // Version control / pull request errors
    #[error("Publish step '{step}' failed: {message}")]
    Publish { step: String, message: String },

    #[error("Forge operation failed: {0}")]
    Forge(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    // Network/API errors
    #[error("Network request failed: {0}")]
    Network(String),

    #[error("API authentication failed: {0}")]
    Authentication(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    #[error("Template rendering failed: {0}")]
    Template(#[from] tera::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Logger initialization error: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using NotesError
pub type Result<T> = std::result::Result<T, NotesError>;

impl NotesError {
    /// Create an invalid config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a fetch error for a repository
    pub fn fetch(repo: impl Into<String>, msg: impl ToString) -> Self {
        Self::Fetch {
            repo: repo.into(),
            message: msg.to_string(),
        }
    }

    /// Create an enrichment error
    pub fn enrichment(msg: impl Into<String>) -> Self {
        Self::Enrichment(msg.into())
    }

    /// Create a publish error tagged with the pipeline step that failed
    pub fn publish(step: impl Into<String>, msg: impl ToString) -> Self {
        Self::Publish {
            step: step.into(),
            message: msg.to_string(),
        }
    }

    /// Whether this error must halt the whole run rather than a single
    /// repository.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for NotesError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

impl From<reqwest::Error> for NotesError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::Network(err.to_string())
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                401 | 403 => Self::Authentication(err.to_string()),
                429 => Self::RateLimitExceeded,
                _ => Self::Network(err.to_string()),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<octocrab::Error> for NotesError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            octocrab::Error::GitHub { source, .. }
                if source.status_code.as_u16() == 401 =>
            {
                Self::Authentication(source.message.clone())
            }
            _ => Self::Forge(format!("GitHub API error: {}", err)),
        }
    }
}
