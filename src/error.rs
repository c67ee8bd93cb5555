use axum::http::StatusCode;
use thiserror::Error;

/// Failures of a single analysis request
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("Missing {provider} API key ({env_var} is not set)")]
    MissingConfiguration { provider: &'static str, env_var: &'static str },

    #[error("Metadata lookup failed: {0}")]
    MetadataFetch(String),

    #[error("Failed to fetch transcript: {0}")]
    TranscriptFetch(String),

    #[error("Failed to summarize transcript: {0}")]
    Summarization(String),

    #[error("Internal server error: {0}")]
    Unhandled(#[from] eyre::Report),
}

impl AnalyzeError {
    /// Stable code exposed in response payloads
    pub fn code(&self) -> &'static str {
        match self {
            AnalyzeError::InvalidRequest(_) => "INVALID_REQUEST",
            AnalyzeError::InvalidUrl(_) => "INVALID_URL",
            AnalyzeError::MissingConfiguration { .. } => "MISSING_CONFIGURATION",
            AnalyzeError::MetadataFetch(_) => "METADATA_FETCH_ERROR",
            AnalyzeError::TranscriptFetch(_) => "TRANSCRIPT_FETCH_ERROR",
            AnalyzeError::Summarization(_) => "SUMMARIZATION_ERROR",
            AnalyzeError::Unhandled(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// HTTP status when the error rejects the whole request
    pub fn status(&self) -> StatusCode {
        match self {
            AnalyzeError::InvalidRequest(_) | AnalyzeError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::MissingConfiguration { .. } | AnalyzeError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AnalyzeError::MetadataFetch(_) | AnalyzeError::TranscriptFetch(_) | AnalyzeError::Summarization(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    pub fn troubleshooting(&self) -> &'static str {
        match self {
            AnalyzeError::InvalidRequest(_) => "Send a JSON body of the form {\"videoUrl\": \"https://www.youtube.com/watch?v=VIDEO_ID\"}",
            AnalyzeError::InvalidUrl(_) => {
                "Use a full YouTube link such as https://www.youtube.com/watch?v=VIDEO_ID or https://youtu.be/VIDEO_ID"
            }
            AnalyzeError::MissingConfiguration { .. } => {
                "Set SUPADATA_API_KEY and OPENAI_API_KEY in the server environment and restart the service"
            }
            AnalyzeError::MetadataFetch(_) => "Video metadata is optional; defaults were used",
            AnalyzeError::TranscriptFetch(_) => {
                "The video may have no captions, be private, or the transcript service may be unavailable"
            }
            AnalyzeError::Summarization(_) => {
                "The AI service failed; the transcript is still available. Try again later"
            }
            AnalyzeError::Unhandled(_) => "Check the server logs for details",
        }
    }
}
