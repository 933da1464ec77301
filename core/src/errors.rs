use thiserror::Error;

/// Errors produced while talking to the session service or preparing a request for it
#[derive(Error, Debug)]
pub enum SurveyorError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Request Error: {0}")]
    RequestError(String),

    #[error("HTTP Error: {status_code} - {message}")]
    HttpError { status_code: u16, message: String },

    #[error("Parsing Error: {0}")]
    ParsingError(String),

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("A session prompt is required")]
    EmptyPrompt,

    #[error("Consent is required before a session can be created")]
    ConsentRequired,

    #[error("Storage Error: {0}")]
    StorageError(String),

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl SurveyorError {
    /// True when the service reported that the session does not exist (or is not usable)
    pub fn is_not_found(&self) -> bool {
        match self {
            SurveyorError::NotFound(_) => true,
            SurveyorError::HttpError { status_code, .. } => *status_code == 404,
            _ => false,
        }
    }
}

/// Result type for session service operations
pub type SurveyorResult<T> = Result<T, SurveyorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_covers_http_404() {
        let err = SurveyorError::HttpError {
            status_code: 404,
            message: "Session not found or paused".to_string(),
        };
        assert!(err.is_not_found());
        assert!(SurveyorError::NotFound("7".to_string()).is_not_found());

        let err = SurveyorError::HttpError {
            status_code: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_not_found());
        assert!(!SurveyorError::EmptyPrompt.is_not_found());
    }
}
