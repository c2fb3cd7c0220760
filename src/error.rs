use thiserror::Error;

pub type Result<T> = std::result::Result<T, TlyError>;

#[derive(Error, Debug)]
pub enum TlyError {
    #[error("API token is required")]
    MissingToken,

    #[error("API token is not a valid header value")]
    InvalidToken,

    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TlyError {
    /// HTTP status of a rejected request, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TlyError::Api { status, .. } => Some(*status),
            TlyError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The service's error document, when the failure body is JSON.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        match self {
            TlyError::Api { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        TlyError::InvalidRequest(format!("{} is required", field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_status_and_json_body() {
        let err = TlyError::Api {
            status: 422,
            body: r#"{"message":"The long url field is required."}"#.to_string(),
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(
            err.body_json().unwrap()["message"],
            "The long url field is required."
        );
    }

    #[test]
    fn non_json_body_stays_raw() {
        let err = TlyError::Api {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert!(err.body_json().is_none());
        assert_eq!(
            err.to_string(),
            "API request failed with status 502: Bad Gateway"
        );
    }

    #[test]
    fn missing_field_message() {
        let err = TlyError::missing("short_url");
        assert_eq!(err.to_string(), "Invalid request: short_url is required");
        assert_eq!(err.status(), None);
    }
}
