use thiserror::Error;

/// Failure talking to the treehole API. `resource` is the path below the
/// API root, e.g. `divisions/3/holes`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token missing or expired")]
    Unauthorized,

    #[error("Access denied to {resource}: {body}")]
    AccessDenied { resource: String, body: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error on {resource}: {body}")]
    ServerError { resource: String, body: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {resource}: {body}")]
    InvalidResponse { resource: String, status: u16, body: String },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body on a char boundary to keep log lines short
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, resource: &str, body: &str) -> Self {
        let resource = resource.to_string();
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied { resource, body: Self::truncate_body(body) },
            404 => ApiError::NotFound { resource },
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError { resource, body: Self::truncate_body(body) },
            code => ApiError::InvalidResponse {
                resource,
                status: code,
                body: Self::truncate_body(body),
            },
        }
    }

    /// The division a hole listing failed for, if the resource names one.
    pub fn division_id(&self) -> Option<i64> {
        let resource = match self {
            ApiError::AccessDenied { resource, .. }
            | ApiError::NotFound { resource }
            | ApiError::ServerError { resource, .. }
            | ApiError::InvalidResponse { resource, .. } => resource,
            _ => return None,
        };
        resource.strip_prefix("divisions/")?.split('/').next()?.parse().ok()
    }
}
