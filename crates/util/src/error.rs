/// Failure taxonomy shared by every handler and repository.
///
/// Each variant maps to exactly one HTTP status. `Internal` carries detail
/// for the log only; the client always sees a generic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Unauthenticated,
    /// Login or password check failed. Never says which half was wrong.
    Rejected,
    Forbidden(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl Error {
    pub fn forbidden(s: impl Into<String>) -> Self {
        Self::Forbidden(s.into())
    }
    pub fn invalid(s: impl Into<String>) -> Self {
        Self::Validation(s.into())
    }
    pub fn missing(s: impl Into<String>) -> Self {
        Self::NotFound(s.into())
    }
    pub fn conflict(s: impl Into<String>) -> Self {
        Self::Conflict(s.into())
    }
    pub fn internal(s: impl Into<String>) -> Self {
        Self::Internal(s.into())
    }
    /// Message safe to show the client.
    pub fn public(&self) -> String {
        match self {
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "authentication required"),
            Self::Rejected => write!(f, "invalid credentials"),
            Self::Forbidden(s) => write!(f, "{}", s),
            Self::Validation(s) => write!(f, "{}", s),
            Self::NotFound(s) => write!(f, "{}", s),
            Self::Conflict(s) => write!(f, "{}", s),
            Self::Internal(s) => write!(f, "internal error: {}", s),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(feature = "server")]
mod http {
    use super::*;
    use actix_web::HttpResponse;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    impl ResponseError for Error {
        fn status_code(&self) -> StatusCode {
            match self {
                Self::Unauthenticated | Self::Rejected => StatusCode::UNAUTHORIZED,
                Self::Forbidden(_) => StatusCode::FORBIDDEN,
                Self::Validation(_) => StatusCode::BAD_REQUEST,
                Self::NotFound(_) => StatusCode::NOT_FOUND,
                Self::Conflict(_) => StatusCode::CONFLICT,
                Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
        fn error_response(&self) -> HttpResponse {
            if let Self::Internal(detail) = self {
                log::error!("{}", detail);
            }
            HttpResponse::build(self.status_code())
                .json(serde_json::json!({ "error": self.public() }))
        }
    }
}
