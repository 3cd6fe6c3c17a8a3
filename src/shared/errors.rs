use crate::domain::request::RequestStatus;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },
    #[error("a pending request `{request_id}` already exists for this action")]
    AlreadyExists { request_id: String },
    #[error("request `{request_id}` is `{status}`; only pending requests can transition")]
    InvalidState {
        request_id: String,
        status: RequestStatus,
    },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::InvalidState { .. } => "invalid_state",
            Self::Validation(_) => "validation_error",
            Self::Internal(_) => "internal",
        }
    }
}
