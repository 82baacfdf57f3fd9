use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Field-level problems with caller input. Returned, never raised, so the
/// UI can attach the message to the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{earlier} must not be later than {later}")]
    InvalidOrdering {
        earlier: &'static str,
        later: &'static str,
    },

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Why a lifecycle action could not be carried out.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl From<rusqlite::Error> for ActionError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                ActionError::Conflict(e.to_string())
            }
            _ => ActionError::Unknown(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for ActionError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<rusqlite::Error>() {
            Ok(db) => db.into(),
            Err(other) => ActionError::Unknown(format!("{other:#}")),
        }
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return ActionError::from_status(status.as_u16(), &e.to_string());
        }
        if e.is_timeout() || e.is_connect() || e.is_request() {
            ActionError::Network(e.to_string())
        } else {
            ActionError::Unknown(e.to_string())
        }
    }
}

impl ActionError {
    /// Classifies a non-success HTTP status from an upstream collaborator.
    pub fn from_status(status: u16, detail: &str) -> Self {
        let detail = format!("upstream returned {status}: {detail}");
        match status {
            401 | 403 => ActionError::Unauthorized(detail),
            404 => ActionError::NotFound(detail),
            409 => ActionError::Conflict(detail),
            502..=504 => ActionError::Network(detail),
            _ => ActionError::Unknown(detail),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Action(ActionError::Validation(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Action(action) => match action {
                ActionError::Network(_) => StatusCode::BAD_GATEWAY,
                ActionError::Unauthorized(_) => StatusCode::FORBIDDEN,
                ActionError::Conflict(_) => StatusCode::CONFLICT,
                ActionError::NotFound(_) => StatusCode::NOT_FOUND,
                ActionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ActionError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
