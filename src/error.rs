use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub const MSG_MALFORMED: &str = "Malformed request body.";
pub const MSG_MISSING_FIELDS: &str = "Missing required request data: message or target.";
pub const MSG_STORE_FAILED: &str = "Error while storing the comment.";
pub const MSG_MODERATION_FAILED: &str =
    "Accepting the comment failed. Is the token incorrect or has the comment been accepted already?";
pub const MSG_FETCH_FAILED: &str = "Fetching the comments failed.";
pub const MSG_UNSUPPORTED: &str = "Unsupported action.";

/// Request-scoped failure. Every variant maps to a fixed public message;
/// the underlying cause is logged server-side and never leaves the process.
/// `Moderation` deliberately covers wrong token, unknown id and
/// already-accepted alike, so a caller probing tokens learns nothing.
#[derive(Debug, PartialEq, Eq)]
pub enum CommentError {
    BadRequest(&'static str),
    Storage,
    Notification,
    Moderation,
    Retrieval,
}

impl IntoResponse for CommentError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CommentError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            // Notification failures share the storage message so callers
            // cannot distinguish the cause.
            CommentError::Storage | CommentError::Notification => {
                (StatusCode::INTERNAL_SERVER_ERROR, MSG_STORE_FAILED)
            }
            CommentError::Moderation => (StatusCode::INTERNAL_SERVER_ERROR, MSG_MODERATION_FAILED),
            CommentError::Retrieval => (StatusCode::INTERNAL_SERVER_ERROR, MSG_FETCH_FAILED),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
