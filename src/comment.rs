use chrono::{SecondsFormat, Utc};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{CommentError, MSG_MALFORMED, MSG_MISSING_FIELDS};
use crate::sanitize::{normalize_target, strip_tags};

pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// The accept token is the sole moderation credential, so it comes from
/// the thread-local CSPRNG.
const ACCEPT_TOKEN_LEN: usize = 32;

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Comment {
    pub id: String,
    pub target: String,
    pub author: String,
    pub message: String,
    pub additional: Json<Map<String, Value>>,
    pub accept_token: String,
    pub is_accepted: bool,
    /// Creation time as an RFC 3339 UTC string. Immutable, and sorts
    /// chronologically as text.
    pub added_at: String,
}

impl Comment {
    pub fn from_submission(submission: Submission) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            target: submission.target,
            author: strip_tags(&submission.author),
            message: strip_tags(&submission.message),
            additional: Json(submission.additional),
            accept_token: Alphanumeric.sample_string(&mut rand::rng(), ACCEPT_TOKEN_LEN),
            is_accepted: false,
            added_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Projection of a comment onto its publicly visible fields. The accept
/// token is excluded at the type level; no public read path can leak it.
#[derive(Serialize, Clone, Debug, FromRow)]
pub struct PublicComment {
    pub id: String,
    pub author: String,
    pub message: String,
    pub additional: Json<Map<String, Value>>,
    pub added_at: String,
}

/// A validated submission payload.
#[derive(Debug)]
pub struct Submission {
    pub target: String,
    pub author: String,
    pub message: String,
    pub additional: Map<String, Value>,
}

impl Submission {
    /// Parses a raw request body. `message` and `target` are required and
    /// must be non-empty (the target after normalization); `author` falls
    /// back to [`ANONYMOUS_AUTHOR`]; `additional` is carried through only
    /// when it is object-shaped.
    pub fn parse(raw: &[u8]) -> Result<Self, CommentError> {
        let value: Value =
            serde_json::from_slice(raw).map_err(|_| CommentError::BadRequest(MSG_MALFORMED))?;
        let body = value
            .as_object()
            .ok_or(CommentError::BadRequest(MSG_MALFORMED))?;

        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let target = normalize_target(
            body.get("target")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        );
        if message.is_empty() || target.is_empty() {
            return Err(CommentError::BadRequest(MSG_MISSING_FIELDS));
        }

        let author = body
            .get("author")
            .and_then(Value::as_str)
            .filter(|author| !author.is_empty())
            .unwrap_or(ANONYMOUS_AUTHOR);
        let additional = body
            .get("additional")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Ok(Self {
            target,
            author: author.to_string(),
            message: message.to_string(),
            additional,
        })
    }
}
