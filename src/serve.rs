use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use miette::{miette, IntoDiagnostic};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::comment::{Comment, PublicComment, Submission};
use crate::config::ServerConfig;
use crate::error::{CommentError, MSG_UNSUPPORTED};
use crate::feed;
use crate::notify::{moderation_mail, Notifier};
use crate::sanitize::normalize_target;
use crate::store::CommentStore;

const MSG_SUBMITTED: &str = "Successfully added comment. It will need to be accepted by an administrator before it is published.";
const MSG_ACCEPTED: &str = "Successfully accepted comment.";

#[derive(Clone)]
pub struct AppState {
    pub store: CommentStore,
    pub notifier: Notifier,
    pub config: ServerConfig,
}

/// Accepts a new comment, stores it pending and mails the moderation link.
/// The body is parsed by hand so malformed JSON maps to the fixed error
/// message instead of an extractor rejection.
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, CommentError> {
    let submission = Submission::parse(&body)?;
    let comment = Comment::from_submission(submission);

    state.store.create(&comment).await.map_err(|err| {
        tracing::error!(%err, "failed to store comment");
        CommentError::Storage
    })?;

    let service_url = service_url(&state.config, &headers);
    let (subject, mail) = moderation_mail(&comment, &service_url, &state.config.instance_name);
    state.notifier.send(&subject, &mail).await.map_err(|err| {
        // The comment is already stored, but stays pending and invisible.
        tracing::error!(%err, id = %comment.id, "failed to dispatch moderation mail");
        CommentError::Notification
    })?;

    tracing::info!(id = %comment.id, target = %comment.target, "comment submitted");
    Ok(Json(json!({ "message": MSG_SUBMITTED })))
}

/// The moderation link target. All failure modes collapse into one
/// ambiguous error.
pub async fn accept(
    State(state): State<AppState>,
    Path((id, token)): Path<(String, String)>,
) -> Result<Json<Value>, CommentError> {
    match state.store.accept_if_matches(&id, &token).await {
        Ok(true) => {
            tracing::info!(%id, "comment accepted");
            Ok(Json(json!({ "message": MSG_ACCEPTED })))
        }
        Ok(false) => Err(CommentError::Moderation),
        Err(err) => {
            tracing::error!(%err, %id, "conditional accept failed");
            Err(CommentError::Moderation)
        }
    }
}

/// The accepted comments of a target as a JSON array of public fields.
pub async fn list(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> Result<Json<Vec<PublicComment>>, CommentError> {
    let target = normalize_target(&target);
    let comments = state.store.list_accepted(&target).await.map_err(|err| {
        tracing::error!(%err, %target, "failed to list comments");
        CommentError::Retrieval
    })?;
    Ok(Json(comments))
}

/// The accepted comments of a target as an Atom 1.0 document.
pub async fn atom_feed(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> Result<impl IntoResponse, CommentError> {
    let target = normalize_target(&target);
    let comments = state.store.list_accepted(&target).await.map_err(|err| {
        tracing::error!(%err, %target, "failed to fetch comments for feed");
        CommentError::Retrieval
    })?;

    let xml = feed::render(&state.config.instance_name, &target, &comments);
    Ok(([(header::CONTENT_TYPE, "application/atom+xml")], xml))
}

async fn unsupported() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": MSG_UNSUPPORTED })),
    )
}

/// Builds the public router. An unparseable CORS origin is a config error
/// and refuses to start rather than silently loosening the policy.
pub fn router(state: AppState) -> miette::Result<Router> {
    let origin = state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map(AllowOrigin::exact)
        .map_err(|_| miette!("invalid CORS origin in config: {:?}", state.config.cors_origin))?;

    Ok(Router::new()
        .route("/comments", post(submit))
        .route("/comments/{*target}", get(list))
        .route("/feed/{*target}", get(atom_feed))
        .route("/token/{id}/{token}", get(accept))
        .fallback(unsupported)
        .layer(CorsLayer::new().allow_origin(origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

pub async fn serve(config: ServerConfig) -> miette::Result<()> {
    let store = CommentStore::connect(&config.database)
        .await
        .into_diagnostic()?;
    let notifier = Notifier::from_config(config.notify.clone());
    if notifier.is_disabled() {
        tracing::warn!("no [server.notify] config, moderation mails will not be sent");
    }

    let state = AppState {
        store,
        notifier,
        config: config.clone(),
    };

    let app = router(state)?;
    let listener = TcpListener::bind(&config.addr).await.into_diagnostic()?;
    tracing::info!(addr = %config.addr, "serving comment API");
    axum::serve(listener, app.into_make_service())
        .await
        .into_diagnostic()?;
    Ok(())
}

/// Base URL for moderation links: configured value if set, otherwise
/// derived from the forwarded scheme and host of the inbound request.
fn service_url(config: &ServerConfig, headers: &HeaderMap) -> String {
    if let Some(url) = &config.service_url {
        return url.trim_end_matches('/').to_string();
    }

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    format!("{proto}://{host}")
}
