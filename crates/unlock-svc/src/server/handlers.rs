//! Axum request handlers for all service endpoints.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{ErrorResponse, HealthResponse, UnlockRequest};
use common::{ContactPayload, ServiceError};
use tracing::{error, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::state::AppState;
use crate::session::{Attempt, SessionError};

/// `POST /sessions` — open a new locked viewer session.
pub async fn create_session(State(state): State<AppState>) -> Response {
    match state.sessions.create().await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => reject(session_error(e)),
    }
}

/// `GET /sessions/{id}` — current state of a session.
///
/// An unlocked session returns its cached contact, so a returning viewer sees
/// the contact again without re-entering the password.
pub async fn get_session(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return reject_extractor(rejection.status(), "invalid session id"),
    };
    match state.sessions.view(id).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => reject(session_error(e)),
    }
}

/// `POST /sessions/{id}/unlock` — try a password against an envelope.
///
/// Every decrypt failure is answered with the same `401 incorrect_password`
/// body, whatever the underlying cause. One attempt per session runs at a
/// time, and at most `max_concurrent_decrypts` across the service; anything
/// beyond that is refused, never queued.
pub async fn unlock(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    req: Result<Json<UnlockRequest>, JsonRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return reject_extractor(rejection.status(), "invalid session id"),
    };
    let Json(UnlockRequest { envelope, password }) = match req {
        Ok(req) => req,
        Err(rejection) => {
            return reject_extractor(
                rejection.status(),
                "request body must be JSON with `envelope` and `password`",
            )
        }
    };
    let password = Zeroizing::new(password);

    // Unlocked is terminal: answer from the cache without decrypting again.
    let attempt = match state.sessions.begin_attempt(id).await {
        Ok(Attempt::Unlocked(view)) => return (StatusCode::OK, Json(view)).into_response(),
        Ok(Attempt::Started(guard)) => guard,
        Err(e) => return reject(session_error(e)),
    };

    if password.is_empty() {
        let err = ErrorResponse::new("missing_password", "Please enter password");
        return (StatusCode::BAD_REQUEST, Json(err)).into_response();
    }
    if envelope.len() > state.max_envelope_len {
        return reject(ServiceError::BadRequest(format!(
            "envelope exceeds {} bytes",
            state.max_envelope_len
        )));
    }

    let Ok(permit) = Arc::clone(&state.decrypt_permits).try_acquire_owned() else {
        warn!(session_id = %id, "decrypt capacity exhausted");
        return reject(ServiceError::Unavailable(
            "too many unlock attempts in progress".into(),
        ));
    };

    // PBKDF2 is CPU-bound; keep it off the async workers. The permit lives
    // until the derivation finishes, even if this request is dropped.
    let outcome = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        common::decrypt::<ContactPayload>(&envelope, &password)
    })
    .await;
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(session_id = %id, error = %e, "decrypt worker failed");
            return reject(ServiceError::Internal(e.to_string()));
        }
    };

    let recorded = state.sessions.record(id, outcome).await;
    drop(attempt);
    match recorded {
        Ok(view) if view.contact.is_some() => {
            info!(session_id = %id, "session unlocked");
            (StatusCode::OK, Json(view)).into_response()
        }
        Ok(_) => {
            info!(session_id = %id, "unlock attempt rejected");
            reject(ServiceError::IncorrectPassword)
        }
        Err(e) => reject(session_error(e)),
    }
}

/// `GET /health` — liveness check.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        sessions_active: state.sessions.len().await,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

fn session_error(err: SessionError) -> ServiceError {
    match err {
        SessionError::NotFound => ServiceError::NotFound("session".into()),
        SessionError::Full => ServiceError::Unavailable("too many open sessions".into()),
        SessionError::Busy => {
            ServiceError::Conflict("an unlock attempt for this session is in progress".into())
        }
    }
}

/// Render a [`ServiceError`] as its status code and [`ErrorResponse`] body.
fn reject(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::new(err.code(), err.public_message());
    (status, Json(body)).into_response()
}

/// Render an extractor rejection as an [`ErrorResponse`], keeping its status.
///
/// The rejection text is not echoed; it can quote parts of the request body.
fn reject_extractor(status: StatusCode, message: &str) -> Response {
    let code = match status {
        StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "unsupported_media_type",
        _ => "bad_request",
    };
    (status, Json(ErrorResponse::new(code, message))).into_response()
}
