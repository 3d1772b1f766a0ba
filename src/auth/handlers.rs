use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{ErrorResponse, LoginRequest, LoginResponse},
        services::{self, FailureReason, LoginOutcome},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/statistics/login", post(login))
}

#[derive(Debug)]
pub enum ApiError {
    InvalidCredentials,
    Server,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // unknown email and wrong password share one message
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password"),
            ApiError::Server => (StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
        };
        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "malformed login payload");
        ApiError::Server
    })?;

    let user = match services::login(state.store.as_ref(), &payload.email, &payload.password).await {
        LoginOutcome::Success(user) => user,
        LoginOutcome::Failure(reason) => {
            warn!(email = %payload.email.trim(), reason = reason.as_str(), "login rejected");
            return Err(match reason {
                FailureReason::UserNotFound | FailureReason::InvalidPassword => {
                    ApiError::InvalidCredentials
                }
                FailureReason::ServerError => ApiError::Server,
            });
        }
    };

    let token = state.tokens.issue(&user.email).map_err(|e| {
        error!(error = %e, "token issue failed");
        ApiError::Server
    })?;

    info!(email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        success: true,
        token,
        user,
    }))
}
