// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! Handlers that need an identity take a [`SessionUser`]. Resolution
//! happens before the handler body runs, so handlers never see raw
//! credentials.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};
use zordon_hub_api::{AuthenticatedActor, AuthenticationService};

use crate::{AppState, ErrorBody};

/// The bearer token from the `Authorization` header, not yet validated.
///
/// Used where the token itself is the input, such as refresh.
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!("Authorization header does not carry a bearer token");
                SessionError::InvalidAuthorizationHeader
            })?;

        Ok(Self(String::from(token)))
    }
}

/// Extractor for the authenticated user behind a request.
///
/// # Errors
///
/// Rejects with 401 if the header is missing or malformed, or the session
/// is unknown or expired.
pub struct SessionUser(pub AuthenticatedActor, pub String);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let mut persistence = state.persistence.lock().await;
        let (actor, _user) = AuthenticationService::validate_session(&mut persistence, &token)
            .map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;
        drop(persistence);

        debug!(user_id = actor.id, role = %actor.role, "Session validated");
        Ok(Self(actor, token))
    }
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => reason,
        };

        let body: Json<ErrorBody> = Json(ErrorBody {
            success: false,
            kind: "unauthenticated",
            message,
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
