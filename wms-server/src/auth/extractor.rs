//! Actor Extractor
//!
//! Resolves the optional acting user from the bearer token.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{ActorUser, JwtError, JwtService};
use crate::core::ServerState;
use shared::error::AppError;

/// Acting user of a request
///
/// No `Authorization` header yields an anonymous actor (`Actor(None)`); audit
/// entries then fall back to the order's `created_by`. A header that is
/// present but invalid rejects the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actor(pub Option<ActorUser>);

impl Actor {
    /// Acting user id, if the request carried a token
    pub fn id(&self) -> Option<i64> {
        self.0.map(|u| u.id)
    }
}

impl FromRequestParts<ServerState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(http::header::AUTHORIZATION) else {
            return Ok(Actor(None));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(JwtService::extract_from_header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

        let claims = state.jwt_service.validate_token(token).map_err(|e| {
            tracing::warn!(target: "security", error = %e, uri = %parts.uri, "Token rejected");
            match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            }
        })?;

        let user = ActorUser::try_from(claims)
            .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))?;
        Ok(Actor(Some(user)))
    }
}
