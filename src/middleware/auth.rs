use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::{HeaderMap, header, request::Parts},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    events::Viewer,
    models::{Role, UserStatus},
    services::auth_service,
    state::AppState,
};

/// The approved user behind a valid, unexpired session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub name: String,
    pub role: Role,
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

/// Raw bearer token, accepted regardless of the account status. Used by logout.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Like [`AuthUser`] but never rejects: a missing, malformed, expired or
/// unapproved session yields `None`.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

/// Identity of a WebSocket client. Browsers cannot set headers on the
/// upgrade request, so the token may also arrive as `?token=`.
#[derive(Debug, Clone, Copy)]
pub struct SocketViewer(pub Viewer);

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
    };
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("Empty bearer token".into()));
    }
    Ok(Some(token.to_string()))
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let (session, user) = auth_service::resolve_session(state, token).await?;
    if user.status != UserStatus::Approved {
        return Err(AppError::Forbidden);
    }
    Ok(AuthUser {
        user_id: user.id,
        session_id: session.id,
        name: user.name,
        role: user.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;
        authenticate(state, &token).await
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(&parts.headers) {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(MaybeAuthUser(None)),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unusable Authorization header");
                return Ok(MaybeAuthUser(None));
            }
        };
        match authenticate(state, &token).await {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(err) => {
                tracing::debug!(error = %err, "continuing without a session");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}

impl FromRequestParts<AppState> for SocketViewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let from_query = Query::<TokenQuery>::try_from_uri(&parts.uri)
            .map(|Query(q)| q.token)
            .unwrap_or_default()
            .filter(|t| !t.trim().is_empty());
        let Some(token) = bearer_token(&parts.headers)?.or(from_query) else {
            return Ok(SocketViewer(Viewer::Anonymous));
        };
        let user = authenticate(state, token.trim()).await?;
        Ok(SocketViewer(viewer_for(&user)))
    }
}

pub fn viewer_for(user: &AuthUser) -> Viewer {
    match user.role {
        Role::Admin => Viewer::Admin(user.user_id),
        Role::Customer => Viewer::Customer(user.user_id),
    }
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)?
            .map(SessionToken)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(
            bearer_token(&headers("Bearer abc123")).unwrap().as_deref(),
            Some("abc123")
        );
        assert!(bearer_token(&HeaderMap::new()).unwrap().is_none());
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(matches!(
            bearer_token(&headers("Basic Zm9vOmJhcg==")),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            bearer_token(&headers("Bearer   ")),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn admin_gate() {
        let mut user = AuthUser {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            name: "Ama".into(),
            role: Role::Customer,
        };
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden)));
        user.role = Role::Admin;
        assert!(ensure_admin(&user).is_ok());
    }
}
