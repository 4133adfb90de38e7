use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    auth::{claims::Identity, jwt::JwtKeys, repo_types::Role},
    error::AppError,
};

pub const NO_TOKEN: &str = "No token provided";
pub const NO_PERMISSION: &str = "You do not have permission to do this";

/// Authenticated caller. Rejects with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

/// Authenticated caller holding the `admin` role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Role gate; must run after authentication.
pub fn authorize_roles(identity: Option<&Identity>, allowed: &[Role]) -> Result<(), AppError> {
    match identity {
        Some(who) if allowed.contains(&who.role) => Ok(()),
        _ => Err(AppError::Forbidden(NO_PERMISSION.into())),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| AppError::Unauthorized(NO_TOKEN.into()))?;
        let claims = JwtKeys::from_ref(state).verify(token)?;
        Ok(AuthUser(claims.into()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        authorize_roles(Some(&identity), &[Role::Admin])?;
        Ok(AdminUser(identity))
    }
}
