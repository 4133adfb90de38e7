use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        claims::Identity,
        dto::{AuthResult, LoginRequest, PublicUser, RegisterRequest},
        password::{hash_password, verify_password},
        repo_types::{NewUser, Role, User},
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub const CREDENTIALS_REQUIRED: &str = "Email and Password are required";
pub const EMAIL_TAKEN: &str = "Email already existed";
pub const BAD_CREDENTIALS: &str = "Invalid email or password";
pub const USER_GONE: &str = "User no longer exists";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Absent, `null` and empty credentials are all treated as missing.
fn require_credentials<'a>(
    email: &'a Option<String>,
    password: &'a Option<String>,
) -> AppResult<(&'a str, &'a str)> {
    match (email.as_deref(), password.as_deref()) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(AppError::BadRequest(CREDENTIALS_REQUIRED.into())),
    }
}

fn issue(state: &AppState, user: &User) -> AppResult<AuthResult> {
    let token = state.keys.sign(&Identity::from(user))?;
    Ok(AuthResult {
        token,
        user: PublicUser::from(user),
    })
}

pub async fn register(state: &AppState, req: RegisterRequest) -> AppResult<AuthResult> {
    let (email, password) = require_credentials(&req.email, &req.password)?;
    if !is_valid_email(email) {
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    let role = match req.role.as_deref() {
        None => Role::default(),
        Some(raw) => Role::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("{raw} is not in the option, for role")))?,
    };

    if state.users.find_by_email(email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict(EMAIL_TAKEN.into()));
    }

    let hash = hash_password(password)?;
    let new_user = NewUser {
        email,
        password_hash: &hash,
        role,
    };
    // A concurrent registration can still win the race at the unique index.
    let Some(user) = state.users.create(new_user).await? else {
        warn!(email = %email, "email taken during insert");
        return Err(AppError::Conflict(EMAIL_TAKEN.into()));
    };

    info!(user_id = %user.id, role = %user.role, "user registered");
    issue(state, &user)
}

pub async fn login(state: &AppState, req: LoginRequest) -> AppResult<AuthResult> {
    let (email, password) = require_credentials(&req.email, &req.password)?;

    let Some(user) = state.users.find_by_email(email).await? else {
        warn!("login unknown email");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    };
    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    info!(user_id = %user.id, "user logged in");
    issue(state, &user)
}

pub async fn current_user(state: &AppState, id: Uuid) -> AppResult<User> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_GONE.into()))
}
