use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use password_hash::rand_core::{OsRng, RngCore};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    entity::{
        enums::{Role, UserStatus},
        sessions::{ActiveModel as SessionActive, Column as SessionCol, Entity as Sessions, Model as SessionModel},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult, is_unique_violation},
    events::{ChangeAction, Collection},
    response::{ApiResponse, Meta},
    services::{notification_service, user_service::user_from_entity},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 256 random bits, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("a valid email is required".into()));
    }
    Ok(email.to_string())
}

/// Maps a unique-index rejection on `users.email` to `Conflict`.
pub fn email_conflict(err: DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict("Email is already registered".into())
    } else {
        AppError::OrmError(err)
    }
}

pub async fn issue_session<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    ttl_days: i64,
) -> AppResult<SessionModel> {
    let now = Utc::now();
    let session = SessionActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        token: Set(generate_token()),
        expires_at: Set((now + Duration::days(ttl_days)).into()),
        created_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(session)
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    let email = normalize_email(&payload.email)?;
    validate_password(&payload.password)?;
    let password_hash = hash_password(&payload.password)?;

    let txn = state.orm.begin().await?;

    let taken = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&txn)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let is_first_user = Users::find().count(&txn).await? == 0;
    let (role, status) = if is_first_user {
        (Role::Admin, UserStatus::Approved)
    } else {
        (Role::Customer, UserStatus::Pending)
    };

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.clone()),
        email: Set(email.clone()),
        password_hash: Set(password_hash),
        role: Set(role),
        status: Set(status),
        profile_image: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await
    .map_err(email_conflict)?;

    let recipients = if is_first_user {
        Vec::new()
    } else {
        notification_service::notify_admins(
            &txn,
            &format!("New user registration: {name} ({email})"),
        )
        .await?
    };

    let token = if status == UserStatus::Approved {
        Some(issue_session(&txn, user.id, state.config.session_ttl_days).await?.token)
    } else {
        None
    };

    txn.commit().await?;

    state
        .events
        .notify(Collection::Users, ChangeAction::Created, vec![user.id]);
    notification_service::announce(state, &recipients);
    audit::record(
        &state.orm,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "role": role.as_str() }),
    )
    .await;
    tracing::info!(user_id = %user.id, role = role.as_str(), "user registered");

    let user = user_from_entity(user, &state.storage);
    Ok(ApiResponse::success(
        "User created",
        RegisterResponse { user, token },
        Some(Meta::empty()),
    ))
}

/// Verifies credentials. Unknown email and wrong password both yield `None`.
pub async fn login_user(state: &AppState, payload: LoginRequest) -> AppResult<Option<LoginResponse>> {
    let email = payload.email.trim();
    let user = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?;

    let Some(user) = user else {
        return Ok(None);
    };
    if !verify_password(&payload.password, &user.password_hash)? {
        return Ok(None);
    }

    let session = issue_session(&state.orm, user.id, state.config.session_ttl_days).await?;

    audit::record(
        &state.orm,
        Some(user.id),
        "user_login",
        "sessions",
        serde_json::json!({ "session_id": session.id }),
    )
    .await;

    Ok(Some(LoginResponse {
        user: user_from_entity(user, &state.storage),
        token: session.token,
        expires_at: session.expires_at.with_timezone(&Utc),
    }))
}

pub async fn logout(state: &AppState, token: &str) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Sessions::delete_many()
        .filter(SessionCol::Token.eq(token))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::Unauthorized("Invalid session token".into()));
    }
    Ok(ApiResponse::success(
        "Logged out",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Looks up the session and its user. Expired sessions are deleted and rejected.
pub async fn resolve_session(state: &AppState, token: &str) -> AppResult<(SessionModel, UserModel)> {
    let session = Sessions::find()
        .filter(SessionCol::Token.eq(token))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid session token".into()))?;

    if session.expires_at.with_timezone(&Utc) <= Utc::now() {
        session.delete(&state.orm).await?;
        return Err(AppError::Unauthorized("Session expired".into()));
    }

    let user = Users::find_by_id(session.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session user no longer exists".into()))?;

    Ok((session, user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_roundtrip_verifies_only_the_original() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert_ne!(hash, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &hash).unwrap());
        assert!(!verify_password("wrong-pass", &hash).unwrap());
    }

    #[test]
    fn tokens_are_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn input_validation() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert_eq!(normalize_email("  ama@example.com ").unwrap(), "ama@example.com");
        assert!(normalize_email("not-an-email").is_err());
    }
}
