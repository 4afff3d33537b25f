use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};
use uuid::Uuid;

use mindful_db::Database;
use mindful_db::models::NewUser;
use mindful_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserSummary,
};

use crate::convert;
use crate::error::{ApiError, require_fields};
use crate::mailer::{Mailer, Recipient};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub mailer: Mailer,
}

impl AppStateInner {
    /// Run a store call on the blocking pool.
    pub async fn db_call<F, T>(self: &Arc<Self>, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || f(&state.db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal(e.into())
            })?
            .map_err(ApiError::from)
    }
}

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const USER_EXISTS: &str = "User already exists";

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_fields(&[
        ("email", &req.email),
        ("password", &req.password),
        ("firstName", &req.first_name),
        ("lastName", &req.last_name),
        ("university", &req.university),
    ])?;

    let email = req.email.trim().to_string();

    let lookup = email.clone();
    if state
        .db_call(move |db| db.get_user_by_email(&lookup))
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(USER_EXISTS.into()));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    let created = {
        let email = email.clone();
        let first_name = req.first_name.clone();
        let last_name = req.last_name.clone();
        let university = req.university.clone();
        state
            .db_call(move |db| {
                db.create_user(
                    &user_id.to_string(),
                    &NewUser {
                        email: &email,
                        password_hash: &password_hash,
                        first_name: &first_name,
                        last_name: &last_name,
                        university: &university,
                    },
                )
            })
            .await?
    };

    // A concurrent registration can claim the email between lookup and insert.
    if !created {
        return Err(ApiError::Conflict(USER_EXISTS.into()));
    }

    info!("Registered user {}", user_id);

    // Welcome mail never holds up or fails the registration.
    state.mailer.send_welcome_in_background(Recipient {
        email: email.clone(),
        first_name: req.first_name,
        last_name: req.last_name,
        university: req.university,
    });

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            user: UserSummary { id: user_id, email },
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_fields(&[("email", &req.email), ("password", &req.password)])?;

    let email = req.email.trim().to_string();
    let user = state
        .db_call(move |db| db.get_user_by_email(&email))
        .await?
        .ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash unreadable: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS))?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt user id '{}': {}", user.id, e)))?;

    let token = create_token(&state.jwt_secret, state.token_ttl, user_id, &user.email)?;

    Ok(Json(LoginResponse { token }))
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let user = state
        .db_call(move |db| db.get_user_by_id(&uid))
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(convert::profile(user)))
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))
}

pub fn create_token(
    secret: &str,
    ttl: chrono::Duration,
    user_id: Uuid,
    email: &str,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
