//! Account route handlers.
//!
//! `POST /users` is a single endpoint dispatching on `action`
//! (`signup`, `login`, `logout`); it is rate limited per client IP.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use bosco_core::UserId;

use crate::db::UserRepository;
use crate::error::{ApiJson, AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    RequireAdmin, RequireAuth, auth_rate_limiter, clear_current_user, set_current_user,
};
use crate::models::{CurrentUser, ProfileUpdate, User, session_keys};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Build the account router.
pub fn router() -> Router<AppState> {
    let account = Router::new()
        .route("/users", post(account_action))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/users/me", get(me).patch(update_me))
        .route("/customers", get(customers))
        .merge(account)
}

/// Body of `POST /users`.
#[derive(Debug, Deserialize)]
pub struct AccountAction {
    pub action: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub uid: UserId,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub uid: UserId,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct CustomersResponse {
    pub customers: Vec<User>,
}

fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(message.to_string()))
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
        }
    }
}

/// Put `user` in the session and tag Sentry with it.
async fn sign_in(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Sign up, log in or log out.
#[instrument(skip(state, session, body), fields(action = %body.action))]
async fn account_action(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<AccountAction>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    match body.action.as_str() {
        "signup" => {
            let email = required(body.email.as_deref(), "email is required")?;
            let password = required(body.password.as_deref(), "password is required")?;
            let username = required(body.username.as_deref(), "username is required")?;

            let user = auth
                .register_with_password(email, username, password)
                .await
                .inspect_err(|e| warn!("Signup failed: {e}"))?;
            sign_in(&session, &user).await?;

            info!(user_id = %user.id, "Customer signed up");

            Ok((
                StatusCode::CREATED,
                Json(SignupResponse {
                    success: true,
                    uid: user.id,
                }),
            )
                .into_response())
        }
        "login" => {
            let email = required(body.email.as_deref(), "email is required")?;
            let password = required(body.password.as_deref(), "password is required")?;

            let user = auth
                .login_with_password(email, password)
                .await
                .inspect_err(|e| warn!("Login failed: {e}"))?;
            sign_in(&session, &user).await?;

            Ok(Json(LoginResponse {
                success: true,
                uid: user.id,
                user,
            })
            .into_response())
        }
        "logout" => {
            clear_current_user(&session).await?;
            clear_sentry_user();

            Ok(Json(serde_json::json!({ "success": true })).into_response())
        }
        _ => Err(AppError::BadRequest("Invalid action".to_string())),
    }
}

/// The signed-in customer's profile.
#[instrument(skip(state, current), fields(user_id = %current.id))]
async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<UserResponse>> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;
    Ok(Json(UserResponse { user }))
}

/// Update username, phone or delivery address. The email can't be changed.
#[instrument(skip(state, session, current, update), fields(user_id = %current.id))]
async fn update_me(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<UserResponse>> {
    let user = AuthService::new(state.pool())
        .update_profile(current.id, update)
        .await?;

    if user.username != current.username {
        session
            .insert(session_keys::CURRENT_USER, CurrentUser::from(&user))
            .await?;
    }

    Ok(Json(UserResponse { user }))
}

/// Every customer account, newest first.
#[instrument(skip(state, _admin))]
async fn customers(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<CustomersResponse>> {
    let customers = UserRepository::new(state.pool()).list().await?;
    Ok(Json(CustomersResponse { customers }))
}
