use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    app::not_found,
    auth::{
        dto::{AuthData, LoginRequest, MeData, PublicUser, SignupRequest},
        extractors::CurrentUser,
        validation::{validate_login, validate_signup},
    },
    error::{AppError, FieldError},
    response::{ApiResponse, Reply},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup).fallback(not_found))
        .route("/auth/login", post(login).fallback(not_found))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me).fallback(not_found))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(v)| v).map_err(|e| {
        warn!(error = %e, "rejected request body");
        AppError::Validation(vec![FieldError::new("body", e.body_text())])
    })
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Reply<AuthData>, AppError> {
    let mut payload = body(payload)?;
    validate_signup(&mut payload)?;

    if state.credentials.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    // A concurrent signup can still win between the check and the insert;
    // the store reports that as DuplicateEmail too.
    let user = state
        .credentials
        .create(&payload.name, &payload.email, &payload.password)
        .await?;
    let token = state.keys.issue(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Reply(
        StatusCode::CREATED,
        ApiResponse::ok(
            "User created successfully",
            AuthData {
                user: PublicUser::from(&user),
                token,
            },
        ),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Reply<AuthData>, AppError> {
    let mut payload = body(payload)?;
    validate_login(&mut payload)?;

    let user = match state.credentials.find_by_email(&payload.email).await? {
        Some(u) => u,
        None => {
            state.credentials.verify_against_dummy(&payload.password);
            warn!(email = %payload.email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !state.credentials.verify_password(&user, &payload.password) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.keys.issue(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Reply(
        StatusCode::OK,
        ApiResponse::ok(
            "Login successful",
            AuthData {
                user: PublicUser::from(&user),
                token,
            },
        ),
    ))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Reply<MeData> {
    debug!(user_id = %user.id, "profile requested");
    Reply(
        StatusCode::OK,
        ApiResponse::ok("User profile", MeData { user: user.into() }),
    )
}
