//! User account endpoints under `/users`

mod answers;
pub mod types;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{delete, get, post},
    Router,
};
use tracing::{debug, info, warn};

use crate::api::middleware::{OptionalUser, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{validate_password, NotificationType, Role, User, UserId};
use crate::domain::DomainError;
use crate::infrastructure::user::{generate_token, sha1_hash, RegistrationRequest};

use types::{
    ChangePasswordRequest, CompromisedQuery, ListQuery, MessageResponse, RegistrationPayload,
    RegistrationResponse, ResetTokenRequest, SavePasswordRequest, TokenQuery,
    TokenValidationResponse, UserPayload, UserResponse, VerificationTokenResponse,
};

/// Create the user router, to be nested under `/users`
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user).put(update_user).get(list_users))
        .route("/logout", post(logout))
        .route("/register", post(register))
        .route("/register/verify", get(verify_registration))
        .route("/register/resend", get(resend_verification))
        .route("/password/compromised", get(password_compromised))
        .route("/password/reset", post(password_reset))
        .route("/password/reset-token", post(password_reset_token))
        .route("/password/save", post(save_password))
        .route("/password/change", post(change_password))
        .route("/username/{username}/available", get(username_available))
        .route("/answers", get(answers::list_all_answers))
        .route("/{id}", get(get_user))
        .route(
            "/{id}/answers",
            get(answers::list_user_answers).post(answers::record_answer),
        )
        .route("/{id}/answers/{answer_id}", delete(answers::delete_answer))
        .route("/{id}/verify/{channel}", get(verify_channel))
        .route("/{id}/password/{code}", post(update_password))
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(username = ?payload.username, "Creating user");

    if let Some(id) = payload.id {
        warn!(user_id = id, "Rejecting create with a client-supplied id");
        return Err(ApiError::bad_request(
            "User ID must not be provided when creating a user; use PUT /users to update",
        ));
    }

    let mut user = payload.to_user()?;
    state.user_validator.validate(Some(&user)).await?;

    let password = validate_password(payload.password.as_deref())
        .map_err(|e| DomainError::invalid_payload(e.to_string()))?;
    user.set_password(Some(state.user_service.hash_password(password)?));
    user.set_role(Some(Role::from_certificate_number(
        user.certificate_number(),
    )));

    let stored = state.user_service.store(user).await?;
    Ok(Json(UserResponse::from(&stored)))
}

/// PUT /users
pub async fn update_user(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Json(payload): Json<UserPayload>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(user_id = ?payload.id, "Updating user");

    let candidate = payload.to_user()?;
    state.user_validator.validate(Some(&candidate)).await?;

    let id = candidate
        .id()
        .ok_or_else(|| ApiError::bad_request("User ID is a required value"))?;
    state
        .user_validator
        .access_admin_instructor_or_specific_user(id, Some(&principal))
        .await?;

    let mut user = state.user_service.get(id).await?;
    payload.apply_to(&mut user)?;

    if let Some(role) = payload.role()? {
        if state.user_validator.is_admin(Some(&principal)).await? {
            user.set_role(Some(role));
        } else if user.role() != Some(role) {
            warn!(user_id = %id, caller = %principal.name(), "Ignoring role change from non-admin");
        }
    }

    let stored = state.user_service.store(user).await?;
    Ok(Json(UserResponse::from(&stored)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = UserId::new(id);
    state
        .user_validator
        .access_admin_instructor_or_specific_user(id, Some(&principal))
        .await?;

    let user = state.user_service.get(id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// GET /users?username=&slack=
pub async fn list_users(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<UserId>>, ApiError> {
    state
        .user_validator
        .access_admin_or_instructor(Some(&principal))
        .await?;

    let ids = state
        .user_service
        .find_ids(query.username.as_deref(), query.slack.as_deref())
        .await?;

    Ok(Json(ids))
}

/// GET /users/password/compromised?p=
pub async fn password_compromised(
    State(state): State<AppState>,
    Query(query): Query<CompromisedQuery>,
) -> Result<Json<u64>, ApiError> {
    let hash = query
        .p
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(sha1_hash)
        .unwrap_or_default();

    let count = state
        .user_service
        .check_if_password_is_compromised(&hash)
        .await?;

    Ok(Json(count))
}

/// GET /users/username/{username}/available
pub async fn username_available(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<bool>, ApiError> {
    let existing = state.user_service.find_by_username(&username).await?;
    Ok(Json(existing.is_none()))
}

/// GET /users/{id}/verify/{channel}
///
/// Always redirects to the UI, whether or not the user exists.
pub async fn verify_channel(
    State(state): State<AppState>,
    Path((id, channel)): Path<(i64, String)>,
) -> Result<Redirect, ApiError> {
    let channel = channel
        .parse::<NotificationType>()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    match state
        .user_service
        .mark_channel_verified(UserId::new(id), channel)
        .await
    {
        Ok(_) => info!(user_id = id, channel = ?channel, "Contact channel verified"),
        Err(DomainError::NotFound { .. }) => {
            warn!(user_id = id, "Verification link for unknown user")
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to(&state.ui_host))
}

/// POST /users/{id}/password/{code}
///
/// Body is the new plaintext password. Allowed for admins, the account owner,
/// or anyone holding the account's current one-time code.
pub async fn update_password(
    State(state): State<AppState>,
    caller: OptionalUser,
    Path((id, code)): Path<(i64, String)>,
    password: String,
) -> Result<Json<bool>, ApiError> {
    let id = UserId::new(id);
    let user = state.user_service.get(id).await?;
    let principal = caller.principal();

    let allowed = state.user_validator.is_admin(principal.as_ref()).await?
        || state
            .user_validator
            .is_authenticated_user(id, principal.as_ref())
            .await?
        || user.code() == Some(code.as_str());

    if !allowed {
        warn!(user_id = %id, "Password update rejected");
        return Ok(Json(false));
    }

    let password = validate_password(Some(password.as_str()))
        .map_err(|e| DomainError::invalid_payload(e.to_string()))?;
    state.user_service.change_password(id, password).await?;

    Ok(Json(true))
}

/// POST /users/password/reset
///
/// Body is the account's email address.
pub async fn password_reset(
    State(state): State<AppState>,
    email: String,
) -> Result<Json<bool>, ApiError> {
    let email = email.trim().trim_matches('"');
    let assigned = state.user_service.assign_reset_code(email).await?;
    Ok(Json(assigned))
}

/// POST /users/logout
pub async fn logout(State(state): State<AppState>, caller: OptionalUser) -> StatusCode {
    if let Some(claims) = caller.0 {
        state.jwt_service.revoke(&claims).await;
        info!(user_id = %claims.sub, username = %claims.username, "Logged out");
    }

    StatusCode::OK
}

/// POST /users/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegistrationPayload>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let mut candidate = User::new(
        payload
            .username
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| payload.email.clone()),
    );
    candidate.set_email(Some(payload.email.clone()));
    state.user_validator.validate(Some(&candidate)).await?;

    let user = state
        .user_service
        .register_user(RegistrationRequest {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;

    let token = state
        .user_service
        .save_verification_token_for_user(&generate_token(), &user)
        .await?;

    Ok(Json(RegistrationResponse {
        user: UserResponse::from(&user),
        verification_token: token.token().to_string(),
    }))
}

/// GET /users/register/verify?token=
pub async fn verify_registration(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenValidationResponse>, ApiError> {
    let result = state
        .user_service
        .validate_verification_token(&query.token)
        .await?;

    Ok(Json(TokenValidationResponse { result }))
}

/// GET /users/register/resend?token=
pub async fn resend_verification(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<VerificationTokenResponse>, ApiError> {
    let token = state
        .user_service
        .generate_new_verification_token(&query.token)
        .await?;

    Ok(Json(VerificationTokenResponse {
        verification_token: token.token().to_string(),
    }))
}

/// POST /users/password/reset-token
///
/// Responds identically whether or not the email is registered.
pub async fn password_reset_token(
    State(state): State<AppState>,
    Json(request): Json<ResetTokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Some(user) = state.user_service.find_by_email(request.email.trim()).await? {
        state
            .user_service
            .create_password_reset_token_for_user(&user, &generate_token())
            .await?;
        info!(user_id = ?user.id(), "Password reset token issued");
    } else {
        warn!(email = %request.email, "Reset token requested for unknown email");
    }

    Ok(Json(MessageResponse {
        message: "If the address is registered, a reset link has been sent".to_string(),
    }))
}

/// POST /users/password/save
pub async fn save_password(
    State(state): State<AppState>,
    Json(request): Json<SavePasswordRequest>,
) -> Result<Json<TokenValidationResponse>, ApiError> {
    let result = state
        .user_service
        .reset_password_with_token(&request.token, &request.new_password)
        .await?;

    Ok(Json(TokenValidationResponse { result }))
}

/// POST /users/password/change
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<bool>, ApiError> {
    let id = state
        .user_validator
        .access_any_authenticated(Some(&principal))
        .await?;

    if !state
        .user_service
        .check_if_valid_old_password(id, &request.old_password)
        .await?
    {
        return Err(ApiError::bad_request("Invalid old password"));
    }

    let password = validate_password(Some(request.new_password.as_str()))
        .map_err(|e| DomainError::invalid_payload(e.to_string()))?;
    state.user_service.change_password(id, password).await?;

    Ok(Json(true))
}
