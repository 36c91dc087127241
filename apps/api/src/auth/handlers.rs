use axum::{extract::State, Json};
use chrono::Utc;
use tracing::info;
use validator::Validate;

use crate::auth::models::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, OtpIssuedResponse, RegisterRequest,
    ResetPasswordRequest, TokenResponse, VerifyOtpRequest,
};
use crate::auth::otp::{self, OtpCheck};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repository::{find_admin_by_email, insert_admin, update_password, NewAdmin};
use crate::auth::token::{create_token, AuthAdmin};
use crate::errors::AppError;
use crate::routes::json::AppJson;
use crate::models::admin::{AdminOut, AdminRow};
use crate::state::AppState;

async fn require_admin(state: &AppState, email: &str) -> Result<AdminRow, AppError> {
    find_admin_by_email(&state.db, email)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))
}

/// POST /auth/admin/register
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    req.validate()?;
    if req.password != req.confirm_password {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }
    if find_admin_by_email(&state.db, &req.email).await?.is_some() {
        return Err(AppError::BadRequest("Admin exists".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let inserted = insert_admin(
        &state.db,
        NewAdmin {
            first_name: &req.first_name,
            last_name: &req.last_name,
            profession: &req.profession,
            email: &req.email,
            password_hash: &password_hash,
        },
    )
    .await?;

    // Lost a race with a concurrent registration of the same email.
    if inserted.is_none() {
        return Err(AppError::BadRequest("Admin exists".to_string()));
    }
    Ok(Json(MessageResponse::new("Admin registered")))
}

/// POST /auth/admin/login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()?;
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let admin = find_admin_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&req.password, &admin.password_hash) {
        return Err(invalid());
    }

    let token = create_token(admin.id, &state.config.jwt_secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token signing failed: {e}")))?;
    info!("Admin {} logged in", admin.id);
    Ok(Json(TokenResponse { token }))
}

/// GET /auth/admin/protected
pub async fn handle_protected(AuthAdmin(admin): AuthAdmin) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!("Hello {}", admin.first_name)))
}

/// GET /auth/admin/details
pub async fn handle_details(AuthAdmin(admin): AuthAdmin) -> Json<AdminOut> {
    Json(admin.into())
}

/// POST /auth/admin/forgot-password
///
/// The OTP is returned in the response; there is no mail/SMS delivery.
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<ForgotPasswordRequest>,
) -> Result<Json<OtpIssuedResponse>, AppError> {
    req.validate()?;
    let admin = require_admin(&state, &req.email).await?;

    let otp = otp::issue_otp(state.otp_store.as_ref(), &admin.email, Utc::now()).await?;
    info!("OTP generated for admin {}", admin.id);
    Ok(Json(OtpIssuedResponse {
        message: "OTP generated".to_string(),
        otp,
    }))
}

/// POST /auth/admin/verify-otp
pub async fn handle_verify_otp(
    State(state): State<AppState>,
    AppJson(req): AppJson<VerifyOtpRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    req.validate()?;
    match otp::verify_otp(state.otp_store.as_ref(), &req.email, &req.otp, Utc::now()).await? {
        OtpCheck::Verified => Ok(Json(MessageResponse::new("OTP verified"))),
        OtpCheck::Invalid => Err(AppError::BadRequest("Invalid OTP".to_string())),
        OtpCheck::Expired => Err(AppError::BadRequest("OTP expired".to_string())),
    }
}

/// POST /auth/admin/reset-password
pub async fn handle_reset_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    req.validate()?;
    let admin = require_admin(&state, &req.email).await?;

    let store = state.otp_store.as_ref();
    if !otp::ensure_reset_allowed(store, &admin.email, Utc::now()).await? {
        return Err(AppError::BadRequest("OTP verification required".to_string()));
    }

    let password_hash = hash_password(&req.new_password)?;
    update_password(&state.db, admin.id, &password_hash).await?;
    otp::close_reset_window(store, &admin.email).await?;

    Ok(Json(MessageResponse::new("Password reset successful")))
}
