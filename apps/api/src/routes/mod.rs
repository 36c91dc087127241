pub mod health;
pub mod json;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::interview::handlers as interview;
use crate::resume::handlers as resume;
use crate::state::AppState;

/// Upper bound for resume uploads.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Admin auth
        .route("/auth/admin/register", post(auth::handle_register))
        .route("/auth/admin/login", post(auth::handle_login))
        .route("/auth/admin/protected", get(auth::handle_protected))
        .route("/auth/admin/details", get(auth::handle_details))
        .route(
            "/auth/admin/forgot-password",
            post(auth::handle_forgot_password),
        )
        .route("/auth/admin/verify-otp", post(auth::handle_verify_otp))
        .route(
            "/auth/admin/reset-password",
            post(auth::handle_reset_password),
        )
        // Resume analysis
        .route(
            "/analyze-resume/",
            post(resume::handle_analyze_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/interviews/:id", get(resume::handle_get_interview))
        // Interview sessions
        .route(
            "/interview/session/complete",
            post(interview::handle_complete_session),
        )
        .route(
            "/interview/session/:id",
            get(interview::handle_get_session),
        )
        .with_state(state)
}
