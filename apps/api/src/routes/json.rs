use axum::extract::FromRequest;

use crate::errors::AppError;

/// `Json` body extractor whose rejection goes through `AppError`, so malformed
/// or incomplete bodies get the same 400 envelope as validator failures.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
