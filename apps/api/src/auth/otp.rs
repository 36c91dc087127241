//! One-time passwords for admin password resets.
//!
//! Flow: `issue_otp` → `verify_otp` (consumes the OTP, opens a reset window) →
//! `ensure_reset_allowed` → `close_reset_window`. Records carry their own
//! `expires_at` so an expired OTP is reported as expired rather than invalid;
//! the store TTL only garbage-collects stale keys.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const OTP_TTL_MINUTES: i64 = 10;
pub const RESET_WINDOW_MINUTES: i64 = 10;
/// Keys outlive their records so expiry stays observable for a while.
const STORE_RETENTION: StdDuration = StdDuration::from_secs(60 * 60);

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("OTP store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("corrupt OTP record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Key-value storage with expiry. Redis in production.
#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn put(&self, key: &str, value: String, ttl: StdDuration) -> Result<(), OtpError>;
    async fn get(&self, key: &str) -> Result<Option<String>, OtpError>;
    async fn delete(&self, key: &str) -> Result<(), OtpError>;
}

pub struct RedisOtpStore {
    client: redis::Client,
}

impl RedisOtpStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn put(&self, key: &str, value: String, ttl: StdDuration) -> Result<(), OtpError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, OtpError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), OtpError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OtpRecord {
    otp: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResetWindow {
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Verified,
    Invalid,
    Expired,
}

fn otp_key(email: &str) -> String {
    format!("otp:admin:{email}")
}

fn reset_key(email: &str) -> String {
    format!("otp:admin-reset:{email}")
}

pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Stores a fresh OTP for `email` and closes any open reset window.
pub async fn issue_otp(
    store: &dyn OtpStore,
    email: &str,
    now: DateTime<Utc>,
) -> Result<String, OtpError> {
    let otp = generate_otp();
    let record = OtpRecord {
        otp: otp.clone(),
        expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
    };
    store
        .put(&otp_key(email), serde_json::to_string(&record)?, STORE_RETENTION)
        .await?;
    store.delete(&reset_key(email)).await?;
    debug!("Issued OTP for {email}");
    Ok(otp)
}

/// Checks `otp` against the stored record. A match that is still valid is
/// consumed and opens the reset window.
pub async fn verify_otp(
    store: &dyn OtpStore,
    email: &str,
    otp: &str,
    now: DateTime<Utc>,
) -> Result<OtpCheck, OtpError> {
    let Some(raw) = store.get(&otp_key(email)).await? else {
        return Ok(OtpCheck::Invalid);
    };
    let record: OtpRecord = serde_json::from_str(&raw)?;

    if record.otp != otp {
        return Ok(OtpCheck::Invalid);
    }
    if record.expires_at < now {
        return Ok(OtpCheck::Expired);
    }

    let window = ResetWindow {
        expires_at: now + Duration::minutes(RESET_WINDOW_MINUTES),
    };
    store
        .put(&reset_key(email), serde_json::to_string(&window)?, STORE_RETENTION)
        .await?;
    store.delete(&otp_key(email)).await?;
    Ok(OtpCheck::Verified)
}

pub async fn ensure_reset_allowed(
    store: &dyn OtpStore,
    email: &str,
    now: DateTime<Utc>,
) -> Result<bool, OtpError> {
    let Some(raw) = store.get(&reset_key(email)).await? else {
        return Ok(false);
    };
    let window: ResetWindow = serde_json::from_str(&raw)?;
    Ok(window.expires_at >= now)
}

pub async fn close_reset_window(store: &dyn OtpStore, email: &str) -> Result<(), OtpError> {
    store.delete(&reset_key(email)).await
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryOtpStore;
    use super::*;

    const EMAIL: &str = "admin@example.com";

    #[test]
    fn test_generated_otp_is_six_digits() {
        for _ in 0..200 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            let n: u32 = otp.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[tokio::test]
    async fn test_full_reset_flow() {
        let store = MemoryOtpStore::default();
        let now = Utc::now();

        let otp = issue_otp(&store, EMAIL, now).await.unwrap();
        assert!(!ensure_reset_allowed(&store, EMAIL, now).await.unwrap());

        let check = verify_otp(&store, EMAIL, &otp, now).await.unwrap();
        assert_eq!(check, OtpCheck::Verified);
        assert!(ensure_reset_allowed(&store, EMAIL, now).await.unwrap());

        // Consumed: a second verification with the same code fails.
        let again = verify_otp(&store, EMAIL, &otp, now).await.unwrap();
        assert_eq!(again, OtpCheck::Invalid);

        close_reset_window(&store, EMAIL).await.unwrap();
        assert!(!ensure_reset_allowed(&store, EMAIL, now).await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_otp_is_invalid() {
        let store = MemoryOtpStore::default();
        let now = Utc::now();
        let otp = issue_otp(&store, EMAIL, now).await.unwrap();
        let wrong = if otp == "123456" { "654321" } else { "123456" };

        assert_eq!(
            verify_otp(&store, EMAIL, wrong, now).await.unwrap(),
            OtpCheck::Invalid
        );
        assert_eq!(
            verify_otp(&store, "other@example.com", &otp, now).await.unwrap(),
            OtpCheck::Invalid
        );
    }

    #[tokio::test]
    async fn test_expired_otp() {
        let store = MemoryOtpStore::default();
        let issued = Utc::now() - Duration::minutes(OTP_TTL_MINUTES + 1);
        let otp = issue_otp(&store, EMAIL, issued).await.unwrap();

        let check = verify_otp(&store, EMAIL, &otp, Utc::now()).await.unwrap();
        assert_eq!(check, OtpCheck::Expired);
        assert!(!ensure_reset_allowed(&store, EMAIL, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_window_expires() {
        let store = MemoryOtpStore::default();
        let verified_at = Utc::now() - Duration::minutes(RESET_WINDOW_MINUTES + 1);
        let otp = issue_otp(&store, EMAIL, verified_at).await.unwrap();
        verify_otp(&store, EMAIL, &otp, verified_at).await.unwrap();

        assert!(!ensure_reset_allowed(&store, EMAIL, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_reissue_closes_open_window() {
        let store = MemoryOtpStore::default();
        let now = Utc::now();
        let otp = issue_otp(&store, EMAIL, now).await.unwrap();
        verify_otp(&store, EMAIL, &otp, now).await.unwrap();
        assert!(ensure_reset_allowed(&store, EMAIL, now).await.unwrap());

        issue_otp(&store, EMAIL, now).await.unwrap();
        assert!(!ensure_reset_allowed(&store, EMAIL, now).await.unwrap());
    }
}
