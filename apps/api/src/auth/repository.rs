use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::admin::AdminRow;

pub struct NewAdmin<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub profession: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

pub async fn find_admin_by_email(pool: &PgPool, email: &str) -> Result<Option<AdminRow>, sqlx::Error> {
    sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_admin_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AdminRow>, sqlx::Error> {
    sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Inserts an admin. Returns `None` when the email is already registered.
pub async fn insert_admin(pool: &PgPool, admin: NewAdmin<'_>) -> Result<Option<Uuid>, sqlx::Error> {
    let id = Uuid::new_v4();
    let result = sqlx::query(
        r#"
        INSERT INTO admins (id, first_name, last_name, profession, email, password_hash, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(admin.first_name)
    .bind(admin.last_name)
    .bind(admin.profession)
    .bind(admin.email)
    .bind(admin.password_hash)
    .bind(Utc::now())
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            info!("Registered admin {id}");
            Ok(Some(id))
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn update_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE admins SET password_hash = $1, updated_at = $2 WHERE id = $3")
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    info!("Password reset for admin {id}");
    Ok(())
}
