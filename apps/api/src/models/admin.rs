use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct AdminRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub profession: String,
    pub email: String,
    pub password_hash: String,
}

/// Public view of an admin. Never carries the password hash.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdminOut {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub profession: String,
    pub email: String,
}

impl From<AdminRow> for AdminOut {
    fn from(row: AdminRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            profession: row.profession,
            email: row.email,
        }
    }
}
