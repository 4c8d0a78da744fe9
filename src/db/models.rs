use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One issued credential as stored in the `cred` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CredentialRecord {
    pub id: String,
    pub identifier: Option<String>,
    pub active: bool,
    pub schema_id: Option<String>,
    pub from_did: Option<String>,
    pub cred_hash: Option<String>,
    pub token: Option<String>,
    pub created_at: DateTime<Utc>,
}
