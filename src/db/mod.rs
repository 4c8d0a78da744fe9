//! Database module: read-only access to issued credential records.
//!
//! Layout:
//! - `models.rs`: `CredentialRecord`, the row shape of the `cred` table
//! - `queries.rs`: the SQL statements, one per operation
//! - `postgres.rs`: `PgCredentialStore`, a single-connection implementation

pub mod models;
pub mod postgres;
pub mod queries;

pub use models::CredentialRecord;
pub use postgres::PgCredentialStore;

use crate::error::ReportError;
use crate::window::TimeWindow;

/// Read-only queries the reports are built from.
///
/// Implementations run each call to completion before returning and never
/// retry; a failed query surfaces as [`ReportError::Query`].
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
    /// Every distinct non-null token, in no particular order.
    async fn list_distinct_tokens(&mut self) -> Result<Vec<String>, ReportError>;

    /// Records carrying `token` issued within `window`.
    async fn count_by_token_in_range(
        &mut self,
        token: &str,
        window: &TimeWindow,
    ) -> Result<i64, ReportError>;

    /// All-time count for `token`.
    async fn count_by_token(&mut self, token: &str) -> Result<i64, ReportError>;

    /// Records issued within `window`, newest first.
    async fn list_in_range(
        &mut self,
        window: &TimeWindow,
    ) -> Result<Vec<CredentialRecord>, ReportError>;
}
