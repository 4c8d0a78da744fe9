use crate::config::Config;
use crate::db::models::CredentialRecord;
use crate::db::queries;
use crate::db::CredentialStore;
use crate::error::ReportError;
use crate::window::TimeWindow;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, info};

/// Credential store backed by one Postgres connection, used sequentially.
pub struct PgCredentialStore {
    conn: PgConnection,
}

impl PgCredentialStore {
    pub fn connect_options(cfg: &Config) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port)
            .database(&cfg.database)
            .username(&cfg.user)
            .password(&cfg.password)
    }

    /// Open the connection. Any handshake or authentication failure is a
    /// [`ReportError::Connection`]; exceeding the configured timeout is a
    /// [`ReportError::ConnectTimeout`].
    pub async fn connect(cfg: &Config) -> Result<Self, ReportError> {
        info!(
            host = %cfg.host,
            port = cfg.port,
            database = %cfg.database,
            user = %cfg.user,
            "connecting to credential database"
        );
        let opts = Self::connect_options(cfg);
        let conn = match cfg.connect_timeout() {
            Some(limit) => tokio::time::timeout(limit, opts.connect())
                .await
                .map_err(|_| ReportError::ConnectTimeout(limit))?,
            None => opts.connect().await,
        }
        .map_err(ReportError::Connection)?;
        Ok(Self { conn })
    }

    /// Wrap an already-open connection.
    pub fn from_connection(conn: PgConnection) -> Self {
        Self { conn }
    }

    /// Gracefully terminate the connection.
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            debug!(error = %e, "connection did not close cleanly");
        }
    }
}

impl CredentialStore for PgCredentialStore {
    async fn list_distinct_tokens(&mut self) -> Result<Vec<String>, ReportError> {
        let rows: Vec<(String,)> = sqlx::query_as(queries::DISTINCT_TOKENS)
            .fetch_all(&mut self.conn)
            .await?;
        debug!(count = rows.len(), "distinct tokens fetched");
        Ok(rows.into_iter().map(|(token,)| token).collect())
    }

    async fn count_by_token_in_range(
        &mut self,
        token: &str,
        window: &TimeWindow,
    ) -> Result<i64, ReportError> {
        let sql = if window.end_inclusive {
            queries::COUNT_BY_TOKEN_IN_CLOSED_RANGE
        } else {
            queries::COUNT_BY_TOKEN_IN_RANGE
        };
        let rec: (i64,) = sqlx::query_as(sql)
            .bind(token)
            .bind(window.start)
            .bind(window.end)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(rec.0)
    }

    async fn count_by_token(&mut self, token: &str) -> Result<i64, ReportError> {
        let rec: (i64,) = sqlx::query_as(queries::COUNT_BY_TOKEN)
            .bind(token)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(rec.0)
    }

    async fn list_in_range(
        &mut self,
        window: &TimeWindow,
    ) -> Result<Vec<CredentialRecord>, ReportError> {
        let sql = if window.end_inclusive {
            queries::LIST_IN_CLOSED_RANGE
        } else {
            queries::LIST_IN_RANGE
        };
        let rows: Vec<CredentialRecord> = sqlx::query_as(sql)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&mut self.conn)
            .await?;
        debug!(count = rows.len(), start = %window.start, end = %window.end, "credentials fetched");
        Ok(rows)
    }
}
