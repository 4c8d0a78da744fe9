//! Report selection and execution.

pub mod format;

use std::io::Write;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::db::{CredentialRecord, CredentialStore, PgCredentialStore};
use crate::error::ReportError;
use crate::window::{days_label, last_calendar_month, last_n_days, month_label};

/// Which report a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Per-token issuance counts for the previous calendar month and all time.
    TokenSummary,
    /// Every credential issued in the last `n` days.
    LastDays(u32),
    /// Every credential issued in the previous calendar month.
    LastMonth,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCount {
    pub token: String,
    pub in_period: i64,
    pub all_time: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Listing {
        period: String,
        records: Vec<CredentialRecord>,
    },
    TokenSummary {
        period: String,
        counts: Vec<TokenCount>,
    },
}

impl Report {
    pub fn period(&self) -> &str {
        match self {
            Report::Listing { period, .. } | Report::TokenSummary { period, .. } => period,
        }
    }

    pub fn total(&self) -> i64 {
        match self {
            Report::Listing { records, .. } => records.len() as i64,
            Report::TokenSummary { counts, .. } => counts.iter().map(|c| c.in_period).sum(),
        }
    }
}

/// Run the queries behind `kind` against `store`, one after another.
pub async fn run<S: CredentialStore>(
    store: &mut S,
    kind: ReportKind,
    now: DateTime<Utc>,
) -> Result<Report, ReportError> {
    match kind {
        ReportKind::LastMonth => {
            let window = last_calendar_month(now);
            let records = store.list_in_range(&window).await?;
            Ok(Report::Listing {
                period: month_label(&window),
                records,
            })
        }
        ReportKind::LastDays(n) => {
            let window = last_n_days(now, n)?;
            let records = store.list_in_range(&window).await?;
            Ok(Report::Listing {
                period: days_label(n),
                records,
            })
        }
        ReportKind::TokenSummary => {
            let window = last_calendar_month(now);
            let mut tokens = store.list_distinct_tokens().await?;
            tokens.sort();
            let mut counts = Vec::with_capacity(tokens.len());
            for token in tokens {
                let in_period = store.count_by_token_in_range(&token, &window).await?;
                let all_time = store.count_by_token(&token).await?;
                debug!(%token, in_period, all_time, "token counted");
                counts.push(TokenCount {
                    token,
                    in_period,
                    all_time,
                });
            }
            Ok(Report::TokenSummary {
                period: month_label(&window),
                counts,
            })
        }
    }
}

/// Connect, produce the report and write it to `out`.
///
/// The connection is closed whether or not the queries succeed; a failed
/// connect returns before any query is issued.
pub async fn execute<W: Write>(
    cfg: &Config,
    kind: ReportKind,
    now: DateTime<Utc>,
    out: &mut W,
) -> Result<Report, ReportError> {
    let mut store = PgCredentialStore::connect(cfg).await?;
    let result = run(&mut store, kind, now).await;
    store.close().await;
    let report = result?;

    info!(?kind, period = %report.period(), total = report.total(), "report generated");
    out.write_all(format::render(&report).as_bytes())?;
    out.flush()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::TimeWindow;
    use chrono::{Duration, TimeZone};

    /// In-memory store mirroring the SQL semantics of the Postgres store.
    #[derive(Default)]
    struct MemoryStore {
        records: Vec<CredentialRecord>,
        fail_counts: bool,
        queries: usize,
    }

    impl CredentialStore for MemoryStore {
        async fn list_distinct_tokens(&mut self) -> Result<Vec<String>, ReportError> {
            self.queries += 1;
            let mut tokens: Vec<String> = self
                .records
                .iter()
                .filter_map(|r| r.token.clone())
                .collect();
            tokens.sort();
            tokens.dedup();
            // unspecified order
            tokens.reverse();
            Ok(tokens)
        }

        async fn count_by_token_in_range(
            &mut self,
            token: &str,
            window: &TimeWindow,
        ) -> Result<i64, ReportError> {
            self.queries += 1;
            if self.fail_counts {
                return Err(sqlx::Error::Protocol("connection reset".into()).into());
            }
            Ok(self
                .records
                .iter()
                .filter(|r| r.token.as_deref() == Some(token) && window.contains(r.created_at))
                .count() as i64)
        }

        async fn count_by_token(&mut self, token: &str) -> Result<i64, ReportError> {
            self.queries += 1;
            Ok(self
                .records
                .iter()
                .filter(|r| r.token.as_deref() == Some(token))
                .count() as i64)
        }

        async fn list_in_range(
            &mut self,
            window: &TimeWindow,
        ) -> Result<Vec<CredentialRecord>, ReportError> {
            self.queries += 1;
            let mut rows: Vec<CredentialRecord> = self
                .records
                .iter()
                .filter(|r| window.contains(r.created_at))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        }
    }

    fn rec(id: &str, token: Option<&str>, created_at: DateTime<Utc>) -> CredentialRecord {
        CredentialRecord {
            id: id.to_string(),
            identifier: Some(format!("ident-{id}")),
            active: true,
            schema_id: None,
            from_did: Some("did:cord:issuer".to_string()),
            cred_hash: None,
            token: token.map(str::to_string),
            created_at,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 17, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn token_counts_split_last_month_from_all_time() {
        let last_month_noon = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut store = MemoryStore {
            records: vec![rec("a", Some("abc"), last_month_noon), rec("b", Some("abc"), now())],
            ..Default::default()
        };

        let report = run(&mut store, ReportKind::TokenSummary, now()).await.unwrap();
        assert_eq!(
            report,
            Report::TokenSummary {
                period: "March 2024".to_string(),
                counts: vec![TokenCount {
                    token: "abc".to_string(),
                    in_period: 1,
                    all_time: 2,
                }],
            }
        );
    }

    #[tokio::test]
    async fn token_summary_skips_null_tokens_and_sorts() {
        let t = now() - Duration::days(40);
        let mut store = MemoryStore {
            records: vec![
                rec("1", Some("zeta"), t),
                rec("2", None, t),
                rec("3", Some("alpha"), t),
                rec("4", Some("zeta"), t),
            ],
            ..Default::default()
        };
        let Report::TokenSummary { counts, .. } =
            run(&mut store, ReportKind::TokenSummary, now()).await.unwrap()
        else {
            panic!("expected token summary");
        };
        let tokens: Vec<&str> = counts.iter().map(|c| c.token.as_str()).collect();
        assert_eq!(tokens, ["alpha", "zeta"]);
        assert_eq!(counts[1].all_time, 2);
    }

    #[tokio::test]
    async fn last_month_listing_respects_half_open_bounds() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let mut store = MemoryStore {
            records: vec![
                rec("at-start", Some("abc"), start),
                rec("mid", None, start + Duration::days(10)),
                rec("at-end", Some("abc"), end),
                rec("before", Some("abc"), start - Duration::seconds(1)),
            ],
            ..Default::default()
        };
        let Report::Listing { period, records } =
            run(&mut store, ReportKind::LastMonth, now()).await.unwrap()
        else {
            panic!("expected listing");
        };
        assert_eq!(period, "March 2024");
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["mid", "at-start"]);
    }

    #[tokio::test]
    async fn last_days_listing_is_newest_first() {
        let mut store = MemoryStore {
            records: vec![
                rec("old", None, now() - Duration::days(31)),
                rec("week", None, now() - Duration::days(7)),
                rec("today", None, now()),
                rec("edge", None, now() - Duration::days(30)),
            ],
            ..Default::default()
        };
        let report = run(&mut store, ReportKind::LastDays(30), now()).await.unwrap();
        assert_eq!(report.period(), "last 30 days");
        let Report::Listing { records, .. } = report else {
            panic!("expected listing");
        };
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["today", "week", "edge"]);
        assert!(records.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn oversized_day_window_fails_before_querying() {
        let mut store = MemoryStore::default();
        let err = run(&mut store, ReportKind::LastDays(u32::MAX), now())
            .await
            .expect_err("window start is unrepresentable");
        assert!(matches!(err, ReportError::Configuration(_)));
        assert_eq!(store.queries, 0);
    }

    #[tokio::test]
    async fn empty_store_renders_zero_total() {
        let mut store = MemoryStore::default();
        let report = run(&mut store, ReportKind::LastMonth, now()).await.unwrap();
        assert_eq!(report.total(), 0);
        let text = format::render(&report);
        assert_eq!(text.lines().count(), 3);
        assert!(text.ends_with("Total credentials issued in March 2024: 0\n"));
    }

    #[tokio::test]
    async fn query_failure_propagates_and_stops_the_run() {
        let mut store = MemoryStore {
            records: vec![rec("a", Some("abc"), now()), rec("b", Some("def"), now())],
            fail_counts: true,
            ..Default::default()
        };
        let err = run(&mut store, ReportKind::TokenSummary, now())
            .await
            .expect_err("count failure must surface");
        assert!(matches!(err, ReportError::Query(_)));
        // tokens + first failing count, nothing after
        assert_eq!(store.queries, 2);
    }

    #[tokio::test]
    async fn all_time_count_matches_unbounded_listing() {
        let base = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let records: Vec<CredentialRecord> = (0..20)
            .map(|i| {
                let token = match i % 3 {
                    0 => Some("abc"),
                    1 => Some("def"),
                    _ => None,
                };
                rec(&i.to_string(), token, base + Duration::days(i * 17))
            })
            .collect();
        let mut store = MemoryStore {
            records,
            ..Default::default()
        };
        let everything = TimeWindow {
            start: base - Duration::days(1),
            end: now(),
            end_inclusive: true,
        };
        let listed = store.list_in_range(&everything).await.unwrap();
        for token in store.list_distinct_tokens().await.unwrap() {
            let expected = listed
                .iter()
                .filter(|r| r.token.as_deref() == Some(token.as_str()))
                .count() as i64;
            assert_eq!(store.count_by_token(&token).await.unwrap(), expected);
        }
    }
}
