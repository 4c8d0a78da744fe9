//! Plain-text rendering of reports.
//!
//! Listing layout is fixed-width so the output can be diffed against golden
//! files: every column is left-justified to its width and columns are
//! comma-separated.

use std::fmt::Write;

use crate::db::CredentialRecord;
use crate::report::{Report, TokenCount};

pub const ID_WIDTH: usize = 40;
pub const IDENTIFIER_WIDTH: usize = 20;
pub const ACTIVE_WIDTH: usize = 7;
pub const SCHEMA_ID_WIDTH: usize = 10;
pub const FROM_DID_WIDTH: usize = 20;
pub const CRED_HASH_WIDTH: usize = 64;
pub const SEPARATOR_WIDTH: usize = 180;
pub const TOKEN_WIDTH: usize = 40;
pub const COUNT_WIDTH: usize = 12;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn render(report: &Report) -> String {
    let mut out = String::with_capacity(1024);
    let written = match report {
        Report::Listing { period, records } => write_listing(&mut out, period, records),
        Report::TokenSummary { period, counts } => write_token_summary(&mut out, period, counts),
    };
    debug_assert!(written.is_ok());
    out
}

fn write_listing(out: &mut String, period: &str, records: &[CredentialRecord]) -> std::fmt::Result {
    write_row(
        out,
        ["ID", "Identifier", "Active", "SchemaID", "FromDID", "CredHash", "CreatedAt"],
    )?;
    writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;

    for rec in records {
        let active = rec.active.to_string();
        let created_at = rec.created_at.format(TIMESTAMP_FORMAT).to_string();
        write_row(
            out,
            [
                rec.id.as_str(),
                opt(&rec.identifier),
                active.as_str(),
                opt(&rec.schema_id),
                opt(&rec.from_did),
                opt(&rec.cred_hash),
                created_at.as_str(),
            ],
        )?;
    }

    writeln!(out, "Total credentials issued in {}: {}", period, records.len())
}

fn write_row(out: &mut String, cols: [&str; 7]) -> std::fmt::Result {
    let [id, identifier, active, schema_id, from_did, cred_hash, created_at] = cols;
    writeln!(
        out,
        "{id:<ID_WIDTH$},{identifier:<IDENTIFIER_WIDTH$},{active:<ACTIVE_WIDTH$},\
         {schema_id:<SCHEMA_ID_WIDTH$},{from_did:<FROM_DID_WIDTH$},\
         {cred_hash:<CRED_HASH_WIDTH$},{created_at}"
    )
}

fn write_token_summary(out: &mut String, period: &str, counts: &[TokenCount]) -> std::fmt::Result {
    writeln!(out, "Credential Summary Report for {period}")?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<TOKEN_WIDTH$} {:>COUNT_WIDTH$} {:>COUNT_WIDTH$}",
        "Token", period, "All time"
    )?;
    writeln!(out, "{}", "-".repeat(TOKEN_WIDTH + 2 * (COUNT_WIDTH + 1)))?;
    for c in counts {
        writeln!(
            out,
            "{:<TOKEN_WIDTH$} {:>COUNT_WIDTH$} {:>COUNT_WIDTH$}",
            c.token, c.in_period, c.all_time
        )?;
    }
    let total: i64 = counts.iter().map(|c| c.in_period).sum();
    writeln!(out, "Total credentials issued in {period}: {total}")
}

/// Absent values render as an empty cell.
fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}
