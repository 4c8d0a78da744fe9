//! SQL issued against the issuer agent's `cred` table.
//! Read-only; every runtime value is a bind parameter.
//!
//! Column naming follows the agent's ORM: `created_at` is explicitly
//! snake_case, the remaining camelCase columns are quoted. `id` is cast to
//! text so UUID and varchar keys decode the same way, and `created_at` is cast
//! to `timestamptz` whether the column carries a zone or not.

pub const DISTINCT_TOKENS: &str = r#"
SELECT DISTINCT token FROM cred WHERE token IS NOT NULL
"#;

pub const COUNT_BY_TOKEN: &str = r#"
SELECT COUNT(*) FROM cred WHERE token = $1
"#;

/// `[$2, $3)`
pub const COUNT_BY_TOKEN_IN_RANGE: &str = r#"
SELECT COUNT(*) FROM cred
WHERE token = $1
  AND created_at >= $2
  AND created_at < $3
"#;

/// `[$2, $3]`
pub const COUNT_BY_TOKEN_IN_CLOSED_RANGE: &str = r#"
SELECT COUNT(*) FROM cred
WHERE token = $1
  AND created_at >= $2
  AND created_at <= $3
"#;

/// `[$1, $2)`, newest first.
pub const LIST_IN_RANGE: &str = r#"
SELECT id::text AS id, identifier, active,
       "schemaId" AS schema_id, "fromDid" AS from_did, "credHash" AS cred_hash,
       token, created_at::timestamptz AS created_at
FROM cred
WHERE created_at >= $1
  AND created_at < $2
ORDER BY created_at DESC
"#;

/// `[$1, $2]`, newest first.
pub const LIST_IN_CLOSED_RANGE: &str = r#"
SELECT id::text AS id, identifier, active,
       "schemaId" AS schema_id, "fromDid" AS from_did, "credHash" AS cred_hash,
       token, created_at::timestamptz AS created_at
FROM cred
WHERE created_at >= $1
  AND created_at <= $2
ORDER BY created_at DESC
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_are_read_only() {
        for sql in [
            DISTINCT_TOKENS,
            COUNT_BY_TOKEN,
            COUNT_BY_TOKEN_IN_RANGE,
            COUNT_BY_TOKEN_IN_CLOSED_RANGE,
            LIST_IN_RANGE,
            LIST_IN_CLOSED_RANGE,
        ] {
            assert!(sql.trim_start().starts_with("SELECT"));
            assert!(!sql.contains(';'));
        }
    }

    #[test]
    fn half_open_windows_exclude_their_end() {
        assert!(LIST_IN_RANGE.contains("created_at >= $1"));
        assert!(LIST_IN_RANGE.contains("created_at < $2"));
        assert!(!LIST_IN_RANGE.contains("<="));
        assert!(COUNT_BY_TOKEN_IN_RANGE.contains("created_at >= $2"));
        assert!(COUNT_BY_TOKEN_IN_RANGE.contains("created_at < $3"));
        assert!(!COUNT_BY_TOKEN_IN_RANGE.contains("<="));
    }

    #[test]
    fn closed_windows_include_their_end() {
        assert!(LIST_IN_CLOSED_RANGE.contains("created_at >= $1"));
        assert!(LIST_IN_CLOSED_RANGE.contains("created_at <= $2"));
        assert!(COUNT_BY_TOKEN_IN_CLOSED_RANGE.contains("created_at >= $2"));
        assert!(COUNT_BY_TOKEN_IN_CLOSED_RANGE.contains("created_at <= $3"));
    }

    #[test]
    fn listings_order_newest_first() {
        assert!(LIST_IN_RANGE.contains("ORDER BY created_at DESC"));
        assert!(LIST_IN_CLOSED_RANGE.contains("ORDER BY created_at DESC"));
    }
}
