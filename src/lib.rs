pub mod config;
pub mod db;
pub mod error;
pub mod report;
pub mod window;

pub use config::Config;
pub use db::{CredentialRecord, CredentialStore, PgCredentialStore};
pub use error::ReportError;
pub use report::{Report, ReportKind};
