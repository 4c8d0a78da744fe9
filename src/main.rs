use clap::{Parser, ValueEnum};
use cred_report::{Config, ReportKind};
use mimalloc::MiMalloc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Issued-credential reports for the issuer agent database.
#[derive(Parser, Debug)]
#[command(name = "cred-report", version)]
struct Args {
    /// Report to produce
    #[arg(value_enum, default_value_t = ReportArg::LastMonth)]
    report: ReportArg,

    /// Window length for the `last-days` report
    #[arg(long, default_value_t = 30)]
    days: u32,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ReportArg {
    /// Credentials issued in the previous calendar month
    LastMonth,
    /// Credentials issued in the last N days
    LastDays,
    /// Per-token counts for the previous month and all time
    Tokens,
}

impl Args {
    fn kind(&self) -> ReportKind {
        match self.report {
            ReportArg::LastMonth => ReportKind::LastMonth,
            ReportArg::LastDays => ReportKind::LastDays(self.days),
            ReportArg::Tokens => ReportKind::TokenSummary,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("✗ {e}");
            std::process::exit(e.exit_code());
        }
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(config = ?cfg, report = ?args.report, "starting credential report");

    let mut stdout = std::io::stdout().lock();
    let now = chrono::Utc::now();
    if let Err(e) = cred_report::report::execute(&cfg, args.kind(), now, &mut stdout).await {
        error!(error = %e, "report failed");
        eprintln!("✗ {e}");
        std::process::exit(e.exit_code());
    }
}
