use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use aml_dashboard::alerts::summary::{open_count, recent_activity, tier_breakdown};
use aml_dashboard::alerts::{self, AlertFilter, RiskFilter};
use aml_dashboard::api::{self, AppState};
use aml_dashboard::client::{BackendClient, ClientError, ClientOptions};
use aml_dashboard::config::Config;
use aml_dashboard::investigation::Investigator;
use aml_dashboard::jobs::{self, JobOutcome, JobPoller};
use aml_dashboard::sar;
use aml_dashboard::session::{FileSessionStore, Session};

#[derive(Parser)]
#[command(name = "aml-dashboard", about = "AML alert triage and investigation client")]
struct Cli {
    /// Path to the dashboard configuration file
    #[arg(long, short, env = "AML_DASHBOARD_CONFIG", default_value = "dashboard.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with username and password
    Login {
        username: String,
        #[arg(long, env = "AML_DASHBOARD_PASSWORD")]
        password: String,
    },
    /// Create an account and log in
    Signup {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "AML_DASHBOARD_PASSWORD")]
        password: String,
    },
    /// Log in with a Google ID token
    GoogleLogin { id_token: String },
    /// Refresh the access token
    Refresh,
    /// Clear stored credentials
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List alerts
    Alerts {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        risk: RiskFilter,
        /// Status slug: open, under-review, closed
        #[arg(long)]
        status: Option<String>,
        /// Typology label, e.g. "Money Mule"
        #[arg(long)]
        typology: Option<String>,
    },
    /// Show overview statistics
    Stats,
    /// Change an alert's status
    SetStatus { alert: String, status: String },
    /// Upload a transaction file for background analysis
    Upload {
        file: PathBuf,
        /// Return once the upload is accepted instead of waiting for the result
        #[arg(long)]
        no_wait: bool,
    },
    /// Build the deep-analysis view for an alert (case reference or id)
    Investigate { alert: Option<String> },
    /// Generate and save a SAR report for an alert
    Sar {
        alert: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Serve the dashboard API for a renderer
    Serve,
}

impl Command {
    /// Commands that establish a session rather than use one.
    fn authenticates(&self) -> bool {
        matches!(self, Self::Login { .. } | Self::Signup { .. } | Self::GoogleLogin { .. })
    }
}

/// A rejected credential on a command that relied on the stored session.
/// Failed logins only report their error and leave the stored session alone.
fn session_expired(authenticating: bool, err: &eyre::Report) -> bool {
    !authenticating
        && err
            .downcast_ref::<ClientError>()
            .is_some_and(ClientError::is_unauthorized)
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=debug for more output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    tracing::debug!(
        backend = %config.backend.base_url,
        "Configuration loaded from {}",
        cli.config
    );

    let store = Arc::new(FileSessionStore::new(config.session.path.clone()));
    let session = Arc::new(Session::init(store)?);
    let client = BackendClient::new(
        ClientOptions::from_config(&config.backend).with_token_provider(session.clone()),
    )?;

    let authenticating = cli.command.authenticates();
    let result = run(cli.command, &config, &client, &session).await;

    if let Err(e) = &result {
        if session_expired(authenticating, e) {
            tracing::warn!("Session expired. Please login again.");
            session.logout()?;
        }
    }

    session.teardown()?;
    result
}

async fn run(
    command: Command,
    config: &Config,
    client: &BackendClient,
    session: &Arc<Session>,
) -> eyre::Result<()> {
    match command {
        Command::Login { username, password } => {
            let user = session.login(client, &username, &password).await?;
            println!("Logged in as {}", user.username);
        }
        Command::Signup {
            username,
            email,
            password,
        } => {
            let user = session.signup(client, &username, &password, &email).await?;
            println!("Account created, logged in as {}", user.username);
        }
        Command::GoogleLogin { id_token } => {
            let user = session.google_login(client, &id_token).await?;
            println!("Logged in as {}", user.username);
        }
        Command::Refresh => {
            session.refresh(client).await?;
            println!("Access token refreshed");
        }
        Command::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Command::Whoami => match session.user() {
            Some(user) => println!(
                "{}{}",
                user.username,
                user.email.map(|e| format!(" <{}>", e)).unwrap_or_default()
            ),
            None => println!("Not logged in"),
        },
        Command::Alerts {
            search,
            risk,
            status,
            typology,
        } => {
            let filter = AlertFilter {
                search,
                risk,
                status,
                typology,
            };
            let all = client.list_alerts().await?;
            let shown = filter.apply(&all);
            for alert in &shown {
                println!(
                    "{:>5}  {:<28} {:<12} {:<24} {:>3}  {:<13} {}",
                    alert.id,
                    alert.alert_id,
                    alert.account_id,
                    alert.account_name,
                    alert.risk_score,
                    alert.status,
                    alert.alert_type
                );
            }
            println!(
                "{} of {} alerts shown, {} open",
                shown.len(),
                all.len(),
                open_count(shown.iter().copied())
            );
        }
        Command::Stats => {
            let (stats, alerts) = tokio::join!(client.alert_stats(), client.list_alerts());
            let (stats, alerts) = (stats?, alerts?);
            println!("Critical alerts:    {}", stats.critical_alerts);
            println!("Flagged accounts:   {}", stats.flagged_accounts);
            println!("Suspicious volume:  {}", stats.suspicious_volume);
            println!("Detection rate:     {}", stats.detection_rate);
            println!(
                "Totals:             {} accounts, {} transactions, {} alerts",
                stats.summary.total_accounts,
                stats.summary.total_transactions,
                stats.summary.total_alerts
            );
            for tier in tier_breakdown(&alerts) {
                println!("  {:<15} {:>5}  {:>5.1}%", tier.label, tier.count, tier.percent);
            }
            for entry in recent_activity(&alerts) {
                println!(
                    "  [{}] {} {} {} ({})",
                    entry.time.unwrap_or_default(),
                    entry.account,
                    entry.alert_type,
                    entry.amount,
                    entry.risk
                );
            }
        }
        Command::SetStatus { alert, status } => {
            let all = client.list_alerts().await?;
            let target = alerts::filter::find(&all, &alert)
                .ok_or_else(|| eyre::eyre!("Alert '{}' not found", alert))?;
            client.update_alert_status(target.id, &status).await?;
            if status == "Closed" {
                println!("Case {} closed.", target.alert_id);
            } else {
                println!("Status updated to {}", status);
            }
        }
        Command::Upload { file, no_wait } => {
            let upload = jobs::start_analysis(client, session, &file).await?;
            println!("Analysis started in background (task {})", upload.task_id);
            if no_wait {
                return Ok(());
            }

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            let poller = JobPoller::new(
                client.clone(),
                Duration::from_millis(config.polling.interval_ms),
            );
            let outcome = poller
                .run(&upload.task_id, cancel, |status| {
                    println!(
                        "  {:>3}%  {}/{} records  ({})",
                        status.progress,
                        status.processed_records,
                        status.total_records,
                        status.status.as_str()
                    );
                })
                .await;

            match outcome {
                JobOutcome::Completed(_) => println!("Analysis complete! Dashboard updated."),
                JobOutcome::Failed { error, .. } => {
                    return Err(eyre::eyre!("Analysis failed: {}", error));
                }
                JobOutcome::Cancelled => println!(
                    "Stopped waiting; task {} continues on the server",
                    upload.task_id
                ),
            }
        }
        Command::Investigate { alert } => {
            let investigator = Investigator::new(client.clone(), session.clone());
            let ctx = match alert {
                Some(key) => {
                    let all = client.list_alerts().await?;
                    let target = alerts::filter::find(&all, &key)
                        .cloned()
                        .ok_or_else(|| eyre::eyre!("Alert '{}' not found", key))?;
                    investigator.investigate(target).await
                }
                None => investigator
                    .resume()
                    .await
                    .ok_or_else(|| eyre::eyre!("No alert has been investigated yet"))?,
            };
            println!("{}", serde_json::to_string_pretty(&ctx)?);
        }
        Command::Sar { alert, out } => {
            let all = client.list_alerts().await?;
            let target = alerts::filter::find(&all, &alert)
                .ok_or_else(|| eyre::eyre!("Alert '{}' not found", alert))?;
            let report = sar::generate(client, target).await?;
            let dir = out.unwrap_or_else(|| config.reports.output_dir.clone());
            let path = sar::download(&report, &target.account_id, &dir)?;
            println!("{}", report);
            println!("Saved to {}", path.display());
        }
        Command::Serve => {
            let state = AppState::new(client.clone(), session.clone());
            let serve = api::serve(state, &config.api.host, config.api.port);
            tokio::select! {
                result = serve => result?,
                _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown signal received"),
            }
        }
    }
    Ok(())
}
