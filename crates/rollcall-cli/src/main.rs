//! Rollcall command line.
//!
//! # Usage
//!
//! ```bash
//! # List events against a local service
//! rollcall events
//!
//! # Join as a registered user
//! ROLLCALL_PASSWORD=secret rollcall --email ann@example.com join 12
//!
//! # Follow live counts, offline against a seeded in-process service
//! rollcall --simulate --guest watch
//! ```

use std::{io, time::Duration};

use clap::Parser;
use rollcall_cli::{Command, Credentials, run, simulation};
use rollcall_client::{ClientConfig, DEFAULT_BASE_URL, HttpBackend, PushChannel, ViewingSession};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Rollcall event attendance client
#[derive(Parser, Debug)]
#[command(name = "rollcall")]
#[command(about = "Browse and join events with live attendee counts")]
#[command(version)]
struct Args {
    /// Base URL of the event service
    #[arg(short, long, default_value = DEFAULT_BASE_URL)]
    server: String,

    /// Push channel URL (defaults to the server URL with a ws scheme)
    #[arg(long)]
    push: Option<String>,

    /// Per-request timeout in seconds, 0 to wait indefinitely
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Run against an in-process service seeded with sample data
    #[arg(long)]
    simulate: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(flatten)]
    credentials: Credentials,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    fn config(&self) -> ClientConfig {
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        let config = ClientConfig::new(self.server.as_str()).with_request_timeout(timeout);
        match &self.push {
            Some(push) => config.with_push_url(push.as_str()),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let config = args.config();
    let mut out = io::stdout();

    if args.simulate {
        tracing::info!("running against simulated service");
        let service = simulation::seeded_service();
        let backend = service.connect_viewer();
        let mut session = ViewingSession::new(backend.clone(), &config);
        session.attach_push(PushChannel::from_receiver(backend.subscribe()));
        run(&mut session, &args.credentials, &args.command, &mut out).await?;
        session.close();
        return Ok(());
    }

    tracing::info!(server = %config.base_url, "connecting");
    let backend = HttpBackend::new(&config)?;
    let mut session = ViewingSession::new(backend, &config);
    if args.command.needs_push() {
        session.connect_push(&config.push_url).await?;
    }
    run(&mut session, &args.credentials, &args.command, &mut out).await?;
    session.close();

    Ok(())
}
