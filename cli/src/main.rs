//! Tariff market simulation runner
//!
//! Runs the market against a simulated clock, feeding it broker commands
//! from a JSON schedule and logging everything it sends back out.
//!
//! ```sh
//! # Default config (~/.config/tariff-market/config.toml), 48 timeslots
//! tariff-market
//!
//! # Replay a command schedule for one simulated day
//! tariff-market --commands brokers.json --timeslots 24
//!
//! # Validate config without running
//! tariff-market --check
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use tracing::{error, info};

use tariff_market::config::AppConfig;
use tariff_market::domain::BrokerMessage;
use tariff_market::notifications::EventSubscriber;
use tariff_market::runtime::{init_tracing, MarketRuntime};
use tariff_market::Event;

#[derive(Parser, Debug)]
#[command(
    name = "tariff-market",
    version,
    about = "Run the tariff market against a simulated clock",
    long_about = "Tariff market simulation runner.\n\n\
                  Default config: ~/.config/tariff-market/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "TARIFF_MARKET_CONFIG")]
    config: Option<PathBuf>,

    /// Override the number of timeslots to run.
    #[arg(short, long)]
    timeslots: Option<u32>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// JSON file of broker commands, each tagged with the timeslot it arrives in.
    #[arg(long)]
    commands: Option<PathBuf>,

    /// Print Prometheus metrics when the run ends.
    #[arg(long)]
    metrics: bool,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,
}

/// One entry of the command schedule
#[derive(Debug, Deserialize)]
struct ScheduledCommand {
    timeslot: u32,
    message: BrokerMessage,
}

fn load_schedule(path: &Path) -> Result<Vec<ScheduledCommand>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let mut schedule: Vec<ScheduledCommand> = serde_json::from_str(&raw)?;
    schedule.sort_by_key(|c| c.timeslot);
    Ok(schedule)
}

fn log_events(subscriber: &mut EventSubscriber) {
    while let Some(message) = subscriber.try_recv() {
        match &message.event {
            Event::TariffStatusSent(e) => info!(
                broker = %e.broker,
                tariff_id = e.status.tariff_id,
                update_id = e.status.update_id,
                status = %e.status.status,
                message = ?e.status.message,
                "-> broker"
            ),
            Event::TariffsPublished(e) => info!(
                count = e.specifications.len(),
                ids = ?e.specifications.iter().map(|s| s.id).collect::<Vec<_>>(),
                "-> all brokers"
            ),
            Event::TariffTransactionPosted(e) => info!(
                kind = %e.kind,
                tariff_id = e.tariff_id,
                broker = %e.broker,
                charge = %e.charge,
                "-> ledger"
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(tariff_market::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(mut cfg) => {
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            info!(path = %config_path.display(), "Configuration loaded");
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new(
                    cli.log_level.as_deref().unwrap_or("info"),
                ))
                .init();
            error!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }
    };

    if let Some(timeslots) = cli.timeslots {
        info!(timeslots, "CLI override: timeslots");
        config.simulation.timeslots = timeslots;
    }

    if cli.check {
        let market = config.market.resolve();
        println!("Configuration is valid");
        println!("   Config file      : {}", config_path.display());
        println!("   Publication fee  : {}", market.tariff_publication_fee());
        println!("   Revocation fee   : {}", market.tariff_revocation_fee());
        println!("   Interval (hours) : {}", market.publication_interval());
        println!("   Base time        : {}", config.simulation.base_time);
        println!("   Timeslots        : {}", config.simulation.timeslots);
        println!("   Default tariffs  : {}", config.default_tariffs.len());
        return Ok(());
    }

    let prometheus = if cli.metrics {
        Some(metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?)
    } else {
        None
    };

    let schedule = match &cli.commands {
        Some(path) => load_schedule(path)?,
        None => Vec::new(),
    };
    info!(commands = schedule.len(), "Command schedule loaded");

    let runtime = MarketRuntime::build(&config).await?;
    let mut events = runtime.event_bus.subscribe();
    log_events(&mut events);

    let mut pending = schedule.into_iter().peekable();
    for timeslot in 0..config.simulation.timeslots {
        while let Some(command) = pending.next_if(|c| c.timeslot == timeslot) {
            runtime.deliver(command.message).await;
        }
        let time = runtime.driver.step().await;
        info!(timeslot, %time, "Timeslot complete");
        log_events(&mut events);
    }

    let skipped = pending.count();
    if skipped > 0 {
        error!(skipped, "Commands scheduled past the last timeslot were not delivered");
    }

    info!(
        transactions = runtime.ledger.transactions().len(),
        total_charged = %runtime.ledger.total_charged(),
        "Simulation finished"
    );

    if let Some(handle) = prometheus {
        println!("{}", handle.render());
    }

    Ok(())
}
