use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveTime, Utc};
use clap::{Parser, Subcommand};
use marketcal::calendars::schedule::localize;
use marketcal::calendars::time_table::parse_time;
use marketcal::calendars::{register_json, CalendarOptions, MarketCalendar, Registry};
use marketcal::time::Date;

#[derive(Parser)]
#[command(name = "mcal")]
#[command(about = "Exchange trading calendars", long_about = None)]
struct Cli {
    /// JSON calendar documents to register before running the command
    #[arg(long = "config", global = true)]
    configs: Vec<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered calendar names and aliases
    Names,

    /// Print the sessions between two dates (inclusive)
    Schedule {
        name: String,
        start: Date,
        end: Date,

        /// Override the regular open (HH:MM)
        #[arg(long, value_parser = time_arg)]
        open: Option<NaiveTime>,

        /// Override the regular close (HH:MM)
        #[arg(long, value_parser = time_arg)]
        close: Option<NaiveTime>,
    },

    /// Report whether the exchange trades on a date, or at a local time on it
    IsOpen {
        name: String,
        date: Date,

        /// Local exchange time (HH:MM)
        #[arg(long, value_parser = time_arg)]
        at: Option<NaiveTime>,
    },

    /// Print every market time on a date, with the regular time when it differs
    Times { name: String, date: Date },
}

fn time_arg(s: &str) -> std::result::Result<NaiveTime, String> {
    parse_time(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let registry = Registry::child(Registry::global());
    for path in &cli.configs {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading calendar document {}", path.display()))?;
        let names = register_json(&registry, &json)
            .with_context(|| format!("loading calendar document {}", path.display()))?;
        tracing::info!(path = %path.display(), calendars = ?names, "registered configured calendars");
    }

    match cli.cmd {
        Commands::Names => {
            for name in registry.names() {
                println!("{name}");
            }
        }
        Commands::Schedule {
            name,
            start,
            end,
            open,
            close,
        } => {
            let options = CalendarOptions {
                open_time: open,
                close_time: close,
            };
            let calendar = registry.create(&name, options)?;
            print_schedule(&calendar, start, end)?;
        }
        Commands::IsOpen { name, date, at } => {
            let calendar = registry.create(&name, CalendarOptions::default())?;
            let open = match (calendar.session(date)?, at) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(session), Some(time)) => {
                    let instant = localize(calendar.timezone(), date, time)?;
                    session.contains(instant.with_timezone(&Utc))
                }
            };
            println!("{}", if open { "open" } else { "closed" });
        }
        Commands::Times { name, date } => {
            let calendar = registry.create(&name, CalendarOptions::default())?;
            print_times(&calendar, date)?;
        }
    }
    Ok(())
}

fn print_schedule(calendar: &MarketCalendar, start: Date, end: Date) -> Result<()> {
    let schedule = calendar.schedule(start, end)?;
    for session in &schedule {
        let mut flags = Vec::new();
        if session.is_late_open() {
            flags.push("late open");
        }
        if session.is_early_close() {
            flags.push("early close");
        }
        println!(
            "{}  {}  {}  {}",
            session.date(),
            session.market_open().to_rfc3339(),
            session.market_close().to_rfc3339(),
            flags.join(", ")
        );
    }
    Ok(())
}

fn print_times(calendar: &MarketCalendar, date: Date) -> Result<()> {
    let definition = calendar.definition();
    if !calendar.is_trading_day(date) {
        println!("{} is not a trading day on {date}", definition.name());
        return Ok(());
    }
    for market_time in definition.market_times() {
        let time = calendar.time_on(market_time, date)?;
        let regular = calendar.regular_time(market_time, date)?;
        if time == regular {
            println!("{market_time:<14} {time}");
        } else {
            println!("{market_time:<14} {time} (regular {regular})");
        }
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
