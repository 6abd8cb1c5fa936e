mod config;
mod days;
mod models;
mod report;
mod storage;
mod store;
mod tui;
mod utils;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use fd_lock::RwLock;
use models::{Event, Repeat, TimeOfDay};
use report::Agenda;
use std::fs::OpenOptions;
use storage::Storage;
use store::EventStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pocketcal")]
#[command(about = "A month-grid calendar for the terminal with local event storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive month view
    Open {
        /// Day to select initially (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print upcoming events
    Agenda {
        /// First day to include (YYYY-MM-DD), defaults to today
        #[arg(long)]
        from: Option<NaiveDate>,
    },
    /// Add an event without opening the calendar
    Add {
        /// Event title
        title: String,
        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Start time (HH:MM)
        #[arg(long)]
        start: Option<TimeOfDay>,
        /// End time (HH:MM)
        #[arg(long)]
        end: Option<TimeOfDay>,
        /// Repeat cadence
        #[arg(long, value_enum, default_value_t = Repeat::None)]
        repeat: Repeat,
    },
    /// Remove an event by id (ids are shown in the agenda)
    Remove { id: String },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = config::load_config()?;
    let storage = Storage::new()?;

    match cli.command.unwrap_or(Commands::Open { date: None }) {
        Commands::Open { date } => {
            let base_dir = Storage::get_base_dir()?;
            let lock_path = base_dir.join("pocketcal.lock");
            let lock_file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(lock_path)?;

            let mut lock = RwLock::new(lock_file);
            let _guard = lock.try_write().map_err(|_| {
                anyhow::anyhow!(
                    "Another Pocketcal session is already open. Close it before starting a new one."
                )
            })?;

            let mut store = EventStore::load(storage);
            let start = date.unwrap_or_else(|| Local::now().date_naive());
            tui::run_tui(&mut store, &config, start)?;
        }
        Commands::Agenda { from } => {
            let store = EventStore::load(storage);
            let from = from.unwrap_or_else(|| Local::now().date_naive());
            Agenda::new(&store).print(from);
        }
        Commands::Add {
            title,
            date,
            start,
            end,
            repeat,
        } => {
            let mut store = EventStore::load(storage);
            let start = start.unwrap_or(config.default_start_time);
            let end = end.unwrap_or(config.default_end_time);
            let event = Event::new(title, date, start, end, repeat);
            let id = event.id.clone();
            store.save(event)?;
            println!("Added event {} on {}.", id, date);
        }
        Commands::Remove { id } => {
            let mut store = EventStore::load(storage);
            let before = store.events().len();
            let after = store.delete(&id)?.len();
            if after == before {
                println!("No event with id {}.", id);
            } else {
                println!("Removed event {}.", id);
            }
        }
    }

    Ok(())
}
