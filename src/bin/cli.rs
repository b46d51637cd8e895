//! varstore CLI
//!
//! Command-line front-end over a store of named counters.

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use varstore::{Engine, LockMode, NameCounter, StoreConfig};

/// varstore CLI
#[derive(Parser, Debug)]
#[command(name = "varstore-cli")]
#[command(about = "Inspect and edit a sorted name/counter store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./varstore_data")]
    data_dir: String,

    /// Store name (files are <name>.idx and <name>.dat)
    #[arg(short, long, default_value = "counters")]
    name: String,

    /// Relocation block size in bytes
    #[arg(short, long, default_value = "8192")]
    block_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add to a counter, creating it at zero first if needed
    Bump {
        /// Counter name
        name: String,

        /// Amount to add
        #[arg(long, default_value = "1", allow_negative_numbers = true)]
        by: i32,
    },

    /// Set a counter to a value
    Set {
        /// Counter name
        name: String,

        /// New value
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },

    /// Print a counter
    Get {
        /// Counter name
        name: String,
    },

    /// Print all counters in name order
    List,

    /// Delete a counter
    Remove {
        /// Counter name
        name: String,
    },

    /// Print record count and storage size
    Size,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,varstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> varstore::Result<()> {
    let config = StoreConfig::builder()
        .dir(&args.data_dir, &args.name)
        .block_size(args.block_size)
        .build();

    let mut engine: Engine<NameCounter, _> = Engine::open(config, NameCounter::read_at)?;

    match args.command {
        Commands::Bump { name, by } => {
            let value = engine.with_lock(LockMode::Exclusive, |engine| {
                let probe = NameCounter::new(name.as_str(), 0);
                let mut record = match engine.index_of(&probe)? {
                    Some(i) => engine.get(i)?,
                    None => probe,
                };
                let value = record.increment(by);
                engine.save(&record)?;
                Ok(value)
            })?;
            println!("{} = {}", name, value);
        }
        Commands::Set { name, value } => {
            engine.with_lock(LockMode::Exclusive, |engine| {
                engine.save(&NameCounter::new(name.as_str(), value))
            })?;
            println!("{} = {}", name, value);
        }
        Commands::Get { name } => {
            let found = engine.with_lock(LockMode::Shared, |engine| {
                match engine.index_of(&NameCounter::new(name.as_str(), 0))? {
                    Some(i) => engine.get(i).map(Some),
                    None => Ok(None),
                }
            })?;
            match found {
                Some(record) => println!("{} = {}", record.name(), record.counter()),
                None => println!("(not found)"),
            }
        }
        Commands::List => {
            let records = engine.with_lock(LockMode::Shared, |engine| engine.to_list())?;
            for record in records {
                println!("{} = {}", record.name(), record.counter());
            }
        }
        Commands::Remove { name } => {
            let removed = engine.with_lock(LockMode::Exclusive, |engine| {
                engine.remove_record(&NameCounter::new(name.as_str(), 0))
            })?;
            println!("{}", if removed { "removed" } else { "(not found)" });
        }
        Commands::Size => {
            engine.with_lock(LockMode::Shared, |_| Ok(()))?;
            println!("records: {}", engine.len());
            println!("size:    {} ({} bytes)", engine.readable_size(), engine.storage_size());
        }
    }

    engine.close()
}
