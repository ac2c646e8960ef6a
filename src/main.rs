use arcade_ledger::application::ledger::{Ledger, LocationFilter};
use arcade_ledger::config::LedgerConfig;
use arcade_ledger::domain::category::MachineCategory;
use arcade_ledger::domain::collection::Collection;
use arcade_ledger::domain::location::{CategoryPrices, Location, LocationPatch, NewLocation};
use arcade_ledger::domain::machine::{Machine, NewMachine};
use arcade_ledger::domain::money::TokenPrice;
use arcade_ledger::domain::record::RecordId;
use arcade_ledger::infrastructure::in_memory::InMemoryRecordStore;
use arcade_ledger::interfaces::csv::collection_writer::CollectionWriter;
use arcade_ledger::interfaces::csv::location_writer::LocationWriter;
use arcade_ledger::interfaces::csv::machine_writer::MachineWriter;
use arcade_ledger::interfaces::csv::stats_writer::StatsWriter;
use arcade_ledger::interfaces::csv::token_reader::TokenCountReader;
use arcade_ledger::interfaces::voucher::{render_voucher, whatsapp_share_url};
use chrono::{DateTime, FixedOffset, Local, Utc};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pricing configuration (TOML). Built-in defaults when omitted.
    #[arg(long, env = "ARCADE_LEDGER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// JSON catalog (locations, machines, collections) loaded into in-memory storage.
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current token price of a machine and where it comes from
    Price { machine: String },
    /// Settle a location from a `machine,tokens` CSV and print the voucher
    Settle {
        location: String,
        tokens: PathBuf,
        /// Compute and print without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a WhatsApp link carrying the voucher of a settlement
    Share { location: String, tokens: PathBuf },
    /// Operator-share totals for today, this week, this month and overall
    Stats {
        /// Reference time (RFC 3339). Defaults to the local clock.
        #[arg(long)]
        now: Option<DateTime<FixedOffset>>,
    },
    /// Collection history as CSV, newest first
    History {
        #[arg(long)]
        location: Option<String>,
    },
    /// List locations
    Locations {
        /// Include inactive locations
        #[arg(long)]
        all: bool,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        city: Option<String>,
        /// Only locations hosting a machine of this category
        #[arg(long)]
        category: Option<MachineCategory>,
    },
    /// Distinct cities of all locations
    Cities,
    /// List machines with their current price
    Machines {
        #[arg(long)]
        location: Option<String>,
    },
    AddLocation {
        name: String,
        address: String,
        city: String,
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        price_metegol: Option<Decimal>,
        #[arg(long)]
        price_pinball: Option<Decimal>,
        #[arg(long)]
        price_volante: Option<Decimal>,
        #[arg(long)]
        inactive: bool,
    },
    DeactivateLocation { id: String },
    DeleteLocation { id: String },
    AddMachine {
        #[arg(long)]
        category: MachineCategory,
        #[arg(long)]
        location: String,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        name: Option<String>,
    },
    DeleteMachine { id: String },
    /// Delete a collection record
    Void { id: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Catalog {
    locations: Vec<Location>,
    machines: Vec<Machine>,
    collections: Vec<Collection>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            serde_json::from_reader(file).into_diagnostic()
        }
        None => Ok(Catalog::default()),
    }
}

fn open_ledger(cli: &Cli, config: LedgerConfig) -> Result<Ledger> {
    if let Some(db_path) = &cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            use arcade_ledger::infrastructure::rocksdb::RocksDBStore;

            if cli.seed.is_some() {
                warn!("--seed is ignored when --db-path is given");
            }
            let store = RocksDBStore::open(db_path)?;
            return Ok(Ledger::new(
                config,
                Box::new(store.locations()?),
                Box::new(store.machines()?),
                Box::new(store.collections()?),
            ));
        }

        #[cfg(not(feature = "storage-rocksdb"))]
        warn!(
            path = %db_path.display(),
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }

    let catalog = load_catalog(cli.seed.as_deref())?;
    Ok(Ledger::new(
        config,
        Box::new(InMemoryRecordStore::with_records(catalog.locations)),
        Box::new(InMemoryRecordStore::with_records(catalog.machines)),
        Box::new(InMemoryRecordStore::with_records(catalog.collections)),
    ))
}

fn price_override(value: Option<Decimal>) -> Result<Option<TokenPrice>> {
    value.map(TokenPrice::new).transpose().map_err(Into::into)
}

fn settlement_location(ledger: &Ledger, id: &RecordId) -> Result<Location> {
    let location = ledger
        .location(id)
        .ok_or_else(|| miette!("location '{}' not found", id))?;
    if !location.is_active() {
        return Err(miette!("location '{}' is inactive", location.name()));
    }
    Ok(location)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LedgerConfig::load(path)?,
        None => LedgerConfig::default(),
    };
    let ledger = open_ledger(&cli, config)?;

    match cli.command {
        Command::Price { machine } => {
            let id = RecordId::new(machine);
            let resolved = ledger
                .price_for(&id)
                .ok_or_else(|| miette!("machine '{}' not found", id))?;
            println!("{}: {} ({})", id, resolved.price, resolved.source);
        }
        Command::Settle {
            location,
            tokens,
            dry_run,
        } => {
            let location = settlement_location(&ledger, &RecordId::new(location))?;
            let inputs = TokenCountReader::new(File::open(tokens).into_diagnostic()?)
                .read_inputs()?;
            let now = Utc::now();
            let batch = ledger.calculate(&location.id, &inputs, now)?;
            print!(
                "{}",
                render_voucher(
                    &batch,
                    location.name(),
                    &ledger.machines(),
                    ledger.config(),
                    now.with_timezone(&Local).date_naive(),
                )
            );
            if !dry_run {
                let ids = ledger.settle(&batch).await?;
                eprintln!("Saved {} collection records", ids.len());
            }
        }
        Command::Share { location, tokens } => {
            let location = settlement_location(&ledger, &RecordId::new(location))?;
            let inputs = TokenCountReader::new(File::open(tokens).into_diagnostic()?)
                .read_inputs()?;
            let now = Utc::now();
            let batch = ledger.calculate(&location.id, &inputs, now)?;
            let text = render_voucher(
                &batch,
                location.name(),
                &ledger.machines(),
                ledger.config(),
                now.with_timezone(&Local).date_naive(),
            );
            println!("{}", whatsapp_share_url(&location, &text)?);
        }
        Command::Stats { now } => {
            let stats = match now {
                Some(now) => ledger.dashboard(&now),
                None => ledger.dashboard(&Local::now()),
            };
            StatsWriter::new(io::stdout().lock()).write_stats(&stats, &ledger.summary())?;
        }
        Command::History { location } => {
            let filter = location.map(RecordId::new);
            let entries = ledger.history(filter.as_ref());
            CollectionWriter::new(io::stdout().lock()).write_history(&entries)?;
        }
        Command::Locations {
            all,
            search,
            city,
            category,
        } => {
            let filter = LocationFilter {
                term: search.unwrap_or_default(),
                city,
                category,
                include_inactive: all,
            };
            LocationWriter::new(io::stdout().lock())
                .write_locations(&ledger.find_locations(&filter))?;
        }
        Command::Cities => {
            for city in ledger.cities() {
                println!("{}", city);
            }
        }
        Command::Machines { location } => {
            let location = location.map(RecordId::new);
            MachineWriter::new(io::stdout().lock())
                .write_machines(&ledger.machine_listing(location.as_ref()))?;
        }
        Command::AddLocation {
            name,
            address,
            city,
            contact,
            phone,
            price_metegol,
            price_pinball,
            price_volante,
            inactive,
        } => {
            let location = NewLocation {
                name,
                address,
                city,
                contact_name: contact,
                phone_number: phone.filter(|p| !p.trim().is_empty()),
                prices: CategoryPrices {
                    metegol: price_override(price_metegol)?,
                    pinball: price_override(price_pinball)?,
                    volante: price_override(price_volante)?,
                },
                is_active: !inactive,
            };
            println!("{}", ledger.add_location(location).await?);
        }
        Command::DeactivateLocation { id } => {
            ledger
                .update_location(&RecordId::new(id), LocationPatch::deactivate())
                .await?;
        }
        Command::DeleteLocation { id } => {
            ledger.delete_location(&RecordId::new(id)).await?;
        }
        Command::AddMachine {
            category,
            location,
            price,
            name,
        } => {
            let machine = NewMachine {
                name,
                category,
                location_id: RecordId::new(location),
                token_price: price_override(price)?,
            };
            println!("{}", ledger.add_machine(machine).await?);
        }
        Command::DeleteMachine { id } => {
            ledger.delete_machine(&RecordId::new(id)).await?;
        }
        Command::Void { id } => {
            ledger.delete_collection(&RecordId::new(id)).await?;
        }
    }

    Ok(())
}
