use clap::Parser;
use miette::{IntoDiagnostic, Result};
use order_lifecycle::application::coordinator::LifecycleCoordinator;
use order_lifecycle::domain::audit::ThresholdTable;
use order_lifecycle::domain::ports::{EventSinkBox, OrderStoreBox, SettingsProviderBox};
use order_lifecycle::infrastructure::in_memory::{InMemoryOrderStore, InMemorySettings};
use order_lifecycle::infrastructure::tracing_sink::TracingEventSink;
use order_lifecycle::interfaces::config::load_thresholds;
use order_lifecycle::interfaces::csv::command_reader::CommandReader;
use order_lifecycle::interfaces::csv::order_writer::OrderWriter;
use order_lifecycle::telemetry;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file
    input: PathBuf,

    /// JSON file with the audit threshold table. Defaults to L1>=0, L2>=10000, L3>=50000.
    #[arg(long)]
    thresholds: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    #[cfg(feature = "storage-rocksdb")]
    fn order_store(&self) -> Result<OrderStoreBox> {
        use order_lifecycle::infrastructure::rocksdb::RocksDBStore;

        match &self.db_path {
            Some(db_path) => {
                let store = RocksDBStore::open(db_path).into_diagnostic()?;
                Ok(Box::new(store))
            }
            None => Ok(Box::new(InMemoryOrderStore::new())),
        }
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    fn order_store(&self) -> Result<OrderStoreBox> {
        if self.db_path.is_some() {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' \
                 feature is not enabled. Falling back to In-Memory storage."
            );
        }
        Ok(Box::new(InMemoryOrderStore::new()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(&cli.log_level).into_diagnostic()?;

    let thresholds = match &cli.thresholds {
        Some(path) => load_thresholds(path).into_diagnostic()?,
        None => ThresholdTable::default(),
    };
    let settings: SettingsProviderBox = Box::new(InMemorySettings::new(thresholds));
    let events: EventSinkBox = Box::new(TracingEventSink);
    let coordinator = LifecycleCoordinator::new(cli.order_store()?, settings, events);

    // Process commands
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = coordinator.execute(command).await {
                    eprintln!("Error processing command: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }

    // Collect final state from the store
    let orders = coordinator.into_orders().await.into_diagnostic()?;

    // Output final state
    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_orders(&orders).into_diagnostic()?;

    Ok(())
}
