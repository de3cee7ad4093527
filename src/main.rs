use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payment_core::application::service::PaymentService;
use payment_core::config::PaymentConfig;
use payment_core::domain::money::Currency;
use payment_core::domain::ports::PaymentStoreBox;
use payment_core::infrastructure::broadcast::BroadcastEventSink;
use payment_core::infrastructure::in_memory::InMemoryPaymentStore;
#[cfg(feature = "storage-rocksdb")]
use payment_core::infrastructure::rocksdb::RocksDBStore;
use payment_core::interfaces::csv::command_reader::{CommandReader, PaymentCommand};
use payment_core::interfaces::csv::record_writer::RecordWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input CSV of payment commands (create / transition)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Currency for payments that do not name one
    #[arg(long, default_value = Currency::KRW)]
    currency: String,
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(cli: &Cli) -> Result<PaymentStoreBox> {
    match &cli.db_path {
        Some(db_path) => {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        None => Ok(Box::new(InMemoryPaymentStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(cli: &Cli) -> Result<PaymentStoreBox> {
    if cli.db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(Box::new(InMemoryPaymentStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let config = PaymentConfig {
        default_currency: Currency::new(&cli.currency).into_diagnostic()?,
        ..PaymentConfig::default()
    };

    let sink = BroadcastEventSink::new(config.event_capacity);
    let mut events = sink.subscribe();
    let listener = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(envelope) => tracing::info!(
                    event_id = %envelope.id,
                    event_type = envelope.event.event_type(),
                    transaction_id = envelope.event.transaction_id(),
                    "payment event"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event listener lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let service = PaymentService::new(open_store(&cli)?, Box::new(sink), &config);

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        let result = match command {
            Ok(PaymentCommand::Create(new)) => service.create_payment(new).await.map(|_| ()),
            Ok(PaymentCommand::Transition {
                transaction_id,
                to,
                fields,
            }) => service
                .transition(&transaction_id, to, fields)
                .await
                .map(|_| ()),
            Err(e) => {
                tracing::warn!("Error reading command: {}", e);
                continue;
            }
        };
        if let Err(e) = result {
            tracing::warn!("Error processing command: {}", e);
        }
    }

    let records = service.all_payments().await.into_diagnostic()?;
    drop(service);
    listener.await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = RecordWriter::new(stdout.lock());
    writer.write_records(&records).into_diagnostic()?;

    Ok(())
}
