#![allow(dead_code)]

use payment_core::application::service::PaymentService;
use payment_core::config::PaymentConfig;
use payment_core::domain::payment::NewPayment;
use payment_core::infrastructure::in_memory::{InMemoryPaymentStore, RecordingEventSink};
use rust_decimal_macros::dec;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 8] = [
    "action",
    "transaction_id",
    "order_id",
    "amount",
    "source_service",
    "status",
    "payment_key",
    "reason",
];

pub fn service() -> (PaymentService, RecordingEventSink) {
    let sink = RecordingEventSink::new();
    let service = PaymentService::new(
        Box::new(InMemoryPaymentStore::new()),
        Box::new(sink.clone()),
        &PaymentConfig::default(),
    );
    (service, sink)
}

pub fn glycopharm_payment(transaction_id: &str) -> NewPayment {
    NewPayment::new(transaction_id, "order-1", dec!(10000), "glycopharm")
}

/// Writes a command log where every payment is created, confirmed and paid.
pub fn generate_paid_commands(path: &Path, payments: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(HEADER)?;

    for i in 1..=payments {
        let tx = format!("tx-{i}");
        let order = format!("order-{i}");
        let key = format!("pk-{i}");
        wtr.write_record(["create", tx.as_str(), order.as_str(), "1000", "glycopharm", "", "", ""])?;
        wtr.write_record(["transition", tx.as_str(), "", "", "", "CONFIRMING", "", ""])?;
        wtr.write_record(["transition", tx.as_str(), "", "", "", "PAID", key.as_str(), ""])?;
    }

    wtr.flush()?;
    Ok(())
}
