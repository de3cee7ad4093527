use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

const HEADER: [&str; 7] = [
    "transaction_id",
    "order_id",
    "status",
    "amount",
    "paid_amount",
    "currency",
    "source_service",
];

#[derive(Debug, Serialize)]
struct RecordRow<'a> {
    transaction_id: &'a str,
    order_id: &'a str,
    status: PaymentStatus,
    amount: Decimal,
    paid_amount: Decimal,
    currency: &'a str,
    source_service: &'a str,
}

impl<'a> From<&'a PaymentRecord> for RecordRow<'a> {
    fn from(record: &'a PaymentRecord) -> Self {
        Self {
            transaction_id: &record.transaction_id,
            order_id: &record.order_id,
            status: record.status(),
            amount: record.amount.value().normalize(),
            paid_amount: record.paid_amount.normalize(),
            currency: record.currency.code(),
            source_service: &record.source_service,
        }
    }
}

/// Writes the final state of payment records as CSV.
///
/// The header row is always written, even when there are no records.
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
        }
    }

    pub fn write_records<'a>(&mut self, records: impl IntoIterator<Item = &'a PaymentRecord>) -> Result<()> {
        self.writer.write_record(HEADER)?;
        for record in records {
            self.writer.serialize(RecordRow::from(record))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
