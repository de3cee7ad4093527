use crate::domain::money::Currency;
use crate::domain::payment::{NewPayment, PaymentStatus, TransitionFields};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandAction {
    Create,
    Transition,
}

/// One raw row of a payment command log.
///
/// The last four columns are optional and may be left off entirely.
/// `status` is kept as text and parsed case-insensitively.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRow {
    pub action: CommandAction,
    pub transaction_id: String,
    pub order_id: Option<String>,
    pub amount: Option<Decimal>,
    pub source_service: Option<String>,
    pub status: Option<String>,
    pub payment_key: Option<String>,
    pub reason: Option<String>,
    pub currency: Option<Currency>,
    pub payment_method: Option<String>,
    pub paid_amount: Option<Decimal>,
    pub failure_code: Option<String>,
}

/// A validated command ready to be applied to a `PaymentService`.
#[derive(Debug, PartialEq, Clone)]
pub enum PaymentCommand {
    Create(NewPayment),
    Transition {
        transaction_id: String,
        to: PaymentStatus,
        fields: TransitionFields,
    },
}

fn required<T>(value: Option<T>, column: &str, transaction_id: &str) -> Result<T> {
    value.ok_or_else(|| {
        PaymentError::ValidationError(format!(
            "Missing {column} for transaction {transaction_id}"
        ))
    })
}

impl TryFrom<CommandRow> for PaymentCommand {
    type Error = PaymentError;

    fn try_from(row: CommandRow) -> Result<Self> {
        let tx = row.transaction_id;
        match row.action {
            CommandAction::Create => {
                let order_id = required(row.order_id, "order_id", &tx)?;
                let amount = required(row.amount, "amount", &tx)?;
                let source_service = required(row.source_service, "source_service", &tx)?;
                let mut new = NewPayment::new(tx, order_id, amount, source_service);
                new.currency = row.currency;
                new.payment_method = row.payment_method;
                Ok(PaymentCommand::Create(new))
            }
            CommandAction::Transition => {
                let to: PaymentStatus = required(row.status, "status", &tx)?.parse()?;
                let fields = TransitionFields {
                    payment_key: row.payment_key,
                    paid_amount: row.paid_amount,
                    payment_method: row.payment_method,
                    failure_code: row.failure_code,
                    failure_reason: row.reason,
                    ..TransitionFields::default()
                };
                Ok(PaymentCommand::Transition {
                    transaction_id: tx,
                    to,
                    fields,
                })
            }
        }
    }
}

/// Reads payment commands from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// so trailing optional columns may be left off.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads, deserializes and validates commands.
    pub fn commands(self) -> impl Iterator<Item = Result<PaymentCommand>> {
        self.reader
            .into_deserialize::<CommandRow>()
            .map(|row| row.map_err(PaymentError::from).and_then(PaymentCommand::try_from))
    }
}
