//! Domain types and ports: payment records, the transition table, events,
//! and the storage and event-sink traits the application layer depends on.

pub mod event;
pub mod money;
pub mod payment;
pub mod ports;
pub mod state_machine;
