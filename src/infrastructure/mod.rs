//! Storage and event-sink adapters for the domain ports.

pub mod broadcast;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
