//! Application layer containing the payment lifecycle orchestration.
//!
//! `PaymentService` is the primary entry point. It validates transitions via
//! the repository, which persists with an optimistic version check, and
//! hands committed changes to the event publisher.

pub mod publisher;
pub mod repository;
pub mod service;
pub mod summary;
