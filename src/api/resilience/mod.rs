//! Retry handling for platform lookups
//!
//! Lookups are retried on any failure; profile updates never go through here.

pub mod retry;

pub use retry::{RetryConfig, RetryExhausted, RetryPolicy};
