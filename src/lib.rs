pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod idempotency;
pub mod logging;
pub mod observability;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod types;

// Application use cases and their infrastructure adapters
pub mod app;
pub mod infra;
