//! MacroDash Runner: ingestion runs, the read-path resolver and store status.
//!
//! This crate builds on `macrodash-core` to provide:
//! - TOML configuration with defaults for every section
//! - Live adapter wiring (FRED key from the environment, shared HTTP client)
//! - The ingestion orchestrator (`--full` / `--update`, optional worker pool)
//! - The resolver that serves long periods from the store and short ones live
//! - The `--status` report

pub mod config;
pub mod ingest;
pub mod progress;
pub mod resolver;
pub mod sources;
pub mod status;

pub use config::{ConfigError, DashConfig};
pub use ingest::{
    run_ingest, IngestMode, IngestOptions, OutcomeKind, RunState, RunSummary, TargetOutcome,
};
pub use progress::{IngestProgress, LogProgress, SilentProgress};
pub use resolver::{Resolution, Resolver};
pub use sources::live_adapters;
pub use status::StatusReport;
