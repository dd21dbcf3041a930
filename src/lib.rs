//! Amazon PPC bid optimization.
//!
//! Classifies zero-sale targets as promising and recommends ACOS-driven
//! bids for keyword and product targets, behind an HTTP upload/download
//! API and a command-line front end.

pub mod ads;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod optimizer;
pub mod report;
pub mod server;

pub use config::Config;
pub use error::{AdsError, ConfigError, IngestError, ServerError, ValidationError};
pub use optimizer::{BidOptimizer, BidPolicy, OptimizationConfig, Target};
