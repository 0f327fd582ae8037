//! Core types and configuration for the Basel III liquidity engine.
//!
//! This crate provides shared types used across all other crates:
//! - Statement and mapping types (raw line items, Basel categories, buckets)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
