//! # SemRec Common Library
//!
//! Shared code for the SemRec recommender crates:
//! - Error type
//! - TOML configuration model and config file discovery
//! - Logging initialization
//! - Timestamp and human-readable duration utilities

pub mod config;
pub mod error;
pub mod human_time;
pub mod logging;
pub mod time;

pub use error::{Error, Result};
