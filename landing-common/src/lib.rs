//! # Landing Common Library
//!
//! Shared code for the landing-prediction tooling including:
//! - Common error type
//! - TOML configuration loading, path resolution and atomic write-back
//! - Launch timestamp parsing and formatting

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
