//! Common types and utilities shared across Buzz crates.
//!
//! This crate holds the observability helpers and the small enums that both the
//! configuration loader and the `buzz` binary agree on. It is intentionally
//! lightweight so that every crate can depend on it without dragging in the
//! HTTP stack.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`OutputFormat`]: How the binary renders fetched records
//!
//! # Examples
//!
//! ```rust
//! use buzz_common::OutputFormat;
//!
//! let fmt: OutputFormat = "pretty".parse().unwrap();
//! assert_eq!(fmt, OutputFormat::Pretty);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// Preferred output format for rendered results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One compact JSON document per result set.
    #[default]
    Json,
    /// Indented JSON, easier on the eyes in a terminal.
    Pretty,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Pretty => f.write_str("pretty"),
        }
    }
}
