// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Error types for the network telemetry exporter
//!
//! Per-host failures (device and rendering errors) live next to the code that
//! produces them and never leave a host task. `AppError` covers the
//! process-level and fleet-level conditions.

use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration or inventory error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or IO error
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// Worker pool could not be started or was shut down mid-cycle
    #[error("Executor error: {0}")]
    Executor(String),

    /// Self-telemetry encoding error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Address parsing error
    #[error("Address parse error")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl From<tokio::sync::AcquireError> for AppError {
    fn from(error: tokio::sync::AcquireError) -> Self {
        Self::Executor(error.to_string())
    }
}

/// Convenient alias for Result with application error
pub type Result<T> = std::result::Result<T, AppError>;
