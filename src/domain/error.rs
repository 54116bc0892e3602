// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use thiserror::Error;

/// Process exit statuses, one per failure class.
pub const EXIT_OK: u8 = 0;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_BOOTSTRAP: u8 = 3;
pub const EXIT_INSUFFICIENT_BALANCE: u8 = 4;
pub const EXIT_APPROVAL: u8 = 5;
pub const EXIT_QUOTE_UNAVAILABLE: u8 = 6;
pub const EXIT_SUBMISSION: u8 = 7;
pub const EXIT_TIMEOUT: u8 = 8;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed for field {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Connection failed to endpoint: {0}")]
    Connection(String),

    #[error("Account could not be loaded: {0}")]
    AccountLoad(String),

    #[error("Contract {address} could not be resolved: {reason}")]
    Resolution { address: String, reason: String },

    #[error("Approval failed for token {token} on router {router}: {reason}")]
    Approval {
        token: String,
        router: String,
        reason: String,
    },

    #[error("Insufficient {token} balance. Required: {required}, Available: {available}")]
    InsufficientBalance {
        token: String,
        required: String,
        available: String,
    },

    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("Transaction submission failed: {0}")]
    Submission(String),

    #[error("Invocation timed out after {0} ms")]
    Timeout(u64),

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Validation { .. } => EXIT_CONFIG,
            AppError::Initialization(_)
            | AppError::Connection(_)
            | AppError::AccountLoad(_)
            | AppError::Resolution { .. }
            | AppError::Unknown(_) => EXIT_BOOTSTRAP,
            AppError::InsufficientBalance { .. } => EXIT_INSUFFICIENT_BALANCE,
            AppError::Approval { .. } => EXIT_APPROVAL,
            AppError::QuoteUnavailable(_) => EXIT_QUOTE_UNAVAILABLE,
            AppError::Submission(_) => EXIT_SUBMISSION,
            AppError::Timeout(_) => EXIT_TIMEOUT,
        }
    }

    /// Whether the run ended on an expected market/account condition rather
    /// than a broken environment.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::InsufficientBalance { .. }
                | AppError::QuoteUnavailable(_)
                | AppError::Submission(_)
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
