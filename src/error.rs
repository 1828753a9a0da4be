// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error kinds surfaced by the ledger.

use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// The entity addressed by the caller does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// First failing field check, in validation order.
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// Category or account still referenced by transactions.
    #[error("{0}")]
    Conflict(String),

    /// A referenced category, account currency or rate is missing.
    #[error("{0}")]
    DependencyFailed(String),

    #[error("storage error: {0}")]
    Storage(rusqlite::Error),

    /// The storage busy timeout expired before the unit of work could start or finish.
    #[error("storage timed out")]
    Timeout,

    /// The rate source failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Stored amounts whose sum or conversion leaves the decimal range.
    #[error("{0}")]
    Overflow(String),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Status code the presentation layer reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            LedgerError::NotFound { .. } => 404,
            LedgerError::Validation { .. } | LedgerError::DependencyFailed(_) => 400,
            LedgerError::Conflict(_) => 409,
            LedgerError::Storage(_) | LedgerError::Overflow(_) => 500,
            LedgerError::Upstream(_) => 502,
            LedgerError::Timeout => 503,
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => LedgerError::Timeout,
            _ => LedgerError::Storage(err),
        }
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        LedgerError::Upstream(err.to_string())
    }
}
