//! Error types for the contract collection
//!
//! Library code returns these typed errors; the binaries wrap them in
//! `anyhow` at the edges.

use crate::contract::{ContractField, ContractId, FieldValue};
use thiserror::Error;

/// Errors raised by the data model itself
#[derive(Debug, Error, PartialEq)]
pub enum ContractError {
    /// Field key is not one of the contract's attributes
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Value cannot be stored in the given field
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: ContractField, reason: String },

    /// Annualized expenses are undefined for a zero payment cycle
    #[error("payment cycle is zero, yearly expenses are undefined")]
    ZeroCycle,
}

/// Entity Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No live contract carries this id
    #[error("contract {0} not found")]
    NotFound(ContractId),

    /// Rejected input (empty name, negative expenses, cycle below one month, ...)
    #[error("validation failed: {0}")]
    Validation(String),

    /// SQLite failure
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored row could not be decoded
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<ContractError> for StoreError {
    fn from(e: ContractError) -> Self {
        StoreError::Validation(e.to_string())
    }
}

/// Usage errors of the edit session controller
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// `set_field` was given a name outside the editable field list
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Operation invoked outside its valid state
    #[error("{operation} is not allowed while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Value does not fit the field's type
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: ContractField, reason: String },
}

/// Failure of a single call through the API client
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    /// Remote side has no contract with this id
    #[error("contract {0} not found")]
    NotFound(ContractId),

    /// Remote side refused the value
    #[error("rejected: {0}")]
    Rejected(String),

    /// Network or local storage failure
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<StoreError> for DispatchError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => DispatchError::NotFound(id),
            StoreError::Validation(msg) => DispatchError::Rejected(msg),
            other => DispatchError::Transport(other.to_string()),
        }
    }
}

/// One field of a commit whose update did not go through
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchFailure {
    pub field: ContractField,
    pub value: FieldValue,
    pub error: DispatchError,
}

impl std::fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}: {}", self.field, self.value, self.error)
    }
}

/// Import/export errors
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}
