// Contract Collection - Core Library
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod error;
pub mod contract;
pub mod db;
pub mod diff;     // Diff Engine
pub mod api;      // Contract API Client boundary
pub mod session;  // Edit Session Controller
pub mod transfer; // JSON / CSV import and export
pub mod config;
pub mod wire;

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "client")]
pub mod client;

// Re-export commonly used types
pub use error::{ContractError, DispatchError, DispatchFailure, SessionError, StoreError, TransferError};
pub use contract::{
    Contract, ContractField, ContractId, ContractSnapshot, FieldKind, FieldValue, NewContract,
    DATE_FORMAT,
};
pub use db::{setup_database, EntityStore, SqliteStore, StoreResult};
pub use diff::{diff, FieldChange};
pub use api::{ContractApi, DispatchResult, LocalApi};
pub use session::{CommitReport, EditSession, SessionState};
pub use transfer::{load_contracts, save_contracts, FileFormat};
pub use config::{init_tracing, Config};
pub use wire::{ApiResponse, ReasonCode};

#[cfg(feature = "client")]
pub use client::HttpContractApi;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
