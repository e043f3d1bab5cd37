//! # OT Board Core
//!
//! Core logic for the operating-theatre status board.
//!
//! This crate contains pure data operations and the behaviour of both views:
//! - Patient status records kept in a single JSON storage slot
//! - The session gate mapping the fixed credentials to a role
//! - Staff desk and public display view models
//!
//! **No API concerns**: HTTP servers, request routing and the tip collaborator belong in
//! `api-rest`, `api-shared` and `otboard-tip`.

pub mod config;
pub mod constants;
pub mod error;
pub mod record;
pub mod session;
pub mod slot;
pub mod status;
pub mod store;
pub mod views;

pub use config::CoreConfig;
pub use constants::DEFAULT_DATA_DIR;
pub use error::{ConfigError, ConfigResult, StoreError, StoreResult};
pub use record::PatientRecord;
pub use session::{authenticate, AuthFailure, AUTH_FAILURE_MESSAGE, Role, Session, SessionGate};
pub use slot::{FileSlot, MemorySlot, StorageSlot};
pub use status::{OtStatus, StatusTone};
pub use store::{RecordStore, SharedRecordStore};
