//! Store errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,

    #[error("document already exists")]
    AlreadyExists,

    #[error("document changed concurrently (expected version {expected}, found {found})")]
    Conflict { expected: u64, found: u64 },
}
