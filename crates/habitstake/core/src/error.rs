use thiserror::Error;

use crate::store::StoreError;

/// Errors from the commitment cycle core.
///
/// The generator and the state machine mutators never fail; these cover
/// caller-side validation, preset lookup and persistence.
#[derive(Error, Debug)]
pub enum CycleError {
    // --- Contract terms ---
    #[error("duration {days} days is outside the allowed range {min}..={max}")]
    DurationOutOfRange { days: u32, min: u32, max: u32 },

    #[error("deposit {amount_minor} minor units is outside the allowed range {min}..={max}")]
    DepositOutOfRange { amount_minor: u64, min: u64, max: u64 },

    #[error("contract id must not be empty")]
    EmptyContractId,

    // --- Simulation ---
    #[error("unknown simulation preset: {0}")]
    UnknownPreset(String),

    // --- Persistence ---
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored cycle belongs to contract {found}, expected {expected}")]
    ContractMismatch { expected: String, found: String },
}

/// Result type for commitment cycle operations.
pub type Result<T> = std::result::Result<T, CycleError>;
