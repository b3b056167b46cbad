use cosmwasm_std::{Decimal256, OverflowError, StdError, Timestamp};
use thiserror::Error;

/// ## Description
/// Broken internal contracts. These are bugs in the caller or corrupted state, never a
/// consequence of bad price data.
#[derive(Error, Debug, PartialEq)]
pub enum InvariantViolation {
    #[error("twap window has zero elapsed time")]
    ZeroElapsedTime,

    #[error("cannot extrapolate a zero spot price of pool {pool_id} recorded at {time} without an error at that time")]
    ZeroSpotPriceExtrapolation { pool_id: u64, time: Timestamp },

    #[error("cannot move a record from {record_time} back to {new_time}")]
    TimeTravel {
        record_time: Timestamp,
        new_time: Timestamp,
    },
}

/// ## Description
/// This enum describes twap oracle contract errors
#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("both assets cannot be of the same denom: asset_a: {asset_a}, asset_b: {asset_b}")]
    InvalidPair { asset_a: String, asset_b: String },

    #[error("pool {pool_id} does not exist")]
    PoolNotFound { pool_id: u64 },

    #[error("the number of records does not match, expected: {expected}, got: {actual}")]
    InvalidRecordCount { expected: usize, actual: usize },

    #[error("looking for a time that is too old, not in the historical index: {time}")]
    TooOldRequest { time: Timestamp },

    #[error("error in pool spot price occurred between start and end time, twap result may be faulty: {twap}")]
    ObservedErrorInWindow { twap: Decimal256 },

    #[error("start time {start_time} is after end time {end_time}")]
    StartTimeAfterEndTime {
        start_time: Timestamp,
        end_time: Timestamp,
    },

    #[error("end time {end_time} is in the future, current block time {block_time}")]
    EndTimeInFuture {
        end_time: Timestamp,
        block_time: Timestamp,
    },

    #[error("Record history keep period must be greater than zero")]
    InvalidKeepPeriod {},

    #[error("{0}")]
    Fatal(#[from] InvariantViolation),
}

impl ContractError {
    /// Whether the error is a broken invariant rather than a recoverable condition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ContractError::Fatal(_))
    }
}

impl From<OverflowError> for ContractError {
    fn from(o: OverflowError) -> Self {
        StdError::from(o).into()
    }
}
