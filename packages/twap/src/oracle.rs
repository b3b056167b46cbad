use crate::record::TwapRecord;
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Decimal256, Timestamp};

/// Default retention of historical records, 48 hours in seconds.
pub const DEFAULT_RECORD_HISTORY_KEEP_PERIOD: u64 = 48 * 60 * 60;

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x    Instantiate, Execute Msgs and Queries      x----------------x--
// ----------------x----------------x----------------x----------------x----------------x----------------

/// This struct describes the Msg used to instantiate in this contract.
#[cw_serde]
pub struct InstantiateMsg {
    /// Address allowed to update the config
    pub owner: String,
    /// The AMM contract spot prices are sampled from
    pub amm_contract: String,
    /// Seconds of history kept for interpolation. Defaults to [`DEFAULT_RECORD_HISTORY_KEEP_PERIOD`]
    pub record_history_keep_period: Option<u64>,
}

/// This struct describes the functions that can be executed in this contract.
#[cw_serde]
pub enum ExecuteMsg {
    /// Creates the initial records for every denom pair of a new pool. Only callable by the AMM.
    AfterCreatePool { pool_id: u64 },
    /// Marks a pool whose prices may have moved so its records are refreshed at the end of the
    /// block. Only callable by the AMM.
    TrackChangedPool { pool_id: u64 },
    /// Updates general settings. Only callable by the owner.
    UpdateConfig {
        amm_contract: Option<String>,
        record_history_keep_period: Option<u64>,
    },
    /// Creates a request to hand the contract over to a new owner
    ProposeNewOwner {
        owner: String,
        /// Seconds the proposal stays claimable
        expires_in: u64,
    },
    /// Removes a pending ownership proposal
    DropOwnershipProposal {},
    /// Lets the proposed owner take over the contract
    ClaimOwnership {},
}

/// Messages only the chain can send.
#[cw_serde]
pub enum SudoMsg {
    /// Refreshes the records of every pool changed during the block and prunes old history
    EndBlock {},
}

/// This struct describes the query functions available in the contract.
#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    /// Arithmetic mean price of `base_asset` in `quote_asset` over `[start_time, end_time]`
    #[returns(TwapResponse)]
    ArithmeticTwap {
        pool_id: u64,
        base_asset: String,
        quote_asset: String,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    /// Geometric mean price of `base_asset` in `quote_asset` over `[start_time, end_time]`
    #[returns(TwapResponse)]
    GeometricTwap {
        pool_id: u64,
        base_asset: String,
        quote_asset: String,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    /// Arithmetic mean price from `start_time` up to the current block
    #[returns(TwapResponse)]
    ArithmeticTwapToNow {
        pool_id: u64,
        base_asset: String,
        quote_asset: String,
        start_time: Timestamp,
    },
    /// Geometric mean price from `start_time` up to the current block
    #[returns(TwapResponse)]
    GeometricTwapToNow {
        pool_id: u64,
        base_asset: String,
        quote_asset: String,
        start_time: Timestamp,
    },
    /// The accumulator record of a pair as it would have been at `time`
    #[returns(TwapRecord)]
    InterpolatedRecord {
        pool_id: u64,
        asset_a: String,
        asset_b: String,
        time: Timestamp,
    },
    /// The latest record of every denom pair of a pool
    #[returns(Vec<TwapRecord>)]
    MostRecentRecords { pool_id: u64 },
}

/// This struct describes a migration message.
/// We currently take no arguments for migrations.
#[cw_serde]
pub struct MigrateMsg {}

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x    Response Types      x----------------x----------------x--------
// ----------------x----------------x----------------x----------------x----------------x----------------

#[cw_serde]
pub struct ConfigResponse {
    pub owner: Addr,
    pub amm_contract: Addr,
    pub record_history_keep_period: u64,
}

#[cw_serde]
pub struct TwapResponse {
    pub twap: Decimal256,
}
