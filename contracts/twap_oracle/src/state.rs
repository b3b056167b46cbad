use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Empty};
use cw_storage_plus::{Item, Map};
use dexter_twap::{helper::OwnershipProposal, record::TwapRecord};

/// ## Description
/// This structure stores the main parameters for the TWAP oracle contract.
#[cw_serde]
pub struct Config {
    /// Address allowed to update the config
    pub owner: Addr,
    /// The AMM contract sampled for spot prices and allowed to call the pool hooks
    pub amm_contract: Addr,
    /// Seconds of history kept behind the current block time
    pub record_history_keep_period: u64,
}

/// Stores the contract configuration at the given key
pub const CONFIG: Item<Config> = Item::new("config");

/// Ownership proposal in case of ownership transfer is initiated
pub const OWNERSHIP_PROPOSAL: Item<OwnershipProposal> = Item::new("ownership_proposal");

/// Latest record of every (pool, asset0, asset1)
pub const MOST_RECENT_RECORDS: Map<(u64, &str, &str), TwapRecord> = Map::new("most_recent_records");

/// Every stored record keyed by (pool, pair key, time in nanos). Ranging over a (pool, pair)
/// prefix walks that pair's history in time order.
pub const HISTORICAL_POOL_INDEX: Map<(u64, &str, u64), TwapRecord> = Map::new("historical_pool_index");

/// The same records keyed by (time in nanos, pool, pair key), so history can be walked across
/// all pools by time when pruning.
pub const HISTORICAL_TIME_INDEX: Map<(u64, u64, &str), TwapRecord> = Map::new("historical_time_index");

/// Pools with price-affecting activity since the last end block
pub const CHANGED_POOLS: Map<u64, Empty> = Map::new("changed_pools");
