use std::collections::BTreeSet;

use cosmwasm_std::{Empty, Order, StdResult, Storage, Timestamp};
use cw_storage_plus::Bound;
use dexter_twap::denom::{canonical_pair, pair_key};
use dexter_twap::record::TwapRecord;

use crate::error::ContractError;
use crate::state::{CHANGED_POOLS, HISTORICAL_POOL_INDEX, HISTORICAL_TIME_INDEX, MOST_RECENT_RECORDS};

/// ## Description
/// Orders two denoms into canonical (lexicographic) order.
/// Returns [`ContractError::InvalidPair`] if both are the same denom.
pub fn lex_order_denoms(asset_a: &str, asset_b: &str) -> Result<(String, String), ContractError> {
    canonical_pair(asset_a, asset_b).ok_or_else(|| ContractError::InvalidPair {
        asset_a: asset_a.to_string(),
        asset_b: asset_b.to_string(),
    })
}

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x          Record writes           x----------------x----------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// ## Description
/// Persists a record as the most recent record of its pair and as a historical entry.
pub fn store_new_record(storage: &mut dyn Storage, record: &TwapRecord) -> StdResult<()> {
    MOST_RECENT_RECORDS.save(
        storage,
        (record.pool_id, record.asset0_denom.as_str(), record.asset1_denom.as_str()),
        record,
    )?;
    store_historical_record(storage, record)
}

/// Writes a record to both historical indexes.
pub fn store_historical_record(storage: &mut dyn Storage, record: &TwapRecord) -> StdResult<()> {
    let pair = record.pair_key();
    let time = record.time.nanos();
    HISTORICAL_POOL_INDEX.save(storage, (record.pool_id, pair.as_str(), time), record)?;
    HISTORICAL_TIME_INDEX.save(storage, (time, record.pool_id, pair.as_str()), record)
}

fn delete_historical_record(storage: &mut dyn Storage, time: u64, pool_id: u64, pair: &str) {
    HISTORICAL_POOL_INDEX.remove(storage, (pool_id, pair, time));
    HISTORICAL_TIME_INDEX.remove(storage, (time, pool_id, pair));
}

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x          Record lookups          x----------------x----------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// Returns the most recent record of a pair, the denoms may be passed in either order.
pub fn get_most_recent_record(
    storage: &dyn Storage,
    pool_id: u64,
    asset_a: &str,
    asset_b: &str,
) -> Result<TwapRecord, ContractError> {
    let (asset0, asset1) = lex_order_denoms(asset_a, asset_b)?;
    Ok(MOST_RECENT_RECORDS.load(storage, (pool_id, asset0.as_str(), asset1.as_str()))?)
}

/// Returns the most recent record of every pair of a pool, sorted by (asset0, asset1).
pub fn get_all_most_recent_records_for_pool(
    storage: &dyn Storage,
    pool_id: u64,
) -> StdResult<Vec<TwapRecord>> {
    let mut records = MOST_RECENT_RECORDS
        .sub_prefix(pool_id)
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, record)| record))
        .collect::<StdResult<Vec<TwapRecord>>>()?;
    records.sort_by(|a, b| {
        (&a.asset0_denom, &a.asset1_denom).cmp(&(&b.asset0_denom, &b.asset1_denom))
    });
    Ok(records)
}

/// Returns every historical record of a pool, sorted by (asset0, asset1, time).
pub fn get_all_historical_records_for_pool(
    storage: &dyn Storage,
    pool_id: u64,
) -> StdResult<Vec<TwapRecord>> {
    let mut records = HISTORICAL_POOL_INDEX
        .sub_prefix(pool_id)
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, record)| record))
        .collect::<StdResult<Vec<TwapRecord>>>()?;
    records.sort_by(|a, b| {
        (&a.asset0_denom, &a.asset1_denom, a.time).cmp(&(&b.asset0_denom, &b.asset1_denom, b.time))
    });
    Ok(records)
}

/// ## Description
/// Returns the newest historical record of a pair whose time is at or before `time`.
/// Returns [`ContractError::TooOldRequest`] if the pair has no such record.
pub fn get_record_at_or_before_time(
    storage: &dyn Storage,
    pool_id: u64,
    time: Timestamp,
    asset_a: &str,
    asset_b: &str,
) -> Result<TwapRecord, ContractError> {
    let (asset0, asset1) = lex_order_denoms(asset_a, asset_b)?;
    let pair = pair_key(&asset0, &asset1);
    HISTORICAL_POOL_INDEX
        .prefix((pool_id, pair.as_str()))
        .range(
            storage,
            None,
            Some(Bound::inclusive(time.nanos())),
            Order::Descending,
        )
        .next()
        .transpose()?
        .map(|(_, record)| record)
        .ok_or(ContractError::TooOldRequest { time })
}

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x             Pruning              x----------------x----------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// ## Description
/// Deletes historical records at or before `last_kept_time`, except the newest such record of
/// every (pool, pair). That record is still needed to interpolate any time after
/// `last_kept_time`. Records after `last_kept_time` and the most recent records are untouched.
/// Returns the number of deleted records.
pub fn prune_records_before_time_but_newest(
    storage: &mut dyn Storage,
    last_kept_time: Timestamp,
) -> StdResult<u64> {
    let upper = Bound::exclusive((last_kept_time.nanos().saturating_add(1), 0u64, ""));
    let candidates = HISTORICAL_TIME_INDEX
        .keys(storage, None, Some(upper), Order::Descending)
        .collect::<StdResult<Vec<(u64, u64, String)>>>()?;

    // walking newest first, the first record seen for a (pool, pair) is the one to keep
    let mut seen: BTreeSet<(u64, String)> = BTreeSet::new();
    let mut pruned = 0u64;
    for (time, pool_id, pair) in candidates {
        if seen.insert((pool_id, pair.clone())) {
            continue;
        }
        delete_historical_record(storage, time, pool_id, &pair);
        pruned += 1;
    }
    Ok(pruned)
}

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x          Changed pools           x----------------x----------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// Marks a pool as changed in the current block.
pub fn track_changed_pool(storage: &mut dyn Storage, pool_id: u64) -> StdResult<()> {
    CHANGED_POOLS.save(storage, pool_id, &Empty {})
}

/// Returns the changed pools in ascending id order.
pub fn get_changed_pools(storage: &dyn Storage) -> StdResult<Vec<u64>> {
    CHANGED_POOLS
        .keys(storage, None, None, Order::Ascending)
        .collect()
}

/// Empties the changed pool set and returns what it held.
pub fn drain_changed_pools(storage: &mut dyn Storage) -> StdResult<Vec<u64>> {
    let pools = get_changed_pools(storage)?;
    for pool_id in &pools {
        CHANGED_POOLS.remove(storage, *pool_id);
    }
    Ok(pools)
}
