use std::collections::BTreeSet;

use cosmwasm_std::{BlockInfo, Storage};
use dexter_twap::denom::{get_all_unique_denom_pairs, num_possible_pairs};
use dexter_twap::record::TwapRecord;

use crate::amm::AmmInterface;
use crate::error::ContractError;
use crate::logic::{new_twap_record, update_record};
use crate::store::{get_all_most_recent_records_for_pool, store_new_record, track_changed_pool};

/// Outcome of an end block run.
#[derive(Debug, Default, PartialEq)]
pub struct EndBlockReport {
    /// Pools whose records were refreshed
    pub updated_pools: Vec<u64>,
    /// Pools that could not be refreshed, with the reason
    pub failed_pools: Vec<(u64, ContractError)>,
}

/// ## Description
/// Creates and stores the initial record of every denom pair of a new pool and marks the pool
/// as changed, so the block's end refreshes it once more. Returns the created records.
pub fn after_create_pool(
    storage: &mut dyn Storage,
    amm: &dyn AmmInterface,
    block: &BlockInfo,
    pool_id: u64,
) -> Result<Vec<TwapRecord>, ContractError> {
    let denoms = amm.pool_denoms(pool_id)?;

    let records = get_all_unique_denom_pairs(&denoms)
        .iter()
        .map(|(asset0, asset1)| new_twap_record(amm, block, pool_id, asset0, asset1))
        .collect::<Result<Vec<_>, _>>()?;

    for record in &records {
        store_new_record(storage, record)?;
    }
    track_changed_pool(storage, pool_id)?;
    Ok(records)
}

/// ## Description
/// Refreshes every record of a pool with the prices of the current block.
///
/// Fails with [`ContractError::PoolNotFound`] if the AMM does not know the pool and with
/// [`ContractError::InvalidRecordCount`] if the stored records do not cover exactly every denom
/// pair of the pool. Every new record is derived before anything is written.
pub fn update_records(
    storage: &mut dyn Storage,
    amm: &dyn AmmInterface,
    block: &BlockInfo,
    pool_id: u64,
) -> Result<Vec<TwapRecord>, ContractError> {
    let denoms = amm.pool_denoms(pool_id)?;
    let records = get_all_most_recent_records_for_pool(storage, pool_id)?;

    let distinct_denoms = denoms.iter().collect::<BTreeSet<_>>().len();
    let expected = num_possible_pairs(distinct_denoms);
    if records.len() != expected {
        return Err(ContractError::InvalidRecordCount {
            expected,
            actual: records.len(),
        });
    }

    let new_records = records
        .iter()
        .map(|record| update_record(amm, block, record))
        .collect::<Result<Vec<_>, _>>()?;

    for record in &new_records {
        store_new_record(storage, record)?;
    }
    Ok(new_records)
}

/// ## Description
/// Refreshes the records of every pool in `changed_pools`. A pool that fails is reported and
/// skipped, the remaining pools are still updated.
pub fn end_block(
    storage: &mut dyn Storage,
    amm: &dyn AmmInterface,
    block: &BlockInfo,
    changed_pools: &[u64],
) -> EndBlockReport {
    let mut report = EndBlockReport::default();
    for pool_id in changed_pools {
        match update_records(storage, amm, block, *pool_id) {
            Ok(_) => report.updated_pools.push(*pool_id),
            Err(err) => report.failed_pools.push((*pool_id, err)),
        }
    }
    report
}
