use cosmwasm_std::{BlockInfo, Decimal256, Storage, Timestamp};
use dexter_twap::record::TwapType;

use crate::error::ContractError;
use crate::logic::{compute_twap, get_begin_block_accumulator_record, get_interpolated_record};

/// ## Description
/// Arithmetic mean price of `base_asset` in `quote_asset` over `[start_time, end_time]`.
///
/// ## Params
/// * **storage** is the contract storage holding the records.
/// * **block** is an object of type [`BlockInfo`], the current block.
/// * **start_time** and **end_time** are objects of type [`Timestamp`], `end_time` must not be
/// after the current block time.
pub fn get_arithmetic_twap(
    storage: &dyn Storage,
    block: &BlockInfo,
    pool_id: u64,
    base_asset: &str,
    quote_asset: &str,
    start_time: Timestamp,
    end_time: Timestamp,
) -> Result<Decimal256, ContractError> {
    get_twap(
        storage,
        block,
        pool_id,
        base_asset,
        quote_asset,
        start_time,
        end_time,
        TwapType::Arithmetic,
    )
}

/// ## Description
/// Geometric mean price of `base_asset` in `quote_asset` over `[start_time, end_time]`.
pub fn get_geometric_twap(
    storage: &dyn Storage,
    block: &BlockInfo,
    pool_id: u64,
    base_asset: &str,
    quote_asset: &str,
    start_time: Timestamp,
    end_time: Timestamp,
) -> Result<Decimal256, ContractError> {
    get_twap(
        storage,
        block,
        pool_id,
        base_asset,
        quote_asset,
        start_time,
        end_time,
        TwapType::Geometric,
    )
}

/// Arithmetic mean price from `start_time` up to the current block.
pub fn get_arithmetic_twap_to_now(
    storage: &dyn Storage,
    block: &BlockInfo,
    pool_id: u64,
    base_asset: &str,
    quote_asset: &str,
    start_time: Timestamp,
) -> Result<Decimal256, ContractError> {
    get_twap_to_now(
        storage,
        block,
        pool_id,
        base_asset,
        quote_asset,
        start_time,
        TwapType::Arithmetic,
    )
}

/// Geometric mean price from `start_time` up to the current block.
pub fn get_geometric_twap_to_now(
    storage: &dyn Storage,
    block: &BlockInfo,
    pool_id: u64,
    base_asset: &str,
    quote_asset: &str,
    start_time: Timestamp,
) -> Result<Decimal256, ContractError> {
    get_twap_to_now(
        storage,
        block,
        pool_id,
        base_asset,
        quote_asset,
        start_time,
        TwapType::Geometric,
    )
}

#[allow(clippy::too_many_arguments)]
fn get_twap(
    storage: &dyn Storage,
    block: &BlockInfo,
    pool_id: u64,
    base_asset: &str,
    quote_asset: &str,
    start_time: Timestamp,
    end_time: Timestamp,
    twap_type: TwapType,
) -> Result<Decimal256, ContractError> {
    if start_time > end_time {
        return Err(ContractError::StartTimeAfterEndTime {
            start_time,
            end_time,
        });
    }
    if end_time == block.time {
        return get_twap_to_now(storage, block, pool_id, base_asset, quote_asset, start_time, twap_type);
    }
    if end_time > block.time {
        return Err(ContractError::EndTimeInFuture {
            end_time,
            block_time: block.time,
        });
    }

    let start_record = get_interpolated_record(storage, pool_id, start_time, base_asset, quote_asset)?;
    let end_record = get_interpolated_record(storage, pool_id, end_time, base_asset, quote_asset)?;
    compute_twap(&start_record, &end_record, quote_asset, twap_type)
}

fn get_twap_to_now(
    storage: &dyn Storage,
    block: &BlockInfo,
    pool_id: u64,
    base_asset: &str,
    quote_asset: &str,
    start_time: Timestamp,
    twap_type: TwapType,
) -> Result<Decimal256, ContractError> {
    if start_time > block.time {
        return Err(ContractError::StartTimeAfterEndTime {
            start_time,
            end_time: block.time,
        });
    }

    let start_record = get_interpolated_record(storage, pool_id, start_time, base_asset, quote_asset)?;
    let end_record = get_begin_block_accumulator_record(storage, block, pool_id, base_asset, quote_asset)?;
    compute_twap(&start_record, &end_record, quote_asset, twap_type)
}
