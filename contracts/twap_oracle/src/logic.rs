use cosmwasm_std::{BlockInfo, Decimal256, SignedDecimal256, StdError, Storage, Timestamp};
use dexter_twap::math::{decimal_from_millis, signed_decimal_from_millis, sub_sign, twap_log, twap_pow};
use dexter_twap::record::{canonical_time_ms, max_spot_price, TwapRecord, TwapType};

use crate::amm::AmmInterface;
use crate::error::{ContractError, InvariantViolation};
use crate::store::{get_most_recent_record, get_record_at_or_before_time, lex_order_denoms};

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x        Error time tracking       x----------------x----------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// How a record moves from its own time to a later one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorTimeTransition {
    /// Accumulators are projected forward, no new price is observed.
    Projection,
    /// Fresh spot prices were sampled. `new_error` is set if either side failed.
    Sample { new_error: bool },
}

/// ## Description
/// Decides the `last_error_time` of a record moved to `new_time`.
///
/// A new sampling error always stamps `new_time`. Without one, an earlier error time is carried
/// forward unchanged. Projecting a record whose error is live (stamped at the record's own time)
/// stretches the error over the projected interval.
pub fn next_last_error_time(
    last_error_time: Option<Timestamp>,
    error_live_at_record: bool,
    transition: ErrorTimeTransition,
    new_time: Timestamp,
) -> Option<Timestamp> {
    match transition {
        ErrorTimeTransition::Sample { new_error: true } => Some(new_time),
        ErrorTimeTransition::Sample { new_error: false } => last_error_time,
        ErrorTimeTransition::Projection if error_live_at_record => Some(new_time),
        ErrorTimeTransition::Projection => last_error_time,
    }
}

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x         Accumulator updates         x----------------x-------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// Samples one direction. Failed queries and zero prices come back as zero, prices above
/// [`max_spot_price`] are clamped; all three count as errors.
fn sample_spot_price(
    amm: &dyn AmmInterface,
    pool_id: u64,
    base_asset_denom: &str,
    quote_asset_denom: &str,
) -> (Decimal256, bool) {
    match amm.spot_price(pool_id, base_asset_denom, quote_asset_denom) {
        Err(_) => (Decimal256::zero(), true),
        Ok(price) if price.is_zero() => (price, true),
        Ok(price) if price > max_spot_price() => (max_spot_price(), true),
        Ok(price) => (price, false),
    }
}

/// ## Description
/// Samples both sides of a canonical pair and returns `(p0, p1, last_error_time)`.
/// `p0` is asset1 priced in asset0, `p1` is asset0 priced in asset1. Sampling never fails,
/// a bad reading sets `last_error_time` to `block_time`, otherwise `previous_error_time` is kept.
///
/// ## Params
/// * **amm** is the price source implementing [`AmmInterface`].
/// * **block_time** is an object of type [`Timestamp`], the time of the sample.
/// * **previous_error_time** is the `last_error_time` of the record being updated, if any.
pub fn get_spot_prices(
    amm: &dyn AmmInterface,
    block_time: Timestamp,
    pool_id: u64,
    asset0_denom: &str,
    asset1_denom: &str,
    previous_error_time: Option<Timestamp>,
) -> (Decimal256, Decimal256, Option<Timestamp>) {
    let (p0, p0_error) = sample_spot_price(amm, pool_id, asset1_denom, asset0_denom);
    let (p1, p1_error) = sample_spot_price(amm, pool_id, asset0_denom, asset1_denom);
    let last_error_time = next_last_error_time(
        previous_error_time,
        false,
        ErrorTimeTransition::Sample {
            new_error: p0_error || p1_error,
        },
        block_time,
    );
    (p0, p1, last_error_time)
}

/// ## Description
/// Creates the first record of a pool's denom pair at the current block. The denoms may be
/// passed in either order. Accumulators start at zero. Returns
/// [`ContractError::InvalidPair`] if both denoms are the same.
pub fn new_twap_record(
    amm: &dyn AmmInterface,
    block: &BlockInfo,
    pool_id: u64,
    denom_a: &str,
    denom_b: &str,
) -> Result<TwapRecord, ContractError> {
    let (asset0_denom, asset1_denom) = lex_order_denoms(denom_a, denom_b)?;
    let (p0, p1, last_error_time) =
        get_spot_prices(amm, block.time, pool_id, &asset0_denom, &asset1_denom, None);

    Ok(TwapRecord {
        pool_id,
        asset0_denom,
        asset1_denom,
        height: block.height,
        time: block.time,
        p0_last_spot_price: p0,
        p1_last_spot_price: p1,
        p0_arithmetic_twap_accumulator: Decimal256::zero(),
        p1_arithmetic_twap_accumulator: Decimal256::zero(),
        geometric_twap_accumulator: SignedDecimal256::zero(),
        last_error_time,
    })
}

/// ## Description
/// Returns the successor of `record` at the current block: accumulators are advanced over the
/// elapsed time with the record's prices, then the freshly sampled prices replace them.
pub fn update_record(
    amm: &dyn AmmInterface,
    block: &BlockInfo,
    record: &TwapRecord,
) -> Result<TwapRecord, ContractError> {
    let mut new_record = record_with_updated_accumulators(record, block.time)?;

    let (p0, p1, last_error_time) = get_spot_prices(
        amm,
        block.time,
        record.pool_id,
        &record.asset0_denom,
        &record.asset1_denom,
        record.last_error_time,
    );

    new_record.height = block.height;
    new_record.p0_last_spot_price = p0;
    new_record.p1_last_spot_price = p1;
    new_record.last_error_time = last_error_time;
    Ok(new_record)
}

/// ## Description
/// Projects a record to `new_time`, assuming its spot prices held over the whole interval.
///
/// A zero spot price can't be extrapolated unless the record carries an error at its own time,
/// in which case the zero side adds nothing and the error is stretched to `new_time`.
///
/// ## Params
/// * **record** is the record to project, it is not modified.
/// * **new_time** is an object of type [`Timestamp`], not before `record.time`.
pub fn record_with_updated_accumulators(
    record: &TwapRecord,
    new_time: Timestamp,
) -> Result<TwapRecord, ContractError> {
    if new_time < record.time {
        return Err(InvariantViolation::TimeTravel {
            record_time: record.time,
            new_time,
        }
        .into());
    }
    if new_time == record.time {
        return Ok(record.clone());
    }

    let time_delta_ms = canonical_time_ms(new_time) - canonical_time_ms(record.time);
    let error_live = record.has_live_error();
    let has_zero_price = record.p0_last_spot_price.is_zero() || record.p1_last_spot_price.is_zero();
    if has_zero_price && time_delta_ms > 0 && !error_live {
        return Err(InvariantViolation::ZeroSpotPriceExtrapolation {
            pool_id: record.pool_id,
            time: record.time,
        }
        .into());
    }

    let elapsed = decimal_from_millis(time_delta_ms);
    let mut new_record = record.clone();
    new_record.time = new_time;
    new_record.p0_arithmetic_twap_accumulator = record
        .p0_arithmetic_twap_accumulator
        .checked_add(record.p0_last_spot_price.checked_mul(elapsed)?)?;
    new_record.p1_arithmetic_twap_accumulator = record
        .p1_arithmetic_twap_accumulator
        .checked_add(record.p1_last_spot_price.checked_mul(elapsed)?)?;

    if !record.p0_last_spot_price.is_zero() && time_delta_ms > 0 {
        let weighted_log = twap_log(record.p0_last_spot_price)?
            .checked_mul(signed_decimal_from_millis(time_delta_ms as i128)?)?;
        new_record.geometric_twap_accumulator =
            record.geometric_twap_accumulator.checked_add(weighted_log)?;
    }

    new_record.last_error_time = next_last_error_time(
        record.last_error_time,
        error_live,
        ErrorTimeTransition::Projection,
        new_time,
    );
    Ok(new_record)
}

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x       Interpolated lookups       x----------------x----------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// ## Description
/// Returns the record of a pair as it would have been at `time`: the newest stored record at
/// or before `time`, projected forward if it is older.
pub fn get_interpolated_record(
    storage: &dyn Storage,
    pool_id: u64,
    time: Timestamp,
    asset_a: &str,
    asset_b: &str,
) -> Result<TwapRecord, ContractError> {
    let record = get_record_at_or_before_time(storage, pool_id, time, asset_a, asset_b)?;
    if record.time == time {
        return Ok(record);
    }
    record_with_updated_accumulators(&record, time)
}

/// The most recent record of a pair projected to the current block time, i.e. the accumulators
/// as they stand before this block's update.
pub fn get_begin_block_accumulator_record(
    storage: &dyn Storage,
    block: &BlockInfo,
    pool_id: u64,
    asset_a: &str,
    asset_b: &str,
) -> Result<TwapRecord, ContractError> {
    let record = get_most_recent_record(storage, pool_id, asset_a, asset_b)?;
    record_with_updated_accumulators(&record, block.time)
}

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x          TWAP computation           x----------------x-------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// Whether a price source error affected the window between the two records. An error stamped
/// after `end.time` is rejected as well.
fn observed_error_in_window(start: &TwapRecord, end: &TwapRecord) -> bool {
    let end_error_in_window = matches!(end.last_error_time, Some(t) if t >= start.time);
    end_error_in_window || start.has_live_error()
}

fn elapsed_ms(start: &TwapRecord, end: &TwapRecord) -> u64 {
    canonical_time_ms(end.time).abs_diff(canonical_time_ms(start.time))
}

/// ## Description
/// Computes the TWAP of the pair between two records of it, priced in `quote_asset`.
///
/// Records within the same millisecond yield the end record's spot price. Otherwise the
/// average is returned inside [`ContractError::ObservedErrorInWindow`] when the price source
/// failed during the window. A non-fatal computation failure in such a window is reported the
/// same way with a zero TWAP.
///
/// ## Params
/// * **start** and **end** are records of the same pair, in either order.
/// * **quote_asset** selects the p0 side when it is asset0 and the p1 side otherwise.
/// * **twap_type** is an object of type [`TwapType`].
pub fn compute_twap(
    start: &TwapRecord,
    end: &TwapRecord,
    quote_asset: &str,
    twap_type: TwapType,
) -> Result<Decimal256, ContractError> {
    if canonical_time_ms(start.time) == canonical_time_ms(end.time) {
        return Ok(end.spot_price_quoted_in(quote_asset));
    }

    let in_error = observed_error_in_window(start, end);
    let twap = match twap_type {
        TwapType::Arithmetic => compute_arithmetic_twap(start, end, quote_asset),
        TwapType::Geometric => compute_geometric_twap(start, end, quote_asset),
    };

    match twap {
        Ok(twap) if in_error => Err(ContractError::ObservedErrorInWindow { twap }),
        Ok(twap) => Ok(twap),
        Err(e) if in_error && !e.is_fatal() => Err(ContractError::ObservedErrorInWindow {
            twap: Decimal256::zero(),
        }),
        Err(e) => Err(e),
    }
}

/// `|Δ accumulator| / |Δ ms|` of the side quoted in `quote_asset`.
pub fn compute_arithmetic_twap(
    start: &TwapRecord,
    end: &TwapRecord,
    quote_asset: &str,
) -> Result<Decimal256, ContractError> {
    let (accum_diff, _) = sub_sign(
        end.arithmetic_accumulator_quoted_in(quote_asset),
        start.arithmetic_accumulator_quoted_in(quote_asset),
    );
    let time_delta_ms = elapsed_ms(start, end);
    if time_delta_ms == 0 {
        return Err(InvariantViolation::ZeroElapsedTime.into());
    }

    accum_diff
        .checked_div(decimal_from_millis(time_delta_ms))
        .map_err(|e| StdError::generic_err(e.to_string()).into())
}

/// `2^(Δ geometric accumulator / Δ ms)` when quoting in asset0, `2^(-Δ geometric accumulator / Δ ms)`
/// when quoting in asset1.
pub fn compute_geometric_twap(
    start: &TwapRecord,
    end: &TwapRecord,
    quote_asset: &str,
) -> Result<Decimal256, ContractError> {
    let accum_diff = end
        .geometric_twap_accumulator
        .checked_sub(start.geometric_twap_accumulator)?;
    let time_delta_ms =
        canonical_time_ms(end.time) as i128 - canonical_time_ms(start.time) as i128;
    if time_delta_ms == 0 {
        return Err(InvariantViolation::ZeroElapsedTime.into());
    }

    let mean_log = accum_diff
        .checked_div(signed_decimal_from_millis(time_delta_ms)?)
        .map_err(|e| StdError::generic_err(e.to_string()))?;

    if quote_asset == start.asset0_denom {
        return Ok(twap_pow(mean_log)?);
    }
    Ok(twap_pow(SignedDecimal256::zero().checked_sub(mean_log)?)?)
}
