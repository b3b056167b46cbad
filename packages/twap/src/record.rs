use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Decimal256, SignedDecimal256, Timestamp};

use crate::denom::pair_key;

const NANOS_PER_MILLI: u64 = 1_000_000;

/// ## Description
/// Largest spot price a record will hold, `2^128 - 1`. Anything above it is clamped and flagged
/// as an error.
pub fn max_spot_price() -> Decimal256 {
    Decimal256::from_ratio(u128::MAX, 1u128)
}

/// Milliseconds since the unix epoch, the unit every accumulator is integrated over.
pub fn canonical_time_ms(time: Timestamp) -> u64 {
    time.nanos() / NANOS_PER_MILLI
}

/// Averaging method used when turning two records into a TWAP.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum TwapType {
    Arithmetic,
    Geometric,
}

/// ## Description
/// A snapshot of the TWAP accumulators of one canonical denom pair of one pool.
///
/// `asset0_denom` is always lexicographically smaller than `asset1_denom`. `p0_*` values are
/// prices quoted in asset0 (amount of asset0 per unit of asset1), `p1_*` values are quoted in
/// asset1.
#[cw_serde]
pub struct TwapRecord {
    pub pool_id: u64,
    pub asset0_denom: String,
    pub asset1_denom: String,
    /// Block height the record was written at
    pub height: u64,
    /// Block time the record was written at
    pub time: Timestamp,
    pub p0_last_spot_price: Decimal256,
    pub p1_last_spot_price: Decimal256,
    /// Sum of `p0 * elapsed_ms` since the pair was first recorded
    pub p0_arithmetic_twap_accumulator: Decimal256,
    /// Sum of `p1 * elapsed_ms` since the pair was first recorded
    pub p1_arithmetic_twap_accumulator: Decimal256,
    /// Sum of `log2(p0) * elapsed_ms`, negative whenever p0 spent time below one
    pub geometric_twap_accumulator: SignedDecimal256,
    /// Most recent time the price source failed for this pair
    pub last_error_time: Option<Timestamp>,
}

impl TwapRecord {
    /// Storage key of this record's pair.
    pub fn pair_key(&self) -> String {
        pair_key(&self.asset0_denom, &self.asset1_denom)
    }

    /// Whether the price source failed at exactly this record's time, which makes its spot
    /// prices unreliable.
    pub fn has_live_error(&self) -> bool {
        self.last_error_time == Some(self.time)
    }

    /// Last spot price quoted in `quote_asset`.
    pub fn spot_price_quoted_in(&self, quote_asset: &str) -> Decimal256 {
        if quote_asset == self.asset0_denom {
            self.p0_last_spot_price
        } else {
            self.p1_last_spot_price
        }
    }

    /// Arithmetic accumulator of the side quoted in `quote_asset`.
    pub fn arithmetic_accumulator_quoted_in(&self, quote_asset: &str) -> Decimal256 {
        if quote_asset == self.asset0_denom {
            self.p0_arithmetic_twap_accumulator
        } else {
            self.p1_arithmetic_twap_accumulator
        }
    }
}
