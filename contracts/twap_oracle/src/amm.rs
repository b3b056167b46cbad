use cosmwasm_std::{Addr, Decimal256, QuerierWrapper, StdResult};
use dexter_twap::amm::{query_pool_denoms, query_spot_price};

use crate::error::ContractError;

/// ## Description
/// Source of pool prices and denoms. The record logic only sees this trait, so it can run
/// against the AMM contract or an in-memory pool set.
pub trait AmmInterface {
    /// Price of one unit of `base_asset_denom` in `quote_asset_denom`.
    fn spot_price(&self, pool_id: u64, base_asset_denom: &str, quote_asset_denom: &str) -> StdResult<Decimal256>;

    /// Denoms of a pool, [`ContractError::PoolNotFound`] if the AMM doesn't know it.
    fn pool_denoms(&self, pool_id: u64) -> Result<Vec<String>, ContractError>;
}

/// [`AmmInterface`] backed by smart queries to the configured AMM contract.
pub struct AmmQuerier<'a> {
    querier: QuerierWrapper<'a>,
    amm_contract: Addr,
}

impl<'a> AmmQuerier<'a> {
    pub fn new(querier: QuerierWrapper<'a>, amm_contract: Addr) -> Self {
        AmmQuerier {
            querier,
            amm_contract,
        }
    }
}

impl AmmInterface for AmmQuerier<'_> {
    fn spot_price(&self, pool_id: u64, base_asset_denom: &str, quote_asset_denom: &str) -> StdResult<Decimal256> {
        query_spot_price(
            &self.querier,
            &self.amm_contract,
            pool_id,
            base_asset_denom,
            quote_asset_denom,
        )
    }

    fn pool_denoms(&self, pool_id: u64) -> Result<Vec<String>, ContractError> {
        query_pool_denoms(&self.querier, &self.amm_contract, pool_id)
            .map_err(|_| ContractError::PoolNotFound { pool_id })
    }
}
