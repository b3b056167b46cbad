use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Decimal256, QuerierWrapper, StdResult};

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x    Queries served by the AMM      x----------------x----------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// Queries the TWAP oracle sends to the AMM contract it samples prices from.
#[cw_serde]
#[derive(QueryResponses)]
pub enum AmmQueryMsg {
    /// Price of one unit of `base_asset_denom`, expressed in `quote_asset_denom`
    #[returns(SpotPriceResponse)]
    SpotPrice {
        pool_id: u64,
        base_asset_denom: String,
        quote_asset_denom: String,
    },
    /// Every denom held by the pool
    #[returns(PoolDenomsResponse)]
    PoolDenoms { pool_id: u64 },
}

#[cw_serde]
pub struct SpotPriceResponse {
    pub spot_price: Decimal256,
}

#[cw_serde]
pub struct PoolDenomsResponse {
    pub denoms: Vec<String>,
}

/// ## Description
/// Returns the spot price of `base_asset_denom` quoted in `quote_asset_denom` for a pool.
/// ## Params
/// * **querier** is the object of type [`QuerierWrapper`].
/// * **amm_contract** is the object of type [`Addr`], the AMM to query.
pub fn query_spot_price(
    querier: &QuerierWrapper,
    amm_contract: &Addr,
    pool_id: u64,
    base_asset_denom: &str,
    quote_asset_denom: &str,
) -> StdResult<Decimal256> {
    let res: SpotPriceResponse = querier.query_wasm_smart(
        amm_contract,
        &AmmQueryMsg::SpotPrice {
            pool_id,
            base_asset_denom: base_asset_denom.to_string(),
            quote_asset_denom: quote_asset_denom.to_string(),
        },
    )?;
    Ok(res.spot_price)
}

/// ## Description
/// Returns the denoms of a pool.
/// ## Params
/// * **querier** is the object of type [`QuerierWrapper`].
/// * **amm_contract** is the object of type [`Addr`], the AMM to query.
pub fn query_pool_denoms(
    querier: &QuerierWrapper,
    amm_contract: &Addr,
    pool_id: u64,
) -> StdResult<Vec<String>> {
    let res: PoolDenomsResponse =
        querier.query_wasm_smart(amm_contract, &AmmQueryMsg::PoolDenoms { pool_id })?;
    Ok(res.denoms)
}
