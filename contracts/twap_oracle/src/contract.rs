#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Env, Event, MessageInfo, Response, StdError,
    StdResult, Timestamp,
};
use const_format::concatcp;
use cw2::set_contract_version;

use dexter_twap::helper::{claim_ownership, drop_ownership_proposal, propose_new_owner, EventExt};
use dexter_twap::oracle::{
    ConfigResponse, ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, SudoMsg, TwapResponse,
    DEFAULT_RECORD_HISTORY_KEEP_PERIOD,
};

use crate::amm::AmmQuerier;
use crate::api::{
    get_arithmetic_twap, get_arithmetic_twap_to_now, get_geometric_twap, get_geometric_twap_to_now,
};
use crate::error::ContractError;
use crate::listeners::{after_create_pool, end_block};
use crate::logic::get_interpolated_record;
use crate::state::{Config, CONFIG, OWNERSHIP_PROPOSAL};
use crate::store::{
    drain_changed_pools, get_all_most_recent_records_for_pool, prune_records_before_time_but_newest,
    track_changed_pool,
};

/// Contract name that is used for migration.
pub const CONTRACT_NAME: &str = "dexter-twap-oracle";
/// Contract version that is used for migration.
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const NANOS_PER_SECOND: u64 = 1_000_000_000;

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x      Instantiate Contract : Execute function     x----------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// ## Description
/// Creates a new contract with the specified parameters in [`InstantiateMsg`].
/// Returns a default object of type [`Response`] if the operation was successful,
/// or a [`ContractError`] if the contract was not created.
///
/// ## Params
/// * **deps** is an object of type [`DepsMut`].
/// * **_env** is an object of type [`Env`].
/// * **info** is an object of type [`MessageInfo`].
/// * **msg** is a message of type [`InstantiateMsg`] which contains the parameters used for creating the contract.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let record_history_keep_period = msg
        .record_history_keep_period
        .unwrap_or(DEFAULT_RECORD_HISTORY_KEEP_PERIOD);
    if record_history_keep_period == 0 {
        return Err(ContractError::InvalidKeepPeriod {});
    }

    let config = Config {
        owner: deps.api.addr_validate(&msg.owner)?,
        amm_contract: deps.api.addr_validate(&msg.amm_contract)?,
        record_history_keep_period,
    };
    CONFIG.save(deps.storage, &config)?;

    let event = Event::from_sender(concatcp!(CONTRACT_NAME, "::instantiate"), info.sender)
        .add_attribute("owner", config.owner)
        .add_attribute("amm_contract", config.amm_contract)
        .add_attribute(
            "record_history_keep_period",
            record_history_keep_period.to_string(),
        );
    Ok(Response::new().add_event(event))
}

// ----------------x----------------x----------------x------------------x----------------x----------------
// ----------------x----------------x  Execute function :: Entry Point  x----------------x----------------
// ----------------x----------------x----------------x------------------x----------------x----------------

/// ## Description
/// Exposes execute functions available in the contract.
/// ## Params
/// * **deps** is an object of type [`DepsMut`].
/// * **env** is an object of type [`Env`].
/// * **info** is an object of type [`MessageInfo`].
/// * **msg** is an object of type [`ExecuteMsg`].
///
/// * **ExecuteMsg::AfterCreatePool { pool_id }** Creates the first records of a new pool.
///
/// * **ExecuteMsg::TrackChangedPool { pool_id }** Queues a pool for the end block refresh.
///
/// * **ExecuteMsg::UpdateConfig { .. }** Updates general contract settings stored in the [`Config`].
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::AfterCreatePool { pool_id } => {
            execute_after_create_pool(deps, env, info, pool_id)
        }
        ExecuteMsg::TrackChangedPool { pool_id } => {
            execute_track_changed_pool(deps, info, pool_id)
        }
        ExecuteMsg::UpdateConfig {
            amm_contract,
            record_history_keep_period,
        } => execute_update_config(deps, info, amm_contract, record_history_keep_period),
        ExecuteMsg::ProposeNewOwner { owner, expires_in } => {
            let config = CONFIG.load(deps.storage)?;
            propose_new_owner(
                deps,
                info,
                env,
                CONTRACT_NAME,
                owner,
                expires_in,
                config.owner,
                OWNERSHIP_PROPOSAL,
            )
            .map_err(|e| e.into())
        }
        ExecuteMsg::DropOwnershipProposal {} => {
            let config = CONFIG.load(deps.storage)?;
            drop_ownership_proposal(deps, info, CONTRACT_NAME, config.owner, OWNERSHIP_PROPOSAL)
                .map_err(|e| e.into())
        }
        ExecuteMsg::ClaimOwnership {} => claim_ownership(
            deps,
            info,
            env,
            CONTRACT_NAME,
            OWNERSHIP_PROPOSAL,
            |deps, new_owner| {
                CONFIG.update::<_, StdError>(deps.storage, |mut config| {
                    config.owner = new_owner;
                    Ok(config)
                })?;
                Ok(())
            },
        )
        .map_err(|e| e.into()),
    }
}

fn ensure_amm(config: &Config, sender: &Addr) -> Result<(), ContractError> {
    if *sender != config.amm_contract {
        return Err(ContractError::Unauthorized {});
    }
    Ok(())
}

/// ## Description
/// Creates the initial records of every denom pair of `pool_id`.
///
/// ##Executor
/// Only the AMM contract can execute this.
fn execute_after_create_pool(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    pool_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_amm(&config, &info.sender)?;

    let amm = AmmQuerier::new(deps.querier, config.amm_contract);
    let records = after_create_pool(deps.storage, &amm, &env.block, pool_id)?;

    let event = Event::from_sender(concatcp!(CONTRACT_NAME, "::after_create_pool"), info.sender)
        .add_attribute("pool_id", pool_id.to_string())
        .add_attribute("records_created", records.len().to_string());
    Ok(Response::new().add_event(event))
}

/// ## Description
/// Queues `pool_id` so its records are refreshed at the end of the block.
///
/// ##Executor
/// Only the AMM contract can execute this.
fn execute_track_changed_pool(
    deps: DepsMut,
    info: MessageInfo,
    pool_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_amm(&config, &info.sender)?;

    track_changed_pool(deps.storage, pool_id)?;

    let event = Event::from_sender(concatcp!(CONTRACT_NAME, "::track_changed_pool"), info.sender)
        .add_attribute("pool_id", pool_id.to_string());
    Ok(Response::new().add_event(event))
}

/// ## Description
/// Updates general contract parameters. Returns a [`ContractError`] on failure or the [`Config`]
/// data will be updated if the transaction is successful.
///
/// ## Params
/// * **amm_contract** is an [`Option`] field of type [`String`]. The AMM to sample prices from.
/// * **record_history_keep_period** is an [`Option`] field of type [`u64`]. Seconds of history to keep.
///
/// ##Executor
/// Only the owner can execute this.
fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    amm_contract: Option<String>,
    record_history_keep_period: Option<u64>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    // Permission check
    if info.sender != config.owner {
        return Err(ContractError::Unauthorized {});
    }

    let mut event = Event::from_sender(concatcp!(CONTRACT_NAME, "::update_config"), info.sender);

    if let Some(amm_contract) = amm_contract {
        config.amm_contract = deps.api.addr_validate(&amm_contract)?;
        event = event.add_attribute("amm_contract", amm_contract);
    }

    if let Some(record_history_keep_period) = record_history_keep_period {
        if record_history_keep_period == 0 {
            return Err(ContractError::InvalidKeepPeriod {});
        }
        config.record_history_keep_period = record_history_keep_period;
        event = event.add_attribute(
            "record_history_keep_period",
            record_history_keep_period.to_string(),
        );
    }

    CONFIG.save(deps.storage, &config)?;
    Ok(Response::new().add_event(event))
}

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x      Sudo function :: Entry Point      x----------------x----------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// ## Description
/// Entry point for messages sent by the chain.
///
/// * **SudoMsg::EndBlock {}** Refreshes the records of every pool changed during the block, then
/// prunes history older than the configured keep period. A pool that can't be refreshed is
/// reported in the event and skipped.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn sudo(deps: DepsMut, env: Env, msg: SudoMsg) -> Result<Response, ContractError> {
    match msg {
        SudoMsg::EndBlock {} => sudo_end_block(deps, env),
    }
}

fn sudo_end_block(deps: DepsMut, env: Env) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let changed_pools = drain_changed_pools(deps.storage)?;

    let amm = AmmQuerier::new(deps.querier, config.amm_contract);
    let report = end_block(deps.storage, &amm, &env.block, &changed_pools);

    let keep_period_nanos = config
        .record_history_keep_period
        .saturating_mul(NANOS_PER_SECOND);
    let last_kept_time =
        Timestamp::from_nanos(env.block.time.nanos().saturating_sub(keep_period_nanos));
    let pruned = prune_records_before_time_but_newest(deps.storage, last_kept_time)?;

    let updated_pools = report
        .updated_pools
        .iter()
        .map(|pool_id| pool_id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let mut event = Event::from_sudo(concatcp!(CONTRACT_NAME, "::end_block"))
        .add_attribute("updated_pools", updated_pools)
        .add_attribute("records_pruned", pruned.to_string());
    for (pool_id, err) in &report.failed_pools {
        event = event.add_attribute(format!("failed_pool_{}", pool_id), err.to_string());
    }
    Ok(Response::new().add_event(event))
}

// ----------------x----------------x---------------------x-----------------------x----------------x----------------
// ----------------x----------------x  :::: TWAP Oracle::QUERIES Implementation   ::::  x----------------x----------------
// ----------------x----------------x---------------------x-----------------------x----------------x----------------

/// ## Description
/// Exposes all the queries available in the contract.
///
/// ## Queries
/// * **QueryMsg::Config {}** Returns the contract configuration using a [`ConfigResponse`] object.
/// * **QueryMsg::ArithmeticTwap { .. }** / **QueryMsg::GeometricTwap { .. }** Average price over a
/// closed window using a [`TwapResponse`] object.
/// * **QueryMsg::ArithmeticTwapToNow { .. }** / **QueryMsg::GeometricTwapToNow { .. }** Average
/// price from a start time to the current block.
/// * **QueryMsg::InterpolatedRecord { .. }** The record of a pair at any retained time.
/// * **QueryMsg::MostRecentRecords { pool_id }** Latest record of every pair of a pool.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    match msg {
        QueryMsg::Config {} => Ok(to_json_binary(&query_config(deps)?)?),
        QueryMsg::ArithmeticTwap {
            pool_id,
            base_asset,
            quote_asset,
            start_time,
            end_time,
        } => {
            let twap = get_arithmetic_twap(
                deps.storage,
                &env.block,
                pool_id,
                &base_asset,
                &quote_asset,
                start_time,
                end_time,
            )?;
            Ok(to_json_binary(&TwapResponse { twap })?)
        }
        QueryMsg::GeometricTwap {
            pool_id,
            base_asset,
            quote_asset,
            start_time,
            end_time,
        } => {
            let twap = get_geometric_twap(
                deps.storage,
                &env.block,
                pool_id,
                &base_asset,
                &quote_asset,
                start_time,
                end_time,
            )?;
            Ok(to_json_binary(&TwapResponse { twap })?)
        }
        QueryMsg::ArithmeticTwapToNow {
            pool_id,
            base_asset,
            quote_asset,
            start_time,
        } => {
            let twap = get_arithmetic_twap_to_now(
                deps.storage,
                &env.block,
                pool_id,
                &base_asset,
                &quote_asset,
                start_time,
            )?;
            Ok(to_json_binary(&TwapResponse { twap })?)
        }
        QueryMsg::GeometricTwapToNow {
            pool_id,
            base_asset,
            quote_asset,
            start_time,
        } => {
            let twap = get_geometric_twap_to_now(
                deps.storage,
                &env.block,
                pool_id,
                &base_asset,
                &quote_asset,
                start_time,
            )?;
            Ok(to_json_binary(&TwapResponse { twap })?)
        }
        QueryMsg::InterpolatedRecord {
            pool_id,
            asset_a,
            asset_b,
            time,
        } => {
            let record = get_interpolated_record(deps.storage, pool_id, time, &asset_a, &asset_b)?;
            Ok(to_json_binary(&record)?)
        }
        QueryMsg::MostRecentRecords { pool_id } => Ok(to_json_binary(
            &get_all_most_recent_records_for_pool(deps.storage, pool_id)?,
        )?),
    }
}

/// ## Description
/// Returns the contract configuration using a [`ConfigResponse`] object.
fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: config.owner,
        amm_contract: config.amm_contract,
        record_history_keep_period: config.record_history_keep_period,
    })
}

// --------x--------x--------x--------x--------x--------x---
// --------x--------x Migrate Function   x--------x---------
// --------x--------x--------x--------x--------x--------x---

/// ## Description
/// Used for migration of contract. Returns the default object of type [`Response`].
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::default())
}
