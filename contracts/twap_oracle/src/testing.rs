use cosmwasm_std::testing::{
    mock_dependencies, mock_env, mock_info, MockApi, MockQuerier, MockStorage,
};
use cosmwasm_std::{
    from_json, to_json_binary, Addr, ContractResult, Event, OwnedDeps, StdError, SystemError,
    SystemResult, Timestamp, WasmQuery,
};

use crate::contract::{execute, instantiate, migrate, query, sudo};
use crate::error::ContractError;
use crate::mock_amm::{dec, DENOM0, DENOM1};
use crate::state::{Config, CONFIG};
use crate::store::get_changed_pools;
use dexter_twap::amm::{AmmQueryMsg, PoolDenomsResponse, SpotPriceResponse};
use dexter_twap::oracle::{
    ConfigResponse, ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, SudoMsg, TwapResponse,
    DEFAULT_RECORD_HISTORY_KEEP_PERIOD,
};
use dexter_twap::record::TwapRecord;

const OWNER: &str = "owner";
const AMM: &str = "amm";

type MockDeps = OwnedDeps<MockStorage, MockApi, MockQuerier>;

/// Answers the AMM queries for pool 1, holding DENOM0 and DENOM1 with DENOM1 worth 2 DENOM0.
fn mock_amm_queries(deps: &mut MockDeps) {
    deps.querier.update_wasm(|query| match query {
        WasmQuery::Smart { contract_addr, msg } if contract_addr == AMM => {
            let response = match from_json::<AmmQueryMsg>(msg).unwrap() {
                AmmQueryMsg::PoolDenoms { pool_id: 1 } => to_json_binary(&PoolDenomsResponse {
                    denoms: vec![DENOM0.to_string(), DENOM1.to_string()],
                }),
                AmmQueryMsg::SpotPrice {
                    pool_id: 1,
                    base_asset_denom,
                    ..
                } => {
                    let spot_price = if base_asset_denom == DENOM1 {
                        dec("2")
                    } else {
                        dec("0.5")
                    };
                    to_json_binary(&SpotPriceResponse { spot_price })
                }
                _ => return SystemResult::Ok(ContractResult::Err("pool not found".to_string())),
            };
            SystemResult::Ok(ContractResult::Ok(response.unwrap()))
        }
        _ => SystemResult::Err(SystemError::UnsupportedRequest {
            kind: "wasm".to_string(),
        }),
    });
}

fn setup() -> MockDeps {
    let mut deps = mock_dependencies();
    mock_amm_queries(&mut deps);
    instantiate(
        deps.as_mut(),
        mock_env(),
        mock_info("instantiator", &[]),
        InstantiateMsg {
            owner: OWNER.to_string(),
            amm_contract: AMM.to_string(),
            record_history_keep_period: None,
        },
    )
    .unwrap();
    deps
}

fn attribute<'a>(event: &'a Event, key: &str) -> Option<&'a str> {
    event
        .attributes
        .iter()
        .find(|attr| attr.key == key)
        .map(|attr| attr.value.as_str())
}

#[test]
fn proper_initialization() {
    let deps = setup();

    let state = CONFIG.load(deps.as_ref().storage).unwrap();
    assert_eq!(
        state,
        Config {
            owner: Addr::unchecked(OWNER),
            amm_contract: Addr::unchecked(AMM),
            record_history_keep_period: DEFAULT_RECORD_HISTORY_KEEP_PERIOD,
        }
    );

    let res: ConfigResponse =
        from_json(query(deps.as_ref(), mock_env(), QueryMsg::Config {}).unwrap()).unwrap();
    assert_eq!(res.record_history_keep_period, 48 * 60 * 60);
}

#[test]
fn instantiate_rejects_zero_keep_period() {
    let mut deps = mock_dependencies();
    let err = instantiate(
        deps.as_mut(),
        mock_env(),
        mock_info("instantiator", &[]),
        InstantiateMsg {
            owner: OWNER.to_string(),
            amm_contract: AMM.to_string(),
            record_history_keep_period: Some(0),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::InvalidKeepPeriod {});
}

#[test]
fn pool_hooks_are_amm_only() {
    let mut deps = setup();

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::AfterCreatePool { pool_id: 1 },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::Unauthorized {});

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info("someone", &[]),
        ExecuteMsg::TrackChangedPool { pool_id: 1 },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::Unauthorized {});
    assert!(get_changed_pools(deps.as_ref().storage).unwrap().is_empty());
}

#[test]
fn after_create_pool_stores_initial_records() {
    let mut deps = setup();
    let env = mock_env();

    let res = execute(
        deps.as_mut(),
        env.clone(),
        mock_info(AMM, &[]),
        ExecuteMsg::AfterCreatePool { pool_id: 1 },
    )
    .unwrap();
    assert_eq!(attribute(&res.events[0], "records_created"), Some("1"));
    assert_eq!(get_changed_pools(deps.as_ref().storage).unwrap(), vec![1]);

    let records: Vec<TwapRecord> = from_json(
        query(
            deps.as_ref(),
            env.clone(),
            QueryMsg::MostRecentRecords { pool_id: 1 },
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].asset0_denom, DENOM0);
    assert_eq!(records[0].asset1_denom, DENOM1);
    assert_eq!(records[0].p0_last_spot_price, dec("2"));
    assert_eq!(records[0].p1_last_spot_price, dec("0.5"));
    assert_eq!(records[0].time, env.block.time);

    let err = execute(
        deps.as_mut(),
        env,
        mock_info(AMM, &[]),
        ExecuteMsg::AfterCreatePool { pool_id: 9 },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::PoolNotFound { pool_id: 9 });
}

#[test]
fn end_block_refreshes_changed_pools_and_reports_failures() {
    let mut deps = setup();
    let start = mock_env();
    execute(
        deps.as_mut(),
        start.clone(),
        mock_info(AMM, &[]),
        ExecuteMsg::AfterCreatePool { pool_id: 1 },
    )
    .unwrap();

    let mut env = mock_env();
    env.block.time = start.block.time.plus_seconds(10);
    env.block.height += 1;
    for pool_id in [1u64, 7] {
        execute(
            deps.as_mut(),
            env.clone(),
            mock_info(AMM, &[]),
            ExecuteMsg::TrackChangedPool { pool_id },
        )
        .unwrap();
    }

    let res = sudo(deps.as_mut(), env.clone(), SudoMsg::EndBlock {}).unwrap();
    let event = &res.events[0];
    assert_eq!(event.ty, "dexter-twap-oracle::end_block");
    assert_eq!(attribute(event, "updated_pools"), Some("1"));
    assert_eq!(
        attribute(event, "failed_pool_7"),
        Some("pool 7 does not exist")
    );
    assert_eq!(attribute(event, "records_pruned"), Some("0"));
    assert!(get_changed_pools(deps.as_ref().storage).unwrap().is_empty());

    let res: TwapResponse = from_json(
        query(
            deps.as_ref(),
            env.clone(),
            QueryMsg::ArithmeticTwapToNow {
                pool_id: 1,
                base_asset: DENOM1.to_string(),
                quote_asset: DENOM0.to_string(),
                start_time: start.block.time,
            },
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(res.twap, dec("2"));

    let res: TwapResponse = from_json(
        query(
            deps.as_ref(),
            env.clone(),
            QueryMsg::GeometricTwap {
                pool_id: 1,
                base_asset: DENOM0.to_string(),
                quote_asset: DENOM1.to_string(),
                start_time: start.block.time,
                end_time: start.block.time.plus_seconds(5),
            },
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(res.twap, dec("0.5"));

    let record: TwapRecord = from_json(
        query(
            deps.as_ref(),
            env,
            QueryMsg::InterpolatedRecord {
                pool_id: 1,
                asset_a: DENOM1.to_string(),
                asset_b: DENOM0.to_string(),
                time: start.block.time.plus_seconds(4),
            },
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(record.p0_arithmetic_twap_accumulator, dec("8000"));
    assert_eq!(record.p1_arithmetic_twap_accumulator, dec("2000"));
}

#[test]
fn end_block_prunes_expired_history() {
    let mut deps = setup();
    let start = mock_env();
    execute(
        deps.as_mut(),
        start.clone(),
        mock_info(AMM, &[]),
        ExecuteMsg::UpdateConfig {
            amm_contract: None,
            record_history_keep_period: Some(60),
        },
    )
    .unwrap_err();
    execute(
        deps.as_mut(),
        start.clone(),
        mock_info(OWNER, &[]),
        ExecuteMsg::UpdateConfig {
            amm_contract: None,
            record_history_keep_period: Some(60),
        },
    )
    .unwrap();

    execute(
        deps.as_mut(),
        start.clone(),
        mock_info(AMM, &[]),
        ExecuteMsg::AfterCreatePool { pool_id: 1 },
    )
    .unwrap();
    sudo(deps.as_mut(), start.clone(), SudoMsg::EndBlock {}).unwrap();

    // three more updates, 30 seconds apart
    let mut env = start.clone();
    for _ in 0..3 {
        env.block.time = env.block.time.plus_seconds(30);
        env.block.height += 1;
        execute(
            deps.as_mut(),
            env.clone(),
            mock_info(AMM, &[]),
            ExecuteMsg::TrackChangedPool { pool_id: 1 },
        )
        .unwrap();
        sudo(deps.as_mut(), env.clone(), SudoMsg::EndBlock {}).unwrap();
    }

    // history at start, +30, +60, +90. Keeping 60 seconds at +150 leaves +90 as the newest
    // record at or before the horizon.
    env.block.time = start.block.time.plus_seconds(150);
    let res = sudo(deps.as_mut(), env.clone(), SudoMsg::EndBlock {}).unwrap();
    assert_eq!(attribute(&res.events[0], "records_pruned"), Some("3"));

    let err = query(
        deps.as_ref(),
        env.clone(),
        QueryMsg::ArithmeticTwapToNow {
            pool_id: 1,
            base_asset: DENOM1.to_string(),
            quote_asset: DENOM0.to_string(),
            start_time: start.block.time.plus_seconds(60),
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::TooOldRequest {
            time: start.block.time.plus_seconds(60)
        }
    );
    assert!(query(
        deps.as_ref(),
        env,
        QueryMsg::ArithmeticTwapToNow {
            pool_id: 1,
            base_asset: DENOM1.to_string(),
            quote_asset: DENOM0.to_string(),
            start_time: start.block.time.plus_seconds(90),
        },
    )
    .is_ok());
}

#[test]
fn update_config() {
    let mut deps = setup();

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(AMM, &[]),
        ExecuteMsg::UpdateConfig {
            amm_contract: Some("new_amm".to_string()),
            record_history_keep_period: None,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::Unauthorized {});

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::UpdateConfig {
            amm_contract: None,
            record_history_keep_period: Some(0),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::InvalidKeepPeriod {});

    let res = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::UpdateConfig {
            amm_contract: Some("new_amm".to_string()),
            record_history_keep_period: Some(3600),
        },
    )
    .unwrap();
    assert_eq!(attribute(&res.events[0], "amm_contract"), Some("new_amm"));

    let res: ConfigResponse =
        from_json(query(deps.as_ref(), mock_env(), QueryMsg::Config {}).unwrap()).unwrap();
    assert_eq!(
        res,
        ConfigResponse {
            owner: Addr::unchecked(OWNER),
            amm_contract: Addr::unchecked("new_amm"),
            record_history_keep_period: 3600,
        }
    );
}

#[test]
fn ownership_handover() {
    let mut deps = setup();
    let env = mock_env();

    execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        ExecuteMsg::ProposeNewOwner {
            owner: "new_owner".to_string(),
            expires_in: 100,
        },
    )
    .unwrap();

    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info("someone", &[]),
        ExecuteMsg::ClaimOwnership {},
    )
    .unwrap_err();
    assert_eq!(err, ContractError::Std(StdError::generic_err("Unauthorized")));

    execute(
        deps.as_mut(),
        env.clone(),
        mock_info("new_owner", &[]),
        ExecuteMsg::ClaimOwnership {},
    )
    .unwrap();
    let config = CONFIG.load(deps.as_ref().storage).unwrap();
    assert_eq!(config.owner, Addr::unchecked("new_owner"));

    // the previous owner lost its rights
    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        ExecuteMsg::DropOwnershipProposal {},
    )
    .unwrap_err();
    assert_eq!(err, ContractError::Std(StdError::generic_err("Unauthorized")));

    execute(
        deps.as_mut(),
        env.clone(),
        mock_info("new_owner", &[]),
        ExecuteMsg::ProposeNewOwner {
            owner: OWNER.to_string(),
            expires_in: 100,
        },
    )
    .unwrap();
    execute(
        deps.as_mut(),
        env.clone(),
        mock_info("new_owner", &[]),
        ExecuteMsg::DropOwnershipProposal {},
    )
    .unwrap();
    let err = execute(
        deps.as_mut(),
        env,
        mock_info(OWNER, &[]),
        ExecuteMsg::ClaimOwnership {},
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::Std(StdError::generic_err("Ownership proposal not found"))
    );
}

#[test]
fn expired_ownership_proposal_cannot_be_claimed() {
    let mut deps = setup();
    let mut env = mock_env();

    execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        ExecuteMsg::ProposeNewOwner {
            owner: "new_owner".to_string(),
            expires_in: 100,
        },
    )
    .unwrap();

    env.block.time = Timestamp::from_seconds(env.block.time.seconds() + 101);
    let err = execute(
        deps.as_mut(),
        env,
        mock_info("new_owner", &[]),
        ExecuteMsg::ClaimOwnership {},
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::Std(StdError::generic_err("Ownership proposal expired"))
    );
}

#[test]
fn migrate_keeps_state() {
    let mut deps = setup();
    migrate(deps.as_mut(), mock_env(), MigrateMsg {}).unwrap();
    assert_eq!(
        CONFIG.load(deps.as_ref().storage).unwrap().amm_contract,
        Addr::unchecked(AMM)
    );
}
