use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, DepsMut, Env, Event, MessageInfo, Response, StdError, StdResult};
use cw_storage_plus::Item;

/// Constructors for the events emitted by the TWAP oracle.
pub trait EventExt {
    /// Event for an action triggered by a transaction, tagged with its sender.
    fn from_sender(ty: impl Into<String>, sender: impl Into<String>) -> Event;
    /// Event for an action triggered by the chain itself.
    fn from_sudo(ty: impl Into<String>) -> Event;
}

impl EventExt for Event {
    fn from_sender(ty: impl Into<String>, sender: impl Into<String>) -> Event {
        Event::new(ty).add_attribute("tx_executor", sender)
    }

    fn from_sudo(ty: impl Into<String>) -> Event {
        Event::new(ty).add_attribute("sudo", "true")
    }
}

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x       Ownership Update helper functions          x----------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// ## Description
/// A pending request to hand a contract over to a new owner.
#[cw_serde]
pub struct OwnershipProposal {
    /// The proposed owner
    pub owner: Addr,
    /// Block time (seconds) after which the proposal can no longer be claimed
    pub ttl: u64,
}

/// ## Description
/// Stores a new ownership proposal. Only the current owner can execute it.
/// ## Params
/// * **contract_name** prefixes the emitted event type.
/// * **new_owner** is the proposed owner.
/// * **expires_in** is the number of seconds the proposal stays valid.
/// * **owner** is the current owner.
/// * **proposal** is the storage slot of type [`OwnershipProposal`].
#[allow(clippy::too_many_arguments)]
pub fn propose_new_owner(
    deps: DepsMut,
    info: MessageInfo,
    env: Env,
    contract_name: &str,
    new_owner: String,
    expires_in: u64,
    owner: Addr,
    proposal: Item<OwnershipProposal>,
) -> StdResult<Response> {
    if info.sender != owner {
        return Err(StdError::generic_err("Unauthorized"));
    }

    let new_owner = deps.api.addr_validate(&new_owner)?;
    if new_owner == owner {
        return Err(StdError::generic_err("New owner cannot be same"));
    }

    let ttl = env.block.time.seconds().saturating_add(expires_in);
    proposal.save(
        deps.storage,
        &OwnershipProposal {
            owner: new_owner.clone(),
            ttl,
        },
    )?;

    let event = Event::from_sender(format!("{}::propose_new_owner", contract_name), info.sender)
        .add_attribute("new_owner", new_owner)
        .add_attribute("ttl", ttl.to_string());
    Ok(Response::new().add_event(event))
}

/// ## Description
/// Removes a pending ownership proposal. Only the current owner can execute it.
pub fn drop_ownership_proposal(
    deps: DepsMut,
    info: MessageInfo,
    contract_name: &str,
    owner: Addr,
    proposal: Item<OwnershipProposal>,
) -> StdResult<Response> {
    if info.sender != owner {
        return Err(StdError::generic_err("Unauthorized"));
    }

    proposal.remove(deps.storage);
    let event = Event::from_sender(format!("{}::drop_ownership_proposal", contract_name), info.sender);
    Ok(Response::new().add_event(event))
}

/// ## Description
/// The proposed owner claims the contract. `callback` persists the new owner in the contract's
/// own config.
pub fn claim_ownership(
    deps: DepsMut,
    info: MessageInfo,
    env: Env,
    contract_name: &str,
    ownership_proposal: Item<OwnershipProposal>,
    callback: fn(DepsMut, Addr) -> StdResult<()>,
) -> StdResult<Response> {
    let proposal: OwnershipProposal = ownership_proposal
        .load(deps.storage)
        .map_err(|_| StdError::generic_err("Ownership proposal not found"))?;

    if info.sender != proposal.owner {
        return Err(StdError::generic_err("Unauthorized"));
    }

    if env.block.time.seconds() > proposal.ttl {
        return Err(StdError::generic_err("Ownership proposal expired"));
    }

    ownership_proposal.remove(deps.storage);
    callback(deps, proposal.owner.clone())?;

    let event = Event::from_sender(format!("{}::claim_ownership", contract_name), info.sender)
        .add_attribute("new_owner", proposal.owner);
    Ok(Response::new().add_event(event))
}
