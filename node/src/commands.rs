//! Operator and participant commands run against a loaded ledger.

use anyhow::{anyhow, Context, Result};
use eureka_economics::emission_curve;
use eureka_ledger::{find_nonce, proof_hash, Ledger};
use eureka_security::{AuditEvent, SecurityState};
use eureka_types::{
    format_eka, Address, BlockHeight, DiscoveryId, MicroEka, SessionId, WorkType,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::info;

/// Prefix for dev addresses derived from a label instead of written in hex.
const LABEL_PREFIX: &str = "label:";

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    Status,
    StartSession {
        miner: Address,
        work_type: WorkType,
        difficulty: u8,
    },
    /// Without a nonce the node searches for one; without a target it uses
    /// the digest of the given nonce.
    SubmitProof {
        miner: Address,
        session: SessionId,
        nonce: Option<u32>,
        target: Option<u128>,
        complexity: u8,
        tier: u8,
        max_nonce: u32,
    },
    SubmitDiscovery {
        researcher: Address,
        work_type: WorkType,
        complexity: u8,
        tier: u8,
    },
    Pause {
        caller: Address,
    },
    Unpause {
        caller: Address,
    },
    Health {
        caller: Address,
        score: u16,
    },
    RegisterValidator {
        address: Address,
        stake: MicroEka,
    },
    DeactivateValidator {
        caller: Address,
        address: Address,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: MicroEka,
    },
    Session {
        id: SessionId,
    },
    Discovery {
        id: DiscoveryId,
    },
    Discoveries {
        offset: usize,
        limit: usize,
    },
    Balance {
        address: Address,
    },
    Validators,
    Curve {
        start: BlockHeight,
        end: BlockHeight,
        step: BlockHeight,
    },
}

impl LedgerCommand {
    /// Whether a successful run changes ledger state and must be persisted.
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            LedgerCommand::Status
                | LedgerCommand::Session { .. }
                | LedgerCommand::Discovery { .. }
                | LedgerCommand::Discoveries { .. }
                | LedgerCommand::Balance { .. }
                | LedgerCommand::Validators
                | LedgerCommand::Curve { .. }
        )
    }
}

/// Accepts an `e`-prefixed hex address or `label:<name>`.
pub fn parse_participant(value: &str) -> Result<Address> {
    if let Some(label) = value.strip_prefix(LABEL_PREFIX) {
        return Ok(Address::from_label(label));
    }
    Address::from_str(value).with_context(|| format!("invalid address {value}"))
}

pub fn parse_work_type(value: &str) -> Result<WorkType> {
    WorkType::from_str(value).map_err(|e| anyhow!("{e}"))
}

#[derive(Serialize)]
struct SecurityView {
    paused: bool,
    health_score: u16,
    scaling_rate_bps: u32,
}

impl From<SecurityState> for SecurityView {
    fn from(state: SecurityState) -> Self {
        Self {
            paused: state.paused,
            health_score: state.health_score,
            scaling_rate_bps: state.scaling_rate,
        }
    }
}

#[derive(Serialize)]
struct Status {
    block_height: BlockHeight,
    total_supply: String,
    total_burned: String,
    circulating: String,
    total_research_value: String,
    cumulative_emission: String,
    next_discovery_id: u64,
    security: SecurityView,
    pools: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct SecurityOutcome {
    state: SecurityView,
    recorded: Vec<AuditEvent>,
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("failed to encode output")
}

fn status(ledger: &Ledger) -> Result<Value> {
    let global = ledger.global_state();
    let pools = ledger
        .pool_balances()
        .iter()
        .map(|(pool, balance)| (pool.name().to_string(), format_eka(balance)))
        .collect();
    to_json(&Status {
        block_height: global.block_height,
        total_supply: format_eka(global.total_supply),
        total_burned: format_eka(global.total_burned),
        circulating: format_eka(global.circulating().unwrap_or_default()),
        total_research_value: format_eka(global.total_research_value),
        cumulative_emission: format_eka(global.cumulative_emission),
        next_discovery_id: global.next_discovery_id,
        security: ledger.security_state().into(),
        pools,
    })
}

fn security_outcome(ledger: &Ledger, audit_before: usize) -> Result<Value> {
    let log = ledger.audit_log();
    let recorded = log.recent(log.len().saturating_sub(audit_before));
    to_json(&SecurityOutcome {
        state: ledger.security_state().into(),
        recorded,
    })
}

/// Run one command. Ledger errors surface with their own message.
pub fn execute(ledger: &mut Ledger, command: &LedgerCommand) -> Result<Value> {
    let audit_before = ledger.audit_log().len();
    match *command {
        LedgerCommand::Status => status(ledger),
        LedgerCommand::StartSession {
            miner,
            work_type,
            difficulty,
        } => {
            let id = ledger.start_session(miner, work_type.code(), difficulty)?;
            info!("Session {} opened for {}", id, miner);
            to_json(&ledger.get_session(id))
        }
        LedgerCommand::SubmitProof {
            miner,
            session,
            nonce,
            target,
            complexity,
            tier,
            max_nonce,
        } => {
            let (nonce, target) = match nonce {
                Some(nonce) => (
                    nonce,
                    target.unwrap_or_else(|| proof_hash(session, nonce, complexity, tier)),
                ),
                None => {
                    let difficulty = ledger
                        .get_session(session)
                        .map(|s| s.difficulty)
                        .ok_or_else(|| anyhow!("session {session} not found"))?;
                    find_nonce(session, difficulty, complexity, tier, max_nonce).ok_or_else(
                        || anyhow!("no nonce up to {max_nonce} meets difficulty {difficulty}"),
                    )?
                }
            };
            let id = ledger.submit_proof(miner, session, nonce, target, complexity, tier)?;
            info!("Proof accepted for session {} (nonce {})", session, nonce);
            to_json(&ledger.get_discovery(id))
        }
        LedgerCommand::SubmitDiscovery {
            researcher,
            work_type,
            complexity,
            tier,
        } => {
            let id = ledger.submit_discovery(researcher, work_type.code(), complexity, tier)?;
            to_json(&ledger.get_discovery(id))
        }
        LedgerCommand::Pause { caller } => {
            ledger.emergency_pause(caller)?;
            security_outcome(ledger, audit_before)
        }
        LedgerCommand::Unpause { caller } => {
            ledger.emergency_unpause(caller)?;
            security_outcome(ledger, audit_before)
        }
        LedgerCommand::Health { caller, score } => {
            ledger.update_network_health(caller, score)?;
            security_outcome(ledger, audit_before)
        }
        LedgerCommand::RegisterValidator { address, stake } => {
            ledger.register_validator(address, stake)?;
            to_json(&ledger.get_validator(&address))
        }
        LedgerCommand::DeactivateValidator { caller, address } => {
            let returned = ledger.deactivate_validator(caller, address)?;
            Ok(serde_json::json!({
                "validator": address.to_string(),
                "returned_stake": format_eka(returned),
            }))
        }
        LedgerCommand::Transfer { from, to, amount } => {
            let fee = ledger.transfer(from, to, amount)?;
            Ok(serde_json::json!({
                "from": from.to_string(),
                "to": to.to_string(),
                "amount": format_eka(amount),
                "fee": format_eka(fee),
            }))
        }
        LedgerCommand::Session { id } => to_json(&ledger.get_session(id)),
        LedgerCommand::Discovery { id } => to_json(&ledger.get_discovery(id)),
        LedgerCommand::Discoveries { offset, limit } => {
            to_json(&ledger.list_discoveries(offset, limit))
        }
        LedgerCommand::Balance { address } => Ok(serde_json::json!({
            "address": address.to_string(),
            "balance": format_eka(ledger.balance_of(&address)),
            "active_sessions": ledger.active_sessions_of(&address).iter().map(|s| s.0).collect::<Vec<_>>(),
            "validator_rewards": format_eka(ledger.validator_rewards_total(&address)),
        })),
        LedgerCommand::Validators => to_json(&ledger.validators()),
        LedgerCommand::Curve { start, end, step } => {
            let points = emission_curve(
                start,
                end,
                step,
                ledger.global_state().total_research_value,
                &ledger.config().economics,
            )?;
            to_json(&points)
        }
    }
}
