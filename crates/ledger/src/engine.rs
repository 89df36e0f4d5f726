//! The discovery-mining state machine.
//!
//! Every mutating operation follows the same shape: refuse while paused,
//! then validate inputs and build a `Staged` overlay, verify conservation on the
//! staged values and only then apply the change set. A rejected operation
//! leaves no trace apart from the audit trail.

use crate::config::{LedgerConfig, VerificationMode};
use crate::discovery::{self, NewDiscovery};
use crate::errors::{LedgerError, Result};
use crate::minting::burn_for_discovery;
use crate::pow::verify_proof;
use crate::sessions::{self, parse_work_type};
use crate::staged::{ChangeSet, Staged};
use crate::state::{GlobalLedgerState, LedgerState};
use chrono::Utc;
use eureka_economics::{
    miner_reward, research_value, transfer_fee, validate_complexity, validate_difficulty,
};
use eureka_security::{
    AuditLog, CircuitBreakerState, SecurityEvent, SecurityManager, SecurityState,
};
use eureka_treasury::{AccountLedger, InMemoryAccountLedger, PoolBalances, PoolKind, RewardSink};
use eureka_types::{
    Address, Discovery, DiscoveryId, DiscoveryOrigin, MicroEka, MiningSession, SessionId,
    Validator, MAX_SIGNIFICANCE_TIER,
};
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Run `op` against a staged view of `state` and commit it atomically.
fn commit<T>(
    state: &mut LedgerState,
    op: &'static str,
    build: impl FnOnce(&mut Staged<'_>) -> Result<T>,
) -> Result<T> {
    let (out, changes): (T, ChangeSet) = {
        let mut staged = Staged::new(state);
        let out = match build(&mut staged) {
            Ok(out) => out,
            Err(err) => {
                metrics::counter!("eureka_ledger_rejected_total", "op" => op).increment(1);
                return Err(err);
            }
        };
        if !staged.conserves() {
            error!(target: "ledger", "{} would break conservation; rejected", op);
            return Err(LedgerError::InvariantViolation(format!(
                "{op} would break conservation"
            )));
        }
        (out, staged.into_changes())
    };
    state.apply(changes);

    metrics::counter!("eureka_ledger_operations_total", "op" => op).increment(1);
    metrics::gauge!("eureka_ledger_block_height").set(state.global().block_height as f64);
    Ok(out)
}

fn validate_tier(tier: u8) -> Result<()> {
    if tier > MAX_SIGNIFICANCE_TIER {
        return Err(LedgerError::InvalidSignificance(tier));
    }
    Ok(())
}

/// Single authoritative ledger instance.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub(crate) state: LedgerState,
    pub(crate) security: SecurityManager,
    pub(crate) config: LedgerConfig,
}

impl Ledger {
    /// Create a ledger at genesis.
    pub fn new(config: LedgerConfig) -> Result<Self> {
        config.validate()?;

        let mut pools = PoolBalances::new();
        for (pool, amount) in &config.genesis.pools {
            pools.credit(*pool, *amount)?;
        }
        let accounts = InMemoryAccountLedger::from_balances(config.genesis.accounts.clone())?;
        let total_supply = config
            .genesis
            .total_supply()
            .ok_or_else(|| LedgerError::InvalidConfig("genesis allocations overflow".into()))?;

        let state = LedgerState::from_parts(
            pools,
            accounts,
            Vec::new(),
            Vec::new(),
            BTreeMap::new(),
            GlobalLedgerState::genesis(total_supply),
            RewardSink::new(),
        );
        let security = SecurityManager::new(config.operator, config.health_policy)
            .map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;

        let ledger = Self::assemble(state, security, config)?;
        info!(
            target: "ledger",
            "Ledger created at genesis with total supply {} µEKA",
            total_supply
        );
        Ok(ledger)
    }

    pub(crate) fn assemble(
        state: LedgerState,
        security: SecurityManager,
        config: LedgerConfig,
    ) -> Result<Self> {
        state.verify()?;
        let mut ledger = Self {
            state,
            security,
            config,
        };
        if ledger.config.verification == VerificationMode::Relaxed {
            warn!(
                target: "ledger",
                "Relaxed proof verification is ENABLED; proofs are not checked"
            );
            ledger.security.record(SecurityEvent::RelaxedVerificationEnabled);
        }
        Ok(ledger)
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    // ---------------------------------------------------------------------
    // Session manager
    // ---------------------------------------------------------------------

    /// Open a mining session for `participant`.
    pub fn start_session(
        &mut self,
        participant: Address,
        work_type: u8,
        difficulty: u8,
    ) -> Result<SessionId> {
        self.security.ensure_active()?;

        let limit = self.config.max_active_sessions;
        let active = self.state.active_session_count(&participant);
        let timestamp = Self::now();
        let (id, work_type) = commit(&mut self.state, "start_session", |staged| {
            let work_type = parse_work_type(work_type)?;
            validate_difficulty(difficulty)?;
            if active >= limit {
                return Err(LedgerError::TooManyActiveSessions {
                    miner: participant,
                    limit,
                });
            }

            let height = staged.advance_height();
            let id = sessions::open(
                staged,
                participant,
                work_type,
                difficulty,
                height,
                timestamp,
            );
            Ok((id, work_type))
        })?;

        info!(
            target: "ledger",
            "{} opened by {} ({}, difficulty {})",
            id,
            participant,
            work_type,
            difficulty
        );
        Ok(id)
    }

    // ---------------------------------------------------------------------
    // Proof-of-work verifier
    // ---------------------------------------------------------------------

    /// Submit the proof for a session. On acceptance the miner is paid, a
    /// discovery is registered and validators are rewarded.
    pub fn submit_proof(
        &mut self,
        caller: Address,
        session_id: SessionId,
        nonce: u32,
        target_hash: u128,
        complexity: u8,
        significance_tier: u8,
    ) -> Result<DiscoveryId> {
        self.security.ensure_active()?;

        let mode = self.config.verification;
        let scaling = self.security.scaling_rate_bps();
        let params = &self.config.economics;
        let timestamp = Self::now();

        let outcome = commit(&mut self.state, "submit_proof", |staged| {
            let session = sessions::claim(staged, session_id, &caller)?;
            validate_complexity(complexity)?;
            validate_tier(significance_tier)?;
            verify_proof(
                session_id,
                session.difficulty,
                nonce,
                target_hash,
                complexity,
                significance_tier,
                mode,
            )?;

            let height = staged.advance_height();
            let reward = miner_reward(
                complexity,
                significance_tier,
                session.difficulty,
                scaling,
                params,
            )?;
            if reward > 0 {
                staged.pools.debit(PoolKind::MiningRewards, reward)?;
                staged.accounts.credit(&caller, reward)?;
            }

            let value = research_value(session.work_type, complexity, significance_tier, params)?;
            let discovery_id = discovery::register(
                staged,
                NewDiscovery {
                    work_type: session.work_type,
                    complexity,
                    significance_tier,
                    research_value: value,
                    researcher: caller,
                    origin: DiscoveryOrigin::FromProof,
                },
                height,
                timestamp,
                scaling,
                params,
            )?;
            sessions::complete(staged, session, discovery_id);
            Ok((discovery_id, reward))
        });

        match outcome {
            Ok((discovery_id, reward)) => {
                metrics::counter!("eureka_ledger_proofs_accepted_total").increment(1);
                info!(
                    target: "ledger",
                    "Proof for {} accepted: {} created, miner paid {} µEKA",
                    session_id,
                    discovery_id,
                    reward
                );
                Ok(discovery_id)
            }
            Err(err) => {
                if matches!(err, LedgerError::ProofRejected { .. }) {
                    metrics::counter!("eureka_ledger_proofs_rejected_total").increment(1);
                }
                warn!(target: "ledger", "Proof for {} rejected: {}", session_id, err);
                Err(err)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Discovery registry (direct path)
    // ---------------------------------------------------------------------

    /// Register a discovery directly. The researcher burns the category share
    /// of its research value.
    pub fn submit_discovery(
        &mut self,
        researcher: Address,
        work_type: u8,
        complexity: u8,
        significance_tier: u8,
    ) -> Result<DiscoveryId> {
        self.security.ensure_active()?;

        let scaling = self.security.scaling_rate_bps();
        let params = &self.config.economics;
        let timestamp = Self::now();

        let (id, burned) = commit(&mut self.state, "submit_discovery", |staged| {
            let work_type = parse_work_type(work_type)?;
            validate_complexity(complexity)?;
            validate_tier(significance_tier)?;
            let value = research_value(work_type, complexity, significance_tier, params)?;
            let burned = burn_for_discovery(staged, &researcher, value, work_type.category())?;

            let height = staged.advance_height();
            let id = discovery::register(
                staged,
                NewDiscovery {
                    work_type,
                    complexity,
                    significance_tier,
                    research_value: value,
                    researcher,
                    origin: DiscoveryOrigin::Direct,
                },
                height,
                timestamp,
                scaling,
                params,
            )?;
            Ok((id, burned))
        })?;

        metrics::counter!("eureka_ledger_burned_micro_total")
            .increment(u64::try_from(burned).unwrap_or(u64::MAX));
        info!(
            target: "ledger",
            "{} submitted directly by {}: burned {} µEKA",
            id,
            researcher,
            burned
        );
        Ok(id)
    }

    // ---------------------------------------------------------------------
    // Security controls
    // ---------------------------------------------------------------------

    pub fn emergency_pause(&mut self, caller: Address) -> Result<()> {
        self.security.emergency_pause(&caller)?;
        warn!(target: "ledger", "Emergency pause engaged by {}", caller);
        Ok(())
    }

    pub fn emergency_unpause(&mut self, caller: Address) -> Result<()> {
        self.security.emergency_unpause(&caller)?;
        info!(target: "ledger", "Emergency pause lifted by {}", caller);
        Ok(())
    }

    pub fn update_network_health(&mut self, caller: Address, score: u16) -> Result<SecurityState> {
        let state = self.security.update_network_health(&caller, score)?;
        metrics::gauge!("eureka_ledger_network_health").set(score as f64);
        match self.security.circuit_state() {
            CircuitBreakerState::Open => {
                warn!(target: "ledger", "Network health {}: reward circuit open, payouts are zero", score)
            }
            CircuitBreakerState::Throttled => info!(
                target: "ledger",
                "Network health {}: rewards throttled to {} bps",
                score,
                state.scaling_rate
            ),
            CircuitBreakerState::Closed => {}
        }
        Ok(state)
    }

    // ---------------------------------------------------------------------
    // Validator registry and transfers
    // ---------------------------------------------------------------------

    /// Lock `stake` from `address` into the staking pool and activate it as a validator.
    pub fn register_validator(&mut self, address: Address, stake: MicroEka) -> Result<()> {
        self.security.ensure_active()?;
        let minimum = self.config.min_validator_stake;

        commit(&mut self.state, "register_validator", |staged| {
            if stake < minimum {
                return Err(LedgerError::StakeTooLow { stake, minimum });
            }
            let existing = staged.validator(&address);
            if existing.as_ref().is_some_and(|v| v.active) {
                return Err(LedgerError::ValidatorAlreadyRegistered(address));
            }
            staged.accounts.debit(&address, stake)?;
            staged.pools.credit(PoolKind::Staking, stake)?;

            let height = staged.advance_height();
            let mut validator = Validator::new(address, stake, height);
            if let Some(previous) = existing {
                validator.total_validations = previous.total_validations;
            }
            staged.put_validator(validator);
            Ok(())
        })?;

        info!(target: "ledger", "Validator {} registered with stake {} µEKA", address, stake);
        Ok(())
    }

    /// Deactivate a validator and return its stake. Only the validator may do this.
    pub fn deactivate_validator(&mut self, caller: Address, address: Address) -> Result<MicroEka> {
        self.security.ensure_active()?;

        let returned = commit(&mut self.state, "deactivate_validator", |staged| {
            if caller != address {
                return Err(LedgerError::Unauthorized {
                    caller,
                    action: format!("deactivate validator {address}"),
                });
            }
            let mut validator = staged
                .validator(&address)
                .filter(|v| v.active)
                .ok_or(LedgerError::ValidatorNotFound(address))?;
            let stake = validator.stake;
            staged.pools.debit(PoolKind::Staking, stake)?;
            staged.accounts.credit(&address, stake)?;

            validator.active = false;
            validator.stake = 0;
            staged.put_validator(validator);
            staged.advance_height();
            Ok(stake)
        })?;

        info!(target: "ledger", "Validator {} deactivated, {} µEKA returned", address, returned);
        Ok(returned)
    }

    /// Move `amount` between participants. The fee is withheld from `amount`
    /// and routed to the transaction-fee pool. Returns the fee.
    pub fn transfer(&mut self, from: Address, to: Address, amount: MicroEka) -> Result<MicroEka> {
        self.security.ensure_active()?;
        let fee = transfer_fee(amount, &self.config.economics);

        commit(&mut self.state, "transfer", |staged| {
            if amount == 0 {
                return Err(LedgerError::InvalidAmount);
            }
            staged.accounts.debit(&from, amount)?;
            staged.accounts.credit(&to, amount - fee)?;
            staged.pools.credit(PoolKind::TransactionFee, fee)?;
            staged.advance_height();
            Ok(())
        })?;
        Ok(fee)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn get_session(&self, id: SessionId) -> Option<MiningSession> {
        self.state.session(id).cloned()
    }

    pub fn get_discovery(&self, id: DiscoveryId) -> Option<Discovery> {
        self.state.discovery(id).cloned()
    }

    pub fn list_discoveries(&self, offset: usize, limit: usize) -> Vec<Discovery> {
        self.state
            .discoveries()
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn active_sessions_of(&self, miner: &Address) -> Vec<SessionId> {
        self.state.active_sessions_of(miner)
    }

    pub fn pool_balances(&self) -> PoolBalances {
        *self.state.pools()
    }

    pub fn global_state(&self) -> GlobalLedgerState {
        *self.state.global()
    }

    pub fn security_state(&self) -> SecurityState {
        self.security.state()
    }

    pub fn balance_of(&self, participant: &Address) -> MicroEka {
        self.state.balance_of(participant)
    }

    pub fn get_validator(&self, address: &Address) -> Option<Validator> {
        self.state.validators().get(address).cloned()
    }

    pub fn validators(&self) -> Vec<Validator> {
        self.state.validators().values().cloned().collect()
    }

    pub fn validator_rewards_total(&self, address: &Address) -> MicroEka {
        self.state.reward_sink().validator_total(address)
    }

    pub fn reward_sink(&self) -> &RewardSink {
        self.state.reward_sink()
    }

    pub fn audit_log(&self) -> &AuditLog {
        self.security.audit()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Full conservation and structure check over the committed state.
    pub fn verify_conservation(&self) -> Result<()> {
        self.state.verify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenesisConfig;
    use crate::pow::proof_hash;
    use eureka_types::{eka, WorkType};

    fn operator() -> Address {
        Address::from_label("operator")
    }

    fn ledger_with(accounts: &[(&str, MicroEka)]) -> Ledger {
        let mut genesis = GenesisConfig::default();
        for (label, balance) in accounts {
            genesis = genesis.with_account(Address::from_label(label), *balance);
        }
        Ledger::new(LedgerConfig {
            operator: operator(),
            genesis,
            ..Default::default()
        })
        .unwrap()
    }

    fn prove(ledger: &mut Ledger, miner: Address, session: SessionId) -> Result<DiscoveryId> {
        let digest = proof_hash(session, 0, 10, 1);
        ledger.submit_proof(miner, session, 0, digest, 10, 1)
    }

    #[test]
    fn session_lifecycle() {
        let mut ledger = ledger_with(&[]);
        let alice = Address::from_label("alice");

        let id = ledger
            .start_session(alice, WorkType::PrimePatterns.code(), 1)
            .unwrap();
        assert_eq!(id, SessionId(1));
        assert_eq!(ledger.active_sessions_of(&alice), vec![id]);
        assert_eq!(ledger.global_state().block_height, 1);

        let discovery = prove(&mut ledger, alice, id).unwrap();
        let session = ledger.get_session(id).unwrap();
        assert!(!session.active);
        assert_eq!(session.discovery, Some(discovery));
        assert!(ledger.active_sessions_of(&alice).is_empty());
        assert!(ledger.verify_conservation().is_ok());
    }

    #[test]
    fn rejects_bad_session_inputs() {
        let mut ledger = ledger_with(&[]);
        let alice = Address::from_label("alice");
        assert_eq!(
            ledger.start_session(alice, 99, 1),
            Err(LedgerError::InvalidWorkType(99))
        );
        assert_eq!(
            ledger.start_session(alice, 0, 0),
            Err(LedgerError::InvalidDifficulty(0))
        );
        assert_eq!(
            ledger.start_session(alice, 0, 51),
            Err(LedgerError::InvalidDifficulty(51))
        );
        assert_eq!(ledger.global_state().block_height, 0);
    }

    #[test]
    fn session_cap_is_enforced() {
        let mut ledger = ledger_with(&[]);
        let alice = Address::from_label("alice");
        for _ in 0..5 {
            ledger.start_session(alice, 0, 1).unwrap();
        }
        assert!(matches!(
            ledger.start_session(alice, 0, 1),
            Err(LedgerError::TooManyActiveSessions { limit: 5, .. })
        ));
        prove(&mut ledger, alice, SessionId(1)).unwrap();
        assert!(ledger.start_session(alice, 0, 1).is_ok());
    }

    #[test]
    fn only_owner_may_submit() {
        let mut ledger = ledger_with(&[]);
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        let id = ledger.start_session(alice, 0, 1).unwrap();
        assert!(matches!(
            prove(&mut ledger, bob, id),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert_eq!(
            prove(&mut ledger, alice, SessionId(42)),
            Err(LedgerError::SessionNotFound(SessionId(42)))
        );
        assert!(ledger.get_session(id).unwrap().active);
    }

    #[test]
    fn proof_pays_miner_and_mints() {
        let mut ledger = ledger_with(&[]);
        let alice = Address::from_label("alice");
        let id = ledger.start_session(alice, WorkType::RiemannZeros.code(), 1).unwrap();
        let before = ledger.global_state();

        let discovery_id = prove(&mut ledger, alice, id).unwrap();

        // 10 EKA · 1.10 · 1.25 · 1.1
        assert_eq!(ledger.balance_of(&alice), 1_512_500_000);
        let after = ledger.global_state();
        assert!(after.cumulative_emission > 0);
        assert_eq!(
            after.total_supply,
            before.total_supply + after.cumulative_emission
        );
        let discovery = ledger.get_discovery(discovery_id).unwrap();
        assert_eq!(discovery.origin, DiscoveryOrigin::FromProof);
        assert!(discovery.is_verified());
        assert_eq!(after.total_research_value, discovery.research_value);
    }

    #[test]
    fn direct_discovery_burns_and_rewards_validators() {
        let mut ledger = ledger_with(&[("alice", eka(10_000)), ("val", eka(2_000))]);
        let alice = Address::from_label("alice");
        let val = Address::from_label("val");
        ledger.register_validator(val, eka(1_000)).unwrap();

        let id = ledger
            .submit_discovery(alice, WorkType::PrimePatterns.code(), 0, 0)
            .unwrap();

        // 10% of 100 EKA
        assert_eq!(ledger.balance_of(&alice), eka(10_000) - eka(10));
        assert_eq!(ledger.global_state().total_burned, eka(10));
        // 1 EKA base + 100 EKA / 1000
        let reward = eka(1) + eka(100) / 1_000;
        assert_eq!(ledger.balance_of(&val), eka(1_000) + reward);
        assert_eq!(ledger.validator_rewards_total(&val), reward);
        assert_eq!(ledger.get_validator(&val).unwrap().total_validations, 1);
        let verification = ledger.get_discovery(id).unwrap().verification.unwrap();
        assert_eq!(verification.validators, 1);
        assert!(ledger.verify_conservation().is_ok());
    }

    #[test]
    fn insufficient_burn_balance_rolls_back() {
        let mut ledger = ledger_with(&[("poor", 1)]);
        let poor = Address::from_label("poor");
        let before = ledger.global_state();
        assert!(matches!(
            ledger.submit_discovery(poor, WorkType::YangMills.code(), 0, 0),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.global_state(), before);
        assert_eq!(ledger.balance_of(&poor), 1);
        assert!(ledger.list_discoveries(0, 10).is_empty());
    }

    #[test]
    fn pause_blocks_every_mutation() {
        let mut ledger = ledger_with(&[("alice", eka(100)), ("bob", eka(2_000))]);
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        let session = ledger.start_session(alice, 0, 1).unwrap();

        ledger.emergency_pause(operator()).unwrap();
        assert_eq!(ledger.start_session(alice, 0, 1), Err(LedgerError::ContractPaused));
        assert_eq!(prove(&mut ledger, alice, session), Err(LedgerError::ContractPaused));
        assert_eq!(ledger.submit_discovery(alice, 0, 0, 0), Err(LedgerError::ContractPaused));
        assert_eq!(ledger.update_network_health(operator(), 10), Err(LedgerError::ContractPaused));
        assert_eq!(ledger.register_validator(bob, eka(1_000)), Err(LedgerError::ContractPaused));
        assert_eq!(ledger.transfer(alice, bob, 1), Err(LedgerError::ContractPaused));

        // the pause wins over caller and input checks
        let mallory = Address::from_label("mallory");
        assert_eq!(ledger.update_network_health(mallory, 10), Err(LedgerError::ContractPaused));
        assert_eq!(ledger.start_session(alice, 200, 0), Err(LedgerError::ContractPaused));
        assert_eq!(ledger.register_validator(bob, 1), Err(LedgerError::ContractPaused));
        assert_eq!(ledger.transfer(alice, bob, 0), Err(LedgerError::ContractPaused));
        assert_eq!(ledger.security_state().health_score, 100);

        ledger.emergency_unpause(operator()).unwrap();
        assert!(prove(&mut ledger, alice, session).is_ok());
    }

    #[test]
    fn invalid_inputs_leave_no_trace() {
        let mut ledger = ledger_with(&[("alice", eka(100)), ("bob", eka(2_000))]);
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        let before = ledger.snapshot();

        assert_eq!(ledger.start_session(alice, 200, 1), Err(LedgerError::InvalidWorkType(200)));
        assert!(matches!(
            ledger.start_session(alice, 0, 0),
            Err(LedgerError::InvalidDifficulty(0))
        ));
        assert!(matches!(
            ledger.register_validator(bob, 1),
            Err(LedgerError::StakeTooLow { stake: 1, .. })
        ));
        assert_eq!(ledger.transfer(alice, bob, 0), Err(LedgerError::InvalidAmount));
        assert!(matches!(
            ledger.deactivate_validator(alice, bob),
            Err(LedgerError::Unauthorized { .. })
        ));

        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn controls_are_operator_only() {
        let mut ledger = ledger_with(&[]);
        let mallory = Address::from_label("mallory");
        assert!(matches!(
            ledger.emergency_pause(mallory),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(matches!(
            ledger.update_network_health(mallory, 0),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(!ledger.security_state().paused);
        assert_eq!(
            ledger.update_network_health(operator(), 101),
            Err(LedgerError::InvalidHealthScore(101))
        );
    }

    #[test]
    fn low_health_scales_miner_reward() {
        let mut ledger = ledger_with(&[]);
        let alice = Address::from_label("alice");
        ledger.update_network_health(operator(), 25).unwrap();
        assert_eq!(ledger.security_state().scaling_rate, 5_000);
        assert_eq!(ledger.security.circuit_state(), CircuitBreakerState::Throttled);

        let id = ledger.start_session(alice, WorkType::RiemannZeros.code(), 1).unwrap();
        prove(&mut ledger, alice, id).unwrap();
        assert_eq!(ledger.balance_of(&alice), 1_512_500_000 / 2);
    }

    #[test]
    fn validator_registration_rules() {
        let mut ledger = ledger_with(&[("val", eka(5_000))]);
        let val = Address::from_label("val");

        assert!(matches!(
            ledger.register_validator(val, eka(1)),
            Err(LedgerError::StakeTooLow { .. })
        ));
        ledger.register_validator(val, eka(1_000)).unwrap();
        assert_eq!(
            ledger.register_validator(val, eka(1_000)),
            Err(LedgerError::ValidatorAlreadyRegistered(val))
        );
        assert_eq!(ledger.balance_of(&val), eka(4_000));

        assert!(matches!(
            ledger.deactivate_validator(Address::from_label("x"), val),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert_eq!(ledger.deactivate_validator(val, val).unwrap(), eka(1_000));
        assert_eq!(ledger.balance_of(&val), eka(5_000));
        assert_eq!(
            ledger.deactivate_validator(val, val),
            Err(LedgerError::ValidatorNotFound(val))
        );
        assert!(ledger.verify_conservation().is_ok());
    }

    #[test]
    fn transfer_routes_fee_to_pool() {
        let mut ledger = ledger_with(&[("alice", eka(100))]);
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");

        let fee = ledger.transfer(alice, bob, eka(10)).unwrap();
        assert_eq!(fee, eka(10) / 1_000);
        assert_eq!(ledger.balance_of(&bob), eka(10) - fee);
        assert_eq!(ledger.pool_balances().get(PoolKind::TransactionFee), fee);
        assert_eq!(ledger.transfer(alice, bob, 0), Err(LedgerError::InvalidAmount));
        assert!(matches!(
            ledger.transfer(bob, alice, eka(1_000)),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert!(ledger.verify_conservation().is_ok());
    }

    #[test]
    fn empty_mining_pool_rejects_proof() {
        let mut ledger = Ledger::new(LedgerConfig {
            genesis: GenesisConfig::empty(),
            ..Default::default()
        })
        .unwrap();
        let alice = Address::from_label("alice");
        let id = ledger.start_session(alice, 0, 1).unwrap();
        assert!(matches!(
            prove(&mut ledger, alice, id),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert!(ledger.get_session(id).unwrap().active);
        assert_eq!(ledger.global_state().cumulative_emission, 0);
    }
}
