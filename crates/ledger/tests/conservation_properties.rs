//! Property tests over random operation sequences.
//!
//! Whatever mix of accepted and rejected operations runs, the ledger keeps
//! `total_supply - total_burned == Σ pools + Σ accounts` and no rejected
//! operation changes anything.

use eureka_ledger::{proof_hash, GenesisConfig, Ledger, LedgerConfig, LedgerError};
use eureka_types::{eka, Address, SessionId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Start { who: usize, work_type: u8, difficulty: u8 },
    Prove { who: usize, session: u64, nonce: u32, complexity: u8, tier: u8 },
    Discover { who: usize, work_type: u8, complexity: u8, tier: u8 },
    Register { who: usize, stake_eka: u64 },
    Deactivate { who: usize },
    Transfer { from: usize, to: usize, amount_eka: u64 },
    Health { score: u16 },
    Pause,
    Unpause,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4, 0u8..20, 0u8..55).prop_map(|(who, work_type, difficulty)| Op::Start {
            who,
            work_type,
            difficulty
        }),
        (0usize..4, 0u64..12, any::<u32>(), 0u8..105, 0u8..12).prop_map(
            |(who, session, nonce, complexity, tier)| Op::Prove {
                who,
                session,
                nonce,
                complexity,
                tier
            }
        ),
        (0usize..4, 0u8..20, 0u8..105, 0u8..12).prop_map(|(who, work_type, complexity, tier)| {
            Op::Discover {
                who,
                work_type,
                complexity,
                tier,
            }
        }),
        (0usize..4, 0u64..3_000).prop_map(|(who, stake_eka)| Op::Register { who, stake_eka }),
        (0usize..4).prop_map(|who| Op::Deactivate { who }),
        (0usize..4, 0usize..4, 0u64..5_000).prop_map(|(from, to, amount_eka)| Op::Transfer {
            from,
            to,
            amount_eka
        }),
        (0u16..110).prop_map(|score| Op::Health { score }),
        Just(Op::Pause),
        Just(Op::Unpause),
    ]
}

fn participants() -> Vec<Address> {
    (0..4)
        .map(|i| Address::from_label(&format!("participant-{i}")))
        .collect()
}

fn apply(ledger: &mut Ledger, people: &[Address], op: &Op) -> Result<(), LedgerError> {
    let operator = ledger.config().operator;
    match *op {
        Op::Start {
            who,
            work_type,
            difficulty,
        } => ledger
            .start_session(people[who], work_type, difficulty)
            .map(|_| ()),
        Op::Prove {
            who,
            session,
            nonce,
            complexity,
            tier,
        } => {
            let session = SessionId(session);
            let digest = proof_hash(session, nonce, complexity, tier);
            ledger
                .submit_proof(people[who], session, nonce, digest, complexity, tier)
                .map(|_| ())
        }
        Op::Discover {
            who,
            work_type,
            complexity,
            tier,
        } => ledger
            .submit_discovery(people[who], work_type, complexity, tier)
            .map(|_| ()),
        Op::Register { who, stake_eka } => ledger.register_validator(people[who], eka(stake_eka)),
        Op::Deactivate { who } => ledger
            .deactivate_validator(people[who], people[who])
            .map(|_| ()),
        Op::Transfer {
            from,
            to,
            amount_eka,
        } => ledger
            .transfer(people[from], people[to], eka(amount_eka))
            .map(|_| ()),
        Op::Health { score } => ledger.update_network_health(operator, score).map(|_| ()),
        Op::Pause => ledger.emergency_pause(operator),
        Op::Unpause => ledger.emergency_unpause(operator),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn conservation_holds_for_any_sequence(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let people = participants();
        let genesis = people
            .iter()
            .fold(GenesisConfig::default(), |g, p| g.with_account(*p, eka(20_000)));
        let mut ledger = Ledger::new(LedgerConfig { genesis, ..Default::default() }).unwrap();

        for op in &ops {
            let before = ledger.snapshot();
            let result = apply(&mut ledger, &people, op);
            if result.is_err() {
                prop_assert_eq!(ledger.snapshot(), before, "rejected {:?} changed state", op);
            }
            prop_assert!(ledger.verify_conservation().is_ok(), "after {:?}", op);
        }

        let global = ledger.global_state();
        prop_assert!(global.cumulative_emission <= ledger.config().economics.soft_cap_micro);
        prop_assert_eq!(global.next_discovery_id, ledger.list_discoveries(0, usize::MAX).len() as u64 + 1);
    }

    #[test]
    fn paused_ledger_rejects_all_mutations(ops in prop::collection::vec(op_strategy(), 1..20)) {
        let people = participants();
        let genesis = people
            .iter()
            .fold(GenesisConfig::default(), |g, p| g.with_account(*p, eka(20_000)));
        let mut ledger = Ledger::new(LedgerConfig { genesis, ..Default::default() }).unwrap();
        let operator = ledger.config().operator;
        ledger.emergency_pause(operator).unwrap();

        for op in ops.iter().filter(|op| !matches!(op, Op::Pause | Op::Unpause)) {
            prop_assert_eq!(apply(&mut ledger, &people, op), Err(LedgerError::ContractPaused));
        }
    }
}
