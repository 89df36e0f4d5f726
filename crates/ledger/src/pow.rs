//! Proof-of-work digest and difficulty threshold.
//!
//! A proof for a session is the nonce whose digest
//! `BLAKE3(session_id LE ‖ nonce LE ‖ complexity ‖ tier)`, truncated to its
//! first 16 bytes (big-endian), is at most `u128::MAX / difficulty`.

use crate::config::VerificationMode;
use crate::errors::{LedgerError, Result};
use eureka_types::{SessionId, MAX_DIFFICULTY, MIN_DIFFICULTY};

/// 128-bit proof digest for a candidate nonce.
pub fn proof_hash(session: SessionId, nonce: u32, complexity: u8, tier: u8) -> u128 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&session.0.to_le_bytes());
    hasher.update(&nonce.to_le_bytes());
    hasher.update(&[complexity, tier]);
    let digest = hasher.finalize();

    let mut head = [0u8; 16];
    head.copy_from_slice(&digest.as_bytes()[..16]);
    u128::from_be_bytes(head)
}

/// `floor((2^128 - 1) / difficulty)`. Strictly decreasing in `difficulty`.
pub fn threshold(difficulty: u8) -> Result<u128> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return Err(LedgerError::InvalidDifficulty(difficulty));
    }
    Ok(u128::MAX / difficulty as u128)
}

/// Check a submitted proof against the session's difficulty.
pub fn verify_proof(
    session: SessionId,
    difficulty: u8,
    nonce: u32,
    target_hash: u128,
    complexity: u8,
    tier: u8,
    mode: VerificationMode,
) -> Result<u128> {
    let digest = proof_hash(session, nonce, complexity, tier);
    if mode == VerificationMode::Relaxed {
        return Ok(digest);
    }

    if target_hash != digest {
        return Err(LedgerError::ProofRejected {
            session,
            reason: "target hash does not match proof digest",
        });
    }
    if digest > threshold(difficulty)? {
        return Err(LedgerError::ProofRejected {
            session,
            reason: "hash above difficulty target",
        });
    }
    Ok(digest)
}

/// Search `0..=max_nonce` for a nonce that meets `difficulty`.
///
/// Proof generation belongs to clients; this is the reference search used by
/// tooling and tests.
pub fn find_nonce(
    session: SessionId,
    difficulty: u8,
    complexity: u8,
    tier: u8,
    max_nonce: u32,
) -> Option<(u32, u128)> {
    let limit = threshold(difficulty).ok()?;
    (0..=max_nonce)
        .map(|nonce| (nonce, proof_hash(session, nonce, complexity, tier)))
        .find(|(_, digest)| *digest <= limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn difficulty_one_accepts_any_digest() {
        assert_eq!(threshold(1).unwrap(), u128::MAX);
        let digest = proof_hash(SessionId(1), 7, 10, 2);
        assert_eq!(
            verify_proof(SessionId(1), 1, 7, digest, 10, 2, VerificationMode::Strict).unwrap(),
            digest
        );
    }

    #[test]
    fn mismatched_target_is_rejected() {
        let digest = proof_hash(SessionId(1), 7, 10, 2);
        let err = verify_proof(
            SessionId(1),
            1,
            7,
            digest ^ 1,
            10,
            2,
            VerificationMode::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::ProofRejected { .. }));
    }

    #[test]
    fn digest_binds_every_input() {
        let base = proof_hash(SessionId(3), 1, 2, 3);
        assert_ne!(base, proof_hash(SessionId(4), 1, 2, 3));
        assert_ne!(base, proof_hash(SessionId(3), 2, 2, 3));
        assert_ne!(base, proof_hash(SessionId(3), 1, 3, 3));
        assert_ne!(base, proof_hash(SessionId(3), 1, 2, 4));
    }

    #[test]
    fn out_of_range_difficulty() {
        assert_eq!(threshold(0), Err(LedgerError::InvalidDifficulty(0)));
        assert_eq!(threshold(51), Err(LedgerError::InvalidDifficulty(51)));
    }

    #[test]
    fn found_nonce_verifies() {
        let (nonce, digest) = find_nonce(SessionId(9), 50, 40, 1, 10_000).unwrap();
        assert!(verify_proof(SessionId(9), 50, nonce, digest, 40, 1, VerificationMode::Strict).is_ok());
    }

    #[test]
    fn relaxed_mode_skips_checks() {
        assert!(verify_proof(SessionId(1), 50, 0, 0, 0, 0, VerificationMode::Relaxed).is_ok());
    }

    proptest! {
        #[test]
        fn threshold_shrinks_with_difficulty(d in 1u8..50) {
            prop_assert!(threshold(d + 1).unwrap() < threshold(d).unwrap());
        }

        #[test]
        fn accepting_nonces_never_grow_with_difficulty(
            session in 1u64..1_000,
            complexity in 0u8..=100,
            tier in 0u8..=10,
            d in 1u8..50,
        ) {
            let session = SessionId(session);
            for nonce in 0u32..64 {
                let digest = proof_hash(session, nonce, complexity, tier);
                let harder = verify_proof(session, d + 1, nonce, digest, complexity, tier, VerificationMode::Strict);
                if harder.is_ok() {
                    prop_assert!(verify_proof(session, d, nonce, digest, complexity, tier, VerificationMode::Strict).is_ok());
                }
            }
        }
    }
}
