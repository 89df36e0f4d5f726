//! Mathematical work types and the categories that drive reward and burn tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest complexity score a submission may carry.
pub const MAX_COMPLEXITY: u8 = 100;
/// Highest significance tier a submission may carry.
pub const MAX_SIGNIFICANCE_TIER: u8 = 10;
/// Difficulty bounds for mining sessions (inclusive).
pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 50;

/// Raised when a numeric or textual work-type code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown work type: {0}")]
pub struct UnknownWorkType(pub String);

/// Category a work type belongs to. Burn rates, research base values and the
/// collaboration bonus are keyed on the category, never on the raw work type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkCategory {
    /// Clay millennium-class open problems.
    Millennium,
    /// Famous conjectures and major theorems.
    MajorTheorem,
    /// Standard computational research.
    StandardResearch,
    /// Group efforts: shared proofs and distributed verification.
    Collaborative,
}

impl WorkCategory {
    /// Whether the category counts as group work for validator bonuses.
    pub fn is_collaborative(self) -> bool {
        matches!(self, WorkCategory::Collaborative)
    }
}

/// Category of mathematical problem a miner or researcher works on.
///
/// The numeric code (`as u8`) is the stable external representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum WorkType {
    RiemannZeros = 0,
    YangMills = 1,
    NavierStokes = 2,
    HodgeConjecture = 3,
    BirchSwinnertonDyer = 4,
    PoincareConjecture = 5,
    PVersusNp = 6,
    GoldbachConjecture = 7,
    TwinPrimes = 8,
    CollatzConjecture = 9,
    AbcConjecture = 10,
    PrimePatterns = 11,
    EllipticCurveDlp = 12,
    LatticeCrypto = 13,
    PrimeFactorization = 14,
    CollaborativeProof = 15,
    DistributedVerification = 16,
}

impl WorkType {
    pub const ALL: [WorkType; 17] = [
        WorkType::RiemannZeros,
        WorkType::YangMills,
        WorkType::NavierStokes,
        WorkType::HodgeConjecture,
        WorkType::BirchSwinnertonDyer,
        WorkType::PoincareConjecture,
        WorkType::PVersusNp,
        WorkType::GoldbachConjecture,
        WorkType::TwinPrimes,
        WorkType::CollatzConjecture,
        WorkType::AbcConjecture,
        WorkType::PrimePatterns,
        WorkType::EllipticCurveDlp,
        WorkType::LatticeCrypto,
        WorkType::PrimeFactorization,
        WorkType::CollaborativeProof,
        WorkType::DistributedVerification,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn category(self) -> WorkCategory {
        match self {
            WorkType::RiemannZeros
            | WorkType::YangMills
            | WorkType::NavierStokes
            | WorkType::HodgeConjecture
            | WorkType::BirchSwinnertonDyer
            | WorkType::PoincareConjecture
            | WorkType::PVersusNp => WorkCategory::Millennium,
            WorkType::GoldbachConjecture
            | WorkType::TwinPrimes
            | WorkType::CollatzConjecture
            | WorkType::AbcConjecture => WorkCategory::MajorTheorem,
            WorkType::PrimePatterns
            | WorkType::EllipticCurveDlp
            | WorkType::LatticeCrypto
            | WorkType::PrimeFactorization => WorkCategory::StandardResearch,
            WorkType::CollaborativeProof | WorkType::DistributedVerification => {
                WorkCategory::Collaborative
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WorkType::RiemannZeros => "riemann_zeros",
            WorkType::YangMills => "yang_mills",
            WorkType::NavierStokes => "navier_stokes",
            WorkType::HodgeConjecture => "hodge_conjecture",
            WorkType::BirchSwinnertonDyer => "birch_swinnerton_dyer",
            WorkType::PoincareConjecture => "poincare_conjecture",
            WorkType::PVersusNp => "p_versus_np",
            WorkType::GoldbachConjecture => "goldbach_conjecture",
            WorkType::TwinPrimes => "twin_primes",
            WorkType::CollatzConjecture => "collatz_conjecture",
            WorkType::AbcConjecture => "abc_conjecture",
            WorkType::PrimePatterns => "prime_patterns",
            WorkType::EllipticCurveDlp => "elliptic_curve_dlp",
            WorkType::LatticeCrypto => "lattice_crypto",
            WorkType::PrimeFactorization => "prime_factorization",
            WorkType::CollaborativeProof => "collaborative_proof",
            WorkType::DistributedVerification => "distributed_verification",
        }
    }
}

impl TryFrom<u8> for WorkType {
    type Error = UnknownWorkType;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        WorkType::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| UnknownWorkType(code.to_string()))
    }
}

impl FromStr for WorkType {
    type Err = UnknownWorkType;

    /// Accepts either the numeric code or the snake_case name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u8>() {
            return WorkType::try_from(code);
        }
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        WorkType::ALL
            .iter()
            .copied()
            .find(|w| w.name() == wanted)
            .ok_or_else(|| UnknownWorkType(s.to_string()))
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_table_positions() {
        for (idx, work) in WorkType::ALL.iter().enumerate() {
            assert_eq!(work.code() as usize, idx);
            assert_eq!(WorkType::try_from(idx as u8).unwrap(), *work);
        }
        assert!(WorkType::try_from(17).is_err());
        assert!(WorkType::try_from(u8::MAX).is_err());
    }

    #[test]
    fn categories() {
        assert_eq!(WorkType::RiemannZeros.category(), WorkCategory::Millennium);
        assert_eq!(WorkType::TwinPrimes.category(), WorkCategory::MajorTheorem);
        assert_eq!(
            WorkType::PrimePatterns.category(),
            WorkCategory::StandardResearch
        );
        assert!(WorkType::CollaborativeProof.category().is_collaborative());
        assert!(!WorkType::YangMills.category().is_collaborative());
    }

    #[test]
    fn parses_names_and_codes() {
        assert_eq!("riemann_zeros".parse::<WorkType>().unwrap(), WorkType::RiemannZeros);
        assert_eq!("Prime-Patterns".parse::<WorkType>().unwrap(), WorkType::PrimePatterns);
        assert_eq!("14".parse::<WorkType>().unwrap(), WorkType::PrimeFactorization);
        assert!("fermat".parse::<WorkType>().is_err());
    }
}
