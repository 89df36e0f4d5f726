//! Monetary unit of the discovery-mining token.

/// Monetary amount in micro-EKA (µEKA).
/// 1 EKA = 100 000 000 µEKA
pub type MicroEka = u128;

/// Helper constant: 1 EKA = 10^8 µEKA
pub const MICRO_PER_EKA: MicroEka = 100_000_000;

/// Monotonic step counter advanced by accepted ledger operations.
pub type BlockHeight = u64;

/// Convert whole EKA into µEKA.
pub const fn eka(amount: u64) -> MicroEka {
    amount as MicroEka * MICRO_PER_EKA
}

/// Render a µEKA amount as a decimal EKA string (e.g. `12.5 EKA`).
pub fn format_eka(amount: MicroEka) -> String {
    let whole = amount / MICRO_PER_EKA;
    let frac = amount % MICRO_PER_EKA;
    if frac == 0 {
        return format!("{whole} EKA");
    }
    let frac = format!("{frac:08}");
    format!("{whole}.{} EKA", frac.trim_end_matches('0'))
}
