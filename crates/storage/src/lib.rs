//! Ledger persistence.
//!
//! Stores complete ledger snapshots: every session (completed ones too),
//! every discovery, the validator registry, pool and participant balances,
//! global counters, the packed security state and the validator reward
//! record. Loading re-runs the ledger's conservation check.

use eureka_ledger::{GlobalLedgerState, Ledger, LedgerConfig, LedgerError, LedgerSnapshot, SNAPSHOT_VERSION};
use eureka_security::SecurityState;
use eureka_treasury::{PoolBalances, RewardSink};
use eureka_types::{Address, Discovery, MicroEka, MiningSession, Validator};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use sled::transaction::{TransactionError, Transactional};
use sled::{Batch, Db, Tree};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Storage errors
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt store: {0}")]
    Corrupt(String),
    #[error("Ledger rejected stored state: {0}")]
    Ledger(#[from] LedgerError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

const META_VERSION: &[u8] = b"version";
const META_POOLS: &[u8] = b"pools";
const META_GLOBAL: &[u8] = b"global";
const META_SECURITY: &[u8] = b"security";
const META_REWARDS: &[u8] = b"reward_sink";

pub trait Storage: Send + Sync {
    /// Replace the stored ledger with `snapshot`, atomically.
    fn save_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<()>;
    /// The last saved snapshot, if any.
    fn load_snapshot(&self) -> Result<Option<LedgerSnapshot>>;
    fn flush(&self) -> Result<()>;
}

/// Persist the committed state of `ledger`.
pub fn save_ledger(storage: &dyn Storage, ledger: &Ledger) -> Result<()> {
    let snapshot = ledger.snapshot();
    storage.save_snapshot(&snapshot)?;
    debug!(
        target: "storage",
        "Saved ledger at height {}",
        snapshot.global.block_height
    );
    Ok(())
}

/// Rebuild the stored ledger, or `None` when nothing was saved yet.
pub fn load_ledger(storage: &dyn Storage, config: LedgerConfig) -> Result<Option<Ledger>> {
    match storage.load_snapshot()? {
        Some(snapshot) => Ok(Some(Ledger::restore(config, snapshot)?)),
        None => Ok(None),
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Sled-backed implementation
pub struct SledStorage {
    db: Db,
    sessions: Tree,
    discoveries: Tree,
    validators: Tree,
    balances: Tree,
    metadata: Tree,
}

impl SledStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        let sessions = db.open_tree("sessions")?;
        let discoveries = db.open_tree("discoveries")?;
        let validators = db.open_tree("validators")?;
        let balances = db.open_tree("balances")?;
        let metadata = db.open_tree("metadata")?;

        Ok(Self {
            db,
            sessions,
            discoveries,
            validators,
            balances,
            metadata,
        })
    }

    fn read_meta<T: DeserializeOwned>(&self, key: &[u8]) -> Result<T> {
        let bytes = self
            .metadata
            .get(key)?
            .ok_or_else(|| StorageError::Corrupt(format!("missing {}", String::from_utf8_lossy(key))))?;
        decode(&bytes)
    }

    fn read_tree<T: DeserializeOwned>(tree: &Tree) -> Result<Vec<T>> {
        tree.iter()
            .map(|item| {
                let (_, value) = item?;
                decode(&value)
            })
            .collect()
    }
}

impl Storage for SledStorage {
    fn save_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        let mut sessions = Batch::default();
        for session in &snapshot.sessions {
            sessions.insert(&session.id.0.to_be_bytes()[..], serde_json::to_vec(session)?);
        }

        let mut discoveries = Batch::default();
        for discovery in &snapshot.discoveries {
            discoveries.insert(&discovery.id.0.to_be_bytes()[..], serde_json::to_vec(discovery)?);
        }

        let mut validators = Batch::default();
        for validator in &snapshot.validators {
            validators.insert(&validator.address.as_bytes()[..], serde_json::to_vec(validator)?);
        }

        // balances that dropped to zero disappear from the snapshot
        let mut balances = Batch::default();
        for item in self.balances.iter() {
            let (key, _) = item?;
            balances.remove(key);
        }
        for (address, balance) in &snapshot.balances {
            balances.insert(&address.as_bytes()[..], serde_json::to_vec(balance)?);
        }

        let mut metadata = Batch::default();
        metadata.insert(META_VERSION, serde_json::to_vec(&snapshot.version)?);
        metadata.insert(META_POOLS, serde_json::to_vec(&snapshot.pools)?);
        metadata.insert(META_GLOBAL, serde_json::to_vec(&snapshot.global)?);
        metadata.insert(META_SECURITY, &snapshot.security.pack().to_be_bytes()[..]);
        metadata.insert(META_REWARDS, serde_json::to_vec(&snapshot.reward_sink)?);

        (
            &self.sessions,
            &self.discoveries,
            &self.validators,
            &self.balances,
            &self.metadata,
        )
            .transaction(|(s, d, v, b, m)| {
                s.apply_batch(&sessions)?;
                d.apply_batch(&discoveries)?;
                v.apply_batch(&validators)?;
                b.apply_batch(&balances)?;
                m.apply_batch(&metadata)?;
                Ok(())
            })
            .map_err(|err: TransactionError<()>| match err {
                TransactionError::Storage(e) => StorageError::Database(e),
                TransactionError::Abort(()) => StorageError::Corrupt("snapshot write aborted".into()),
            })?;
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Option<LedgerSnapshot>> {
        let version: u32 = match self.metadata.get(META_VERSION)? {
            Some(bytes) => decode(&bytes)?,
            None => return Ok(None),
        };
        if version != SNAPSHOT_VERSION {
            return Err(StorageError::Corrupt(format!("unsupported snapshot version {version}")));
        }

        let packed = self
            .metadata
            .get(META_SECURITY)?
            .ok_or_else(|| StorageError::Corrupt("missing security".into()))?;
        let packed: [u8; 8] = packed
            .as_ref()
            .try_into()
            .map_err(|_| StorageError::Corrupt("security state is not 8 bytes".into()))?;
        let security = SecurityState::unpack(u64::from_be_bytes(packed))
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;

        let mut balances = BTreeMap::new();
        for item in self.balances.iter() {
            let (key, value) = item?;
            let bytes: [u8; 32] = key
                .as_ref()
                .try_into()
                .map_err(|_| StorageError::Corrupt("balance key is not an address".into()))?;
            balances.insert(Address::from(bytes), decode::<MicroEka>(&value)?);
        }

        let pools: PoolBalances = self.read_meta(META_POOLS)?;
        let global: GlobalLedgerState = self.read_meta(META_GLOBAL)?;
        let reward_sink: RewardSink = self.read_meta(META_REWARDS)?;
        let sessions: Vec<MiningSession> = Self::read_tree(&self.sessions)?;
        let discoveries: Vec<Discovery> = Self::read_tree(&self.discoveries)?;
        let validators: Vec<Validator> = Self::read_tree(&self.validators)?;

        info!(
            target: "storage",
            "Loaded snapshot: {} sessions, {} discoveries, {} validators",
            sessions.len(),
            discoveries.len(),
            validators.len()
        );
        Ok(Some(LedgerSnapshot {
            version,
            sessions,
            discoveries,
            validators,
            pools,
            balances,
            global,
            security,
            reward_sink,
        }))
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory testing backend
#[derive(Default)]
pub struct MemoryStorage {
    snapshot: RwLock<Option<Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        let bytes = serde_json::to_vec(snapshot)?;
        *self.snapshot.write() = Some(bytes);
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Option<LedgerSnapshot>> {
        self.snapshot
            .read()
            .as_deref()
            .map(decode)
            .transpose()
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eureka_ledger::GenesisConfig;
    use eureka_types::eka;

    fn busy_ledger() -> (Ledger, LedgerConfig) {
        let alice = Address::from_label("alice");
        let config = LedgerConfig {
            genesis: GenesisConfig::default().with_account(alice, eka(5_000)),
            ..Default::default()
        };
        let mut ledger = Ledger::new(config.clone()).unwrap();
        ledger.start_session(alice, 2, 3).unwrap();
        ledger.submit_discovery(alice, 9, 20, 2).unwrap();
        (ledger, config)
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.load_snapshot().unwrap().is_none());

        let (ledger, config) = busy_ledger();
        save_ledger(&storage, &ledger).unwrap();
        let restored = load_ledger(&storage, config).unwrap().unwrap();
        assert_eq!(restored.snapshot(), ledger.snapshot());
    }

    #[test]
    fn sled_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SledStorage::new(dir.path().join("db")).unwrap();
        assert!(storage.load_snapshot().unwrap().is_none());

        let (ledger, _) = busy_ledger();
        storage.save_snapshot(&ledger.snapshot()).unwrap();
        storage.flush().unwrap();
        assert_eq!(storage.load_snapshot().unwrap(), Some(ledger.snapshot()));
    }
}
