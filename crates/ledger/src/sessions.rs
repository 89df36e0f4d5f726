//! Session manager: opening sessions and claiming them for a proof.

use crate::errors::{LedgerError, Result};
use crate::staged::Staged;
use eureka_types::{Address, BlockHeight, DiscoveryId, MiningSession, SessionId, WorkType};

/// Resolve a raw work-type code.
pub fn parse_work_type(code: u8) -> Result<WorkType> {
    WorkType::try_from(code).map_err(|_| LedgerError::InvalidWorkType(code))
}

pub(crate) fn open(
    staged: &mut Staged<'_>,
    miner: Address,
    work_type: WorkType,
    difficulty: u8,
    height: BlockHeight,
    timestamp: i64,
) -> SessionId {
    let id = staged.allocate_session_id();
    staged.put_session(MiningSession {
        id,
        miner,
        work_type,
        difficulty,
        start_time: timestamp,
        start_height: height,
        active: true,
        discovery: None,
    });
    id
}

/// Look up an active session owned by `caller`.
pub(crate) fn claim(staged: &Staged<'_>, id: SessionId, caller: &Address) -> Result<MiningSession> {
    let session = staged.session(id).ok_or(LedgerError::SessionNotFound(id))?;
    if !session.active {
        return Err(LedgerError::SessionNotActive(id));
    }
    if !session.is_owned_by(caller) {
        return Err(LedgerError::Unauthorized {
            caller: *caller,
            action: format!("submit a proof for {id}"),
        });
    }
    Ok(session)
}

/// Mark a session completed by `discovery`. Terminal.
pub(crate) fn complete(staged: &mut Staged<'_>, mut session: MiningSession, discovery: DiscoveryId) {
    session.active = false;
    session.discovery = Some(discovery);
    staged.put_session(session);
}
