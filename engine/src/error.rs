use crate::state::{BattleStatus, Intent};

/// Contract violations surfaced by the engine. None of them are retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error("invalid battle config: {field} = {value} is out of range")]
    InvalidConfig { field: String, value: i64 },

    #[error("battle already ended ({status})")]
    BattleAlreadyEnded { status: BattleStatus },

    #[error("{intent} unavailable for {turns_remaining} more turn(s)")]
    ActionUnavailable { intent: Intent, turns_remaining: u32 },
}

impl BattleError {
    /// A stale UI can legitimately trip `ActionUnavailable`; the caller should re-prompt.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BattleError::ActionUnavailable { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BattleError::InvalidConfig { .. } => "invalid_config",
            BattleError::BattleAlreadyEnded { .. } => "battle_already_ended",
            BattleError::ActionUnavailable { .. } => "action_unavailable",
        }
    }
}
