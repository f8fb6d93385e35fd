//====================================================================

use thiserror::Error;

use crate::{battle::phase::Phase, characters::CombatantId};

//====================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition { from: Phase, to: Phase },

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("{0} is already dead")]
    AlreadyDead(String),

    #[error("Combatant not found: {0:?}")]
    UnknownCombatant(CombatantId),
}

pub type Result<T> = std::result::Result<T, BattleError>;

//====================================================================
