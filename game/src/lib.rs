//====================================================================

pub mod battle;
pub mod characters;
pub mod error;
pub mod targeting;

pub use battle::{phase::Phase, Battle, Outcome};
pub use characters::{
    Combatant, CombatantId, CombatantStats, EquipRules, PlayerClass, Weapon, WeaponKind,
};
pub use error::{BattleError, Result};
pub use targeting::{RandomTarget, TargetPicker};

//====================================================================
