//====================================================================

pub mod delay;
pub mod scheduler;

pub use delay::{DelayPolicy, WeightDelay};
pub use scheduler::{Admission, CombatantKey, TurnScheduler};

//====================================================================
