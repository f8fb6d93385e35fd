//====================================================================

use web_time::Duration;

//====================================================================

pub const DEFAULT_MILLIS_PER_WEIGHT: u64 = 100;

/// Maps a combatant's weight to the time it waits before re-entering the
/// turn queue. Heavier combatants must never wait less than lighter ones.
pub trait DelayPolicy: Send + Sync {
    fn delay(&self, weight: u32) -> Duration;
}

impl<F> DelayPolicy for F
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    #[inline]
    fn delay(&self, weight: u32) -> Duration {
        self(weight)
    }
}

//--------------------------------------------------

/// Linear weight to delay mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightDelay {
    pub millis_per_weight: u64,
}

impl Default for WeightDelay {
    fn default() -> Self {
        Self {
            millis_per_weight: DEFAULT_MILLIS_PER_WEIGHT,
        }
    }
}

impl DelayPolicy for WeightDelay {
    #[inline]
    fn delay(&self, weight: u32) -> Duration {
        Duration::from_millis(self.millis_per_weight.saturating_mul(weight as u64))
    }
}

//====================================================================


//====================================================================
