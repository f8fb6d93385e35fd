//====================================================================

use rand::{rngs::ThreadRng, seq::SliceRandom, Rng};

use crate::characters::CombatantId;

//====================================================================

/// Chooses who an automated attacker goes after. Candidates are always
/// living, valid opponents.
pub trait TargetPicker {
    fn pick(&mut self, candidates: &[CombatantId]) -> Option<CombatantId>;
}

impl<F> TargetPicker for F
where
    F: FnMut(&[CombatantId]) -> Option<CombatantId>,
{
    #[inline]
    fn pick(&mut self, candidates: &[CombatantId]) -> Option<CombatantId> {
        self(candidates)
    }
}

//--------------------------------------------------

#[derive(Debug)]
pub struct RandomTarget<R> {
    rng: R,
}

impl<R: Rng> RandomTarget<R> {
    #[inline]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for RandomTarget<ThreadRng> {
    fn default() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> TargetPicker for RandomTarget<R> {
    fn pick(&mut self, candidates: &[CombatantId]) -> Option<CombatantId> {
        candidates.choose(&mut self.rng).copied()
    }
}

//====================================================================


//====================================================================
