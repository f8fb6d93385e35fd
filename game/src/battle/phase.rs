//====================================================================

use crate::error::{BattleError, Result};

//====================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    BeginTurn,
    SelectAction,
    SelectWeapon,
    SelectAttackingTarget,
}

/// What caused a transition to be requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    TurnStarted,
    Choose,
    GoBack,
    Equipped,
    AttackResolved,
    Reset,
}

/// Who holds the current turn, as far as transition guards care.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Holder {
    None,
    Player,
    Enemy,
}

pub fn is_legal(from: Phase, to: Phase, trigger: Trigger, holder: Holder) -> bool {
    use Phase::*;

    match (from, to, trigger) {
        (_, BeginTurn, Trigger::Reset) => true,
        (BeginTurn, SelectAction, Trigger::TurnStarted) => holder != Holder::None,
        (SelectAction, SelectWeapon, Trigger::Choose) => holder == Holder::Player,
        (SelectAction, SelectAttackingTarget, Trigger::Choose) => true,
        (SelectWeapon | SelectAttackingTarget, SelectAction, Trigger::GoBack) => true,
        (SelectWeapon, SelectAction, Trigger::Equipped) => true,
        (SelectAttackingTarget, BeginTurn, Trigger::AttackResolved) => true,
        _ => false,
    }
}

//====================================================================

/// Current phase plus the one it was entered from. Going back is bounded
/// to that single stored phase.
#[derive(Debug, Default)]
pub struct PhaseMachine {
    current: Phase,
    previous: Option<Phase>,
}

impl PhaseMachine {
    #[inline]
    pub fn current(&self) -> Phase {
        self.current
    }

    #[inline]
    pub fn previous(&self) -> Option<Phase> {
        self.previous
    }

    pub fn transition(&mut self, to: Phase, trigger: Trigger, holder: Holder) -> Result<()> {
        let from = self.current;

        if !is_legal(from, to, trigger, holder) {
            log::warn!(
                "Rejected phase transition {:?} -> {:?} ({:?}, holder {:?})",
                from,
                to,
                trigger,
                holder
            );
            return Err(BattleError::InvalidTransition { from, to });
        }

        log::trace!("Phase {:?} -> {:?}", from, to);
        self.previous = Some(from);
        self.current = to;

        Ok(())
    }

    pub fn go_back(&mut self, holder: Holder) -> Result<()> {
        match self.previous {
            Some(previous) => self.transition(previous, Trigger::GoBack, holder),
            None => Err(BattleError::InvalidTransition {
                from: self.current,
                to: self.current,
            }),
        }
    }
}

//====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn machine_at_action(holder: Holder) -> PhaseMachine {
        let mut machine = PhaseMachine::default();
        machine
            .transition(Phase::SelectAction, Trigger::TurnStarted, holder)
            .unwrap();
        machine
    }

    #[test]
    fn starts_in_begin_turn() {
        let machine = PhaseMachine::default();
        assert_eq!(machine.current(), Phase::BeginTurn);
        assert_eq!(machine.previous(), None);
    }

    #[test]
    fn turn_start_needs_a_holder() {
        let mut machine = PhaseMachine::default();

        assert_eq!(
            machine.transition(Phase::SelectAction, Trigger::TurnStarted, Holder::None),
            Err(BattleError::InvalidTransition {
                from: Phase::BeginTurn,
                to: Phase::SelectAction
            })
        );
        assert_eq!(machine.current(), Phase::BeginTurn);
    }

    #[test]
    fn only_players_select_weapons() {
        let mut machine = machine_at_action(Holder::Enemy);
        assert!(machine
            .transition(Phase::SelectWeapon, Trigger::Choose, Holder::Enemy)
            .is_err());
        assert_eq!(machine.current(), Phase::SelectAction);

        let mut machine = machine_at_action(Holder::Player);
        assert!(machine
            .transition(Phase::SelectWeapon, Trigger::Choose, Holder::Player)
            .is_ok());
    }

    #[test]
    fn go_back_is_one_level() {
        let mut machine = machine_at_action(Holder::Player);
        machine
            .transition(Phase::SelectAttackingTarget, Trigger::Choose, Holder::Player)
            .unwrap();

        machine.go_back(Holder::Player).unwrap();
        assert_eq!(machine.current(), Phase::SelectAction);

        // Previous is now the target selection, which is not a legal way back.
        assert!(machine.go_back(Holder::Player).is_err());
        assert_eq!(machine.current(), Phase::SelectAction);
    }

    #[test]
    fn cannot_go_back_to_begin_turn() {
        let mut machine = machine_at_action(Holder::Player);
        assert!(machine.go_back(Holder::Player).is_err());
        assert_eq!(machine.current(), Phase::SelectAction);
    }

    #[test]
    fn reset_is_always_legal() {
        use Phase::*;

        [BeginTurn, SelectAction, SelectWeapon, SelectAttackingTarget]
            .into_iter()
            .for_each(|from| {
                assert!(is_legal(from, BeginTurn, Trigger::Reset, Holder::None));
            });
    }

    #[test]
    fn attack_resolution_only_from_target_selection() {
        assert!(is_legal(
            Phase::SelectAttackingTarget,
            Phase::BeginTurn,
            Trigger::AttackResolved,
            Holder::Player
        ));
        assert!(!is_legal(
            Phase::SelectAction,
            Phase::BeginTurn,
            Trigger::AttackResolved,
            Holder::Player
        ));
    }

    #[test]
    fn unlisted_transitions_are_rejected() {
        use Phase::*;

        assert!(!is_legal(BeginTurn, SelectAttackingTarget, Trigger::Choose, Holder::Player));
        assert!(!is_legal(SelectWeapon, SelectAttackingTarget, Trigger::Choose, Holder::Player));
        assert!(!is_legal(SelectAttackingTarget, SelectWeapon, Trigger::Choose, Holder::Player));
        assert!(!is_legal(SelectAction, SelectAction, Trigger::Equipped, Holder::Player));
    }
}

//====================================================================
