//====================================================================

use hecs::World;

use crate::{
    characters::{Combatant, CombatantId},
    error::{BattleError, Result},
};

//====================================================================

/// Strikes `defender` with `attacker`'s attack power and returns the health
/// actually removed.
pub fn resolve(world: &mut World, attacker: CombatantId, defender: CombatantId) -> Result<u32> {
    let (raw, attacker_name) = {
        let attacker = world
            .get::<&Combatant>(attacker)
            .map_err(|_| BattleError::UnknownCombatant(attacker))?;

        if !attacker.is_alive() {
            return Err(BattleError::InvalidAction(format!(
                "{} cannot attack while dead",
                attacker.name()
            )));
        }

        (attacker.attack_power(), attacker.name().to_string())
    };

    let mut defender = world
        .get::<&mut Combatant>(defender)
        .map_err(|_| BattleError::UnknownCombatant(defender))?;

    if !defender.is_alive() {
        return Err(BattleError::InvalidAction(format!(
            "{} is already dead",
            defender.name()
        )));
    }

    let damage = defender.apply_damage(raw);

    log::info!(
        "{} attacks {} for {} damage",
        attacker_name,
        defender.name(),
        damage
    );

    Ok(damage)
}

//====================================================================

#[cfg(test)]
mod tests {
    use crate::characters::{CombatantStats, PlayerClass};

    use super::*;

    #[test]
    fn enemy_cannot_pierce_engineer_defense() {
        let mut world = World::new();

        let engineer = world.spawn((Combatant::player(
            "Tesla",
            PlayerClass::Engineer,
            CombatantStats::new(32, 39, 49, 0),
        ),));
        let enemy = world.spawn((Combatant::enemy(
            "Ogre",
            CombatantStats::new(83, 49, 20, 20),
        ),));

        assert_eq!(resolve(&mut world, enemy, engineer), Ok(0));
        assert_eq!(world.get::<&Combatant>(engineer).unwrap().health(), 32);

        assert_eq!(resolve(&mut world, engineer, enemy), Ok(19));
        assert_eq!(world.get::<&Combatant>(enemy).unwrap().health(), 64);
    }

    #[test]
    fn dead_parties_cannot_fight() {
        let mut world = World::new();

        let knight = world.spawn((Combatant::player(
            "Arthur",
            PlayerClass::Knight,
            CombatantStats::new(10, 10, 10, 10),
        ),));
        let enemy = world.spawn((Combatant::enemy(
            "Ogre",
            CombatantStats::new(20, 20, 10, 10),
        ),));

        assert_eq!(resolve(&mut world, enemy, knight), Ok(10));

        assert!(matches!(
            resolve(&mut world, enemy, knight),
            Err(BattleError::InvalidAction(_))
        ));
        assert!(matches!(
            resolve(&mut world, knight, enemy),
            Err(BattleError::InvalidAction(_))
        ));
        assert_eq!(world.get::<&Combatant>(enemy).unwrap().health(), 20);
    }

    #[test]
    fn unknown_combatant() {
        let mut world = World::new();
        let enemy = world.spawn((Combatant::enemy("Ogre", CombatantStats::new(20, 20, 10, 10)),));
        let ghost = world.spawn(());
        world.despawn(ghost).unwrap();

        assert_eq!(
            resolve(&mut world, enemy, ghost),
            Err(BattleError::UnknownCombatant(ghost))
        );
    }
}

//====================================================================
