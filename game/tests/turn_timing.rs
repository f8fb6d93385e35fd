//====================================================================

use std::{thread, time::Duration};

use game::{Battle, CombatantStats, EquipRules, Outcome, Phase, PlayerClass, Weapon};

//====================================================================

const MILLIS_PER_WEIGHT: u64 = 20;

fn battle() -> Battle {
    Battle::with_policies(
        |weight: u32| Duration::from_millis(weight as u64 * MILLIS_PER_WEIGHT),
        EquipRules::default(),
    )
}

fn first(candidates: &[game::CombatantId]) -> Option<game::CombatantId> {
    candidates.first().copied()
}

//====================================================================

#[test]
fn enemy_comes_back_after_its_delay() {
    let mut battle = battle();
    let enemy = battle.create_enemy("Ogre", CombatantStats::new(20, 20, 10, 10));
    let knight = battle.create_player(
        "Arthur",
        PlayerClass::Knight,
        CombatantStats::new(20, 10, 10, 10),
    );

    // Weight 10, so 200ms.
    battle
        .scheduler()
        .schedule_reentry(enemy, battle.delay_for(enemy));

    thread::sleep(Duration::from_millis(40));
    battle.update();
    assert_eq!(battle.current_turn(), None);
    assert_eq!(battle.combatant(knight).unwrap().health(), 20);

    thread::sleep(Duration::from_millis(300));
    battle.update();
    assert_eq!(battle.current_turn(), Some(enemy));
    assert_eq!(battle.phase(), Phase::SelectAttackingTarget);

    assert_eq!(battle.play_enemy_turn(&mut first), Ok((knight, 10)));
    battle.begin_turn_phase().unwrap();

    assert_eq!(battle.current_turn(), None);
    assert!(battle.scheduler().has_pending_reentry(enemy));

    thread::sleep(Duration::from_millis(40));
    battle.update();
    assert_eq!(battle.current_turn(), None);
    assert!(battle.scheduler().queued().is_empty());

    thread::sleep(Duration::from_millis(300));
    battle.update();
    assert_eq!(battle.current_turn(), Some(enemy));

    assert_eq!(battle.play_enemy_turn(&mut first), Ok((knight, 10)));
    assert!(battle.players().is_empty());
    assert_eq!(battle.outcome(), Some(Outcome::Defeat));

    battle.begin_turn_phase().unwrap();
    assert_eq!(battle.current_turn(), None);
}

#[test]
fn queued_combatant_goes_before_returning_one() {
    let mut battle = battle();
    let knight = battle.create_player(
        "Arthur",
        PlayerClass::Knight,
        CombatantStats::new(30, 15, 10, 5),
    );
    let enemy = battle.create_enemy("Ogre", CombatantStats::new(40, 20, 10, 10));

    battle.scheduler().admit(knight);
    battle.scheduler().admit(enemy);
    battle.update();

    assert_eq!(battle.current_turn(), Some(knight));
    assert_eq!(battle.scheduler().queued(), vec![enemy]);

    battle.to_select_attacking_target().unwrap();
    battle.select_target(enemy).unwrap();
    battle.begin_turn_phase().unwrap();

    // Knight (100ms) comes back while the ogre still holds the turn.
    assert_eq!(battle.current_turn(), Some(enemy));
    thread::sleep(Duration::from_millis(250));
    battle.update();

    assert_eq!(battle.current_turn(), Some(enemy));
    assert_eq!(battle.scheduler().queued(), vec![knight]);
    assert_eq!(battle.phase(), Phase::SelectAttackingTarget);

    battle.play_enemy_turn(&mut first).unwrap();
    battle.begin_turn_phase().unwrap();

    assert_eq!(battle.current_turn(), Some(knight));
    assert_eq!(battle.phase(), Phase::SelectAction);
}

#[test]
fn returning_combatant_waits_for_busy_turn() {
    let mut battle = battle();
    let engineer = battle.create_player(
        "Tesla",
        PlayerClass::Engineer,
        CombatantStats::new(10, 10, 5, 0),
    );
    let enemy = battle.create_enemy("Ogre", CombatantStats::new(200, 10, 10, 5));
    battle.add_weapon(Weapon::axe("Hatchet", 10, 5));

    battle.scheduler().admit(engineer);
    battle.update();
    battle.scheduler().schedule_reentry(enemy, battle.delay_for(enemy));

    battle.to_select_weapon().unwrap();
    battle.select_weapon(0).unwrap();

    thread::sleep(Duration::from_millis(250));
    battle.update();

    // The ogre is back but the engineer has not finished.
    assert_eq!(battle.current_turn(), Some(engineer));
    assert_eq!(battle.scheduler().queued(), vec![enemy]);
    assert_eq!(battle.phase(), Phase::SelectAction);

    battle.to_select_attacking_target().unwrap();
    assert_eq!(battle.select_target(enemy), Ok(10));
    battle.begin_turn_phase().unwrap();

    assert_eq!(battle.current_turn(), Some(enemy));
    assert_eq!(battle.phase(), Phase::SelectAttackingTarget);
}

#[test]
fn dead_combatant_never_returns() {
    let mut battle = battle();
    let knight = battle.create_player(
        "Arthur",
        PlayerClass::Knight,
        CombatantStats::new(10, 50, 10, 5),
    );
    let goblin = battle.create_enemy("Goblin", CombatantStats::new(10, 5, 0, 5));
    let ogre = battle.create_enemy("Ogre", CombatantStats::new(50, 5, 0, 5));

    battle.scheduler().admit(knight);
    battle.update();
    battle.scheduler().schedule_reentry(goblin, battle.delay_for(goblin));

    battle.to_select_attacking_target().unwrap();
    assert_eq!(battle.select_target(goblin), Ok(10));
    assert_eq!(battle.enemies(), &[ogre]);

    thread::sleep(Duration::from_millis(250));
    battle.update();

    assert!(!battle.scheduler().is_queued(goblin));
    assert!(!battle.scheduler().has_pending_reentry(goblin));

    battle.begin_turn_phase().unwrap();
    assert_eq!(battle.current_turn(), None);
    assert_eq!(battle.outcome(), None);
}

//====================================================================
