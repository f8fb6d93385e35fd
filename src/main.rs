//====================================================================

use std::{thread, time::Duration};

use engine::WeightDelay;
use game::{
    Battle, CombatantId, CombatantStats, EquipRules, Outcome, Phase, PlayerClass, RandomTarget,
    TargetPicker, Weapon,
};
use rand::{rngs::ThreadRng, Rng};

//====================================================================

const TICK_RATE: Duration = Duration::from_millis(10);
const MILLIS_PER_WEIGHT: u64 = 20;

//====================================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut battle = Battle::with_policies(
        WeightDelay {
            millis_per_weight: MILLIS_PER_WEIGHT,
        },
        EquipRules::default(),
    );

    create_party(&mut battle);
    create_enemies(&mut battle);

    let mut rng = rand::thread_rng();
    let mut enemy_picker = RandomTarget::default();

    battle.init_turns(&mut rng);

    let outcome = loop {
        battle.update();

        if let Some(outcome) = battle.outcome() {
            break outcome;
        }

        match (battle.current_turn(), battle.phase()) {
            (Some(id), Phase::SelectAttackingTarget) if is_enemy(&battle, id) => {
                if let Err(err) = battle.play_enemy_turn(&mut enemy_picker) {
                    log::warn!("Enemy turn failed: {}", err);
                }
                end_turn(&mut battle);
            }

            (Some(id), Phase::SelectAction) if !is_enemy(&battle, id) => {
                play_player_turn(&mut battle, id, &mut rng);
                end_turn(&mut battle);
            }

            _ => {}
        }

        thread::sleep(TICK_RATE);
    };

    match outcome {
        Outcome::Victory => log::info!("------The party is victorious------"),
        Outcome::Defeat => log::info!("------The party has fallen------"),
    }

    battle.players().iter().for_each(|id| {
        if let Some(player) = battle.combatant(*id) {
            log::info!(
                "{} survives with {}/{} health",
                player.name(),
                player.health(),
                player.max_health()
            );
        }
    });
}

//====================================================================

fn create_party(battle: &mut Battle) {
    battle.create_player(
        "Arthur",
        PlayerClass::Knight,
        CombatantStats::new(60, 18, 12, 8),
    );
    battle.create_player(
        "Tesla",
        PlayerClass::Engineer,
        CombatantStats::new(45, 14, 10, 5),
    );
    battle.create_player(
        "Zidane",
        PlayerClass::Thief,
        CombatantStats::new(40, 16, 6, 2),
    );
    battle.create_mage(
        "Vivi",
        PlayerClass::BlackMage,
        CombatantStats::new(30, 8, 4, 4),
        50,
    );

    battle.add_weapon(Weapon::sword("Broadsword", 10, 6));
    battle.add_weapon(Weapon::axe("Hatchet", 8, 4));
    battle.add_weapon(Weapon::bow("Shortbow", 6, 2));
    battle.add_weapon(Weapon::staff("Oak Staff", 2, 2, 12));
}

fn create_enemies(battle: &mut Battle) {
    battle.create_enemy("Ogre", CombatantStats::new(90, 22, 8, 12));
    battle.create_enemy("Goblin", CombatantStats::new(35, 15, 4, 4));
    battle.create_enemy("Goblin Archer", CombatantStats::new(30, 17, 2, 3));
}

//====================================================================

fn is_enemy(battle: &Battle, id: CombatantId) -> bool {
    battle
        .combatant(id)
        .map(|combatant| combatant.is_enemy())
        .unwrap_or(false)
}

fn play_player_turn(battle: &mut Battle, id: CombatantId, rng: &mut ThreadRng) {
    let unarmed = battle
        .combatant(id)
        .map(|combatant| combatant.weapon().is_none())
        .unwrap_or(false);

    if unarmed && !battle.inventory().is_empty() && battle.to_select_weapon().is_ok() {
        let equipped =
            (0..battle.inventory().len()).any(|index| battle.select_weapon(index).is_ok());

        if !equipped {
            battle.go_back().ok();
        }
    }

    if let Err(err) = battle.to_select_attacking_target() {
        log::warn!("Cannot choose a target: {}", err);
        return;
    }

    // Half the time, keep pressing the last enemy hit.
    let target = match battle.last_attacked() {
        Some(last) if battle.enemies().contains(&last) && rng.gen_bool(0.5) => Some(last),
        _ => RandomTarget::new(&mut *rng).pick(battle.enemies()),
    };

    match target {
        Some(target) => {
            if let Err(err) = battle.select_target(target) {
                log::warn!("Attack failed: {}", err);
            }
        }
        None => log::warn!("No enemy left to attack"),
    }
}

fn end_turn(battle: &mut Battle) {
    if let Err(err) = battle.begin_turn_phase() {
        log::warn!("Could not end turn: {}", err);
    }
}

//====================================================================
