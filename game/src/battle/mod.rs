//====================================================================

use common::{channel, BattleEvent, EventKind, EventReceiver, EventSender};
use engine::{DelayPolicy, TurnScheduler, WeightDelay};
use hecs::{Ref, World};
use rand::{seq::SliceRandom, Rng};
use web_time::Duration;

use crate::{
    characters::{Combatant, CombatantId, CombatantStats, EquipRules, PlayerClass, Side, Weapon},
    error::{BattleError, Result},
    targeting::TargetPicker,
};

use self::phase::{Holder, Phase, PhaseMachine, Trigger};

pub mod combat;
pub mod phase;

//====================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Game-thread side of a battle. Owns the roster, the inventory and the
/// phase machine, and drives the shared turn scheduler.
///
/// Turn starts produced by re-entry timers are only acted on inside
/// [`Battle::update`], which should be called regularly.
pub struct Battle {
    world: World,
    players: Vec<CombatantId>,
    enemies: Vec<CombatantId>,
    inventory: Vec<Weapon>,

    scheduler: TurnScheduler<CombatantId>,
    events: EventReceiver<CombatantId>,
    listener: EventSender<CombatantId>,

    phase: PhaseMachine,
    acted: bool,
    last_attacked: Option<CombatantId>,

    delay_policy: Box<dyn DelayPolicy>,
    equip_rules: EquipRules,
}

impl Default for Battle {
    fn default() -> Self {
        Self::new()
    }
}

impl Battle {
    pub fn new() -> Self {
        Self::with_policies(WeightDelay::default(), EquipRules::default())
    }

    pub fn with_policies(
        delay_policy: impl DelayPolicy + 'static,
        equip_rules: EquipRules,
    ) -> Self {
        let (listener, events) = channel();
        let scheduler = TurnScheduler::new(listener.clone());

        Self {
            world: World::new(),
            players: Vec::new(),
            enemies: Vec::new(),
            inventory: Vec::new(),
            scheduler,
            events,
            listener,
            phase: PhaseMachine::default(),
            acted: false,
            last_attacked: None,
            delay_policy: Box::new(delay_policy),
            equip_rules,
        }
    }

    //--------------------------------------------------

    pub fn add_combatant(&mut self, mut combatant: Combatant) -> CombatantId {
        combatant.register_listener(EventKind::Died, self.listener.clone());
        combatant.register_listener(EventKind::TurnBegan, self.listener.clone());

        let side = combatant.side();
        let id = self.world.spawn((combatant,));

        if let Ok(mut combatant) = self.world.get::<&mut Combatant>(id) {
            combatant.bind(id);
            log::debug!("{} joins the {:?} side", combatant.name(), side);
        }

        match side {
            Side::Friendly => self.players.push(id),
            Side::Enemy => self.enemies.push(id),
        }

        id
    }

    pub fn create_player(
        &mut self,
        name: &str,
        class: PlayerClass,
        stats: CombatantStats,
    ) -> CombatantId {
        self.add_combatant(Combatant::player(name, class, stats))
    }

    pub fn create_mage(
        &mut self,
        name: &str,
        class: PlayerClass,
        stats: CombatantStats,
        mana: u32,
    ) -> CombatantId {
        self.add_combatant(Combatant::player(name, class, stats).with_mana(mana))
    }

    pub fn create_enemy(&mut self, name: &str, stats: CombatantStats) -> CombatantId {
        self.add_combatant(Combatant::enemy(name, stats))
    }

    pub fn add_weapon(&mut self, weapon: Weapon) {
        self.inventory.push(weapon);
    }

    /// Adds an extra observer for one combatant's events.
    pub fn register_listener(
        &mut self,
        id: CombatantId,
        kind: EventKind,
        sender: EventSender<CombatantId>,
    ) -> Result<()> {
        let mut combatant = self
            .world
            .get::<&mut Combatant>(id)
            .map_err(|_| BattleError::UnknownCombatant(id))?;

        combatant.register_listener(kind, sender);
        Ok(())
    }

    //--------------------------------------------------

    #[inline]
    pub fn players(&self) -> &[CombatantId] {
        &self.players
    }

    #[inline]
    pub fn enemies(&self) -> &[CombatantId] {
        &self.enemies
    }

    #[inline]
    pub fn inventory(&self) -> &[Weapon] {
        &self.inventory
    }

    /// Fallen combatants stay readable here after leaving the roster.
    #[inline]
    pub fn combatant(&self, id: CombatantId) -> Option<Ref<'_, Combatant>> {
        self.world.get::<&Combatant>(id).ok()
    }

    #[inline]
    pub fn scheduler(&self) -> &TurnScheduler<CombatantId> {
        &self.scheduler
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    #[inline]
    pub fn current_turn(&self) -> Option<CombatantId> {
        self.scheduler.current()
    }

    #[inline]
    pub fn last_attacked(&self) -> Option<CombatantId> {
        self.last_attacked
    }

    #[inline]
    pub fn has_acted(&self) -> bool {
        self.acted
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match (self.enemies.is_empty(), self.players.is_empty()) {
            (true, _) => Some(Outcome::Victory),
            (false, true) => Some(Outcome::Defeat),
            (false, false) => None,
        }
    }

    pub fn delay_for(&self, id: CombatantId) -> Duration {
        self.combatant(id)
            .map(|combatant| self.delay_policy.delay(combatant.weight()))
            .unwrap_or(Duration::ZERO)
    }

    fn holder(&self) -> Holder {
        let side = self
            .scheduler
            .current()
            .and_then(|id| self.combatant(id).map(|combatant| combatant.side()));

        match side {
            Some(Side::Friendly) => Holder::Player,
            Some(Side::Enemy) => Holder::Enemy,
            None => Holder::None,
        }
    }

    fn name_of(&self, id: CombatantId) -> String {
        self.combatant(id)
            .map(|combatant| combatant.name().to_string())
            .unwrap_or_else(|| format!("{:?}", id))
    }

    //--------------------------------------------------

    /// Puts every living combatant through admission in a random order.
    /// The first one admitted starts its turn straight away.
    pub fn init_turns<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        log::info!("------Starting battle------");

        let mut order = self
            .players
            .iter()
            .chain(self.enemies.iter())
            .copied()
            .collect::<Vec<_>>();

        order.shuffle(rng);

        log::debug!(
            "Turn order = {}",
            order
                .iter()
                .map(|id| self.name_of(*id))
                .collect::<Vec<_>>()
                .join(", ")
        );

        order.into_iter().for_each(|id| {
            self.scheduler.admit(id);
        });

        self.update();
    }

    /// Handles every pending event and returns them.
    pub fn update(&mut self) -> Vec<BattleEvent<CombatantId>> {
        let mut handled = Vec::new();

        while let Some(event) = self.events.try_recv() {
            match event {
                BattleEvent::TurnBegan(id) => self.on_turn_began(id),
                BattleEvent::Died(id) => self.on_death(id),
            }
            handled.push(event);
        }

        handled
    }

    fn on_turn_began(&mut self, id: CombatantId) {
        if self.scheduler.current() != Some(id) {
            log::debug!(
                "Ignoring turn start of {}, it does not hold the turn",
                self.name_of(id)
            );
            return;
        }

        if self.phase.current() != Phase::BeginTurn {
            log::debug!(
                "Ignoring turn start of {} during {:?}",
                self.name_of(id),
                self.phase.current()
            );
            return;
        }

        let holder = self.holder();
        if self
            .phase
            .transition(Phase::SelectAction, Trigger::TurnStarted, holder)
            .is_err()
        {
            return;
        }

        self.acted = false;
        log::info!("It's {}'s turn", self.name_of(id));

        // Enemies have nothing to choose but a target.
        if holder == Holder::Enemy {
            self.phase
                .transition(Phase::SelectAttackingTarget, Trigger::Choose, holder)
                .ok();
        }
    }

    fn on_death(&mut self, id: CombatantId) {
        let was_current = self.scheduler.current() == Some(id);

        self.scheduler.on_death(id);
        self.players.retain(|player| *player != id);
        self.enemies.retain(|enemy| *enemy != id);

        log::info!("{} is removed from battle", self.name_of(id));

        if was_current {
            self.phase
                .transition(Phase::BeginTurn, Trigger::Reset, Holder::None)
                .ok();
            self.acted = false;
            self.scheduler.promote_head();
        }
    }

    //--------------------------------------------------

    /// Forced return to `BeginTurn`. If someone was mid-turn they are sent
    /// through delayed re-entry and the next queued combatant is promoted.
    pub fn begin_turn_phase(&mut self) -> Result<()> {
        let from = self.phase.current();

        let trigger = match (from, self.acted) {
            (Phase::SelectAttackingTarget, true) => Trigger::AttackResolved,
            _ => Trigger::Reset,
        };

        self.phase.transition(Phase::BeginTurn, trigger, self.holder())?;

        if from != Phase::BeginTurn {
            if let Some(holder) = self.scheduler.current() {
                let delay = self.delay_for(holder);
                self.scheduler.complete_current_turn(delay);
            }
        }

        self.acted = false;
        self.scheduler.promote_head();
        self.update();

        Ok(())
    }

    pub fn to_select_action(&mut self) -> Result<()> {
        let trigger = match self.phase.current() {
            Phase::BeginTurn => Trigger::TurnStarted,
            _ => Trigger::GoBack,
        };

        self.phase
            .transition(Phase::SelectAction, trigger, self.holder())?;

        if trigger == Trigger::TurnStarted {
            self.acted = false;
        }
        Ok(())
    }

    pub fn to_select_weapon(&mut self) -> Result<()> {
        self.phase
            .transition(Phase::SelectWeapon, Trigger::Choose, self.holder())
    }

    pub fn to_select_attacking_target(&mut self) -> Result<()> {
        self.phase
            .transition(Phase::SelectAttackingTarget, Trigger::Choose, self.holder())
    }

    pub fn go_back(&mut self) -> Result<()> {
        let holder = self.holder();
        self.phase.go_back(holder)
    }

    //--------------------------------------------------

    /// Attacks `target` with the combatant holding the turn. Follow with
    /// [`Battle::begin_turn_phase`] to end the turn.
    pub fn select_target(&mut self, target: CombatantId) -> Result<u32> {
        if self.phase.current() != Phase::SelectAttackingTarget {
            return Err(BattleError::InvalidAction(format!(
                "cannot attack during {:?}",
                self.phase.current()
            )));
        }

        let attacker = self
            .scheduler
            .current()
            .ok_or_else(|| BattleError::InvalidAction("no combatant holds the turn".into()))?;

        if self.acted {
            return Err(BattleError::InvalidAction(format!(
                "{} already attacked this turn",
                self.name_of(attacker)
            )));
        }

        self.check_target(attacker, target)?;

        let damage = combat::resolve(&mut self.world, attacker, target)?;
        self.acted = true;
        self.last_attacked = Some(target);

        self.update();

        Ok(damage)
    }

    fn check_target(&self, attacker: CombatantId, target: CombatantId) -> Result<()> {
        let attacker = self
            .combatant(attacker)
            .ok_or(BattleError::UnknownCombatant(attacker))?;
        let defender = self
            .combatant(target)
            .ok_or(BattleError::UnknownCombatant(target))?;

        if !attacker.is_alive() {
            return Err(BattleError::InvalidAction(format!(
                "{} cannot act while dead",
                attacker.name()
            )));
        }

        if !attacker.is_opponent_of(&defender) {
            return Err(BattleError::InvalidAction(format!(
                "{} cannot attack an ally ({})",
                attacker.name(),
                defender.name()
            )));
        }

        if !defender.is_alive() {
            return Err(BattleError::InvalidAction(format!(
                "{} is already dead",
                defender.name()
            )));
        }

        Ok(())
    }

    /// Equips the turn holder with the inventory weapon at `index`. The weapon
    /// it held before goes back into the inventory.
    pub fn select_weapon(&mut self, index: usize) -> Result<()> {
        if self.phase.current() != Phase::SelectWeapon {
            return Err(BattleError::InvalidAction(format!(
                "cannot equip during {:?}",
                self.phase.current()
            )));
        }

        let holder = self
            .scheduler
            .current()
            .ok_or_else(|| BattleError::InvalidAction("no combatant holds the turn".into()))?;

        {
            let weapon = self.inventory.get(index).ok_or_else(|| {
                BattleError::InvalidAction(format!("no weapon in inventory slot {}", index))
            })?;

            let combatant = self
                .combatant(holder)
                .ok_or(BattleError::UnknownCombatant(holder))?;

            combatant
                .can_equip(weapon, &self.equip_rules)
                .map_err(|err| match err {
                    BattleError::AlreadyDead(name) => {
                        BattleError::InvalidAction(format!("{} cannot equip while dead", name))
                    }
                    other => other,
                })?;
        }

        let weapon = self.inventory.remove(index);
        let previous = self
            .world
            .get::<&mut Combatant>(holder)
            .map_err(|_| BattleError::UnknownCombatant(holder))?
            .equip(weapon, &self.equip_rules)?;

        if let Some(previous) = previous {
            self.inventory.push(previous);
        }

        self.phase
            .transition(Phase::SelectAction, Trigger::Equipped, self.holder())
    }

    /// Lets an enemy holding the turn attack a player chosen by `picker`.
    pub fn play_enemy_turn<P>(&mut self, picker: &mut P) -> Result<(CombatantId, u32)>
    where
        P: TargetPicker + ?Sized,
    {
        if self.holder() != Holder::Enemy {
            return Err(BattleError::InvalidAction(
                "only enemies take automatic turns".into(),
            ));
        }

        let target = picker
            .pick(&self.players)
            .ok_or_else(|| BattleError::InvalidAction("no player left to attack".into()))?;

        let damage = self.select_target(target)?;
        Ok((target, damage))
    }
}

//====================================================================


//====================================================================
