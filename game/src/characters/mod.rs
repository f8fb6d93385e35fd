//====================================================================

use common::{BattleEvent, EventKind, EventSender, Listeners};

use crate::error::{BattleError, Result};

pub use weapons::{EquipRules, Weapon, WeaponKind};

pub mod weapons;

//====================================================================

pub type CombatantId = hecs::Entity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerClass {
    Knight,
    Engineer,
    Thief,
    WhiteMage,
    BlackMage,
}

impl PlayerClass {
    #[inline]
    pub fn is_mage(self) -> bool {
        matches!(self, PlayerClass::WhiteMage | PlayerClass::BlackMage)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Player {
        class: PlayerClass,
        weapon: Option<Weapon>,
    },
    Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Friendly,
    Enemy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CombatantStats {
    pub health: u32,
    pub attack: u32,
    pub defense: u32,
    pub weight: u32,
}

impl CombatantStats {
    #[inline]
    pub fn new(health: u32, attack: u32, defense: u32, weight: u32) -> Self {
        Self {
            health,
            attack,
            defense,
            weight,
        }
    }
}

//====================================================================

#[derive(Debug)]
pub struct Combatant {
    name: String,
    role: Role,
    base: CombatantStats,
    mana: u32,

    health: u32,
    attack: u32,
    weight: u32,
    alive: bool,

    id: Option<CombatantId>,
    listeners: Listeners<CombatantId>,
}

impl Combatant {
    fn new(name: impl Into<String>, role: Role, stats: CombatantStats) -> Self {
        Self {
            name: name.into(),
            role,
            base: stats,
            mana: 0,
            health: stats.health,
            attack: stats.attack,
            weight: stats.weight,
            alive: stats.health > 0,
            id: None,
            listeners: Listeners::default(),
        }
    }

    pub fn player(name: impl Into<String>, class: PlayerClass, stats: CombatantStats) -> Self {
        Self::new(
            name,
            Role::Player {
                class,
                weapon: None,
            },
            stats,
        )
    }

    pub fn enemy(name: impl Into<String>, stats: CombatantStats) -> Self {
        Self::new(name, Role::Enemy, stats)
    }

    pub fn with_mana(mut self, mana: u32) -> Self {
        self.mana = mana;
        self
    }

    //--------------------------------------------------

    /// Called once when the combatant joins a roster. Events are only
    /// dispatched after binding, since they carry the id.
    pub fn bind(&mut self, id: CombatantId) {
        self.id = Some(id);
    }

    pub fn register_listener(&mut self, kind: EventKind, sender: EventSender<CombatantId>) {
        self.listeners.register(kind, sender);
    }

    fn dispatch(&self, event: fn(CombatantId) -> BattleEvent<CombatantId>) {
        match self.id {
            Some(id) => {
                let delivered = self.listeners.dispatch(event(id));
                log::trace!("{}: event delivered to {} listeners", self.name, delivered);
            }
            None => log::warn!("{} is not bound to a roster, event dropped", self.name),
        }
    }

    //--------------------------------------------------

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn role(&self) -> &Role {
        &self.role
    }

    #[inline]
    pub fn id(&self) -> Option<CombatantId> {
        self.id
    }

    #[inline]
    pub fn class(&self) -> Option<PlayerClass> {
        match &self.role {
            Role::Player { class, .. } => Some(*class),
            Role::Enemy => None,
        }
    }

    #[inline]
    pub fn weapon(&self) -> Option<&Weapon> {
        match &self.role {
            Role::Player { weapon, .. } => weapon.as_ref(),
            Role::Enemy => None,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        match self.role {
            Role::Player { .. } => Side::Friendly,
            Role::Enemy => Side::Enemy,
        }
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.side() == Side::Friendly
    }

    #[inline]
    pub fn is_enemy(&self) -> bool {
        self.side() == Side::Enemy
    }

    /// Players may only target enemies and enemies only players.
    #[inline]
    pub fn is_opponent_of(&self, other: &Combatant) -> bool {
        self.side() != other.side()
    }

    #[inline]
    pub fn health(&self) -> u32 {
        self.health
    }

    #[inline]
    pub fn max_health(&self) -> u32 {
        self.base.health
    }

    #[inline]
    pub fn attack(&self) -> u32 {
        self.attack
    }

    #[inline]
    pub fn defense(&self) -> u32 {
        self.base.defense
    }

    #[inline]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    #[inline]
    pub fn mana(&self) -> u32 {
        self.mana
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Raw damage before the defender's defense is applied.
    pub fn attack_power(&self) -> u32 {
        match (&self.role, self.weapon()) {
            (Role::Player { class, .. }, Some(weapon))
                if class.is_mage() && weapon.kind == WeaponKind::Staff =>
            {
                self.attack.saturating_add(weapon.magic_damage)
            }
            _ => self.attack,
        }
    }

    //--------------------------------------------------

    /// Returns the health actually lost. Dead combatants take no damage.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        if !self.alive {
            return 0;
        }

        let damage = amount.saturating_sub(self.base.defense).min(self.health);
        self.health -= damage;

        log::debug!(
            "{} takes {} damage ({} left)",
            self.name,
            damage,
            self.health
        );

        if self.health == 0 {
            self.alive = false;
            log::info!("{} has fallen", self.name);
            self.dispatch(BattleEvent::Died);
        }

        damage
    }

    pub fn can_equip(&self, weapon: &Weapon, rules: &EquipRules) -> Result<()> {
        if !self.alive {
            return Err(BattleError::AlreadyDead(self.name.clone()));
        }

        match self.class() {
            Some(class) => match rules.allows(class, weapon.kind) {
                true => Ok(()),
                false => Err(BattleError::InvalidAction(format!(
                    "{:?} {} cannot equip {:?} {}",
                    class, self.name, weapon.kind, weapon.name
                ))),
            },
            None => Err(BattleError::InvalidAction(format!(
                "{} cannot equip weapons",
                self.name
            ))),
        }
    }

    /// Equips `weapon` and returns whatever was held before. Nothing changes
    /// on failure.
    pub fn equip(&mut self, weapon: Weapon, rules: &EquipRules) -> Result<Option<Weapon>> {
        self.can_equip(&weapon, rules)?;

        self.attack = self.base.attack.saturating_add(weapon.damage);
        self.weight = self.base.weight.saturating_add(weapon.weight);

        log::debug!(
            "{} equips {} (attack {}, weight {})",
            self.name,
            weapon.name,
            self.attack,
            self.weight
        );

        match &mut self.role {
            Role::Player { weapon: held, .. } => Ok(held.replace(weapon)),
            Role::Enemy => Ok(None),
        }
    }

    pub fn begin_turn(&self) {
        self.dispatch(BattleEvent::TurnBegan);
    }
}

//====================================================================


//====================================================================
