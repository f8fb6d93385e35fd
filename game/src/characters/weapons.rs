//====================================================================

use std::{
    collections::{HashMap, HashSet},
    hash::BuildHasherDefault,
};

use rustc_hash::FxHasher;

use super::PlayerClass;

//====================================================================

type Hasher = BuildHasherDefault<FxHasher>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Axe,
    Bow,
    Knife,
    Sword,
    Staff,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Weapon {
    pub name: String,
    pub kind: WeaponKind,
    pub damage: u32,
    pub weight: u32,
    /// Only staves carry magic damage.
    pub magic_damage: u32,
}

impl Weapon {
    pub fn new(name: impl Into<String>, kind: WeaponKind, damage: u32, weight: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            damage,
            weight,
            magic_damage: 0,
        }
    }

    #[inline]
    pub fn axe(name: impl Into<String>, damage: u32, weight: u32) -> Self {
        Self::new(name, WeaponKind::Axe, damage, weight)
    }

    #[inline]
    pub fn bow(name: impl Into<String>, damage: u32, weight: u32) -> Self {
        Self::new(name, WeaponKind::Bow, damage, weight)
    }

    #[inline]
    pub fn knife(name: impl Into<String>, damage: u32, weight: u32) -> Self {
        Self::new(name, WeaponKind::Knife, damage, weight)
    }

    #[inline]
    pub fn sword(name: impl Into<String>, damage: u32, weight: u32) -> Self {
        Self::new(name, WeaponKind::Sword, damage, weight)
    }

    #[inline]
    pub fn staff(name: impl Into<String>, damage: u32, weight: u32, magic_damage: u32) -> Self {
        Self {
            magic_damage,
            ..Self::new(name, WeaponKind::Staff, damage, weight)
        }
    }
}

//====================================================================

/// Which weapon kinds each player class may hold.
#[derive(Clone, Debug)]
pub struct EquipRules {
    allowed: HashMap<PlayerClass, HashSet<WeaponKind, Hasher>, Hasher>,
}

impl Default for EquipRules {
    fn default() -> Self {
        use PlayerClass::*;
        use WeaponKind::*;

        let table: [(PlayerClass, &[WeaponKind]); 5] = [
            (Knight, &[Sword, Axe, Knife]),
            (Engineer, &[Axe, Bow]),
            (Thief, &[Sword, Staff, Bow]),
            (BlackMage, &[Knife, Staff]),
            (WhiteMage, &[Staff]),
        ];

        let mut rules = Self::empty();
        table.into_iter().for_each(|(class, kinds)| {
            kinds.iter().for_each(|kind| rules.allow(class, *kind));
        });

        rules
    }
}

impl EquipRules {
    pub fn empty() -> Self {
        Self {
            allowed: HashMap::default(),
        }
    }

    pub fn allow(&mut self, class: PlayerClass, kind: WeaponKind) {
        self.allowed.entry(class).or_default().insert(kind);
    }

    pub fn forbid(&mut self, class: PlayerClass, kind: WeaponKind) {
        if let Some(kinds) = self.allowed.get_mut(&class) {
            kinds.remove(&kind);
        }
    }

    #[inline]
    pub fn allows(&self, class: PlayerClass, kind: WeaponKind) -> bool {
        self.allowed
            .get(&class)
            .is_some_and(|kinds| kinds.contains(&kind))
    }
}

//====================================================================


//====================================================================
