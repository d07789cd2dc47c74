//! Module capabilities attached to game objects.
//!
//! Each module has an immutable configuration (and a construction cost from
//! the [`ModuleKind`] table) plus per-turn state behind its own lock. Every
//! turn, `on_reset` runs for all modules of all objects, then `on_new_turn`.

mod base;
mod constructor;
mod container;
mod extractor;
mod mobility;
mod weapon;

use std::sync::Arc;

use fogwar_domain::{ModuleKind, ResourceCost};

pub use base::Base;
pub use constructor::{ConstructionSite, Constructor};
pub use container::Container;
pub use extractor::Extractor;
pub use mobility::{Leveling, Mobility, Movement};
pub use weapon::Weapon;

use crate::error::GameResult;
use crate::game::Game;
use crate::object::GameObject;

#[derive(Debug)]
pub enum Module {
    Base(Base),
    Container(Container),
    Extractor(Extractor),
    Mobility(Mobility),
    Constructor(Constructor),
    Weapon(Weapon),
}

impl Module {
    pub fn kind(&self) -> ModuleKind {
        match self {
            Self::Base(_) => ModuleKind::Base,
            Self::Container(_) => ModuleKind::Container,
            Self::Extractor(_) => ModuleKind::Extractor,
            Self::Mobility(_) => ModuleKind::Mobility,
            Self::Constructor(_) => ModuleKind::Constructor,
            Self::Weapon(_) => ModuleKind::Weapon,
        }
    }

    pub fn cost(&self) -> ResourceCost {
        self.kind().standard_cost()
    }

    pub fn as_base(&self) -> Option<&Base> {
        match self {
            Self::Base(base) => Some(base),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Self::Container(container) => Some(container),
            _ => None,
        }
    }

    pub fn as_extractor(&self) -> Option<&Extractor> {
        match self {
            Self::Extractor(extractor) => Some(extractor),
            _ => None,
        }
    }

    pub fn as_mobility(&self) -> Option<&Mobility> {
        match self {
            Self::Mobility(mobility) => Some(mobility),
            _ => None,
        }
    }

    pub fn as_constructor(&self) -> Option<&Constructor> {
        match self {
            Self::Constructor(constructor) => Some(constructor),
            _ => None,
        }
    }

    pub fn as_weapon(&self) -> Option<&Weapon> {
        match self {
            Self::Weapon(weapon) => Some(weapon),
            _ => None,
        }
    }

    pub(crate) fn on_reset(&self) {
        match self {
            Self::Mobility(mobility) => mobility.on_reset(),
            Self::Constructor(constructor) => constructor.on_reset(),
            Self::Weapon(weapon) => weapon.on_reset(),
            Self::Base(_) | Self::Container(_) | Self::Extractor(_) => {}
        }
    }

    pub(crate) fn on_new_turn(&self, game: &Game, object: &Arc<GameObject>) -> GameResult<()> {
        match self {
            Self::Extractor(extractor) => extractor.on_new_turn(game, object),
            Self::Constructor(constructor) => constructor.on_new_turn(game, object),
            Self::Base(_) | Self::Container(_) | Self::Mobility(_) | Self::Weapon(_) => Ok(()),
        }
    }
}

impl From<Base> for Module {
    fn from(module: Base) -> Self {
        Self::Base(module)
    }
}

impl From<Container> for Module {
    fn from(module: Container) -> Self {
        Self::Container(module)
    }
}

impl From<Extractor> for Module {
    fn from(module: Extractor) -> Self {
        Self::Extractor(module)
    }
}

impl From<Mobility> for Module {
    fn from(module: Mobility) -> Self {
        Self::Mobility(module)
    }
}

impl From<Constructor> for Module {
    fn from(module: Constructor) -> Self {
        Self::Constructor(module)
    }
}

impl From<Weapon> for Module {
    fn from(module: Weapon) -> Self {
        Self::Weapon(module)
    }
}
