//! Stock unit types and the modules they are built from.

use std::fmt;
use std::str::FromStr;

use fogwar_domain::{DomainError, LevelType, ModuleKind, ResourceCost, ResourceType};
use serde::{Deserialize, Serialize};

use crate::modules::{Base, Constructor, Container, Extractor, Mobility, Module, Weapon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    /// Ground worker: extracts, stores and builds.
    Engineer,
    /// Armed ground reconnaissance.
    Scout,
    /// Sky transport that can descend to the ground.
    Airship,
}

impl UnitType {
    pub const ALL: [UnitType; 3] = [UnitType::Engineer, UnitType::Scout, UnitType::Airship];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Engineer => "engineer",
            Self::Scout => "scout",
            Self::Airship => "airship",
        }
    }

    /// Level a freshly placed unit of this type starts on.
    pub fn home_level(self) -> LevelType {
        match self {
            Self::Engineer | Self::Scout => LevelType::Ground,
            Self::Airship => LevelType::Sky,
        }
    }

    /// Fresh modules for a new unit of this type.
    pub fn modules(self) -> Vec<Module> {
        match self {
            Self::Engineer => vec![
                Base::new(10, 1, 3, &[LevelType::Ground]).into(),
                Mobility::new(3.0).moves_on(LevelType::Ground, 1.0).into(),
                Extractor::new(ResourceType::Metals, 2).into(),
                Container::new(ResourceType::Metals, 20).into(),
                Container::new(ResourceType::Silicon, 10).into(),
                Constructor::new(3, &ModuleKind::ALL).into(),
            ],
            Self::Scout => vec![
                Base::new(8, 0, 5, &[LevelType::Ground, LevelType::Sky]).into(),
                Mobility::new(5.0).moves_on(LevelType::Ground, 1.0).into(),
                Weapon::new(3, 2, 3, 1, 10, &[LevelType::Ground, LevelType::Sky]).into(),
            ],
            Self::Airship => vec![
                Base::new(12, 2, 4, &[LevelType::Sky, LevelType::Ground]).into(),
                Mobility::new(4.0)
                    .moves_on(LevelType::Sky, 1.0)
                    .moves_on(LevelType::Ground, 2.0)
                    .levels_to(LevelType::Ground, 2.0)
                    .levels_to(LevelType::Sky, 2.0)
                    .into(),
                Extractor::new(ResourceType::Fuel, 2).into(),
                Container::new(ResourceType::Fuel, 20).into(),
            ],
        }
    }

    /// Sum of the standard costs of this unit's modules.
    pub fn cost(self) -> ResourceCost {
        self.modules()
            .iter()
            .fold(ResourceCost::new(), |total, module| total.plus(&module.cost()))
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "engineer" => Ok(Self::Engineer),
            "scout" => Ok(Self::Scout),
            "airship" => Ok(Self::Airship),
            other => Err(DomainError::parse(format!("Unknown unit type: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_unit_can_see_its_home_level() {
        for unit_type in UnitType::ALL {
            let modules = unit_type.modules();
            let base = modules
                .iter()
                .find_map(Module::as_base)
                .expect("every stock unit has a base");
            assert!(base.layers().contains(&unit_type.home_level()));
        }
    }

    #[test]
    fn cost_sums_module_costs() {
        let scout = UnitType::Scout.cost();
        let expected = ModuleKind::Base
            .standard_cost()
            .plus(&ModuleKind::Mobility.standard_cost())
            .plus(&ModuleKind::Weapon.standard_cost());
        assert_eq!(scout, expected);
    }

    #[test]
    fn parse_unit_type() {
        assert_eq!("Scout".parse::<UnitType>(), Ok(UnitType::Scout));
        assert!("tank".parse::<UnitType>().is_err());
    }
}
