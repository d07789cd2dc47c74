//! Module kinds and their fixed metadata table

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value_objects::{ResourceCost, ResourceType};

/// The capability a module adds to a game object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Extractor,
    Container,
    Mobility,
    Constructor,
    Base,
    Weapon,
}

/// Static per-kind metadata.
#[derive(Debug, Clone, Copy)]
pub struct ModuleMeta {
    pub kind: ModuleKind,
    pub name: &'static str,
    standard_cost: &'static [(ResourceType, u32)],
}

const MODULE_TABLE: [ModuleMeta; 6] = [
    ModuleMeta {
        kind: ModuleKind::Extractor,
        name: "extractor",
        standard_cost: &[(ResourceType::Metals, 2), (ResourceType::Silicon, 1)],
    },
    ModuleMeta {
        kind: ModuleKind::Container,
        name: "container",
        standard_cost: &[(ResourceType::Metals, 2)],
    },
    ModuleMeta {
        kind: ModuleKind::Mobility,
        name: "mobility",
        standard_cost: &[(ResourceType::Metals, 1), (ResourceType::Fuel, 1)],
    },
    ModuleMeta {
        kind: ModuleKind::Constructor,
        name: "constructor",
        standard_cost: &[(ResourceType::Metals, 3), (ResourceType::Silicon, 2)],
    },
    ModuleMeta {
        kind: ModuleKind::Base,
        name: "base",
        standard_cost: &[(ResourceType::Metals, 4)],
    },
    ModuleMeta {
        kind: ModuleKind::Weapon,
        name: "weapon",
        standard_cost: &[(ResourceType::Metals, 3), (ResourceType::Radioactive, 1)],
    },
];

impl ModuleKind {
    pub const ALL: [ModuleKind; 6] = [
        ModuleKind::Extractor,
        ModuleKind::Container,
        ModuleKind::Mobility,
        ModuleKind::Constructor,
        ModuleKind::Base,
        ModuleKind::Weapon,
    ];

    fn index(self) -> usize {
        match self {
            Self::Extractor => 0,
            Self::Container => 1,
            Self::Mobility => 2,
            Self::Constructor => 3,
            Self::Base => 4,
            Self::Weapon => 5,
        }
    }

    pub fn meta(self) -> &'static ModuleMeta {
        &MODULE_TABLE[self.index()]
    }

    /// Cost of a module of this kind before any per-unit extras.
    pub fn standard_cost(self) -> ResourceCost {
        ResourceCost::from_pairs(self.meta().standard_cost)
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.meta().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_kind() {
        for kind in ModuleKind::ALL {
            assert_eq!(kind.meta().kind, kind);
            assert!(!kind.standard_cost().is_zero());
        }
    }

    #[test]
    fn weapon_cost_includes_radioactive() {
        assert_eq!(ModuleKind::Weapon.standard_cost().get(ResourceType::Radioactive), 1);
        assert_eq!(ModuleKind::Base.to_string(), "base");
    }
}
