//! Game configuration and environment overrides.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use fogwar_domain::{DomainError, ResourceType, Size};

use crate::content::UnitType;
use crate::victory::VictoryCondition;

/// How one resource type is scattered during world generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceConfig {
    /// Total quantity distributed over the whole world.
    pub quantity: u32,
    /// Hop radius of each puddle.
    pub puddle_radius: u32,
    /// Maximum quantity deposited on one tile per puddle.
    pub max_per_tile: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourcePreset {
    Plenty,
    Sparse,
    None,
}

impl ResourcePreset {
    /// Resource configuration for a world of `size`.
    pub fn resources(self, size: Size) -> BTreeMap<ResourceType, ResourceConfig> {
        // Quantity per hundred tiles of one level.
        const PLENTY: [(ResourceType, u32); 4] = [
            (ResourceType::Fuel, 50),
            (ResourceType::Metals, 80),
            (ResourceType::Silicon, 50),
            (ResourceType::Radioactive, 20),
        ];
        const SPARSE: [(ResourceType, u32); 4] = [
            (ResourceType::Fuel, 20),
            (ResourceType::Metals, 30),
            (ResourceType::Silicon, 20),
            (ResourceType::Radioactive, 5),
        ];

        let (per_hundred, puddle_radius, max_per_tile) = match self {
            Self::Plenty => (PLENTY.as_slice(), 3, 20),
            Self::Sparse => (SPARSE.as_slice(), 2, 10),
            Self::None => ([].as_slice(), 0, 0),
        };

        let area = u32::try_from(size.area()).unwrap_or(u32::MAX);
        per_hundred
            .iter()
            .map(|&(resource, amount)| {
                let config = ResourceConfig {
                    quantity: area.saturating_mul(amount) / 100,
                    puddle_radius,
                    max_per_tile,
                };
                (resource, config)
            })
            .collect()
    }
}

impl FromStr for ResourcePreset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plenty" => Ok(Self::Plenty),
            "sparse" => Ok(Self::Sparse),
            "none" => Ok(Self::None),
            other => Err(DomainError::parse(format!("Unknown resource preset: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitPreset {
    /// An engineer, a scout and an airship per player.
    Basic,
    None,
}

impl UnitPreset {
    pub fn units(self) -> &'static [UnitType] {
        match self {
            Self::Basic => &[UnitType::Engineer, UnitType::Scout, UnitType::Airship],
            Self::None => &[],
        }
    }
}

impl FromStr for UnitPreset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "none" => Ok(Self::None),
            other => Err(DomainError::parse(format!("Unknown unit preset: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub level_width: u32,
    pub level_height: u32,
    pub total_players: usize,
    pub resources: ResourcePreset,
    pub units: UnitPreset,
    pub victory_conditions: Vec<VictoryCondition>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            level_width: 40,
            level_height: 40,
            total_players: 4,
            resources: ResourcePreset::Plenty,
            units: UnitPreset::Basic,
            victory_conditions: vec![VictoryCondition::Annihilation],
        }
    }
}

impl GameConfig {
    /// Defaults overridden from the process environment.
    ///
    /// Supported environment variables:
    /// - FOGWAR_LEVEL_WIDTH / FOGWAR_LEVEL_HEIGHT: level dimensions
    /// - FOGWAR_TOTAL_PLAYERS: number of players
    /// - FOGWAR_RESOURCES: plenty, sparse or none
    /// - FOGWAR_UNITS: basic or none
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden from `lookup`. Unparsable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        apply(&lookup, "FOGWAR_LEVEL_WIDTH", &mut config.level_width);
        apply(&lookup, "FOGWAR_LEVEL_HEIGHT", &mut config.level_height);
        apply(&lookup, "FOGWAR_TOTAL_PLAYERS", &mut config.total_players);
        apply(&lookup, "FOGWAR_RESOURCES", &mut config.resources);
        apply(&lookup, "FOGWAR_UNITS", &mut config.units);
        config
    }
}

fn apply<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, target: &mut T)
where
    T: FromStr,
    T::Err: Display,
{
    let Some(value) = lookup(name) else {
        return;
    };
    match value.parse::<T>() {
        Ok(parsed) => {
            *target = parsed;
            tracing::info!(variable = name, value = %value, "Applied environment override");
        }
        Err(e) => {
            tracing::warn!(variable = name, value = %value, error = %e, "Invalid value, keeping default");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_overrides_defaults() {
        let config = GameConfig::from_lookup(|name| match name {
            "FOGWAR_LEVEL_WIDTH" => Some("12".to_string()),
            "FOGWAR_TOTAL_PLAYERS" => Some("2".to_string()),
            "FOGWAR_RESOURCES" => Some("Sparse".to_string()),
            _ => None,
        });
        assert_eq!(config.level_width, 12);
        assert_eq!(config.level_height, 40);
        assert_eq!(config.total_players, 2);
        assert_eq!(config.resources, ResourcePreset::Sparse);
        assert_eq!(config.units, UnitPreset::Basic);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = GameConfig::from_lookup(|name| match name {
            "FOGWAR_LEVEL_HEIGHT" => Some("tall".to_string()),
            "FOGWAR_UNITS" => Some("tanks".to_string()),
            _ => None,
        });
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn presets_scale_with_area() {
        let size = Size::new(10, 10).expect("valid size");
        let plenty = ResourcePreset::Plenty.resources(size);
        assert_eq!(plenty[&ResourceType::Metals].quantity, 80);
        assert!(ResourcePreset::None.resources(size).is_empty());
    }
}
