//! Resource types and resource costs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Fuel,
    Metals,
    Silicon,
    Radioactive,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Fuel,
        ResourceType::Metals,
        ResourceType::Silicon,
        ResourceType::Radioactive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fuel => "fuel",
            Self::Metals => "metals",
            Self::Silicon => "silicon",
            Self::Radioactive => "radioactive",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fuel" => Ok(Self::Fuel),
            "metals" | "metal" => Ok(Self::Metals),
            "silicon" => Ok(Self::Silicon),
            "radioactive" => Ok(Self::Radioactive),
            other => Err(DomainError::parse(format!("Unknown resource type: {other}"))),
        }
    }
}

/// An amount of resources per type.
///
/// Used both as a module's fixed construction cost and as the shrinking
/// "remaining work" of a construction site. Zero entries are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCost {
    quantities: BTreeMap<ResourceType, u32>,
}

impl ResourceCost {
    /// The zero cost.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(resource_type: ResourceType, amount: u32) -> Self {
        let mut cost = Self::new();
        cost.add(resource_type, amount);
        cost
    }

    pub fn from_pairs(pairs: &[(ResourceType, u32)]) -> Self {
        let mut cost = Self::new();
        for &(resource_type, amount) in pairs {
            cost.add(resource_type, amount);
        }
        cost
    }

    pub fn get(&self, resource_type: ResourceType) -> u32 {
        self.quantities.get(&resource_type).copied().unwrap_or(0)
    }

    fn set(&mut self, resource_type: ResourceType, amount: u32) {
        if amount == 0 {
            self.quantities.remove(&resource_type);
        } else {
            self.quantities.insert(resource_type, amount);
        }
    }

    pub fn add(&mut self, resource_type: ResourceType, term: u32) -> &mut Self {
        let amount = self.get(resource_type).saturating_add(term);
        self.set(resource_type, amount);
        self
    }

    pub fn add_cost(&mut self, other: &ResourceCost) -> &mut Self {
        for (&resource_type, &amount) in &other.quantities {
            self.add(resource_type, amount);
        }
        self
    }

    /// Reduce the cost of one resource type, saturating at zero.
    pub fn reduce(&mut self, resource_type: ResourceType, term: u32) -> &mut Self {
        let amount = self.get(resource_type).saturating_sub(term);
        self.set(resource_type, amount);
        self
    }

    pub fn multiply(&mut self, resource_type: ResourceType, factor: u32) -> &mut Self {
        let amount = self.get(resource_type).saturating_mul(factor);
        self.set(resource_type, amount);
        self
    }

    pub fn multiply_all(&mut self, factor: u32) -> &mut Self {
        for resource_type in ResourceType::ALL {
            self.multiply(resource_type, factor);
        }
        self
    }

    /// Builder-style variant of [`ResourceCost::add_cost`] for immutable use.
    pub fn plus(mut self, other: &ResourceCost) -> Self {
        self.add_cost(other);
        self
    }

    pub fn is_zero(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Sum of all resource amounts.
    pub fn total(&self) -> u64 {
        self.quantities.values().map(|&amount| u64::from(amount)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, u32)> + '_ {
        self.quantities.iter().map(|(&resource_type, &amount)| (resource_type, amount))
    }
}

impl fmt::Display for ResourceCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (resource_type, amount)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{resource_type}: {amount}")?;
        }
        f.write_str("}")
    }
}
