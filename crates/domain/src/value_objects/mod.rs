//! Value objects - Immutable objects defined by their attributes

mod color;
mod geometry;
mod module_kind;
mod resource;
mod turn;

pub use color::Color;
pub use geometry::{LevelType, Position, Side, Size, TileRef};
pub use module_kind::{ModuleKind, ModuleMeta};
pub use resource::{ResourceCost, ResourceType};
pub use turn::Turn;
