//! fogwar domain - value types shared by the game engine and its consumers.
//!
//! Nothing in this crate locks, logs or performs I/O. The stateful core lives
//! in `fogwar-engine`.

pub mod change;
pub mod error;
pub mod ids;
pub mod maybe;
pub mod path;
pub mod value_objects;

pub use change::{Change, ChangeDbl, ChangeInt};
pub use error::DomainError;
pub use ids::{ObjectId, PlayerId, PlayerKey};
pub use maybe::{Maybe, Maybool, Presence};
pub use path::{Path, Step};
pub use value_objects::{
    Color, LevelType, ModuleKind, ModuleMeta, Position, ResourceCost, ResourceType, Side, Size,
    TileRef, Turn,
};
