//! fogwar engine library.
//!
//! The authoritative state of a turn-based strategy game played on a
//! three-level tile grid, with fog of war.
//!
//! ## Structure
//!
//! - `security` / `observation` - who is asking and what they may see
//! - `notifier` - filtered event dispatch to listeners
//! - `turns` - the ready barrier that advances turns
//! - `game`, `player`, `object`, `modules` - the world and its mutations
//! - `builder`, `config`, `content`, `victory` - setting up and ending a game
//! - `ports` - clock and randomness injection

pub mod builder;
pub mod config;
pub mod content;
pub mod error;
pub mod game;
pub mod modules;
pub mod notifier;
pub mod object;
pub mod observation;
pub mod player;
pub mod ports;
pub mod security;
pub mod turns;
pub mod victory;

mod sync;

/// Engine-level scenario tests.
#[cfg(test)]
mod tests;

pub use builder::{GameBuilder, PlayerSpec};
pub use config::{GameConfig, ResourceConfig, ResourcePreset, UnitPreset};
pub use content::UnitType;
pub use error::{ErrorKind, GameError, GameResult, Target};
pub use game::{Game, Level, PlayerGameInfo, Tile};
pub use notifier::{GameEvent, GameListener, ListenerId};
pub use object::GameObject;
pub use player::Player;
pub use security::{Identity, RequestContext};
pub use victory::VictoryCondition;
