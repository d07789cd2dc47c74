//! Unified engine error types.
//!
//! Every core call fails synchronously with a `GameError`. The variants fall
//! into four families, reported by [`GameError::kind`]: security denials,
//! recoverable action preconditions, invariant violations, and builder
//! configuration errors.

use std::fmt;

use fogwar_domain::{DomainError, ObjectId, Path, PlayerId, ResourceType, TileRef};
use thiserror::Error;

/// Something a player tried to see or act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Tile(TileRef),
    Object(ObjectId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tile(tile) => write!(f, "tile {tile}"),
            Self::Object(object) => write!(f, "object {object}"),
        }
    }
}

/// Error family, for callers that translate errors into user-facing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller is not allowed to see or do this.
    Security,
    /// The action cannot be performed now; the caller may replan and retry.
    Action,
    /// A programming error: the world would have been left inconsistent.
    Invariant,
    /// The game could not be built from the supplied configuration.
    Config,
}

#[derive(Debug, Clone, Error)]
pub enum GameError {
    // Security
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid key for player {player}")]
    InvalidKey { player: PlayerId },

    #[error("Unknown player: {player}")]
    UnknownPlayer { player: PlayerId },

    #[error("Object {object} is not owned by the current player")]
    NotOwned { object: ObjectId },

    #[error("Cannot observe {target}")]
    NotObservable { target: Target },

    #[error("Player {player} is not the current player")]
    NotCurrentPlayer { player: PlayerId },

    // Action preconditions
    #[error("Action is not possible")]
    Impossible,

    #[error("Action was invalidated by a change in the world")]
    Invalidated,

    #[error("Path invalidated at {}", .path.target())]
    PathInvalidated { path: Path<TileRef> },

    #[error("Target out of range: distance {distance}, range {range}")]
    OutOfRange { distance: u32, range: u32 },

    #[error("Out of repeats: already fired {repeat} times this turn")]
    OutOfRepeats { repeat: u32 },

    #[error("Out of ammunition")]
    OutOfAmmunition,

    // Invariant violations
    #[error("Tile {tile} is already occupied by object {occupant}")]
    TileOccupied { tile: TileRef, occupant: ObjectId },

    #[error("Negative quantity {quantity} of {resource} on tile {tile}")]
    NegativeResourceQuantity {
        tile: TileRef,
        resource: ResourceType,
        quantity: i64,
    },

    #[error("Duplicate player id: {player}")]
    DuplicatePlayer { player: PlayerId },

    #[error("No such tile: {tile}")]
    NoSuchTile { tile: TileRef },

    #[error("Game is already running")]
    GameAlreadyRunning,

    #[error("Game is not running")]
    GameNotRunning,

    #[error("Could not find a free tile to place units")]
    PlacementExhausted,

    // Configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GameError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_observable_tile(tile: TileRef) -> Self {
        Self::NotObservable {
            target: Target::Tile(tile),
        }
    }

    pub fn not_observable_object(object: ObjectId) -> Self {
        Self::NotObservable {
            target: Target::Object(object),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthenticated
            | Self::InvalidKey { .. }
            | Self::UnknownPlayer { .. }
            | Self::NotOwned { .. }
            | Self::NotObservable { .. }
            | Self::NotCurrentPlayer { .. } => ErrorKind::Security,
            Self::Impossible
            | Self::Invalidated
            | Self::PathInvalidated { .. }
            | Self::OutOfRange { .. }
            | Self::OutOfRepeats { .. }
            | Self::OutOfAmmunition => ErrorKind::Action,
            Self::TileOccupied { .. }
            | Self::NegativeResourceQuantity { .. }
            | Self::DuplicatePlayer { .. }
            | Self::NoSuchTile { .. }
            | Self::GameAlreadyRunning
            | Self::GameNotRunning
            | Self::PlacementExhausted => ErrorKind::Invariant,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// True when replanning and retrying the action may succeed.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Action
    }
}

impl From<DomainError> for GameError {
    fn from(err: DomainError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type GameResult<T> = Result<T, GameError>;
