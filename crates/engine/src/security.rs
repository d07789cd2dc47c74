//! Request context: who is asking, and what they may see or touch.
//!
//! A `RequestContext` is created once per inbound request by the transport
//! layer (via [`RequestContext::authenticate`]) and passed explicitly into every
//! core call. It is an immutable value, so nothing about the caller's identity
//! leaks between threads or requests.

use fogwar_domain::{PlayerId, PlayerKey, TileRef};

use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::object::GameObject;
use crate::observation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Player(PlayerId),
    /// Privileged world-bootstrap execution. Never handed out to player requests.
    God,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    identity: Identity,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self {
            identity: Identity::Anonymous,
        }
    }

    /// Authenticate as `player`.
    ///
    /// Keyed players must present their key; key-less players authenticate
    /// with no key.
    pub fn authenticate(game: &Game, player: PlayerId, key: Option<&PlayerKey>) -> GameResult<Self> {
        let found = game.player(player)?;
        if found.key() != key {
            tracing::debug!(player_id = %player, "Rejected authentication");
            return Err(GameError::InvalidKey { player });
        }
        Ok(Self {
            identity: Identity::Player(player),
        })
    }

    pub(crate) fn god() -> Self {
        Self {
            identity: Identity::God,
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn is_god(&self) -> bool {
        self.identity == Identity::God
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity != Identity::Anonymous
    }

    /// The authenticated player, if this context belongs to one.
    pub fn player(&self) -> Option<PlayerId> {
        match self.identity {
            Identity::Player(player) => Some(player),
            Identity::Anonymous | Identity::God => None,
        }
    }

    pub fn current_player(&self) -> GameResult<PlayerId> {
        self.player().ok_or(GameError::NotAuthenticated)
    }

    /// True if this context may act as `player`.
    pub fn acts_as(&self, player: PlayerId) -> bool {
        match self.identity {
            Identity::God => true,
            Identity::Player(current) => current == player,
            Identity::Anonymous => false,
        }
    }

    pub fn assert_owned(&self, object: &GameObject) -> GameResult<()> {
        match self.identity {
            Identity::God => Ok(()),
            Identity::Anonymous => Err(GameError::NotAuthenticated),
            Identity::Player(player) if object.owner_id() == Some(player) => Ok(()),
            Identity::Player(_) => Err(GameError::NotOwned { object: object.id() }),
        }
    }

    pub fn assert_observable_tile(&self, game: &Game, tile: TileRef) -> GameResult<()> {
        if observation::is_visible(game, self, tile)? {
            Ok(())
        } else {
            Err(GameError::not_observable_tile(tile))
        }
    }

    pub fn assert_observable_object(&self, game: &Game, object: &GameObject) -> GameResult<()> {
        if observation::is_object_visible(game, self, object)? {
            Ok(())
        } else {
            Err(GameError::not_observable_object(object.id()))
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
