//! Ready barrier and turn advance.
//!
//! Each player marks itself ready for the current turn. The call that
//! completes the set advances the turn, all inside one critical section on
//! the ready set: the membership test, the clear, the new turn, the module
//! ticks and the `NewTurn` event. Two players finishing at once can
//! therefore neither double-advance nor lose a readiness.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use fogwar_domain::{PlayerId, Turn};

use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::notifier::GameEvent;
use crate::object::GameObject;
use crate::security::RequestContext;
use crate::sync::lock;

pub struct TurnController {
    ready: Mutex<BTreeSet<PlayerId>>,
}

impl TurnController {
    pub fn new() -> Self {
        Self {
            ready: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn ready_players(&self) -> Vec<PlayerId> {
        lock(&self.ready).iter().copied().collect()
    }

    /// Mark `player` ready. Returns true only for the call that advanced the turn.
    ///
    /// Key-less players may be marked ready by anyone; keyed players only by
    /// themselves.
    pub fn set_ready(&self, game: &Game, ctx: &RequestContext, player: PlayerId) -> GameResult<bool> {
        let target = game.player(player)?;
        if target.has_key() && !ctx.acts_as(player) {
            return Err(match ctx.current_player() {
                Ok(_) => GameError::NotCurrentPlayer { player },
                Err(err) => err,
            });
        }
        if game.has_ended() {
            return Err(GameError::GameNotRunning);
        }

        let mut ready = lock(&self.ready);
        ready.insert(player);
        tracing::debug!(player_id = %player, ready = ready.len(), "Player ready");
        game.notifier().fire(GameEvent::PlayerReady {
            player: Arc::clone(target),
            turn: game.current_turn(),
        });

        let all_ready = game
            .players()
            .iter()
            .all(|candidate| ready.contains(&candidate.id()));
        if !all_ready {
            return Ok(false);
        }
        ready.clear();
        self.advance(game);
        Ok(true)
    }

    /// Install the next turn and tick every object. Once the barrier has
    /// completed the turn always advances; a failing tick is logged and the
    /// remaining objects still tick.
    fn advance(&self, game: &Game) {
        let previous = game.current_turn();
        let turn = Arc::new(Turn::next(&previous, game.clock().now()));
        game.replace_turn(Arc::clone(&turn));
        if !game.is_running() {
            if let Err(err) = game.start() {
                tracing::warn!(error = %err, "Game did not start");
            }
        }
        tracing::info!(generation = turn.generation(), "New turn");

        let objects: Vec<Arc<GameObject>> = game
            .players()
            .iter()
            .flat_map(|player| player.owned_objects())
            .collect();
        for object in &objects {
            object.on_reset();
        }
        for object in &objects {
            if !object.is_alive() {
                continue;
            }
            if let Err(err) = object.on_new_turn(game) {
                tracing::warn!(object_id = %object.id(), error = %err, "Turn tick failed");
            }
        }

        game.notifier().fire(GameEvent::NewTurn { turn });
    }
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new()
    }
}
