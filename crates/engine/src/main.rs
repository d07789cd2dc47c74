//! fogwar-sim - headless simulation driver.
//!
//! Builds a game from environment configuration, lets every unit wander and
//! shoot at whatever it sees, and advances turns until the game ends or the
//! turn limit is reached.

use std::sync::Arc;

use fogwar_domain::{Change, Maybe, ObjectId, PlayerId, TileRef, Turn};
use fogwar_engine::{
    Game, GameBuilder, GameConfig, GameError, GameListener, GameObject, RequestContext,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Logs the events a spectator would care about.
struct LoggingListener;

impl GameListener for LoggingListener {
    fn on_new_turn(&self, turn: &Arc<Turn>) {
        tracing::info!(generation = turn.generation(), "Turn started");
    }

    fn on_unit_died(&self, object: &Arc<GameObject>, tile: TileRef) {
        tracing::info!(object_id = %object.id(), tile = %tile, "Unit destroyed");
    }

    fn on_tile_contents(&self, tile: TileRef, contents: &Change<Option<ObjectId>>) {
        tracing::trace!(tile = %tile, from = ?contents.from(), to = ?contents.to(), "Tile contents");
    }

    fn on_game_ended(&self, victor: Option<PlayerId>) {
        tracing::info!(victor = ?victor, "Game over");
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fogwar_engine=debug,fogwar_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting fogwar simulation");

    let config = GameConfig::from_env();
    let turns: u64 = std::env::var("FOGWAR_TURNS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(20);

    let game = GameBuilder::from_config(&config)
        .add_listener(Arc::new(LoggingListener))
        .build()?;

    'turns: while game.current_turn().generation() < turns {
        for player in game.players() {
            let ctx = RequestContext::authenticate(&game, player.id(), player.key())?;
            play(&game, &ctx, player.id());
            if game.has_ended() {
                break 'turns;
            }
            game.set_ready(&ctx, player.id())?;
        }
    }

    if let Some(first) = game.players().first() {
        let ctx = RequestContext::authenticate(&game, first.id(), first.key())?;
        for info in game.list_player_game_info(&ctx)? {
            tracing::info!(
                player_id = %info.player,
                name = %info.name,
                score = info.score,
                "Final score"
            );
        }
    }
    Ok(())
}

/// One player's moves for the turn. Rejected actions are logged and skipped.
fn play(game: &Game, ctx: &RequestContext, player: PlayerId) {
    let Ok(Maybe::Present(objects)) = game.player(player).and_then(|p| p.objects(ctx)) else {
        return;
    };
    for object in objects {
        if let Err(e) = act(game, ctx, &object) {
            tracing::debug!(object_id = %object.id(), error = %e, "Action rejected");
        }
    }
}

fn act(game: &Game, ctx: &RequestContext, object: &Arc<GameObject>) -> Result<(), GameError> {
    let Maybe::Present(location) = object.location(game, ctx)? else {
        return Ok(());
    };

    // Shoot the first visible enemy in reach, otherwise wander.
    let has_weapon = object
        .modules(game, ctx)?
        .iter()
        .any(|module| module.as_weapon().is_some());
    if has_weapon {
        for tile in game.tile_neighbours(location) {
            let owner = game.tile(tile)?.owner(game, ctx)?;
            if matches!(owner, Maybe::Present(other) if Some(other) != ctx.player()) {
                return object.fire(game, ctx, tile);
            }
        }
    }

    let neighbours = game.tile_neighbours(location);
    if neighbours.is_empty() {
        return Ok(());
    }
    let generation = game.current_turn().generation() as usize;
    let index = location.position.x.unsigned_abs() as usize + generation;
    let target = neighbours[index % neighbours.len()];
    let movement = object.movement(game, ctx, target)?;
    if movement.is_possible() {
        movement.execute(game, ctx)?;
    }
    Ok(())
}
