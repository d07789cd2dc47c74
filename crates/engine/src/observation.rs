//! Fog of war.
//!
//! An object observes a tile when it carries a Base module whose layers
//! include the tile's level and the tile lies within the base's view range
//! (Manhattan distance). A player observes everything its living objects do.

use std::collections::{BTreeSet, HashSet};

use fogwar_domain::{path, Maybe, Maybool, PlayerId, TileRef};

use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::object::GameObject;
use crate::player::Player;
use crate::security::{Identity, RequestContext};

pub(crate) fn object_observes(object: &GameObject, tile: TileRef) -> bool {
    if !object.is_alive() {
        return false;
    }
    let location = object.current_location();
    object.bases().any(|base| {
        base.layers().contains(&tile.level) && location.distance_to(tile) <= base.view_range()
    })
}

pub(crate) fn player_observes(player: &Player, tile: TileRef) -> bool {
    player
        .owned_objects()
        .iter()
        .any(|object| object_observes(object, tile))
}

/// Every tile `object` currently observes.
pub fn observable_tiles(game: &Game, object: &GameObject) -> HashSet<TileRef> {
    let mut tiles = HashSet::new();
    if !object.is_alive() {
        return tiles;
    }
    let location = object.current_location();
    for base in object.bases() {
        for &layer in base.layers() {
            let centre = location.on_level(layer);
            tiles.extend(path::neighbours(centre, base.view_range(), |tile| {
                game.tile_neighbours(*tile)
            }));
        }
    }
    tiles
}

/// The union of every tile observed by `player`'s objects.
///
/// Only the player itself (or bootstrap code) may enumerate this; anyone
/// else gets `Unknown`.
pub fn player_observable_tiles(
    game: &Game,
    ctx: &RequestContext,
    player: PlayerId,
) -> GameResult<Maybe<BTreeSet<TileRef>>> {
    if !ctx.is_authenticated() {
        return Err(GameError::NotAuthenticated);
    }
    let player = game.player(player)?;
    if !ctx.acts_as(player.id()) {
        return Ok(Maybe::Unknown);
    }
    let tiles = player
        .owned_objects()
        .iter()
        .flat_map(|object| observable_tiles(game, object))
        .collect();
    Ok(Maybe::Present(tiles))
}

/// Whether `player` can currently observe `tile`.
///
/// Fails when the context is anonymous. A requester asking about another
/// player's vision gets `Unknown`.
pub fn can_observe(
    game: &Game,
    ctx: &RequestContext,
    player: PlayerId,
    tile: TileRef,
) -> GameResult<Maybool> {
    if !ctx.is_authenticated() {
        return Err(GameError::NotAuthenticated);
    }
    let player = game.player(player)?;
    if !ctx.acts_as(player.id()) {
        return Ok(Maybool::Unknown);
    }
    Ok(Maybool::from(player_observes(player.as_ref(), tile)))
}

/// Whether the requester of `ctx` can currently see `tile`.
pub(crate) fn is_visible(game: &Game, ctx: &RequestContext, tile: TileRef) -> GameResult<bool> {
    match ctx.identity() {
        Identity::Anonymous => Err(GameError::NotAuthenticated),
        Identity::God => Ok(true),
        Identity::Player(player) => Ok(player_observes(game.player(player)?.as_ref(), tile)),
    }
}

/// Whether the requester of `ctx` can currently see `object`. Owners always see their own objects.
pub(crate) fn is_object_visible(
    game: &Game,
    ctx: &RequestContext,
    object: &GameObject,
) -> GameResult<bool> {
    match ctx.identity() {
        Identity::Anonymous => Err(GameError::NotAuthenticated),
        Identity::God => Ok(true),
        Identity::Player(player) if object.owner_id() == Some(player) => Ok(true),
        Identity::Player(_) if !object.is_alive() => Ok(false),
        Identity::Player(_) => is_visible(game, ctx, object.current_location()),
    }
}

/// Players observing at least one of `tiles`.
pub(crate) fn observers(game: &Game, tiles: &[TileRef]) -> BTreeSet<PlayerId> {
    game.players()
        .iter()
        .filter(|player| tiles.iter().any(|&tile| player_observes(player, tile)))
        .map(|player| player.id())
        .collect()
}
