//! The game aggregate: levels of tiles, players, the current turn.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use fogwar_domain::{
    Change, ChangeInt, LevelType, Maybe, Maybool, PlayerId, Position, ResourceType,
    Size, TileRef, Turn,
};
use serde::Serialize;

use crate::error::{GameError, GameResult};
use crate::notifier::{ChangeNotifier, GameEvent, GameListener, ListenerId};
use crate::object::GameObject;
use crate::observation;
use crate::player::Player;
use crate::ports::{ClockPort, RandomPort};
use crate::security::RequestContext;
use crate::sync::{lock, read, write};
use crate::turns::TurnController;
use crate::victory::VictoryCondition;

/// One grid cell. Holds at most one object and a quantity per resource type.
pub struct Tile {
    tile_ref: TileRef,
    contents: Mutex<Option<Arc<GameObject>>>,
    resources: Mutex<BTreeMap<ResourceType, u32>>,
}

impl Tile {
    fn new(tile_ref: TileRef) -> Self {
        Self {
            tile_ref,
            contents: Mutex::new(None),
            resources: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn tile_ref(&self) -> TileRef {
        self.tile_ref
    }

    pub fn level(&self) -> LevelType {
        self.tile_ref.level
    }

    pub fn position(&self) -> Position {
        self.tile_ref.position
    }

    pub fn is_observable(&self, game: &Game, ctx: &RequestContext) -> GameResult<bool> {
        observation::is_visible(game, ctx, self.tile_ref)
    }

    /// The occupying object; `Absent` for an observed empty tile, `Unknown` when unobserved.
    pub fn contents(&self, game: &Game, ctx: &RequestContext) -> GameResult<Maybe<Arc<GameObject>>> {
        if !self.is_observable(game, ctx)? {
            return Ok(Maybe::Unknown);
        }
        Ok(Maybe::from_option(self.occupant()))
    }

    /// Quantity of `resource` on the tile; `Absent` when there is none.
    pub fn resource_quantity(
        &self,
        game: &Game,
        ctx: &RequestContext,
        resource: ResourceType,
    ) -> GameResult<Maybe<u32>> {
        if !self.is_observable(game, ctx)? {
            return Ok(Maybe::Unknown);
        }
        let quantity = self.quantity(resource);
        Ok(Maybe::from_option((quantity > 0).then_some(quantity)))
    }

    /// Owner of the occupying object.
    pub fn owner(&self, game: &Game, ctx: &RequestContext) -> GameResult<Maybe<PlayerId>> {
        Ok(self
            .contents(game, ctx)?
            .and_then(|object| Maybe::from_option(object.owner_id())))
    }

    /// True when observed and empty.
    pub fn is_accessible(&self, game: &Game, ctx: &RequestContext) -> GameResult<Maybool> {
        Ok(match self.contents(game, ctx)? {
            Maybe::Present(_) => Maybool::False,
            Maybe::Absent => Maybool::True,
            Maybe::Unknown => Maybool::Unknown,
        })
    }

    pub(crate) fn occupant(&self) -> Option<Arc<GameObject>> {
        lock(&self.contents).clone()
    }

    pub(crate) fn quantity(&self, resource: ResourceType) -> u32 {
        lock(&self.resources).get(&resource).copied().unwrap_or(0)
    }

    /// Place `contents` on the tile, or vacate it with `None`.
    ///
    /// Setting a different object on an occupied tile is an invariant
    /// violation. Setting the object already there is a no-op.
    pub(crate) fn set_contents(
        &self,
        game: &Game,
        contents: Option<Arc<GameObject>>,
    ) -> GameResult<()> {
        let change = {
            let mut current = lock(&self.contents);
            match (current.as_ref(), contents.as_ref()) {
                (Some(occupant), Some(object)) if Arc::ptr_eq(occupant, object) => return Ok(()),
                (Some(occupant), Some(_)) => {
                    return Err(GameError::TileOccupied {
                        tile: self.tile_ref,
                        occupant: occupant.id(),
                    })
                }
                (None, None) => return Ok(()),
                _ => {}
            }
            let from = current.as_ref().map(|object| object.id());
            let to = contents.as_ref().map(|object| object.id());
            *current = contents;
            Change::new(from, to)
        };

        game.notifier().fire_if_observable(
            game,
            self.tile_ref,
            GameEvent::TileContents {
                tile: self.tile_ref,
                contents: change,
            },
        );
        Ok(())
    }

    /// Vacate the tile if `object` is its occupant.
    pub(crate) fn vacate(&self, game: &Game, object: &Arc<GameObject>) -> GameResult<()> {
        let occupied_by_object = self
            .occupant()
            .is_some_and(|occupant| Arc::ptr_eq(&occupant, object));
        if occupied_by_object {
            self.set_contents(game, None)?;
        }
        Ok(())
    }

    pub(crate) fn set_resource_quantity(
        &self,
        game: &Game,
        resource: ResourceType,
        quantity: i64,
    ) -> GameResult<()> {
        let Ok(new_quantity) = u32::try_from(quantity) else {
            return Err(GameError::NegativeResourceQuantity {
                tile: self.tile_ref,
                resource,
                quantity,
            });
        };

        let change = {
            let mut resources = lock(&self.resources);
            let old = resources.get(&resource).copied().unwrap_or(0);
            if old == new_quantity {
                return Ok(());
            }
            if new_quantity == 0 {
                resources.remove(&resource);
            } else {
                resources.insert(resource, new_quantity);
            }
            ChangeInt::of_counts(old, new_quantity)
        };

        game.notifier().fire_if_observable(
            game,
            self.tile_ref,
            GameEvent::TileResources {
                tile: self.tile_ref,
                resource,
                quantity: change,
            },
        );
        Ok(())
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tile")
            .field("tile", &self.tile_ref)
            .field("occupant", &self.occupant().map(|object| object.id()))
            .finish()
    }
}

/// One vertical layer of the world.
pub struct Level {
    level_type: LevelType,
    size: Size,
    tiles: Vec<Tile>,
}

impl Level {
    fn new(level_type: LevelType, size: Size) -> Self {
        let tiles = (0..size.area())
            .map(|index| Tile::new(TileRef::new(level_type, size.position_of(index))))
            .collect();
        Self {
            level_type,
            size,
            tiles,
        }
    }

    pub fn level_type(&self) -> LevelType {
        self.level_type
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.size
            .index_of(position)
            .and_then(|index| self.tiles.get(index))
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

/// What a requester knows about another player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerGameInfo {
    pub player: PlayerId,
    pub name: String,
    /// True once the requester can see at least one of this player's objects.
    pub discovered: bool,
    pub score: u32,
}

pub struct Game {
    size: Size,
    levels: Vec<Level>,
    players: Vec<Arc<Player>>,
    victory_conditions: Vec<VictoryCondition>,
    turn: RwLock<Arc<Turn>>,
    running: AtomicBool,
    ended: AtomicBool,
    turns: TurnController,
    notifier: ChangeNotifier,
    unowned_sequence: AtomicU32,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
}

impl Game {
    pub(crate) fn new(
        size: Size,
        players: Vec<Arc<Player>>,
        victory_conditions: Vec<VictoryCondition>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let levels = LevelType::ALL
            .iter()
            .map(|&level_type| Level::new(level_type, size))
            .collect();
        let turn = Arc::new(Turn::first(clock.now()));
        Self {
            size,
            levels,
            players,
            victory_conditions,
            turn: RwLock::new(turn),
            running: AtomicBool::new(false),
            ended: AtomicBool::new(false),
            turns: TurnController::new(),
            notifier: ChangeNotifier::new(),
            unowned_sequence: AtomicU32::new(0),
            random,
            clock,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, level_type: LevelType) -> &Level {
        &self.levels[level_type.index()]
    }

    pub fn tile(&self, tile: TileRef) -> GameResult<&Tile> {
        self.level(tile.level)
            .tile(tile.position)
            .ok_or(GameError::NoSuchTile { tile })
    }

    /// In-bounds neighbours of `tile` on its own level.
    pub fn tile_neighbours(&self, tile: TileRef) -> Vec<TileRef> {
        tile.position
            .neighbours()
            .into_iter()
            .filter(|&position| self.size.contains(position))
            .map(|position| TileRef::new(tile.level, position))
            .collect()
    }

    pub fn players(&self) -> &[Arc<Player>] {
        &self.players
    }

    pub fn player(&self, player: PlayerId) -> GameResult<&Arc<Player>> {
        self.players
            .iter()
            .find(|candidate| candidate.id() == player)
            .ok_or(GameError::UnknownPlayer { player })
    }

    pub fn player_game_info(
        &self,
        ctx: &RequestContext,
        player: PlayerId,
    ) -> GameResult<PlayerGameInfo> {
        if !ctx.is_authenticated() {
            return Err(GameError::NotAuthenticated);
        }
        let target = self.player(player)?;
        let mut discovered = ctx.acts_as(player);
        for object in target.owned_objects() {
            if discovered {
                break;
            }
            discovered = observation::is_object_visible(self, ctx, &object)?;
        }
        Ok(PlayerGameInfo {
            player,
            name: target.name().to_string(),
            discovered,
            score: target.score(),
        })
    }

    pub fn list_player_game_info(&self, ctx: &RequestContext) -> GameResult<Vec<PlayerGameInfo>> {
        self.players
            .iter()
            .map(|player| self.player_game_info(ctx, player.id()))
            .collect()
    }

    pub fn victory_conditions(&self) -> &[VictoryCondition] {
        &self.victory_conditions
    }

    pub fn current_turn(&self) -> Arc<Turn> {
        Arc::clone(&read(&self.turn))
    }

    pub(crate) fn replace_turn(&self, turn: Arc<Turn>) {
        *write(&self.turn) = turn;
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn has_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    pub fn ready_players(&self) -> Vec<PlayerId> {
        self.turns.ready_players()
    }

    /// Mark `player` done for the current turn. Returns true if this call advanced the turn.
    pub fn set_ready(&self, ctx: &RequestContext, player: PlayerId) -> GameResult<bool> {
        self.turns.set_ready(self, ctx, player)
    }

    pub(crate) fn start(&self) -> GameResult<()> {
        if self.has_ended() {
            return Err(GameError::GameNotRunning);
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(GameError::GameAlreadyRunning);
        }
        let turn = self.current_turn();
        tracing::info!(generation = turn.generation(), "Game started");
        self.notifier.fire(GameEvent::GameStarted { turn });
        Ok(())
    }

    /// Stop the game and announce the victor. Later calls are no-ops.
    pub(crate) fn end(&self, victor: Option<PlayerId>) {
        if self.ended.swap(true, Ordering::SeqCst) {
            return;
        }
        self.running.store(false, Ordering::SeqCst);
        tracing::info!(victor = ?victor, "Game ended");
        self.notifier.fire(GameEvent::GameEnded { victor });
    }

    /// Register a listener on behalf of the authenticated caller.
    ///
    /// The listener only hears about tiles its player observes. The notifier
    /// itself stays inside the crate:
    ///
    /// ```compile_fail
    /// fn listen(game: &fogwar_engine::Game) {
    ///     let _ = game.notifier();
    /// }
    /// ```
    pub fn add_listener(
        &self,
        ctx: &RequestContext,
        listener: Arc<dyn GameListener>,
    ) -> GameResult<ListenerId> {
        let player = ctx.current_player()?;
        Ok(self.notifier.register(Some(player), listener))
    }

    /// Remove a listener the caller registered.
    pub fn remove_listener(&self, ctx: &RequestContext, id: ListenerId) -> GameResult<bool> {
        if !ctx.is_god() {
            let player = ctx.current_player()?;
            if self.notifier.registrant(id) != Some(player) {
                return Ok(false);
            }
        }
        Ok(self.notifier.unregister(id))
    }

    pub(crate) fn add_internal_listener(&self, listener: Arc<dyn GameListener>) -> ListenerId {
        self.notifier.register(None, listener)
    }

    pub(crate) fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub(crate) fn next_unowned_sequence(&self) -> u32 {
        self.unowned_sequence.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn random(&self) -> &dyn RandomPort {
        self.random.as_ref()
    }

    pub(crate) fn clock(&self) -> &dyn ClockPort {
        self.clock.as_ref()
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("size", &self.size)
            .field("players", &self.players.len())
            .field("turn", &self.current_turn().generation())
            .field("running", &self.is_running())
            .finish()
    }
}
