//! Game objects: units and construction sites.
//!
//! Field mutations (owner, location) are each atomic. A compound change such
//! as a move is a sequence of them and is not isolated from a concurrent move
//! onto the same tiles; callers issue one command per object at a time.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use fogwar_domain::{Change, LevelType, Maybe, ObjectId, PlayerId, TileRef};

use crate::content::UnitType;
use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::modules::{
    Base, ConstructionSite, Constructor, Container, Leveling, Mobility, Module, Movement, Weapon,
};
use crate::notifier::GameEvent;
use crate::observation;
use crate::security::RequestContext;
use crate::sync::{read, write};
use crate::victory;

pub struct GameObject {
    id: ObjectId,
    unit_type: UnitType,
    owner: RwLock<Option<PlayerId>>,
    location: RwLock<TileRef>,
    alive: AtomicBool,
    modules: Vec<Module>,
    site: Option<ConstructionSite>,
}

impl GameObject {
    /// Place a new object on `tile`, owned by `owner`.
    pub(crate) fn spawn(
        game: &Game,
        unit_type: UnitType,
        owner: Option<PlayerId>,
        tile: TileRef,
        modules: Vec<Module>,
        site: Option<ConstructionSite>,
    ) -> GameResult<Arc<Self>> {
        let destination = game.tile(tile)?;
        if let Some(occupant) = destination.occupant() {
            return Err(GameError::TileOccupied {
                tile,
                occupant: occupant.id(),
            });
        }
        let sequence = match owner {
            Some(player) => game.player(player)?.next_object_sequence(),
            None => game.next_unowned_sequence(),
        };

        let object = Arc::new(Self {
            id: ObjectId::compose(owner, sequence),
            unit_type,
            owner: RwLock::new(None),
            location: RwLock::new(tile),
            alive: AtomicBool::new(true),
            modules,
            site,
        });
        // Owner first, so the owner already observes the tile when its contents change.
        object.set_owner(game, owner)?;
        destination.set_contents(game, Some(Arc::clone(&object)))?;
        tracing::debug!(
            object_id = %object.id,
            unit_type = %unit_type,
            owner = ?owner,
            tile = %tile,
            "Object spawned"
        );
        Ok(object)
    }

    pub(crate) fn spawn_unit(
        game: &Game,
        unit_type: UnitType,
        owner: Option<PlayerId>,
        tile: TileRef,
    ) -> GameResult<Arc<Self>> {
        Self::spawn(game, unit_type, owner, tile, unit_type.modules(), None)
    }

    pub(crate) fn spawn_site(
        game: &Game,
        unit_type: UnitType,
        owner: Option<PlayerId>,
        tile: TileRef,
    ) -> GameResult<Arc<Self>> {
        let site = ConstructionSite::new(unit_type);
        Self::spawn(game, unit_type, owner, tile, Vec::new(), Some(site))
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// For a construction site, the unit type being built.
    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    pub fn is_construction_site(&self) -> bool {
        self.site.is_some()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn owner(&self, game: &Game, ctx: &RequestContext) -> GameResult<Maybe<PlayerId>> {
        if !observation::is_object_visible(game, ctx, self)? {
            return Ok(Maybe::Unknown);
        }
        Ok(Maybe::from_option(self.owner_id()))
    }

    /// Current tile; `Absent` once the object has died.
    pub fn location(&self, game: &Game, ctx: &RequestContext) -> GameResult<Maybe<TileRef>> {
        if !observation::is_object_visible(game, ctx, self)? {
            return Ok(Maybe::Unknown);
        }
        Ok(Maybe::from_option(
            self.is_alive().then(|| self.current_location()),
        ))
    }

    /// The object's modules. Fails unless the requester can observe the object.
    pub fn modules(&self, game: &Game, ctx: &RequestContext) -> GameResult<&[Module]> {
        ctx.assert_observable_object(game, self)?;
        Ok(&self.modules)
    }

    pub fn construction_site(
        &self,
        game: &Game,
        ctx: &RequestContext,
    ) -> GameResult<Option<&ConstructionSite>> {
        ctx.assert_observable_object(game, self)?;
        Ok(self.site.as_ref())
    }

    pub fn movement(
        self: &Arc<Self>,
        game: &Game,
        ctx: &RequestContext,
        target: TileRef,
    ) -> GameResult<Movement> {
        Movement::plan(game, ctx, self, target)
    }

    pub fn leveling(
        self: &Arc<Self>,
        game: &Game,
        ctx: &RequestContext,
        level: LevelType,
    ) -> GameResult<Leveling> {
        Leveling::plan(game, ctx, self, level)
    }

    /// Fire the object's weapon at `target`.
    pub fn fire(self: &Arc<Self>, game: &Game, ctx: &RequestContext, target: TileRef) -> GameResult<()> {
        ctx.assert_owned(self)?;
        let weapon = self.weapon().ok_or(GameError::Impossible)?;
        weapon.fire(game, ctx, self, target)
    }

    /// Start building `unit_type` on an adjacent tile. Returns the new construction site.
    pub fn schedule_construction(
        self: &Arc<Self>,
        game: &Game,
        ctx: &RequestContext,
        unit_type: UnitType,
        tile: TileRef,
    ) -> GameResult<Arc<GameObject>> {
        ctx.assert_owned(self)?;
        let constructor = self.constructor().ok_or(GameError::Impossible)?;
        constructor.schedule(game, ctx, self, unit_type, tile)
    }

    /// Direct the object's constructor at an existing site.
    pub fn target_construction(
        self: &Arc<Self>,
        game: &Game,
        ctx: &RequestContext,
        site: &Arc<GameObject>,
    ) -> GameResult<()> {
        ctx.assert_owned(self)?;
        let constructor = self.constructor().ok_or(GameError::Impossible)?;
        constructor.set_target(game, ctx, self, site)
    }

    pub(crate) fn owner_id(&self) -> Option<PlayerId> {
        *read(&self.owner)
    }

    pub(crate) fn current_location(&self) -> TileRef {
        *read(&self.location)
    }

    pub(crate) fn site(&self) -> Option<&ConstructionSite> {
        self.site.as_ref()
    }

    pub(crate) fn bases(&self) -> impl Iterator<Item = &Base> {
        self.modules.iter().filter_map(Module::as_base)
    }

    pub(crate) fn containers(&self) -> impl Iterator<Item = &Container> {
        self.modules.iter().filter_map(Module::as_container)
    }

    pub(crate) fn mobility(&self) -> Option<&Mobility> {
        self.modules.iter().find_map(Module::as_mobility)
    }

    pub(crate) fn weapon(&self) -> Option<&Weapon> {
        self.modules.iter().find_map(Module::as_weapon)
    }

    pub(crate) fn constructor(&self) -> Option<&Constructor> {
        self.modules.iter().find_map(Module::as_constructor)
    }

    /// Transfer ownership. A no-op when `owner` is already the owner.
    pub(crate) fn set_owner(self: &Arc<Self>, game: &Game, owner: Option<PlayerId>) -> GameResult<()> {
        let new_player = owner.map(|player| game.player(player)).transpose()?;
        let old = {
            let mut current = write(&self.owner);
            if *current == owner {
                return Ok(());
            }
            std::mem::replace(&mut *current, owner)
        };
        let old_player = old.map(|player| game.player(player)).transpose()?;

        if let Some(player) = old_player {
            player.remove_object(self.id);
        }
        if let Some(player) = new_player {
            player.insert_object(Arc::clone(self));
        }
        tracing::debug!(object_id = %self.id, from = ?old, to = ?owner, "Ownership transferred");

        if let Some(player) = old_player {
            let lost = player.id();
            game.notifier().fire_if_player(
                GameEvent::PlayerLostObject {
                    player: Arc::clone(player),
                    object: Arc::clone(self),
                },
                |candidate| candidate == lost,
            );
        }
        if let Some(player) = new_player {
            let gained = player.id();
            game.notifier().fire_if_player(
                GameEvent::PlayerGainedObject {
                    player: Arc::clone(player),
                    object: Arc::clone(self),
                },
                |candidate| candidate == gained,
            );
        }
        if old.is_some() && owner.is_some() {
            game.notifier().fire_if_observable(
                game,
                self.current_location(),
                GameEvent::UnitCaptured {
                    object: Arc::clone(self),
                    owner: Change::new(old, owner),
                },
            );
        }
        Ok(())
    }

    /// Move to `to`, vacating the current tile.
    pub(crate) fn set_location(self: &Arc<Self>, game: &Game, to: TileRef) -> GameResult<()> {
        let from = self.current_location();
        if from == to {
            return Ok(());
        }
        let destination = game.tile(to)?;
        if let Some(occupant) = destination.occupant() {
            if !Arc::ptr_eq(&occupant, self) {
                return Err(GameError::TileOccupied {
                    tile: to,
                    occupant: occupant.id(),
                });
            }
        }

        // Vacate while still standing on `from`, so its observers are unchanged.
        let origin = game.tile(from)?;
        origin.vacate(game, self)?;
        *write(&self.location) = to;
        if let Err(err) = destination.set_contents(game, Some(Arc::clone(self))) {
            *write(&self.location) = from;
            origin.set_contents(game, Some(Arc::clone(self)))?;
            return Err(err);
        }

        game.notifier().fire_if_observable_any(
            game,
            &[from, to],
            GameEvent::UnitMoved {
                object: Arc::clone(self),
                location: Change::new(from, to),
            },
        );
        Ok(())
    }

    /// Remove the object from the world and its owner. Returns false if it was already gone.
    pub(crate) fn retire(self: &Arc<Self>, game: &Game) -> GameResult<bool> {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return Ok(false);
        }
        game.tile(self.current_location())?.vacate(game, self)?;
        self.set_owner(game, None)?;
        Ok(true)
    }

    /// Destroy the object and check whether that decided the game.
    pub(crate) fn die(self: &Arc<Self>, game: &Game) -> GameResult<()> {
        let owner = self.owner_id();
        let tile = self.current_location();
        if !self.retire(game)? {
            return Ok(());
        }
        tracing::debug!(object_id = %self.id, tile = %tile, "Unit died");

        let observers = observation::observers(game, &[tile]);
        game.notifier().fire_if_player(
            GameEvent::UnitDied {
                object: Arc::clone(self),
                tile,
            },
            |player| Some(player) == owner || observers.contains(&player),
        );
        victory::check(game);
        Ok(())
    }

    pub(crate) fn on_reset(&self) {
        for module in &self.modules {
            module.on_reset();
        }
    }

    pub(crate) fn on_new_turn(self: &Arc<Self>, game: &Game) -> GameResult<()> {
        for module in &self.modules {
            if !self.is_alive() {
                break;
            }
            module.on_new_turn(game, self)?;
        }
        Ok(())
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("unit_type", &self.unit_type)
            .field("owner", &self.owner_id())
            .field("location", &self.current_location())
            .field("alive", &self.is_alive())
            .finish()
    }
}
