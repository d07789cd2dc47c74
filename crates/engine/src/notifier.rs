//! Filtered change notification.
//!
//! Every player-visible mutation is announced as a [`GameEvent`] through one
//! of three broadcast modes of the crate-private `ChangeNotifier`:
//!
//! - `fire`: every listener.
//! - `fire_if_player`: listeners whose registering player satisfies a
//!   predicate.
//! - `fire_if_observable`: listeners whose registering player currently
//!   observes a tile.
//!
//! Internal listeners (registered without a player) receive every event.
//! Only the game builder can add those; clients go through
//! `Game::add_listener`, which requires an authenticated player.
//!
//! The registry lock is held for the whole dispatch, so a listener being
//! added or removed concurrently is either invoked for the whole event or not
//! at all. Callbacks therefore must not register or remove listeners, nor
//! mutate the game; read-only queries are fine. Turn events are dispatched
//! while the ready set is locked, so callbacks must not call
//! `Game::set_ready` or `Game::ready_players` either.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use fogwar_domain::{
    Change, ChangeDbl, ChangeInt, LevelType, ObjectId, Path, PlayerId, ResourceType, TileRef, Turn,
};

use crate::game::Game;
use crate::object::GameObject;
use crate::observation;
use crate::player::Player;
use crate::sync::lock;

/// Handle returned on registration, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum GameEvent {
    PlayerReady {
        player: Arc<Player>,
        turn: Arc<Turn>,
    },
    NewTurn {
        turn: Arc<Turn>,
    },
    BaseDamaged {
        object: Arc<GameObject>,
        damage: ChangeInt,
    },
    TileContents {
        tile: TileRef,
        contents: Change<Option<ObjectId>>,
    },
    TileResources {
        tile: TileRef,
        resource: ResourceType,
        quantity: ChangeInt,
    },
    PlayerScore {
        player: Arc<Player>,
        score: ChangeInt,
    },
    PlayerGainedObject {
        player: Arc<Player>,
        object: Arc<GameObject>,
    },
    PlayerLostObject {
        player: Arc<Player>,
        object: Arc<GameObject>,
    },
    UnitCaptured {
        object: Arc<GameObject>,
        owner: Change<Option<PlayerId>>,
    },
    UnitMoved {
        object: Arc<GameObject>,
        location: Change<TileRef>,
    },
    UnitDied {
        object: Arc<GameObject>,
        tile: TileRef,
    },
    ContainerStockChanged {
        object: Arc<GameObject>,
        resource: ResourceType,
        stock: ChangeInt,
    },
    MobilityLeveled {
        object: Arc<GameObject>,
        level: Change<LevelType>,
    },
    MobilityMoved {
        object: Arc<GameObject>,
        path: Path<TileRef>,
        remaining_speed: ChangeDbl,
    },
    ConstructorWorked {
        object: Arc<GameObject>,
        remaining_speed: ChangeInt,
    },
    ConstructorTargeted {
        object: Arc<GameObject>,
        target: Change<Option<ObjectId>>,
    },
    ConstructionSiteWorked {
        site: Arc<GameObject>,
        remaining: ChangeInt,
    },
    WeaponFired {
        object: Arc<GameObject>,
        target: TileRef,
        ammunition: ChangeInt,
    },
    GameStarted {
        turn: Arc<Turn>,
    },
    GameEnded {
        victor: Option<PlayerId>,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayerReady { .. } => "player_ready",
            Self::NewTurn { .. } => "new_turn",
            Self::BaseDamaged { .. } => "base_damaged",
            Self::TileContents { .. } => "tile_contents",
            Self::TileResources { .. } => "tile_resources",
            Self::PlayerScore { .. } => "player_score",
            Self::PlayerGainedObject { .. } => "player_gained_object",
            Self::PlayerLostObject { .. } => "player_lost_object",
            Self::UnitCaptured { .. } => "unit_captured",
            Self::UnitMoved { .. } => "unit_moved",
            Self::UnitDied { .. } => "unit_died",
            Self::ContainerStockChanged { .. } => "container_stock_changed",
            Self::MobilityLeveled { .. } => "mobility_leveled",
            Self::MobilityMoved { .. } => "mobility_moved",
            Self::ConstructorWorked { .. } => "constructor_worked",
            Self::ConstructorTargeted { .. } => "constructor_targeted",
            Self::ConstructionSiteWorked { .. } => "construction_site_worked",
            Self::WeaponFired { .. } => "weapon_fired",
            Self::GameStarted { .. } => "game_started",
            Self::GameEnded { .. } => "game_ended",
        }
    }
}

/// Receiver of game events. Every callback defaults to a no-op.
pub trait GameListener: Send + Sync {
    fn on_player_ready(&self, _player: &Arc<Player>, _turn: &Arc<Turn>) {}
    fn on_new_turn(&self, _turn: &Arc<Turn>) {}
    fn on_base_damaged(&self, _object: &Arc<GameObject>, _damage: &ChangeInt) {}
    fn on_tile_contents(&self, _tile: TileRef, _contents: &Change<Option<ObjectId>>) {}
    fn on_tile_resources(&self, _tile: TileRef, _resource: ResourceType, _quantity: &ChangeInt) {}
    fn on_player_score(&self, _player: &Arc<Player>, _score: &ChangeInt) {}
    fn on_player_gained_object(&self, _player: &Arc<Player>, _object: &Arc<GameObject>) {}
    fn on_player_lost_object(&self, _player: &Arc<Player>, _object: &Arc<GameObject>) {}
    fn on_unit_captured(&self, _object: &Arc<GameObject>, _owner: &Change<Option<PlayerId>>) {}
    fn on_unit_moved(&self, _object: &Arc<GameObject>, _location: &Change<TileRef>) {}
    fn on_unit_died(&self, _object: &Arc<GameObject>, _tile: TileRef) {}
    fn on_container_stock_changed(
        &self,
        _object: &Arc<GameObject>,
        _resource: ResourceType,
        _stock: &ChangeInt,
    ) {
    }
    fn on_mobility_leveled(&self, _object: &Arc<GameObject>, _level: &Change<LevelType>) {}
    fn on_mobility_moved(
        &self,
        _object: &Arc<GameObject>,
        _path: &Path<TileRef>,
        _remaining_speed: &ChangeDbl,
    ) {
    }
    fn on_constructor_worked(&self, _object: &Arc<GameObject>, _remaining_speed: &ChangeInt) {}
    fn on_constructor_targeted(&self, _object: &Arc<GameObject>, _target: &Change<Option<ObjectId>>) {}
    fn on_construction_site_worked(&self, _site: &Arc<GameObject>, _remaining: &ChangeInt) {}
    fn on_weapon_fired(&self, _object: &Arc<GameObject>, _target: TileRef, _ammunition: &ChangeInt) {}
    fn on_game_started(&self, _turn: &Arc<Turn>) {}
    fn on_game_ended(&self, _victor: Option<PlayerId>) {}
}

/// Invoke the one listener callback matching `event`.
pub fn dispatch(listener: &dyn GameListener, event: &GameEvent) {
    match event {
        GameEvent::PlayerReady { player, turn } => listener.on_player_ready(player, turn),
        GameEvent::NewTurn { turn } => listener.on_new_turn(turn),
        GameEvent::BaseDamaged { object, damage } => listener.on_base_damaged(object, damage),
        GameEvent::TileContents { tile, contents } => listener.on_tile_contents(*tile, contents),
        GameEvent::TileResources {
            tile,
            resource,
            quantity,
        } => listener.on_tile_resources(*tile, *resource, quantity),
        GameEvent::PlayerScore { player, score } => listener.on_player_score(player, score),
        GameEvent::PlayerGainedObject { player, object } => {
            listener.on_player_gained_object(player, object)
        }
        GameEvent::PlayerLostObject { player, object } => {
            listener.on_player_lost_object(player, object)
        }
        GameEvent::UnitCaptured { object, owner } => listener.on_unit_captured(object, owner),
        GameEvent::UnitMoved { object, location } => listener.on_unit_moved(object, location),
        GameEvent::UnitDied { object, tile } => listener.on_unit_died(object, *tile),
        GameEvent::ContainerStockChanged {
            object,
            resource,
            stock,
        } => listener.on_container_stock_changed(object, *resource, stock),
        GameEvent::MobilityLeveled { object, level } => listener.on_mobility_leveled(object, level),
        GameEvent::MobilityMoved {
            object,
            path,
            remaining_speed,
        } => listener.on_mobility_moved(object, path, remaining_speed),
        GameEvent::ConstructorWorked {
            object,
            remaining_speed,
        } => listener.on_constructor_worked(object, remaining_speed),
        GameEvent::ConstructorTargeted { object, target } => {
            listener.on_constructor_targeted(object, target)
        }
        GameEvent::ConstructionSiteWorked { site, remaining } => {
            listener.on_construction_site_worked(site, remaining)
        }
        GameEvent::WeaponFired {
            object,
            target,
            ammunition,
        } => listener.on_weapon_fired(object, *target, ammunition),
        GameEvent::GameStarted { turn } => listener.on_game_started(turn),
        GameEvent::GameEnded { victor } => listener.on_game_ended(*victor),
    }
}

struct Registration {
    id: ListenerId,
    player: Option<PlayerId>,
    listener: Arc<dyn GameListener>,
}

/// Registry of listeners and the player each was registered by.
///
/// Crate-private: clients register through [`Game::add_listener`], which
/// ties every listener to an authenticated player.
pub(crate) struct ChangeNotifier {
    registry: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    pub(crate) fn new() -> Self {
        Self {
            registry: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `listener` on behalf of `player`, or as an internal listener when `None`.
    pub(crate) fn register(&self, player: Option<PlayerId>, listener: Arc<dyn GameListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.registry).push(Registration {
            id,
            player,
            listener,
        });
        tracing::debug!(listener_id = %id, player_id = ?player, "Registered listener");
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub(crate) fn unregister(&self, id: ListenerId) -> bool {
        let mut registry = lock(&self.registry);
        let before = registry.len();
        registry.retain(|registration| registration.id != id);
        let removed = registry.len() != before;
        if removed {
            tracing::debug!(listener_id = %id, "Removed listener");
        }
        removed
    }

    /// Player that registered a listener; `None` for internal listeners or unknown ids.
    pub(crate) fn registrant(&self, id: ListenerId) -> Option<PlayerId> {
        lock(&self.registry)
            .iter()
            .find(|registration| registration.id == id)
            .and_then(|registration| registration.player)
    }

    /// Notify every listener.
    pub(crate) fn fire(&self, event: GameEvent) {
        self.fire_if_player(event, |_| true);
    }

    /// Notify internal listeners and listeners whose player satisfies `predicate`.
    pub(crate) fn fire_if_player(&self, event: GameEvent, predicate: impl Fn(PlayerId) -> bool) {
        tracing::trace!(event = event.name(), "Dispatching event");
        let registry = lock(&self.registry);
        for registration in registry.iter() {
            let wanted = match registration.player {
                None => true,
                Some(player) => predicate(player),
            };
            if wanted {
                dispatch(registration.listener.as_ref(), &event);
            }
        }
    }

    /// Notify internal listeners and listeners whose player currently observes `tile`.
    pub(crate) fn fire_if_observable(&self, game: &Game, tile: TileRef, event: GameEvent) {
        self.fire_if_observable_any(game, &[tile], event);
    }

    /// Like `fire_if_observable`, for events spanning several tiles.
    pub(crate) fn fire_if_observable_any(&self, game: &Game, tiles: &[TileRef], event: GameEvent) {
        let observers: BTreeSet<PlayerId> = observation::observers(game, tiles);
        self.fire_if_player(event, |player| observers.contains(&player));
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingListener {
        game_ended: AtomicUsize,
        tile_contents: AtomicUsize,
    }

    impl GameListener for CountingListener {
        fn on_game_ended(&self, _victor: Option<PlayerId>) {
            self.game_ended.fetch_add(1, Ordering::SeqCst);
        }

        fn on_tile_contents(&self, _tile: TileRef, _contents: &Change<Option<ObjectId>>) {
            self.tile_contents.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn tile_event() -> GameEvent {
        GameEvent::TileContents {
            tile: TileRef::new(LevelType::Ground, fogwar_domain::Position::new(0, 0)),
            contents: Change::new(None, Some(ObjectId::new(1))),
        }
    }

    #[test]
    fn dispatch_calls_only_the_matching_callback() {
        let listener = CountingListener::default();
        dispatch(&listener, &GameEvent::GameEnded { victor: None });
        assert_eq!(listener.game_ended.load(Ordering::SeqCst), 1);
        assert_eq!(listener.tile_contents.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn predicate_filters_player_listeners_but_not_internal_ones() {
        let notifier = ChangeNotifier::new();
        let internal = Arc::new(CountingListener::default());
        let alice = Arc::new(CountingListener::default());
        let bob = Arc::new(CountingListener::default());
        notifier.register(None, internal.clone());
        notifier.register(Some(PlayerId::new(1)), alice.clone());
        notifier.register(Some(PlayerId::new(2)), bob.clone());

        notifier.fire_if_player(tile_event(), |player| player == PlayerId::new(1));

        assert_eq!(internal.tile_contents.load(Ordering::SeqCst), 1);
        assert_eq!(alice.tile_contents.load(Ordering::SeqCst), 1);
        assert_eq!(bob.tile_contents.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unregistered_listener_is_not_notified() {
        let notifier = ChangeNotifier::new();
        let listener = Arc::new(CountingListener::default());
        let id = notifier.register(Some(PlayerId::new(3)), listener.clone());
        assert_eq!(notifier.registrant(id), Some(PlayerId::new(3)));

        assert!(notifier.unregister(id));
        assert!(!notifier.unregister(id));
        notifier.fire(GameEvent::GameEnded { victor: None });

        assert_eq!(listener.game_ended.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.registrant(id), None);
    }
}
