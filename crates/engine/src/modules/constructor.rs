use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use fogwar_domain::{Change, ChangeInt, ModuleKind, ResourceCost, ResourceType, TileRef};

use crate::content::UnitType;
use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::notifier::GameEvent;
use crate::object::GameObject;
use crate::player::Player;
use crate::security::RequestContext;
use crate::sync::lock;

/// Work left on a unit being built, per module kind.
#[derive(Debug)]
pub struct ConstructionSite {
    unit_type: UnitType,
    remaining: Mutex<BTreeMap<ModuleKind, ResourceCost>>,
}

impl ConstructionSite {
    pub fn new(unit_type: UnitType) -> Self {
        let mut remaining: BTreeMap<ModuleKind, ResourceCost> = BTreeMap::new();
        for module in unit_type.modules() {
            remaining
                .entry(module.kind())
                .or_default()
                .add_cost(&module.cost());
        }
        Self {
            unit_type,
            remaining: Mutex::new(remaining),
        }
    }

    /// The unit this site turns into once complete.
    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    pub fn remaining_for(&self, kind: ModuleKind) -> ResourceCost {
        lock(&self.remaining).get(&kind).cloned().unwrap_or_default()
    }

    /// Total work left across every module kind.
    pub fn remaining_work(&self) -> ResourceCost {
        lock(&self.remaining)
            .values()
            .fold(ResourceCost::new(), |total, cost| total.plus(cost))
    }

    pub fn is_complete(&self) -> bool {
        lock(&self.remaining).values().all(ResourceCost::is_zero)
    }

    fn reduce(&self, kind: ModuleKind, resource: ResourceType, amount: u32) {
        if let Some(cost) = lock(&self.remaining).get_mut(&kind) {
            cost.reduce(resource, amount);
        }
    }
}

#[derive(Debug)]
struct ConstructorState {
    remaining_speed: u32,
    target: Option<Weak<GameObject>>,
}

/// Builds construction sites using resources from its owner's containers.
#[derive(Debug)]
pub struct Constructor {
    build_speed: u32,
    builds: Vec<ModuleKind>,
    state: Mutex<ConstructorState>,
}

impl Constructor {
    pub fn new(build_speed: u32, builds: &[ModuleKind]) -> Self {
        Self {
            build_speed,
            builds: builds.to_vec(),
            state: Mutex::new(ConstructorState {
                remaining_speed: build_speed,
                target: None,
            }),
        }
    }

    /// Resource units this constructor can spend per turn.
    pub fn build_speed(&self) -> u32 {
        self.build_speed
    }

    /// Module kinds this constructor can work on.
    pub fn builds(&self) -> &[ModuleKind] {
        &self.builds
    }

    pub fn remaining_speed(&self) -> u32 {
        lock(&self.state).remaining_speed
    }

    /// The site being worked on, while it still stands.
    pub fn target(&self) -> Option<Arc<GameObject>> {
        lock(&self.state)
            .target
            .as_ref()
            .and_then(Weak::upgrade)
            .filter(|site| site.is_alive())
    }

    pub(crate) fn on_reset(&self) {
        lock(&self.state).remaining_speed = self.build_speed;
    }

    /// Put a new construction site for `unit_type` on an adjacent tile and target it.
    pub(crate) fn schedule(
        &self,
        game: &Game,
        ctx: &RequestContext,
        object: &Arc<GameObject>,
        unit_type: UnitType,
        tile: TileRef,
    ) -> GameResult<Arc<GameObject>> {
        ctx.assert_owned(object)?;
        ctx.assert_observable_tile(game, tile)?;
        check_adjacent(object, tile)?;
        if game.tile(tile)?.occupant().is_some() {
            return Err(GameError::Impossible);
        }

        let site = GameObject::spawn_site(game, unit_type, object.owner_id(), tile)?;
        tracing::debug!(
            object_id = %object.id(),
            site_id = %site.id(),
            unit_type = %unit_type,
            tile = %tile,
            "Construction scheduled"
        );
        self.retarget(game, object, Some(&site));
        Ok(site)
    }

    /// Work on an existing adjacent site owned by the same player.
    pub(crate) fn set_target(
        &self,
        game: &Game,
        ctx: &RequestContext,
        object: &Arc<GameObject>,
        site: &Arc<GameObject>,
    ) -> GameResult<()> {
        ctx.assert_owned(object)?;
        ctx.assert_observable_object(game, site)?;
        if !site.is_alive() || site.site().is_none() {
            return Err(GameError::Impossible);
        }
        if site.owner_id() != object.owner_id() {
            return Err(GameError::NotOwned { object: site.id() });
        }
        check_adjacent(object, site.current_location())?;
        self.retarget(game, object, Some(site));
        Ok(())
    }

    fn retarget(&self, game: &Game, object: &Arc<GameObject>, site: Option<&Arc<GameObject>>) {
        let change = {
            let mut state = lock(&self.state);
            let old = state
                .target
                .as_ref()
                .and_then(Weak::upgrade)
                .map(|previous| previous.id());
            state.target = site.map(Arc::downgrade);
            Change::new(old, site.map(|site| site.id()))
        };
        if change.is_unchanged() {
            return;
        }
        game.notifier().fire_if_observable(
            game,
            object.current_location(),
            GameEvent::ConstructorTargeted {
                object: Arc::clone(object),
                target: change,
            },
        );
    }

    pub(crate) fn on_new_turn(&self, game: &Game, object: &Arc<GameObject>) -> GameResult<()> {
        let Some(site) = self.target() else {
            return Ok(());
        };
        let Some(work) = site.site() else {
            return Ok(());
        };
        let Some(owner) = object.owner_id() else {
            return Ok(());
        };
        if check_adjacent(object, site.current_location()).is_err() {
            return Ok(());
        }
        let player = game.player(owner)?;

        let speed_before = self.remaining_speed();
        let work_before = work.remaining_work().total();
        let mut budget = speed_before;
        'kinds: for &kind in &self.builds {
            for (resource, amount) in work.remaining_for(kind).iter() {
                if budget == 0 {
                    break 'kinds;
                }
                let taken = take_resources(game, object, player, resource, amount.min(budget));
                if taken > 0 {
                    work.reduce(kind, resource, taken);
                    budget -= taken;
                }
            }
        }

        if budget == speed_before {
            return Ok(());
        }
        lock(&self.state).remaining_speed = budget;

        game.notifier().fire_if_observable(
            game,
            object.current_location(),
            GameEvent::ConstructorWorked {
                object: Arc::clone(object),
                remaining_speed: ChangeInt::of_counts(speed_before, budget),
            },
        );
        let work_after = work.remaining_work().total();
        game.notifier().fire_if_observable(
            game,
            site.current_location(),
            GameEvent::ConstructionSiteWorked {
                site: Arc::clone(&site),
                remaining: ChangeInt::new(
                    i64::try_from(work_before).unwrap_or(i64::MAX),
                    i64::try_from(work_after).unwrap_or(i64::MAX),
                ),
            },
        );

        if work.is_complete() {
            complete(game, &site)?;
        }
        Ok(())
    }
}

fn check_adjacent(object: &GameObject, tile: TileRef) -> GameResult<()> {
    let location = object.current_location();
    if location.level != tile.level {
        return Err(GameError::Impossible);
    }
    let distance = location.distance_to(tile);
    if distance > 1 {
        return Err(GameError::OutOfRange { distance, range: 1 });
    }
    Ok(())
}

/// Take up to `amount` of `resource` from the owner's containers, the working object's first.
fn take_resources(
    game: &Game,
    object: &Arc<GameObject>,
    player: &Player,
    resource: ResourceType,
    amount: u32,
) -> u32 {
    let others = player
        .owned_objects()
        .into_iter()
        .filter(|other| other.id() != object.id());
    let mut taken = 0;
    for holder in std::iter::once(Arc::clone(object)).chain(others) {
        for container in holder
            .containers()
            .filter(|container| container.resource_type() == resource)
        {
            taken += container.take_stock(game, &holder, amount - taken);
            if taken == amount {
                return taken;
            }
        }
    }
    taken
}

/// Replace a finished site with the unit it was building.
fn complete(game: &Game, site: &Arc<GameObject>) -> GameResult<()> {
    let tile = site.current_location();
    let owner = site.owner_id();
    let unit_type = site.unit_type();
    site.retire(game)?;
    let unit = GameObject::spawn_unit(game, unit_type, owner, tile)?;
    tracing::debug!(
        site_id = %site.id(),
        object_id = %unit.id(),
        unit_type = %unit_type,
        "Construction completed"
    );
    Ok(())
}
