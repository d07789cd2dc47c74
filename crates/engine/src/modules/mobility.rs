//! Movement within a level and leveling between levels.
//!
//! Both actions are two-phase: a plan ([`Movement`], [`Leveling`]) is computed
//! against the world as the requester sees it, then `execute` re-validates
//! and commits it exactly once.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use fogwar_domain::{path, Change, ChangeDbl, LevelType, Maybool, Path, TileRef};

use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::notifier::GameEvent;
use crate::object::GameObject;
use crate::security::RequestContext;
use crate::sync::lock;

#[derive(Debug)]
pub struct Mobility {
    speed: f64,
    movement_costs: BTreeMap<LevelType, f64>,
    leveling_costs: BTreeMap<LevelType, f64>,
    remaining_speed: Mutex<f64>,
}

impl Mobility {
    /// A mobility module that cannot move anywhere until costs are added.
    pub fn new(speed: f64) -> Self {
        Self {
            speed,
            movement_costs: BTreeMap::new(),
            leveling_costs: BTreeMap::new(),
            remaining_speed: Mutex::new(speed),
        }
    }

    /// Allow moving on `level` at `cost` per step.
    pub fn moves_on(mut self, level: LevelType, cost: f64) -> Self {
        self.movement_costs.insert(level, cost);
        self
    }

    /// Allow leveling onto `level` at `cost`.
    pub fn levels_to(mut self, level: LevelType, cost: f64) -> Self {
        self.leveling_costs.insert(level, cost);
        self
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn movement_cost(&self, level: LevelType) -> Option<f64> {
        self.movement_costs.get(&level).copied()
    }

    pub fn leveling_cost(&self, level: LevelType) -> Option<f64> {
        self.leveling_costs.get(&level).copied()
    }

    pub fn remaining_speed(&self) -> f64 {
        *lock(&self.remaining_speed)
    }

    pub(crate) fn on_reset(&self) {
        *lock(&self.remaining_speed) = self.speed;
    }

    /// Spend `cost` if the remaining speed is still `expected`.
    fn consume(&self, expected: f64, cost: f64) -> Option<ChangeDbl> {
        let mut remaining = lock(&self.remaining_speed);
        if *remaining != expected || cost > *remaining {
            return None;
        }
        let old = *remaining;
        *remaining = old - cost;
        Some(ChangeDbl::new(old, *remaining))
    }

    /// Undo a `consume` whose move could not be committed.
    fn refund(&self, spent: &ChangeDbl) {
        let mut remaining = lock(&self.remaining_speed);
        if *remaining == *spent.to() {
            *remaining = *spent.from();
        }
    }

    /// Spend the planned speed and relocate `object`; the speed is refunded when
    /// the relocation fails.
    fn commit(
        &self,
        game: &Game,
        object: &Arc<GameObject>,
        speed_at_plan: f64,
        cost: f64,
        target: TileRef,
    ) -> GameResult<ChangeDbl> {
        let spent = self
            .consume(speed_at_plan, cost)
            .ok_or(GameError::Invalidated)?;
        if let Err(err) = object.set_location(game, target) {
            self.refund(&spent);
            return Err(err);
        }
        Ok(spent)
    }
}

fn is_accessible(game: &Game, ctx: &RequestContext, tile: TileRef) -> bool {
    matches!(
        game.tile(tile).and_then(|found| found.is_accessible(game, ctx)),
        Ok(Maybool::True)
    )
}

fn object_mobility(object: &GameObject) -> GameResult<&Mobility> {
    object.mobility().ok_or(GameError::Impossible)
}

/// A planned move along a path on the object's current level.
#[derive(Debug, Clone)]
pub struct Movement {
    object: Arc<GameObject>,
    source: TileRef,
    target: TileRef,
    speed_at_plan: f64,
    path: Option<Path<TileRef>>,
    possible: bool,
    cost: f64,
}

impl Movement {
    pub(crate) fn plan(
        game: &Game,
        ctx: &RequestContext,
        object: &Arc<GameObject>,
        target: TileRef,
    ) -> GameResult<Self> {
        ctx.assert_owned(object)?;
        let mobility = object_mobility(object)?;
        let source = object.current_location();
        let remaining = mobility.remaining_speed();

        let mut movement = Self {
            object: Arc::clone(object),
            source,
            target,
            speed_at_plan: remaining,
            path: None,
            possible: false,
            cost: 0.0,
        };
        let Some(step_cost) = mobility.movement_cost(source.level) else {
            return Ok(movement);
        };
        if target.level != source.level || target == source {
            return Ok(movement);
        }

        let search = |budget: f64| {
            path::find(
                source,
                |tile| *tile == target,
                |_| step_cost,
                budget,
                |tile| {
                    game.tile_neighbours(*tile)
                        .into_iter()
                        .filter(|&neighbour| is_accessible(game, ctx, neighbour))
                        .collect::<Vec<_>>()
                },
            )
        };

        if let Some(found) = search(remaining) {
            movement.cost = found.cost();
            movement.path = Some(found);
            movement.possible = true;
        } else if let Some(found) = search(f64::INFINITY) {
            // Steps on one level cost the same, so the overrunning step costs `step_cost`.
            movement.cost = step_cost;
            movement.path = Some(found);
        }
        Ok(movement)
    }

    pub fn object(&self) -> &Arc<GameObject> {
        &self.object
    }

    pub fn source(&self) -> TileRef {
        self.source
    }

    pub fn target(&self) -> TileRef {
        self.target
    }

    pub fn path(&self) -> Option<&Path<TileRef>> {
        self.path.as_ref()
    }

    pub fn is_possible(&self) -> bool {
        self.possible
    }

    /// Total cost when possible; otherwise the cost of the step that exceeds the
    /// remaining speed, or zero when no route is known.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn execute(self, game: &Game, ctx: &RequestContext) -> GameResult<()> {
        ctx.assert_owned(&self.object)?;
        ctx.assert_observable_object(game, &self.object)?;
        let path = match &self.path {
            Some(path) if self.possible => path,
            _ => return Err(GameError::Impossible),
        };

        let mobility = object_mobility(&self.object)?;
        if !self.object.is_alive()
            || self.object.current_location() != self.source
            || mobility.remaining_speed() != self.speed_at_plan
        {
            return Err(GameError::Invalidated);
        }
        for (index, step) in path.steps().iter().enumerate() {
            if !is_accessible(game, ctx, step.to) {
                return Err(GameError::PathInvalidated {
                    path: path.prefix(index + 1),
                });
            }
        }
        self.commit(game)
    }

    /// Apply a validated plan.
    pub(crate) fn commit(self, game: &Game) -> GameResult<()> {
        let path = self.path.ok_or(GameError::Impossible)?;
        let mobility = object_mobility(&self.object)?;
        let remaining_speed =
            mobility.commit(game, &self.object, self.speed_at_plan, self.cost, self.target)?;

        tracing::debug!(
            object_id = %self.object.id(),
            from = %self.source,
            to = %self.target,
            cost = self.cost,
            "Unit moved"
        );
        game.notifier().fire_if_observable_any(
            game,
            &[self.source, self.target],
            GameEvent::MobilityMoved {
                object: Arc::clone(&self.object),
                path,
                remaining_speed,
            },
        );
        Ok(())
    }
}

/// A planned change of level at the object's current position.
#[derive(Debug, Clone)]
pub struct Leveling {
    object: Arc<GameObject>,
    source: TileRef,
    target: TileRef,
    speed_at_plan: f64,
    possible: bool,
    cost: f64,
}

impl Leveling {
    pub(crate) fn plan(
        game: &Game,
        ctx: &RequestContext,
        object: &Arc<GameObject>,
        level: LevelType,
    ) -> GameResult<Self> {
        ctx.assert_owned(object)?;
        let mobility = object_mobility(object)?;
        let source = object.current_location();
        let target = source.on_level(level);
        let remaining = mobility.remaining_speed();
        let cost = mobility.leveling_cost(level);

        let possible = level != source.level
            && cost.is_some_and(|cost| cost <= remaining)
            && is_accessible(game, ctx, target);
        Ok(Self {
            object: Arc::clone(object),
            source,
            target,
            speed_at_plan: remaining,
            possible,
            cost: cost.unwrap_or(0.0),
        })
    }

    pub fn object(&self) -> &Arc<GameObject> {
        &self.object
    }

    pub fn target(&self) -> TileRef {
        self.target
    }

    pub fn is_possible(&self) -> bool {
        self.possible
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn execute(self, game: &Game, ctx: &RequestContext) -> GameResult<()> {
        ctx.assert_owned(&self.object)?;
        ctx.assert_observable_object(game, &self.object)?;
        if !self.possible {
            return Err(GameError::Impossible);
        }

        let mobility = object_mobility(&self.object)?;
        if !self.object.is_alive()
            || self.object.current_location() != self.source
            || mobility.remaining_speed() != self.speed_at_plan
            || !is_accessible(game, ctx, self.target)
        {
            return Err(GameError::Invalidated);
        }
        self.commit(game)
    }

    /// Apply a validated plan.
    pub(crate) fn commit(self, game: &Game) -> GameResult<()> {
        object_mobility(&self.object)?.commit(
            game,
            &self.object,
            self.speed_at_plan,
            self.cost,
            self.target,
        )?;

        tracing::debug!(
            object_id = %self.object.id(),
            from = %self.source.level,
            to = %self.target.level,
            "Unit leveled"
        );
        game.notifier().fire_if_observable_any(
            game,
            &[self.source, self.target],
            GameEvent::MobilityLeveled {
                object: Arc::clone(&self.object),
                level: Change::new(self.source.level, self.target.level),
            },
        );
        Ok(())
    }
}
