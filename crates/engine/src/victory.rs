//! Victory conditions, checked after every unit death.

use std::fmt;
use std::str::FromStr;

use fogwar_domain::{DomainError, PlayerId};
use serde::{Deserialize, Serialize};

use crate::game::Game;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryCondition {
    /// The game ends when at most one player still owns objects.
    Annihilation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Undecided,
    /// The game is over; `victor` is `None` when nobody is left.
    Decided { victor: Option<PlayerId> },
}

impl VictoryCondition {
    pub fn evaluate(&self, game: &Game) -> Verdict {
        match self {
            Self::Annihilation => {
                let survivors: Vec<PlayerId> = game
                    .players()
                    .iter()
                    .filter(|player| player.owns_objects())
                    .map(|player| player.id())
                    .collect();
                match survivors.as_slice() {
                    [] => Verdict::Decided { victor: None },
                    [victor] => Verdict::Decided {
                        victor: Some(*victor),
                    },
                    _ => Verdict::Undecided,
                }
            }
        }
    }
}

impl fmt::Display for VictoryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annihilation => f.write_str("annihilation"),
        }
    }
}

impl FromStr for VictoryCondition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annihilation" => Ok(Self::Annihilation),
            other => Err(DomainError::parse(format!("Unknown victory condition: {other}"))),
        }
    }
}

/// End the game if any victory condition is decided. Only a running game can end.
pub(crate) fn check(game: &Game) {
    if !game.is_running() {
        return;
    }
    for condition in game.victory_conditions() {
        if let Verdict::Decided { victor } = condition.evaluate(game) {
            tracing::debug!(condition = %condition, victor = ?victor, "Victory condition met");
            game.end(victor);
            return;
        }
    }
}
