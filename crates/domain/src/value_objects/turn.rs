//! Turn generations

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// One turn of the game. Immutable; advancing creates a new turn chained to this one.
#[derive(Debug, Clone)]
pub struct Turn {
    generation: u64,
    started_at: DateTime<Utc>,
    previous: Option<Arc<Turn>>,
}

impl Turn {
    /// The pre-game turn a freshly built game sits in.
    pub fn first(started_at: DateTime<Utc>) -> Self {
        Self {
            generation: 0,
            started_at,
            previous: None,
        }
    }

    /// The turn following `previous`.
    pub fn next(previous: &Arc<Turn>, started_at: DateTime<Utc>) -> Self {
        Self {
            generation: previous.generation + 1,
            started_at,
            previous: Some(Arc::clone(previous)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn previous(&self) -> Option<&Arc<Turn>> {
        self.previous.as_ref()
    }
}
