//! Before/after pairs attached to every mutation notification

use serde::{Deserialize, Serialize};

/// An immutable record of a value before and after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change<T> {
    from: T,
    to: T,
}

/// Integer quantity change (stock, damage, score, resources).
pub type ChangeInt = Change<i64>;

/// Fractional change (remaining mobility speed).
pub type ChangeDbl = Change<f64>;

impl<T> Change<T> {
    pub fn new(from: T, to: T) -> Self {
        Self { from, to }
    }

    pub fn from(&self) -> &T {
        &self.from
    }

    pub fn to(&self) -> &T {
        &self.to
    }

    pub fn into_parts(self) -> (T, T) {
        (self.from, self.to)
    }
}

impl<T: PartialEq> Change<T> {
    /// True when the mutation did not alter the value.
    pub fn is_unchanged(&self) -> bool {
        self.from == self.to
    }
}

impl Change<i64> {
    /// Signed difference `to - from`.
    pub fn delta(&self) -> i64 {
        self.to - self.from
    }

    pub fn of_counts(from: impl Into<i64>, to: impl Into<i64>) -> Self {
        Self::new(from.into(), to.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_change_reports_delta() {
        let change = ChangeInt::of_counts(10u32, 4u32);
        assert_eq!(*change.from(), 10);
        assert_eq!(*change.to(), 4);
        assert_eq!(change.delta(), -6);
        assert!(!change.is_unchanged());
    }

    #[test]
    fn option_change_tracks_vacancy() {
        let change: Change<Option<u8>> = Change::new(Some(1), None);
        assert_eq!(change.into_parts(), (Some(1), None));
    }
}
