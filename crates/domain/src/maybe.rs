//! Tri-state results for fog-of-war queries
//!
//! A query about the world has three outcomes, not two: the value is known,
//! the value is known *not* to exist, or the requester is not allowed to know.
//! Collapsing the last two would leak information (an empty tile and an
//! unseen tile must look different to the caller), so `Maybe` keeps them apart.

use serde::{Deserialize, Serialize};

/// Which of the three states a [`Maybe`] is in, without its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Present,
    Absent,
    Unknown,
}

/// Known value, known absence, or unknown to the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "presence", content = "value", rename_all = "snake_case")]
pub enum Maybe<T> {
    /// The value exists and the requester may see it.
    Present(T),
    /// The requester may see that there is no value.
    Absent,
    /// The requester cannot currently observe whether a value exists.
    Unknown,
}

impl<T> Maybe<T> {
    /// `Present` for `Some`, `Absent` for `None`. Never produces `Unknown`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Present(value),
            None => Self::Absent,
        }
    }

    pub fn presence(&self) -> Presence {
        match self {
            Self::Present(_) => Presence::Present,
            Self::Absent => Presence::Absent,
            Self::Unknown => Presence::Unknown,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn as_ref(&self) -> Maybe<&T> {
        match self {
            Self::Present(value) => Maybe::Present(value),
            Self::Absent => Maybe::Absent,
            Self::Unknown => Maybe::Unknown,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Maybe<U> {
        match self {
            Self::Present(value) => Maybe::Present(f(value)),
            Self::Absent => Maybe::Absent,
            Self::Unknown => Maybe::Unknown,
        }
    }

    /// Chain a query that is itself visibility-gated. Absence and unknown-ness propagate.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Maybe<U>) -> Maybe<U> {
        match self {
            Self::Present(value) => f(value),
            Self::Absent => Maybe::Absent,
            Self::Unknown => Maybe::Unknown,
        }
    }

    /// The value if present. Loses the absent/unknown distinction; use with care.
    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Unknown => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.present().unwrap_or(default)
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        Self::from_option(value)
    }
}

/// Tri-state boolean: `True`, `False`, or unknown to the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Maybool {
    True,
    False,
    Unknown,
}

impl Maybool {
    pub fn is_true(self) -> bool {
        self == Self::True
    }

    pub fn is_false(self) -> bool {
        self == Self::False
    }

    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }

    /// Three-valued disjunction: any `True` wins, otherwise any `Unknown` taints the result.
    pub fn or(self, other: Maybool) -> Maybool {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            (Self::False, Self::False) => Self::False,
        }
    }
}

impl From<bool> for Maybool {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_option_never_yields_unknown() {
        assert_eq!(Maybe::from_option(Some(3)), Maybe::Present(3));
        assert_eq!(Maybe::<u32>::from_option(None), Maybe::Absent);
    }

    #[test]
    fn absent_and_unknown_stay_distinct() {
        let absent: Maybe<u32> = Maybe::Absent;
        let unknown: Maybe<u32> = Maybe::Unknown;
        assert_ne!(absent, unknown);
        assert_eq!(absent.presence(), Presence::Absent);
        assert_eq!(unknown.presence(), Presence::Unknown);
        assert_eq!(unknown.map(|v| v + 1), Maybe::Unknown);
        assert_eq!(absent.and_then(|v| Maybe::Present(v + 1)), Maybe::Absent);
    }

    #[test]
    fn and_then_propagates_inner_state() {
        let outer = Maybe::Present(2);
        assert_eq!(outer.and_then(|_| Maybe::<u32>::Unknown), Maybe::Unknown);
        assert_eq!(outer.and_then(|v| Maybe::Present(v * 2)), Maybe::Present(4));
    }

    #[test]
    fn maybool_or_is_three_valued() {
        assert_eq!(Maybool::False.or(Maybool::True), Maybool::True);
        assert_eq!(Maybool::False.or(Maybool::Unknown), Maybool::Unknown);
        assert_eq!(Maybool::False.or(Maybool::False), Maybool::False);
        assert_eq!(Maybool::Unknown.or(Maybool::True), Maybool::True);
    }

    #[test]
    fn maybe_wire_shape_is_tagged() {
        let json = serde_json::to_string(&Maybe::Present(5)).expect("serialize");
        assert_eq!(json, r#"{"presence":"present","value":5}"#);
        let json = serde_json::to_string(&Maybe::<u32>::Unknown).expect("serialize");
        assert_eq!(json, r#"{"presence":"unknown"}"#);
    }
}
