//! Budgeted reachability search over an abstract neighbour graph
//!
//! The search is breadth-first with a visited set, not cost-ordered. Ties are
//! broken by discovery order, so on graphs with non-uniform step costs the
//! returned path is the first one found within budget, not necessarily the
//! cheapest. Grid movement uses uniform costs per level, where the two agree.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;
use std::sync::Arc;

/// One edge taken by a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step<N> {
    pub from: N,
    pub to: N,
}

/// A path through the graph, stored as a chain of shared prefixes.
///
/// Extending a path never copies the prefix, so every frontier entry of a
/// search costs one allocation.
#[derive(Debug, Clone)]
pub struct Path<N> {
    parent: Option<Arc<Path<N>>>,
    target: N,
    cost: f64,
}

impl<N: Clone> Path<N> {
    /// The empty path standing at `root`.
    pub fn root(root: N) -> Self {
        Self {
            parent: None,
            target: root,
            cost: 0.0,
        }
    }

    /// Append one step costing `step_cost`.
    pub fn extend(self: &Arc<Self>, to: N, step_cost: f64) -> Self {
        Self {
            parent: Some(Arc::clone(self)),
            target: to,
            cost: self.cost + step_cost,
        }
    }

    pub fn target(&self) -> &N {
        &self.target
    }

    /// Cumulative cost from the root.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn parent(&self) -> Option<&Arc<Path<N>>> {
        self.parent.as_ref()
    }

    pub fn source(&self) -> &N {
        match &self.parent {
            Some(parent) => parent.source(),
            None => &self.target,
        }
    }

    /// Number of steps; zero for a root path.
    pub fn len(&self) -> usize {
        let mut length = 0;
        let mut current = self.parent.as_deref();
        while let Some(path) = current {
            length += 1;
            current = path.parent.as_deref();
        }
        length
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_none()
    }

    /// All nodes from the root to the target, inclusive.
    pub fn nodes(&self) -> Vec<N> {
        let mut nodes = vec![self.target.clone()];
        let mut current = self.parent.as_deref();
        while let Some(path) = current {
            nodes.push(path.target.clone());
            current = path.parent.as_deref();
        }
        nodes.reverse();
        nodes
    }

    pub fn steps(&self) -> Vec<Step<N>> {
        self.nodes()
            .windows(2)
            .map(|pair| Step {
                from: pair[0].clone(),
                to: pair[1].clone(),
            })
            .collect()
    }

    /// The prefix of this path ending after `steps` steps, or the whole path if shorter.
    pub fn prefix(&self, steps: usize) -> Path<N> {
        let mut current = self;
        let mut remaining = self.len().saturating_sub(steps);
        while remaining > 0 {
            match current.parent.as_deref() {
                Some(parent) => current = parent,
                None => break,
            }
            remaining -= 1;
        }
        current.clone()
    }
}

/// Search outward from `root` for the first node satisfying `found`.
///
/// Returns the root itself at cost zero if it already satisfies `found`.
/// Neighbours whose cumulative cost would exceed `max_cost` are discarded;
/// `None` means nothing satisfying `found` is reachable within budget.
pub fn find<N, I>(
    root: N,
    mut found: impl FnMut(&N) -> bool,
    mut cost: impl FnMut(&Step<N>) -> f64,
    max_cost: f64,
    mut neighbours: impl FnMut(&N) -> I,
) -> Option<Path<N>>
where
    N: Clone + Eq + Hash,
    I: IntoIterator<Item = N>,
{
    if found(&root) {
        return Some(Path::root(root));
    }

    let mut visited = HashSet::from([root.clone()]);
    let mut frontier = VecDeque::from([Arc::new(Path::root(root))]);

    while let Some(path) = frontier.pop_front() {
        for neighbour in neighbours(path.target()) {
            if visited.contains(&neighbour) {
                continue;
            }
            let step = Step {
                from: path.target().clone(),
                to: neighbour,
            };
            let step_cost = cost(&step);
            if path.cost() + step_cost > max_cost {
                continue;
            }

            visited.insert(step.to.clone());
            let next = path.extend(step.to, step_cost);
            if found(next.target()) {
                return Some(next);
            }
            frontier.push_back(Arc::new(next));
        }
    }

    None
}

/// Every node within `radius` hops of `root`, including `root`.
pub fn neighbours<N, I>(root: N, radius: u32, mut neighbours_of: impl FnMut(&N) -> I) -> HashSet<N>
where
    N: Clone + Eq + Hash,
    I: IntoIterator<Item = N>,
{
    let mut reached = HashSet::from([root.clone()]);
    let mut frontier = VecDeque::from([(root, 0u32)]);

    while let Some((node, depth)) = frontier.pop_front() {
        if depth >= radius {
            continue;
        }
        for neighbour in neighbours_of(&node) {
            if reached.insert(neighbour.clone()) {
                frontier.push_back((neighbour, depth + 1));
            }
        }
    }

    reached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Position;

    fn chain(length: i32) -> impl FnMut(&i32) -> Vec<i32> {
        move |&node| {
            [node - 1, node + 1]
                .into_iter()
                .filter(|n| (0..length).contains(n))
                .collect()
        }
    }

    #[test]
    fn root_matching_returns_at_zero_cost() {
        let path = find(2, |&n| n == 2, |_| 1.0, 0.0, chain(5)).expect("root path");
        assert!(path.is_empty());
        assert_eq!(path.cost(), 0.0);
        assert_eq!(*path.target(), 2);
    }

    #[test]
    fn chain_within_budget_is_found() {
        let path = find(0, |&n| n == 3, |_| 1.0, 3.0, chain(5)).expect("reachable");
        assert_eq!(path.len(), 3);
        assert_eq!(path.nodes(), vec![0, 1, 2, 3]);
        assert_eq!(path.cost(), 3.0);
        assert_eq!(*path.source(), 0);
    }

    #[test]
    fn chain_beyond_budget_is_not_found() {
        assert!(find(0, |&n| n == 4, |_| 1.0, 3.0, chain(5)).is_none());
    }

    #[test]
    fn search_respects_per_step_costs() {
        // Stepping from 1 to 2 is expensive, so 3 is out of budget.
        let cost = |step: &Step<i32>| if step.from == 1 && step.to == 2 { 5.0 } else { 1.0 };
        assert!(find(0, |&n| n == 3, cost, 4.0, chain(5)).is_none());
        assert!(find(0, |&n| n == 3, cost, 7.0, chain(5)).is_some());
    }

    #[test]
    fn steps_and_prefix() {
        let path = find(0, |&n| n == 3, |_| 1.0, 10.0, chain(5)).expect("reachable");
        let steps = path.steps();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0], Step { from: 0, to: 1 });

        let prefix = path.prefix(2);
        assert_eq!(prefix.nodes(), vec![0, 1, 2]);
        assert_eq!(prefix.cost(), 2.0);
        assert_eq!(path.prefix(10).len(), 3);
    }

    #[test]
    fn radius_zero_is_just_the_root() {
        let reached = neighbours(Position::new(3, 3), 0, |p: &Position| p.neighbours());
        assert_eq!(reached, HashSet::from([Position::new(3, 3)]));
    }

    #[test]
    fn radius_on_open_grid_is_manhattan_ball() {
        let origin = Position::new(0, 0);
        for radius in 1..=4u32 {
            let reached = neighbours(origin, radius, |p: &Position| p.neighbours());
            let r = radius as i32;
            let mut ball = HashSet::new();
            for x in -r..=r {
                for y in -r..=r {
                    let p = Position::new(x, y);
                    if origin.distance_to(p) <= radius {
                        ball.insert(p);
                    }
                }
            }
            assert_eq!(reached, ball, "radius {radius}");
        }
    }
}
