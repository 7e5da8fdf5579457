use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::Hash;
use std::time::{Duration, Instant};

use fnv::FnvHashSet;
use separator::Separatable;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Stats {
    created_states: Vec<i32>,
    visited_states: Vec<i32>,
    duplicate_states: Vec<i32>,
}

impl Stats {
    pub fn new() -> Self {
        Stats {
            created_states: vec![],
            visited_states: vec![],
            duplicate_states: vec![],
        }
    }

    pub fn total_created(&self) -> i32 {
        self.created_states.iter().sum::<i32>()
    }

    pub fn total_unique_visited(&self) -> i32 {
        self.visited_states.iter().sum::<i32>()
    }

    pub fn total_reached_duplicates(&self) -> i32 {
        self.duplicate_states.iter().sum::<i32>()
    }

    fn add_created(&mut self, depth: usize) -> bool {
        Self::add(&mut self.created_states, depth)
    }

    fn add_unique_visited(&mut self, depth: usize) -> bool {
        Self::add(&mut self.visited_states, depth)
    }

    fn add_reached_duplicate(&mut self, depth: usize) -> bool {
        Self::add(&mut self.duplicate_states, depth)
    }

    fn add(counts: &mut Vec<i32>, depth: usize) -> bool {
        let mut ret = false;
        while depth >= counts.len() {
            counts.push(0);
            ret = true;
        }
        counts[depth] += 1;
        ret
    }

    /// Adds the counts of another run depth by depth.
    pub fn merge(&mut self, other: &Stats) {
        Self::merge_counts(&mut self.created_states, &other.created_states);
        Self::merge_counts(&mut self.visited_states, &other.visited_states);
        Self::merge_counts(&mut self.duplicate_states, &other.duplicate_states);
    }

    fn merge_counts(counts: &mut Vec<i32>, other: &[i32]) {
        if counts.len() < other.len() {
            counts.resize(other.len(), 0);
        }
        for (c, o) in counts.iter_mut().zip(other) {
            *c += o;
        }
    }
}

impl Debug for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "created by depth: {:?}", self.created_states)?;
        writeln!(f, "reached duplicates by depth: {:?}", self.duplicate_states)?;
        writeln!(f, "unique visited by depth: {:?}", self.visited_states)?;
        writeln!(f, "total created: {}", self.total_created().separated_string())?;
        writeln!(
            f,
            "total reached duplicates: {}",
            self.total_reached_duplicates().separated_string()
        )?;
        writeln!(
            f,
            "total unique visited: {}",
            self.total_unique_visited().separated_string()
        )
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let created = self.total_created();
        let duplicates = self.total_reached_duplicates();
        let visited = self.total_unique_visited();
        let left = created - visited - duplicates;
        writeln!(f, "States created total: {}", created.separated_string())?;
        writeln!(f, "Unique visited total: {}", visited.separated_string())?;
        writeln!(f, "Reached duplicates total: {}", duplicates.separated_string())?;
        writeln!(f, "Created but not reached total: {}", left.separated_string())?;
        writeln!(f)?;

        writeln!(
            f,
            "{:<15}{:<15}{:<15}{:<15}{}",
            "Depth", "Created", "Unique", "Duplicates", "Unknown (not reached)"
        )?;
        // created_states is always the longest
        for i in 0..self.created_states.len() {
            let visited = self.visited_states.get(i).cloned().unwrap_or(0);
            let duplicates = self.duplicate_states.get(i).cloned().unwrap_or(0);
            let left = self.created_states[i] - visited - duplicates;
            writeln!(
                f,
                "{:<15}{:<15}{:<15}{:<15}{}",
                format!("{}:", i),
                self.created_states[i].separated_string(),
                visited.separated_string(),
                duplicates.separated_string(),
                left.separated_string()
            )?;
        }
        Ok(())
    }
}

/// A graph searched by `search`.
pub(crate) trait SearchSpace {
    type State: Clone + Eq + Hash;
    /// What leads from a state to its child, collected into the resulting path.
    type Step: Clone;

    /// Estimated cost to goal, less is better.
    fn heuristic(&self, state: &Self::State) -> f64;

    fn is_goal(&self, state: &Self::State) -> bool;

    fn expand(&self, state: &Self::State) -> Vec<(Self::State, Self::Step)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Budget {
    /// Maximum number of visited states.
    Expansions(usize),
    /// Checked between expansions so a single expansion can overrun it.
    WallClock(Duration),
}

impl Budget {
    fn exhausted(self, visited: usize, started: Instant) -> bool {
        match self {
            Budget::Expansions(max) => visited >= max,
            Budget::WallClock(limit) => started.elapsed() > limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved,
    /// The budget ran out or there was nothing left to visit.
    Exhausted,
}

#[derive(Debug)]
pub(crate) struct SearchResult<S, T> {
    pub(crate) outcome: SearchOutcome,
    /// The goal if solved, otherwise the visited state with the lowest heuristic.
    pub(crate) state: S,
    /// Steps from the start to `state`.
    pub(crate) steps: Vec<T>,
    pub(crate) stats: Stats,
}

impl<S, T> SearchResult<S, T> {
    pub(crate) fn is_solved(&self) -> bool {
        self.outcome == SearchOutcome::Solved
    }
}

struct Discovered<S, T> {
    state: S,
    prev: Option<(usize, T)>,
    dist: usize,
    h: f64,
}

#[derive(Debug)]
struct SearchNode {
    index: usize,
    h: f64,
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // intentionally reversed for BinaryHeap, ties go to the older node
        other
            .h
            .partial_cmp(&self.h)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

/// Best-first search ordered by the heuristic alone.
///
/// Children are deduplicated as soon as they are discovered (using the state's
/// `Eq`/`Hash`), so every state is queued at most once and keeps the first
/// parent that found it.
pub(crate) fn search<Space: SearchSpace>(
    space: &Space,
    start: Space::State,
    budget: Budget,
) -> SearchResult<Space::State, Space::Step> {
    let started = Instant::now();
    let mut stats = Stats::new();

    let mut nodes: Vec<Discovered<Space::State, Space::Step>> = Vec::new();
    let mut discovered = FnvHashSet::default();
    let mut to_visit = BinaryHeap::new();

    let h = space.heuristic(&start);
    discovered.insert(start.clone());
    nodes.push(Discovered {
        state: start,
        prev: None,
        dist: 0,
        h,
    });
    stats.add_created(0);
    to_visit.push(SearchNode { index: 0, h });

    let mut visited = 0;
    let mut best = 0;

    while let Some(SearchNode { index, h }) = to_visit.pop() {
        if budget.exhausted(visited, started) {
            debug!("Search budget {:?} exhausted after {} states", budget, visited);
            break;
        }
        visited += 1;

        let dist = nodes[index].dist;
        stats.add_unique_visited(dist);
        if h < nodes[best].h {
            best = index;
        }

        if space.is_goal(&nodes[index].state) {
            debug!("Solved after visiting {} states, backtracking path", visited);
            return finish(nodes, index, SearchOutcome::Solved, stats);
        }

        for (child, step) in space.expand(&nodes[index].state) {
            stats.add_created(dist + 1);
            if discovered.contains(&child) {
                stats.add_reached_duplicate(dist + 1);
                continue;
            }
            let child_index = nodes.len();
            let h = space.heuristic(&child);
            discovered.insert(child.clone());
            nodes.push(Discovered {
                state: child,
                prev: Some((index, step)),
                dist: dist + 1,
                h,
            });
            to_visit.push(SearchNode {
                index: child_index,
                h,
            });
        }
    }

    finish(nodes, best, SearchOutcome::Exhausted, stats)
}

fn finish<S, T: Clone>(
    mut nodes: Vec<Discovered<S, T>>,
    last: usize,
    outcome: SearchOutcome,
    stats: Stats,
) -> SearchResult<S, T> {
    let steps = backtrack_path(&nodes, last);
    let state = nodes.swap_remove(last).state;
    SearchResult {
        outcome,
        state,
        steps,
        stats,
    }
}

fn backtrack_path<S, T: Clone>(nodes: &[Discovered<S, T>], last: usize) -> Vec<T> {
    let mut ret = Vec::new();
    let mut index = last;
    while let Some((prev, ref step)) = nodes[index].prev {
        ret.push(step.clone());
        index = prev;
    }
    ret.reverse();
    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walking on the integer line towards `goal`, can't enter `walls`.
    struct Line {
        goal: i32,
        walls: Vec<i32>,
    }

    impl SearchSpace for Line {
        type State = i32;
        type Step = i32;

        fn heuristic(&self, state: &i32) -> f64 {
            f64::from((self.goal - state).abs())
        }

        fn is_goal(&self, state: &i32) -> bool {
            *state == self.goal
        }

        fn expand(&self, state: &i32) -> Vec<(i32, i32)> {
            [-1, 1]
                .iter()
                .map(|d| (state + d, *d))
                .filter(|(s, _)| !self.walls.contains(s) && s.abs() <= 20)
                .collect()
        }
    }

    #[test]
    fn finds_path() {
        let line = Line {
            goal: 5,
            walls: vec![],
        };
        let res = search(&line, 0, Budget::Expansions(100));
        assert!(res.is_solved());
        assert_eq!(res.state, 5);
        assert_eq!(res.steps, vec![1, 1, 1, 1, 1]);
        assert_eq!(res.stats.total_unique_visited(), 6);
        // every visited state except the goal created 2 children, the way back is a duplicate
        assert_eq!(res.stats.total_created(), 11);
        assert_eq!(res.stats.total_reached_duplicates(), 4);
    }

    #[test]
    fn start_is_goal() {
        let line = Line {
            goal: 3,
            walls: vec![],
        };
        let res = search(&line, 3, Budget::Expansions(1));
        assert!(res.is_solved());
        assert!(res.steps.is_empty());
    }

    #[test]
    fn exhausted_returns_best_visited() {
        let line = Line {
            goal: 10,
            walls: vec![4],
        };
        let res = search(&line, 0, Budget::Expansions(1000));
        assert_eq!(res.outcome, SearchOutcome::Exhausted);
        assert_eq!(res.state, 3);
        assert_eq!(res.steps, vec![1, 1, 1]);

        let res = search(&line, 0, Budget::Expansions(2));
        assert_eq!(res.outcome, SearchOutcome::Exhausted);
        assert_eq!(res.stats.total_unique_visited(), 2);
        assert_eq!(res.state, 1);
    }

    #[test]
    fn wall_clock_budget() {
        let line = Line {
            goal: 10,
            walls: vec![],
        };
        let res = search(&line, 0, Budget::WallClock(Duration::from_secs(10)));
        assert!(res.is_solved());
        assert_eq!(res.steps.len(), 10);
    }

    #[test]
    fn stats_merge_and_format() {
        let mut a = Stats::new();
        a.add_created(0);
        a.add_created(1);
        a.add_unique_visited(0);
        let mut b = Stats::new();
        b.add_created(0);
        b.add_created(2);
        b.add_reached_duplicate(2);
        a.merge(&b);
        assert_eq!(a.created_states, vec![2, 1, 1]);
        assert_eq!(a.total_reached_duplicates(), 1);

        let text = a.to_string();
        assert!(text.starts_with("States created total: 4\n"));
        assert!(text.contains("Created but not reached total: 2\n"));
    }
}
