//! The branch store.
//!
//! The tree is a [`Line`]: a run of steps, optionally ending in a fork of
//! two or more child lines. [`GameTree::get`] answers what lives at a
//! [`Route`] as a [`Node`]; the mutating operations keep two shape
//! invariants:
//!
//! - a fork never holds fewer than two lines (a fork left with one line is
//!   merged back into its parent),
//! - a line inside a fork is never empty.

use crate::route::Route;
use crate::step::Step;

/// A run of consecutive steps and the variations that follow it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub steps: Vec<Step>,
    pub fork: Vec<Line>,
}

impl Line {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            fork: Vec::new(),
        }
    }

    fn count(&self) -> usize {
        self.steps.len() + self.fork.iter().map(Line::count).sum::<usize>()
    }
}

/// What a route addresses.
#[derive(Debug, PartialEq, Eq)]
pub enum Node<'a> {
    /// Nothing has been played there.
    Absent,
    /// An unambiguous continuation.
    Single(&'a Step),
    /// A branch point: the first step of every variation, in order.
    Branch(Vec<&'a Step>),
}

impl<'a> Node<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Node::Absent)
    }

    pub fn single(&self) -> Option<&'a Step> {
        match self {
            Node::Single(step) => Some(*step),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameTree {
    root: Line,
}

impl GameTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a hand-made line. Empty variations hand their
    /// forks up, lone variations are merged into their parent, and a
    /// variation repeating an earlier sibling's first step is dropped.
    pub fn from_root(mut root: Line) -> Self {
        tidy(&mut root);
        Self { root }
    }

    pub fn root(&self) -> &Line {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.steps.is_empty() && self.root.fork.is_empty()
    }

    /// Total number of steps in every variation.
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    pub fn reset(&mut self) {
        self.root = Line::default();
    }

    pub fn get(&self, route: &Route) -> Node<'_> {
        let Some(line) = self.locate(route.parts()) else {
            return Node::Absent;
        };
        let ply = route.last();
        if ply == 0 {
            Node::Absent
        } else if ply <= line.steps.len() {
            Node::Single(&line.steps[ply - 1])
        } else if ply == line.steps.len() + 1 && !line.fork.is_empty() {
            Node::Branch(line.fork.iter().map(|l| &l.steps[0]).collect())
        } else {
            Node::Absent
        }
    }

    pub fn get_mut(&mut self, route: &Route) -> Option<&mut Step> {
        let ply = route.last();
        let line = self.locate_mut(route.parts())?;
        if ply == 0 {
            return None;
        }
        line.steps.get_mut(ply - 1)
    }

    /// Store `step` as the sole continuation of `parent`. Fails if anything
    /// already continues from there.
    pub fn insert(&mut self, parent: &Route, step: Step) -> bool {
        let ply = parent.last();
        let Some(line) = self.locate_mut(parent.parts()) else {
            return false;
        };
        if ply != line.steps.len() || !line.fork.is_empty() {
            return false;
        }
        log::debug!("insert {step} after {parent}");
        line.steps.push(step);
        true
    }

    /// Turn the continuation at `route` into a branch point that also holds
    /// `step`, returning the new variation's index.
    ///
    /// A single continuation is split: it and everything after it become
    /// variation 0, `step` variation 1. An existing branch point gets `step`
    /// appended. Returns `None` when there is nothing to diverge from or
    /// `step` is already there.
    pub fn divide(&mut self, route: &Route, step: Step) -> Option<usize> {
        let ply = route.last();
        // the first step of a variation is diverged from at its branch point
        if ply == 0 || (ply == 1 && route.depth() > 0) {
            return None;
        }
        let line = self.locate_mut(route.parts())?;
        if ply <= line.steps.len() {
            if line.steps[ply - 1] == step {
                return None;
            }
            log::debug!("split {route} for {step}");
            let tail = line.steps.split_off(ply - 1);
            let rest = std::mem::take(&mut line.fork);
            line.fork = vec![
                Line {
                    steps: tail,
                    fork: rest,
                },
                Line::new(vec![step]),
            ];
            Some(1)
        } else if ply == line.steps.len() + 1 && !line.fork.is_empty() {
            if line.fork.iter().any(|l| l.steps[0] == step) {
                return None;
            }
            log::debug!("new variation at {route} for {step}");
            line.fork.push(Line::new(vec![step]));
            Some(line.fork.len() - 1)
        } else {
            None
        }
    }

    /// Search the branch point at `route` for a variation starting with
    /// `step`, beginning at `from` and wrapping around.
    pub fn find(&self, route: &Route, step: &Step, from: usize) -> Option<usize> {
        let Node::Branch(firsts) = self.get(route) else {
            return None;
        };
        let n = firsts.len();
        (0..n).map(|k| (from + k) % n).find(|&i| firsts[i] == step)
    }

    /// Remove the node at `route` and everything after it.
    ///
    /// Removing the first step of a variation removes the variation; if only
    /// one variation is left it is merged into its parent line, which shifts
    /// the addresses of its nodes. Addressing a branch point removes all of
    /// its variations.
    pub fn delete(&mut self, route: &Route) -> bool {
        let parts = route.parts();
        let ply = route.last();
        if ply == 0 {
            return false;
        }
        if parts.len() == 1 {
            return truncate(&mut self.root, ply);
        }

        let n = parts.len();
        let (parent_ply, branch) = (parts[n - 3], parts[n - 2]);
        let Some(parent) = self.locate_mut(&parts[..n - 2]) else {
            return false;
        };
        if parent_ply != parent.steps.len() || branch >= parent.fork.len() {
            return false;
        }
        if ply > 1 {
            return truncate(&mut parent.fork[branch], ply);
        }

        log::debug!("drop variation {branch} at {route}");
        parent.fork.remove(branch);
        if parent.fork.len() == 1 {
            let only = parent.fork.remove(0);
            parent.steps.extend(only.steps);
            parent.fork = only.fork;
        }
        true
    }

    /// The line a route ends in, checking that every fork it passes through
    /// is entered from the end of its parent line.
    fn locate(&self, parts: &[usize]) -> Option<&Line> {
        let mut line = &self.root;
        let mut i = 0;
        while i + 2 < parts.len() {
            if parts[i] != line.steps.len() {
                return None;
            }
            line = line.fork.get(parts[i + 1])?;
            i += 2;
        }
        Some(line)
    }

    fn locate_mut(&mut self, parts: &[usize]) -> Option<&mut Line> {
        let mut line = &mut self.root;
        let mut i = 0;
        while i + 2 < parts.len() {
            if parts[i] != line.steps.len() {
                return None;
            }
            line = line.fork.get_mut(parts[i + 1])?;
            i += 2;
        }
        Some(line)
    }
}

/// Restore both shape invariants below `line`.
fn tidy(line: &mut Line) {
    let mut fork: Vec<Line> = Vec::new();
    for mut child in std::mem::take(&mut line.fork) {
        tidy(&mut child);
        let lines = if child.steps.is_empty() {
            child.fork
        } else {
            vec![child]
        };
        for l in lines {
            if fork.iter().any(|f| f.steps[0] == l.steps[0]) {
                log::debug!("drop duplicate variation starting {}", l.steps[0]);
                continue;
            }
            fork.push(l);
        }
    }
    if fork.len() == 1 {
        let only = fork.remove(0);
        line.steps.extend(only.steps);
        line.fork = only.fork;
    } else {
        line.fork = fork;
    }
}

/// Cut `line` just before its `ply`-th step (1-based). `ply` one past the
/// end drops the fork only.
fn truncate(line: &mut Line, ply: usize) -> bool {
    if ply <= line.steps.len() {
        line.steps.truncate(ply - 1);
        line.fork.clear();
        true
    } else if ply == line.steps.len() + 1 && !line.fork.is_empty() {
        line.fork.clear();
        true
    } else {
        false
    }
}
