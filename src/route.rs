//! Hierarchical addresses into the game tree.
//!
//! A route is `[p0, b1, p1, ..., bm, pm]`: `p0` plies along the main line,
//! then for every fork taken, the branch index `bj` followed by the number
//! of plies `pj >= 1` played inside that branch. `[0]` is the empty board.
//!
//! Routes are plain values. Any edit that reshapes the tree (a split or a
//! deletion) may change the address of existing nodes, so routes should be
//! recomputed from the cursor rather than kept across edits.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Route(Vec<usize>);

impl Default for Route {
    fn default() -> Self {
        Self::root()
    }
}

impl Route {
    pub fn root() -> Self {
        Route(vec![0])
    }

    /// Build a route from raw components, rejecting malformed shapes.
    pub fn from_parts(parts: Vec<usize>) -> Option<Self> {
        if parts.len() % 2 == 0 {
            return None;
        }
        // every ply count after a branch selector is at least 1
        if parts.iter().skip(2).step_by(2).any(|&p| p == 0) {
            return None;
        }
        Some(Route(parts))
    }

    pub fn parts(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == [0]
    }

    /// Number of forks this route passes through.
    pub fn depth(&self) -> usize {
        self.0.len() / 2
    }

    /// Total number of plies from the root.
    pub fn plies(&self) -> usize {
        self.0.iter().step_by(2).sum()
    }

    /// Ply count inside the innermost line.
    pub fn last(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    /// The address a new continuation would take if played from here.
    pub fn next(&self) -> Self {
        let mut next = self.clone();
        next.advance();
        next
    }

    /// The route one ply closer to the root, clamped at the root.
    pub fn parent(&self) -> Self {
        let mut parent = self.clone();
        parent.retreat();
        parent
    }

    pub(crate) fn advance(&mut self) {
        let n = self.0.len();
        self.0[n - 1] += 1;
    }

    pub(crate) fn enter(&mut self, branch: usize) {
        self.0.push(branch);
        self.0.push(1);
    }

    /// Step back one ply. Leaving the first ply of a branch also drops its
    /// selector. Returns false at the root.
    pub(crate) fn retreat(&mut self) -> bool {
        let n = self.0.len();
        match self.0[n - 1] {
            0 => false,
            1 if n > 1 => {
                self.0.truncate(n - 2);
                true
            }
            _ => {
                self.0[n - 1] -= 1;
                true
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, "]")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRouteError(String);

impl fmt::Display for ParseRouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid route: {}", self.0)
    }
}

impl std::error::Error for ParseRouteError {}

impl FromStr for Route {
    type Err = ParseRouteError;

    /// Accepts `[3, 1, 2]`, `3,1,2` or `3.1.2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
        let parts = inner
            .split([',', '.'])
            .map(|p| p.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseRouteError(s.to_string()))?;
        Route::from_parts(parts).ok_or_else(|| ParseRouteError(s.to_string()))
    }
}
