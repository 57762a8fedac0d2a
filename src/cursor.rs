//! The active position: a route plus its ply count.
//!
//! The cursor only does route arithmetic. Whether a move along the tree is
//! possible is decided by the caller, which also keeps the board in step.

use crate::route::Route;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    route: Route,
    ply: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn ply(&self) -> usize {
        self.ply
    }

    /// Where a continuation played from here would live.
    pub fn next(&self) -> Route {
        self.route.next()
    }

    /// Advance along a linear continuation.
    pub fn forward(&mut self) {
        self.route.advance();
        self.ply += 1;
    }

    /// Enter variation `branch` of the branch point ahead.
    pub fn checkout(&mut self, branch: usize) {
        self.route.enter(branch);
        self.ply += 1;
    }

    /// Retreat one ply. Returns false at the root.
    pub fn back(&mut self) -> bool {
        let moved = self.route.retreat();
        if moved {
            self.ply -= 1;
        }
        moved
    }

    pub fn jump(&mut self, route: Route) {
        self.ply = route.plies();
        self.route = route;
    }

    pub fn reset(&mut self) {
        self.jump(Route::root());
    }
}
