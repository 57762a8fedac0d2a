//! Outbound collaborators: the viewer the game draws on, and the lifecycle
//! event handlers.
//!
//! Both are write-only from the game's side. Nothing here is ever read back,
//! and a handler must not call back into the [`Game`](crate::game::Game)
//! that invoked it.

use crate::board::{Color, Coord, Stone};
use crate::route::Route;
use crate::step::{Mark, Step};

/// A display that mirrors the board. Every method defaults to doing nothing
/// so a viewer only implements what it draws.
pub trait Viewer {
    fn place_stone(&mut self, _stone: Stone) {}
    fn remove_stone(&mut self, _coord: Coord) {}
    fn draw_mark(&mut self, _mark: &Mark) {}
    fn clear_mark(&mut self, _coord: Coord) {}
    /// The color that plays next.
    fn set_active_color(&mut self, _color: Color) {}
    fn clear_branch_indicators(&mut self) {}
    /// The first stone of every variation that continues from the current
    /// position.
    fn show_branch_indicators(&mut self, _variations: &[Stone]) {}
}

type StepHandler = Box<dyn FnMut(&Route, &Step)>;
type ChangeHandler = Box<dyn FnMut(&Route, Option<&Step>)>;

/// At most one handler per event. A missing handler is a no-op.
#[derive(Default)]
pub struct Handlers {
    stone_created: Option<StepHandler>,
    stone_deleted: Option<StepHandler>,
    branch_move: Option<Box<dyn FnMut()>>,
    player_changed: Option<Box<dyn FnMut(&Route)>>,
    sgf_changed: Option<ChangeHandler>,
}

impl Handlers {
    pub fn on_stone_created(&mut self, f: impl FnMut(&Route, &Step) + 'static) {
        self.stone_created = Some(Box::new(f));
    }

    pub fn on_stone_deleted(&mut self, f: impl FnMut(&Route, &Step) + 'static) {
        self.stone_deleted = Some(Box::new(f));
    }

    pub fn on_branch_move(&mut self, f: impl FnMut() + 'static) {
        self.branch_move = Some(Box::new(f));
    }

    pub fn on_player_changed(&mut self, f: impl FnMut(&Route) + 'static) {
        self.player_changed = Some(Box::new(f));
    }

    pub fn on_sgf_changed(&mut self, f: impl FnMut(&Route, Option<&Step>) + 'static) {
        self.sgf_changed = Some(Box::new(f));
    }

    pub(crate) fn stone_created(&mut self, route: &Route, step: &Step) {
        if let Some(f) = self.stone_created.as_mut() {
            f(route, step);
        }
    }

    pub(crate) fn stone_deleted(&mut self, route: &Route, step: &Step) {
        if let Some(f) = self.stone_deleted.as_mut() {
            f(route, step);
        }
    }

    pub(crate) fn branch_move(&mut self) {
        if let Some(f) = self.branch_move.as_mut() {
            f();
        }
    }

    pub(crate) fn player_changed(&mut self, route: &Route) {
        if let Some(f) = self.player_changed.as_mut() {
            f(route);
        }
    }

    pub(crate) fn sgf_changed(&mut self, route: &Route, step: Option<&Step>) {
        if let Some(f) = self.sgf_changed.as_mut() {
            f(route, step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_missing_handlers_are_noops() {
        let mut handlers = Handlers::default();
        handlers.branch_move();
        handlers.player_changed(&Route::root());
        handlers.sgf_changed(&Route::root(), None);
    }

    #[test]
    fn test_registering_replaces_previous_handler() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut handlers = Handlers::default();
        let first = Rc::clone(&hits);
        handlers.on_branch_move(move || first.borrow_mut().push("first"));
        let second = Rc::clone(&hits);
        handlers.on_branch_move(move || second.borrow_mut().push("second"));
        handlers.branch_move();
        assert_eq!(*hits.borrow(), vec!["second"]);
    }
}
