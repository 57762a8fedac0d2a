//! The public entry point: a game record being played and edited.
//!
//! [`Game`] owns the tree, the cursor and the board, and keeps the board
//! equal to a replay of the tree from the root to the cursor after every
//! call. Rejected operations change nothing and fire nothing.

use std::fmt;

use crate::board::{Board, Color, Coord, Stone};
use crate::cursor::Cursor;
use crate::options::{Metadata, Options, OptionsError};
use crate::route::Route;
use crate::rules::{MoveError, RuleEngine};
use crate::sgf::{self, SgfError};
use crate::step::{Mark, MarkKind, Step};
use crate::tree::{GameTree, Line, Node};
use crate::viewer::{Handlers, Viewer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    Options(OptionsError),
    Sgf(SgfError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Options(e) => write!(f, "{e}"),
            GameError::Sgf(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<OptionsError> for GameError {
    fn from(e: OptionsError) -> Self {
        GameError::Options(e)
    }
}

impl From<SgfError> for GameError {
    fn from(e: SgfError) -> Self {
        GameError::Sgf(e)
    }
}

/// What an accepted [`Game::put_stone`] did to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// A new step was added to the tree.
    pub created: bool,
    /// The cursor entered a variation.
    pub switched: bool,
    /// Number of stones captured.
    pub captured: usize,
}

/// How a placement relates to what is already stored after the cursor.
enum Plan {
    Insert,
    Replay,
    Diverge,
    Switch(usize),
}

pub struct Game {
    meta: Metadata,
    rules: RuleEngine,
    board: Board,
    cursor: Cursor,
    tree: GameTree,
    viewer: Option<Box<dyn Viewer>>,
    /// Points whose marks the viewer is currently showing.
    drawn: Vec<Coord>,
    handlers: Handlers,
}

impl Default for Game {
    fn default() -> Self {
        let meta = Metadata::default();
        Self {
            board: Board::new(meta.width, meta.height),
            meta,
            rules: RuleEngine::default(),
            cursor: Cursor::new(),
            tree: GameTree::new(),
            viewer: None,
            drawn: Vec::new(),
            handlers: Handlers::default(),
        }
    }
}

impl Game {
    /// Build a game from options, loading `options.data` if present.
    pub fn new(options: Options) -> Result<Self, GameError> {
        let meta = Metadata::from_options(&options)?;
        let mut game = Self {
            board: Board::new(meta.width, meta.height),
            meta,
            rules: RuleEngine::new(options.ko),
            ..Self::default()
        };
        if let Some(data) = &options.data {
            game.load(data)?;
        }
        Ok(game)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    pub fn route(&self) -> &Route {
        self.cursor.route()
    }

    pub fn ply(&self) -> usize {
        self.cursor.ply()
    }

    pub fn ko(&self) -> bool {
        self.rules.ko()
    }

    /// The step the cursor stands on; `None` at the root.
    pub fn current(&self) -> Option<&Step> {
        self.tree.get(self.cursor.route()).single()
    }

    /// The color that plays next: the opponent of the current step, Black
    /// at the root.
    pub fn turn(&self) -> Color {
        self.current()
            .map_or(Color::Black, |step| step.color().opponent())
    }

    /// Attach a viewer and bring it up to date.
    pub fn set_viewer(&mut self, viewer: impl Viewer + 'static) {
        let mut viewer: Box<dyn Viewer> = Box::new(viewer);
        for stone in self.board.stones() {
            viewer.place_stone(stone);
        }
        self.viewer = Some(viewer);
        self.drawn.clear();
        self.refresh();
    }

    pub fn handlers(&mut self) -> &mut Handlers {
        &mut self.handlers
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Play `color` at `coord` from the current position.
    ///
    /// Replaying a stored continuation only moves the cursor; a different
    /// move creates a variation. An illegal move leaves everything as it was.
    pub fn put_stone(&mut self, coord: Coord, color: Color) -> Result<Placement, MoveError> {
        let step = Step::new(coord, color, self.cursor.ply() + 1);
        let verdict = self
            .rules
            .evaluate(&self.board, step.stone)
            .inspect_err(|e| log::debug!("reject {step}: {e}"))?;

        let next = self.cursor.next();
        let plan = match self.tree.get(&next) {
            Node::Absent => Plan::Insert,
            Node::Single(existing) if *existing == step => Plan::Replay,
            Node::Single(_) => Plan::Diverge,
            Node::Branch(firsts) => match self.tree.find(&next, &step, firsts.len() - 1) {
                Some(index) => Plan::Switch(index),
                None => Plan::Diverge,
            },
        };

        let (created, switched) = match plan {
            Plan::Insert => {
                self.tree.insert(self.cursor.route(), step.clone());
                self.cursor.forward();
                (true, false)
            }
            Plan::Replay => {
                self.cursor.forward();
                (false, false)
            }
            Plan::Diverge => {
                let Some(index) = self.tree.divide(&next, step.clone()) else {
                    log::warn!("no variation created for {step} at {next}");
                    return Err(MoveError::Occupied);
                };
                self.cursor.checkout(index);
                (true, true)
            }
            Plan::Switch(index) => {
                self.cursor.checkout(index);
                (false, true)
            }
        };

        let before = self.board.clone();
        let captured = verdict.captured.len();
        self.board.apply(step.stone, verdict.captured);
        self.push_diff(&before);
        self.refresh();

        let route = self.cursor.route().clone();
        if let Some(stored) = self.tree.get(&route).single() {
            if created {
                self.handlers.stone_created(&route, stored);
            }
            if switched {
                self.handlers.branch_move();
            }
            self.handlers.sgf_changed(&route, Some(stored));
        }
        Ok(Placement {
            created,
            switched,
            captured,
        })
    }

    /// Delete the node at `route` with everything after it, moving the
    /// cursor to its parent. Returns false if `route` addresses nothing.
    pub fn del_stone(&mut self, route: &Route) -> bool {
        if self.tree.get(route).is_absent() {
            log::debug!("delete: nothing at {route}");
            return false;
        }
        let parent = route.parent();
        if !self.replay_to(&parent) {
            return false;
        }
        self.tree.delete(route);
        self.refresh();

        let here = self.cursor.route().clone();
        self.handlers
            .sgf_changed(&here, self.tree.get(&here).single());
        true
    }

    /// Undo the last edit at the end of the current variation: the newest
    /// mark of the current step if it has any, otherwise the step itself.
    pub fn recall(&mut self) -> bool {
        if self.cursor.ply() == 0 || !self.tree.get(&self.cursor.next()).is_absent() {
            return false;
        }
        let route = self.cursor.route().clone();
        let Some(current) = self.tree.get_mut(&route) else {
            return false;
        };

        if let Some(mark) = current.pop_mark() {
            if let Some(viewer) = self.viewer.as_mut() {
                viewer.clear_mark(mark.coord);
                if let Some(i) = self.drawn.iter().rposition(|&c| c == mark.coord) {
                    self.drawn.remove(i);
                }
            }
            let current = self.tree.get(&route).single();
            self.handlers.sgf_changed(&route, current);
            return true;
        }

        let deleted = current.clone();
        let before = self.board.clone();
        self.retreat();
        self.tree.delete(&route);
        self.push_diff(&before);
        self.refresh();

        let here = self.cursor.route().clone();
        self.handlers.stone_deleted(&route, &deleted);
        self.handlers.sgf_changed(&here, Some(&deleted));
        true
    }

    /// Annotate the current step. Labels are lettered in order.
    pub fn put_mark(&mut self, coord: Coord, kind: MarkKind) -> bool {
        if !self.board.contains(coord) {
            return false;
        }
        let route = self.cursor.route().clone();
        let Some(current) = self.tree.get_mut(&route) else {
            return false;
        };
        let mark = current.add_mark(Mark::new(coord, kind)).clone();
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.draw_mark(&mark);
            self.drawn.push(mark.coord);
        }
        let current = self.tree.get(&route).single();
        self.handlers.sgf_changed(&route, current);
        true
    }

    pub fn add_comment(&mut self, text: impl Into<String>) -> bool {
        let route = self.cursor.route().clone();
        let Some(current) = self.tree.get_mut(&route) else {
            return false;
        };
        current.set_comment(text);
        let current = self.tree.get(&route).single();
        self.handlers.sgf_changed(&route, current);
        true
    }

    /// Comment of the current step, empty if none.
    pub fn comment(&self) -> String {
        self.current()
            .and_then(|step| step.comment.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move one ply ahead. At a branch point, enter variation `branch`.
    pub fn forward(&mut self, branch: usize) -> bool {
        let next = self.cursor.next();
        let (stone, variation) = match self.tree.get(&next) {
            Node::Absent => return false,
            Node::Single(step) => (step.stone, None),
            Node::Branch(firsts) => match firsts.get(branch) {
                Some(step) => (step.stone, Some(branch)),
                None => return false,
            },
        };
        let before = self.board.clone();
        if !self.advance(stone, variation) {
            return false;
        }
        self.push_diff(&before);
        self.refresh();
        if variation.is_some() {
            self.handlers.branch_move();
        }
        true
    }

    /// Enter variation `branch` of the branch point ahead.
    pub fn checkout(&mut self, branch: usize) -> bool {
        matches!(self.tree.get(&self.cursor.next()), Node::Branch(_)) && self.forward(branch)
    }

    pub fn back(&mut self) -> bool {
        let before = self.board.clone();
        if !self.retreat() {
            return false;
        }
        self.push_diff(&before);
        self.refresh();
        true
    }

    /// Move the cursor straight to `route`. Stale or unknown routes are
    /// rejected and leave the cursor where it was.
    pub fn jump(&mut self, route: &Route) -> bool {
        let moved = self.replay_to(route);
        if moved {
            self.refresh();
        }
        moved
    }

    pub fn rewind(&mut self) -> bool {
        self.jump(&Route::root())
    }

    /// Follow the first variation of every branch point to the end.
    pub fn fast_forward(&mut self) {
        while self.forward(0) {}
    }

    // =========================================================================
    // Whole-record operations
    // =========================================================================

    pub fn reset(&mut self) {
        log::info!("reset");
        let before = self.board.clone();
        self.board.reset();
        self.cursor.reset();
        self.tree.reset();
        self.push_diff(&before);
        self.refresh();
    }

    /// Replace the record with parsed SGF text. On any error the game is
    /// left untouched.
    pub fn load(&mut self, text: &str) -> Result<(), SgfError> {
        let record = sgf::parse(text)?;
        let mut meta = self.meta.clone();
        meta.merge(record.info);
        let mut scratch = Board::new(meta.width, meta.height);
        validate(&self.rules, &mut scratch, record.tree.root())?;

        log::info!(
            "load {} moves on {}",
            record.tree.node_count(),
            meta.board_size()
        );
        if let Some(viewer) = self.viewer.as_mut() {
            for stone in self.board.stones() {
                viewer.remove_stone(stone.coord);
            }
        }
        self.board.resize(meta.width, meta.height);
        self.meta = meta;
        self.tree = record.tree;
        self.cursor.reset();
        self.refresh();
        Ok(())
    }

    pub fn to_sgf(&self) -> String {
        sgf::serialize(&self.meta, &self.tree)
    }

    // =========================================================================
    // Board upkeep
    // =========================================================================

    /// Apply `stone` and move the cursor into it, along the line or into
    /// `variation`.
    fn advance(&mut self, stone: Stone, variation: Option<usize>) -> bool {
        let verdict = match self.rules.evaluate(&self.board, stone) {
            Ok(verdict) => verdict,
            Err(e) => {
                log::warn!("stored move {stone:?} no longer legal: {e}");
                return false;
            }
        };
        match variation {
            Some(branch) => self.cursor.checkout(branch),
            None => self.cursor.forward(),
        }
        self.board.apply(stone, verdict.captured);
        true
    }

    /// Take back the current step, restoring what it captured.
    fn retreat(&mut self) -> bool {
        let Some(stone) = self.current().map(|step| step.stone) else {
            return false;
        };
        self.cursor.back();
        self.board.retract(stone);
        true
    }

    /// Rebuild the board from the root along `route`.
    fn replay_to(&mut self, route: &Route) -> bool {
        let Some(stones) = self.path(route) else {
            log::debug!("jump: no position at {route}");
            return false;
        };
        let mut board = Board::new(self.board.width(), self.board.height());
        for stone in stones {
            match self.rules.evaluate(&board, stone) {
                Ok(verdict) => board.apply(stone, verdict.captured),
                Err(e) => {
                    log::warn!("replay to {route} failed at {stone:?}: {e}");
                    return false;
                }
            }
        }
        let before = std::mem::replace(&mut self.board, board);
        self.cursor.jump(route.clone());
        self.push_diff(&before);
        true
    }

    /// The stones played from the root to `route`, if every step exists.
    fn path(&self, route: &Route) -> Option<Vec<Stone>> {
        let parts = route.parts();
        let mut at = Route::root();
        let mut stones = Vec::with_capacity(route.plies());
        let mut i = 0;
        loop {
            while at.last() < parts[i] {
                at.advance();
                stones.push(self.tree.get(&at).single()?.stone);
            }
            if i + 1 >= parts.len() {
                return Some(stones);
            }
            at.enter(parts[i + 1]);
            stones.push(self.tree.get(&at).single()?.stone);
            i += 2;
        }
    }

    /// Tell the viewer about every cell that differs from `before`.
    fn push_diff(&mut self, before: &Board) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        for y in 0..self.board.height() {
            for x in 0..self.board.width() {
                let coord = Coord::new(x, y);
                let (old, new) = (before.get(coord), self.board.get(coord));
                if old == new {
                    continue;
                }
                if old.is_some() {
                    viewer.remove_stone(coord);
                }
                if let Some(color) = new {
                    viewer.place_stone(Stone::new(coord, color));
                }
            }
        }
    }

    /// Announce a cursor change: marks of the current step, active color,
    /// branch indicators, and the player-changed event.
    fn refresh(&mut self) {
        let turn = self.turn();
        let route = self.cursor.route().clone();
        let marks = self
            .tree
            .get(&route)
            .single()
            .map(|step| step.marks.clone())
            .unwrap_or_default();
        if let Some(viewer) = self.viewer.as_mut() {
            for coord in self.drawn.drain(..) {
                viewer.clear_mark(coord);
            }
            for mark in &marks {
                viewer.draw_mark(mark);
                self.drawn.push(mark.coord);
            }
            viewer.set_active_color(turn);
            viewer.clear_branch_indicators();
            if let Node::Branch(firsts) = self.tree.get(&route.next()) {
                let stones: Vec<Stone> = firsts.iter().map(|step| step.stone).collect();
                viewer.show_branch_indicators(&stones);
            }
        }
        self.handlers.player_changed(&route);
    }
}

/// Check every move of every variation against the rules.
fn validate(rules: &RuleEngine, board: &mut Board, line: &Line) -> Result<(), SgfError> {
    for step in &line.steps {
        let verdict = rules
            .evaluate(board, step.stone)
            .map_err(|error| SgfError::Illegal {
                ply: step.ply,
                error,
            })?;
        board.apply(step.stone, verdict.captured);
    }
    let result = line
        .fork
        .iter()
        .try_for_each(|variation| validate(rules, board, variation));
    for step in line.steps.iter().rev() {
        board.retract(step.stone);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: usize, y: usize) -> Coord {
        Coord::new(x, y)
    }

    fn route(parts: &[usize]) -> Route {
        Route::from_parts(parts.to_vec()).unwrap()
    }

    #[test]
    fn test_first_move_and_rejections() {
        let mut game = Game::default();
        let placed = game.put_stone(c(3, 3), Color::Black).unwrap();
        assert!(placed.created && !placed.switched);
        assert_eq!(game.route(), &route(&[1]));

        assert_eq!(game.put_stone(c(3, 3), Color::Black), Err(MoveError::Occupied));
        assert_eq!(game.put_stone(c(3, 3), Color::White), Err(MoveError::Occupied));
        assert_eq!(game.route(), &route(&[1]));
        assert_eq!(game.tree().node_count(), 1);

        let single = game.board().clone();
        game.put_stone(c(15, 15), Color::White).unwrap();
        assert!(game.recall());
        assert_eq!(game.board(), &single);
        assert_eq!(game.route(), &route(&[1]));
    }

    #[test]
    fn test_replay_existing_move_is_not_a_creation() {
        let mut game = Game::default();
        game.put_stone(c(3, 3), Color::Black).unwrap();
        game.put_stone(c(15, 15), Color::White).unwrap();
        game.rewind();
        let placed = game.put_stone(c(3, 3), Color::Black).unwrap();
        assert!(!placed.created && !placed.switched);
        assert_eq!(game.tree().node_count(), 2);
        assert_eq!(game.turn(), Color::White);
    }

    #[test]
    fn test_recall_removes_mark_before_stone() {
        let mut game = Game::default();
        game.put_stone(c(3, 3), Color::Black).unwrap();
        assert!(game.put_mark(c(0, 0), MarkKind::Triangle));
        assert!(game.recall());
        assert_eq!(game.current().map(|s| s.marks.len()), Some(0));
        assert_eq!(game.board().get(c(3, 3)), Some(Color::Black));
        assert!(game.recall());
        assert!(game.tree().is_empty());
        assert!(game.route().is_root());
        assert!(!game.recall(), "nothing left to recall");
    }

    #[test]
    fn test_recall_only_at_variation_end() {
        let mut game = Game::default();
        game.put_stone(c(3, 3), Color::Black).unwrap();
        game.put_stone(c(4, 4), Color::White).unwrap();
        game.back();
        assert!(!game.recall());
        assert_eq!(game.tree().node_count(), 2);
    }

    #[test]
    fn test_marks_and_comments_need_a_step() {
        let mut game = Game::default();
        assert!(!game.put_mark(c(1, 1), MarkKind::Circle));
        assert!(!game.add_comment("nothing here"));
        assert_eq!(game.comment(), "");

        game.put_stone(c(3, 3), Color::Black).unwrap();
        assert!(game.add_comment("joseki"));
        assert_eq!(game.comment(), "joseki");
        assert!(!game.put_mark(c(30, 1), MarkKind::Circle));
    }

    #[test]
    fn test_jump_rejects_unknown_route() {
        let mut game = Game::default();
        game.put_stone(c(3, 3), Color::Black).unwrap();
        assert!(!game.jump(&route(&[4])));
        assert!(!game.jump(&route(&[1, 0, 1])));
        assert_eq!(game.route(), &route(&[1]));
    }

    #[test]
    fn test_load_failure_changes_nothing() {
        let mut game = Game::default();
        game.put_stone(c(3, 3), Color::Black).unwrap();
        let before = game.to_sgf();
        assert!(game.load("(;SZ[9];B[aa];W[aa])").is_err());
        assert!(game.load("(;B[").is_err());
        assert_eq!(game.to_sgf(), before);
        assert_eq!(game.route(), &route(&[1]));
    }

    #[test]
    fn test_load_adopts_metadata() {
        let mut game = Game::default();
        game.load("(;FF[4]AP[other:2]SZ[9:7]GM[1];B[cc];W[gd])").unwrap();
        assert_eq!(game.metadata().application, "other:2");
        assert_eq!((game.board().width(), game.board().height()), (9, 7));
        assert!(game.route().is_root());
        game.fast_forward();
        assert_eq!(game.route(), &route(&[2]));
        assert_eq!(game.board().get(c(6, 3)), Some(Color::White));
    }

    #[test]
    fn test_new_rejects_bad_options() {
        let bad = Options::default().with_board_size("0");
        assert!(matches!(Game::new(bad), Err(GameError::Options(_))));
        let bad = Options::default().with_data("(;;B[zz]");
        assert!(matches!(Game::new(bad), Err(GameError::Sgf(_))));
    }
}
