//! Move legality and capture computation.
//!
//! [`RuleEngine::evaluate`] works on a scratch copy of the board: it places
//! the stone tentatively, removes every adjacent enemy group left without
//! liberties, then rejects the move if the placed stone's own group has no
//! liberties (suicide) or if it retakes a ko. The board itself is never
//! touched; the caller applies the returned captures.

use crate::board::{Board, Color, Coord, Stone};

/// Reason a placement was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// Point is not empty
    Occupied,
    /// Move violates ko rule
    Ko,
    /// Move would be suicide (no liberties after capture resolution)
    Suicide,
    /// Coordinate lies outside the board
    OffBoard,
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveError::Occupied => write!(f, "illegal move: point not empty"),
            MoveError::Ko => write!(f, "illegal move: retakes ko"),
            MoveError::Suicide => write!(f, "illegal move: suicide"),
            MoveError::OffBoard => write!(f, "illegal move: off the board"),
        }
    }
}

impl std::error::Error for MoveError {}

/// Outcome of a legal placement: the enemy stones it removes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Verdict {
    pub captured: Vec<Stone>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine {
    ko: bool,
}

impl RuleEngine {
    pub fn new(ko: bool) -> Self {
        Self { ko }
    }

    pub fn ko(&self) -> bool {
        self.ko
    }

    /// Judge `stone` against `board`.
    ///
    /// # Errors
    /// - [`MoveError::OffBoard`] if the coordinate is outside the board
    /// - [`MoveError::Occupied`] if the point already holds a stone
    /// - [`MoveError::Suicide`] if the stone's group has no liberties once captures resolve
    /// - [`MoveError::Ko`] if ko is enabled and the move immediately retakes a single stone
    pub fn evaluate(&self, board: &Board, stone: Stone) -> Result<Verdict, MoveError> {
        if !board.contains(stone.coord) {
            return Err(MoveError::OffBoard);
        }
        if board.get(stone.coord).is_some() {
            return Err(MoveError::Occupied);
        }

        let mut scratch = Scratch::new(board);
        scratch.set(stone.coord, Some(stone.color));

        let opp = stone.color.opponent();
        let mut captured: Vec<Stone> = Vec::new();
        for n in board.neighbors(stone.coord) {
            if scratch.get(n) != Some(opp) || captured.iter().any(|s| s.coord == n) {
                continue;
            }
            if scratch.group_liberties(n) == 0 {
                let mut group = Vec::new();
                scratch.collect_group(n, &mut group);
                captured.extend(group.into_iter().map(|c| Stone::new(c, opp)));
            }
        }
        for s in &captured {
            scratch.set(s.coord, None);
        }

        let liberties = scratch.group_liberties(stone.coord);
        if liberties == 0 {
            return Err(MoveError::Suicide);
        }

        if self.ko && captured.len() == 1 && liberties == 1 {
            let mut own = Vec::new();
            scratch.collect_group(stone.coord, &mut own);
            if own.len() == 1 && retakes(board, stone.coord, captured[0].coord) {
                return Err(MoveError::Ko);
            }
        }

        Ok(Verdict { captured })
    }
}

/// True if the previous ply was a single-stone capture of `at` by the stone
/// now sitting at `victim`.
fn retakes(board: &Board, at: Coord, victim: Coord) -> bool {
    board.ledger().get(board.ply()).is_some_and(|prev| {
        prev.by == victim && prev.removed.len() == 1 && prev.removed[0].coord == at
    })
}

/// A throwaway copy of the board cells used for tentative placement.
struct Scratch<'a> {
    board: &'a Board,
    cells: Vec<Option<Color>>,
}

impl<'a> Scratch<'a> {
    fn new(board: &'a Board) -> Self {
        Self {
            board,
            cells: board.cells().to_vec(),
        }
    }

    fn get(&self, coord: Coord) -> Option<Color> {
        self.cells[self.board.idx(coord)]
    }

    fn set(&mut self, coord: Coord, value: Option<Color>) {
        let i = self.board.idx(coord);
        self.cells[i] = value;
    }

    /// Flood-fill the group containing `start`, appending its stones to `out`.
    fn collect_group(&self, start: Coord, out: &mut Vec<Coord>) -> usize {
        let Some(color) = self.get(start) else {
            return 0;
        };
        let mut stack = vec![start];
        let mut visited = vec![false; self.cells.len()];
        let mut count = 0;
        while let Some(pt) = stack.pop() {
            let i = self.board.idx(pt);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            out.push(pt);
            count += 1;
            for n in self.board.neighbors(pt) {
                if !visited[self.board.idx(n)] && self.get(n) == Some(color) {
                    stack.push(n);
                }
            }
        }
        count
    }

    /// Count the distinct empty points adjacent to the group containing `start`.
    fn group_liberties(&self, start: Coord) -> usize {
        let Some(color) = self.get(start) else {
            return 0;
        };
        let mut stack = vec![start];
        let mut visited = vec![false; self.cells.len()];
        let mut liberty_visited = vec![false; self.cells.len()];
        let mut libs = 0;
        while let Some(pt) = stack.pop() {
            let i = self.board.idx(pt);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            for n in self.board.neighbors(pt) {
                let ni = self.board.idx(n);
                match self.get(n) {
                    None => {
                        if !liberty_visited[ni] {
                            liberty_visited[ni] = true;
                            libs += 1;
                        }
                    }
                    Some(c) if c == color && !visited[ni] => stack.push(n),
                    _ => {}
                }
            }
        }
        libs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(x: usize, y: usize) -> Stone {
        Stone::new(Coord::new(x, y), Color::Black)
    }

    fn w(x: usize, y: usize) -> Stone {
        Stone::new(Coord::new(x, y), Color::White)
    }

    /// Place stones directly, bypassing the rules.
    fn setpos(size: usize, stones: &[Stone]) -> Board {
        let mut board = Board::new(size, size);
        for &s in stones {
            board.apply(s, Vec::new());
        }
        board
    }

    #[test]
    fn test_empty_point_is_legal() {
        let board = Board::new(19, 19);
        let verdict = RuleEngine::new(false).evaluate(&board, b(3, 3));
        assert_eq!(verdict, Ok(Verdict::default()));
    }

    #[test]
    fn test_occupied_and_off_board() {
        let board = setpos(9, &[b(4, 4)]);
        let engine = RuleEngine::new(false);
        assert_eq!(engine.evaluate(&board, w(4, 4)), Err(MoveError::Occupied));
        assert_eq!(engine.evaluate(&board, w(9, 0)), Err(MoveError::OffBoard));
    }

    #[test]
    fn test_capture_single_stone() {
        let board = setpos(9, &[w(4, 4), b(3, 4), b(5, 4), b(4, 3)]);
        let verdict = RuleEngine::new(false).evaluate(&board, b(4, 5)).unwrap();
        assert_eq!(verdict.captured, vec![w(4, 4)]);
        // evaluation never mutates the board
        assert_eq!(board.get(Coord::new(4, 4)), Some(Color::White));
    }

    #[test]
    fn test_capture_group_only_the_dead_one() {
        // White pair at (1,0),(2,0) in atari; White (5,5) elsewhere keeps its liberties
        let board = setpos(
            9,
            &[w(1, 0), w(2, 0), b(0, 0), b(1, 1), b(2, 1), w(5, 5), b(5, 4)],
        );
        let verdict = RuleEngine::new(false).evaluate(&board, b(3, 0)).unwrap();
        let mut coords: Vec<_> = verdict.captured.iter().map(|s| s.coord).collect();
        coords.sort();
        assert_eq!(coords, vec![Coord::new(1, 0), Coord::new(2, 0)]);
    }

    #[test]
    fn test_suicide_rejected() {
        let board = setpos(9, &[b(1, 0), b(0, 1)]);
        assert_eq!(
            RuleEngine::new(false).evaluate(&board, w(0, 0)),
            Err(MoveError::Suicide)
        );
    }

    #[test]
    fn test_capture_beats_suicide() {
        // White (0,0) has one liberty at (1,0); Black filling it has no liberty of its own
        // except the one freed by the capture.
        let board = setpos(9, &[w(0, 0), b(0, 1), w(2, 0), w(1, 1)]);
        let verdict = RuleEngine::new(false).evaluate(&board, b(1, 0)).unwrap();
        assert_eq!(verdict.captured, vec![w(0, 0)]);
    }

    #[test]
    fn test_group_liberties_counted_once() {
        let board = setpos(9, &[b(4, 4), b(4, 5)]);
        let scratch = Scratch::new(&board);
        assert_eq!(scratch.group_liberties(Coord::new(4, 4)), 6);
        let mut group = Vec::new();
        assert_eq!(scratch.collect_group(Coord::new(4, 5), &mut group), 2);
    }
}
