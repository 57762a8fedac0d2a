//! Board projection: the occupancy of every cell for the position reached by
//! the cursor, plus the per-ply capture ledger needed to step back.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// A cell address. `x` is the column, `y` the row counted from the top edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Stone {
    pub coord: Coord,
    pub color: Color,
}

impl Stone {
    pub const fn new(coord: Coord, color: Color) -> Self {
        Self { coord, color }
    }
}

/// Stones removed by one placement, and the stone that removed them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    pub by: Coord,
    pub removed: Vec<Stone>,
}

/// Captures keyed by the ply that made them. Plies that captured nothing
/// have no entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureLedger {
    entries: BTreeMap<usize, Capture>,
}

impl CaptureLedger {
    pub fn get(&self, ply: usize) -> Option<&Capture> {
        self.entries.get(&ply)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn record(&mut self, ply: usize, capture: Capture) {
        if !capture.removed.is_empty() {
            self.entries.insert(ply, capture);
        }
    }

    fn take(&mut self, ply: usize) -> Option<Capture> {
        self.entries.remove(&ply)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Option<Color>>,
    ply: usize,
    ledger: CaptureLedger,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
            ply: 0,
            ledger: CaptureLedger::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of placements applied since the last reset.
    pub fn ply(&self) -> usize {
        self.ply
    }

    pub fn ledger(&self) -> &CaptureLedger {
        &self.ledger
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    pub(crate) fn idx(&self, coord: Coord) -> usize {
        coord.y * self.width + coord.x
    }

    pub fn get(&self, coord: Coord) -> Option<Color> {
        if !self.contains(coord) {
            return None;
        }
        self.cells[self.idx(coord)]
    }

    pub(crate) fn cells(&self) -> &[Option<Color>] {
        &self.cells
    }

    /// Orthogonal neighbors that lie on the board.
    pub(crate) fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        let (x, y) = (coord.x, coord.y);
        let mut v = Vec::with_capacity(4);
        if x > 0 {
            v.push(Coord::new(x - 1, y));
        }
        if x + 1 < self.width {
            v.push(Coord::new(x + 1, y));
        }
        if y > 0 {
            v.push(Coord::new(x, y - 1));
        }
        if y + 1 < self.height {
            v.push(Coord::new(x, y + 1));
        }
        v.into_iter()
    }

    /// Every occupied cell, row by row.
    pub fn stones(&self) -> impl Iterator<Item = Stone> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, c)| {
            c.map(|color| Stone::new(Coord::new(i % self.width, i / self.width), color))
        })
    }

    /// Apply a placement that has already been judged legal, removing
    /// `removed` and recording them under the new ply.
    pub(crate) fn apply(&mut self, stone: Stone, removed: Vec<Stone>) {
        self.ply += 1;
        let i = self.idx(stone.coord);
        self.cells[i] = Some(stone.color);
        for r in &removed {
            let i = self.idx(r.coord);
            self.cells[i] = None;
        }
        self.ledger.record(
            self.ply,
            Capture {
                by: stone.coord,
                removed,
            },
        );
    }

    /// Undo the placement of `stone` at the current ply, bringing back
    /// whatever it captured.
    pub(crate) fn retract(&mut self, stone: Stone) {
        if self.ply == 0 {
            return;
        }
        let i = self.idx(stone.coord);
        self.cells[i] = None;
        if let Some(capture) = self.ledger.take(self.ply) {
            for r in capture.removed {
                let i = self.idx(r.coord);
                self.cells[i] = Some(r.color);
            }
        }
        self.ply -= 1;
    }

    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
        self.ply = 0;
        self.ledger.clear();
    }

    /// Reallocate for a different size. Clears everything.
    pub(crate) fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let ch = match self.get(Coord::new(x, y)) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
