//! Tree nodes: one placed stone with its annotations.

use std::fmt;

use crate::board::{Color, Coord, Stone};

/// Annotation shapes, named after their SGF property identifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// `LB`: a letter, assigned in creation order per step
    Label,
    /// `TR`
    Triangle,
    /// `CR`
    Circle,
    /// `SQ`
    Square,
    /// `MA`
    Cross,
    /// `SL`
    Selected,
}

impl MarkKind {
    pub const ALL: [MarkKind; 6] = [
        MarkKind::Label,
        MarkKind::Triangle,
        MarkKind::Circle,
        MarkKind::Square,
        MarkKind::Cross,
        MarkKind::Selected,
    ];

    /// The SGF property identifier.
    pub fn ident(self) -> &'static str {
        match self {
            MarkKind::Label => "LB",
            MarkKind::Triangle => "TR",
            MarkKind::Circle => "CR",
            MarkKind::Square => "SQ",
            MarkKind::Cross => "MA",
            MarkKind::Selected => "SL",
        }
    }

    pub fn from_ident(ident: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.ident() == ident)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mark {
    pub coord: Coord,
    pub kind: MarkKind,
    /// Only set for [`MarkKind::Label`].
    pub label: Option<char>,
}

impl Mark {
    pub fn new(coord: Coord, kind: MarkKind) -> Self {
        Self {
            coord,
            kind,
            label: None,
        }
    }
}

/// A placed stone plus its ply, marks and comment.
///
/// Equality only looks at the stone: two steps are the same move when they
/// put the same color on the same point, whatever their annotations.
#[derive(Clone, Debug)]
pub struct Step {
    pub stone: Stone,
    pub ply: usize,
    pub marks: Vec<Mark>,
    pub comment: Option<String>,
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.stone == other.stone
    }
}

impl Eq for Step {}

impl Step {
    pub fn new(coord: Coord, color: Color, ply: usize) -> Self {
        Self {
            stone: Stone::new(coord, color),
            ply,
            marks: Vec::new(),
            comment: None,
        }
    }

    pub fn coord(&self) -> Coord {
        self.stone.coord
    }

    pub fn color(&self) -> Color {
        self.stone.color
    }

    /// Append a mark. Labels get the next free letter on this step.
    pub fn add_mark(&mut self, mut mark: Mark) -> &Mark {
        if mark.kind == MarkKind::Label && mark.label.is_none() {
            let count = self
                .marks
                .iter()
                .filter(|m| m.kind == MarkKind::Label)
                .count();
            mark.label = Some(label_letter(count));
        }
        self.marks.push(mark);
        &self.marks[self.marks.len() - 1]
    }

    /// Remove and return the most recently added mark.
    pub fn pop_mark(&mut self) -> Option<Mark> {
        self.marks.pop()
    }

    pub fn set_comment(&mut self, text: impl Into<String>) {
        self.comment = Some(text.into());
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.ply, self.color(), self.coord())
    }
}

/// `A`..`Z`, then `a`..`z`; wraps after 52 labels.
fn label_letter(n: usize) -> char {
    let n = (n % 52) as u8;
    if n < 26 {
        (b'A' + n) as char
    } else {
        (b'a' + n - 26) as char
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_ply_and_marks() {
        let mut a = Step::new(Coord::new(3, 3), Color::Black, 1);
        let b = Step::new(Coord::new(3, 3), Color::Black, 7);
        a.add_mark(Mark::new(Coord::new(0, 0), MarkKind::Circle));
        assert_eq!(a, b);
        assert_ne!(a, Step::new(Coord::new(3, 3), Color::White, 1));
        assert_ne!(a, Step::new(Coord::new(3, 4), Color::Black, 1));
    }

    #[test]
    fn test_labels_are_sequential_per_step() {
        let mut step = Step::new(Coord::new(3, 3), Color::Black, 1);
        step.add_mark(Mark::new(Coord::new(0, 0), MarkKind::Label));
        step.add_mark(Mark::new(Coord::new(1, 0), MarkKind::Triangle));
        let second = step.add_mark(Mark::new(Coord::new(2, 0), MarkKind::Label));
        assert_eq!(second.label, Some('B'));
        assert_eq!(step.marks[0].label, Some('A'));
        assert_eq!(step.marks[1].label, None);

        let other = &mut Step::new(Coord::new(4, 4), Color::White, 2);
        let first = other.add_mark(Mark::new(Coord::new(0, 0), MarkKind::Label));
        assert_eq!(first.label, Some('A'));
    }

    #[test]
    fn test_pop_mark_is_lifo() {
        let mut step = Step::new(Coord::new(3, 3), Color::Black, 1);
        step.add_mark(Mark::new(Coord::new(0, 0), MarkKind::Square));
        step.add_mark(Mark::new(Coord::new(1, 1), MarkKind::Cross));
        assert_eq!(step.pop_mark().map(|m| m.kind), Some(MarkKind::Cross));
        assert_eq!(step.pop_mark().map(|m| m.kind), Some(MarkKind::Square));
        assert_eq!(step.pop_mark(), None);
    }

    #[test]
    fn test_mark_idents() {
        for kind in MarkKind::ALL {
            assert_eq!(MarkKind::from_ident(kind.ident()), Some(kind));
        }
        assert_eq!(MarkKind::from_ident("XX"), None);
    }
}
