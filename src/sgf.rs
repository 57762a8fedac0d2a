//! SGF (FF[4]) read/write for game records with variations.
//!
//! Only the properties the game stores are interpreted: root `FF CA AP SZ
//! GM`, moves `B W`, marks `LB TR CR SQ MA SL` and comments `C`. Anything
//! else is skipped on read. Variations map one to one onto tree forks.
//!
//! Only nodes with a move become steps. Comments and marks on the root or
//! on setup nodes have nowhere to live and are dropped.

use std::fmt;

use crate::board::{Color, Coord};
use crate::constants::{DEFAULT_SIZE, MAX_NESTING};
use crate::options::{Metadata, OptionsError, RootInfo, parse_size};
use crate::rules::MoveError;
use crate::step::{Mark, MarkKind, Step};
use crate::tree::{GameTree, Line};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SgfError {
    /// No `(` game tree in the input
    Empty,
    /// Malformed syntax at a character offset
    Syntax { at: usize, expected: &'static str },
    /// Point value that is not two letters inside the board
    Coord(String),
    /// `B[]`/`W[]` or `tt`: the game has no pass move
    Pass,
    /// Non-numeric `FF`/`GM`
    Number(String),
    /// Bad `SZ`
    Size(OptionsError),
    /// Two variations of one fork start with the same move
    DuplicateVariation,
    /// A move in the record breaks the rules
    Illegal { ply: usize, error: MoveError },
    /// Game trees nested deeper than `MAX_NESTING`
    Nesting,
}

impl fmt::Display for SgfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SgfError::Empty => write!(f, "no game tree found"),
            SgfError::Syntax { at, expected } => write!(f, "expected {expected} at offset {at}"),
            SgfError::Coord(v) => write!(f, "invalid point {v:?}"),
            SgfError::Pass => write!(f, "pass moves are not supported"),
            SgfError::Number(v) => write!(f, "invalid number {v:?}"),
            SgfError::Size(e) => write!(f, "{e}"),
            SgfError::DuplicateVariation => write!(f, "duplicate variation"),
            SgfError::Illegal { ply, error } => write!(f, "move {ply}: {error}"),
            SgfError::Nesting => write!(f, "variations nested deeper than {MAX_NESTING}"),
        }
    }
}

impl std::error::Error for SgfError {}

impl From<OptionsError> for SgfError {
    fn from(e: OptionsError) -> Self {
        SgfError::Size(e)
    }
}

/// A parsed record: root properties and the move tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub info: RootInfo,
    pub tree: GameTree,
}

/// Parse the first game tree of an SGF collection.
pub fn parse(text: &str) -> Result<Record, SgfError> {
    let mut parser = Parser::new(text);
    parser.skip_to_tree()?;
    let raw = parser.game_tree()?;

    let root = raw.nodes.first().ok_or(SgfError::Empty)?;
    let info = root_info(root)?;
    let (width, height) = info.size.unwrap_or((DEFAULT_SIZE, DEFAULT_SIZE));
    let ctx = Ctx { width, height };
    let line = ctx.build(&raw, 0)?;
    Ok(Record {
        info,
        tree: GameTree::from_root(line),
    })
}

/// Write metadata and the full tree as SGF text.
pub fn serialize(meta: &Metadata, tree: &GameTree) -> String {
    let mut out = String::from("(;");
    out.push_str(&format!("FF[{}]", meta.file_format));
    out.push_str(&format!("CA[{}]", escape(&meta.encoding)));
    out.push_str(&format!("AP[{}]", escape(&meta.application)));
    out.push_str(&format!("SZ[{}]", meta.board_size()));
    out.push_str(&format!("GM[{}]", meta.game_mode));
    write_line(&mut out, tree.root());
    out.push(')');
    out
}

fn write_line(out: &mut String, line: &Line) {
    for step in &line.steps {
        write_step(out, step);
    }
    for variation in &line.fork {
        out.push('(');
        write_line(out, variation);
        out.push(')');
    }
}

fn write_step(out: &mut String, step: &Step) {
    let prop = match step.color() {
        Color::Black => 'B',
        Color::White => 'W',
    };
    out.push(';');
    out.push(prop);
    out.push('[');
    out.push_str(&point(step.coord()));
    out.push(']');

    // one property per kind, values in insertion order
    let mut kinds: Vec<MarkKind> = Vec::new();
    for mark in &step.marks {
        if !kinds.contains(&mark.kind) {
            kinds.push(mark.kind);
        }
    }
    for kind in kinds {
        out.push_str(kind.ident());
        for mark in step.marks.iter().filter(|m| m.kind == kind) {
            out.push('[');
            out.push_str(&point(mark.coord));
            if let Some(label) = mark.label {
                out.push(':');
                out.push_str(&escape(&label.to_string()));
            }
            out.push(']');
        }
    }

    if let Some(comment) = &step.comment {
        out.push_str("C[");
        out.push_str(&escape(comment));
        out.push(']');
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace(']', "\\]")
}

fn point(coord: Coord) -> String {
    [letter(coord.x), letter(coord.y)].iter().collect()
}

fn letter(n: usize) -> char {
    let n = n as u8;
    if n < 26 {
        (b'a' + n) as char
    } else {
        (b'A' + n - 26) as char
    }
}

fn unletter(c: char) -> Option<usize> {
    match c {
        'a'..='z' => Some(c as usize - 'a' as usize),
        'A'..='Z' => Some(c as usize - 'A' as usize + 26),
        _ => None,
    }
}

// =============================================================================
// Syntax
// =============================================================================

#[derive(Debug, Default)]
struct RawNode {
    props: Vec<(String, Vec<String>)>,
}

impl RawNode {
    fn get(&self, ident: &str) -> Option<&[String]> {
        self.props
            .iter()
            .find(|(id, _)| id == ident)
            .map(|(_, values)| values.as_slice())
    }

    /// Carries a comment or marks.
    fn annotated(&self) -> bool {
        self.props
            .iter()
            .any(|(id, _)| id == "C" || MarkKind::from_ident(id).is_some())
    }
}

#[derive(Debug, Default)]
struct RawTree {
    nodes: Vec<RawNode>,
    children: Vec<RawTree>,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, c: char, expected: &'static str) -> Result<(), SgfError> {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(SgfError::Syntax {
                at: self.pos,
                expected,
            })
        }
    }

    fn skip_to_tree(&mut self) -> Result<(), SgfError> {
        while let Some(c) = self.peek() {
            if c == '(' {
                return Ok(());
            }
            self.pos += 1;
        }
        Err(SgfError::Empty)
    }

    fn game_tree(&mut self) -> Result<RawTree, SgfError> {
        self.expect('(', "'('")?;
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(SgfError::Nesting);
        }
        let mut tree = RawTree::default();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(';') if tree.children.is_empty() => {
                    self.pos += 1;
                    tree.nodes.push(self.node()?);
                }
                Some('(') if !tree.nodes.is_empty() => tree.children.push(self.game_tree()?),
                _ => break,
            }
        }
        if tree.nodes.is_empty() {
            return Err(SgfError::Syntax {
                at: self.pos,
                expected: "';'",
            });
        }
        self.expect(')', "')'")?;
        self.depth -= 1;
        Ok(tree)
    }

    fn node(&mut self) -> Result<RawNode, SgfError> {
        let mut node = RawNode::default();
        loop {
            self.skip_ws();
            let start = self.pos;
            let mut ident = String::new();
            while let Some(c) = self.peek().filter(char::is_ascii_alphabetic) {
                // FF[3] allowed lowercase letters inside identifiers
                if c.is_ascii_uppercase() {
                    ident.push(c);
                }
                self.pos += 1;
            }
            if self.pos == start {
                return Ok(node);
            }
            let mut values = Vec::new();
            self.skip_ws();
            while self.peek() == Some('[') {
                self.pos += 1;
                values.push(self.value()?);
                self.skip_ws();
            }
            if values.is_empty() {
                return Err(SgfError::Syntax {
                    at: self.pos,
                    expected: "'['",
                });
            }
            node.props.push((ident, values));
        }
    }

    fn value(&mut self) -> Result<String, SgfError> {
        let mut text = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(SgfError::Syntax {
                    at: self.pos,
                    expected: "']'",
                });
            };
            self.pos += 1;
            match c {
                ']' => return Ok(text),
                '\\' => {
                    let Some(escaped) = self.peek() else {
                        continue;
                    };
                    self.pos += 1;
                    // soft line break
                    if escaped != '\n' {
                        text.push(escaped);
                    }
                }
                _ => text.push(c),
            }
        }
    }
}

// =============================================================================
// Semantics
// =============================================================================

fn root_info(root: &RawNode) -> Result<RootInfo, SgfError> {
    let first = |ident: &str| root.get(ident).and_then(|v| v.first()).cloned();
    let number = |ident: &str| -> Result<Option<u32>, SgfError> {
        first(ident)
            .map(|v| v.trim().parse::<u32>().map_err(|_| SgfError::Number(v)))
            .transpose()
    };
    Ok(RootInfo {
        application: first("AP"),
        size: first("SZ").map(|v| parse_size(&v)).transpose()?,
        encoding: first("CA"),
        file_format: number("FF")?,
        game_mode: number("GM")?,
    })
}

struct Ctx {
    width: usize,
    height: usize,
}

impl Ctx {
    /// Turn a raw game tree into a line whose first step is ply `ply + 1`.
    fn build(&self, raw: &RawTree, ply: usize) -> Result<Line, SgfError> {
        let mut line = Line::default();
        for node in &raw.nodes {
            let at = ply + line.steps.len();
            match self.step(node, at + 1)? {
                Some(step) => line.steps.push(step),
                None if node.annotated() => {
                    log::debug!("node without a move after ply {at}: comment and marks dropped");
                }
                None => {}
            }
        }

        let here = ply + line.steps.len();
        let mut variations = Vec::new();
        for child in &raw.children {
            let variation = self.build(child, here)?;
            // a variation with no move of its own hands its forks up
            let lines = if variation.steps.is_empty() {
                variation.fork
            } else {
                vec![variation]
            };
            for line in lines {
                if variations
                    .iter()
                    .any(|v: &Line| v.steps[0] == line.steps[0])
                {
                    return Err(SgfError::DuplicateVariation);
                }
                variations.push(line);
            }
        }
        if variations.len() == 1 {
            let only = variations.remove(0);
            line.steps.extend(only.steps);
            line.fork = only.fork;
        } else {
            line.fork = variations;
        }
        Ok(line)
    }

    /// A node becomes a step only if it carries a move.
    fn step(&self, node: &RawNode, ply: usize) -> Result<Option<Step>, SgfError> {
        let (color, value) = match (node.get("B"), node.get("W")) {
            (Some(v), _) => (Color::Black, &v[0]),
            (None, Some(v)) => (Color::White, &v[0]),
            (None, None) => return Ok(None),
        };
        let is_pass = value.is_empty() || (value == "tt" && self.width <= 19 && self.height <= 19);
        if is_pass {
            return Err(SgfError::Pass);
        }
        let mut step = Step::new(self.coord(value)?, color, ply);

        for (ident, values) in &node.props {
            let Some(kind) = MarkKind::from_ident(ident) else {
                continue;
            };
            for value in values {
                self.marks(&mut step, kind, value)?;
            }
        }
        if let Some(comment) = node.get("C").and_then(|v| v.first()) {
            step.set_comment(comment.clone());
        }
        Ok(Some(step))
    }

    fn marks(&self, step: &mut Step, kind: MarkKind, value: &str) -> Result<(), SgfError> {
        if kind == MarkKind::Label {
            let (at, text) = value
                .split_once(':')
                .ok_or_else(|| SgfError::Coord(value.to_string()))?;
            let mut mark = Mark::new(self.coord(at)?, kind);
            mark.label = text.chars().next();
            step.add_mark(mark);
            return Ok(());
        }
        // compressed point list: "aa:cc" is the rectangle between two corners
        let (from, to) = match value.split_once(':') {
            Some((a, b)) => (self.coord(a)?, self.coord(b)?),
            None => {
                let c = self.coord(value)?;
                (c, c)
            }
        };
        for y in from.y.min(to.y)..=from.y.max(to.y) {
            for x in from.x.min(to.x)..=from.x.max(to.x) {
                step.add_mark(Mark::new(Coord::new(x, y), kind));
            }
        }
        Ok(())
    }

    fn coord(&self, value: &str) -> Result<Coord, SgfError> {
        let bad = || SgfError::Coord(value.to_string());
        let mut chars = value.chars();
        let (Some(cx), Some(cy), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(bad());
        };
        let x = unletter(cx).ok_or_else(bad)?;
        let y = unletter(cy).ok_or_else(bad)?;
        if x >= self.width || y >= self.height {
            return Err(bad());
        }
        Ok(Coord::new(x, y))
    }
}
