//! A line protocol for driving a [`Game`] from a terminal or a script.
//!
//! The framing follows GTP: each line is an optional numeric id, a command
//! and its arguments; replies are `=id message` on success and `?id message`
//! on failure, followed by a blank line.
//!
//! ## Commands
//!
//! - `name`, `version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `boardsize <n | WxH>` - Start over on a new board
//! - `clear_board` - Empty the record
//! - `play <color> <vertex>` - Play, replay, or branch
//! - `mark <kind> <vertex>` - Annotate the current move
//! - `comment [text]` - Show, or replace, the comment of the current move
//! - `back`, `forward [branch]`, `checkout <branch>`, `jump <route>`
//! - `delete [route]` - Delete a move and everything after it
//! - `recall` - Undo the last mark or move at the end of a variation
//! - `route`, `showboard`, `sgf`, `load <file>`
//!
//! Vertices are Go style: a column letter (`I` is skipped) and a row number
//! counted from the bottom, e.g. `D4`. `x,y` with 0-based indices from the
//! top left is accepted as well.

use std::io::{self, BufRead, Write};

use crate::board::{Color, Coord};
use crate::game::Game;
use crate::options::Options;
use crate::route::Route;
use crate::step::MarkKind;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "back",
    "boardsize",
    "checkout",
    "clear_board",
    "comment",
    "delete",
    "forward",
    "jump",
    "known_command",
    "list_commands",
    "load",
    "mark",
    "name",
    "play",
    "quit",
    "recall",
    "route",
    "sgf",
    "showboard",
    "version",
];

/// Column letters, `I` left out.
const COLUMNS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

pub struct Shell {
    game: Game,
    ko: bool,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(Game::default())
    }
}

impl Shell {
    pub fn new(game: Game) -> Self {
        let ko = game.ko();
        Self { game, ko }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let (success, message) = self.execute(&command, &parts[1..]);

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute one command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(desc) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let options = Options::default().with_board_size(*desc).with_ko(self.ko);
                match Game::new(options) {
                    Ok(game) => {
                        self.game = game;
                        (true, String::new())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "clear_board" => {
                self.game.reset();
                (true, String::new())
            }

            "play" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                let Some(color) = parse_color(args[0]) else {
                    return (false, format!("invalid color: {}", args[0]));
                };
                let Some(coord) = self.parse_vertex(args[1]) else {
                    return (false, format!("invalid vertex: {}", args[1]));
                };
                match self.game.put_stone(coord, color) {
                    Ok(_) => (true, self.game.route().to_string()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "mark" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                let Some(kind) = parse_mark_kind(args[0]) else {
                    return (false, format!("invalid mark: {}", args[0]));
                };
                let Some(coord) = self.parse_vertex(args[1]) else {
                    return (false, format!("invalid vertex: {}", args[1]));
                };
                if self.game.put_mark(coord, kind) {
                    (true, String::new())
                } else {
                    (false, "no move to mark".to_string())
                }
            }

            "comment" => {
                if args.is_empty() {
                    return (true, self.game.comment());
                }
                if self.game.add_comment(args.join(" ")) {
                    (true, String::new())
                } else {
                    (false, "no move to comment".to_string())
                }
            }

            "back" => {
                let ok = self.game.back();
                self.moved(ok, "already at the root")
            }

            "forward" => {
                let branch = match args.first().map(|a| a.parse::<usize>()) {
                    None => 0,
                    Some(Ok(branch)) => branch,
                    Some(Err(_)) => return (false, "invalid branch".to_string()),
                };
                let ok = self.game.forward(branch);
                self.moved(ok, "no such continuation")
            }

            "checkout" => {
                let Some(Ok(branch)) = args.first().map(|a| a.parse::<usize>()) else {
                    return (false, "invalid branch".to_string());
                };
                let ok = self.game.checkout(branch);
                self.moved(ok, "no such variation")
            }

            "jump" => {
                let Ok(route) = args.join(" ").parse::<Route>() else {
                    return (false, "invalid route".to_string());
                };
                let ok = self.game.jump(&route);
                self.moved(ok, "no position at that route")
            }

            "delete" => {
                let route = if args.is_empty() {
                    self.game.route().clone()
                } else {
                    match args.join(" ").parse::<Route>() {
                        Ok(route) => route,
                        Err(_) => return (false, "invalid route".to_string()),
                    }
                };
                let ok = self.game.del_stone(&route);
                self.moved(ok, "nothing to delete")
            }

            "recall" => {
                let ok = self.game.recall();
                self.moved(ok, "nothing to recall")
            }

            "route" => (true, self.game.route().to_string()),

            "showboard" => (true, format!("\n{}", self.game.board())),

            "sgf" => (true, self.game.to_sgf()),

            "load" => {
                let Some(path) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let text = match std::fs::read_to_string(path) {
                    Ok(text) => text,
                    Err(e) => return (false, format!("cannot read {path}: {e}")),
                };
                match self.game.load(&text) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }

    /// Reply with the new route after a cursor move.
    fn moved(&self, ok: bool, failure: &str) -> (bool, String) {
        if ok {
            (true, self.game.route().to_string())
        } else {
            (false, failure.to_string())
        }
    }

    fn parse_vertex(&self, s: &str) -> Option<Coord> {
        let board = self.game.board();
        parse_vertex(s, board.width(), board.height())
    }
}

fn parse_color(s: &str) -> Option<Color> {
    match s.to_lowercase().as_str() {
        "b" | "black" => Some(Color::Black),
        "w" | "white" => Some(Color::White),
        _ => None,
    }
}

fn parse_mark_kind(s: &str) -> Option<MarkKind> {
    match s.to_lowercase().as_str() {
        "label" => Some(MarkKind::Label),
        "triangle" => Some(MarkKind::Triangle),
        "circle" => Some(MarkKind::Circle),
        "square" => Some(MarkKind::Square),
        "cross" => Some(MarkKind::Cross),
        "selected" => Some(MarkKind::Selected),
        _ => MarkKind::from_ident(&s.to_uppercase()),
    }
}

/// Parse `D4` style vertices (or `x,y`) on a `width` x `height` board.
pub fn parse_vertex(s: &str, width: usize, height: usize) -> Option<Coord> {
    let coord = if let Some((x, y)) = s.split_once(',') {
        Coord::new(x.trim().parse().ok()?, y.trim().parse().ok()?)
    } else {
        let mut chars = s.chars();
        let col = chars.next()?.to_ascii_uppercase();
        let x = COLUMNS.iter().position(|&c| c as char == col)?;
        let row: usize = chars.as_str().parse().ok()?;
        if row == 0 || row > height {
            return None;
        }
        Coord::new(x, height - row)
    };
    (coord.x < width && coord.y < height).then_some(coord)
}

/// Format a coordinate as a `D4` style vertex, `x,y` past column `Z`.
pub fn str_vertex(coord: Coord, height: usize) -> String {
    match COLUMNS.get(coord.x) {
        Some(&c) => format!("{}{}", c as char, height - coord.y),
        None => format!("{},{}", coord.x, coord.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = Shell::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = Shell::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_vertex_conversion() {
        assert_eq!(parse_vertex("A19", 19, 19), Some(Coord::new(0, 0)));
        assert_eq!(parse_vertex("j1", 19, 19), Some(Coord::new(8, 18)));
        assert_eq!(parse_vertex("D4", 9, 9), Some(Coord::new(3, 5)));
        assert_eq!(parse_vertex("I5", 19, 19), None);
        assert_eq!(parse_vertex("K1", 9, 9), None);
        assert_eq!(parse_vertex("A0", 9, 9), None);
        assert_eq!(parse_vertex("30,2", 40, 40), Some(Coord::new(30, 2)));
        assert_eq!(str_vertex(Coord::new(8, 18), 19), "J1");
        assert_eq!(str_vertex(Coord::new(30, 2), 40), "30,2");
    }

    #[test]
    fn test_name_command() {
        let mut shell = Shell::default();
        let (success, response) = shell.execute("name", &[]);
        assert!(success);
        assert_eq!(response, "kifu");
    }

    #[test]
    fn test_known_command() {
        let mut shell = Shell::default();
        assert_eq!(shell.execute("known_command", &["recall"]), (true, "true".to_string()));
        assert_eq!(shell.execute("known_command", &["genmove"]), (true, "false".to_string()));
    }

    #[test]
    fn test_play_branch_and_navigate() {
        let mut shell = Shell::default();
        assert_eq!(shell.execute("play", &["black", "D4"]), (true, "[1]".to_string()));
        assert_eq!(shell.execute("play", &["white", "Q16"]), (true, "[2]".to_string()));
        assert_eq!(shell.execute("back", &[]), (true, "[1]".to_string()));
        assert_eq!(shell.execute("play", &["w", "Q4"]), (true, "[1, 1, 1]".to_string()));
        assert_eq!(shell.execute("back", &[]), (true, "[1]".to_string()));
        assert_eq!(shell.execute("checkout", &["0"]), (true, "[1, 0, 1]".to_string()));
        assert_eq!(shell.execute("jump", &["[0]"]), (true, "[0]".to_string()));
        assert!(!shell.execute("play", &["white", "Z9"]).0);
    }

    #[test]
    fn test_boardsize_replaces_game() {
        let mut shell = Shell::default();
        shell.execute("play", &["b", "D4"]);
        assert!(shell.execute("boardsize", &["9"]).0);
        assert_eq!(shell.game().board().width(), 9);
        assert!(shell.game().tree().is_empty());
        assert!(!shell.execute("boardsize", &["99"]).0);
    }

    #[test]
    fn test_marks_comments_and_recall() {
        let mut shell = Shell::default();
        assert!(!shell.execute("mark", &["triangle", "C3"]).0);
        shell.execute("play", &["b", "D4"]);
        assert!(shell.execute("mark", &["LB", "C3"]).0);
        assert!(shell.execute("comment", &["good", "shape"]).0);
        assert_eq!(shell.execute("comment", &[]), (true, "good shape".to_string()));
        assert_eq!(shell.execute("recall", &[]), (true, "[1]".to_string()));
        assert_eq!(shell.execute("recall", &[]), (true, "[0]".to_string()));
        assert!(!shell.execute("recall", &[]).0);
    }

    #[test]
    fn test_run_loop_framing() {
        let mut shell = Shell::default();
        let input = "1 play b D4\n# comment\n\nbogus\n2 quit\nname\n";
        let mut output = Vec::new();
        shell.run(input.as_bytes(), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, "=1 [1]\n\n? unknown command: bogus\n\n=2 \n\n");
    }
}
