//! Construction options and the root metadata a game carries.

use std::fmt;

use crate::constants::{
    APPLICATION, DEFAULT_ENCODING, DEFAULT_FILE_FORMAT, DEFAULT_GAME_MODE, DEFAULT_SIZE, MAX_SIZE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// Size descriptor is not `N`, `WxH` or `W:H`
    InvalidSize(String),
    /// Width or height outside `1..=MAX_SIZE`
    SizeOutOfRange(usize, usize),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::InvalidSize(s) => write!(f, "invalid board size: {s:?}"),
            OptionsError::SizeOutOfRange(w, h) => {
                write!(f, "board size {w}x{h} outside 1..={MAX_SIZE}")
            }
        }
    }
}

impl std::error::Error for OptionsError {}

/// Parse `"19"`, `"19x13"` or `"19:13"` into `(width, height)`.
pub fn parse_size(desc: &str) -> Result<(usize, usize), OptionsError> {
    let invalid = || OptionsError::InvalidSize(desc.to_string());
    let desc = desc.trim();
    let (w, h) = match desc.split_once(['x', 'X', ':']) {
        Some((w, h)) => (w, h),
        None => (desc, desc),
    };
    let w = w.trim().parse::<usize>().map_err(|_| invalid())?;
    let h = h.trim().parse::<usize>().map_err(|_| invalid())?;
    check_size(w, h)?;
    Ok((w, h))
}

fn check_size(width: usize, height: usize) -> Result<(), OptionsError> {
    if (1..=MAX_SIZE).contains(&width) && (1..=MAX_SIZE).contains(&height) {
        Ok(())
    } else {
        Err(OptionsError::SizeOutOfRange(width, height))
    }
}

/// How to build a [`Game`](crate::game::Game).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub width: usize,
    pub height: usize,
    /// Overrides `width`/`height` when set.
    pub board_size: Option<String>,
    pub ko: bool,
    pub encoding: String,
    pub application: String,
    pub file_format: u32,
    pub game_mode: u32,
    /// SGF text to start from instead of an empty tree.
    pub data: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            board_size: None,
            ko: false,
            encoding: DEFAULT_ENCODING.to_string(),
            application: APPLICATION.to_string(),
            file_format: DEFAULT_FILE_FORMAT,
            game_mode: DEFAULT_GAME_MODE,
            data: None,
        }
    }
}

impl Options {
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_board_size(mut self, desc: impl Into<String>) -> Self {
        self.board_size = Some(desc.into());
        self
    }

    pub fn with_ko(mut self, ko: bool) -> Self {
        self.ko = ko;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = application.into();
        self
    }

    pub fn with_file_format(mut self, file_format: u32) -> Self {
        self.file_format = file_format;
        self
    }

    pub fn with_game_mode(mut self, game_mode: u32) -> Self {
        self.game_mode = game_mode;
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Effective `(width, height)`.
    pub fn dimensions(&self) -> Result<(usize, usize), OptionsError> {
        match &self.board_size {
            Some(desc) => parse_size(desc),
            None => {
                check_size(self.width, self.height)?;
                Ok((self.width, self.height))
            }
        }
    }
}

/// Root properties of a record, as read from or written to SGF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub application: String,
    pub width: usize,
    pub height: usize,
    pub encoding: String,
    pub file_format: u32,
    pub game_mode: u32,
}

impl Metadata {
    pub fn from_options(options: &Options) -> Result<Self, OptionsError> {
        let (width, height) = options.dimensions()?;
        Ok(Self {
            application: options.application.clone(),
            width,
            height,
            encoding: options.encoding.clone(),
            file_format: options.file_format,
            game_mode: options.game_mode,
        })
    }

    /// The `SZ` value: `19` for square boards, `19:13` otherwise.
    pub fn board_size(&self) -> String {
        if self.width == self.height {
            self.width.to_string()
        } else {
            format!("{}:{}", self.width, self.height)
        }
    }

    /// Overwrite every field the parsed record carries.
    pub fn merge(&mut self, info: RootInfo) {
        if let Some(application) = info.application {
            self.application = application;
        }
        if let Some((width, height)) = info.size {
            self.width = width;
            self.height = height;
        }
        if let Some(encoding) = info.encoding {
            self.encoding = encoding;
        }
        if let Some(file_format) = info.file_format {
            self.file_format = file_format;
        }
        if let Some(game_mode) = info.game_mode {
            self.game_mode = game_mode;
        }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            application: APPLICATION.to_string(),
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            encoding: DEFAULT_ENCODING.to_string(),
            file_format: DEFAULT_FILE_FORMAT,
            game_mode: DEFAULT_GAME_MODE,
        }
    }
}

/// Root properties found in a parsed record. Absent ones stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootInfo {
    pub application: Option<String>,
    pub size: Option<(usize, usize)>,
    pub encoding: Option<String>,
    pub file_format: Option<u32>,
    pub game_mode: Option<u32>,
}
