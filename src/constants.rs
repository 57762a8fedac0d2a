//! Default values for game options and converter limits.

/// Default board size (NxN) when no size is configured.
pub const DEFAULT_SIZE: usize = 19;

/// Largest board edge the SGF coordinate alphabet (`a-z`, `A-Z`) can address.
pub const MAX_SIZE: usize = 52;

/// Deepest nesting of `(` game trees the SGF reader accepts.
pub const MAX_NESTING: usize = 1000;

/// Default text encoding label written to the `CA` property.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Default SGF file format version (`FF`).
pub const DEFAULT_FILE_FORMAT: u32 = 4;

/// Default game identifier (`GM`). 1 is Go.
pub const DEFAULT_GAME_MODE: u32 = 1;

/// Application identifier written to the `AP` property.
pub const APPLICATION: &str = concat!("kifu:", env!("CARGO_PKG_VERSION"));
