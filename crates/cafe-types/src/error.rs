//! Error types for cafe-swkbd.

use std::io;

/// Errors produced inside the keyboard and cursor subsystems.
///
/// None of these ever crosses the public session surface: operations log
/// them on the `video` target and fall back to their documented no-op value.
#[derive(Debug, thiserror::Error)]
pub enum CafeError {
    #[error("allocation of {requested} bytes failed")]
    Alloc { requested: usize },

    #[error("platform error: {0}")]
    Platform(String),

    #[error("conversion error: {0}")]
    Conversion(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CafeError>;
