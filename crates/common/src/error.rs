//! Error types for fixtures and configuration

use thiserror::Error;

/// Result type alias using the fixture Error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),

    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },
}
