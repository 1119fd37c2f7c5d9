use std::time::Duration;

use thiserror::Error;

use crate::host::HandleKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Host object(s) not found after {waited:?}: {}", format_kinds(.missing))]
    HostObjectNotFound {
        waited: Duration,
        missing: Vec<HandleKind>,
    },

    #[error("Display sink is closed or unavailable")]
    SinkUnavailable,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn format_kinds(kinds: &[HandleKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
