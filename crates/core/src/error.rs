//! Error types shared across the crate.
//!
//! Two severities exist. Field-level failures ([`ParseError`]) are produced by the parsers and
//! swallowed by the builders. Operation-level failures ([`ReadError`]) abort a card read and are
//! turned into callbacks or alerts by [`crate::reader::CardReader::read`].

use crate::applet::AppletError;

/// Failure to turn one raw applet value into a typed field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The applet returned no value at all.
    #[error("missing input")]
    MissingInput,
    /// The applet returned a value that does not have the expected shape.
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

impl ParseError {
    pub(crate) fn invalid(what: &str, value: &str) -> Self {
        Self::InvalidFormat(format!("{what} {value:?}"))
    }
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Failure of a whole read operation.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("card applet not found (element id: {0})")]
    AppletNotFound(String),
    #[error("no card reader detected")]
    NoReader,
    #[error("no card present in reader {0}")]
    NoCard(String),
    #[error("applet failure: {0}")]
    Applet(#[from] AppletError),
}

pub type ReadResult<T> = std::result::Result<T, ReadError>;

/// Invalid reader configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
