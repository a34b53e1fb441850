//! Reader configuration.
//!
//! Configuration is resolved once at startup and passed into
//! [`crate::reader::CardReader::with_config`], so reads never consult process-wide state.

use crate::constants::DEFAULT_APPLET_ID;
use crate::error::{ConfigError, ConfigResult};

/// Reader settings resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderConfig {
    reader_name: Option<String>,
    applet_id: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            reader_name: None,
            applet_id: DEFAULT_APPLET_ID.to_string(),
        }
    }
}

impl ReaderConfig {
    /// Create a new `ReaderConfig`.
    ///
    /// A blank reader name means "resolve it from the applet". The applet id must be a valid
    /// element id (see [`validate_element_id`]).
    pub fn new(reader_name: Option<String>, applet_id: impl Into<String>) -> ConfigResult<Self> {
        let applet_id = applet_id.into();
        validate_element_id(&applet_id)?;

        Ok(Self {
            reader_name: reader_name.filter(|name| !name.trim().is_empty()),
            applet_id,
        })
    }

    /// Build a config from optional environment values (`BEID_READER`, `BEID_APPLET_ID`).
    ///
    /// A missing or blank reader value leaves the reader unset. A missing applet id selects
    /// the default one; a present but invalid one is an error.
    pub fn from_env_values(
        reader_name: Option<String>,
        applet_id: Option<String>,
    ) -> ConfigResult<Self> {
        let applet_id = applet_id
            .map(|id| id.trim().to_string())
            .unwrap_or_else(|| DEFAULT_APPLET_ID.to_string());
        Self::new(reader_name.map(|name| name.trim().to_string()), applet_id)
    }

    pub fn reader_name(&self) -> Option<&str> {
        self.reader_name.as_deref()
    }

    pub fn applet_id(&self) -> &str {
        &self.applet_id
    }
}

/// Validates that an element id is safe to look up in the host page.
///
/// Rejects empty ids, bounds the length, and restricts characters to a conservative ASCII set.
///
/// # Errors
///
/// Returns a `ConfigError::InvalidInput` if the id is invalid.
pub fn validate_element_id(element_id: &str) -> ConfigResult<()> {
    const MAX_ELEMENT_ID_LEN: usize = 128;

    if element_id.trim().is_empty() {
        return Err(ConfigError::InvalidInput(
            "applet element id cannot be empty".into(),
        ));
    }

    if element_id.len() > MAX_ELEMENT_ID_LEN {
        return Err(ConfigError::InvalidInput(format!(
            "applet element id exceeds maximum length of {} characters",
            MAX_ELEMENT_ID_LEN
        )));
    }

    let ok = element_id
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_' | b':'));

    if !ok {
        return Err(ConfigError::InvalidInput(
            "applet element id contains invalid characters (only alphanumeric, '.', '-', '_', ':' allowed)"
                .into(),
        ));
    }

    Ok(())
}
