//! Constants used throughout the crate.

/// Id of the host element exposing the applet, unless configured otherwise.
pub const DEFAULT_APPLET_ID: &str = "BEIDAppletLauncher";

/// Applet parameter that may name the reader to use.
pub const READER_PARAMETER: &str = "Reader";

/// Environment variable overriding the reader name.
pub const READER_ENV: &str = "BEID_READER";

/// Environment variable overriding the applet element id.
pub const APPLET_ID_ENV: &str = "BEID_APPLET_ID";

pub const APPLET_NOT_FOUND_ALERT: &str = "BEID Applet not found.";

pub const APPLET_FAILURE_ALERT_PREFIX: &str = "BEID Applet throw exception: ";
