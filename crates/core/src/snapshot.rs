//! Recorded applet snapshots.
//!
//! A snapshot is a YAML document describing what an applet would report: the detected readers,
//! the parameters declared on the applet element, the inserted card (if any) and the calls that
//! should fail. [`SnapshotApplet`] replays it through [`BeidApplet`] and records every call,
//! which makes it usable both as an offline data source and as a test double.
//!
//! ```yaml
//! readers:
//!   - ACS ACR38U 00 00
//! parameters:
//!   Reader: ACS ACR38U 00 00
//! card:
//!   fields:
//!     card_number: 591234567890
//!     chip_number: 534C4750
//!     birth_date: 23 SEPT 1975
//!   picture: /9j/4AAQ
//! failures: [picture]
//! ```
//!
//! Field values may be any YAML scalar; they reach the parsers as strings, and `~` stands for
//! a null result.

use crate::applet::{AppletError, AppletHost, AppletResult, BeidApplet, CardField};
use crate::constants::DEFAULT_APPLET_ID;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Errors returned while loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Applet operations, as recorded and as named in the `failures` list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppletCall {
    InitLib,
    ExitLib,
    Parameter,
    ReaderCount,
    ReaderByNum,
    IsCardPresent,
    Field,
    Picture,
}

impl fmt::Display for AppletCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppletCall::InitLib => "init_lib",
            AppletCall::ExitLib => "exit_lib",
            AppletCall::Parameter => "parameter",
            AppletCall::ReaderCount => "reader_count",
            AppletCall::ReaderByNum => "reader_by_num",
            AppletCall::IsCardPresent => "is_card_present",
            AppletCall::Field => "field",
            AppletCall::Picture => "picture",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SnapshotCard {
    reader: Option<String>,
    fields: BTreeMap<CardField, Option<String>>,
    picture: Option<Vec<u8>>,
}

/// An applet replaying a recorded snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotApplet {
    readers: Vec<String>,
    parameters: BTreeMap<String, String>,
    card: Option<SnapshotCard>,
    failures: Vec<AppletCall>,
    calls: Vec<AppletCall>,
    bound_reader: Option<String>,
}

impl SnapshotApplet {
    /// Parse a snapshot from YAML text.
    ///
    /// Unknown keys are rejected. Schema errors name the failing path (for example
    /// `card.fields.zip`).
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the YAML does not match the snapshot schema, a field value
    /// is not a scalar, or the picture is not valid base64.
    pub fn parse(yaml_text: &str) -> SnapshotResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, SnapshotWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(SnapshotError::Translation(format!(
                    "snapshot schema mismatch at {path}: {source}"
                )));
            }
        };

        wire_to_applet(wire)
    }

    /// Read and parse a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> SnapshotResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> &[AppletCall] {
        &self.calls
    }

    pub fn count(&self, call: AppletCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    /// Reader passed to the most recent `init_lib` that named one.
    pub fn bound_reader(&self) -> Option<&str> {
        self.bound_reader.as_deref()
    }

    fn enter(&mut self, call: AppletCall) -> AppletResult<()> {
        self.calls.push(call);
        if self.failures.contains(&call) {
            return Err(AppletError::new(format!("simulated failure in {call}")));
        }
        Ok(())
    }
}

impl BeidApplet for SnapshotApplet {
    fn init_lib(&mut self, reader_name: Option<&str>) -> AppletResult<()> {
        self.enter(AppletCall::InitLib)?;
        if let Some(reader_name) = reader_name {
            self.bound_reader = Some(reader_name.to_string());
        }
        Ok(())
    }

    fn exit_lib(&mut self) -> AppletResult<()> {
        self.enter(AppletCall::ExitLib)
    }

    fn parameter(&mut self, name: &str) -> AppletResult<Option<String>> {
        self.enter(AppletCall::Parameter)?;
        Ok(self.parameters.get(name).cloned())
    }

    fn reader_count(&mut self) -> AppletResult<usize> {
        self.enter(AppletCall::ReaderCount)?;
        Ok(self.readers.len())
    }

    fn reader_by_num(&mut self, index: usize) -> AppletResult<Option<String>> {
        self.enter(AppletCall::ReaderByNum)?;
        self.readers
            .get(index)
            .cloned()
            .map(Some)
            .ok_or_else(|| AppletError::new(format!("no reader at index {index}")))
    }

    fn is_card_present(&mut self, reader_name: &str) -> AppletResult<bool> {
        self.enter(AppletCall::IsCardPresent)?;
        Ok(self.card.as_ref().is_some_and(|card| {
            card.reader
                .as_deref()
                .map_or(true, |reader| reader == reader_name)
        }))
    }

    fn field(&mut self, field: CardField) -> AppletResult<Option<String>> {
        self.enter(AppletCall::Field)?;
        Ok(self
            .card
            .as_ref()
            .and_then(|card| card.fields.get(&field).cloned().flatten()))
    }

    fn picture(&mut self) -> AppletResult<Option<Vec<u8>>> {
        self.enter(AppletCall::Picture)?;
        Ok(self.card.as_ref().and_then(|card| card.picture.clone()))
    }
}

/// A host page holding snapshot applets by element id.
#[derive(Clone, Debug, Default)]
pub struct SnapshotHost {
    applets: BTreeMap<String, SnapshotApplet>,
}

impl SnapshotHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host exposing one applet under the default element id.
    pub fn single(applet: SnapshotApplet) -> Self {
        let mut host = Self::new();
        host.insert(DEFAULT_APPLET_ID, applet);
        host
    }

    pub fn insert(&mut self, element_id: impl Into<String>, applet: SnapshotApplet) -> &mut Self {
        self.applets.insert(element_id.into(), applet);
        self
    }
}

impl AppletHost for SnapshotHost {
    type Applet = SnapshotApplet;

    fn find_applet(&mut self, element_id: &str) -> Option<SnapshotApplet> {
        self.applets.get(element_id).cloned()
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotWire {
    #[serde(default)]
    readers: Vec<String>,

    #[serde(default)]
    parameters: BTreeMap<String, String>,

    #[serde(default)]
    card: Option<CardWire>,

    #[serde(default)]
    failures: Vec<AppletCall>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CardWire {
    #[serde(default)]
    reader: Option<String>,

    #[serde(default)]
    fields: BTreeMap<CardField, serde_yaml::Value>,

    /// Base64 (standard alphabet).
    #[serde(default)]
    picture: Option<String>,
}

fn wire_to_applet(wire: SnapshotWire) -> SnapshotResult<SnapshotApplet> {
    let card = wire.card.map(wire_to_card).transpose()?;

    Ok(SnapshotApplet {
        readers: wire.readers,
        parameters: wire.parameters,
        card,
        failures: wire.failures,
        calls: Vec::new(),
        bound_reader: None,
    })
}

fn wire_to_card(wire: CardWire) -> SnapshotResult<SnapshotCard> {
    let fields = wire
        .fields
        .into_iter()
        .map(|(field, value)| scalar_to_string(field, value).map(|value| (field, value)))
        .collect::<SnapshotResult<BTreeMap<_, _>>>()?;

    let picture = wire
        .picture
        .map(|encoded| {
            STANDARD
                .decode(encoded.trim())
                .map_err(|e| SnapshotError::InvalidInput(format!("picture is not base64: {e}")))
        })
        .transpose()?;

    Ok(SnapshotCard {
        reader: wire.reader,
        fields,
        picture,
    })
}

/// Convert a YAML scalar to the string the applet would hand out. `~` is a null result.
fn scalar_to_string(field: CardField, value: serde_yaml::Value) -> SnapshotResult<Option<String>> {
    use serde_yaml::Value;

    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(SnapshotError::InvalidInput(format!(
            "value of {field} must be a scalar"
        ))),
    }
}
