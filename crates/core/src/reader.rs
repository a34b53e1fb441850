//! Card reader orchestration.
//!
//! [`CardReader::read`] runs one linear, single-shot sequence against the applet:
//! init, resolve the reader name, re-init bound to that reader, check card presence, detect the
//! card kind by its chip number, build the record, release the session. The session is released
//! on every path by a drop guard.
//!
//! [`CardReader::try_read`] exposes the same sequence with a typed [`ReadError`]; `read` layers
//! the user-facing policy on top (callbacks for "no reader"/"no card", an alert for everything
//! else) and returns `None` instead of an error.

use crate::applet::{AppletHost, AppletResult, BeidApplet, CardField};
use crate::builder::{EidCardBuilder, SisCardBuilder};
use crate::card::{Card, EidCard, SisCard};
use crate::config::ReaderConfig;
use crate::constants::{
    APPLET_FAILURE_ALERT_PREFIX, APPLET_NOT_FOUND_ALERT, DEFAULT_APPLET_ID, READER_PARAMETER,
};
use crate::error::{ReadError, ReadResult};
use std::ops::{Deref, DerefMut};

/// User-visible alert sink for operation-level failures.
pub trait Alert {
    fn alert(&mut self, message: &str);
}

impl<F> Alert for F
where
    F: FnMut(&str),
{
    fn alert(&mut self, message: &str) {
        (*self)(message)
    }
}

/// Default alert sink: writes alerts to the error log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAlert;

impl Alert for LogAlert {
    fn alert(&mut self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Zero-argument callback invoked at a read decision point.
pub type Handler = Box<dyn FnMut()>;

/// Reads eID and SIS cards through an applet found via `H`.
///
/// The reader caches the applet handle and the resolved reader name between reads; nothing
/// else carries over.
pub struct CardReader<H: AppletHost> {
    host: H,
    applet: Option<H::Applet>,
    applet_id: String,
    reader_name: String,
    no_card_present_handler: Option<Handler>,
    no_reader_detected_handler: Option<Handler>,
    alert: Box<dyn Alert>,
}

impl<H: AppletHost> CardReader<H> {
    /// Create a reader. `reader_name` forces a specific card reader; `None` (or blank) resolves
    /// it from the applet on the first read.
    pub fn new(host: H, reader_name: Option<&str>) -> Self {
        let mut reader = Self {
            host,
            applet: None,
            applet_id: DEFAULT_APPLET_ID.to_string(),
            reader_name: String::new(),
            no_card_present_handler: None,
            no_reader_detected_handler: None,
            alert: Box::new(LogAlert),
        };
        reader.set_reader_name(reader_name);
        reader
    }

    pub fn with_config(host: H, config: &ReaderConfig) -> Self {
        let mut reader = Self::new(host, config.reader_name());
        reader.applet_id = config.applet_id().to_string();
        reader
    }

    pub fn set_reader_name(&mut self, reader_name: Option<&str>) {
        self.reader_name = reader_name.map(str::trim).unwrap_or_default().to_string();
    }

    /// The configured or last resolved reader name; empty when not resolved yet.
    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    /// Change the id of the host element exposing the applet. Drops the cached applet handle.
    pub fn set_applet_id(&mut self, applet_id: impl Into<String>) {
        self.applet_id = applet_id.into();
        self.applet = None;
    }

    pub fn applet_id(&self) -> &str {
        &self.applet_id
    }

    /// Called when a reader is found but holds no card. `None` removes the handler.
    pub fn set_no_card_present_handler(&mut self, handler: Option<Handler>) {
        self.no_card_present_handler = handler;
    }

    /// Called when no card reader can be resolved. `None` removes the handler.
    pub fn set_no_reader_detected_handler(&mut self, handler: Option<Handler>) {
        self.no_reader_detected_handler = handler;
    }

    pub fn set_alert(&mut self, alert: impl Alert + 'static) {
        self.alert = Box::new(alert);
    }

    /// The cached applet handle, if one has been located.
    pub fn applet(&self) -> Option<&H::Applet> {
        self.applet.as_ref()
    }

    /// Names of all readers the applet detects.
    ///
    /// Failures are not reported: the names collected before the failure are returned, which
    /// is an empty list when the applet is missing.
    pub fn reader_names(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        let applet = match locate(&mut self.host, &mut self.applet, &self.applet_id) {
            Ok(applet) => applet,
            Err(e) => {
                tracing::debug!("listing readers: {e}");
                return names;
            }
        };

        let mut session = Session::new(applet);
        if let Err(e) = list_readers(&mut *session, &mut names) {
            tracing::debug!("listing readers: {e}");
        }
        names
    }

    /// Name of the first reader the applet detects, or an empty string.
    pub fn default_reader_name(&mut self) -> String {
        let applet = match locate(&mut self.host, &mut self.applet, &self.applet_id) {
            Ok(applet) => applet,
            Err(e) => {
                tracing::debug!("default reader: {e}");
                return String::new();
            }
        };

        let mut session = Session::new(applet);
        match session.init_lib(None) {
            Ok(()) => first_reader(&mut *session),
            Err(e) => {
                tracing::debug!("default reader: {e}");
                String::new()
            }
        }
    }

    /// Read the inserted card.
    ///
    /// Returns `None` when no card could be read. "No reader" and "no card" invoke their
    /// handlers; every other failure raises an alert.
    pub fn read(&mut self) -> Option<Card> {
        match self.try_read() {
            Ok(card) => Some(card),
            Err(ReadError::NoReader) => {
                tracing::info!("no card reader detected");
                if let Some(handler) = self.no_reader_detected_handler.as_mut() {
                    handler();
                }
                None
            }
            Err(ReadError::NoCard(reader_name)) => {
                tracing::info!("no card present in reader {reader_name}");
                if let Some(handler) = self.no_card_present_handler.as_mut() {
                    handler();
                }
                None
            }
            Err(ReadError::AppletNotFound(_)) => {
                self.alert.alert(APPLET_NOT_FOUND_ALERT);
                None
            }
            Err(ReadError::Applet(e)) => {
                self.alert
                    .alert(&format!("{APPLET_FAILURE_ALERT_PREFIX}{e}"));
                None
            }
        }
    }

    /// Read the inserted card, reporting why nothing was read.
    ///
    /// No handler or alert is invoked. The applet session is released before returning.
    pub fn try_read(&mut self) -> ReadResult<Card> {
        let applet = locate(&mut self.host, &mut self.applet, &self.applet_id)?;
        let mut session = Session::new(applet);

        // reset state left by earlier reads
        session.init_lib(None)?;

        if self.reader_name.is_empty() {
            self.reader_name = resolve_reader_name(&mut *session)?;
        }
        if self.reader_name.is_empty() {
            return Err(ReadError::NoReader);
        }

        tracing::debug!("binding applet to reader {}", self.reader_name);
        session.init_lib(Some(&self.reader_name))?;

        if !session.is_card_present(&self.reader_name)? {
            return Err(ReadError::NoCard(self.reader_name.clone()));
        }

        // the applet returns no chip number for SIS cards
        let chip_number = session.field(CardField::ChipNumber)?;
        let card = if valid_chip_number(chip_number.as_deref()) {
            tracing::debug!("reading eID card");
            Card::Eid(read_eid(&mut *session)?)
        } else {
            tracing::debug!("reading SIS card");
            Card::Sis(read_sis(&mut *session)?)
        };
        Ok(card)
    }
}

/// A chip number identifies an eID card when it is present and non-empty.
pub fn valid_chip_number(chip_number: Option<&str>) -> bool {
    chip_number.is_some_and(|chip| !chip.is_empty())
}

// ============================================================================
// Helpers (internal)
// ============================================================================

/// Applet session that is released when dropped, whatever happened in between.
struct Session<'a, A: BeidApplet> {
    applet: &'a mut A,
}

impl<'a, A: BeidApplet> Session<'a, A> {
    fn new(applet: &'a mut A) -> Self {
        Self { applet }
    }
}

impl<A: BeidApplet> Deref for Session<'_, A> {
    type Target = A;

    fn deref(&self) -> &A {
        &*self.applet
    }
}

impl<A: BeidApplet> DerefMut for Session<'_, A> {
    fn deref_mut(&mut self) -> &mut A {
        &mut *self.applet
    }
}

impl<A: BeidApplet> Drop for Session<'_, A> {
    fn drop(&mut self) {
        if let Err(e) = self.applet.exit_lib() {
            tracing::warn!("failed to release applet session: {e}");
        }
    }
}

fn locate<'a, H: AppletHost>(
    host: &mut H,
    cached: &'a mut Option<H::Applet>,
    applet_id: &str,
) -> ReadResult<&'a mut H::Applet> {
    if cached.is_none() {
        *cached = host.find_applet(applet_id);
    }
    cached
        .as_mut()
        .ok_or_else(|| ReadError::AppletNotFound(applet_id.to_string()))
}

/// Applet parameter first, then the first detected reader.
fn resolve_reader_name<A: BeidApplet>(applet: &mut A) -> AppletResult<String> {
    let parameter = applet.parameter(READER_PARAMETER)?.unwrap_or_default();
    if !parameter.trim().is_empty() {
        return Ok(parameter);
    }
    Ok(first_reader(applet))
}

fn first_reader<A: BeidApplet>(applet: &mut A) -> String {
    match applet.reader_by_num(0) {
        Ok(name) => name.unwrap_or_default(),
        Err(e) => {
            tracing::debug!("no first reader: {e}");
            String::new()
        }
    }
}

fn list_readers<A: BeidApplet>(applet: &mut A, names: &mut Vec<String>) -> AppletResult<()> {
    applet.init_lib(None)?;
    let count = applet.reader_count()?;
    for index in 0..count {
        names.push(applet.reader_by_num(index)?.unwrap_or_default());
    }
    Ok(())
}

fn read_eid<A: BeidApplet>(applet: &mut A) -> AppletResult<EidCard> {
    let mut builder = EidCardBuilder::new();
    for field in CardField::EID {
        let raw = applet.field(field)?;
        builder.set_field(field, raw.as_deref());
    }
    builder.set_picture(applet.picture()?);
    Ok(builder.build())
}

fn read_sis<A: BeidApplet>(applet: &mut A) -> AppletResult<SisCard> {
    let mut builder = SisCardBuilder::new();
    for field in CardField::SIS {
        let raw = applet.field(field)?;
        builder.set_field(field, raw.as_deref());
    }
    Ok(builder.build())
}
