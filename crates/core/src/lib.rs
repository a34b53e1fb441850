//! # BEID Core
//!
//! Reading Belgian identity cards through an external card-reading applet.
//!
//! This crate contains the card records and everything needed to fill them:
//! - Typed records for electronic identity (eID) and social security (SIS) cards
//! - Parsers turning the applet's raw field strings into typed values
//! - Builders that assign parsed fields and keep defaults when parsing fails
//! - A [`CardReader`] driving the applet through init, reader resolution, card detection and
//!   release
//! - A YAML-backed [`SnapshotApplet`] for offline reads and tests
//!
//! **No transport concerns**: the applet itself (and the page or bridge hosting it) is reached
//! only through the [`BeidApplet`] and [`AppletHost`] traits.

pub mod applet;
pub mod builder;
pub mod card;
pub mod config;
pub mod constants;
pub mod error;
pub mod parse;
pub mod reader;
pub mod snapshot;

pub use applet::{AppletError, AppletHost, AppletResult, BeidApplet, CardField};
pub use builder::{EidCardBuilder, SisCardBuilder};
pub use card::{Card, CardValidity, DocumentType, EidCard, Sex, SisCard, SpecialStatus};
pub use config::ReaderConfig;
pub use error::{ConfigError, ParseError, ParseResult, ReadError, ReadResult};
pub use reader::{valid_chip_number, Alert, CardReader, Handler, LogAlert};
pub use snapshot::{AppletCall, SnapshotApplet, SnapshotError, SnapshotHost};
