//! The applet capability.
//!
//! The card itself is read by an external applet embedded in the host page. This crate never
//! talks to the card: it only consumes the applet through [`BeidApplet`], and finds the applet
//! through [`AppletHost`]. Both are traits so the reading logic can run against a real bridge,
//! a recorded [`crate::snapshot::SnapshotApplet`], or a test double.

use serde::Deserialize;
use std::fmt;

/// A failure reported by the applet (for example an exception thrown on its side).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct AppletError(pub String);

impl AppletError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type AppletResult<T> = std::result::Result<T, AppletError>;

/// Card attributes the applet exposes, one getter each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardField {
    CardNumber,
    ChipNumber,
    ValidityDateBegin,
    ValidityDateEnd,
    IssMunicipality,
    NationalNumber,
    Surname,
    FirstName,
    Initials,
    Nationality,
    BirthLocation,
    BirthDate,
    Sex,
    NobleCondition,
    DocumentType,
    SpecialStatus,
    Street,
    StreetNumber,
    BoxNumber,
    Zip,
    Municipality,
    Country,
}

impl CardField {
    /// Fields pulled from an eID card, in read order. The picture is fetched separately.
    pub const EID: [CardField; 21] = [
        CardField::CardNumber,
        CardField::ChipNumber,
        CardField::ValidityDateBegin,
        CardField::ValidityDateEnd,
        CardField::IssMunicipality,
        CardField::NationalNumber,
        CardField::Surname,
        CardField::FirstName,
        CardField::Nationality,
        CardField::BirthLocation,
        CardField::BirthDate,
        CardField::Sex,
        CardField::NobleCondition,
        CardField::DocumentType,
        CardField::SpecialStatus,
        CardField::Street,
        CardField::StreetNumber,
        CardField::BoxNumber,
        CardField::Zip,
        CardField::Municipality,
        CardField::Country,
    ];

    /// Fields pulled from a SIS card, in read order.
    pub const SIS: [CardField; 9] = [
        CardField::CardNumber,
        CardField::ValidityDateBegin,
        CardField::ValidityDateEnd,
        CardField::NationalNumber,
        CardField::Surname,
        CardField::FirstName,
        CardField::Initials,
        CardField::BirthDate,
        CardField::Sex,
    ];

    /// Name of the applet getter for this field.
    pub fn getter(self) -> &'static str {
        match self {
            CardField::CardNumber => "getCardNumber",
            CardField::ChipNumber => "getChipNumber",
            CardField::ValidityDateBegin => "getValidityDateBegin",
            CardField::ValidityDateEnd => "getValidityDateEnd",
            CardField::IssMunicipality => "getIssMunicipality",
            CardField::NationalNumber => "getNationalNumber",
            CardField::Surname => "getSurname",
            CardField::FirstName => "getFirstName",
            CardField::Initials => "getInitials",
            CardField::Nationality => "getNationality",
            CardField::BirthLocation => "getBirthLocation",
            CardField::BirthDate => "getBirthDate",
            CardField::Sex => "getSex",
            CardField::NobleCondition => "getNobleCondition",
            CardField::DocumentType => "getDocumentType",
            CardField::SpecialStatus => "getSpecialStatus",
            CardField::Street => "getStreet",
            CardField::StreetNumber => "getStreetNumber",
            CardField::BoxNumber => "getBoxNumber",
            CardField::Zip => "getZip",
            CardField::Municipality => "getMunicipality",
            CardField::Country => "getCountry",
        }
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.getter())
    }
}

/// The applet as seen from this crate.
///
/// Every call is synchronous. Values are loosely typed on the applet side; they arrive here as
/// strings, with `None` standing for a null/undefined result.
pub trait BeidApplet {
    /// Start (or reset) a session, optionally bound to one reader.
    fn init_lib(&mut self, reader_name: Option<&str>) -> AppletResult<()>;

    /// Release the current session.
    fn exit_lib(&mut self) -> AppletResult<()>;

    /// Look up a parameter declared on the applet element.
    fn parameter(&mut self, name: &str) -> AppletResult<Option<String>>;

    fn reader_count(&mut self) -> AppletResult<usize>;

    fn reader_by_num(&mut self, index: usize) -> AppletResult<Option<String>>;

    fn is_card_present(&mut self, reader_name: &str) -> AppletResult<bool>;

    fn field(&mut self, field: CardField) -> AppletResult<Option<String>>;

    /// Raw photo bytes, `None` when the card has no picture.
    fn picture(&mut self) -> AppletResult<Option<Vec<u8>>>;
}

/// Locates the applet in the host environment.
pub trait AppletHost {
    type Applet: BeidApplet;

    /// Find the applet exposed by the element with the given id.
    fn find_applet(&mut self, element_id: &str) -> Option<Self::Applet>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_sets_have_expected_members() {
        assert!(CardField::EID.contains(&CardField::ChipNumber));
        assert!(!CardField::EID.contains(&CardField::Initials));
        assert!(CardField::SIS.contains(&CardField::Initials));
        assert!(!CardField::SIS.contains(&CardField::ChipNumber));
    }

    #[test]
    fn fields_display_as_applet_getters() {
        assert_eq!(CardField::Zip.to_string(), "getZip");
        assert_eq!(CardField::IssMunicipality.getter(), "getIssMunicipality");
    }
}
