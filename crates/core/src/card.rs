//! Card records.
//!
//! These are plain value objects holding normalized identity data. They are created empty by a
//! builder in [`crate::builder`], populated field by field, and handed out as immutable
//! snapshots. Setters are crate-internal.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

// ============================================================================
// Coded values
// ============================================================================

/// Sex as printed on the card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Sex {
    #[default]
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
}

impl Sex {
    pub fn code(self) -> char {
        match self {
            Sex::Female => 'F',
            Sex::Male => 'M',
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Kind of identity document, as coded by the card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[default]
    Undefined,
    BelgianCitizen,
    EuCitizen,
    NonEuCitizen,
    BootstrapCard,
    HabilitationCard,
}

impl DocumentType {
    /// Map the numeric card code to a document type. Codes 4-6 are unassigned.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(DocumentType::Undefined),
            1 => Some(DocumentType::BelgianCitizen),
            2 => Some(DocumentType::EuCitizen),
            3 => Some(DocumentType::NonEuCitizen),
            7 => Some(DocumentType::BootstrapCard),
            8 => Some(DocumentType::HabilitationCard),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            DocumentType::Undefined => 0,
            DocumentType::BelgianCitizen => 1,
            DocumentType::EuCitizen => 2,
            DocumentType::NonEuCitizen => 3,
            DocumentType::BootstrapCard => 7,
            DocumentType::HabilitationCard => 8,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentType::Undefined => "undefined",
            DocumentType::BelgianCitizen => "Belgian citizen",
            DocumentType::EuCitizen => "EU citizen",
            DocumentType::NonEuCitizen => "non-EU citizen",
            DocumentType::BootstrapCard => "bootstrap card",
            DocumentType::HabilitationCard => "habilitation card",
        };
        f.write_str(label)
    }
}

/// Special status printed on an eID card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialStatus {
    #[default]
    NoStatus,
    WhiteCane,
    ExtendedMinority,
    WhiteCaneAndExtendedMinority,
    YellowCane,
    YellowCaneAndExtendedMinority,
}

impl SpecialStatus {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(SpecialStatus::NoStatus),
            1 => Some(SpecialStatus::WhiteCane),
            2 => Some(SpecialStatus::ExtendedMinority),
            3 => Some(SpecialStatus::WhiteCaneAndExtendedMinority),
            4 => Some(SpecialStatus::YellowCane),
            5 => Some(SpecialStatus::YellowCaneAndExtendedMinority),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            SpecialStatus::NoStatus => 0,
            SpecialStatus::WhiteCane => 1,
            SpecialStatus::ExtendedMinority => 2,
            SpecialStatus::WhiteCaneAndExtendedMinority => 3,
            SpecialStatus::YellowCane => 4,
            SpecialStatus::YellowCaneAndExtendedMinority => 5,
        }
    }

    /// The `(white_cane, yellow_cane, extended_minority)` triple encoded by this status.
    pub fn flags(self) -> (bool, bool, bool) {
        match self {
            SpecialStatus::NoStatus => (false, false, false),
            SpecialStatus::WhiteCane => (true, false, false),
            SpecialStatus::ExtendedMinority => (false, false, true),
            SpecialStatus::WhiteCaneAndExtendedMinority => (true, false, true),
            SpecialStatus::YellowCane => (false, true, false),
            SpecialStatus::YellowCaneAndExtendedMinority => (false, true, true),
        }
    }
}

impl fmt::Display for SpecialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SpecialStatus::NoStatus => "no status",
            SpecialStatus::WhiteCane => "white cane",
            SpecialStatus::ExtendedMinority => "extended minority",
            SpecialStatus::WhiteCaneAndExtendedMinority => "white cane and extended minority",
            SpecialStatus::YellowCane => "yellow cane",
            SpecialStatus::YellowCaneAndExtendedMinority => "yellow cane and extended minority",
        };
        f.write_str(label)
    }
}

// ============================================================================
// Records
// ============================================================================

/// Card number and validity period, common to both card kinds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CardValidity {
    card_number: u64,
    validity_begin_date: Option<NaiveDate>,
    validity_end_date: Option<NaiveDate>,
}

impl CardValidity {
    pub fn card_number(&self) -> u64 {
        self.card_number
    }

    pub fn validity_begin_date(&self) -> Option<NaiveDate> {
        self.validity_begin_date
    }

    pub fn validity_end_date(&self) -> Option<NaiveDate> {
        self.validity_end_date
    }

    pub(crate) fn set_card_number(&mut self, card_number: u64) {
        self.card_number = card_number;
    }

    pub(crate) fn set_validity_begin_date(&mut self, date: NaiveDate) {
        self.validity_begin_date = Some(date);
    }

    pub(crate) fn set_validity_end_date(&mut self, date: NaiveDate) {
        self.validity_end_date = Some(date);
    }

    fn write_lines(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "card_number: {}", self.card_number)?;
        writeln!(
            f,
            "validity_begin_date: {}",
            display_date(self.validity_begin_date)
        )?;
        writeln!(
            f,
            "validity_end_date: {}",
            display_date(self.validity_end_date)
        )
    }
}

/// Public identity data of an eID card.
///
/// `first_name` holds all first names as one string. `first_name_2` and `first_name_3` exist for
/// callers written against older applets that split the names; they are always empty because
/// the split cannot be recovered (some first names consist of two words).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EidCard {
    #[serde(flatten)]
    validity: CardValidity,
    chip_number: String,
    issuing_municipality: String,
    national_number: u64,
    surname: String,
    first_name: String,
    first_name_2: String,
    first_name_3: String,
    nationality: String,
    birth_location: String,
    birth_date: Option<NaiveDate>,
    sex: Sex,
    noble_condition: String,
    document_type: DocumentType,
    special_status: SpecialStatus,
    white_cane: bool,
    yellow_cane: bool,
    extended_minority: bool,
    street: String,
    // usually digits, but numbers like 32A exist
    street_number: String,
    box_number: String,
    zip_code: u64,
    municipality: String,
    country: String,
    #[serde(serialize_with = "serialize_picture")]
    picture: Option<Vec<u8>>,
}

impl EidCard {
    pub fn validity(&self) -> &CardValidity {
        &self.validity
    }

    pub fn card_number(&self) -> u64 {
        self.validity.card_number
    }

    pub fn validity_begin_date(&self) -> Option<NaiveDate> {
        self.validity.validity_begin_date
    }

    pub fn validity_end_date(&self) -> Option<NaiveDate> {
        self.validity.validity_end_date
    }

    pub fn chip_number(&self) -> &str {
        &self.chip_number
    }

    pub fn issuing_municipality(&self) -> &str {
        &self.issuing_municipality
    }

    pub fn national_number(&self) -> u64 {
        self.national_number
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Always empty.
    pub fn first_name_2(&self) -> &str {
        &self.first_name_2
    }

    /// Always empty.
    pub fn first_name_3(&self) -> &str {
        &self.first_name_3
    }

    pub fn nationality(&self) -> &str {
        &self.nationality
    }

    pub fn birth_location(&self) -> &str {
        &self.birth_location
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn is_female(&self) -> bool {
        self.sex == Sex::Female
    }

    pub fn is_male(&self) -> bool {
        self.sex == Sex::Male
    }

    pub fn noble_condition(&self) -> &str {
        &self.noble_condition
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn special_status(&self) -> SpecialStatus {
        self.special_status
    }

    /// Blind holder.
    pub fn white_cane(&self) -> bool {
        self.white_cane
    }

    /// Partially sighted holder.
    pub fn yellow_cane(&self) -> bool {
        self.yellow_cane
    }

    pub fn extended_minority(&self) -> bool {
        self.extended_minority
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn street_number(&self) -> &str {
        &self.street_number
    }

    pub fn box_number(&self) -> &str {
        &self.box_number
    }

    pub fn zip_code(&self) -> u64 {
        self.zip_code
    }

    pub fn municipality(&self) -> &str {
        &self.municipality
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Raw photo bytes, `None` when the card yielded no picture.
    pub fn picture(&self) -> Option<&[u8]> {
        self.picture.as_deref()
    }

    pub(crate) fn validity_mut(&mut self) -> &mut CardValidity {
        &mut self.validity
    }

    pub(crate) fn set_chip_number(&mut self, chip_number: String) {
        self.chip_number = chip_number;
    }

    pub(crate) fn set_issuing_municipality(&mut self, municipality: String) {
        self.issuing_municipality = municipality;
    }

    pub(crate) fn set_national_number(&mut self, national_number: u64) {
        self.national_number = national_number;
    }

    pub(crate) fn set_surname(&mut self, surname: String) {
        self.surname = surname;
    }

    pub(crate) fn set_first_name(&mut self, first_name: String) {
        self.first_name = first_name;
    }

    pub(crate) fn set_nationality(&mut self, nationality: String) {
        self.nationality = nationality;
    }

    pub(crate) fn set_birth_location(&mut self, birth_location: String) {
        self.birth_location = birth_location;
    }

    pub(crate) fn set_birth_date(&mut self, birth_date: NaiveDate) {
        self.birth_date = Some(birth_date);
    }

    pub(crate) fn set_sex(&mut self, sex: Sex) {
        self.sex = sex;
    }

    pub(crate) fn set_noble_condition(&mut self, noble_condition: String) {
        self.noble_condition = noble_condition;
    }

    pub(crate) fn set_document_type(&mut self, document_type: DocumentType) {
        self.document_type = document_type;
    }

    /// Sets the status and recomputes the three derived flags from it.
    pub(crate) fn set_special_status(&mut self, special_status: SpecialStatus) {
        let (white_cane, yellow_cane, extended_minority) = special_status.flags();
        self.special_status = special_status;
        self.white_cane = white_cane;
        self.yellow_cane = yellow_cane;
        self.extended_minority = extended_minority;
    }

    pub(crate) fn set_street(&mut self, street: String) {
        self.street = street;
    }

    pub(crate) fn set_street_number(&mut self, street_number: String) {
        self.street_number = street_number;
    }

    pub(crate) fn set_box_number(&mut self, box_number: String) {
        self.box_number = box_number;
    }

    pub(crate) fn set_zip_code(&mut self, zip_code: u64) {
        self.zip_code = zip_code;
    }

    pub(crate) fn set_municipality(&mut self, municipality: String) {
        self.municipality = municipality;
    }

    pub(crate) fn set_country(&mut self, country: String) {
        self.country = country;
    }

    pub(crate) fn set_picture(&mut self, picture: Option<Vec<u8>>) {
        self.picture = picture;
    }
}

impl fmt::Display for EidCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "eID card")?;
        self.validity.write_lines(f)?;
        writeln!(f, "chip_number: {}", self.chip_number)?;
        writeln!(f, "issuing_municipality: {}", self.issuing_municipality)?;
        writeln!(f, "national_number: {}", self.national_number)?;
        writeln!(f, "surname: {}", self.surname)?;
        writeln!(f, "first_name: {}", self.first_name)?;
        writeln!(f, "first_name_2: {}", self.first_name_2)?;
        writeln!(f, "first_name_3: {}", self.first_name_3)?;
        writeln!(f, "nationality: {}", self.nationality)?;
        writeln!(f, "birth_location: {}", self.birth_location)?;
        writeln!(f, "birth_date: {}", display_date(self.birth_date))?;
        writeln!(f, "sex: {}", self.sex)?;
        writeln!(f, "noble_condition: {}", self.noble_condition)?;
        writeln!(f, "document_type: {}", self.document_type)?;
        writeln!(f, "special_status: {}", self.special_status)?;
        writeln!(f, "white_cane: {}", self.white_cane)?;
        writeln!(f, "yellow_cane: {}", self.yellow_cane)?;
        writeln!(f, "extended_minority: {}", self.extended_minority)?;
        writeln!(f, "street: {}", self.street)?;
        writeln!(f, "street_number: {}", self.street_number)?;
        writeln!(f, "box_number: {}", self.box_number)?;
        writeln!(f, "zip_code: {}", self.zip_code)?;
        writeln!(f, "municipality: {}", self.municipality)?;
        writeln!(f, "country: {}", self.country)?;
        if self.picture.is_some() {
            write!(f, "A picture is available.")
        } else {
            write!(f, "No picture available.")
        }
    }
}

/// Public identity data of a SIS (social security) card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SisCard {
    #[serde(flatten)]
    validity: CardValidity,
    social_security_number: u64,
    surname: String,
    initials: String,
    name: String,
    sex: Sex,
    birth_date: Option<NaiveDate>,
}

impl SisCard {
    pub fn validity(&self) -> &CardValidity {
        &self.validity
    }

    pub fn card_number(&self) -> u64 {
        self.validity.card_number
    }

    pub fn validity_begin_date(&self) -> Option<NaiveDate> {
        self.validity.validity_begin_date
    }

    pub fn validity_end_date(&self) -> Option<NaiveDate> {
        self.validity.validity_end_date
    }

    pub fn social_security_number(&self) -> u64 {
        self.social_security_number
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn initials(&self) -> &str {
        &self.initials
    }

    /// First names.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn is_female(&self) -> bool {
        self.sex == Sex::Female
    }

    pub fn is_male(&self) -> bool {
        self.sex == Sex::Male
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    pub(crate) fn validity_mut(&mut self) -> &mut CardValidity {
        &mut self.validity
    }

    pub(crate) fn set_social_security_number(&mut self, number: u64) {
        self.social_security_number = number;
    }

    pub(crate) fn set_surname(&mut self, surname: String) {
        self.surname = surname;
    }

    pub(crate) fn set_initials(&mut self, initials: String) {
        self.initials = initials;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_sex(&mut self, sex: Sex) {
        self.sex = sex;
    }

    pub(crate) fn set_birth_date(&mut self, birth_date: NaiveDate) {
        self.birth_date = Some(birth_date);
    }
}

impl fmt::Display for SisCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SIS card")?;
        self.validity.write_lines(f)?;
        writeln!(f, "social_security_number: {}", self.social_security_number)?;
        writeln!(f, "surname: {}", self.surname)?;
        writeln!(f, "initials: {}", self.initials)?;
        writeln!(f, "name: {}", self.name)?;
        writeln!(f, "sex: {}", self.sex)?;
        write!(f, "birth_date: {}", display_date(self.birth_date))
    }
}

/// A card read from the applet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Card {
    Eid(EidCard),
    Sis(SisCard),
}

impl Card {
    pub fn validity(&self) -> &CardValidity {
        match self {
            Card::Eid(card) => card.validity(),
            Card::Sis(card) => card.validity(),
        }
    }

    pub fn card_number(&self) -> u64 {
        self.validity().card_number()
    }

    pub fn sex(&self) -> Sex {
        match self {
            Card::Eid(card) => card.sex(),
            Card::Sis(card) => card.sex(),
        }
    }

    pub fn as_eid(&self) -> Option<&EidCard> {
        match self {
            Card::Eid(card) => Some(card),
            Card::Sis(_) => None,
        }
    }

    pub fn as_sis(&self) -> Option<&SisCard> {
        match self {
            Card::Sis(card) => Some(card),
            Card::Eid(_) => None,
        }
    }
}

impl From<EidCard> for Card {
    fn from(card: EidCard) -> Self {
        Card::Eid(card)
    }
}

impl From<SisCard> for Card {
    fn from(card: SisCard) -> Self {
        Card::Sis(card)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Eid(card) => fmt::Display::fmt(card, f),
            Card::Sis(card) => fmt::Display::fmt(card, f),
        }
    }
}

// ============================================================================
// Helpers (internal)
// ============================================================================

fn display_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_default()
}

fn serialize_picture<S>(picture: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    match picture {
        Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}
