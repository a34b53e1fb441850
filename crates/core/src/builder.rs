//! Card builders.
//!
//! A builder owns one in-progress record and assembles it field by field. Every setter parses
//! its raw value and assigns it on success. On failure the field keeps its default and the
//! failure goes no further than a debug log line: one malformed field never prevents the rest
//! of the card from being read.

use crate::applet::CardField;
use crate::card::{EidCard, SisCard};
use crate::error::ParseResult;
use crate::parse;

/// Keep a parsed value, or drop the failure and report `None`.
fn accept<T>(field: CardField, result: ParseResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("ignoring {field}: {e}");
            None
        }
    }
}

/// Assembles an [`EidCard`] from raw applet values.
#[derive(Clone, Debug, Default)]
pub struct EidCardBuilder {
    card: EidCard,
}

impl EidCardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a raw value to the setter for `field`. Fields an eID card does not carry
    /// (initials) are ignored.
    pub fn set_field(&mut self, field: CardField, raw: Option<&str>) -> &mut Self {
        match field {
            CardField::CardNumber => self.set_card_number(raw),
            CardField::ChipNumber => self.set_chip_number(raw),
            CardField::ValidityDateBegin => self.set_validity_date_begin(raw),
            CardField::ValidityDateEnd => self.set_validity_date_end(raw),
            CardField::IssMunicipality => self.set_issuing_municipality(raw),
            CardField::NationalNumber => self.set_national_number(raw),
            CardField::Surname => self.set_surname(raw),
            CardField::FirstName => self.set_first_name(raw),
            CardField::Nationality => self.set_nationality(raw),
            CardField::BirthLocation => self.set_birth_location(raw),
            CardField::BirthDate => self.set_birth_date(raw),
            CardField::Sex => self.set_sex(raw),
            CardField::NobleCondition => self.set_noble_condition(raw),
            CardField::DocumentType => self.set_document_type(raw),
            CardField::SpecialStatus => self.set_special_status(raw),
            CardField::Street => self.set_street(raw),
            CardField::StreetNumber => self.set_street_number(raw),
            CardField::BoxNumber => self.set_box_number(raw),
            CardField::Zip => self.set_zip(raw),
            CardField::Municipality => self.set_municipality(raw),
            CardField::Country => self.set_country(raw),
            CardField::Initials => self,
        }
    }

    pub fn set_card_number(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(number) = accept(CardField::CardNumber, parse::parse_number(raw)) {
            self.card.validity_mut().set_card_number(number);
        }
        self
    }

    pub fn set_chip_number(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(chip_number) = accept(CardField::ChipNumber, parse::parse_string(raw)) {
            self.card.set_chip_number(chip_number);
        }
        self
    }

    pub fn set_validity_date_begin(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(date) = accept(
            CardField::ValidityDateBegin,
            parse::parse_validity_date(raw),
        ) {
            self.card.validity_mut().set_validity_begin_date(date);
        }
        self
    }

    pub fn set_validity_date_end(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(date) = accept(CardField::ValidityDateEnd, parse::parse_validity_date(raw)) {
            self.card.validity_mut().set_validity_end_date(date);
        }
        self
    }

    pub fn set_issuing_municipality(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(municipality) = accept(CardField::IssMunicipality, parse::parse_string(raw)) {
            self.card.set_issuing_municipality(municipality);
        }
        self
    }

    pub fn set_national_number(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(number) = accept(CardField::NationalNumber, parse::parse_number(raw)) {
            self.card.set_national_number(number);
        }
        self
    }

    pub fn set_surname(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(surname) = accept(CardField::Surname, parse::parse_string(raw)) {
            self.card.set_surname(surname);
        }
        self
    }

    /// All first names as one string; the legacy second and third first names stay empty.
    pub fn set_first_name(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(first_name) = accept(CardField::FirstName, parse::parse_string(raw)) {
            self.card.set_first_name(first_name);
        }
        self
    }

    pub fn set_nationality(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(nationality) = accept(CardField::Nationality, parse::parse_string(raw)) {
            self.card.set_nationality(nationality);
        }
        self
    }

    pub fn set_birth_location(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(location) = accept(CardField::BirthLocation, parse::parse_string(raw)) {
            self.card.set_birth_location(location);
        }
        self
    }

    pub fn set_birth_date(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(date) = accept(CardField::BirthDate, parse::parse_birth_date(raw)) {
            self.card.set_birth_date(date);
        }
        self
    }

    pub fn set_sex(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(sex) = accept(CardField::Sex, parse::parse_eid_sex(raw)) {
            self.card.set_sex(sex);
        }
        self
    }

    pub fn set_noble_condition(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(condition) = accept(CardField::NobleCondition, parse::parse_string(raw)) {
            self.card.set_noble_condition(condition);
        }
        self
    }

    pub fn set_document_type(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(document_type) = accept(CardField::DocumentType, parse::parse_document_type(raw))
        {
            self.card.set_document_type(document_type);
        }
        self
    }

    pub fn set_special_status(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(status) = accept(CardField::SpecialStatus, parse::parse_special_status(raw)) {
            self.card.set_special_status(status);
        }
        self
    }

    pub fn set_street(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(street) = accept(CardField::Street, parse::parse_string(raw)) {
            self.card.set_street(street);
        }
        self
    }

    pub fn set_street_number(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(number) = accept(CardField::StreetNumber, parse::parse_string(raw)) {
            self.card.set_street_number(number);
        }
        self
    }

    pub fn set_box_number(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(number) = accept(CardField::BoxNumber, parse::parse_string(raw)) {
            self.card.set_box_number(number);
        }
        self
    }

    pub fn set_zip(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(zip) = accept(CardField::Zip, parse::parse_number(raw)) {
            self.card.set_zip_code(zip);
        }
        self
    }

    pub fn set_municipality(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(municipality) = accept(CardField::Municipality, parse::parse_string(raw)) {
            self.card.set_municipality(municipality);
        }
        self
    }

    pub fn set_country(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(country) = accept(CardField::Country, parse::parse_string(raw)) {
            self.card.set_country(country);
        }
        self
    }

    pub fn set_picture(&mut self, picture: Option<Vec<u8>>) -> &mut Self {
        self.card.set_picture(picture);
        self
    }

    pub fn card(&self) -> &EidCard {
        &self.card
    }

    pub fn build(self) -> EidCard {
        self.card
    }
}

/// Assembles a [`SisCard`] from raw applet values.
///
/// The applet exposes the SIS social security number through its national number getter and
/// the first names through its first name getter.
#[derive(Clone, Debug, Default)]
pub struct SisCardBuilder {
    card: SisCard,
}

impl SisCardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a raw value to the setter for `field`. Fields a SIS card does not carry are
    /// ignored.
    pub fn set_field(&mut self, field: CardField, raw: Option<&str>) -> &mut Self {
        match field {
            CardField::CardNumber => self.set_card_number(raw),
            CardField::ValidityDateBegin => self.set_validity_date_begin(raw),
            CardField::ValidityDateEnd => self.set_validity_date_end(raw),
            CardField::NationalNumber => self.set_social_security_number(raw),
            CardField::Surname => self.set_surname(raw),
            CardField::FirstName => self.set_name(raw),
            CardField::Initials => self.set_initials(raw),
            CardField::BirthDate => self.set_birth_date(raw),
            CardField::Sex => self.set_sex(raw),
            _ => self,
        }
    }

    pub fn set_card_number(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(number) = accept(CardField::CardNumber, parse::parse_number(raw)) {
            self.card.validity_mut().set_card_number(number);
        }
        self
    }

    pub fn set_validity_date_begin(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(date) = accept(CardField::ValidityDateBegin, parse::parse_sis_date(raw)) {
            self.card.validity_mut().set_validity_begin_date(date);
        }
        self
    }

    pub fn set_validity_date_end(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(date) = accept(CardField::ValidityDateEnd, parse::parse_sis_date(raw)) {
            self.card.validity_mut().set_validity_end_date(date);
        }
        self
    }

    pub fn set_social_security_number(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(number) = accept(
            CardField::NationalNumber,
            parse::parse_social_security_number(raw),
        ) {
            self.card.set_social_security_number(number);
        }
        self
    }

    pub fn set_surname(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(surname) = accept(CardField::Surname, parse::parse_string(raw)) {
            self.card.set_surname(surname);
        }
        self
    }

    pub fn set_name(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(name) = accept(CardField::FirstName, parse::parse_string(raw)) {
            self.card.set_name(name);
        }
        self
    }

    pub fn set_initials(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(initials) = accept(CardField::Initials, parse::parse_string(raw)) {
            self.card.set_initials(initials);
        }
        self
    }

    pub fn set_birth_date(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(date) = accept(CardField::BirthDate, parse::parse_sis_date(raw)) {
            self.card.set_birth_date(date);
        }
        self
    }

    pub fn set_sex(&mut self, raw: Option<&str>) -> &mut Self {
        if let Some(sex) = accept(CardField::Sex, parse::parse_sis_sex(raw)) {
            self.card.set_sex(sex);
        }
        self
    }

    pub fn card(&self) -> &SisCard {
        &self.card
    }

    pub fn build(self) -> SisCard {
        self.card
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{DocumentType, Sex, SpecialStatus};
    use chrono::NaiveDate;

    #[test]
    fn eid_builder_assigns_parsed_fields() {
        let mut builder = EidCardBuilder::new();
        builder
            .set_card_number(Some("591234567890"))
            .set_chip_number(Some("534C4750"))
            .set_validity_date_begin(Some("15.01.2010"))
            .set_birth_date(Some("23 SEPT 1975"))
            .set_sex(Some("V"))
            .set_document_type(Some("1"))
            .set_special_status(Some("4"))
            .set_zip(Some("3000"))
            .set_picture(Some(vec![0xFF, 0xD8]));

        let card = builder.build();
        assert_eq!(card.card_number(), 591234567890);
        assert_eq!(card.chip_number(), "534C4750");
        assert_eq!(
            card.validity_begin_date(),
            NaiveDate::from_ymd_opt(2010, 1, 15)
        );
        assert_eq!(card.birth_date(), NaiveDate::from_ymd_opt(1975, 9, 23));
        assert_eq!(card.sex(), Sex::Female);
        assert_eq!(card.document_type(), DocumentType::BelgianCitizen);
        assert_eq!(card.special_status(), SpecialStatus::YellowCane);
        assert!(card.yellow_cane());
        assert_eq!(card.zip_code(), 3000);
        assert_eq!(card.picture(), Some(&[0xFF, 0xD8][..]));
    }

    #[test]
    fn eid_builder_keeps_defaults_for_bad_values() {
        let mut builder = EidCardBuilder::new();
        builder
            .set_surname(Some("Peeters"))
            .set_national_number(Some("73040102749"));

        builder
            .set_card_number(Some("not a number"))
            .set_validity_date_end(Some("2010"))
            .set_birth_date(None)
            .set_special_status(Some("9"))
            .set_document_type(Some("x"))
            .set_noble_condition(None)
            .set_zip(Some("B-3000"));

        let card = builder.card();
        assert_eq!(card.card_number(), 0);
        assert!(card.validity_end_date().is_none());
        assert!(card.birth_date().is_none());
        assert_eq!(card.special_status(), SpecialStatus::NoStatus);
        assert!(!card.white_cane() && !card.yellow_cane() && !card.extended_minority());
        assert_eq!(card.document_type(), DocumentType::Undefined);
        assert_eq!(card.noble_condition(), "");
        assert_eq!(card.zip_code(), 0);
        assert_eq!(card.surname(), "Peeters");
        assert_eq!(card.national_number(), 73040102749);
    }

    #[test]
    fn eid_bad_value_does_not_clear_earlier_value() {
        let mut builder = EidCardBuilder::new();
        builder.set_birth_date(Some("01 JAN 1980"));
        builder.set_birth_date(Some("garbage"));
        assert_eq!(
            builder.card().birth_date(),
            NaiveDate::from_ymd_opt(1980, 1, 1)
        );
    }

    #[test]
    fn eid_legacy_first_names_stay_empty() {
        let mut builder = EidCardBuilder::new();
        builder.set_field(CardField::FirstName, Some("Pieter Jan"));
        builder.set_field(CardField::Initials, Some("P"));

        let card = builder.build();
        assert_eq!(card.first_name(), "Pieter Jan");
        assert_eq!(card.first_name_2(), "");
        assert_eq!(card.first_name_3(), "");
    }

    #[test]
    fn sis_builder_decodes_fields() {
        let mut builder = SisCardBuilder::new();
        for (field, raw) in [
            (CardField::CardNumber, "1234567890"),
            (CardField::ValidityDateBegin, "01/02/2003"),
            (CardField::ValidityDateEnd, "01/02/2013"),
            (CardField::NationalNumber, "123456 789 01"),
            (CardField::Surname, "Janssens"),
            (CardField::FirstName, "Marie Louise"),
            (CardField::Initials, "M"),
            (CardField::BirthDate, "03/04/1975"),
            (CardField::Sex, "F"),
        ] {
            builder.set_field(field, Some(raw));
        }

        let card = builder.build();
        assert_eq!(card.card_number(), 1234567890);
        assert_eq!(card.validity_begin_date(), NaiveDate::from_ymd_opt(2003, 2, 1));
        assert_eq!(card.validity_end_date(), NaiveDate::from_ymd_opt(2013, 2, 1));
        assert_eq!(card.social_security_number(), 12345678901);
        assert_eq!(card.surname(), "Janssens");
        assert_eq!(card.name(), "Marie Louise");
        assert_eq!(card.initials(), "M");
        assert_eq!(card.birth_date(), NaiveDate::from_ymd_opt(1975, 4, 3));
        assert!(card.is_female());
    }

    #[test]
    fn sis_builder_swallows_bad_values() {
        let mut builder = SisCardBuilder::new();
        builder.set_surname(Some("Janssens"));
        builder
            .set_social_security_number(Some("12345678901"))
            .set_birth_date(Some("03.04.75"))
            .set_sex(Some("v"))
            .set_initials(None);

        let card = builder.card();
        assert_eq!(card.social_security_number(), 0);
        assert!(card.birth_date().is_none());
        assert!(card.is_male());
        assert_eq!(card.initials(), "");
        assert_eq!(card.surname(), "Janssens");
    }
}
