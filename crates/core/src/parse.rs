//! Field parsers.
//!
//! Each function converts one raw applet value into one typed value. A raw value is
//! `Option<&str>`: `None` means the applet returned nothing, which fails with
//! [`ParseError::MissingInput`]. A value of the wrong shape fails with
//! [`ParseError::InvalidFormat`].
//!
//! Lengths and positions are counted in characters, not bytes, so month names such as `MÄR`
//! keep their fixed-width layout.

use crate::card::{DocumentType, Sex, SpecialStatus};
use crate::error::{ParseError, ParseResult};
use chrono::NaiveDate;

/// Month names accepted in birth dates, in month order.
///
/// Matching is case-insensitive and looks for any alternative anywhere in the date string.
/// The first month with a match wins.
pub const BIRTH_MONTHS: [&[&str]; 12] = [
    &["jan"],
    &["feb", "fev"],
    &["maar", "mar", "mär", "mars"],
    &["apr", "avr"],
    &["mai", "mei"],
    &["juin", "jun"],
    &["juil", "jul"],
    &["aout", "aug"],
    &["sep", "sept"],
    &["oct", "okt"],
    &["nov"],
    &["dec", "dez"],
];

/// Wrap a raw value as an owned string. The empty string is valid.
pub fn parse_string(raw: Option<&str>) -> ParseResult<String> {
    raw.map(str::to_owned).ok_or(ParseError::MissingInput)
}

/// Parse a non-negative integer. A blank value reads as 0.
pub fn parse_number(raw: Option<&str>) -> ParseResult<u64> {
    let text = parse_string(raw)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| ParseError::invalid("number", &text))
}

/// Parse an eID validity date, `DD.MM.YYYY`.
///
/// A blank day or month defaults to 1.
pub fn parse_validity_date(raw: Option<&str>) -> ParseResult<NaiveDate> {
    let text = parse_string(raw)?;
    let chars: Vec<char> = text.chars().collect();
    if chars.len() != 10 {
        return Err(ParseError::invalid("validity date", &text));
    }

    let day = date_component(&chars[0..2], Some(1), &text)?;
    let month = date_component(&chars[3..5], Some(1), &text)?;
    let year = date_component(&chars[6..10], None, &text)?;
    calendar_date(year, month, day, &text)
}

/// Parse an eID birth date, `DD MMMM YYYY` (Dutch, French) or `DD.MMM.YYYY` (German).
///
/// The month is looked up in [`BIRTH_MONTHS`]; a string naming no known month is read as
/// January. A blank day defaults to 1.
pub fn parse_birth_date(raw: Option<&str>) -> ParseResult<NaiveDate> {
    let text = parse_string(raw)?;
    let chars: Vec<char> = text.chars().collect();
    let length = chars.len();
    if !(11..=12).contains(&length) {
        return Err(ParseError::invalid("birth date", &text));
    }

    let day = date_component(&chars[0..2], Some(1), &text)?;
    let month = birth_month(&text).unwrap_or(1);
    let year = date_component(&chars[length - 4..], None, &text)?;
    calendar_date(year, month, day, &text)
}

/// Month number (1-12) named in `text`, first match in table order.
pub fn birth_month(text: &str) -> Option<u32> {
    let lowered = text.to_lowercase();
    BIRTH_MONTHS
        .iter()
        .position(|names| names.iter().any(|name| lowered.contains(name)))
        .map(|index| index as u32 + 1)
}

/// Parse a SIS date, `dd/mm/yyyy`. No component may be blank.
pub fn parse_sis_date(raw: Option<&str>) -> ParseResult<NaiveDate> {
    let text = parse_string(raw)?;
    let chars: Vec<char> = text.chars().collect();
    if chars.len() != 10 {
        return Err(ParseError::invalid("SIS date", &text));
    }

    let day = date_component(&chars[0..2], None, &text)?;
    let month = date_component(&chars[3..5], None, &text)?;
    let year = date_component(&chars[6..10], None, &text)?;
    calendar_date(year, month, day, &text)
}

/// Parse a packed SIS social security number, `XXXXXX YYY ZZ`, into its 11 digits.
pub fn parse_social_security_number(raw: Option<&str>) -> ParseResult<u64> {
    let text = parse_string(raw)?;
    let chars: Vec<char> = text.chars().collect();
    if chars.len() != 13 {
        return Err(ParseError::invalid("social security number", &text));
    }

    let digits: String = chars[0..6]
        .iter()
        .chain(&chars[7..10])
        .chain(&chars[11..13])
        .collect();
    parse_number(Some(&digits))
}

/// eID sex: any of `F`, `V` or `W` (any case) means female, everything else male.
pub fn parse_eid_sex(raw: Option<&str>) -> ParseResult<Sex> {
    let text = parse_string(raw)?;
    let female = text
        .chars()
        .any(|c| matches!(c.to_ascii_uppercase(), 'F' | 'V' | 'W'));
    Ok(if female { Sex::Female } else { Sex::Male })
}

/// SIS sex: only the exact value `F` means female, everything else male. Stricter than
/// [`parse_eid_sex`].
///
/// The comparison is case-sensitive: a lower-case `f` reads as male, unlike readers that
/// upper-case the value before comparing.
pub fn parse_sis_sex(raw: Option<&str>) -> ParseResult<Sex> {
    let text = parse_string(raw)?;
    Ok(if text == "F" { Sex::Female } else { Sex::Male })
}

pub fn parse_document_type(raw: Option<&str>) -> ParseResult<DocumentType> {
    let code = parse_number(raw)?;
    DocumentType::from_code(code)
        .ok_or_else(|| ParseError::InvalidFormat(format!("unknown document type code {code}")))
}

pub fn parse_special_status(raw: Option<&str>) -> ParseResult<SpecialStatus> {
    let code = parse_number(raw)?;
    SpecialStatus::from_code(code)
        .ok_or_else(|| ParseError::InvalidFormat(format!("unknown special status code {code}")))
}

// ============================================================================
// Helpers (internal)
// ============================================================================

fn date_component(chars: &[char], default: Option<u32>, text: &str) -> ParseResult<u32> {
    let component: String = chars.iter().collect();
    let trimmed = component.trim();
    if trimmed.is_empty() {
        return default.ok_or_else(|| ParseError::invalid("date", text));
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| ParseError::invalid("date", text))
}

fn calendar_date(year: u32, month: u32, day: u32, text: &str) -> ParseResult<NaiveDate> {
    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(|| ParseError::invalid("date", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn string_requires_input() {
        assert_eq!(parse_string(Some("")).expect("empty is valid"), "");
        assert_eq!(parse_string(Some("Brussel")).expect("text"), "Brussel");
        assert_eq!(parse_string(None), Err(ParseError::MissingInput));
    }

    #[test]
    fn number_parses_digits_and_blank() {
        assert_eq!(parse_number(Some("73040102749")).expect("digits"), 73040102749);
        assert_eq!(parse_number(Some(" 1000 ")).expect("padded"), 1000);
        assert_eq!(parse_number(Some("")).expect("blank"), 0);
        assert_eq!(parse_number(None), Err(ParseError::MissingInput));

        match parse_number(Some("12a")) {
            Err(ParseError::InvalidFormat(msg)) => assert!(msg.contains("12a")),
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn validity_date_reproduces_components() {
        for (text, (y, m, d)) in [
            ("15.01.2010", (2010, 1, 15)),
            ("31.12.1999", (1999, 12, 31)),
            ("29.02.2024", (2024, 2, 29)),
        ] {
            let date = parse_validity_date(Some(text)).expect("valid date");
            assert_eq!(date, ymd(y, m, d));
            assert_eq!(date.format("%d.%m.%Y").to_string(), text);
        }
    }

    #[test]
    fn validity_date_defaults_blank_day_and_month() {
        let date = parse_validity_date(Some("  .  .2015")).expect("blank day and month");
        assert_eq!((date.day(), date.month(), date.year()), (1, 1, 2015));

        let date = parse_validity_date(Some("  .06.2015")).expect("blank day");
        assert_eq!(date, ymd(2015, 6, 1));
    }

    #[test]
    fn validity_date_rejects_bad_input() {
        assert_eq!(parse_validity_date(None), Err(ParseError::MissingInput));
        for text in ["", "1.1.2010", "15.01.20100", "2010-01-15x"] {
            assert!(
                matches!(
                    parse_validity_date(Some(text)),
                    Err(ParseError::InvalidFormat(_))
                ),
                "{text:?}"
            );
        }
        assert!(matches!(
            parse_validity_date(Some("31.02.2010")),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_validity_date(Some("15.01.    ")),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn birth_date_matches_every_month_variant() {
        let cases = [
            ("01 JAN 1980", 1),
            ("01 FEB 1980", 2),
            ("01 FEV 1980", 2),
            ("01 MAAR 1980", 3),
            ("01 MARS 1980", 3),
            ("01.MÄR.1980", 3),
            ("01 APR 1980", 4),
            ("01 AVR 1980", 4),
            ("01 MEI 1980", 5),
            ("01 MAI 1980", 5),
            ("01 JUIN 1980", 6),
            ("01 JUN 1980", 6),
            ("01 JUIL 1980", 7),
            ("01 JUL 1980", 7),
            ("01 AOUT 1980", 8),
            ("01 AUG 1980", 8),
            ("01 SEPT 1980", 9),
            ("01.SEP.1980", 9),
            ("01 OCT 1980", 10),
            ("01.OKT.1980", 10),
            ("01 NOV 1980", 11),
            ("01 DEC 1980", 12),
            ("01.DEZ.1980", 12),
        ];

        for (text, month) in cases {
            let date = parse_birth_date(Some(text)).expect(text);
            assert_eq!(date, ymd(1980, month, 1), "{text}");
        }
    }

    #[test]
    fn birth_month_is_case_insensitive_and_first_match_wins() {
        assert_eq!(birth_month("12 maart 1980"), Some(3));
        assert_eq!(birth_month("12 Juin 1980"), Some(6));
        // "jan" is checked before "dec"
        assert_eq!(birth_month("jan dec"), Some(1));
        assert_eq!(birth_month("12 XYZ 1980"), None);
    }

    #[test]
    fn birth_date_uses_trailing_year_and_defaults() {
        assert_eq!(
            parse_birth_date(Some("23 SEPT 1975")).expect("12 chars"),
            ymd(1975, 9, 23)
        );
        assert_eq!(
            parse_birth_date(Some("   JUL  1975")).expect("blank day"),
            ymd(1975, 7, 1)
        );
        assert_eq!(
            parse_birth_date(Some("05 XXX  1975")).expect("unknown month"),
            ymd(1975, 1, 5)
        );
    }

    #[test]
    fn birth_date_rejects_bad_input() {
        assert_eq!(parse_birth_date(None), Err(ParseError::MissingInput));
        for text in ["1 JAN 1980", "01 JANUARY 1980", ""] {
            assert!(
                matches!(
                    parse_birth_date(Some(text)),
                    Err(ParseError::InvalidFormat(_))
                ),
                "{text:?}"
            );
        }
    }

    #[test]
    fn sis_date_requires_all_components() {
        assert_eq!(
            parse_sis_date(Some("03/04/1975")).expect("valid"),
            ymd(1975, 4, 3)
        );
        assert_eq!(parse_sis_date(None), Err(ParseError::MissingInput));
        assert!(matches!(
            parse_sis_date(Some("  /04/1975")),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_sis_date(Some("3/4/1975")),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn social_security_number_unpacks_digits() {
        assert_eq!(
            parse_social_security_number(Some("123456 789 01")).expect("packed"),
            12345678901
        );
        assert_eq!(
            parse_social_security_number(None),
            Err(ParseError::MissingInput)
        );
        for text in ["12345678901", "123456 789 012", "123456 789 0", ""] {
            assert!(
                matches!(
                    parse_social_security_number(Some(text)),
                    Err(ParseError::InvalidFormat(_))
                ),
                "{text:?}"
            );
        }
        assert!(matches!(
            parse_social_security_number(Some("12345A 789 01")),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn eid_sex_accepts_female_letters_in_any_case() {
        for text in ["F", "f", "V", "v", "W", "w"] {
            assert_eq!(parse_eid_sex(Some(text)).expect(text), Sex::Female);
        }
        for text in ["M", "m", "", "X"] {
            assert_eq!(parse_eid_sex(Some(text)).expect(text), Sex::Male);
        }
        assert_eq!(parse_eid_sex(None), Err(ParseError::MissingInput));
    }

    #[test]
    fn sis_sex_only_accepts_exact_f() {
        assert_eq!(parse_sis_sex(Some("F")).expect("F"), Sex::Female);
        for text in ["f", "V", "W", "M", "", "FF"] {
            assert_eq!(parse_sis_sex(Some(text)).expect(text), Sex::Male);
        }
        assert_eq!(parse_sis_sex(None), Err(ParseError::MissingInput));
    }

    #[test]
    fn coded_fields_map_known_codes_only() {
        assert_eq!(
            parse_document_type(Some("7")).expect("bootstrap"),
            DocumentType::BootstrapCard
        );
        assert_eq!(
            parse_special_status(Some("3")).expect("status"),
            SpecialStatus::WhiteCaneAndExtendedMinority
        );
        assert!(matches!(
            parse_document_type(Some("5")),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_special_status(Some("6")),
            Err(ParseError::InvalidFormat(_))
        ));
    }
}
