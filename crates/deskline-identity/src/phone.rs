// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number canonicalization.
//!
//! Two strictness levels coexist. [`normalize_simple`] only rewrites an
//! international `00` prefix and is used wherever a stored number is looked
//! up. [`normalize_e164`] fully parses the number and is used when a number
//! is written by the user upsert.

use deskline_core::DesklineError;
use phonenumber::country::Id as Region;

/// Replace a leading `00` with `+`. Anything else passes through untouched.
pub fn normalize_simple(raw: &str) -> String {
    match raw.strip_prefix("00") {
        Some(rest) => format!("+{rest}"),
        None => raw.to_string(),
    }
}

/// Parse `raw` and format it as E.164 (`+<country><subscriber>`).
///
/// Input starting with `+` or `00` carries its own country code; anything
/// else is read as a national number in `default_region`. Fails with
/// [`DesklineError::InvalidPhoneFormat`] when the input does not parse or
/// is not a valid number for its region.
pub fn normalize_e164(raw: &str, default_region: Region) -> Result<String, DesklineError> {
    let trimmed = raw.trim();
    let invalid = || DesklineError::InvalidPhoneFormat {
        input: raw.to_string(),
    };

    let (candidate, region) = if trimmed.starts_with('+') || trimmed.starts_with("00") {
        (normalize_simple(trimmed), None)
    } else {
        (trimmed.to_string(), Some(default_region))
    };

    let number = phonenumber::parse(region, &candidate).map_err(|_| invalid())?;
    if !phonenumber::is_valid(&number) {
        return Err(invalid());
    }
    Ok(number.format().mode(phonenumber::Mode::E164).to_string())
}

/// Parse an ISO 3166 alpha-2 region code such as `BD`.
pub fn parse_region(code: &str) -> Result<Region, DesklineError> {
    code.trim()
        .to_ascii_uppercase()
        .parse::<Region>()
        .map_err(|_| DesklineError::Config(format!("unknown phone region `{code}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bd() -> Region {
        parse_region("BD").unwrap()
    }

    #[test]
    fn simple_rewrites_double_zero() {
        assert_eq!(normalize_simple("008801711111111"), "+8801711111111");
        assert_eq!(normalize_simple("+8801711111111"), "+8801711111111");
        assert_eq!(normalize_simple("01711111111"), "01711111111");
        assert_eq!(normalize_simple("0"), "0");
        assert_eq!(normalize_simple(""), "");
        assert_eq!(normalize_simple("00"), "+");
    }

    #[test]
    fn e164_applies_default_region_to_national_numbers() {
        assert_eq!(normalize_e164("01711111111", bd()).unwrap(), "+8801711111111");
        assert_eq!(
            normalize_e164("  01711111111 ", bd()).unwrap(),
            "+8801711111111"
        );
    }

    #[test]
    fn e164_reads_country_from_international_prefix() {
        assert_eq!(normalize_e164("+8801711111111", bd()).unwrap(), "+8801711111111");
        assert_eq!(normalize_e164("008801711111111", bd()).unwrap(), "+8801711111111");
        assert_eq!(normalize_e164("+1 650-253-0000", bd()).unwrap(), "+16502530000");
    }

    #[test]
    fn e164_rejects_garbage_and_invalid_numbers() {
        for input in ["abc", "", "+", "123", "+999 123"] {
            let err = normalize_e164(input, bd()).unwrap_err();
            assert!(
                matches!(&err, DesklineError::InvalidPhoneFormat { input: i } if i == input),
                "input {input:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn region_codes_parse_case_insensitively() {
        assert_eq!(parse_region("bd").unwrap(), bd());
        assert!(parse_region("ZZ").is_err());
    }

    proptest! {
        #[test]
        fn double_zero_prefix_becomes_plus(rest in "\\PC*") {
            let raw = format!("00{rest}");
            prop_assert_eq!(normalize_simple(&raw), format!("+{rest}"));
        }

        #[test]
        fn other_inputs_pass_through(raw in "\\PC*") {
            prop_assume!(!raw.starts_with("00"));
            prop_assert_eq!(normalize_simple(&raw), raw);
        }
    }
}
