//! ISO-8601 duration parsing, restricted to the `H`/`M`/`S` components a row
//! TTL literal uses (e.g. `PT1H30M`, `PT20M`, `PT45S`).

use std::time::Duration;

use regex::Regex;

/// Parses an ISO-8601-ish duration string by summing every `(\d+)([HMS])`
/// substring it contains, in order of appearance. Unlike a full ISO-8601
/// parser this does not validate the `P`/`T` designators or component
/// ordering -- it just harvests every matching run, the same tolerant
/// behavior the source's regex-based parser has.
///
/// Returns an error if no component matches at all.
pub fn parse_iso8601_duration(text: &str) -> Result<Duration, DurationParseError> {
    let re = Regex::new(r"(\d+)([HMS])").expect("static regex is valid");
    let mut total = Duration::ZERO;
    let mut matched = false;

    for caps in re.captures_iter(text) {
        matched = true;
        let value: u64 = caps[1]
            .parse()
            .map_err(|_| DurationParseError::InvalidNumber(caps[1].to_string()))?;
        let unit = &caps[2];
        let component = match unit {
            "H" => Duration::from_secs(value * 3600),
            "M" => Duration::from_secs(value * 60),
            "S" => Duration::from_secs(value),
            _ => unreachable!("regex only captures H, M, or S"),
        };
        total += component;
    }

    if !matched {
        return Err(DurationParseError::NoMatch(text.to_string()));
    }
    Ok(total)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("could not parse ISO-8601 duration: {0:?}")]
    NoMatch(String),
    #[error("invalid numeric component {0:?} in duration")]
    InvalidNumber(String),
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(
            parse_iso8601_duration("PT1H30M").unwrap(),
            Duration::from_secs(3600 + 30 * 60)
        );
    }

    #[test]
    fn parses_minutes_only() {
        assert_eq!(parse_iso8601_duration("PT20M").unwrap(), Duration::from_secs(20 * 60));
    }

    #[test]
    fn parses_seconds_only() {
        assert_eq!(parse_iso8601_duration("PT45S").unwrap(), Duration::from_secs(45));
    }

    #[test]
    fn parses_seconds_only_one() {
        assert_eq!(parse_iso8601_duration("PT1S").unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn no_match_is_an_error() {
        assert!(parse_iso8601_duration("not-a-duration").is_err());
    }

    #[test]
    fn accumulates_repeated_components() {
        // Not strictly valid ISO-8601 but the tolerant regex-based parser sums
        // every match it finds, matching the source's behavior.
        assert_eq!(
            parse_iso8601_duration("PT1H1H").unwrap(),
            Duration::from_secs(7200)
        );
    }

    proptest::proptest! {
        #[test]
        fn sums_hours_minutes_seconds_in_any_combination(h in 0_u64..100, m in 0_u64..100, s in 0_u64..100) {
            let text = format!("PT{h}H{m}M{s}S");
            let parsed = parse_iso8601_duration(&text).unwrap();
            prop_assert_eq!(parsed, Duration::from_secs(h * 3600 + m * 60 + s));
        }
    }
}
