/*!
The date/time/duration family: `date`, `time`, `dateTime`, `duration`, and the partial-date
`gYear`, `gMonth`, `gDay`, `gYearMonth`, `gMonthDay` types.
*/
#![allow(non_camel_case_types)]
use super::XsdValue;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use oldap_errors::{value_error, Result};
use regex::Regex;
use std::fmt::{Debug, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! regex_validated {
    ($name:ident, $qname:literal, $re:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl XsdValue for $name {
            const DATATYPE_QNAME: &'static str = $qname;

            fn new(raw: impl Into<String>, validate: bool) -> Result<Self> {
                let raw = raw.into();
                lazy_static! {
                    static ref RE: Regex = Regex::new($re).expect("valid regex");
                }
                if validate && !RE.is_match(&raw) {
                    return Err(value_error(format!("'{raw}' is not a valid {}", $qname)));
                }
                Ok(Self(raw))
            }

            fn lexical_value(&self) -> String {
                self.0.clone()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

regex_validated!(
    Xsd_gYear,
    "xsd:gYear",
    r"^-?\d{4,}(Z|[+\-]\d{2}:\d{2})?$",
    "`xsd:gYear`."
);
regex_validated!(
    Xsd_gMonth,
    "xsd:gMonth",
    r"^--\d{2}(Z|[+\-]\d{2}:\d{2})?$",
    "`xsd:gMonth`."
);
regex_validated!(
    Xsd_gDay,
    "xsd:gDay",
    r"^---\d{2}(Z|[+\-]\d{2}:\d{2})?$",
    "`xsd:gDay`."
);
regex_validated!(
    Xsd_gYearMonth,
    "xsd:gYearMonth",
    r"^-?\d{4,}-\d{2}(Z|[+\-]\d{2}:\d{2})?$",
    "`xsd:gYearMonth`."
);
regex_validated!(
    Xsd_gMonthDay,
    "xsd:gMonthDay",
    r"^--\d{2}-\d{2}(Z|[+\-]\d{2}:\d{2})?$",
    "`xsd:gMonthDay`."
);
regex_validated!(
    Xsd_duration,
    "xsd:duration",
    r"^-?P(\d+Y)?(\d+M)?(\d+D)?(T(\d+H)?(\d+M)?(\d+(\.\d+)?S)?)?$",
    "`xsd:duration` — ISO 8601 duration form `PnYnMnDTnHnMnS`."
);

// ------------------------------------------------------------------------------------------------
// Public Types ❱ Xsd_date
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Xsd_date(NaiveDate);

impl Xsd_date {
    pub fn value(&self) -> NaiveDate {
        self.0
    }
}

impl XsdValue for Xsd_date {
    const DATATYPE_QNAME: &'static str = "xsd:date";

    fn new(raw: impl Into<String>, _validate: bool) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim_end_matches('Z');
        let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map_err(|e| value_error(format!("'{raw}' is not a valid xsd:date: {e}")))?;
        Ok(Self(parsed))
    }

    fn lexical_value(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl Display for Xsd_date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexical_value())
    }
}

// ------------------------------------------------------------------------------------------------
// Public Types ❱ Xsd_time
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Xsd_time(NaiveTime);

impl Xsd_time {
    pub fn value(&self) -> NaiveTime {
        self.0
    }
}

impl XsdValue for Xsd_time {
    const DATATYPE_QNAME: &'static str = "xsd:time";

    fn new(raw: impl Into<String>, _validate: bool) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim_end_matches('Z');
        let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map_err(|e| value_error(format!("'{raw}' is not a valid xsd:time: {e}")))?;
        Ok(Self(parsed))
    }

    fn lexical_value(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }
}

impl Display for Xsd_time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexical_value())
    }
}

// ------------------------------------------------------------------------------------------------
// Public Types ❱ Xsd_dateTime
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Xsd_dateTime(DateTime<FixedOffset>);

impl Xsd_dateTime {
    pub fn value(&self) -> DateTime<FixedOffset> {
        self.0
    }

    pub fn now() -> Self {
        Self(chrono::Utc::now().into())
    }
}

impl XsdValue for Xsd_dateTime {
    const DATATYPE_QNAME: &'static str = "xsd:dateTime";

    fn new(raw: impl Into<String>, _validate: bool) -> Result<Self> {
        let raw = raw.into();
        let parsed = DateTime::parse_from_rfc3339(&raw)
            .map_err(|e| value_error(format!("'{raw}' is not a valid xsd:dateTime: {e}")))?;
        Ok(Self(parsed))
    }

    fn lexical_value(&self) -> String {
        self.0.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }
}

impl Display for Xsd_dateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexical_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_round_trips() {
        let d = Xsd_date::new("2024-03-14", true).unwrap();
        assert_eq!(d.lexical_value(), "2024-03-14");
    }

    #[test]
    fn datetime_round_trips_through_rfc3339() {
        let dt = Xsd_dateTime::new("2024-03-14T09:30:00Z", true).unwrap();
        assert_eq!(dt.lexical_value(), "2024-03-14T09:30:00Z");
    }

    #[test]
    fn duration_accepts_iso8601_form() {
        assert!(Xsd_duration::new("P1Y2M3DT4H5M6S", true).is_ok());
        assert!(Xsd_duration::new("not-a-duration", true).is_err());
    }

    #[test]
    fn gyear_accepts_negative_years() {
        assert!(Xsd_gYear::new("-0044", true).is_ok());
    }
}
