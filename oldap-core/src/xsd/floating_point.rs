/*!
The floating-point-kind XSD datatypes: `float`, `double`, `decimal`. §4.1: "Floating-point
supports `NaN`, `INF`, `-INF` in RDF lexical form."
*/
#![allow(non_camel_case_types)]
use super::XsdValue;
use oldap_errors::{value_error, Result};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use std::fmt::{Debug, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! float_kind {
    ($name:ident, $inner:ty, $qname:literal) => {
        #[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(OrderedFloat<$inner>);

        impl $name {
            pub fn value(&self) -> $inner {
                self.0 .0
            }
        }

        impl XsdValue for $name {
            const DATATYPE_QNAME: &'static str = $qname;

            fn new(raw: impl Into<String>, _validate: bool) -> Result<Self> {
                let raw = raw.into();
                let parsed: $inner = match raw.trim() {
                    "NaN" => <$inner>::NAN,
                    "INF" | "+INF" | "Infinity" => <$inner>::INFINITY,
                    "-INF" | "-Infinity" => <$inner>::NEG_INFINITY,
                    other => other
                        .parse()
                        .map_err(|_| value_error(format!("'{other}' is not a valid {}", $qname)))?,
                };
                Ok(Self(OrderedFloat(parsed)))
            }

            fn lexical_value(&self) -> String {
                let v = self.value();
                if v.is_nan() {
                    "NaN".to_string()
                } else if v.is_infinite() {
                    if v > 0.0 {
                        "INF".to_string()
                    } else {
                        "-INF".to_string()
                    }
                } else {
                    v.to_string()
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.lexical_value())
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(OrderedFloat(value))
            }
        }
    };
}

float_kind!(Xsd_float, f32, "xsd:float");
float_kind!(Xsd_double, f64, "xsd:double");

/// `xsd:decimal` — arbitrary-precision fixed-point, backed by `rust_decimal::Decimal`. Unlike
/// `float`/`double` it has no `NaN`/`INF` lexical forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Xsd_decimal(Decimal);

impl Xsd_decimal {
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl XsdValue for Xsd_decimal {
    const DATATYPE_QNAME: &'static str = "xsd:decimal";

    fn new(raw: impl Into<String>, _validate: bool) -> Result<Self> {
        let raw = raw.into();
        let parsed = Decimal::from_str(raw.trim())
            .map_err(|_| value_error(format!("'{raw}' is not a valid xsd:decimal")))?;
        Ok(Self(parsed))
    }

    fn lexical_value(&self) -> String {
        self.0.to_string()
    }
}

impl Display for Xsd_decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Xsd_decimal {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_parses_special_lexical_forms() {
        assert!(Xsd_double::new("NaN", true).unwrap().value().is_nan());
        assert_eq!(
            Xsd_double::new("INF", true).unwrap().value(),
            f64::INFINITY
        );
        assert_eq!(
            Xsd_double::new("-INF", true).unwrap().value(),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn double_round_trips_special_forms_through_lexical_value() {
        let v = Xsd_double::new("INF", true).unwrap();
        assert_eq!(v.lexical_value(), "INF");
        let v = Xsd_double::new("NaN", true).unwrap();
        assert_eq!(v.lexical_value(), "NaN");
    }

    #[test]
    fn decimal_round_trips() {
        let v = Xsd_decimal::new("3.14", true).unwrap();
        assert_eq!(v.to_rdf(), "\"3.14\"^^xsd:decimal");
    }
}
