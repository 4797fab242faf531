/*!
The integer-kind XSD datatypes: `byte`, `short`, `int`, `long`, `integer`, and their unsigned and
non-negative/non-positive/negative/positive-bounded variants, per §4.1 ("Integer ranges … are
enforced").
*/
#![allow(non_camel_case_types)]
use super::XsdValue;
use oldap_errors::{value_error, Result};
use std::fmt::{Debug, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! int_kind {
    ($name:ident, $inner:ty, $qname:literal, $check:expr) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name($inner);

        impl $name {
            pub fn value(&self) -> $inner {
                self.0
            }
        }

        impl XsdValue for $name {
            const DATATYPE_QNAME: &'static str = $qname;

            fn new(raw: impl Into<String>, validate: bool) -> Result<Self> {
                let raw = raw.into();
                let parsed: $inner = raw.trim().parse().map_err(|_| {
                    value_error(format!("'{raw}' is not a valid {}", $qname))
                })?;
                if validate {
                    let check: fn($inner) -> bool = $check;
                    if !check(parsed) {
                        return Err(value_error(format!(
                            "{parsed} is out of range for {}",
                            $qname
                        )));
                    }
                }
                Ok(Self(parsed))
            }

            fn lexical_value(&self) -> String {
                self.0.to_string()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl $name {
            /// Construct directly from a native value, applying the same range check as `new`.
            pub fn from_value(value: $inner, validate: bool) -> Result<Self> {
                if validate {
                    let check: fn($inner) -> bool = $check;
                    if !check(value) {
                        return Err(value_error(format!(
                            "{value} is out of range for {}",
                            $qname
                        )));
                    }
                }
                Ok(Self(value))
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

int_kind!(Xsd_byte, i64, "xsd:byte", |v| (-128..=127).contains(&v));
int_kind!(Xsd_short, i64, "xsd:short", |v| (-32768..=32767).contains(&v));
int_kind!(Xsd_int, i64, "xsd:int", |v| {
    (i32::MIN as i64..=i32::MAX as i64).contains(&v)
});
int_kind!(Xsd_long, i64, "xsd:long", |_v| true);
int_kind!(Xsd_integer, i128, "xsd:integer", |_v| true);
int_kind!(Xsd_unsignedByte, i64, "xsd:unsignedByte", |v| (0..=255).contains(&v));
int_kind!(Xsd_unsignedShort, i64, "xsd:unsignedShort", |v| (0..=65535)
    .contains(&v));
int_kind!(Xsd_unsignedInt, i64, "xsd:unsignedInt", |v| {
    (0..=u32::MAX as i64).contains(&v)
});
int_kind!(Xsd_unsignedLong, i128, "xsd:unsignedLong", |v: i128| v >= 0);
int_kind!(Xsd_nonNegativeInteger, i128, "xsd:nonNegativeInteger", |v: i128| {
    v >= 0
});
int_kind!(Xsd_nonPositiveInteger, i128, "xsd:nonPositiveInteger", |v: i128| {
    v <= 0
});
int_kind!(Xsd_negativeInteger, i128, "xsd:negativeInteger", |v: i128| v < 0);
int_kind!(Xsd_positiveInteger, i128, "xsd:positiveInteger", |v: i128| v > 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_enforces_plus_minus_128() {
        assert!(Xsd_byte::new("127", true).is_ok());
        assert!(Xsd_byte::new("128", true).is_err());
        assert!(Xsd_byte::new("-128", true).is_ok());
        assert!(Xsd_byte::new("-129", true).is_err());
    }

    #[test]
    fn unvalidated_construction_skips_range_check() {
        assert!(Xsd_byte::new("999", false).is_ok());
    }

    #[test]
    fn round_trips_through_rdf_lexical_form() {
        let v = Xsd_int::new("42", true).unwrap();
        let rdf = v.to_rdf();
        assert_eq!(rdf, "\"42\"^^xsd:int");
        let back = Xsd_int::from_rdf("42").unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn positive_integer_rejects_zero() {
        assert!(Xsd_positiveInteger::new("0", true).is_err());
        assert!(Xsd_positiveInteger::new("1", true).is_ok());
    }
}
