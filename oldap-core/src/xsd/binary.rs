/*!
`xsd:hexBinary` and `xsd:base64Binary`. §4.1: "Base64/Hex binary validate both character set and
length parity."
*/
#![allow(non_camel_case_types)]
use super::XsdValue;
use base64::Engine;
use oldap_errors::{value_error, Result};
use std::fmt::{Debug, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Xsd_hexBinary(String);

impl Xsd_hexBinary {
    pub fn bytes(&self) -> Vec<u8> {
        hex_decode(&self.0).expect("validated at construction")
    }
}

impl XsdValue for Xsd_hexBinary {
    const DATATYPE_QNAME: &'static str = "xsd:hexBinary";

    fn new(raw: impl Into<String>, validate: bool) -> Result<Self> {
        let raw = raw.into();
        if validate {
            if raw.len() % 2 != 0 {
                return Err(value_error(format!(
                    "'{raw}' is not valid xsd:hexBinary: odd length"
                )));
            }
            if !raw.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(value_error(format!(
                    "'{raw}' is not valid xsd:hexBinary: non-hex character"
                )));
            }
        }
        Ok(Self(raw))
    }

    fn lexical_value(&self) -> String {
        self.0.clone()
    }
}

impl Display for Xsd_hexBinary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Xsd_base64Binary(String);

impl Xsd_base64Binary {
    pub fn bytes(&self) -> Vec<u8> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.0)
            .expect("validated at construction")
    }
}

impl XsdValue for Xsd_base64Binary {
    const DATATYPE_QNAME: &'static str = "xsd:base64Binary";

    fn new(raw: impl Into<String>, validate: bool) -> Result<Self> {
        let raw = raw.into();
        if validate
            && base64::engine::general_purpose::STANDARD
                .decode(raw.as_bytes())
                .is_err()
        {
            return Err(value_error(format!(
                "'{raw}' is not valid xsd:base64Binary"
            )));
        }
        Ok(Self(raw))
    }

    fn lexical_value(&self) -> String {
        self.0.clone()
    }
}

impl Display for Xsd_base64Binary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_binary_rejects_odd_length() {
        assert!(Xsd_hexBinary::new("abc", true).is_err());
        assert!(Xsd_hexBinary::new("abcd", true).is_ok());
    }

    #[test]
    fn hex_binary_rejects_non_hex_chars() {
        assert!(Xsd_hexBinary::new("zz", true).is_err());
    }

    #[test]
    fn base64_round_trips_bytes() {
        let v = Xsd_base64Binary::new("aGVsbG8=", true).unwrap();
        assert_eq!(v.bytes(), b"hello");
    }
}
