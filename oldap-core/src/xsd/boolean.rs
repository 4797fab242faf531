/*!
`xsd:boolean`.
*/
#![allow(non_camel_case_types)]
use super::XsdValue;
use oldap_errors::{value_error, Result};
use std::fmt::{Debug, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Xsd_boolean(bool);

impl Xsd_boolean {
    pub fn value(&self) -> bool {
        self.0
    }
}

impl XsdValue for Xsd_boolean {
    const DATATYPE_QNAME: &'static str = "xsd:boolean";

    fn new(raw: impl Into<String>, _validate: bool) -> Result<Self> {
        let raw = raw.into();
        match raw.trim() {
            "true" | "1" => Ok(Self(true)),
            "false" | "0" => Ok(Self(false)),
            other => Err(value_error(format!("'{other}' is not a valid xsd:boolean"))),
        }
    }

    fn lexical_value(&self) -> String {
        if self.0 { "true" } else { "false" }.to_string()
    }
}

impl Display for Xsd_boolean {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexical_value())
    }
}

impl From<bool> for Xsd_boolean {
    fn from(value: bool) -> Self {
        Self(value)
    }
}
