/*!
`xsd:anyURI`.
*/
#![allow(non_camel_case_types)]
use super::XsdValue;
use oldap_errors::{value_error, Result};
use std::fmt::{Debug, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Xsd_anyURI(String);

impl Xsd_anyURI {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl XsdValue for Xsd_anyURI {
    const DATATYPE_QNAME: &'static str = "xsd:anyURI";

    fn new(raw: impl Into<String>, validate: bool) -> Result<Self> {
        let raw = raw.into();
        if validate && url::Url::parse(&raw).is_err() {
            return Err(value_error(format!("'{raw}' is not a valid xsd:anyURI")));
        }
        Ok(Self(raw))
    }

    fn lexical_value(&self) -> String {
        self.0.clone()
    }
}

impl Display for Xsd_anyURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
