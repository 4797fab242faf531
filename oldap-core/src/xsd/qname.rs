/*!
`xsd:QName` as a literal value (distinct from [`crate::iri::QName`], which names a resource
reference rather than a typed literal).
*/
#![allow(non_camel_case_types)]
use super::XsdValue;
use crate::iri::QName;
use oldap_errors::Result;
use std::fmt::{Debug, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Xsd_QName(QName);

impl Xsd_QName {
    pub fn qname(&self) -> &QName {
        &self.0
    }
}

impl XsdValue for Xsd_QName {
    const DATATYPE_QNAME: &'static str = "xsd:QName";

    fn new(raw: impl Into<String>, _validate: bool) -> Result<Self> {
        Ok(Self(QName::parse(&raw.into())?))
    }

    fn lexical_value(&self) -> String {
        self.0.to_string()
    }
}

impl Display for Xsd_QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<QName> for Xsd_QName {
    fn from(value: QName) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_a_qname() {
        let v = Xsd_QName::new("oldap:Book", true).unwrap();
        assert_eq!(v.qname().prefix(), "oldap");
        assert_eq!(v.to_rdf(), "\"oldap:Book\"^^xsd:QName");
    }
}
