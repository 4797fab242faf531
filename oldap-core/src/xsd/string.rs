/*!
`xsd:string` (with optional language tag, to directly support the C2 binding-decode dispatch:
"type = literal without datatype: `Xsd_string(value)` or `Xsd_string(value, lang)`") and the
derived string-kind datatypes: `normalizedString`, `token`, `language`, `Name`, `NCName`,
`NMTOKEN`, `ID`, `IDREF`, `ENTITY`.
*/
#![allow(non_camel_case_types)]
use super::XsdValue;
use lazy_static::lazy_static;
use oldap_errors::{value_error, Result};
use regex::Regex;
use std::fmt::{Debug, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// Public Types ❱ Xsd_string
// ------------------------------------------------------------------------------------------------

/// An `xsd:string`, or an `rdf:langString` when a language tag is present. String comparison is
/// case-sensitive and locale-independent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Xsd_string {
    value: String,
    language: Option<String>,
}

lazy_static! {
    static ref LANGUAGE_TAG_RE: Regex =
        Regex::new(r"^[A-Za-z]{2}(-[A-Za-z]{2})?$").expect("valid regex");
}

impl Xsd_string {
    pub fn new_plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
        }
    }

    pub fn new_with_lang(value: impl Into<String>, lang: impl Into<String>, validate: bool) -> Result<Self> {
        let lang = lang.into();
        if validate && !LANGUAGE_TAG_RE.is_match(&lang) {
            return Err(value_error(format!("'{lang}' is not a valid language tag")));
        }
        Ok(Self {
            value: value.into(),
            language: Some(lang),
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl XsdValue for Xsd_string {
    const DATATYPE_QNAME: &'static str = "xsd:string";

    fn new(raw: impl Into<String>, _validate: bool) -> Result<Self> {
        Ok(Self::new_plain(raw))
    }

    fn lexical_value(&self) -> String {
        self.value.clone()
    }

    fn to_rdf(&self) -> String {
        let escaped = super::escape_rdf_string(&self.value);
        match &self.language {
            Some(lang) => format!("\"{escaped}\"@{lang}"),
            None => format!("\"{escaped}\""),
        }
    }
}

impl Display for Xsd_string {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl From<&str> for Xsd_string {
    fn from(value: &str) -> Self {
        Self::new_plain(value)
    }
}

impl From<String> for Xsd_string {
    fn from(value: String) -> Self {
        Self::new_plain(value)
    }
}

// ------------------------------------------------------------------------------------------------
// Public Types ❱ regex-validated derived string kinds
// ------------------------------------------------------------------------------------------------

macro_rules! string_kind {
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

string_kind!(
    Xsd_normalizedString,
    "xsd:normalizedString",
    r"^[^\t\n\r]*$",
    "`xsd:normalizedString` — no tab, newline, or carriage return characters."
);
string_kind!(
    Xsd_token,
    "xsd:token",
    r"^\S(.*\S)?$|^$",
    "`xsd:token` — no leading/trailing whitespace and no internal whitespace runs longer than one space."
);
string_kind!(
    Xsd_language,
    "xsd:language",
    r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{1,8})*$",
    "`xsd:language` — a BCP-47-shaped language tag."
);
string_kind!(
    Xsd_Name,
    "xsd:Name",
    r"^[A-Za-z_:][A-Za-z0-9_.\-:]*$",
    "`xsd:Name` — an XML `Name` production."
);
string_kind!(
    Xsd_NCName,
    "xsd:NCName",
    r"^[A-Za-z_][A-Za-z0-9_.\-]*$",
    "`xsd:NCName` — an XML `Name` without a colon."
);
string_kind!(
    Xsd_NMTOKEN,
    "xsd:NMTOKEN",
    r"^[A-Za-z0-9_.\-:]+$",
    "`xsd:NMTOKEN` — an XML `Nmtoken` production."
);
string_kind!(
    Xsd_ID,
    "xsd:ID",
    r"^[A-Za-z_][A-Za-z0-9_.\-]*$",
    "`xsd:ID` — shares the `NCName` lexical space."
);
string_kind!(
    Xsd_IDREF,
    "xsd:IDREF",
    r"^[A-Za-z_][A-Za-z0-9_.\-]*$",
    "`xsd:IDREF` — shares the `NCName` lexical space."
);
string_kind!(
    Xsd_ENTITY,
    "xsd:ENTITY",
    r"^[A-Za-z_][A-Za-z0-9_.\-]*$",
    "`xsd:ENTITY` — shares the `NCName` lexical space."
);
