/*!
Names: `NCName`, `QName`, `Iri`, `NamespaceIri`, `BNode`. See §3 of the specification.
*/
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::{Debug, Display};
use tracing::error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// An XML-compatible local name, e.g. `comment` or `hasAuthor`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NCName(String);

/// A `prefix:local` name, resolved through a [`crate::context::Context`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QName {
    prefix: NCName,
    local: NCName,
}

/// Either a full absolute IRI or a `QName`; both forms round-trip losslessly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Iri {
    Full(String),
    QName(QName),
}

/// An absolute IRI ending in `/` or `#`, usable as a namespace for prefix resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamespaceIri(String);

/// A blank node identifier as produced by a SPARQL-JSON binding of `type = bnode`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BNode(String);

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

lazy_static! {
    static ref NCNAME_RE: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("valid regex");
    static ref FULL_IRI_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid regex");
}

impl NCName {
    pub fn new(raw: impl Into<String>, validate: bool) -> oldap_errors::Result<Self> {
        let raw = raw.into();
        if validate && !Self::is_valid(&raw) {
            error!("NCName::new({raw:?}) is invalid");
            return Err(oldap_errors::value_error(format!(
                "'{raw}' is not a valid NCName"
            )));
        }
        Ok(Self(raw))
    }

    pub fn is_valid(s: &str) -> bool {
        !s.is_empty() && NCNAME_RE.is_match(s) && !s.contains(':')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NCName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl QName {
    pub fn new(prefix: impl Into<String>, local: impl Into<String>) -> oldap_errors::Result<Self> {
        Ok(Self {
            prefix: NCName::new(prefix, true)?,
            local: NCName::new(local, true)?,
        })
    }

    /// Parse `prefix:local`, returning a `Value` error if the form does not match.
    pub fn parse(raw: &str) -> oldap_errors::Result<Self> {
        let Some((prefix, local)) = raw.split_once(':') else {
            return Err(oldap_errors::value_error(format!(
                "'{raw}' is not a valid QName: missing ':'"
            )));
        };
        Self::new(prefix, local)
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    pub fn local(&self) -> &str {
        self.local.as_str()
    }

    pub fn fragment(&self) -> &str {
        self.local.as_str()
    }
}

impl Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

impl Iri {
    /// Construct an `Iri` from either a full IRI (`scheme://…`) or a `prefix:local` QName.
    pub fn new(raw: impl Into<String>, validate: bool) -> oldap_errors::Result<Self> {
        let raw = raw.into();
        if FULL_IRI_RE.is_match(&raw) {
            if validate {
                url::Url::parse(&raw).map_err(|e| {
                    oldap_errors::value_error(format!("'{raw}' is not a valid IRI: {e}"))
                })?;
            }
            Ok(Self::Full(raw))
        } else {
            Ok(Self::QName(QName::parse(&raw)?))
        }
    }

    pub fn from_qname(qname: QName) -> Self {
        Self::QName(qname)
    }

    pub fn from_full(full: impl Into<String>) -> Self {
        Self::Full(full.into())
    }

    pub fn is_qname(&self) -> bool {
        matches!(self, Self::QName(_))
    }

    pub fn as_qname(&self) -> Option<&QName> {
        match self {
            Self::QName(q) => Some(q),
            Self::Full(_) => None,
        }
    }

    /// The local fragment: either the QName's local part, or the text after the last `/` or `#`
    /// in a full IRI.
    pub fn fragment(&self) -> &str {
        match self {
            Self::QName(q) => q.local(),
            Self::Full(full) => {
                let tail = full.rsplit(['#', '/']).next().unwrap_or(full.as_str());
                tail
            }
        }
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full(s) => write!(f, "<{s}>"),
            Self::QName(q) => write!(f, "{q}"),
        }
    }
}

impl From<QName> for Iri {
    fn from(value: QName) -> Self {
        Self::QName(value)
    }
}

impl NamespaceIri {
    pub fn new(raw: impl Into<String>, validate: bool) -> oldap_errors::Result<Self> {
        let raw = raw.into();
        if validate {
            if !(raw.ends_with('/') || raw.ends_with('#')) {
                return Err(oldap_errors::value_error(format!(
                    "'{raw}' is not a valid namespace IRI: must end in '/' or '#'"
                )));
            }
            url::Url::parse(&raw).map_err(|e| {
                oldap_errors::value_error(format!("'{raw}' is not a valid IRI: {e}"))
            })?;
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `Some(local)` if `iri` begins with this namespace.
    pub fn strip_prefix_of<'a>(&self, iri: &'a str) -> Option<&'a str> {
        iri.strip_prefix(self.0.as_str())
    }
}

impl Display for NamespaceIri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl BNode {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let id = id.strip_prefix("_:").map(str::to_string).unwrap_or(id);
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qname_round_trips() {
        let q = QName::parse("oldap:comment").unwrap();
        assert_eq!(q.prefix(), "oldap");
        assert_eq!(q.local(), "comment");
        assert_eq!(q.to_string(), "oldap:comment");
    }

    #[test]
    fn iri_distinguishes_full_and_qname() {
        let full = Iri::new("http://example.org/comment", true).unwrap();
        assert!(!full.is_qname());
        assert_eq!(full.fragment(), "comment");

        let qname = Iri::new("oldap:comment", true).unwrap();
        assert!(qname.is_qname());
        assert_eq!(qname.fragment(), "comment");
    }

    #[test]
    fn namespace_iri_requires_trailing_separator() {
        assert!(NamespaceIri::new("http://example.org/ns#", true).is_ok());
        assert!(NamespaceIri::new("http://example.org/ns", true).is_err());
    }

    #[test]
    fn bnode_strips_and_restores_prefix() {
        let b = BNode::new("_:b0");
        assert_eq!(b.as_str(), "b0");
        assert_eq!(b.to_string(), "_:b0");
    }
}
