/*!
One Rust type per XSD datatype named in §3/§4.1 of the specification, plus the common `XsdValue`
trait every one of them implements: construction-time validation (optionally elided), a canonical
lexical form, an RDF term form, and a JSON dict form used by the artifact cache.

Validation never runs twice: `from_rdf` always trusts its input, because it is only ever called on
lexical forms the store itself produced (§4.1: "never validates twice — the store is trusted").
*/
use oldap_errors::{type_error, Result};
use std::fmt::{Debug, Display};

pub mod binary;
pub mod boolean;
pub mod datetime;
pub mod floating_point;
pub mod integer;
pub mod qname;
pub mod string;
pub mod uri;

pub use binary::{Xsd_base64Binary, Xsd_hexBinary};
pub use boolean::Xsd_boolean;
pub use datetime::{
    Xsd_date, Xsd_dateTime, Xsd_duration, Xsd_gDay, Xsd_gMonth, Xsd_gMonthDay, Xsd_gYear,
    Xsd_gYearMonth, Xsd_time,
};
pub use floating_point::{Xsd_decimal, Xsd_double, Xsd_float};
pub use integer::{
    Xsd_byte, Xsd_int, Xsd_integer, Xsd_long, Xsd_negativeInteger, Xsd_nonNegativeInteger,
    Xsd_nonPositiveInteger, Xsd_positiveInteger, Xsd_short, Xsd_unsignedByte, Xsd_unsignedInt,
    Xsd_unsignedLong, Xsd_unsignedShort,
};
pub use qname::Xsd_QName;
pub use string::{
    Xsd_ENTITY, Xsd_ID, Xsd_IDREF, Xsd_NCName, Xsd_NMTOKEN, Xsd_Name, Xsd_language,
    Xsd_normalizedString, Xsd_string, Xsd_token,
};
pub use uri::Xsd_anyURI;

// ------------------------------------------------------------------------------------------------
// Public Types ❱ Trait
// ------------------------------------------------------------------------------------------------

///
/// Implemented by every XSD value type. `new` performs (optionally elided) validation against the
/// XSD 1.1 lexical space; `to_rdf`/`from_rdf` round-trip the canonical RDF term form
/// (`"lex"^^xsd:dt`, or `"lex"@lang` for language-tagged strings); `to_json`/`from_json` round-trip
/// the artifact-cache dict form.
///
pub trait XsdValue: Clone + Debug + Display + PartialEq {
    /// The `xsd:` QName of this datatype, e.g. `xsd:nonNegativeInteger`.
    const DATATYPE_QNAME: &'static str;

    /// Construct from a raw lexical value, validating unless `validate` is `false`.
    fn new(raw: impl Into<String>, validate: bool) -> Result<Self>
    where
        Self: Sized;

    /// The canonical lexical form (no quoting, no datatype suffix).
    fn lexical_value(&self) -> String;

    /// The RDF term form, e.g. `"42"^^xsd:int`.
    fn to_rdf(&self) -> String {
        format!(
            "\"{}\"^^{}",
            escape_rdf_string(&self.lexical_value()),
            Self::DATATYPE_QNAME
        )
    }

    /// Parse a trusted lexical value coming from the store. Never re-validates.
    fn from_rdf(lexical: &str) -> Result<Self>
    where
        Self: Sized,
    {
        Self::new(lexical, false)
    }

    /// The JSON dict form used by the artifact cache.
    #[cfg(feature = "serde")]
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "@type": Self::DATATYPE_QNAME,
            "@value": self.lexical_value(),
        })
    }

    #[cfg(feature = "serde")]
    fn from_json(value: &serde_json::Value) -> Result<Self>
    where
        Self: Sized,
    {
        let lexical = value
            .get("@value")
            .and_then(|v| v.as_str())
            .ok_or_else(|| type_error(format!("malformed JSON dict form for {}", Self::DATATYPE_QNAME)))?;
        Self::from_rdf(lexical)
    }
}

/// Escape a literal's lexical value for embedding inside a double-quoted RDF term:
/// backslash-escape `"`, `\`, newline, tab, and carriage return.
pub fn escape_rdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

// ------------------------------------------------------------------------------------------------
// Public Types ❱ Numeric
// ------------------------------------------------------------------------------------------------

///
/// The common super-kind of every integer-kind and floating-point-kind XSD value, used by facet
/// comparisons (`MIN_EXCLUSIVE`, `MAX_INCLUSIVE`, …) that must compare values of possibly
/// different concrete numeric types.
///
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Numeric {
    Byte(Xsd_byte),
    Short(Xsd_short),
    Int(Xsd_int),
    Long(Xsd_long),
    Integer(Xsd_integer),
    UnsignedByte(Xsd_unsignedByte),
    UnsignedShort(Xsd_unsignedShort),
    UnsignedInt(Xsd_unsignedInt),
    UnsignedLong(Xsd_unsignedLong),
    NonNegativeInteger(Xsd_nonNegativeInteger),
    NonPositiveInteger(Xsd_nonPositiveInteger),
    NegativeInteger(Xsd_negativeInteger),
    PositiveInteger(Xsd_positiveInteger),
    Float(Xsd_float),
    Double(Xsd_double),
    Decimal(Xsd_decimal),
}

impl Numeric {
    /// A lossy `f64` projection used only for ordering comparisons across concrete types.
    pub fn as_f64(&self) -> f64 {
        match self {
            Numeric::Byte(v) => v.value() as f64,
            Numeric::Short(v) => v.value() as f64,
            Numeric::Int(v) => v.value() as f64,
            Numeric::Long(v) => v.value() as f64,
            Numeric::Integer(v) => v.value() as f64,
            Numeric::UnsignedByte(v) => v.value() as f64,
            Numeric::UnsignedShort(v) => v.value() as f64,
            Numeric::UnsignedInt(v) => v.value() as f64,
            Numeric::UnsignedLong(v) => v.value() as f64,
            Numeric::NonNegativeInteger(v) => v.value() as f64,
            Numeric::NonPositiveInteger(v) => v.value() as f64,
            Numeric::NegativeInteger(v) => v.value() as f64,
            Numeric::PositiveInteger(v) => v.value() as f64,
            Numeric::Float(v) => v.value() as f64,
            Numeric::Double(v) => v.value(),
            Numeric::Decimal(v) => v.value().to_string().parse().unwrap_or(f64::NAN),
        }
    }

    pub fn to_rdf(&self) -> String {
        match self {
            Numeric::Byte(v) => v.to_rdf(),
            Numeric::Short(v) => v.to_rdf(),
            Numeric::Int(v) => v.to_rdf(),
            Numeric::Long(v) => v.to_rdf(),
            Numeric::Integer(v) => v.to_rdf(),
            Numeric::UnsignedByte(v) => v.to_rdf(),
            Numeric::UnsignedShort(v) => v.to_rdf(),
            Numeric::UnsignedInt(v) => v.to_rdf(),
            Numeric::UnsignedLong(v) => v.to_rdf(),
            Numeric::NonNegativeInteger(v) => v.to_rdf(),
            Numeric::NonPositiveInteger(v) => v.to_rdf(),
            Numeric::NegativeInteger(v) => v.to_rdf(),
            Numeric::PositiveInteger(v) => v.to_rdf(),
            Numeric::Float(v) => v.to_rdf(),
            Numeric::Double(v) => v.to_rdf(),
            Numeric::Decimal(v) => v.to_rdf(),
        }
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.as_f64().partial_cmp(&other.as_f64())
    }
}

impl Display for Numeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping_covers_the_documented_set() {
        assert_eq!(escape_rdf_string("a\"b\\c\nd\te\rf"), "a\\\"b\\\\c\\nd\\te\\rf");
    }

    #[test]
    fn numeric_compares_across_concrete_types() {
        let a = Numeric::Byte(Xsd_byte::new("1", true).unwrap());
        let b = Numeric::Double(Xsd_double::new("2.0", true).unwrap());
        assert!(a < b);
    }
}
