/*!
`QueryProcessor`: decodes the SPARQL 1.1 JSON results format into C1 values. §4.2:
"`QueryProcessor(context, json_bindings)` consumes the SPARQL-JSON binding form and yields a
sequence of rows. Each cell is decoded to a C1 value using this dispatch: `type = uri` → prefer
`iri_to_qname` else `IRI(full)`. `type = bnode` → `BNode(\"_:id\")`. `type = literal` without
datatype: `Xsd_string(value)` or `Xsd_string(value, lang)` if `xml:lang` present. `type = literal`
with datatype `D`: call `D::from_rdf(value)`; unknown datatypes fall back to string."
*/
use crate::context::Context;
use crate::iri::{BNode, Iri};
use crate::xsd::{
    Xsd_anyURI, Xsd_base64Binary, Xsd_boolean, Xsd_byte, Xsd_date, Xsd_dateTime, Xsd_decimal,
    Xsd_double, Xsd_duration, Xsd_float, Xsd_gDay, Xsd_gMonth, Xsd_gMonthDay, Xsd_gYear,
    Xsd_gYearMonth, Xsd_hexBinary, Xsd_int, Xsd_integer, Xsd_long, Xsd_negativeInteger,
    Xsd_nonNegativeInteger, Xsd_nonPositiveInteger, Xsd_positiveInteger, Xsd_short, Xsd_string,
    Xsd_time, Xsd_unsignedByte, Xsd_unsignedInt, Xsd_unsignedLong, Xsd_unsignedShort, XsdValue,
};
use oldap_errors::{value_error, Result};
use std::collections::BTreeMap;

/// A decoded SPARQL result cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Iri(Iri),
    BNode(BNode),
    String(Xsd_string),
    Boolean(Xsd_boolean),
    Integer(Xsd_integer),
    Int(Xsd_int),
    Long(Xsd_long),
    Short(Xsd_short),
    Byte(Xsd_byte),
    NonNegativeInteger(Xsd_nonNegativeInteger),
    NonPositiveInteger(Xsd_nonPositiveInteger),
    NegativeInteger(Xsd_negativeInteger),
    PositiveInteger(Xsd_positiveInteger),
    UnsignedByte(Xsd_unsignedByte),
    UnsignedShort(Xsd_unsignedShort),
    UnsignedInt(Xsd_unsignedInt),
    UnsignedLong(Xsd_unsignedLong),
    Decimal(Xsd_decimal),
    Float(Xsd_float),
    Double(Xsd_double),
    Date(Xsd_date),
    Time(Xsd_time),
    DateTime(Xsd_dateTime),
    Duration(Xsd_duration),
    GYear(Xsd_gYear),
    GMonth(Xsd_gMonth),
    GDay(Xsd_gDay),
    GYearMonth(Xsd_gYearMonth),
    GMonthDay(Xsd_gMonthDay),
    HexBinary(Xsd_hexBinary),
    Base64Binary(Xsd_base64Binary),
    AnyUri(Xsd_anyURI),
    /// Datatype had no known decoder: kept as its raw lexical form, tagged with the datatype IRI.
    UnknownTyped { lexical: String, datatype: String },
}

/// One row of a SPARQL-JSON `results.bindings` entry: variable name to decoded [`Cell`].
pub type Row = BTreeMap<String, Cell>;

/// Decodes SPARQL 1.1 JSON query results (`application/sparql-results+json`) into rows of [`Cell`].
pub struct QueryProcessor<'a> {
    context: &'a Context,
}

impl<'a> QueryProcessor<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self { context }
    }

    /// Decode the whole `results.bindings` array of a SPARQL JSON response.
    pub fn decode_bindings(&self, bindings: &serde_json::Value) -> Result<Vec<Row>> {
        let entries = bindings.as_array().ok_or_else(|| {
            value_error("SPARQL-JSON bindings must be a JSON array".to_string())
        })?;
        entries.iter().map(|entry| self.decode_row(entry)).collect()
    }

    fn decode_row(&self, entry: &serde_json::Value) -> Result<Row> {
        let object = entry.as_object().ok_or_else(|| {
            value_error("SPARQL-JSON binding row must be a JSON object".to_string())
        })?;
        let mut row = Row::new();
        for (var, cell) in object {
            row.insert(var.clone(), self.decode_cell(cell)?);
        }
        Ok(row)
    }

    /// Decode a single `{ "type": ..., "value": ... }` SPARQL-JSON cell.
    pub fn decode_cell(&self, cell: &serde_json::Value) -> Result<Cell> {
        let ty = cell
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| value_error("SPARQL-JSON cell missing 'type'".to_string()))?;
        let value = cell
            .get("value")
            .and_then(|v| v.as_str())
            .ok_or_else(|| value_error("SPARQL-JSON cell missing 'value'".to_string()))?;

        match ty {
            "uri" => {
                let iri = match self.context.iri_to_qname(value) {
                    Some(qname) => Iri::from_qname(qname),
                    None => Iri::from_full(value),
                };
                Ok(Cell::Iri(iri))
            }
            "bnode" => Ok(Cell::BNode(BNode::new(value))),
            "literal" | "typed-literal" => {
                if let Some(datatype) = cell.get("datatype").and_then(|v| v.as_str()) {
                    self.decode_typed_literal(value, datatype)
                } else {
                    let cell = match cell.get("xml:lang").and_then(|v| v.as_str()) {
                        Some(lang) => Xsd_string::new_with_lang(value, lang, true)?,
                        None => Xsd_string::new_plain(value),
                    };
                    Ok(Cell::String(cell))
                }
            }
            other => Err(value_error(format!(
                "unknown SPARQL-JSON binding type '{other}'"
            ))),
        }
    }

    fn decode_typed_literal(&self, value: &str, datatype: &str) -> Result<Cell> {
        let qname = self
            .context
            .iri_to_qname(datatype)
            .map(|q| q.to_string())
            .unwrap_or_else(|| datatype.to_string());

        macro_rules! dispatch {
            ($($qname:literal => $variant:ident : $ty:ty),+ $(,)?) => {
                match qname.as_str() {
                    $($qname => Ok(Cell::$variant(<$ty>::from_rdf(value)?)),)+
                    _ => Ok(Cell::UnknownTyped {
                        lexical: value.to_string(),
                        datatype: qname,
                    }),
                }
            };
        }

        dispatch! {
            "xsd:string" => String: Xsd_string,
            "xsd:boolean" => Boolean: Xsd_boolean,
            "xsd:integer" => Integer: Xsd_integer,
            "xsd:int" => Int: Xsd_int,
            "xsd:long" => Long: Xsd_long,
            "xsd:short" => Short: Xsd_short,
            "xsd:byte" => Byte: Xsd_byte,
            "xsd:nonNegativeInteger" => NonNegativeInteger: Xsd_nonNegativeInteger,
            "xsd:nonPositiveInteger" => NonPositiveInteger: Xsd_nonPositiveInteger,
            "xsd:negativeInteger" => NegativeInteger: Xsd_negativeInteger,
            "xsd:positiveInteger" => PositiveInteger: Xsd_positiveInteger,
            "xsd:unsignedByte" => UnsignedByte: Xsd_unsignedByte,
            "xsd:unsignedShort" => UnsignedShort: Xsd_unsignedShort,
            "xsd:unsignedInt" => UnsignedInt: Xsd_unsignedInt,
            "xsd:unsignedLong" => UnsignedLong: Xsd_unsignedLong,
            "xsd:decimal" => Decimal: Xsd_decimal,
            "xsd:float" => Float: Xsd_float,
            "xsd:double" => Double: Xsd_double,
            "xsd:date" => Date: Xsd_date,
            "xsd:time" => Time: Xsd_time,
            "xsd:dateTime" => DateTime: Xsd_dateTime,
            "xsd:duration" => Duration: Xsd_duration,
            "xsd:gYear" => GYear: Xsd_gYear,
            "xsd:gMonth" => GMonth: Xsd_gMonth,
            "xsd:gDay" => GDay: Xsd_gDay,
            "xsd:gYearMonth" => GYearMonth: Xsd_gYearMonth,
            "xsd:gMonthDay" => GMonthDay: Xsd_gMonthDay,
            "xsd:hexBinary" => HexBinary: Xsd_hexBinary,
            "xsd:base64Binary" => Base64Binary: Xsd_base64Binary,
            "xsd:anyURI" => AnyUri: Xsd_anyURI,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_uri_as_qname_when_namespace_known() {
        let ctx = Context::new();
        let qp = QueryProcessor::new(&ctx);
        let cell = json!({"type": "uri", "value": "http://www.w3.org/2001/XMLSchema#string"});
        match qp.decode_cell(&cell).unwrap() {
            Cell::Iri(iri) => assert_eq!(iri.to_string(), "xsd:string"),
            other => panic!("unexpected cell: {other:?}"),
        }
    }

    #[test]
    fn decodes_uri_as_full_when_namespace_unknown() {
        let ctx = Context::new();
        let qp = QueryProcessor::new(&ctx);
        let cell = json!({"type": "uri", "value": "http://unknown.example/x"});
        match qp.decode_cell(&cell).unwrap() {
            Cell::Iri(iri) => assert!(!iri.is_qname()),
            other => panic!("unexpected cell: {other:?}"),
        }
    }

    #[test]
    fn decodes_bnode() {
        let ctx = Context::new();
        let qp = QueryProcessor::new(&ctx);
        let cell = json!({"type": "bnode", "value": "b0"});
        assert_eq!(
            qp.decode_cell(&cell).unwrap(),
            Cell::BNode(BNode::new("b0"))
        );
    }

    #[test]
    fn decodes_plain_literal_with_language() {
        let ctx = Context::new();
        let qp = QueryProcessor::new(&ctx);
        let cell = json!({"type": "literal", "value": "hello", "xml:lang": "en"});
        match qp.decode_cell(&cell).unwrap() {
            Cell::String(s) => {
                assert_eq!(s.value(), "hello");
                assert_eq!(s.language(), Some("en"));
            }
            other => panic!("unexpected cell: {other:?}"),
        }
    }

    #[test]
    fn decodes_typed_literal_via_datatype_dispatch() {
        let ctx = Context::new();
        let qp = QueryProcessor::new(&ctx);
        let cell = json!({
            "type": "literal",
            "value": "42",
            "datatype": "http://www.w3.org/2001/XMLSchema#int"
        });
        assert_eq!(
            qp.decode_cell(&cell).unwrap(),
            Cell::Int(Xsd_int::new("42", true).unwrap())
        );
    }

    #[test]
    fn unknown_datatype_falls_back_to_string() {
        let ctx = Context::new();
        let qp = QueryProcessor::new(&ctx);
        let cell = json!({
            "type": "literal",
            "value": "x",
            "datatype": "http://unknown.example/weird"
        });
        match qp.decode_cell(&cell).unwrap() {
            Cell::UnknownTyped { lexical, .. } => assert_eq!(lexical, "x"),
            other => panic!("unexpected cell: {other:?}"),
        }
    }

    #[test]
    fn decode_bindings_decodes_every_row() {
        let ctx = Context::new();
        let qp = QueryProcessor::new(&ctx);
        let bindings = json!([
            {"s": {"type": "uri", "value": "http://unknown.example/a"}},
            {"s": {"type": "uri", "value": "http://unknown.example/b"}},
        ]);
        let rows = qp.decode_bindings(&bindings).unwrap();
        assert_eq!(rows.len(), 2);
    }
}
