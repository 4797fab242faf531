/*!
`PropertyClass` (C4): a SHACL `PropertyShape` plus an OWL property declaration, with facet
restrictions, a dual SHACL/OWL materializer, and incremental update. §4.4.
*/
use crate::base::{AuditFields, ModelBase};
use oldap_core::collections::{LangString, LanguageIn, XsdSet};
use oldap_core::iri::Iri;
use oldap_core::xsd::{Numeric, Xsd_dateTime, XsdValue};
use oldap_errors::{inconsistency_error, Result};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// Public Types ❱ PropertyClassAttribute
// ------------------------------------------------------------------------------------------------

/// Every settable `PropertyClass` attribute, each routed to a SHACL or OWL graph. §4.4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyClassAttribute {
    SubpropertyOf,
    Type,
    Class,
    NodeKind,
    Datatype,
    Name,
    Description,
    LanguageIn,
    UniqueLang,
    In,
    MinLength,
    MaxLength,
    Pattern,
    MinExclusive,
    MaxExclusive,
    MinInclusive,
    MaxInclusive,
    LessThan,
    LessThanOrEquals,
    InverseOf,
    EquivalentProperty,
}

/// The graph an attribute's RDF emission is routed into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Shacl,
    Owl,
}

/// Static per-attribute metadata: whether an attribute is mandatory (cannot be deleted once set),
/// immutable (cannot be reassigned after construction), and which graph it targets. Grounded in
/// `original_source/.../enums/propertyclassattr.py`.
#[derive(Clone, Copy, Debug)]
pub struct AttributeDescriptor {
    pub attribute: PropertyClassAttribute,
    pub mandatory: bool,
    pub immutable: bool,
    pub channel: Channel,
}

pub const PROPERTY_CLASS_ATTRIBUTES: &[AttributeDescriptor] = &[
    AttributeDescriptor { attribute: PropertyClassAttribute::SubpropertyOf, mandatory: false, immutable: false, channel: Channel::Owl },
    AttributeDescriptor { attribute: PropertyClassAttribute::Type, mandatory: true, immutable: true, channel: Channel::Owl },
    AttributeDescriptor { attribute: PropertyClassAttribute::Class, mandatory: false, immutable: true, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::NodeKind, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::Datatype, mandatory: false, immutable: true, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::Name, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::Description, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::LanguageIn, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::UniqueLang, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::In, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::MinLength, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::MaxLength, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::Pattern, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::MinExclusive, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::MaxExclusive, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::MinInclusive, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::MaxInclusive, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::LessThan, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::LessThanOrEquals, mandatory: false, immutable: false, channel: Channel::Shacl },
    AttributeDescriptor { attribute: PropertyClassAttribute::InverseOf, mandatory: false, immutable: false, channel: Channel::Owl },
    AttributeDescriptor { attribute: PropertyClassAttribute::EquivalentProperty, mandatory: false, immutable: false, channel: Channel::Owl },
];

pub fn descriptor_for(attribute: PropertyClassAttribute) -> &'static AttributeDescriptor {
    PROPERTY_CLASS_ATTRIBUTES
        .iter()
        .find(|d| d.attribute == attribute)
        .expect("every PropertyClassAttribute has a descriptor")
}

// ------------------------------------------------------------------------------------------------
// Public Types ❱ PropertyClass
// ------------------------------------------------------------------------------------------------

/// A SHACL `PropertyShape` plus OWL property declaration. §4.4.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyClass {
    pub iri: Iri,
    pub base: ModelBase,
    /// `true` if this property is owned by exactly one resource class and has no independent
    /// lifetime; `false` if it is standalone/addressable by its own QName.
    pub internal: bool,

    pub subproperty_of: Option<Iri>,
    pub class: Option<Iri>,
    pub node_kind: Option<NodeKind>,
    pub datatype: Option<String>,
    pub name: Option<LangString>,
    pub description: Option<LangString>,
    pub language_in: Option<LanguageIn>,
    pub unique_lang: Option<bool>,
    pub in_: Option<XsdSet>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub min_exclusive: Option<Numeric>,
    pub max_exclusive: Option<Numeric>,
    pub min_inclusive: Option<Numeric>,
    pub max_inclusive: Option<Numeric>,
    pub less_than: Option<Iri>,
    pub less_than_or_equals: Option<Iri>,
    pub inverse_of: Option<Iri>,
    pub equivalent_property: Option<Iri>,
}

/// SHACL `sh:nodeKind` values relevant to a property's range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Iri,
    BlankNodeOrIri,
    Literal,
}

impl NodeKind {
    pub fn as_qname(&self) -> &'static str {
        match self {
            NodeKind::Iri => "sh:IRI",
            NodeKind::BlankNodeOrIri => "sh:BlankNodeOrIRI",
            NodeKind::Literal => "sh:Literal",
        }
    }
}

impl PropertyClass {
    /// Construct a new, not-yet-persisted `PropertyClass`, validating the core invariants from
    /// §3: "Exactly one of `DATATYPE` … or `CLASS` …; if `LANGUAGE_IN` is set, `DATATYPE` is
    /// implicitly `langString`".
    pub fn new(iri: Iri, internal: bool, audit: AuditFields) -> Self {
        Self {
            iri,
            base: ModelBase::new(audit),
            internal,
            subproperty_of: None,
            class: None,
            node_kind: None,
            datatype: None,
            name: None,
            description: None,
            language_in: None,
            unique_lang: None,
            in_: None,
            min_length: None,
            max_length: None,
            pattern: None,
            min_exclusive: None,
            max_exclusive: None,
            min_inclusive: None,
            max_inclusive: None,
            less_than: None,
            less_than_or_equals: None,
            inverse_of: None,
            equivalent_property: None,
        }
    }

    /// `true` if this declares an OWL object property (range is a class), `false` if it is a
    /// data property (range is a datatype). §3: "OWL property kind is derived: `CLASS` set ⇒
    /// object property, otherwise data property."
    pub fn is_object_property(&self) -> bool {
        self.class.is_some()
    }

    /// Enforce the cross-attribute invariants from §3/§4.4. Called at the end of construction and
    /// before every `create`/`update`.
    pub fn validate(&self) -> Result<()> {
        let has_datatype = self.datatype.is_some();
        let has_class = self.class.is_some();
        if has_datatype && has_class {
            return Err(inconsistency_error(format!(
                "{}: DATATYPE and CLASS are mutually exclusive",
                self.iri
            )));
        }
        if !has_datatype && !has_class {
            return Err(inconsistency_error(format!(
                "{}: exactly one of DATATYPE or CLASS is required",
                self.iri
            )));
        }
        if self.language_in.is_some() {
            match &self.datatype {
                Some(dt) if dt == "rdf:langString" => {}
                Some(dt) => {
                    return Err(inconsistency_error(format!(
                        "{}: LANGUAGE_IN requires DATATYPE = rdf:langString, found {dt}",
                        self.iri
                    )))
                }
                None => {
                    return Err(inconsistency_error(format!(
                        "{}: LANGUAGE_IN requires DATATYPE = rdf:langString",
                        self.iri
                    )))
                }
            }
        }
        Ok(())
    }

    /// The subject term used in emitted SHACL/OWL triples: a standalone property's own IRI with
    /// `Shape` appended, or a fresh blank node for an inline/internal property.
    fn shacl_subject(&self, blank_node: Option<&str>) -> String {
        match blank_node {
            Some(b) => b.to_string(),
            None => format!("{}Shape", self.iri),
        }
    }

    /// §4.4 "Create (SHACL)": emit either a standalone `PropertyShape` or an inline blank node.
    pub fn emit_shacl_create(&self, blank_node: Option<&str>) -> Result<Vec<String>> {
        self.validate()?;
        let subject = self.shacl_subject(blank_node);
        let mut triples = Vec::new();
        if blank_node.is_none() {
            triples.push(format!("{subject} a sh:PropertyShape ."));
            triples.extend(self.base.audit.to_rdf_triples(&subject));
        }
        triples.push(format!("{subject} sh:path {} .", self.iri));

        if let Some(dt) = &self.datatype {
            triples.push(format!("{subject} sh:datatype {dt} ."));
        }
        if let Some(class) = &self.class {
            triples.push(format!("{subject} sh:class {class} ."));
        }
        if let Some(nk) = &self.node_kind {
            triples.push(format!("{subject} sh:nodeKind {} .", nk.as_qname()));
        }
        if let Some(name) = &self.name {
            triples.extend(name.to_rdf_triples(&subject, "sh:name"));
        }
        if let Some(desc) = &self.description {
            triples.extend(desc.to_rdf_triples(&subject, "sh:description"));
        }
        if let Some(lang_in) = &self.language_in {
            triples.push(format!("{subject} sh:languageIn {} .", lang_in.to_rdf_list()));
        }
        if let Some(unique) = self.unique_lang {
            triples.push(format!("{subject} sh:uniqueLang {unique} ."));
        }
        if let Some(in_) = &self.in_ {
            triples.push(format!("{subject} sh:in {} .", in_.to_rdf_list()));
        }
        if let Some(v) = self.min_length {
            triples.push(format!("{subject} sh:minLength {v} ."));
        }
        if let Some(v) = self.max_length {
            triples.push(format!("{subject} sh:maxLength {v} ."));
        }
        if let Some(p) = &self.pattern {
            triples.push(format!(
                "{subject} sh:pattern \"{}\" .",
                oldap_core::xsd::escape_rdf_string(p)
            ));
        }
        if let Some(v) = &self.min_exclusive {
            triples.push(format!("{subject} sh:minExclusive {} .", v.to_rdf()));
        }
        if let Some(v) = &self.max_exclusive {
            triples.push(format!("{subject} sh:maxExclusive {} .", v.to_rdf()));
        }
        if let Some(v) = &self.min_inclusive {
            triples.push(format!("{subject} sh:minInclusive {} .", v.to_rdf()));
        }
        if let Some(v) = &self.max_inclusive {
            triples.push(format!("{subject} sh:maxInclusive {} .", v.to_rdf()));
        }
        if let Some(v) = &self.less_than {
            triples.push(format!("{subject} sh:lessThan {v} ."));
        }
        if let Some(v) = &self.less_than_or_equals {
            triples.push(format!("{subject} sh:lessThanOrEquals {v} ."));
        }
        Ok(triples)
    }

    /// §4.4 "Create (OWL)": `rdf:type owl:{Data,Object}Property`, `rdfs:range`, and (for internal
    /// properties) `rdfs:domain`.
    pub fn emit_owl_create(&self, domain: Option<&Iri>) -> Result<Vec<String>> {
        self.validate()?;
        let subject = self.iri.to_string();
        let owl_kind = if self.is_object_property() {
            "owl:ObjectProperty"
        } else {
            "owl:DatatypeProperty"
        };
        let mut triples = vec![format!("{subject} rdf:type {owl_kind} .")];

        if let Some(class) = &self.class {
            triples.push(format!("{subject} rdfs:range {class} ."));
        } else if let Some(dt) = &self.datatype {
            triples.push(format!("{subject} rdfs:range {dt} ."));
        }
        if let Some(sub) = &self.subproperty_of {
            triples.push(format!("{subject} rdfs:subPropertyOf {sub} ."));
        }
        if let Some(inv) = &self.inverse_of {
            triples.push(format!("{subject} owl:inverseOf {inv} ."));
        }
        if let Some(eq) = &self.equivalent_property {
            triples.push(format!("{subject} owl:equivalentProperty {eq} ."));
        }
        if self.internal {
            if let Some(domain) = domain {
                triples.push(format!("{subject} rdfs:domain {domain} ."));
            }
        }
        Ok(triples)
    }

    /// §4.4 "Delete": property RDF-list tails, then SHACL triples, then OWL axioms. Returns the
    /// `DELETE WHERE` patterns in removal order.
    pub fn emit_delete(&self, blank_node: Option<&str>) -> Vec<String> {
        let subject = self.shacl_subject(blank_node);
        let mut patterns = Vec::new();
        if self.in_.is_some() {
            patterns.push(format!("{subject} sh:in ?inList . ?inList rdf:rest*/rdf:first ?inItem ."));
        }
        if self.language_in.is_some() {
            patterns.push(format!(
                "{subject} sh:languageIn ?langList . ?langList rdf:rest*/rdf:first ?langItem ."
            ));
        }
        patterns.push(format!("{subject} ?shaclPred ?shaclObj ."));
        patterns.push(format!("{} ?owlPred ?owlObj .", self.iri));
        patterns
    }

    /// §4.4 "Update": scalar attributes use a `DELETE { old } INSERT { new } WHERE { … FILTER(?m
    /// = modified) }` optimistic-concurrency pattern; list-valued attributes replace the whole
    /// list; langString attributes patch per changed language via their own change-set.
    pub fn emit_update_patch(
        &self,
        attribute: PropertyClassAttribute,
        old_rdf: Option<&str>,
        new_rdf: Option<&str>,
        now: &Xsd_dateTime,
    ) -> String {
        let subject = self.shacl_subject(None);
        let predicate = shacl_predicate(attribute);
        let delete_clause = old_rdf
            .map(|old| format!("{subject} {predicate} {old} ."))
            .unwrap_or_default();
        let insert_clause = new_rdf
            .map(|new| format!("{subject} {predicate} {new} ."))
            .unwrap_or_default();
        format!(
            "WITH <shacl> DELETE {{ {delete_clause} ?s dcterms:modified ?m . }} INSERT {{ {insert_clause} ?s dcterms:modified {} . }} WHERE {{ BIND({subject} AS ?s) ?s dcterms:modified ?m . FILTER(?m = {}) }}",
            now.to_rdf(),
            self.base.audit.modified.to_rdf()
        )
    }
}

fn shacl_predicate(attribute: PropertyClassAttribute) -> &'static str {
    use PropertyClassAttribute::*;
    match attribute {
        SubpropertyOf => "rdfs:subPropertyOf",
        Type => "rdf:type",
        Class => "sh:class",
        NodeKind => "sh:nodeKind",
        Datatype => "sh:datatype",
        Name => "sh:name",
        Description => "sh:description",
        LanguageIn => "sh:languageIn",
        UniqueLang => "sh:uniqueLang",
        In => "sh:in",
        MinLength => "sh:minLength",
        MaxLength => "sh:maxLength",
        Pattern => "sh:pattern",
        MinExclusive => "sh:minExclusive",
        MaxExclusive => "sh:maxExclusive",
        MinInclusive => "sh:minInclusive",
        MaxInclusive => "sh:maxInclusive",
        LessThan => "sh:lessThan",
        LessThanOrEquals => "sh:lessThanOrEquals",
        InverseOf => "owl:inverseOf",
        EquivalentProperty => "owl:equivalentProperty",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oldap_core::iri::QName;

    fn iri(local: &str) -> Iri {
        Iri::from_qname(QName::new("test", local).unwrap())
    }

    fn audit() -> AuditFields {
        AuditFields::new_at(iri("root"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap())
    }

    #[test]
    fn rejects_both_datatype_and_class() {
        let mut p = PropertyClass::new(iri("comment"), false, audit());
        p.datatype = Some("xsd:string".to_string());
        p.class = Some(iri("Person"));
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_neither_datatype_nor_class() {
        let p = PropertyClass::new(iri("comment"), false, audit());
        assert!(p.validate().is_err());
    }

    #[test]
    fn language_in_requires_langstring_datatype() {
        let mut p = PropertyClass::new(iri("comment"), false, audit());
        p.datatype = Some("xsd:string".to_string());
        p.language_in = Some(LanguageIn::new(["en", "de"]).unwrap());
        assert!(p.validate().is_err());

        p.datatype = Some("rdf:langString".to_string());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn object_property_is_detected_from_class() {
        let mut p = PropertyClass::new(iri("authors"), false, audit());
        p.class = Some(iri("Person"));
        assert!(p.is_object_property());
    }

    #[test]
    fn standalone_shacl_create_emits_property_shape() {
        let mut p = PropertyClass::new(iri("comment"), false, audit());
        p.datatype = Some("xsd:string".to_string());
        let triples = p.emit_shacl_create(None).unwrap();
        assert!(triples.iter().any(|t| t.contains("a sh:PropertyShape")));
        assert!(triples.iter().any(|t| t.contains("sh:path test:comment")));
    }

    #[test]
    fn inline_shacl_create_uses_blank_node_and_skips_type_triple() {
        let mut p = PropertyClass::new(iri("comment"), true, audit());
        p.datatype = Some("xsd:string".to_string());
        let triples = p.emit_shacl_create(Some("_:b0")).unwrap();
        assert!(!triples.iter().any(|t| t.contains("a sh:PropertyShape")));
        assert!(triples.iter().any(|t| t.starts_with("_:b0 sh:path")));
    }

    #[test]
    fn owl_create_emits_object_property_for_class_range() {
        let mut p = PropertyClass::new(iri("authors"), false, audit());
        p.class = Some(iri("Person"));
        let triples = p.emit_owl_create(None).unwrap();
        assert!(triples.iter().any(|t| t.contains("owl:ObjectProperty")));
        assert!(triples.iter().any(|t| t.contains("rdfs:range test:Person")));
    }

    #[test]
    fn internal_property_owl_create_emits_domain() {
        let mut p = PropertyClass::new(iri("title"), true, audit());
        p.datatype = Some("xsd:string".to_string());
        let triples = p.emit_owl_create(Some(&iri("Book"))).unwrap();
        assert!(triples.iter().any(|t| t.contains("rdfs:domain test:Book")));
    }
}
