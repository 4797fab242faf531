/*!
`ResourceClass` (C6): a SHACL `NodeShape` with inline/standalone property children and OWL
cardinality restrictions. §4.6.
*/
use crate::base::{AuditFields, ModelBase};
use crate::has_property::HasProperty;
use crate::property::PropertyClass;
use oldap_core::collections::LangString;
use oldap_core::iri::Iri;
use oldap_core::xsd::{Xsd_dateTime, XsdValue};
use oldap_errors::{inconsistency_error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One property attached to a resource class, either owned inline (a blank-node `PropertyShape`
/// minted and destroyed with the class) or referencing a standalone property by QName.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyRef {
    Internal(PropertyClass),
    Standalone(Iri),
}

/// A superclass reference. Same-project superclasses are recursively read-through; external ones
/// are recorded as IRI-only (§4.6: "Superclasses pointing within the same project are recursively
/// `read`; external superclasses are recorded as IRI-only").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Superclass {
    ReadThrough(Box<ResourceClass>),
    ExternalRef(Iri),
}

impl Superclass {
    pub fn iri(&self) -> &Iri {
        match self {
            Superclass::ReadThrough(rc) => &rc.iri,
            Superclass::ExternalRef(iri) => iri,
        }
    }
}

/// A SHACL `NodeShape` plus its OWL class declaration and cardinality restrictions. §4.6.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceClass {
    pub iri: Iri,
    pub base: ModelBase,
    pub superclass: BTreeMap<String, Option<Superclass>>,
    pub label: Option<LangString>,
    pub comment: Option<LangString>,
    pub closed: Option<bool>,
    /// Properties attached via `sh:property`, each paired with its `HasProperty` cardinality
    /// facets, in declaration order.
    pub properties: Vec<(PropertyRef, HasProperty)>,
}

impl ResourceClass {
    pub fn new(iri: Iri, audit: AuditFields) -> Self {
        Self {
            iri,
            base: ModelBase::new(audit),
            superclass: BTreeMap::new(),
            label: None,
            comment: None,
            closed: None,
            properties: Vec::new(),
        }
    }

    fn node_shape(&self) -> String {
        format!("{}Shape", self.iri)
    }

    /// §4.6 "Create": one `INSERT DATA` split into `GRAPH :shacl { … }` and `GRAPH :onto { … }`.
    pub fn emit_create(&self) -> Result<(Vec<String>, Vec<String>)> {
        let subject = self.node_shape();
        let mut shacl = vec![
            format!("{subject} a sh:NodeShape ."),
            format!("{subject} sh:targetClass {} .", self.iri),
        ];
        shacl.extend(self.base.audit.to_rdf_triples(&subject));
        if let Some(label) = &self.label {
            shacl.extend(label.to_rdf_triples(&subject, "rdfs:label"));
        }
        if let Some(comment) = &self.comment {
            shacl.extend(comment.to_rdf_triples(&subject, "rdfs:comment"));
        }
        if let Some(closed) = self.closed {
            shacl.push(format!("{subject} sh:closed {closed} ."));
        }

        let mut owl = vec![format!("{} a owl:Class .", self.iri)];
        for super_iri in self.superclass.values().flatten() {
            owl.push(format!("{} rdfs:subClassOf {} .", self.iri, super_iri.iri()));
        }

        for (index, (property_ref, has_property)) in self.properties.iter().enumerate() {
            match property_ref {
                PropertyRef::Internal(property) => {
                    let blank = format!("_:p{index}");
                    shacl.push(format!("{subject} sh:property {blank} ."));
                    shacl.extend(property.emit_shacl_create(Some(&blank))?);
                    shacl.extend(has_property.emit_shacl(&blank));
                    owl.extend(property.emit_owl_create(Some(&self.iri))?);
                    let restriction = format!("_:r{index}");
                    owl.extend(has_property.emit_owl_restriction(&restriction, property));
                    owl.push(format!("{} rdfs:subClassOf {restriction} .", self.iri));
                }
                PropertyRef::Standalone(property_iri) => {
                    shacl.push(format!("{subject} sh:property {property_iri}Shape ."));
                    let restriction = format!("_:r{index}");
                    owl.push(format!("{} rdfs:subClassOf {restriction} .", self.iri));
                    owl.push(format!("{restriction} a owl:Restriction ."));
                    owl.push(format!("{restriction} owl:onProperty {property_iri} ."));
                }
            }
        }
        Ok((shacl, owl))
    }

    /// §4.6 "Update": a `WITH/DELETE/INSERT/WHERE` patch guarded by `dcterms:modified`, plus
    /// set-difference synchronization of superclasses. `added`/`removed` are same-project
    /// superclass IRIs computed by the caller from the change-set.
    pub fn emit_superclass_patch(&self, added: &[Iri], removed: &[Iri], now: &Xsd_dateTime) -> String {
        let subject = self.node_shape();
        let delete: String = removed
            .iter()
            .map(|iri| format!("{} rdfs:subClassOf {iri} .", self.iri))
            .collect::<Vec<_>>()
            .join(" ");
        let insert: String = added
            .iter()
            .map(|iri| format!("{} rdfs:subClassOf {iri} .", self.iri))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "WITH <onto> DELETE {{ {delete} ?s dcterms:modified ?m . }} INSERT {{ {insert} ?s dcterms:modified {} . }} WHERE {{ BIND({subject} AS ?s) ?s dcterms:modified ?m . FILTER(?m = {}) }}",
            now.to_rdf(),
            self.base.audit.modified.to_rdf()
        )
    }

    /// Attach an internal property, creating it first (§4.6: "Property additions of internal kind
    /// trigger `PropertyClass.create` first").
    pub fn add_internal_property(&mut self, property: PropertyClass, has_property: HasProperty) -> Result<()> {
        if !property.internal {
            return Err(inconsistency_error(format!(
                "{}: add_internal_property requires an internal PropertyClass",
                property.iri
            )));
        }
        self.properties.push((PropertyRef::Internal(property), has_property));
        Ok(())
    }

    pub fn add_standalone_property(&mut self, property_iri: Iri, has_property: HasProperty) {
        self.properties.push((PropertyRef::Standalone(property_iri), has_property));
    }

    /// Detach a property by IRI, returning the removed internal `PropertyClass` so the caller can
    /// `PropertyClass::emit_delete` it (§4.6: "removals call `PropertyClass.delete` on the
    /// displaced child (internal only)").
    pub fn remove_property(&mut self, property_iri: &Iri) -> Option<PropertyClass> {
        let position = self.properties.iter().position(|(property_ref, _)| match property_ref {
            PropertyRef::Internal(p) => &p.iri == property_iri,
            PropertyRef::Standalone(iri) => iri == property_iri,
        })?;
        let (property_ref, _) = self.properties.remove(position);
        match property_ref {
            PropertyRef::Internal(property) => Some(property),
            PropertyRef::Standalone(_) => None,
        }
    }

    /// §4.6 "Delete": remove the NodeShape and every blank-node child, then every OWL restriction
    /// node attached via `rdfs:subClassOf`, then the class declaration itself.
    pub fn emit_delete(&self) -> Vec<String> {
        let subject = self.node_shape();
        vec![
            format!("{subject} sh:property ?child . ?child ?childPred ?childObj ."),
            format!("{subject} ?shaclPred ?shaclObj ."),
            format!("{} rdfs:subClassOf ?restriction . ?restriction ?restrictionPred ?restrictionObj .", self.iri),
            format!("{} ?owlPred ?owlObj .", self.iri),
        ]
    }

    /// The number of distinct instances asserting `rdf:type` this class, for the `in_use` check
    /// gating delete. §9 Open Question #3: the count must be of DISTINCT instances, not every
    /// triple incidentally matching the class pattern.
    pub fn in_use_query(&self) -> String {
        format!(
            "SELECT (COUNT(DISTINCT ?instance) AS ?count) WHERE {{ ?instance rdf:type {} . }}",
            self.iri
        )
    }
}
