/*!
`HasProperty` (C5): the cardinality/ordering facets a `ResourceClass` attaches to one of its
properties. §4.5.
*/
use crate::property::PropertyClass;
use oldap_errors::{inconsistency_error, Result};
use serde::{Deserialize, Serialize};

/// `MIN_COUNT`/`MAX_COUNT`/`ORDER`/`GROUP` attached to one property on one resource class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HasProperty {
    pub min_count: Option<u64>,
    pub max_count: Option<u64>,
    pub order: Option<u64>,
    pub group: Option<String>,
}

impl HasProperty {
    /// Construct a `HasProperty`, checking functional/inverse-functional consistency against
    /// `property` at construction time (§4.5: "Functional/inverse-functional consistency is
    /// checked at construction").
    ///
    /// A functional OWL property (`owl:FunctionalProperty`, here signalled by the property class
    /// already fixing `max_count == 1`) cannot be attached with a larger `max_count`; an
    /// inverse-functional one requires `min_count == max_count == 1`.
    pub fn new(
        min_count: Option<u64>,
        max_count: Option<u64>,
        order: Option<u64>,
        group: Option<String>,
        property: &PropertyClass,
    ) -> Result<Self> {
        let has_property = Self {
            min_count,
            max_count,
            order,
            group,
        };
        has_property.check_consistency(property)?;
        Ok(has_property)
    }

    fn check_consistency(&self, property: &PropertyClass) -> Result<()> {
        if let Some(min) = self.min_count {
            if let Some(max) = self.max_count {
                if min > max {
                    return Err(inconsistency_error(format!(
                        "{}: MIN_COUNT {min} exceeds MAX_COUNT {max}",
                        property.iri
                    )));
                }
            }
        }
        if property.inverse_of.is_some() {
            let inverse_functional_ok = self.min_count == Some(1) && self.max_count == Some(1);
            if !inverse_functional_ok {
                return Err(inconsistency_error(format!(
                    "{}: inverse-functional property requires MIN_COUNT = MAX_COUNT = 1",
                    property.iri
                )));
            }
        }
        Ok(())
    }

    /// §4.5 "Emission into SHACL is a group of four optional facets on the owning inline property
    /// node."
    pub fn emit_shacl(&self, subject: &str) -> Vec<String> {
        let mut triples = Vec::new();
        if let Some(v) = self.min_count {
            triples.push(format!("{subject} sh:minCount {v} ."));
        }
        if let Some(v) = self.max_count {
            triples.push(format!("{subject} sh:maxCount {v} ."));
        }
        if let Some(v) = self.order {
            triples.push(format!("{subject} sh:order {v} ."));
        }
        if let Some(group) = &self.group {
            triples.push(format!("{subject} sh:group {group} ."));
        }
        triples
    }

    /// §4.5: "if `min == max` → `owl:qualifiedCardinality`, else `owl:min/maxQualifiedCardinality`,
    /// always paired with `owl:onDatatype` or `owl:onClass`." Returns the restriction node's
    /// triples; `restriction_node` is the caller-minted blank node identifier.
    pub fn emit_owl_restriction(&self, restriction_node: &str, property: &PropertyClass) -> Vec<String> {
        let mut triples = vec![
            format!("{restriction_node} a owl:Restriction ."),
            format!("{restriction_node} owl:onProperty {} .", property.iri),
        ];
        let on_range = match (&property.class, &property.datatype) {
            (Some(class), _) => format!("owl:onClass {class}"),
            (None, Some(dt)) => format!("owl:onDatatype {dt}"),
            (None, None) => String::new(),
        };

        match (self.min_count, self.max_count) {
            (Some(min), Some(max)) if min == max => {
                triples.push(format!("{restriction_node} owl:qualifiedCardinality {min} ."));
            }
            (min, max) => {
                if let Some(min) = min {
                    triples.push(format!("{restriction_node} owl:minQualifiedCardinality {min} ."));
                }
                if let Some(max) = max {
                    triples.push(format!("{restriction_node} owl:maxQualifiedCardinality {max} ."));
                }
            }
        }
        if !on_range.is_empty() {
            triples.push(format!("{restriction_node} {on_range} ."));
        }
        triples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::AuditFields;
    use oldap_core::iri::{Iri, QName};
    use oldap_core::xsd::{Xsd_dateTime, XsdValue};

    fn iri(local: &str) -> Iri {
        Iri::from_qname(QName::new("test", local).unwrap())
    }

    fn data_property() -> PropertyClass {
        let mut p = PropertyClass::new(
            iri("title"),
            true,
            AuditFields::new_at(iri("root"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap()),
        );
        p.datatype = Some("xsd:string".to_string());
        p
    }

    #[test]
    fn min_exceeding_max_is_inconsistent() {
        let property = data_property();
        assert!(HasProperty::new(Some(3), Some(1), None, None, &property).is_err());
    }

    #[test]
    fn inverse_functional_requires_exactly_one() {
        let mut property = data_property();
        property.inverse_of = Some(iri("hasAuthor"));
        assert!(HasProperty::new(Some(0), Some(1), None, None, &property).is_err());
        assert!(HasProperty::new(Some(1), Some(1), None, None, &property).is_ok());
    }

    #[test]
    fn equal_min_max_emits_qualified_cardinality() {
        let property = data_property();
        let hp = HasProperty::new(Some(1), Some(1), None, None, &property).unwrap();
        let triples = hp.emit_owl_restriction("_:r0", &property);
        assert!(triples.iter().any(|t| t.contains("owl:qualifiedCardinality 1")));
        assert!(triples.iter().any(|t| t.contains("owl:onDatatype xsd:string")));
    }

    #[test]
    fn unequal_min_max_emits_min_and_max_qualified_cardinality() {
        let property = data_property();
        let hp = HasProperty::new(Some(0), Some(3), None, None, &property).unwrap();
        let triples = hp.emit_owl_restriction("_:r0", &property);
        assert!(triples.iter().any(|t| t.contains("owl:minQualifiedCardinality 0")));
        assert!(triples.iter().any(|t| t.contains("owl:maxQualifiedCardinality 3")));
    }

    #[test]
    fn shacl_emission_includes_only_set_facets() {
        let property = data_property();
        let hp = HasProperty::new(Some(1), None, Some(5), None, &property).unwrap();
        let triples = hp.emit_shacl("_:b0");
        assert_eq!(triples.len(), 2);
        assert!(triples.iter().any(|t| t.contains("sh:minCount 1")));
        assert!(triples.iter().any(|t| t.contains("sh:order 5")));
    }
}
