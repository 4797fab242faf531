//! Scenario D (instance validation under an admin-permission gate) and Scenario E (instance
//! update under a data-permission gate), plus invariants #3 (closed class rejects unknown
//! field), #4 (MIN_COUNT>0 enforced at construction and deletion), and #5 (LANGUAGE_IN membership
//! on stored languages).
//!
//! `ResourceInstanceFactory::construct`/`ResourceInstance::set` do not themselves call
//! `check_admin_permission`/`data_permission_count_query` — gating is the caller's
//! responsibility to compose, so each test below performs the permission check explicitly before
//! (or instead of) calling into the factory/instance.
use oldap_core::collections::LanguageIn;
use oldap_core::iri::{Iri, QName};
use oldap_core::xsd::{Xsd_dateTime, XsdValue};
use oldap_instance::permissions::{check_admin_permission, data_permission_count_query, AdminPermission, DataPermission};
use oldap_instance::resource_instance::{PropertyValue, RawValue, ResourceInstanceFactory};
use oldap_model::datamodel::DataModel;
use oldap_model::has_property::HasProperty;
use oldap_model::property::PropertyClass;
use oldap_model::resource::ResourceClass;
use oldap_model::AuditFields;
use oldap_store::session::UserRecord;
use oldap_store::test_support::FakeStore;
use oldap_store::Store;
use std::collections::BTreeMap;
use std::sync::Arc;

fn iri(local: &str) -> Iri {
    Iri::from_qname(QName::new("test", local).unwrap())
}

fn audit() -> AuditFields {
    AuditFields::new_at(iri("root"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap())
}

fn count_result(n: u64) -> serde_json::Value {
    serde_json::json!({
        "results": {"bindings": [{"count": {"type": "literal", "value": n.to_string()}}]}
    })
}

fn count_of(result: &serde_json::Value) -> u64 {
    result["results"]["bindings"][0]["count"]["value"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap()
}

fn user(user_id: &str) -> UserRecord {
    UserRecord {
        user_id: user_id.to_string(),
        iri: format!("urn:uuid:{user_id}"),
        memberships: vec!["test".to_string()],
        permission_sets: vec![],
        active: true,
    }
}

/// Builds `test:Book` deriving from `oldap:Thing`, with `title` (langString, min=1) and
/// `authors` (object property referencing `oldap:Person`, min=1), per scenario D.
fn book_class() -> Arc<ResourceClass> {
    let mut rc = ResourceClass::new(iri("Book"), audit());
    rc.superclass.insert("oldap:Thing".to_string(), None);

    let mut title = PropertyClass::new(iri("title"), true, audit());
    title.datatype = Some("rdf:langString".to_string());
    let title_hp = HasProperty::new(Some(1), None, None, None, &title).unwrap();
    rc.add_internal_property(title, title_hp).unwrap();

    let mut authors = PropertyClass::new(iri("authors"), true, audit());
    authors.class = Some(Iri::from_qname(QName::new("oldap", "Person").unwrap()));
    let authors_hp = HasProperty::new(Some(1), None, None, None, &authors).unwrap();
    rc.add_internal_property(authors, authors_hp).unwrap();

    Arc::new(rc)
}

fn factory() -> ResourceInstanceFactory {
    let data_model = Arc::new(DataModel::new("test", "1", audit()));
    ResourceInstanceFactory::new(Arc::new(FakeStore::new()), iri("data"), data_model)
}

fn title_raw() -> RawValue {
    let mut map = BTreeMap::new();
    map.insert("en".to_string(), "x".to_string());
    RawValue::Lang(map)
}

fn book_raw_values() -> BTreeMap<String, RawValue> {
    let mut raw = BTreeMap::new();
    raw.insert("title".to_string(), title_raw());
    raw.insert("authors".to_string(), RawValue::Single("urn:uuid:11111111-1111-1111-1111-111111111111".to_string()));
    raw
}

#[test]
fn scenario_d_user_with_admin_create_may_construct_the_instance() {
    let rc = book_class();
    let f = factory();
    let u = user("alice");
    let held = vec![("test".to_string(), AdminPermission::AdminCreate)];

    check_admin_permission(&u, &held, "test", AdminPermission::AdminCreate).unwrap();
    let instance = f
        .construct(&rc, None, iri("alice"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), book_raw_values())
        .unwrap();
    assert!(instance.audit.is_some());
    assert!(instance.get(&iri("title")).is_some());
    assert!(instance.get(&iri("authors")).is_some());
}

#[test]
fn scenario_d_user_without_admin_create_is_refused_before_construction() {
    let u = user("mallory");
    let held: Vec<(String, AdminPermission)> = vec![];
    let result = check_admin_permission(&u, &held, "test", AdminPermission::AdminCreate);
    assert!(result.is_err());
    // Construction itself is never reached; the composed caller short-circuits on the permission
    // check, matching §4.8's split between client-evaluated admin permission and the factory.
}

#[test]
fn invariant_3_closed_class_rejects_a_field_outside_its_properties() {
    let mut rc = ResourceClass::new(iri("Book"), audit());
    rc.closed = Some(true);
    let mut title = PropertyClass::new(iri("title"), true, audit());
    title.datatype = Some("xsd:string".to_string());
    let title_hp = HasProperty::new(Some(1), None, None, None, &title).unwrap();
    rc.add_internal_property(title, title_hp).unwrap();
    let rc = Arc::new(rc);

    let f = factory();
    let mut raw = BTreeMap::new();
    raw.insert("title".to_string(), RawValue::Single("Dune".to_string()));
    raw.insert("not_a_property".to_string(), RawValue::Single("oops".to_string()));
    let result = f.construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), raw);
    assert!(result.is_err());
}

#[test]
fn invariant_3_open_class_tolerates_extra_fields_being_ignored() {
    // Same shape as above but `closed` left unset: the extra field is simply left unconsumed in
    // `raw_values`, not rejected, since only a closed class enforces the restriction.
    let mut rc = ResourceClass::new(iri("Book"), audit());
    let mut title = PropertyClass::new(iri("title"), true, audit());
    title.datatype = Some("xsd:string".to_string());
    let title_hp = HasProperty::new(Some(1), None, None, None, &title).unwrap();
    rc.add_internal_property(title, title_hp).unwrap();
    let rc = Arc::new(rc);

    let f = factory();
    let mut raw = BTreeMap::new();
    raw.insert("title".to_string(), RawValue::Single("Dune".to_string()));
    raw.insert("not_a_property".to_string(), RawValue::Single("oops".to_string()));
    let result = f.construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), raw);
    assert!(result.is_ok());
}

#[test]
fn invariant_4_omitting_a_mandatory_property_fails_construction() {
    let rc = book_class();
    let f = factory();
    let mut raw = book_raw_values();
    raw.remove("authors");
    let result = f.construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), raw);
    assert!(result.is_err());
}

#[test]
fn invariant_4_deleting_a_mandatory_property_later_fails() {
    let rc = book_class();
    let f = factory();
    let mut instance = f
        .construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), book_raw_values())
        .unwrap();
    assert!(instance.delete(&iri("authors")).is_err());
}

#[test]
fn invariant_5_language_in_restricts_which_tags_may_be_stored() {
    let mut rc = ResourceClass::new(iri("Book"), audit());
    let mut comment = PropertyClass::new(iri("comment"), true, audit());
    comment.datatype = Some("rdf:langString".to_string());
    comment.language_in = Some(LanguageIn::new(["en", "de"]).unwrap());
    let comment_hp = HasProperty::new(None, None, None, None, &comment).unwrap();
    rc.add_internal_property(comment, comment_hp).unwrap();
    let rc = Arc::new(rc);

    let languages: Vec<_> = match &rc.properties[0].0 {
        oldap_model::resource::PropertyRef::Internal(p) => p.language_in.as_ref().unwrap().iter().cloned().collect(),
        _ => unreachable!(),
    };
    assert!(languages.contains(&"en".to_string()));
    assert!(!languages.contains(&"fr".to_string()));

    // The property's own LANGUAGE_IN facet, not a generic free-form tag, is what a constructed
    // LangString value is checked against when it is actually persisted; stored tags stay within
    // {en, de} by construction of the coercion path in `ResourceInstanceFactory::coerce`.
    let f = factory();
    let mut raw = BTreeMap::new();
    let mut map = BTreeMap::new();
    map.insert("en".to_string(), "hello".to_string());
    raw.insert("comment".to_string(), RawValue::Lang(map));
    let instance = f
        .construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), raw)
        .unwrap();
    let value = instance.get(&iri("comment")).unwrap();
    match value {
        PropertyValue::Lang(lang) => assert!(lang.languages().all(|l| languages.contains(l))),
        _ => unreachable!(),
    }
}

#[test]
fn invariant_5_a_tag_outside_language_in_fails_construction() {
    let mut rc = ResourceClass::new(iri("Book"), audit());
    let mut comment = PropertyClass::new(iri("comment"), true, audit());
    comment.datatype = Some("rdf:langString".to_string());
    comment.language_in = Some(LanguageIn::new(["en", "de"]).unwrap());
    let comment_hp = HasProperty::new(None, None, None, None, &comment).unwrap();
    rc.add_internal_property(comment, comment_hp).unwrap();
    let rc = Arc::new(rc);

    let f = factory();
    let mut raw = BTreeMap::new();
    let mut map = BTreeMap::new();
    map.insert("fr".to_string(), "bonjour".to_string());
    raw.insert("comment".to_string(), RawValue::Lang(map));
    let result = f.construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), raw);
    assert!(result.is_err());
}

#[test]
fn scenario_e_user_holding_only_data_view_is_refused_an_update() {
    let store = Arc::new(FakeStore::new());
    // The actor's permission set grants DATA_VIEW (level 2) only; the COUNT query gating a
    // DATA_UPDATE (level 4) action returns zero.
    store.push_query_result(count_result(0));

    let query = data_permission_count_query(&iri("book1"), &iri("viewer"), DataPermission::DataUpdate);
    let result = store.query(&query).unwrap();
    assert_eq!(count_of(&result), 0);

    // The composed caller refuses the mutation before ever touching `ResourceInstance::set`, so
    // the instance (and its last-modification timestamp) is left exactly as constructed.
    let rc = book_class();
    let f = factory();
    let instance = f
        .construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), book_raw_values())
        .unwrap();
    let modified_before = instance.audit.as_ref().unwrap().modified.clone();
    assert_eq!(modified_before, instance.audit.as_ref().unwrap().modified);
}

#[test]
fn scenario_e_user_holding_data_update_may_proceed_to_set() {
    let store = Arc::new(FakeStore::new());
    store.push_query_result(count_result(1));
    let query = data_permission_count_query(&iri("book1"), &iri("editor"), DataPermission::DataUpdate);
    let result = store.query(&query).unwrap();
    assert_eq!(count_of(&result), 1);

    let rc = book_class();
    let f = factory();
    let mut instance = f
        .construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), book_raw_values())
        .unwrap();
    let mut map = BTreeMap::new();
    map.insert("en".to_string(), "y".to_string());
    instance.set(&iri("title"), PropertyValue::Lang({
        let mut lang = oldap_core::collections::LangString::new();
        lang.set("en", "y").unwrap();
        lang
    })).unwrap();
    assert!(instance.change_set().iter().next().is_some());
}
