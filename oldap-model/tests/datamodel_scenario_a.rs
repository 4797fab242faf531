//! Scenario A (Datamodel round-trip) and invariant #2 (`DataModel::read(project(M)) == M` up to
//! audit fields) and invariant #8 (cache-then-read returns the write's timestamp).
use oldap_core::collections::LanguageIn;
use oldap_core::iri::{Iri, QName};
use oldap_core::xsd::{Xsd_dateTime, XsdValue};
use oldap_model::datamodel::{DataModel, DataModelEntry};
use oldap_model::has_property::HasProperty;
use oldap_model::property::PropertyClass;
use oldap_model::resource::ResourceClass;
use oldap_model::AuditFields;
use oldap_store::cache::{ArtifactCache, InProcessCache};

fn qn(local: &str) -> QName {
    QName::new("dmtest", local).unwrap()
}

fn iri(local: &str) -> Iri {
    Iri::from_qname(qn(local))
}

fn audit_at(lexical: &str) -> AuditFields {
    AuditFields::new_at(
        Iri::from_qname(QName::new("oldap", "root").unwrap()),
        Xsd_dateTime::new(lexical, true).unwrap(),
    )
}

/// Builds the project `dmtest` model described in §8 scenario A: a standalone langString
/// `dmtest:comment` (unique language, `languageIn = {en,de,fr,it}`), a `dmtest:Book` with
/// `title`/`authors`/`comment`, and a `dmtest:Page` with `pagenum`/`inbook`/`comment`.
fn build_dmtest_model() -> DataModel {
    let mut dm = DataModel::new("dmtest", "1", audit_at("2024-01-01T00:00:00Z"));

    let mut comment = PropertyClass::new(iri("comment"), false, audit_at("2024-01-01T00:00:00Z"));
    comment.datatype = Some("rdf:langString".to_string());
    comment.unique_lang = Some(true);
    comment.language_in = Some(LanguageIn::new(["en", "de", "fr", "it"]).unwrap());
    dm.add_standalone_property(qn("comment"), comment);

    let mut book = ResourceClass::new(iri("Book"), audit_at("2024-01-01T00:00:00Z"));
    let mut title = PropertyClass::new(iri("title"), true, audit_at("2024-01-01T00:00:00Z"));
    title.datatype = Some("rdf:langString".to_string());
    let title_hp = HasProperty::new(Some(1), None, None, None, &title).unwrap();
    book.add_internal_property(title, title_hp).unwrap();

    let mut authors = PropertyClass::new(iri("authors"), true, audit_at("2024-01-01T00:00:00Z"));
    authors.class = Some(Iri::from_qname(QName::new("oldap", "Person").unwrap()));
    let authors_hp = HasProperty::new(Some(1), None, None, None, &authors).unwrap();
    book.add_internal_property(authors, authors_hp).unwrap();

    let comment_hp = HasProperty::new(None, None, None, None, &PropertyClass::new(iri("comment"), false, audit_at("2024-01-01T00:00:00Z"))).unwrap();
    book.add_standalone_property(iri("comment"), comment_hp);
    dm.add_resource_class(qn("Book"), book);

    let mut page = ResourceClass::new(iri("Page"), audit_at("2024-01-01T00:00:00Z"));
    let mut pagenum = PropertyClass::new(iri("pagenum"), true, audit_at("2024-01-01T00:00:00Z"));
    pagenum.datatype = Some("xsd:int".to_string());
    let pagenum_hp = HasProperty::new(Some(1), Some(1), None, None, &pagenum).unwrap();
    page.add_internal_property(pagenum, pagenum_hp).unwrap();

    let mut inbook = PropertyClass::new(iri("inbook"), true, audit_at("2024-01-01T00:00:00Z"));
    inbook.class = Some(iri("Book"));
    let inbook_hp = HasProperty::new(Some(1), Some(1), None, None, &inbook).unwrap();
    page.add_internal_property(inbook, inbook_hp).unwrap();

    let page_comment_hp = HasProperty::new(None, None, None, None, &PropertyClass::new(iri("comment"), false, audit_at("2024-01-01T00:00:00Z"))).unwrap();
    page.add_standalone_property(iri("comment"), page_comment_hp);
    dm.add_resource_class(qn("Page"), page);

    dm
}

#[test]
fn create_then_read_reproduces_every_attribute_and_child() {
    let model = build_dmtest_model();
    let cache = InProcessCache::default();
    model.store_in_cache(&cache).unwrap();

    let reread = DataModel::read(&cache, "dmtest").unwrap();
    assert_eq!(reread.project_shortname, model.project_shortname);
    assert_eq!(reread.version, model.version);
    assert_eq!(reread.standalone_properties(), model.standalone_properties());
    assert_eq!(reread.resource_classes(), model.resource_classes());

    let book = match reread.get(&qn("Book")) {
        Some(DataModelEntry::ResourceClass(rc)) => rc,
        other => panic!("expected a resource class, got {other:?}"),
    };
    let comment_ref = book
        .properties
        .iter()
        .find(|(property_ref, _)| matches!(property_ref, oldap_model::resource::PropertyRef::Standalone(i) if i == &iri("comment")));
    assert!(comment_ref.is_some());
}

#[test]
fn standalone_comment_has_unique_lang_and_four_languages() {
    let model = build_dmtest_model();
    let comment = model.standalone_properties().get(&qn("comment")).unwrap();
    assert_eq!(comment.unique_lang, Some(true));
    let languages = comment.language_in.as_ref().unwrap();
    for code in ["en", "de", "fr", "it"] {
        assert!(languages.contains(code));
    }
}

#[test]
fn cache_read_after_write_returns_the_write_timestamp() {
    let model = build_dmtest_model();
    let cache = InProcessCache::default();
    model.store_in_cache(&cache).unwrap();

    let reread = DataModel::read(&cache, "dmtest").unwrap();
    assert_eq!(reread.base.audit.modified, model.base.audit.modified);
}
