/*!
`ResourceInstance` and `ResourceInstanceFactory` (C8): the generated instance type per resource
class, its construction/getter/setter/deleter semantics, and its transactional
create/read/update/delete methods. §4.8.
*/
use crate::permissions::{data_permission_count_query, DataPermission};
use oldap_core::changeset::{ChangeAction, ChangeSet};
use oldap_core::collections::LangString;
use oldap_core::context::Context;
use oldap_core::iri::Iri;
use oldap_core::query::{Cell, QueryProcessor};
use oldap_core::xsd::{Numeric, Xsd_dateTime, XsdValue};
use oldap_errors::{inconsistency_error, no_permission_error, not_found_error, value_error, Result};
use oldap_model::datamodel::DataModel;
use oldap_model::property::PropertyClass;
use oldap_model::resource::{PropertyRef, ResourceClass, Superclass};
use oldap_model::{AuditFields, HasProperty};
use oldap_store::Store;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// A raw, caller-supplied value keyed by a property's local fragment name, before coercion to the
/// declared datatype. §4.8: "Accepts keyword arguments keyed by property fragment name."
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Single(String),
    Multiple(Vec<String>),
    Lang(BTreeMap<String, String>),
}

/// A coerced property value: a singleton, a set (multi-valued, non-language-tagged), or a
/// language-tagged map. §4.8: "single value → singleton set; collection → set or `LangString`
/// when `DATATYPE == langString`."
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Single(Cell),
    Multiple(Vec<Cell>),
    Lang(LangString),
}

impl PropertyValue {
    pub fn as_single(&self) -> Option<&Cell> {
        match self {
            PropertyValue::Single(cell) => Some(cell),
            _ => None,
        }
    }

    fn lexical_values(&self) -> Vec<String> {
        match self {
            PropertyValue::Single(cell) => vec![cell_lexical(cell)],
            PropertyValue::Multiple(cells) => cells.iter().map(cell_lexical).collect(),
            PropertyValue::Lang(lang) => lang.languages().filter_map(|l| lang.get(l)).map(str::to_string).collect(),
        }
    }

    fn count(&self) -> usize {
        match self {
            PropertyValue::Single(_) => 1,
            PropertyValue::Multiple(cells) => cells.len(),
            PropertyValue::Lang(lang) => lang.len(),
        }
    }
}

fn cell_lexical(cell: &Cell) -> String {
    match cell {
        Cell::Iri(iri) => iri.to_string(),
        Cell::BNode(bnode) => bnode.to_string(),
        Cell::String(v) => v.lexical_value(),
        Cell::Boolean(v) => v.lexical_value(),
        Cell::Integer(v) => v.lexical_value(),
        Cell::Int(v) => v.lexical_value(),
        Cell::Long(v) => v.lexical_value(),
        Cell::Short(v) => v.lexical_value(),
        Cell::Byte(v) => v.lexical_value(),
        Cell::NonNegativeInteger(v) => v.lexical_value(),
        Cell::NonPositiveInteger(v) => v.lexical_value(),
        Cell::NegativeInteger(v) => v.lexical_value(),
        Cell::PositiveInteger(v) => v.lexical_value(),
        Cell::UnsignedByte(v) => v.lexical_value(),
        Cell::UnsignedShort(v) => v.lexical_value(),
        Cell::UnsignedInt(v) => v.lexical_value(),
        Cell::UnsignedLong(v) => v.lexical_value(),
        Cell::Decimal(v) => v.lexical_value(),
        Cell::Float(v) => v.lexical_value(),
        Cell::Double(v) => v.lexical_value(),
        Cell::Date(v) => v.lexical_value(),
        Cell::Time(v) => v.lexical_value(),
        Cell::DateTime(v) => v.lexical_value(),
        Cell::Duration(v) => v.lexical_value(),
        Cell::GYear(v) => v.lexical_value(),
        Cell::GMonth(v) => v.lexical_value(),
        Cell::GDay(v) => v.lexical_value(),
        Cell::GYearMonth(v) => v.lexical_value(),
        Cell::GMonthDay(v) => v.lexical_value(),
        Cell::HexBinary(v) => v.lexical_value(),
        Cell::Base64Binary(v) => v.lexical_value(),
        Cell::AnyUri(v) => v.lexical_value(),
        Cell::UnknownTyped { lexical, .. } => lexical.clone(),
    }
}

fn cell_numeric(cell: &Cell) -> Option<Numeric> {
    match cell {
        Cell::Integer(v) => Some(Numeric::Integer(v.clone())),
        Cell::Int(v) => Some(Numeric::Int(v.clone())),
        Cell::Long(v) => Some(Numeric::Long(v.clone())),
        Cell::Short(v) => Some(Numeric::Short(v.clone())),
        Cell::Byte(v) => Some(Numeric::Byte(v.clone())),
        Cell::NonNegativeInteger(v) => Some(Numeric::NonNegativeInteger(v.clone())),
        Cell::NonPositiveInteger(v) => Some(Numeric::NonPositiveInteger(v.clone())),
        Cell::NegativeInteger(v) => Some(Numeric::NegativeInteger(v.clone())),
        Cell::PositiveInteger(v) => Some(Numeric::PositiveInteger(v.clone())),
        Cell::UnsignedByte(v) => Some(Numeric::UnsignedByte(v.clone())),
        Cell::UnsignedShort(v) => Some(Numeric::UnsignedShort(v.clone())),
        Cell::UnsignedInt(v) => Some(Numeric::UnsignedInt(v.clone())),
        Cell::UnsignedLong(v) => Some(Numeric::UnsignedLong(v.clone())),
        Cell::Decimal(v) => Some(Numeric::Decimal(v.clone())),
        Cell::Float(v) => Some(Numeric::Float(v.clone())),
        Cell::Double(v) => Some(Numeric::Double(v.clone())),
        _ => None,
    }
}

/// Find a property's defining `PropertyClass`, following standalone references into `data_model`.
fn resolve_property<'a>(data_model: &'a DataModel, property_ref: &'a PropertyRef) -> Result<&'a PropertyClass> {
    match property_ref {
        PropertyRef::Internal(property) => Ok(property),
        PropertyRef::Standalone(iri) => data_model
            .standalone_properties()
            .values()
            .find(|p| &p.iri == iri)
            .ok_or_else(|| not_found_error(format!("{iri}: standalone property not found in data model"))),
    }
}

/// Collect `(property_ref, has_property)` across the superclass chain, superclasses first (in
/// declaration order), own properties last. §4.8: "Superclass properties are processed before own
/// properties so that inherited fields are visible."
fn all_properties(class: &ResourceClass) -> Vec<(&PropertyRef, &HasProperty)> {
    let mut collected = Vec::new();
    for superclass in class.superclass.values().flatten() {
        if let Superclass::ReadThrough(parent) = superclass {
            collected.extend(all_properties(parent));
        }
    }
    collected.extend(class.properties.iter().map(|(p, h)| (p, h)));
    collected
}

/// `true` if any ancestor in the superclass chain is `oldap:Thing`. §4.8: "If any superclass is
/// `oldap:Thing`, the four system audit fields are populated."
fn derives_from_thing(class: &ResourceClass) -> bool {
    class.superclass.keys().any(|name| name == "oldap:Thing")
        || class.superclass.values().flatten().any(|superclass| match superclass {
            Superclass::ExternalRef(iri) => iri.fragment() == "Thing",
            Superclass::ReadThrough(parent) => derives_from_thing(parent),
        })
}

fn find_has_property<'a>(class: &'a ResourceClass, property_iri: &Iri) -> Option<&'a HasProperty> {
    for (property_ref, has_property) in &class.properties {
        let matches = match property_ref {
            PropertyRef::Internal(p) => &p.iri == property_iri,
            PropertyRef::Standalone(iri) => iri == property_iri,
        };
        if matches {
            return Some(has_property);
        }
    }
    for superclass in class.superclass.values().flatten() {
        if let Superclass::ReadThrough(parent) = superclass {
            if let Some(hp) = find_has_property(parent, property_iri) {
                return Some(hp);
            }
        }
    }
    None
}

/// Validate `value` against every applicable SHACL facet on `property`. §3: "Every property is
/// then validated against every applicable SHACL facet."
pub fn validate_value(property: &PropertyClass, has_property: &HasProperty, value: &PropertyValue) -> Result<()> {
    let count = value.count();
    if let Some(min) = has_property.min_count {
        if (count as u64) < min {
            return Err(value_error(format!(
                "{}: {count} value(s) present, MIN_COUNT requires {min}",
                property.iri
            )));
        }
    }
    if let Some(max) = has_property.max_count {
        if (count as u64) > max {
            return Err(value_error(format!(
                "{}: {count} value(s) present, MAX_COUNT allows {max}",
                property.iri
            )));
        }
    }

    if let (PropertyValue::Lang(lang_string), Some(language_in)) = (value, &property.language_in) {
        for language in lang_string.languages() {
            if !language_in.contains(language) {
                return Err(value_error(format!(
                    "{}: language tag '{language}' is not a member of LANGUAGE_IN",
                    property.iri
                )));
            }
        }
    }

    for lexical in value.lexical_values() {
        if let Some(min_len) = property.min_length {
            if (lexical.chars().count() as u64) < min_len {
                return Err(inconsistency_error(format!(
                    "{}: value '{lexical}' shorter than MIN_LENGTH {min_len}",
                    property.iri
                )));
            }
        }
        if let Some(max_len) = property.max_length {
            if (lexical.chars().count() as u64) > max_len {
                return Err(inconsistency_error(format!(
                    "{}: value '{lexical}' longer than MAX_LENGTH {max_len}",
                    property.iri
                )));
            }
        }
        if let Some(pattern) = &property.pattern {
            let re = Regex::new(pattern)
                .map_err(|e| inconsistency_error(format!("{}: invalid PATTERN '{pattern}': {e}", property.iri)))?;
            if !re.is_match(&lexical) {
                return Err(inconsistency_error(format!(
                    "{}: value '{lexical}' does not match PATTERN '{pattern}'",
                    property.iri
                )));
            }
        }
        if let Some(in_) = &property.in_ {
            if !in_.contains_lexical(&lexical) {
                return Err(value_error(format!(
                    "{}: value '{lexical}' is not a member of IN",
                    property.iri
                )));
            }
        }
    }

    let cells: Vec<&Cell> = match value {
        PropertyValue::Single(c) => vec![c],
        PropertyValue::Multiple(cs) => cs.iter().collect(),
        PropertyValue::Lang(_) => Vec::new(),
    };
    for cell in cells {
        if let Some(n) = cell_numeric(cell) {
            if let Some(bound) = &property.min_exclusive {
                if n <= *bound {
                    return Err(inconsistency_error(format!("{}: value below MIN_EXCLUSIVE", property.iri)));
                }
            }
            if let Some(bound) = &property.max_exclusive {
                if n >= *bound {
                    return Err(inconsistency_error(format!("{}: value above MAX_EXCLUSIVE", property.iri)));
                }
            }
            if let Some(bound) = &property.min_inclusive {
                if n < *bound {
                    return Err(inconsistency_error(format!("{}: value below MIN_INCLUSIVE", property.iri)));
                }
            }
            if let Some(bound) = &property.max_inclusive {
                if n > *bound {
                    return Err(inconsistency_error(format!("{}: value above MAX_INCLUSIVE", property.iri)));
                }
            }
        }
    }

    Ok(())
}

/// One materialized resource, generated by a [`ResourceInstanceFactory`]. §4.8.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceInstance {
    pub iri: Iri,
    /// The project this instance belongs to, used directly by the permission checks (rather than
    /// re-deriving it from the open connection). §9 Open Question: permission checks read this
    /// field, not a connection-scoped default.
    pub project: Iri,
    pub class: Arc<ResourceClass>,
    pub audit: Option<AuditFields>,
    data_model: Arc<DataModel>,
    values: BTreeMap<Iri, PropertyValue>,
    change_set: ChangeSet,
}

impl ResourceInstance {
    pub fn get(&self, property_iri: &Iri) -> Option<&PropertyValue> {
        self.values.get(property_iri)
    }

    pub fn values(&self) -> &BTreeMap<Iri, PropertyValue> {
        &self.values
    }

    /// Re-validate and install a new value. On validation failure the instance is left unchanged.
    /// §4.8: "on failure it raises and leaves state unchanged."
    pub fn set(&mut self, property_iri: &Iri, value: PropertyValue) -> Result<()> {
        let has_property = find_has_property(&self.class, property_iri)
            .ok_or_else(|| not_found_error(format!("{property_iri}: no such property on this class")))?;
        let (property_ref, _) = all_properties(&self.class)
            .into_iter()
            .find(|(p, _)| property_ref_matches(p, property_iri))
            .ok_or_else(|| not_found_error(format!("{property_iri}: no such property on this class")))?;
        let property = resolve_property(&self.data_model, property_ref)?;
        validate_value(property, has_property, &value)?;

        let old_value = self.values.get(property_iri).map(|v| format!("{v:?}"));
        self.change_set.record(
            &property_iri.to_string(),
            if old_value.is_some() { ChangeAction::Replace } else { ChangeAction::Create },
            old_value,
        );
        self.values.insert(property_iri.clone(), value);
        Ok(())
    }

    /// Remove a value, refusing when `MIN_COUNT > 0`. §4.8: "The deleter refuses when `MIN_COUNT >
    /// 0`."
    pub fn delete(&mut self, property_iri: &Iri) -> Result<()> {
        let has_property = find_has_property(&self.class, property_iri)
            .ok_or_else(|| not_found_error(format!("{property_iri}: no such property on this class")))?;
        if has_property.min_count.unwrap_or(0) > 0 {
            return Err(value_error(format!(
                "{property_iri}: cannot delete, MIN_COUNT requires at least one value"
            )));
        }
        if let Some(old) = self.values.remove(property_iri) {
            self.change_set
                .record(&property_iri.to_string(), ChangeAction::Delete, Some(format!("{old:?}")));
        }
        Ok(())
    }

    pub fn change_set(&self) -> &ChangeSet {
        &self.change_set
    }

    /// §4.8 "Create": one `INSERT DATA` with `⟨iri⟩ a ⟨project⟩:⟨ClassName⟩ ; pred val ; …`,
    /// including the audit quad if the class derives from `oldap:Thing`.
    pub fn emit_create(&self) -> Vec<String> {
        let mut triples = vec![format!("{} rdf:type {} .", self.iri, self.class.iri)];
        if let Some(audit) = &self.audit {
            triples.extend(audit.to_rdf_triples(&self.iri.to_string()));
        }
        for (property_iri, value) in &self.values {
            triples.extend(emit_value_triples(&self.iri, property_iri, value));
        }
        vec![format!("INSERT DATA {{ GRAPH <{}> {{ {} }} }}", self.project, triples.join(" "))]
    }

    /// §4.8 "Update": a `WITH :data DELETE { old } INSERT { new } WHERE { bind + old-match }` per
    /// changed property, then a `dcterms:modified` compare-and-swap, read back to confirm.
    pub fn emit_update_patches(&self, now: &Xsd_dateTime) -> Vec<String> {
        let mut patches = Vec::new();
        for (field, entry) in self.change_set.iter() {
            if let Ok(property_iri) = Iri::new(field.clone(), false) {
                match self.values.get(&property_iri) {
                    Some(value) => {
                        let insert = emit_value_triples(&self.iri, &property_iri, value).join(" ");
                        patches.push(format!(
                            "WITH <{}> DELETE {{ {} ?p ?o . }} INSERT {{ {} }} WHERE {{ {} ?p ?o . FILTER(?p = {}) }}",
                            self.project, self.iri, insert, self.iri, property_iri
                        ));
                    }
                    None if entry.action == ChangeAction::Delete => {
                        patches.push(format!(
                            "WITH <{}> DELETE {{ {} ?p ?o . }} WHERE {{ {} ?p ?o . FILTER(?p = {}) }}",
                            self.project, self.iri, self.iri, property_iri
                        ));
                    }
                    None => {}
                }
            }
        }
        if let Some(audit) = &self.audit {
            patches.push(format!(
                "WITH <{}> DELETE {{ {} dcterms:modified ?old . }} INSERT {{ {} dcterms:modified {} . }} WHERE {{ {} dcterms:modified ?old . FILTER(?old = {}) }}",
                self.project, self.iri, self.iri, now.to_rdf(), self.iri, audit.modified.to_rdf()
            ));
        }
        patches
    }

    /// §4.8 "Delete": refused by the caller if `in_use`-style references exist; here, the raw
    /// triple removal.
    pub fn emit_delete(&self) -> String {
        format!("WITH <{}> DELETE WHERE {{ {} ?p ?o . }}", self.project, self.iri)
    }
}

fn property_ref_matches(property_ref: &PropertyRef, iri: &Iri) -> bool {
    match property_ref {
        PropertyRef::Internal(p) => &p.iri == iri,
        PropertyRef::Standalone(i) => i == iri,
    }
}

fn emit_value_triples(subject: &Iri, property_iri: &Iri, value: &PropertyValue) -> Vec<String> {
    match value {
        PropertyValue::Single(cell) => vec![format!("{subject} {property_iri} {} .", cell_to_rdf_term(cell))],
        PropertyValue::Multiple(cells) => cells
            .iter()
            .map(|cell| format!("{subject} {property_iri} {} .", cell_to_rdf_term(cell)))
            .collect(),
        PropertyValue::Lang(lang) => lang.to_rdf_triples(&subject.to_string(), &property_iri.to_string()),
    }
}

fn cell_to_rdf_term(cell: &Cell) -> String {
    match cell {
        Cell::Iri(iri) => iri.to_string(),
        Cell::BNode(bnode) => bnode.to_string(),
        other => {
            let lexical = cell_lexical(other);
            format!("\"{}\"", oldap_core::xsd::escape_rdf_string(&lexical))
        }
    }
}

/// Reads a project's `DataModel` and materializes/loads resource instances. §4.8:
/// "`ResourceInstanceFactory(con, project)` reads the project's `DataModel` and returns, per class
/// name, a *generated instance type*."
#[derive(Debug)]
pub struct ResourceInstanceFactory {
    pub connection: Arc<dyn Store>,
    pub project: Iri,
    pub data_model: Arc<DataModel>,
    context: Context,
}

impl ResourceInstanceFactory {
    pub fn new(connection: Arc<dyn Store>, project: Iri, data_model: Arc<DataModel>) -> Self {
        Self {
            connection,
            project,
            data_model,
            context: Context::new(),
        }
    }

    fn coerce(&self, property: &PropertyClass, raw: RawValue) -> Result<PropertyValue> {
        if property.datatype.as_deref() == Some("rdf:langString") {
            let RawValue::Lang(map) = raw else {
                return Err(inconsistency_error(format!(
                    "{}: expected language-tagged values for rdf:langString",
                    property.iri
                )));
            };
            let mut lang_string = LangString::with_unique_lang(property.unique_lang.unwrap_or(false));
            for (lang, text) in map {
                lang_string.set(lang, text)?;
            }
            lang_string.clear_change_tracking();
            return Ok(PropertyValue::Lang(lang_string));
        }

        match raw {
            RawValue::Single(lexical) => Ok(PropertyValue::Single(self.decode(property, &lexical)?)),
            RawValue::Multiple(items) => {
                let mut cells = Vec::with_capacity(items.len());
                for item in items {
                    cells.push(self.decode(property, &item)?);
                }
                Ok(PropertyValue::Multiple(cells))
            }
            RawValue::Lang(_) => Err(inconsistency_error(format!(
                "{}: language-tagged value supplied for a non-langString property",
                property.iri
            ))),
        }
    }

    fn decode(&self, property: &PropertyClass, lexical: &str) -> Result<Cell> {
        let processor = QueryProcessor::new(&self.context);
        let json = if let Some(class) = &property.class {
            serde_json::json!({ "type": "uri", "value": class_member_full_iri(class, lexical) })
        } else if let Some(datatype) = &property.datatype {
            serde_json::json!({ "type": "literal", "value": lexical, "datatype": datatype })
        } else {
            serde_json::json!({ "type": "literal", "value": lexical })
        };
        processor.decode_cell(&json)
    }

    fn all_properties<'a>(&self, class: &'a ResourceClass) -> Vec<(&'a PropertyRef, &'a HasProperty)> {
        all_properties(class)
    }

    /// §4.8 "Construction": coerce raw keyword values, validate every facet, clear the change-set.
    pub fn construct(
        &self,
        class: &Arc<ResourceClass>,
        iri: Option<Iri>,
        actor: Iri,
        now: Xsd_dateTime,
        mut raw_values: BTreeMap<String, RawValue>,
    ) -> Result<ResourceInstance> {
        let iri = iri.unwrap_or_else(|| Iri::from_full(format!("urn:uuid:{}", Uuid::new_v4())));
        let mut values = BTreeMap::new();

        for (property_ref, has_property) in self.all_properties(class) {
            let property = resolve_property(&self.data_model, property_ref)?;
            let fragment = property.iri.fragment().to_string();
            let raw = raw_values.remove(&fragment);
            match raw {
                None => {
                    if has_property.min_count.unwrap_or(0) > 0 {
                        return Err(value_error(format!(
                            "{}: MIN_COUNT requires a value but none was supplied",
                            property.iri
                        )));
                    }
                }
                Some(raw) => {
                    let value = self.coerce(property, raw)?;
                    validate_value(property, has_property, &value)?;
                    values.insert(property.iri.clone(), value);
                }
            }
        }

        if class.closed == Some(true) && !raw_values.is_empty() {
            let unknown: Vec<&String> = raw_values.keys().collect();
            return Err(value_error(format!(
                "{}: closed resource class rejects unknown field(s) {unknown:?}",
                class.iri
            )));
        }

        let audit = if derives_from_thing(class) {
            Some(AuditFields::new_at(actor, now))
        } else {
            None
        };

        Ok(ResourceInstance {
            iri,
            project: self.project.clone(),
            class: Arc::clone(class),
            audit,
            data_model: Arc::clone(&self.data_model),
            values,
            change_set: ChangeSet::new(),
        })
    }

    /// §4.8 "Read": joins the instance's triples in `⟨project⟩:data` with `actor`'s permissions,
    /// filtered on the data-view threshold; raises `NotFound` if the instance has no triples, or
    /// `Inconsistency` if its `rdf:type` does not match `class`.
    pub fn read(&self, class: &Arc<ResourceClass>, instance_iri: &Iri, actor: &Iri) -> Result<ResourceInstance> {
        let permission_query = data_permission_count_query(instance_iri, actor, DataPermission::DataView);
        let permission_result = self.connection.query(&permission_query)?;
        if count_binding(&permission_result)? == 0 {
            return Err(no_permission_error(format!(
                "{actor}: insufficient data permission to read {instance_iri}"
            )));
        }

        let data_query = format!(
            "SELECT ?p ?o WHERE {{ GRAPH <{}> {{ {instance_iri} ?p ?o . }} }}",
            self.project
        );
        let data_result = self.connection.query(&data_query)?;
        let bindings = data_result
            .get("results")
            .and_then(|r| r.get("bindings"))
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));
        let processor = QueryProcessor::new(&self.context);
        let rows = processor.decode_bindings(&bindings)?;
        if rows.is_empty() {
            return Err(not_found_error(format!("{instance_iri}: no such instance")));
        }

        let mut rdf_type: Option<Iri> = None;
        let mut creator = None;
        let mut created = None;
        let mut contributor = None;
        let mut modified = None;
        let mut cells_by_property: BTreeMap<String, Vec<Cell>> = BTreeMap::new();
        for row in &rows {
            let predicate = match row.get("p") {
                Some(Cell::Iri(iri)) => iri.clone(),
                _ => continue,
            };
            let object = row
                .get("o")
                .cloned()
                .ok_or_else(|| value_error(format!("{instance_iri}: binding row missing '?o'")))?;
            match predicate.to_string().as_str() {
                "rdf:type" => {
                    if let Cell::Iri(type_iri) = &object {
                        rdf_type = Some(type_iri.clone());
                    }
                }
                "dcterms:creator" => {
                    if let Cell::Iri(iri) = &object {
                        creator = Some(iri.clone());
                    }
                }
                "dcterms:contributor" => {
                    if let Cell::Iri(iri) = &object {
                        contributor = Some(iri.clone());
                    }
                }
                "dcterms:created" => {
                    if let Cell::DateTime(dt) = &object {
                        created = Some(dt.clone());
                    }
                }
                "dcterms:modified" => {
                    if let Cell::DateTime(dt) = &object {
                        modified = Some(dt.clone());
                    }
                }
                _ => cells_by_property.entry(predicate.to_string()).or_default().push(object),
            }
        }

        let rdf_type = rdf_type.ok_or_else(|| not_found_error(format!("{instance_iri}: no rdf:type triple")))?;
        if rdf_type.to_string() != class.iri.to_string() {
            return Err(inconsistency_error(format!(
                "{instance_iri}: rdf:type {rdf_type} does not match expected class {}",
                class.iri
            )));
        }

        let mut values = BTreeMap::new();
        for (property_ref, _) in self.all_properties(class) {
            let property = resolve_property(&self.data_model, property_ref)?;
            let Some(cells) = cells_by_property.remove(&property.iri.to_string()) else {
                continue;
            };
            let value = if property.datatype.as_deref() == Some("rdf:langString") {
                let mut lang_string = LangString::with_unique_lang(property.unique_lang.unwrap_or(false));
                for cell in cells {
                    if let Cell::String(s) = cell {
                        if let Some(lang) = s.language() {
                            lang_string.set(lang, s.value())?;
                        }
                    }
                }
                lang_string.clear_change_tracking();
                PropertyValue::Lang(lang_string)
            } else if cells.len() == 1 {
                PropertyValue::Single(cells.into_iter().next().expect("len checked"))
            } else {
                PropertyValue::Multiple(cells)
            };
            values.insert(property.iri.clone(), value);
        }

        let audit = match (creator, created, contributor, modified) {
            (Some(creator), Some(created), Some(contributor), Some(modified)) => {
                Some(AuditFields { creator, created, contributor, modified })
            }
            _ => None,
        };

        Ok(ResourceInstance {
            iri: instance_iri.clone(),
            project: self.project.clone(),
            class: Arc::clone(class),
            audit,
            data_model: Arc::clone(&self.data_model),
            values,
            change_set: ChangeSet::new(),
        })
    }
}

fn count_binding(result: &serde_json::Value) -> Result<u64> {
    let lexical = result
        .get("results")
        .and_then(|r| r.get("bindings"))
        .and_then(|b| b.as_array())
        .and_then(|rows| rows.first())
        .and_then(|row| row.get("count"))
        .and_then(|cell| cell.get("value"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| value_error("SPARQL count query returned no 'count' binding".to_string()))?;
    lexical
        .parse::<u64>()
        .map_err(|e| value_error(format!("'{lexical}' is not a valid count: {e}")))
}

fn class_member_full_iri(class: &Iri, lexical: &str) -> String {
    if lexical.contains(':') || lexical.starts_with("http") {
        lexical.to_string()
    } else {
        format!("{class}#{lexical}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oldap_core::iri::QName;
    use oldap_store::test_support::FakeStore;

    fn iri(local: &str) -> Iri {
        Iri::from_qname(QName::new("test", local).unwrap())
    }

    fn audit() -> AuditFields {
        AuditFields::new_at(iri("root"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap())
    }

    fn string_property(local: &str) -> PropertyClass {
        let mut p = PropertyClass::new(iri(local), true, audit());
        p.datatype = Some("xsd:string".to_string());
        p
    }

    fn test_factory() -> ResourceInstanceFactory {
        let data_model = Arc::new(DataModel::new("test", "1", audit()));
        ResourceInstanceFactory::new(Arc::new(FakeStore::new()), iri("data"), data_model)
    }

    #[test]
    fn construct_requires_mandatory_property() {
        let mut rc = ResourceClass::new(iri("Book"), audit());
        let property = string_property("title");
        let has_property = HasProperty::new(Some(1), Some(1), None, None, &property).unwrap();
        rc.add_internal_property(property, has_property).unwrap();
        let rc = Arc::new(rc);
        let factory = test_factory();
        let result = factory.construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), BTreeMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn construct_coerces_and_clears_change_set() {
        let mut rc = ResourceClass::new(iri("Book"), audit());
        let property = string_property("title");
        let has_property = HasProperty::new(Some(1), Some(1), None, None, &property).unwrap();
        rc.add_internal_property(property, has_property).unwrap();
        let rc = Arc::new(rc);
        let factory = test_factory();
        let mut raw = BTreeMap::new();
        raw.insert("title".to_string(), RawValue::Single("Dune".to_string()));
        let instance = factory
            .construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), raw)
            .unwrap();
        assert_eq!(instance.values.len(), 1);
        assert!(instance.change_set().iter().next().is_none());
    }

    #[test]
    fn setter_rejects_violating_value_and_leaves_state_unchanged() {
        let mut rc = ResourceClass::new(iri("Book"), audit());
        let mut property = string_property("title");
        property.max_length = Some(3);
        let has_property = HasProperty::new(Some(1), Some(1), None, None, &property).unwrap();
        rc.add_internal_property(property, has_property).unwrap();
        let rc = Arc::new(rc);
        let factory = test_factory();
        let mut raw = BTreeMap::new();
        raw.insert("title".to_string(), RawValue::Single("Ok".to_string()));
        let mut instance = factory
            .construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), raw)
            .unwrap();
        let before = instance.values.clone();
        let result = instance.set(&iri("title"), PropertyValue::Single(Cell::String(oldap_core::xsd::Xsd_string::new_plain("too long"))));
        assert!(result.is_err());
        assert_eq!(instance.values, before);
    }

    #[test]
    fn deleter_refuses_when_min_count_positive() {
        let mut rc = ResourceClass::new(iri("Book"), audit());
        let property = string_property("title");
        let has_property = HasProperty::new(Some(1), Some(1), None, None, &property).unwrap();
        rc.add_internal_property(property, has_property).unwrap();
        let rc = Arc::new(rc);
        let factory = test_factory();
        let mut raw = BTreeMap::new();
        raw.insert("title".to_string(), RawValue::Single("Dune".to_string()));
        let mut instance = factory
            .construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), raw)
            .unwrap();
        assert!(instance.delete(&iri("title")).is_err());
    }

    #[test]
    fn deleting_an_optional_property_emits_a_delete_patch_for_it() {
        let mut rc = ResourceClass::new(iri("Book"), audit());
        let property = string_property("subtitle");
        let has_property = HasProperty::new(None, None, None, None, &property).unwrap();
        rc.add_internal_property(property, has_property).unwrap();
        let rc = Arc::new(rc);
        let factory = test_factory();
        let mut raw = BTreeMap::new();
        raw.insert("subtitle".to_string(), RawValue::Single("A Subtitle".to_string()));
        let mut instance = factory
            .construct(&rc, None, iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), raw)
            .unwrap();

        instance.delete(&iri("subtitle")).unwrap();
        assert!(!instance.values.contains_key(&iri("subtitle")));

        let patches = instance.emit_update_patches(&Xsd_dateTime::new("2024-01-02T00:00:00Z", true).unwrap());
        let subtitle_patch = patches
            .iter()
            .find(|p| p.contains("test:subtitle"))
            .expect("a DELETE patch for the removed property");
        assert!(subtitle_patch.contains("DELETE"));
        assert!(!subtitle_patch.contains("INSERT"));
    }

    #[test]
    fn create_emits_rdf_type_and_audit_when_thing_derived() {
        let mut rc = ResourceClass::new(iri("Book"), audit());
        rc.superclass.insert("oldap:Thing".to_string(), None);
        let rc = Arc::new(rc);
        let factory = test_factory();
        let instance = factory
            .construct(&rc, Some(iri("book1")), iri("actor"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(), BTreeMap::new())
            .unwrap();
        assert!(instance.audit.is_some());
        let triples = instance.emit_create();
        assert!(triples[0].contains("rdf:type test:Book"));
    }

    fn binding(pairs: &[(&str, serde_json::Value)]) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for (k, v) in pairs {
            object.insert((*k).to_string(), v.clone());
        }
        serde_json::Value::Object(object)
    }

    fn uri(value: &str) -> serde_json::Value {
        serde_json::json!({"type": "uri", "value": value})
    }

    fn typed_literal(value: &str, datatype: &str) -> serde_json::Value {
        serde_json::json!({"type": "literal", "value": value, "datatype": datatype})
    }

    fn count_result(n: u64) -> serde_json::Value {
        serde_json::json!({
            "results": {"bindings": [{"count": {"type": "literal", "value": n.to_string()}}]}
        })
    }

    const BOOK_CLASS_IRI: &str = "http://test.example/Book";
    const TITLE_PROPERTY_IRI: &str = "http://test.example/title";

    #[test]
    fn read_reconstructs_instance_from_store_bindings() {
        let mut rc = ResourceClass::new(Iri::from_full(BOOK_CLASS_IRI), audit());
        let mut property = PropertyClass::new(Iri::from_full(TITLE_PROPERTY_IRI), true, audit());
        property.datatype = Some("xsd:string".to_string());
        let has_property = HasProperty::new(Some(1), Some(1), None, None, &property).unwrap();
        rc.add_internal_property(property, has_property).unwrap();
        let rc = Arc::new(rc);

        let store = Arc::new(FakeStore::new());
        store.push_query_result(count_result(1));
        store.push_query_result(serde_json::json!({
            "results": {"bindings": [
                binding(&[("p", uri("http://www.w3.org/1999/02/22-rdf-syntax-ns#type")), ("o", uri(BOOK_CLASS_IRI))]),
                binding(&[("p", uri(TITLE_PROPERTY_IRI)), ("o", typed_literal("Dune", "http://www.w3.org/2001/XMLSchema#string"))]),
            ]}
        }));

        let data_model = Arc::new(DataModel::new("test", "1", audit()));
        let factory = ResourceInstanceFactory::new(store, iri("data"), data_model);
        let instance = factory.read(&rc, &iri("book1"), &iri("actor")).unwrap();
        assert_eq!(instance.iri, iri("book1"));
        assert!(instance.get(&Iri::from_full(TITLE_PROPERTY_IRI)).is_some());
    }

    #[test]
    fn read_without_view_permission_is_refused() {
        let rc = Arc::new(ResourceClass::new(Iri::from_full(BOOK_CLASS_IRI), audit()));
        let store = Arc::new(FakeStore::new());
        store.push_query_result(count_result(0));
        let data_model = Arc::new(DataModel::new("test", "1", audit()));
        let factory = ResourceInstanceFactory::new(store, iri("data"), data_model);
        assert!(factory.read(&rc, &iri("book1"), &iri("actor")).is_err());
    }

    #[test]
    fn read_with_no_triples_is_not_found() {
        let rc = Arc::new(ResourceClass::new(Iri::from_full(BOOK_CLASS_IRI), audit()));
        let store = Arc::new(FakeStore::new());
        store.push_query_result(count_result(1));
        store.push_query_result(serde_json::json!({"results": {"bindings": []}}));
        let data_model = Arc::new(DataModel::new("test", "1", audit()));
        let factory = ResourceInstanceFactory::new(store, iri("data"), data_model);
        assert!(factory.read(&rc, &iri("book1"), &iri("actor")).is_err());
    }

    #[test]
    fn read_with_mismatched_rdf_type_is_inconsistent() {
        let rc = Arc::new(ResourceClass::new(Iri::from_full(BOOK_CLASS_IRI), audit()));
        let store = Arc::new(FakeStore::new());
        store.push_query_result(count_result(1));
        store.push_query_result(serde_json::json!({
            "results": {"bindings": [
                binding(&[("p", uri("http://www.w3.org/1999/02/22-rdf-syntax-ns#type")), ("o", uri("http://test.example/Page"))]),
            ]}
        }));
        let data_model = Arc::new(DataModel::new("test", "1", audit()));
        let factory = ResourceInstanceFactory::new(store, iri("data"), data_model);
        assert!(factory.read(&rc, &iri("book1"), &iri("actor")).is_err());
    }
}
