/*!
`DataModel` (C7): the three-map container for a project's external ontologies, standalone
properties, and resource classes, plus its create/update/delete/cache lifecycle. §4.7.
*/
use crate::base::{AuditFields, ModelBase};
use crate::property::PropertyClass;
use crate::resource::ResourceClass;
use oldap_core::changeset::ChangeAction;
use oldap_core::iri::{Iri, QName};
use oldap_errors::{already_exists_error, not_found_error, Result};
use oldap_store::cache::ArtifactCache;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A child action to apply within a single `update()` transaction. §4.7: "`update()` dispatches
/// child actions (CREATE/MODIFY/DELETE) to the respective child's method in a single outer
/// transaction."
#[derive(Clone, Debug, PartialEq)]
pub enum ChildAction {
    CreateProperty(PropertyClass),
    ModifyProperty(PropertyClass),
    DeleteProperty(Iri),
    CreateResourceClass(ResourceClass),
    ModifyResourceClass(ResourceClass),
    DeleteResourceClass(Iri),
}

impl ChildAction {
    pub fn kind(&self) -> ChangeAction {
        match self {
            ChildAction::CreateProperty(_) | ChildAction::CreateResourceClass(_) => ChangeAction::Create,
            ChildAction::ModifyProperty(_) | ChildAction::ModifyResourceClass(_) => ChangeAction::Modify,
            ChildAction::DeleteProperty(_) | ChildAction::DeleteResourceClass(_) => ChangeAction::Delete,
        }
    }
}

/// The full metadata kernel for one project: external ontologies it imports, the standalone
/// properties it declares, and its resource classes. §4.7.
#[derive(Clone, Debug, PartialEq)]
pub struct DataModel {
    pub project_shortname: String,
    pub base: ModelBase,
    pub version: String,
    external_ontologies: BTreeMap<QName, Iri>,
    standalone_properties: BTreeMap<QName, PropertyClass>,
    resource_classes: BTreeMap<QName, ResourceClass>,
}

/// Which of the three maps a QName was found in, for routed lookups. §4.7: "Indexed access by
/// QName routes to the first non-empty map."
#[derive(Clone, Debug, PartialEq)]
pub enum DataModelEntry<'a> {
    ExternalOntology(&'a Iri),
    StandaloneProperty(&'a PropertyClass),
    ResourceClass(&'a ResourceClass),
}

impl DataModel {
    pub fn new(project_shortname: impl Into<String>, version: impl Into<String>, audit: AuditFields) -> Self {
        Self {
            project_shortname: project_shortname.into(),
            base: ModelBase::new(audit),
            version: version.into(),
            external_ontologies: BTreeMap::new(),
            standalone_properties: BTreeMap::new(),
            resource_classes: BTreeMap::new(),
        }
    }

    /// Routed lookup across all three maps, in external-ontologies, standalone-properties,
    /// resource-classes order.
    pub fn get(&self, name: &QName) -> Option<DataModelEntry<'_>> {
        if let Some(iri) = self.external_ontologies.get(name) {
            return Some(DataModelEntry::ExternalOntology(iri));
        }
        if let Some(property) = self.standalone_properties.get(name) {
            return Some(DataModelEntry::StandaloneProperty(property));
        }
        self.resource_classes
            .get(name)
            .map(DataModelEntry::ResourceClass)
    }

    pub fn external_ontologies(&self) -> &BTreeMap<QName, Iri> {
        &self.external_ontologies
    }

    pub fn standalone_properties(&self) -> &BTreeMap<QName, PropertyClass> {
        &self.standalone_properties
    }

    pub fn resource_classes(&self) -> &BTreeMap<QName, ResourceClass> {
        &self.resource_classes
    }

    pub fn add_external_ontology(&mut self, name: QName, iri: Iri) {
        let was_present = self.external_ontologies.insert(name.clone(), iri).is_some();
        self.base
            .record_attribute_change(name.local(), was_present, true, None);
    }

    pub fn add_standalone_property(&mut self, name: QName, property: PropertyClass) {
        let was_present = self
            .standalone_properties
            .insert(name.clone(), property)
            .is_some();
        self.base
            .record_attribute_change(name.local(), was_present, true, None);
    }

    pub fn add_resource_class(&mut self, name: QName, resource_class: ResourceClass) {
        let was_present = self
            .resource_classes
            .insert(name.clone(), resource_class)
            .is_some();
        self.base
            .record_attribute_change(name.local(), was_present, true, None);
    }

    /// §4.7 "`create()` first verifies the project's SHACL graph is empty (refusing
    /// re-creation)". The caller supplies the result of that graph-emptiness probe; this method
    /// only enforces the invariant and builds the `INSERT DATA` body.
    pub fn emit_create(&mut self, shacl_graph_is_empty: bool) -> Result<String> {
        if !shacl_graph_is_empty {
            return Err(already_exists_error(format!(
                "{}: SHACL graph already populated, refusing to re-create the data model",
                self.project_shortname
            )));
        }
        let mut shacl_block = vec![
            format!("{}:shapes schema:version \"{}\" .", self.project_shortname, self.version),
        ];
        let mut onto_block = vec![
            format!("{}:ontology owl:versionInfo \"{}\" .", self.project_shortname, self.version),
        ];

        for property in self.standalone_properties.values() {
            shacl_block.extend(property.emit_shacl_create(None)?);
            onto_block.extend(property.emit_owl_create(None)?);
        }
        for resource_class in self.resource_classes.values() {
            let (shacl, owl) = resource_class.emit_create()?;
            shacl_block.extend(shacl);
            onto_block.extend(owl);
        }

        let insert = format!(
            "INSERT DATA {{ GRAPH <{0}:shacl> {{ {1} }} GRAPH <{0}:onto> {{ {2} }} }}",
            self.project_shortname,
            shacl_block.join(" "),
            onto_block.join(" ")
        );
        self.base.clear_change_set();
        Ok(insert)
    }

    /// §4.7 "`update()` dispatches child actions … to the respective child's method in a single
    /// outer transaction." Returns the SPARQL fragments to run inside that transaction, in order;
    /// the caller is responsible for wrapping them in `begin`/`commit` and invalidating the
    /// artifact cache afterward.
    pub fn emit_update(&mut self, actions: Vec<ChildAction>) -> Result<Vec<String>> {
        let mut fragments = Vec::new();
        for action in actions {
            match action {
                ChildAction::CreateProperty(property) => {
                    let triples = property.emit_shacl_create(None)?;
                    let owl = property.emit_owl_create(None)?;
                    fragments.push(format!(
                        "INSERT DATA {{ GRAPH <{}:shacl> {{ {} }} GRAPH <{}:onto> {{ {} }} }}",
                        self.project_shortname,
                        triples.join(" "),
                        self.project_shortname,
                        owl.join(" ")
                    ));
                    self.standalone_properties
                        .insert(QName::new(&self.project_shortname, property.iri.fragment()).unwrap(), property);
                }
                ChildAction::ModifyProperty(property) => {
                    let key = QName::new(&self.project_shortname, property.iri.fragment()).unwrap();
                    if !self.standalone_properties.contains_key(&key) {
                        return Err(not_found_error(format!("{}: no such standalone property", property.iri)));
                    }
                    self.standalone_properties.insert(key, property);
                }
                ChildAction::DeleteProperty(iri) => {
                    let key = QName::new(&self.project_shortname, iri.fragment()).unwrap();
                    let property = self
                        .standalone_properties
                        .remove(&key)
                        .ok_or_else(|| not_found_error(format!("{iri}: no such standalone property")))?;
                    fragments.extend(property.emit_delete(None));
                }
                ChildAction::CreateResourceClass(resource_class) => {
                    let (shacl, owl) = resource_class.emit_create()?;
                    fragments.push(format!(
                        "INSERT DATA {{ GRAPH <{}:shacl> {{ {} }} GRAPH <{}:onto> {{ {} }} }}",
                        self.project_shortname,
                        shacl.join(" "),
                        self.project_shortname,
                        owl.join(" ")
                    ));
                    self.resource_classes.insert(
                        QName::new(&self.project_shortname, resource_class.iri.fragment()).unwrap(),
                        resource_class,
                    );
                }
                ChildAction::ModifyResourceClass(resource_class) => {
                    let key = QName::new(&self.project_shortname, resource_class.iri.fragment()).unwrap();
                    if !self.resource_classes.contains_key(&key) {
                        return Err(not_found_error(format!("{}: no such resource class", resource_class.iri)));
                    }
                    self.resource_classes.insert(key, resource_class);
                }
                ChildAction::DeleteResourceClass(iri) => {
                    let key = QName::new(&self.project_shortname, iri.fragment()).unwrap();
                    let resource_class = self
                        .resource_classes
                        .remove(&key)
                        .ok_or_else(|| not_found_error(format!("{iri}: no such resource class")))?;
                    fragments.extend(resource_class.emit_delete());
                }
            }
        }
        self.base.clear_change_set();
        Ok(fragments)
    }

    /// §4.7 "`delete()` removes both the shacl and onto named graphs for the project."
    pub fn emit_delete(&self) -> Vec<String> {
        vec![
            format!("DROP GRAPH <{}:shacl>", self.project_shortname),
            format!("DROP GRAPH <{}:onto>", self.project_shortname),
        ]
    }

    /// The cache key for this project's model artifact. §4.7: "Caching. Keyed by
    /// `(project_shortname, \"shacl\")`."
    pub fn cache_key(&self) -> Result<QName> {
        QName::new(&self.project_shortname, "shacl")
    }

    /// Serialize the full model as JSON and store it under this project's cache key, so that
    /// `read()` can reconstruct the model without re-parsing the SHACL/OWL graphs. §4.7: "Caching.
    /// Keyed by `(project_shortname, \"shacl\")`."
    pub fn store_in_cache(&self, cache: &dyn ArtifactCache) -> Result<()> {
        let key = self.cache_key()?;
        let serialized = serde_json::to_string(&DataModelDto::from(self))?;
        cache.set(&key, serialized);
        Ok(())
    }

    pub fn invalidate_cache(&self, cache: &dyn ArtifactCache) -> Result<()> {
        let key = self.cache_key()?;
        cache.del(&key);
        Ok(())
    }

    /// §4.7: "`read()` reads a DataModel for a project." Reconstructs the model from its cached
    /// JSON artifact; raises `NotFound` on a cache miss.
    pub fn read(cache: &dyn ArtifactCache, project_shortname: &str) -> Result<DataModel> {
        let key = QName::new(project_shortname, "shacl")?;
        let cached = cache
            .get(&key)
            .ok_or_else(|| not_found_error(format!("{project_shortname}: no cached data model")))?;
        let dto: DataModelDto = serde_json::from_str(&cached)?;
        Ok(dto.into())
    }
}

/// The JSON-serializable shape of a [`DataModel`]. `QName` cannot serve as a `serde_json` map key
/// (it is not a primitive), so the three attribute maps round-trip as vectors of pairs.
#[derive(Serialize, Deserialize)]
struct DataModelDto {
    project_shortname: String,
    base: ModelBase,
    version: String,
    external_ontologies: Vec<(QName, Iri)>,
    standalone_properties: Vec<(QName, PropertyClass)>,
    resource_classes: Vec<(QName, ResourceClass)>,
}

impl From<&DataModel> for DataModelDto {
    fn from(model: &DataModel) -> Self {
        Self {
            project_shortname: model.project_shortname.clone(),
            base: model.base.clone(),
            version: model.version.clone(),
            external_ontologies: model
                .external_ontologies
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            standalone_properties: model
                .standalone_properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            resource_classes: model
                .resource_classes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl From<DataModelDto> for DataModel {
    fn from(dto: DataModelDto) -> Self {
        Self {
            project_shortname: dto.project_shortname,
            base: dto.base,
            version: dto.version,
            external_ontologies: dto.external_ontologies.into_iter().collect(),
            standalone_properties: dto.standalone_properties.into_iter().collect(),
            resource_classes: dto.resource_classes.into_iter().collect(),
        }
    }
}
