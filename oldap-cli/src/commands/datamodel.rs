use super::Execute;
use clap::Args;
use oldap_core::iri::Iri;
use oldap_core::xsd::Xsd_dateTime;
use oldap_errors::Error;
use oldap_model::{AuditFields, DataModel};
use oldap_store::config::OldapConfig;
use oldap_store::rdf4j::Rdf4jStore;
use oldap_store::store::Store;
use tracing::info;

/// Data-model lifecycle operations against the configured SPARQL endpoint.
#[derive(clap::Subcommand, Debug)]
pub(crate) enum Command {
    /// Create an empty data model for a project (refuses if its SHACL graph is non-empty)
    Create(Create),
    /// Drop a project's SHACL and OWL graphs
    Delete(Delete),
}

impl Execute for Command {
    fn execute(&self) -> Result<(), Error> {
        match self {
            Command::Create(cmd) => cmd.execute(),
            Command::Delete(cmd) => cmd.execute(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct Create {
    /// The project's shortname, e.g. "dmtest"
    #[arg(short, long)]
    project: String,

    /// A freeform version string recorded as schema:version / owl:versionInfo
    #[arg(short, long, default_value = "1.0.0")]
    version: String,

    /// IRI (or prefix:local QName) of the acting user, recorded as dcterms:creator
    #[arg(short, long)]
    actor: String,
}

impl Execute for Create {
    fn execute(&self) -> Result<(), Error> {
        let config = OldapConfig::from_env()?;
        let store = Rdf4jStore::from_config(&config);
        let actor = Iri::new(self.actor.as_str(), true)?;
        let now = Xsd_dateTime::now();

        let mut model = DataModel::new(
            self.project.clone(),
            self.version.clone(),
            AuditFields::new_at(actor, now),
        );

        let ask = format!("ASK {{ GRAPH <{}:shacl> {{ ?s ?p ?o }} }}", self.project);
        let result = store.query(&ask)?;
        let graph_is_empty = !result
            .get("boolean")
            .and_then(|b| b.as_bool())
            .unwrap_or(false);

        let sparql = model.emit_create(graph_is_empty)?;
        store.update(&sparql)?;

        info!(project = %self.project, "created empty data model");
        println!("created data model for project '{}'", self.project);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub(crate) struct Delete {
    /// The project's shortname, e.g. "dmtest"
    #[arg(short, long)]
    project: String,
}

impl Execute for Delete {
    fn execute(&self) -> Result<(), Error> {
        let config = OldapConfig::from_env()?;
        let store = Rdf4jStore::from_config(&config);

        let model = DataModel::new(
            self.project.clone(),
            "0.0.0",
            AuditFields::new_at(Iri::new("oldap:system", true)?, Xsd_dateTime::now()),
        );

        for sparql in model.emit_delete() {
            store.update(&sparql)?;
        }

        info!(project = %self.project, "deleted data model");
        println!("deleted data model for project '{}'", self.project);
        Ok(())
    }
}
