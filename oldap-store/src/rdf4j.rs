/*!
A blocking-HTTP [`Store`] implementation against an RDF4J-style SPARQL endpoint, per §6 "External
Interfaces".
*/
use crate::store::{Store, TransactionHandle};
use oldap_errors::{generic_error, Result};
use reqwest::blocking::Client;
use tracing::{debug, warn};

/// The transaction-local state an RDF4J endpoint hands back from `begin`: the `Location` header
/// of the new transaction resource.
#[derive(Debug)]
struct Rdf4jTransaction {
    url: String,
}

/// A blocking `Store` backed by an RDF4J/GraphDB-compatible SPARQL endpoint.
#[derive(Debug)]
pub struct Rdf4jStore {
    base_url: String,
    repo: String,
    client: Client,
    basic_auth: Option<(String, Option<String>)>,
}

impl Rdf4jStore {
    pub fn new(base_url: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            repo: repo.into(),
            client: Client::new(),
            basic_auth: None,
        }
    }

    pub fn with_basic_auth(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.basic_auth = Some((user.into(), password));
        self
    }

    pub fn from_config(config: &crate::config::OldapConfig) -> Self {
        let mut store = Self::new(config.ts_server.clone(), config.ts_repo.clone());
        if let Some(user) = &config.ts_user {
            store = store.with_basic_auth(user.clone(), config.ts_password.clone());
        }
        store
    }

    fn repo_url(&self) -> String {
        format!("{}/repositories/{}", self.base_url, self.repo)
    }

    fn apply_auth(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.basic_auth {
            Some((user, password)) => builder.basic_auth(user, password.as_ref()),
            None => builder,
        }
    }

    fn downcast_tx(tx: &TransactionHandle) -> Result<&Rdf4jTransaction> {
        tx.downcast_ref::<Rdf4jTransaction>()
            .ok_or_else(|| generic_error("transaction handle was not produced by Rdf4jStore".to_string()))
    }
}

impl Store for Rdf4jStore {
    fn query(&self, sparql: &str) -> Result<serde_json::Value> {
        debug!(sparql, "Rdf4jStore::query");
        let response = self
            .apply_auth(self.client.post(self.repo_url()))
            .header("Accept", "application/sparql-results+json")
            .form(&[("query", sparql)])
            .send()
            .map_err(|e| generic_error(format!("SPARQL query request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(generic_error(format!(
                "SPARQL query failed with status {}",
                response.status()
            )));
        }
        response
            .json()
            .map_err(|e| generic_error(format!("malformed SPARQL-JSON response: {e}")))
    }

    fn update(&self, sparql: &str) -> Result<()> {
        debug!(sparql, "Rdf4jStore::update");
        let response = self
            .apply_auth(self.client.post(format!("{}/statements", self.repo_url())))
            .header("Content-Type", "application/sparql-update")
            .body(sparql.to_string())
            .send()
            .map_err(|e| generic_error(format!("SPARQL update request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(generic_error(format!(
                "SPARQL update failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn upload(&self, body: &str, content_type: &str, context: Option<&str>) -> Result<()> {
        let mut url = format!("{}/statements", self.repo_url());
        if let Some(context) = context {
            url = format!("{url}?context={}", urlencoding_minimal(context));
        }
        let response = self
            .apply_auth(self.client.post(url))
            .header("Content-Type", content_type)
            .body(body.to_string())
            .send()
            .map_err(|e| generic_error(format!("bulk upload request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(generic_error(format!(
                "bulk upload failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn begin(&self) -> Result<TransactionHandle> {
        let response = self
            .apply_auth(self.client.post(format!("{}/transactions", self.repo_url())))
            .send()
            .map_err(|e| generic_error(format!("begin transaction failed: {e}")))?;
        if !response.status().is_success() {
            return Err(generic_error(format!(
                "begin transaction failed with status {}",
                response.status()
            )));
        }
        let location = response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| generic_error("begin transaction response missing Location header".to_string()))?
            .to_string();
        Ok(TransactionHandle::new(Rdf4jTransaction { url: location }))
    }

    fn tx_query(&self, tx: &TransactionHandle, sparql: &str) -> Result<serde_json::Value> {
        let tx = Self::downcast_tx(tx)?;
        let response = self
            .apply_auth(self.client.post(&tx.url))
            .header("Accept", "application/sparql-results+json")
            .form(&[("action", "QUERY"), ("query", sparql)])
            .send()
            .map_err(|e| generic_error(format!("transactional query failed: {e}")))?;
        if !response.status().is_success() {
            return Err(generic_error(format!(
                "transactional query failed with status {}",
                response.status()
            )));
        }
        response
            .json()
            .map_err(|e| generic_error(format!("malformed SPARQL-JSON response: {e}")))
    }

    fn tx_update(&self, tx: &TransactionHandle, sparql: &str) -> Result<()> {
        let tx = Self::downcast_tx(tx)?;
        let response = self
            .apply_auth(self.client.post(&tx.url))
            .form(&[("action", "UPDATE"), ("update", sparql)])
            .send()
            .map_err(|e| generic_error(format!("transactional update failed: {e}")))?;
        if !response.status().is_success() {
            return Err(generic_error(format!(
                "transactional update failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn commit(&self, tx: TransactionHandle) -> Result<()> {
        let inner = Self::downcast_tx(&tx)?;
        let response = self
            .apply_auth(self.client.put(&inner.url))
            .query(&[("action", "COMMIT")])
            .send()
            .map_err(|e| generic_error(format!("commit failed: {e}")))?;
        if !response.status().is_success() {
            return Err(generic_error(format!(
                "commit failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn abort(&self, tx: TransactionHandle) -> Result<()> {
        let inner = Self::downcast_tx(&tx)?;
        let response = self
            .apply_auth(self.client.delete(&inner.url))
            .send()
            .map_err(|e| generic_error(format!("abort failed: {e}")));
        match response {
            Ok(r) if r.status().is_success() || r.status().as_u16() == 404 => Ok(()),
            Ok(r) => {
                warn!(status = %r.status(), "abort returned a non-success status");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "abort request failed; treating as already aborted");
                Ok(())
            }
        }
    }
}

/// Percent-encode only the characters that would otherwise break a `context=` query parameter;
/// full RFC 3986 escaping is not needed since a named-graph IRI contains no raw whitespace.
fn urlencoding_minimal(s: &str) -> String {
    s.replace(' ', "%20")
        .replace('<', "%3C")
        .replace('>', "%3E")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_url_joins_base_and_repo() {
        let store = Rdf4jStore::new("http://localhost:7200", "oldap");
        assert_eq!(store.repo_url(), "http://localhost:7200/repositories/oldap");
    }

    #[test]
    fn context_is_minimally_escaped() {
        assert_eq!(
            urlencoding_minimal("http://example.org/g#1"),
            "http://example.org/g#1"
        );
        assert_eq!(urlencoding_minimal("<a b>"), "%3Ca%20b%3E");
    }
}
