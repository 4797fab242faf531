/*!
The `Store` trait: the RDF4J-style SPARQL transaction protocol every backing triple store
implements (§5, §6). `begin → query (optional) → update(s) → read-back → commit/abort`; abort is
idempotent.
*/
use oldap_errors::Result;
use std::any::Any;
use std::fmt;

/// A handle to an open transaction. Concrete implementations attach whatever state they need
/// (e.g. the RDF4J transaction URL) behind this opaque wrapper and recover it in their own
/// methods via [`TransactionHandle::downcast_ref`].
pub struct TransactionHandle(Box<dyn Any + Send + Sync>);

impl TransactionHandle {
    pub fn new<T: Any + Send + Sync>(inner: T) -> Self {
        Self(Box::new(inner))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransactionHandle(..)")
    }
}

/// Implemented by every SPARQL transport: a blocking-HTTP client against a live RDF4J/GraphDB
/// endpoint ([`crate::rdf4j::Rdf4jStore`]), or an in-memory double for tests
/// ([`crate::test_support::FakeStore`]).
pub trait Store: std::fmt::Debug {
    /// `POST /repositories/{repo}` — a read-only SPARQL query outside any transaction.
    fn query(&self, sparql: &str) -> Result<serde_json::Value>;

    /// `POST /repositories/{repo}/statements` with `application/sparql-update` — a bare update
    /// outside any transaction (e.g. `CLEAR GRAPH <...>`).
    fn update(&self, sparql: &str) -> Result<()>;

    /// `POST /repositories/{repo}/statements` with a Turtle/TriG body — bulk upload, optionally
    /// scoped to a named graph.
    fn upload(&self, body: &str, content_type: &str, context: Option<&str>) -> Result<()>;

    /// `POST /repositories/{repo}/transactions` — begin a transaction.
    fn begin(&self) -> Result<TransactionHandle>;

    /// `POST ⟨txurl⟩` with `action=QUERY` — query within an open transaction.
    fn tx_query(&self, tx: &TransactionHandle, sparql: &str) -> Result<serde_json::Value>;

    /// `POST ⟨txurl⟩` with `action=UPDATE` — update within an open transaction.
    fn tx_update(&self, tx: &TransactionHandle, sparql: &str) -> Result<()>;

    /// `PUT ⟨txurl⟩?action=COMMIT`.
    fn commit(&self, tx: TransactionHandle) -> Result<()>;

    /// `DELETE ⟨txurl⟩`. Idempotent per §5.
    fn abort(&self, tx: TransactionHandle) -> Result<()>;
}
