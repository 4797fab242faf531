/*!
`FakeStore`: an in-memory double for the [`Store`] trait, standing in for a live RDF4J/GraphDB
endpoint in tests (§2 ambient stack: "A lightweight in-memory fake of the §6 SPARQL transaction
protocol").

This is deliberately a *recording* fake rather than a SPARQL interpreter: it accepts every
query/update, appends updates to a log callers can inspect, and lets tests pre-seed the exact JSON
bindings a query should return. Tests that need real graph semantics compose `FakeStore` with
hand-built expectations rather than relying on it to execute SPARQL.
*/
use crate::store::{Store, TransactionHandle};
use oldap_errors::{generic_error, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug)]
struct FakeTransaction {
    id: u64,
}

/// An in-memory [`Store`] double. Queries are answered from a queue of pre-seeded responses;
/// updates are appended to a log for assertions.
#[derive(Debug, Default)]
pub struct FakeStore {
    queued_query_results: Mutex<VecDeque<serde_json::Value>>,
    update_log: Mutex<Vec<String>>,
    next_tx_id: Mutex<u64>,
    open_transactions: Mutex<Vec<u64>>,
    fail_next_commit: Mutex<bool>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next `query`/`tx_query` result, in FIFO order.
    pub fn push_query_result(&self, result: serde_json::Value) {
        self.queued_query_results
            .lock()
            .expect("mutex poisoned")
            .push_back(result);
    }

    /// Every SPARQL update string passed to `update`/`tx_update`, in issue order.
    pub fn update_log(&self) -> Vec<String> {
        self.update_log.lock().expect("mutex poisoned").clone()
    }

    /// Make the next `commit()` fail with `UpdateFailed`, simulating a lost optimistic-concurrency
    /// race (§8 scenario B).
    pub fn fail_next_commit(&self) {
        *self.fail_next_commit.lock().expect("mutex poisoned") = true;
    }

    pub fn open_transaction_count(&self) -> usize {
        self.open_transactions.lock().expect("mutex poisoned").len()
    }

    fn empty_bindings() -> serde_json::Value {
        serde_json::json!({"head": {"vars": []}, "results": {"bindings": []}})
    }
}

impl Store for FakeStore {
    fn query(&self, _sparql: &str) -> Result<serde_json::Value> {
        Ok(self
            .queued_query_results
            .lock()
            .expect("mutex poisoned")
            .pop_front()
            .unwrap_or_else(Self::empty_bindings))
    }

    fn update(&self, sparql: &str) -> Result<()> {
        self.update_log
            .lock()
            .expect("mutex poisoned")
            .push(sparql.to_string());
        Ok(())
    }

    fn upload(&self, body: &str, _content_type: &str, _context: Option<&str>) -> Result<()> {
        self.update_log
            .lock()
            .expect("mutex poisoned")
            .push(body.to_string());
        Ok(())
    }

    fn begin(&self) -> Result<TransactionHandle> {
        let mut next_id = self.next_tx_id.lock().expect("mutex poisoned");
        let id = *next_id;
        *next_id += 1;
        self.open_transactions.lock().expect("mutex poisoned").push(id);
        Ok(TransactionHandle::new(FakeTransaction { id }))
    }

    fn tx_query(&self, tx: &TransactionHandle, sparql: &str) -> Result<serde_json::Value> {
        tx.downcast_ref::<FakeTransaction>()
            .ok_or_else(|| generic_error("transaction handle was not produced by FakeStore".to_string()))?;
        self.query(sparql)
    }

    fn tx_update(&self, tx: &TransactionHandle, sparql: &str) -> Result<()> {
        tx.downcast_ref::<FakeTransaction>()
            .ok_or_else(|| generic_error("transaction handle was not produced by FakeStore".to_string()))?;
        self.update(sparql)
    }

    fn commit(&self, tx: TransactionHandle) -> Result<()> {
        let inner = tx
            .downcast_ref::<FakeTransaction>()
            .ok_or_else(|| generic_error("transaction handle was not produced by FakeStore".to_string()))?;
        self.open_transactions
            .lock()
            .expect("mutex poisoned")
            .retain(|id| *id != inner.id);
        let mut fail = self.fail_next_commit.lock().expect("mutex poisoned");
        if *fail {
            *fail = false;
            return Err(oldap_errors::update_failed_error(
                "optimistic concurrency check failed".to_string(),
            ));
        }
        Ok(())
    }

    fn abort(&self, tx: TransactionHandle) -> Result<()> {
        if let Some(inner) = tx.downcast_ref::<FakeTransaction>() {
            self.open_transactions
                .lock()
                .expect("mutex poisoned")
                .retain(|id| *id != inner.id);
        }
        Ok(())
    }
}
