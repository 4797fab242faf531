/*!
The artifact cache interface (§6: "Key: `QName`; Value: opaque encoded model … Out-of-process
variant uses a Redis-like `GET/SET/DEL/FLUSHDB` surface"). Only the interface and an in-process
implementation are in scope; a real out-of-process client is a non-goal (§1: "Redis/in-process
result caches (only the cache interface is in scope)").
*/
use oldap_core::iri::QName;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process- or cluster-local cache of materialized data-model artifacts, keyed by `QName`
/// (`(project_shortname, kind)` encoded as e.g. `dmtest:shacl`).
pub trait ArtifactCache: std::fmt::Debug {
    fn get(&self, key: &QName) -> Option<String>;
    fn set(&self, key: &QName, value: String);
    fn del(&self, key: &QName);
    fn flushdb(&self);
}

/// An in-process `ArtifactCache`. §5: "the in-process cache stores deep-copies on both set and
/// get so that callers cannot mutate cached artifacts" — trivially true here since the cached
/// value is an owned, immutable `String` snapshot and every `get`/`set` clones it.
#[derive(Debug, Default)]
pub struct InProcessCache {
    entries: Mutex<HashMap<String, String>>,
}

impl InProcessCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactCache for InProcessCache {
    fn get(&self, key: &QName) -> Option<String> {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .get(&key.to_string())
            .cloned()
    }

    fn set(&self, key: &QName, value: String) {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key.to_string(), value);
    }

    fn del(&self, key: &QName) {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .remove(&key.to_string());
    }

    fn flushdb(&self) {
        self.entries.lock().expect("cache mutex poisoned").clear();
    }
}
