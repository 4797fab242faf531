/*!
The store-facing half of the OLDAP kernel: the SPARQL/RDF4J transaction protocol (§6), the
optimistic-concurrency discipline it supports (§5), the artifact cache interface, environment-driven
configuration, and the session-token shape.

# Modules

* [`config`] — `OldapConfig::from_env()` plus a process-wide `OnceLock` accessor.
* [`store`] — the `Store` trait every SPARQL transport implements.
* [`rdf4j`] — a blocking-HTTP `Store` implementation against an RDF4J-style endpoint.
* [`cache`] — the artifact-cache interface plus an in-process implementation.
* [`session`] — the HMAC-signed session token shape.
* [`test_support`] — `FakeStore`, an in-memory `Store` double for tests.
*/
#![warn(
    unknown_lints,
    absolute_paths_not_starting_with_crate,
    elided_lifetimes_in_paths,
    macro_use_extern_crate,
    nonstandard_style,
    noop_method_call,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    missing_debug_implementations,
    unreachable_pub,
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    unused,
)]

pub use oldap_errors as error;
pub use oldap_errors::{Error, Result};

pub mod cache;
pub mod config;
pub mod rdf4j;
pub mod session;
pub mod store;
pub mod test_support;

pub use cache::{ArtifactCache, InProcessCache};
pub use config::OldapConfig;
pub use session::SessionToken;
pub use store::{Store, TransactionHandle};
