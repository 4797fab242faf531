/*!
Provides the in-memory value algebra (C1) and prefix/query support (C2) that every other crate in
this workspace builds on, plus the generic change-tracking base (C3) shared by every metadata
entity.

# Modules

* [`iri`] — `NCName`, `QName`, `Iri`, `NamespaceIri`, `BNode`.
* [`xsd`] — one Rust type per supported XSD datatype, each round-tripping to an RDF lexical form
  and a JSON dict form.
* [`collections`] — `RdfSet<T>`, `XsdSet`, `LanguageIn`, `LangString`.
* [`context`] — the prefix ↔ namespace registry and SPARQL/Turtle prologue rendering.
* [`query`] — decoding SPARQL-JSON result bindings into [`xsd`] values.
* [`changeset`] — the change-set discipline and owner-notification pattern shared by every
  metadata entity.
*/
#![warn(
    unknown_lints,
    // ---------- Stylistic
    absolute_paths_not_starting_with_crate,
    elided_lifetimes_in_paths,
    macro_use_extern_crate,
    nonstandard_style, /* group */
    noop_method_call,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    // ---------- Public
    missing_debug_implementations,
    unreachable_pub,
    // ---------- Unsafe
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    // ---------- Unused
    unused, /* group */
)]

// ------------------------------------------------------------------------------------------------
// Modules
// ------------------------------------------------------------------------------------------------

pub use oldap_errors as error;
pub use oldap_errors::{Error, Result};

pub mod changeset;
pub mod collections;
pub mod context;
pub mod iri;
pub mod query;
pub mod xsd;
