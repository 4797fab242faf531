/*!
The SHACL/OWL metadata kernel (spec components C4-C7): `PropertyClass`, `HasProperty`,
`ResourceClass`, and `DataModel`, built on the attribute bag and change-set shared by every
persisted metadata entity ([`base::ModelBase`]).

- [`base`] — `AuditFields` and `ModelBase`, the attribute-bag/change-set mixin realized by
  composition.
- [`property`] — `PropertyClass`, a SHACL `PropertyShape` plus OWL property declaration.
- [`has_property`] — `HasProperty`, the cardinality/ordering facets a resource class attaches to
  one of its properties.
- [`resource`] — `ResourceClass`, a SHACL `NodeShape` with inline/standalone property children.
- [`datamodel`] — `DataModel`, the three-map container and its create/update/delete/cache
  lifecycle.
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
    unused,
)]

pub mod base;
pub mod datamodel;
pub mod has_property;
pub mod property;
pub mod resource;

pub use base::{AuditFields, ModelBase};
pub use datamodel::{ChildAction, DataModel, DataModelEntry};
pub use has_property::HasProperty;
pub use property::{NodeKind, PropertyClass, PropertyClassAttribute};
pub use resource::{PropertyRef, ResourceClass, Superclass};

pub use oldap_errors as error;
pub use oldap_errors::{Error, Result};
