/*!
The resource-instance engine (spec component C8): generated instance types backed by a project's
[`oldap_model::DataModel`], plus the admin/data permission model gating their mutation.

- [`resource_instance`] — `ResourceInstance`, `ResourceInstanceFactory`, `RawValue`,
  `PropertyValue`, facet validation.
- [`permissions`] — `AdminPermission`, `DataPermission`, `InstanceAction`, the two-tier permission
  checks.
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

pub mod permissions;
pub mod resource_instance;

pub use permissions::{AdminPermission, DataPermission, InstanceAction};
pub use resource_instance::{PropertyValue, RawValue, ResourceInstance, ResourceInstanceFactory};

pub use oldap_errors as error;
pub use oldap_errors::{Error, Result};
