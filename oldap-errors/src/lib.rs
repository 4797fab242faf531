/*!
Provides the `Error` and `Result` types shared by every OLDAP crate, plus the
free functions used to construct each error kind. Mirrors the error-kind
taxonomy of the metadata/resource kernel: value algebra failures, metadata
invariant violations, permission and concurrency failures, and generic
protocol/transport failures.
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

use std::fmt::{Debug, Display};
use tracing::error;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

///
/// The error type shared by every crate in this workspace. Each variant corresponds to one of the
/// error kinds named by the kernel's error handling design: value, type, key, and index errors
/// raised by the XSD value algebra; not-found/already-exists/immutable/inconsistency/in-use errors
/// raised by the metadata and instance kernels; permission and optimistic-concurrency failures
/// raised around the transaction boundary; and a generic catch-all for transport/protocol failure.
///
#[derive(Debug)]
pub enum Error {
    /// A lexical form was malformed, or a value fell outside the legal range for its type.
    Value { message: String },
    /// An operation could not coerce between two incompatible types.
    Type { message: String },
    /// An attribute, enum member, or language tag lookup failed.
    Key { message: String },
    /// A sequence was indexed out of range.
    Index { message: String },
    /// An entity was not present in the store.
    NotFound { message: String },
    /// A create operation violated a uniqueness constraint.
    AlreadyExists { message: String },
    /// An attribute declared immutable was mutated after construction.
    Immutable { message: String },
    /// A SHACL/OWL, version, or cardinality invariant was violated.
    Inconsistency { message: String },
    /// An admin or data permission check failed.
    NoPermission { message: String },
    /// A delete was refused because the entity is still referenced.
    InUse { message: String },
    /// An optimistic-concurrency token mismatch, or a patch with no effect.
    UpdateFailed { message: String },
    /// Network failure, malformed server response, or transaction protocol failure.
    Generic { message: String },
    /// An error was signaled by the HTTP client.
    HttpError { source: reqwest::Error },
    /// An error was signaled by JSON (de)serialization.
    JsonError { source: serde_json::Error },
    /// An error was signaled by URL parsing.
    UrlError { source: url::ParseError },
    /// An error was signaled by the standard library I/O functions.
    IoError { source: std::io::Error },
}

///
/// A `Result` type that specifically uses this crate's `Error`.
///
pub type Result<T> = std::result::Result<T, Error>;

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

macro_rules! report_and_return {
    ($err:expr) => {{
        let err = $err;
        error!("{}", err);
        err
    }};
}

macro_rules! message_constructor {
    ($fn_name:ident, $variant:ident) => {
        #[inline]
        pub fn $fn_name<S: Into<String>>(message: S) -> Error {
            report_and_return!(Error::$variant {
                message: message.into()
            })
        }
    };
}

message_constructor!(value_error, Value);
message_constructor!(type_error, Type);
message_constructor!(key_error, Key);
message_constructor!(index_error, Index);
message_constructor!(not_found_error, NotFound);
message_constructor!(already_exists_error, AlreadyExists);
message_constructor!(immutable_error, Immutable);
message_constructor!(inconsistency_error, Inconsistency);
message_constructor!(no_permission_error, NoPermission);
message_constructor!(in_use_error, InUse);
message_constructor!(update_failed_error, UpdateFailed);
message_constructor!(generic_error, Generic);

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value { message } => write!(f, "Value error: {message}"),
            Self::Type { message } => write!(f, "Type error: {message}"),
            Self::Key { message } => write!(f, "Key error: {message}"),
            Self::Index { message } => write!(f, "Index error: {message}"),
            Self::NotFound { message } => write!(f, "Not found: {message}"),
            Self::AlreadyExists { message } => write!(f, "Already exists: {message}"),
            Self::Immutable { message } => write!(f, "Immutable attribute: {message}"),
            Self::Inconsistency { message } => write!(f, "Inconsistency: {message}"),
            Self::NoPermission { message } => write!(f, "No permission: {message}"),
            Self::InUse { message } => write!(f, "In use: {message}"),
            Self::UpdateFailed { message } => write!(f, "Update failed: {message}"),
            Self::Generic { message } => write!(f, "Error: {message}"),
            Self::HttpError { source } => write!(f, "HTTP transport error; source: {source}"),
            Self::JsonError { source } => write!(f, "JSON error; source: {source}"),
            Self::UrlError { source } => write!(f, "URL parse error; source: {source}"),
            Self::IoError { source } => write!(f, "I/O error; source: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpError { source } => Some(source),
            Self::JsonError { source } => Some(source),
            Self::UrlError { source } => Some(source),
            Self::IoError { source } => Some(source),
            _ => None,
        }
    }
}

impl<T> From<Error> for Result<T> {
    fn from(value: Error) -> Self {
        Err(value)
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        report_and_return!(Error::HttpError { source })
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        report_and_return!(Error::JsonError { source })
    }
}

impl From<url::ParseError> for Error {
    fn from(source: url::ParseError) -> Self {
        report_and_return!(Error::UrlError { source })
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        report_and_return!(Error::IoError { source })
    }
}
