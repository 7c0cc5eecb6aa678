//! Converter registry
//!
//! Maps `(value kind, media type)` pairs to converters and answers the two
//! questions negotiation asks of it: which media types can a value be
//! rendered as, and which registered kind should render it.
//!
//! ## Key Components
//!
//! - [`ValueKind`] / [`KindHierarchy`] - declared kinds with precomputed specificity
//! - [`Converter`] - trait implemented by every converter, see [`convert_with`]
//! - [`ConverterRegistry`] - the registry itself
//! - [`FormatAliases`] - generic format names such as `html` or `json`
//!
//! ## Example
//!
//! ```rust
//! use mediacork::negotiate::Value;
//! use mediacork::registry::{ConverterRegistry, ValueKind, convert_with};
//!
//! const REPORT: ValueKind = ValueKind::new("report");
//!
//! let mut registry = ConverterRegistry::with_defaults();
//! registry.declare_kind(REPORT, &[ValueKind::OBJECT])?;
//! registry.register(REPORT, ["text/csv"], convert_with(|_value, _head| Value::from("a,b\n")))?;
//!
//! assert_eq!(
//!     registry.candidate_media_types_for(REPORT),
//!     vec!["application/json", "text/csv"]
//! );
//! # Ok::<(), mediacork::registry::RegistryError>(())
//! ```

mod converters;
mod defaults;
mod formats;
mod kinds;
#[allow(clippy::module_inception)]
mod registry;

pub use converters::{Converter, convert_with};
pub use defaults::register_defaults;
pub(crate) use defaults::escape_html;
pub use formats::FormatAliases;
pub use kinds::{KindHierarchy, ValueKind};
pub use registry::ConverterRegistry;

use thiserror::Error;

use crate::mediatype::MediaTypeError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown value kind: {0}")]
    UnknownKind(ValueKind),
    #[error("value kind declared twice: {0}")]
    DuplicateKind(ValueKind),
    #[error("value kind '{kind}' names undeclared parent '{parent}'")]
    UnknownParent { kind: ValueKind, parent: ValueKind },
    #[error(transparent)]
    MalformedMediaType(#[from] MediaTypeError),
}
