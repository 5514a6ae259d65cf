//! # propcache
//!
//! Cached property descriptors for a dynamic object runtime.
//!
//! ```rust
//! use propcache::api;
//! use propcache::{ClassBuilder, FunctionObject, Value};
//!
//! # fn main() -> propcache::PropResult<()> {
//! let area = FunctionObject::new("area", |_, args| {
//!     let r = args[0].getattr("r")?.as_int().unwrap_or(0);
//!     Ok(Value::int(3 * r * r))
//! })
//! .into_value();
//!
//! let circle = ClassBuilder::new("Circle")
//!     .attr("area", api::cached_property(area))
//!     .build()?;
//!
//! let c = Value::object(circle.instantiate());
//! c.setattr("r", Value::int(2))?;
//! assert_eq!(c.getattr("area")?, Value::int(12));
//!
//! // Stored in the instance __dict__, later reads skip the function.
//! c.setattr("r", Value::int(5)).ok();
//! assert_eq!(c.getattr("area")?, Value::int(12));
//! # Ok(())
//! # }
//! ```
//!
//! Crates:
//!
//! - `propcache_core`: values, errors, object and descriptor traits
//! - `propcache_gc`: tracing and cycle collection
//! - `propcache_runtime`: object model and the descriptors

#![warn(clippy::all)]

pub mod api;
pub mod module;

pub use api::{base_cached_property, cache_base, cached_property, under_cached_property};
pub use module::ModuleState;
pub use propcache_core::{ConstructionReason, PropError, PropResult, Value, intern};
pub use propcache_runtime::{
    CachedProperty, ClassBuilder, ClassObject, DictObject, FunctionObject, InstanceObject,
    NameBinding, UnderCachedProperty,
};

/// propcache version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
