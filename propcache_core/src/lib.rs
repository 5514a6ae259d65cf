//! # propcache core
//!
//! Core types and traits shared by every propcache crate:
//!
//! - **Value System**: [`Value`], scalars inline and objects behind `Arc`
//! - **Object Model**: the [`PyObject`] and [`Descriptor`] protocols
//! - **Interning**: attribute names compared by pointer
//! - **Error Handling**: [`PropError`] and [`PropResult`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod intern;
pub mod object;
pub mod value;

pub use error::{ConstructionReason, PropError, PropResult};
pub use intern::{InternedString, StringInterner, intern};
pub use object::{Descriptor, DescriptorFlags, DescriptorKind, ObjectRef, PyObject};
pub use value::Value;

/// propcache version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
