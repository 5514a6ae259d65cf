//! Built-in object types.

pub mod alias;
pub mod dict;
pub mod function;

pub use alias::GenericAlias;
pub use dict::DictObject;
pub use function::{FunctionObject, NativeFn};
