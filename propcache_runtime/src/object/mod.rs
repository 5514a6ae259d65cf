//! Object model: classes, instances, MRO and descriptors.

pub mod class;
pub mod descriptor;
pub mod instance;
pub mod mro;

pub use class::{ClassBuilder, ClassFlags, ClassObject};
pub use instance::InstanceObject;
pub use mro::{ClassId, Mro, MroError, compute_c3_mro};
