//! Error types and result definitions for propcache.
//!
//! Every error the runtime can surface is a variant of [`PropError`]. Each
//! variant maps onto the Python exception class a host interpreter would raise
//! for the same condition (see [`PropError::exception_type`]):
//!
//! | Variant            | Raised as        |
//! |--------------------|------------------|
//! | `Construction`     | `TypeError` / `AttributeError` |
//! | `NamingConflict`   | `TypeError`      |
//! | `NotBound`         | `TypeError`      |
//! | `ReadOnly`         | `AttributeError` |
//! | `AttributeError`   | `AttributeError` |
//! | `TypeError`        | `TypeError`      |
//! | `Raised`           | user supplied    |
//!
//! Errors produced by user compute callables travel through the descriptors
//! untouched.

use std::fmt;
use thiserror::Error;

/// The unified result type used throughout propcache.
pub type PropResult<T> = Result<T, PropError>;

/// Why a descriptor could not be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructionReason {
    /// The wrapped object has no `__name__` attribute.
    MissingName,
    /// The wrapped object cannot be called.
    NotCallable,
}

impl ConstructionReason {
    /// Get the Python exception type name.
    #[must_use]
    pub const fn exception_type(self) -> &'static str {
        match self {
            Self::MissingName => "AttributeError",
            Self::NotCallable => "TypeError",
        }
    }
}

impl fmt::Display for ConstructionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.exception_type())
    }
}

/// Comprehensive error type covering all propcache error conditions.
#[derive(Error, Debug, Clone)]
pub enum PropError {
    /// A descriptor rejected the callable it was asked to wrap.
    #[error("{reason}: {message}")]
    Construction {
        /// What was wrong with the wrapped object.
        reason: ConstructionReason,
        /// Error description.
        message: String,
    },

    /// A cached property was bound to a second, different attribute name.
    #[error(
        "TypeError: Cannot assign the same cached_property to two different names '{existing}' and '{proposed}'."
    )]
    NamingConflict {
        /// The name the descriptor is already bound to.
        existing: String,
        /// The rejected name.
        proposed: String,
    },

    /// A cached property was read before any name was bound to it.
    #[error("TypeError: Cannot use cached_property instance without calling __set_name__ on it.")]
    NotBound,

    /// Assignment to a read-only attribute.
    #[error("AttributeError: {message}")]
    ReadOnly {
        /// Error description.
        message: String,
    },

    /// Attribute lookup failure.
    #[error("AttributeError: {message}")]
    AttributeError {
        /// Error description.
        message: String,
    },

    /// Type mismatch error.
    #[error("TypeError: {message}")]
    TypeError {
        /// Error description.
        message: String,
    },

    /// An exception raised by user code (e.g. a property's compute function).
    #[error("{kind}: {message}")]
    Raised {
        /// The Python exception type name.
        kind: String,
        /// Error description.
        message: String,
    },
}

impl PropError {
    /// Create a construction error for a wrapped object without `__name__`.
    #[must_use]
    pub fn missing_name(message: impl Into<String>) -> Self {
        Self::Construction {
            reason: ConstructionReason::MissingName,
            message: message.into(),
        }
    }

    /// Create a construction error for a non-callable wrapped object.
    #[must_use]
    pub fn not_callable(name: impl fmt::Display) -> Self {
        Self::Construction {
            reason: ConstructionReason::NotCallable,
            message: format!("wrapped method named '{name}' must be callable"),
        }
    }

    /// Create a naming conflict error.
    #[must_use]
    pub fn naming_conflict(existing: impl Into<String>, proposed: impl Into<String>) -> Self {
        Self::NamingConflict {
            existing: existing.into(),
            proposed: proposed.into(),
        }
    }

    /// Create a read-only error.
    #[must_use]
    pub fn read_only(message: impl Into<String>) -> Self {
        Self::ReadOnly {
            message: message.into(),
        }
    }

    /// Create an attribute error.
    #[must_use]
    pub fn attribute(message: impl Into<String>) -> Self {
        Self::AttributeError {
            message: message.into(),
        }
    }

    /// Create the standard "object has no attribute" error.
    #[must_use]
    pub fn no_attribute(type_name: &str, attr: &str) -> Self {
        Self::attribute(format!("'{type_name}' object has no attribute '{attr}'"))
    }

    /// Create a type error.
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError {
            message: message.into(),
        }
    }

    /// Create an error as if user code raised `kind(message)`.
    #[must_use]
    pub fn raised(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Raised {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Get the Python exception type name.
    #[must_use]
    pub fn exception_type(&self) -> &str {
        match self {
            Self::Construction { reason, .. } => reason.exception_type(),
            Self::NamingConflict { .. } | Self::NotBound | Self::TypeError { .. } => "TypeError",
            Self::ReadOnly { .. } | Self::AttributeError { .. } => "AttributeError",
            Self::Raised { kind, .. } => kind,
        }
    }

    /// Check whether a host would treat this error as an `AttributeError`.
    ///
    /// `hasattr()`-style probes swallow exactly these errors.
    #[must_use]
    pub fn is_attribute_error(&self) -> bool {
        self.exception_type() == "AttributeError"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming_conflict_message_names_both() {
        let err = PropError::naming_conflict("prop", "something_else");
        assert_eq!(err.exception_type(), "TypeError");
        assert_eq!(
            err.to_string(),
            "TypeError: Cannot assign the same cached_property to two different names 'prop' and 'something_else'."
        );
    }

    #[test]
    fn test_not_bound_message() {
        let err = PropError::NotBound;
        assert_eq!(err.exception_type(), "TypeError");
        assert!(err.to_string().contains("Cannot use cached_property instance"));
    }

    #[test]
    fn test_construction_reasons() {
        let err = PropError::not_callable("prop");
        assert_eq!(err.exception_type(), "TypeError");
        assert_eq!(
            err.to_string(),
            "TypeError: wrapped method named 'prop' must be callable"
        );

        let err = PropError::missing_name("'int' object has no attribute '__name__'");
        assert_eq!(err.exception_type(), "AttributeError");
        assert!(err.is_attribute_error());
    }

    #[test]
    fn test_read_only_is_attribute_error() {
        let err = PropError::read_only("cached property is read-only");
        assert!(err.is_attribute_error());
        assert_eq!(
            err.to_string(),
            "AttributeError: cached property is read-only"
        );
    }

    #[test]
    fn test_no_attribute_message() {
        let err = PropError::no_attribute("A", "_cache");
        assert_eq!(
            err.to_string(),
            "AttributeError: 'A' object has no attribute '_cache'"
        );
    }

    #[test]
    fn test_raised_keeps_user_kind() {
        let err = PropError::raised("ValueError", "boom");
        assert_eq!(err.exception_type(), "ValueError");
        assert_eq!(err.to_string(), "ValueError: boom");
        assert!(!err.is_attribute_error());
    }

    #[test]
    fn test_every_variant_maps_to_a_host_exception() {
        let cases = [
            (PropError::not_callable("p"), "TypeError"),
            (PropError::naming_conflict("a", "b"), "TypeError"),
            (PropError::NotBound, "TypeError"),
            (PropError::read_only("x"), "AttributeError"),
            (PropError::no_attribute("A", "_cache"), "AttributeError"),
            (PropError::type_error("x"), "TypeError"),
            (PropError::raised("KeyError", "k"), "KeyError"),
        ];
        for (err, kind) in cases {
            assert_eq!(err.exception_type(), kind);
            assert!(err.to_string().starts_with(kind), "{err}");
        }
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(ConstructionReason::MissingName.to_string(), "AttributeError");
        assert_eq!(ConstructionReason::NotCallable.to_string(), "TypeError");
    }
}
