//! String interning for attribute names and documentation strings.
//!
//! Attribute names are compared on every lookup, so they are interned once and
//! afterwards compared by pointer. Interned handles are cheap to clone and
//! safe to share between threads.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

/// Handle to a name stored once in an interner.
///
/// Two handles produced by the same interner are equal if and only if they
/// point at the same allocation, which makes equality and hashing O(1).
#[derive(Clone)]
pub struct InternedString {
    inner: Arc<str>,
}

impl InternedString {
    #[inline]
    fn new(s: Arc<str>) -> Self {
        Self { inner: s }
    }

    /// The name as a `&str`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Byte length.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the name is `""`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    fn addr(&self) -> *const u8 {
        self.inner.as_ptr()
    }
}

impl PartialEq for InternedString {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for InternedString {}

impl Hash for InternedString {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for InternedString {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::ops::Deref for InternedString {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl PartialEq<str> for InternedString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for InternedString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Deduplicating name table, safe to share between threads.
pub struct StringInterner {
    strings: RwLock<FxHashMap<Arc<str>, InternedString>>,
}

impl StringInterner {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strings: RwLock::new(FxHashMap::default()),
        }
    }

    /// Return the shared handle for `s`, inserting it on first use.
    pub fn intern(&self, s: &str) -> InternedString {
        if let Some(interned) = self.strings.read().get(s) {
            return interned.clone();
        }

        let mut strings = self.strings.write();
        // Another thread may have won the race between the two locks.
        if let Some(interned) = strings.get(s) {
            return interned.clone();
        }

        let key: Arc<str> = Arc::from(s);
        let handle = InternedString::new(Arc::clone(&key));
        strings.insert(key, handle.clone());
        handle
    }

    /// Look `s` up without inserting it.
    #[must_use]
    pub fn get(&self, s: &str) -> Option<InternedString> {
        self.strings.read().get(s).cloned()
    }

    /// Number of distinct names stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.read().len()
    }

    /// Whether nothing has been interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.read().is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringInterner({} names)", self.len())
    }
}

/// Process-wide interner shared by every runtime object.
pub static GLOBAL_INTERNER: LazyLock<StringInterner> = LazyLock::new(StringInterner::new);

/// Intern `s` in the process-wide table.
#[inline]
pub fn intern(s: &str) -> InternedString {
    GLOBAL_INTERNER.intern(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_same_string_returns_same_handle() {
        let interner = StringInterner::new();
        let a = interner.intern("prop");
        let b = interner.intern("prop");
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_intern_different_strings() {
        let interner = StringInterner::new();
        assert_ne!(interner.intern("a"), interner.intern("b"));
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_separate_interners_do_not_compare_equal() {
        let a = StringInterner::new().intern("prop");
        let b = StringInterner::new().intern("prop");
        assert_ne!(a, b);
        assert_eq!(a, "prop");
        assert_eq!(b, "prop");
    }

    #[test]
    fn test_get_does_not_insert() {
        let interner = StringInterner::new();
        assert!(interner.get("missing").is_none());
        assert!(interner.is_empty());
        interner.intern("present");
        assert!(interner.get("present").is_some());
    }

    #[test]
    fn test_empty_string_is_a_valid_name() {
        let s = intern("");
        assert!(s.is_empty());
        assert_eq!(s, intern(""));
    }

    #[test]
    fn test_debug_and_display() {
        let s = intern("_cache");
        assert_eq!(format!("{s}"), "_cache");
        assert_eq!(format!("{s:?}"), "\"_cache\"");
    }

    #[test]
    fn test_concurrent_same_string() {
        let interner = Arc::new(StringInterner::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let interner = Arc::clone(&interner);
                std::thread::spawn(move || interner.intern("shared"))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(interner.len(), 1);
    }
}
