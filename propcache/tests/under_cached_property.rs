//! End-to-end tests for `under_cached_property` and `CacheBase`.

use propcache::api::{cache_base, under_cached_property};
use propcache::{
    ClassBuilder, ClassObject, ConstructionReason, DictObject, FunctionObject, PropError,
    UnderCachedProperty, Value,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn doc_fn(name: &str, result: i64) -> Value {
    FunctionObject::new(name, move |_, _| Ok(Value::int(result)))
        .with_doc("Docstring.")
        .into_value()
}

/// `class A(CacheBase)` with one `under_cached_property`.
fn cached_class(prop: Value) -> Arc<ClassObject> {
    ClassBuilder::new("A")
        .base(cache_base().unwrap())
        .attr("prop", prop)
        .build()
        .unwrap()
}

fn cache_of(obj: &Value) -> Arc<DictObject> {
    obj.getattr("_cache").unwrap().downcast::<DictObject>().unwrap()
}

// =============================================================================
// CacheBase
// =============================================================================

#[test]
fn test_cache_base_init_creates_cache() {
    let base = Value::object(cache_base().unwrap());
    let obj = base.call(&[]).unwrap();
    assert!(cache_of(&obj).is_empty());
}

#[test]
fn test_subclass_inherits_init() {
    let cls = cached_class(under_cached_property(doc_fn("prop", 1)).unwrap());
    let a = Value::object(Arc::clone(&cls)).call(&[]).unwrap();
    assert_eq!(a.type_name(), "A");
    assert!(cache_of(&a).is_empty());
}

#[test]
fn test_each_instance_gets_its_own_cache() {
    let base = Value::object(cache_base().unwrap());
    let a = base.call(&[]).unwrap();
    let b = base.call(&[]).unwrap();
    assert!(!Value::object(cache_of(&a)).is(&Value::object(cache_of(&b))));
}

// =============================================================================
// Instance Access
// =============================================================================

#[test]
fn test_under_cached_property() {
    let cls = cached_class(under_cached_property(doc_fn("prop", 1)).unwrap());
    let a = Value::object(cls).call(&[]).unwrap();
    assert_eq!(a.getattr("prop").unwrap(), Value::int(1));
    assert_eq!(cache_of(&a).get_str("prop"), Some(Value::int(1)));
}

#[test]
fn test_dict_untouched() {
    let cls = cached_class(under_cached_property(doc_fn("prop", 1)).unwrap());
    let a = Value::object(cls).call(&[]).unwrap();
    a.getattr("prop").unwrap();

    let dict = a.getattr("__dict__").unwrap().downcast::<DictObject>().unwrap();
    // Only the `_cache` attribute set by __init__.
    assert_eq!(dict.len(), 1);
    assert!(dict.get_str("prop").is_none());
}

#[test]
fn test_compute_runs_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let func = FunctionObject::new("prop", move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Value::int(3))
    })
    .into_value();

    let cls = cached_class(under_cached_property(func).unwrap());
    let a = Value::object(cls).call(&[]).unwrap();
    a.getattr("prop").unwrap();
    a.getattr("prop").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_key_is_wrapped_name_not_attribute_name() {
    let prop = under_cached_property(doc_fn("computed", 5)).unwrap();
    let cls = ClassBuilder::new("A")
        .base(cache_base().unwrap())
        .attr("exposed", prop)
        .build()
        .unwrap();
    let a = Value::object(cls).call(&[]).unwrap();

    assert_eq!(a.getattr("exposed").unwrap(), Value::int(5));
    let cache = cache_of(&a);
    assert_eq!(cache.get_str("computed"), Some(Value::int(5)));
    assert!(cache.get_str("exposed").is_none());
}

#[test]
fn test_cache_without_cache_base() {
    let cls = ClassBuilder::new("A")
        .attr("prop", under_cached_property(doc_fn("prop", 1)).unwrap())
        .build()
        .unwrap();
    let a = Value::object(Arc::clone(&cls)).call(&[]).unwrap();

    let err = a.getattr("prop").unwrap_err();
    assert!(err.is_attribute_error());

    // Any dict works once provided.
    a.setattr("_cache", Value::object(DictObject::alloc())).unwrap();
    assert_eq!(a.getattr("prop").unwrap(), Value::int(1));
}

#[test]
fn test_non_dict_cache_is_type_error() {
    let cls = cached_class(under_cached_property(doc_fn("prop", 1)).unwrap());
    let a = Value::object(cls).call(&[]).unwrap();
    a.setattr("_cache", Value::int(0)).unwrap();

    let err = a.getattr("prop").unwrap_err();
    assert_eq!(
        err.to_string(),
        "TypeError: '_cache' attribute of 'A' object must be a dict, not 'int'"
    );
}

#[test]
fn test_under_cached_property_assignment() {
    let cls = cached_class(under_cached_property(doc_fn("prop", 1)).unwrap());
    let a = Value::object(cls).call(&[]).unwrap();

    let err = a.setattr("prop", Value::none()).unwrap_err();
    assert!(matches!(err, PropError::ReadOnly { .. }));
    assert!(cache_of(&a).is_empty());
}

// =============================================================================
// Class Access
// =============================================================================

#[test]
fn test_under_cached_property_class() {
    let prop = under_cached_property(doc_fn("prop", 1)).unwrap();
    let cls = cached_class(prop.clone());
    let from_class = Value::object(cls).getattr("prop").unwrap();

    assert!(from_class.is(&prop));
    assert_eq!(from_class.getattr("__doc__").unwrap(), Value::str("Docstring."));
    assert_eq!(from_class.getattr("name").unwrap(), Value::str("prop"));
}

#[test]
fn test_ensured_wrapped_function_is_accessible() {
    let func = doc_fn("prop", 1);
    let cls = cached_class(under_cached_property(func.clone()).unwrap());
    let a = Value::object(Arc::clone(&cls)).call(&[]).unwrap();

    let wrapped = Value::object(cls).getattr("prop").unwrap().getattr("wrapped").unwrap();
    assert!(wrapped.is(&func));
    assert_eq!(wrapped.call(&[a]).unwrap(), Value::int(1));
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_requires_name() {
    let err = under_cached_property(Value::int(1)).unwrap_err();
    assert!(matches!(
        err,
        PropError::Construction { reason: ConstructionReason::MissingName, .. }
    ));
}

#[test]
fn test_requires_callable() {
    // An instance with a `__name__` attribute but no `__call__`.
    let cls = ClassBuilder::new("NotCallable").build().unwrap();
    let obj = Value::object(cls.instantiate());
    obj.setattr("__name__", Value::str("prop")).unwrap();

    let err = under_cached_property(obj).unwrap_err();
    assert!(matches!(
        err,
        PropError::Construction { reason: ConstructionReason::NotCallable, .. }
    ));
    assert_eq!(
        err.to_string(),
        "TypeError: wrapped method named 'prop' must be callable"
    );
}

#[test]
fn test_class_getitem() {
    let alias = UnderCachedProperty::class_getitem(Value::str("int"));
    assert_eq!(alias.origin(), &Value::str("under_cached_property"));
}
