//! Instances of user classes.
//!
//! Attribute reads follow the generic lookup order:
//!
//! | Step | Source                                   |
//! |------|------------------------------------------|
//! | 1    | data descriptor found on the class MRO   |
//! | 2    | instance `__dict__`                      |
//! | 3    | non-data descriptor or plain class attr  |
//! | 4    | `AttributeError`                         |
//!
//! Writes go to a data descriptor if the MRO has one, otherwise into
//! `__dict__`. Slots-only instances have no `__dict__` and reject new
//! attributes.

use super::class::ClassObject;
use crate::types::DictObject;
use propcache_core::{DescriptorFlags, InternedString, PropError, PropResult, PyObject, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An instance of a [`ClassObject`].
pub struct InstanceObject {
    class: Arc<ClassObject>,
    dict: Option<Arc<DictObject>>,
}

impl InstanceObject {
    /// Allocate an instance of `class`, with a fresh `__dict__` if the class
    /// layout has one.
    pub fn alloc(class: Arc<ClassObject>) -> Arc<Self> {
        let dict = class.has_dict().then(DictObject::alloc);
        crate::alloc(Self { class, dict })
    }

    /// Get the instance's class.
    #[inline]
    pub fn class(&self) -> &Arc<ClassObject> {
        &self.class
    }

    /// Get the instance `__dict__`, if the layout has one.
    #[inline]
    pub fn dict(&self) -> Option<&Arc<DictObject>> {
        self.dict.as_ref()
    }

    pub(crate) fn visit(&self, mut f: impl FnMut(*const ())) {
        f(Arc::as_ptr(&self.class).cast());
        if let Some(dict) = &self.dict {
            f(Arc::as_ptr(dict).cast());
        }
    }
}

impl fmt::Debug for InstanceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object at {:p}>", self.class.name(), self)
    }
}

impl PyObject for InstanceObject {
    fn type_name(&self) -> &str {
        self.class.name().as_str()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn get_attr(self: Arc<Self>, name: &InternedString) -> PropResult<Value> {
        match name.as_str() {
            "__dict__" => {
                return match &self.dict {
                    Some(dict) => Ok(Value::object(Arc::clone(dict))),
                    None => Err(PropError::no_attribute(self.type_name(), name)),
                };
            }
            "__class__" => return Ok(Value::object(Arc::clone(&self.class))),
            _ => {}
        }

        let class_attr = self.class.lookup(name);
        let descr = class_attr.as_ref().and_then(Value::as_descriptor);

        if let Some(descr) = &descr {
            if descr.is_data_descriptor() {
                let this = Value::object(Arc::clone(&self));
                let owner = Value::object(Arc::clone(&self.class));
                return Arc::clone(descr).get(Some(&this), Some(&owner));
            }
        }

        if let Some(value) = self.dict.as_ref().and_then(|d| d.get(name)) {
            return Ok(value);
        }

        match (descr, class_attr) {
            (Some(descr), _) if descr.flags().contains(DescriptorFlags::HAS_GET) => {
                let owner = Value::object(Arc::clone(&self.class));
                let this = Value::object(self);
                descr.get(Some(&this), Some(&owner))
            }
            (_, Some(value)) => Ok(value),
            (_, None) => Err(PropError::no_attribute(self.type_name(), name)),
        }
    }

    fn set_attr(self: Arc<Self>, name: &InternedString, value: Value) -> PropResult<()> {
        if let Some(descr) = self.class.lookup(name).as_ref().and_then(Value::as_descriptor) {
            if descr.is_data_descriptor() {
                let this = Value::object(Arc::clone(&self));
                return descr.set(&this, value);
            }
        }

        match &self.dict {
            Some(dict) => {
                dict.set(name.clone(), value);
                Ok(())
            }
            None => Err(PropError::no_attribute(self.type_name(), name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::class::ClassBuilder;
    use propcache_core::intern;

    #[test]
    fn test_dict_attributes() {
        let cls = ClassBuilder::new("A").build().unwrap();
        let obj = Value::object(cls.instantiate());

        obj.setattr("x", Value::int(1)).unwrap();
        assert_eq!(obj.getattr("x").unwrap(), Value::int(1));

        let dict = obj.getattr("__dict__").unwrap();
        assert_eq!(dict.type_name(), "dict");
        let dict = dict.downcast::<DictObject>().unwrap();
        assert_eq!(dict.get(&intern("x")), Some(Value::int(1)));

        // Same mapping every time.
        assert!(obj.getattr("__dict__").unwrap().is(&obj.getattr("__dict__").unwrap()));
    }

    #[test]
    fn test_instance_dict_shadows_plain_class_attr() {
        let cls = ClassBuilder::new("A").attr("x", Value::int(1)).build().unwrap();
        let obj = Value::object(cls.instantiate());
        assert_eq!(obj.getattr("x").unwrap(), Value::int(1));
        obj.setattr("x", Value::int(2)).unwrap();
        assert_eq!(obj.getattr("x").unwrap(), Value::int(2));
    }

    #[test]
    fn test_slots_instance_has_no_dict() {
        let cls = ClassBuilder::new("S").slots().build().unwrap();
        let obj = Value::object(cls.instantiate());

        let err = obj.getattr("__dict__").unwrap_err();
        assert_eq!(
            err.to_string(),
            "AttributeError: 'S' object has no attribute '__dict__'"
        );
        assert!(obj.setattr("x", Value::int(1)).unwrap_err().is_attribute_error());
    }

    #[test]
    fn test_missing_attribute() {
        let cls = ClassBuilder::new("A").build().unwrap();
        let obj = Value::object(cls.instantiate());
        assert_eq!(
            obj.getattr("_cache").unwrap_err().to_string(),
            "AttributeError: 'A' object has no attribute '_cache'"
        );
        assert!(!obj.hasattr("_cache").unwrap());
    }

    #[test]
    fn test_class_attribute() {
        let cls = ClassBuilder::new("A").build().unwrap();
        let obj = Value::object(cls.instantiate());
        let class = obj.getattr("__class__").unwrap();
        assert!(class.is(&Value::object(cls)));
    }
}
