//! Object heap with identity handles

use rustc_hash::FxHashMap;

use crate::features::interpreter::domain::{default_value, HeapObject};
use crate::features::shadow_store::{ConcreteValue, ObjectHandle};
use crate::shared::models::{Classpath, TypeName};

#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<HeapObject>,
    /// Keyed by the declaring class of the field
    statics: FxHashMap<(TypeName, String), ConcreteValue>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn allocate(&mut self, object: HeapObject) -> ObjectHandle {
        let handle = ObjectHandle(self.objects.len() as u32);
        self.objects.push(object);
        handle
    }

    /// New instance with every non-static field of the class chain zeroed
    pub fn allocate_instance(&mut self, classpath: &dyn Classpath, class_name: &TypeName) -> ObjectHandle {
        let mut fields = FxHashMap::default();
        for class in classpath.superclass_chain(class_name.as_str()) {
            if let Some(info) = classpath.find_class(class.as_str()) {
                for field in info.fields.iter().filter(|f| !f.is_static) {
                    fields
                        .entry(field.name.clone())
                        .or_insert_with(|| default_value(&field.type_name));
                }
            }
        }
        self.allocate(HeapObject::Instance {
            class_name: class_name.clone(),
            fields,
        })
    }

    pub fn allocate_array(&mut self, element_type: &TypeName, length: usize) -> ObjectHandle {
        self.allocate(HeapObject::Array {
            element_type: element_type.clone(),
            elements: vec![default_value(element_type); length],
        })
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&HeapObject> {
        self.objects.get(handle.0 as usize)
    }

    pub fn class_of(&self, handle: ObjectHandle) -> Option<TypeName> {
        self.get(handle).map(HeapObject::class_name)
    }

    pub fn read_field(&self, handle: ObjectHandle, name: &str) -> Option<ConcreteValue> {
        match self.get(handle)? {
            HeapObject::Instance { fields, .. } => fields.get(name).cloned(),
            HeapObject::Array { .. } => None,
        }
    }

    /// `false` when `handle` is not an instance
    pub fn write_field(&mut self, handle: ObjectHandle, name: &str, value: ConcreteValue) -> bool {
        match self.objects.get_mut(handle.0 as usize) {
            Some(HeapObject::Instance { fields, .. }) => {
                fields.insert(name.to_string(), value);
                true
            }
            _ => false,
        }
    }

    pub fn array_len(&self, handle: ObjectHandle) -> Option<usize> {
        match self.get(handle)? {
            HeapObject::Array { elements, .. } => Some(elements.len()),
            HeapObject::Instance { .. } => None,
        }
    }

    pub fn array_elements(&self, handle: ObjectHandle) -> Option<&[ConcreteValue]> {
        match self.get(handle)? {
            HeapObject::Array { elements, .. } => Some(elements),
            HeapObject::Instance { .. } => None,
        }
    }

    pub fn array_elements_mut(&mut self, handle: ObjectHandle) -> Option<&mut Vec<ConcreteValue>> {
        match self.objects.get_mut(handle.0 as usize)? {
            HeapObject::Array { elements, .. } => Some(elements),
            HeapObject::Instance { .. } => None,
        }
    }

    /// Unwritten statics read as the zero value of their type
    pub fn read_static(&self, declaring_class: &TypeName, name: &str, type_name: &TypeName) -> ConcreteValue {
        self.statics
            .get(&(declaring_class.clone(), name.to_string()))
            .cloned()
            .unwrap_or_else(|| default_value(type_name))
    }

    pub fn write_static(&mut self, declaring_class: &TypeName, name: &str, value: ConcreteValue) {
        self.statics
            .insert((declaring_class.clone(), name.to_string()), value);
    }
}
