/*
 * Identifier Encoder
 *
 * Assigns session-stable integer ids:
 * - classes: sequential on first sight
 * - methods: index in the declaring class's methods sorted by description,
 *   so ids can be re-derived from scratch by a separate run
 * - instructions: position in the method's instruction list
 * - fields: resolved to their declaring class first, then given a global
 *   sequence (separate for static and instance fields)
 * - signatures: name + descriptor, shared by every class declaring it
 *
 * Tables only grow; they are dropped with the session.
 */

use rustc_hash::FxHashMap;
use tracing::trace;
use uuid::Uuid;

use crate::features::encoding::domain::{
    EncodedInstruction, EncodingError, EncodingResult, InstructionId, InstructionKey,
    StaticAccessId, StaticAccessKind, StaticFieldAccess,
};
use crate::shared::models::{ClassInfo, Classpath, MethodInfo, RawFieldRef, RawInst, TypeName};

#[derive(Debug, Default)]
struct EncodedClass {
    id: u32,
    /// method description → method id
    methods: FxHashMap<String, u32>,
}

#[derive(Debug)]
pub struct IdentifierEncoder {
    session_id: Uuid,
    classes: FxHashMap<TypeName, EncodedClass>,
    next_class_id: u32,
    static_fields: FxHashMap<(TypeName, String), u32>,
    next_static_field_id: u32,
    instance_fields: FxHashMap<(TypeName, String), u32>,
    next_instance_field_id: u32,
    signatures: FxHashMap<String, u32>,
    instructions: FxHashMap<InstructionId, EncodedInstruction>,
    static_accesses: FxHashMap<StaticAccessId, StaticFieldAccess>,
}

impl Default for IdentifierEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierEncoder {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            classes: FxHashMap::default(),
            next_class_id: 0,
            static_fields: FxHashMap::default(),
            next_static_field_id: 0,
            instance_fields: FxHashMap::default(),
            next_instance_field_id: 0,
            signatures: FxHashMap::default(),
            instructions: FxHashMap::default(),
            static_accesses: FxHashMap::default(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn encode_class(&mut self, class_name: &TypeName) -> u32 {
        if let Some(encoded) = self.classes.get(class_name) {
            return encoded.id;
        }
        let id = self.next_class_id;
        self.next_class_id += 1;
        self.classes.insert(
            class_name.clone(),
            EncodedClass {
                id,
                methods: FxHashMap::default(),
            },
        );
        trace!(class = %class_name, id, "Encoded class");
        id
    }

    pub fn encode_method(&mut self, class: &ClassInfo, method: &MethodInfo) -> EncodingResult<u32> {
        let description = method.description();
        self.encode_class(&class.name);
        if let Some(id) = self
            .classes
            .get(&class.name)
            .and_then(|encoded| encoded.methods.get(&description))
        {
            return Ok(*id);
        }

        let mut descriptions: Vec<String> = class.methods.iter().map(|m| m.description()).collect();
        descriptions.sort();
        let index = descriptions
            .iter()
            .position(|d| *d == description)
            .ok_or_else(|| EncodingError::MethodNotFound {
                class: class.name.to_string(),
                method: description.clone(),
            })? as u32;

        if let Some(encoded) = self.classes.get_mut(&class.name) {
            encoded.methods.insert(description, index);
        }
        Ok(index)
    }

    /// Encode the instruction at `index` of `method`'s instruction list
    pub fn encode_instruction(
        &mut self,
        class: &ClassInfo,
        method: &MethodInfo,
        index: usize,
        instruction: &RawInst,
    ) -> EncodingResult<InstructionId> {
        let class_id = self.encode_class(&class.name);
        let method_id = self.encode_method(class, method)?;
        let inst_id = u32::try_from(index).map_err(|_| EncodingError::Overflow {
            component: "inst_id",
            value: index as u64,
            bits: 32,
        })?;
        let id = InstructionKey::new(class_id, method_id, inst_id).pack()?;
        self.instructions.entry(id).or_insert_with(|| EncodedInstruction {
            id,
            class_name: class.name.clone(),
            method_name: method.name.clone(),
            method_descriptor: method.descriptor(),
            index,
            instruction: instruction.clone(),
        });
        Ok(id)
    }

    /// Method key with instruction component 0
    pub fn encode_method_entry(
        &mut self,
        class: &ClassInfo,
        method: &MethodInfo,
    ) -> EncodingResult<InstructionId> {
        let class_id = self.encode_class(&class.name);
        let method_id = self.encode_method(class, method)?;
        InstructionKey::new(class_id, method_id, 0).pack()
    }

    /// Call-matching key for `name` + `descriptor`
    ///
    /// Overrides share their signature, so a frame pushed by virtual
    /// dispatch matches the key staged at the call site.
    pub fn encode_signature(&mut self, name: &str, descriptor: &str) -> u32 {
        let signature = format!("{}{}", name, descriptor);
        if let Some(&id) = self.signatures.get(&signature) {
            return id;
        }
        let id = self.signatures.len() as u32;
        trace!(signature = %signature, id, "Encoded signature");
        self.signatures.insert(signature, id);
        id
    }

    /// Flag slot of a field, shared by every reference resolving to the same
    /// declaring class
    pub fn encode_field(
        &mut self,
        classpath: &dyn Classpath,
        field_ref: &RawFieldRef,
    ) -> EncodingResult<u32> {
        if field_ref.is_static() {
            // Statics of classes off the classpath keep the name as written
            let owner = Self::resolve_field_owner(classpath, field_ref, true)
                .unwrap_or_else(|_| field_ref.declaring_class.clone());
            let key = (owner, field_ref.field_name.clone());
            if let Some(&id) = self.static_fields.get(&key) {
                return Ok(id);
            }
            let id = self.next_static_field_id;
            self.next_static_field_id += 1;
            trace!(class = %key.0, field = %key.1, id, "Encoded static field");
            self.static_fields.insert(key, id);
            return Ok(id);
        }

        let owner = Self::resolve_field_owner(classpath, field_ref, false)?;
        let key = (owner, field_ref.field_name.clone());
        if let Some(&id) = self.instance_fields.get(&key) {
            return Ok(id);
        }
        let id = self.next_instance_field_id;
        self.next_instance_field_id += 1;
        trace!(class = %key.0, field = %key.1, id, "Encoded instance field");
        self.instance_fields.insert(key, id);
        Ok(id)
    }

    /// First class on the superclass chain (most derived first) declaring the field
    fn resolve_field_owner(
        classpath: &dyn Classpath,
        field_ref: &RawFieldRef,
        is_static: bool,
    ) -> EncodingResult<TypeName> {
        let mut class = classpath
            .find_class(field_ref.declaring_class.as_str())
            .ok_or_else(|| EncodingError::ClassNotFound {
                class: field_ref.declaring_class.to_string(),
            })?;
        loop {
            if class
                .fields
                .iter()
                .any(|f| f.is_static == is_static && f.name == field_ref.field_name)
            {
                return Ok(class.name.clone());
            }
            class = class
                .super_class
                .as_ref()
                .and_then(|super_class| classpath.find_class(super_class.as_str()))
                .ok_or_else(|| EncodingError::FieldNotFound {
                    class: field_ref.declaring_class.to_string(),
                    field: field_ref.field_name.clone(),
                })?;
        }
    }

    /// Static fields may be accessed through a subclass of the declaring class
    pub fn encode_static_field_access(
        &mut self,
        classpath: &dyn Classpath,
        field_ref: &RawFieldRef,
        kind: StaticAccessKind,
    ) -> EncodingResult<StaticAccessId> {
        let mut class = classpath
            .find_class(field_ref.declaring_class.as_str())
            .ok_or_else(|| EncodingError::ClassNotFound {
                class: field_ref.declaring_class.to_string(),
            })?;
        loop {
            let found = class
                .fields
                .iter()
                .enumerate()
                .find(|(_, f)| f.is_static && f.name == field_ref.field_name);
            if let Some((index, field)) = found {
                let class_id = self.encode_class(&class.name);
                let id = StaticAccessId::pack(class_id, index as u64, kind)?;
                self.static_accesses.entry(id).or_insert_with(|| StaticFieldAccess {
                    class_name: class.name.clone(),
                    field: field.clone(),
                    kind,
                });
                return Ok(id);
            }
            class = class
                .super_class
                .as_ref()
                .and_then(|super_class| classpath.find_class(super_class.as_str()))
                .ok_or_else(|| EncodingError::FieldNotFound {
                    class: field_ref.declaring_class.to_string(),
                    field: field_ref.field_name.clone(),
                })?;
        }
    }

    pub fn decode_instruction(&self, id: InstructionId) -> EncodingResult<&EncodedInstruction> {
        self.instructions
            .get(&id)
            .ok_or(EncodingError::UnknownInstruction(id.0))
    }

    pub fn decode_static_access(&self, id: StaticAccessId) -> EncodingResult<&StaticFieldAccess> {
        self.static_accesses
            .get(&id)
            .ok_or(EncodingError::UnknownStaticAccess(id.0))
    }

    /// Class → id, ordered by id
    pub fn encoded_classes(&self) -> Vec<(TypeName, u32)> {
        let mut classes: Vec<(TypeName, u32)> = self
            .classes
            .iter()
            .map(|(name, encoded)| (name.clone(), encoded.id))
            .collect();
        classes.sort_by_key(|(_, id)| *id);
        classes
    }

    pub fn encoded_instruction_count(&self) -> usize {
        self.instructions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{FieldInfo, InMemoryClasspath, Parameter, RawValue};

    fn method(name: &str, params: &[&str]) -> MethodInfo {
        MethodInfo {
            name: name.to_string(),
            is_static: true,
            parameters: params
                .iter()
                .enumerate()
                .map(|(i, t)| Parameter {
                    name: format!("p{}", i),
                    type_name: TypeName::new(*t),
                })
                .collect(),
            return_type: TypeName::void(),
            local_count: 0,
            instructions: Some(vec![RawInst::Return(None)]),
        }
    }

    fn class(name: &str, super_class: Option<&str>, fields: Vec<FieldInfo>) -> ClassInfo {
        ClassInfo {
            name: TypeName::new(name),
            super_class: super_class.map(TypeName::new),
            is_enum: false,
            fields,
            methods: vec![method("zeta", &[]), method("alpha", &["int"]), method("alpha", &[])],
        }
    }

    #[test]
    fn test_method_ids_follow_description_order() {
        let cls = class("Main", None, Vec::new());
        let mut encoder = IdentifierEncoder::new();
        // alpha()V < alpha(I)V < zeta()V
        assert_eq!(encoder.encode_method(&cls, &cls.methods[2]).unwrap(), 0);
        assert_eq!(encoder.encode_method(&cls, &cls.methods[1]).unwrap(), 1);
        assert_eq!(encoder.encode_method(&cls, &cls.methods[0]).unwrap(), 2);

        // A fresh session derives the same ids regardless of request order
        let mut other = IdentifierEncoder::new();
        assert_eq!(other.encode_method(&cls, &cls.methods[0]).unwrap(), 2);
    }

    #[test]
    fn test_unknown_method_is_fatal() {
        let cls = class("Main", None, Vec::new());
        let mut encoder = IdentifierEncoder::new();
        let stranger = method("missing", &["long"]);
        assert!(matches!(
            encoder.encode_method(&cls, &stranger),
            Err(EncodingError::MethodNotFound { .. })
        ));
    }

    #[test]
    fn test_instruction_round_trip_through_reverse_table() {
        let cls = class("Main", None, Vec::new());
        let m = &cls.methods[0];
        let mut encoder = IdentifierEncoder::new();
        let inst = RawInst::Return(None);
        let id = encoder.encode_instruction(&cls, m, 4, &inst).unwrap();
        let decoded = encoder.decode_instruction(id).unwrap();
        assert_eq!(decoded.index, 4);
        assert_eq!(decoded.method_name, "zeta");
        assert_eq!(id.unpack().inst_id, 4);
        assert!(encoder.decode_instruction(InstructionId(u64::MAX)).is_err());
    }

    fn instance_field(owner: &str, name: &str) -> RawFieldRef {
        RawFieldRef {
            instance: Some(Box::new(RawValue::local(0, "%0", owner))),
            declaring_class: TypeName::new(owner),
            field_name: name.to_string(),
            type_name: TypeName::int(),
        }
    }

    fn static_field(owner: &str, name: &str) -> RawFieldRef {
        RawFieldRef {
            instance: None,
            declaring_class: TypeName::new(owner),
            field_name: name.to_string(),
            type_name: TypeName::int(),
        }
    }

    #[test]
    fn test_instance_field_slot_follows_declaring_class() {
        let cp = InMemoryClasspath::new(vec![
            class(
                "Base",
                None,
                vec![FieldInfo::new("a", "int", false), FieldInfo::new("b", "int", false)],
            ),
            class("Derived", Some("Base"), vec![FieldInfo::new("c", "int", false)]),
        ]);
        let mut encoder = IdentifierEncoder::new();

        let derived_a = encoder.encode_field(&cp, &instance_field("Derived", "a")).unwrap();
        let base_a = encoder.encode_field(&cp, &instance_field("Base", "a")).unwrap();
        let base_b = encoder.encode_field(&cp, &instance_field("Base", "b")).unwrap();
        let derived_b = encoder.encode_field(&cp, &instance_field("Derived", "b")).unwrap();
        let derived_c = encoder.encode_field(&cp, &instance_field("Derived", "c")).unwrap();

        assert_eq!(derived_a, base_a);
        assert_eq!(derived_b, base_b);
        assert_ne!(base_a, base_b);
        assert_ne!(derived_c, base_a);
        assert_ne!(derived_c, base_b);

        assert!(matches!(
            encoder.encode_field(&cp, &instance_field("Derived", "nope")),
            Err(EncodingError::FieldNotFound { .. })
        ));
        assert!(matches!(
            encoder.encode_field(&cp, &instance_field("Ghost", "a")),
            Err(EncodingError::ClassNotFound { .. })
        ));
    }

    #[test]
    fn test_shadowing_field_gets_its_own_slot() {
        let cp = InMemoryClasspath::new(vec![
            class("Base", None, vec![FieldInfo::new("a", "int", false)]),
            class("Derived", Some("Base"), vec![FieldInfo::new("a", "int", false)]),
        ]);
        let mut encoder = IdentifierEncoder::new();
        let base_a = encoder.encode_field(&cp, &instance_field("Base", "a")).unwrap();
        let derived_a = encoder.encode_field(&cp, &instance_field("Derived", "a")).unwrap();
        assert_ne!(base_a, derived_a);
    }

    #[test]
    fn test_static_field_ids_are_global_sequence() {
        let cp = InMemoryClasspath::new(vec![
            class("A", None, vec![FieldInfo::new("x", "int", true)]),
            class("B", None, vec![FieldInfo::new("x", "int", true)]),
        ]);
        let mut encoder = IdentifierEncoder::new();
        assert_eq!(encoder.encode_field(&cp, &static_field("A", "x")).unwrap(), 0);
        assert_eq!(encoder.encode_field(&cp, &static_field("B", "x")).unwrap(), 1);
        assert_eq!(encoder.encode_field(&cp, &static_field("A", "x")).unwrap(), 0);
    }

    #[test]
    fn test_static_field_slot_shared_through_subclass() {
        let cp = InMemoryClasspath::new(vec![
            class("Base", None, vec![FieldInfo::new("s", "int", true)]),
            class("Derived", Some("Base"), Vec::new()),
        ]);
        let mut encoder = IdentifierEncoder::new();
        let via_derived = encoder.encode_field(&cp, &static_field("Derived", "s")).unwrap();
        let via_base = encoder.encode_field(&cp, &static_field("Base", "s")).unwrap();
        assert_eq!(via_derived, via_base);

        // Off-classpath statics are keyed by the name as written
        let external = encoder.encode_field(&cp, &static_field("java.lang.System", "out")).unwrap();
        assert_ne!(external, via_base);
    }

    #[test]
    fn test_signatures_ignore_declaring_class() {
        let mut encoder = IdentifierEncoder::new();
        let first = encoder.encode_signature("area", "()I");
        let other = encoder.encode_signature("area", "(I)I");
        assert_ne!(first, other);
        assert_eq!(encoder.encode_signature("area", "()I"), first);
    }

    #[test]
    fn test_method_entry_and_class_listing() {
        let main = class("Main", None, Vec::new());
        let helper = class("Helper", None, Vec::new());
        let mut encoder = IdentifierEncoder::new();

        let entry = encoder.encode_method_entry(&helper, &helper.methods[0]).unwrap();
        let key = entry.unpack();
        assert_eq!(key.class_id, 0);
        assert_eq!(key.method_id, 2);
        assert_eq!(key.inst_id, 0);

        encoder.encode_method_entry(&main, &main.methods[2]).unwrap();
        assert_eq!(
            encoder.encoded_classes(),
            vec![(TypeName::new("Helper"), 0), (TypeName::new("Main"), 1)]
        );
    }

    #[test]
    fn test_static_access_resolves_through_subclass() {
        let cp = InMemoryClasspath::new(vec![
            class("Base", None, vec![FieldInfo::new("counter", "int", true)]),
            class("Derived", Some("Base"), Vec::new()),
        ]);
        let mut encoder = IdentifierEncoder::new();
        let via_subclass = RawFieldRef {
            instance: None,
            declaring_class: TypeName::new("Derived"),
            field_name: "counter".to_string(),
            type_name: TypeName::int(),
        };
        let id = encoder
            .encode_static_field_access(&cp, &via_subclass, StaticAccessKind::Set)
            .unwrap();
        let access = encoder.decode_static_access(id).unwrap();
        assert_eq!(access.class_name.as_str(), "Base");
        assert_eq!(access.field.name, "counter");
        assert_eq!(access.kind, StaticAccessKind::Set);
    }
}
