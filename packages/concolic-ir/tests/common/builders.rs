//! Test data builders
//!
//! Builder patterns for classes and methods plus short constructors for the
//! IR values the sample programs use.

use concolic_ir::shared::models::{
    BinaryOp, CatchEntry, ClassInfo, FieldInfo, Label, MethodInfo, MethodRef, Parameter,
    RawCallExpr, RawCatch, RawCondition, RawExpr, RawInst, RawValue, TypeName,
};

/// Builder for MethodInfo
#[derive(Debug)]
pub struct MethodBuilder {
    method: MethodInfo,
}

impl MethodBuilder {
    pub fn new_static(name: &str) -> Self {
        Self {
            method: MethodInfo {
                name: name.to_string(),
                is_static: true,
                parameters: Vec::new(),
                return_type: TypeName::void(),
                local_count: 0,
                instructions: Some(Vec::new()),
            },
        }
    }

    pub fn new_instance(name: &str) -> Self {
        let mut builder = Self::new_static(name);
        builder.method.is_static = false;
        builder
    }

    pub fn param(mut self, name: &str, type_name: &str) -> Self {
        self.method.parameters.push(Parameter {
            name: name.to_string(),
            type_name: TypeName::new(type_name),
        });
        self
    }

    pub fn returns(mut self, type_name: &str) -> Self {
        self.method.return_type = TypeName::new(type_name);
        self
    }

    pub fn locals(mut self, count: u32) -> Self {
        self.method.local_count = count;
        self
    }

    pub fn body(mut self, instructions: Vec<RawInst>) -> Self {
        self.method.instructions = Some(instructions);
        self
    }

    /// Abstract or native: no body
    pub fn without_body(mut self) -> Self {
        self.method.instructions = None;
        self
    }

    pub fn build(self) -> MethodInfo {
        self.method
    }
}

/// Builder for ClassInfo
#[derive(Debug)]
pub struct ClassBuilder {
    class: ClassInfo,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            class: ClassInfo {
                name: TypeName::new(name),
                super_class: Some(TypeName::object()),
                is_enum: false,
                fields: Vec::new(),
                methods: Vec::new(),
            },
        }
    }

    pub fn extends(mut self, super_class: &str) -> Self {
        self.class.super_class = Some(TypeName::new(super_class));
        self
    }

    pub fn enumeration(mut self) -> Self {
        self.class.is_enum = true;
        self
    }

    pub fn field(mut self, name: &str, type_name: &str) -> Self {
        self.class.fields.push(FieldInfo::new(name, type_name, false));
        self
    }

    pub fn static_field(mut self, name: &str, type_name: &str) -> Self {
        self.class.fields.push(FieldInfo::new(name, type_name, true));
        self
    }

    pub fn method(mut self, method: MethodInfo) -> Self {
        self.class.methods.push(method);
        self
    }

    pub fn build(self) -> ClassInfo {
        self.class
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// IR shorthands
// ═══════════════════════════════════════════════════════════════════════════

pub fn arg(index: u32, type_name: &str) -> RawValue {
    RawValue::argument(index, format!("p{}", index), type_name)
}

pub fn local(index: u32, type_name: &str) -> RawValue {
    RawValue::local(index, format!("l{}", index), type_name)
}

pub fn int(value: i32) -> RawValue {
    RawValue::int(value)
}

pub fn value(v: RawValue) -> RawExpr {
    RawExpr::Value(v)
}

pub fn binary(op: BinaryOp, lhv: RawValue, rhv: RawValue, type_name: &str) -> RawExpr {
    RawExpr::binary(op, lhv, rhv, type_name)
}

pub fn if_then(op: BinaryOp, lhv: RawValue, rhv: RawValue, then: &str, otherwise: &str) -> RawInst {
    RawInst::If {
        condition: RawCondition { op, lhv, rhv },
        true_branch: Label::new(then),
        false_branch: Label::new(otherwise),
    }
}

pub fn ret(v: RawValue) -> RawInst {
    RawInst::Return(Some(v))
}

pub fn method_ref(class: &str, name: &str, params: &[&str], return_type: &str) -> MethodRef {
    MethodRef {
        declaring_class: TypeName::new(class),
        name: name.to_string(),
        argument_types: params.iter().map(|p| TypeName::new(*p)).collect(),
        return_type: TypeName::new(return_type),
    }
}

pub fn static_call(method: MethodRef, args: Vec<RawValue>) -> RawExpr {
    RawExpr::Call(RawCallExpr::new_static(method, args))
}

pub fn virtual_call(method: MethodRef, receiver: RawValue, args: Vec<RawValue>) -> RawExpr {
    RawExpr::Call(RawCallExpr::new_virtual(method, receiver, args))
}

pub fn catch(throwable: RawValue, handler: &str, exception: &str, start: &str, end: &str) -> RawInst {
    RawInst::Catch(RawCatch {
        throwable,
        handler: Label::new(handler),
        entries: vec![CatchEntry {
            throwable_type: TypeName::new(exception),
            start_inclusive: Label::new(start),
            end_exclusive: Label::new(end),
        }],
    })
}
