//! Builds store calls and boxing calls as ordinary IR instructions

use crate::features::call_builder::domain::StoreMethod;
use crate::features::shadow_store::Flag;
use crate::shared::models::{MethodRef, RawCallExpr, RawConstant, RawExpr, RawInst, RawValue, TypeName};

/// Name of the boxing factory on every wrapper class
pub const BOX_METHOD_NAME: &str = "valueOf";

pub struct TraceCallBuilder;

impl TraceCallBuilder {
    /// Standalone call, result discarded
    pub fn call(method: StoreMethod, args: Vec<RawValue>) -> RawInst {
        RawInst::Call(RawCallExpr::new_static(method.method_ref(), args))
    }

    /// `target = Store.method(args)`
    pub fn call_into(target: RawValue, method: StoreMethod, args: Vec<RawValue>) -> RawInst {
        RawInst::assign(
            target,
            RawExpr::Call(RawCallExpr::new_static(method.method_ref(), args)),
        )
    }

    /// `WrapperType.valueOf(primitive)` for a primitive type
    pub fn boxing_method(primitive: &TypeName) -> Option<MethodRef> {
        let boxed = primitive.box_type()?;
        Some(MethodRef {
            declaring_class: boxed.clone(),
            name: BOX_METHOD_NAME.to_string(),
            argument_types: vec![primitive.clone()],
            return_type: boxed,
        })
    }

    /// `target = WrapperType.valueOf(value)`; `None` for reference values
    pub fn box_into(target: RawValue, value: RawValue) -> Option<RawInst> {
        let method = Self::boxing_method(&value.type_name())?;
        Some(RawInst::assign(
            target,
            RawExpr::Call(RawCallExpr::new_static(method, vec![value])),
        ))
    }

    pub fn is_boxing_call(method: &MethodRef) -> bool {
        method.name == BOX_METHOD_NAME
            && method.argument_types.len() == 1
            && method.argument_types[0].box_type().as_ref() == Some(&method.declaring_class)
    }

    pub fn int(value: u32) -> RawValue {
        RawValue::int(value as i32)
    }

    /// Packed 64-bit id, carried bit-for-bit in a long constant
    pub fn id(raw: u64) -> RawValue {
        RawValue::long(raw as i64)
    }

    pub fn flag(flag: Flag) -> RawValue {
        RawValue::Constant(RawConstant::Byte(flag as i8))
    }
}
