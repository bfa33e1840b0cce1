//! Shared models

pub mod classpath;
pub mod ir;

pub use classpath::{
    builtin_superclass, ClassInfo, Classpath, FieldInfo, InMemoryClasspath, MethodInfo, Parameter,
    CONSTRUCTOR_NAME, STATIC_INITIALIZER_NAME,
};
pub use ir::{
    BinaryOp, CallKind, CatchEntry, Label, MethodRef, RawArrayAccess, RawCallExpr, RawCatch,
    RawCondition, RawConstant, RawExpr, RawFieldRef, RawInst, RawValue, TypeName,
};
