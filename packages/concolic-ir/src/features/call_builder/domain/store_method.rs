//! Store API surface as seen from instrumented code
//!
//! Each operation is addressed by name and signature on a class that the
//! instrumenting process never links against.

use std::fmt;

use crate::shared::models::{MethodRef, TypeName};

/// Declaring class of every store call
pub const STORE_CLASS: &str = "org.concolic.runtime.ShadowTraceStore";

/// JVM type of a flag value
pub const FLAG_TYPE: &str = TypeName::BYTE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreMethod {
    PushFrame,
    PopFrame,
    StageCall,
    SetStagedArgFlag,
    SetStagedThisFlag,
    BindIncomingArg,
    BindIncomingThis,
    GetLocalFlag,
    SetLocalFlag,
    GetArgFlag,
    SetArgFlag,
    GetThisFlag,
    SetThisFlag,
    GetHeapFlag,
    SetHeapFlag,
    GetStaticFlag,
    SetStaticFlag,
    RecordInstruction,
    RecordConcreteArgument,
    RecordStaticAccess,
    SetReturnFlag,
    TakeReturnFlag,
}

impl StoreMethod {
    pub const ALL: [StoreMethod; 22] = [
        StoreMethod::PushFrame,
        StoreMethod::PopFrame,
        StoreMethod::StageCall,
        StoreMethod::SetStagedArgFlag,
        StoreMethod::SetStagedThisFlag,
        StoreMethod::BindIncomingArg,
        StoreMethod::BindIncomingThis,
        StoreMethod::GetLocalFlag,
        StoreMethod::SetLocalFlag,
        StoreMethod::GetArgFlag,
        StoreMethod::SetArgFlag,
        StoreMethod::GetThisFlag,
        StoreMethod::SetThisFlag,
        StoreMethod::GetHeapFlag,
        StoreMethod::SetHeapFlag,
        StoreMethod::GetStaticFlag,
        StoreMethod::SetStaticFlag,
        StoreMethod::RecordInstruction,
        StoreMethod::RecordConcreteArgument,
        StoreMethod::RecordStaticAccess,
        StoreMethod::SetReturnFlag,
        StoreMethod::TakeReturnFlag,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StoreMethod::PushFrame => "pushFrame",
            StoreMethod::PopFrame => "popFrame",
            StoreMethod::StageCall => "stageCall",
            StoreMethod::SetStagedArgFlag => "setStagedArgFlag",
            StoreMethod::SetStagedThisFlag => "setStagedThisFlag",
            StoreMethod::BindIncomingArg => "bindIncomingArg",
            StoreMethod::BindIncomingThis => "bindIncomingThis",
            StoreMethod::GetLocalFlag => "getLocalFlag",
            StoreMethod::SetLocalFlag => "setLocalFlag",
            StoreMethod::GetArgFlag => "getArgFlag",
            StoreMethod::SetArgFlag => "setArgFlag",
            StoreMethod::GetThisFlag => "getThisFlag",
            StoreMethod::SetThisFlag => "setThisFlag",
            StoreMethod::GetHeapFlag => "getHeapFlag",
            StoreMethod::SetHeapFlag => "setHeapFlag",
            StoreMethod::GetStaticFlag => "getStaticFlag",
            StoreMethod::SetStaticFlag => "setStaticFlag",
            StoreMethod::RecordInstruction => "recordInstruction",
            StoreMethod::RecordConcreteArgument => "recordConcreteArgument",
            StoreMethod::RecordStaticAccess => "recordStaticAccess",
            StoreMethod::SetReturnFlag => "setReturnFlag",
            StoreMethod::TakeReturnFlag => "takeReturnFlag",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|method| method.name() == name)
    }

    pub fn argument_types(&self) -> Vec<TypeName> {
        let types: &[&str] = match self {
            StoreMethod::PushFrame => &[TypeName::INT, TypeName::INT, TypeName::INT],
            StoreMethod::PopFrame
            | StoreMethod::BindIncomingThis
            | StoreMethod::GetThisFlag
            | StoreMethod::TakeReturnFlag => &[],
            StoreMethod::BindIncomingArg
            | StoreMethod::GetLocalFlag
            | StoreMethod::GetArgFlag
            | StoreMethod::GetStaticFlag => &[TypeName::INT],
            StoreMethod::StageCall => &[TypeName::INT, TypeName::INT],
            StoreMethod::SetStagedArgFlag
            | StoreMethod::SetLocalFlag
            | StoreMethod::SetArgFlag
            | StoreMethod::SetStaticFlag => &[TypeName::INT, FLAG_TYPE],
            StoreMethod::SetStagedThisFlag
            | StoreMethod::SetThisFlag
            | StoreMethod::SetReturnFlag => &[FLAG_TYPE],
            StoreMethod::GetHeapFlag => &[TypeName::OBJECT, TypeName::INT],
            StoreMethod::SetHeapFlag => &[TypeName::OBJECT, TypeName::INT, FLAG_TYPE],
            StoreMethod::RecordInstruction | StoreMethod::RecordStaticAccess => &[TypeName::LONG],
            StoreMethod::RecordConcreteArgument => &[TypeName::INT, TypeName::OBJECT],
        };
        types.iter().map(|t| TypeName::new(*t)).collect()
    }

    pub fn return_type(&self) -> TypeName {
        match self {
            StoreMethod::GetLocalFlag
            | StoreMethod::GetArgFlag
            | StoreMethod::GetThisFlag
            | StoreMethod::GetHeapFlag
            | StoreMethod::GetStaticFlag
            | StoreMethod::TakeReturnFlag => TypeName::new(FLAG_TYPE),
            _ => TypeName::void(),
        }
    }

    /// Structural reference resolved by the assembler at class-rewrite time
    pub fn method_ref(&self) -> MethodRef {
        MethodRef {
            declaring_class: TypeName::new(STORE_CLASS),
            name: self.name().to_string(),
            argument_types: self.argument_types(),
            return_type: self.return_type(),
        }
    }

    pub fn is_store_call(method: &MethodRef) -> bool {
        method.declaring_class.as_str() == STORE_CLASS
    }
}

impl fmt::Display for StoreMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", STORE_CLASS, self.name())
    }
}
