//! Raw instruction IR
//!
//! Three-address instruction lists in the shape the classpath provider hands
//! out for each method body:
//! - values are either simple (receiver, argument, local, constant) or
//!   complex (field reference, array element); complex values nest
//! - expressions combine values; calls carry a structural method reference
//! - control transfer is by label name, never by position, so inserting
//!   instructions never invalidates a jump target
//! - exception regions are `Catch` markers placed first at their handler
//!   label, covering `[start_inclusive, end_exclusive)` label ranges
//!
//! All kinds are closed enums; passes match them exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Type names
// ═══════════════════════════════════════════════════════════════════════════

/// Source-level type name (`int`, `java.lang.String`, `int[]`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(pub String);

impl TypeName {
    pub const BOOLEAN: &'static str = "boolean";
    pub const BYTE: &'static str = "byte";
    pub const CHAR: &'static str = "char";
    pub const SHORT: &'static str = "short";
    pub const INT: &'static str = "int";
    pub const LONG: &'static str = "long";
    pub const FLOAT: &'static str = "float";
    pub const DOUBLE: &'static str = "double";
    pub const VOID: &'static str = "void";
    pub const OBJECT: &'static str = "java.lang.Object";
    pub const STRING: &'static str = "java.lang.String";
    pub const THROWABLE: &'static str = "java.lang.Throwable";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn int() -> Self {
        Self::new(Self::INT)
    }

    pub fn long() -> Self {
        Self::new(Self::LONG)
    }

    pub fn byte() -> Self {
        Self::new(Self::BYTE)
    }

    pub fn boolean() -> Self {
        Self::new(Self::BOOLEAN)
    }

    pub fn void() -> Self {
        Self::new(Self::VOID)
    }

    pub fn object() -> Self {
        Self::new(Self::OBJECT)
    }

    pub fn throwable() -> Self {
        Self::new(Self::THROWABLE)
    }

    pub fn is_void(&self) -> bool {
        self.0 == Self::VOID
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.0.as_str(),
            Self::BOOLEAN
                | Self::BYTE
                | Self::CHAR
                | Self::SHORT
                | Self::INT
                | Self::LONG
                | Self::FLOAT
                | Self::DOUBLE
        )
    }

    pub fn is_array(&self) -> bool {
        self.0.ends_with("[]")
    }

    /// Element type of an array type (`int[][]` → `int[]`)
    pub fn element_type(&self) -> Option<TypeName> {
        self.0
            .strip_suffix("[]")
            .map(|element| TypeName::new(element))
    }

    pub fn array_of(&self) -> TypeName {
        TypeName::new(format!("{}[]", self.0))
    }

    /// Wrapper class used to box a primitive of this type
    pub fn box_type(&self) -> Option<TypeName> {
        let boxed = match self.0.as_str() {
            Self::BOOLEAN => "java.lang.Boolean",
            Self::BYTE => "java.lang.Byte",
            Self::CHAR => "java.lang.Character",
            Self::SHORT => "java.lang.Short",
            Self::INT => "java.lang.Integer",
            Self::LONG => "java.lang.Long",
            Self::FLOAT => "java.lang.Float",
            Self::DOUBLE => "java.lang.Double",
            _ => return None,
        };
        Some(TypeName::new(boxed))
    }

    /// JVM field descriptor (`int` → `I`, `a.B[]` → `[La/B;`)
    pub fn descriptor(&self) -> String {
        if let Some(element) = self.element_type() {
            return format!("[{}", element.descriptor());
        }
        match self.0.as_str() {
            Self::BOOLEAN => "Z".to_string(),
            Self::BYTE => "B".to_string(),
            Self::CHAR => "C".to_string(),
            Self::SHORT => "S".to_string(),
            Self::INT => "I".to_string(),
            Self::LONG => "J".to_string(),
            Self::FLOAT => "F".to_string(),
            Self::DOUBLE => "D".to_string(),
            Self::VOID => "V".to_string(),
            other => format!("L{};", other.replace('.', "/")),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        TypeName::new(name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Labels
// ═══════════════════════════════════════════════════════════════════════════

/// Symbolic jump target, resolved by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Values
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawConstant {
    Bool(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Null,
}

impl RawConstant {
    pub fn type_name(&self) -> TypeName {
        TypeName::new(match self {
            RawConstant::Bool(_) => TypeName::BOOLEAN,
            RawConstant::Byte(_) => TypeName::BYTE,
            RawConstant::Char(_) => TypeName::CHAR,
            RawConstant::Short(_) => TypeName::SHORT,
            RawConstant::Int(_) => TypeName::INT,
            RawConstant::Long(_) => TypeName::LONG,
            RawConstant::Float(_) => TypeName::FLOAT,
            RawConstant::Double(_) => TypeName::DOUBLE,
            RawConstant::Str(_) => TypeName::STRING,
            RawConstant::Null => TypeName::OBJECT,
        })
    }
}

/// Field reference; `instance == None` means a static field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFieldRef {
    pub instance: Option<Box<RawValue>>,
    pub declaring_class: TypeName,
    pub field_name: String,
    pub type_name: TypeName,
}

impl RawFieldRef {
    pub fn is_static(&self) -> bool {
        self.instance.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArrayAccess {
    pub array: Box<RawValue>,
    pub index: Box<RawValue>,
    pub type_name: TypeName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawValue {
    /// Receiver pseudo-variable
    This { type_name: TypeName },
    Argument {
        index: u32,
        name: String,
        type_name: TypeName,
    },
    Local {
        index: u32,
        name: String,
        type_name: TypeName,
    },
    Constant(RawConstant),
    Field(RawFieldRef),
    ArrayAccess(RawArrayAccess),
}

impl RawValue {
    pub fn this(type_name: impl Into<TypeName>) -> Self {
        RawValue::This {
            type_name: type_name.into(),
        }
    }

    pub fn argument(index: u32, name: impl Into<String>, type_name: impl Into<TypeName>) -> Self {
        RawValue::Argument {
            index,
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn local(index: u32, name: impl Into<String>, type_name: impl Into<TypeName>) -> Self {
        RawValue::Local {
            index,
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn int(value: i32) -> Self {
        RawValue::Constant(RawConstant::Int(value))
    }

    pub fn long(value: i64) -> Self {
        RawValue::Constant(RawConstant::Long(value))
    }

    pub fn byte(value: i8) -> Self {
        RawValue::Constant(RawConstant::Byte(value))
    }

    pub fn null() -> Self {
        RawValue::Constant(RawConstant::Null)
    }

    pub fn instance_field(
        instance: RawValue,
        declaring_class: impl Into<TypeName>,
        field_name: impl Into<String>,
        type_name: impl Into<TypeName>,
    ) -> Self {
        RawValue::Field(RawFieldRef {
            instance: Some(Box::new(instance)),
            declaring_class: declaring_class.into(),
            field_name: field_name.into(),
            type_name: type_name.into(),
        })
    }

    pub fn static_field(
        declaring_class: impl Into<TypeName>,
        field_name: impl Into<String>,
        type_name: impl Into<TypeName>,
    ) -> Self {
        RawValue::Field(RawFieldRef {
            instance: None,
            declaring_class: declaring_class.into(),
            field_name: field_name.into(),
            type_name: type_name.into(),
        })
    }

    pub fn array_access(array: RawValue, index: RawValue, type_name: impl Into<TypeName>) -> Self {
        RawValue::ArrayAccess(RawArrayAccess {
            array: Box::new(array),
            index: Box::new(index),
            type_name: type_name.into(),
        })
    }

    pub fn type_name(&self) -> TypeName {
        match self {
            RawValue::This { type_name }
            | RawValue::Argument { type_name, .. }
            | RawValue::Local { type_name, .. } => type_name.clone(),
            RawValue::Constant(constant) => constant.type_name(),
            RawValue::Field(field) => field.type_name.clone(),
            RawValue::ArrayAccess(access) => access.type_name.clone(),
        }
    }

    /// Visit this value and every nested value, parents first
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a RawValue)) {
        f(self);
        match self {
            RawValue::Field(field) => {
                if let Some(instance) = &field.instance {
                    instance.walk(f);
                }
            }
            RawValue::ArrayAccess(access) => {
                access.array.walk(f);
                access.index.walk(f);
            }
            RawValue::This { .. }
            | RawValue::Argument { .. }
            | RawValue::Local { .. }
            | RawValue::Constant(_) => {}
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,
    /// Three-way compare (`lcmp`, `dcmpl`): -1, 0 or 1
    Cmp,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn is_condition(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Neq | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Ushr => ">>>",
            BinaryOp::Cmp => "cmp",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Static,
    Virtual,
    Special,
    Interface,
}

/// Structural description of a call target
///
/// Enough for the assembler to resolve and link the call; no compiled
/// reference to the target type is required.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub declaring_class: TypeName,
    pub name: String,
    pub argument_types: Vec<TypeName>,
    pub return_type: TypeName,
}

impl MethodRef {
    pub fn descriptor(&self) -> String {
        let args: String = self.argument_types.iter().map(|t| t.descriptor()).collect();
        format!("({}){}", args, self.return_type.descriptor())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCallExpr {
    pub kind: CallKind,
    pub method: MethodRef,
    pub instance: Option<RawValue>,
    pub args: Vec<RawValue>,
}

impl RawCallExpr {
    pub fn new_static(method: MethodRef, args: Vec<RawValue>) -> Self {
        Self {
            kind: CallKind::Static,
            method,
            instance: None,
            args,
        }
    }

    pub fn new_virtual(method: MethodRef, instance: RawValue, args: Vec<RawValue>) -> Self {
        Self {
            kind: CallKind::Virtual,
            method,
            instance: Some(instance),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawExpr {
    Value(RawValue),
    Binary {
        op: BinaryOp,
        lhv: RawValue,
        rhv: RawValue,
        type_name: TypeName,
    },
    Neg {
        operand: RawValue,
        type_name: TypeName,
    },
    Cast {
        operand: RawValue,
        target: TypeName,
    },
    InstanceOf {
        operand: RawValue,
        target: TypeName,
    },
    Length {
        array: RawValue,
    },
    New {
        type_name: TypeName,
    },
    NewArray {
        element_type: TypeName,
        dimensions: Vec<RawValue>,
    },
    Call(RawCallExpr),
}

impl RawExpr {
    pub fn binary(op: BinaryOp, lhv: RawValue, rhv: RawValue, type_name: impl Into<TypeName>) -> Self {
        RawExpr::Binary {
            op,
            lhv,
            rhv,
            type_name: type_name.into(),
        }
    }

    /// Direct operands in source evaluation order
    ///
    /// For calls the receiver comes first, then the arguments.
    pub fn operands(&self) -> Vec<&RawValue> {
        match self {
            RawExpr::Value(value) => vec![value],
            RawExpr::Binary { lhv, rhv, .. } => vec![lhv, rhv],
            RawExpr::Neg { operand, .. }
            | RawExpr::Cast { operand, .. }
            | RawExpr::InstanceOf { operand, .. } => vec![operand],
            RawExpr::Length { array } => vec![array],
            RawExpr::New { .. } => Vec::new(),
            RawExpr::NewArray { dimensions, .. } => dimensions.iter().collect(),
            RawExpr::Call(call) => call.instance.iter().chain(call.args.iter()).collect(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Instructions
// ═══════════════════════════════════════════════════════════════════════════

/// Branch condition of an `If`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCondition {
    pub op: BinaryOp,
    pub lhv: RawValue,
    pub rhv: RawValue,
}

/// Protected region `[start_inclusive, end_exclusive)` for one throwable type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchEntry {
    pub throwable_type: TypeName,
    pub start_inclusive: Label,
    pub end_exclusive: Label,
}

/// Catch marker; must be the first instruction after its handler label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCatch {
    pub throwable: RawValue,
    pub handler: Label,
    pub entries: Vec<CatchEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawInst {
    Assign { lhv: RawValue, rhv: RawExpr },
    Call(RawCallExpr),
    Return(Option<RawValue>),
    Throw(RawValue),
    If {
        condition: RawCondition,
        true_branch: Label,
        false_branch: Label,
    },
    Switch {
        key: RawValue,
        branches: Vec<(RawValue, Label)>,
        default: Label,
    },
    Goto(Label),
    Label(Label),
    LineNumber { line: u32, start: Label },
    Catch(RawCatch),
    EnterMonitor(RawValue),
    ExitMonitor(RawValue),
}

impl RawInst {
    pub fn assign(lhv: RawValue, rhv: RawExpr) -> Self {
        RawInst::Assign { lhv, rhv }
    }

    pub fn label(name: impl Into<String>) -> Self {
        RawInst::Label(Label::new(name))
    }

    pub fn goto(name: impl Into<String>) -> Self {
        RawInst::Goto(Label::new(name))
    }

    /// Positional markers never execute
    pub fn is_marker(&self) -> bool {
        matches!(self, RawInst::Label(_) | RawInst::LineNumber { .. })
    }

    /// Operand values read by this instruction, in evaluation order
    ///
    /// An assignment target contributes the values it reads to address the
    /// slot (field instance, array and index), not the slot itself.
    pub fn read_operands(&self) -> Vec<&RawValue> {
        match self {
            RawInst::Assign { lhv, rhv } => {
                let mut operands = Vec::new();
                match lhv {
                    RawValue::Field(field) => {
                        if let Some(instance) = &field.instance {
                            operands.push(instance.as_ref());
                        }
                    }
                    RawValue::ArrayAccess(access) => {
                        operands.push(access.array.as_ref());
                        operands.push(access.index.as_ref());
                    }
                    _ => {}
                }
                operands.extend(rhv.operands());
                operands
            }
            RawInst::Call(call) => call.instance.iter().chain(call.args.iter()).collect(),
            RawInst::Return(value) => value.iter().collect(),
            RawInst::Throw(value) | RawInst::EnterMonitor(value) | RawInst::ExitMonitor(value) => {
                vec![value]
            }
            RawInst::If { condition, .. } => vec![&condition.lhv, &condition.rhv],
            RawInst::Switch { key, .. } => vec![key],
            RawInst::Goto(_)
            | RawInst::Label(_)
            | RawInst::LineNumber { .. }
            | RawInst::Catch(_) => Vec::new(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Display
// ═══════════════════════════════════════════════════════════════════════════

impl fmt::Display for RawConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawConstant::Bool(v) => write!(f, "{}", v),
            RawConstant::Byte(v) => write!(f, "{}b", v),
            RawConstant::Char(v) => write!(f, "'\\u{:04x}'", v),
            RawConstant::Short(v) => write!(f, "{}s", v),
            RawConstant::Int(v) => write!(f, "{}", v),
            RawConstant::Long(v) => write!(f, "{}L", v),
            RawConstant::Float(v) => write!(f, "{}F", v),
            RawConstant::Double(v) => write!(f, "{}D", v),
            RawConstant::Str(v) => write!(f, "{:?}", v),
            RawConstant::Null => f.write_str("null"),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::This { .. } => f.write_str("this"),
            RawValue::Argument { name, .. } => f.write_str(name),
            RawValue::Local { name, .. } => f.write_str(name),
            RawValue::Constant(constant) => write!(f, "{}", constant),
            RawValue::Field(field) => match &field.instance {
                Some(instance) => write!(f, "{}.{}", instance, field.field_name),
                None => write!(f, "{}.{}", field.declaring_class, field.field_name),
            },
            RawValue::ArrayAccess(access) => write!(f, "{}[{}]", access.array, access.index),
        }
    }
}

impl fmt::Display for RawCallExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance {
            Some(instance) => write!(f, "{}.{}(", instance, self.method.name)?,
            None => write!(f, "{}.{}(", self.method.declaring_class, self.method.name)?,
        }
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for RawExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawExpr::Value(value) => write!(f, "{}", value),
            RawExpr::Binary { op, lhv, rhv, .. } => write!(f, "{} {} {}", lhv, op.symbol(), rhv),
            RawExpr::Neg { operand, .. } => write!(f, "-{}", operand),
            RawExpr::Cast { operand, target } => write!(f, "({}) {}", target, operand),
            RawExpr::InstanceOf { operand, target } => write!(f, "{} instanceof {}", operand, target),
            RawExpr::Length { array } => write!(f, "{}.length", array),
            RawExpr::New { type_name } => write!(f, "new {}", type_name),
            RawExpr::NewArray {
                element_type,
                dimensions,
            } => {
                write!(f, "new {}", element_type)?;
                for dimension in dimensions {
                    write!(f, "[{}]", dimension)?;
                }
                Ok(())
            }
            RawExpr::Call(call) => write!(f, "{}", call),
        }
    }
}

impl fmt::Display for RawInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawInst::Assign { lhv, rhv } => write!(f, "{} = {}", lhv, rhv),
            RawInst::Call(call) => write!(f, "{}", call),
            RawInst::Return(Some(value)) => write!(f, "return {}", value),
            RawInst::Return(None) => f.write_str("return"),
            RawInst::Throw(value) => write!(f, "throw {}", value),
            RawInst::If {
                condition,
                true_branch,
                false_branch,
            } => write!(
                f,
                "if ({} {} {}) goto {} else {}",
                condition.lhv,
                condition.op.symbol(),
                condition.rhv,
                true_branch,
                false_branch
            ),
            RawInst::Switch { key, branches, default } => {
                write!(f, "switch ({}) {{", key)?;
                for (value, label) in branches {
                    write!(f, " {} -> {};", value, label)?;
                }
                write!(f, " else -> {} }}", default)
            }
            RawInst::Goto(label) => write!(f, "goto {}", label),
            RawInst::Label(label) => write!(f, "{}:", label),
            RawInst::LineNumber { line, .. } => write!(f, "line {}", line),
            RawInst::Catch(catch) => write!(f, "catch {} @ {}", catch.throwable, catch.handler),
            RawInst::EnterMonitor(value) => write!(f, "enter monitor {}", value),
            RawInst::ExitMonitor(value) => write!(f, "exit monitor {}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_classification() {
        assert!(TypeName::int().is_primitive());
        assert!(!TypeName::object().is_primitive());
        assert!(!TypeName::new("int[]").is_primitive());
        assert_eq!(TypeName::int().box_type(), Some(TypeName::new("java.lang.Integer")));
        assert_eq!(TypeName::object().box_type(), None);
    }

    #[test]
    fn test_descriptor() {
        assert_eq!(TypeName::int().descriptor(), "I");
        assert_eq!(TypeName::new("java.lang.String[]").descriptor(), "[Ljava/lang/String;");
        let method = MethodRef {
            declaring_class: TypeName::new("Main"),
            name: "foo".to_string(),
            argument_types: vec![TypeName::int(), TypeName::long()],
            return_type: TypeName::void(),
        };
        assert_eq!(method.descriptor(), "(IJ)V");
    }

    #[test]
    fn test_read_operands_of_array_store() {
        let arr = RawValue::local(0, "%0", "int[]");
        let idx = RawValue::local(1, "%1", "int");
        let inst = RawInst::assign(
            RawValue::array_access(arr.clone(), idx.clone(), "int"),
            RawExpr::Value(RawValue::int(7)),
        );
        let operands = inst.read_operands();
        assert_eq!(operands, vec![&arr, &idx, &RawValue::int(7)]);
    }

    #[test]
    fn test_walk_visits_nested_values() {
        let value = RawValue::instance_field(
            RawValue::array_access(RawValue::local(0, "%0", "A[]"), RawValue::int(1), "A"),
            "A",
            "f",
            "int",
        );
        let mut seen = 0;
        value.walk(&mut |_| seen += 1);
        assert_eq!(seen, 4);
    }

    #[test]
    fn test_display() {
        let inst = RawInst::assign(
            RawValue::local(2, "%2", "int"),
            RawExpr::binary(
                BinaryOp::Add,
                RawValue::argument(0, "x", "int"),
                RawValue::int(1),
                "int",
            ),
        );
        assert_eq!(inst.to_string(), "%2 = x + 1");
    }
}
