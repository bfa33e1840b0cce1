//! Sample programs
//!
//! Each fixture is raw IR as an IR provider would hand it over. Instruction
//! indices noted in comments are the ones traces report.

use super::builders::*;
use concolic_ir::config::InstrumentationConfig;
use concolic_ir::features::interpreter::ConcolicSession;
use concolic_ir::shared::models::{
    BinaryOp, ClassInfo, InMemoryClasspath, RawExpr, RawInst, RawValue, TypeName,
};

pub const ARITHMETIC_EXCEPTION: &str = "java.lang.ArithmeticException";

/// `Main`: branching, calls, recursion, heap and array access, exceptions
pub fn main_class() -> ClassInfo {
    ClassBuilder::new("Main")
        .method(abs())
        .method(add())
        .method(twice())
        .method(mix())
        .method(divide())
        .method(safe_divide())
        .method(fact())
        .method(sum())
        .method(boxed())
        .method(array_slot())
        .build()
}

/// `int abs(int x)`
pub fn abs() -> concolic_ir::shared::models::MethodInfo {
    MethodBuilder::new_static("abs")
        .param("x", "int")
        .returns("int")
        .locals(1)
        .body(vec![
            /* 0 */ if_then(BinaryOp::Gt, arg(0, "int"), int(0), "pos", "neg"),
            /* 1 */ RawInst::label("neg"),
            /* 2 */ RawInst::assign(local(0, "int"), binary(BinaryOp::Sub, int(0), arg(0, "int"), "int")),
            /* 3 */ ret(local(0, "int")),
            /* 4 */ RawInst::label("pos"),
            /* 5 */ ret(arg(0, "int")),
        ])
        .build()
}

/// `int add(int a, int b)`
pub fn add() -> concolic_ir::shared::models::MethodInfo {
    MethodBuilder::new_static("add")
        .param("a", "int")
        .param("b", "int")
        .returns("int")
        .locals(1)
        .body(vec![
            /* 0 */ RawInst::assign(local(0, "int"), binary(BinaryOp::Add, arg(0, "int"), arg(1, "int"), "int")),
            /* 1 */ ret(local(0, "int")),
        ])
        .build()
}

/// `int twice(int x) { return add(x, x); }`
pub fn twice() -> concolic_ir::shared::models::MethodInfo {
    let add_ref = method_ref("Main", "add", &["int", "int"], "int");
    MethodBuilder::new_static("twice")
        .param("x", "int")
        .returns("int")
        .locals(1)
        .body(vec![
            /* 0 */ RawInst::assign(local(0, "int"), static_call(add_ref, vec![arg(0, "int"), arg(0, "int")])),
            /* 1 */ ret(local(0, "int")),
        ])
        .build()
}

/// `int mix(int x, int y) { int t = y + 1; return t; }`; `x` never flows
pub fn mix() -> concolic_ir::shared::models::MethodInfo {
    MethodBuilder::new_static("mix")
        .param("x", "int")
        .param("y", "int")
        .returns("int")
        .locals(1)
        .body(vec![
            /* 0 */ RawInst::assign(local(0, "int"), binary(BinaryOp::Add, arg(1, "int"), int(1), "int")),
            /* 1 */ ret(local(0, "int")),
        ])
        .build()
}

/// `int divide(int x, int y) { return x / y; }`
pub fn divide() -> concolic_ir::shared::models::MethodInfo {
    MethodBuilder::new_static("divide")
        .param("x", "int")
        .param("y", "int")
        .returns("int")
        .locals(1)
        .body(vec![
            /* 0 */ RawInst::assign(local(0, "int"), binary(BinaryOp::Div, arg(0, "int"), arg(1, "int"), "int")),
            /* 1 */ ret(local(0, "int")),
        ])
        .build()
}

/// `int safeDivide(int x, int y) { try { return divide(x, y); } catch (ArithmeticException e) { return -1; } }`
pub fn safe_divide() -> concolic_ir::shared::models::MethodInfo {
    let divide_ref = method_ref("Main", "divide", &["int", "int"], "int");
    MethodBuilder::new_static("safeDivide")
        .param("x", "int")
        .param("y", "int")
        .returns("int")
        .locals(2)
        .body(vec![
            /* 0 */ RawInst::label("try"),
            /* 1 */ RawInst::assign(local(0, "int"), static_call(divide_ref, vec![arg(0, "int"), arg(1, "int")])),
            /* 2 */ RawInst::label("tryEnd"),
            /* 3 */ ret(local(0, "int")),
            /* 4 */ RawInst::label("handler"),
            /* 5 */ catch(local(1, ARITHMETIC_EXCEPTION), "handler", ARITHMETIC_EXCEPTION, "try", "tryEnd"),
            /* 6 */ ret(int(-1)),
        ])
        .build()
}

/// `int fact(int n)`, recursive
pub fn fact() -> concolic_ir::shared::models::MethodInfo {
    let fact_ref = method_ref("Main", "fact", &["int"], "int");
    MethodBuilder::new_static("fact")
        .param("n", "int")
        .returns("int")
        .locals(3)
        .body(vec![
            /* 0 */ if_then(BinaryOp::Le, arg(0, "int"), int(1), "base", "rec"),
            /* 1 */ RawInst::label("rec"),
            /* 2 */ RawInst::assign(local(0, "int"), binary(BinaryOp::Sub, arg(0, "int"), int(1), "int")),
            /* 3 */ RawInst::assign(local(1, "int"), static_call(fact_ref, vec![local(0, "int")])),
            /* 4 */ RawInst::assign(local(2, "int"), binary(BinaryOp::Mul, arg(0, "int"), local(1, "int"), "int")),
            /* 5 */ ret(local(2, "int")),
            /* 6 */ RawInst::label("base"),
            /* 7 */ ret(int(1)),
        ])
        .build()
}

/// `int sum(int n)`: loop summing `0..n`
pub fn sum() -> concolic_ir::shared::models::MethodInfo {
    MethodBuilder::new_static("sum")
        .param("n", "int")
        .returns("int")
        .locals(2)
        .body(vec![
            /* 0 */ RawInst::assign(local(0, "int"), value(int(0))),
            /* 1 */ RawInst::assign(local(1, "int"), value(int(0))),
            /* 2 */ RawInst::label("loop"),
            /* 3 */ if_then(BinaryOp::Ge, local(1, "int"), arg(0, "int"), "done", "body"),
            /* 4 */ RawInst::label("body"),
            /* 5 */ RawInst::assign(local(0, "int"), binary(BinaryOp::Add, local(0, "int"), local(1, "int"), "int")),
            /* 6 */ RawInst::assign(local(1, "int"), binary(BinaryOp::Add, local(1, "int"), int(1), "int")),
            /* 7 */ RawInst::goto("loop"),
            /* 8 */ RawInst::label("done"),
            /* 9 */ ret(local(0, "int")),
        ])
        .build()
}

/// `int boxed(int x) { Box b = new Box(); b.value = x; return b.value; }`
pub fn boxed() -> concolic_ir::shared::models::MethodInfo {
    let b = local(0, "Box");
    let field = RawValue::instance_field(b.clone(), "Box", "value", "int");
    MethodBuilder::new_static("boxed")
        .param("x", "int")
        .returns("int")
        .locals(2)
        .body(vec![
            /* 0 */ RawInst::assign(b.clone(), RawExpr::New { type_name: TypeName::new("Box") }),
            /* 1 */ RawInst::assign(field.clone(), value(arg(0, "int"))),
            /* 2 */ RawInst::assign(local(1, "int"), value(field)),
            /* 3 */ ret(local(1, "int")),
        ])
        .build()
}

/// `int arraySlot(int x) { int[] a = new int[2]; a[1] = x; return a[0]; }`
pub fn array_slot() -> concolic_ir::shared::models::MethodInfo {
    let a = local(0, "int[]");
    MethodBuilder::new_static("arraySlot")
        .param("x", "int")
        .returns("int")
        .locals(2)
        .body(vec![
            /* 0 */ RawInst::assign(
                a.clone(),
                RawExpr::NewArray {
                    element_type: TypeName::int(),
                    dimensions: vec![int(2)],
                },
            ),
            /* 1 */ RawInst::assign(RawValue::array_access(a.clone(), int(1), "int"), value(arg(0, "int"))),
            /* 2 */ RawInst::assign(local(1, "int"), value(RawValue::array_access(a, int(0), "int"))),
            /* 3 */ ret(local(1, "int")),
        ])
        .build()
}

/// `Box { int value; }` with a trivial constructor
pub fn box_class() -> ClassInfo {
    ClassBuilder::new("Box")
        .field("value", "int")
        .method(
            MethodBuilder::new_instance("<init>")
                .body(vec![RawInst::Return(None)])
                .build(),
        )
        .build()
}

/// `Counter { static int hits; static int bump() { hits = hits + 1; return hits; } }`
pub fn counter_class() -> ClassInfo {
    let hits = RawValue::static_field("Counter", "hits", "int");
    ClassBuilder::new("Counter")
        .static_field("hits", "int")
        .method(
            MethodBuilder::new_static("<clinit>")
                .body(vec![
                    RawInst::assign(hits.clone(), value(int(10))),
                    RawInst::Return(None),
                ])
                .build(),
        )
        .method(
            MethodBuilder::new_static("bump")
                .returns("int")
                .locals(1)
                .body(vec![
                    /* 0 */ RawInst::assign(hits.clone(), binary(BinaryOp::Add, hits.clone(), int(1), "int")),
                    /* 1 */ RawInst::assign(local(0, "int"), value(hits)),
                    /* 2 */ ret(local(0, "int")),
                ])
                .build(),
        )
        .build()
}

/// `SubCounter extends Counter`; reads `hits` through the subclass
pub fn sub_counter_class() -> ClassInfo {
    ClassBuilder::new("SubCounter")
        .extends("Counter")
        .method(
            MethodBuilder::new_static("peek")
                .returns("int")
                .locals(1)
                .body(vec![
                    RawInst::assign(local(0, "int"), value(RawValue::static_field("SubCounter", "hits", "int"))),
                    ret(local(0, "int")),
                ])
                .build(),
        )
        .build()
}

/// `enum Color { values(), valueOf(String), ordinalOf(int) }`
pub fn color_enum() -> ClassInfo {
    ClassBuilder::new("Color")
        .extends("java.lang.Enum")
        .enumeration()
        .method(
            MethodBuilder::new_static("values")
                .returns("Color[]")
                .body(vec![RawInst::Return(Some(RawValue::null()))])
                .build(),
        )
        .method(
            MethodBuilder::new_static("valueOf")
                .param("name", "java.lang.String")
                .returns("Color")
                .body(vec![RawInst::Return(Some(RawValue::null()))])
                .build(),
        )
        .method(
            MethodBuilder::new_static("ordinalOf")
                .param("x", "int")
                .returns("int")
                .body(vec![ret(arg(0, "int"))])
                .build(),
        )
        .build()
}

pub fn sample_classpath() -> InMemoryClasspath {
    InMemoryClasspath::new(vec![
        main_class(),
        box_class(),
        counter_class(),
        sub_counter_class(),
    ])
}

/// Sequential rewriting keeps class ids deterministic across sessions
pub fn concolic_session() -> ConcolicSession {
    session(InstrumentationConfig::concolic().parallel(false))
}

pub fn coverage_session() -> ConcolicSession {
    session(InstrumentationConfig::coverage().parallel(false))
}

pub fn session(config: InstrumentationConfig) -> ConcolicSession {
    match ConcolicSession::new(sample_classpath(), config) {
        Ok(session) => session,
        Err(e) => panic!("sample classpath failed to instrument: {}", e),
    }
}
