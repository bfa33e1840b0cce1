//! Rewriter and reference-run benchmarks
//!
//! - Straight-line methods: emission cost per original instruction
//! - Wide classes: sequential vs pooled method rewriting
//! - Instrumented loop: interpreter overhead of store calls per mode

use concolic_ir::config::InstrumentationConfig;
use concolic_ir::features::encoding::shared_encoder;
use concolic_ir::shared::models::{
    BinaryOp, ClassInfo, Classpath, InMemoryClasspath, Label, MethodInfo, Parameter,
    RawCondition, RawExpr, RawInst, RawValue, TypeName,
};
use concolic_ir::{ClassInstrumenter, ConcolicSession, ConcreteValue, EntryCall, Instrumenter};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

// ============================================================================
// Generated IR
// ============================================================================

fn int_param(name: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        type_name: TypeName::int(),
    }
}

/// `l0 = a + 0; l0 = l0 + 1; ...; return l0`
fn straight_line(name: &str, len: usize) -> MethodInfo {
    let l0 = RawValue::local(0, "l0", "int");
    let mut body = vec![RawInst::assign(
        l0.clone(),
        RawExpr::binary(BinaryOp::Add, RawValue::argument(0, "a", "int"), RawValue::int(0), "int"),
    )];
    for i in 1..len {
        body.push(RawInst::assign(
            l0.clone(),
            RawExpr::binary(BinaryOp::Add, l0.clone(), RawValue::int(i as i32), "int"),
        ));
    }
    body.push(RawInst::Return(Some(l0)));

    MethodInfo {
        name: name.to_string(),
        is_static: true,
        parameters: vec![int_param("a")],
        return_type: TypeName::int(),
        local_count: 1,
        instructions: Some(body),
    }
}

/// `sum = 0; for (i = 0; i < n; i++) sum += i; return sum`
fn counting_loop() -> MethodInfo {
    let n = RawValue::argument(0, "n", "int");
    let sum = RawValue::local(0, "sum", "int");
    let i = RawValue::local(1, "i", "int");
    let body = vec![
        RawInst::assign(sum.clone(), RawExpr::Value(RawValue::int(0))),
        RawInst::assign(i.clone(), RawExpr::Value(RawValue::int(0))),
        RawInst::label("loop"),
        RawInst::If {
            condition: RawCondition {
                op: BinaryOp::Ge,
                lhv: i.clone(),
                rhv: n,
            },
            true_branch: Label::new("done"),
            false_branch: Label::new("body"),
        },
        RawInst::label("body"),
        RawInst::assign(
            sum.clone(),
            RawExpr::binary(BinaryOp::Add, sum.clone(), i.clone(), "int"),
        ),
        RawInst::assign(
            i.clone(),
            RawExpr::binary(BinaryOp::Add, i, RawValue::int(1), "int"),
        ),
        RawInst::goto("loop"),
        RawInst::label("done"),
        RawInst::Return(Some(sum)),
    ];

    MethodInfo {
        name: "spin".to_string(),
        is_static: true,
        parameters: vec![int_param("n")],
        return_type: TypeName::int(),
        local_count: 2,
        instructions: Some(body),
    }
}

fn class(name: &str, methods: Vec<MethodInfo>) -> ClassInfo {
    ClassInfo {
        name: TypeName::new(name),
        super_class: Some(TypeName::object()),
        is_enum: false,
        fields: Vec::new(),
        methods,
    }
}

fn wide_class(methods: usize) -> ClassInfo {
    let methods = (0..methods)
        .map(|i| straight_line(&format!("m{}", i), 64))
        .collect();
    class("Wide", methods)
}

fn instrumenter(classes: Vec<ClassInfo>, config: InstrumentationConfig) -> ClassInstrumenter {
    let classpath: Arc<dyn Classpath> = Arc::new(InMemoryClasspath::new(classes));
    ClassInstrumenter::new(classpath, shared_encoder(), config)
}

// ============================================================================
// Rewriting
// ============================================================================

fn bench_straight_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite_straight_line");

    for len in [16usize, 256, 4096] {
        let target = class("Line", vec![straight_line("run", len)]);
        group.throughput(Throughput::Elements(len as u64));

        for (mode, config) in [
            ("coverage", InstrumentationConfig::coverage()),
            ("concolic", InstrumentationConfig::concolic()),
        ] {
            let instrumenter = instrumenter(vec![target.clone()], config.parallel(false));
            group.bench_with_input(BenchmarkId::new(mode, len), &target, |b, target| {
                b.iter(|| black_box(instrumenter.instrument_class(black_box(target))));
            });
        }
    }

    group.finish();
}

fn bench_wide_class(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite_wide_class");
    let target = wide_class(128);

    let sequential = instrumenter(
        vec![target.clone()],
        InstrumentationConfig::concolic().parallel(false),
    );
    group.bench_function("sequential", |b| {
        b.iter(|| black_box(sequential.instrument_class(&target)));
    });

    let pooled = instrumenter(
        vec![target.clone()],
        InstrumentationConfig::concolic().parallel(true),
    );
    group.bench_function("pooled", |b| {
        b.iter(|| black_box(pooled.instrument_class(&target)));
    });

    group.finish();
}

// ============================================================================
// Instrumented execution
// ============================================================================

fn bench_instrumented_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_instrumented_loop");
    let classpath = || InMemoryClasspath::new(vec![class("Loop", vec![counting_loop()])]);

    for n in [10, 1000] {
        let entry = EntryCall::new("Loop", "spin").symbolic_arg(ConcreteValue::Int(n));

        let Ok(coverage) = ConcolicSession::new(
            classpath(),
            InstrumentationConfig::coverage().parallel(false),
        ) else {
            continue;
        };
        let mut tracer = coverage.instruction_tracer();
        group.bench_with_input(BenchmarkId::new("coverage", n), &entry, |b, entry| {
            b.iter(|| black_box(coverage.run_coverage(&mut tracer, entry)));
        });

        let Ok(concolic) = ConcolicSession::new(
            classpath(),
            InstrumentationConfig::concolic().parallel(false),
        ) else {
            continue;
        };
        let mut tracer = concolic.concolic_tracer();
        group.bench_with_input(BenchmarkId::new("concolic", n), &entry, |b, entry| {
            b.iter(|| black_box(concolic.run_concolic(&mut tracer, entry)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_straight_line,
    bench_wide_class,
    bench_instrumented_loop
);
criterion_main!(benches);
