//! Store growth is invisible to the trace
//!
//! Tiny initial capacities force every buffer to grow mid-run; the decoded
//! trace must match a run with roomy buffers record for record.

mod common;

use common::*;
use concolic_ir::config::StoreConfig;
use concolic_ir::features::interpreter::{ConcolicSession, EntryCall};
use concolic_ir::features::tracer::ConcolicTracer;
use concolic_ir::ConcreteValue::Int;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn tracer(session: &ConcolicSession, capacity: usize) -> ConcolicTracer {
    let config = StoreConfig::default()
        .trace_capacity(capacity)
        .frame_capacity(capacity)
        .static_capacity(capacity)
        .argument_capacity(capacity);
    ConcolicTracer::new(session.encoder().clone(), config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_recursion_depth_independent_of_frame_capacity(
        capacity in 1usize..4,
        n in 1i32..12,
    ) {
        let session = concolic_session();
        let mut small = tracer(&session, capacity);
        let mut roomy = tracer(&session, 1024);
        let entry = EntryCall::new("Main", "fact").symbolic_arg(Int(n));

        let grown = session.run_concolic(&mut small, &entry).unwrap();
        let reference = session.run_concolic(&mut roomy, &entry).unwrap();

        prop_assert_eq!(&grown.outcome, &reference.outcome);
        prop_assert_eq!(&grown.trace, &reference.trace);
        prop_assert_eq!(grown.frame_depth, 0);
        prop_assert!(small.store().frame_capacity() >= n as usize);
    }

    #[test]
    fn prop_long_traces_independent_of_trace_capacity(
        capacity in 1usize..8,
        n in 0i32..40,
    ) {
        let session = concolic_session();
        let mut small = tracer(&session, capacity);
        let mut roomy = tracer(&session, 4096);
        let entry = EntryCall::new("Main", "sum").symbolic_arg(Int(n));

        let grown = session.run_concolic(&mut small, &entry).unwrap();
        let reference = session.run_concolic(&mut roomy, &entry).unwrap();

        prop_assert_eq!(grown.trace.len(), 4 * n as usize + 4);
        prop_assert_eq!(&grown.trace, &reference.trace);
    }
}

#[test]
fn test_growth_keeps_live_frames() {
    let session = concolic_session();
    let mut small = tracer(&session, 1);
    let entry = EntryCall::new("Main", "twice").symbolic_arg(Int(5));
    let run = session.run_concolic(&mut small, &entry).unwrap();

    // The staged flags written into the grown slot still reach add()
    assert_snapshot(snapshot_at(&run.trace, "add", 0, 0), &[(0, Int(5)), (1, Int(5))]);
    assert_snapshot(snapshot_at(&run.trace, "twice", 1, 0), &[(0, Int(10))]);
    assert_eq!(run.frame_depth, 0);
}
