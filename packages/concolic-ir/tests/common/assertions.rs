//! Custom assertions for traces and runs

use concolic_ir::features::interpreter::{ConcolicRun, ExecutionOutcome};
use concolic_ir::features::tracer::{ConcolicTrace, TracedInstruction};
use concolic_ir::ConcreteValue;
use pretty_assertions::assert_eq;

/// Executed positions of the entry method only, in order
pub fn assert_trace_indices(trace: &ConcolicTrace, method: &str, expected: &[usize]) {
    let actual: Vec<usize> = trace
        .instructions
        .iter()
        .filter(|traced| traced.instruction.method_name == method)
        .map(|traced| traced.instruction.index)
        .collect();
    assert_eq!(actual, expected, "trace of {}", method);
}

/// Every pushed shadow frame was popped
pub fn assert_frames_balanced(run: &ConcolicRun) {
    assert_eq!(
        run.frame_depth, 0,
        "{} shadow frame(s) left active after {:?}",
        run.frame_depth, run.outcome
    );
}

/// No instruction recorded a concrete argument
pub fn assert_no_snapshots(trace: &ConcolicTrace) {
    let tainted: Vec<String> = trace
        .symbolic()
        .map(|traced| format!("{}#{}", traced.instruction.method_name, traced.instruction.index))
        .collect();
    assert!(tainted.is_empty(), "unexpected snapshots at {:?}", tainted);
}

/// Snapshot of the `occurrence`-th execution of `method#index`
pub fn snapshot_at<'t>(
    trace: &'t ConcolicTrace,
    method: &str,
    index: usize,
    occurrence: usize,
) -> &'t TracedInstruction {
    trace
        .instructions
        .iter()
        .filter(|traced| traced.instruction.method_name == method && traced.instruction.index == index)
        .nth(occurrence)
        .unwrap_or_else(|| panic!("{}#{} executed fewer than {} time(s)", method, index, occurrence + 1))
}

pub fn assert_snapshot(traced: &TracedInstruction, expected: &[(u32, ConcreteValue)]) {
    let actual: Vec<(u32, ConcreteValue)> = traced
        .concrete_arguments
        .iter()
        .map(|(ordinal, value)| (*ordinal, value.clone()))
        .collect();
    assert_eq!(
        actual, expected,
        "snapshot of {}#{}",
        traced.instruction.method_name, traced.instruction.index
    );
}

pub fn assert_returned(outcome: &ExecutionOutcome, expected: ConcreteValue) {
    assert_eq!(outcome.returned_value(), Some(&expected), "outcome {:?}", outcome);
}

pub fn assert_threw(outcome: &ExecutionOutcome, class_name: &str) {
    match outcome {
        ExecutionOutcome::Exception { class_name: thrown, .. } => {
            assert_eq!(thrown.as_str(), class_name)
        }
        other => panic!("expected {} to be thrown, got {:?}", class_name, other),
    }
}
