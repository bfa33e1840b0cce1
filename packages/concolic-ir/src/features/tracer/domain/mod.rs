//! Decoded traces handed to the symbolic engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::features::encoding::{EncodedInstruction, StaticFieldAccess};
use crate::features::shadow_store::ConcreteValue;

/// One executed instruction with the concrete values of its symbolic operands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracedInstruction {
    pub instruction: EncodedInstruction,
    /// Operand ordinal to the value it held when the instruction ran
    pub concrete_arguments: BTreeMap<u32, ConcreteValue>,
}

impl TracedInstruction {
    pub fn has_symbolic_operands(&self) -> bool {
        !self.concrete_arguments.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcolicTrace {
    pub instructions: Vec<TracedInstruction>,
}

impl ConcolicTrace {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Original positions of the executed instructions, in execution order
    pub fn indices(&self) -> Vec<usize> {
        self.instructions
            .iter()
            .map(|traced| traced.instruction.index)
            .collect()
    }

    /// Instructions that saw at least one symbolic operand
    pub fn symbolic(&self) -> impl Iterator<Item = &TracedInstruction> {
        self.instructions
            .iter()
            .filter(|traced| traced.has_symbolic_operands())
    }
}

/// Coverage trace plus the static fields read and written along it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceWithStatics {
    pub trace: Vec<EncodedInstruction>,
    pub statics: Vec<StaticFieldAccess>,
}

impl TraceWithStatics {
    pub fn indices(&self) -> Vec<usize> {
        self.trace.iter().map(|inst| inst.index).collect()
    }
}
