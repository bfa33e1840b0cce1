/*
 * Concolic Tracer
 *
 * Owns the shadow trace store of one analysis session and decodes its
 * records through the session's encoder. Each record keeps only the
 * concrete arguments written before the next record started.
 */

use std::collections::BTreeMap;
use tracing::debug;

use crate::config::StoreConfig;
use crate::features::encoding::{EncodingResult, InstructionId, SharedEncoder};
use crate::features::shadow_store::ShadowTraceStore;
use crate::features::tracer::domain::{ConcolicTrace, TracedInstruction};
use crate::features::tracer::ports::Tracer;

pub struct ConcolicTracer {
    store: ShadowTraceStore,
    encoder: SharedEncoder,
}

impl ConcolicTracer {
    pub fn new(encoder: SharedEncoder, config: StoreConfig) -> Self {
        let session = encoder.read().session_id();
        Self {
            store: ShadowTraceStore::with_session(config, session),
            encoder,
        }
    }

    pub fn store(&self) -> &ShadowTraceStore {
        &self.store
    }

    /// The store instrumented code writes into while it runs
    pub fn store_mut(&mut self) -> &mut ShadowTraceStore {
        &mut self.store
    }

    pub fn encoder(&self) -> &SharedEncoder {
        &self.encoder
    }
}

impl Tracer for ConcolicTracer {
    type Trace = ConcolicTrace;

    fn get_trace(&self) -> EncodingResult<ConcolicTrace> {
        let encoder = self.encoder.read();
        let instructions = self
            .store
            .trace()
            .iter()
            .map(|record| {
                let instruction = encoder.decode_instruction(record.id)?.clone();
                let concrete_arguments: BTreeMap<_, _> =
                    record.concrete_args.iter().cloned().collect();
                Ok(TracedInstruction {
                    instruction,
                    concrete_arguments,
                })
            })
            .collect::<EncodingResult<Vec<_>>>()?;

        debug!(
            session = %self.store.session_id(),
            instructions = instructions.len(),
            "Decoded concolic trace"
        );
        Ok(ConcolicTrace { instructions })
    }

    fn covered_instruction_ids(&self) -> Vec<InstructionId> {
        self.store.covered_instruction_ids()
    }

    fn reset(&mut self) {
        self.store.reset();
    }
}
