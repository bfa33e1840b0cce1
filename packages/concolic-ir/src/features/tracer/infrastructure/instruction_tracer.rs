//! Coverage tracer: executed instructions plus decoded static field accesses

use tracing::debug;

use crate::config::StoreConfig;
use crate::features::encoding::{EncodingResult, InstructionId, SharedEncoder};
use crate::features::shadow_store::ShadowTraceStore;
use crate::features::tracer::domain::TraceWithStatics;
use crate::features::tracer::ports::Tracer;

pub struct InstructionTracer {
    store: ShadowTraceStore,
    encoder: SharedEncoder,
}

impl InstructionTracer {
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

    pub fn store_mut(&mut self) -> &mut ShadowTraceStore {
        &mut self.store
    }
}

impl Tracer for InstructionTracer {
    type Trace = TraceWithStatics;

    fn get_trace(&self) -> EncodingResult<TraceWithStatics> {
        let encoder = self.encoder.read();
        let trace = self
            .store
            .trace()
            .iter()
            .map(|record| encoder.decode_instruction(record.id).cloned())
            .collect::<EncodingResult<Vec<_>>>()?;
        let statics = self
            .store
            .static_accesses()
            .iter()
            .map(|id| encoder.decode_static_access(*id).cloned())
            .collect::<EncodingResult<Vec<_>>>()?;

        debug!(
            session = %self.store.session_id(),
            instructions = trace.len(),
            statics = statics.len(),
            "Decoded coverage trace"
        );
        Ok(TraceWithStatics { trace, statics })
    }

    fn covered_instruction_ids(&self) -> Vec<InstructionId> {
        self.store.covered_instruction_ids()
    }

    fn reset(&mut self) {
        self.store.reset();
    }
}
