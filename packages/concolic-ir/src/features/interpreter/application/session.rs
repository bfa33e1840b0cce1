/*
 * Concolic Session
 *
 * One analysis session: a classpath instrumented once under one encoder,
 * then executed any number of times. Each run resets its tracer's store,
 * stages the symbolic entry inputs, invokes the entry method on the
 * reference interpreter and decodes the trace.
 */

use std::sync::Arc;
use tracing::info;

use crate::config::{InstrumentationConfig, Validatable};
use crate::errors::Result;
use crate::features::encoding::{shared_encoder, SharedEncoder};
use crate::features::instrumentation::{ClassInstrumenter, Instrumenter, RewriteStats};
use crate::features::interpreter::domain::ExecutionOutcome;
use crate::features::interpreter::infrastructure::Interpreter;
use crate::features::shadow_store::{ConcreteValue, ShadowTraceStore};
use crate::features::tracer::{
    ConcolicTrace, ConcolicTracer, InstructionTracer, TraceWithStatics, Tracer,
};
use crate::shared::models::{Classpath, InMemoryClasspath, TypeName};

/// Entry method and its inputs
#[derive(Debug, Clone, PartialEq)]
pub struct EntryCall {
    pub class_name: TypeName,
    pub method_name: String,
    /// Class of a fresh receiver for instance methods
    pub receiver_class: Option<TypeName>,
    pub args: Vec<ConcreteValue>,
    pub symbolic_args: Vec<u32>,
    pub symbolic_receiver: bool,
}

impl EntryCall {
    pub fn new(class_name: impl Into<TypeName>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            receiver_class: None,
            args: Vec::new(),
            symbolic_args: Vec::new(),
            symbolic_receiver: false,
        }
    }

    pub fn arg(mut self, value: ConcreteValue) -> Self {
        self.args.push(value);
        self
    }

    pub fn symbolic_arg(mut self, value: ConcreteValue) -> Self {
        self.symbolic_args.push(self.args.len() as u32);
        self.args.push(value);
        self
    }

    pub fn receiver(mut self, class_name: impl Into<TypeName>, symbolic: bool) -> Self {
        self.receiver_class = Some(class_name.into());
        self.symbolic_receiver = symbolic;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcolicRun {
    pub outcome: ExecutionOutcome,
    pub trace: ConcolicTrace,
    pub steps: u64,
    /// Shadow frames still active after the run; 0 when balanced
    pub frame_depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRun {
    pub outcome: ExecutionOutcome,
    pub trace: TraceWithStatics,
    pub steps: u64,
}

pub struct ConcolicSession {
    config: InstrumentationConfig,
    encoder: SharedEncoder,
    instrumented: InMemoryClasspath,
    stats: RewriteStats,
}

impl ConcolicSession {
    /// Instrument every class of `classpath`
    pub fn new(classpath: InMemoryClasspath, config: InstrumentationConfig) -> Result<Self> {
        config.validate()?;
        let encoder = shared_encoder();
        let original = Arc::new(classpath);
        let instrumenter = ClassInstrumenter::new(
            original.clone() as Arc<dyn Classpath>,
            encoder.clone(),
            config.clone(),
        );

        let mut stats = RewriteStats::default();
        let mut classes = Vec::with_capacity(original.len());
        for instrumented in instrumenter.instrument_all(original.classes())? {
            stats.merge(&instrumented.stats);
            classes.push(instrumented.class);
        }

        info!(
            session = %encoder.read().session_id(),
            classes = classes.len(),
            preset = %config.preset,
            "Session ready"
        );

        Ok(Self {
            config,
            encoder,
            instrumented: InMemoryClasspath::new(classes),
            stats,
        })
    }

    pub fn config(&self) -> &InstrumentationConfig {
        &self.config
    }

    pub fn encoder(&self) -> &SharedEncoder {
        &self.encoder
    }

    pub fn instrumented_classpath(&self) -> &InMemoryClasspath {
        &self.instrumented
    }

    pub fn stats(&self) -> &RewriteStats {
        &self.stats
    }

    pub fn concolic_tracer(&self) -> ConcolicTracer {
        ConcolicTracer::new(self.encoder.clone(), self.config.store)
    }

    pub fn instruction_tracer(&self) -> InstructionTracer {
        InstructionTracer::new(self.encoder.clone(), self.config.store)
    }

    pub fn run_concolic(&self, tracer: &mut ConcolicTracer, entry: &EntryCall) -> Result<ConcolicRun> {
        tracer.reset();
        let (outcome, steps) = self.execute(tracer.store_mut(), entry)?;
        Ok(ConcolicRun {
            outcome,
            trace: tracer.get_trace()?,
            steps,
            frame_depth: tracer.store().depth(),
        })
    }

    pub fn run_coverage(&self, tracer: &mut InstructionTracer, entry: &EntryCall) -> Result<CoverageRun> {
        tracer.reset();
        let (outcome, steps) = self.execute(tracer.store_mut(), entry)?;
        Ok(CoverageRun {
            outcome,
            trace: tracer.get_trace()?,
            steps,
        })
    }

    fn execute(&self, store: &mut ShadowTraceStore, entry: &EntryCall) -> Result<(ExecutionOutcome, u64)> {
        for index in &entry.symbolic_args {
            store.mark_entry_argument_symbolic(*index);
        }
        if entry.symbolic_receiver {
            store.mark_entry_receiver_symbolic();
        }

        let mut interpreter = Interpreter::new(&self.instrumented, store, &self.config.interpreter);
        let receiver = entry.receiver_class.as_ref().map(|class| {
            let handle = interpreter
                .heap_mut()
                .allocate_instance(&self.instrumented, class);
            ConcreteValue::Object(handle)
        });
        let outcome = interpreter.invoke(
            &entry.class_name,
            &entry.method_name,
            receiver,
            entry.args.clone(),
        )?;
        Ok((outcome, interpreter.steps()))
    }
}
