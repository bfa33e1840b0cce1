// Bytecode instrumentation engine
//
// Hexagonal Architecture:
// - domain: RewriteOptions, RewriteStats, InstrumentedMethod/Class, RewriteError
// - ports: Instrumenter trait
// - infrastructure: MethodRewriter (single-pass rewriter), static access
//   detection, label handling
// - application: ClassInstrumenter (method selection, clinit copy, rayon)

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::ClassInstrumenter;
pub use domain::{
    InstrumentedClass, InstrumentedMethod, RewriteError, RewriteOptions, RewriteResult,
    RewriteStats, ENUM_SYNTHETIC_METHODS, GENERATED_CLINIT_NAME,
};
pub use infrastructure::{MethodRewriter, StaticAccessCollector};
pub use ports::Instrumenter;
