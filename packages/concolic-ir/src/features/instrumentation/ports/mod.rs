//! Instrumentation ports

use crate::features::instrumentation::domain::{InstrumentedClass, RewriteResult};
use crate::shared::models::{ClassInfo, MethodInfo};

/// Rewrites classes so that executing them fills a shadow trace store
pub trait Instrumenter: Send + Sync {
    /// Whether `method` of `class` gets an instrumented body
    fn is_eligible(&self, class: &ClassInfo, method: &MethodInfo) -> bool;

    fn instrument_class(&self, class: &ClassInfo) -> RewriteResult<InstrumentedClass>;

    fn instrument_all(&self, classes: &[ClassInfo]) -> RewriteResult<Vec<InstrumentedClass>> {
        classes.iter().map(|class| self.instrument_class(class)).collect()
    }
}
