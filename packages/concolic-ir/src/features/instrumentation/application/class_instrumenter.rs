//! Class-level instrumentation
//!
//! Picks the eligible methods of a class, rewrites them (in parallel on a
//! dedicated rayon pool when configured) and prepends the re-invocable
//! static initializer copy.

use rayon::prelude::*;
use std::sync::Arc;
use tracing::{info, trace, warn};

use crate::config::InstrumentationConfig;
use crate::features::encoding::SharedEncoder;
use crate::features::instrumentation::domain::{
    InstrumentedClass, InstrumentedMethod, RewriteOptions, RewriteResult, RewriteStats,
    ENUM_SYNTHETIC_METHODS, GENERATED_CLINIT_NAME,
};
use crate::features::instrumentation::infrastructure::MethodRewriter;
use crate::features::instrumentation::ports::Instrumenter;
use crate::shared::models::{ClassInfo, Classpath, MethodInfo, TypeName};

pub struct ClassInstrumenter {
    classpath: Arc<dyn Classpath>,
    encoder: SharedEncoder,
    config: InstrumentationConfig,
    pool: Option<rayon::ThreadPool>,
}

impl ClassInstrumenter {
    pub fn new(
        classpath: Arc<dyn Classpath>,
        encoder: SharedEncoder,
        config: InstrumentationConfig,
    ) -> Self {
        let pool = if config.parallel {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(config.effective_workers())
                .thread_name(|i| format!("concolic-rewrite-{}", i))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!(error = %e, "Rewrite pool unavailable, rewriting sequentially");
                    None
                }
            }
        } else {
            None
        };

        Self {
            classpath,
            encoder,
            config,
            pool,
        }
    }

    pub fn encoder(&self) -> &SharedEncoder {
        &self.encoder
    }

    pub fn config(&self) -> &InstrumentationConfig {
        &self.config
    }

    pub fn options(&self) -> RewriteOptions {
        RewriteOptions {
            concolic: self.config.is_concolic(),
            track_static_access: self.config.track_static_access,
        }
    }

    pub fn instrument_method(
        &self,
        class: &ClassInfo,
        method: &MethodInfo,
    ) -> RewriteResult<InstrumentedMethod> {
        MethodRewriter::new(self.classpath.as_ref(), &self.encoder, self.options())
            .rewrite(class, method)
    }

    fn rewrite_all(
        &self,
        class: &ClassInfo,
        targets: &[usize],
    ) -> RewriteResult<Vec<(usize, InstrumentedMethod)>> {
        let rewrite = |&index: &usize| {
            self.instrument_method(class, &class.methods[index])
                .map(|rewritten| (index, rewritten))
        };
        match &self.pool {
            Some(pool) if targets.len() > 1 => {
                pool.install(|| targets.par_iter().map(rewrite).collect())
            }
            _ => targets.iter().map(rewrite).collect(),
        }
    }
}

/// Static, argument-less copy of `<clinit>` under the generated name
fn static_initializer_copy(clinit: &MethodInfo) -> MethodInfo {
    MethodInfo {
        name: GENERATED_CLINIT_NAME.to_string(),
        is_static: true,
        parameters: Vec::new(),
        return_type: TypeName::void(),
        local_count: clinit.local_count,
        instructions: clinit.instructions.clone(),
    }
}

impl Instrumenter for ClassInstrumenter {
    fn is_eligible(&self, class: &ClassInfo, method: &MethodInfo) -> bool {
        if method.instructions.is_none() {
            return false;
        }
        if method.is_constructor() && !self.config.instrument_constructors {
            return false;
        }
        if method.is_class_initializer() && !self.config.instrument_static_initializers {
            return false;
        }
        if class.is_enum && ENUM_SYNTHETIC_METHODS.contains(&method.name.as_str()) {
            return false;
        }
        true
    }

    fn instrument_class(&self, class: &ClassInfo) -> RewriteResult<InstrumentedClass> {
        let targets: Vec<usize> = class
            .methods
            .iter()
            .enumerate()
            .filter(|(_, method)| {
                let eligible = self.is_eligible(class, method);
                if !eligible {
                    trace!(class = %class.name, method = %method.description(), "Skipping method");
                }
                eligible
            })
            .map(|(index, _)| index)
            .collect();

        let rewritten = self.rewrite_all(class, &targets)?;

        let mut instrumented = class.clone();
        let mut stats = RewriteStats::default();
        let mut instrumented_methods = Vec::with_capacity(rewritten.len());
        for (index, method) in rewritten {
            stats.merge(&method.stats);
            instrumented_methods.push(method.method.description());
            instrumented.methods[index] = method.method;
        }

        if self.config.preserve_static_initializer {
            let clinit = class
                .methods
                .iter()
                .find(|m| m.is_class_initializer() && m.instructions.is_some());
            if let Some(clinit) = clinit {
                instrumented.methods.insert(0, static_initializer_copy(clinit));
            }
        }

        info!(
            class = %class.name,
            methods = instrumented_methods.len(),
            traced = stats.traced_instructions,
            expansion = stats.expansion_ratio(),
            "Instrumented class"
        );

        Ok(InstrumentedClass {
            class: instrumented,
            instrumented_methods,
            stats,
        })
    }
}
