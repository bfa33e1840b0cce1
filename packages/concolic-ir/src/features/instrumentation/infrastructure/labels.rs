//! Label checks and fresh label allocation

use rustc_hash::FxHashSet;

use crate::features::instrumentation::domain::{RewriteError, RewriteResult};
use crate::shared::models::{Label, RawInst};

/// Check that every referenced label is defined and every catch marker
/// sits directly after its handler label
///
/// Returns the defined label names.
pub fn validate_labels(method: &str, body: &[RawInst]) -> RewriteResult<FxHashSet<String>> {
    let defined: FxHashSet<String> = body
        .iter()
        .filter_map(|inst| match inst {
            RawInst::Label(label) => Some(label.0.clone()),
            _ => None,
        })
        .collect();

    let check = |label: &Label| -> RewriteResult<()> {
        if defined.contains(label.name()) {
            Ok(())
        } else {
            Err(RewriteError::UndefinedLabel {
                method: method.to_string(),
                label: label.0.clone(),
            })
        }
    };

    for (index, inst) in body.iter().enumerate() {
        match inst {
            RawInst::Goto(target) => check(target)?,
            RawInst::If {
                true_branch,
                false_branch,
                ..
            } => {
                check(true_branch)?;
                check(false_branch)?;
            }
            RawInst::Switch {
                branches, default, ..
            } => {
                for (_, target) in branches {
                    check(target)?;
                }
                check(default)?;
            }
            RawInst::LineNumber { start, .. } => check(start)?,
            RawInst::Catch(catch) => {
                let follows_handler = index > 0
                    && matches!(&body[index - 1], RawInst::Label(label) if *label == catch.handler);
                if !follows_handler {
                    return Err(RewriteError::MisplacedCatch {
                        method: method.to_string(),
                        handler: catch.handler.0.clone(),
                    });
                }
                for entry in &catch.entries {
                    check(&entry.start_inclusive)?;
                    check(&entry.end_exclusive)?;
                }
            }
            RawInst::Assign { .. }
            | RawInst::Call(_)
            | RawInst::Return(_)
            | RawInst::Throw(_)
            | RawInst::Label(_)
            | RawInst::EnterMonitor(_)
            | RawInst::ExitMonitor(_) => {}
        }
    }

    Ok(defined)
}

/// Hands out label names that collide with nothing in the method
#[derive(Debug)]
pub struct LabelAllocator {
    taken: FxHashSet<String>,
    counter: u32,
}

impl LabelAllocator {
    pub fn new(taken: FxHashSet<String>) -> Self {
        Self { taken, counter: 0 }
    }

    pub fn fresh(&mut self, hint: &str) -> Label {
        loop {
            let name = format!("#{}{}", hint, self.counter);
            self.counter += 1;
            if self.taken.insert(name.clone()) {
                return Label::new(name);
            }
        }
    }
}
