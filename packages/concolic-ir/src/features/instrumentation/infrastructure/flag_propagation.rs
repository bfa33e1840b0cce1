//! Operand flag evaluation and target flag stores
//!
//! Every leaf of an operand tree gets one ordinal, left to right and children
//! first (`a[i]`: `a` = n, `i` = n+1, the element = n+2). Per non-constant
//! leaf the emitted code is:
//!
//! ```text
//! tmp = Store.get<Kind>Flag(...)
//! acc = acc | tmp
//! if (tmp == 0) goto #skipN else #recN
//! #recN:
//! boxed = Wrapper.valueOf(leaf)          // primitives only
//! Store.recordConcreteArgument(ordinal, boxed | leaf)
//! #skipN:
//! ```
//!
//! Constants take an ordinal but are never flagged or recorded.

use super::rewriter::MethodEmitter;
use crate::features::call_builder::{StoreMethod, TraceCallBuilder};
use crate::features::instrumentation::domain::{RewriteError, RewriteResult};
use crate::shared::models::{BinaryOp, RawCondition, RawInst, RawValue};

impl<'m> MethodEmitter<'m> {
    /// Evaluate the flags of `value`'s leaves and OR them into `acc`
    pub(super) fn emit_operand(&mut self, value: &RawValue, acc: &RawValue) -> RewriteResult<()> {
        match value {
            RawValue::Constant(_) => {
                self.ordinal += 1;
            }
            RawValue::This { .. } => {
                self.emit_leaf(value, acc, StoreMethod::GetThisFlag, Vec::new());
            }
            RawValue::Argument { index, .. } => {
                self.emit_leaf(
                    value,
                    acc,
                    StoreMethod::GetArgFlag,
                    vec![TraceCallBuilder::int(*index)],
                );
            }
            RawValue::Local { index, .. } => {
                self.check_local(*index)?;
                self.emit_leaf(
                    value,
                    acc,
                    StoreMethod::GetLocalFlag,
                    vec![TraceCallBuilder::int(*index)],
                );
            }
            RawValue::Field(field) => {
                let slot = self.field_slot(&field.declaring_class, &field.field_name);
                match &field.instance {
                    Some(instance) => {
                        self.emit_operand(instance, acc)?;
                        self.emit_leaf(
                            value,
                            acc,
                            StoreMethod::GetHeapFlag,
                            vec![instance.as_ref().clone(), TraceCallBuilder::int(slot)],
                        );
                    }
                    None => {
                        self.emit_leaf(
                            value,
                            acc,
                            StoreMethod::GetStaticFlag,
                            vec![TraceCallBuilder::int(slot)],
                        );
                    }
                }
            }
            RawValue::ArrayAccess(access) => {
                self.emit_operand(&access.array, acc)?;
                self.emit_operand(&access.index, acc)?;
                self.emit_leaf(
                    value,
                    acc,
                    StoreMethod::GetHeapFlag,
                    vec![access.array.as_ref().clone(), access.index.as_ref().clone()],
                );
            }
        }
        Ok(())
    }

    fn emit_leaf(
        &mut self,
        leaf: &RawValue,
        acc: &RawValue,
        getter: StoreMethod,
        getter_args: Vec<RawValue>,
    ) {
        let ordinal = self.ordinal;
        self.ordinal += 1;

        let tmp = self.scratch.tmp.clone();
        self.out
            .push(TraceCallBuilder::call_into(tmp.clone(), getter, getter_args));
        self.or_into(acc, &tmp);

        let record = self.labels.fresh("rec");
        let skip = self.labels.fresh("skip");
        self.out.push(RawInst::If {
            condition: RawCondition {
                op: BinaryOp::Eq,
                lhv: tmp,
                rhv: TraceCallBuilder::flag(crate::features::shadow_store::CLEAN),
            },
            true_branch: skip.clone(),
            false_branch: record.clone(),
        });
        self.out.push(RawInst::Label(record));

        let snapshot = match TraceCallBuilder::box_into(self.scratch.boxed.clone(), leaf.clone()) {
            Some(boxing) => {
                self.out.push(boxing);
                self.scratch.boxed.clone()
            }
            None => leaf.clone(),
        };
        self.store_call(
            StoreMethod::RecordConcreteArgument,
            vec![TraceCallBuilder::int(ordinal), snapshot],
        );
        self.out.push(RawInst::Label(skip));
        self.stats.concrete_snapshot_sites += 1;
    }

    /// Store `flag` as the flag of assignment target `target`
    pub(super) fn emit_target_flag(&mut self, target: &RawValue, flag: RawValue) -> RewriteResult<()> {
        match target {
            RawValue::Local { index, .. } => {
                self.check_local(*index)?;
                self.store_call(
                    StoreMethod::SetLocalFlag,
                    vec![TraceCallBuilder::int(*index), flag],
                );
            }
            RawValue::Argument { index, .. } => {
                self.store_call(
                    StoreMethod::SetArgFlag,
                    vec![TraceCallBuilder::int(*index), flag],
                );
            }
            RawValue::Field(field) => {
                let slot = self.field_slot(&field.declaring_class, &field.field_name);
                match &field.instance {
                    Some(instance) => self.store_call(
                        StoreMethod::SetHeapFlag,
                        vec![instance.as_ref().clone(), TraceCallBuilder::int(slot), flag],
                    ),
                    None => self.store_call(
                        StoreMethod::SetStaticFlag,
                        vec![TraceCallBuilder::int(slot), flag],
                    ),
                }
            }
            RawValue::ArrayAccess(access) => {
                self.store_call(
                    StoreMethod::SetHeapFlag,
                    vec![
                        access.array.as_ref().clone(),
                        access.index.as_ref().clone(),
                        flag,
                    ],
                );
            }
            RawValue::This { .. } | RawValue::Constant(_) => {
                return Err(RewriteError::InvalidAssignmentTarget {
                    method: self.qualified.clone(),
                    target: target.to_string(),
                });
            }
        }
        Ok(())
    }
}
