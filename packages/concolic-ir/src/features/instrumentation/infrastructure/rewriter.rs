/*
 * Method Rewriter
 *
 * Single forward pass over a method's raw instruction list:
 *
 *   START
 *     → prologue            push frame under the method's signature key,
 *                           bind receiver and argument flags
 *     → start label
 *     → per instruction     covered-instruction call, static access calls,
 *                           operand flags and snapshots, the instruction,
 *                           target flag
 *     → end label
 *     → method-wide handler pop frame, rethrow
 *   END
 *
 * Nothing emitted is revisited; every jump is by label name so insertions
 * never move a target. Coverage mode emits only the covered-instruction and
 * static access calls.
 *
 * Ids are encoded up front under one encoder write lock, so the emission
 * phase runs lock-free and methods can be rewritten in parallel.
 */

use rustc_hash::FxHashMap;
use tracing::debug;

use super::labels::{validate_labels, LabelAllocator};
use super::static_access::{for_each_value, StaticAccessCollector};
use crate::features::call_builder::{StoreMethod, TraceCallBuilder, FLAG_TYPE};
use crate::features::encoding::{
    InstructionId, SharedEncoder, StaticAccessId, StaticAccessKind,
};
use crate::features::instrumentation::domain::{
    InstrumentedMethod, RewriteError, RewriteOptions, RewriteResult, RewriteStats,
};
use crate::features::shadow_store::CLEAN;
use crate::shared::models::{
    BinaryOp, CatchEntry, ClassInfo, Classpath, Label, MethodInfo, RawCallExpr, RawCatch, RawExpr,
    RawInst, RawValue, TypeName,
};

/// Field identity used to look up pre-encoded flag slots
pub(super) type FieldKey = (TypeName, String);

/// Ids the emission phase needs, resolved before it starts
#[derive(Debug, Default)]
pub(super) struct MethodTables {
    /// `None` for labels and line-number markers
    pub instruction_ids: Vec<Option<InstructionId>>,
    /// SET records first, then GET records
    pub static_accesses: Vec<Vec<StaticAccessId>>,
    pub field_slots: FxHashMap<FieldKey, u32>,
    /// Signature key of the method being rewritten
    pub signature: u32,
    /// Callee name + descriptor → signature key
    pub call_signatures: FxHashMap<String, u32>,
}

/// Scratch locals appended after the method's own locals
#[derive(Debug, Clone)]
pub(super) struct ScratchLocals {
    /// Flag of the expression being assigned or returned
    pub acc: RawValue,
    /// Flag of one call operand, or a discarded sink
    pub sub: RawValue,
    /// Flag of the current leaf
    pub tmp: RawValue,
    /// Boxed primitive handed to the snapshot call
    pub boxed: RawValue,
    /// Throwable caught by the method-wide handler
    pub caught: RawValue,
}

impl ScratchLocals {
    pub const COUNT: u32 = 5;

    fn new(first: u32) -> Self {
        let local = |offset: u32, type_name: &str| {
            let index = first + offset;
            RawValue::local(index, format!("%{}", index), type_name)
        };
        Self {
            acc: local(0, FLAG_TYPE),
            sub: local(1, FLAG_TYPE),
            tmp: local(2, FLAG_TYPE),
            boxed: local(3, TypeName::OBJECT),
            caught: local(4, TypeName::THROWABLE),
        }
    }
}

pub struct MethodRewriter<'a> {
    classpath: &'a dyn Classpath,
    encoder: &'a SharedEncoder,
    options: RewriteOptions,
}

impl<'a> MethodRewriter<'a> {
    pub fn new(classpath: &'a dyn Classpath, encoder: &'a SharedEncoder, options: RewriteOptions) -> Self {
        Self {
            classpath,
            encoder,
            options,
        }
    }

    pub fn rewrite(&self, class: &ClassInfo, method: &MethodInfo) -> RewriteResult<InstrumentedMethod> {
        let qualified = format!("{}.{}", class.name, method.description());
        let body = method
            .instructions
            .as_ref()
            .ok_or_else(|| RewriteError::MissingBody {
                method: qualified.clone(),
            })?;

        let defined_labels = validate_labels(&qualified, body)?;
        let tables = self.encode_tables(class, method, body)?;

        let mut emitter = MethodEmitter::new(qualified, method, self.options, tables, defined_labels);
        emitter.run(body)?;
        let (instructions, local_count, stats) = emitter.finish();

        debug!(
            class = %class.name,
            method = %method.description(),
            original = stats.original_instructions,
            emitted = stats.emitted_instructions,
            traced = stats.traced_instructions,
            snapshots = stats.concrete_snapshot_sites,
            "Rewrote method"
        );

        let mut rewritten = method.clone();
        rewritten.local_count = local_count;
        rewritten.instructions = Some(instructions);
        Ok(InstrumentedMethod {
            method: rewritten,
            stats,
        })
    }

    fn encode_tables(
        &self,
        class: &ClassInfo,
        method: &MethodInfo,
        body: &[RawInst],
    ) -> RewriteResult<MethodTables> {
        let mut tables = MethodTables::default();
        let mut encoder = self.encoder.write();
        if self.options.concolic {
            tables.signature = encoder.encode_signature(&method.name, &method.descriptor());
        }

        for (index, inst) in body.iter().enumerate() {
            let id = if inst.is_marker() {
                None
            } else {
                Some(encoder.encode_instruction(class, method, index, inst)?)
            };
            tables.instruction_ids.push(id);

            let mut statics = Vec::new();
            if self.options.track_static_access && !inst.is_marker() {
                let accesses = StaticAccessCollector::collect(inst);
                for field in &accesses.sets {
                    statics.push(encoder.encode_static_field_access(
                        self.classpath,
                        field,
                        StaticAccessKind::Set,
                    )?);
                }
                for field in &accesses.gets {
                    statics.push(encoder.encode_static_field_access(
                        self.classpath,
                        field,
                        StaticAccessKind::Get,
                    )?);
                }
            }
            tables.static_accesses.push(statics);

            if self.options.concolic {
                let mut fields = Vec::new();
                for_each_value(inst, &mut |value| {
                    if let RawValue::Field(field) = value {
                        fields.push(field);
                    }
                });
                for field in fields {
                    let key = (field.declaring_class.clone(), field.field_name.clone());
                    if !tables.field_slots.contains_key(&key) {
                        let slot = encoder.encode_field(self.classpath, field)?;
                        tables.field_slots.insert(key, slot);
                    }
                }

                let callee = match inst {
                    RawInst::Call(call) => Some(&call.method),
                    RawInst::Assign {
                        rhv: RawExpr::Call(call),
                        ..
                    } => Some(&call.method),
                    _ => None,
                };
                if let Some(callee) = callee {
                    let descriptor = callee.descriptor();
                    let key = format!("{}{}", callee.name, descriptor);
                    if !tables.call_signatures.contains_key(&key) {
                        let id = encoder.encode_signature(&callee.name, &descriptor);
                        tables.call_signatures.insert(key, id);
                    }
                }
            }
        }

        Ok(tables)
    }
}

/// Per-method emission state
pub(super) struct MethodEmitter<'m> {
    pub qualified: String,
    pub method: &'m MethodInfo,
    pub options: RewriteOptions,
    pub tables: MethodTables,
    pub labels: LabelAllocator,
    pub scratch: ScratchLocals,
    pub out: Vec<RawInst>,
    pub stats: RewriteStats,
    /// Next leaf ordinal within the current instruction
    pub ordinal: u32,
}

impl<'m> MethodEmitter<'m> {
    fn new(
        qualified: String,
        method: &'m MethodInfo,
        options: RewriteOptions,
        tables: MethodTables,
        defined_labels: rustc_hash::FxHashSet<String>,
    ) -> Self {
        Self {
            qualified,
            method,
            options,
            tables,
            labels: LabelAllocator::new(defined_labels),
            scratch: ScratchLocals::new(method.local_count),
            out: Vec::new(),
            stats: RewriteStats::default(),
            ordinal: 0,
        }
    }

    fn run(&mut self, body: &[RawInst]) -> RewriteResult<()> {
        self.stats.original_instructions = body.len();

        if !self.options.concolic {
            for (index, inst) in body.iter().enumerate() {
                match inst {
                    RawInst::Catch(_) => {
                        self.out.push(inst.clone());
                        self.emit_trace(index);
                    }
                    _ => {
                        self.emit_trace(index);
                        self.out.push(inst.clone());
                    }
                }
            }
            return Ok(());
        }

        let start = self.labels.fresh("start");
        let end = self.labels.fresh("end");
        let handler = self.labels.fresh("handler");

        self.emit_prologue();
        self.out.push(RawInst::Label(start.clone()));
        for (index, inst) in body.iter().enumerate() {
            self.rewrite_instruction(index, inst)?;
        }
        self.out.push(RawInst::Label(end.clone()));
        self.emit_method_handler(start, end, handler);
        Ok(())
    }

    fn finish(mut self) -> (Vec<RawInst>, u32, RewriteStats) {
        self.stats.emitted_instructions = self.out.len();
        let local_count = if self.options.concolic {
            self.method.local_count + ScratchLocals::COUNT
        } else {
            self.method.local_count
        };
        (self.out, local_count, self.stats)
    }

    fn emit_prologue(&mut self) {
        let arg_count = self.method.parameters.len() as u32;
        self.store_call(
            StoreMethod::PushFrame,
            vec![
                TraceCallBuilder::int(arg_count),
                TraceCallBuilder::int(self.method.local_count),
                TraceCallBuilder::int(self.tables.signature),
            ],
        );
        if !self.method.is_static {
            self.store_call(StoreMethod::BindIncomingThis, Vec::new());
        }
        for index in 0..arg_count {
            self.store_call(
                StoreMethod::BindIncomingArg,
                vec![TraceCallBuilder::int(index)],
            );
        }
    }

    /// Catch-all over the whole body: pop the frame, rethrow unchanged
    fn emit_method_handler(&mut self, start: Label, end: Label, handler: Label) {
        let caught = self.scratch.caught.clone();
        self.out.push(RawInst::Label(handler.clone()));
        self.out.push(RawInst::Catch(RawCatch {
            throwable: caught.clone(),
            handler,
            entries: vec![CatchEntry {
                throwable_type: TypeName::throwable(),
                start_inclusive: start,
                end_exclusive: end,
            }],
        }));
        self.store_call(StoreMethod::PopFrame, Vec::new());
        self.out.push(RawInst::Throw(caught));
    }

    /// Covered-instruction call plus static access calls
    fn emit_trace(&mut self, index: usize) {
        if let Some(id) = self.tables.instruction_ids[index] {
            self.store_call(
                StoreMethod::RecordInstruction,
                vec![TraceCallBuilder::id(id.raw())],
            );
            self.stats.traced_instructions += 1;
        }
        let statics = std::mem::take(&mut self.tables.static_accesses[index]);
        for access in statics {
            self.store_call(
                StoreMethod::RecordStaticAccess,
                vec![TraceCallBuilder::id(access.raw())],
            );
            self.stats.static_access_calls += 1;
        }
    }

    fn rewrite_instruction(&mut self, index: usize, inst: &RawInst) -> RewriteResult<()> {
        self.ordinal = 0;
        match inst {
            RawInst::Label(_) | RawInst::LineNumber { .. } => {
                self.out.push(inst.clone());
            }
            RawInst::Catch(catch) => {
                // The marker stays first at its handler
                self.out.push(inst.clone());
                self.emit_trace(index);
                self.emit_target_flag_constant(&catch.throwable)?;
            }
            RawInst::Goto(_) => {
                self.emit_trace(index);
                self.out.push(inst.clone());
            }
            RawInst::Assign { lhv, rhv } => {
                self.emit_trace(index);
                self.rewrite_assign(inst, lhv, rhv)?;
            }
            RawInst::Call(call) => {
                self.emit_trace(index);
                let acc = self.scratch.acc.clone();
                self.reset_flag(&acc);
                self.emit_call_staging(call)?;
                self.out.push(inst.clone());
                if !call.method.return_type.is_void() {
                    // Result unused; drain the register
                    self.store_call(StoreMethod::TakeReturnFlag, Vec::new());
                }
            }
            RawInst::Return(value) => {
                self.emit_trace(index);
                if let Some(value) = value {
                    let acc = self.scratch.acc.clone();
                    self.reset_flag(&acc);
                    self.emit_operand(value, &acc)?;
                    self.store_call(StoreMethod::SetReturnFlag, vec![acc]);
                }
                self.store_call(StoreMethod::PopFrame, Vec::new());
                self.out.push(inst.clone());
            }
            RawInst::If { condition, .. } => {
                self.emit_trace(index);
                self.emit_sink_operands(&[&condition.lhv, &condition.rhv])?;
                self.out.push(inst.clone());
            }
            RawInst::Switch { key, .. } => {
                self.emit_trace(index);
                self.emit_sink_operands(&[key])?;
                self.out.push(inst.clone());
            }
            RawInst::Throw(value) | RawInst::EnterMonitor(value) | RawInst::ExitMonitor(value) => {
                self.emit_trace(index);
                self.emit_sink_operands(&[value])?;
                self.out.push(inst.clone());
            }
        }
        Ok(())
    }

    fn rewrite_assign(&mut self, inst: &RawInst, lhv: &RawValue, rhv: &RawExpr) -> RewriteResult<()> {
        if matches!(lhv, RawValue::This { .. } | RawValue::Constant(_)) {
            return Err(RewriteError::InvalidAssignmentTarget {
                method: self.qualified.clone(),
                target: lhv.to_string(),
            });
        }

        // Values read to address the target are snapshotted, not propagated
        let address: Vec<&RawValue> = match lhv {
            RawValue::Field(field) => field.instance.iter().map(|v| v.as_ref()).collect(),
            RawValue::ArrayAccess(access) => vec![access.array.as_ref(), access.index.as_ref()],
            _ => Vec::new(),
        };
        if !address.is_empty() {
            self.emit_sink_operands(&address)?;
        }

        let acc = self.scratch.acc.clone();
        self.reset_flag(&acc);
        match rhv {
            RawExpr::Call(call) => {
                self.emit_call_staging(call)?;
                self.out.push(inst.clone());
                let tmp = self.scratch.tmp.clone();
                self.out.push(TraceCallBuilder::call_into(
                    tmp.clone(),
                    StoreMethod::TakeReturnFlag,
                    Vec::new(),
                ));
                self.or_into(&acc, &tmp);
            }
            _ => {
                for operand in rhv.operands() {
                    self.emit_operand(operand, &acc)?;
                }
                self.out.push(inst.clone());
            }
        }

        self.emit_target_flag(lhv, acc)
    }

    /// Stage receiver and argument flags for the callee, OR-ing each into `acc`
    ///
    /// Every call is staged, even without arguments, so the callee's frame
    /// and the return register are tied to this call.
    fn emit_call_staging(&mut self, call: &RawCallExpr) -> RewriteResult<()> {
        let acc = self.scratch.acc.clone();
        let sub = self.scratch.sub.clone();

        let signature = self.call_signature(call);
        self.store_call(
            StoreMethod::StageCall,
            vec![
                TraceCallBuilder::int(call.args.len() as u32),
                TraceCallBuilder::int(signature),
            ],
        );

        if let Some(receiver) = &call.instance {
            self.reset_flag(&sub);
            self.emit_operand(receiver, &sub)?;
            self.store_call(StoreMethod::SetStagedThisFlag, vec![sub.clone()]);
            self.or_into(&acc, &sub);
        }

        for (index, arg) in call.args.iter().enumerate() {
            self.reset_flag(&sub);
            self.emit_operand(arg, &sub)?;
            self.store_call(
                StoreMethod::SetStagedArgFlag,
                vec![TraceCallBuilder::int(index as u32), sub.clone()],
            );
            self.or_into(&acc, &sub);
        }
        Ok(())
    }

    /// Operands whose flags go nowhere; only their snapshots matter
    fn emit_sink_operands(&mut self, operands: &[&RawValue]) -> RewriteResult<()> {
        let sub = self.scratch.sub.clone();
        self.reset_flag(&sub);
        for operand in operands {
            self.emit_operand(operand, &sub)?;
        }
        Ok(())
    }

    /// Exceptions enter a handler clean
    fn emit_target_flag_constant(&mut self, target: &RawValue) -> RewriteResult<()> {
        self.emit_target_flag(target, TraceCallBuilder::flag(CLEAN))
    }

    pub(super) fn store_call(&mut self, method: StoreMethod, args: Vec<RawValue>) {
        self.out.push(TraceCallBuilder::call(method, args));
    }

    pub(super) fn reset_flag(&mut self, local: &RawValue) {
        self.out.push(RawInst::assign(
            local.clone(),
            RawExpr::Value(TraceCallBuilder::flag(CLEAN)),
        ));
    }

    pub(super) fn or_into(&mut self, acc: &RawValue, flag: &RawValue) {
        self.out.push(RawInst::assign(
            acc.clone(),
            RawExpr::binary(
                BinaryOp::Or,
                acc.clone(),
                flag.clone(),
                FLAG_TYPE,
            ),
        ));
    }

    pub(super) fn field_slot(&self, declaring_class: &TypeName, field_name: &str) -> u32 {
        // Every field of the body was encoded up front
        self.tables
            .field_slots
            .get(&(declaring_class.clone(), field_name.to_string()))
            .copied()
            .unwrap_or_default()
    }

    fn call_signature(&self, call: &RawCallExpr) -> u32 {
        // Every callee of the body was encoded up front
        self.tables
            .call_signatures
            .get(&format!("{}{}", call.method.name, call.method.descriptor()))
            .copied()
            .unwrap_or_default()
    }

    pub(super) fn check_local(&self, index: u32) -> RewriteResult<()> {
        if index >= self.method.local_count {
            return Err(RewriteError::LocalOutOfRange {
                method: self.qualified.clone(),
                declared: self.method.local_count,
                index,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::encoding::shared_encoder;
    use crate::shared::models::{InMemoryClasspath, MethodRef, Parameter, RawConstant};

    fn method(is_static: bool, params: &[&str], local_count: u32, body: Option<Vec<RawInst>>) -> MethodInfo {
        MethodInfo {
            name: "m".to_string(),
            is_static,
            parameters: params
                .iter()
                .enumerate()
                .map(|(i, t)| Parameter {
                    name: format!("p{}", i),
                    type_name: TypeName::new(*t),
                })
                .collect(),
            return_type: TypeName::int(),
            local_count,
            instructions: body,
        }
    }

    fn class_with(method: MethodInfo) -> ClassInfo {
        ClassInfo {
            name: TypeName::new("C"),
            super_class: Some(TypeName::object()),
            is_enum: false,
            fields: Vec::new(),
            methods: vec![method],
        }
    }

    fn rewrite(method: &MethodInfo, options: RewriteOptions) -> RewriteResult<InstrumentedMethod> {
        let class = class_with(method.clone());
        let classpath = InMemoryClasspath::new(vec![class.clone()]);
        let encoder = shared_encoder();
        MethodRewriter::new(&classpath, &encoder, options).rewrite(&class, method)
    }

    fn store_calls(method: &MethodInfo) -> Vec<StoreMethod> {
        method
            .instructions
            .iter()
            .flatten()
            .filter_map(|inst| match inst {
                RawInst::Call(call) => StoreMethod::from_name(&call.method.name),
                RawInst::Assign {
                    rhv: RawExpr::Call(call),
                    ..
                } if StoreMethod::is_store_call(&call.method) => StoreMethod::from_name(&call.method.name),
                _ => None,
            })
            .collect()
    }

    fn identity_body() -> Vec<RawInst> {
        vec![RawInst::Return(Some(RawValue::argument(1, "p1", "int")))]
    }

    #[test]
    fn test_instance_prologue_binds_receiver_then_arguments() {
        let m = method(false, &["int", "int"], 0, Some(identity_body()));
        let rewritten = rewrite(&m, RewriteOptions::concolic()).unwrap();
        let calls = store_calls(&rewritten.method);
        assert_eq!(
            &calls[..4],
            &[
                StoreMethod::PushFrame,
                StoreMethod::BindIncomingThis,
                StoreMethod::BindIncomingArg,
                StoreMethod::BindIncomingArg,
            ]
        );

        let body = rewritten.method.instructions.unwrap();
        match &body[0] {
            // Own signature is the first one this session encodes
            RawInst::Call(call) => assert_eq!(
                call.args,
                vec![TraceCallBuilder::int(2), TraceCallBuilder::int(0), TraceCallBuilder::int(0)]
            ),
            other => panic!("expected pushFrame, got {:?}", other),
        }
    }

    #[test]
    fn test_scratch_locals_follow_method_locals() {
        let m = method(true, &["int", "int"], 3, Some(identity_body()));
        let rewritten = rewrite(&m, RewriteOptions::concolic()).unwrap();
        assert_eq!(rewritten.method.local_count, 3 + ScratchLocals::COUNT);

        let scratch = ScratchLocals::new(3);
        match (&scratch.acc, &scratch.caught) {
            (RawValue::Local { index: 3, .. }, RawValue::Local { index: 7, .. }) => {}
            other => panic!("unexpected scratch layout {:?}", other),
        }
    }

    #[test]
    fn test_return_sets_flag_then_pops() {
        let m = method(true, &["int", "int"], 0, Some(identity_body()));
        let rewritten = rewrite(&m, RewriteOptions::concolic()).unwrap();
        let calls = store_calls(&rewritten.method);
        let tail: Vec<StoreMethod> = calls[3..].to_vec();
        assert_eq!(
            tail,
            vec![
                StoreMethod::RecordInstruction,
                StoreMethod::GetArgFlag,
                StoreMethod::RecordConcreteArgument,
                StoreMethod::SetReturnFlag,
                StoreMethod::PopFrame,
                // method-wide handler
                StoreMethod::PopFrame,
            ]
        );
        assert_eq!(rewritten.stats.traced_instructions, 1);
        assert_eq!(rewritten.stats.concrete_snapshot_sites, 1);
    }

    #[test]
    fn test_coverage_mode_leaves_body_and_locals() {
        let m = method(true, &["int", "int"], 2, Some(identity_body()));
        let rewritten = rewrite(&m, RewriteOptions::coverage()).unwrap();
        assert_eq!(rewritten.method.local_count, 2);
        assert_eq!(store_calls(&rewritten.method), vec![StoreMethod::RecordInstruction]);
        assert_eq!(rewritten.stats.emitted_instructions, 2);
        assert_eq!(rewritten.stats.expansion_ratio(), 2.0);
    }

    #[test]
    fn test_constant_target_is_rejected() {
        let body = vec![
            RawInst::assign(
                RawValue::Constant(RawConstant::Int(1)),
                RawExpr::Value(RawValue::int(2)),
            ),
            RawInst::Return(Some(RawValue::int(0))),
        ];
        let m = method(true, &[], 0, Some(body));
        assert!(matches!(
            rewrite(&m, RewriteOptions::concolic()),
            Err(RewriteError::InvalidAssignmentTarget { .. })
        ));
    }

    #[test]
    fn test_this_target_is_rejected() {
        let body = vec![
            RawInst::assign(RawValue::this("C"), RawExpr::Value(RawValue::null())),
            RawInst::Return(Some(RawValue::int(0))),
        ];
        let m = method(false, &[], 0, Some(body));
        assert!(matches!(
            rewrite(&m, RewriteOptions::concolic()),
            Err(RewriteError::InvalidAssignmentTarget { .. })
        ));
    }

    #[test]
    fn test_missing_body_is_rejected() {
        let m = method(true, &[], 0, None);
        assert!(matches!(
            rewrite(&m, RewriteOptions::coverage()),
            Err(RewriteError::MissingBody { .. })
        ));
    }

    #[test]
    fn test_undeclared_local_is_rejected() {
        let body = vec![
            RawInst::assign(RawValue::local(4, "x", "int"), RawExpr::Value(RawValue::int(1))),
            RawInst::Return(Some(RawValue::int(0))),
        ];
        let m = method(true, &[], 2, Some(body));
        assert!(matches!(
            rewrite(&m, RewriteOptions::concolic()),
            Err(RewriteError::LocalOutOfRange { index: 4, declared: 2, .. })
        ));
    }

    #[test]
    fn test_discarded_result_clears_return_register() {
        let callee = MethodRef {
            declaring_class: TypeName::new("C"),
            name: "n".to_string(),
            argument_types: vec![TypeName::int()],
            return_type: TypeName::int(),
        };
        let body = vec![
            RawInst::Call(RawCallExpr::new_static(callee, vec![RawValue::int(1)])),
            RawInst::Return(Some(RawValue::int(0))),
        ];
        let m = method(true, &[], 0, Some(body));
        let rewritten = rewrite(&m, RewriteOptions::concolic()).unwrap();
        let calls = store_calls(&rewritten.method);
        let staged = calls
            .iter()
            .position(|c| *c == StoreMethod::StageCall)
            .unwrap();
        assert_eq!(
            &calls[staged..staged + 3],
            &[
                StoreMethod::StageCall,
                StoreMethod::SetStagedArgFlag,
                StoreMethod::TakeReturnFlag,
            ]
        );
    }

    fn staged_signatures(method: &MethodInfo) -> Vec<RawValue> {
        method
            .instructions
            .iter()
            .flatten()
            .filter_map(|inst| match inst {
                RawInst::Call(call) if call.method.name == StoreMethod::StageCall.name() => {
                    call.args.get(1).cloned()
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_every_call_is_staged_under_callee_signature() {
        let recurse = MethodRef {
            declaring_class: TypeName::new("C"),
            name: "m".to_string(),
            argument_types: vec![TypeName::int()],
            return_type: TypeName::int(),
        };
        let nullary = MethodRef {
            declaring_class: TypeName::new("C"),
            name: "n".to_string(),
            argument_types: Vec::new(),
            return_type: TypeName::void(),
        };
        let body = vec![
            RawInst::Call(RawCallExpr::new_static(nullary, Vec::new())),
            RawInst::Call(RawCallExpr::new_static(recurse, vec![RawValue::argument(0, "p0", "int")])),
            RawInst::Return(Some(RawValue::int(0))),
        ];
        let m = method(true, &["int"], 0, Some(body));
        let rewritten = rewrite(&m, RewriteOptions::concolic()).unwrap();

        let own = match &rewritten.method.instructions.as_ref().unwrap()[0] {
            RawInst::Call(call) => call.args[2].clone(),
            other => panic!("expected pushFrame, got {:?}", other),
        };
        let staged = staged_signatures(&rewritten.method);
        assert_eq!(staged.len(), 2);
        assert_ne!(staged[0], own);
        assert_eq!(staged[1], own);
    }
}
