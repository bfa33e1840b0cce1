/*
 * Reference Interpreter
 *
 * Executes raw IR, original or instrumented, in process:
 *
 *   invoke → resolve method → frame (this, args, locals)
 *          → step loop over the body by program counter
 *              labels resolve to positions, markers are no-ops
 *              store calls go to the ShadowTraceStore by method name
 *              boxing calls return their operand
 *              other calls resolve through the classpath and recurse
 *          → thrown object: first Catch in program order whose range holds
 *            the pc and whose type is a supertype; otherwise propagate
 *
 * Every executed instruction costs one step against the budget.
 */

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::heap::Heap;
use super::operations::{self, OpFault};
use crate::config::InterpreterConfig;
use crate::features::call_builder::{StoreMethod, TraceCallBuilder};
use crate::features::interpreter::domain::{
    constant_value, ExecutionError, ExecutionOutcome, ExecutionResult, ARITHMETIC_EXCEPTION,
    ARRAY_INDEX_EXCEPTION, CLASS_CAST_EXCEPTION, NEGATIVE_ARRAY_SIZE_EXCEPTION,
    NULL_POINTER_EXCEPTION,
};
use crate::features::shadow_store::{ConcreteValue, ObjectHandle, ShadowTraceStore, StoreError};
use crate::shared::models::{
    CallKind, ClassInfo, Classpath, Label, MethodInfo, RawCallExpr, RawExpr, RawInst, RawValue,
    TypeName,
};

/// Nested invocations allowed before execution is abandoned
pub const MAX_CALL_DEPTH: usize = 256;

/// Why evaluation stopped early
pub(super) enum Fault {
    /// The program threw this object
    Throw(ObjectHandle),
    Fatal(ExecutionError),
}

impl From<ExecutionError> for Fault {
    fn from(error: ExecutionError) -> Self {
        Fault::Fatal(error)
    }
}

impl From<StoreError> for Fault {
    fn from(error: StoreError) -> Self {
        Fault::Fatal(ExecutionError::Store(error))
    }
}

pub(super) type Flow<T> = std::result::Result<T, Fault>;

enum Control {
    Next,
    Jump(usize),
    Return(Option<ConcreteValue>),
}

pub(super) struct Frame<'m> {
    pub qualified: String,
    body: &'m [RawInst],
    labels: FxHashMap<&'m str, usize>,
    this: Option<ConcreteValue>,
    args: Vec<ConcreteValue>,
    locals: Vec<ConcreteValue>,
}

impl<'m> Frame<'m> {
    fn target(&self, label: &Label) -> ExecutionResult<usize> {
        self.labels
            .get(label.name())
            .copied()
            .ok_or_else(|| ExecutionError::UndefinedLabel {
                method: self.qualified.clone(),
                label: label.name().to_string(),
            })
    }

    fn invalid(&self, detail: impl Into<String>) -> Fault {
        Fault::Fatal(ExecutionError::InvalidOperand {
            method: self.qualified.clone(),
            detail: detail.into(),
        })
    }
}

pub struct Interpreter<'a> {
    classpath: &'a dyn Classpath,
    pub(super) store: &'a mut ShadowTraceStore,
    heap: Heap,
    max_steps: u64,
    steps: u64,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        classpath: &'a dyn Classpath,
        store: &'a mut ShadowTraceStore,
        config: &InterpreterConfig,
    ) -> Self {
        Self {
            classpath,
            store,
            heap: Heap::new(),
            max_steps: config.max_steps,
            steps: 0,
            depth: 0,
        }
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// For building entry arguments before the call
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// Steps used by the last top-level invocation
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Run `class.method_name` with `args`; the overload is picked by arity
    pub fn invoke(
        &mut self,
        class: &TypeName,
        method_name: &str,
        receiver: Option<ConcreteValue>,
        args: Vec<ConcreteValue>,
    ) -> ExecutionResult<ExecutionOutcome> {
        let classpath = self.classpath;
        let class_info = classpath
            .find_class(class.as_str())
            .ok_or_else(|| ExecutionError::ClassNotFound(class.to_string()))?;
        let method = class_info
            .methods
            .iter()
            .find(|m| m.name == method_name && m.parameters.len() == args.len())
            .ok_or_else(|| ExecutionError::NoMatchingOverload {
                class: class.to_string(),
                name: method_name.to_string(),
                arity: args.len(),
            })?;

        self.steps = 0;
        self.depth = 0;
        let outcome = match self.execute(class_info, method, receiver, args) {
            Ok(value) => ExecutionOutcome::Returned(value),
            Err(Fault::Throw(handle)) => ExecutionOutcome::Exception {
                handle,
                class_name: self.heap.class_of(handle).unwrap_or_else(TypeName::throwable),
            },
            Err(Fault::Fatal(error)) => return Err(error),
        };

        debug!(
            class = %class,
            method = method_name,
            steps = self.steps,
            exception = outcome.is_exception(),
            "Invocation finished"
        );
        Ok(outcome)
    }

    fn execute(
        &mut self,
        class: &'a ClassInfo,
        method: &'a MethodInfo,
        this: Option<ConcreteValue>,
        args: Vec<ConcreteValue>,
    ) -> Flow<Option<ConcreteValue>> {
        let qualified = format!("{}.{}", class.name, method.description());
        let body = method
            .instructions
            .as_deref()
            .ok_or_else(|| ExecutionError::MissingBody {
                method: qualified.clone(),
            })?;

        if self.depth >= MAX_CALL_DEPTH {
            return Err(ExecutionError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH,
            }
            .into());
        }

        let labels = body
            .iter()
            .enumerate()
            .filter_map(|(pos, inst)| match inst {
                RawInst::Label(label) => Some((label.name(), pos)),
                _ => None,
            })
            .collect();
        let mut frame = Frame {
            qualified,
            body,
            labels,
            this,
            args,
            locals: vec![ConcreteValue::Null; method.local_count as usize],
        };

        trace!(method = %frame.qualified, depth = self.depth, "Enter");
        self.depth += 1;
        let result = self.run(&mut frame, method.return_type.is_void());
        self.depth -= 1;
        result
    }

    fn run(&mut self, frame: &mut Frame<'a>, is_void: bool) -> Flow<Option<ConcreteValue>> {
        let body: &'a [RawInst] = frame.body;
        let mut pc = 0;
        loop {
            let Some(inst) = body.get(pc) else {
                if is_void {
                    return Ok(None);
                }
                return Err(ExecutionError::FellOffEnd {
                    method: frame.qualified.clone(),
                }
                .into());
            };

            self.steps += 1;
            if self.steps > self.max_steps {
                return Err(ExecutionError::StepLimitExceeded {
                    limit: self.max_steps,
                }
                .into());
            }

            match self.step(frame, inst) {
                Ok(Control::Next) => pc += 1,
                Ok(Control::Jump(target)) => pc = target,
                Ok(Control::Return(value)) => return Ok(value),
                Err(Fault::Throw(handle)) => match self.find_handler(frame, pc, handle)? {
                    Some((position, throwable)) => {
                        self.assign(frame, throwable, ConcreteValue::Object(handle))?;
                        pc = position + 1;
                    }
                    None => return Err(Fault::Throw(handle)),
                },
                Err(fatal) => return Err(fatal),
            }
        }
    }

    /// First catch in program order covering `pc` for the thrown class
    fn find_handler(
        &self,
        frame: &Frame<'a>,
        pc: usize,
        handle: ObjectHandle,
    ) -> Flow<Option<(usize, &'a RawValue)>> {
        let thrown = self
            .heap
            .class_of(handle)
            .unwrap_or_else(TypeName::throwable);
        let body: &'a [RawInst] = frame.body;
        for (position, inst) in body.iter().enumerate() {
            let RawInst::Catch(catch) = inst else {
                continue;
            };
            for entry in &catch.entries {
                let start = frame.target(&entry.start_inclusive)?;
                let end = frame.target(&entry.end_exclusive)?;
                if (start..end).contains(&pc)
                    && self
                        .classpath
                        .is_subclass_of(thrown.as_str(), entry.throwable_type.as_str())
                {
                    return Ok(Some((position, &catch.throwable)));
                }
            }
        }
        Ok(None)
    }

    fn step(&mut self, frame: &mut Frame<'a>, inst: &'a RawInst) -> Flow<Control> {
        match inst {
            RawInst::Label(_) | RawInst::LineNumber { .. } | RawInst::Catch(_) => Ok(Control::Next),
            RawInst::Assign { lhv, rhv } => {
                let value = self.eval_expr(frame, rhv)?;
                self.assign(frame, lhv, value)?;
                Ok(Control::Next)
            }
            RawInst::Call(call) => {
                self.call(frame, call)?;
                Ok(Control::Next)
            }
            RawInst::Return(value) => {
                let value = match value {
                    Some(value) => Some(self.eval_value(frame, value)?),
                    None => None,
                };
                Ok(Control::Return(value))
            }
            RawInst::Throw(value) => match self.eval_value(frame, value)? {
                ConcreteValue::Object(handle) => Err(Fault::Throw(handle)),
                ConcreteValue::Null => Err(self.throw_builtin(NULL_POINTER_EXCEPTION)),
                other => Err(frame.invalid(format!("can't throw {}", other))),
            },
            RawInst::If {
                condition,
                true_branch,
                false_branch,
            } => {
                let lhs = self.eval_value(frame, &condition.lhv)?;
                let rhs = self.eval_value(frame, &condition.rhv)?;
                let taken = operations::compare(condition.op, &lhs, &rhs)
                    .map_err(|fault| self.op_fault(frame, fault))?;
                let label = if taken { true_branch } else { false_branch };
                Ok(Control::Jump(frame.target(label)?))
            }
            RawInst::Switch {
                key,
                branches,
                default,
            } => {
                let key = self.eval_value(frame, key)?;
                for (value, label) in branches {
                    let value = self.eval_value(frame, value)?;
                    if key == value || (key.as_long().is_some() && key.as_long() == value.as_long()) {
                        return Ok(Control::Jump(frame.target(label)?));
                    }
                }
                Ok(Control::Jump(frame.target(default)?))
            }
            RawInst::Goto(label) => Ok(Control::Jump(frame.target(label)?)),
            RawInst::EnterMonitor(value) | RawInst::ExitMonitor(value) => {
                if self.eval_value(frame, value)?.is_null() {
                    return Err(self.throw_builtin(NULL_POINTER_EXCEPTION));
                }
                Ok(Control::Next)
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Values
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn eval_value(&mut self, frame: &Frame<'a>, value: &RawValue) -> Flow<ConcreteValue> {
        match value {
            RawValue::This { .. } => frame
                .this
                .clone()
                .ok_or_else(|| frame.invalid("'this' in a static method")),
            RawValue::Argument { index, .. } => frame
                .args
                .get(*index as usize)
                .cloned()
                .ok_or_else(|| frame.invalid(format!("argument #{} out of range", index))),
            RawValue::Local { index, .. } => frame
                .locals
                .get(*index as usize)
                .cloned()
                .ok_or_else(|| frame.invalid(format!("local #{} out of range", index))),
            RawValue::Constant(constant) => Ok(constant_value(constant)),
            RawValue::Field(field) => match &field.instance {
                Some(instance) => {
                    let handle = self.non_null(frame, instance)?;
                    self.heap
                        .read_field(handle, &field.field_name)
                        .ok_or_else(|| frame.invalid(format!("{} has no field '{}'", handle, field.field_name)))
                }
                None => {
                    let owner = self.static_owner(&field.declaring_class, &field.field_name);
                    Ok(self
                        .heap
                        .read_static(&owner, &field.field_name, &field.type_name))
                }
            },
            RawValue::ArrayAccess(access) => {
                let (handle, index) = self.element(frame, &access.array, &access.index)?;
                self.heap
                    .array_elements(handle)
                    .and_then(|elements| elements.get(index).cloned())
                    .ok_or_else(|| frame.invalid(format!("{} is not an array", handle)))
            }
        }
    }

    fn non_null(&mut self, frame: &Frame<'a>, value: &RawValue) -> Flow<ObjectHandle> {
        match self.eval_value(frame, value)? {
            ConcreteValue::Object(handle) => Ok(handle),
            ConcreteValue::Null => Err(self.throw_builtin(NULL_POINTER_EXCEPTION)),
            other => Err(frame.invalid(format!("expected an object, got {}", other))),
        }
    }

    /// Array handle and checked element index
    fn element(&mut self, frame: &Frame<'a>, array: &RawValue, index: &RawValue) -> Flow<(ObjectHandle, usize)> {
        let handle = self.non_null(frame, array)?;
        let index = self.eval_value(frame, index)?;
        let index = index
            .as_long()
            .ok_or_else(|| frame.invalid(format!("array index {}", index)))?;
        let len = self
            .heap
            .array_len(handle)
            .ok_or_else(|| frame.invalid(format!("{} is not an array", handle)))?;
        if index < 0 || index as usize >= len {
            return Err(self.throw_builtin(ARRAY_INDEX_EXCEPTION));
        }
        Ok((handle, index as usize))
    }

    /// Class on the superclass chain that declares static `name`
    fn static_owner(&self, class: &TypeName, name: &str) -> TypeName {
        self.classpath
            .superclass_chain(class.as_str())
            .into_iter()
            .find(|candidate| {
                self.classpath
                    .find_class(candidate.as_str())
                    .and_then(|info| info.declared_field(name))
                    .is_some_and(|field| field.is_static)
            })
            .unwrap_or_else(|| class.clone())
    }

    fn assign(&mut self, frame: &mut Frame<'a>, target: &RawValue, value: ConcreteValue) -> Flow<()> {
        match target {
            RawValue::Local { index, .. } => {
                let index = *index as usize;
                if index >= frame.locals.len() {
                    return Err(frame.invalid(format!("local #{} out of range", index)));
                }
                frame.locals[index] = value;
            }
            RawValue::Argument { index, .. } => {
                let index = *index as usize;
                if index >= frame.args.len() {
                    return Err(frame.invalid(format!("argument #{} out of range", index)));
                }
                frame.args[index] = value;
            }
            RawValue::Field(field) => match &field.instance {
                Some(instance) => {
                    let handle = self.non_null(frame, instance)?;
                    if !self.heap.write_field(handle, &field.field_name, value) {
                        return Err(frame.invalid(format!("{} has no fields", handle)));
                    }
                }
                None => {
                    let owner = self.static_owner(&field.declaring_class, &field.field_name);
                    self.heap.write_static(&owner, &field.field_name, value);
                }
            },
            RawValue::ArrayAccess(access) => {
                let (handle, index) = self.element(frame, &access.array, &access.index)?;
                if let Some(elements) = self.heap.array_elements_mut(handle) {
                    elements[index] = value;
                }
            }
            RawValue::This { .. } | RawValue::Constant(_) => {
                return Err(frame.invalid(format!("can't assign to {}", target)));
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Expressions
    // ═══════════════════════════════════════════════════════════════════════

    fn eval_expr(&mut self, frame: &Frame<'a>, expr: &'a RawExpr) -> Flow<ConcreteValue> {
        match expr {
            RawExpr::Value(value) => self.eval_value(frame, value),
            RawExpr::Binary {
                op,
                lhv,
                rhv,
                type_name,
            } => {
                let lhs = self.eval_value(frame, lhv)?;
                let rhs = self.eval_value(frame, rhv)?;
                operations::binary(*op, &lhs, &rhs, type_name).map_err(|fault| self.op_fault(frame, fault))
            }
            RawExpr::Neg { operand, type_name } => {
                let value = self.eval_value(frame, operand)?;
                operations::negate(&value, type_name).map_err(|fault| self.op_fault(frame, fault))
            }
            RawExpr::Cast { operand, target } => {
                let value = self.eval_value(frame, operand)?;
                if target.is_primitive() {
                    return operations::convert(&value, target).map_err(|fault| self.op_fault(frame, fault));
                }
                if self.is_instance(&value, target) || value.is_null() {
                    Ok(value)
                } else {
                    Err(self.throw_builtin(CLASS_CAST_EXCEPTION))
                }
            }
            RawExpr::InstanceOf { operand, target } => {
                let value = self.eval_value(frame, operand)?;
                Ok(ConcreteValue::Bool(self.is_instance(&value, target)))
            }
            RawExpr::Length { array } => {
                let handle = self.non_null(frame, array)?;
                let len = self
                    .heap
                    .array_len(handle)
                    .ok_or_else(|| frame.invalid(format!("{} is not an array", handle)))?;
                Ok(ConcreteValue::Int(len as i32))
            }
            RawExpr::New { type_name } => {
                let handle = self.heap.allocate_instance(self.classpath, type_name);
                Ok(ConcreteValue::Object(handle))
            }
            RawExpr::NewArray {
                element_type,
                dimensions,
            } => {
                let mut sizes = Vec::with_capacity(dimensions.len());
                for dimension in dimensions {
                    let size = self.eval_value(frame, dimension)?;
                    let size = size
                        .as_long()
                        .ok_or_else(|| frame.invalid(format!("array size {}", size)))?;
                    if size < 0 {
                        return Err(self.throw_builtin(NEGATIVE_ARRAY_SIZE_EXCEPTION));
                    }
                    sizes.push(size as usize);
                }
                Ok(ConcreteValue::Object(self.new_array(element_type, &sizes)))
            }
            RawExpr::Call(call) => self
                .call(frame, call)?
                .ok_or_else(|| frame.invalid(format!("void call {} used as a value", call.method.name))),
        }
    }

    /// Arrays of arrays for each extra dimension; `element_type` is the
    /// innermost element
    fn new_array(&mut self, element_type: &TypeName, sizes: &[usize]) -> ObjectHandle {
        match sizes {
            [] | [_] => self
                .heap
                .allocate_array(element_type, sizes.first().copied().unwrap_or(0)),
            [size, rest @ ..] => {
                let mut nested_type = element_type.clone();
                for _ in 0..rest.len() {
                    nested_type = nested_type.array_of();
                }
                let handle = self.heap.allocate_array(&nested_type, *size);
                for i in 0..*size {
                    let inner = self.new_array(element_type, rest);
                    if let Some(elements) = self.heap.array_elements_mut(handle) {
                        elements[i] = ConcreteValue::Object(inner);
                    }
                }
                handle
            }
        }
    }

    fn is_instance(&self, value: &ConcreteValue, target: &TypeName) -> bool {
        match value {
            ConcreteValue::Object(handle) => self.heap.class_of(*handle).is_some_and(|class| {
                self.classpath.is_subclass_of(class.as_str(), target.as_str())
            }),
            ConcreteValue::Str(_) => matches!(target.as_str(), TypeName::STRING | TypeName::OBJECT),
            _ => false,
        }
    }

    fn op_fault(&mut self, frame: &Frame<'a>, fault: OpFault) -> Fault {
        match fault {
            OpFault::DivideByZero => self.throw_builtin(ARITHMETIC_EXCEPTION),
            OpFault::Mismatch(detail) => frame.invalid(detail),
        }
    }

    /// Allocate a runtime exception and return it as a pending throw
    fn throw_builtin(&mut self, class: &str) -> Fault {
        let handle = self
            .heap
            .allocate_instance(self.classpath, &TypeName::new(class));
        trace!(class = class, handle = %handle, "Runtime exception");
        Fault::Throw(handle)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Calls
    // ═══════════════════════════════════════════════════════════════════════

    fn call(&mut self, frame: &Frame<'a>, call: &'a RawCallExpr) -> Flow<Option<ConcreteValue>> {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval_value(frame, arg)?);
        }

        if StoreMethod::is_store_call(&call.method) {
            return Ok(self.dispatch_store(&call.method.name, &args)?);
        }
        if TraceCallBuilder::is_boxing_call(&call.method) {
            return Ok(args.into_iter().next());
        }

        let receiver = match &call.instance {
            Some(instance) => Some(self.eval_value(frame, instance)?),
            None => None,
        };
        let lookup_class = match (call.kind, &receiver) {
            (CallKind::Virtual | CallKind::Interface, Some(ConcreteValue::Null)) => {
                return Err(self.throw_builtin(NULL_POINTER_EXCEPTION));
            }
            (CallKind::Virtual | CallKind::Interface, Some(ConcreteValue::Object(handle))) => self
                .heap
                .class_of(*handle)
                .unwrap_or_else(|| call.method.declaring_class.clone()),
            _ => call.method.declaring_class.clone(),
        };

        let (class, method) = self.resolve(&lookup_class, call)?;
        self.execute(class, method, receiver, args)
    }

    /// Walk up from `start` to the first class declaring the signature
    fn resolve(&self, start: &TypeName, call: &RawCallExpr) -> ExecutionResult<(&'a ClassInfo, &'a MethodInfo)> {
        let classpath = self.classpath;
        let descriptor = call.method.descriptor();
        for class_name in classpath.superclass_chain(start.as_str()) {
            if let Some(class) = classpath.find_class(class_name.as_str()) {
                if let Some(method) = class.find_method(&call.method.name, &descriptor) {
                    return Ok((class, method));
                }
            }
        }
        Err(ExecutionError::MethodNotFound {
            class: start.to_string(),
            name: call.method.name.clone(),
            descriptor,
        })
    }
}
