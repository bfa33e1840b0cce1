//! Shadow trace store: runtime state written by instrumented code
//!
//! One store per thread of target-program execution. It holds:
//! - the covered-instruction buffer with concrete argument snapshots
//! - the shadow call stack of argument/local/receiver flags
//! - identity-keyed heap field flags
//! - static field flags
//! - the static field access buffer
//!
//! Call protocol: a caller at depth `d` stages its argument and receiver
//! flags into slot `d + 1` under the callee's signature key and a fresh call
//! token; the callee prologue pushes that slot and binds the staged flags
//! only when its own signature key matches. A frame pushed under a different
//! key (an instrumented method reached through uninstrumented code) starts
//! clean. Returned flags travel back through a single return register tagged
//! with the returning frame's token; the caller accepts the flag only for the
//! token of its own most recent call.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use super::types::{ConcreteValue, Flag, ObjectHandle, RecordedInstruction, CLEAN};
use crate::config::StoreConfig;
use crate::features::encoding::{InstructionId, StaticAccessId};

#[derive(Debug, Default, Clone)]
struct FrameSlot {
    args: Vec<Flag>,
    locals: Vec<Flag>,
    this: Flag,
    /// Written by the caller one level up, read by the prologue
    incoming_args: Vec<Flag>,
    incoming_this: Flag,
    /// `None` for driver staging, which any callee accepts
    incoming_signature: Option<u32>,
    incoming_token: u64,
    /// Call this frame answers; 0 when it was not staged for it
    token: u64,
    /// Most recent call staged by this frame
    pending_token: u64,
}

impl FrameSlot {
    fn clear(&mut self) {
        self.args.clear();
        self.locals.clear();
        self.this = CLEAN;
        self.incoming_args.clear();
        self.incoming_this = CLEAN;
        self.incoming_signature = None;
        self.incoming_token = 0;
        self.token = 0;
        self.pending_token = 0;
    }

    fn discard_staged(&mut self) {
        self.incoming_args.clear();
        self.incoming_this = CLEAN;
        self.incoming_signature = None;
        self.incoming_token = 0;
    }

    fn is_empty(&self) -> bool {
        self.args.is_empty()
            && self.locals.is_empty()
            && self.this == CLEAN
            && self.incoming_args.is_empty()
            && self.incoming_this == CLEAN
            && self.incoming_signature.is_none()
            && self.incoming_token == 0
            && self.token == 0
            && self.pending_token == 0
    }
}

#[derive(Debug)]
pub struct ShadowTraceStore {
    session_id: Uuid,
    config: StoreConfig,

    records: Vec<RecordedInstruction>,
    trace_ptr: usize,

    frames: Vec<FrameSlot>,
    /// -1 when no frame is active
    sp: isize,

    heap_flags: FxHashMap<ObjectHandle, FxHashMap<u32, Flag>>,
    static_flags: Vec<Flag>,
    static_accesses: Vec<StaticAccessId>,

    return_flag: Flag,
    return_token: u64,
    next_token: u64,
}

impl Default for ShadowTraceStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl ShadowTraceStore {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_session(config, Uuid::new_v4())
    }

    pub fn with_session(config: StoreConfig, session_id: Uuid) -> Self {
        let mut store = Self {
            session_id,
            config,
            records: Vec::new(),
            trace_ptr: 0,
            frames: Vec::new(),
            sp: -1,
            heap_flags: FxHashMap::default(),
            static_flags: Vec::new(),
            static_accesses: Vec::new(),
            return_flag: CLEAN,
            return_token: 0,
            next_token: 1,
        };
        store.reset();
        store
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Reinitialize every buffer to its initial capacity and empty all pointers
    pub fn reset(&mut self) {
        let capacity = self.config.trace_capacity.max(1);
        self.records = Vec::with_capacity(capacity);
        self.trace_ptr = 0;

        let frames = self.config.frame_capacity.max(1);
        self.frames = vec![FrameSlot::default(); frames];
        self.sp = -1;

        self.heap_flags = FxHashMap::default();
        self.static_flags = vec![CLEAN; self.config.static_capacity.max(1)];
        self.static_accesses = Vec::with_capacity(capacity);
        self.return_flag = CLEAN;
        self.return_token = 0;
        self.next_token = 1;

        debug!(session = %self.session_id, "Shadow trace store reset");
    }

    /// Move the trace pointer back to the start, keeping the allocated records
    pub fn rewind_trace(&mut self) {
        self.trace_ptr = 0;
        self.static_accesses.clear();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Trace buffer
    // ═══════════════════════════════════════════════════════════════════════

    pub fn record_instruction(&mut self, id: InstructionId) {
        if self.trace_ptr < self.records.len() {
            let record = &mut self.records[self.trace_ptr];
            record.id = id;
            record.concrete_args.clear();
        } else {
            if self.records.len() == self.records.capacity() {
                let additional = self.records.len().max(1);
                self.records.reserve_exact(additional);
                trace!(capacity = self.records.capacity(), "Trace buffer grown");
            }
            self.records.push(RecordedInstruction {
                id,
                concrete_args: Vec::with_capacity(self.config.argument_capacity),
            });
        }
        self.trace_ptr += 1;
    }

    /// Attach a concrete value to the most recently recorded instruction
    pub fn record_concrete_argument(
        &mut self,
        arg_index: u32,
        value: ConcreteValue,
    ) -> StoreResult<()> {
        let last = self
            .trace_ptr
            .checked_sub(1)
            .ok_or(StoreError::NoRecordedInstruction)?;
        self.records[last].concrete_args.push((arg_index, value));
        Ok(())
    }

    pub fn record_static_access(&mut self, id: StaticAccessId) {
        self.static_accesses.push(id);
    }

    /// Records up to the trace pointer
    pub fn trace(&self) -> &[RecordedInstruction] {
        &self.records[..self.trace_ptr]
    }

    pub fn covered_instruction_ids(&self) -> Vec<InstructionId> {
        self.trace().iter().map(|record| record.id).collect()
    }

    pub fn static_accesses(&self) -> &[StaticAccessId] {
        &self.static_accesses
    }

    pub fn trace_len(&self) -> usize {
        self.trace_ptr
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Shadow call stack
    // ═══════════════════════════════════════════════════════════════════════

    /// Push a frame for a method with signature key `signature`
    ///
    /// Flags staged for another signature were meant for a call that never
    /// reached instrumented code; they are dropped.
    pub fn push_frame(&mut self, arg_count: u32, local_count: u32, signature: u32) {
        let depth = (self.sp + 1) as usize;
        self.ensure_frame_slot(depth);
        let slot = &mut self.frames[depth];
        if slot.incoming_signature.is_some_and(|staged| staged != signature) {
            trace!(depth, signature, "Dropped flags staged for another callee");
            slot.discard_staged();
        }
        slot.token = slot.incoming_token;
        slot.pending_token = 0;
        slot.args.clear();
        slot.args.resize(arg_count as usize, CLEAN);
        slot.locals.clear();
        slot.locals.resize(local_count as usize, CLEAN);
        slot.this = CLEAN;
        self.sp += 1;
    }

    /// Clear the top frame so its slot can be reused, then drop it
    ///
    /// Staging the frame left for a callee that never pushed goes with it.
    pub fn pop_frame(&mut self) -> StoreResult<()> {
        if self.sp < 0 {
            return Err(StoreError::StackUnderflow);
        }
        let depth = self.sp as usize;
        self.frames[depth].clear();
        if let Some(staged) = self.frames.get_mut(depth + 1) {
            staged.clear();
        }
        self.sp -= 1;
        Ok(())
    }

    /// Number of active frames
    pub fn depth(&self) -> usize {
        (self.sp + 1) as usize
    }

    pub fn stack_pointer(&self) -> isize {
        self.sp
    }

    pub fn frame_capacity(&self) -> usize {
        self.frames.len()
    }

    /// Prepare the next depth for a call with `arg_count` arguments to a
    /// method with signature key `signature`
    pub fn stage_call(&mut self, arg_count: u32, signature: u32) {
        let token = self.next_token;
        self.next_token += 1;

        let slot = self.next_slot();
        slot.incoming_args.clear();
        slot.incoming_args.resize(arg_count as usize, CLEAN);
        slot.incoming_this = CLEAN;
        slot.incoming_signature = Some(signature);
        slot.incoming_token = token;

        if let Ok(caller) = self.current_mut() {
            caller.pending_token = token;
        }
    }

    pub fn set_staged_arg_flag(&mut self, index: u32, flag: Flag) {
        let slot = self.next_slot();
        let index = index as usize;
        if index >= slot.incoming_args.len() {
            slot.incoming_args.resize(index + 1, CLEAN);
        }
        slot.incoming_args[index] = flag;
    }

    pub fn set_staged_this_flag(&mut self, flag: Flag) {
        self.next_slot().incoming_this = flag;
    }

    /// Copy the caller-staged flag of argument `index` into the current frame
    ///
    /// A caller that staged nothing (uninstrumented code, a driver entry call)
    /// leaves the argument clean.
    pub fn bind_incoming_arg(&mut self, index: u32) -> StoreResult<()> {
        let frame = self.current_mut()?;
        let flag = frame
            .incoming_args
            .get(index as usize)
            .copied()
            .unwrap_or(CLEAN);
        let len = frame.args.len();
        let slot = frame
            .args
            .get_mut(index as usize)
            .ok_or(StoreError::IndexOutOfBounds {
                kind: "argument",
                index,
                len,
            })?;
        *slot = flag;
        Ok(())
    }

    pub fn bind_incoming_this(&mut self) -> StoreResult<()> {
        let frame = self.current_mut()?;
        frame.this = frame.incoming_this;
        Ok(())
    }

    /// Stage argument `index` of the next entry call as symbolic
    pub fn mark_entry_argument_symbolic(&mut self, index: u32) {
        self.set_staged_arg_flag(index, super::types::SYMBOLIC);
    }

    /// Stage the receiver of the next entry call as symbolic
    pub fn mark_entry_receiver_symbolic(&mut self) {
        self.set_staged_this_flag(super::types::SYMBOLIC);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Frame flags
    // ═══════════════════════════════════════════════════════════════════════

    pub fn get_local_flag(&self, index: u32) -> StoreResult<Flag> {
        let frame = self.current()?;
        frame
            .locals
            .get(index as usize)
            .copied()
            .ok_or(StoreError::IndexOutOfBounds {
                kind: "local",
                index,
                len: frame.locals.len(),
            })
    }

    pub fn set_local_flag(&mut self, index: u32, flag: Flag) -> StoreResult<()> {
        let frame = self.current_mut()?;
        let len = frame.locals.len();
        let slot = frame
            .locals
            .get_mut(index as usize)
            .ok_or(StoreError::IndexOutOfBounds {
                kind: "local",
                index,
                len,
            })?;
        *slot = flag;
        Ok(())
    }

    pub fn get_arg_flag(&self, index: u32) -> StoreResult<Flag> {
        let frame = self.current()?;
        frame
            .args
            .get(index as usize)
            .copied()
            .ok_or(StoreError::IndexOutOfBounds {
                kind: "argument",
                index,
                len: frame.args.len(),
            })
    }

    pub fn set_arg_flag(&mut self, index: u32, flag: Flag) -> StoreResult<()> {
        let frame = self.current_mut()?;
        let len = frame.args.len();
        let slot = frame
            .args
            .get_mut(index as usize)
            .ok_or(StoreError::IndexOutOfBounds {
                kind: "argument",
                index,
                len,
            })?;
        *slot = flag;
        Ok(())
    }

    pub fn get_this_flag(&self) -> StoreResult<Flag> {
        Ok(self.current()?.this)
    }

    pub fn set_this_flag(&mut self, flag: Flag) -> StoreResult<()> {
        self.current_mut()?.this = flag;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Heap and static flags
    // ═══════════════════════════════════════════════════════════════════════

    /// Flag of `slot` on `object`; a null object reads clean
    pub fn get_heap_flag(&self, object: Option<ObjectHandle>, slot: u32) -> Flag {
        object
            .and_then(|handle| self.heap_flags.get(&handle))
            .and_then(|slots| slots.get(&slot))
            .copied()
            .unwrap_or(CLEAN)
    }

    /// Entries are created only for nonzero flags
    pub fn set_heap_flag(&mut self, object: Option<ObjectHandle>, slot: u32, flag: Flag) {
        let Some(handle) = object else {
            return;
        };
        match self.heap_flags.get_mut(&handle) {
            Some(slots) => {
                if flag != CLEAN || slots.contains_key(&slot) {
                    slots.insert(slot, flag);
                }
            }
            None if flag != CLEAN => {
                let mut slots = FxHashMap::default();
                slots.insert(slot, flag);
                self.heap_flags.insert(handle, slots);
            }
            None => {}
        }
    }

    pub fn get_static_flag(&self, slot: u32) -> Flag {
        self.static_flags
            .get(slot as usize)
            .copied()
            .unwrap_or(CLEAN)
    }

    pub fn set_static_flag(&mut self, slot: u32, flag: Flag) {
        let index = slot as usize;
        if index >= self.static_flags.len() {
            let mut len = self.static_flags.len().max(1);
            while index >= len {
                len *= 2;
            }
            self.static_flags.resize(len, CLEAN);
            trace!(capacity = len, "Static flag table grown");
        }
        self.static_flags[index] = flag;
    }

    /// Objects holding at least one flag entry
    pub fn heap_object_count(&self) -> usize {
        self.heap_flags.len()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Return channel
    // ═══════════════════════════════════════════════════════════════════════

    /// Called by the returning frame before it pops
    pub fn set_return_flag(&mut self, flag: Flag) {
        self.return_flag = flag;
        self.return_token = self.current().map(|frame| frame.token).unwrap_or(0);
    }

    /// Read and clear the return register
    ///
    /// The flag is handed out only if it was set by the frame answering the
    /// current frame's most recent call; anything else reads clean.
    pub fn take_return_flag(&mut self) -> Flag {
        let flag = std::mem::replace(&mut self.return_flag, CLEAN);
        let token = std::mem::replace(&mut self.return_token, 0);
        let pending = self.current().map(|frame| frame.pending_token).unwrap_or(0);
        if token != 0 && token == pending {
            flag
        } else {
            CLEAN
        }
    }

    /// No trace, no active or staged frame and no flag anywhere
    pub fn is_pristine(&self) -> bool {
        self.trace_ptr == 0
            && self.sp == -1
            && self.static_accesses.is_empty()
            && self.return_flag == CLEAN
            && self.return_token == 0
            && self.heap_flags.values().all(|slots| slots.values().all(|f| *f == CLEAN))
            && self.static_flags.iter().all(|f| *f == CLEAN)
            && self.frames.iter().all(FrameSlot::is_empty)
    }

    fn current(&self) -> StoreResult<&FrameSlot> {
        if self.sp < 0 {
            return Err(StoreError::NoActiveFrame);
        }
        Ok(&self.frames[self.sp as usize])
    }

    fn current_mut(&mut self) -> StoreResult<&mut FrameSlot> {
        if self.sp < 0 {
            return Err(StoreError::NoActiveFrame);
        }
        Ok(&mut self.frames[self.sp as usize])
    }

    fn next_slot(&mut self) -> &mut FrameSlot {
        let depth = (self.sp + 1) as usize;
        self.ensure_frame_slot(depth);
        &mut self.frames[depth]
    }

    fn ensure_frame_slot(&mut self, depth: usize) {
        if depth < self.frames.len() {
            return;
        }
        let mut len = self.frames.len().max(1);
        while depth >= len {
            len *= 2;
        }
        self.frames.resize_with(len, FrameSlot::default);
        trace!(capacity = len, "Shadow frame stack grown");
    }
}
