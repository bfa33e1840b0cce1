//! Calls into the shadow trace store, resolved by method name
//!
//! Flags arrive as bytes, ids as longs carrying the raw 64 bits, indices and
//! slots as ints. A null object reads as `None`; strings have no identity
//! and read as `None` too.

use super::interpreter::Interpreter;
use crate::features::call_builder::StoreMethod;
use crate::features::encoding::{InstructionId, StaticAccessId};
use crate::features::interpreter::domain::{ExecutionError, ExecutionResult};
use crate::features::shadow_store::{ConcreteValue, Flag, ObjectHandle};

struct StoreArgs<'v> {
    method: StoreMethod,
    values: &'v [ConcreteValue],
}

impl<'v> StoreArgs<'v> {
    fn value(&self, index: usize) -> ExecutionResult<&'v ConcreteValue> {
        self.values.get(index).ok_or(ExecutionError::BadStoreArgument {
            method: self.method.name(),
            index,
        })
    }

    fn integral(&self, index: usize) -> ExecutionResult<i64> {
        self.value(index)?
            .as_long()
            .ok_or(ExecutionError::BadStoreArgument {
                method: self.method.name(),
                index,
            })
    }

    /// Negative or oversized values are rejected, never wrapped
    fn int(&self, index: usize) -> ExecutionResult<u32> {
        u32::try_from(self.integral(index)?).map_err(|_| ExecutionError::BadStoreArgument {
            method: self.method.name(),
            index,
        })
    }

    fn flag(&self, index: usize) -> ExecutionResult<Flag> {
        Ok(self.integral(index)? as u8)
    }

    fn id(&self, index: usize) -> ExecutionResult<u64> {
        Ok(self.integral(index)? as u64)
    }

    fn object(&self, index: usize) -> ExecutionResult<Option<ObjectHandle>> {
        Ok(self.value(index)?.as_handle())
    }
}

fn flag_value(flag: Flag) -> Option<ConcreteValue> {
    Some(ConcreteValue::Byte(flag as i8))
}

impl<'a> Interpreter<'a> {
    pub(super) fn dispatch_store(
        &mut self,
        name: &str,
        values: &[ConcreteValue],
    ) -> ExecutionResult<Option<ConcreteValue>> {
        let method = StoreMethod::from_name(name)
            .ok_or_else(|| ExecutionError::UnknownStoreMethod(name.to_string()))?;
        let args = StoreArgs { method, values };
        let store = &mut *self.store;

        match method {
            StoreMethod::PushFrame => {
                store.push_frame(args.int(0)?, args.int(1)?, args.int(2)?)
            }
            StoreMethod::PopFrame => store.pop_frame()?,
            StoreMethod::StageCall => store.stage_call(args.int(0)?, args.int(1)?),
            StoreMethod::SetStagedArgFlag => store.set_staged_arg_flag(args.int(0)?, args.flag(1)?),
            StoreMethod::SetStagedThisFlag => store.set_staged_this_flag(args.flag(0)?),
            StoreMethod::BindIncomingArg => store.bind_incoming_arg(args.int(0)?)?,
            StoreMethod::BindIncomingThis => store.bind_incoming_this()?,
            StoreMethod::GetLocalFlag => return Ok(flag_value(store.get_local_flag(args.int(0)?)?)),
            StoreMethod::SetLocalFlag => store.set_local_flag(args.int(0)?, args.flag(1)?)?,
            StoreMethod::GetArgFlag => return Ok(flag_value(store.get_arg_flag(args.int(0)?)?)),
            StoreMethod::SetArgFlag => store.set_arg_flag(args.int(0)?, args.flag(1)?)?,
            StoreMethod::GetThisFlag => return Ok(flag_value(store.get_this_flag()?)),
            StoreMethod::SetThisFlag => store.set_this_flag(args.flag(0)?)?,
            StoreMethod::GetHeapFlag => {
                return Ok(flag_value(store.get_heap_flag(args.object(0)?, args.int(1)?)))
            }
            StoreMethod::SetHeapFlag => {
                store.set_heap_flag(args.object(0)?, args.int(1)?, args.flag(2)?)
            }
            StoreMethod::GetStaticFlag => return Ok(flag_value(store.get_static_flag(args.int(0)?))),
            StoreMethod::SetStaticFlag => store.set_static_flag(args.int(0)?, args.flag(1)?),
            StoreMethod::RecordInstruction => store.record_instruction(InstructionId(args.id(0)?)),
            StoreMethod::RecordConcreteArgument => {
                store.record_concrete_argument(args.int(0)?, args.value(1)?.clone())?
            }
            StoreMethod::RecordStaticAccess => {
                store.record_static_access(StaticAccessId(args.id(0)?))
            }
            StoreMethod::SetReturnFlag => store.set_return_flag(args.flag(0)?),
            StoreMethod::TakeReturnFlag => return Ok(flag_value(store.take_return_flag())),
        }
        Ok(None)
    }
}
