pub mod heap;
pub mod interpreter;
pub mod operations;
mod store_dispatch;

pub use heap::Heap;
pub use interpreter::{Interpreter, MAX_CALL_DEPTH};
