pub mod session;

pub use session::{ConcolicRun, ConcolicSession, CoverageRun, EntryCall};
