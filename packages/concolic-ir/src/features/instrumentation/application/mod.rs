pub mod class_instrumenter;

pub use class_instrumenter::ClassInstrumenter;
