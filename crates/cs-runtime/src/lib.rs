//! codeslim runtime — collaborators around the optimizer pipeline.
//!
//! - [`rewrite`]: callables that minify their own source on first call
//! - [`dual`]: store readable and minified variants side by side
//! - [`memory`]: peak-memory measurement in a child interpreter
//! - [`loader`]: run a rewritten Python definition

pub mod dual;
pub mod loader;
pub mod memory;
pub mod rewrite;

pub use dual::{DualArtifactProducer, DualArtifactReport};
pub use loader::PythonLoader;
pub use memory::{measure_or_zero, MemoryMeter, PythonMemoryMeter};
pub use rewrite::{Behavior, BehaviorLoader, OptimizeOnLoad, SelfRewriting, SourceProvider};
