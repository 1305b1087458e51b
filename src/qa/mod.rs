//! Question-answering engine over a loaded transcript.
//!
//! Owns the load/answer pipeline: chunk -> embed -> index at load time,
//! retrieve -> render -> generate at answer time.

mod context;
mod engine;

pub use context::format_context;
pub use engine::{QaEngine, QaState};
