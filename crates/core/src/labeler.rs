//! Labeler trait — maps input text to a verdict.
//!
//! The bundled implementation is randomized on purpose: the same text is
//! not guaranteed to produce the same label twice. The only contract is
//! closure — every input gets exactly one label, with no error path.

use crate::record::Label;

/// The core Labeler trait.
pub trait Labeler: Send + Sync {
    /// The labeler name (e.g., "heuristic").
    fn name(&self) -> &str;

    /// Produce a verdict for the given text. Infallible.
    fn label(&self, text: &str) -> Label;
}
