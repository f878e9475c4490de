// ============================================================================
// Utilities Module
// Chunk decomposition and logging helpers
// ============================================================================

pub mod chunking;

#[cfg(feature = "logging")]
mod logging;

pub use chunking::{float_chunks, int_chunks, FloatChunk, FLOAT_CHUNK_BITS, INT_CHUNK_BITS};

#[cfg(feature = "logging")]
pub use logging::init_logging;
