// ============================================================================
// Domain Models Module
// Precision configuration shared by all real-number operations
// ============================================================================

pub mod context;

pub use context::{
    Context, ContextGuard, DEFAULT_OUTPUT_PRECISION, DEFAULT_PRECISION, MIN_PRECISION,
};
