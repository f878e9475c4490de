// ============================================================================
// Engine Module
// Root refinement, fallback transcendental functions and numeric limits
// ============================================================================

mod roots;

pub mod hyperbolic;
pub mod inverse_trig;
pub mod limits;

pub use roots::{halley_iterate, newton_raphson_iterate};
