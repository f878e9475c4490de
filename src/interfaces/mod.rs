// ============================================================================
// Interfaces Module
// Capability records and the contracts generic algorithms rely on
// ============================================================================

mod numeric_traits;

pub use numeric_traits::{NumericTraits, RootScalar};
