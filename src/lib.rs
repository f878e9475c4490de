// ============================================================================
// BigReal Library
// Arbitrary-precision real numbers for generic numeric algorithms
// ============================================================================

//! # BigReal
//!
//! An arbitrary-precision binary real type that plugs into generic numeric
//! code: root finders, special functions and anything else written against
//! a small scalar contract.
//!
//! ## Features
//!
//! - **Explicit precision contexts** with a process default and scoped
//!   per-thread overrides
//! - **Exact construction** from native integers and floats by chunked
//!   accumulation
//! - **Fallback transcendental functions** (`asin`, `acos`, `atan`,
//!   hyperbolics, `fmod`) built on Halley root refinement
//! - **Capability records** exposing digits, extremes, epsilon and
//!   constants per numeric type
//! - **Packed archives** for moving values between processes
//!
//! ## Example
//!
//! ```rust
//! use bigreal::prelude::*;
//!
//! // Work at 256 bits until the guard drops
//! let _guard = Context::new(256).with_output_precision(30).enter();
//!
//! let half = Real::from(1) / Real::from(2);
//! let angle = half.asin().unwrap();
//! let sixth_of_pi = Real::pi() / Real::from(6);
//! assert!((&angle - &sixth_of_pi).abs() < Real::one().ldexp(-240));
//!
//! println!("asin(1/2) = {}", angle);
//! println!("epsilon   = {}", (NumericTraits::<Real>::REAL.epsilon)(&Context::current()));
//! ```

pub mod archive;
pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod numeric;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::archive::{ArchiveError, ArchiveFlags, Packable, PackedIArchive, PackedOArchive};
    pub use crate::domain::{Context, ContextGuard};
    pub use crate::engine::{halley_iterate, newton_raphson_iterate};
    pub use crate::interfaces::{NumericTraits, RootScalar};
    pub use crate::numeric::{real_cast, BigFloat, NumericError, NumericResult, Real, RealCast};
}
