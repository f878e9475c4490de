// ============================================================================
// Numeric Module
// Arbitrary-precision binary floating point and the Real adapter
// ============================================================================
//
// This module provides:
// - BigFloat: mantissa x 2^exponent with explicit rounding precision
// - elementary: exp/ln/sin/cos/pow on BigFloat at a given precision
// - Real: the adapter type following the active Context
// - NumericError: Error types for arithmetic operations
//
// Design principles:
// - Every rounded operation takes its precision explicitly
// - Fallible maths returns Result; operators mirror integer semantics
// - Values never change after construction

mod big_float;
mod errors;
mod real;

pub mod elementary;

pub use big_float::{BigFloat, EXPONENT_LIMIT};
pub use errors::{NumericError, NumericResult};
pub use real::{real_cast, Real, RealCast};
