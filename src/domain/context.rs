// ============================================================================
// Precision Context
// Working precision and output precision for real-number arithmetic
// ============================================================================

use parking_lot::RwLock;
use std::cell::Cell;
use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smallest working precision in bits (one IEEE double mantissa).
pub const MIN_PRECISION: u32 = 53;

/// Working precision used until something else is configured.
pub const DEFAULT_PRECISION: u32 = 150;

/// Significant decimal digits printed by default.
pub const DEFAULT_OUTPUT_PRECISION: u32 = 10;

// ============================================================================
// Context
// ============================================================================

/// Precision settings seen by every operation on real values.
///
/// A context is a plain value. It becomes the *active* context of the current
/// thread for as long as the guard returned by [`Context::enter`] lives; when
/// no scope is active, the process default applies.
///
/// # Example
/// ```
/// use bigreal::domain::Context;
///
/// let ctx = Context::new(300).with_output_precision(40);
/// {
///     let _guard = ctx.enter();
///     assert_eq!(Context::current().precision(), 300);
/// }
/// assert_eq!(Context::current().precision(), Context::default_context().precision());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Context {
    /// Working precision in bits
    precision: u32,

    /// Significant decimal digits used by `Display`
    output_precision: u32,
}

static PROCESS_DEFAULT: RwLock<Context> = RwLock::new(Context {
    precision: DEFAULT_PRECISION,
    output_precision: DEFAULT_OUTPUT_PRECISION,
});

thread_local! {
    static ACTIVE: Cell<Option<Context>> = const { Cell::new(None) };
}

fn clamp_precision(precision: u32) -> u32 {
    if precision < MIN_PRECISION {
        tracing::warn!(
            requested = precision,
            minimum = MIN_PRECISION,
            "working precision below minimum, clamping"
        );
        MIN_PRECISION
    } else {
        precision
    }
}

fn log_default_change(ctx: &Context) {
    tracing::debug!(
        precision = ctx.precision,
        output_precision = ctx.output_precision,
        "process default precision changed"
    );
}

impl Context {
    /// Create a context with the given working precision in bits.
    ///
    /// Precisions below [`MIN_PRECISION`] are clamped.
    pub fn new(precision: u32) -> Self {
        Self {
            precision: clamp_precision(precision),
            output_precision: DEFAULT_OUTPUT_PRECISION,
        }
    }

    /// Builder method: Set the number of significant digits printed
    pub fn with_output_precision(mut self, digits: u32) -> Self {
        self.set_output_precision(digits);
        self
    }

    /// Working precision in bits.
    #[inline]
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Change the working precision. Existing values are unaffected.
    pub fn set_precision(&mut self, precision: u32) {
        self.precision = clamp_precision(precision);
    }

    /// Significant decimal digits used for text output.
    #[inline]
    pub fn output_precision(&self) -> u32 {
        self.output_precision
    }

    pub fn set_output_precision(&mut self, digits: u32) {
        self.output_precision = digits.max(1);
    }

    /// Decimal digits that survive a round trip through this precision.
    pub fn digits10(&self) -> u32 {
        // floor((bits - 1) * log10(2))
        ((u64::from(self.precision) - 1) * 30_103 / 100_000) as u32
    }

    // ========================================================================
    // Process Default
    // ========================================================================

    /// The context used when no scope is active.
    pub fn default_context() -> Self {
        *PROCESS_DEFAULT.read()
    }

    /// Replace the process default.
    pub fn set_default(ctx: Context) {
        log_default_change(&ctx);
        *PROCESS_DEFAULT.write() = ctx;
    }

    /// Apply `update` to the process default.
    pub fn update_default(update: impl FnOnce(&mut Context)) {
        let mut guard = PROCESS_DEFAULT.write();
        update(&mut guard);
        log_default_change(&guard);
    }

    // ========================================================================
    // Scoping
    // ========================================================================

    /// The context active on this thread.
    pub fn current() -> Self {
        ACTIVE
            .with(Cell::get)
            .unwrap_or_else(Self::default_context)
    }

    /// Make this context active on the current thread until the guard drops.
    #[must_use = "the context is deactivated as soon as the guard is dropped"]
    pub fn enter(self) -> ContextGuard {
        let previous = ACTIVE.with(|active| active.replace(Some(self)));
        ContextGuard {
            previous,
            _not_send: PhantomData,
        }
    }

    /// Run `f` with this context active.
    pub fn scoped<R>(self, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter();
        f()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

// ============================================================================
// Context Guard
// ============================================================================

/// Restores the previously active context when dropped.
#[derive(Debug)]
pub struct ContextGuard {
    previous: Option<Context>,
    // Tied to the thread whose context it replaced.
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| active.set(self.previous));
    }
}
