// ============================================================================
// Root Refinement
// Derivative-based root polishing within a bracket
// ============================================================================

use crate::interfaces::RootScalar;

/// Step taken when the first derivative vanishes: halve the distance toward
/// the bracket end suggested by the residual signs.
fn handle_zero_derivative<T, F>(
    mut residual_at: F,
    last_f0: &mut T,
    f0: &T,
    delta: &mut T,
    result: &T,
    min: &T,
    max: &T,
) where
    T: RootScalar,
    F: FnMut(&T) -> T,
{
    let zero = T::from_f64(0.0);
    let two = T::from_f64(2.0);

    if last_f0.is_zero() {
        // First iteration: pretend the previous one sat at the far bracket end.
        let far_end = if result == min { max.clone() } else { min.clone() };
        *last_f0 = residual_at(&far_end);
        *delta = far_end - result.clone();
    }

    let crossed = (*last_f0 < zero) != (*f0 < zero);
    let toward_min = if crossed { *delta < zero } else { *delta >= zero };
    *delta = if toward_min {
        (result.clone() - min.clone()) / two
    } else {
        (result.clone() - max.clone()) / two
    };
}

/// Whether stepping from inside the bracket to `result` overshot `bound` by
/// less than a factor of three.
fn small_overshoot<T: RootScalar>(result: &T, bound: &T) -> bool {
    let one = T::from_f64(1.0);
    if bound.is_zero() || result.is_zero() {
        return false;
    }
    let diff = if bound.abs() < one
        && result.abs() > one
        && T::max_value() / result.abs() < bound.abs()
    {
        T::from_f64(1000.0)
    } else {
        result.clone() / bound.clone()
    };
    let diff = if diff.abs() < one { one / diff } else { diff };
    diff > T::from_f64(0.0) && diff < T::from_f64(3.0)
}

/// Refine a root of `f` with Halley's method.
///
/// `f` returns the value and first two derivatives at a point. The search
/// stays within `[min, max]` and stops once the step is below
/// `|result| * 2^(1 - digits)`, the residual is exactly zero, or `max_iter`
/// evaluations have been spent. On return `max_iter` holds the number of
/// evaluations used.
///
/// # Example
/// ```
/// use bigreal::engine::halley_iterate;
///
/// let mut iterations = 50;
/// let root = halley_iterate(
///     |x: &f64| (x * x * x - 27.0, 3.0 * x * x, 6.0 * x),
///     2.0,
///     0.0,
///     10.0,
///     50,
///     &mut iterations,
/// );
/// assert!((root - 3.0).abs() < 1e-12);
/// ```
pub fn halley_iterate<T, F>(
    mut f: F,
    guess: T,
    min: T,
    max: T,
    digits: u32,
    max_iter: &mut u64,
) -> T
where
    T: RootScalar,
    F: FnMut(&T) -> (T, T, T),
{
    let zero = T::from_f64(0.0);
    let two = T::from_f64(2.0);
    let factor = T::ldexp_one(1 - digits.min(i32::MAX as u32) as i32);

    let mut guess = guess;
    let mut min = min;
    let mut max = max;
    let mut result = guess.clone();

    // Arbitrarily large first step so the first convergence test passes.
    let large = T::from_f64(10_000_000.0);
    let mut delta = {
        let scaled = large.clone() * guess.clone();
        if scaled > large {
            scaled
        } else {
            large
        }
    };
    let mut delta1 = delta.clone();
    let mut f0 = zero.clone();
    let mut out_of_bounds_sentry = false;
    let mut count = *max_iter;

    loop {
        let mut last_f0 = f0.clone();
        let delta2 = delta1.clone();
        delta1 = delta.clone();

        let (value, f1, f2) = f(&result);
        f0 = value;
        count = count.saturating_sub(1);
        if f0.is_zero() {
            break;
        }

        if f1.is_zero() {
            handle_zero_derivative(
                |x: &T| f(x).0,
                &mut last_f0,
                &f0,
                &mut delta,
                &result,
                &min,
                &max,
            );
        } else if !f2.is_zero() {
            let denom = two.clone() * f0.clone();
            let num = two.clone() * f1.clone() - f0.clone() * (f2 / f1.clone());
            delta = if num.is_zero()
                || (num.abs() < T::from_f64(1.0) && denom.abs() >= num.abs() * T::max_value())
            {
                // Halley step would overflow
                f0.clone() / f1.clone()
            } else {
                denom / num
            };
            if delta.clone() * f1.clone() / f0.clone() < zero {
                // Newton and Halley disagree on direction; trust Newton but
                // cap the jump at twice the current guess.
                delta = f0.clone() / f1.clone();
                let cap = two.clone() * guess.abs();
                if !cap.is_zero() && delta.abs() > cap {
                    delta = if delta < zero { -cap } else { cap };
                }
            }
        } else {
            delta = f0.clone() / f1.clone();
        }

        if !delta2.is_zero() {
            let convergence = (delta.clone() / delta2.clone()).abs();
            if convergence > T::from_f64(0.8) && convergence < two {
                // Last two steps did not converge; bisect instead.
                delta = if delta > zero {
                    (result.clone() - min.clone()) / two.clone()
                } else {
                    (result.clone() - max.clone()) / two.clone()
                };
                // Keep this branch from firing again next time round.
                delta1 = delta.clone() * T::from_f64(3.0);
            }
        }

        guess = result.clone();
        result = result - delta.clone();

        if result < min || result > max {
            let bound = if result < min { min.clone() } else { max.clone() };
            if !out_of_bounds_sentry && small_overshoot(&result, &bound) {
                // Probably just past the bound; land close to it once.
                delta = T::from_f64(0.99) * (guess.clone() - bound);
                result = guess.clone() - delta.clone();
                out_of_bounds_sentry = true;
            } else {
                delta = (guess.clone() - bound) / two.clone();
                result = guess.clone() - delta.clone();
                if result == min || result == max {
                    break;
                }
            }
        }

        if delta > zero {
            max = guess.clone();
        } else {
            min = guess.clone();
        }

        if count == 0 || (result.clone() * factor.clone()).abs() >= delta.abs() {
            break;
        }
    }

    let used = *max_iter - count;
    tracing::trace!(iterations = used, budget = *max_iter, "halley_iterate finished");
    *max_iter = used;
    result
}

/// Refine a root of `f` with Newton-Raphson steps.
///
/// Same contract as [`halley_iterate`] with `f` returning the value and the
/// first derivative.
pub fn newton_raphson_iterate<T, F>(
    mut f: F,
    guess: T,
    min: T,
    max: T,
    digits: u32,
    max_iter: &mut u64,
) -> T
where
    T: RootScalar,
    F: FnMut(&T) -> (T, T),
{
    let zero = T::from_f64(0.0);
    let half = T::from_f64(0.5);
    let factor = T::ldexp_one(1 - digits.min(i32::MAX as u32) as i32);

    let mut guess = guess;
    let mut min = min;
    let mut max = max;
    let mut result = guess.clone();

    let mut delta = T::from_f64(1.0);
    let mut delta1 = T::max_value();
    let mut f0 = zero.clone();
    let mut count = *max_iter;

    loop {
        let mut last_f0 = f0.clone();
        let delta2 = delta1.clone();
        delta1 = delta.clone();

        let (value, f1) = f(&result);
        f0 = value;
        count = count.saturating_sub(1);
        if f0.is_zero() {
            break;
        }

        if f1.is_zero() {
            handle_zero_derivative(
                |x: &T| f(x).0,
                &mut last_f0,
                &f0,
                &mut delta,
                &result,
                &min,
                &max,
            );
        } else {
            delta = f0.clone() / f1;
        }

        if (delta.clone() * T::from_f64(2.0)).abs() > delta2.abs() {
            // Last two steps did not converge; bisect instead.
            delta = if delta > zero {
                (result.clone() - min.clone()) * half.clone()
            } else {
                (result.clone() - max.clone()) * half.clone()
            };
        }

        guess = result.clone();
        result = result - delta.clone();

        if result <= min || result >= max {
            let bound = if result <= min { min.clone() } else { max.clone() };
            delta = half.clone() * (guess.clone() - bound);
            result = guess.clone() - delta.clone();
            if result == min || result == max {
                break;
            }
        }

        if delta > zero {
            max = guess.clone();
        } else {
            min = guess.clone();
        }

        if count == 0 || (result.clone() * factor.clone()).abs() >= delta.abs() {
            break;
        }
    }

    let used = *max_iter - count;
    tracing::trace!(iterations = used, budget = *max_iter, "newton_raphson_iterate finished");
    *max_iter = used;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Context;
    use crate::numeric::Real;

    #[test]
    fn test_halley_cube_root() {
        let mut iterations = 50;
        let root = halley_iterate(
            |x: &f64| (x * x * x - 27.0, 3.0 * x * x, 6.0 * x),
            2.0,
            0.0,
            10.0,
            52,
            &mut iterations,
        );
        assert!((root - 3.0).abs() < 1e-12);
        assert!(iterations < 50);
    }

    #[test]
    fn test_halley_sqrt_two() {
        let mut iterations = 50;
        let root = halley_iterate(
            |x: &f64| (x * x - 2.0, 2.0 * x, 2.0),
            1.0,
            0.0,
            2.0,
            52,
            &mut iterations,
        );
        assert!((root - std::f64::consts::SQRT_2).abs() < 1e-14);
    }

    #[test]
    fn test_halley_zero_derivative_at_guess() {
        let mut iterations = 100;
        let root = halley_iterate(
            |x: &f64| (x * x - 4.0, 2.0 * x, 2.0),
            0.0,
            0.0,
            5.0,
            52,
            &mut iterations,
        );
        assert!((root - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_halley_exact_root_stops_immediately() {
        let mut iterations = 20;
        let root = halley_iterate(
            |x: &f64| (x - 1.5, 1.0, 0.0),
            1.5,
            0.0,
            3.0,
            52,
            &mut iterations,
        );
        assert_eq!(root, 1.5);
        assert_eq!(iterations, 1);
    }

    #[test]
    fn test_halley_respects_budget() {
        let mut iterations = 3;
        let _ = halley_iterate(
            |x: &f64| (x.exp() - 10.0, x.exp(), x.exp()),
            0.0,
            -10.0,
            10.0,
            52,
            &mut iterations,
        );
        assert!(iterations <= 3);
    }

    #[test]
    fn test_newton_sqrt_two() {
        let mut iterations = 50;
        let root = newton_raphson_iterate(
            |x: &f64| (x * x - 2.0, 2.0 * x),
            1.0,
            0.0,
            2.0,
            52,
            &mut iterations,
        );
        assert!((root - std::f64::consts::SQRT_2).abs() < 1e-14);
    }

    #[test]
    fn test_halley_on_real() {
        let _guard = Context::new(200).enter();
        let two = Real::from(2);
        let three = Real::from(3);
        let mut iterations = 200;
        let root = halley_iterate(
            |x: &Real| {
                let x2 = x * x;
                (&(&x2 * x) - &two, &three * &x2, &Real::from(6) * x)
            },
            Real::from_f64(1.26).unwrap(),
            Real::one(),
            Real::from(2),
            200,
            &mut iterations,
        );
        let cube = &(&root * &root) * &root;
        let error = (&cube - &two).abs();
        assert!(error < Real::one().ldexp(-190));
    }
}
