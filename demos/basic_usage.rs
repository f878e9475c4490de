// ============================================================================
// Basic Usage Example
// ============================================================================

use bigreal::prelude::*;

fn main() {
    #[cfg(feature = "logging")]
    bigreal::utils::init_logging(tracing::Level::DEBUG);

    println!("=== BigReal Example ===\n");

    // Work at 256 bits, print 40 significant digits
    let _guard = Context::new(256).with_output_precision(40).enter();
    let ctx = Context::current();
    println!("Working precision: {} bits ({} digits)\n", ctx.precision(), ctx.digits10());

    // Exact construction from native values
    let big = Real::from(u128::MAX);
    let third = Real::from(1) / Real::from(3);
    let tenth = Real::from_f64(0.1).unwrap();
    println!("u128::MAX   = {}", big);
    println!("1/3         = {}", third);
    println!("0.1 (f64)   = {}", tenth);
    println!("inf         -> {:?}\n", Real::from_f64(f64::INFINITY));

    // Constants and fallback functions
    let pi = Real::pi();
    println!("pi          = {}", pi);
    println!("e           = {}", Real::e());
    println!("asin(1/2)   = {}", Real::from_f64(0.5).unwrap().asin().unwrap());
    println!("acos(-1/2)  = {}", Real::from_f64(-0.5).unwrap().acos().unwrap());
    println!("atan(2)     = {}", Real::from(2).atan().unwrap());
    println!("tanh(1)     = {}", Real::one().tanh().unwrap());
    println!("fmod(10, pi) = {}\n", Real::from(10).fmod(&pi).unwrap());

    // Capability records
    let traits = NumericTraits::<Real>::REAL;
    println!("digits      = {}", (traits.digits)(&ctx));
    println!("epsilon     = {}", (traits.epsilon)(&ctx));
    println!("log max     = {}\n", (traits.log_max_value)(&ctx));

    // Generic root refinement: cube root of 10
    let ten = Real::from(10);
    let mut iterations = u64::from(ctx.precision());
    let root = halley_iterate(
        |x: &Real| {
            let x2 = x * x;
            (&(&x2 * x) - &ten, &Real::from(3) * &x2, &Real::from(6) * x)
        },
        Real::from(2),
        Real::one(),
        Real::from(3),
        ctx.precision(),
        &mut iterations,
    );
    println!("cbrt(10)    = {} after {} iterations\n", root, iterations);

    // Packed archive round trip
    let mut out = PackedOArchive::new(ArchiveFlags::with_header());
    out.pack(&pi).pack(&root);
    let bytes = out.into_bytes();
    let mut input = PackedIArchive::new(&bytes, ArchiveFlags::with_header()).unwrap();
    let pi_back: Real = input.unpack().unwrap();
    let root_back: Real = input.unpack().unwrap();
    println!("Archive: {} bytes, values intact: {}", bytes.len(), pi_back == pi && root_back == root);

    // Casting back out
    println!("\nreal_cast::<f64>(pi) = {}", real_cast::<f64>(&pi));
    println!("real_cast::<i64>(1e15 * pi) = {}", real_cast::<i64>(&(&pi * &Real::from(1_000_000_000_000_000i64))));
}
