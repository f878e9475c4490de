// ============================================================================
// Round Trip Tests
// Conversions and archives that must give back exactly what went in
// ============================================================================

use bigreal::prelude::*;
use quickcheck::quickcheck;

fn pack_and_unpack(values: &[Real]) -> Vec<Real> {
    let mut out = PackedOArchive::new(ArchiveFlags::default());
    for value in values {
        out.pack(value);
    }
    let bytes = out.into_bytes();
    let mut input = PackedIArchive::new(&bytes, ArchiveFlags::default()).unwrap();
    let decoded = values.iter().map(|_| input.unpack::<Real>().unwrap()).collect();
    assert!(input.is_exhausted());
    decoded
}

quickcheck! {
    fn isize_round_trip(n: isize) -> bool {
        real_cast::<i64>(&Real::from(n)) == n as i64
    }

    fn small_types_are_exact(a: i8, b: u8, c: i16, d: u16) -> bool {
        Real::from(a).to_i64() == Some(i64::from(a))
            && Real::from(b).to_i64() == Some(i64::from(b))
            && Real::from(c).to_i64() == Some(i64::from(c))
            && Real::from(d).to_i64() == Some(i64::from(d))
    }

    fn char_is_code_point(c: char) -> bool {
        Real::from(c).to_u64() == Some(u64::from(u32::from(c)))
    }

    fn archive_preserves_scaled_integers(mantissa: i64, shift: i16) -> bool {
        let value = Real::from(mantissa).ldexp(i64::from(shift));
        pack_and_unpack(std::slice::from_ref(&value)) == vec![value]
    }

    fn archive_preserves_quotients(a: i32, b: i32) -> bool {
        if b == 0 {
            return true;
        }
        let values = Context::new(333).scoped(|| {
            vec![Real::from(a) / Real::from(b), Real::from(b), Real::zero()]
        });
        pack_and_unpack(&values) == values
    }

    fn archive_preserves_primitives(flag: bool, n: i64, s: String, f: f64) -> bool {
        let mut out = PackedOArchive::new(ArchiveFlags::with_header());
        out.pack(&flag).pack(&n).pack(&s).pack(&f);
        let bytes = out.into_bytes();
        let mut input = match PackedIArchive::new(&bytes, ArchiveFlags::with_header()) {
            Ok(input) => input,
            Err(_) => return false,
        };
        input.unpack::<bool>() == Ok(flag)
            && input.unpack::<i64>() == Ok(n)
            && input.unpack::<String>().as_deref() == Ok(s.as_str())
            && input.unpack::<f64>().map(f64::to_bits) == Ok(f.to_bits())
    }

    fn decimal_round_trip(units: i64, scale: u8) -> bool {
        let d = rust_decimal::Decimal::new(units, u32::from(scale % 19));
        let value = Real::from_decimal(d);
        value.to_decimal() == Ok(d)
    }
}
