// ============================================================================
// Packed Archives
// Flat little-endian byte buffers for shipping values between processes
// ============================================================================

use crate::numeric::{BigFloat, Real};
use num_bigint::{BigInt, Sign};
use std::fmt;

/// Leading bytes of an archive written with a header.
pub const ARCHIVE_MAGIC: [u8; 4] = *b"BRPK";

/// Format version written after the magic.
pub const ARCHIVE_VERSION: u8 = 1;

const TAG_ZERO: u8 = 0;
const TAG_POSITIVE: u8 = 1;
const TAG_NEGATIVE: u8 = 2;

// ============================================================================
// Errors and Flags
// ============================================================================

/// Errors raised while reading a packed archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveError {
    /// The buffer ended in the middle of a value
    UnexpectedEnd,
    /// A tag byte had no meaning at its position
    InvalidTag(u8),
    /// Missing or mismatched magic/version
    InvalidHeader,
    /// String payload is not UTF-8
    InvalidUtf8,
    /// Real payload is not normalized or lies outside the exponent range
    InvalidReal,
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::UnexpectedEnd => write!(f, "archive ended unexpectedly"),
            ArchiveError::InvalidTag(tag) => write!(f, "invalid tag byte {tag:#04x}"),
            ArchiveError::InvalidHeader => write!(f, "archive header missing or unsupported"),
            ArchiveError::InvalidUtf8 => write!(f, "string payload is not valid UTF-8"),
            ArchiveError::InvalidReal => write!(f, "real payload is malformed or out of range"),
        }
    }
}

impl std::error::Error for ArchiveError {}

/// Result type alias for archive reads
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Archive options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchiveFlags {
    /// Skip the magic/version preamble
    pub no_header: bool,
}

impl ArchiveFlags {
    /// Write and expect the magic/version preamble.
    pub fn with_header() -> Self {
        Self { no_header: false }
    }
}

impl Default for ArchiveFlags {
    fn default() -> Self {
        Self { no_header: true }
    }
}

// ============================================================================
// Output Archive
// ============================================================================

#[derive(Debug)]
enum Sink<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a mut Vec<u8>),
}

impl Sink<'_> {
    fn bytes(&self) -> &Vec<u8> {
        match self {
            Sink::Owned(buffer) => buffer,
            Sink::Borrowed(buffer) => buffer,
        }
    }

    fn bytes_mut(&mut self) -> &mut Vec<u8> {
        match self {
            Sink::Owned(buffer) => buffer,
            Sink::Borrowed(buffer) => buffer,
        }
    }
}

/// Appends packed values to a byte buffer.
///
/// # Example
/// ```
/// use bigreal::archive::{ArchiveFlags, PackedIArchive, PackedOArchive};
/// use bigreal::numeric::Real;
///
/// let mut out = PackedOArchive::new(ArchiveFlags::default());
/// out.pack(&42u32).pack(&Real::from(-7));
/// let bytes = out.into_bytes();
///
/// let mut input = PackedIArchive::new(&bytes, ArchiveFlags::default()).unwrap();
/// assert_eq!(input.unpack::<u32>().unwrap(), 42);
/// assert_eq!(input.unpack::<Real>().unwrap(), Real::from(-7));
/// ```
#[derive(Debug)]
pub struct PackedOArchive<'a> {
    sink: Sink<'a>,
    flags: ArchiveFlags,
}

impl PackedOArchive<'static> {
    /// Archive writing into its own buffer.
    pub fn new(flags: ArchiveFlags) -> Self {
        Self::start(Sink::Owned(Vec::new()), flags)
    }
}

impl<'a> PackedOArchive<'a> {
    /// Archive appending to a caller-supplied buffer.
    pub fn with_buffer(buffer: &'a mut Vec<u8>, flags: ArchiveFlags) -> Self {
        Self::start(Sink::Borrowed(buffer), flags)
    }

    fn start(sink: Sink<'a>, flags: ArchiveFlags) -> Self {
        let mut archive = Self { sink, flags };
        if !flags.no_header {
            archive.write_bytes(&ARCHIVE_MAGIC);
            archive.write_bytes(&[ARCHIVE_VERSION]);
        }
        archive
    }

    #[inline]
    pub fn flags(&self) -> ArchiveFlags {
        self.flags
    }

    /// Append one value.
    pub fn pack<T: Packable + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.pack(self);
        self
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.sink.bytes_mut().extend_from_slice(bytes);
    }

    /// Everything written so far, including anything the buffer held before.
    pub fn as_bytes(&self) -> &[u8] {
        self.sink.bytes()
    }

    pub fn len(&self) -> usize {
        self.sink.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sink.bytes().is_empty()
    }

    /// The written bytes. Borrowed buffers are copied out and left in place.
    pub fn into_bytes(self) -> Vec<u8> {
        match self.sink {
            Sink::Owned(buffer) => buffer,
            Sink::Borrowed(buffer) => buffer.clone(),
        }
    }
}

// ============================================================================
// Input Archive
// ============================================================================

/// Reads values back out of a packed byte buffer, in write order.
#[derive(Debug, Clone)]
pub struct PackedIArchive<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> PackedIArchive<'a> {
    /// Open `data`, checking the preamble unless `flags.no_header` is set.
    ///
    /// # Errors
    /// Returns `InvalidHeader` when a header is expected but absent.
    pub fn new(data: &'a [u8], flags: ArchiveFlags) -> ArchiveResult<Self> {
        let mut archive = Self { data, position: 0 };
        if !flags.no_header {
            let magic = archive
                .read_bytes(ARCHIVE_MAGIC.len())
                .map_err(|_| ArchiveError::InvalidHeader)?;
            if magic != ARCHIVE_MAGIC {
                return Err(ArchiveError::InvalidHeader);
            }
            let version = archive.read_array::<1>().map_err(|_| ArchiveError::InvalidHeader)?;
            if version[0] != ARCHIVE_VERSION {
                return Err(ArchiveError::InvalidHeader);
            }
        }
        Ok(archive)
    }

    /// Read the next value.
    pub fn unpack<T: Packable>(&mut self) -> ArchiveResult<T> {
        T::unpack(self)
    }

    /// Take the next `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> ArchiveResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(ArchiveError::UnexpectedEnd)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> ArchiveResult<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

// ============================================================================
// Packable
// ============================================================================

/// A value with a packed byte representation.
pub trait Packable {
    fn pack(&self, archive: &mut PackedOArchive<'_>);

    fn unpack(archive: &mut PackedIArchive<'_>) -> ArchiveResult<Self>
    where
        Self: Sized;
}

macro_rules! impl_packable_le {
    ($($t:ty),*) => {
        $(
            impl Packable for $t {
                fn pack(&self, archive: &mut PackedOArchive<'_>) {
                    archive.write_bytes(&self.to_le_bytes());
                }

                fn unpack(archive: &mut PackedIArchive<'_>) -> ArchiveResult<Self> {
                    Ok(<$t>::from_le_bytes(archive.read_array()?))
                }
            }
        )*
    };
}

impl_packable_le!(u8, i32, u32, i64, u64, f64);

impl Packable for bool {
    fn pack(&self, archive: &mut PackedOArchive<'_>) {
        archive.write_bytes(&[u8::from(*self)]);
    }

    fn unpack(archive: &mut PackedIArchive<'_>) -> ArchiveResult<Self> {
        match archive.read_array::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(ArchiveError::InvalidTag(tag)),
        }
    }
}

impl Packable for String {
    /// `u32` byte length, then the UTF-8 bytes.
    fn pack(&self, archive: &mut PackedOArchive<'_>) {
        archive.pack(&(self.len() as u32));
        archive.write_bytes(self.as_bytes());
    }

    fn unpack(archive: &mut PackedIArchive<'_>) -> ArchiveResult<Self> {
        let len = archive.unpack::<u32>()? as usize;
        let bytes = archive.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ArchiveError::InvalidUtf8)
    }
}

impl Packable for Real {
    /// Sign tag, binary exponent, magnitude length, magnitude bytes
    /// (little-endian). The full mantissa is kept, whatever the precision.
    fn pack(&self, archive: &mut PackedOArchive<'_>) {
        let (sign, magnitude) = self.mantissa().to_bytes_le();
        let tag = match sign {
            Sign::NoSign => TAG_ZERO,
            Sign::Plus => TAG_POSITIVE,
            Sign::Minus => TAG_NEGATIVE,
        };
        let magnitude = if tag == TAG_ZERO { Vec::new() } else { magnitude };
        archive.pack(&tag);
        archive.pack(&self.exponent());
        archive.pack(&(magnitude.len() as u32));
        archive.write_bytes(&magnitude);
    }

    fn unpack(archive: &mut PackedIArchive<'_>) -> ArchiveResult<Self> {
        let sign = match archive.unpack::<u8>()? {
            TAG_ZERO => Sign::NoSign,
            TAG_POSITIVE => Sign::Plus,
            TAG_NEGATIVE => Sign::Minus,
            tag => return Err(ArchiveError::InvalidTag(tag)),
        };
        let exponent = archive.unpack::<i64>()?;
        let len = archive.unpack::<u32>()? as usize;
        let magnitude = archive.read_bytes(len)?;
        if sign == Sign::NoSign {
            return Ok(Real::zero());
        }
        // Writers only emit odd mantissas; anything else did not come from `pack`.
        if magnitude.first().map_or(true, |low| low & 1 == 0) {
            return Err(ArchiveError::InvalidReal);
        }
        let value = BigFloat::from_parts(BigInt::from_bytes_le(sign, magnitude), exponent);
        if !value.in_exponent_range() {
            return Err(ArchiveError::InvalidReal);
        }
        Ok(Real::from_big_float(value))
    }
}
