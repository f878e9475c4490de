// ============================================================================
// Archive Module
// Packed binary archives for primitives and real values
// ============================================================================

mod packed;

pub use packed::{
    ArchiveError, ArchiveFlags, ArchiveResult, Packable, PackedIArchive, PackedOArchive,
    ARCHIVE_MAGIC, ARCHIVE_VERSION,
};
