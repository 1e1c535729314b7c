//! EXIF/TIFF metadata extraction.
//!
//! Four stages, data flowing strictly forward:
//!
//! 1. [`find_metadata_block`] — locate the `Exif\0\0` APP1 payload in a JPEG
//! 2. [`parse_directories`] — walk the TIFF directory chain into raw entries
//! 3. [`interpret_entry`] — decode raw entries into labeled display values
//! 4. [`build_report`] — aggregate into an ordered [`MetadataReport`]
//!
//! Every stage degrades instead of failing: a missing segment, an unreadable
//! byte order, or a corrupt entry all collapse into a smaller (possibly
//! "no metadata") report, never an error.

mod detector;
mod ifd;
mod report;
mod tags;

pub use detector::{MetadataBlock, find_metadata_block};
pub use ifd::{
    ByteOrder, Ifd, Rational, RawDirectories, RawEntry, SRational, Value, parse_directories,
};
pub use report::{MetadataReport, NO_METADATA_LABEL, NO_METADATA_VALUE, ReportEntry, build_report};
pub use tags::{Category, DecodedTag, Interpretation, interpret_entry};

#[cfg(test)]
pub(crate) use ifd::test_block;
