//! TIFF/IFD parsing — walking the directory chain inside an EXIF block.
//!
//! The block located by the detector is a self-contained TIFF structure:
//!
//! - Header (8 bytes): byte order (`II` little-endian / `MM` big-endian),
//!   magic number 42, offset to the first IFD.
//! - Each IFD: a 2-byte entry count, then 12-byte entries (tag id, field
//!   type, value count, and a 4-byte field holding either the value itself
//!   or an offset to it), then a 4-byte offset to the next IFD.
//!
//! The primary IFD can point at two sub-directories: the Exif IFD (camera
//! and exposure settings, pointer tag 0x8769) and the GPS IFD (pointer tag
//! 0x8825).
//!
//! Everything here degrades instead of failing. An unrecognized byte order
//! or magic number yields an empty directory set. An entry whose value falls
//! outside the block is skipped; the rest of its directory still decodes. A
//! directory offset pointing outside the block terminates that branch only —
//! sibling branches are still attempted.

use serde::Serialize;

/// Byte order established by the TIFF header for all multi-byte reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn detect(block: &[u8]) -> Option<Self> {
        match block.get(0..2)? {
            b"II" => Some(Self::Little),
            b"MM" => Some(Self::Big),
            _ => None,
        }
    }

    /// Bounds-checked u16 read at `at`.
    pub fn read_u16(self, data: &[u8], at: usize) -> Option<u16> {
        let bytes: [u8; 2] = data.get(at..at + 2)?.try_into().ok()?;
        Some(match self {
            Self::Little => u16::from_le_bytes(bytes),
            Self::Big => u16::from_be_bytes(bytes),
        })
    }

    /// Bounds-checked u32 read at `at`.
    pub fn read_u32(self, data: &[u8], at: usize) -> Option<u32> {
        let bytes: [u8; 4] = data.get(at..at + 4)?.try_into().ok()?;
        Some(match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        })
    }

    fn read_i32(self, data: &[u8], at: usize) -> Option<i32> {
        self.read_u32(data, at).map(|v| v as i32)
    }
}

/// TIFF field types (EXIF 2.3, table 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
}

impl FieldType {
    fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            1 => Self::Byte,
            2 => Self::Ascii,
            3 => Self::Short,
            4 => Self::Long,
            5 => Self::Rational,
            6 => Self::SByte,
            7 => Self::Undefined,
            8 => Self::SShort,
            9 => Self::SLong,
            10 => Self::SRational,
            11 => Self::Float,
            12 => Self::Double,
            _ => return None,
        })
    }

    /// Size in bytes of one element of this type.
    fn size(self) -> usize {
        match self {
            Self::Byte | Self::Ascii | Self::SByte | Self::Undefined => 1,
            Self::Short | Self::SShort => 2,
            Self::Long | Self::SLong | Self::Float => 4,
            Self::Rational | Self::SRational | Self::Double => 8,
        }
    }
}

/// Unsigned numerator/denominator pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    pub fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// Decimal value; a zero denominator maps to 0.0 rather than infinity.
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            f64::from(self.num) / f64::from(self.den)
        }
    }
}

/// Signed numerator/denominator pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SRational {
    pub num: i32,
    pub den: i32,
}

impl SRational {
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            f64::from(self.num) / f64::from(self.den)
        }
    }
}

/// A decoded directory entry value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bytes(Vec<u8>),
    /// NUL terminator and trailing padding already trimmed.
    Ascii(String),
    Shorts(Vec<u16>),
    Longs(Vec<u32>),
    Rationals(Vec<Rational>),
    SRationals(Vec<SRational>),
    Undefined(Vec<u8>),
}

impl Value {
    /// First element as an unsigned integer, for enum and count-like tags.
    pub fn as_uint(&self) -> Option<u32> {
        match self {
            Value::Bytes(v) => v.first().map(|&b| u32::from(b)),
            Value::Shorts(v) => v.first().map(|&s| u32::from(s)),
            Value::Longs(v) => v.first().copied(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Ascii(s) => Some(s),
            _ => None,
        }
    }

    /// First element as a decimal, accepting any numeric representation.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Rationals(v) => v.first().map(|r| r.to_f64()),
            Value::SRationals(v) => v.first().map(|r| r.to_f64()),
            _ => self.as_uint().map(f64::from),
        }
    }

    pub fn as_rational(&self) -> Option<Rational> {
        match self {
            Value::Rationals(v) => v.first().copied(),
            _ => None,
        }
    }

    /// A degrees/minutes/seconds (or hour/minute/second) triple.
    pub fn as_rational_triple(&self) -> Option<[Rational; 3]> {
        match self {
            Value::Rationals(v) if v.len() >= 3 => Some([v[0], v[1], v[2]]),
            _ => None,
        }
    }
}

/// One raw directory entry: tag id plus its decoded value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub tag: u16,
    pub value: Value,
}

/// Which directory an entry came from — determines the tag table consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ifd {
    Primary,
    Exif,
    Gps,
}

/// The raw directory set pulled out of one metadata block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDirectories {
    pub primary: Vec<RawEntry>,
    pub exif: Vec<RawEntry>,
    pub gps: Vec<RawEntry>,
}

impl RawDirectories {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.exif.is_empty() && self.gps.is_empty()
    }
}

const TIFF_MAGIC: u16 = 42;

/// Pointer tag from the primary IFD to the Exif sub-IFD.
pub const TAG_EXIF_IFD: u16 = 0x8769;
/// Pointer tag from the primary IFD to the GPS sub-IFD.
pub const TAG_GPS_IFD: u16 = 0x8825;

/// Parse the TIFF block into its raw directories.
///
/// An unrecognized byte-order marker or magic number yields an empty
/// directory set — from the caller's perspective that is indistinguishable
/// from an image with no metadata, which is the intended collapse.
pub fn parse_directories(block: &[u8]) -> RawDirectories {
    let mut dirs = RawDirectories::default();

    let Some(order) = ByteOrder::detect(block) else {
        log::debug!("unrecognized byte-order marker; treating block as empty");
        return dirs;
    };
    if order.read_u16(block, 2) != Some(TIFF_MAGIC) {
        log::debug!("bad TIFF magic; treating block as empty");
        return dirs;
    }
    let Some(ifd0_offset) = order.read_u32(block, 4) else {
        return dirs;
    };

    let mut entries = parse_ifd(block, order, ifd0_offset as usize);

    // Pull out the sub-IFD pointers; they are structural, not reportable.
    let exif_offset = take_pointer(&mut entries, TAG_EXIF_IFD);
    let gps_offset = take_pointer(&mut entries, TAG_GPS_IFD);
    dirs.primary = entries;

    if let Some(offset) = exif_offset {
        dirs.exif = parse_ifd(block, order, offset as usize);
    }
    if let Some(offset) = gps_offset {
        dirs.gps = parse_ifd(block, order, offset as usize);
    }

    dirs
}

/// Remove a sub-IFD pointer entry and return its offset, if present.
fn take_pointer(entries: &mut Vec<RawEntry>, tag: u16) -> Option<u32> {
    let idx = entries.iter().position(|e| e.tag == tag)?;
    let entry = entries.remove(idx);
    entry.value.as_uint()
}

/// Decode one directory's entries, skipping the ones that don't fit.
fn parse_ifd(block: &[u8], order: ByteOrder, offset: usize) -> Vec<RawEntry> {
    let Some(count) = order.read_u16(block, offset) else {
        log::warn!("directory offset {offset:#x} outside metadata block; branch dropped");
        return Vec::new();
    };

    let mut entries = Vec::new();
    for i in 0..usize::from(count) {
        let at = offset + 2 + i * 12;
        if at + 12 > block.len() {
            // Entry count implies entries past the block; decode what fits.
            log::warn!("directory at {offset:#x} truncated after {i} of {count} entries");
            break;
        }
        let (Some(tag), Some(type_code), Some(value_count)) = (
            order.read_u16(block, at),
            order.read_u16(block, at + 2),
            order.read_u32(block, at + 4),
        ) else {
            break;
        };

        let Some(field_type) = FieldType::from_code(type_code) else {
            log::debug!("tag {tag:#06x}: unknown field type {type_code}, skipped");
            continue;
        };

        match read_value(block, order, field_type, value_count, at + 8) {
            Some(value) => entries.push(RawEntry { tag, value }),
            None => {
                log::warn!("tag {tag:#06x}: value offset or length out of bounds, skipped");
            }
        }
    }
    entries
}

/// Read an entry's value, inline or via offset indirection.
///
/// Returns `None` when `offset + count * type_size` lands outside the block.
fn read_value(
    block: &[u8],
    order: ByteOrder,
    field_type: FieldType,
    count: u32,
    value_field_at: usize,
) -> Option<Value> {
    let total = field_type.size().checked_mul(count as usize)?;

    // Values of up to 4 bytes live inside the entry itself.
    let start = if total <= 4 {
        value_field_at
    } else {
        order.read_u32(block, value_field_at)? as usize
    };
    let end = start.checked_add(total)?;
    if end > block.len() {
        return None;
    }
    let data = &block[start..end];

    Some(match field_type {
        FieldType::Byte | FieldType::SByte => Value::Bytes(data.to_vec()),
        // No tag in the report tables stores floats; keep the raw bytes.
        FieldType::Undefined | FieldType::Float | FieldType::Double => {
            Value::Undefined(data.to_vec())
        }
        FieldType::Ascii => {
            let text = String::from_utf8_lossy(data);
            Value::Ascii(text.trim_end_matches('\0').trim_end().to_string())
        }
        FieldType::Short | FieldType::SShort => {
            let mut values = Vec::with_capacity(count as usize);
            for i in 0..count as usize {
                values.push(order.read_u16(data, i * 2)?);
            }
            Value::Shorts(values)
        }
        FieldType::Long | FieldType::SLong => {
            let mut values = Vec::with_capacity(count as usize);
            for i in 0..count as usize {
                values.push(order.read_u32(data, i * 4)?);
            }
            Value::Longs(values)
        }
        FieldType::Rational => {
            let mut values = Vec::with_capacity(count as usize);
            for i in 0..count as usize {
                values.push(Rational {
                    num: order.read_u32(data, i * 8)?,
                    den: order.read_u32(data, i * 8 + 4)?,
                });
            }
            Value::Rationals(values)
        }
        FieldType::SRational => {
            let mut values = Vec::with_capacity(count as usize);
            for i in 0..count as usize {
                values.push(SRational {
                    num: order.read_i32(data, i * 8)?,
                    den: order.read_i32(data, i * 8 + 4)?,
                });
            }
            Value::SRationals(values)
        }
    })
}

#[cfg(test)]
pub(crate) mod test_block {
    //! Byte-level TIFF block builder for tests, little-endian throughout.

    use super::{TAG_EXIF_IFD, TAG_GPS_IFD};

    pub struct Entry {
        pub tag: u16,
        pub type_code: u16,
        pub count: u32,
        pub value_field: [u8; 4],
        /// Appended after the directory; `value_field` must point at it.
        pub extra: Vec<u8>,
    }

    impl Entry {
        pub fn short(tag: u16, value: u16) -> Self {
            let mut field = [0u8; 4];
            field[..2].copy_from_slice(&value.to_le_bytes());
            Self { tag, type_code: 3, count: 1, value_field: field, extra: Vec::new() }
        }

        pub fn long(tag: u16, value: u32) -> Self {
            Self { tag, type_code: 4, count: 1, value_field: value.to_le_bytes(), extra: Vec::new() }
        }

        /// ASCII value stored out of line at `offset`.
        pub fn ascii_at(tag: u16, text: &[u8], offset: u32) -> Self {
            Self {
                tag,
                type_code: 2,
                count: text.len() as u32,
                value_field: offset.to_le_bytes(),
                extra: text.to_vec(),
            }
        }

        /// Short ASCII value (≤ 4 bytes) stored inline.
        pub fn ascii_inline(tag: u16, text: &[u8]) -> Self {
            assert!(text.len() <= 4);
            let mut field = [0u8; 4];
            field[..text.len()].copy_from_slice(text);
            Self { tag, type_code: 2, count: text.len() as u32, value_field: field, extra: Vec::new() }
        }

        pub fn rationals_at(tag: u16, values: &[(u32, u32)], offset: u32) -> Self {
            let mut extra = Vec::new();
            for (num, den) in values {
                extra.extend_from_slice(&num.to_le_bytes());
                extra.extend_from_slice(&den.to_le_bytes());
            }
            Self {
                tag,
                type_code: 5,
                count: values.len() as u32,
                value_field: offset.to_le_bytes(),
                extra,
            }
        }

        pub fn srationals_at(tag: u16, values: &[(i32, i32)], offset: u32) -> Self {
            let mut extra = Vec::new();
            for (num, den) in values {
                extra.extend_from_slice(&num.to_le_bytes());
                extra.extend_from_slice(&den.to_le_bytes());
            }
            Self {
                tag,
                type_code: 10,
                count: values.len() as u32,
                value_field: offset.to_le_bytes(),
                extra,
            }
        }
    }

    /// Serialize one IFD at `at`: count, entries, zero next-IFD pointer,
    /// then the out-of-line value data.
    fn write_ifd(block: &mut Vec<u8>, at: usize, entries: &[Entry]) {
        assert_eq!(block.len(), at);
        block.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        let data_start = at + 2 + entries.len() * 12 + 4;
        let mut extra = Vec::new();
        for e in entries {
            block.extend_from_slice(&e.tag.to_le_bytes());
            block.extend_from_slice(&e.type_code.to_le_bytes());
            block.extend_from_slice(&e.count.to_le_bytes());
            block.extend_from_slice(&e.value_field);
            extra.extend_from_slice(&e.extra);
        }
        block.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(block.len(), data_start);
        block.extend_from_slice(&extra);
    }

    /// Size an IFD occupies, including out-of-line data.
    pub fn ifd_size(entries: &[Entry]) -> usize {
        2 + entries.len() * 12 + 4 + entries.iter().map(|e| e.extra.len()).sum::<usize>()
    }

    /// Offset where out-of-line data for an IFD at `at` begins.
    pub fn data_start(at: usize, entry_count: usize) -> usize {
        at + 2 + entry_count * 12 + 4
    }

    /// Build a TIFF block: header, primary IFD, optional Exif and GPS IFDs.
    pub fn build(primary: Vec<Entry>, exif: Vec<Entry>, gps: Vec<Entry>) -> Vec<u8> {
        let mut primary = primary;
        let primary_at = 8usize;

        // Reserve pointer entries up front so offsets are computable.
        let mut pointer_count = 0;
        if !exif.is_empty() {
            pointer_count += 1;
        }
        if !gps.is_empty() {
            pointer_count += 1;
        }
        let primary_total = ifd_size(&primary) + pointer_count * 12;
        let exif_at = primary_at + primary_total;
        let gps_at = exif_at + if exif.is_empty() { 0 } else { ifd_size(&exif) };

        if !exif.is_empty() {
            primary.push(Entry::long(TAG_EXIF_IFD, exif_at as u32));
        }
        if !gps.is_empty() {
            primary.push(Entry::long(TAG_GPS_IFD, gps_at as u32));
        }

        let mut block = Vec::new();
        block.extend_from_slice(b"II");
        block.extend_from_slice(&42u16.to_le_bytes());
        block.extend_from_slice(&(primary_at as u32).to_le_bytes());
        write_ifd(&mut block, primary_at, &primary);
        if !exif.is_empty() {
            write_ifd(&mut block, exif_at, &exif);
        }
        if !gps.is_empty() {
            write_ifd(&mut block, gps_at, &gps);
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::test_block::{Entry, build, data_start};
    use super::*;

    const TAG_MAKE: u16 = 0x010F;
    const TAG_ORIENTATION: u16 = 0x0112;
    const TAG_F_NUMBER: u16 = 0x829D;

    #[test]
    fn unknown_byte_order_yields_empty() {
        let block = b"ZZ\x2A\x00\x08\x00\x00\x00";
        assert!(parse_directories(block).is_empty());
    }

    #[test]
    fn bad_magic_yields_empty() {
        let block = b"II\x2B\x00\x08\x00\x00\x00";
        assert!(parse_directories(block).is_empty());
    }

    #[test]
    fn empty_block_yields_empty() {
        assert!(parse_directories(&[]).is_empty());
        assert!(parse_directories(b"II").is_empty());
    }

    #[test]
    fn parses_inline_short() {
        let block = build(vec![Entry::short(TAG_ORIENTATION, 6)], vec![], vec![]);
        let dirs = parse_directories(&block);
        assert_eq!(dirs.primary.len(), 1);
        assert_eq!(dirs.primary[0].tag, TAG_ORIENTATION);
        assert_eq!(dirs.primary[0].value.as_uint(), Some(6));
    }

    #[test]
    fn parses_offset_ascii_and_trims_padding() {
        let offset = data_start(8, 1) as u32;
        let block = build(
            vec![Entry::ascii_at(TAG_MAKE, b"Nikon Corp\0\0", offset)],
            vec![],
            vec![],
        );
        let dirs = parse_directories(&block);
        assert_eq!(dirs.primary[0].value.as_str(), Some("Nikon Corp"));
    }

    #[test]
    fn parses_inline_ascii() {
        let block = build(vec![Entry::ascii_inline(TAG_MAKE, b"abc\0")], vec![], vec![]);
        let dirs = parse_directories(&block);
        assert_eq!(dirs.primary[0].value.as_str(), Some("abc"));
    }

    #[test]
    fn parses_big_endian() {
        let mut block = Vec::new();
        block.extend_from_slice(b"MM");
        block.extend_from_slice(&42u16.to_be_bytes());
        block.extend_from_slice(&8u32.to_be_bytes());
        block.extend_from_slice(&1u16.to_be_bytes());
        block.extend_from_slice(&TAG_ORIENTATION.to_be_bytes());
        block.extend_from_slice(&3u16.to_be_bytes());
        block.extend_from_slice(&1u32.to_be_bytes());
        block.extend_from_slice(&[0x00, 0x03, 0x00, 0x00]); // short 3, big-endian, left-justified
        block.extend_from_slice(&0u32.to_be_bytes());

        let dirs = parse_directories(&block);
        assert_eq!(dirs.primary[0].value.as_uint(), Some(3));
    }

    #[test]
    fn walks_exif_and_gps_branches() {
        let exif_entries = vec![Entry::short(TAG_F_NUMBER, 4)];
        let gps_entries = vec![Entry::short(0x0001, u16::from(b'N'))];
        let block = build(vec![Entry::short(TAG_ORIENTATION, 1)], exif_entries, gps_entries);

        let dirs = parse_directories(&block);
        assert_eq!(dirs.primary.len(), 1, "pointer entries must not leak into primary");
        assert_eq!(dirs.exif.len(), 1);
        assert_eq!(dirs.gps.len(), 1);
    }

    #[test]
    fn out_of_bounds_entry_is_skipped_others_kept() {
        // Rational whose offset points far past the block.
        let mut bad = Entry::rationals_at(TAG_F_NUMBER, &[], 0x0010_0000);
        bad.count = 1;
        let block = build(
            vec![Entry::short(TAG_ORIENTATION, 1), bad],
            vec![],
            vec![],
        );
        let dirs = parse_directories(&block);
        assert_eq!(dirs.primary.len(), 1);
        assert_eq!(dirs.primary[0].tag, TAG_ORIENTATION);
    }

    #[test]
    fn entry_count_past_block_decodes_what_fits() {
        let mut block = build(vec![Entry::short(TAG_ORIENTATION, 1)], vec![], vec![]);
        // Claim 40 entries; only one is actually present.
        block[8] = 40;
        let dirs = parse_directories(&block);
        assert_eq!(dirs.primary.len(), 1);
    }

    #[test]
    fn dead_gps_branch_keeps_exif_branch() {
        let mut block = build(
            vec![Entry::short(TAG_ORIENTATION, 1)],
            vec![Entry::short(TAG_F_NUMBER, 4)],
            vec![Entry::short(0x0001, u16::from(b'N'))],
        );
        // Corrupt the GPS pointer (second pointer entry in the primary IFD)
        // to aim far outside the block.
        let gps_ptr_pos = block
            .windows(2)
            .position(|w| w == TAG_GPS_IFD.to_le_bytes())
            .expect("gps pointer entry present");
        block[gps_ptr_pos + 8..gps_ptr_pos + 12].copy_from_slice(&0x00FF_FFFFu32.to_le_bytes());

        let dirs = parse_directories(&block);
        assert_eq!(dirs.exif.len(), 1, "sibling branch must still be attempted");
        assert!(dirs.gps.is_empty());
    }

    #[test]
    fn parses_srational() {
        let offset = data_start(8, 1) as u32;
        let block = build(
            vec![Entry::srationals_at(0x9204, &[(-1, 3)], offset)],
            vec![],
            vec![],
        );
        let dirs = parse_directories(&block);
        match &dirs.primary[0].value {
            Value::SRationals(v) => assert_eq!(v[0], SRational { num: -1, den: 3 }),
            other => panic!("expected srationals, got {other:?}"),
        }
    }

    #[test]
    fn zero_denominator_rational_is_finite() {
        assert_eq!(Rational::new(1, 0).to_f64(), 0.0);
        assert_eq!(SRational { num: -1, den: 0 }.to_f64(), 0.0);
    }

    #[test]
    fn unknown_field_type_is_skipped() {
        let mut block = build(
            vec![Entry::short(TAG_ORIENTATION, 1), Entry::short(TAG_MAKE, 2)],
            vec![],
            vec![],
        );
        // Rewrite the second entry's type code to something undefined.
        let second_entry_at = 8 + 2 + 12;
        block[second_entry_at + 2..second_entry_at + 4].copy_from_slice(&99u16.to_le_bytes());

        let dirs = parse_directories(&block);
        assert_eq!(dirs.primary.len(), 1);
    }
}
