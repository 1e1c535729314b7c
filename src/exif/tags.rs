//! Tag interpretation — turning raw directory entries into labeled values.
//!
//! Each directory (primary, Exif, GPS) has its own static tag table mapping
//! a tag id to a category, a human label, a privacy-sensitivity flag, and a
//! formatting rule. Interpretation is total: a tag id missing from the table
//! resolves to an explicit [`Interpretation::Unrecognized`] rather than
//! being silently dropped, and a recognized tag whose value has the wrong
//! shape resolves to [`Interpretation::Malformed`]. Neither ever fails the
//! surrounding decode.

use serde::Serialize;

use super::ifd::{Ifd, RawEntry, Rational};

/// Report category, in fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Location,
    FileIdentity,
    Camera,
    Exposure,
    Lens,
}

/// A decoded, display-ready tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedTag {
    pub category: Category,
    pub label: &'static str,
    pub value: String,
    /// GPS and camera/lens identity fields are privacy-sensitive.
    pub sensitive: bool,
}

/// Outcome of interpreting one raw entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    Decoded(DecodedTag),
    /// Recognized, but only consumed alongside another tag (GPS ref tags).
    Companion,
    /// Recognized, but the stored value has an unusable shape.
    Malformed { tag: u16 },
    /// Not in the tag table for this directory.
    Unrecognized { tag: u16 },
}

/// How a tag's raw value is rendered.
#[derive(Debug, Clone, Copy)]
enum Format {
    /// Verbatim string (padding was trimmed at parse time).
    Text,
    /// First integer element, with a unit suffix.
    Integer { suffix: &'static str },
    /// First numeric element as a fixed-precision decimal.
    Decimal {
        places: usize,
        prefix: &'static str,
        suffix: &'static str,
    },
    /// `1/N s` below one second, else a two-place decimal with `s`.
    ExposureTime,
    /// DMS rational triple plus a companion hemisphere-reference tag.
    GpsCoordinate { ref_tag: u16, default_ref: char },
    /// Hour/minute/second rational triple, truncated.
    GpsTimestamp,
    /// Fixed value→label table; anything else renders as "unknown".
    Enum(&'static [(u32, &'static str)]),
    /// Consumed by another tag's formatter; produces no entry of its own.
    Companion,
}

struct TagSpec {
    id: u16,
    category: Category,
    label: &'static str,
    sensitive: bool,
    format: Format,
}

const ORIENTATIONS: &[(u32, &str)] = &[
    (1, "Normal"),
    (2, "Mirrored horizontal"),
    (3, "Rotated 180°"),
    (4, "Mirrored vertical"),
    (5, "Mirrored horizontal, rotated 270° CW"),
    (6, "Rotated 90° CW"),
    (7, "Mirrored horizontal, rotated 90° CW"),
    (8, "Rotated 270° CW"),
];

const FLASH_STATES: &[(u32, &str)] = &[
    (0x00, "Did not fire"),
    (0x01, "Fired"),
    (0x05, "Fired, return not detected"),
    (0x07, "Fired, return detected"),
    (0x08, "On, did not fire"),
    (0x09, "On, fired"),
    (0x10, "Off, did not fire"),
    (0x18, "Auto, did not fire"),
    (0x19, "Auto, fired"),
    (0x20, "No flash function"),
];

const EXPOSURE_PROGRAMS: &[(u32, &str)] = &[
    (0, "Not defined"),
    (1, "Manual"),
    (2, "Normal program"),
    (3, "Aperture priority"),
    (4, "Shutter priority"),
    (5, "Creative program"),
    (6, "Action program"),
    (7, "Portrait mode"),
    (8, "Landscape mode"),
];

const METERING_MODES: &[(u32, &str)] = &[
    (0, "Unknown"),
    (1, "Average"),
    (2, "Center-weighted average"),
    (3, "Spot"),
    (4, "Multi-spot"),
    (5, "Pattern"),
    (6, "Partial"),
];

const WHITE_BALANCE: &[(u32, &str)] = &[(0, "Auto"), (1, "Manual")];

const COLOR_SPACES: &[(u32, &str)] = &[(1, "sRGB"), (65535, "Uncalibrated")];

/// Primary (0th) IFD tags.
const PRIMARY_TAGS: &[TagSpec] = &[
    TagSpec {
        id: 0x0100,
        category: Category::FileIdentity,
        label: "Image width",
        sensitive: false,
        format: Format::Integer { suffix: "px" },
    },
    TagSpec {
        id: 0x0101,
        category: Category::FileIdentity,
        label: "Image height",
        sensitive: false,
        format: Format::Integer { suffix: "px" },
    },
    TagSpec {
        id: 0x010F,
        category: Category::Camera,
        label: "Camera make",
        sensitive: true,
        format: Format::Text,
    },
    TagSpec {
        id: 0x0110,
        category: Category::Camera,
        label: "Camera model",
        sensitive: true,
        format: Format::Text,
    },
    TagSpec {
        id: 0x0112,
        category: Category::FileIdentity,
        label: "Orientation",
        sensitive: false,
        format: Format::Enum(ORIENTATIONS),
    },
    TagSpec {
        id: 0x0131,
        category: Category::Camera,
        label: "Software",
        sensitive: true,
        format: Format::Text,
    },
    TagSpec {
        id: 0x0132,
        category: Category::FileIdentity,
        label: "Modified date/time",
        sensitive: false,
        format: Format::Text,
    },
];

/// Exif sub-IFD tags (exposure and lens).
const EXIF_TAGS: &[TagSpec] = &[
    TagSpec {
        id: 0x829A,
        category: Category::Exposure,
        label: "Exposure time",
        sensitive: false,
        format: Format::ExposureTime,
    },
    TagSpec {
        id: 0x829D,
        category: Category::Exposure,
        label: "Aperture",
        sensitive: false,
        format: Format::Decimal { places: 1, prefix: "f/", suffix: "" },
    },
    TagSpec {
        id: 0x8822,
        category: Category::Exposure,
        label: "Exposure program",
        sensitive: false,
        format: Format::Enum(EXPOSURE_PROGRAMS),
    },
    TagSpec {
        id: 0x8827,
        category: Category::Exposure,
        label: "ISO",
        sensitive: false,
        format: Format::Integer { suffix: "" },
    },
    TagSpec {
        id: 0x9003,
        category: Category::FileIdentity,
        label: "Original date/time",
        sensitive: false,
        format: Format::Text,
    },
    TagSpec {
        id: 0x9203,
        category: Category::Exposure,
        label: "Brightness",
        sensitive: false,
        format: Format::Decimal { places: 2, prefix: "", suffix: " EV" },
    },
    TagSpec {
        id: 0x9204,
        category: Category::Exposure,
        label: "Exposure bias",
        sensitive: false,
        format: Format::Decimal { places: 2, prefix: "", suffix: " EV" },
    },
    TagSpec {
        id: 0x9207,
        category: Category::Exposure,
        label: "Metering mode",
        sensitive: false,
        format: Format::Enum(METERING_MODES),
    },
    TagSpec {
        id: 0x9209,
        category: Category::Exposure,
        label: "Flash",
        sensitive: false,
        format: Format::Enum(FLASH_STATES),
    },
    TagSpec {
        id: 0x920A,
        category: Category::Lens,
        label: "Focal length",
        sensitive: false,
        format: Format::Decimal { places: 1, prefix: "", suffix: "mm" },
    },
    TagSpec {
        id: 0xA001,
        category: Category::Exposure,
        label: "Color space",
        sensitive: false,
        format: Format::Enum(COLOR_SPACES),
    },
    TagSpec {
        id: 0xA403,
        category: Category::Exposure,
        label: "White balance",
        sensitive: false,
        format: Format::Enum(WHITE_BALANCE),
    },
    TagSpec {
        id: 0xA433,
        category: Category::Lens,
        label: "Lens make",
        sensitive: true,
        format: Format::Text,
    },
    TagSpec {
        id: 0xA434,
        category: Category::Lens,
        label: "Lens model",
        sensitive: true,
        format: Format::Text,
    },
];

pub(crate) const TAG_GPS_LATITUDE_REF: u16 = 0x0001;
pub(crate) const TAG_GPS_LATITUDE: u16 = 0x0002;
pub(crate) const TAG_GPS_LONGITUDE_REF: u16 = 0x0003;
pub(crate) const TAG_GPS_LONGITUDE: u16 = 0x0004;
pub(crate) const TAG_GPS_ALTITUDE: u16 = 0x0006;
pub(crate) const TAG_GPS_TIMESTAMP: u16 = 0x0007;

/// GPS sub-IFD tags. Everything positional is sensitive.
const GPS_TAGS: &[TagSpec] = &[
    TagSpec {
        id: TAG_GPS_LATITUDE_REF,
        category: Category::Location,
        label: "GPS latitude ref",
        sensitive: true,
        format: Format::Companion,
    },
    TagSpec {
        id: TAG_GPS_LATITUDE,
        category: Category::Location,
        label: "GPS latitude",
        sensitive: true,
        format: Format::GpsCoordinate { ref_tag: TAG_GPS_LATITUDE_REF, default_ref: 'N' },
    },
    TagSpec {
        id: TAG_GPS_LONGITUDE_REF,
        category: Category::Location,
        label: "GPS longitude ref",
        sensitive: true,
        format: Format::Companion,
    },
    TagSpec {
        id: TAG_GPS_LONGITUDE,
        category: Category::Location,
        label: "GPS longitude",
        sensitive: true,
        format: Format::GpsCoordinate { ref_tag: TAG_GPS_LONGITUDE_REF, default_ref: 'E' },
    },
    TagSpec {
        id: 0x0005,
        category: Category::Location,
        label: "GPS altitude ref",
        sensitive: true,
        format: Format::Companion,
    },
    TagSpec {
        id: TAG_GPS_ALTITUDE,
        category: Category::Location,
        label: "GPS altitude",
        sensitive: true,
        format: Format::Decimal { places: 2, prefix: "", suffix: "m" },
    },
    TagSpec {
        id: TAG_GPS_TIMESTAMP,
        category: Category::Location,
        label: "GPS timestamp",
        sensitive: true,
        format: Format::GpsTimestamp,
    },
];

fn table_for(ifd: Ifd) -> &'static [TagSpec] {
    match ifd {
        Ifd::Primary => PRIMARY_TAGS,
        Ifd::Exif => EXIF_TAGS,
        Ifd::Gps => GPS_TAGS,
    }
}

/// Interpret one entry against the tag table of its directory.
///
/// `siblings` is the directory the entry came from; GPS coordinates consult
/// it for their hemisphere-reference companion tag.
pub fn interpret_entry(entry: &RawEntry, ifd: Ifd, siblings: &[RawEntry]) -> Interpretation {
    let Some(spec) = table_for(ifd).iter().find(|s| s.id == entry.tag) else {
        return Interpretation::Unrecognized { tag: entry.tag };
    };

    let value = match spec.format {
        Format::Companion => return Interpretation::Companion,
        Format::Text => entry.value.as_str().map(str::to_string),
        Format::Integer { suffix } => entry.value.as_uint().map(|n| format!("{n}{suffix}")),
        Format::Decimal { places, prefix, suffix } => entry
            .value
            .to_f64()
            .map(|v| format!("{prefix}{v:.places$}{suffix}")),
        Format::ExposureTime => entry.value.as_rational().map(format_exposure_time),
        Format::GpsCoordinate { ref_tag, default_ref } => entry
            .value
            .as_rational_triple()
            .map(|dms| format_gps_coordinate(dms, hemisphere(siblings, ref_tag, default_ref))),
        Format::GpsTimestamp => entry.value.as_rational_triple().map(format_gps_timestamp),
        Format::Enum(labels) => Some(format_enum(entry.value.as_uint(), labels)),
    };

    match value {
        Some(value) => Interpretation::Decoded(DecodedTag {
            category: spec.category,
            label: spec.label,
            value,
            sensitive: spec.sensitive,
        }),
        None => Interpretation::Malformed { tag: entry.tag },
    }
}

/// `1/500s` for sub-second exposures, `2.00s` otherwise.
fn format_exposure_time(r: Rational) -> String {
    let seconds = r.to_f64();
    if seconds > 0.0 && seconds < 1.0 {
        format!("1/{}s", (1.0 / seconds).round() as u64)
    } else {
        format!("{seconds:.2}s")
    }
}

/// Decimal degrees from a DMS triple, six places, hemisphere appended.
fn format_gps_coordinate(dms: [Rational; 3], hemisphere: char) -> String {
    let degrees = dms[0].to_f64() + dms[1].to_f64() / 60.0 + dms[2].to_f64() / 3600.0;
    format!("{degrees:.6}° {hemisphere}")
}

/// Hemisphere letter from a companion ref tag, with a default when absent.
fn hemisphere(siblings: &[RawEntry], ref_tag: u16, default_ref: char) -> char {
    siblings
        .iter()
        .find(|e| e.tag == ref_tag)
        .and_then(|e| e.value.as_str())
        .and_then(|s| s.chars().next())
        .unwrap_or(default_ref)
}

/// `H:M:S UTC`, each component truncated to an integer.
fn format_gps_timestamp(hms: [Rational; 3]) -> String {
    let h = hms[0].to_f64() as u64;
    let m = hms[1].to_f64() as u64;
    let s = hms[2].to_f64() as u64;
    format!("{h}:{m}:{s} UTC")
}

fn format_enum(value: Option<u32>, labels: &[(u32, &str)]) -> String {
    value
        .and_then(|v| labels.iter().find(|(k, _)| *k == v))
        .map_or_else(|| "unknown".to_string(), |(_, label)| (*label).to_string())
}
