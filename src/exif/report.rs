//! Report building — aggregating decoded tags into an ordered report.

use serde::Serialize;

use super::ifd::{Ifd, RawDirectories};
use super::tags::{self, Interpretation};

/// One line of the metadata report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub label: String,
    pub value: String,
    pub sensitive: bool,
}

/// Ordered, categorized metadata report for one image.
///
/// Entries are grouped in fixed category order: location, file identity,
/// camera, exposure, lens. A report is never empty — an image without any
/// decodable metadata carries a single synthetic entry saying so, so callers
/// never special-case the empty sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataReport {
    pub entries: Vec<ReportEntry>,
    /// True iff at least one GPS or camera/lens-identity tag was decoded.
    pub has_sensitive_data: bool,
}

pub const NO_METADATA_LABEL: &str = "Metadata";
pub const NO_METADATA_VALUE: &str = "No EXIF metadata found";

impl MetadataReport {
    /// The report for an image with no (or no parsable) metadata.
    pub fn no_metadata() -> Self {
        Self {
            entries: vec![ReportEntry {
                label: NO_METADATA_LABEL.to_string(),
                value: NO_METADATA_VALUE.to_string(),
                sensitive: false,
            }],
            has_sensitive_data: false,
        }
    }

    /// Whether this is the synthetic "no metadata" report.
    pub fn is_no_metadata(&self) -> bool {
        !self.has_sensitive_data
            && self.entries.len() == 1
            && self.entries[0].label == NO_METADATA_LABEL
    }
}

/// Aggregate the raw directories into a report.
///
/// Directories are walked GPS first, then primary, then Exif; the decoded
/// tags are then grouped by category (stable within each category), so the
/// most privacy-relevant entries lead the report.
pub fn build_report(dirs: &RawDirectories) -> MetadataReport {
    let mut decoded = Vec::new();

    let walk_order = [
        (Ifd::Gps, &dirs.gps),
        (Ifd::Primary, &dirs.primary),
        (Ifd::Exif, &dirs.exif),
    ];

    for (ifd, entries) in walk_order {
        for entry in entries {
            match tags::interpret_entry(entry, ifd, entries) {
                Interpretation::Decoded(tag) => decoded.push(tag),
                Interpretation::Companion => {}
                Interpretation::Malformed { tag } => {
                    log::warn!("tag {tag:#06x} in {ifd:?} has an unusable value, omitted");
                }
                Interpretation::Unrecognized { tag } => {
                    log::debug!("tag {tag:#06x} in {ifd:?} not in table, omitted");
                }
            }
        }
    }

    if decoded.is_empty() {
        return MetadataReport::no_metadata();
    }

    // Stable sort: category order between groups, walk order within.
    decoded.sort_by_key(|tag| tag.category);

    let has_sensitive_data = decoded.iter().any(|tag| tag.sensitive);
    let entries = decoded
        .into_iter()
        .map(|tag| ReportEntry {
            label: tag.label.to_string(),
            value: tag.value,
            sensitive: tag.sensitive,
        })
        .collect();

    MetadataReport { entries, has_sensitive_data }
}
