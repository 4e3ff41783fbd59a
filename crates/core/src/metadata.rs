use crate::crop_factor::CropFactorTable;
use crate::tags::{Block, TagDirectory, TagKey};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

const DATE_FORMATS: &[&str] = &[
    "%Y:%m:%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS_WITH_OFFSET: &[&str] = &[
    "%Y:%m:%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
];

const APERTURE_NAMES: &[&str] = &["F-Number", "FNumber"];
const SHUTTER_NAMES: &[&str] = &["Exposure Time", "ExposureTime"];
const ISO_NAMES: &[&str] = &[
    "ISO Speed Ratings",
    "PhotographicSensitivity",
    "ISOSpeedRatings",
];
const FOCAL_35MM_NAMES: &[&str] = &["Focal Length 35", "FocalLengthIn35mmFilm"];
// Written by some Samsung firmware instead of the standard 35mm tag.
const VENDOR_FOCAL_35MM_NAME: &str = "FocalLengthIn35mmFormat";

/// Canonical per-file fields. Each descriptive value is a raw string; a field
/// that cannot be found stays `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFields {
    pub timestamp: Option<DateTime<Utc>>,
    pub model: Option<String>,
    pub focal_length: Option<String>,
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
    pub iso: Option<String>,
}

pub fn normalize(tags: &dyn TagDirectory, crop_factors: &CropFactorTable) -> MetadataFields {
    let mut fields = extract_descriptive_fields(tags);
    fields.timestamp = extract_capture_timestamp(tags);
    fields.focal_length = resolve_focal_length(tags, crop_factors);
    fields
}

/// Original capture time from the Exif block, falling back to the primary
/// block's modification time. Values without an offset are taken as UTC.
pub fn extract_capture_timestamp(tags: &dyn TagDirectory) -> Option<DateTime<Utc>> {
    let original = tags
        .get_by_key(Block::Detail, TagKey::DateTimeOriginal)
        .and_then(|raw| {
            parse_timestamp(
                raw,
                tags.get_by_key(Block::Detail, TagKey::OffsetTimeOriginal),
            )
        });
    if original.is_some() {
        return original;
    }

    tags.get_by_key(Block::Primary, TagKey::DateTime)
        .and_then(|raw| parse_timestamp(raw, tags.get_by_key(Block::Primary, TagKey::OffsetTime)))
}

pub fn extract_descriptive_fields(tags: &dyn TagDirectory) -> MetadataFields {
    MetadataFields {
        model: lookup(tags, Block::Primary, TagKey::Model, &["Model"]),
        aperture: lookup(tags, Block::Detail, TagKey::FNumber, APERTURE_NAMES),
        shutter_speed: lookup(tags, Block::Detail, TagKey::ExposureTime, SHUTTER_NAMES),
        iso: lookup(
            tags,
            Block::Detail,
            TagKey::PhotographicSensitivity,
            ISO_NAMES,
        ),
        ..MetadataFields::default()
    }
}

/// 35mm-equivalent focal length: reported value first, then the vendor tag,
/// then the physical focal length times the model's crop factor.
pub fn resolve_focal_length(
    tags: &dyn TagDirectory,
    crop_factors: &CropFactorTable,
) -> Option<String> {
    if let Some(reported) = lookup(
        tags,
        Block::Detail,
        TagKey::FocalLengthIn35mmFilm,
        FOCAL_35MM_NAMES,
    ) {
        return Some(reported.split_whitespace().collect::<Vec<_>>().join("_"));
    }

    if let Some(vendor) = normalize_value(tags.get_by_name(VENDOR_FOCAL_35MM_NAME)) {
        return Some(vendor);
    }

    let focal = tags
        .get_by_key(Block::Detail, TagKey::FocalLength)
        .and_then(parse_positive_number)?;
    let model = tags.get_by_key(Block::Primary, TagKey::Model)?;
    let factor = crop_factors.lookup(model)?;
    Some(format!("{}", (focal * factor).round() as i64))
}

fn lookup(tags: &dyn TagDirectory, block: Block, key: TagKey, names: &[&str]) -> Option<String> {
    normalize_value(tags.get_by_key(block, key))
        .or_else(|| normalize_value(tags.get_by_any_name(names)))
}

fn normalize_value(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_positive_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_timestamp(raw: &str, offset: Option<&str>) -> Option<DateTime<Utc>> {
    let normalized = raw.trim().trim_end_matches('\0');

    if let Ok(dt) = DateTime::parse_from_rfc3339(normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATE_FORMATS_WITH_OFFSET {
        if let Ok(dt) = DateTime::parse_from_str(normalized, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(normalized, fmt).ok())?;

    match offset.and_then(parse_offset) {
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
        None => Some(Utc.from_utc_datetime(&naive)),
    }
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim().trim_end_matches('\0');
    if raw.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
