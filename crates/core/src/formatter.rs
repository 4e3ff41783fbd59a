use crate::metadata::MetadataFields;
use crate::sanitize::sanitize;
use chrono::{DateTime, Utc};
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Renders `{timestamp}[_{model}][_{focal}][_{aperture}][_{shutter}][_ISO{iso}]`
/// without the extension. Absent or unparseable groups are left out together
/// with their separator.
pub fn format_base_name(timestamp: DateTime<Utc>, fields: &MetadataFields) -> String {
    let mut name = timestamp.format(TIMESTAMP_FORMAT).to_string();

    let groups = [
        fields.model.as_deref().map(sanitize),
        fields.focal_length.as_deref().map(format_focal_length),
        fields.aperture.as_deref().map(format_aperture),
        fields.shutter_speed.as_deref().map(format_shutter_speed),
        fields.iso.as_deref().map(format_iso),
    ];

    for group in groups.into_iter().flatten() {
        if !group.is_empty() {
            name.push('_');
            name.push_str(&group);
        }
    }

    name
}

pub fn format_focal_length(raw: &str) -> String {
    sanitize(raw).replace(' ', "")
}

/// `f/2,1` -> `F2.1`
pub fn format_aperture(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        String::new()
    } else {
        format!("F{cleaned}")
    }
}

/// Accepts `N/D` fractions, vendor `N_D` ratios (e.g. `3109601_1000000000 sec`)
/// and plain seconds. Anything unparseable renders as an empty string.
pub fn format_shutter_speed(raw: &str) -> String {
    parse_shutter_speed(raw).unwrap_or_default()
}

fn parse_shutter_speed(raw: &str) -> Option<String> {
    if raw.contains('/') {
        let (num, den) = split_ratio(raw, '/')?;
        if num == 1.0 {
            return Some(format!("1-{}", den.round() as i64));
        }
        return format_seconds(num / den);
    }

    if raw.contains('_') {
        let (num, den) = split_ratio(raw, '_')?;
        return format_seconds(num / den);
    }

    let cleaned = keep_chars(raw, &['.']);
    format_seconds(cleaned.parse::<f64>().ok()?)
}

fn split_ratio(raw: &str, separator: char) -> Option<(f64, f64)> {
    let cleaned = keep_chars(raw, &['.', separator]);
    let (num, den) = cleaned.split_once(separator)?;
    let num = num.parse::<f64>().ok()?;
    let den = den.parse::<f64>().ok()?;
    if den == 0.0 {
        return None;
    }
    Some((num, den))
}

fn keep_chars(raw: &str, extra: &[char]) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || extra.contains(c))
        .collect()
}

fn format_seconds(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    if seconds >= 1.0 {
        Some(format!("{}s", seconds.round() as i64))
    } else {
        Some(format!("1-{}", (1.0 / seconds).round() as i64))
    }
}

pub fn format_iso(raw: &str) -> String {
    let value = sanitize(raw);
    if value.is_empty() {
        value
    } else {
        format!("ISO{value}")
    }
}

/// Suffix from the last `.` of the file name, dot included; empty when the
/// name has none. Case is preserved.
pub fn file_extension(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(idx) => name[idx..].to_string(),
        None => String::new(),
    }
}
