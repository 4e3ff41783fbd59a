use crate::tags::{Block, MetadataReader, TagDirectory, TagEntry, TagKey, TagSet};
use anyhow::{Context as _, Result};
use exif::{Context, Exif, Field, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const KEYED_TAGS: &[(Tag, TagKey)] = &[
    (Tag::DateTimeOriginal, TagKey::DateTimeOriginal),
    (Tag::OffsetTimeOriginal, TagKey::OffsetTimeOriginal),
    (Tag::DateTime, TagKey::DateTime),
    (Tag::OffsetTime, TagKey::OffsetTime),
    (Tag::Model, TagKey::Model),
    (Tag::FocalLength, TagKey::FocalLength),
    (Tag::FocalLengthIn35mmFilm, TagKey::FocalLengthIn35mmFilm),
    (Tag::FNumber, TagKey::FNumber),
    (Tag::ExposureTime, TagKey::ExposureTime),
    (Tag::PhotographicSensitivity, TagKey::PhotographicSensitivity),
];

/// [`MetadataReader`] backed by kamadak-exif. Handles JPEG, TIFF-based RAW,
/// PNG, WebP and HEIF containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifReader;

impl MetadataReader for ExifReader {
    fn read(&self, path: &Path) -> Option<Box<dyn TagDirectory>> {
        match read_exif_tags(path) {
            Ok(tags) if !tags.is_empty() => Some(Box::new(tags)),
            Ok(_) => None,
            Err(err) => {
                log::debug!("no readable EXIF in {}: {err:#}", path.display());
                None
            }
        }
    }
}

pub fn read_exif_tags(path: &Path) -> Result<TagSet> {
    let file = File::open(path)
        .with_context(|| format!("cannot open file for EXIF reading: {}", path.display()))?;
    let mut buf = BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut buf)
        .with_context(|| format!("cannot parse EXIF: {}", path.display()))?;
    Ok(tags_from_exif(&exif))
}

pub fn tags_from_exif(exif: &Exif) -> TagSet {
    let mut tags = TagSet::new();
    for field in exif.fields() {
        let value = describe(field, exif);
        if value.is_empty() {
            continue;
        }
        tags.push(TagEntry {
            block: block_of(field),
            key: key_of(field.tag),
            name: field.tag.to_string(),
            value,
        });
    }
    tags
}

fn block_of(field: &Field) -> Block {
    if field.ifd_num != In::PRIMARY {
        return Block::Thumbnail;
    }
    match field.tag.context() {
        Context::Tiff => Block::Primary,
        Context::Exif => Block::Detail,
        Context::Gps => Block::Gps,
        Context::Interop => Block::Interop,
        #[allow(unreachable_patterns)]
        _ => Block::Primary,
    }
}

fn key_of(tag: Tag) -> Option<TagKey> {
    KEYED_TAGS
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, key)| *key)
}

/// Human-readable rendering in the shape the formatter expects
/// (`f/2.1`, `1/364 sec`, `4.5 mm`, `140 mm`, `50`).
fn describe(field: &Field, exif: &Exif) -> String {
    let tag = field.tag;
    match &field.value {
        Value::Ascii(strings) => strings
            .first()
            .map(|bytes| {
                String::from_utf8_lossy(bytes)
                    .trim_end_matches('\0')
                    .trim()
                    .to_string()
            })
            .unwrap_or_default(),
        Value::Rational(values) if tag == Tag::FNumber && !values.is_empty() => {
            format!("f/{}", values[0].to_f64())
        }
        Value::Rational(values) if tag == Tag::ExposureTime && !values.is_empty() => {
            format!("{}/{} sec", values[0].num, values[0].denom)
        }
        Value::Rational(values) if tag == Tag::FocalLength && !values.is_empty() => {
            format!("{} mm", values[0].to_f64())
        }
        value if tag == Tag::FocalLengthIn35mmFilm => match value.get_uint(0) {
            Some(mm) => format!("{mm} mm"),
            None => field.display_value().with_unit(exif).to_string(),
        },
        value if tag == Tag::PhotographicSensitivity => match value.get_uint(0) {
            Some(iso) => iso.to_string(),
            None => field.display_value().with_unit(exif).to_string(),
        },
        _ => field.display_value().with_unit(exif).to_string(),
    }
}
