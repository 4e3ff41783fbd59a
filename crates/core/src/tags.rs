use std::path::Path;

/// Structured metadata block a tag was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    /// IFD0: camera make/model, last-modified timestamp.
    Primary,
    /// Exif sub-IFD: capture timestamp and exposure settings.
    Detail,
    Gps,
    Interop,
    Thumbnail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKey {
    DateTimeOriginal,
    OffsetTimeOriginal,
    DateTime,
    OffsetTime,
    Model,
    FocalLength,
    FocalLengthIn35mmFilm,
    FNumber,
    ExposureTime,
    PhotographicSensitivity,
}

/// Dual-mode tag lookup. Adapters for different metadata libraries implement
/// this so the normalizer never depends on a concrete reader.
pub trait TagDirectory {
    fn get_by_key(&self, block: Block, key: TagKey) -> Option<&str>;

    /// Case-insensitive lookup by human-readable tag name across all blocks.
    fn get_by_name(&self, name: &str) -> Option<&str>;

    fn get_by_any_name(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.get_by_name(name))
    }
}

pub trait MetadataReader: Send + Sync {
    /// Returns `None` when the file has no readable metadata.
    fn read(&self, path: &Path) -> Option<Box<dyn TagDirectory>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub block: Block,
    pub key: Option<TagKey>,
    pub name: String,
    pub value: String,
}

/// Owned tag directory, in reading order.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    entries: Vec<TagEntry>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TagEntry) {
        self.entries.push(entry);
    }

    pub fn with_key(mut self, block: Block, key: TagKey, name: &str, value: &str) -> Self {
        self.push(TagEntry {
            block,
            key: Some(key),
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_name(mut self, block: Block, name: &str, value: &str) -> Self {
        self.push(TagEntry {
            block,
            key: None,
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }
}

impl TagDirectory for TagSet {
    fn get_by_key(&self, block: Block, key: TagKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.block == block && entry.key == Some(key))
            .map(|entry| entry.value.as_str())
    }

    fn get_by_name(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .map(|entry| entry.value.as_str())
    }
}
