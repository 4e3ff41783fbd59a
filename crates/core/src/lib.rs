mod collision;
mod config;
mod crop_factor;
mod discovery;
mod exif_reader;
mod formatter;
mod metadata;
mod renamer;
mod result;
mod sanitize;
mod tags;

pub use collision::{find_unique_target_path, ClaimTable};
pub use config::{
    app_paths, load_config, load_config_from, save_config, save_config_to, AppConfig, AppPaths,
    CropFactorOverride,
};
pub use crop_factor::{CropFactorError, CropFactorRule, CropFactorTable};
pub use discovery::{collect_files, is_supported_image, SUPPORTED_EXTENSIONS};
pub use exif_reader::{read_exif_tags, tags_from_exif, ExifReader};
pub use formatter::{
    file_extension, format_aperture, format_base_name, format_focal_length, format_iso,
    format_shutter_speed,
};
pub use metadata::{
    extract_capture_timestamp, extract_descriptive_fields, normalize, resolve_focal_length,
    MetadataFields,
};
pub use renamer::{default_workers, FileProcessor, RenameConfig, Renamer};
pub use result::{ProgressListener, RenameError, RenameResult, RenameSummary, NO_EXIF_DATE};
pub use sanitize::sanitize;
pub use tags::{Block, MetadataReader, TagDirectory, TagEntry, TagKey, TagSet};
