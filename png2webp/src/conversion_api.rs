//! Conversion API Module
//!
//! Single-file PNG → WebP conversion: validate the request, load the source,
//! remap its metadata, encode, and write the result next to the source under
//! a name that does not collide with anything already there.

use crate::exif_tags::{build_metadata_map, MetadataMap, TagOrder};
use crate::source::SourceImage;
use crate::webp_container::embed_exif;
use shared_utils::{ConvertError, Result};
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_QUALITY: u8 = 80;
pub const DEFAULT_METHOD: u8 = 6;
pub const MAX_QUALITY: u8 = 100;
pub const MAX_METHOD: u8 = 6;

/// Settings shared by every file of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSettings {
    pub lossless: bool,
    /// 0–100
    pub quality: u8,
    /// 0 (fast) – 6 (slower, smaller)
    pub method: u8,
    /// Leave the output's timestamps at conversion time.
    pub use_current_date: bool,
    /// Send the source to the trash after a successful conversion.
    pub delete_after: bool,
    pub tag_order: TagOrder,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            lossless: false,
            quality: DEFAULT_QUALITY,
            method: DEFAULT_METHOD,
            use_current_date: false,
            delete_after: false,
            tag_order: TagOrder::Source,
        }
    }
}

impl ConversionSettings {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.quality > MAX_QUALITY {
            return Err(format!("quality {} outside 0-{}", self.quality, MAX_QUALITY));
        }
        if self.method > MAX_METHOD {
            return Err(format!("method {} outside 0-{}", self.method, MAX_METHOD));
        }
        Ok(())
    }
}

/// One file to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub settings: ConversionSettings,
}

impl ConversionRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            settings: ConversionSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ConversionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn lossless(mut self, lossless: bool) -> Self {
        self.settings.lossless = lossless;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.settings.quality = quality;
        self
    }

    pub fn method(mut self, method: u8) -> Self {
        self.settings.method = method;
        self
    }

    pub fn use_current_date(mut self, value: bool) -> Self {
        self.settings.use_current_date = value;
        self
    }

    pub fn delete_after(mut self, value: bool) -> Self {
        self.settings.delete_after = value;
        self
    }

    pub fn tag_order(mut self, order: TagOrder) -> Self {
        self.settings.tag_order = order;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub input_size: u64,
    pub output_size: u64,
    pub metadata: MetadataMap,
}

/// Everything before the last `.` of the file name, so `.png` has an empty base.
fn base_name(source: &Path) -> OsString {
    match source.file_name().and_then(|n| n.to_str()) {
        Some(name) => OsString::from(name.rsplit_once('.').map_or(name, |(base, _)| base)),
        None => source.file_stem().unwrap_or_default().to_os_string(),
    }
}

fn has_png_name(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().ends_with(".png"))
        .unwrap_or(false)
}

/// `<dir>/<base>.webp`, or `<base>_N.webp` with the smallest N ≥ 1 that is free.
pub fn resolve_output_path(source: &Path) -> PathBuf {
    let parent = source.parent().unwrap_or_else(|| Path::new(""));
    let stem = base_name(source);

    let candidate = |suffix: Option<u32>| {
        let mut name = stem.clone();
        if let Some(n) = suffix {
            name.push(format!("_{}", n));
        }
        name.push(".webp");
        parent.join(name)
    };

    let mut path = candidate(None);
    let mut counter = 0;
    while path.exists() {
        counter += 1;
        path = candidate(Some(counter));
    }
    path
}

fn encode_webp(rgb: &image::RgbImage, settings: &ConversionSettings) -> Result<Vec<u8>> {
    let mut config = webp::WebPConfig::new()
        .map_err(|_| ConvertError::Codec("libwebp rejected the default config".into()))?;
    config.lossless = i32::from(settings.lossless);
    config.quality = f32::from(settings.quality);
    config.method = i32::from(settings.method);

    let encoder = webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height());
    let memory = encoder
        .encode_advanced(&config)
        .map_err(|e| ConvertError::Codec(format!("WebP encoding failed: {:?}", e)))?;
    Ok(memory.to_vec())
}

fn write_new_file(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| ConvertError::filesystem(path, e))?;
    if let Err(e) = file.write_all(data).and_then(|_| file.sync_all()) {
        drop(file);
        let _ = std::fs::remove_file(path);
        return Err(ConvertError::filesystem(path, e));
    }
    Ok(())
}

/// Convert one PNG. Writes exactly one new `.webp` file on success and
/// nothing on failure. Timestamps and disposal are the caller's business.
pub fn convert(request: &ConversionRequest) -> Result<ConversionOutput> {
    let source_path = &request.source;
    let settings = &request.settings;

    if !source_path.exists() {
        return Err(ConvertError::NotFound(source_path.clone()));
    }
    if !has_png_name(source_path) {
        return Err(ConvertError::invalid_input(
            source_path,
            "Input file must be a PNG image",
        ));
    }
    settings
        .validate()
        .map_err(|reason| ConvertError::invalid_input(source_path, reason))?;

    let source = SourceImage::open(source_path)?;
    info!("  Converting: {}", source_path.display());

    let metadata = build_metadata_map(&source.text, settings.tag_order)?;
    for (tag, preview) in metadata.preview_lines() {
        info!("Metadata {}: {}", tag, preview);
    }

    let (width, height) = source.dimensions();
    let input_size = source.file_size;
    // alpha is dropped, not composited
    let rgb = source.image.to_rgb8();
    drop(source);

    let encoded = encode_webp(&rgb, settings)?;
    let exif = if metadata.is_empty() {
        Vec::new()
    } else {
        metadata.to_exif_bytes()?
    };
    let data = embed_exif(&encoded, &exif)?;

    let output_path = resolve_output_path(source_path);
    write_new_file(&output_path, &data)?;
    info!("      Output: {}", output_path.display());

    log_settings(settings);
    info!("Width/Height: {} x {} pixels", width, height);
    info!("{}", "-".repeat(50));

    Ok(ConversionOutput {
        input_path: source_path.clone(),
        output_path,
        width,
        height,
        input_size,
        output_size: data.len() as u64,
        metadata,
    })
}

/// Flags grouped as explicitly set, left at a default value, or left off.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SettingsSummary {
    pub user: Vec<String>,
    pub defaults: Vec<String>,
    pub ignored: Vec<String>,
}

pub fn summarize_settings(settings: &ConversionSettings) -> SettingsSummary {
    let mut summary = SettingsSummary::default();

    if settings.lossless {
        summary.user.push("--lossless".to_string());
    } else {
        summary.ignored.push("--lossless".to_string());
    }

    for (name, value, default) in [
        ("--quality", settings.quality, DEFAULT_QUALITY),
        ("--method", settings.method, DEFAULT_METHOD),
    ] {
        let text = format!("{} {}", name, value);
        if value == default {
            summary.defaults.push(text);
        } else {
            summary.user.push(text);
        }
    }

    for (on, name) in [
        (settings.use_current_date, "--use_current_date"),
        (settings.delete_after, "--delete_after"),
    ] {
        if on {
            summary.user.push(name.to_string());
        } else {
            summary.ignored.push(name.to_string());
        }
    }

    summary
}

fn log_settings(settings: &ConversionSettings) {
    let summary = summarize_settings(settings);
    if !summary.user.is_empty() {
        info!("    Settings: {}", summary.user.join(", "));
    }
    if !summary.defaults.is_empty() {
        info!("    Defaults: {}", summary.defaults.join(", "));
    }
    if !summary.ignored.is_empty() {
        info!("     Ignored: {}", summary.ignored.join(", "));
    }
}
