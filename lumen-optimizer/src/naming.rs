//! Source format detection and variant file naming

use std::path::Path;

/// Image formats the optimizer reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
    WebP,
}

impl SourceFormat {
    /// Detects the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }
}

/// Builds the output file name for a variant
///
/// `None` width names the full-size copy (`hero.jpg`), otherwise the width is
/// appended to the stem (`hero-640w.jpg`).
pub fn variant_file_name(stem: &str, width: Option<u32>, ext: &str) -> String {
    match width {
        Some(width) => format!("{stem}-{width}w.{ext}"),
        None => format!("{stem}.{ext}"),
    }
}
