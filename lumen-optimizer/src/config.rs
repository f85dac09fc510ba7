//! Optimizer configuration

use std::path::PathBuf;

use crate::error::{OptimizeError, Result};

/// Responsive widths generated unless configured otherwise
pub const DEFAULT_WIDTHS: [u32; 4] = [320, 640, 1024, 1920];

/// JPEG quality used unless configured otherwise
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Settings for one optimizer run
#[derive(Debug, Clone)]
pub struct OptimizeConfig {
    /// Directory scanned recursively for source images
    pub input_dir: PathBuf,

    /// Directory receiving the optimized tree (created if missing)
    pub output_dir: PathBuf,

    /// Target widths for responsive variants; widths not smaller than the
    /// source are skipped
    pub widths: Vec<u32>,

    /// JPEG encoder quality, 1-100
    pub jpeg_quality: u8,

    /// Also write a lossless WebP sibling for every variant
    pub webp: bool,
}

impl OptimizeConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            widths: DEFAULT_WIDTHS.to_vec(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            webp: true,
        }
    }

    pub fn with_widths(mut self, widths: Vec<u32>) -> Self {
        self.widths = widths;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn with_webp(mut self, webp: bool) -> Self {
        self.webp = webp;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.widths.is_empty() {
            return Err(OptimizeError::InvalidConfig(
                "at least one width is required".to_string(),
            ));
        }

        if self.widths.contains(&0) {
            return Err(OptimizeError::InvalidConfig(
                "widths must be greater than 0".to_string(),
            ));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(OptimizeError::InvalidConfig(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }

        if self.input_dir == self.output_dir {
            return Err(OptimizeError::InvalidConfig(
                "output_dir must differ from input_dir".to_string(),
            ));
        }

        Ok(())
    }

    /// Widths sorted ascending without duplicates
    pub(crate) fn normalized_widths(&self) -> Vec<u32> {
        let mut widths = self.widths.clone();
        widths.sort_unstable();
        widths.dedup();
        widths
    }
}
