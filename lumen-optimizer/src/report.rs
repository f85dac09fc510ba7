//! Size statistics produced by an optimizer run

use std::path::PathBuf;

use serde::Serialize;

/// One written output file
#[derive(Debug, Clone, Serialize)]
pub struct VariantReport {
    pub path: PathBuf,
    /// Pixel width of this output
    pub width: u32,
    pub bytes: u64,
}

/// Outcome for a single source image
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub original_bytes: u64,
    /// Size of the full-size re-encode in the source's own format
    pub optimized_bytes: u64,
    pub variants: Vec<VariantReport>,
}

/// A source image that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub source: PathBuf,
    pub reason: String,
}

/// Aggregate result of an optimizer run
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptimizeReport {
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl OptimizeReport {
    pub fn files_processed(&self) -> usize {
        self.files.len()
    }

    pub fn files_failed(&self) -> usize {
        self.failures.len()
    }

    pub fn original_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.original_bytes).sum()
    }

    pub fn optimized_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.optimized_bytes).sum()
    }

    /// Total number of files written, all variants included
    pub fn variants_written(&self) -> usize {
        self.files.iter().map(|f| f.variants.len()).sum()
    }

    /// Size reduction of the full-size re-encodes, in percent
    ///
    /// Negative when re-encoding grew the files; 0 when nothing was processed.
    pub fn savings_percent(&self) -> f64 {
        let original = self.original_bytes();
        if original == 0 {
            return 0.0;
        }
        (original as f64 - self.optimized_bytes() as f64) / original as f64 * 100.0
    }
}
