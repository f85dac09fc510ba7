//! Batch optimizer
//!
//! Discovers source images, then processes them one at a time. A file that
//! fails to decode or write is recorded in the report and the batch moves on.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::OptimizeConfig;
use crate::encode::{encode, resize_to_width};
use crate::error::{OptimizeError, Result};
use crate::naming::{SourceFormat, variant_file_name};
use crate::report::{FileFailure, FileReport, OptimizeReport, VariantReport};

/// Runs the optimization pipeline described by an [`OptimizeConfig`]
#[derive(Debug, Clone)]
pub struct Optimizer {
    config: OptimizeConfig,
}

impl Optimizer {
    pub fn new(config: OptimizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizeConfig {
        &self.config
    }

    /// Optimizes every image under the input directory
    ///
    /// # Errors
    /// Fails only for problems affecting the whole run: invalid
    /// configuration, missing input directory, an unwritable output root or
    /// an unreadable directory entry. Per-file problems end up in
    /// [`OptimizeReport::failures`].
    pub fn run(&self) -> Result<OptimizeReport> {
        self.config.validate()?;

        if !self.config.input_dir.is_dir() {
            return Err(OptimizeError::MissingInput(self.config.input_dir.clone()));
        }

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| OptimizeError::io(&self.config.output_dir, e))?;

        let input = canonical(&self.config.input_dir)?;
        let output = canonical(&self.config.output_dir)?;

        if input == output {
            return Err(OptimizeError::InvalidConfig(format!(
                "output directory {} is the input directory",
                output.display()
            )));
        }

        let sources = discover(&input, &output)?;
        info!(
            count = sources.len(),
            input = %input.display(),
            output = %output.display(),
            "Optimizing images"
        );

        let widths = self.config.normalized_widths();
        let mut report = OptimizeReport::default();

        for (path, format) in sources {
            let relative = path.strip_prefix(&input).unwrap_or(&path);

            match self.process_file(&path, relative, format, &output, &widths) {
                Ok(file) => {
                    debug!(
                        source = %path.display(),
                        original_bytes = file.original_bytes,
                        optimized_bytes = file.optimized_bytes,
                        variants = file.variants.len(),
                        "Optimized image"
                    );
                    report.files.push(file);
                }
                Err(e) => {
                    warn!(source = %path.display(), error = %e, "Skipping image");
                    report.failures.push(FileFailure {
                        source: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            processed = report.files_processed(),
            failed = report.files_failed(),
            savings = %format!("{:.1}%", report.savings_percent()),
            "Image optimization finished"
        );

        Ok(report)
    }

    fn process_file(
        &self,
        path: &Path,
        relative: &Path,
        format: SourceFormat,
        output_root: &Path,
        widths: &[u32],
    ) -> Result<FileReport> {
        let original_bytes = fs::metadata(path)
            .map_err(|e| OptimizeError::io(path, e))?
            .len();

        let img = image::open(path).map_err(|e| OptimizeError::image(path, e))?;

        let target_dir = match relative.parent() {
            Some(parent) => output_root.join(parent),
            None => output_root.to_path_buf(),
        };
        fs::create_dir_all(&target_dir).map_err(|e| OptimizeError::io(&target_dir, e))?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let target = OutputTarget {
            dir: &target_dir,
            stem: &stem,
            ext: &ext,
            format,
        };
        let mut variants = Vec::new();

        let full_size = self.write_variant(&img, None, &target, &mut variants)?;

        for &width in widths.iter().filter(|&&w| w < img.width()) {
            let resized = resize_to_width(&img, width);
            self.write_variant(&resized, Some(width), &target, &mut variants)?;
        }

        Ok(FileReport {
            source: path.to_path_buf(),
            original_bytes,
            optimized_bytes: full_size,
            variants,
        })
    }

    /// Writes one variant in the source format, plus its WebP sibling when
    /// enabled. Returns the size of the source-format file.
    fn write_variant(
        &self,
        img: &DynamicImage,
        width: Option<u32>,
        target: &OutputTarget<'_>,
        variants: &mut Vec<VariantReport>,
    ) -> Result<u64> {
        let primary_path = target
            .dir
            .join(variant_file_name(target.stem, width, target.ext));
        let primary = self.write_encoded(img, target.format, &primary_path)?;
        let bytes = primary.bytes;
        variants.push(primary);

        if self.config.webp && target.format != SourceFormat::WebP {
            let sibling = target.dir.join(variant_file_name(target.stem, width, "webp"));
            variants.push(self.write_encoded(img, SourceFormat::WebP, &sibling)?);
        }

        Ok(bytes)
    }

    fn write_encoded(
        &self,
        img: &DynamicImage,
        format: SourceFormat,
        path: &Path,
    ) -> Result<VariantReport> {
        let encoded = encode(img, format, self.config.jpeg_quality)
            .map_err(|e| OptimizeError::image(path, e))?;
        fs::write(path, &encoded).map_err(|e| OptimizeError::io(path, e))?;

        Ok(VariantReport {
            path: path.to_path_buf(),
            width: img.width(),
            bytes: encoded.len() as u64,
        })
    }
}

/// Where and under which name a source image's outputs are written
struct OutputTarget<'a> {
    dir: &'a Path,
    stem: &'a str,
    ext: &'a str,
    format: SourceFormat,
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| OptimizeError::io(path, e))
}

/// Lists supported images under `input` in file-name order, skipping `output`
/// when it is nested inside `input`
///
/// Both paths must be canonical.
fn discover(input: &Path, output: &Path) -> Result<Vec<(PathBuf, SourceFormat)>> {
    let mut found = Vec::new();
    let nested_output = (output != input && output.starts_with(input)).then_some(output);

    let walker = WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match nested_output {
            Some(skip) => !entry.path().starts_with(skip),
            None => true,
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(format) = SourceFormat::from_path(entry.path()) {
            found.push((entry.into_path(), format));
        }
    }

    Ok(found)
}
