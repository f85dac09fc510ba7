//! Lumen image optimizer
//!
//! Batch-optimizes the static images shipped with the web frontend. The
//! [`Optimizer`] walks an input tree, re-encodes every PNG/JPEG/WebP it
//! finds, derives narrower responsive variants (`hero-640w.jpg`) and,
//! optionally, WebP siblings for each of them. The result is an
//! [`OptimizeReport`] with per-file sizes and overall savings.
//!
//! ```no_run
//! use lumen_optimizer::{OptimizeConfig, Optimizer};
//!
//! let config = OptimizeConfig::new("public/images", "dist/images");
//! let report = Optimizer::new(config).run()?;
//! println!("saved {:.1}%", report.savings_percent());
//! # Ok::<(), lumen_optimizer::OptimizeError>(())
//! ```

mod config;
mod encode;
pub mod error;
mod naming;
mod optimizer;
mod report;

pub use config::OptimizeConfig;
pub use error::{OptimizeError, Result};
pub use naming::{SourceFormat, variant_file_name};
pub use optimizer::Optimizer;
pub use report::{FileFailure, FileReport, OptimizeReport, VariantReport};
