//! # Orgaplex: organelle-statistics aggregation
//!
//! Orgaplex walks an experiment directory of per-specimen statistics folders
//! (`<entity>_<Category>_Statistics`), loads single-column measurement files
//! and summarises them into labelled matrices with one column per specimen.
//!
//! Two analyses are provided:
//!
//! - **Relationships**: mean and count of nearest-surface distances for every
//!   `Category-to-Target` pair
//! - **Metrics**: volume and sphericity summaries per category
//!
//! Missing data is never a hard failure. A pair absent for one specimen is an
//! absent cell, and completeness is reported next to the values.
//!
//! ## Example
//!
//! ```rust,no_run
//! use orgaplex::pipeline::run_relationships;
//! use orgaplex::report::TracingReporter;
//! use orgaplex::AnalysisConfig;
//!
//! let config = AnalysisConfig::builder().header_lines(4).build()?;
//! let report = run_relationships("data/experiment1", &config, &TracingReporter)?;
//!
//! println!("{}", report.summary());
//! println!("{}", report.completeness());
//! # Ok::<(), orgaplex::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod measurement;
pub mod pipeline;
pub mod provenance;
pub mod report;
pub mod sorting;

pub use config::{AnalysisConfig, AnalysisConfigBuilder, CountMode};
pub use error::{Error, LoadError, Result};
